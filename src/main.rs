use anyhow::Result;
use farmdash::*;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::time::FormatTime;

struct LocalTimer;

impl FormatTime for LocalTimer {
    fn format_time(&self, w: &mut tracing_subscriber::fmt::format::Writer<'_>) -> std::fmt::Result {
        write!(
            w,
            "{}",
            chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z")
        )
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_timer(LocalTimer)
        .with_env_filter(filter)
        .init();

    let app_config = config::AppConfig::load()?;

    let prefs_repo = Arc::new(prefs_repo::PrefsRepo::connect(&app_config.storage.path).await?);
    prefs_repo.init().await?;

    let service = Arc::new(service::http::HttpDashboardService::new(
        &app_config.api.base_url,
        Duration::from_millis(app_config.api.timeout_ms),
    )?);
    let view_model = view_model::DashboardViewModel::new(
        service,
        view_model::ViewModelConfig {
            auto_refresh_interval: Duration::from_secs(app_config.dashboard.auto_refresh_secs),
            page_size: app_config.dashboard.page_size,
            time_range: models::TimeRange::of_kind(app_config.dashboard.default_time_range),
            ..Default::default()
        },
    );
    let recent = prefs_repo::RecentSearches::new(
        prefs_repo.clone(),
        "dashboard",
        app_config.storage.max_recent_searches,
    );
    let search = Arc::new(support::DebouncedSearch::new(
        view_model.clone(),
        Duration::from_millis(app_config.search.debounce_ms),
        Some(recent),
    ));

    // First load runs in the background; the API serves the loading state meanwhile.
    let init_vm = view_model.clone();
    let init_handle = tokio::spawn(async move {
        init_vm.initialize().await;
    });

    let app = routes::app(view_model.clone(), search);
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(api = %app_config.api.base_url, "Listening on http://{}", addr);

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = async {
            #[cfg(unix)]
            {
                let mut sigterm = match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                    Ok(s) => s,
                    Err(_) => {
                        let _ = tokio::signal::ctrl_c().await;
                        return;
                    }
                };
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            #[cfg(not(unix))]
            {
                let _ = tokio::signal::ctrl_c().await;
            }
        } => {
            tracing::info!("Received shutdown signal");
            init_handle.abort();
            view_model.dispose();
        }
    }

    Ok(())
}
