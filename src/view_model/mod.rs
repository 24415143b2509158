// Dashboard view-model: the only caller of the farm API.
// Folds service results into the immutable dashboard model and owns the auto-refresh task.

mod ui;
mod view_data;

pub use ui::{ActionError, ActionKind, ActionResult, ActionsInProgress, ModalState, UiState};
pub use view_data::{DashboardStats, PaginationView, PerformanceView, ViewData};

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{debug, info, warn};

use crate::models::{
    ApiFilters, ContainerDomainModel, ContainerType, ContainerTypeFilter, DashboardDomainModel,
    DEFAULT_PAGE_SIZE, FilterError, FilterState, FiltersDomainModel, PaginationDomainModel,
    PerformanceMetricsDomainModel, Slice, SortOrder, TimeRange,
};
use crate::service::{BatchOutcome, ContainerDraft, ContainerUpdate, DashboardService};

pub const DEFAULT_AUTO_REFRESH_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct ViewModelConfig {
    pub auto_refresh_interval: Duration,
    pub page_size: u32,
    pub time_range: TimeRange,
    pub sort: Option<String>,
    pub order: Option<SortOrder>,
}

impl Default for ViewModelConfig {
    fn default() -> Self {
        Self {
            auto_refresh_interval: DEFAULT_AUTO_REFRESH_INTERVAL,
            page_size: DEFAULT_PAGE_SIZE,
            time_range: TimeRange::default(),
            sort: None,
            order: None,
        }
    }
}

struct Inner {
    model: DashboardDomainModel,
    ui: UiState,
    sort: Option<String>,
    order: Option<SortOrder>,
    is_initialized: bool,
    initializing: bool,
    containers_generation: u64,
    performance_generation: u64,
    filter_options_generation: u64,
}

impl Inner {
    fn generation(&self, slice: Slice) -> u64 {
        match slice {
            Slice::Containers => self.containers_generation,
            Slice::Performance => self.performance_generation,
            Slice::FilterOptions => self.filter_options_generation,
        }
    }

    /// Installs `filters` and goes back to page 1.
    fn install_filters(&mut self, filters: FiltersDomainModel) {
        let first = self.model.pagination().first_page();
        self.model = self.model.with_filters(filters).with_pagination(first);
    }
}

/// Everything a container fetch needs, captured under the lock.
struct ContainersTicket {
    generation: u64,
    query: ApiFilters,
}

struct PerformanceTicket {
    generation: u64,
    time_range: TimeRange,
    container_type: Option<ContainerType>,
}

/// Clears its action flag when the action finishes or its future is dropped.
struct ActionGuard<'a> {
    vm: &'a DashboardViewModel,
    kind: ActionKind,
}

impl Drop for ActionGuard<'_> {
    fn drop(&mut self) {
        self.vm.update(|inner| inner.ui.actions.set(self.kind, false));
    }
}

/// Clears a slice's loading flag when its fetch is dropped before the result is folded in.
/// A newer fetch of the same slice owns the flag, so a stale generation leaves it alone.
struct LoadingGuard<'a> {
    vm: &'a DashboardViewModel,
    slice: Slice,
    generation: u64,
    armed: bool,
}

impl<'a> LoadingGuard<'a> {
    fn new(vm: &'a DashboardViewModel, slice: Slice, generation: u64) -> Self {
        Self {
            vm,
            slice,
            generation,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let (slice, generation) = (self.slice, self.generation);
        let cleared = self.vm.update(|inner| {
            if inner.generation(slice) != generation {
                return false;
            }
            inner.model = inner.model.with_loading([(slice, false)]);
            true
        });
        if cleared {
            debug!(slice = slice.as_str(), generation, "fetch cancelled; loading cleared");
        }
    }
}

/// Lets `initialize` run again if it is cancelled before finishing.
struct InitGuard<'a> {
    vm: &'a DashboardViewModel,
    armed: bool,
}

impl InitGuard<'_> {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InitGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.vm.update(|inner| inner.initializing = false);
            debug!("initialize cancelled");
        }
    }
}

pub struct DashboardViewModel {
    service: Arc<dyn DashboardService>,
    config: ViewModelConfig,
    inner: Mutex<Inner>,
    view_tx: watch::Sender<ViewData>,
    auto_refresh: Mutex<Option<JoinHandle<()>>>,
}

impl DashboardViewModel {
    pub fn new(service: Arc<dyn DashboardService>, config: ViewModelConfig) -> Arc<Self> {
        let model = DashboardDomainModel::create_empty()
            .with_pagination(PaginationDomainModel::new(config.page_size))
            .with_time_range(config.time_range.clone());
        let ui = UiState::default();
        let (view_tx, _) = watch::channel(ViewData::build(&model, &ui));
        Arc::new(Self {
            service,
            inner: Mutex::new(Inner {
                model,
                ui,
                sort: config.sort.clone(),
                order: config.order,
                is_initialized: false,
                initializing: false,
                containers_generation: 0,
                performance_generation: 0,
                filter_options_generation: 0,
            }),
            config,
            view_tx,
            auto_refresh: Mutex::new(None),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read<R>(&self, f: impl FnOnce(&Inner) -> R) -> R {
        f(&self.lock())
    }

    /// Applies `f` under the lock and publishes the resulting view if it changed.
    fn update<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> R {
        let mut inner = self.lock();
        let out = f(&mut inner);
        let view = ViewData::build(&inner.model, &inner.ui);
        drop(inner);
        self.view_tx.send_if_modified(|current| {
            if *current == view {
                false
            } else {
                *current = view;
                true
            }
        });
        out
    }

    pub fn state(&self) -> DashboardDomainModel {
        self.read(|i| i.model.clone())
    }

    pub fn ui_state(&self) -> UiState {
        self.read(|i| i.ui.clone())
    }

    pub fn view_data(&self) -> ViewData {
        self.view_tx.borrow().clone()
    }

    /// Receives a fresh [`ViewData`] after every state change.
    pub fn subscribe(&self) -> watch::Receiver<ViewData> {
        self.view_tx.subscribe()
    }

    pub fn is_initialized(&self) -> bool {
        self.read(|i| i.is_initialized)
    }

    /// No action in flight and no slice loading.
    pub fn can_refresh(&self) -> bool {
        self.read(|i| !i.ui.actions.any() && i.model.can_refresh_data())
    }

    // ---- fetch plumbing ----

    fn begin_containers(inner: &mut Inner) -> ContainersTicket {
        inner.containers_generation += 1;
        let pagination = inner.model.pagination();
        let query = inner.model.filters().to_api_filters(
            pagination.current_page(),
            pagination.page_size(),
            inner.sort.as_deref(),
            inner.order,
        );
        inner.model = inner.model.with_loading([(Slice::Containers, true)]);
        ContainersTicket {
            generation: inner.containers_generation,
            query,
        }
    }

    fn begin_performance(inner: &mut Inner) -> PerformanceTicket {
        inner.performance_generation += 1;
        let state = inner.model.state();
        let ticket = PerformanceTicket {
            generation: inner.performance_generation,
            time_range: state.selected_time_range.clone(),
            container_type: state.selected_container_type.as_container_type(),
        };
        inner.model = inner.model.with_loading([(Slice::Performance, true)]);
        ticket
    }

    fn begin_filter_options(inner: &mut Inner) -> u64 {
        inner.filter_options_generation += 1;
        inner.model = inner.model.with_loading([(Slice::FilterOptions, true)]);
        inner.filter_options_generation
    }

    async fn run_containers(&self, ticket: ContainersTicket) {
        let loading = LoadingGuard::new(self, Slice::Containers, ticket.generation);
        let result = self.service.get_containers(&ticket.query).await;
        self.update(|inner| {
            if inner.containers_generation != ticket.generation {
                debug!(
                    operation = "get_containers",
                    generation = ticket.generation,
                    "discarding superseded response"
                );
                return;
            }
            let model = inner.model.with_loading([(Slice::Containers, false)]);
            inner.model = match result {
                Ok(page) => {
                    let containers = page
                        .containers
                        .into_iter()
                        .map(ContainerDomainModel::from_api_response)
                        .collect();
                    model
                        .with_containers(containers)
                        .with_pagination(PaginationDomainModel::from_api_response(page.pagination))
                        .clear_error(Slice::Containers)
                }
                Err(e) => {
                    warn!(error = %e, operation = "get_containers", "containers refresh failed");
                    model.with_error([(Slice::Containers, Some(e.to_string()))])
                }
            };
        });
        loading.disarm();
    }

    async fn run_performance(&self, ticket: PerformanceTicket) {
        let loading = LoadingGuard::new(self, Slice::Performance, ticket.generation);
        let result = self
            .service
            .get_dashboard_metrics(&ticket.time_range, ticket.container_type)
            .await;
        self.update(|inner| {
            if inner.performance_generation != ticket.generation {
                debug!(
                    operation = "get_dashboard_metrics",
                    generation = ticket.generation,
                    "discarding superseded response"
                );
                return;
            }
            let model = inner.model.with_loading([(Slice::Performance, false)]);
            inner.model = match result {
                Ok(raw) => model
                    .with_performance(PerformanceMetricsDomainModel::from_api_response(raw))
                    .clear_error(Slice::Performance),
                Err(e) => {
                    warn!(error = %e, operation = "get_dashboard_metrics", "performance refresh failed");
                    model.with_error([(Slice::Performance, Some(e.to_string()))])
                }
            };
        });
        loading.disarm();
    }

    async fn run_filter_options(&self, generation: u64, first_load: bool) {
        let loading = LoadingGuard::new(self, Slice::FilterOptions, generation);
        let result = if first_load {
            self.service.initialize_filters().await
        } else {
            self.service.get_filter_options().await
        };
        self.update(|inner| {
            if inner.filter_options_generation != generation {
                debug!(
                    operation = "get_filter_options",
                    generation, "discarding superseded response"
                );
                return;
            }
            let model = inner.model.with_loading([(Slice::FilterOptions, false)]);
            inner.model = match result {
                Ok(options) => {
                    let filters = model.filters().with_options(options);
                    model
                        .with_filters(filters)
                        .clear_error(Slice::FilterOptions)
                }
                Err(e) => {
                    warn!(error = %e, operation = "get_filter_options", "filter options refresh failed");
                    model.with_error([(Slice::FilterOptions, Some(e.to_string()))])
                }
            };
        });
        loading.disarm();
    }

    // ---- lifecycle ----

    /// Loads all three slices concurrently, then starts auto-refresh.
    /// Runs once per instance; returns false when it was already run or is running.
    pub async fn initialize(self: &Arc<Self>) -> bool {
        let tickets = self.update(|inner| {
            if inner.is_initialized || inner.initializing {
                return None;
            }
            inner.initializing = true;
            let options = Self::begin_filter_options(inner);
            Some((
                Self::begin_containers(inner),
                Self::begin_performance(inner),
                options,
            ))
        });
        let Some((containers, performance, options)) = tickets else {
            debug!("initialize called more than once; ignoring");
            return false;
        };
        let init = InitGuard {
            vm: self,
            armed: true,
        };

        futures_util::join!(
            self.run_containers(containers),
            self.run_performance(performance),
            self.run_filter_options(options, true),
        );

        self.update(|inner| {
            inner.initializing = false;
            inner.is_initialized = true;
        });
        init.disarm();
        let errors = self.read(|i| i.model.state().errors.clone());
        info!(
            containers_error = errors.containers.is_some(),
            performance_error = errors.performance.is_some(),
            filter_options_error = errors.filter_options.is_some(),
            "dashboard initialized"
        );
        self.start_auto_refresh();
        true
    }

    /// (Re)starts the auto-refresh timer; any previous timer is cancelled first.
    pub fn start_auto_refresh(self: &Arc<Self>) {
        let weak = Arc::downgrade(self);
        let period = self.config.auto_refresh_interval;
        let handle = tokio::spawn(async move {
            let mut tick = interval_at(Instant::now() + period, period);
            tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tick.tick().await;
                let Some(vm) = weak.upgrade() else {
                    break;
                };
                if vm.can_refresh() {
                    vm.refresh_all().await;
                } else {
                    debug!(operation = "auto_refresh", "busy; skipping tick");
                }
            }
        });
        let previous = self
            .auto_refresh
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(handle);
        if let Some(previous) = previous {
            previous.abort();
        }
    }

    pub fn is_auto_refreshing(&self) -> bool {
        self.auto_refresh
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    /// Cancels the auto-refresh timer. Safe to call more than once.
    pub fn dispose(&self) {
        let handle = self
            .auto_refresh
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            handle.abort();
            debug!("auto-refresh stopped");
        }
    }

    // ---- refresh ----

    /// Refreshes every slice, unless something is already loading.
    pub async fn refresh_all(&self) {
        let tickets = self.update(|inner| {
            if !inner.model.can_refresh_data() {
                return None;
            }
            let options = Self::begin_filter_options(inner);
            Some((
                Self::begin_containers(inner),
                Self::begin_performance(inner),
                options,
            ))
        });
        let Some((containers, performance, options)) = tickets else {
            debug!(operation = "refresh_all", "already loading; skipped");
            return;
        };
        futures_util::join!(
            self.run_containers(containers),
            self.run_performance(performance),
            self.run_filter_options(options, false),
        );
    }

    pub async fn refresh_containers(&self) {
        let ticket = self.update(|inner| {
            inner
                .model
                .can_refresh_data()
                .then(|| Self::begin_containers(inner))
        });
        match ticket {
            Some(t) => self.run_containers(t).await,
            None => debug!(operation = "refresh_containers", "already loading; skipped"),
        }
    }

    pub async fn refresh_performance(&self) {
        let ticket = self.update(|inner| {
            inner
                .model
                .can_refresh_data()
                .then(|| Self::begin_performance(inner))
        });
        match ticket {
            Some(t) => self.run_performance(t).await,
            None => debug!(operation = "refresh_performance", "already loading; skipped"),
        }
    }

    /// Applies a state change and refetches containers, superseding any fetch in flight.
    async fn refetch_containers_after(&self, change: impl FnOnce(&mut Inner)) {
        let ticket = self.update(|inner| {
            change(inner);
            Self::begin_containers(inner)
        });
        self.run_containers(ticket).await;
    }

    async fn refetch_performance_after(&self, change: impl FnOnce(&mut Inner)) {
        let ticket = self.update(|inner| {
            change(inner);
            Self::begin_performance(inner)
        });
        self.run_performance(ticket).await;
    }

    // ---- filters, pagination, sort ----

    /// Replaces the filters and goes back to page 1.
    pub async fn apply_filters(&self, filters: FiltersDomainModel) {
        self.refetch_containers_after(|inner| inner.install_filters(filters))
            .await;
    }

    /// Validates `state` against the loaded options before applying it.
    pub async fn apply_filter_state(&self, state: FilterState) -> Result<(), FilterError> {
        let ticket = self.update(|inner| {
            let filters = inner.model.filters().with_filter_state(state)?;
            inner.install_filters(filters);
            Ok::<_, FilterError>(Self::begin_containers(inner))
        })?;
        self.run_containers(ticket).await;
        Ok(())
    }

    /// Sets the search term on the current filters.
    pub async fn apply_search(&self, term: &str) {
        self.refetch_containers_after(|inner| {
            let filters = inner.model.filters().with_search(term);
            inner.install_filters(filters);
        })
        .await;
    }

    pub async fn clear_filters(&self) {
        self.refetch_containers_after(|inner| {
            let filters = inner.model.filters().clear_all();
            inner.install_filters(filters);
        })
        .await;
    }

    pub async fn change_page(&self, page: u32) {
        self.refetch_containers_after(|inner| {
            let pagination = inner.model.pagination().with_page(page);
            inner.model = inner.model.with_pagination(pagination);
        })
        .await;
    }

    pub async fn change_page_size(&self, page_size: u32) {
        self.refetch_containers_after(|inner| {
            let pagination = inner.model.pagination().with_page_size(page_size);
            inner.model = inner.model.with_pagination(pagination);
        })
        .await;
    }

    pub async fn change_sort(&self, field: Option<String>, order: Option<SortOrder>) {
        self.refetch_containers_after(|inner| {
            inner.sort = field;
            inner.order = order;
        })
        .await;
    }

    // ---- performance card ----

    pub async fn change_time_range(&self, range: TimeRange) {
        self.refetch_performance_after(|inner| {
            inner.model = inner.model.with_time_range(range);
        })
        .await;
    }

    pub async fn select_container_type(&self, selected: ContainerTypeFilter) {
        self.refetch_performance_after(|inner| {
            inner.model = inner.model.with_container_type(selected);
        })
        .await;
    }

    // ---- modals & selection ----

    pub fn open_create_modal(&self) {
        self.update(|inner| inner.ui.modals.create_open = true);
    }

    pub fn open_edit_modal(&self, id: i64) {
        self.update(|inner| inner.ui.modals.edit_target = Some(id));
    }

    pub fn open_delete_modal(&self, id: i64) {
        self.update(|inner| inner.ui.modals.delete_target = Some(id));
    }

    pub fn open_shutdown_modal(&self, id: i64) {
        self.update(|inner| inner.ui.modals.shutdown_target = Some(id));
    }

    pub fn close_modals(&self) {
        self.update(|inner| inner.ui.modals = ModalState::default());
    }

    pub fn select_container(&self, id: Option<i64>) {
        self.update(|inner| inner.ui.selected_container = id);
    }

    // ---- actions ----

    fn begin_action(&self, kind: ActionKind) -> ActionResult<ActionGuard<'_>> {
        let acquired = self.update(|inner| {
            if inner.ui.actions.get(kind) {
                return false;
            }
            inner.ui.actions.set(kind, true);
            true
        });
        if !acquired {
            debug!(action = kind.label(), "rejected: already in progress");
            return Err(ActionError::InProgress(kind));
        }
        Ok(ActionGuard { vm: self, kind })
    }

    /// Closes the action's modal and reloads the list so it reflects the change.
    async fn finish_action(&self, kind: ActionKind, deleted: Option<i64>) {
        self.update(|inner| {
            inner.ui.close_modal_for(kind);
            if deleted.is_some() && inner.ui.selected_container == deleted {
                inner.ui.selected_container = None;
            }
        });
        self.refetch_containers_after(|_| {}).await;
    }

    pub async fn create_container(&self, draft: ContainerDraft) -> ActionResult<ContainerDomainModel> {
        let _guard = self.begin_action(ActionKind::Create)?;
        match self.service.create_container(&draft).await {
            Ok(raw) => {
                let created = ContainerDomainModel::from_api_response(raw);
                info!(container_id = created.id(), "container created");
                self.finish_action(ActionKind::Create, None).await;
                Ok(created)
            }
            Err(e) => {
                warn!(error = %e, operation = "create_container", "create failed");
                Err(ActionError::Service(e.to_string()))
            }
        }
    }

    pub async fn update_container(
        &self,
        id: i64,
        update: ContainerUpdate,
    ) -> ActionResult<ContainerDomainModel> {
        let _guard = self.begin_action(ActionKind::Update)?;
        match self.service.update_container(id, &update).await {
            Ok(raw) => {
                self.finish_action(ActionKind::Update, None).await;
                Ok(ContainerDomainModel::from_api_response(raw))
            }
            Err(e) => {
                warn!(error = %e, operation = "update_container", container_id = id, "update failed");
                Err(ActionError::Service(e.to_string()))
            }
        }
    }

    pub async fn delete_container(&self, id: i64) -> ActionResult {
        let _guard = self.begin_action(ActionKind::Delete)?;
        match self.service.delete_container(id).await {
            Ok(()) => {
                info!(container_id = id, "container deleted");
                self.finish_action(ActionKind::Delete, Some(id)).await;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, operation = "delete_container", container_id = id, "delete failed");
                Err(ActionError::Service(e.to_string()))
            }
        }
    }

    pub async fn shutdown_container(&self, id: i64, reason: Option<String>) -> ActionResult {
        let _guard = self.begin_action(ActionKind::Shutdown)?;
        match self.service.shutdown_container(id, reason.as_deref()).await {
            Ok(()) => {
                info!(container_id = id, "container shut down");
                self.finish_action(ActionKind::Shutdown, None).await;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, operation = "shutdown_container", container_id = id, "shutdown failed");
                Err(ActionError::Service(e.to_string()))
            }
        }
    }

    /// Per-item failures are reported in the outcome; the list is reloaded if anything succeeded.
    pub async fn batch_update_containers(
        &self,
        updates: Vec<(i64, ContainerUpdate)>,
    ) -> ActionResult<BatchOutcome> {
        let _guard = self.begin_action(ActionKind::BatchUpdate)?;
        let outcome = self.service.batch_update_containers(&updates).await;
        if !outcome.failures.is_empty() {
            warn!(
                failed = outcome.failures.len(),
                succeeded = outcome.successes.len(),
                "batch update partially failed"
            );
        }
        if !outcome.successes.is_empty() {
            self.finish_action(ActionKind::BatchUpdate, None).await;
        }
        Ok(outcome)
    }
}

impl Drop for DashboardViewModel {
    fn drop(&mut self) {
        self.dispose();
    }
}
