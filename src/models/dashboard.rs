// Dashboard aggregate root: containers, performance, filters, pagination + per-slice status

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{
    ContainerDomainModel, ContainerStatus, ContainerType, FiltersDomainModel,
    PaginationDomainModel, PerformanceMetricsDomainModel, TimeRange,
};

/// Independently fetched piece of dashboard state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Slice {
    Containers,
    Performance,
    FilterOptions,
}

impl Slice {
    pub const ALL: [Slice; 3] = [Slice::Containers, Slice::Performance, Slice::FilterOptions];

    pub fn as_str(&self) -> &'static str {
        match self {
            Slice::Containers => "containers",
            Slice::Performance => "performance",
            Slice::FilterOptions => "filterOptions",
        }
    }
}

/// Loading flag per slice. One field per slice, so no slice can be missing or duplicated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadingState {
    pub containers: bool,
    pub performance: bool,
    pub filter_options: bool,
}

impl LoadingState {
    pub fn get(&self, slice: Slice) -> bool {
        match slice {
            Slice::Containers => self.containers,
            Slice::Performance => self.performance,
            Slice::FilterOptions => self.filter_options,
        }
    }

    fn slot(&mut self, slice: Slice) -> &mut bool {
        match slice {
            Slice::Containers => &mut self.containers,
            Slice::Performance => &mut self.performance,
            Slice::FilterOptions => &mut self.filter_options,
        }
    }

    pub fn any(&self) -> bool {
        self.containers || self.performance || self.filter_options
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorState {
    pub containers: Option<String>,
    pub performance: Option<String>,
    pub filter_options: Option<String>,
}

impl ErrorState {
    pub fn get(&self, slice: Slice) -> Option<&str> {
        match slice {
            Slice::Containers => self.containers.as_deref(),
            Slice::Performance => self.performance.as_deref(),
            Slice::FilterOptions => self.filter_options.as_deref(),
        }
    }

    fn slot(&mut self, slice: Slice) -> &mut Option<String> {
        match slice {
            Slice::Containers => &mut self.containers,
            Slice::Performance => &mut self.performance,
            Slice::FilterOptions => &mut self.filter_options,
        }
    }

    pub fn any(&self) -> bool {
        Slice::ALL.iter().any(|s| self.get(*s).is_some())
    }
}

/// Performance-card toggle; applied client-side on top of the server-filtered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerTypeFilter {
    #[default]
    All,
    Physical,
    Virtual,
}

impl ContainerTypeFilter {
    pub fn matches(&self, type_: ContainerType) -> bool {
        match self {
            ContainerTypeFilter::All => true,
            ContainerTypeFilter::Physical => type_ == ContainerType::Physical,
            ContainerTypeFilter::Virtual => type_ == ContainerType::Virtual,
        }
    }

    /// `None` for `All`, as expected by the metrics endpoint.
    pub fn as_container_type(&self) -> Option<ContainerType> {
        match self {
            ContainerTypeFilter::All => None,
            ContainerTypeFilter::Physical => Some(ContainerType::Physical),
            ContainerTypeFilter::Virtual => Some(ContainerType::Virtual),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardState {
    pub containers: Vec<ContainerDomainModel>,
    pub performance: Option<PerformanceMetricsDomainModel>,
    pub filters: FiltersDomainModel,
    pub pagination: PaginationDomainModel,
    pub loading: LoadingState,
    pub errors: ErrorState,
    pub selected_container_type: ContainerTypeFilter,
    pub selected_time_range: TimeRange,
}

/// Client-side container-type stage. The server-side stage is the type field of
/// [`FiltersDomainModel`]; both apply.
pub fn filter_by_container_type(
    containers: &[ContainerDomainModel],
    selected: ContainerTypeFilter,
) -> Vec<ContainerDomainModel> {
    containers
        .iter()
        .filter(|c| selected.matches(c.container_type()))
        .cloned()
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardDomainModel {
    state: DashboardState,
}

impl Default for DashboardDomainModel {
    fn default() -> Self {
        Self::create_empty()
    }
}

impl DashboardDomainModel {
    pub fn create_empty() -> Self {
        Self {
            state: DashboardState {
                containers: Vec::new(),
                performance: None,
                filters: FiltersDomainModel::default(),
                pagination: PaginationDomainModel::default(),
                loading: LoadingState::default(),
                errors: ErrorState::default(),
                selected_container_type: ContainerTypeFilter::All,
                selected_time_range: TimeRange::default(),
            },
        }
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn containers(&self) -> &[ContainerDomainModel] {
        &self.state.containers
    }

    pub fn performance(&self) -> Option<&PerformanceMetricsDomainModel> {
        self.state.performance.as_ref()
    }

    pub fn filters(&self) -> &FiltersDomainModel {
        &self.state.filters
    }

    pub fn pagination(&self) -> &PaginationDomainModel {
        &self.state.pagination
    }

    pub fn with_containers(&self, containers: Vec<ContainerDomainModel>) -> Self {
        self.with(|s| s.containers = containers)
    }

    pub fn with_performance(&self, performance: PerformanceMetricsDomainModel) -> Self {
        self.with(|s| s.performance = Some(performance))
    }

    pub fn with_filters(&self, filters: FiltersDomainModel) -> Self {
        self.with(|s| s.filters = filters)
    }

    pub fn with_pagination(&self, pagination: PaginationDomainModel) -> Self {
        self.with(|s| s.pagination = pagination)
    }

    pub fn with_container_type(&self, selected: ContainerTypeFilter) -> Self {
        self.with(|s| s.selected_container_type = selected)
    }

    pub fn with_time_range(&self, range: TimeRange) -> Self {
        self.with(|s| s.selected_time_range = range)
    }

    /// Merges the given flags; slices not named keep their value.
    pub fn with_loading(&self, partial: impl IntoIterator<Item = (Slice, bool)>) -> Self {
        self.with(|s| {
            for (slice, loading) in partial {
                *s.loading.slot(slice) = loading;
            }
        })
    }

    pub fn with_error(&self, partial: impl IntoIterator<Item = (Slice, Option<String>)>) -> Self {
        self.with(|s| {
            for (slice, error) in partial {
                *s.errors.slot(slice) = error;
            }
        })
    }

    pub fn clear_error(&self, slice: Slice) -> Self {
        self.with_error([(slice, None)])
    }

    pub fn is_loading(&self, slice: Slice) -> bool {
        self.state.loading.get(slice)
    }

    pub fn error(&self, slice: Slice) -> Option<&str> {
        self.state.errors.get(slice)
    }

    pub fn can_refresh_data(&self) -> bool {
        !self.state.loading.any()
    }

    pub fn get_filtered_containers(&self) -> Vec<ContainerDomainModel> {
        filter_by_container_type(&self.state.containers, self.state.selected_container_type)
    }

    pub fn total_containers_count(&self) -> usize {
        self.state.containers.len()
    }

    pub fn active_containers_count(&self) -> usize {
        self.state.containers.iter().filter(|c| c.is_active()).count()
    }

    pub fn containers_with_alerts_count(&self) -> usize {
        self.state
            .containers
            .iter()
            .filter(|c| c.has_active_alerts())
            .count()
    }

    pub fn critical_alerts_count(&self) -> usize {
        self.state
            .containers
            .iter()
            .map(|c| c.critical_alerts_count())
            .sum()
    }

    /// Containers without metrics count as 0, not as missing.
    pub fn average_yield(&self) -> f64 {
        self.average_of(|c| c.metrics().yield_kg)
    }

    pub fn average_space_utilization(&self) -> f64 {
        self.average_of(|c| c.metrics().space_utilization_pct)
    }

    pub fn status_summary(&self) -> BTreeMap<ContainerStatus, usize> {
        self.state
            .containers
            .iter()
            .fold(BTreeMap::new(), |mut acc, c| {
                *acc.entry(c.status()).or_insert(0) += 1;
                acc
            })
    }

    fn average_of(&self, f: impl Fn(&ContainerDomainModel) -> f64) -> f64 {
        let containers = &self.state.containers;
        if containers.is_empty() {
            return 0.0;
        }
        containers.iter().map(f).sum::<f64>() / containers.len() as f64
    }

    fn with(&self, update: impl FnOnce(&mut DashboardState)) -> Self {
        let mut state = self.state.clone();
        update(&mut state);
        Self { state }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_dashboard_is_idle_and_error_free() {
        let d = DashboardDomainModel::create_empty();
        assert!(d.can_refresh_data());
        assert!(!d.state().errors.any());
        assert_eq!(d.average_yield(), 0.0);
        assert_eq!(d.average_space_utilization(), 0.0);
        assert!(d.status_summary().is_empty());
    }

    #[test]
    fn with_loading_merges_only_named_slices() {
        let d = DashboardDomainModel::create_empty()
            .with_loading([(Slice::Containers, true), (Slice::Performance, true)])
            .with_loading([(Slice::Performance, false)]);
        assert!(d.is_loading(Slice::Containers));
        assert!(!d.is_loading(Slice::Performance));
        assert!(!d.can_refresh_data());
    }

    #[test]
    fn clear_error_leaves_other_slices() {
        let d = DashboardDomainModel::create_empty()
            .with_error([
                (Slice::Containers, Some("boom".to_string())),
                (Slice::FilterOptions, Some("nope".to_string())),
            ])
            .clear_error(Slice::Containers);
        assert_eq!(d.error(Slice::Containers), None);
        assert_eq!(d.error(Slice::FilterOptions), Some("nope"));
    }

    #[test]
    fn slice_names_match_wire_keys() {
        assert_eq!(
            serde_json::to_string(&Slice::FilterOptions).unwrap(),
            "\"filterOptions\""
        );
        assert_eq!(Slice::FilterOptions.as_str(), "filterOptions");
    }
}
