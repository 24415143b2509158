// Domain models: immutable value objects built from API payloads

mod container;
mod dashboard;
mod filters;
mod pagination;
mod performance;
mod time_range;

pub use container::{
    Alert, AlertSeverity, ContainerDomainModel, ContainerMetrics, ContainerPayload,
    ContainerPurpose, ContainerStatus, ContainerType, Location,
};
pub use dashboard::{
    ContainerTypeFilter, DashboardDomainModel, DashboardState, ErrorState, LoadingState, Slice,
    filter_by_container_type,
};
pub use filters::{
    ApiFilters, FilterError, FilterOptions, FilterState, FiltersDomainModel, SortOrder,
    TenantOption,
};
pub use pagination::{DEFAULT_PAGE_SIZE, PaginationDomainModel, PaginationPayload};
pub use performance::{
    ChartPoint, PerformanceMetricsDomainModel, PerformancePayload, SpaceUtilizationMetrics,
    TypeMetrics, YieldMetrics,
};
pub use time_range::{TimeRange, TimeRangeKind};
