// Container list filters: available options + current selection

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{ContainerPurpose, ContainerStatus, ContainerType};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantOption {
    pub id: i64,
    pub name: String,
}

/// Universe of valid filter values, as returned by the filter-options endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterOptions {
    #[serde(default)]
    pub tenants: Vec<TenantOption>,
    #[serde(default)]
    pub purposes: Vec<ContainerPurpose>,
    #[serde(default)]
    pub statuses: Vec<ContainerStatus>,
    #[serde(default)]
    pub container_types: Vec<ContainerType>,
}

/// Current selection. Every field at its default means "no filter".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    #[serde(default)]
    pub search: String,
    #[serde(default, rename = "type")]
    pub container_type: Option<ContainerType>,
    #[serde(default)]
    pub tenant: Option<i64>,
    #[serde(default)]
    pub purpose: Option<ContainerPurpose>,
    #[serde(default)]
    pub status: Option<ContainerStatus>,
    #[serde(default)]
    pub has_alerts: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

/// Flat query-parameter shape of the container list endpoint; unset fields are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiFilters {
    pub page: u32,
    pub limit: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<SortOrder>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub container_type: Option<ContainerType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<ContainerPurpose>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<ContainerStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_alerts: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FilterError {
    #[error("unknown tenant id {0}")]
    UnknownTenant(i64),
    #[error("purpose '{}' is not an available option", .0.as_str())]
    UnknownPurpose(ContainerPurpose),
    #[error("status '{}' is not an available option", .0.as_str())]
    UnknownStatus(ContainerStatus),
    #[error("container type '{}' is not an available option", .0.as_str())]
    UnknownType(ContainerType),
}

/// Immutable filter model. Selections are checked against `options`, so a value
/// outside the universe is rejected instead of being applied.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FiltersDomainModel {
    options: FilterOptions,
    state: FilterState,
}

impl FiltersDomainModel {
    pub fn from_options(options: FilterOptions) -> Self {
        Self {
            options,
            state: FilterState::default(),
        }
    }

    pub fn options(&self) -> &FilterOptions {
        &self.options
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn is_valid_tenant(&self, id: i64) -> bool {
        self.options.tenants.iter().any(|t| t.id == id)
    }

    pub fn is_valid_purpose(&self, purpose: ContainerPurpose) -> bool {
        self.options.purposes.contains(&purpose)
    }

    pub fn is_valid_status(&self, status: ContainerStatus) -> bool {
        self.options.statuses.contains(&status)
    }

    pub fn is_valid_type(&self, type_: ContainerType) -> bool {
        self.options.container_types.contains(&type_)
    }

    pub fn with_search(&self, search: impl Into<String>) -> Self {
        self.with_state(FilterState {
            search: search.into(),
            ..self.state.clone()
        })
    }

    pub fn with_type(&self, type_: Option<ContainerType>) -> Result<Self, FilterError> {
        if let Some(t) = type_
            && !self.is_valid_type(t)
        {
            return Err(FilterError::UnknownType(t));
        }
        Ok(self.with_state(FilterState {
            container_type: type_,
            ..self.state.clone()
        }))
    }

    pub fn with_tenant(&self, tenant: Option<i64>) -> Result<Self, FilterError> {
        if let Some(id) = tenant
            && !self.is_valid_tenant(id)
        {
            return Err(FilterError::UnknownTenant(id));
        }
        Ok(self.with_state(FilterState {
            tenant,
            ..self.state.clone()
        }))
    }

    pub fn with_purpose(&self, purpose: Option<ContainerPurpose>) -> Result<Self, FilterError> {
        if let Some(p) = purpose
            && !self.is_valid_purpose(p)
        {
            return Err(FilterError::UnknownPurpose(p));
        }
        Ok(self.with_state(FilterState {
            purpose,
            ..self.state.clone()
        }))
    }

    pub fn with_status(&self, status: Option<ContainerStatus>) -> Result<Self, FilterError> {
        if let Some(s) = status
            && !self.is_valid_status(s)
        {
            return Err(FilterError::UnknownStatus(s));
        }
        Ok(self.with_state(FilterState {
            status,
            ..self.state.clone()
        }))
    }

    pub fn with_alerts_only(&self, has_alerts: bool) -> Self {
        self.with_state(FilterState {
            has_alerts,
            ..self.state.clone()
        })
    }

    /// Replaces the whole selection, validating every field against the options.
    pub fn with_filter_state(&self, state: FilterState) -> Result<Self, FilterError> {
        self.with_search(state.search)
            .with_alerts_only(state.has_alerts)
            .with_type(state.container_type)?
            .with_tenant(state.tenant)?
            .with_purpose(state.purpose)?
            .with_status(state.status)
    }

    /// Swaps in a fresh options universe; selections it no longer contains are dropped.
    pub fn with_options(&self, options: FilterOptions) -> Self {
        let next = Self::from_options(options);
        let s = &self.state;
        FiltersDomainModel {
            state: FilterState {
                search: s.search.clone(),
                container_type: s.container_type.filter(|t| next.is_valid_type(*t)),
                tenant: s.tenant.filter(|id| next.is_valid_tenant(*id)),
                purpose: s.purpose.filter(|p| next.is_valid_purpose(*p)),
                status: s.status.filter(|st| next.is_valid_status(*st)),
                has_alerts: s.has_alerts,
            },
            ..next
        }
    }

    pub fn clear_all(&self) -> Self {
        self.with_state(FilterState::default())
    }

    pub fn has_active_filters(&self) -> bool {
        self.active_filters_count() > 0
    }

    pub fn active_filters_count(&self) -> usize {
        let s = &self.state;
        [
            !s.search.trim().is_empty(),
            s.container_type.is_some(),
            s.tenant.is_some(),
            s.purpose.is_some(),
            s.status.is_some(),
            s.has_alerts,
        ]
        .into_iter()
        .filter(|active| *active)
        .count()
    }

    pub fn to_api_filters(
        &self,
        page: u32,
        limit: u32,
        sort: Option<&str>,
        order: Option<SortOrder>,
    ) -> ApiFilters {
        let s = &self.state;
        let search = s.search.trim();
        ApiFilters {
            page,
            limit,
            sort: sort.filter(|f| !f.is_empty()).map(str::to_string),
            order,
            search: (!search.is_empty()).then(|| search.to_string()),
            container_type: s.container_type,
            tenant: s.tenant,
            purpose: s.purpose,
            status: s.status,
            has_alerts: s.has_alerts.then_some(true),
        }
    }

    fn with_state(&self, state: FilterState) -> Self {
        Self {
            options: self.options.clone(),
            state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> FilterOptions {
        FilterOptions {
            tenants: vec![TenantOption {
                id: 1,
                name: "Acme Greens".into(),
            }],
            purposes: vec![ContainerPurpose::Research, ContainerPurpose::Production],
            statuses: vec![ContainerStatus::Active],
            container_types: vec![ContainerType::Physical, ContainerType::Virtual],
        }
    }

    #[test]
    fn invalid_tenant_is_rejected() {
        let f = FiltersDomainModel::from_options(options());
        assert_eq!(f.with_tenant(Some(99)), Err(FilterError::UnknownTenant(99)));
        assert!(f.with_tenant(Some(1)).is_ok());
    }

    #[test]
    fn whitespace_search_is_not_an_active_filter() {
        let f = FiltersDomainModel::from_options(options()).with_search("   ");
        assert!(!f.has_active_filters());
        assert_eq!(f.to_api_filters(1, 10, None, None).search, None);
    }

    #[test]
    fn each_with_changes_exactly_one_field() {
        let f = FiltersDomainModel::from_options(options())
            .with_purpose(Some(ContainerPurpose::Research))
            .unwrap();
        let g = f.with_alerts_only(true);
        assert_eq!(g.state().purpose, Some(ContainerPurpose::Research));
        assert!(g.state().has_alerts);
        assert!(!f.state().has_alerts);
        assert_eq!(g.active_filters_count(), 2);
    }

    #[test]
    fn with_options_drops_stale_selection() {
        let f = FiltersDomainModel::from_options(options())
            .with_tenant(Some(1))
            .unwrap()
            .with_search("basil");
        let g = f.with_options(FilterOptions::default());
        assert_eq!(g.state().tenant, None);
        assert_eq!(g.state().search, "basil");
    }
}
