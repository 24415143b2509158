// Farming container models: API payload + immutable domain model

use serde::{Deserialize, Serialize};

/// Physical rack or virtual (simulated) container; serializes to lowercase JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerType {
    Physical,
    Virtual,
}

impl ContainerType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerType::Physical => "physical",
            ContainerType::Virtual => "virtual",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerPurpose {
    Development,
    Research,
    Production,
    #[serde(other)]
    Other,
}

impl ContainerPurpose {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerPurpose::Development => "development",
            ContainerPurpose::Research => "research",
            ContainerPurpose::Production => "production",
            ContainerPurpose::Other => "other",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerStatus {
    Created,
    Active,
    Maintenance,
    Inactive,
    Error,
}

impl ContainerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerStatus::Created => "created",
            ContainerStatus::Active => "active",
            ContainerStatus::Maintenance => "maintenance",
            ContainerStatus::Inactive => "inactive",
            ContainerStatus::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertSeverity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: i64,
    pub active: bool,
    pub severity: AlertSeverity,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerMetrics {
    #[serde(default)]
    pub yield_kg: f64,
    #[serde(default)]
    pub space_utilization_pct: f64,
    #[serde(default)]
    pub growth_rate: f64,
    #[serde(default)]
    pub health_score: f64,
}

/// Container as returned by the farm API. Optional sub-objects may be absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerPayload {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub type_: ContainerType,
    pub tenant_id: i64,
    pub purpose: ContainerPurpose,
    pub status: ContainerStatus,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub alerts: Option<Vec<Alert>>,
    #[serde(default)]
    pub seed_types: Option<Vec<String>>,
    #[serde(default)]
    pub metrics: Option<ContainerMetrics>,
    pub created_at: String,
    pub updated_at: String,
}

/// Immutable view of one farming container.
///
/// Only built through [`ContainerDomainModel::from_api_response`]; an updated
/// container replaces the whole instance with a fresh one from the service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContainerDomainModel {
    id: i64,
    name: String,
    #[serde(rename = "type")]
    type_: ContainerType,
    tenant_id: i64,
    purpose: ContainerPurpose,
    status: ContainerStatus,
    location: Location,
    alerts: Vec<Alert>,
    seed_types: Vec<String>,
    metrics: ContainerMetrics,
    created_at: String,
    updated_at: String,
}

impl ContainerDomainModel {
    /// Missing location, alerts, seed types and metrics fall back to empty/zeroed values.
    pub fn from_api_response(raw: ContainerPayload) -> Self {
        Self {
            id: raw.id,
            name: raw.name,
            type_: raw.type_,
            tenant_id: raw.tenant_id,
            purpose: raw.purpose,
            status: raw.status,
            location: raw.location.unwrap_or_default(),
            alerts: raw.alerts.unwrap_or_default(),
            seed_types: raw.seed_types.unwrap_or_default(),
            metrics: raw.metrics.unwrap_or_default(),
            created_at: raw.created_at,
            updated_at: raw.updated_at,
        }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn container_type(&self) -> ContainerType {
        self.type_
    }

    pub fn tenant_id(&self) -> i64 {
        self.tenant_id
    }

    pub fn purpose(&self) -> ContainerPurpose {
        self.purpose
    }

    pub fn status(&self) -> ContainerStatus {
        self.status
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn seed_types(&self) -> &[String] {
        &self.seed_types
    }

    pub fn metrics(&self) -> &ContainerMetrics {
        &self.metrics
    }

    pub fn created_at(&self) -> &str {
        &self.created_at
    }

    pub fn updated_at(&self) -> &str {
        &self.updated_at
    }

    pub fn is_physical(&self) -> bool {
        self.type_ == ContainerType::Physical
    }

    pub fn is_virtual(&self) -> bool {
        self.type_ == ContainerType::Virtual
    }

    pub fn is_active(&self) -> bool {
        self.status == ContainerStatus::Active
    }

    pub fn has_active_alerts(&self) -> bool {
        self.alerts.iter().any(|a| a.active)
    }

    pub fn active_alerts_count(&self) -> usize {
        self.alerts.iter().filter(|a| a.active).count()
    }

    pub fn critical_alerts_count(&self) -> usize {
        self.alerts
            .iter()
            .filter(|a| a.active && a.severity == AlertSeverity::Critical)
            .count()
    }

    /// "City, Country" when known; empty otherwise.
    pub fn display_location(&self) -> String {
        [self.location.city.as_deref(), self.location.country.as_deref()]
            .into_iter()
            .flatten()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
