// Aggregate performance metrics (physical vs virtual) for one time window

use serde::{Deserialize, Serialize};

use super::{ContainerType, TimeRange};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YieldMetrics {
    #[serde(default)]
    pub average: f64,
    #[serde(default)]
    pub total: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpaceUtilizationMetrics {
    #[serde(default)]
    pub average: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub date: String,
    pub value: f64,
    #[serde(default)]
    pub is_current_period: bool,
    #[serde(default)]
    pub is_future: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeMetrics {
    #[serde(default)]
    pub container_count: u32,
    #[serde(default, rename = "yield")]
    pub yield_: YieldMetrics,
    #[serde(default)]
    pub space_utilization: SpaceUtilizationMetrics,
    #[serde(default)]
    pub chart: Vec<ChartPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerformancePayload {
    #[serde(default)]
    pub physical: TypeMetrics,
    #[serde(default, rename = "virtual")]
    pub virtual_: TypeMetrics,
    pub time_range: TimeRange,
    pub generated_at: String,
}

/// Immutable performance snapshot; replaced wholesale on every metrics refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceMetricsDomainModel {
    physical: TypeMetrics,
    #[serde(rename = "virtual")]
    virtual_: TypeMetrics,
    time_range: TimeRange,
    generated_at: String,
}

impl PerformanceMetricsDomainModel {
    pub fn from_api_response(raw: PerformancePayload) -> Self {
        Self {
            physical: raw.physical,
            virtual_: raw.virtual_,
            time_range: raw.time_range,
            generated_at: raw.generated_at,
        }
    }

    pub fn physical(&self) -> &TypeMetrics {
        &self.physical
    }

    pub fn virtual_metrics(&self) -> &TypeMetrics {
        &self.virtual_
    }

    pub fn metrics_for(&self, type_: ContainerType) -> &TypeMetrics {
        match type_ {
            ContainerType::Physical => &self.physical,
            ContainerType::Virtual => &self.virtual_,
        }
    }

    pub fn time_range(&self) -> &TimeRange {
        &self.time_range
    }

    pub fn generated_at(&self) -> &str {
        &self.generated_at
    }

    /// Saturates instead of overflowing on absurd server counts.
    pub fn total_containers(&self) -> u32 {
        self.physical
            .container_count
            .saturating_add(self.virtual_.container_count)
    }

    /// Share of physical containers; 0 when there are none at all.
    pub fn physical_ratio(&self) -> f64 {
        ratio(self.physical.container_count, self.total_containers())
    }

    pub fn virtual_ratio(&self) -> f64 {
        ratio(self.virtual_.container_count, self.total_containers())
    }

    pub fn total_yield(&self) -> f64 {
        self.physical.yield_.total + self.virtual_.yield_.total
    }

    pub fn current_period_point(&self, type_: ContainerType) -> Option<&ChartPoint> {
        self.metrics_for(type_)
            .chart
            .iter()
            .find(|p| p.is_current_period)
    }

    /// Chart points up to and including the current period.
    pub fn historical_points(&self, type_: ContainerType) -> Vec<&ChartPoint> {
        self.metrics_for(type_)
            .chart
            .iter()
            .filter(|p| !p.is_future)
            .collect()
    }
}

fn ratio(count: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}
