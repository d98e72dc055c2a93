//! Per-resource statistics.

use serde::{Deserialize, Serialize};

/// Kind of sub-resource, as reported by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceCategory {
    Stylesheet,
    Script,
    Image,
    Font,
    Other,
}

impl ResourceCategory {
    /// Stylesheets, scripts and fonts delay first paint until they arrive.
    pub fn is_render_blocking(self) -> bool {
        matches!(self, Self::Stylesheet | Self::Script | Self::Font)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Stylesheet => "stylesheet",
            Self::Script => "script",
            Self::Image => "image",
            Self::Font => "font",
            Self::Other => "other",
        }
    }
}

/// Network request priority, lowest to highest.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum RequestPriority {
    Throttled,
    Idle,
    Lowest,
    Low,
    #[default]
    Medium,
    Highest,
}

/// Aggregate statistics of one sub-resource for one page-key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRecord {
    pub resource_url: String,
    pub resource_category: ResourceCategory,
    pub hit_count: u32,
    pub miss_count: u32,
    pub consecutive_miss_count: u32,
    /// 1-based average load position among the page's resources.
    pub average_position: f64,
    #[serde(default)]
    pub priority: RequestPriority,
    #[serde(default)]
    pub has_validators: bool,
    #[serde(default)]
    pub always_revalidate: bool,
}

impl ResourceRecord {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        resource_url: impl Into<String>,
        resource_category: ResourceCategory,
        hit_count: u32,
        miss_count: u32,
        consecutive_miss_count: u32,
        average_position: f64,
        priority: RequestPriority,
        has_validators: bool,
        always_revalidate: bool,
    ) -> Self {
        Self {
            resource_url: resource_url.into(),
            resource_category,
            hit_count,
            miss_count,
            consecutive_miss_count,
            average_position,
            priority,
            has_validators,
            always_revalidate,
        }
    }

    /// Total number of visits that observed or expected this resource.
    pub fn observations(&self) -> u64 {
        u64::from(self.hit_count) + u64::from(self.miss_count)
    }

    /// A record with no observations carries no information and is never stored.
    pub fn has_observations(&self) -> bool {
        self.observations() > 0
    }
}
