//! Row-level access to the predictor tables.

pub mod aggregate_rows;

use prefetch_core::types::PrefetchKeyType;

/// One of the four predictor data tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    UrlResources,
    HostResources,
    UrlRedirects,
    HostRedirects,
}

impl Table {
    pub const ALL: [Table; 4] = [
        Table::UrlResources,
        Table::HostResources,
        Table::UrlRedirects,
        Table::HostRedirects,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::UrlResources => "url_resource_data",
            Self::HostResources => "host_resource_data",
            Self::UrlRedirects => "url_redirect_data",
            Self::HostRedirects => "host_redirect_data",
        }
    }

    pub fn resources(key_type: PrefetchKeyType) -> Self {
        match key_type {
            PrefetchKeyType::Url => Self::UrlResources,
            PrefetchKeyType::Host => Self::HostResources,
        }
    }

    pub fn redirects(key_type: PrefetchKeyType) -> Self {
        match key_type {
            PrefetchKeyType::Url => Self::UrlRedirects,
            PrefetchKeyType::Host => Self::HostRedirects,
        }
    }

    pub fn key_type(self) -> PrefetchKeyType {
        match self {
            Self::UrlResources | Self::UrlRedirects => PrefetchKeyType::Url,
            Self::HostResources | Self::HostRedirects => PrefetchKeyType::Host,
        }
    }
}
