//! Commands accepted by the store worker.

use prefetch_core::types::{
    PageAggregate, PrefetchDataMap, PrefetchKeyType, RedirectAggregate, RedirectDataMap,
};

use super::completion::Responder;
use super::processor::WorkerStats;

pub type DataMaps = (PrefetchDataMap, PrefetchDataMap);
pub type RedirectMaps = (RedirectDataMap, RedirectDataMap);

/// A unit of work for the worker. Executed strictly in submission order.
#[derive(Debug)]
pub enum StoreCommand {
    GetAllData(Responder<DataMaps>),
    GetData {
        key: String,
        key_type: PrefetchKeyType,
        reply: Responder<Option<PageAggregate>>,
    },
    GetAllRedirectData(Responder<RedirectMaps>),
    UpdateData {
        url: PageAggregate,
        host: PageAggregate,
        reply: Responder<()>,
    },
    UpdateRedirectData {
        url: RedirectAggregate,
        host: RedirectAggregate,
        reply: Responder<()>,
    },
    DeleteData {
        urls: Vec<String>,
        hosts: Vec<String>,
        reply: Responder<()>,
    },
    DeleteRedirectData {
        urls: Vec<String>,
        hosts: Vec<String>,
        reply: Responder<()>,
    },
    DeleteSingleDataPoint {
        key: String,
        key_type: PrefetchKeyType,
        reply: Responder<()>,
    },
    DeleteSingleRedirectDataPoint {
        key: String,
        key_type: PrefetchKeyType,
        reply: Responder<()>,
    },
    DeleteAllData(Responder<()>),
    Stats(Responder<WorkerStats>),
    /// Completes once every earlier command has run.
    Flush(Responder<()>),
    Shutdown,
}

impl StoreCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::GetAllData(_) => "get_all_data",
            Self::GetData { .. } => "get_data",
            Self::GetAllRedirectData(_) => "get_all_redirect_data",
            Self::UpdateData { .. } => "update_data",
            Self::UpdateRedirectData { .. } => "update_redirect_data",
            Self::DeleteData { .. } => "delete_data",
            Self::DeleteRedirectData { .. } => "delete_redirect_data",
            Self::DeleteSingleDataPoint { .. } => "delete_single_data_point",
            Self::DeleteSingleRedirectDataPoint { .. } => "delete_single_redirect_data_point",
            Self::DeleteAllData(_) => "delete_all_data",
            Self::Stats(_) => "stats",
            Self::Flush(_) => "flush",
            Self::Shutdown => "shutdown",
        }
    }
}
