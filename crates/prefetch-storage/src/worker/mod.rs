//! Single-writer worker: one dedicated thread owns the connection and the
//! mirror, and executes commands from an unbounded crossbeam channel in
//! submission order.

pub mod commands;
pub mod completion;
pub mod processor;

pub use commands::StoreCommand;
pub use completion::Completion;
pub use processor::{StoreWorker, WorkerStats};
