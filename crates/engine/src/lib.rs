pub mod config;
pub mod history;
pub mod lifecycle;
pub mod shutdown;
pub mod source;
pub mod stats;

pub use config::{EngineConfig, SourceConfig};
pub use history::{HistoryBuffer, Snapshot};
pub use lifecycle::{Engine, EngineHandle};
pub use shutdown::Shutdown;
pub use source::{DataSource, Feed, SourceEvent};
pub use stats::{SignalCounts, Statistics};
