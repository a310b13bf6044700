pub mod config;
pub mod error;
pub mod record;
pub mod sink;
pub mod types;

pub use config::{Config, LogFormat};
pub use error::{Error, Result};
pub use record::{parse_record, ParseError};
pub use sink::ExecutionSink;
pub use types::*;
