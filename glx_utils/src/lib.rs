pub mod logging;
mod options;

pub use logging::{init_logging, LoggingConfig};
pub use options::OptExt;
