//! openhub daemon runtime: the timed loop that drives synchronization passes.

mod error;
mod runtime;

pub use error::DaemonError;
pub use runtime::{init_tracing, run, schedule, start_blocking};
