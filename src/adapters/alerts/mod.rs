//! Alert sink adapters.
//!
//! - `TracingAlertSink` - Writes alerts to the log
//! - `InMemoryAlertSink` - Collects alerts for display and tests

mod in_memory;
mod tracing_sink;

pub use in_memory::InMemoryAlertSink;
pub use tracing_sink::TracingAlertSink;
