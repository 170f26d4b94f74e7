//! Clock adapters.

mod manual;
mod system;

pub use manual::ManualClock;
pub use system::SystemClock;
