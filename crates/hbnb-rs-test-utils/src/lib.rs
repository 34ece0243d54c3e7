//! Test helpers shared across hbnb crates.

pub mod clock;
pub mod storage;

pub use clock::{ManualClock, fixed_time};
pub use storage::TempStorage;
