//! Scan orchestration and scheduling.

pub mod scanner;
pub mod scheduler;

pub use scanner::{ScanReport, ScanTarget, Scanner};
pub use scheduler::{ScanScheduler, ScheduleError};
