pub mod inputs;
pub mod summary;

pub use inputs::{MaxDrawdown, ReportInputs};
pub use summary::{DrawdownLine, PerformanceReport, RatioLine, ReturnSource, WarmupSummary};
