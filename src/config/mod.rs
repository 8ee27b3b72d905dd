pub mod report_config;

pub use report_config::ReportConfig;
