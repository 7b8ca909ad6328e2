// src/report/mod.rs
pub mod format;
pub mod join;
pub mod models;
pub mod pipeline;

pub use format::ReportFormat;
pub use join::left_join;
pub use pipeline::{parse_report, table_blocks, IdStrategy};
