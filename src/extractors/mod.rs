// src/extractors/mod.rs
pub mod blocks;
pub mod header;
pub mod merge;
pub mod rows;

// Re-export key extraction types for convenience
pub use blocks::{company_blocks, proposal_blocks, render_blocks, tabular_table};
pub use header::{extract_npx_headers, extract_tabular_header};
pub use merge::merge_continuations;
pub use rows::RowParser;
