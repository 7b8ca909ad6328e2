// src/api/mod.rs
pub mod client;
pub mod models;

pub use client::{fetch_all, HttpPageSource};
pub use models::{flatten_record, present_columns};
