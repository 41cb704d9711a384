//! EVRoute CLI - command line tools for EV route planning.
//!
//! This crate backs the `evroute` binary:
//! - history: local saved-route file
//! - report: plain-text rendering of plans and station lists

pub mod history;
pub mod report;

pub use history::{history_path, load_history, save_history};
pub use report::{format_duration, format_plan, format_stations};
