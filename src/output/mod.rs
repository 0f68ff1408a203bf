//! Terminal output formatting
//!
//! Display utilities for CLI results and pretty-printing.

pub mod display;
pub mod formatters;

pub use display::{
    print_backup_report, print_cleanup_report, print_lookup_result, print_stats,
    print_validation_report,
};
