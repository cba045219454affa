//! Output module for console output and progress.
//!
//! Provides:
//! - Colored console output
//! - Progress bars
//! - Statistics and failure reporting

pub mod console;
pub mod progress;
pub mod stats;

pub use console::{
    print_banner, print_config_summary, print_credentials_guidance, print_error, print_info,
    print_success, print_warning,
};
pub use progress::{create_item_bar, create_spinner};
pub use stats::{print_failure_summary, print_global_stats, print_subscription_stats};
