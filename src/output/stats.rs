//! Statistics reporting.

use console::style;

use crate::download::{GlobalState, ItemFailure, SubscriptionState};

/// Failures listed individually before the summary truncates.
const MAX_LISTED_FAILURES: usize = 20;

/// Print statistics for a single subscription.
pub fn print_subscription_stats(state: &SubscriptionState) {
    let report = &state.report;

    println!();
    println!(
        "{}",
        style(format!("Statistics for {} ({}):", state.username, state.user_id)).bold()
    );
    println!("  Posts:       {}", state.posts);
    println!("  Media:       {}", state.media);
    println!("  Downloaded:  {}", report.downloaded);
    println!("  Skipped:     {} (already complete)", report.skipped);
    if report.unavailable > 0 {
        println!("  Unavailable: {}", report.unavailable);
    }
    if !report.failures.is_empty() {
        println!("  Failed:      {}", style(report.failures.len()).red());
    }
}

/// Print global statistics across all subscriptions.
pub fn print_global_stats(state: &GlobalState) {
    println!();
    println!("{}", style("═".repeat(50)).dim());
    println!("{}", style("Global Statistics:").bold());
    println!("  Subscriptions processed: {}", state.subscriptions_processed);
    if !state.subscriptions_failed.is_empty() {
        println!(
            "  Subscriptions failed:    {}",
            style(state.subscriptions_failed.len()).red()
        );
    }
    println!("  Downloaded:  {}", state.downloaded);
    println!("  Skipped:     {} (already complete)", state.skipped);
    println!("  Unavailable: {}", state.unavailable);
    println!("  Failed:      {}", state.failures.len());
    println!("{}", style("═".repeat(50)).dim());

    print_failure_summary(&state.failures, &state.subscriptions_failed);
}

/// List failed subscriptions and items.
pub fn print_failure_summary(items: &[ItemFailure], subscriptions: &[(String, String)]) {
    if items.is_empty() && subscriptions.is_empty() {
        return;
    }

    println!();
    println!("{}", style("Failures:").red().bold());
    for (username, error) in subscriptions {
        println!("  {} {}: {}", style("subscription").dim(), username, error);
    }
    for failure in items.iter().take(MAX_LISTED_FAILURES) {
        println!(
            "  {} {}/{}: {}",
            style("media").dim(),
            failure.author_id,
            failure.media_id,
            failure.error
        );
    }
    if items.len() > MAX_LISTED_FAILURES {
        println!("  ... and {} more", items.len() - MAX_LISTED_FAILURES);
    }
}
