//! Console output utilities.

use console::style;

/// Print an info message.
pub fn print_info(message: &str) {
    println!("{} {}", style("INFO").cyan().bold(), message);
}

/// Print a success message.
pub fn print_success(message: &str) {
    println!("{} {}", style("OK").green().bold(), message);
}

/// Print a warning message.
pub fn print_warning(message: &str) {
    println!("{} {}", style("WARN").yellow().bold(), message);
}

/// Print an error message.
pub fn print_error(message: &str) {
    eprintln!("{} {}", style("ERROR").red().bold(), message);
}

/// Print the application banner.
pub fn print_banner() {
    let banner = r#"
╔═══════════════════════════════════════════════════════╗
║     of-downloader                                     ║
║     Subscription media, plain and protected           ║
╚═══════════════════════════════════════════════════════╝
"#;
    println!("{}", style(banner).cyan());
}

/// Print configuration summary.
pub fn print_config_summary(download_dir: &str, api_base: &str, drm_enabled: bool) {
    println!();
    println!("{}", style("Configuration:").bold());
    println!("  Directory: {}", download_dir);
    println!("  API:       {}", api_base);
    println!(
        "  Widevine:  {}",
        if drm_enabled {
            style("device loaded").green()
        } else {
            style("no device (protected media will fail)").yellow()
        }
    );
    println!();
}

/// Print the steps to fill in a freshly written or incomplete config.
pub fn print_credentials_guidance(config_path: &str) {
    println!();
    println!("{}", style("Credentials required").bold());
    println!("  Edit {} and fill in the [auth] table:", config_path);
    println!("    identity_id    value of the auth_id cookie");
    println!("    user_agent     your browser's User-Agent");
    println!("    session_token  value of the sess cookie");
    println!("    client_token   value of the x-bc request header");
    println!("  Copy them from a logged-in browser session (developer tools, network tab).");
    println!();
}
