//! Command-line argument definitions using clap.

use clap::Parser;
use std::path::PathBuf;

use crate::config::Config;

/// Subscription media downloader CLI.
#[derive(Parser, Debug)]
#[command(
    name = "of-downloader",
    version,
    about = "Download media from every active subscription",
    long_about = "A CLI tool to download photos, videos and audio from every active subscription.\n\n\
                  Widevine-protected videos are decrypted with ffmpeg when a device is configured."
)]
pub struct Args {
    /// Path to configuration file.
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    /// Base directory for downloads.
    #[arg(short = 'd', long = "directory")]
    pub download_directory: Option<PathBuf>,

    /// Numeric account id (auth_id cookie).
    #[arg(long = "identity-id", env = "OF_IDENTITY_ID")]
    pub identity_id: Option<String>,

    /// Browser user agent string.
    #[arg(short = 'a', long = "user-agent", env = "OF_USER_AGENT")]
    pub user_agent: Option<String>,

    /// Session cookie (sess).
    #[arg(short = 's', long = "session-token", env = "OF_SESSION_TOKEN")]
    pub session_token: Option<String>,

    /// Client token (x-bc header).
    #[arg(short = 'x', long = "client-token", env = "OF_CLIENT_TOKEN")]
    pub client_token: Option<String>,

    /// Dynamic signing rules JSON file.
    #[arg(long)]
    pub rules: Option<PathBuf>,

    /// Fetch the signing rules from this URL instead of the local file.
    #[arg(long = "rules-url")]
    pub rules_url: Option<String>,

    /// ffmpeg binary used for protected media.
    #[arg(long)]
    pub ffmpeg: Option<PathBuf>,

    /// Hide progress bars.
    #[arg(long, short)]
    pub quiet: bool,

    /// Enable debug logging.
    #[arg(long)]
    pub debug: bool,
}

impl Args {
    /// Merge CLI arguments into an existing config, overriding where specified.
    pub fn merge_into_config(&self, config: &mut Config) {
        // Credentials
        if let Some(identity_id) = &self.identity_id {
            config.auth.identity_id = identity_id.clone();
        }

        if let Some(user_agent) = &self.user_agent {
            config.auth.user_agent = user_agent.clone();
        }

        if let Some(session_token) = &self.session_token {
            config.auth.session_token = session_token.clone();
        }

        if let Some(client_token) = &self.client_token {
            config.auth.client_token = client_token.clone();
        }

        // Options
        if let Some(dir) = &self.download_directory {
            config.options.download_directory = dir.clone();
        }

        if let Some(rules) = &self.rules {
            config.options.dynamic_rules = rules.clone();
        }

        if let Some(url) = &self.rules_url {
            config.options.dynamic_rules_url = Some(url.clone());
        }

        if let Some(ffmpeg) = &self.ffmpeg {
            config.options.ffmpeg_path = ffmpeg.clone();
        }
    }
}
