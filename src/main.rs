//! of-downloader - CLI entry point.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use of_downloader::{
    api::{OnlyFansApi, RequestSigner},
    cli::Args,
    config::{validate_auth, validate_config, Config, ConfigState, DynamicRules},
    download::{Downloader, MediaAcquirer},
    drm::{DecryptionPipeline, WidevineDevice},
    error::{exit_codes, Error, Result},
    fs::DownloadLayout,
    output::{
        create_spinner, print_banner, print_config_summary, print_credentials_guidance,
        print_error, print_global_stats, print_info, print_subscription_stats, print_success,
        print_warning,
    },
};

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => ExitCode::from(code as u8),
        Err(e) => {
            print_error(&format!("{}", e));
            match e {
                Error::Config(_)
                | Error::ConfigValidation { .. }
                | Error::MissingConfig(_)
                | Error::DynamicRules(_) => ExitCode::from(exit_codes::CONFIG_ERROR as u8),
                Error::Authentication(_) | Error::Api(_) | Error::Http(_) => {
                    ExitCode::from(exit_codes::API_ERROR as u8)
                }
                Error::Download(_) | Error::FFmpeg(_) | Error::FFmpegNotFound => {
                    ExitCode::from(exit_codes::DOWNLOAD_ERROR as u8)
                }
                _ => ExitCode::from(exit_codes::UNEXPECTED_ERROR as u8),
            }
        }
    }
}

async fn run() -> Result<i32> {
    // Parse CLI arguments
    let args = Args::parse();

    // Set up logging
    let log_level = if args.debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    fmt().with_env_filter(filter).with_target(false).init();

    print_banner();

    // Load configuration, writing a template on first run
    let config_path = args.config.clone();
    let mut config = match Config::load_or_init(&config_path)? {
        ConfigState::Loaded(config) => config,
        ConfigState::TemplateCreated(path) => {
            print_warning(&format!(
                "Configuration file not found, wrote a template to {}",
                path.display()
            ));
            print_credentials_guidance(&path.display().to_string());
            return Ok(exit_codes::SUCCESS);
        }
    };

    // Merge CLI arguments into config
    args.merge_into_config(&mut config);

    // Incomplete credentials get guidance rather than an error
    if let Err(Error::MissingConfig(field)) = validate_auth(&config.auth) {
        print_warning(&format!("Missing credential: {}", field));
        print_credentials_guidance(&config_path.display().to_string());
        return Ok(exit_codes::SUCCESS);
    }
    validate_config(&config)?;

    let rules = load_rules(&config).await?;
    let device = WidevineDevice::load_if_present(&config.drm)?.map(Arc::new);

    print_config_summary(
        &config.download_directory().display().to_string(),
        &config.options.api_base,
        device.is_some(),
    );

    // Initialize API client
    let signer = RequestSigner::new(config.auth.clone(), rules);
    let api = OnlyFansApi::new(&config.options.api_base, signer)?;

    let layout = DownloadLayout::new(config.download_directory());
    let decryptor =
        DecryptionPipeline::new(api.clone(), device, config.options.ffmpeg_path.clone());
    let acquirer = MediaAcquirer::new(api.clone(), layout, decryptor);
    let downloader = Downloader::new(
        api,
        acquirer,
        config.options.page_concurrency,
        config.options.download_concurrency,
    )
    .with_progress(!args.quiet);

    print_info("Fetching active subscriptions...");
    let global = downloader.run_all().await?;

    for state in &global.subscriptions {
        print_subscription_stats(state);
    }
    print_global_stats(&global);

    if global.has_failures() {
        print_warning("Some items failed; rerun to retry them.");
        return Ok(exit_codes::SOME_ITEMS_FAILED);
    }

    print_success("All subscriptions up to date.");
    Ok(exit_codes::SUCCESS)
}

/// Load the signing rules, from the configured URL when set.
async fn load_rules(config: &Config) -> Result<DynamicRules> {
    match &config.options.dynamic_rules_url {
        Some(url) => {
            let spinner = create_spinner("Fetching dynamic rules...");
            let client = reqwest::Client::new();
            let rules = DynamicRules::fetch(&client, url).await;
            spinner.finish_and_clear();
            rules
        }
        None => DynamicRules::load(&config.options.dynamic_rules),
    }
}
