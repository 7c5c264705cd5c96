//! Tubescribe CLI entry point.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use tubescribe::cli::{commands, Cli, Commands};
use tubescribe::config::{GeneralSettings, Settings};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // The config command must work even when the file on disk does not validate
    if let Commands::Config { action } = &cli.command {
        init_logging(cli.verbose, &GeneralSettings::default().log_level);
        return commands::run_config(action, cli.config.as_deref());
    }

    // Load configuration first so general.log_level can apply
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    init_logging(cli.verbose, &settings.general.log_level);

    match &cli.command {
        Commands::Doctor => {
            commands::run_doctor(&settings).await?;
        }

        Commands::Transcribe {
            url,
            language,
            output,
            format,
        } => {
            commands::run_transcribe(url, language.as_deref(), output.clone(), format, settings)
                .await?;
        }

        Commands::Chat {
            message,
            video,
            transcript_file,
        } => {
            commands::run_chat(message, video.as_deref(), transcript_file.as_deref(), settings)
                .await?;
        }

        Commands::Whisper { url } => {
            commands::run_whisper(url, settings).await?;
        }

        Commands::Serve { host, port } => {
            commands::run_serve(host.clone(), *port, settings).await?;
        }

        // Handled above
        Commands::Config { .. } => {}
    }

    Ok(())
}

fn init_logging(verbose: u8, configured: &str) {
    let log_level = match verbose {
        0 => configured,
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("tubescribe={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}
