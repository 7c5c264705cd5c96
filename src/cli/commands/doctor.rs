//! Doctor command - verify system requirements and configuration.

use crate::chat::OllamaBackend;
use crate::cli::Output;
use crate::config::Settings;
use crate::delegate::TranscriptionDelegate;
use console::style;
use std::process::Command;
use tokio_util::sync::CancellationToken;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub async fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Tubescribe Doctor");
    println!();
    println!("Checking system requirements and configuration...\n");

    let mut checks = Vec::new();

    println!("{}", style("External Tools").bold());
    let tool_check = check_tool(&settings.captions.ytdlp_path, install_hint_ytdlp());
    tool_check.print();
    checks.push(tool_check);

    println!();

    println!("{}", style("Services").bold());
    let cancel = CancellationToken::new();
    let client = crate::http::create_client()?;
    for check in [
        check_ollama(settings, client.clone(), &cancel).await,
        check_transcription_service(settings, client, &cancel).await,
    ] {
        check.print();
        checks.push(check);
    }

    println!();

    println!("{}", style("Directories").bold());
    let dir_check = check_temp_dir(settings);
    dir_check.print();
    checks.push(dir_check);

    println!();

    println!("{}", style("Configuration").bold());
    let config_check = check_config_file();
    config_check.print();
    checks.push(config_check);

    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before using Tubescribe.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! Tubescribe is ready to use.");
    }

    Ok(())
}

/// Check if an external tool is available.
fn check_tool(binary: &str, hint: &str) -> CheckResult {
    match Command::new(binary).arg("--version").output() {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout)
                .lines()
                .next()
                .unwrap_or("installed")
                .trim()
                .to_string();

            let version_display = if version.len() > 50 {
                format!("{}...", &version[..50])
            } else {
                version
            };

            CheckResult::ok(binary, &version_display)
        }
        Ok(_) => CheckResult::error(binary, "installed but not working", hint),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            CheckResult::error(binary, "not found", hint)
        }
        Err(e) => CheckResult::error(binary, &format!("error: {}", e), hint),
    }
}

/// Check that Ollama answers and has the configured model.
async fn check_ollama(
    settings: &Settings,
    client: reqwest::Client,
    cancel: &CancellationToken,
) -> CheckResult {
    let backend = OllamaBackend::new(client, &settings.ollama);
    match backend.list_models(cancel).await {
        Ok(models) => model_check(backend.model(), &settings.ollama.base_url, &models),
        Err(e) => CheckResult::error(
            "Ollama",
            &format!("{} ({})", settings.ollama.base_url, e.details().unwrap_or_default()),
            e.hint().unwrap_or("Start Ollama with: ollama serve"),
        ),
    }
}

fn model_check(model: &str, base_url: &str, available: &[String]) -> CheckResult {
    // Ollama reports untagged models with an explicit ":latest".
    let pulled = available
        .iter()
        .any(|m| m == model || *m == format!("{}:latest", model));

    if pulled {
        CheckResult::ok("Ollama", &format!("{} ({} available)", base_url, model))
    } else {
        CheckResult::warning(
            "Ollama",
            &format!("{} is up but model '{}' is not pulled", base_url, model),
            &format!("Pull it with: ollama pull {}", model),
        )
    }
}

/// The transcription service is optional; only the whisper command needs it.
async fn check_transcription_service(
    settings: &Settings,
    client: reqwest::Client,
    cancel: &CancellationToken,
) -> CheckResult {
    let delegate = TranscriptionDelegate::new(client, &settings.whisper);
    match delegate.probe(cancel).await {
        Ok(()) => CheckResult::ok("Transcription service", &settings.whisper.base_url),
        Err(e) => CheckResult::warning(
            "Transcription service",
            &format!(
                "{} ({})",
                settings.whisper.base_url,
                e.details().unwrap_or_default()
            ),
            "Only needed for videos without captions (tubescribe whisper)",
        ),
    }
}

fn check_temp_dir(settings: &Settings) -> CheckResult {
    let temp_dir = settings.temp_dir();
    if temp_dir.exists() {
        CheckResult::ok("Temp directory", &format!("{}", temp_dir.display()))
    } else {
        CheckResult::warning(
            "Temp directory",
            &format!("{} (will be created)", temp_dir.display()),
            "Directory will be created on first use",
        )
    }
}

/// Check if config file exists.
fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            "Create with: tubescribe config init",
        )
    }
}

/// Platform-specific install hint for yt-dlp.
fn install_hint_ytdlp() -> &'static str {
    if cfg!(target_os = "macos") {
        "Install with: brew install yt-dlp"
    } else if cfg!(target_os = "linux") {
        "Install with: pip install yt-dlp (or your package manager)"
    } else {
        "Install from: https://github.com/yt-dlp/yt-dlp"
    }
}
