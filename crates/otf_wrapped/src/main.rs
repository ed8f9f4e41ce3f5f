use std::io::Write;
use std::path::PathBuf;

use chrono::{Datelike, Utc};
use otf_client::config::Config;
use otf_client::http_client::ReqwestOtfClient;
use otf_wrapped::{ReportOptions, generate_report, report};

fn prompt_line(label: &str) -> Option<String> {
    print!("{label}");
    std::io::stdout().flush().ok()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line).ok()?;
    let trimmed = line.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Configure logging from env var `OTF_LOG_LEVEL` (or fallback to `RUST_LOG`, default `info`).
    let log_env = std::env::var("OTF_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(&log_env)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();

    // Env first; anything missing is collected interactively.
    let config = Config::from_env_with(|key| match std::env::var(key).ok() {
        Some(value) => Some(value),
        None => match key {
            "OTF_EMAIL" => prompt_line("Enter the email address associated with your OT account: "),
            "OTF_PASSWORD" => {
                rpassword::prompt_password("Enter the password for your account (hidden): ").ok()
            }
            _ => None,
        },
    })?;

    let output_path = PathBuf::from(
        std::env::var("OTF_OUTPUT_PATH").unwrap_or_else(|_| "otf_wrapped.html".to_string()),
    );
    let year = std::env::var("OTF_REPORT_YEAR")
        .ok()
        .and_then(|y| y.parse::<i32>().ok())
        .unwrap_or_else(|| Utc::now().year());

    let mut options = ReportOptions::for_year(year);
    if let Ok(template_path) = std::env::var("OTF_TEMPLATE_PATH") {
        options.template = std::fs::read_to_string(&template_path)?;
        tracing::info!(%template_path, "using template override");
    }

    let client = ReqwestOtfClient::new(&config);
    tracing::info!(year, "generating wrapped report");
    let html = generate_report(&client, &options).await?;
    report::write_report(&output_path, &html)?;

    println!("Report written to {}", output_path.display());
    Ok(())
}
