use std::sync::Arc;

use clap::Parser;
use rota_client::RotaApi;
use rota_editor::ScheduleEditor;
use rota_events::toast::ToastKind;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod config;
mod render;

use cli::Cli;
use config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rota_cli=info,rota_editor=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    // --- Configuration ---
    let mut config = AppConfig::from_env()?;
    if let Some(api_url) = cli.api_url {
        config.client.api_url = api_url.trim_end_matches('/').to_string();
    }
    tracing::debug!(api_url = %config.client.api_url, "Loaded configuration");

    // --- API client and editor ---
    let api = Arc::new(RotaApi::new(&config.client)?);
    let editor = ScheduleEditor::new(api.clone(), config.editor.clone());

    let result = commands::run(cli.command, api, &editor).await;

    for toast in editor.toasts().messages() {
        let tag = match toast.kind {
            ToastKind::Info => "info",
            ToastKind::Success => "ok",
            ToastKind::Warning => "warn",
            ToastKind::Error => "error",
        };
        eprintln!("[{tag}] {}", toast.text);
    }

    editor.shutdown();
    result
}
