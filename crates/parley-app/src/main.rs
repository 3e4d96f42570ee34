//! parley binary - composition root.
//!
//! Ties the relay crates together into a single executable:
//! 1. Load configuration from TOML
//! 2. Read credentials and endpoints from the environment
//! 3. Connect the Redis session store
//! 4. Build the OpenAI-backed completion and transcription adapters
//! 5. Run the Telegram long-poll dispatch loop

use std::path::PathBuf;
use std::sync::Arc;

use async_openai::config::OpenAIConfig;
use async_openai::Client;

use parley_bot::{Bot, Router};
use parley_completion::OpenAiCompletion;
use parley_core::config::ParleyConfig;
use parley_session::RedisSessionStore;
use parley_telegram::TelegramClient;
use parley_transcribe::WhisperApiTranscription;

/// Resolve the config file path (PARLEY_CONFIG env, or ~/.parley/config.toml).
fn config_path() -> PathBuf {
    if let Ok(p) = std::env::var("PARLEY_CONFIG") {
        return PathBuf::from(p);
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".parley").join("config.toml");
    }
    PathBuf::from("config.toml")
}

/// Read a required environment variable, logging before failing.
fn required_env(name: &str) -> Result<String, Box<dyn std::error::Error>> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => {
            tracing::error!("{} is not set", name);
            Err(format!("{} is not set", name).into())
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    tracing::info!("Starting parley v{}", env!("CARGO_PKG_VERSION"));

    // Config.
    let config_file = config_path();
    let config = ParleyConfig::load_or_default(&config_file);
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    // Credentials and endpoints come from the environment.
    let telegram_token = required_env("TELEGRAM_TOKEN")?;
    let openai_api_key = required_env("OPENAI_API_KEY")?;
    let redis_url =
        std::env::var("REDIS_URL").unwrap_or_else(|_| config.session.redis_url.clone());

    // Session store.
    let store = match RedisSessionStore::connect(&redis_url, config.session.max_turns).await {
        Ok(store) => store,
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to Redis — is it running?");
            return Err(e.into());
        }
    };

    // One OpenAI client serves both adapters.
    let openai = Client::with_config(OpenAIConfig::new().with_api_key(openai_api_key));
    let completion = OpenAiCompletion::new(
        openai.clone(),
        config.completion.model.clone(),
        config.completion.system_prompt.clone(),
    );
    let transcription = WhisperApiTranscription::new(openai, config.transcription.model.clone());

    // Platform client and router.
    let telegram = TelegramClient::new(&config.telegram.api_base, &telegram_token);
    let router = Router::new(
        Arc::new(store),
        Arc::new(completion),
        Arc::new(transcription),
    );

    let bot = Bot::new(
        Arc::new(telegram),
        Arc::new(router),
        config.telegram.poll_timeout_secs,
    );
    bot.run().await?;

    Ok(())
}
