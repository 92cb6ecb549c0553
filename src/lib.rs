pub mod config;
pub mod logging;
pub mod normalize;
pub mod providers;
pub mod query;
pub mod repl;
pub mod transport;
pub mod web;

use anyhow::{Context, Result};
use std::env;
use std::io::{self, Write};
use std::sync::Arc;
use tracing::info;

use config::Config;
use query::QueryClient;
use repl::{answer_question, run_repl};

fn load_config() -> Result<Config> {
    dotenvy::dotenv().ok();
    logging::init();

    let cfg = Config::from_env()?;
    info!(
        provider = cfg.provider.as_str(),
        model = %cfg.model,
        base_url = %cfg.base_url,
        timeout_secs = cfg.timeout_secs,
        credential_present = cfg.credential.is_some(),
        "loaded runtime configuration"
    );
    Ok(cfg)
}

/// Command-line entry point: interactive loop, or one question from the arguments.
pub async fn run() -> Result<()> {
    let cfg = load_config()?;
    let client = QueryClient::from_config(&cfg)?;

    let args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        let stdin = io::stdin();
        run_repl(&client, stdin.lock(), io::stdout()).await
    } else {
        let question = args.join(" ");
        let mut stdout = io::stdout();
        answer_question(&client, &question, &mut stdout).await?;
        stdout.flush().context("Failed to flush stdout")
    }
}

/// Web entry point: serves the question form until the process is stopped.
pub async fn run_web() -> Result<()> {
    let cfg = load_config()?;
    let client = Arc::new(QueryClient::from_config(&cfg)?);
    web::serve(&cfg.web_bind_addr, client).await
}
