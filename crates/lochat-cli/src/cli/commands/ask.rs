//! Ask command handler: one prompt, one streamed response.

use anyhow::{Context, Result};
use lochat_core::backend::{GenerateOptions, OllamaClient};
use lochat_core::config::Config;
use lochat_core::core::{SessionState, StreamSession, drain_stream};

use crate::cli::{interrupt, render};

pub async fn run(prompt: &str, config: &Config) -> Result<()> {
    let client = OllamaClient::with_connect_timeout(
        config.resolve_base_url(),
        std::time::Duration::from_secs(config.timeout_secs),
    )
    .context("build http client")?;
    let mut session = StreamSession::new();
    session.start().context("start stream")?;

    let options = GenerateOptions {
        num_ctx: Some(config.context_window as u32),
        ..GenerateOptions::default()
    };
    let records = client
        .generate_stream(&config.model, prompt, Some(&options))
        .await
        .context("open generate stream")?;

    let cancel = interrupt::arm();
    let printer = tokio::spawn(render::print_stream(session.subscribe()));
    drain_stream(&mut session, records, &cancel).await;
    let snapshot = printer.await.context("render task")?;
    println!();

    match snapshot.state {
        SessionState::Failed => match snapshot.error {
            Some(e) => anyhow::bail!("{e}"),
            None => anyhow::bail!("stream failed"),
        },
        SessionState::Cancelled => {
            eprintln!("(cancelled)");
            Ok(())
        }
        _ => Ok(()),
    }
}
