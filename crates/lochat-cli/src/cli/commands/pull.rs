//! Pull command handler: model download with streamed progress.

use anyhow::{Context, Result};
use lochat_core::backend::OllamaClient;
use lochat_core::config::Config;
use lochat_core::core::{SessionState, StreamSession, drain_stream};

use crate::cli::{interrupt, render};

pub async fn run(name: &str, config: &Config) -> Result<()> {
    let client = OllamaClient::with_connect_timeout(
        config.resolve_base_url(),
        std::time::Duration::from_secs(config.timeout_secs),
    )
    .context("build http client")?;
    let mut session = StreamSession::new();
    session.start().context("start stream")?;

    let records = client
        .pull_stream(name)
        .await
        .context("open pull stream")?;

    let cancel = interrupt::arm();
    let printer = tokio::spawn(render::print_progress(session.subscribe()));
    drain_stream(&mut session, records, &cancel).await;
    let snapshot = printer.await.context("render task")?;

    match snapshot.state {
        SessionState::Completed => {
            println!("Pulled {name}");
            Ok(())
        }
        SessionState::Cancelled => {
            eprintln!("(cancelled)");
            Ok(())
        }
        _ => match snapshot.error {
            Some(e) => anyhow::bail!("pull failed: {e}"),
            None => anyhow::bail!("pull failed"),
        },
    }
}
