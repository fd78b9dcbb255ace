//! Interactive chat loop.

use std::io::{IsTerminal, Read, Write};

use anyhow::{Context, Result};
use lochat_core::backend::{GenerateOptions, OllamaClient};
use lochat_core::config::Config;
use lochat_core::core::{
    self, Message, SessionSnapshot, SessionState, StreamSession, UsageBand, drain_stream,
};
use tokio::io::AsyncBufReadExt;

use crate::cli::{interrupt, render};

pub async fn run(config: &Config) -> Result<()> {
    // If stdin is piped, treat the whole input as a single prompt
    if !std::io::stdin().is_terminal() {
        let mut prompt = String::new();
        std::io::stdin().lock().read_to_string(&mut prompt)?;
        let prompt = prompt.trim();
        if prompt.is_empty() {
            anyhow::bail!("No input provided via pipe");
        }
        return super::ask::run(prompt, config).await;
    }

    let base_url = config.resolve_base_url();
    println!("lochat - {} at {base_url}", config.model);
    println!("Type a message; /quit exits, Ctrl+C cancels a response.");

    let client = OllamaClient::with_connect_timeout(
        base_url,
        std::time::Duration::from_secs(config.timeout_secs),
    )
    .context("build http client")?;
    let mut session = StreamSession::new();
    let mut history: Vec<Message> = Vec::new();

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break; // EOF
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input == "/quit" || input == "/exit" {
            break;
        }

        history.push(Message::user(input));
        let snapshot = turn(&client, &mut session, &history, config).await?;
        println!();

        if snapshot.state == SessionState::Completed {
            history.push(Message::assistant(snapshot.text));
        } else {
            render::report_outcome(&snapshot);
            // The unanswered prompt is dropped so a retry starts clean.
            history.pop();
        }

        print_context_line(&history, config);
    }

    Ok(())
}

/// Runs one request/response turn, returning the terminal snapshot.
///
/// Setup failures (connect, HTTP status) fail the session instead of
/// propagating, so the loop survives a backend that is down or missing the
/// model.
async fn turn(
    client: &OllamaClient,
    session: &mut StreamSession,
    history: &[Message],
    config: &Config,
) -> Result<SessionSnapshot> {
    session.start().context("start stream")?;

    let options = GenerateOptions {
        num_ctx: Some(config.context_window as u32),
        ..GenerateOptions::default()
    };
    let retained = core::retained(history, config.context_messages);
    let records = match client
        .chat_stream(&config.model, retained, Some(&options))
        .await
    {
        Ok(records) => records,
        Err(e) => {
            session.fail(&e);
            return Ok(session.snapshot());
        }
    };

    let cancel = interrupt::arm();
    let printer = tokio::spawn(render::print_stream(session.subscribe()));
    drain_stream(session, records, &cancel).await;
    printer.await.context("render task")
}

fn print_context_line(history: &[Message], config: &Config) {
    let usage = core::estimate(history, config.context_messages, config.context_window);
    let marker = match usage.band() {
        UsageBand::Normal => "",
        UsageBand::Warning => " !",
        UsageBand::Critical => " !!",
    };
    println!(
        "[context: {}/{} messages, ~{}/{} tokens ({:.0}%){marker}]",
        usage.context_messages,
        usage.total_messages,
        usage.estimated_tokens,
        usage.context_limit,
        usage.usage_percentage,
    );
}
