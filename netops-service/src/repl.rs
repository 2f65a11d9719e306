//! Interactive terminal chat

use anyhow::Result;
use netops_chat::{Assistant, DispatchState};
use netops_core::Error;
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::warn;

const SESSION_ID: &str = "terminal";

const HELP: &str = "\
Commands:
  /index   rebuild the documentation index
  /reset   clear the conversation history
  /help    show this message
  /quit    exit";

#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Index,
    Reset,
    Help,
    Quit,
    Unknown(&'a str),
    Message(&'a str),
    Empty,
}

fn parse_input(line: &str) -> Input<'_> {
    let line = line.trim();
    match line {
        "" => Input::Empty,
        "/index" => Input::Index,
        "/reset" => Input::Reset,
        "/help" => Input::Help,
        "/quit" | "/exit" => Input::Quit,
        cmd if cmd.starts_with('/') => Input::Unknown(cmd),
        text => Input::Message(text),
    }
}

pub async fn run(assistant: &Assistant) -> Result<()> {
    let mut stdout = io::stdout();
    let mut lines = BufReader::new(io::stdin()).lines();

    stdout
        .write_all(b"Network assistant. Type /help for commands.\n")
        .await?;

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        let output = match parse_input(&line) {
            Input::Empty => continue,
            Input::Quit => break,
            Input::Help => HELP.to_string(),
            Input::Unknown(cmd) => format!("Unknown command {}. Type /help.", cmd),
            Input::Reset => {
                assistant.reset(SESSION_ID).await;
                "History cleared.".to_string()
            }
            Input::Index => match assistant.reindex().await {
                Ok(report) => format!(
                    "Indexed {} documents ({} chunks, {} index).",
                    report.documents, report.chunks, report.backend
                ),
                Err(e) => format!("Indexing failed: {}", e),
            },
            Input::Message(text) => match assistant.ask(Some(SESSION_ID), text).await {
                Ok(reply) => {
                    if let DispatchState::Failed(kind) = reply.state {
                        warn!(%kind, "Dispatch cycle failed");
                    }
                    reply.answer
                }
                Err(Error::UpstreamFailure(e)) => {
                    format!("The language model is unavailable: {}", e)
                }
                Err(e) => format!("Error: {}", e),
            },
        };

        stdout.write_all(output.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
    }

    Ok(())
}
