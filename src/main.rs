//! Command-line streamer for the LearnLab chat API.
//!
//! Streams one answer to stdout; orchestrator steps are logged through
//! tracing on stderr. Configuration comes from the environment:
//! `LEARNLAB_BASE_URL` and `LEARNLAB_TOKEN`.

use std::env;
use std::io::Write;
use std::process::ExitCode;

use tokio::sync::mpsc;

use learnstream::client::{LearnLabClient, DEFAULT_BASE_URL};
use learnstream::models::AskRequest;
use learnstream::sse::StreamEvent;

fn print_usage() {
    eprintln!("usage: learnstream [--agent NAME] [--namespace NS] [--session ID] <prompt>...");
    eprintln!();
    eprintln!("environment:");
    eprintln!("  LEARNLAB_BASE_URL  backend base URL (default {})", DEFAULT_BASE_URL);
    eprintln!("  LEARNLAB_TOKEN     bearer token; omitted when unset");
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = env::args().skip(1).collect();

    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("learnstream {}", env!("CARGO_PKG_VERSION"));
        return ExitCode::SUCCESS;
    }
    if args.is_empty() || args.iter().any(|a| a == "--help" || a == "-h") {
        print_usage();
        return if args.is_empty() {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        };
    }

    let mut agent = None;
    let mut namespace = None;
    let mut session_id = None;
    let mut prompt_parts: Vec<String> = Vec::new();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--agent" if i + 1 < args.len() => {
                agent = Some(args[i + 1].clone());
                i += 2;
            }
            "--namespace" if i + 1 < args.len() => {
                namespace = Some(args[i + 1].clone());
                i += 2;
            }
            "--session" if i + 1 < args.len() => {
                session_id = Some(args[i + 1].clone());
                i += 2;
            }
            other => {
                prompt_parts.push(other.to_string());
                i += 1;
            }
        }
    }

    let prompt = prompt_parts.join(" ");
    if prompt.is_empty() {
        eprintln!("learnstream: no prompt given");
        print_usage();
        return ExitCode::FAILURE;
    }

    let base_url = env::var("LEARNLAB_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
    let token = env::var("LEARNLAB_TOKEN").ok();
    let client = LearnLabClient::new(base_url, token);

    let mut request = AskRequest::new(prompt);
    request.preferred_agent = agent;
    request.namespace = namespace;
    request.session_id = session_id;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let session = match client.ask_stream(&request, tx) {
        Ok(session) => session,
        Err(e) => {
            eprintln!("learnstream: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let mut failed = false;
    while let Some(event) = rx.recv().await {
        match event {
            StreamEvent::Token(text) => {
                print!("{}", text);
                let _ = std::io::stdout().flush();
            }
            StreamEvent::Step(step) => {
                let name = step.name.as_deref().unwrap_or("step");
                match step.detail.as_deref() {
                    Some(detail) => tracing::info!("{}: {}", name, detail),
                    None => tracing::info!("{}", name),
                }
            }
            StreamEvent::Error(message) => {
                eprintln!("learnstream: server error: {}", message);
                failed = true;
            }
            StreamEvent::Done => break,
        }
    }
    println!();

    drop(session);
    if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
