//! Interactive coding workbench.
//!
//! Reads commands from stdin and drives one [`EditingSession`]. Collaborator calls run as
//! spawned tasks so the console stays responsive; their results come back through the main
//! loop, where the session applies them. Autocoding results carry a [`SearchTicket`] and are
//! dropped when a newer search has already been shown.

mod console;

use console::{ConsoleCommand, HELP};
use fhir::Bundle;
use saarthi_core::artifact::write_artifact;
use saarthi_core::config::{CoreConfig, resolve_from_env};
use saarthi_core::{
    CodingClient, CodingResult, EditingSession, HttpCollaborator, SearchTicket, Suggestion,
    ToggleOutcome,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinSet;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

type Client = CodingClient<HttpCollaborator>;

enum Completion {
    Search(SearchTicket, CodingResult<Vec<Suggestion>>),
    Export(CodingResult<serde_json::Value>, usize),
    Reimport(PathBuf, CodingResult<serde_json::Value>),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("saarthi_run=info".parse()?)
                .add_directive("saarthi_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cfg = resolve_from_env()?;
    tracing::info!(api_base = %cfg.api_base(), top_k = cfg.top_k(), "starting coding workbench");

    let client = Arc::new(CodingClient::new(
        HttpCollaborator::from_config(&cfg)?,
        cfg.credentials().clone(),
        cfg.top_k(),
    ));
    let mut session = EditingSession::new(saarthi_core::demo_patient());
    let mut pending: JoinSet<Completion> = JoinSet::new();
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!(
        "Coding session for {} ({}). Type 'help' for commands.",
        session.patient().name,
        session.patient().id
    );

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match ConsoleCommand::parse(&line) {
                    Ok(ConsoleCommand::Quit) => break,
                    Ok(command) => run_command(command, &mut session, &client, &mut pending),
                    Err(message) => println!("{message}"),
                }
            }
            Some(done) = pending.join_next(), if !pending.is_empty() => {
                match done {
                    Ok(completion) => complete(completion, &mut session, &cfg),
                    Err(e) => tracing::error!("collaborator task failed: {e}"),
                }
            }
        }
    }

    pending.abort_all();
    session.reset();
    Ok(())
}

fn run_command(
    command: ConsoleCommand,
    session: &mut EditingSession,
    client: &Arc<Client>,
    pending: &mut JoinSet<Completion>,
) {
    match command {
        ConsoleCommand::Search(text) => {
            let ticket = session.begin_search(&text);
            let client = client.clone();
            pending.spawn(async move {
                let result = client.autocode(&text).await;
                Completion::Search(ticket, result)
            });
            println!("Searching...");
        }
        ConsoleCommand::Toggle(indices) => {
            for index in indices {
                let code = session.presentation().row(index).map(|row| row.code.clone());
                match (session.toggle_row(index), code) {
                    (Some(ToggleOutcome::Selected), Some(code)) => println!("Selected {code}"),
                    (Some(ToggleOutcome::Deselected), Some(code)) => println!("Deselected {code}"),
                    _ => println!("No suggestion row {index}"),
                }
            }
        }
        ConsoleCommand::Show => show_suggestions(session),
        ConsoleCommand::Selected => {
            if session.selections().is_empty() {
                println!("No codes selected.");
            }
            for entry in session.selections() {
                println!("{}  {}", entry.code, entry.display);
            }
        }
        ConsoleCommand::Export => match session.assemble() {
            Ok(document) => {
                let count = document.conditions.len();
                let client = client.clone();
                pending.spawn(async move {
                    let result = client.export(&document).await;
                    Completion::Export(result, count)
                });
                println!("Exporting {count} condition(s)...");
            }
            Err(e) => println!("Cannot export: {e}"),
        },
        ConsoleCommand::Reimport(path) => match std::fs::read(&path) {
            Ok(raw) => {
                let client = client.clone();
                pending.spawn(async move {
                    let result = client.reimport(&raw).await;
                    Completion::Reimport(path, result)
                });
            }
            Err(e) => println!("Failed to read {}: {e}", path.display()),
        },
        ConsoleCommand::Verify(path) => {
            let outcome = std::fs::read(&path)
                .map_err(|e| e.to_string())
                .and_then(|raw| Bundle::import(&raw).map_err(|e| e.to_string()));
            match outcome {
                Ok(document) => println!(
                    "Valid document for patient {}: {} condition(s), {} procedure(s)",
                    document.patient.id,
                    document.conditions.len(),
                    document.procedures.len()
                ),
                Err(e) => println!("Invalid document {}: {e}", path.display()),
            }
        }
        ConsoleCommand::Save(path) => {
            let outcome = session
                .assemble()
                .map_err(|e| e.to_string())
                .and_then(|document| Bundle::render_pretty(&document).map_err(|e| e.to_string()))
                .and_then(|text| std::fs::write(&path, text).map_err(|e| e.to_string()));
            match outcome {
                Ok(()) => println!("Wrote document to {}", path.display()),
                Err(e) => println!("Cannot save document: {e}"),
            }
        }
        ConsoleCommand::Clear => session.clear_view(),
        ConsoleCommand::Reset => {
            session.reset();
            println!("Session reset.");
        }
        ConsoleCommand::Help => println!("{HELP}"),
        ConsoleCommand::Quit | ConsoleCommand::Empty => {}
    }
}

fn complete(completion: Completion, session: &mut EditingSession, cfg: &CoreConfig) {
    match completion {
        Completion::Search(ticket, Ok(suggestions)) => {
            if session.receive_suggestions(ticket, &suggestions).is_some() {
                show_suggestions(session);
            } else {
                tracing::debug!(seq = ticket.seq(), "discarded stale autocoding response");
            }
        }
        Completion::Search(ticket, Err(e)) => {
            if session.search_failed(ticket) {
                tracing::warn!(seq = ticket.seq(), "autocoding failed: {e}");
                println!("Search failed: {e}");
            } else {
                tracing::debug!(seq = ticket.seq(), "discarded stale autocoding failure: {e}");
            }
        }
        Completion::Export(Ok(bundle), count) => match write_artifact(cfg.artifact_dir(), &bundle) {
            Ok(path) => println!("Exported {count} condition(s) to {}", path.display()),
            Err(e) => println!("Export succeeded but the artifact was not saved: {e}"),
        },
        Completion::Export(Err(e), _) => println!("Export failed: {e}"),
        Completion::Reimport(path, Ok(ack)) => {
            println!("Re-imported {}:", path.display());
            match serde_json::to_string_pretty(&ack) {
                Ok(text) => println!("{text}"),
                Err(_) => println!("{ack}"),
            }
        }
        Completion::Reimport(path, Err(e)) => {
            println!("Re-import of {} failed: {e}", path.display())
        }
    }
}

fn show_suggestions(session: &EditingSession) {
    print!("{}", session.presentation().to_table(|code| session.is_selected(code)));
}
