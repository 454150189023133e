use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use fhir::{Bundle, CollectionBundle};
use saarthi_core::{
    artifact::write_artifact, config::resolve_from_env, constants, CodingClient, Document,
    HttpCollaborator, PatientContext, SelectionSet,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "saarthi")]
#[command(about = "Saarthi clinical coding workbench CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search free text for terminology codes
    Autocode {
        /// Free clinical text
        text: String,
    },
    /// Assemble a document from codes and print it
    Document {
        #[command(flatten)]
        selection: SelectionArgs,
        /// Write the document here instead of printing it
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Assemble a document from codes, export it and save the returned bundle
    Export {
        #[command(flatten)]
        selection: SelectionArgs,
        /// Build the FHIR collection bundle locally instead of calling the export service
        #[arg(long)]
        offline: bool,
    },
    /// Send a previously exported artifact to the import service
    Reimport {
        /// Path to the artifact
        file: PathBuf,
    },
    /// Check locally that a document file has the expected structure
    Verify {
        /// Path to the document JSON
        file: PathBuf,
    },
    /// Assemble, render and re-import a document and compare the result
    Roundtrip {
        #[command(flatten)]
        selection: SelectionArgs,
    },
    /// Count the resources in a FHIR bundle file
    Summarize {
        /// Path to the bundle JSON
        file: PathBuf,
    },
}

#[derive(Args)]
struct SelectionArgs {
    /// Code to select, as CODE=DISPLAY (repeatable; repeating a code deselects it)
    #[arg(long = "code", value_parser = parse_code)]
    codes: Vec<(String, String)>,

    #[command(flatten)]
    patient: PatientArgs,
}

#[derive(Args)]
struct PatientArgs {
    /// Patient identifier
    #[arg(long, default_value = constants::DEMO_PATIENT_ID)]
    patient_id: String,
    /// Patient display name
    #[arg(long, default_value = constants::DEMO_PATIENT_NAME)]
    patient_name: String,
    /// Patient gender
    #[arg(long, default_value = constants::DEMO_PATIENT_GENDER)]
    patient_gender: String,
    /// Patient date of birth (YYYY-MM-DD)
    #[arg(long, default_value = constants::DEMO_PATIENT_BIRTH_DATE)]
    patient_birth_date: String,
}

impl SelectionArgs {
    fn assemble(&self) -> anyhow::Result<Document> {
        let mut selections = SelectionSet::new();
        for (code, display) in &self.codes {
            selections.toggle(code.as_str(), display.as_str());
        }

        let patient = PatientContext::new(
            &self.patient.patient_id,
            &self.patient.patient_name,
            &self.patient.patient_gender,
            &self.patient.patient_birth_date,
        );
        Ok(saarthi_core::assemble(&patient, selections.list())?)
    }
}

fn parse_code(value: &str) -> Result<(String, String), String> {
    let (code, display) = value
        .split_once('=')
        .ok_or_else(|| format!("expected CODE=DISPLAY, got '{value}'"))?;
    let code = code.trim();
    if code.is_empty() || display.trim().is_empty() {
        return Err(format!("code and display must not be empty in '{value}'"));
    }
    Ok((code.to_string(), display.trim().to_string()))
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("saarthi_core=warn".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let cfg = resolve_from_env()?;
    let client = || -> anyhow::Result<CodingClient<HttpCollaborator>> {
        Ok(CodingClient::new(
            HttpCollaborator::from_config(&cfg)?,
            cfg.credentials().clone(),
            cfg.top_k(),
        ))
    };

    match cli.command {
        Some(Commands::Autocode { text }) => {
            let suggestions = client()?.autocode(&text).await?;
            print!("{}", saarthi_core::render(&suggestions).to_table(|_| false));
        }
        Some(Commands::Document { selection, out }) => {
            let text = Bundle::render_pretty(&selection.assemble()?)?;
            match out {
                Some(path) => {
                    std::fs::write(&path, text)
                        .with_context(|| format!("failed to write {}", path.display()))?;
                    println!("Wrote document to {}", path.display());
                }
                None => println!("{text}"),
            }
        }
        Some(Commands::Export { selection, offline }) => {
            let document = selection.assemble()?;
            tracing::info!(offline, conditions = document.conditions.len(), "exporting document");
            let bundle = if offline {
                CollectionBundle::build(&document)?
            } else {
                client()?.export(&document).await?
            };
            let path = write_artifact(cfg.artifact_dir(), &bundle)?;
            println!(
                "Exported {} condition(s) to {}",
                document.conditions.len(),
                path.display()
            );
        }
        Some(Commands::Reimport { file }) => {
            let raw = std::fs::read(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let ack = client()?.reimport(&raw).await?;
            println!("{}", serde_json::to_string_pretty(&ack)?);
        }
        Some(Commands::Verify { file }) => {
            let raw = std::fs::read(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let document = Bundle::import(&raw)?;
            println!(
                "Valid document for patient {}: {} condition(s), {} procedure(s)",
                document.patient.id,
                document.conditions.len(),
                document.procedures.len()
            );
        }
        Some(Commands::Roundtrip { selection }) => {
            let document = selection.assemble()?;
            let imported = Bundle::import(&Bundle::render(&document)?)?;
            if imported != document {
                anyhow::bail!("round-trip mismatch: re-imported document differs from the assembled one");
            }
            println!(
                "Round-trip OK: {} condition(s) reproduced in order",
                document.conditions.len()
            );
        }
        Some(Commands::Summarize { file }) => {
            let raw = std::fs::read(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            let summary = CollectionBundle::summarize(&raw)?;
            println!("{summary}");
        }
        None => {
            println!("Use 'saarthi --help' for commands");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_code_pairs() {
        assert_eq!(
            parse_code("1A00=Cholera").expect("valid"),
            ("1A00".to_string(), "Cholera".to_string())
        );
        assert_eq!(
            parse_code("2C10=Malignant neoplasm = stage unknown").expect("valid").1,
            "Malignant neoplasm = stage unknown"
        );
        assert!(parse_code("1A00").is_err());
        assert!(parse_code("=Cholera").is_err());
    }

    #[test]
    fn repeated_code_deselects() {
        let cli = Cli::parse_from([
            "saarthi",
            "roundtrip",
            "--code",
            "1A00=Cholera",
            "--code",
            "2C10=Malignant neoplasm",
            "--code",
            "1A00=Cholera",
        ]);
        let Some(Commands::Roundtrip { selection }) = cli.command else {
            panic!("expected roundtrip command");
        };

        let document = selection.assemble().expect("assemble");
        let codes: Vec<&str> = document.conditions.iter().map(|c| c.code.as_str()).collect();
        assert_eq!(codes, vec!["2C10"]);
        assert_eq!(document.patient, saarthi_core::demo_patient());
    }

    #[test]
    fn empty_patient_field_is_rejected() {
        let cli = Cli::parse_from(["saarthi", "document", "--patient-gender", ""]);
        let Some(Commands::Document { selection, .. }) = cli.command else {
            panic!("expected document command");
        };

        let err = selection.assemble().expect_err("should reject");
        assert!(err.to_string().contains("gender"));
    }
}
