//! Spurlos Detection CLI
//!
//! Runs entity detection against a configured model registry and prints
//! entities as JSON. Also lists entity sets, models, and labels from the
//! configuration.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use spurlos_core::{EntityItem, ProvenanceMap};
use spurlos_registry::ModelRegistry;
use std::path::PathBuf;
use tracing::info;

/// CLI arguments
#[derive(Parser)]
#[command(name = "spurlos-detect")]
#[command(about = "Detect PII entities in text with exact offsets")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Path to the entity sets configuration
    #[arg(
        short,
        long,
        env = "SPURLOS_CONFIG",
        default_value = "configs/entity_sets.json"
    )]
    config: PathBuf,
}

#[derive(Subcommand)]
enum Commands {
    /// Detect entities in a text
    Detect {
        /// Entity set id
        #[arg(short, long)]
        entity_set: String,

        /// Model id within the entity set
        #[arg(short, long)]
        model: String,

        /// Text to analyze; mutually exclusive with --file
        #[arg(conflicts_with = "file")]
        text: Option<String>,

        /// Read the text from a file instead
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Emit fine-grained entities instead of coarse categories
        #[arg(long)]
        fine: bool,

        /// Include provenance of coarse entities in the output
        #[arg(long, conflicts_with = "fine")]
        provenance: bool,

        /// Pretty-print the JSON output
        #[arg(short, long)]
        pretty: bool,
    },
    /// List configuration contents
    List {
        #[command(subcommand)]
        what: ListCommands,
    },
}

#[derive(Subcommand)]
enum ListCommands {
    /// List configured entity sets
    EntitySets,
    /// List models of an entity set
    Models {
        /// Entity set id
        entity_set: String,
    },
    /// List labels of an entity set
    Labels {
        /// Entity set id
        entity_set: String,
    },
}

/// Coarse detection output with optional provenance.
#[derive(Serialize)]
struct CoarseOutput {
    entities: Vec<EntityItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    provenance: Option<ProvenanceMap>,
}

fn print_json<T: Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{json}");
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let registry = ModelRegistry::from_file(&cli.config)
        .with_context(|| format!("failed to load registry from {}", cli.config.display()))?;

    match cli.command {
        Commands::Detect {
            entity_set,
            model,
            text,
            file,
            fine,
            provenance,
            pretty,
        } => {
            let text = match (text, file) {
                (Some(text), None) => text,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?,
                _ => anyhow::bail!("provide either a text argument or --file"),
            };

            let detector = registry.detector(&entity_set, &model)?;
            info!(%entity_set, %model, len = text.len(), "running detection");

            if fine {
                let entities = detector.detect_fine(&text)?;
                print_json(&entities, pretty)?;
            } else {
                let mapping = registry.coarse_mapping(&entity_set)?;
                let (entities, prov) = detector.detect_coarse(&text, &mapping)?;
                print_json(
                    &CoarseOutput {
                        entities,
                        provenance: provenance.then_some(prov),
                    },
                    pretty,
                )?;
            }
        }
        Commands::List { what } => match what {
            ListCommands::EntitySets => {
                for id in registry.entity_set_ids() {
                    println!("{id}");
                }
            }
            ListCommands::Models { entity_set } => {
                for (id, model_type) in registry.list_models(&entity_set)? {
                    println!("{id}\t{model_type:?}");
                }
            }
            ListCommands::Labels { entity_set } => {
                for label in registry.entity_set_labels(&entity_set)? {
                    println!("{label}");
                }
            }
        },
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_args_are_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn text_and_file_conflict() {
        let result = Cli::try_parse_from([
            "spurlos-detect",
            "detect",
            "-e",
            "codealltag",
            "-m",
            "lexicon-de",
            "some text",
            "--file",
            "input.txt",
        ]);
        assert!(result.is_err());
    }
}
