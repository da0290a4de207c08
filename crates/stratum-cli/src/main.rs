//! Stratum CLI
//!
//! Command-line interface for the provenance-layered atom store:
//! - Import source documents into containers (delete-then-recreate)
//! - Show merged views, citations, and shadowed facts
//! - Record chain proofs and inject verified context
//!
//! State lives in a JSON snapshot file, loaded before and saved after each
//! command; wire a real persistence layer behind the store for anything
//! beyond local use.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use stratum_core::ChainProof;
use stratum_resolve::{inject, ContextFormat, InjectOptions, ProvenanceFacade};
use stratum_store::{AtomStore, ImportConfig, SourceDocument};

#[derive(Parser)]
#[command(name = "stratum")]
#[command(author, version, about = "Stratum: provenance-layered atom store")]
struct Cli {
    /// Store snapshot file (JSON). Created on first write.
    #[arg(long, global = true, default_value = "stratum.json")]
    store: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a source document (replaces any existing container with the
    /// same identity).
    Import {
        /// Source document JSON file.
        file: PathBuf,
        #[arg(long, default_value = "0711")]
        namespace: String,
        #[arg(long, default_value = "import")]
        author: String,
        /// Commit message for this run.
        #[arg(long)]
        message: Option<String>,
    },

    /// List known containers.
    List,

    /// Show a container's merged view.
    Show {
        /// Container id (identity key or fully-qualified).
        id: String,
        /// Also list citations.
        #[arg(long)]
        citations: bool,
        /// Also list shadowed (overridden) facts.
        #[arg(long)]
        shadowed: bool,
    },

    /// Record an externally produced chain proof for a container.
    Anchor {
        id: String,
        #[arg(long)]
        network: String,
        #[arg(long)]
        tx_hash: String,
        /// Absent means the transaction is still pending.
        #[arg(long)]
        block_number: Option<u64>,
        #[arg(long)]
        batch_id: Option<u64>,
    },

    /// Assemble verified context from one or more containers.
    Inject {
        ids: Vec<String>,
        /// Skip proof evaluation.
        #[arg(long)]
        no_verify: bool,
        /// Emit JSON instead of markdown.
        #[arg(long)]
        json: bool,
        #[arg(long)]
        max_tokens: Option<usize>,
        /// Require proofs anchored on this network.
        #[arg(long)]
        network: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Import {
            file,
            namespace,
            author,
            message,
        } => {
            let store = load_store(&cli.store)?;
            let contents = fs::read_to_string(&file)
                .with_context(|| format!("reading source document {}", file.display()))?;
            let doc: SourceDocument = serde_json::from_str(&contents)
                .with_context(|| format!("parsing source document {}", file.display()))?;

            let cfg = ImportConfig {
                namespace,
                author,
                message,
                ..Default::default()
            };
            let summary = store.import_document(&doc, &cfg)?;

            println!(
                "{} {} ({} atoms)",
                "imported".green().bold(),
                summary.container_id.bold(),
                summary.total_atoms
            );
            for (layer_id, count) in &summary.per_layer_counts {
                println!("  {layer_id}: {count}");
            }
            save_store(&cli.store, &store)?;
        }

        Commands::List => {
            let store = load_store(&cli.store)?;
            let mut containers = store.containers();
            containers.sort_by(|a, b| a.identity_key.cmp(&b.identity_key));
            for c in containers {
                println!("{}  {}", c.full_id().bold(), c.meta.name);
            }
        }

        Commands::Show {
            id,
            citations,
            shadowed,
        } => {
            let store = load_store(&cli.store)?;
            let facade = ProvenanceFacade::new(&store);

            let record = store
                .container(&id)
                .with_context(|| format!("container `{id}` not found"))?;
            println!("{}  {}", record.full_id().bold(), record.meta.name);

            for (path, value) in facade.merged_data(&id)? {
                println!("  {}: {}", path.cyan(), value);
            }

            if citations {
                println!("{}", "sources:".bold());
                for citation in facade.citations(&id)? {
                    let page = citation.page.map(|p| format!(" p.{p}")).unwrap_or_default();
                    println!("  {}{page}", citation.document_id);
                }
            }

            if shadowed {
                println!("{}", "shadowed:".bold());
                for (path, losers) in facade.shadowed(&id)? {
                    for atom in losers {
                        println!(
                            "  {}: {} ({} / {})",
                            path.cyan(),
                            atom.value,
                            atom.layer_id,
                            atom.trust_level
                        );
                    }
                }
            }
        }

        Commands::Anchor {
            id,
            network,
            tx_hash,
            block_number,
            batch_id,
        } => {
            let store = load_store(&cli.store)?;
            let verified = block_number.is_some();
            store.record_proof(ChainProof {
                container_id: id.clone(),
                verified,
                network: Some(network),
                batch_id,
                tx_hash: Some(tx_hash),
                block_number,
                verified_at: None,
                reason: None,
            })?;
            let status = if verified {
                "anchored".green()
            } else {
                "pending".yellow()
            };
            println!("{status} {id}");
            save_store(&cli.store, &store)?;
        }

        Commands::Inject {
            ids,
            no_verify,
            json,
            max_tokens,
            network,
        } => {
            let store = load_store(&cli.store)?;
            let options = InjectOptions {
                containers: ids,
                verify: !no_verify,
                format: if json {
                    ContextFormat::Json
                } else {
                    ContextFormat::Markdown
                },
                max_tokens,
                network,
                ..Default::default()
            };
            let context = inject(&store, &options)?;

            println!("{}", context.formatted);
            let status = if context.verified {
                "verified".green().bold()
            } else {
                "unverified".red().bold()
            };
            eprintln!(
                "{status} | {} container(s) | ~{} tokens",
                context.containers.len(),
                context.token_estimate
            );
        }
    }
    Ok(())
}

fn load_store(path: &Path) -> Result<AtomStore> {
    if path.exists() {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("reading store snapshot {}", path.display()))?;
        let snapshot = serde_json::from_str(&contents)
            .with_context(|| format!("parsing store snapshot {}", path.display()))?;
        Ok(AtomStore::from_snapshot(snapshot))
    } else {
        Ok(AtomStore::new())
    }
}

fn save_store(path: &Path, store: &AtomStore) -> Result<()> {
    let json = serde_json::to_string_pretty(&store.snapshot())?;
    fs::write(path, json).with_context(|| format!("writing store snapshot {}", path.display()))
}
