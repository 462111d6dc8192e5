//! Commands behind the `sgschema` binary.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use sgschema_core::{ResolveOptions, Schema, SchemaConfig};
use sgschema_raw::{RawSchema, reduce_raw};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "sgschema")]
#[command(about = "Cache a service schema and resolve entity and field names against it")]
pub struct Cli {
    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Schema config file (JSON or YAML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Reduce a raw schema dump into a schema document
    Reduce {
        /// Raw dump with raw_entities, raw_fields and raw_private
        raw: PathBuf,
        /// Output document (.json, .yaml or .yml)
        out: PathBuf,
    },
    /// Layer schema documents and write the merged result
    Merge {
        /// Output document (.json, .yaml or .yml)
        out: PathBuf,
        /// Documents or directories, lowest priority first
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
    /// Resolve an entity spec
    Entity {
        spec: String,
        #[command(flatten)]
        schema: SchemaArgs,
    },
    /// Resolve field specs against an entity type
    Field {
        entity_type: String,
        #[arg(required = true)]
        specs: Vec<String>,
        #[command(flatten)]
        schema: SchemaArgs,
        /// Do not try the custom field prefix
        #[arg(long)]
        no_prefix: bool,
    },
}

#[derive(Args, Debug)]
pub struct SchemaArgs {
    /// Schema documents or directories to load, lowest priority first
    #[arg(short, long = "schema", required = true)]
    pub schemas: Vec<PathBuf>,

    /// Fail on names that do not resolve
    #[arg(long)]
    pub strict: bool,

    /// Only match aliases given with `$`
    #[arg(long)]
    pub no_aliases: bool,
}

impl SchemaArgs {
    fn options(&self) -> ResolveOptions {
        let mut options = ResolveOptions::default();
        if self.strict {
            options = options.strict();
        }
        if self.no_aliases {
            options = options.no_implicit_aliases();
        }
        options
    }
}

fn load_config(path: Option<&Path>) -> Result<SchemaConfig> {
    match path {
        Some(path) => SchemaConfig::from_path(path)
            .with_context(|| format!("Failed to read config {}", path.display())),
        None => Ok(SchemaConfig::default()),
    }
}

fn load_schema(config: SchemaConfig, inputs: &[PathBuf]) -> Result<Schema> {
    let mut schema = Schema::with_config(config);
    for input in inputs {
        if input.is_dir() {
            schema
                .load_directory(input)
                .with_context(|| format!("Failed to load directory {}", input.display()))?;
        } else {
            schema
                .load_path(input)
                .with_context(|| format!("Failed to load {}", input.display()))?;
        }
    }
    Ok(schema)
}

/// Runs one command, writing resolved names to `out`, one per line.
pub fn run(cli: Cli, out: &mut impl Write) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Command::Reduce { raw, out: target } => {
            let raw_schema = RawSchema::load_path(&raw)
                .with_context(|| format!("Failed to read raw schema {}", raw.display()))?;
            let mut schema = Schema::with_config(config);
            reduce_raw(&mut schema, &raw_schema);
            schema
                .dump_path(&target)
                .with_context(|| format!("Failed to write {}", target.display()))?;
            info!("Reduced {} into {}", raw.display(), target.display());
        }
        Command::Merge { out: target, inputs } => {
            let schema = load_schema(config, &inputs)?;
            schema
                .dump_path(&target)
                .with_context(|| format!("Failed to write {}", target.display()))?;
            info!("Merged {} inputs into {}", inputs.len(), target.display());
        }
        Command::Entity { spec, schema } => {
            let loaded = load_schema(config, &schema.schemas)?;
            for name in loaded.resolve_entity(&spec, schema.options())? {
                writeln!(out, "{name}")?;
            }
        }
        Command::Field {
            entity_type,
            specs,
            schema,
            no_prefix,
        } => {
            let loaded = load_schema(config, &schema.schemas)?;
            let mut options = schema.options();
            if no_prefix {
                options = options.no_auto_prefix();
            }
            for name in loaded.resolve_fields(&entity_type, &specs, options)? {
                writeln!(out, "{name}")?;
            }
        }
    }
    Ok(())
}
