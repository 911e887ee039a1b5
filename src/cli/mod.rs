use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config;
use crate::host::FieldHost;
use crate::storage::db::i64_seconds_to_local_time;
use crate::storage::operations::{EntityId, FieldStore};

#[derive(Parser)]
#[command(name = "cms-fields")]
#[command(version = "0.1")]
#[command(about = "Price and SoundCloud track fields for content entities")]
pub struct Cli {
    /// Path to the config TOML file
    #[arg(short, long, default_value = "config.toml")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List configured fields
    Fields,
    /// Show the option rows of a field
    Options {
        /// Field key
        field: String,
    },
    /// Show what the input of a field looks like for an entity
    Render { entity: EntityId, field: String },
    /// Submit a raw value for an entity's field and store the result
    Save {
        entity: EntityId,
        field: String,
        value: String,
    },
    /// Print the stored value
    Load { entity: EntityId, field: String },
    /// Print every stored field value of an entity
    Show { entity: EntityId },
    /// Forget the stored value
    Clear { entity: EntityId, field: String },
    /// Print the value as API consumers see it
    Api { entity: EntityId, field: String },
    /// Run http server exposing the field callbacks
    Serve,
}

fn to_pretty_json<T: serde::Serialize>(value: &T) -> anyhow::Result<String> {
    serde_json::to_string_pretty(value).with_context(|| "Failed to encode output as JSON")
}

/// Entrypoint for CLI
pub fn run() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let path = cli
        .config
        .to_str()
        .with_context(|| format!("config path {:?} is not valid UTF-8", cli.config))?;
    let cfg = config::Config::load(path)?;

    let store = FieldStore::new(&cfg.database).with_context(|| "Failed to open field storage")?;
    let host = FieldHost::with_resolver_config(store, cfg.soundcloud, cfg.fields);

    match &cli.command {
        Commands::Fields => {
            println!("Available field types:");
            for field_type in host.registry().field_types() {
                if let Some(field) = host.registry().get(field_type) {
                    println!("  - {} ({})", field.name(), field.title());
                }
            }

            if host.fields().is_empty() {
                println!("No fields configured");
            }
            for field in host.fields() {
                println!("{} ({}): {}", field.key, field.field_type(), field.label);
            }
        }

        Commands::Options { field } => {
            let rows = host.render_options(field)?;
            if rows.is_empty() {
                println!("Field {field} has no options");
            }
            for row in rows {
                println!("{}: {} = {:?}", row.label, row.input.name, row.input.value);
            }
        }

        Commands::Render { entity, field } => {
            println!("{}", to_pretty_json(&host.render_field(*entity, field)?)?);
        }

        Commands::Save {
            entity,
            field,
            value,
        } => {
            let stored = host.save(*entity, field, value)?;
            if stored.is_null() {
                println!("Saved empty value for {field} on entity {entity}");
            } else {
                println!("Saved {field} on entity {entity}:");
                println!("{}", to_pretty_json(&stored)?);
            }
        }

        Commands::Load { entity, field } => {
            let value = host.load(*entity, field)?;
            match host.updated_at(*entity, field)? {
                Some(updated_at) => println!(
                    "Last saved {}",
                    i64_seconds_to_local_time(updated_at)?
                ),
                None => println!("Nothing saved yet"),
            }
            println!("{}", to_pretty_json(&value)?);
        }

        Commands::Show { entity } => {
            let values = host.values(*entity)?;
            if values.is_empty() {
                println!("Entity {entity} has no stored values");
            }
            for (key, value) in values {
                println!("{key}: {}", to_pretty_json(&value)?);
            }
        }

        Commands::Clear { entity, field } => {
            if host.clear(*entity, field)? {
                println!("Removed {field} from entity {entity}");
            } else {
                println!("Entity {entity} had no value for {field}");
            }
        }

        Commands::Api { entity, field } => {
            println!("{}", to_pretty_json(&host.api_value(*entity, field)?)?);
        }

        Commands::Serve => {
            println!("Starting HTTP server...");

            let http_server = crate::http::server::HttpServer::new(host, cfg.http);

            println!(
                "HTTP server running at http://{}:{}",
                http_server.config.bind_addr, http_server.config.port
            );
            http_server.run();
        }
    }

    Ok(())
}
