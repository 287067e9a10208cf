// src/config.rs
use crate::constants::{
    DEFAULT_COPY_PAUSE, DEFAULT_FETCH_ATTEMPTS, DEFAULT_FETCH_RETRY_DELAY, DEFAULT_WEBHOOK_HOST,
    DEFAULT_WEBHOOK_PORT, DEFAULT_WEBHOOK_ROUTE,
};
use crate::error::AppError;
use crate::error_recovery::RetryPolicy;
use crate::model::{PropertyMapping, RelayMapping};
use crate::relay::SyncedBlockScan;
use crate::types::{ApiKey, DatabaseId};
use clap::{Parser, Subcommand, ValueEnum};
use std::time::Duration;

/// Parsed command-line input.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct CommandLineInput {
    /// Notion integration token
    #[arg(long, env = "NOTION_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Enable verbose logging (debug level)
    #[arg(short, long, default_value_t = false, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: CommandInput,
}

#[derive(Subcommand, Debug)]
pub enum CommandInput {
    /// Copy every page of a source database into a target database
    Copy {
        /// Source database URL or ID
        #[arg(long)]
        source: String,

        /// Target database URL or ID
        #[arg(long)]
        target: String,

        /// Property rename as SOURCE=TARGET (repeatable)
        #[arg(short = 'm', long = "map", required = true)]
        mappings: Vec<String>,

        /// Pause after each page, in milliseconds
        #[arg(long, default_value_t = DEFAULT_COPY_PAUSE.as_millis() as u64)]
        pause_ms: u64,
    },

    /// Run the webhook server that relays synced blocks
    Serve {
        #[arg(long, default_value = DEFAULT_WEBHOOK_HOST)]
        host: String,

        #[arg(long, default_value_t = DEFAULT_WEBHOOK_PORT)]
        port: u16,

        /// Path of the webhook route
        #[arg(long, default_value = DEFAULT_WEBHOOK_ROUTE)]
        route: String,

        /// Static relay mapping as MARKER=RELATION_PROPERTY (repeatable)
        #[arg(long = "relay", conflicts_with = "mapping_database")]
        relays: Vec<String>,

        /// Database whose rows (Name = marker, Relation = property) define the mappings
        #[arg(long)]
        mapping_database: Option<String>,

        /// Skip a mapping instead of creating a synced block when none follows the marker
        #[arg(long, default_value_t = false)]
        no_create_synced_block: bool,

        /// Where the synced block must sit relative to its marker
        #[arg(long, value_enum, default_value_t = ScanInput::Adjacent)]
        scan: ScanInput,

        /// Where related page ids are read from
        #[arg(long, value_enum, default_value_t = RelationSource::Payload)]
        relations: RelationSource,

        /// Attempts for reading a page's blocks while Notion reports it missing
        #[arg(long, default_value_t = DEFAULT_FETCH_ATTEMPTS)]
        fetch_retries: u32,

        /// Delay between those attempts, in milliseconds
        #[arg(long, default_value_t = DEFAULT_FETCH_RETRY_DELAY.as_millis() as u64)]
        retry_delay_ms: u64,
    },

    /// List the databases shared with the integration
    Databases,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ScanInput {
    Adjacent,
    FirstAfter,
}

impl From<ScanInput> for SyncedBlockScan {
    fn from(scan: ScanInput) -> Self {
        match scan {
            ScanInput::Adjacent => SyncedBlockScan::Adjacent,
            ScanInput::FirstAfter => SyncedBlockScan::FirstAfterMarker,
        }
    }
}

/// Where the relay reads the triggering page's relation values from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum RelationSource {
    /// The properties carried by the webhook payload.
    #[default]
    Payload,
    /// A fresh read of the page through the API.
    Api,
}

/// Where relay mappings come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingSource {
    Static(Vec<RelayMapping>),
    /// Queried on every webhook call.
    Database(DatabaseId),
}

/// Everything the database copier needs.
#[derive(Debug, Clone)]
pub struct CopyConfig {
    pub source: DatabaseId,
    pub target: DatabaseId,
    pub mapping: PropertyMapping,
    pub pause: Duration,
}

/// Everything the webhook dispatcher needs.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub mappings: MappingSource,
    pub relation_source: RelationSource,
    pub create_missing_synced_block: bool,
    pub scan: SyncedBlockScan,
    pub fetch_retry: RetryPolicy,
}

impl RelayConfig {
    pub fn with_static_mappings(mappings: Vec<RelayMapping>) -> Self {
        Self {
            mappings: MappingSource::Static(mappings),
            relation_source: RelationSource::Payload,
            create_missing_synced_block: true,
            scan: SyncedBlockScan::Adjacent,
            fetch_retry: RetryPolicy::default(),
        }
    }
}

/// Listener settings for the webhook server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServeConfig {
    pub host: String,
    pub port: u16,
    pub route: String,
}

impl ServeConfig {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_WEBHOOK_HOST.to_string(),
            port: DEFAULT_WEBHOOK_PORT,
            route: DEFAULT_WEBHOOK_ROUTE.to_string(),
        }
    }
}

/// A validated command, ready to run.
#[derive(Debug, Clone)]
pub enum Command {
    Copy(CopyConfig),
    Serve { relay: RelayConfig, server: ServeConfig },
    Databases,
}

/// Resolved configuration for one invocation.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_key: ApiKey,
    pub verbose: bool,
    pub command: Command,
}

impl AppConfig {
    /// Validates CLI input (and the `NOTION_API_KEY` fallback clap already applied).
    pub fn resolve(cli: CommandLineInput) -> Result<Self, AppError> {
        let api_key = cli.api_key.ok_or_else(|| {
            AppError::MissingConfiguration(
                "NOTION_API_KEY environment variable not set".to_string(),
            )
        })?;
        let api_key = ApiKey::new(api_key)?;

        let command = match cli.command {
            CommandInput::Copy {
                source,
                target,
                mappings,
                pause_ms,
            } => {
                let mapping = mappings
                    .iter()
                    .map(|entry| PropertyMapping::parse_entry(entry))
                    .collect::<Result<PropertyMapping, _>>()?;
                Command::Copy(CopyConfig {
                    source: DatabaseId::parse(&source)?,
                    target: DatabaseId::parse(&target)?,
                    mapping,
                    pause: Duration::from_millis(pause_ms),
                })
            }
            CommandInput::Serve {
                host,
                port,
                route,
                relays,
                mapping_database,
                no_create_synced_block,
                scan,
                relations,
                fetch_retries,
                retry_delay_ms,
            } => {
                let mappings = match mapping_database {
                    Some(database) => MappingSource::Database(DatabaseId::parse(&database)?),
                    None if relays.is_empty() => {
                        return Err(AppError::MissingConfiguration(
                            "serve needs --relay MARKER=RELATION or --mapping-database".to_string(),
                        ))
                    }
                    None => MappingSource::Static(
                        relays
                            .iter()
                            .map(|entry| RelayMapping::parse(entry))
                            .collect::<Result<_, _>>()?,
                    ),
                };
                let route = if route.starts_with('/') {
                    route
                } else {
                    format!("/{}", route)
                };
                Command::Serve {
                    relay: RelayConfig {
                        mappings,
                        relation_source: relations,
                        create_missing_synced_block: !no_create_synced_block,
                        scan: scan.into(),
                        fetch_retry: RetryPolicy::new(
                            fetch_retries,
                            Duration::from_millis(retry_delay_ms),
                        ),
                    },
                    server: ServeConfig { host, port, route },
                }
            }
            CommandInput::Databases => Command::Databases,
        };

        Ok(Self {
            api_key,
            verbose: cli.verbose,
            command,
        })
    }
}
