//! tracker-aggregate - assemble tracked entity aggregates from a SQLite database
//!
//! Prints the assembled aggregates as JSON on stdout. Logs go to stderr.

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracker_aggregate::config::{APP_NAME, CONFIG_ENV_VAR};
use tracker_aggregate::{AccessScope, AggregateConfig, AggregateService, InclusionConfig, SqlRowFetcher};
use tracker_common::config::load_config;
use tracker_common::db::connect_readonly;

/// Command-line arguments for tracker-aggregate
#[derive(Parser, Debug)]
#[command(name = "tracker-aggregate")]
#[command(about = "Assemble tracked entity aggregates from flat tracker rows")]
#[command(version)]
struct Args {
    /// Tracked entity instance UIDs
    #[arg(required = true)]
    uids: Vec<String>,

    /// Config file (overrides TRACKER_AGGREGATE_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// SQLite database, overriding the config file
    #[arg(short, long, env = "TRACKER_DATABASE")]
    database: Option<PathBuf>,

    #[arg(long)]
    enrollments: bool,

    /// Events beneath enrollments; implies --enrollments
    ///
    /// A config file enabling events without enrollments skips events.
    #[arg(long)]
    events: bool,

    #[arg(long)]
    relationships: bool,

    #[arg(long)]
    program_owners: bool,

    #[arg(long)]
    all_attributes: bool,

    /// Everything above
    #[arg(long)]
    all: bool,

    /// Do not copy enrollment followup onto events
    #[arg(long)]
    no_followup: bool,

    /// Org units in the caller's search scope
    #[arg(long = "org-unit")]
    org_units: Vec<String>,

    /// Programs the caller may read
    #[arg(long = "program")]
    programs: Vec<String>,

    #[arg(long)]
    user: Option<String>,

    #[arg(long)]
    super_user: bool,

    #[arg(long)]
    pretty: bool,
}

impl Args {
    fn inclusion(&self, defaults: InclusionConfig) -> InclusionConfig {
        let mut flags = if self.all { InclusionConfig::all() } else { defaults };
        flags.include_enrollments |= self.enrollments || self.events;
        flags.include_events |= self.events;
        flags.include_relationships |= self.relationships;
        flags.include_program_owners |= self.program_owners;
        flags.include_all_attributes |= self.all_attributes;
        if self.no_followup {
            flags.propagate_followup = false;
        }
        flags
    }

    fn scope(&self) -> AccessScope {
        AccessScope {
            user: self.user.clone(),
            org_units: self.org_units.clone(),
            programs: self.programs.clone(),
            super_user: self.super_user,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tracker_aggregate=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    info!("Starting tracker-aggregate v{}", env!("CARGO_PKG_VERSION"));

    let (mut config, source) =
        load_config::<AggregateConfig>(args.config.as_deref(), CONFIG_ENV_VAR, APP_NAME)
            .context("Failed to load configuration")?;
    info!("Configuration: {:?}", source);

    config.inclusion = args.inclusion(config.inclusion);
    config.validate().context("Invalid configuration")?;

    let db_path = args
        .database
        .clone()
        .or_else(|| config.database_path.clone())
        .context("No database given (use --database or database_path in the config file)")?;
    info!("Database path: {}", db_path.display());

    let pool = connect_readonly(&db_path, config.max_connections)
        .await
        .with_context(|| format!("Failed to open {}", db_path.display()))?;

    let fetcher = Arc::new(SqlRowFetcher::new(pool, config.queries.clone()));
    let service = AggregateService::from_config(fetcher, &config);

    let aggregates = service
        .get_aggregates(&args.uids, &config.inclusion, &args.scope())
        .await?;

    let json = if args.pretty {
        serde_json::to_string_pretty(&aggregates)?
    } else {
        serde_json::to_string(&aggregates)?
    };
    println!("{}", json);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(std::iter::once("tracker-aggregate").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_events_flag_implies_enrollments() {
        let flags = parse(&["A", "--events"]).inclusion(InclusionConfig::default());
        assert!(flags.include_enrollments);
        assert!(flags.include_events);
        assert!(flags.events_enabled());
    }

    #[test]
    fn test_config_events_without_enrollments_stay_disabled() {
        let from_config = InclusionConfig::default().with_events(true);
        let flags = parse(&["A"]).inclusion(from_config);
        assert!(!flags.include_enrollments);
        assert!(!flags.events_enabled());
    }

    #[test]
    fn test_no_followup_overrides_config() {
        let flags = parse(&["A", "--all", "--no-followup"]).inclusion(InclusionConfig::default());
        assert!(flags.include_program_owners);
        assert!(!flags.propagate_followup);
    }
}
