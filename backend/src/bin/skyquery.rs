//! skyquery command line front-end.
//!
//! # Usage
//!
//! ```bash
//! # Kepler objects of interest for one star
//! skyquery exoplanet --table koi --where "kepid=10601284"
//!
//! # Show the request that would be sent, without sending it
//! skyquery exoplanet --table keplertimeseries --param kepid=8561063 --param quarter=14 --payload
//!
//! # ESASky cone search over every catalog
//! skyquery esasky --position "265.05 69.0" --radius-arcmin 1 --catalog all
//!
//! # Answer from recorded fixtures instead of the network
//! skyquery --replay backend/tests/data exoplanet --table koi --where "kepid=10601284"
//! ```
//!
//! # Environment Variables
//!
//! - `SKYQUERY_*`: endpoint, timeout and user agent overrides (see `config`)
//! - `NASA_EXOPLANET_ARCHIVE_GENERATE_RESPONSES`: record missing fixtures in replay mode
//! - `RUST_LOG`: Log level (default: info)

use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use skyquery::config::ClientConfig;
use skyquery::coords::{arcmin_to_degrees, SkyPosition};
use skyquery::esasky::{CatalogSelection, EsaSky};
use skyquery::exoplanet::{NasaExoplanetArchive, QueryCriteria};
use skyquery::replay::{FixtureGroup, FixtureStore, GenerateMode, ReplayTransport};
use skyquery::table::Table;
use skyquery::transport::{HttpTransport, Transport};

#[derive(Parser, Debug)]
#[command(name = "skyquery")]
#[command(about = "Query the NASA Exoplanet Archive and ESASky", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Configuration file (defaults to skyquery.toml or backend/skyquery.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Answer requests from the fixture directory instead of the network
    #[arg(long, global = true, value_name = "DIR")]
    replay: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Query a NASA Exoplanet Archive table
    Exoplanet(ExoplanetArgs),
    /// Cone search over ESASky catalogs
    Esasky(EsaSkyArgs),
    /// List the ESASky catalogs
    Catalogs,
}

#[derive(Args, Debug)]
struct ExoplanetArgs {
    /// Table name (e.g. ps, pscomppars, koi)
    #[arg(long)]
    table: String,

    /// Comma separated column list
    #[arg(long, default_value = "*")]
    select: String,

    #[arg(long = "where")]
    where_clause: Option<String>,

    #[arg(long)]
    order: Option<String>,

    /// Extra API parameter as key=value; may be repeated
    #[arg(long = "param", value_parser = parse_key_value)]
    params: Vec<(String, String)>,

    /// Print the request parameters instead of sending the query
    #[arg(long, default_value_t = false)]
    payload: bool,
}

#[derive(Args, Debug)]
struct EsaSkyArgs {
    /// Target as "ra dec" in decimal degrees
    #[arg(long)]
    position: SkyPosition,

    #[arg(long, default_value_t = 1.0)]
    radius_arcmin: f64,

    /// Catalog name, or "all"; may be repeated
    #[arg(long = "catalog", default_value = "all")]
    catalogs: Vec<String>,

    /// Maximum rows per catalog (defaults to the configured limit)
    #[arg(long)]
    row_limit: Option<u32>,
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| format!("expected key=value, got '{}'", s))
}

#[tokio::main]
async fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match cli.config {
        Some(ref path) => ClientConfig::from_file(path)?.with_env_overrides()?,
        None => ClientConfig::from_env()?,
    };
    let store = cli.replay.as_ref().map(|dir| {
        info!("Replaying fixtures from {}", dir.display());
        FixtureStore::from_settings(dir, &config.replay)
    });

    match cli.command {
        Command::Exoplanet(args) => {
            let transport = connect(
                &config,
                store.as_ref(),
                &[config.exoplanet.url_api.as_str(), config.exoplanet.url_tap.as_str()],
                FixtureGroup::ParamOr {
                    param: "table".to_string(),
                    fallback: "tap".to_string(),
                },
            )?;
            run_exoplanet(NasaExoplanetArchive::new(transport, &config), args).await
        }
        Command::Esasky(args) => {
            let esasky = EsaSky::new(esasky_transport(&config, store.as_ref())?, &config);
            run_esasky(esasky, args).await
        }
        Command::Catalogs => {
            let esasky = EsaSky::new(esasky_transport(&config, store.as_ref())?, &config);
            for name in esasky.get_catalog_names().await? {
                println!("{}", name);
            }
            Ok(())
        }
    }
}

/// Live transport, or a replaying one when a fixture directory was given.
fn connect<'s>(
    config: &ClientConfig,
    store: Option<&'s FixtureStore>,
    endpoints: &[&str],
    group: FixtureGroup,
) -> Result<Arc<dyn Transport + 's>> {
    let live = HttpTransport::new(config).context("Failed to build HTTP client")?;
    let Some(store) = store else {
        return Ok(Arc::new(live));
    };

    let mut replay = ReplayTransport::new(store, endpoints[0]);
    for endpoint in &endpoints[1..] {
        replay = replay.with_endpoint(*endpoint);
    }
    let replay = replay
        .with_group(group)
        .with_generate_mode(GenerateMode::FromEnv(config.replay.generate_env_var.clone()))
        .with_live(live);
    Ok(Arc::new(replay))
}

fn esasky_transport<'s>(
    config: &ClientConfig,
    store: Option<&'s FixtureStore>,
) -> Result<Arc<dyn Transport + 's>> {
    connect(
        config,
        store,
        &[config.esasky.url_catalogs.as_str(), config.esasky.url_tap.as_str()],
        FixtureGroup::Fixed("esasky".to_string()),
    )
}

async fn run_exoplanet<T: Transport>(
    archive: NasaExoplanetArchive<T>,
    args: ExoplanetArgs,
) -> Result<()> {
    let mut criteria = QueryCriteria::new().select(args.select);
    if let Some(clause) = args.where_clause {
        criteria = criteria.where_clause(clause);
    }
    if let Some(order) = args.order {
        criteria = criteria.order(order);
    }
    for (key, value) in args.params {
        criteria = criteria.param(key, value);
    }

    if args.payload {
        let payload = archive.query_criteria_payload(&args.table, &criteria).await?;
        println!("route: {:?}", payload.route);
        for (key, value) in &payload.params {
            println!("{}={}", key, value);
        }
        return Ok(());
    }

    let table = archive.query_criteria(&args.table, &criteria).await?;
    print_table(&table);
    Ok(())
}

async fn run_esasky<T: Transport>(esasky: EsaSky<T>, args: EsaSkyArgs) -> Result<()> {
    let selection = if args.catalogs.iter().any(|c| c.eq_ignore_ascii_case("all")) {
        if args.catalogs.len() > 1 {
            bail!("'all' cannot be combined with named catalogs");
        }
        CatalogSelection::All
    } else {
        CatalogSelection::Named(args.catalogs)
    };
    let row_limit = args.row_limit.unwrap_or_else(|| esasky.default_row_limit());

    let results = esasky
        .query_region_catalogs(
            args.position,
            arcmin_to_degrees(args.radius_arcmin),
            &selection,
            row_limit,
        )
        .await?;

    for (mission, table) in &results {
        println!("# {} ({} rows)", mission, table.len());
        print_table(table);
        println!();
    }
    Ok(())
}

/// Tab separated, header first.
fn print_table(table: &Table) {
    println!("{}", table.column_names().join("\t"));
    for row in 0..table.len() {
        let cells: Vec<&str> = table
            .columns()
            .iter()
            .map(|c| c.values[row].as_str())
            .collect();
        println!("{}", cells.join("\t"));
    }
}
