//! searchctl - load a person feed into a search cache and run queries

mod query_spec;
mod report;
mod workload;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use recordstore::Person;
use searchcache::{SearchCache, SearchConfig};
use tracing::info;

use crate::query_spec::QuerySpec;
use crate::report::Report;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Person CSV feed (id,firstname,lastname,gender,country)
    #[arg(short, long)]
    data: PathBuf,

    /// Copies of the feed to load
    #[arg(short, long, default_value_t = 10)]
    replicas: u64,

    /// Query as attribute=value[,attribute=value...] (repeatable)
    #[arg(short, long = "query")]
    queries: Vec<QuerySpec>,

    /// Attributes to index
    #[arg(
        short,
        long,
        value_delimiter = ',',
        default_value = "lastname,gender,country"
    )]
    attributes: Vec<String>,

    /// Print a JSON report to stdout
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    info!("Starting searchctl v{}", env!("CARGO_PKG_VERSION"));
    info!("Feed: {}", args.data.display());
    info!("Replicas: {}", args.replicas);

    let config = args
        .attributes
        .iter()
        .fold(SearchConfig::new("persons"), |config, attr| config.attribute(attr.as_str()));
    let cache: SearchCache<Person> = SearchCache::new(config)?;
    info!("Searchable attributes: {}", cache.search_attributes().join(", "));

    let population = workload::populate(&cache, &args.data, args.replicas)?;

    let queries = if args.queries.is_empty() {
        QuerySpec::defaults()
    } else {
        args.queries
    };

    let mut outcomes = Vec::with_capacity(queries.len());
    for spec in &queries {
        outcomes.push(workload::run_query(&cache, spec)?);
    }

    if args.json {
        let report = Report {
            cache: cache.name().to_string(),
            base_records: population.base_records,
            entries: cache.len(),
            replaced: population.summary.replaced,
            populate_ms: population.millis,
            queries: outcomes,
        };
        println!("{}", report.to_json()?);
    }

    Ok(())
}
