//! placesearch: command-line interface for placesearch-core
//!
//! Resolves country names to ISO2 codes with the bundled country table and
//! pages through the remote cities API, either one request at a time or
//! through the debounced search controller.
//!
//! Usage examples
//! --------------
//!
//! - Resolve a name offline
//!   $ placesearch resolve "United Kingdom"
//!
//! - Fetch page 2 of French cities, ten per page
//!   $ placesearch fetch France --page 2 --size 10
//!
//! - Type names and page through results
//!   $ placesearch interactive
//!
//! The API key comes from `--api-key` or `PLACESEARCH_API_KEY`. Set
//! `RUST_LOG=placesearch_core=debug` (or pass `-v`) to watch the controller's
//! dispatch and stale-reply decisions on stderr.
mod args;

use std::time::Duration;

use crate::args::{CliArgs, Commands};
use anyhow::{bail, Context};
use clap::Parser;
use placesearch_cli::repl::{self, ReplCommand};
use placesearch_core::{
    ClientConfig, ControllerConfig, CountryTable, GeoDbClient, PageRequest, PageSize,
    QueryExecutor, Resolver, SearchController,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    init_tracing(args.verbose);

    let table = match &args.countries {
        Some(path) => CountryTable::load_from_path(path)
            .with_context(|| format!("loading country table from {path}"))?,
        None => CountryTable::embedded()?.clone(),
    };
    tracing::debug!(countries = table.len(), "country table ready");

    match args.command {
        Commands::Resolve { ref name } => match table.resolve(name) {
            Some(code) => println!("{code}"),
            None => println!("No result found"),
        },

        Commands::Fetch {
            ref name,
            page,
            ref size,
        } => {
            let page_size: PageSize = size.parse()?;
            let Some(code) = table.resolve(name) else {
                println!("No result found");
                return Ok(());
            };
            let client = build_client(&args)?;
            let result = client
                .fetch(PageRequest::new(&code, page.max(1), page_size))
                .await?;

            if result.is_empty() {
                println!("No result found");
                return Ok(());
            }
            let total_pages = placesearch_core::compute_total_pages(result.total_count, page_size);
            if result.rows.is_empty() {
                println!("page {} is past the last page ({total_pages})", page.max(1));
                return Ok(());
            }
            let first = u64::from(page.max(1) - 1) * u64::from(page_size.get());
            for (i, row) in result.rows.iter().enumerate() {
                println!(
                    "{:>4}  {} ({}), population {}",
                    first + i as u64 + 1,
                    row.name,
                    row.region,
                    row.population
                );
            }
            println!(
                "page {} of {} ({} cities in {code})",
                page.max(1),
                total_pages,
                result.total_count
            );
        }

        Commands::Interactive { debounce_ms } => {
            let client = build_client(&args)?;
            let config = ControllerConfig {
                debounce: Duration::from_millis(debounce_ms),
                ..ControllerConfig::default()
            };
            run_interactive(config, client, table).await?;
        }
    }

    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "debug" } else { "warn" })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn build_client(args: &CliArgs) -> anyhow::Result<GeoDbClient> {
    let Some(key) = args.api_key.as_deref() else {
        bail!("an API key is required: pass --api-key or set PLACESEARCH_API_KEY");
    };
    let config = ClientConfig::new(&args.api_url, key)?.with_api_host(&args.api_host);
    Ok(GeoDbClient::new(config)?)
}

async fn run_interactive(
    config: ControllerConfig,
    client: GeoDbClient,
    table: CountryTable,
) -> anyhow::Result<()> {
    let handle = SearchController::spawn(config, client, table);

    // Redraw on every published change.
    let mut updates = handle.subscribe();
    let renderer = tokio::spawn(async move {
        while updates.changed().await.is_ok() {
            let snap = updates.borrow_and_update().clone();
            print!("{}", repl::render(&snap));
        }
    });

    println!("{}", repl::HELP);
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let cmd = match repl::parse_line(&line) {
            Ok(cmd) => cmd,
            Err(msg) => {
                eprintln!("{msg}");
                continue;
            }
        };
        match cmd {
            ReplCommand::Text(text) => handle.on_text_change(text)?,
            ReplCommand::Page(n) => handle.on_page_click(n)?,
            ReplCommand::Next => match handle.snapshot().next_page() {
                Some(n) => handle.on_page_click(n)?,
                None => eprintln!("already on the last page"),
            },
            ReplCommand::Prev => match handle.snapshot().previous_page() {
                Some(n) => handle.on_page_click(n)?,
                None => eprintln!("already on the first page"),
            },
            ReplCommand::Size(value) => handle.on_page_size_change(value)?,
            ReplCommand::Show => print!("{}", repl::render(&handle.snapshot())),
            ReplCommand::Help => println!("{}", repl::HELP),
            ReplCommand::Quit => break,
        }
    }

    handle.shutdown()?;
    drop(handle);
    let _ = renderer.await;
    Ok(())
}
