//! Debounced search walkthrough for placesearch-rs
//!
//! Runs the controller against an in-memory cities source, so no API key is
//! needed. It shows:
//! - a burst of keystrokes collapsing into a single request
//! - page navigation and page-size changes fetching immediately
//! - an unknown country ending in "No result found" without a request

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use placesearch_rs::{
    ControllerConfig, CountryTable, PageRequest, Phase, PlaceRecord, QueryExecutor, Result,
    ResultPage, SearchController, Snapshot,
};

/// Serves `total` synthetic cities for whatever country is asked for.
struct InMemoryCities {
    total: u64,
    requests: Arc<AtomicUsize>,
}

#[async_trait]
impl QueryExecutor for InMemoryCities {
    async fn fetch(&self, request: PageRequest) -> Result<ResultPage> {
        self.requests.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(50)).await;

        let end = (request.offset + u64::from(request.limit)).min(self.total);
        let rows = (request.offset..end)
            .map(|i| PlaceRecord {
                id: i,
                name: format!("{} city #{}", request.code, i + 1),
                region: "Somewhere".into(),
                population: 1_000_000 / (i + 1),
                country_name: request.code.clone(),
                country_code: Some(request.code.clone()),
            })
            .collect();
        Ok(ResultPage::new(rows, self.total))
    }
}

fn settled(s: &Snapshot) -> bool {
    !matches!(s.phase, Phase::Idle | Phase::Pending)
}

fn print_snapshot(label: &str, s: &Snapshot) {
    println!("--- {label} ---");
    if !s.status_message().is_empty() {
        println!("{}", s.status_message());
    }
    for (i, row) in s.rows.iter().enumerate() {
        println!("{:>3}. {} (pop. {})", s.row_number(i), row.name, row.population);
    }
    if s.shows_pagination() {
        println!("page {} of {}", s.current_page, s.total_pages);
    }
    println!();
}

#[tokio::main]
async fn main() -> Result<()> {
    println!("=== placesearch-rs Debounced Search Example ===\n");

    let requests = Arc::new(AtomicUsize::new(0));
    let executor = InMemoryCities {
        total: 23,
        requests: Arc::clone(&requests),
    };
    let config = ControllerConfig {
        debounce: Duration::from_millis(300),
        ..ControllerConfig::default()
    };
    let mut handle =
        SearchController::spawn(config, executor, CountryTable::embedded()?.clone());

    // Example 1: typing "France" one key at a time
    for prefix in ["F", "Fr", "Fra", "Fran", "Franc", "France"] {
        handle.on_text_change(prefix)?;
        tokio::time::sleep(Duration::from_millis(40)).await;
    }
    let snap = handle.wait_until(settled).await?;
    print_snapshot("typed \"France\"", &snap);
    println!(
        "requests after six keystrokes: {}\n",
        requests.load(Ordering::SeqCst)
    );

    // Example 2: jump to the last page
    handle.on_page_click(snap.total_pages)?;
    let snap = handle
        .wait_until(|s| settled(s) && s.current_page == snap.total_pages)
        .await?;
    print_snapshot("last page", &snap);

    // Example 3: ten per page rewinds to page 1
    handle.on_page_size_change("10")?;
    let snap = handle
        .wait_until(|s| settled(s) && s.page_size == 10)
        .await?;
    print_snapshot("ten per page", &snap);

    // Example 4: a name the country table does not know
    let before = requests.load(Ordering::SeqCst);
    handle.on_text_change("Atlantis")?;
    let snap = handle.wait_until(|s| s.phase == Phase::Empty).await?;
    print_snapshot("typed \"Atlantis\"", &snap);
    println!(
        "requests issued for Atlantis: {}",
        requests.load(Ordering::SeqCst) - before
    );

    handle.shutdown()?;
    Ok(())
}
