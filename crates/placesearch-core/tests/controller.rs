use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use placesearch_core::{
    ControllerConfig, PageRequest, Phase, PlaceRecord, QueryExecutor, Result, ResultPage,
    SearchController, SearchError, SearchHandle, Snapshot,
};

struct Scripted {
    delay: Duration,
    outcome: Result<ResultPage>,
}

/// Answers fetches after a per-reply delay: replies keyed to a specific
/// request first, then the unkeyed queue in call order.
#[derive(Clone, Default)]
struct ScriptedExecutor {
    keyed: Arc<Mutex<Vec<(PageRequest, Scripted)>>>,
    script: Arc<Mutex<VecDeque<Scripted>>>,
    requests: Arc<Mutex<Vec<PageRequest>>>,
}

impl ScriptedExecutor {
    fn reply(&self, delay_ms: u64, outcome: Result<ResultPage>) -> &Self {
        self.script.lock().unwrap().push_back(Scripted {
            delay: Duration::from_millis(delay_ms),
            outcome,
        });
        self
    }

    fn reply_to(&self, req: PageRequest, delay_ms: u64, outcome: Result<ResultPage>) -> &Self {
        self.keyed.lock().unwrap().push((
            req,
            Scripted {
                delay: Duration::from_millis(delay_ms),
                outcome,
            },
        ));
        self
    }

    fn requests(&self) -> Vec<PageRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl QueryExecutor for ScriptedExecutor {
    async fn fetch(&self, request: PageRequest) -> Result<ResultPage> {
        self.requests.lock().unwrap().push(request.clone());
        let keyed = {
            let mut keyed = self.keyed.lock().unwrap();
            keyed
                .iter()
                .position(|(r, _)| *r == request)
                .map(|idx| keyed.remove(idx).1)
        };
        let next = keyed.or_else(|| self.script.lock().unwrap().pop_front());
        match next {
            Some(Scripted { delay, outcome }) => {
                tokio::time::sleep(delay).await;
                outcome
            }
            None => Ok(ResultPage::default()),
        }
    }
}

fn place(id: u64, name: &str) -> PlaceRecord {
    PlaceRecord {
        id,
        name: name.to_string(),
        region: "Somewhere".to_string(),
        population: 1000 * id,
        country_name: "France".to_string(),
        country_code: Some("FR".to_string()),
    }
}

fn page_of(prefix: &str, n: u64, total_count: u64) -> ResultPage {
    let rows = (1..=n).map(|i| place(i, &format!("{prefix}-{i}"))).collect();
    ResultPage::new(rows, total_count)
}

fn request(code: &str, limit: u32, offset: u64) -> PageRequest {
    PageRequest {
        code: code.to_string(),
        limit,
        offset,
    }
}

/// Resolves a few fixed names and records every lookup.
fn recording_resolver() -> (
    Arc<Mutex<Vec<String>>>,
    impl Fn(&str) -> Option<String> + Send + Sync + 'static,
) {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let seen = calls.clone();
    let resolver = move |name: &str| {
        seen.lock().unwrap().push(name.to_string());
        match name.trim() {
            "Paris" | "France" => Some("FR".to_string()),
            "Germany" => Some("DE".to_string()),
            _ => None,
        }
    };
    (calls, resolver)
}

fn start(executor: &ScriptedExecutor) -> (SearchHandle, Arc<Mutex<Vec<String>>>) {
    let (calls, resolver) = recording_resolver();
    let handle = SearchController::spawn(ControllerConfig::default(), executor.clone(), resolver);
    (handle, calls)
}

async fn settle<F>(handle: &mut SearchHandle, pred: F) -> Snapshot
where
    F: FnMut(&Snapshot) -> bool,
{
    tokio::time::timeout(Duration::from_secs(30), handle.wait_until(pred))
        .await
        .expect("controller never reached the expected state")
        .expect("controller closed")
}

fn settled(s: &Snapshot) -> bool {
    matches!(s.phase, Phase::Results | Phase::Empty | Phase::Error)
}

#[tokio::test(start_paused = true)]
async fn resolves_and_fetches_first_page() {
    let exec = ScriptedExecutor::default();
    exec.reply(20, Ok(page_of("paris", 5, 12)));
    let (mut handle, _) = start(&exec);

    assert_eq!(handle.snapshot().phase, Phase::Idle);
    handle.on_text_change("Paris").unwrap();

    let snap = settle(&mut handle, settled).await;
    assert_eq!(snap.phase, Phase::Results);
    assert_eq!(snap.total_pages, 3);
    assert_eq!(snap.current_page, 1);
    assert_eq!(snap.rows.len(), 5);
    assert_eq!(snap.status_message(), "");
    assert_eq!(snap.resolved_code.as_deref(), Some("FR"));
    assert!(snap.is_first_page);
    assert!(!snap.is_last_page);
    assert_eq!(exec.requests(), vec![request("FR", 5, 0)]);
}

#[tokio::test(start_paused = true)]
async fn text_edit_shows_searching_until_debounce_fires() {
    let exec = ScriptedExecutor::default();
    exec.reply(0, Ok(page_of("paris", 5, 12)));
    let (mut handle, _) = start(&exec);

    handle.on_text_change("Paris").unwrap();
    let pending = settle(&mut handle, |s| s.phase == Phase::Pending).await;
    assert_eq!(pending.status_message(), "Start Searching...");
    assert_eq!(pending.search_text, "Paris");

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert!(exec.requests().is_empty(), "fetched before the quiescence window elapsed");

    settle(&mut handle, settled).await;
    assert_eq!(exec.requests().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn resolver_miss_never_touches_the_network() {
    let exec = ScriptedExecutor::default();
    let (mut handle, calls) = start(&exec);

    handle.on_text_change("Nowhereland").unwrap();
    let snap = settle(&mut handle, settled).await;

    assert_eq!(snap.phase, Phase::Empty);
    assert_eq!(snap.status_message(), "No result found");
    assert_eq!(snap.total_pages, 0);
    assert!(snap.rows.is_empty());
    assert!(exec.requests().is_empty());
    assert_eq!(*calls.lock().unwrap(), vec!["Nowhereland".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn burst_of_edits_issues_one_fetch_with_last_text() {
    let exec = ScriptedExecutor::default();
    exec.reply(10, Ok(page_of("paris", 5, 12)));
    let (mut handle, calls) = start(&exec);

    for text in ["P", "Pa", "Par", "Pari", "Paris"] {
        handle.on_text_change(text).unwrap();
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
    let snap = settle(&mut handle, settled).await;
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert_eq!(snap.phase, Phase::Results);
    assert_eq!(snap.search_text, "Paris");
    assert_eq!(exec.requests(), vec![request("FR", 5, 0)]);
    assert_eq!(*calls.lock().unwrap(), vec!["Paris".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn page_click_fetches_immediately() {
    let exec = ScriptedExecutor::default();
    exec.reply(0, Ok(page_of("p1", 5, 12)))
        .reply(0, Ok(page_of("p2", 5, 12)));
    let (mut handle, _) = start(&exec);

    handle.on_text_change("Paris").unwrap();
    settle(&mut handle, settled).await;

    let before = tokio::time::Instant::now();
    handle.on_page_click(2).unwrap();
    let snap = settle(&mut handle, |s| s.phase == Phase::Results && s.current_page == 2).await;

    assert!(before.elapsed() < Duration::from_millis(600), "page click was debounced");
    assert_eq!(snap.rows[0].name, "p2-1");
    assert_eq!(snap.row_number(0), 6);
    assert_eq!(
        exec.requests(),
        vec![request("FR", 5, 0), request("FR", 5, 5)]
    );
}

#[tokio::test(start_paused = true)]
async fn page_size_change_rewinds_to_first_page() {
    let exec = ScriptedExecutor::default();
    exec.reply(0, Ok(page_of("p1", 5, 12)))
        .reply(0, Ok(page_of("p2", 5, 12)))
        .reply(0, Ok(page_of("big", 10, 12)));
    let (mut handle, _) = start(&exec);

    handle.on_text_change("Paris").unwrap();
    settle(&mut handle, settled).await;
    handle.on_page_click(2).unwrap();
    settle(&mut handle, |s| s.phase == Phase::Results && s.current_page == 2).await;

    handle.on_page_size_change("10").unwrap();
    let snap = settle(&mut handle, |s| s.phase == Phase::Results && s.page_size == 10).await;

    assert_eq!(snap.current_page, 1);
    assert_eq!(snap.total_pages, 2);
    assert_eq!(exec.requests().last(), Some(&request("FR", 10, 0)));
}

#[tokio::test(start_paused = true)]
async fn invalid_page_sizes_leave_state_unchanged() {
    let exec = ScriptedExecutor::default();
    exec.reply(0, Ok(page_of("p1", 5, 12)));
    let (mut handle, _) = start(&exec);

    handle.on_text_change("Paris").unwrap();
    let before = settle(&mut handle, settled).await;

    for bad in ["0", "11", "-1", "abc", "", "3.5"] {
        handle.on_page_size_change(bad).unwrap();
    }
    tokio::time::sleep(Duration::from_secs(1)).await;

    let after = handle.snapshot();
    assert_eq!(after, before);
    assert_eq!(after.page_size, 5);
    assert_eq!(exec.requests().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn out_of_range_and_same_page_clicks_are_ignored() {
    let exec = ScriptedExecutor::default();
    exec.reply(0, Ok(page_of("p1", 5, 12)));
    let (mut handle, _) = start(&exec);

    handle.on_text_change("Paris").unwrap();
    let before = settle(&mut handle, settled).await;

    for page in [0, 1, 4, 99] {
        handle.on_page_click(page).unwrap();
    }
    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(handle.snapshot(), before);
    assert_eq!(exec.requests().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn late_reply_from_older_page_click_is_dropped() {
    let exec = ScriptedExecutor::default();
    exec.reply(0, Ok(page_of("p1", 5, 12)))
        .reply_to(request("FR", 5, 5), 500, Ok(page_of("slow", 5, 12)))
        .reply_to(request("FR", 5, 10), 50, Ok(page_of("fast", 2, 12)));
    let (mut handle, _) = start(&exec);

    handle.on_text_change("Paris").unwrap();
    let first = settle(&mut handle, settled).await;

    handle.on_page_click(2).unwrap();
    handle.on_page_click(3).unwrap();

    let snap = settle(&mut handle, |s| s.phase == Phase::Results && s.current_page == 3).await;
    assert_eq!(snap.generation, first.generation + 2);
    assert_eq!(snap.rows[0].name, "fast-1");

    // Let the slow generation-1 reply land; it must not win.
    tokio::time::sleep(Duration::from_secs(2)).await;
    let last = handle.snapshot();
    assert_eq!(last.rows[0].name, "fast-1");
    assert_eq!(last.current_page, 3);
    assert!(last.is_last_page);
    let mut sent = exec.requests();
    sent.sort_by_key(|r| r.offset);
    assert_eq!(
        sent,
        vec![
            request("FR", 5, 0),
            request("FR", 5, 5),
            request("FR", 5, 10)
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn new_text_supersedes_in_flight_fetch() {
    let exec = ScriptedExecutor::default();
    exec.reply(2_000, Ok(page_of("france", 5, 40)))
        .reply(10, Ok(page_of("germany", 3, 3)));
    let (mut handle, _) = start(&exec);

    handle.on_text_change("France").unwrap();
    // Debounce fires at 600ms; the France fetch is now in flight.
    tokio::time::sleep(Duration::from_millis(700)).await;
    assert_eq!(exec.requests().len(), 1);

    handle.on_text_change("Germany").unwrap();
    let snap = settle(&mut handle, settled).await;
    assert_eq!(snap.rows[0].name, "germany-1");

    tokio::time::sleep(Duration::from_secs(3)).await;
    let last = handle.snapshot();
    assert_eq!(last.rows[0].name, "germany-1");
    assert_eq!(last.total_pages, 1);
    assert_eq!(last.resolved_code.as_deref(), Some("DE"));
}

#[tokio::test(start_paused = true)]
async fn zero_results_is_empty_not_error() {
    let exec = ScriptedExecutor::default();
    exec.reply(0, Ok(ResultPage::new(Vec::new(), 0)));
    let (mut handle, _) = start(&exec);

    handle.on_text_change("France").unwrap();
    let snap = settle(&mut handle, settled).await;

    assert_eq!(snap.phase, Phase::Empty);
    assert_eq!(snap.status_message(), "No result found");
    assert_eq!(snap.total_pages, 0);
    assert_eq!(snap.current_page, 1);
}

#[tokio::test(start_paused = true)]
async fn transport_failure_shows_error_until_next_action() {
    let exec = ScriptedExecutor::default();
    exec.reply(0, Ok(page_of("p1", 5, 12)))
        .reply(
            0,
            Err(SearchError::Status {
                status: 503,
                body: "unavailable".into(),
            }),
        )
        .reply(0, Ok(page_of("p3", 2, 12)));
    let (mut handle, _) = start(&exec);

    handle.on_text_change("Paris").unwrap();
    settle(&mut handle, settled).await;

    handle.on_page_click(2).unwrap();
    let failed = settle(&mut handle, |s| s.phase == Phase::Error).await;
    assert_eq!(failed.status_message(), "Error fetching data");
    assert!(failed.rows.is_empty());
    assert_eq!(failed.total_pages, 3);
    assert_eq!(failed.current_page, 2);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(handle.snapshot().phase, Phase::Error);

    // Navigating away recovers.
    handle.on_page_click(3).unwrap();
    let snap = settle(&mut handle, |s| s.phase == Phase::Results).await;
    assert_eq!(snap.rows[0].name, "p3-1");
}

#[tokio::test(start_paused = true)]
async fn page_size_change_cancels_pending_debounce() {
    let exec = ScriptedExecutor::default();
    exec.reply(0, Ok(page_of("p1", 5, 12)))
        .reply(0, Ok(page_of("big", 10, 12)));
    let (mut handle, _) = start(&exec);

    handle.on_text_change("Paris").unwrap();
    settle(&mut handle, settled).await;

    // Retype, then change the size before the window elapses: only the size edit fetches.
    handle.on_text_change("Paris").unwrap();
    tokio::time::sleep(Duration::from_millis(100)).await;
    handle.on_page_size_change("10").unwrap();
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert_eq!(
        exec.requests(),
        vec![request("FR", 5, 0), request("FR", 10, 0)]
    );
    let snap = handle.snapshot();
    assert_eq!(snap.phase, Phase::Results);
    assert_eq!(snap.current_page, 1);
    assert_eq!(snap.total_pages, 2);
    assert_eq!(snap.rows[0].name, "big-1");
}

#[tokio::test(start_paused = true)]
async fn text_edit_drops_previous_totals_before_page_clicks() {
    let exec = ScriptedExecutor::default();
    exec.reply(0, Ok(page_of("paris", 5, 12)))
        .reply(0, Ok(page_of("germany", 3, 3)));
    let (mut handle, _) = start(&exec);

    handle.on_text_change("Paris").unwrap();
    let paris = settle(&mut handle, settled).await;
    assert_eq!(paris.total_pages, 3);

    handle.on_text_change("Germany").unwrap();
    let pending = settle(&mut handle, |s| s.search_text == "Germany").await;
    assert_eq!(pending.phase, Phase::Pending);
    assert_eq!(pending.total_pages, 0);
    assert!(pending.rows.is_empty());

    // Page 3 belonged to the Paris search.
    tokio::time::sleep(Duration::from_millis(100)).await;
    handle.on_page_click(3).unwrap();

    let snap = settle(&mut handle, |s| {
        settled(s) && s.resolved_code.as_deref() == Some("DE")
    })
    .await;
    assert_eq!(snap.phase, Phase::Results);
    assert_eq!(snap.current_page, 1);
    assert_eq!(snap.total_pages, 1);
    assert_eq!(snap.rows[0].name, "germany-1");
    assert_eq!(
        exec.requests(),
        vec![request("FR", 5, 0), request("DE", 5, 0)]
    );
}

#[tokio::test(start_paused = true)]
async fn page_past_shrunken_total_falls_back_to_last_page() {
    let exec = ScriptedExecutor::default();
    exec.reply(0, Ok(page_of("p1", 5, 12)))
        .reply_to(request("FR", 5, 10), 0, Ok(ResultPage::new(Vec::new(), 7)))
        .reply_to(request("FR", 5, 5), 0, Ok(page_of("p2", 2, 7)));
    let (mut handle, _) = start(&exec);

    handle.on_text_change("Paris").unwrap();
    settle(&mut handle, settled).await;

    handle.on_page_click(3).unwrap();
    let snap = settle(&mut handle, |s| s.phase == Phase::Results && s.current_page == 2).await;

    assert_eq!(snap.total_pages, 2);
    assert!(snap.is_last_page);
    assert_eq!(snap.rows[0].name, "p2-1");
    assert_eq!(snap.status_message(), "");
    assert_eq!(
        exec.requests(),
        vec![
            request("FR", 5, 0),
            request("FR", 5, 10),
            request("FR", 5, 5)
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn panicking_executor_ends_in_error() {
    struct Panicking;

    #[async_trait]
    impl QueryExecutor for Panicking {
        async fn fetch(&self, _request: PageRequest) -> Result<ResultPage> {
            panic!("executor blew up");
        }
    }

    let (_, resolver) = recording_resolver();
    let mut handle = SearchController::spawn(ControllerConfig::default(), Panicking, resolver);

    handle.on_text_change("Paris").unwrap();
    let snap = settle(&mut handle, settled).await;

    assert_eq!(snap.phase, Phase::Error);
    assert_eq!(snap.status_message(), "Error fetching data");
    assert!(snap.rows.is_empty());

    // The controller keeps serving after the panic.
    handle.on_text_change("Nowhereland").unwrap();
    let snap = settle(&mut handle, |s| s.phase == Phase::Empty).await;
    assert_eq!(snap.status_message(), "No result found");
}

#[tokio::test(start_paused = true)]
async fn shutdown_cancels_pending_search() {
    let exec = ScriptedExecutor::default();
    let (mut handle, calls) = start(&exec);

    handle.on_text_change("Paris").unwrap();
    settle(&mut handle, |s| s.phase == Phase::Pending).await;
    handle.shutdown().unwrap();
    tokio::time::sleep(Duration::from_secs(2)).await;

    assert!(exec.requests().is_empty());
    assert!(calls.lock().unwrap().is_empty());
    assert!(matches!(
        handle.on_text_change("Germany"),
        Err(SearchError::ControllerClosed)
    ));
    assert!(matches!(
        handle.changed().await,
        Err(SearchError::ControllerClosed)
    ));
}

#[tokio::test(start_paused = true)]
async fn independent_controllers_do_not_interfere() {
    let a = ScriptedExecutor::default();
    a.reply(0, Ok(page_of("a", 5, 12)));
    let b = ScriptedExecutor::default();
    b.reply(0, Ok(page_of("b", 3, 3)));
    let (mut ha, _) = start(&a);
    let (mut hb, _) = start(&b);

    ha.on_text_change("Paris").unwrap();
    hb.on_text_change("Germany").unwrap();
    let sa = settle(&mut ha, settled).await;
    let sb = settle(&mut hb, settled).await;

    assert_eq!(sa.rows[0].name, "a-1");
    assert_eq!(sb.rows[0].name, "b-1");
    assert_eq!(a.requests(), vec![request("FR", 5, 0)]);
    assert_eq!(b.requests(), vec![request("DE", 5, 0)]);
}
