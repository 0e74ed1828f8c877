mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use kafkalens::resource::{Resource, ResourceHooks, ResourceKind};
use kafkalens::search::{SearchCoordinator, SearchHost, SearchMode, SubmitOutcome};
use kafkalens::supervisor::Recovery;
use kafkalens::view::TableModel;
use kafkalens_adapters::{GatewayError, MemoryGateway};
use kafkalens_types::TopicMeta;

use common::{wait_until, InstrumentedGateway};

const INTERVAL: Duration = Duration::from_millis(100);

#[derive(Default)]
struct RecordingHost {
    updates: Vec<(ResourceKind, String)>,
    not_found: Vec<String>,
    exited: bool,
}

impl SearchHost for RecordingHost {
    fn update_view(&mut self, resource: &Resource, filter: &str) {
        self.updates.push((resource.kind(), filter.to_string()));
    }

    fn resource_not_found(&mut self, text: &str) {
        self.not_found.push(text.to_string());
    }

    fn exit(&mut self) {
        self.exited = true;
    }
}

fn instrumented() -> (Arc<InstrumentedGateway>, ResourceHooks) {
    let gateway = Arc::new(InstrumentedGateway::default());
    let hooks = ResourceHooks::new(gateway.clone(), Recovery::new()).with_interval(INTERVAL);
    (gateway, hooks)
}

#[tokio::test(start_paused = true)]
async fn test_poller_fetches_immediately_then_on_interval() {
    let (gateway, hooks) = instrumented();
    let mut topics = Resource::new(ResourceKind::Topics, hooks);
    assert_eq!(gateway.fetches(), 0);

    topics.start_polling();
    wait_until(Duration::from_secs(1), || gateway.fetches() >= 1).await;
    wait_until(Duration::from_secs(1), || gateway.fetches() >= 3).await;

    let mut table = TableModel::new();
    topics.render(&mut table, "");
    assert_eq!(table.title(), "<Topics (2)>");

    topics.stop_and_wait().await;
    let fetched = gateway.fetches();
    tokio::time::sleep(INTERVAL * 5).await;
    assert_eq!(gateway.fetches(), fetched);
}

#[tokio::test(start_paused = true)]
async fn test_restarting_never_overlaps_pollers() {
    let (gateway, hooks) = instrumented();
    let mut resource = Resource::new(ResourceKind::Topics, hooks.clone());

    for round in 0..20 {
        resource.start_polling();
        // stop in the middle of an in-flight fetch every other round
        tokio::time::sleep(InstrumentedGateway::FETCH_TIME / 2).await;
        if round % 2 == 0 {
            resource.stop_polling();
        }
        let next = ResourceKind::ALL[round % 3];
        resource.switch_to(next, hooks.clone());
    }
    tokio::time::sleep(INTERVAL * 3).await;
    resource.stop_and_wait().await;

    assert!(gateway.fetches() > 0);
    assert_eq!(gateway.overlaps(), 0);
}

#[tokio::test]
async fn test_stop_is_idempotent_and_safe_before_start() {
    let gateway = Arc::new(MemoryGateway::new("local"));
    let mut resource = Resource::new(
        ResourceKind::Contexts,
        ResourceHooks::new(gateway, Recovery::new()),
    );

    resource.stop_polling();
    resource.stop_polling();
    assert!(!resource.is_polling());

    resource.start_polling();
    assert!(resource.is_polling());
    resource.stop_polling();
    resource.stop_polling();
    assert!(!resource.is_polling());
    resource.stop_and_wait().await;
}

#[tokio::test(start_paused = true)]
async fn test_fetch_error_keeps_stale_cache() {
    let (gateway, hooks) = instrumented();
    let errors = Arc::new(AtomicUsize::new(0));
    let seen = errors.clone();
    let hooks = hooks.on_error(move |kind, error| {
        assert_eq!(kind, ResourceKind::ConsumerGroups);
        assert!(matches!(error, GatewayError::Metadata(_)));
        seen.fetch_add(1, Ordering::SeqCst);
    });

    let mut groups = Resource::new(ResourceKind::ConsumerGroups, hooks);
    groups.start_polling();
    wait_until(Duration::from_secs(1), || gateway.fetches() >= 1).await;
    let mut table = TableModel::new();
    wait_until(Duration::from_secs(1), || {
        groups.render(&mut table, "");
        table.data_row_count() == 1
    })
    .await;

    gateway.set_failing(true);
    wait_until(Duration::from_secs(2), || errors.load(Ordering::SeqCst) >= 2).await;

    groups.render(&mut table, "");
    assert_eq!(table.data_rows()[0], vec!["billing", "Stable", "2"]);
    groups.stop_and_wait().await;
}

#[tokio::test]
async fn test_first_fetch_error_leaves_empty_cache() {
    let gateway = Arc::new(MemoryGateway::new("local"));
    gateway.fail_next_listing(GatewayError::Timeout);
    let errors = Arc::new(AtomicUsize::new(0));
    let seen = errors.clone();
    let hooks = ResourceHooks::new(gateway, Recovery::new())
        .on_error(move |_, _| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

    let mut topics = Resource::new(ResourceKind::Topics, hooks);
    topics.start_polling();
    wait_until(Duration::from_secs(1), || errors.load(Ordering::SeqCst) == 1).await;

    let mut table = TableModel::new();
    topics.render(&mut table, "");
    assert_eq!(table.data_row_count(), 0);
    assert_eq!(table.title(), "<Topics (0)>");
    topics.stop_and_wait().await;
}

#[tokio::test]
async fn test_submit_topics_switches_resource() {
    let gateway = Arc::new(MemoryGateway::new("local"));
    let hooks = ResourceHooks::new(gateway.clone(), Recovery::new());
    let mut active = Resource::new(ResourceKind::Contexts, hooks.clone());
    active.start_polling();

    let mut search = SearchCoordinator::new(hooks);
    search.focus_resource_search();
    search.set_input("topics");
    let mut host = RecordingHost::default();

    let outcome = search.submit(&mut active, &mut host);
    assert_eq!(outcome, SubmitOutcome::Switched(ResourceKind::Topics));
    assert_eq!(active.kind(), ResourceKind::Topics);
    assert!(active.is_polling());
    assert_eq!(host.updates, vec![(ResourceKind::Topics, String::new())]);
    assert!(!search.is_focused());
    active.stop_and_wait().await;
}

#[tokio::test]
async fn test_submit_exit_keyword_skips_lookup() {
    let gateway = Arc::new(MemoryGateway::new("local"));
    let hooks = ResourceHooks::new(gateway.clone(), Recovery::new());
    let mut active = Resource::new(ResourceKind::Topics, hooks.clone());

    for keyword in ["q", "exit"] {
        let mut search = SearchCoordinator::new(hooks.clone());
        search.focus_resource_search();
        search.set_input(keyword);
        let mut host = RecordingHost::default();

        assert_eq!(search.submit(&mut active, &mut host), SubmitOutcome::Exit);
        assert!(host.exited);
        assert!(host.updates.is_empty());
    }
    assert_eq!(active.kind(), ResourceKind::Topics);
    assert!(!active.is_polling());
    assert_eq!(gateway.listing_calls(), 0);
}

#[tokio::test]
async fn test_submit_unknown_resource_reports_not_found() {
    let gateway = Arc::new(MemoryGateway::new("local"));
    let hooks = ResourceHooks::new(gateway, Recovery::new());
    let mut active = Resource::new(ResourceKind::Topics, hooks.clone());
    let mut search = SearchCoordinator::new(hooks);
    search.focus_resource_search();
    search.set_input("Topics");
    let mut host = RecordingHost::default();

    assert_eq!(search.submit(&mut active, &mut host), SubmitOutcome::NotFound);
    assert_eq!(host.not_found, vec!["Topics".to_string()]);
    assert!(search.is_focused());
    assert_eq!(active.kind(), ResourceKind::Topics);
}

#[tokio::test]
async fn test_table_search_filters_current_resource() {
    let gateway = Arc::new(MemoryGateway::new("local"));
    gateway.add_topic("orders", TopicMeta::new(1, 1, 0));
    let hooks = ResourceHooks::new(gateway, Recovery::new());
    let mut active = Resource::new(ResourceKind::Topics, hooks.clone());
    active.start_polling();

    let mut search = SearchCoordinator::new(hooks);
    search.start_table_search();
    assert_eq!(search.mode(), SearchMode::TableSearch);
    search.set_input("q");
    let mut host = RecordingHost::default();

    assert_eq!(search.submit(&mut active, &mut host), SubmitOutcome::Filtered);
    assert!(!host.exited);
    assert_eq!(host.updates, vec![(ResourceKind::Topics, "q".to_string())]);
    assert!(active.is_polling());
    active.stop_and_wait().await;
}

#[tokio::test(start_paused = true)]
async fn test_error_after_stop_is_not_reported() {
    let (gateway, hooks) = instrumented();
    gateway.set_failing(true);
    let errors = Arc::new(AtomicUsize::new(0));
    let seen = errors.clone();
    let hooks = hooks.on_error(move |_, _| {
        seen.fetch_add(1, Ordering::SeqCst);
    });

    let mut topics = Resource::new(ResourceKind::Topics, hooks);
    topics.start_polling();
    // the first fetch is still in flight when the poller is stopped
    tokio::time::sleep(InstrumentedGateway::FETCH_TIME / 2).await;
    assert_eq!(gateway.fetches(), 1);
    topics.stop_and_wait().await;
    tokio::time::sleep(INTERVAL * 3).await;

    assert_eq!(gateway.fetches(), 1);
    assert_eq!(errors.load(Ordering::SeqCst), 0);
}
