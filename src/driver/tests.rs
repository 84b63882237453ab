//! Tests for the page driver

use super::*;
use crate::pagination::PageRequest;
use crate::test_support::MockSource;
use crate::types::FetchStatus;
use pretty_assertions::assert_eq;

const SETTLE: Duration = Duration::from_secs(2);

fn req(offset: u64, limit: u32) -> PageRequest {
    PageRequest { offset, limit }
}

fn quiet_config() -> DriverConfig {
    DriverConfig {
        refresh_interval: Duration::from_secs(3600),
        ..DriverConfig::default()
    }
}

fn start(source: &Arc<MockSource>, page: u32, page_size: u32, config: DriverConfig) -> PageDriver {
    let store = Arc::new(ResultStore::new(source.clone()));
    PageDriver::spawn(store, PaginationModel::new(page, page_size).unwrap(), config).unwrap()
}

async fn eventually(what: &str, mut check: impl FnMut() -> bool) {
    for _ in 0..400 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    panic!("timed out waiting for {what}");
}

#[tokio::test]
async fn test_initial_evaluation_fetches_first_page() {
    let source = Arc::new(MockSource::new(100));
    let driver = start(&source, 0, 10, quiet_config());

    let snapshot = driver.wait_settled(driver.model(), SETTLE).await;
    assert_eq!(snapshot.status, FetchStatus::Finished);
    assert_eq!(snapshot.result.len(), 10);
    assert_eq!(source.requests()[0], req(0, 10));

    driver.shutdown().await;
}

#[tokio::test]
async fn test_wait_settled_for_superseded_model_times_out() {
    let source = Arc::new(MockSource::new(100));
    let driver = start(&source, 0, 10, quiet_config());
    let first = driver.model();
    driver.set_page(3);

    let snapshot = driver.wait_settled(driver.model(), SETTLE).await;
    assert_eq!(snapshot.last_request, Some(req(30, 10)));

    // The store now answers page 3, so page 0 never settles
    let snapshot = driver.wait_settled(first, Duration::from_millis(50)).await;
    assert!(!is_settled(&first, &snapshot));
    assert_eq!(snapshot.last_request, Some(req(30, 10)));

    driver.shutdown().await;
}

#[tokio::test]
async fn test_initial_offset_for_later_page() {
    let source = Arc::new(MockSource::new(100));
    let driver = start(&source, 2, 25, quiet_config());

    let snapshot = driver.wait_settled(driver.model(), SETTLE).await;
    assert_eq!(snapshot.last_request, Some(req(50, 25)));
    assert_eq!(snapshot.result.data[0].sequence_info.tx_order, 50);

    driver.shutdown().await;
}

#[tokio::test]
async fn test_no_second_fetch_while_loading() {
    let source = Arc::new(MockSource::new(100).gated());
    let driver = start(&source, 0, 10, quiet_config());

    eventually("first request", || source.request_count() == 1).await;
    assert_eq!(driver.store().status(), FetchStatus::Loading);

    // Navigation during a load is held back by the guard
    driver.next_page();
    driver.next_page();
    driver.next_page();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(source.request_count(), 1);

    // Completion is a store change, so the new page is fetched next
    source.release(1);
    eventually("follow-up request", || source.request_count() == 2).await;
    assert_eq!(source.requests(), vec![req(0, 10), req(30, 10)]);

    source.release(1);
    let snapshot = driver.wait_settled(driver.model(), SETTLE).await;
    assert_eq!(snapshot.last_request, Some(req(30, 10)));

    driver.shutdown().await;
}

#[tokio::test]
async fn test_exhausted_result_stops_fetching() {
    let source = Arc::new(MockSource::new(5));
    let driver = start(&source, 0, 10, DriverConfig {
        refresh_interval: Duration::from_millis(10),
        ..DriverConfig::default()
    });

    let snapshot = driver.wait_settled(driver.model(), SETTLE).await;
    assert_eq!(snapshot.status, FetchStatus::Finished);
    assert!(!snapshot.result.has_next_page);

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(source.request_count(), 1);

    driver.shutdown().await;
}

#[tokio::test]
async fn test_stale_exhausted_flag_blocks_other_pages() {
    let source = Arc::new(MockSource::new(15));
    let driver = start(&source, 1, 10, quiet_config());

    let snapshot = driver.wait_settled(driver.model(), SETTLE).await;
    assert!(!snapshot.result.has_next_page);

    driver.set_page(0);
    let snapshot = driver.wait_settled(driver.model(), SETTLE).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(source.requests(), vec![req(10, 10)]);
    assert_eq!(snapshot.last_request, Some(req(10, 10)));
    assert!(is_settled(&driver.model(), &snapshot));

    driver.shutdown().await;
}

#[tokio::test]
async fn test_current_page_refreshes_while_more_data() {
    let source = Arc::new(MockSource::new(100));
    let driver = start(&source, 0, 10, DriverConfig {
        refresh_interval: Duration::from_millis(20),
        ..DriverConfig::default()
    });

    eventually("repeat fetches", || source.request_count() >= 3).await;
    assert!(source.requests().iter().all(|r| *r == req(0, 10)));

    driver.shutdown().await;
}

#[tokio::test]
async fn test_repeat_fetches_are_spaced() {
    let source = Arc::new(MockSource::new(100));
    let driver = start(&source, 0, 10, quiet_config());

    driver.wait_settled(driver.model(), SETTLE).await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(source.request_count(), 1);

    // A different request is not held back by the interval
    driver.next_page();
    let snapshot = driver.wait_settled(driver.model(), SETTLE).await;
    assert_eq!(snapshot.last_request, Some(req(10, 10)));
    assert_eq!(source.request_count(), 2);

    driver.shutdown().await;
}

#[tokio::test]
async fn test_page_size_change_keeps_page_index() {
    let source = Arc::new(MockSource::new(500));
    let driver = start(&source, 2, 10, quiet_config());
    driver.wait_settled(driver.model(), SETTLE).await;

    driver.set_page_size(25).unwrap();
    assert_eq!(driver.model(), PaginationModel { page: 2, page_size: 25 });

    let snapshot = driver.wait_settled(driver.model(), SETTLE).await;
    assert_eq!(snapshot.last_request, Some(req(50, 25)));

    driver.shutdown().await;
}

#[tokio::test]
async fn test_invalid_page_size_rejected() {
    let source = Arc::new(MockSource::new(10));
    let store = Arc::new(ResultStore::new(source.clone()));
    let err = PageDriver::spawn(
        store,
        PaginationModel::new(0, 20).unwrap(),
        DriverConfig::default(),
    );
    assert!(err.is_err());

    let driver = start(&source, 0, 10, quiet_config());
    assert!(driver.set_page_size(20).is_err());
    assert!(driver.set_page_size(0).is_err());
    assert_eq!(driver.model().page_size, 10);

    driver.shutdown().await;
}

#[tokio::test]
async fn test_error_is_retried() {
    let source = Arc::new(MockSource::new(100).failing(2));
    let driver = start(&source, 0, 10, DriverConfig {
        refresh_interval: Duration::from_millis(10),
        ..DriverConfig::default()
    });

    eventually("recovery", || driver.store().status() == FetchStatus::Finished).await;
    assert!(source.request_count() >= 3);
    assert!(driver.store().snapshot().error.is_none());

    driver.shutdown().await;
}

#[tokio::test]
async fn test_prev_page_saturates() {
    let source = Arc::new(MockSource::new(100));
    let driver = start(&source, 0, 10, quiet_config());

    driver.prev_page();
    assert_eq!(driver.model().page, 0);
    driver.next_page();
    driver.next_page();
    driver.prev_page();
    assert_eq!(driver.model().page, 1);

    driver.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_stops_loop() {
    let source = Arc::new(MockSource::new(100));
    let driver = start(&source, 0, 10, quiet_config());
    driver.wait_settled(driver.model(), SETTLE).await;

    let store = Arc::clone(driver.store());
    tokio::time::timeout(SETTLE, driver.shutdown())
        .await
        .expect("driver should stop");

    let before = source.request_count();
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(source.request_count(), before);
    assert_eq!(store.status(), FetchStatus::Finished);
}

#[test]
fn test_is_settled() {
    let model = PaginationModel::new(1, 10).unwrap();

    let mut snapshot = StoreSnapshot::default();
    assert!(!is_settled(&model, &snapshot));

    snapshot.status = FetchStatus::Loading;
    snapshot.pending_request = Some(req(10, 10));
    assert!(!is_settled(&model, &snapshot));

    snapshot.status = FetchStatus::Finished;
    snapshot.result.has_next_page = true;
    assert!(is_settled(&model, &snapshot));

    snapshot.pending_request = Some(req(0, 10));
    assert!(!is_settled(&model, &snapshot));

    snapshot.result.has_next_page = false;
    assert!(is_settled(&model, &snapshot));

    snapshot.status = FetchStatus::Error;
    assert!(!is_settled(&model, &snapshot));
}
