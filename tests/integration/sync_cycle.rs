//! Full sync cycles against a mock feed, on-disk state, and file targets.

use crate::helpers::{TARGETS, config_for, conference_morning, grid, mock_feed, read_target};
use chrono::Duration;
use schedule_feed::HttpFetcher;
use session_bridge::host::FileHost;
use session_bridge::{
    FetchOutcome, FileStore, FixedClock, StoreKey, SyncConfig, SyncOrchestrator, TickReport,
};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Fixture {
    state: tempfile::TempDir,
    targets: tempfile::TempDir,
}

impl Fixture {
    fn new() -> Self {
        let fixture = Self {
            state: tempfile::tempdir().unwrap(),
            targets: tempfile::tempdir().unwrap(),
        };
        FileHost::new(fixture.targets.path())
            .ensure_targets(TARGETS)
            .unwrap();
        fixture
    }

    fn orchestrator(
        &self,
        config: SyncConfig,
        clock: FixedClock,
    ) -> SyncOrchestrator<HttpFetcher, FileStore, FixedClock> {
        let fetcher = HttpFetcher::new(&config.feed).unwrap();
        SyncOrchestrator::with_clock(config, fetcher, FileStore::new(self.state.path()), clock)
    }

    fn host(&self) -> FileHost {
        FileHost::new(self.targets.path())
    }

    fn target(&self, name: &str) -> String {
        read_target(self.targets.path(), name)
    }
}

/// Run a tick off the async worker; the fetcher blocks.
fn tick(
    orchestrator: &mut SyncOrchestrator<HttpFetcher, FileStore, FixedClock>,
    host: &mut FileHost,
) -> TickReport {
    tokio::task::block_in_place(|| orchestrator.tick(host))
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn first_tick_fills_targets_and_persists_state() {
    let server = mock_feed(grid(), 1).await;
    let fixture = Fixture::new();
    let mut orch = fixture.orchestrator(config_for(&server), FixedClock(conference_morning()));
    let mut host = fixture.host();

    let report = tick(&mut orch, &mut host);

    assert!(report.wrote_anything());
    assert_eq!(fixture.target("now_title"), "Opening Keynote");
    assert_eq!(fixture.target("now_speakers"), "Ada Lovelace");
    assert_eq!(fixture.target("next_title"), "Ownership in Practice");
    assert_eq!(fixture.target("next_speakers"), "Grace Hopper, Barbara Liskov");

    let store = FileStore::new(fixture.state.path());
    for key in [StoreKey::ScheduleData, StoreKey::DataHash, StoreKey::LastFetchTime] {
        assert!(store.path_for(key).is_file(), "{key:?} missing");
    }
    let digest = std::fs::read_to_string(store.path_for(StoreKey::DataHash)).unwrap();
    assert_eq!(digest.trim().len(), 64);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn state_survives_a_restart() {
    let server = mock_feed(grid(), 1).await;
    let fixture = Fixture::new();
    let config = SyncConfig {
        fetch_interval_minutes: 60,
        ..config_for(&server)
    };

    let mut first = fixture.orchestrator(config.clone(), FixedClock(conference_morning()));
    tick(&mut first, &mut fixture.host());
    drop(first);

    // A new process half an hour later: not due, resolves from disk.
    let later = conference_morning() + Duration::minutes(31);
    let mut second = fixture.orchestrator(config, FixedClock(later));
    let report = tick(&mut second, &mut fixture.host());

    assert!(matches!(
        report,
        TickReport::Ran {
            fetch: FetchOutcome::NotDue,
            ..
        }
    ));
    // 10:01 UTC: the second session is running and nothing follows it.
    assert_eq!(fixture.target("now_title"), "Ownership in Practice");
    assert_eq!(fixture.target("next_title"), "");
    assert_eq!(fixture.target("next_speakers"), "");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn unreachable_feed_with_empty_cache_leaves_targets_alone() {
    let fixture = Fixture::new();
    std::fs::write(fixture.targets.path().join("now_title.txt"), "placeholder").unwrap();
    let config = SyncConfig {
        url: "http://127.0.0.1:1/grid".into(),
        ..config_for(&MockServer::start().await)
    };
    let mut orch = fixture.orchestrator(config, FixedClock(conference_morning()));

    let report = tick(&mut orch, &mut fixture.host());

    let TickReport::Ran { fetch, writes, error, .. } = report else {
        panic!("expected a run");
    };
    assert!(matches!(fetch, FetchOutcome::Failed(_)));
    assert!(writes.is_none());
    assert!(error.is_some());
    assert_eq!(fixture.target("now_title"), "placeholder");
    assert!(orch.fetch_state().unwrap().last_fetch_at.is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn server_error_falls_back_to_cached_schedule() {
    let fixture = Fixture::new();
    let good = mock_feed(grid(), 1).await;
    let config = config_for(&good);
    let mut orch = fixture.orchestrator(config.clone(), FixedClock(conference_morning()));
    tick(&mut orch, &mut fixture.host());

    let broken = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&broken)
        .await;
    let later = conference_morning() + Duration::minutes(40);
    let mut orch = fixture.orchestrator(
        SyncConfig {
            url: format!("{}/grid", broken.uri()),
            ..config
        },
        FixedClock(later),
    );

    let report = tick(&mut orch, &mut fixture.host());

    assert!(matches!(
        report,
        TickReport::Ran {
            fetch: FetchOutcome::Failed(ref msg),
            ..
        } if msg.contains("500")
    ));
    assert_eq!(fixture.target("now_title"), "Ownership in Practice");
    assert_eq!(
        orch.fetch_state().unwrap().last_fetch_at,
        Some(conference_morning())
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn identical_refetch_does_not_rewrite_the_cache() {
    let server = mock_feed(grid(), 2).await;
    let fixture = Fixture::new();
    let config = config_for(&server);
    let store = FileStore::new(fixture.state.path());

    let mut orch = fixture.orchestrator(config.clone(), FixedClock(conference_morning()));
    tick(&mut orch, &mut fixture.host());
    let data_path = store.path_for(StoreKey::ScheduleData);
    let first_write = std::fs::metadata(&data_path).unwrap().modified().unwrap();

    std::thread::sleep(std::time::Duration::from_millis(20));
    let later = conference_morning() + Duration::minutes(5);
    let mut orch = fixture.orchestrator(config, FixedClock(later));
    let report = tick(&mut orch, &mut fixture.host());

    assert!(matches!(
        report,
        TickReport::Ran {
            fetch: FetchOutcome::Unchanged,
            ..
        }
    ));
    let second_write = std::fs::metadata(&data_path).unwrap().modified().unwrap();
    assert_eq!(first_write, second_write);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn missing_target_file_does_not_block_the_others() {
    let server = mock_feed(grid(), 1).await;
    let fixture = Fixture::new();
    std::fs::remove_file(fixture.targets.path().join("now_speakers.txt")).unwrap();
    let mut orch = fixture.orchestrator(config_for(&server), FixedClock(conference_morning()));

    let report = tick(&mut orch, &mut fixture.host());

    let TickReport::Ran {
        writes: Some(writes),
        ..
    } = report
    else {
        panic!("expected writes");
    };
    assert_eq!(writes.written, 3);
    assert_eq!(writes.failed[0].target, "now_speakers");
    assert!(!fixture.targets.path().join("now_speakers.txt").exists());
    assert_eq!(fixture.target("next_speakers"), "Grace Hopper, Barbara Liskov");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn disabled_config_never_contacts_the_feed() {
    let server = mock_feed(grid(), 0).await;
    let fixture = Fixture::new();
    let config = SyncConfig {
        enabled: false,
        ..config_for(&server)
    };
    let mut orch = fixture.orchestrator(config, FixedClock(conference_morning()));

    assert_eq!(tick(&mut orch, &mut fixture.host()), TickReport::Disabled);
    assert!(std::fs::read_dir(fixture.state.path()).unwrap().next().is_none());
}
