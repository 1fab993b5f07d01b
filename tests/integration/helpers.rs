//! Shared helpers for integration tests.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Value, json};
use session_bridge::SyncConfig;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Path the mock feed is served under.
pub(crate) const GRID_PATH: &str = "/api/v2/demo/view/GridSmart";

/// Display targets used by every test, in write order.
pub(crate) const TARGETS: [&str; 4] = ["now_title", "now_speakers", "next_title", "next_speakers"];

/// 09:30 UTC on the first conference day.
pub(crate) fn conference_morning() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 10, 9, 30, 0).unwrap()
}

/// A two-room, one-day grid with back-to-back sessions in "Main".
pub(crate) fn grid() -> Value {
    json!([{
        "date": "2024-05-10T00:00:00",
        "isDefault": true,
        "rooms": [
            {
                "id": 1,
                "name": "Main",
                "sessions": [
                    {
                        "id": "101",
                        "title": "Opening Keynote",
                        "startsAt": "2024-05-10T09:00:00",
                        "endsAt": "2024-05-10T10:00:00",
                        "isServiceSession": false,
                        "speakers": [{"id": "a", "name": "Ada Lovelace"}]
                    },
                    {
                        "id": "102",
                        "title": "Ownership in Practice",
                        "startsAt": "2024-05-10T10:00:00",
                        "endsAt": "2024-05-10T11:00:00",
                        "speakers": [
                            {"id": "b", "name": "Grace Hopper"},
                            {"id": "c", "name": "Barbara Liskov"}
                        ]
                    }
                ]
            },
            {
                "id": 2,
                "name": "Workshop",
                "sessions": [{
                    "id": "201",
                    "title": "Hands-on Async",
                    "startsAt": "2024-05-10T09:00:00",
                    "endsAt": "2024-05-10T12:00:00",
                    "speakers": []
                }]
            }
        ]
    }])
}

/// Start a mock feed serving `body` for exactly `times` requests.
pub(crate) async fn mock_feed(body: Value, times: u64) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(GRID_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .expect(times)
        .mount(&server)
        .await;
    server
}

/// An enabled config for room "Main" pointing at `server`.
pub(crate) fn config_for(server: &MockServer) -> SyncConfig {
    SyncConfig {
        enabled: true,
        url: format!("{}{GRID_PATH}", server.uri()),
        current_title_target: TARGETS[0].into(),
        current_presenters_target: TARGETS[1].into(),
        next_title_target: TARGETS[2].into(),
        next_presenters_target: TARGETS[3].into(),
        room_name: "Main".into(),
        ..SyncConfig::default()
    }
}

/// Read a file-host target.
pub(crate) fn read_target(dir: &std::path::Path, name: &str) -> String {
    std::fs::read_to_string(dir.join(format!("{name}.txt"))).unwrap()
}
