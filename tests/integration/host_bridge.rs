//! End-to-end tests for the `session-bridge-host` binary.
//!
//! Each test spawns the binary with private state/config directories, sends
//! JSON commands over stdin, and reads responses and events from stdout.

use crate::helpers::{GRID_PATH, TARGETS, grid, mock_feed};
use serde_json::{Value, json};
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, BufWriter, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};

struct HostBridgeHarness {
    child: Child,
    stdin: BufWriter<ChildStdin>,
    reader: Lines<BufReader<ChildStdout>>,
    /// Events seen while waiting for responses.
    events: Vec<Value>,
    next_id: u32,
    _dirs: tempfile::TempDir,
}

impl HostBridgeHarness {
    fn spawn() -> Self {
        let dirs = tempfile::tempdir().unwrap();
        let mut child = Command::new(env!("CARGO_BIN_EXE_session-bridge-host"))
            .env("SESSION_BRIDGE_DATA_DIR", dirs.path().join("data"))
            .env("SESSION_BRIDGE_CONFIG_DIR", dirs.path().join("config"))
            .env("RUST_LOG", "off")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .expect("failed to spawn session-bridge-host");

        let child_stdin = child.stdin.take().expect("no stdin on child process");
        let child_stdout = child.stdout.take().expect("no stdout on child process");

        Self {
            child,
            stdin: BufWriter::new(child_stdin),
            reader: BufReader::new(child_stdout).lines(),
            events: Vec::new(),
            next_id: 0,
            _dirs: dirs,
        }
    }

    /// Send a command and return its `ResponseEnvelope`, collecting events.
    async fn send(&mut self, command: &str, payload: Value) -> Value {
        self.next_id += 1;
        let request_id = format!("req-{}", self.next_id);
        let envelope = json!({
            "v": 1,
            "request_id": request_id,
            "command": command,
            "payload": payload,
        });
        self.send_raw(&serde_json::to_string(&envelope).unwrap()).await;
        let response = self.read_response().await;
        assert_eq!(response["request_id"], request_id);
        response
    }

    async fn send_raw(&mut self, line: &str) {
        self.stdin.write_all(line.as_bytes()).await.unwrap();
        self.stdin.write_all(b"\n").await.unwrap();
        self.stdin.flush().await.unwrap();
    }

    async fn read_line(&mut self) -> Option<Value> {
        let line = tokio::time::timeout(Duration::from_secs(10), self.reader.next_line())
            .await
            .expect("timeout reading from session-bridge-host")
            .expect("IO error reading from session-bridge-host")?;
        Some(serde_json::from_str(&line).unwrap_or_else(|e| {
            panic!("invalid JSON from session-bridge-host: {e}\nraw line: {line}");
        }))
    }

    async fn read_response(&mut self) -> Value {
        loop {
            let value = self.read_line().await.expect("unexpected EOF");
            if value.get("ok").is_some() {
                return value;
            }
            self.events.push(value);
        }
    }

    /// Read any events still in flight after the last response.
    async fn collect_events(&mut self, at_least: usize) {
        while self.events.len() < at_least {
            let value = self.read_line().await.expect("unexpected EOF");
            self.events.push(value);
        }
    }
}

fn settings(url: &str) -> Value {
    json!({
        "enabled": true,
        "url": url,
        "room_name": "Main",
        "current_title_source": TARGETS[0],
        "current_presenters_source": TARGETS[1],
        "next_title_source": TARGETS[2],
        "next_presenters_source": TARGETS[3],
        "fake_current_datetime": "2024-05-10T09:30:00",
        "local_timezone": "UTC",
        "fetch_interval_minutes": 5
    })
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn ping_version_and_properties() {
    let mut bridge = HostBridgeHarness::spawn();

    let pong = bridge.send("host.ping", json!({})).await;
    assert_eq!(pong["ok"], true);
    assert_eq!(pong["payload"]["pong"], true);

    let version = bridge.send("host.version", json!({})).await;
    assert_eq!(version["payload"]["contract_version"], 1);

    bridge
        .send("targets.set", json!({"targets": ["Lower Third"]}))
        .await;
    let props = bridge.send("properties.get", json!({})).await;
    let list = props["payload"]["properties"].as_array().unwrap();
    assert_eq!(list.len(), 10);
    assert!(
        list.iter()
            .any(|p| p["key"] == "current_title_source" && p["options"][0] == "Lower Third")
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn tick_emits_target_writes() {
    let server = mock_feed(grid(), 1).await;
    let mut bridge = HostBridgeHarness::spawn();

    bridge.send("targets.set", json!({"targets": TARGETS})).await;
    let applied = bridge
        .send(
            "settings.update",
            settings(&format!("{}{GRID_PATH}", server.uri())),
        )
        .await;
    assert_eq!(applied["ok"], true);
    assert!(applied["payload"]["problem"].is_null());

    let report = bridge.send("sync.tick", Value::Null).await;
    assert_eq!(report["payload"]["state"], "ran");
    assert_eq!(report["payload"]["fetch"]["status"], "updated");
    assert_eq!(report["payload"]["writes"]["written"], 4);

    bridge.collect_events(4).await;
    let writes: Vec<(String, String)> = bridge
        .events
        .iter()
        .filter(|e| e["event"] == "target.write")
        .map(|e| {
            (
                e["payload"]["target"].as_str().unwrap().to_owned(),
                e["payload"]["text"].as_str().unwrap().to_owned(),
            )
        })
        .collect();
    assert_eq!(
        writes,
        vec![
            ("now_title".to_owned(), "Opening Keynote".to_owned()),
            ("now_speakers".to_owned(), "Ada Lovelace".to_owned()),
            ("next_title".to_owned(), "Ownership in Practice".to_owned()),
            (
                "next_speakers".to_owned(),
                "Grace Hopper, Barbara Liskov".to_owned()
            ),
        ]
    );

    // Inside the interval: no second request reaches the feed.
    let again = bridge.send("sync.tick", Value::Null).await;
    assert_eq!(again["payload"]["fetch"]["status"], "not_due");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn bad_input_is_answered_not_fatal() {
    let mut bridge = HostBridgeHarness::spawn();

    bridge.send_raw("this is not json").await;
    let parse_error = bridge.read_response().await;
    assert_eq!(parse_error["ok"], false);
    assert_eq!(parse_error["request_id"], "parse-error");

    let bad_targets = bridge.send("targets.set", json!({"targets": "nope"})).await;
    assert_eq!(bad_targets["ok"], false);

    let pong = bridge.send("host.ping", json!({})).await;
    assert_eq!(pong["ok"], true);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn runtime_stop_exits_cleanly() {
    let mut bridge = HostBridgeHarness::spawn();

    let stop = bridge.send("runtime.stop", json!({})).await;
    assert_eq!(stop["payload"]["stopping"], true);

    let status = tokio::time::timeout(Duration::from_secs(10), bridge.child.wait())
        .await
        .expect("bridge did not exit")
        .unwrap();
    assert!(status.success());
}
