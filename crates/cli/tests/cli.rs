// ABOUTME: Integration tests for the holofeed CLI binary against a mocked listing API.
// ABOUTME: Covers a successful run, failures that must leave outputs untouched, and a missing API key.

use assert_cmd::assert::OutputAssertExt;
use assert_cmd::cargo::CommandCargoExt;
use holofeed_feed::verify_feed;
use httpmock::prelude::*;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

const VIDEOS: &str = r#"[
  {
    "id": "vidA",
    "title": "【歌枠】Karaoke night",
    "type": "stream",
    "topic_id": "singing",
    "status": "upcoming",
    "available_at": "2024-03-01T12:00:00.000Z",
    "channel": {"id": "UC1", "name": "Ch One", "english_name": "One", "org": "Hololive"}
  },
  {
    "id": "vidB",
    "title": "Song stream",
    "type": "stream",
    "topic_id": "singing",
    "status": "past",
    "published_at": "2024-02-29T10:00:00.000Z",
    "available_at": "2024-02-29T10:00:00.000Z",
    "channel": {"id": "UC2", "name": "Ch Two", "org": "Hololive"}
  },
  {
    "id": "vidGone",
    "title": "Deleted",
    "type": "stream",
    "topic_id": "singing",
    "status": "missing",
    "available_at": "2024-02-28T10:00:00.000Z",
    "channel": {"id": "UC3", "name": "Ch Three", "org": "Hololive"}
  }
]"#;

fn holofeed_cmd() -> Command {
    let mut cmd = Command::cargo_bin("holofeed").unwrap();
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Writes a config pointing at `base_url` with outputs under `dir`.
fn write_config(dir: &Path, base_url: &str) -> std::path::PathBuf {
    let path = dir.join("holofeed.toml");
    let text = format!(
        r#"
[api]
base_url = "{base_url}"
timeout_secs = 5

[fetch]
topic_delay_ms = 0
retry_delay_ms = 0

[output]
feed_path = "{feed}"
raw_path = "{raw}"
"#,
        base_url = base_url,
        feed = dir.join("feeds/holodex.atom").display(),
        raw = dir.join("feeds/holodex.json").display(),
    );
    fs::write(&path, text).unwrap();
    path
}

#[test]
fn writes_verified_feed_and_snapshot() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET)
            .path("/videos")
            .query_param("topic", "singing")
            .header("x-apikey", "test-key");
        then.status(200)
            .header("content-type", "application/json; charset=utf-8")
            .body(VIDEOS);
    });

    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), &server.base_url());

    holofeed_cmd()
        .env("HOLODEX_API_KEY", "test-key")
        .arg("--config")
        .arg(&config)
        .assert()
        .success()
        .stdout(predicate::str::contains("wrote 2 entries"));

    mock.assert();

    let bytes = fs::read(dir.path().join("feeds/holodex.atom")).unwrap();
    let feed = verify_feed(&bytes).unwrap();
    let links: Vec<_> = feed.entries.iter().map(|e| e.link.as_str()).collect();
    assert_eq!(
        links,
        vec![
            "https://www.youtube.com/watch?v=vidA",
            "https://www.youtube.com/watch?v=vidB",
        ]
    );

    let raw: serde_json::Value =
        serde_json::from_slice(&fs::read(dir.path().join("feeds/holodex.json")).unwrap()).unwrap();
    assert_eq!(raw.as_array().map(Vec::len), Some(3));
}

#[test]
fn output_flags_override_config() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/videos");
        then.status(200).body(VIDEOS);
    });

    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), "http://127.0.0.1:9/unused");
    let feed_path = dir.path().join("elsewhere.atom");

    holofeed_cmd()
        .env("HOLODEX_API_KEY", "test-key")
        .arg("--config")
        .arg(&config)
        .arg("--base-url")
        .arg(server.base_url())
        .arg("--output")
        .arg(&feed_path)
        .arg("--no-raw")
        .assert()
        .success();

    assert!(feed_path.exists());
    assert!(!dir.path().join("feeds/holodex.json").exists());
}

#[test]
fn upstream_failure_exits_nonzero_without_writing() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/videos");
        then.status(500);
    });

    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), &server.base_url());

    holofeed_cmd()
        .env("HOLODEX_API_KEY", "test-key")
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("500"));

    assert!(!dir.path().join("feeds/holodex.atom").exists());
    assert!(!dir.path().join("feeds/holodex.json").exists());
}

#[test]
fn upstream_failure_keeps_previous_feed() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/videos");
        then.status(500);
    });

    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), &server.base_url());
    let feed_path = dir.path().join("feeds/holodex.atom");
    fs::create_dir_all(feed_path.parent().unwrap()).unwrap();
    fs::write(&feed_path, "<feed>previous</feed>").unwrap();

    holofeed_cmd()
        .env("HOLODEX_API_KEY", "test-key")
        .arg("--config")
        .arg(&config)
        .assert()
        .failure();

    assert_eq!(fs::read_to_string(&feed_path).unwrap(), "<feed>previous</feed>");
}

#[test]
fn missing_api_key_fails_before_fetching() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/videos");
        then.status(200).body("[]");
    });

    let dir = TempDir::new().unwrap();
    let config = write_config(dir.path(), &server.base_url());

    holofeed_cmd()
        .env_remove("HOLODEX_API_KEY")
        .current_dir(dir.path())
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("HOLODEX_API_KEY"));

    mock.assert_hits(0);
}

#[test]
fn malformed_config_is_reported() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("broken.toml");
    fs::write(&config, "sort = [not toml").unwrap();

    holofeed_cmd()
        .env("HOLODEX_API_KEY", "test-key")
        .arg("--config")
        .arg(&config)
        .assert()
        .failure()
        .stderr(predicate::str::contains("broken.toml"));
}
