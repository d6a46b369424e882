// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use cmdq_core::JobSpec;

fn sample(name: &str) -> StoredQueue {
    StoredQueue {
        name: name.to_string(),
        backend: BackendKind::Serial,
        dpath: None,
        size: 2,
        environ: vec![("STAGE".into(), "ci".into())],
        header_commands: vec![],
        jobs: vec![
            JobSpec::new("true").name("a"),
            JobSpec::new("true").name("b").depend("a"),
        ],
        last_session: None,
    }
}

#[test]
fn save_load_roundtrips() {
    let temp = tempfile::tempdir().unwrap();
    let store = Store::at(temp.path());

    store.save(&sample("demo")).unwrap();
    let loaded = store.load("demo").unwrap();

    assert_eq!(loaded.name, "demo");
    assert_eq!(loaded.backend, BackendKind::Serial);
    assert_eq!(loaded.jobs.len(), 2);
    assert_eq!(loaded.environ, vec![("STAGE".to_string(), "ci".to_string())]);
}

#[test]
fn load_missing_queue_mentions_new() {
    let temp = tempfile::tempdir().unwrap();
    let store = Store::at(temp.path());
    let err = store.load("ghost").unwrap_err();
    assert!(err.to_string().contains("cmdq new ghost"));
}

#[test]
fn list_is_sorted_and_ignores_foreign_files() {
    let temp = tempfile::tempdir().unwrap();
    let store = Store::at(temp.path());
    store.save(&sample("zeta")).unwrap();
    store.save(&sample("alpha")).unwrap();
    std::fs::write(temp.path().join("queues/notes.txt"), "x").unwrap();

    assert_eq!(store.list().unwrap(), vec!["alpha", "zeta"]);
}

#[test]
fn to_queue_builds_a_runnable_queue() {
    let temp = tempfile::tempdir().unwrap();
    let store = Store::at(temp.path());
    let stored = sample("demo");

    let queue = stored.to_queue(&store).unwrap();
    assert_eq!(queue.model().len(), 2);
    assert!(queue.finalize_text().is_ok());
}

#[test]
fn to_queue_rejects_duplicate_jobs() {
    let temp = tempfile::tempdir().unwrap();
    let store = Store::at(temp.path());
    let mut stored = sample("demo");
    stored.jobs.push(JobSpec::new("true").name("a"));

    assert!(stored.to_queue(&store).is_err());
}

#[yare::parameterized(
    simple   = { "K=V", "K", "V" },
    empty_v  = { "K=", "K", "" },
    eq_in_v  = { "K=a=b", "K", "a=b" },
)]
fn key_value_parses(input: &str, key: &str, value: &str) {
    assert_eq!(
        parse_key_value(input).unwrap(),
        (key.to_string(), value.to_string())
    );
}

#[yare::parameterized(
    no_eq    = { "KV" },
    no_key   = { "=V" },
)]
fn key_value_rejects(input: &str) {
    assert!(parse_key_value(input).is_err());
}
