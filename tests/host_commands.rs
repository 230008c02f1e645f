use std::sync::Arc;

use steptrack_lib::{
    config::{AppConfig, MotionSourceKind, StoreBackend},
    motion::MotionSource,
    handle_host_line, motion_source, open_store,
    store::{KeyValueStore, MemoryStore, PersistenceStore},
    tracker::{
        commands::{dispatch, handle_line, Command, CommandOutput},
        TrackerController, TrackerSnapshot,
    },
};

fn controller() -> TrackerController {
    let store = PersistenceStore::new(Arc::new(MemoryStore::new()), 12.0);
    TrackerController::new(Default::default(), store)
}

fn expect_snapshot(output: CommandOutput) -> TrackerSnapshot {
    match output {
        CommandOutput::Snapshot(snapshot) => snapshot,
        other => panic!("expected snapshot, got {other:?}"),
    }
}

#[tokio::test(start_paused = true)]
async fn json_lines_drive_a_session() {
    let controller = controller();

    let started = expect_snapshot(handle_line(&controller, r#"{"type":"start"}"#).await.unwrap());
    assert!(started.is_tracking);

    for line in [
        r#"{"type":"sample","x":0.0,"y":0.0,"z":5.0}"#,
        r#"{"type":"sample","x":0.0,"y":0.0,"z":18.0}"#,
        r#"{"type":"sample","x":0.0,"y":0.0,"z":38.0}"#,
        r#"{"type":"sample","x":0.0,"y":0.0,"z":46.0}"#,
    ] {
        handle_line(&controller, line).await.unwrap();
    }

    let stopped = expect_snapshot(handle_line(&controller, r#"{"type":"stop"}"#).await.unwrap());
    assert_eq!(stopped.steps, 2);
    assert!(!stopped.is_tracking);
    assert!(stopped.sessions[0].end.is_some());
}

#[tokio::test(start_paused = true)]
async fn negative_delete_index_is_ignored() {
    let controller = controller();
    dispatch(&controller, Command::Start).await;
    dispatch(&controller, Command::Stop).await;

    let snapshot = expect_snapshot(
        dispatch(&controller, Command::DeleteSession { index: -1 }).await,
    );
    assert_eq!(snapshot.sessions.len(), 1);
}

#[tokio::test(start_paused = true)]
async fn share_reports_latest_session_or_nothing() {
    let controller = controller();
    match dispatch(&controller, Command::Share).await {
        CommandOutput::Share { summary } => assert!(summary.is_none()),
        other => panic!("unexpected {other:?}"),
    }

    dispatch(&controller, Command::Start).await;
    match dispatch(&controller, Command::Share).await {
        CommandOutput::Share { summary } => {
            let summary = summary.unwrap();
            assert!(summary.starts_with("🏃 Step Tracker Stats:"));
            assert!(summary.contains("Distance covered: 0 meters"));
            assert!(summary.ends_with("End time: Ongoing"));
        }
        other => panic!("unexpected {other:?}"),
    }
}

#[tokio::test]
async fn malformed_lines_are_rejected() {
    let controller = controller();
    assert!(handle_line(&controller, r#"{"type":"fly"}"#).await.is_err());
    assert!(handle_line(&controller, "{").await.is_err());
}

#[test]
fn snapshot_output_is_camel_case_json() {
    let controller = controller();
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    let output = runtime.block_on(dispatch(&controller, Command::Snapshot));
    let json: serde_json::Value = serde_json::to_value(&output).unwrap();

    assert_eq!(json["type"], "snapshot");
    assert_eq!(json["status"], "idle");
    assert_eq!(json["isTracking"], false);
    assert_eq!(json["durationLabel"], "0m 0s");
    assert_eq!(json["distanceMeters"], 0.0);
    assert!(json["sessions"].as_array().unwrap().is_empty());
}

#[test]
fn memory_backend_needs_no_disk() {
    let config = AppConfig {
        store: StoreBackend::Memory,
        data_dir: "/nonexistent/steptrack".into(),
        ..AppConfig::default()
    };
    assert!(open_store(&config).is_ok());
}

#[test]
fn json_backend_writes_under_data_dir() {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig {
        store: StoreBackend::Json,
        data_dir: dir.path().to_path_buf(),
        ..AppConfig::default()
    };
    let store = open_store(&config).unwrap();
    store.set("steps", "3").unwrap();
    assert!(dir.path().join("counters.json").exists());
}

#[test]
fn stdin_motion_is_delivered_inline() {
    let source = motion_source(MotionSourceKind::Stdin);
    assert!(source.is_supported());
    assert!(source.into_feed().is_none());

    let source = motion_source(MotionSourceKind::None);
    assert!(!source.is_supported());
}

async fn run_lines(
    controller: &TrackerController,
    motion: MotionSourceKind,
    lines: &[&str],
) -> Vec<CommandOutput> {
    let mut outputs = Vec::new();
    for line in lines {
        if let Some(output) = handle_host_line(controller, line, motion).await.unwrap() {
            outputs.push(output);
        }
    }
    outputs
}

#[tokio::test(start_paused = true)]
async fn stdin_samples_are_applied_in_line_order() {
    let controller = controller();
    controller
        .attach_motion(motion_source(MotionSourceKind::Stdin))
        .await
        .unwrap();

    let outputs = run_lines(
        &controller,
        MotionSourceKind::Stdin,
        &[
            r#"{"type":"start"}"#,
            r#"{"type":"sample","x":0.0,"y":0.0,"z":20.0}"#,
            r#"{"type":"snapshot"}"#,
            r#"{"type":"sample","x":0.0,"y":0.0,"z":40.0}"#,
            "",
            r#"{"type":"stop"}"#,
            r#"{"type":"sample","x":0.0,"y":0.0,"z":60.0}"#,
            r#"{"type":"snapshot"}"#,
        ],
    )
    .await;

    let steps: Vec<u64> = outputs
        .into_iter()
        .map(|output| expect_snapshot(output).steps)
        .collect();
    assert_eq!(steps, vec![0, 1, 2, 2]);
}

#[tokio::test(start_paused = true)]
async fn stdin_samples_are_ignored_for_other_sources() {
    let controller = controller();
    let outputs = run_lines(
        &controller,
        MotionSourceKind::None,
        &[
            r#"{"type":"start"}"#,
            r#"{"type":"sample","x":0.0,"y":0.0,"z":20.0}"#,
            r#"{"type":"stop"}"#,
        ],
    )
    .await;

    assert_eq!(outputs.len(), 2);
    assert_eq!(expect_snapshot(outputs[1].clone()).steps, 0);
}
