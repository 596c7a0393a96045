use std::ffi::OsString;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use notify::event::{AccessKind, CreateKind, DataChange, MetadataKind, ModifyKind, RemoveKind, RenameMode};
use notify::{Event, EventKind};
use tempfile::TempDir;
use tokio::sync::mpsc;

use super::debouncer::Debouncer;
use super::poll::{FileStamp, StatPoller};
use super::types::ChangeSource;
use super::watch_targets::{Relevant, WatchTargets, classify};
use super::FsActor;
use crate::actor::messages::ReconcileMsg;
use crate::config::WatchConfig;

const WINDOW: Duration = Duration::from_millis(120);

fn make_event(paths: Vec<&str>, kind: EventKind) -> Event {
    Event {
        kind,
        paths: paths.into_iter().map(PathBuf::from).collect(),
        attrs: Default::default(),
    }
}

fn doc_name() -> OsString {
    OsString::from("doc.txt")
}

fn data_kind() -> EventKind {
    EventKind::Modify(ModifyKind::Data(DataChange::Any))
}

// =============================================================================
// debouncer
// =============================================================================

#[test]
fn test_debouncer_empty() {
    let debouncer = Debouncer::new(WINDOW);
    let now = Instant::now();
    assert!(!debouncer.is_ready(now));
    assert_eq!(debouncer.sleep_duration(now), Duration::from_secs(86400));
}

#[test]
fn test_debouncer_waits_for_quiet_window() {
    let mut debouncer = Debouncer::new(WINDOW);
    let t0 = Instant::now();

    debouncer.add(ChangeSource::File, t0);
    assert!(debouncer.take_if_ready(t0 + Duration::from_millis(50)).is_none());
    assert_eq!(
        debouncer.take_if_ready(t0 + WINDOW),
        Some((ChangeSource::File, 1))
    );
    assert!(!debouncer.is_ready(t0 + WINDOW * 2));
}

#[test]
fn test_debouncer_burst_collapses_to_one() {
    let mut debouncer = Debouncer::new(WINDOW);
    let t0 = Instant::now();

    debouncer.add(ChangeSource::Directory, t0);
    debouncer.add(ChangeSource::File, t0 + Duration::from_millis(40));
    debouncer.add(ChangeSource::Poll, t0 + Duration::from_millis(80));
    debouncer.add(ChangeSource::File, t0 + Duration::from_millis(100));

    // each signal re-arms the window
    assert!(debouncer.take_if_ready(t0 + WINDOW).is_none());

    let released = debouncer.take_if_ready(t0 + Duration::from_millis(100) + WINDOW);
    assert_eq!(released, Some((ChangeSource::Directory, 4)));

    // nothing queued behind it
    assert_eq!(debouncer.hits, 0);
    assert!(debouncer.pending.is_none());
    assert!(debouncer.take_if_ready(t0 + WINDOW * 10).is_none());
}

#[test]
fn test_debouncer_sleep_duration() {
    let mut debouncer = Debouncer::new(WINDOW);
    let t0 = Instant::now();
    debouncer.add(ChangeSource::Poll, t0);

    assert_eq!(debouncer.sleep_duration(t0), WINDOW);
    assert_eq!(
        debouncer.sleep_duration(t0 + Duration::from_millis(20)),
        Duration::from_millis(100)
    );
    // overdue still sleeps a minimal tick
    assert_eq!(
        debouncer.sleep_duration(t0 + WINDOW * 3),
        Duration::from_millis(1)
    );
}

// =============================================================================
// classify
// =============================================================================

#[test]
fn test_classify_ignores_noise() {
    let access = make_event(vec!["/d/doc.txt"], EventKind::Access(AccessKind::Any));
    let chmod = make_event(
        vec!["/d/doc.txt"],
        EventKind::Modify(ModifyKind::Metadata(MetadataKind::Permissions)),
    );

    assert_eq!(classify(ChangeSource::File, &access, &doc_name()), None);
    assert_eq!(classify(ChangeSource::File, &chmod, &doc_name()), None);
}

#[test]
fn test_classify_data_change() {
    let event = make_event(vec!["/d/doc.txt"], data_kind());
    assert_eq!(
        classify(ChangeSource::File, &event, &doc_name()),
        Some(Relevant { reattach: false })
    );
}

#[test]
fn test_classify_replacement_needs_reattach() {
    let removed = make_event(vec!["/d/doc.txt"], EventKind::Remove(RemoveKind::File));
    let created = make_event(vec!["/d/doc.txt"], EventKind::Create(CreateKind::File));

    for event in [removed, created] {
        assert_eq!(
            classify(ChangeSource::File, &event, &doc_name()),
            Some(Relevant { reattach: true })
        );
    }
}

#[test]
fn test_classify_directory_filters_by_name() {
    let other = make_event(vec!["/d/other.txt"], data_kind());
    let temp = make_event(
        vec!["/d/.doc.txt.syncpad.tmp"],
        EventKind::Create(CreateKind::File),
    );
    let ours = make_event(vec!["/d/doc.txt"], data_kind());

    assert_eq!(classify(ChangeSource::Directory, &other, &doc_name()), None);
    assert_eq!(classify(ChangeSource::Directory, &temp, &doc_name()), None);
    assert!(classify(ChangeSource::Directory, &ours, &doc_name()).is_some());
}

#[test]
fn test_classify_directory_rename_onto_document() {
    let rename = make_event(
        vec!["/d/.doc.txt.swp", "/d/doc.txt"],
        EventKind::Modify(ModifyKind::Name(RenameMode::Both)),
    );
    assert_eq!(
        classify(ChangeSource::Directory, &rename, &doc_name()),
        Some(Relevant { reattach: true })
    );
}

// =============================================================================
// stat poll
// =============================================================================

#[test]
fn test_file_stamp_missing() {
    let dir = TempDir::new().unwrap();
    let stamp = FileStamp::read(&dir.path().join("absent.txt"));
    assert!(!stamp.exists);
    assert_eq!(stamp.len, 0);
    assert!(stamp.modified.is_none());
}

#[test]
fn test_stat_poller_detects_changes() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("doc.txt");
    std::fs::write(&file, "one").unwrap();

    let mut poller = StatPoller::new(file.clone());
    assert!(!poller.check());

    std::fs::write(&file, "three").unwrap();
    assert!(poller.check());
    assert!(!poller.check());

    std::fs::remove_file(&file).unwrap();
    assert!(poller.check());
    assert!(!poller.check());

    std::fs::write(&file, "").unwrap();
    assert!(poller.check());
}

#[test]
fn test_disabled_targets_are_inactive() {
    let mut targets = WatchTargets::disabled(PathBuf::from("/nowhere/doc.txt"));
    targets.maintain();
    assert!(!targets.is_native_active());
}

// =============================================================================
// end to end
// =============================================================================

fn watch_config(native: bool) -> WatchConfig {
    WatchConfig {
        poll_interval_ms: 50,
        debounce_ms: 60,
        native,
        ..WatchConfig::default()
    }
}

async fn next_reconcile(rx: &mut mpsc::Receiver<ReconcileMsg>) -> Option<ChangeSource> {
    match tokio::time::timeout(Duration::from_secs(3), rx.recv()).await {
        Ok(Some(ReconcileMsg::Reconcile { source })) => Some(source),
        _ => None,
    }
}

async fn assert_detects_external_write(native: bool) {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("doc.txt");
    std::fs::write(&file, "before").unwrap();

    let (tx, mut rx) = mpsc::channel(8);
    let actor = FsActor::new(file.clone(), &watch_config(native), tx);
    let task = tokio::spawn(actor.run());

    // let the poll baseline settle past the mtime granularity
    tokio::time::sleep(Duration::from_millis(50)).await;
    std::fs::write(&file, "after, and longer").unwrap();

    assert!(next_reconcile(&mut rx).await.is_some());

    // one logical edit, one reconciliation
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(rx.try_recv().is_err());

    task.abort();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_fs_actor_detects_external_write() {
    assert_detects_external_write(true).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_fs_actor_polling_alone_is_enough() {
    assert_detects_external_write(false).await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_fs_actor_detects_delete_and_recreate() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("doc.txt");
    std::fs::write(&file, "v1").unwrap();

    let (tx, mut rx) = mpsc::channel(8);
    let task = tokio::spawn(FsActor::new(file.clone(), &watch_config(true), tx).run());

    std::fs::remove_file(&file).unwrap();
    assert!(next_reconcile(&mut rx).await.is_some());

    // drain any trailing signal from the deletion
    tokio::time::sleep(Duration::from_millis(200)).await;
    while rx.try_recv().is_ok() {}

    std::fs::write(&file, "v2 recreated").unwrap();
    assert!(next_reconcile(&mut rx).await.is_some());

    task.abort();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_fs_actor_stops_when_reconciler_gone() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("doc.txt");

    let (tx, rx) = mpsc::channel(8);
    let task = tokio::spawn(FsActor::new(file.clone(), &watch_config(false), tx).run());
    drop(rx);

    std::fs::write(&file, "anything").unwrap();
    let stopped = tokio::time::timeout(Duration::from_secs(3), task).await;
    assert!(stopped.is_ok());
}
