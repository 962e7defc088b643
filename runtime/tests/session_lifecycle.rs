//! End-to-end session tests: mount, feed both channels, unmount.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use session_view_core::record_store::ListFuture;
use session_view_core::render::{self, OrderSummaryView};
use session_view_core::{OrderState, RecordStore, Snapshot, TransportScope};
use session_view_io::{RoomChannel, WindowChannel};
use session_view_runtime::{Session, SessionConfig, SessionError, SessionHandle};
use session_view_testing::fixtures::{latte_order, order_message, order_named, tutor, tutor_message};
use session_view_testing::{FailingRecordStore, InMemoryRecordStore, MockTransport, init_tracing};
use std::sync::Arc;
use std::time::Duration;

/// A store whose reads never complete.
struct StalledStore;

impl RecordStore for StalledStore {
    fn name(&self) -> &'static str {
        "stalled"
    }

    fn list(&self) -> ListFuture<'_> {
        Box::pin(futures::future::pending())
    }
}

fn order_name(snapshot: &Snapshot) -> Option<String> {
    OrderSummaryView::from_snapshot(snapshot)
        .and_then(|view| view.value("Name").map(str::to_string))
}

async fn wait_for(handle: &mut SessionHandle, done: impl Fn(&Snapshot) -> bool) -> Snapshot {
    tokio::time::timeout(Duration::from_secs(30), async {
        loop {
            let snapshot = handle.snapshot();
            if done(&snapshot) {
                return snapshot;
            }
            handle.changed().await.expect("projector stopped early");
        }
    })
    .await
    .expect("snapshot condition not reached")
}

#[tokio::test(start_paused = true)]
async fn push_order_replaces_snapshot_exactly() {
    init_tracing();
    let room = MockTransport::new(TransportScope::Room);
    let mut handle = Session::builder()
        .transport(Arc::new(room.clone()))
        .build()
        .mount()
        .await
        .unwrap();

    room.send(
        br#"{"type":"order_state","data":{"drinkType":"latte","size":"M","milk":"oat","extras":["vanilla"],"name":"Ana"}}"#
            .to_vec(),
    );

    let snapshot = wait_for(&mut handle, |s| s.order.is_some()).await;
    assert_eq!(snapshot.order, Some(latte_order()));
    assert!(snapshot.tutor.is_none());

    handle.unmount().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn poller_forwards_only_the_last_record() {
    let store = InMemoryRecordStore::with_records(vec![order_named("A"), order_named("B")]);
    let mut handle = Session::builder()
        .record_store(Arc::new(store))
        .build()
        .mount()
        .await
        .unwrap();

    let snapshot = wait_for(&mut handle, |s| s.order.is_some()).await;
    assert_eq!(snapshot.order, Some(order_named("B")));

    handle.unmount().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn unknown_and_malformed_messages_leave_snapshot_untouched() {
    let window = MockTransport::new(TransportScope::Window);
    let mut handle = Session::builder()
        .transport(Arc::new(window.clone()))
        .build()
        .mount()
        .await
        .unwrap();

    window.send(r#"{"type":"unknown","data":{"name":"X"}}"#.to_string());
    window.send("{not json".to_string());
    window.send(r#"{"type":"order_state","data":"oops"}"#.to_string());
    window.send(tutor_message(&tutor("explain", "")));

    // Messages are applied in order, so once the tutor update lands the
    // earlier noise has already been processed.
    let snapshot = wait_for(&mut handle, |s| s.tutor.is_some()).await;
    assert!(snapshot.order.is_none());

    handle.unmount().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn missing_extras_render_as_none() {
    let room = MockTransport::new(TransportScope::Room);
    let mut handle = Session::builder()
        .transport(Arc::new(room.clone()))
        .build()
        .mount()
        .await
        .unwrap();

    room.send(r#"{"type":"order_state","data":{"drinkType":"mocha","name":"Bo"}}"#.to_string());

    let snapshot = wait_for(&mut handle, |s| s.order.is_some()).await;
    assert_eq!(snapshot.order.as_ref().map(|o| o.extras.len()), Some(0));
    let text = handle.render();
    assert!(text.contains("None"), "rendered: {text}");
    assert!(text.contains("mocha"));

    handle.unmount().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn later_tutor_state_wins() {
    let window = MockTransport::new(TransportScope::Window);
    let mut handle = Session::builder()
        .transport(Arc::new(window.clone()))
        .build()
        .mount()
        .await
        .unwrap();

    window.send(tutor_message(&tutor("explain", "")));
    window.send(tutor_message(&tutor("quiz", "")));

    let snapshot = wait_for(&mut handle, |s| {
        s.tutor.as_ref().is_some_and(|t| t.mode == "quiz")
    })
    .await;
    assert_eq!(snapshot.tutor, Some(tutor("quiz", "")));

    handle.unmount().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn empty_store_keeps_prior_order() {
    let store = InMemoryRecordStore::with_records(vec![order_named("A")]);
    let mut handle = Session::builder()
        .record_store(Arc::new(store.clone()))
        .build()
        .mount()
        .await
        .unwrap();

    wait_for(&mut handle, |s| s.order.is_some()).await;
    store.clear();

    tokio::time::sleep(Duration::from_secs(7)).await;

    assert!(store.list_calls() >= 4);
    assert_eq!(handle.snapshot().order, Some(order_named("A")));

    handle.unmount().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn polls_immediately_then_every_interval() {
    let store = InMemoryRecordStore::new();
    let handle = Session::builder()
        .record_store(Arc::new(store.clone()))
        .config(SessionConfig::default().with_poll_interval(Duration::from_millis(2000)))
        .build()
        .mount()
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(10)).await;
    assert_eq!(store.list_calls(), 1);

    tokio::time::sleep(Duration::from_millis(2000)).await;
    assert_eq!(store.list_calls(), 2);

    tokio::time::sleep(Duration::from_millis(2000)).await;
    assert_eq!(store.list_calls(), 3);

    handle.unmount().await.unwrap();

    tokio::time::sleep(Duration::from_millis(10_000)).await;
    assert_eq!(store.list_calls(), 3, "polling continued after unmount");
}

#[tokio::test(start_paused = true)]
async fn failing_store_never_stops_the_session() {
    let store = FailingRecordStore::new();
    let room = MockTransport::new(TransportScope::Room);
    let mut handle = Session::builder()
        .record_store(Arc::new(store.clone()))
        .transport(Arc::new(room.clone()))
        .build()
        .mount()
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(4500)).await;
    assert_eq!(store.list_calls(), 3);
    assert_eq!(handle.snapshot(), Snapshot::empty());

    room.send(tutor_message(&tutor("quiz", "loops")));
    wait_for(&mut handle, |s| s.tutor.is_some()).await;

    handle.unmount().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn unmount_cancels_every_subscription_once() {
    let room = MockTransport::new(TransportScope::Room);
    let window = MockTransport::new(TransportScope::Window);
    let handle = Session::builder()
        .transport(Arc::new(room.clone()))
        .transport(Arc::new(window.clone()))
        .build()
        .mount()
        .await
        .unwrap();

    assert_eq!(handle.active_subscriptions(), 2);
    assert_eq!(room.active_listeners(), 1);

    handle.unmount().await.unwrap();

    for transport in [&room, &window] {
        assert_eq!(transport.subscribe_count(), 1);
        assert_eq!(transport.cancel_count(), 1);
    }
    assert_eq!(room.send("late".to_string()), 0);
}

#[tokio::test(start_paused = true)]
async fn dropping_the_handle_also_cancels_once() {
    let room = MockTransport::new(TransportScope::Room);
    let handle = Session::builder()
        .transport(Arc::new(room.clone()))
        .build()
        .mount()
        .await
        .unwrap();

    drop(handle);
    tokio::task::yield_now().await;

    assert_eq!(room.cancel_count(), 1);
    assert_eq!(room.active_listeners(), 0);
}

#[tokio::test(start_paused = true)]
async fn failed_subscribe_is_skipped() {
    let broken = MockTransport::failing(TransportScope::Window);
    let room = MockTransport::new(TransportScope::Room);
    let mut handle = Session::builder()
        .transport(Arc::new(broken))
        .transport(Arc::new(room.clone()))
        .build()
        .mount()
        .await
        .unwrap();

    assert_eq!(handle.active_subscriptions(), 1);

    room.send(tutor_message(&tutor("explain", "")));
    wait_for(&mut handle, |s| s.tutor.is_some()).await;

    handle.unmount().await.unwrap();
}

#[tokio::test]
async fn invalid_config_is_rejected_at_mount() {
    let room = MockTransport::new(TransportScope::Room);
    let result = Session::builder()
        .transport(Arc::new(room.clone()))
        .config(SessionConfig::default().with_event_buffer(0))
        .build()
        .mount()
        .await;

    assert!(matches!(result, Err(SessionError::InvalidConfig(_))));
    assert_eq!(room.subscribe_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn in_process_channels_detach_on_unmount() {
    let room = RoomChannel::new();
    let window = WindowChannel::new();
    let mut handle = Session::builder()
        .transport(Arc::new(room.clone()))
        .transport(Arc::new(window.clone()))
        .build()
        .mount()
        .await
        .unwrap();

    assert_eq!(room.listener_count(), 1);
    assert_eq!(window.listener_count(), 1);

    room.publish_data(
        br#"{"type":"final_order","data":{"drinkType":"latte","name":"Ana"}}"#.to_vec(),
        Some("barista-agent"),
    );
    window.post_message(tutor_message(&tutor("quiz", "")));

    let snapshot = wait_for(&mut handle, |s| s.order.is_some() && s.tutor.is_some()).await;
    assert_eq!(
        snapshot.order,
        Some(OrderState {
            drink_type: "latte".into(),
            name: "Ana".into(),
            ..OrderState::default()
        })
    );

    let last = handle.unmount().await.unwrap();
    assert_eq!(last, snapshot);
    assert_eq!(room.listener_count(), 0);
    assert_eq!(window.listener_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn unmount_does_not_wait_for_a_stalled_poll() {
    let room = MockTransport::new(TransportScope::Room);
    let handle = Session::builder()
        .record_store(Arc::new(StalledStore))
        .transport(Arc::new(room.clone()))
        .build()
        .mount()
        .await
        .unwrap();

    tokio::time::sleep(Duration::from_millis(10)).await;

    let started = tokio::time::Instant::now();
    let result = handle.unmount().await;

    assert_eq!(result, Ok(Snapshot::empty()));
    assert!(
        started.elapsed() < Duration::from_secs(1),
        "unmount took {:?}",
        started.elapsed()
    );
    assert_eq!(room.cancel_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn poll_and_push_for_the_same_kind_resolve_by_arrival_order() {
    let store = InMemoryRecordStore::with_records(vec![order_named("A")]);
    let room = MockTransport::new(TransportScope::Room);
    let mut handle = Session::builder()
        .record_store(Arc::new(store.clone()))
        .transport(Arc::new(room.clone()))
        .build()
        .mount()
        .await
        .unwrap();

    // First poll at mount.
    let snapshot = wait_for(&mut handle, |s| s.order.is_some()).await;
    assert_eq!(order_name(&snapshot).as_deref(), Some("A"));

    // The 2 s tick re-forwards A; it is a duplicate and changes nothing.
    tokio::time::sleep(Duration::from_millis(2500)).await;
    assert_eq!(store.list_calls(), 2);
    assert_eq!(handle.snapshot().order, Some(order_named("A")));

    // A push arriving after that poll wins.
    room.send(order_message(&order_named("B")));
    let snapshot = wait_for(&mut handle, |s| s.order == Some(order_named("B"))).await;
    assert_eq!(order_name(&snapshot).as_deref(), Some("B"));
    assert_eq!(handle.render(), render::render(&snapshot));

    // The next tick arrives later still, so the store's record wins again.
    let snapshot = wait_for(&mut handle, |s| s.order == Some(order_named("A"))).await;
    assert_eq!(store.list_calls(), 3);
    assert_eq!(order_name(&snapshot).as_deref(), Some("A"));
    assert_eq!(handle.render(), render::render(&snapshot));

    handle.unmount().await.unwrap();
}
