//! Tests for subscription and synchronous dispatch

use crate::events::{EventError, FnEventHandler, Notification, NotificationKind};
use crate::types::{DataChannel, OutputState, SceneState, TrackedObject};
use crate::EventSystem;
use parking_lot::Mutex;
use std::sync::Arc;

fn enter(id: i32) -> Notification {
    Notification::ObjectEnter {
        object: TrackedObject::new(id, 0),
        channel: DataChannel::Main,
    }
}

#[test]
fn test_handlers_run_in_registration_order() {
    let events = EventSystem::new();
    let order = Arc::new(Mutex::new(Vec::new()));

    for name in ["first", "second", "third"] {
        let order = order.clone();
        events.on_object_enter(name, move |_object, _channel| {
            order.lock().push(name);
            Ok(())
        });
    }

    assert_eq!(events.emit(&enter(1)), 3);
    assert_eq!(*order.lock(), vec!["first", "second", "third"]);
}

#[test]
fn test_emit_only_reaches_matching_kind() {
    let events = EventSystem::new();
    let scenes = Arc::new(Mutex::new(Vec::new()));
    let scenes_clone = scenes.clone();

    events.on_scene_updated("scene", move |scene| {
        scenes_clone.lock().push(*scene);
        Ok(())
    });

    assert_eq!(events.emit(&enter(1)), 0);
    assert_eq!(events.emit(&Notification::OutputUpdated(OutputState::default())), 0);

    let scene = SceneState {
        width: 10.0,
        height: 5.0,
        reported_object_count: 2,
    };
    assert_eq!(events.emit(&Notification::SceneUpdated(scene)), 1);
    assert_eq!(*scenes.lock(), vec![scene]);
}

#[test]
fn test_unsubscribe_removes_handler() {
    let events = EventSystem::new();
    let calls = Arc::new(Mutex::new(0));
    let calls_clone = calls.clone();

    let id = events.on_object_leave("leave", move |_object, _channel| {
        *calls_clone.lock() += 1;
        Ok(())
    });
    assert_eq!(events.handler_count(NotificationKind::ObjectLeave), 1);

    assert!(events.unsubscribe(id));
    assert!(!events.unsubscribe(id));

    let leave = Notification::ObjectLeave {
        object: TrackedObject::new(1, 0),
        channel: DataChannel::Main,
    };
    assert_eq!(events.emit(&leave), 0);
    assert_eq!(*calls.lock(), 0);
    assert_eq!(events.get_stats().total_handlers, 0);
}

#[test]
fn test_failing_handler_does_not_stop_delivery() {
    let events = EventSystem::new();
    let reached = Arc::new(Mutex::new(false));
    let reached_clone = reached.clone();

    events.on_object_enter("broken", |_object, _channel| {
        Err(EventError::HandlerExecution("nope".to_string()))
    });
    events.on_object_enter("healthy", move |_object, _channel| {
        *reached_clone.lock() = true;
        Ok(())
    });

    events.emit(&enter(4));

    assert!(*reached.lock());
    let stats = events.get_stats();
    assert_eq!(stats.events_emitted, 1);
    assert_eq!(stats.handler_invocations, 2);
    assert_eq!(stats.handler_failures, 1);
}

#[test]
fn test_handler_may_reenter_event_system() {
    let events = Arc::new(EventSystem::new());
    let inner = events.clone();
    let updates = Arc::new(Mutex::new(0));
    let updates_clone = updates.clone();

    events.on_object_update("count", move |_object, _channel| {
        *updates_clone.lock() += 1;
        Ok(())
    });
    events.on_object_enter("chain", move |object, channel| {
        inner.on_scene_updated("late", |_scene| Ok(()));
        inner.emit(&Notification::ObjectUpdate {
            object: object.clone(),
            channel,
        });
        Ok(())
    });

    events.emit(&enter(9));

    assert_eq!(*updates.lock(), 1);
    assert_eq!(events.handler_count(NotificationKind::SceneUpdated), 1);
}

#[test]
fn test_generic_subscribe() {
    let events = EventSystem::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = seen.clone();

    let handler = FnEventHandler::new("raw", move |notification: &Notification| {
        seen_clone.lock().push(notification.kind());
        Ok(())
    });
    events.subscribe(NotificationKind::OutputUpdated, Arc::new(handler));

    events.emit(&Notification::OutputUpdated(OutputState::default()));
    assert_eq!(*seen.lock(), vec![NotificationKind::OutputUpdated]);
}
