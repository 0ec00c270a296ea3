//! # Object Behaviours
//!
//! Presentation-layer hook for tracked objects. A behaviour is told when an
//! object appears and when it goes away; what it does in between (placing a
//! proxy, starting a sound, lighting a fixture) is its own business.
//!
//! Spawn and destroy are always paired per id. A behaviour attached while
//! objects are already tracked spawns them on their next update, and
//! detaching destroys everything it still has spawned.

use crate::system::{EventSystem, SubscriptionId};
use crate::types::{ObjectId, TrackedObject};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Lifecycle hooks invoked for every tracked object.
pub trait ObjectBehaviour: Send + Sync + 'static {
    /// Called once when the behaviour first sees the object.
    fn spawn(&self, object: &TrackedObject);

    /// Called once for every spawned object, when it leaves or when the
    /// behaviour is detached.
    fn destroy(&self, object: &TrackedObject);
}

/// Pairs spawn/destroy calls for one attached behaviour.
struct BehaviourAdapter {
    behaviour: Arc<dyn ObjectBehaviour>,
    /// Last known state of every spawned object
    spawned: Mutex<BTreeMap<ObjectId, TrackedObject>>,
}

impl BehaviourAdapter {
    fn seen(&self, object: &TrackedObject) {
        let first_sight = self
            .spawned
            .lock()
            .insert(object.id, object.clone())
            .is_none();
        if first_sight {
            self.behaviour.spawn(object);
        }
    }

    fn left(&self, object: &TrackedObject) {
        let was_spawned = self.spawned.lock().remove(&object.id).is_some();
        if was_spawned {
            self.behaviour.destroy(object);
        }
    }

    fn destroy_all(&self) {
        let remaining = std::mem::take(&mut *self.spawned.lock());
        for object in remaining.values() {
            self.behaviour.destroy(object);
        }
    }
}

/// Handles for a behaviour attached with [`attach_behaviour`].
pub struct BehaviourSubscription {
    pub enter: SubscriptionId,
    pub update: SubscriptionId,
    pub leave: SubscriptionId,
    adapter: Arc<BehaviourAdapter>,
}

impl std::fmt::Debug for BehaviourSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BehaviourSubscription")
            .field("enter", &self.enter)
            .field("update", &self.update)
            .field("leave", &self.leave)
            .field("spawned", &self.spawned_count())
            .finish()
    }
}

impl BehaviourSubscription {
    /// Number of objects currently spawned by the behaviour.
    pub fn spawned_count(&self) -> usize {
        self.adapter.spawned.lock().len()
    }

    /// Detaches the behaviour and destroys every object it still has spawned.
    pub fn detach(self, events: &EventSystem) {
        events.unsubscribe(self.enter);
        events.unsubscribe(self.update);
        events.unsubscribe(self.leave);
        self.adapter.destroy_all();
    }
}

/// Wires a behaviour to the object notifications of an event system.
///
/// The behaviour is spawned on the first enter or update it sees for an id
/// and destroyed on that id's leave. Leaves for ids it never spawned are
/// not forwarded.
pub fn attach_behaviour(
    events: &EventSystem,
    name: &str,
    behaviour: Arc<dyn ObjectBehaviour>,
) -> BehaviourSubscription {
    let adapter = Arc::new(BehaviourAdapter {
        behaviour,
        spawned: Mutex::new(BTreeMap::new()),
    });

    let on_enter = adapter.clone();
    let enter = events.on_object_enter(&format!("{name}::spawn"), move |object, _channel| {
        on_enter.seen(object);
        Ok(())
    });

    let on_update = adapter.clone();
    let update = events.on_object_update(&format!("{name}::spawn_late"), move |object, _channel| {
        on_update.seen(object);
        Ok(())
    });

    let on_leave = adapter.clone();
    let leave = events.on_object_leave(&format!("{name}::destroy"), move |object, _channel| {
        on_leave.left(object);
        Ok(())
    });

    BehaviourSubscription {
        enter,
        update,
        leave,
        adapter,
    }
}
