//! Object registry.
//!
//! Owns every [`TrackedObject`] currently tracked, keyed by id. The registry
//! applies decoded object events, merging each update into the channel it
//! belongs to, and expires objects that stop receiving updates. Every change
//! produces the [`Notification`] to dispatch; dispatching is left to the
//! caller so no lock is held while subscribers run.
//!
//! Objects are stored in a `BTreeMap`, so iteration and expiry order is
//! ascending by id.

use crate::protocol::decoder::{ExtraData, MainData, ObjectData, ObjectPayload, ProtocolEvent};
use augmenta_event_system::{DataChannel, Notification, ObjectId, TrackedObject};
use std::collections::BTreeMap;
use tracing::trace;

/// Live set of tracked objects.
#[derive(Debug, Default)]
pub struct ObjectRegistry {
    objects: BTreeMap<ObjectId, TrackedObject>,
}

impl ObjectRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a decoded object event.
    ///
    /// # Arguments
    ///
    /// * `event` - The decoded event; scene and output events are ignored here
    /// * `desired` - Rank filter. A rejected event changes nothing.
    ///
    /// # Returns
    ///
    /// * `Some(ObjectEnter)` on the first enter or update for an unseen id
    /// * `Some(ObjectUpdate)` on an enter or update for a known id
    /// * `Some(ObjectLeave)` on a leave for a known id, carrying the last state
    /// * `None` if the event was filtered, referred to an unknown id on leave,
    ///   or was not an object event
    pub fn apply_event<F>(&mut self, event: &ProtocolEvent, desired: F) -> Option<Notification>
    where
        F: Fn(i32) -> bool,
    {
        let oid = event.oid()?;
        if !desired(oid) {
            trace!("Ignoring object event for undesired oid {}", oid);
            return None;
        }

        match event {
            ProtocolEvent::ObjectEnter(data) | ProtocolEvent::ObjectUpdate(data) => {
                Some(self.upsert(data))
            }
            ProtocolEvent::ObjectLeave { id, channel, .. } => {
                let object = self.objects.remove(id)?;
                Some(Notification::ObjectLeave {
                    object,
                    channel: *channel,
                })
            }
            _ => None,
        }
    }

    fn upsert(&mut self, data: &ObjectData) -> Notification {
        let channel = data.channel();

        if let Some(object) = self.objects.get_mut(&data.id) {
            merge(object, data);
            return Notification::ObjectUpdate {
                object: object.clone(),
                channel,
            };
        }

        let mut object = TrackedObject::new(data.id, data.oid);
        merge(&mut object, data);
        self.objects.insert(data.id, object.clone());
        Notification::ObjectEnter { object, channel }
    }

    /// Advances inactivity timers and removes objects that timed out.
    ///
    /// An object whose inactive time is already at or past `timeout_secs` is
    /// removed; every other object has `elapsed_secs` added. Removal therefore
    /// happens on the first sweep after the threshold is reached, which makes
    /// the effective timeout depend on the tick interval.
    ///
    /// # Returns
    ///
    /// One leave notification per removed object, ascending by id.
    pub fn sweep_expired(&mut self, timeout_secs: f32, elapsed_secs: f32) -> Vec<Notification> {
        let mut expired = Vec::new();
        for (id, object) in self.objects.iter_mut() {
            if object.inactive_time < timeout_secs {
                object.inactive_time += elapsed_secs;
            } else {
                expired.push(*id);
            }
        }

        expired
            .into_iter()
            .filter_map(|id| self.objects.remove(&id))
            .map(|object| Notification::ObjectLeave {
                object,
                channel: DataChannel::Main,
            })
            .collect()
    }

    /// Drains the registry, returning a leave notification per object.
    pub fn remove_all(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.objects)
            .into_values()
            .map(|object| Notification::ObjectLeave {
                object,
                channel: DataChannel::Main,
            })
            .collect()
    }

    pub fn get(&self, id: ObjectId) -> Option<&TrackedObject> {
        self.objects.get(&id)
    }

    pub fn contains(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Objects in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = &TrackedObject> {
        self.objects.values()
    }
}

fn merge(object: &mut TrackedObject, data: &ObjectData) {
    object.oid = data.oid;
    match &data.payload {
        ObjectPayload::Main(main) => merge_main(object, main),
        ObjectPayload::Extra(extra) => merge_extra(object, extra),
    }
    object.inactive_time = 0.0;
}

fn merge_main(object: &mut TrackedObject, main: &MainData) {
    object.age = main.age;
    object.centroid = main.centroid;
    object.velocity = main.velocity;
    object.orientation = main.orientation;
    if let Some(depth) = main.depth {
        object.depth = depth;
    }
    object.bounding_box = main.bounding_box;
    object.bounding_box_rotation = main.rotation;
    if let Some(point) = main.highest_point {
        object.highest_point.x = point.x;
        object.highest_point.y = point.y;
    }
    object.highest_point.z = main.height;
}

fn merge_extra(object: &mut TrackedObject, extra: &ExtraData) {
    object.highest_point.x = extra.highest_point.x;
    object.highest_point.y = extra.highest_point.y;
    object.distance_to_sensor = extra.distance;
    object.reflectivity = extra.reflectivity;
}

#[cfg(test)]
mod tests {
    use super::*;
    use augmenta_event_system::{BoundingBox, NotificationKind, ObjectAge, Vec2};

    fn main_data(id: i32, oid: i32, x: f32) -> ObjectData {
        ObjectData {
            id,
            oid,
            payload: ObjectPayload::Main(MainData {
                age: ObjectAge::Seconds(1.0),
                centroid: Vec2::new(x, 0.5),
                velocity: Vec2::new(0.1, 0.0),
                orientation: 90.0,
                depth: None,
                bounding_box: BoundingBox::new(0.4, 0.4, 0.2, 0.2),
                rotation: 10.0,
                highest_point: None,
                height: 1.8,
            }),
        }
    }

    fn extra_data(id: i32, oid: i32) -> ObjectData {
        ObjectData {
            id,
            oid,
            payload: ObjectPayload::Extra(ExtraData {
                highest_point: Vec2::new(0.3, 0.7),
                distance: 4.0,
                reflectivity: 0.6,
            }),
        }
    }

    fn all(_oid: i32) -> bool {
        true
    }

    #[test]
    fn test_update_for_unknown_id_is_enter() {
        let mut registry = ObjectRegistry::new();
        let notification = registry
            .apply_event(&ProtocolEvent::ObjectUpdate(main_data(1, 0, 0.5)), all)
            .unwrap();

        assert_eq!(notification.kind(), NotificationKind::ObjectEnter);
        assert!(registry.contains(1));

        let second = registry
            .apply_event(&ProtocolEvent::ObjectUpdate(main_data(1, 0, 0.6)), all)
            .unwrap();
        assert_eq!(second.kind(), NotificationKind::ObjectUpdate);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_extra_channel_first_sight_enters_with_default_main_fields() {
        let mut registry = ObjectRegistry::new();
        let notification = registry
            .apply_event(&ProtocolEvent::ObjectUpdate(extra_data(4, 2)), all)
            .unwrap();

        let defaults = TrackedObject::default();
        match notification {
            Notification::ObjectEnter { object, channel } => {
                assert_eq!(channel, DataChannel::Extra);
                assert_eq!((object.id, object.oid), (4, 2));
                assert_eq!(object.centroid, defaults.centroid);
                assert_eq!(object.velocity, defaults.velocity);
                assert_eq!(object.bounding_box, defaults.bounding_box);
                assert_eq!(object.highest_point.z, defaults.highest_point.z);
                assert_eq!((object.highest_point.x, object.highest_point.y), (0.3, 0.7));
                assert_eq!(object.distance_to_sensor, 4.0);
                assert_eq!(object.reflectivity, 0.6);
            }
            other => panic!("expected enter, got {other:?}"),
        }
        assert!(registry.contains(4));
    }

    #[test]
    fn test_enter_for_known_id_is_update() {
        let mut registry = ObjectRegistry::new();
        registry.apply_event(&ProtocolEvent::ObjectEnter(main_data(1, 0, 0.5)), all);
        let again = registry
            .apply_event(&ProtocolEvent::ObjectEnter(main_data(1, 0, 0.5)), all)
            .unwrap();
        assert_eq!(again.kind(), NotificationKind::ObjectUpdate);
    }

    #[test]
    fn test_channels_merge_independently() {
        let mut registry = ObjectRegistry::new();
        registry.apply_event(&ProtocolEvent::ObjectUpdate(main_data(1, 0, 0.5)), all);
        registry.apply_event(&ProtocolEvent::ObjectUpdate(extra_data(1, 0)), all);

        let object = registry.get(1).unwrap().clone();
        assert_eq!(object.centroid, Vec2::new(0.5, 0.5));
        assert_eq!(object.orientation, 90.0);
        assert_eq!(object.highest_point.z, 1.8);
        assert_eq!((object.highest_point.x, object.highest_point.y), (0.3, 0.7));
        assert_eq!(object.distance_to_sensor, 4.0);

        // A later main update keeps the extra-channel fields.
        registry.apply_event(&ProtocolEvent::ObjectUpdate(main_data(1, 0, 0.9)), all);
        let object = registry.get(1).unwrap();
        assert_eq!(object.centroid.x, 0.9);
        assert_eq!((object.highest_point.x, object.highest_point.y), (0.3, 0.7));
        assert_eq!(object.reflectivity, 0.6);
        assert_eq!(object.distance_to_sensor, 4.0);
    }

    #[test]
    fn test_rejected_event_changes_nothing() {
        let mut registry = ObjectRegistry::new();
        registry.apply_event(&ProtocolEvent::ObjectUpdate(main_data(1, 0, 0.5)), all);
        let before = registry.get(1).unwrap().clone();

        let reject = |_oid: i32| false;
        assert!(registry
            .apply_event(&ProtocolEvent::ObjectUpdate(main_data(1, 0, 0.9)), reject)
            .is_none());
        assert!(registry
            .apply_event(&ProtocolEvent::ObjectUpdate(main_data(2, 1, 0.9)), reject)
            .is_none());
        assert!(registry
            .apply_event(
                &ProtocolEvent::ObjectLeave {
                    id: 1,
                    oid: 0,
                    channel: DataChannel::Main
                },
                reject
            )
            .is_none());

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get(1), Some(&before));
    }

    #[test]
    fn test_leave_returns_last_state_and_unknown_is_noop() {
        let mut registry = ObjectRegistry::new();
        registry.apply_event(&ProtocolEvent::ObjectUpdate(main_data(1, 0, 0.5)), all);

        let leave = ProtocolEvent::ObjectLeave {
            id: 1,
            oid: 0,
            channel: DataChannel::Main,
        };
        let notification = registry.apply_event(&leave, all).unwrap();
        match notification {
            Notification::ObjectLeave { object, channel } => {
                assert_eq!(object.id, 1);
                assert_eq!(object.centroid.x, 0.5);
                assert_eq!(channel, DataChannel::Main);
            }
            other => panic!("expected leave, got {other:?}"),
        }

        assert!(registry.apply_event(&leave, all).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_update_resets_inactive_time() {
        let mut registry = ObjectRegistry::new();
        registry.apply_event(&ProtocolEvent::ObjectUpdate(main_data(1, 0, 0.5)), all);
        registry.sweep_expired(1.0, 0.5);
        assert_eq!(registry.get(1).unwrap().inactive_time, 0.5);

        registry.apply_event(&ProtocolEvent::ObjectUpdate(extra_data(1, 0)), all);
        assert_eq!(registry.get(1).unwrap().inactive_time, 0.0);
    }

    #[test]
    fn test_sweep_expires_after_threshold() {
        let mut registry = ObjectRegistry::new();
        registry.apply_event(&ProtocolEvent::ObjectUpdate(main_data(1, 0, 0.5)), all);

        assert!(registry.sweep_expired(1.0, 0.5).is_empty());
        assert_eq!(registry.get(1).unwrap().inactive_time, 0.5);

        assert!(registry.sweep_expired(1.0, 0.5).is_empty());
        assert_eq!(registry.get(1).unwrap().inactive_time, 1.0);

        let expired = registry.sweep_expired(1.0, 0.5);
        assert_eq!(expired.len(), 1);
        assert_eq!(expired[0].kind(), NotificationKind::ObjectLeave);
        assert!(!registry.contains(1));

        assert!(registry.sweep_expired(1.0, 0.5).is_empty());
    }

    #[test]
    fn test_sweep_order_is_ascending_id() {
        let mut registry = ObjectRegistry::new();
        for id in [9, 3, 5] {
            registry.apply_event(&ProtocolEvent::ObjectUpdate(main_data(id, 0, 0.5)), all);
        }
        registry.sweep_expired(0.1, 1.0);

        let ids: Vec<_> = registry
            .sweep_expired(0.1, 1.0)
            .iter()
            .filter_map(|n| n.object().map(|(o, _)| o.id))
            .collect();
        assert_eq!(ids, vec![3, 5, 9]);
    }

    #[test]
    fn test_remove_all_drains() {
        let mut registry = ObjectRegistry::new();
        for id in [2, 1] {
            registry.apply_event(&ProtocolEvent::ObjectUpdate(main_data(id, 0, 0.5)), all);
        }
        let leaves = registry.remove_all();
        assert_eq!(leaves.len(), 2);
        assert!(leaves
            .iter()
            .all(|n| n.kind() == NotificationKind::ObjectLeave));
        assert!(registry.is_empty());
    }
}
