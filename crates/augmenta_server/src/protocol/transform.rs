//! Post-decode mirroring.
//!
//! Sensors are sometimes mounted or calibrated with an axis reversed relative
//! to the consumer. Mirroring is applied to decoded events so the wire parser
//! stays oblivious to it. Only values carried by the event are touched; fields
//! the event does not carry keep whatever (already mirrored) value the
//! registry holds.

use crate::protocol::decoder::{ObjectPayload, ProtocolEvent};
use augmenta_event_system::Vec2;

/// Axis mirroring policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Mirror {
    pub flip_x: bool,
    pub flip_y: bool,
}

impl Mirror {
    pub const fn new(flip_x: bool, flip_y: bool) -> Self {
        Self { flip_x, flip_y }
    }

    pub fn is_identity(&self) -> bool {
        !self.flip_x && !self.flip_y
    }

    /// Mirrors an event in place.
    pub fn apply(&self, event: &mut ProtocolEvent) {
        if self.is_identity() {
            return;
        }

        let data = match event {
            ProtocolEvent::ObjectEnter(data) | ProtocolEvent::ObjectUpdate(data) => data,
            _ => return,
        };

        match &mut data.payload {
            ObjectPayload::Main(main) => {
                if self.flip_x {
                    main.centroid.x = 1.0 - main.centroid.x;
                    main.velocity.x = -main.velocity.x;
                    main.orientation = flip_angle_x(main.orientation);
                    main.bounding_box.x = 1.0 - main.bounding_box.x;
                    main.rotation = flip_angle_x(main.rotation);
                }
                if self.flip_y {
                    main.centroid.y = 1.0 - main.centroid.y;
                    main.velocity.y = -main.velocity.y;
                    main.orientation = flip_angle_y(main.orientation);
                    main.bounding_box.y = 1.0 - main.bounding_box.y;
                    main.rotation = flip_angle_y(main.rotation);
                }
                if let Some(point) = main.highest_point.as_mut() {
                    self.mirror_point(point);
                }
            }
            ObjectPayload::Extra(extra) => self.mirror_point(&mut extra.highest_point),
        }
    }

    fn mirror_point(&self, point: &mut Vec2) {
        if self.flip_x {
            point.x = 1.0 - point.x;
        }
        if self.flip_y {
            point.y = 1.0 - point.y;
        }
    }
}

/// Horizontal mirror of an angle in degrees.
///
/// Self-inverse on `[0, 180]`. Angles above 180 map to `360 - a`, which
/// lands in `[0, 180)`, so a second flip does not return them.
pub fn flip_angle_x(angle: f32) -> f32 {
    if angle > 180.0 {
        360.0 - angle
    } else {
        180.0 - angle
    }
}

/// Vertical mirror of an angle in degrees.
pub fn flip_angle_y(angle: f32) -> f32 {
    360.0 - angle
}
