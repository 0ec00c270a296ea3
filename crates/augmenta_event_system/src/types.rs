//! # Core Type Definitions
//!
//! Plain data describing what an Augmenta sensor reports: tracked objects,
//! the scene they move in and the output (fusion) rectangle. These types carry
//! raw protocol values only. Anything engine-specific is left to consumers,
//! which get enough here to compute world-space placement themselves.
//!
//! ## Key Types
//!
//! - [`TrackedObject`] - Live state of one tracked person/blob
//! - [`SceneState`] - Scene size and the object count reported on the wire
//! - [`OutputState`] - Output projection geometry reported by Fusion
//! - [`DataChannel`] - Which channel (main or extra) a piece of data came from

use serde::{Deserialize, Serialize};

/// Stable identifier of a tracked object, as sent by the sensor.
pub type ObjectId = i32;

/// 2D vector in protocol units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// 3D vector in protocol units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }
}

/// Integer 2D size, used for pixel dimensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Vec2i {
    pub x: i32,
    pub y: i32,
}

impl Vec2i {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned bounding box in normalized scene coordinates.
///
/// `x`/`y` is the box origin, `width`/`height` its extent. Rotation is stored
/// separately on [`TrackedObject::bounding_box_rotation`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl BoundingBox {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }
}

/// Channel a piece of object data arrived on.
///
/// Main and extra data are sent on independent cadences, so each update only
/// touches the fields belonging to its own channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataChannel {
    /// Per-frame position, velocity, orientation and bounding box
    #[default]
    Main,
    /// Highest point position, distance to sensor and reflectivity
    Extra,
}

/// Object age. The unit depends on the protocol version that reported it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "unit", content = "value", rename_all = "lowercase")]
pub enum ObjectAge {
    /// Protocol V1 counts frames
    Frames(i32),
    /// Protocol V2 counts seconds
    Seconds(f32),
}

impl Default for ObjectAge {
    fn default() -> Self {
        ObjectAge::Frames(0)
    }
}

/// Live state of one tracked object.
///
/// An object exists in the registry from its first enter/update until an
/// explicit leave or until it expires after `inactive_time` reaches the
/// configured timeout.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrackedObject {
    /// Stable identity, unique while tracked
    pub id: ObjectId,
    /// Rank assigned by the sensor (lower is older); may be reused
    pub oid: i32,
    /// Time since the sensor first saw the object
    pub age: ObjectAge,
    /// Normalized position in `[0,1] x [0,1]`
    pub centroid: Vec2,
    /// Normalized units per second
    pub velocity: Vec2,
    /// Facing direction in degrees, 0..360
    pub orientation: f32,
    /// Depth reported by protocol V1 only
    pub depth: f32,
    pub bounding_box: BoundingBox,
    /// Bounding box rotation in degrees
    pub bounding_box_rotation: f32,
    /// x/y: normalized position of the highest point, z: height in meters
    pub highest_point: Vec3,
    /// Extra channel only
    pub distance_to_sensor: f32,
    /// Extra channel only
    pub reflectivity: f32,
    /// Seconds since the last applied update of any kind
    pub inactive_time: f32,
}

impl TrackedObject {
    /// Creates an empty object with the given identity.
    pub fn new(id: ObjectId, oid: i32) -> Self {
        Self {
            id,
            oid,
            ..Default::default()
        }
    }

    /// Position of the object in world units, centered on the scene.
    ///
    /// The scene plane is mapped to x/z with the origin at the scene center.
    /// When `with_height` is set the point is lifted to half the object
    /// height, otherwise it lies on the scene plane.
    pub fn world_position(&self, scene: &SceneState, scaling: f32, with_height: bool) -> Vec3 {
        let y = if with_height {
            self.highest_point.z * 0.5 * scaling
        } else {
            0.0
        };

        Vec3::new(
            (self.centroid.x - 0.5) * scene.width * scaling,
            y,
            -(self.centroid.y - 0.5) * scene.height * scaling,
        )
    }

    /// Velocity in world units per second on the scene plane.
    pub fn world_velocity(&self, scene: &SceneState, scaling: f32) -> Vec3 {
        Vec3::new(
            self.velocity.x * scene.width * scaling,
            0.0,
            -self.velocity.y * scene.height * scaling,
        )
    }

    /// Size of the object in world units (box width, height, box depth).
    pub fn world_scale(&self, scene: &SceneState, scaling: f32) -> Vec3 {
        Vec3::new(
            self.bounding_box.width * scene.width * scaling,
            self.highest_point.z * scaling,
            self.bounding_box.height * scene.height * scaling,
        )
    }
}

/// Scene geometry reported by the sensor.
///
/// `reported_object_count` comes straight from the wire and may differ from
/// the number of registered objects (timeouts, desired-object filtering).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SceneState {
    /// Scene width in meters
    pub width: f32,
    /// Scene height in meters
    pub height: f32,
    pub reported_object_count: i32,
}

impl Default for SceneState {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
            reported_object_count: 0,
        }
    }
}

/// Output (fusion) projection geometry.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OutputState {
    pub offset: Vec2,
    pub size_in_meters: Vec2,
    pub size_in_pixels: Vec2i,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene(width: f32, height: f32) -> SceneState {
        SceneState {
            width,
            height,
            reported_object_count: 1,
        }
    }

    #[test]
    fn test_new_object_is_zeroed() {
        let object = TrackedObject::new(7, 2);
        assert_eq!(object.id, 7);
        assert_eq!(object.oid, 2);
        assert_eq!(object.inactive_time, 0.0);
        assert_eq!(object.age, ObjectAge::Frames(0));
    }

    #[test]
    fn test_world_position_centered() {
        let mut object = TrackedObject::new(1, 0);
        object.centroid = Vec2::new(0.5, 0.5);
        object.highest_point = Vec3::new(0.5, 0.5, 1.8);

        let flat = object.world_position(&scene(10.0, 5.0), 1.0, false);
        assert_eq!(flat, Vec3::new(0.0, 0.0, 0.0));

        let lifted = object.world_position(&scene(10.0, 5.0), 2.0, true);
        assert!((lifted.y - 1.8).abs() < 1e-6);
    }

    #[test]
    fn test_world_position_corner() {
        let mut object = TrackedObject::new(1, 0);
        object.centroid = Vec2::new(1.0, 0.0);

        let position = object.world_position(&scene(10.0, 4.0), 1.0, false);
        assert!((position.x - 5.0).abs() < 1e-6);
        assert!((position.z - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_world_scale() {
        let mut object = TrackedObject::new(1, 0);
        object.bounding_box = BoundingBox::new(0.4, 0.4, 0.2, 0.1);
        object.highest_point.z = 1.5;

        let size = object.world_scale(&scene(10.0, 5.0), 1.0);
        assert!((size.x - 2.0).abs() < 1e-6);
        assert!((size.y - 1.5).abs() < 1e-6);
        assert!((size.z - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_world_velocity_follows_position_axes() {
        let mut object = TrackedObject::new(1, 0);
        object.velocity = Vec2::new(0.1, 0.2);

        let velocity = object.world_velocity(&scene(10.0, 5.0), 2.0);
        assert!((velocity.x - 2.0).abs() < 1e-6);
        assert_eq!(velocity.y, 0.0);
        assert!((velocity.z + 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_default_scene_is_unit() {
        let scene = SceneState::default();
        assert_eq!(scene.width, 1.0);
        assert_eq!(scene.height, 1.0);
        assert_eq!(scene.reported_object_count, 0);
    }
}
