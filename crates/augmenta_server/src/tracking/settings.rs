//! Runtime tracking settings.

use super::filter::{DesiredMode, DesiredObjects};
use crate::protocol::{decoder::ProtocolVersion, transform::Mirror};
use serde::{Deserialize, Serialize};

/// Settings that shape how messages are interpreted.
///
/// Can be swapped at runtime with [`crate::Tracker::update_settings`]; the new
/// values apply from the next message or tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerSettings {
    pub protocol_version: ProtocolVersion,
    /// Meters per pixel for V1 scene sizes
    pub pixel_size: f32,
    /// World units per meter, for consumers deriving world geometry
    pub scaling: f32,
    pub flip_x: bool,
    pub flip_y: bool,
    /// Seconds without updates before an object is expired
    pub object_timeout_secs: f32,
    pub desired_mode: DesiredMode,
    pub desired_count: i32,
    /// Drop every incoming message before decoding
    pub mute: bool,
}

impl TrackerSettings {
    pub fn mirror(&self) -> Mirror {
        Mirror::new(self.flip_x, self.flip_y)
    }

    pub fn desired(&self) -> DesiredObjects {
        DesiredObjects::new(self.desired_mode, self.desired_count)
    }
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            protocol_version: ProtocolVersion::V2,
            pixel_size: 0.005,
            scaling: 1.0,
            flip_x: false,
            flip_y: false,
            object_timeout_secs: 1.0,
            desired_mode: DesiredMode::All,
            desired_count: 1,
            mute: false,
        }
    }
}
