//! Scene and output state.
//!
//! Singletons updated in place by scene and fusion messages. Last write wins.

use crate::protocol::decoder::{ProtocolEvent, SceneSize};
use augmenta_event_system::{Notification, OutputState, SceneState};

/// Current scene and output geometry.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct WorldState {
    pub scene: SceneState,
    pub output: OutputState,
}

impl WorldState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a scene or output event.
    ///
    /// `pixel_size` converts V1 pixel sizes to meters.
    ///
    /// # Returns
    ///
    /// The notification to dispatch, or `None` for object events.
    pub fn apply_event(&mut self, event: &ProtocolEvent, pixel_size: f32) -> Option<Notification> {
        match event {
            ProtocolEvent::SceneUpdate { object_count, size } => {
                let (width, height) = match *size {
                    SceneSize::Pixels { width, height } => {
                        (width as f32 * pixel_size, height as f32 * pixel_size)
                    }
                    SceneSize::Meters { width, height } => (width, height),
                };
                self.scene = SceneState {
                    width,
                    height,
                    reported_object_count: *object_count,
                };
                Some(Notification::SceneUpdated(self.scene))
            }
            ProtocolEvent::OutputUpdate(output) => {
                self.output = *output;
                Some(Notification::OutputUpdated(self.output))
            }
            _ => None,
        }
    }
}
