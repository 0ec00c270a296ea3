//! Tracking state: which objects exist, what the scene looks like, and which
//! objects are worth tracking at all.

pub mod filter;
pub mod registry;
pub mod scene;
pub mod settings;

pub use filter::{is_desired, DesiredMode, DesiredObjects};
pub use registry::ObjectRegistry;
pub use scene::WorldState;
pub use settings::TrackerSettings;
