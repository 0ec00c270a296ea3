/// Event system module - broken down into manageable components
mod core;
mod emitters;
mod handlers;
mod stats;
#[cfg(test)]
mod tests;

pub use core::{EventSystem, SubscriptionId};
pub use stats::EventSystemStats;
