//! Game simulation modules

pub mod machine;
pub mod pending;
pub mod physics;
pub mod registry;
pub mod session;
pub mod snapshot;
pub mod stats;
pub mod tick;

pub use physics::LanderSpec;
pub use registry::SessionRegistry;
pub use tick::{SessionChannels, TickScheduler};
