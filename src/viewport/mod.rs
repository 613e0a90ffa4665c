//! Camera state of the map view and the machine that drives it
pub mod easing;
pub mod machine;
pub mod state;

#[cfg(test)]
mod easing_test;

pub use easing::{Easing, FlyToPath};
pub use machine::{CameraTarget, FlyToOptions, Gesture, Phase, TransitionDuration, ViewportMachine};
pub use state::{ViewportLimits, ViewportState};
