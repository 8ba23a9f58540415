//! Deployment state machine
//!
//! The unit moves Locked → Armed → Ejected and never back. Transitions are a
//! pure function of state, event and time; [`DeploymentStateMachine`] wraps
//! that function in an atomic cell so interrupt-side tasks and the main loop
//! can share it.

pub mod controller;
pub mod events;
pub mod machine;

pub use controller::DeploymentStateMachine;
pub use events::{Effect, Effects, Event, SensorHealth, MAX_EFFECTS};
pub use machine::DeploymentState;
