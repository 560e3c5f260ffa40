//! Interaction controller
//!
//! Runs the session state machine on a single event loop and carries out its
//! effects: starting/stopping capture and dispatching answer requests.

mod controller;

pub use controller::{ControllerHandle, InteractionController};
