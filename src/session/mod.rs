//! Session orchestration: the controller state machine and the event loop
//! that drives it.

pub mod controller;
pub mod runner;

pub use controller::{Directive, Reception, SessionController, SessionError};
pub use runner::{SessionRunner, UserInput};
