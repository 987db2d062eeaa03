//! Scripted switch for testing collectors without real hardware.

mod scenarios;
mod switch;

pub use switch::MockSwitch;
