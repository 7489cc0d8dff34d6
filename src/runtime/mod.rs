//! Async runtime for a session: commands in, snapshots out.

pub mod driver;

pub use driver::{spawn, Command, SessionHandle, TICK_PERIOD};
