//! The command-and-control protocol: the command shape cloud connectors
//! carry in their `data` events (§3), the in-flight request wrapper, and
//! the interpreter that turns a request into a `Controller` call plus a
//! reply envelope (§4.5, §6).

mod command;
mod request;
pub mod interpreter;

pub use command::{CncCommand, DEFAULT_REQUEST_ID};
pub use interpreter::dispatch;
pub use request::CncRequest;
