//! Interactive command console.
//!
//! # Responsibility
//! - Parse console lines into commands.
//! - Dispatch commands to the record service and print outcomes.
//! - Drive the read-eval loop.

pub mod command;
pub mod dispatcher;
pub mod shell;

pub use command::{parse_line, Command};
pub use dispatcher::{Console, Flow};
pub use shell::{run, PROMPT};
