pub mod command;
pub mod key_bindings;
pub mod runner;

pub use command::Command;
pub use key_bindings::{KeyBinding, KeyBindings};
pub use runner::{Runtime, Session};
