pub mod bridge;
pub mod config;
pub mod handler;
pub mod host;
pub mod insert;
pub mod memory_host;
pub mod random;
pub mod search;
pub mod target;
pub mod ui;

pub use handler::{CommandHandler, Control};
