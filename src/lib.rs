//! hostedit - edit hosts file entries without disturbing comments or layout.

pub mod cli;
pub mod config;
pub mod error;
pub mod hosts;
pub mod logging;
pub mod platform;
pub mod session;
