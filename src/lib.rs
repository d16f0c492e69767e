pub mod core;

pub use core::config::Config;
pub use core::error::{LauncherError, LauncherResult};
pub use core::launch::Launcher;
