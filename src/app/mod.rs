//! Application state and main event loop.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: Pure function for state transitions
//! - [`App::run`]: Main event loop with rendering
//!
//! The host is a small answer editor. Ctrl+K opens the formula modal over
//! it and a committed formula lands in the answer as `$...$`.

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use model::{ModalFocus, Model, ToastLevel};
pub use update::{Message, update};

use std::path::PathBuf;

use crate::shortcut::Platform;

/// Main application struct that owns the terminal and runs the event loop.
pub struct App {
    file_path: Option<PathBuf>,
    history_file: Option<PathBuf>,
    history_enabled: bool,
    platform: Platform,
    config_global_path: Option<PathBuf>,
    config_local_path: Option<PathBuf>,
}

impl App {
    /// Create a new application editing `file_path`, or an unsaved answer.
    pub fn new(file_path: Option<PathBuf>) -> Self {
        Self {
            file_path,
            history_file: None,
            history_enabled: true,
            platform: Platform::current(),
            config_global_path: None,
            config_local_path: None,
        }
    }

    /// Store history at this path instead of the config directory.
    #[must_use]
    pub fn with_history_file(mut self, path: Option<PathBuf>) -> Self {
        self.history_file = path;
        self
    }

    /// Keep history in memory only.
    #[must_use]
    pub const fn with_history_enabled(mut self, enabled: bool) -> Self {
        self.history_enabled = enabled;
        self
    }

    /// Platform used for shortcut labels.
    #[must_use]
    pub const fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    /// Set config paths to show in help.
    #[must_use]
    pub fn with_config_paths(
        mut self,
        global_path: Option<PathBuf>,
        local_path: Option<PathBuf>,
    ) -> Self {
        self.config_global_path = global_path;
        self.config_local_path = local_path;
        self
    }
}
