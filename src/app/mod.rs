//! Application state and main event loop.
//!
//! This module implements The Elm Architecture (TEA):
//! - [`Model`]: The complete application state
//! - [`Message`]: All possible events and actions
//! - [`update`]: Pure function for state transitions
//! - [`App::run`]: Main event loop with rendering

mod effects;
mod event_loop;
mod input;
mod model;
mod update;

pub use model::{ConfirmPrompt, Model, OutputTab, TabState, ToastLevel};
pub use update::{Message, update};

use std::path::PathBuf;

use crate::pipeline::DEFAULT_DEBOUNCE_MS;
use crate::theme::{PreviewStyle, Theme, ThemeStore};

/// Main application struct that owns the terminal and runs the event loop.
pub struct App {
    initial_text: String,
    debounce_ms: u64,
    output_dir: PathBuf,
    theme_store: ThemeStore,
    theme_preset: Option<Theme>,
    preview_style: PreviewStyle,
    config_global_path: Option<PathBuf>,
    config_local_path: Option<PathBuf>,
}

impl App {
    /// Create a new application editing `initial_text`.
    pub fn new(initial_text: impl Into<String>) -> Self {
        Self {
            initial_text: initial_text.into(),
            debounce_ms: DEFAULT_DEBOUNCE_MS,
            output_dir: PathBuf::from("."),
            theme_store: ThemeStore::in_memory(),
            theme_preset: None,
            preview_style: PreviewStyle::Default,
            config_global_path: None,
            config_local_path: None,
        }
    }

    /// Quiet period between the last edit and the render.
    #[must_use]
    pub const fn with_debounce_ms(mut self, debounce_ms: u64) -> Self {
        self.debounce_ms = debounce_ms;
        self
    }

    /// Directory the download and export actions write into.
    #[must_use]
    pub fn with_output_dir(mut self, dir: PathBuf) -> Self {
        self.output_dir = dir;
        self
    }

    /// Where the theme preference is read from and saved to.
    #[must_use]
    pub fn with_theme_store(mut self, store: ThemeStore) -> Self {
        self.theme_store = store;
        self
    }

    /// Start in `theme` instead of the stored one.
    #[must_use]
    pub const fn with_theme(mut self, theme: Option<Theme>) -> Self {
        self.theme_preset = theme;
        self
    }

    #[must_use]
    pub const fn with_preview_style(mut self, style: PreviewStyle) -> Self {
        self.preview_style = style;
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
