//! Document state: the loaded file, page navigation, zoom and mode

use crate::config::EditorConfig;
use crate::error::{Result, SignpadError};
use crate::render::LoadedDocument;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which interaction layer is active
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    View,
    Edit,
    Sign,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::View => f.write_str("view"),
            Mode::Edit => f.write_str("edit"),
            Mode::Sign => f.write_str("sign"),
        }
    }
}

impl FromStr for Mode {
    type Err = SignpadError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "view" => Ok(Mode::View),
            "edit" => Ok(Mode::Edit),
            "sign" => Ok(Mode::Sign),
            other => Err(SignpadError::Validation(format!("Unknown mode: {}", other))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DocumentState {
    loaded: Option<LoadedDocument>,
    current_page: u32,
    scale: f64,
    mode: Mode,
    config: EditorConfig,
}

impl DocumentState {
    pub fn new(config: EditorConfig) -> Self {
        Self {
            loaded: None,
            current_page: 1,
            scale: config.default_scale,
            mode: Mode::View,
            config,
        }
    }

    /// Install a freshly loaded document, starting on page 1 at the
    /// default zoom.
    pub fn set_document(&mut self, loaded: LoadedDocument) {
        self.loaded = Some(loaded);
        self.current_page = 1;
        self.scale = self.config.default_scale;
    }

    pub fn loaded(&self) -> Option<&LoadedDocument> {
        self.loaded.as_ref()
    }

    pub fn file_name(&self) -> Option<&str> {
        self.loaded.as_ref().map(LoadedDocument::name)
    }

    pub fn bytes(&self) -> Option<&[u8]> {
        self.loaded.as_ref().map(LoadedDocument::bytes)
    }

    pub fn total_pages(&self) -> u32 {
        self.loaded.as_ref().map_or(0, LoadedDocument::page_count)
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn set_current_page(&mut self, page: u32) -> Result<()> {
        let total = self.total_pages();
        if total == 0 {
            return Err(SignpadError::NoDocument);
        }
        if page == 0 || page > total {
            return Err(SignpadError::PageOutOfRange { page, total });
        }
        self.current_page = page;
        Ok(())
    }

    /// Move forward one page; false on the last page.
    pub fn next_page(&mut self) -> bool {
        if self.current_page < self.total_pages() {
            self.current_page += 1;
            true
        } else {
            false
        }
    }

    /// Move back one page; false on the first page.
    pub fn previous_page(&mut self) -> bool {
        if self.current_page > 1 {
            self.current_page -= 1;
            true
        } else {
            false
        }
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Set the zoom factor, clamped to the configured range. Non-finite
    /// input is ignored. Returns the applied scale.
    pub fn set_scale(&mut self, scale: f64) -> f64 {
        if scale.is_finite() {
            self.scale = self.config.clamp_scale(scale);
        }
        self.scale
    }

    pub fn zoom_in(&mut self) -> f64 {
        self.set_scale(self.scale + self.config.scale_step)
    }

    pub fn zoom_out(&mut self) -> f64 {
        self.set_scale(self.scale - self.config.scale_step)
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: Mode) {
        self.mode = mode;
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Forget the document and return to initial values.
    pub fn reset(&mut self) {
        self.loaded = None;
        self.current_page = 1;
        self.scale = self.config.default_scale;
        self.mode = Mode::View;
    }
}
