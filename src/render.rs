//! Display of the selected asset.
//!
//! Windowing and image decoding are up to the renderer implementation; the
//! agent only hands over the path chosen for the tick.

use std::path::{Path, PathBuf};

/// Errors raised while opening a renderer.
#[derive(Debug)]
pub enum RenderError {
    Unavailable(String),
}

impl std::fmt::Display for RenderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenderError::Unavailable(e) => write!(f, "Renderer unavailable: {e}"),
        }
    }
}

impl std::error::Error for RenderError {}

/// Sink for the per-tick asset selection.
pub trait Renderer {
    /// Acquire the display surface.
    fn open(&mut self) -> Result<(), RenderError> {
        Ok(())
    }

    /// Show `asset`. Called once per tick.
    fn render(&mut self, asset: &Path);

    /// Release the display surface. Must be safe to call more than once.
    fn close(&mut self) {}
}

impl<R: Renderer + ?Sized> Renderer for Box<R> {
    fn open(&mut self) -> Result<(), RenderError> {
        (**self).open()
    }

    fn render(&mut self, asset: &Path) {
        (**self).render(asset)
    }

    fn close(&mut self) {
        (**self).close()
    }
}

/// Renderer that logs asset switches.
#[derive(Debug, Default)]
pub struct LogRenderer {
    current: Option<PathBuf>,
    switches: u64,
}

impl LogRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Asset shown most recently.
    pub fn current(&self) -> Option<&Path> {
        self.current.as_deref()
    }

    /// Number of times the displayed asset changed.
    pub fn switches(&self) -> u64 {
        self.switches
    }
}

impl Renderer for LogRenderer {
    fn render(&mut self, asset: &Path) {
        if self.current.as_deref() == Some(asset) {
            tracing::debug!(asset = %asset.display(), "asset unchanged");
            return;
        }
        tracing::info!("Displaying {}", asset.display());
        self.current = Some(asset.to_path_buf());
        self.switches += 1;
    }

    fn close(&mut self) {
        if self.current.take().is_some() {
            tracing::debug!("renderer closed after {} switches", self.switches);
        }
    }
}
