//! Interactive simulation session.
//!
//! Holds the state behind a preview front end: the loaded image, which
//! conditions are ticked, the simulated result previews, and a one-line
//! status. Every operation is synchronous and leaves the session unchanged
//! when it fails.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::config::SimulatorConfig;
use crate::engine::simulate;
use crate::error::{Result, SimError};
use crate::image::SimImage;
use crate::io;
use crate::preview;
use crate::registry::Condition;

/// A simulated condition alongside its full-size and preview images.
#[derive(Debug, Clone)]
pub struct SimulationResult {
    pub condition: Condition,
    pub image: SimImage<u8>,
    pub preview: SimImage<u8>,
}

/// The currently loaded source image.
#[derive(Debug, Clone)]
struct Loaded {
    path: PathBuf,
    image: SimImage<u8>,
    preview: SimImage<u8>,
}

/// Headless state of an interactive simulation front end.
///
/// Owns the source image and its preview, the ticked conditions, and the
/// results of the last [`simulate`](Self::simulate) call.
#[derive(Debug)]
pub struct SimulationSession {
    config: SimulatorConfig,
    loaded: Option<Loaded>,
    selected: BTreeSet<Condition>,
    results: Vec<SimulationResult>,
    status: String,
}

impl SimulationSession {
    pub fn new(config: SimulatorConfig) -> Self {
        Self {
            config,
            loaded: None,
            selected: BTreeSet::new(),
            results: Vec::new(),
            status: "Ready".to_string(),
        }
    }

    /// Load `path` as the source image.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        let image = io::load_image(path)?;
        self.set_image(path.to_path_buf(), image);
        Ok(())
    }

    /// Install an already decoded image as the source.
    pub fn set_image(&mut self, path: PathBuf, image: SimImage<u8>) {
        let preview = preview::thumbnail(&image, self.config.preview_size);
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        self.status = format!("Loaded: {name}");
        self.loaded = Some(Loaded {
            path,
            image,
            preview,
        });
    }

    pub fn image(&self) -> Option<&SimImage<u8>> {
        self.loaded.as_ref().map(|l| &l.image)
    }

    pub fn image_path(&self) -> Option<&Path> {
        self.loaded.as_ref().map(|l| l.path.as_path())
    }

    /// Thumbnail of the source sized to `preview_size`.
    pub fn original_preview(&self) -> Option<&SimImage<u8>> {
        self.loaded.as_ref().map(|l| &l.preview)
    }

    pub fn set_selected(&mut self, condition: Condition, selected: bool) {
        if selected {
            self.selected.insert(condition);
        } else {
            self.selected.remove(&condition);
        }
    }

    /// Flip the selection of `condition`, returning the new state.
    pub fn toggle(&mut self, condition: Condition) -> bool {
        let now = !self.selected.contains(&condition);
        self.set_selected(condition, now);
        now
    }

    pub fn is_selected(&self, condition: Condition) -> bool {
        self.selected.contains(&condition)
    }

    /// Selected conditions in registry order.
    pub fn selected(&self) -> impl Iterator<Item = Condition> + '_ {
        self.selected.iter().copied()
    }

    /// Replace the results with one simulation per selected condition.
    pub fn simulate(&mut self) -> Result<&[SimulationResult]> {
        let Some(loaded) = &self.loaded else {
            tracing::warn!("simulation requested without an image");
            return Err(SimError::NoImage);
        };
        if self.selected.is_empty() {
            tracing::warn!("simulation requested without a selection");
            return Err(SimError::NoSelection);
        }

        let results: Vec<_> = self
            .selected
            .iter()
            .map(|&condition| {
                let image = simulate(&loaded.image, condition);
                let preview = preview::thumbnail(&image, self.config.result_size);
                SimulationResult {
                    condition,
                    image,
                    preview,
                }
            })
            .collect();

        self.results = results;
        self.status = format!("Applied {} simulations", self.results.len());
        tracing::info!(count = self.results.len(), "applied simulations");
        Ok(&self.results)
    }

    pub fn results(&self) -> &[SimulationResult] {
        &self.results
    }

    pub fn clear_results(&mut self) {
        self.results.clear();
        self.status = "Cleared results".to_string();
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn config(&self) -> &SimulatorConfig {
        &self.config
    }
}

impl Default for SimulationSession {
    fn default() -> Self {
        Self::new(SimulatorConfig::default())
    }
}
