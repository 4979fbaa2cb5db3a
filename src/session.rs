//! Single-session UI state and the transform trigger.
//!
//! Every field is independent, in-memory, and gone when the session is.
//! One transform at a time: `transform` takes `&mut self` and front ends are
//! expected to gate the trigger on [`Session::can_transform`].

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::export::{self, ExportError};
use crate::identity::UserIdCell;
use crate::media::{MediaError, SourceImage};
use crate::prompt::{compose_prompt, CreativityLevel, Theme};
use crate::transform::{FailureKind, ImageTransformer, TransformError};

/// Shared "transforming" indicator, readable from other tasks.
#[derive(Debug, Clone, Default)]
pub struct BusyFlag(Arc<AtomicBool>);

impl BusyFlag {
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    fn raise(&self) -> BusyGuard {
        self.0.store(true, Ordering::SeqCst);
        BusyGuard(self.clone())
    }
}

/// Clears the flag when dropped, whatever path the transform took.
struct BusyGuard(BusyFlag);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        (self.0).0.store(false, Ordering::SeqCst);
    }
}

#[derive(Debug, Default)]
pub struct Session {
    selected: Option<SourceImage>,
    prompt: String,
    theme: Option<Theme>,
    creativity: CreativityLevel,
    transformed: Option<String>,
    user_id: UserIdCell,
    busy: BusyFlag,
    error: Option<String>,
}

impl Session {
    pub fn new(user_id: UserIdCell) -> Self {
        Self {
            user_id,
            ..Default::default()
        }
    }

    // ── Inputs ─────────────────────────────────────────

    /// Replace the selected drawing. The previous result no longer applies.
    pub fn select_file(&mut self, image: SourceImage) {
        self.selected = Some(image);
        self.transformed = None;
    }

    /// Load and select a drawing from disk. On failure the current selection is kept.
    pub fn select_file_from_path(&mut self, path: &Path) -> Result<(), MediaError> {
        let image = SourceImage::from_path(path)?;
        self.select_file(image);
        Ok(())
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    /// `None` deselects.
    pub fn select_theme(&mut self, theme: Option<Theme>) {
        self.theme = theme;
    }

    pub fn set_creativity(&mut self, level: u8) {
        self.creativity = CreativityLevel::new(level);
    }

    // ── Views ──────────────────────────────────────────

    pub fn selected_file(&self) -> Option<&SourceImage> {
        self.selected.as_ref()
    }

    pub fn preview_url(&self) -> Option<String> {
        self.selected.as_ref().map(SourceImage::preview_url)
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn theme(&self) -> Option<Theme> {
        self.theme
    }

    pub fn creativity(&self) -> CreativityLevel {
        self.creativity
    }

    pub fn transformed_image(&self) -> Option<&str> {
        self.transformed.as_deref()
    }

    pub fn user_id(&self) -> Option<String> {
        self.user_id.get()
    }

    pub fn is_transforming(&self) -> bool {
        self.busy.is_set()
    }

    pub fn busy_flag(&self) -> BusyFlag {
        self.busy.clone()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Whether the trigger control should be enabled.
    pub fn can_transform(&self) -> bool {
        self.selected.is_some() && !self.busy.is_set()
    }

    pub fn composed_prompt(&self) -> String {
        compose_prompt(self.theme, self.creativity, &self.prompt)
    }

    // ── Actions ────────────────────────────────────────

    /// Run one transform. Failures end up in [`Session::error`] as a single
    /// banner string; the busy flag is cleared on every path.
    pub async fn transform(&mut self, transformer: &dyn ImageTransformer) {
        let Some(image) = self.selected.clone() else {
            tracing::warn!("[Session] Transform requested without a selected image");
            self.error = Some(TransformError::NoImage.user_message().to_string());
            return;
        };

        let _busy = self.busy.raise();
        self.error = None;
        self.transformed = None;

        let prompt = self.composed_prompt();
        tracing::info!(
            "[Session] Transforming with '{}' (theme: {}, creativity: {})",
            transformer.id(),
            self.theme.map(|t| t.display_name()).unwrap_or("none"),
            self.creativity.value()
        );

        match transformer.transform(&prompt, &image).await {
            Ok(result) => {
                tracing::info!("[Session] Transform succeeded");
                self.transformed = Some(result.data_uri());
            }
            Err(e) => {
                match e.kind() {
                    FailureKind::Input => tracing::warn!("[Session] Input error: {}", e),
                    FailureKind::Transport => tracing::error!("[Session] Transport error: {}", e),
                    FailureKind::Content => tracing::warn!("[Session] Content error: {}", e),
                }
                self.error = Some(e.user_message().to_string());
            }
        }
    }

    /// Save the current result into `dir` under the fixed download name.
    pub fn download(&self, dir: &Path) -> Result<PathBuf, ExportError> {
        let uri = self.transformed.as_deref().ok_or(ExportError::NoResult)?;
        export::save_data_uri(uri, dir)
    }
}
