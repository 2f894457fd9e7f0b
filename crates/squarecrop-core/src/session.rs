//! A single crop editing session.
//!
//! [`CropSession`] owns everything one edit needs: the decoded source, the
//! viewport, the gesture tracker and the export settings. Nothing is shared
//! between sessions.
//!
//! # Lifecycle
//!
//! 1. [`CropSession::new`] with a [`CropConfig`]
//! 2. [`CropSession::load_source`] with the selected file's bytes
//! 3. Pointer and wheel events, each followed by [`CropSession::update`] to
//!    fetch the transform the host should draw
//! 4. [`CropSession::commit`] to produce the output file, or
//!    [`CropSession::cancel`] to drop everything
//!
//! The decoded source is released when it is replaced, on cancel and when the
//! session is closed or dropped.

use thiserror::Error;
use tracing::{debug, warn};

use crate::config::{ConfigError, CropConfig, OutputSpec};
use crate::decode::{decode_source, DecodeError, SourceImage};
use crate::encode::{
    encode_with_fallback, to_data_url, BufferEncoder, CodecEncoder, EncodeError, RasterEncoder,
};
use crate::geometry::{effective_stage_size, NaturalSize, Point, Viewport};
use crate::gesture::{GestureState, GestureTracker, PointerId};
use crate::render::{compose_square, CropRaster, PreviewTransform};

/// Errors surfaced by a crop session. None of them end the session.
#[derive(Debug, Error)]
pub enum CropError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Could not load image: {0}")]
    Load(#[from] DecodeError),

    #[error("Could not encode the cropped image, please try again: {0}")]
    EncodeFailed(#[from] EncodeError),
}

/// The product of a successful commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CropOutput {
    pub file_name: String,
    pub mime_type: String,
    /// Side length of the encoded square in pixels.
    pub size: u32,
    /// Encoded file contents.
    pub bytes: Vec<u8>,
    /// Inline preview of the same bytes as a `data:` URL.
    pub data_url: String,
}

/// State for one interactive crop.
#[derive(Debug)]
pub struct CropSession {
    config: CropConfig,
    output: OutputSpec,
    source: Option<SourceImage>,
    viewport: Viewport,
    gestures: GestureTracker,
}

impl CropSession {
    /// Open a session. The stage starts at the preferred size from `config`.
    pub fn new(config: CropConfig) -> Result<Self, CropError> {
        let output = config.output_spec()?;
        let viewport = Viewport::empty(config.stage_size);
        let gestures = GestureTracker::new(config.wheel_sensitivity);
        debug!(
            stage = config.stage_size,
            output = output.size,
            format = %output.format,
            "crop session opened"
        );
        Ok(Self {
            config,
            output,
            source: None,
            viewport,
            gestures,
        })
    }

    pub fn config(&self) -> &CropConfig {
        &self.config
    }

    pub fn output_spec(&self) -> &OutputSpec {
        &self.output
    }

    /// Decode file bytes and make them the session's source.
    ///
    /// Any previous source is released first. On failure the session has no
    /// source: the stage stays hidden and commit is a no-op, but the session
    /// remains usable for another attempt.
    pub fn load_source(&mut self, bytes: &[u8]) -> Result<NaturalSize, CropError> {
        self.release_source();
        let source = decode_source(bytes).inspect_err(|e| {
            warn!(error = %e, "source image rejected");
        })?;
        Ok(self.set_source(source))
    }

    /// Use an already decoded image as the source, resetting zoom and pan.
    ///
    /// An empty image leaves the session without a source.
    pub fn set_source(&mut self, source: SourceImage) -> NaturalSize {
        self.release_source();
        if source.is_empty() {
            warn!(width = source.width, height = source.height, "ignoring empty source image");
            return NaturalSize::default();
        }
        let natural = source.natural_size();
        self.viewport.set_source(natural);
        self.source = Some(source);
        debug!(
            width = natural.width,
            height = natural.height,
            min_zoom = self.viewport.min_zoom(),
            "source loaded"
        );
        natural
    }

    pub fn source(&self) -> Option<&SourceImage> {
        self.source.as_ref()
    }

    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    /// Shrink the preferred stage size to the available space and apply it.
    ///
    /// Returns the stage size in use.
    pub fn fit_stage(&mut self, available: f64) -> f64 {
        let stage = effective_stage_size(self.config.stage_size, available);
        self.set_stage_size(stage);
        stage
    }

    /// Resize the stage, keeping the visible crop in place.
    pub fn set_stage_size(&mut self, stage_size: f64) {
        if stage_size == self.viewport.stage_size() {
            return;
        }
        self.viewport.set_stage_size(stage_size);
        self.gestures.reanchor();
        debug!(
            stage = self.viewport.stage_size(),
            min_zoom = self.viewport.min_zoom(),
            "stage resized"
        );
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn gesture_state(&self) -> GestureState {
        self.gestures.state()
    }

    /// Returns whether the pointer was captured.
    pub fn pointer_down(&mut self, id: PointerId, x: f64, y: f64) -> bool {
        if !self.has_source() {
            return false;
        }
        self.gestures.pointer_down(&self.viewport, id, Point::new(x, y))
    }

    /// Returns whether the viewport changed.
    pub fn pointer_move(&mut self, id: PointerId, x: f64, y: f64) -> bool {
        self.gestures
            .pointer_move(&mut self.viewport, id, Point::new(x, y))
    }

    /// Handles pointer up, cancel and leave alike.
    pub fn pointer_up(&mut self, id: PointerId) {
        self.gestures.pointer_up(id);
    }

    /// Returns whether the viewport changed.
    pub fn wheel(&mut self, delta_y: f64) -> bool {
        if !self.has_source() {
            return false;
        }
        self.gestures.wheel(&mut self.viewport, delta_y)
    }

    /// Set the zoom multiplier directly (e.g. from a slider).
    pub fn set_zoom(&mut self, zoom: f64) -> bool {
        self.viewport.set_zoom(zoom)
    }

    /// The transform the host should apply to the preview image.
    ///
    /// `None` means the image should be hidden.
    pub fn update(&self) -> Option<PreviewTransform> {
        self.source.as_ref()?;
        PreviewTransform::from_viewport(&self.viewport)
    }

    pub fn can_commit(&self) -> bool {
        self.source.is_some() && self.viewport.is_ready()
    }

    /// Compose the output raster for the current state without encoding.
    pub fn render(&self) -> Option<CropRaster> {
        let source = self.source.as_ref()?;
        compose_square(source, &self.viewport, self.output.size)
    }

    /// Produce the output file for the current state.
    ///
    /// Returns `Ok(None)` when there is nothing to commit yet (no source or
    /// no stage). The session stays open either way, so a failed commit can
    /// be retried.
    pub fn commit(&self) -> Result<Option<CropOutput>, CropError> {
        self.commit_with(&CodecEncoder, &BufferEncoder)
    }

    /// [`commit`](Self::commit) with explicit primary and fallback encoders.
    pub fn commit_with(
        &self,
        primary: &dyn RasterEncoder,
        fallback: &dyn RasterEncoder,
    ) -> Result<Option<CropOutput>, CropError> {
        let Some(raster) = self.render() else {
            debug!("commit skipped: nothing to render");
            return Ok(None);
        };

        let spec = &self.output;
        let bytes = encode_with_fallback(primary, fallback, &raster, spec.format, spec.quality)?;
        let mime_type = spec.format.mime_type();
        debug!(
            file = %spec.file_name,
            size = raster.size,
            bytes = bytes.len(),
            "crop committed"
        );

        Ok(Some(CropOutput {
            file_name: spec.file_name.clone(),
            mime_type: mime_type.to_string(),
            size: raster.size,
            data_url: to_data_url(mime_type, &bytes),
            bytes,
        }))
    }

    /// Drop the source and all interaction state. Nothing is emitted.
    pub fn cancel(&mut self) {
        self.release_source();
        debug!("crop session cancelled");
    }

    /// End the session, releasing everything it holds.
    pub fn close(mut self) {
        self.release_source();
    }

    fn release_source(&mut self) {
        self.gestures.reset();
        self.viewport.set_source(NaturalSize::default());
        if self.source.take().is_some() {
            debug!("source released");
        }
    }
}
