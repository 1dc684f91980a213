//! Signature and rubric rectangles anchored to a document page.
//!
//! A [`SignaturePosition`] is a plain record. Page-bound clamping is done by
//! the helpers here and enforced by the editor on every mutation, never by
//! deserialization.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{DocKey, PositionId, TempId};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Default X of a freshly added rectangle, in page units.
pub const DEFAULT_X: f64 = 50.0;

/// Default Y of a freshly added rectangle, in page units.
pub const DEFAULT_Y: f64 = 100.0;

/// Default rectangle width.
pub const DEFAULT_WIDTH: f64 = 200.0;

/// Default rectangle height.
pub const DEFAULT_HEIGHT: f64 = 70.0;

/// Pages are numbered from 1.
pub const FIRST_PAGE: u32 = 1;

// ---------------------------------------------------------------------------
// Kind
// ---------------------------------------------------------------------------

/// Which of the two independent position sets a rectangle belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionKind {
    Signature,
    Rubric,
}

impl PositionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Signature => "signature",
            Self::Rubric => "rubric",
        }
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

fn new_position_id() -> PositionId {
    uuid::Uuid::new_v4()
}

/// A rectangle on one page of one document, owned by one participant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignaturePosition {
    /// Client-only identity; regenerated when the backend omits it.
    #[serde(default = "new_position_id")]
    pub id: PositionId,
    pub doc_key: DocKey,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub doc_width: f64,
    pub doc_height: f64,
    pub doc_page: u32,
    pub position_confirmed: bool,
    pub participant_id: TempId,
}

impl SignaturePosition {
    /// Build the default rectangle for a page, clamped to the page bounds.
    ///
    /// The rectangle shrinks to the page when the page is smaller than
    /// [`DEFAULT_WIDTH`] x [`DEFAULT_HEIGHT`].
    pub fn new_default(
        doc_key: impl Into<DocKey>,
        doc_page: u32,
        doc_width: f64,
        doc_height: f64,
        participant_id: impl Into<TempId>,
    ) -> Result<Self, CoreError> {
        validate_page_geometry(doc_width, doc_height)?;
        validate_page_number(doc_page)?;

        let mut position = Self {
            id: new_position_id(),
            doc_key: doc_key.into(),
            x: DEFAULT_X,
            y: DEFAULT_Y,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            doc_width,
            doc_height,
            doc_page,
            position_confirmed: false,
            participant_id: participant_id.into(),
        };
        position.clamp_to_page();
        Ok(position)
    }

    /// Whether this rectangle sits on the given document page.
    pub fn is_on(&self, doc_key: &str, page: u32) -> bool {
        self.doc_page == page && self.doc_key == doc_key
    }

    /// Whether the rectangle lies entirely inside `[0, docWidth] x [0, docHeight]`.
    pub fn fits_page(&self) -> bool {
        self.x >= 0.0
            && self.y >= 0.0
            && self.x + self.width <= self.doc_width
            && self.y + self.height <= self.doc_height
    }

    /// Translate by a delta, clamping so the rectangle never leaves the page.
    ///
    /// Non-finite deltas are ignored. Does not allocate.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        if dx.is_finite() {
            self.x = clamp_axis(self.x + dx, self.width, self.doc_width);
        }
        if dy.is_finite() {
            self.y = clamp_axis(self.y + dy, self.height, self.doc_height);
        }
    }

    /// Shrink oversize dimensions to the page and pull the origin inside it.
    pub fn clamp_to_page(&mut self) {
        self.width = self.width.clamp(0.0, self.doc_width.max(0.0));
        self.height = self.height.clamp(0.0, self.doc_height.max(0.0));
        self.x = clamp_axis(self.x, self.width, self.doc_width);
        self.y = clamp_axis(self.y, self.height, self.doc_height);
    }
}

fn clamp_axis(origin: f64, extent: f64, bound: f64) -> f64 {
    let max = (bound - extent).max(0.0);
    if origin.is_nan() {
        return 0.0;
    }
    origin.clamp(0.0, max)
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Validate rendered page dimensions: both must be finite and positive.
pub fn validate_page_geometry(width: f64, height: f64) -> Result<(), CoreError> {
    if !width.is_finite() || !height.is_finite() || width <= 0.0 || height <= 0.0 {
        return Err(CoreError::Validation(format!(
            "page dimensions must be positive, got {width}x{height}"
        )));
    }
    Ok(())
}

/// Validate a 1-based page number.
pub fn validate_page_number(page: u32) -> Result<(), CoreError> {
    if page < FIRST_PAGE {
        return Err(CoreError::Validation(format!(
            "page numbers start at {FIRST_PAGE}, got {page}"
        )));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
