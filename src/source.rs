//! The PDF-reading collaborator interface.
//!
//! Low-level PDF parsing is deliberately *not* part of the core pipeline.
//! Everything the pipeline needs from a document is expressed by the
//! [`PdfSource`] trait: page count, per-page embedded images with any
//! attached alt text, the bookmark outline, and (for `--tags-from-text`)
//! plain page text. The shipped backend is [`crate::lopdf_source::LopdfSource`];
//! tests drive the pipeline through small in-memory implementations instead
//! of fixture files.
//!
//! Page numbers are 1-based everywhere in this crate, matching how PDF
//! viewers, bookmarks, and users count pages.

/// One embedded image occurrence as reported by the backend, before any
/// labeling or deduplication.
///
/// `bytes` is `None` when the page declares an image whose payload cannot be
/// retrieved — the extractor skips such occurrences with a warning rather
/// than aborting the run.
#[derive(Debug, Clone)]
pub struct RawImage {
    /// Raw image payload, opaque to the pipeline. Written to disk verbatim.
    pub bytes: Option<Vec<u8>>,
    /// Accessibility alt text attached to the image, if any.
    pub alt_text: Option<String>,
}

/// One node of the document's bookmark outline, flattened to document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineItem {
    /// Bookmark title as it appears in the outline.
    pub title: String,
    /// Nesting depth, 0 for top-level bookmarks.
    pub depth: u32,
    /// Target page number (1-based).
    pub page: u32,
}

/// Read-only view of a PDF document.
///
/// Implementations must report images in discovery order within each page;
/// the pipeline's "first occurrence" rules are defined on that order.
pub trait PdfSource {
    /// Total number of pages in the document.
    fn page_count(&self) -> u32;

    /// Embedded images on `page` (1-based), in discovery order.
    fn page_images(&self, page: u32) -> Vec<RawImage>;

    /// The bookmark outline flattened to document order, or an empty vec
    /// when the document has no outline.
    fn outline(&self) -> Vec<OutlineItem>;

    /// Plain text of `page` (1-based), if the backend can extract it.
    /// Only consulted when tag generation from page text is enabled.
    fn page_text(&self, page: u32) -> Option<String>;
}
