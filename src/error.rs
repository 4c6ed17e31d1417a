//! Error types for the pfpdf library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`PfpdfError`] — **Fatal**: the run cannot produce a valid module at all
//!   (bad input file, corrupt PDF, ambiguous compendium, unwritable output).
//!   Returned as `Err(PfpdfError)` from the top-level `convert*` functions.
//!
//! * [`ImageError`] — **Non-fatal**: a single embedded image occurrence could
//!   not be read. The occurrence is skipped with a warning and the run
//!   continues; one corrupt image must not abort the rest of the document.
//!   Skips are counted in [`crate::convert::ConversionSummary`].
//!
//! Structural faults that would make the compendium ambiguous (two entries
//! importing under the same name and folder) are always fatal and carry
//! enough context — the offending label and the conflicting pages — for the
//! user to fix the PDF metadata and rerun. There is no retry machinery;
//! output is deterministic, so rerunning *is* the retry mechanism.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the pfpdf library.
///
/// Per-image failures use [`ImageError`] and are absorbed during extraction
/// rather than propagated here.
#[derive(Debug, Error)]
pub enum PfpdfError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf --decrypt input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    /// Selected page numbers exceed the actual page count.
    #[error("Page {page} is out of range (document has {total} pages)")]
    PageOutOfRange { page: u32, total: u32 },

    // ── Assembly errors ───────────────────────────────────────────────────
    /// Two *different* deduplication keys would import under the same entry
    /// name inside the same folder — an ambiguous Foundry import target.
    ///
    /// Raised before `packs/images.json` is written. Any image files already
    /// on disk are immutable and safe to leave; a rerun after fixing the
    /// metadata reproduces them byte-for-byte.
    #[error(
        "Two different entries would both import as '{name}' in folder '{folder}'\n\
         (first seen on page {first_page}, again on page {second_page})\n\
         Fix the PDF's alt text or bookmark titles and rerun."
    )]
    NameCollision {
        name: String,
        folder: String,
        first_page: u32,
        second_page: u32,
    },

    // ── Manifest errors ───────────────────────────────────────────────────
    /// Module identity for `module.json` could not be derived — e.g. the PDF
    /// filename is unreadable and no override was supplied.
    #[error(
        "Cannot derive a module identity: {detail}\n\
         Pass --module-id / --title or set PFPDF_MODULE_ID / PFPDF_TITLE."
    )]
    MissingMetadata { detail: String },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create or write a file in the output directory.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// A non-fatal error for a single embedded image occurrence.
///
/// Logged via `tracing::warn!` at the point of failure; the occurrence is
/// dropped and every other image in the document is still processed.
#[derive(Debug, Clone, Error)]
pub enum ImageError {
    /// The page reported an image but its bytes could not be retrieved.
    #[error("page {page}, image {index}: no retrievable bytes")]
    MissingBytes { page: u32, index: u32 },

    /// The image stream exists but could not be decoded.
    #[error("page {page}, image {index}: stream decode failed: {detail}")]
    DecodeFailed {
        page: u32,
        index: u32,
        detail: String,
    },
}
