//! Conversion entry points.
//!
//! [`convert`] is the primary API: open a PDF, run the pipeline, write the
//! module directory. [`convert_source`] is the same run driven by any
//! [`PdfSource`] — the seam the test suite uses to exercise the whole
//! pipeline with in-memory documents.
//!
//! The run is a single-threaded, synchronous batch: the document is
//! processed to completion in one pass and either succeeds or fails
//! outright. The only shared resource is the output directory; concurrent
//! runs must each use their own.

use crate::config::{ConvertConfig, ModuleIdentity};
use crate::error::PfpdfError;
use crate::lopdf_source::LopdfSource;
use crate::output::{self, ModuleManifest};
use crate::pipeline::assemble::{self, AssembleOptions};
use crate::pipeline::hierarchy::PageHierarchy;
use crate::pipeline::{extract, resolve};
use crate::source::PdfSource;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// What a completed run produced. Serialisable for `--json` output.
#[derive(Debug, Clone, Serialize)]
pub struct ConversionSummary {
    pub module_id: String,
    pub title: String,
    /// Pages actually scanned after `--pages` selection.
    pub pages_scanned: u32,
    /// Image occurrences found (before deduplication).
    pub images_found: u32,
    /// Occurrences skipped because their bytes were unreadable.
    pub images_skipped: u32,
    /// Deduplicated compendium entries written.
    pub entries: u32,
    /// Distinct folders in the compendium.
    pub folders: u32,
    pub duration_ms: u64,
}

/// Convert a PDF file into a Foundry module directory.
///
/// # Errors
/// Fatal [`PfpdfError`]s only: unreadable/corrupt input, unresolvable
/// module identity, name collisions, write failures. Per-image faults are
/// skipped with a warning and counted in the summary.
pub fn convert(
    pdf_path: impl AsRef<Path>,
    out_dir: impl AsRef<Path>,
    config: &ConvertConfig,
) -> Result<ConversionSummary, PfpdfError> {
    let pdf_path = pdf_path.as_ref();
    info!("converting '{}'", pdf_path.display());

    // Identity resolution fails before anything is opened or written.
    let identity = ModuleIdentity::resolve(config, pdf_path)?;
    let source = LopdfSource::open(pdf_path)?;
    convert_source(&source, out_dir.as_ref(), &identity, config)
}

/// Run the full pipeline against any [`PdfSource`].
pub fn convert_source(
    source: &dyn PdfSource,
    out_dir: &Path,
    identity: &ModuleIdentity,
    config: &ConvertConfig,
) -> Result<ConversionSummary, PfpdfError> {
    let start = Instant::now();

    // ── Step 1: Select pages ─────────────────────────────────────────────
    let total_pages = source.page_count();
    let pages = config.pages.to_pages(total_pages);
    if pages.is_empty() {
        return Err(PfpdfError::PageOutOfRange {
            page: 0,
            total: total_pages,
        });
    }
    debug!("selected {} of {} pages", pages.len(), total_pages);

    // ── Step 2: Extract image records ────────────────────────────────────
    let extraction = extract::extract_records(source, &pages);
    let images_found = extraction.records.len() as u32;

    // ── Step 3: Build the bookmark hierarchy ─────────────────────────────
    let hierarchy = if config.use_metadata {
        PageHierarchy::from_outline(&source.outline(), total_pages)
    } else {
        PageHierarchy::empty()
    };

    // ── Step 4: Resolve identities ───────────────────────────────────────
    let resolved = resolve::resolve(extraction.records, &hierarchy, config.use_metadata);
    debug!(
        "resolved {} records into {} entries",
        images_found,
        resolved.len()
    );

    // ── Step 5: Prefetch page text for tags ──────────────────────────────
    let page_texts: BTreeMap<u32, String> = if config.tags_from_text {
        resolved
            .iter()
            .filter_map(|e| Some((e.first_page, source.page_text(e.first_page)?)))
            .collect()
    } else {
        BTreeMap::new()
    };

    // ── Step 6: Assemble the compendium ──────────────────────────────────
    let options = AssembleOptions {
        use_metadata: config.use_metadata,
        tags_from_text: config.tags_from_text,
        note: config.note.clone(),
        page_texts,
    };
    let pack = assemble::assemble(resolved, &hierarchy, &options)?;

    // ── Step 7: Serialise and write ──────────────────────────────────────
    let manifest = ModuleManifest::new(identity);
    let entries = output::journal_entries(&pack, identity);
    output::write_outputs(out_dir, &manifest, &entries, &pack)?;

    let summary = ConversionSummary {
        module_id: identity.module_id.clone(),
        title: identity.title.clone(),
        pages_scanned: pages.len() as u32,
        images_found,
        images_skipped: extraction.skipped,
        entries: entries.len() as u32,
        folders: pack.folders.len() as u32,
        duration_ms: start.elapsed().as_millis() as u64,
    };
    info!(
        "done: {} entries from {} images in {}ms",
        summary.entries, summary.images_found, summary.duration_ms
    );
    Ok(summary)
}
