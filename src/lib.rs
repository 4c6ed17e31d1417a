//! # pfpdf
//!
//! Convert a tabletop-RPG rulebook PDF into a Foundry Virtual Tabletop
//! module: a manifest plus a `JournalEntry` compendium whose nested folders
//! mirror the PDF's bookmark outline.
//!
//! ## Why this crate?
//!
//! Rulebook PDFs are full of maps, tokens, and handouts that GMs re-crop by
//! hand. This crate pulls every embedded image out once, gives each a
//! stable human-readable name — alt text when the PDF has it, the nearest
//! bookmark title when it doesn't, a positional fallback otherwise — and
//! deduplicates repeats, so the same stat-block art printed on five pages
//! imports as one journal entry, not five.
//!
//! Output is deterministic: the same PDF and flags produce byte-identical
//! `module.json` and `packs/images.json` on every run.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Extract    embedded image streams per page (lopdf)
//!  ├─ 2. Hierarchy  bookmark outline → per-page folder paths
//!  ├─ 3. Resolve    stable labels + deduplication keys
//!  ├─ 4. Assemble   JournalEntry records, collision check
//!  └─ 5. Write      module.json + packs/images.json + list/*.png
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pfpdf::{convert, ConvertConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConvertConfig::default();
//!     let summary = convert("rulebook.pdf", "out/", &config)?;
//!     println!("{} entries from {} images", summary.entries, summary.images_found);
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pfpdf` binary (clap + anyhow + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! pfpdf = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod lopdf_source;
pub mod output;
pub mod pipeline;
pub mod source;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConvertConfig, ConvertConfigBuilder, ModuleIdentity, PageSelection};
pub use convert::{convert, convert_source, ConversionSummary};
pub use error::{ImageError, PfpdfError};
pub use lopdf_source::LopdfSource;
pub use source::{OutlineItem, PdfSource, RawImage};
