//! Configuration types for PDF-to-module conversion.
//!
//! All run behaviour is controlled through [`ConvertConfig`], built via its
//! [`ConvertConfigBuilder`]. Keeping every knob in one struct makes it
//! trivial to share configs, serialise them for logging, and diff two runs
//! to understand why their outputs differ.
//!
//! Module identity (the `name` and `title` fields of `module.json`) is
//! resolved separately by [`ModuleIdentity::resolve`], because it depends on
//! the environment and the PDF filename, not only on the config.

use crate::error::PfpdfError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Configuration for one conversion run.
///
/// Built via [`ConvertConfig::builder()`] or [`ConvertConfig::default()`].
///
/// # Example
/// ```rust
/// use pfpdf::ConvertConfig;
///
/// let config = ConvertConfig::builder()
///     .tags_from_text(true)
///     .note("Imported from the GM screen PDF")
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct ConvertConfig {
    /// Use PDF metadata (alt text and bookmarks) for labels, folders, and
    /// tags. Default: true.
    ///
    /// When false (`--no-metadata`), every image gets a positional
    /// `page_{p}_{i}` label, folder paths are empty, and no folder-derived
    /// tags are produced. Page-text tags (below) are unaffected.
    pub use_metadata: bool,

    /// Derive entry tags from folder titles and page text. Default: false.
    pub tags_from_text: bool,

    /// Attach this note to every compendium entry.
    pub note: Option<String>,

    /// Explicit module id override (still subject to `PFPDF_MODULE_ID`).
    pub module_id: Option<String>,

    /// Explicit module title override (still subject to `PFPDF_TITLE`).
    pub title: Option<String>,

    /// Page selection. Default: all pages.
    pub pages: PageSelection,
}

impl Default for ConvertConfig {
    fn default() -> Self {
        Self {
            use_metadata: true,
            tags_from_text: false,
            note: None,
            module_id: None,
            title: None,
            pages: PageSelection::default(),
        }
    }
}

impl ConvertConfig {
    /// Create a new builder for `ConvertConfig`.
    pub fn builder() -> ConvertConfigBuilder {
        ConvertConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`ConvertConfig`].
#[derive(Debug)]
pub struct ConvertConfigBuilder {
    config: ConvertConfig,
}

impl ConvertConfigBuilder {
    pub fn use_metadata(mut self, v: bool) -> Self {
        self.config.use_metadata = v;
        self
    }

    pub fn tags_from_text(mut self, v: bool) -> Self {
        self.config.tags_from_text = v;
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.config.note = Some(note.into());
        self
    }

    pub fn module_id(mut self, id: impl Into<String>) -> Self {
        self.config.module_id = Some(id.into());
        self
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.config.title = Some(title.into());
        self
    }

    pub fn pages(mut self, selection: PageSelection) -> Self {
        self.config.pages = selection;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConvertConfig, PfpdfError> {
        if let Some(ref id) = self.config.module_id {
            if id.trim().is_empty() {
                return Err(PfpdfError::InvalidConfig(
                    "module id must not be blank".into(),
                ));
            }
        }
        if let PageSelection::Range(start, end) = self.config.pages {
            if start == 0 || start > end {
                return Err(PfpdfError::InvalidConfig(format!(
                    "page range {start}-{end} is not a valid 1-based range"
                )));
            }
        }
        Ok(self.config)
    }
}

// ── Page selection ───────────────────────────────────────────────────────

/// Specifies which pages of the PDF to process.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub enum PageSelection {
    /// Process all pages (default).
    #[default]
    All,
    /// Process a single page (1-indexed).
    Single(u32),
    /// Process a contiguous range of pages (1-indexed, inclusive).
    Range(u32, u32),
    /// Process specific pages (1-indexed, deduplicated).
    Set(Vec<u32>),
}

impl PageSelection {
    /// Expand the selection into a sorted, deduplicated list of 1-based page
    /// numbers clipped to `total_pages`.
    pub fn to_pages(&self, total_pages: u32) -> Vec<u32> {
        let mut pages: Vec<u32> = match self {
            PageSelection::All => (1..=total_pages).collect(),
            PageSelection::Single(p) => {
                if *p >= 1 && *p <= total_pages {
                    vec![*p]
                } else {
                    vec![]
                }
            }
            PageSelection::Range(start, end) => {
                let s = (*start).max(1);
                let e = (*end).min(total_pages);
                (s..=e).collect()
            }
            PageSelection::Set(pages) => pages
                .iter()
                .copied()
                .filter(|&p| p >= 1 && p <= total_pages)
                .collect(),
        };
        pages.sort_unstable();
        pages.dedup();
        pages
    }
}

// ── Module identity ──────────────────────────────────────────────────────

/// The `name` and `title` written into `module.json` and into each entry's
/// `flags.pfpdf` block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleIdentity {
    /// Module id — lowercase slug, safe as a Foundry module directory name.
    pub module_id: String,
    /// Human-readable module title.
    pub title: String,
}

impl ModuleIdentity {
    /// Resolve the module identity for a run.
    ///
    /// Precedence per field: environment variable (`PFPDF_MODULE_ID` /
    /// `PFPDF_TITLE`) over config override over the PDF filename. The
    /// filename fallback is the slugified stem for the id and the raw stem
    /// for the title.
    pub fn resolve(config: &ConvertConfig, pdf_path: &Path) -> Result<Self, PfpdfError> {
        Self::resolve_from(
            std::env::var("PFPDF_MODULE_ID").ok(),
            std::env::var("PFPDF_TITLE").ok(),
            config,
            pdf_path,
        )
    }

    /// [`ModuleIdentity::resolve`] with the environment passed explicitly.
    pub(crate) fn resolve_from(
        env_module_id: Option<String>,
        env_title: Option<String>,
        config: &ConvertConfig,
        pdf_path: &Path,
    ) -> Result<Self, PfpdfError> {
        let stem = pdf_path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_owned);

        let module_id = env_module_id
            .filter(|s| !s.trim().is_empty())
            .or_else(|| config.module_id.clone())
            .or_else(|| stem.as_deref().map(slugify).filter(|s| !s.is_empty()))
            .ok_or_else(|| PfpdfError::MissingMetadata {
                detail: format!(
                    "PDF filename '{}' yields no usable module id",
                    pdf_path.display()
                ),
            })?;

        let title = env_title
            .filter(|s| !s.trim().is_empty())
            .or_else(|| config.title.clone())
            .or_else(|| stem.clone())
            .ok_or_else(|| PfpdfError::MissingMetadata {
                detail: format!(
                    "PDF filename '{}' yields no usable module title",
                    pdf_path.display()
                ),
            })?;

        Ok(Self { module_id, title })
    }
}

static RE_NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9A-Za-z]+").unwrap());

/// Lowercase `text` into a filename-safe slug (`Dark Tower.pdf` → `dark_tower`).
///
/// Returns an empty string when nothing alphanumeric survives; callers
/// decide the fallback.
pub fn slugify(text: &str) -> String {
    RE_NON_ALNUM
        .replace_all(text, "_")
        .trim_matches('_')
        .to_lowercase()
}
