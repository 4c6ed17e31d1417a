//! Serialisable output models and the output-directory writer.
//!
//! The on-disk layout, written once per run:
//!
//! ```text
//! output_dir/
//!   module.json                 — manifest
//!   packs/images.json           — compendium entries (JSON array)
//!   list/0.png, list/1.png, …   — extracted image files
//! ```
//!
//! Write order is images → `module.json` → `packs/images.json`. A fatal
//! error after the images are on disk leaves them there; they are immutable
//! once extracted and a rerun reproduces them byte-for-byte, so partial
//! output is never corrupt — just incomplete.
//!
//! `_id`s are derived from each entry's output index rather than from any
//! randomness so that reruns are byte-identical (16 alphanumeric chars, the
//! shape Foundry expects).

use crate::config::ModuleIdentity;
use crate::error::PfpdfError;
use crate::pipeline::assemble::AssembledPack;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Manifest version written into every `module.json`.
pub const MODULE_VERSION: &str = "1.0.0";
/// Foundry core version the generated module declares compatibility with.
pub const COMPATIBLE_CORE_VERSION: &str = "12";

// ── module.json ──────────────────────────────────────────────────────────

/// The `module.json` manifest.
#[derive(Debug, Serialize)]
pub struct ModuleManifest {
    pub name: String,
    pub title: String,
    pub version: String,
    #[serde(rename = "compatibleCoreVersion")]
    pub compatible_core_version: String,
    pub packs: Vec<PackDescriptor>,
}

/// One compendium pack declared by the manifest.
#[derive(Debug, Serialize)]
pub struct PackDescriptor {
    pub name: String,
    pub label: String,
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl ModuleManifest {
    /// The single-pack manifest this tool always produces.
    pub fn new(identity: &ModuleIdentity) -> Self {
        Self {
            name: identity.module_id.clone(),
            title: identity.title.clone(),
            version: MODULE_VERSION.to_string(),
            compatible_core_version: COMPATIBLE_CORE_VERSION.to_string(),
            packs: vec![PackDescriptor {
                name: "images".into(),
                label: "Images".into(),
                path: "packs/images.json".into(),
                kind: "JournalEntry".into(),
            }],
        }
    }
}

// ── packs/images.json ────────────────────────────────────────────────────

/// One JournalEntry document in `packs/images.json`.
#[derive(Debug, Serialize)]
pub struct JournalEntryDoc {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    pub pages: Vec<JournalPage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub flags: EntryFlags,
}

/// One image page inside a JournalEntry.
#[derive(Debug, Serialize)]
pub struct JournalPage {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub image: ImageSrc,
}

#[derive(Debug, Serialize)]
pub struct ImageSrc {
    pub src: String,
}

/// The `flags.pfpdf` block recording which module a pack entry belongs to.
#[derive(Debug, Serialize)]
pub struct EntryFlags {
    pub pfpdf: PfpdfFlags,
}

#[derive(Debug, Serialize)]
pub struct PfpdfFlags {
    pub module_id: String,
    pub title: String,
}

/// Deterministic 16-char alphanumeric `_id` for the entry at `index` in
/// final output order.
fn entry_id(index: usize) -> String {
    format!("pfpdfimg{index:08}")
}

/// Map an assembled pack to its serialisable JournalEntry documents.
pub fn journal_entries(pack: &AssembledPack, identity: &ModuleIdentity) -> Vec<JournalEntryDoc> {
    pack.entries
        .iter()
        .enumerate()
        .map(|(index, entry)| JournalEntryDoc {
            id: entry_id(index),
            name: entry.display_name.clone(),
            folder: if entry.folder_path.is_empty() {
                None
            } else {
                Some(entry.folder_path.join("/"))
            },
            pages: entry
                .image_refs
                .iter()
                .map(|src| JournalPage {
                    name: entry.display_name.clone(),
                    kind: "image".into(),
                    image: ImageSrc { src: src.clone() },
                })
                .collect(),
            tags: entry.tags.clone(),
            notes: entry.note.clone(),
            flags: EntryFlags {
                pfpdf: PfpdfFlags {
                    module_id: identity.module_id.clone(),
                    title: identity.title.clone(),
                },
            },
        })
        .collect()
}

// ── Writer ───────────────────────────────────────────────────────────────

/// Write the whole output directory: images, then `module.json`, then
/// `packs/images.json`.
pub fn write_outputs(
    out_dir: &Path,
    manifest: &ModuleManifest,
    entries: &[JournalEntryDoc],
    pack: &AssembledPack,
) -> Result<(), PfpdfError> {
    create_dir(&out_dir.join("list"))?;
    create_dir(&out_dir.join("packs"))?;

    for image in &pack.images {
        let path = out_dir.join(&image.path);
        fs::write(&path, &image.bytes).map_err(|source| PfpdfError::OutputWriteFailed {
            path: path.clone(),
            source,
        })?;
    }
    debug!("wrote {} image files", pack.images.len());

    write_json(&out_dir.join("module.json"), manifest)?;
    write_json(&out_dir.join("packs").join("images.json"), &entries)?;

    info!(
        "wrote {} entries to {}",
        entries.len(),
        out_dir.join("packs").join("images.json").display()
    );
    Ok(())
}

fn create_dir(path: &Path) -> Result<(), PfpdfError> {
    fs::create_dir_all(path).map_err(|source| PfpdfError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    })
}

/// Pretty-printed (2-space) JSON with a trailing newline.
fn write_json<T: Serialize>(path: &PathBuf, value: &T) -> Result<(), PfpdfError> {
    let mut json = serde_json::to_string_pretty(value).map_err(|e| {
        PfpdfError::OutputWriteFailed {
            path: path.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidData, e),
        }
    })?;
    json.push('\n');
    fs::write(path, json).map_err(|source| PfpdfError::OutputWriteFailed {
        path: path.clone(),
        source,
    })
}
