//! Compendium assembly: one entry per deduplication key, numbered image
//! files, tags/notes, and the final ambiguity check.
//!
//! Entries are emitted in first-seen order (ascending `first_seq`). Image
//! file paths use a single global counter over every written file —
//! entries in output order, occurrences within an entry in first-seen
//! order — so the numbering is stable whenever the input order is stable.
//!
//! The assembler is also the last line of defence against an ambiguous
//! module: two *distinct* keys that would import under the same entry name
//! in the same folder are reported as a fatal
//! [`PfpdfError::NameCollision`], never silently renamed. Records that
//! legitimately share a key have already been merged by the resolver and
//! can never trip this check.

use crate::error::PfpdfError;
use crate::pipeline::hierarchy::{FolderTree, PageHierarchy};
use crate::pipeline::resolve::{EntryKey, ResolvedEntry};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Final unit of output, one per distinct [`EntryKey`]. Immutable once
/// assembled; serialised by [`crate::output`] and discarded.
#[derive(Debug)]
pub struct CompendiumEntry {
    pub key: EntryKey,
    /// Name shown in Foundry; the key's label verbatim.
    pub display_name: String,
    /// Enclosing folder titles, root → leaf. Empty means top level.
    pub folder_path: Vec<String>,
    /// Relative paths of this entry's image files, first-seen order.
    pub image_refs: Vec<String>,
    /// Optional tags (`--tags-from-text`), order-preserving deduplicated.
    pub tags: Vec<String>,
    /// Optional note (`--note`), identical on every entry when set.
    pub note: Option<String>,
    /// Page of the first occurrence; used in collision reports.
    pub first_page: u32,
}

/// One image file to write, paired with its relative path.
#[derive(Debug)]
pub struct ImageFile {
    /// Path relative to the output directory, e.g. `list/0.png`.
    pub path: String,
    pub bytes: Vec<u8>,
}

/// Everything the writer needs: entries, the files they reference, and the
/// folder tree they nest in.
#[derive(Debug)]
pub struct AssembledPack {
    pub entries: Vec<CompendiumEntry>,
    pub images: Vec<ImageFile>,
    pub folders: FolderTree,
}

/// Per-run knobs the assembler cares about.
#[derive(Debug, Default)]
pub struct AssembleOptions {
    pub use_metadata: bool,
    pub tags_from_text: bool,
    pub note: Option<String>,
    /// Plain text per page, prefetched for first-occurrence pages only.
    /// Consulted only when `tags_from_text` is set.
    pub page_texts: BTreeMap<u32, String>,
}

/// Assemble resolved entries into the final pack.
///
/// `resolved` must be in first-seen order (the resolver's output order).
///
/// # Errors
/// [`PfpdfError::NameCollision`] when two distinct keys map to the same
/// display name and folder path.
pub fn assemble(
    resolved: Vec<ResolvedEntry>,
    hierarchy: &PageHierarchy,
    options: &AssembleOptions,
) -> Result<AssembledPack, PfpdfError> {
    let mut entries = Vec::with_capacity(resolved.len());
    let mut images = Vec::new();
    let mut folders = FolderTree::new();
    // (display_name, joined folder path) → first page, for collision reports.
    let mut import_targets: HashMap<(String, String), u32> = HashMap::new();
    let mut global_index: u64 = 0;

    for entry in resolved {
        let folder_path = if options.use_metadata {
            hierarchy.path_for(entry.first_page).to_vec()
        } else {
            Vec::new()
        };
        folders.intern(&folder_path);

        let display_name = entry.key.label.clone();
        let target = (display_name.clone(), folder_path.join("/"));
        if let Some(&first_page) = import_targets.get(&target) {
            return Err(PfpdfError::NameCollision {
                name: target.0,
                folder: target.1,
                first_page,
                second_page: entry.first_page,
            });
        }
        import_targets.insert(target, entry.first_page);

        let mut image_refs = Vec::with_capacity(entry.records.len());
        for record in entry.records {
            let path = format!("list/{global_index}.png");
            global_index += 1;
            image_refs.push(path.clone());
            images.push(ImageFile {
                path,
                bytes: record.bytes,
            });
        }

        let tags = if options.tags_from_text {
            collect_tags(&folder_path, options.page_texts.get(&entry.first_page))
        } else {
            Vec::new()
        };

        entries.push(CompendiumEntry {
            key: entry.key,
            display_name,
            folder_path,
            image_refs,
            tags,
            note: options.note.clone(),
            first_page: entry.first_page,
        });
    }

    debug!(
        "assembled {} entries, {} image files, {} folders",
        entries.len(),
        images.len(),
        folders.len()
    );

    Ok(AssembledPack {
        entries,
        images,
        folders,
    })
}

static RE_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\w+").unwrap());

/// Lowercased folder titles followed by lowercase word tokens of the page
/// text, order-preserving deduplicated.
fn collect_tags(folder_path: &[String], page_text: Option<&String>) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    let mut push = |tag: String| {
        if !tags.contains(&tag) {
            tags.push(tag);
        }
    };

    for title in folder_path {
        push(title.to_lowercase());
    }
    if let Some(text) = page_text {
        for m in RE_WORD.find_iter(text) {
            push(m.as_str().to_lowercase());
        }
    }
    tags
}
