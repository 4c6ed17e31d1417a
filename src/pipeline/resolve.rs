//! Identity resolution: map raw image records to stable deduplication keys.
//!
//! This is the heart of the pipeline. Every [`ImageRecord`] is assigned an
//! [`EntryKey`] by a fixed label priority, and records sharing a key merge
//! into one [`ResolvedEntry`] — a wrong decision here silently drops or
//! duplicates game content, so the rules are deliberately narrow:
//!
//! 1. Non-empty alt text (whitespace-normalised, case preserved).
//! 2. The nearest enclosing bookmark title, but only for the first
//!    otherwise-unlabelled image on that page — one bookmark names at most
//!    one image per page.
//! 3. Positional fallback `page_{page}_{index}`.
//!
//! Two records merge iff their normalised labels *and* label sources match.
//! Positional keys never merge, even if labels were somehow to coincide:
//! each embeds its own page and index, and the resolver enforces uniqueness
//! structurally rather than trusting page numbering to be well-formed.

use crate::pipeline::extract::ImageRecord;
use crate::pipeline::hierarchy::PageHierarchy;
use std::collections::{HashMap, HashSet};

/// Where an entry's label came from. Part of the deduplication key:
/// identical labels from different sources are different entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LabelSource {
    /// Alt text attached to the image itself.
    AltText,
    /// Title of the nearest enclosing bookmark.
    Bookmark,
    /// Synthetic `page_{page}_{index}` fallback.
    Positional,
}

/// The stable identity under which image occurrences deduplicate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EntryKey {
    pub label: String,
    pub source: LabelSource,
}

/// One deduplicated entry: a key plus every record that resolved to it,
/// in first-seen order.
#[derive(Debug)]
pub struct ResolvedEntry {
    pub key: EntryKey,
    /// Sequence number of the first contributing record. Output order and
    /// folder assignment are defined on this, never on map iteration order.
    pub first_seq: u64,
    /// Page of the first contributing record; fixes the folder path
    /// permanently even when later occurrences sit on other pages.
    pub first_page: u32,
    /// Contributing records, ascending by `seq`.
    pub records: Vec<ImageRecord>,
}

/// Normalise a label: trim, collapse internal whitespace, preserve case.
///
/// Returns `None` when nothing remains — whitespace-only alt text must fall
/// through to the next label tier, not become an empty-labelled entry.
pub fn normalize_label(raw: &str) -> Option<String> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

/// Resolve `records` into deduplicated entries, in first-seen order.
///
/// With `use_metadata` false the alt-text and bookmark tiers are disabled
/// and every record gets its own positional entry.
pub fn resolve(
    records: Vec<ImageRecord>,
    hierarchy: &PageHierarchy,
    use_metadata: bool,
) -> Vec<ResolvedEntry> {
    let mut entries: Vec<ResolvedEntry> = Vec::new();
    let mut by_key: HashMap<EntryKey, usize> = HashMap::new();
    // (page, title) pairs already used by the bookmark tier; a bookmark
    // names at most one image per page.
    let mut claimed: HashSet<(u32, String)> = HashSet::new();

    for record in records {
        let key = label_for(&record, hierarchy, use_metadata, &mut claimed);

        if key.source == LabelSource::Positional {
            // Positional keys are unique by construction; never merged.
            entries.push(ResolvedEntry {
                key,
                first_seq: record.seq,
                first_page: record.page_number,
                records: vec![record],
            });
            continue;
        }

        match by_key.get(&key) {
            Some(&idx) => entries[idx].records.push(record),
            None => {
                by_key.insert(key.clone(), entries.len());
                entries.push(ResolvedEntry {
                    key,
                    first_seq: record.seq,
                    first_page: record.page_number,
                    records: vec![record],
                });
            }
        }
    }

    entries
}

/// Apply the label priority to one record.
fn label_for(
    record: &ImageRecord,
    hierarchy: &PageHierarchy,
    use_metadata: bool,
    claimed: &mut HashSet<(u32, String)>,
) -> EntryKey {
    if use_metadata {
        if let Some(label) = record.alt_text.as_deref().and_then(normalize_label) {
            return EntryKey {
                label,
                source: LabelSource::AltText,
            };
        }

        if let Some(title) = hierarchy
            .nearest_title(record.page_number)
            .and_then(normalize_label)
        {
            if claimed.insert((record.page_number, title.clone())) {
                return EntryKey {
                    label: title,
                    source: LabelSource::Bookmark,
                };
            }
        }
    }

    EntryKey {
        label: format!("page_{}_{}", record.page_number, record.index_on_page),
        source: LabelSource::Positional,
    }
}
