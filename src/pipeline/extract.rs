//! Image record extraction: flatten the backend's page/image enumeration
//! into an ordered sequence of [`ImageRecord`]s.
//!
//! No deduplication happens here. The stage's one job is to turn the
//! backend's per-page view into a flat, sequence-numbered record stream in
//! page-then-discovery order, absorbing per-image faults along the way: a
//! page that reports an image with no retrievable bytes costs a warning and
//! a skip counter bump, never the run.

use crate::error::ImageError;
use crate::source::PdfSource;
use tracing::{debug, warn};

/// One raw occurrence of an embedded image.
///
/// Immutable once created; ownership of the bytes transfers into the
/// resolved entry downstream.
#[derive(Debug, Clone)]
pub struct ImageRecord {
    /// Global monotonically increasing sequence number. All "first
    /// occurrence" rules downstream are defined on `seq`, not on traversal
    /// order, so behaviour stays unambiguous if extraction is ever reordered.
    pub seq: u64,
    /// 1-based page the image occurred on.
    pub page_number: u32,
    /// Discovery order within the page, 0-based.
    pub index_on_page: u32,
    /// Attached alt text, if any.
    pub alt_text: Option<String>,
    /// Raw image payload, opaque to the pipeline.
    pub bytes: Vec<u8>,
}

/// Output of the extraction stage.
#[derive(Debug, Default)]
pub struct Extraction {
    /// Records in page-then-discovery order; `seq` is dense from 0.
    pub records: Vec<ImageRecord>,
    /// Occurrences dropped because their bytes were unretrievable.
    pub skipped: u32,
}

/// Extract one [`ImageRecord`] per readable (page, image) pair.
///
/// `pages` must already be selected and ascending (see
/// [`crate::config::PageSelection::to_pages`]).
pub fn extract_records(source: &dyn PdfSource, pages: &[u32]) -> Extraction {
    let mut out = Extraction::default();
    let mut seq: u64 = 0;

    for &page in pages {
        for (index, raw) in source.page_images(page).into_iter().enumerate() {
            let index = index as u32;
            match raw.bytes {
                Some(bytes) if !bytes.is_empty() => {
                    out.records.push(ImageRecord {
                        seq,
                        page_number: page,
                        index_on_page: index,
                        alt_text: raw.alt_text,
                        bytes,
                    });
                    seq += 1;
                }
                _ => {
                    warn!(
                        "skipping unreadable image: {}",
                        ImageError::MissingBytes { page, index }
                    );
                    out.skipped += 1;
                }
            }
        }
    }

    debug!(
        "extracted {} image records ({} skipped)",
        out.records.len(),
        out.skipped
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{OutlineItem, RawImage};

    struct TwoPages;

    impl PdfSource for TwoPages {
        fn page_count(&self) -> u32 {
            2
        }

        fn page_images(&self, page: u32) -> Vec<RawImage> {
            match page {
                1 => vec![
                    RawImage {
                        bytes: Some(b"a".to_vec()),
                        alt_text: Some("Goblin".into()),
                    },
                    RawImage {
                        bytes: None,
                        alt_text: Some("lost".into()),
                    },
                ],
                2 => vec![RawImage {
                    bytes: Some(b"b".to_vec()),
                    alt_text: None,
                }],
                _ => vec![],
            }
        }

        fn outline(&self) -> Vec<OutlineItem> {
            vec![]
        }

        fn page_text(&self, _page: u32) -> Option<String> {
            None
        }
    }

    #[test]
    fn records_are_in_page_then_discovery_order_with_dense_seq() {
        let out = extract_records(&TwoPages, &[1, 2]);
        assert_eq!(out.records.len(), 2);
        assert_eq!(out.skipped, 1);

        assert_eq!(out.records[0].seq, 0);
        assert_eq!(out.records[0].page_number, 1);
        assert_eq!(out.records[0].index_on_page, 0);
        assert_eq!(out.records[0].alt_text.as_deref(), Some("Goblin"));

        assert_eq!(out.records[1].seq, 1);
        assert_eq!(out.records[1].page_number, 2);
        // The skipped occurrence keeps its on-page index but takes no seq.
        assert_eq!(out.records[1].index_on_page, 0);
    }

    #[test]
    fn page_selection_is_respected() {
        let out = extract_records(&TwoPages, &[2]);
        assert_eq!(out.records.len(), 1);
        assert_eq!(out.records[0].page_number, 2);
        assert_eq!(out.skipped, 0);
    }
}
