//! lopdf-backed implementation of [`PdfSource`].
//!
//! This is the only module that touches `lopdf` types. It reads three
//! things from a document: embedded image XObjects per page (raw stream
//! bytes plus any `/Alt` text), the `/Outlines` bookmark tree flattened to
//! document order, and plain page text.
//!
//! The outline walk follows `/First` child and `/Next` sibling links with a
//! visited set, a depth cap, and a sibling cap — real-world PDFs contain
//! circular outline references, and an outline must never be able to hang
//! the run. Bookmarks whose destination cannot be resolved to a page are
//! dropped with a debug log; they cannot own a page range.

use crate::error::PfpdfError;
use crate::source::{OutlineItem, PdfSource, RawImage};
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const MAX_OUTLINE_DEPTH: u32 = 64;
const MAX_OUTLINE_SIBLINGS: usize = 10_000;

/// A PDF document opened for extraction.
pub struct LopdfSource {
    doc: Document,
    /// Page number (1-based) → page object id, ascending.
    pages: BTreeMap<u32, ObjectId>,
    /// Reverse of `pages`, for resolving bookmark destinations.
    page_numbers: HashMap<ObjectId, u32>,
    path: PathBuf,
}

impl std::fmt::Debug for LopdfSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LopdfSource")
            .field("path", &self.path)
            .field("page_count", &self.pages.len())
            .finish_non_exhaustive()
    }
}

impl LopdfSource {
    /// Open and validate a PDF file.
    ///
    /// Validates existence, readability, and the `%PDF` magic bytes before
    /// handing the file to the parser, so callers get a meaningful error
    /// rather than a parser panic deep inside lopdf.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, PfpdfError> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            return Err(PfpdfError::FileNotFound { path });
        }
        match std::fs::File::open(&path) {
            Ok(mut f) => {
                let mut magic = [0u8; 4];
                if f.read_exact(&mut magic).is_ok() && &magic != b"%PDF" {
                    return Err(PfpdfError::NotAPdf { path, magic });
                }
            }
            Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
                return Err(PfpdfError::PermissionDenied { path });
            }
            Err(_) => {
                return Err(PfpdfError::FileNotFound { path });
            }
        }

        let doc = Document::load(&path).map_err(|e| PfpdfError::CorruptPdf {
            path: path.clone(),
            detail: e.to_string(),
        })?;
        Ok(Self::from_document(doc, path))
    }

    /// Build a source from an already-loaded document (used by tests).
    pub fn from_bytes(data: &[u8]) -> Result<Self, PfpdfError> {
        let path = PathBuf::from("<memory>");
        if data.len() >= 4 && &data[..4] != b"%PDF" {
            let mut magic = [0u8; 4];
            magic.copy_from_slice(&data[..4]);
            return Err(PfpdfError::NotAPdf { path, magic });
        }
        let doc = Document::load_mem(data).map_err(|e| PfpdfError::CorruptPdf {
            path: path.clone(),
            detail: e.to_string(),
        })?;
        Ok(Self::from_document(doc, path))
    }

    fn from_document(doc: Document, path: PathBuf) -> Self {
        let pages = doc.get_pages();
        let page_numbers = pages.iter().map(|(&num, &id)| (id, num)).collect();
        debug!("opened '{}': {} pages", path.display(), pages.len());
        Self {
            doc,
            pages,
            page_numbers,
            path,
        }
    }

    /// Resolve indirect references down to a direct object.
    fn resolve<'a>(&'a self, mut obj: &'a Object) -> &'a Object {
        let mut hops = 0;
        while let Object::Reference(id) = obj {
            match self.doc.get_object(*id) {
                Ok(next) if hops < 16 => {
                    obj = next;
                    hops += 1;
                }
                _ => break,
            }
        }
        obj
    }

    /// Look up `key` in the page dictionary, walking up the page tree via
    /// `/Parent` for inheritable attributes such as `/Resources`.
    fn inherited<'a>(&'a self, page_id: ObjectId, key: &[u8]) -> Option<&'a Object> {
        let mut current = page_id;
        for _ in 0..64 {
            let dict = self.doc.get_object(current).ok()?.as_dict().ok()?;
            if let Ok(value) = dict.get(key) {
                return Some(value);
            }
            current = dict.get(b"Parent").ok()?.as_reference().ok()?;
        }
        None
    }

    fn walk_outline(
        &self,
        first_id: ObjectId,
        depth: u32,
        visited: &mut HashSet<ObjectId>,
        out: &mut Vec<OutlineItem>,
    ) {
        if depth >= MAX_OUTLINE_DEPTH {
            return;
        }

        let mut current = Some(first_id);
        let mut siblings = 0;
        while let Some(node_id) = current {
            if !visited.insert(node_id) || siblings >= MAX_OUTLINE_SIBLINGS {
                warn!("outline contains a cycle or runaway sibling chain; truncating");
                break;
            }
            siblings += 1;

            let node = match self.doc.get_object(node_id).and_then(Object::as_dict) {
                Ok(dict) => dict,
                Err(_) => break,
            };

            let title = node
                .get(b"Title")
                .ok()
                .map(|o| self.resolve(o))
                .and_then(decode_text_string)
                .unwrap_or_default();

            match self.bookmark_page(node) {
                Some(page) => out.push(OutlineItem { title, depth, page }),
                None => debug!("dropping bookmark '{title}': unresolvable destination"),
            }

            if let Ok(Object::Reference(child)) = node.get(b"First") {
                self.walk_outline(*child, depth + 1, visited, out);
            }

            current = match node.get(b"Next") {
                Ok(Object::Reference(next)) => Some(*next),
                _ => None,
            };
        }
    }

    /// Resolve a bookmark's target page via `/Dest` or a `/A` GoTo action.
    fn bookmark_page(&self, node: &Dictionary) -> Option<u32> {
        if let Ok(dest) = node.get(b"Dest") {
            if let Some(page) = self.dest_page(dest) {
                return Some(page);
            }
        }
        let action = node.get(b"A").ok().map(|o| self.resolve(o))?.as_dict().ok()?;
        match action.get(b"S").ok()? {
            Object::Name(kind) if kind == b"GoTo" => self.dest_page(action.get(b"D").ok()?),
            _ => None,
        }
    }

    /// Resolve an explicit destination array `[page_ref, /XYZ, …]` to a
    /// page number. Named destinations are not resolved.
    fn dest_page(&self, dest: &Object) -> Option<u32> {
        let dest = self.resolve(dest);
        let array = dest.as_array().ok()?;
        let page_id = array.first()?.as_reference().ok()?;
        self.page_numbers.get(&page_id).copied()
    }
}

impl PdfSource for LopdfSource {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_images(&self, page: u32) -> Vec<RawImage> {
        let Some(&page_id) = self.pages.get(&page) else {
            return Vec::new();
        };
        let Some(xobjects) = self
            .inherited(page_id, b"Resources")
            .map(|o| self.resolve(o))
            .and_then(|o| o.as_dict().ok())
            .and_then(|resources| resources.get(b"XObject").ok())
            .map(|o| self.resolve(o))
            .and_then(|o| o.as_dict().ok())
        else {
            return Vec::new();
        };

        let mut images = Vec::new();
        for (_name, value) in xobjects.iter() {
            let Object::Stream(stream) = self.resolve(value) else {
                continue;
            };
            let is_image = matches!(
                stream.dict.get(b"Subtype"),
                Ok(Object::Name(subtype)) if subtype == b"Image"
            );
            if !is_image {
                continue;
            }

            // DCTDecode (JPEG) and friends are already final payloads;
            // fall back to the raw stream when decompression is a no-op
            // or unsupported.
            let bytes = stream
                .decompressed_content()
                .unwrap_or_else(|_| stream.content.clone());
            let alt_text = stream
                .dict
                .get(b"Alt")
                .ok()
                .map(|o| self.resolve(o))
                .and_then(decode_text_string);

            images.push(RawImage {
                bytes: if bytes.is_empty() { None } else { Some(bytes) },
                alt_text,
            });
        }
        images
    }

    fn outline(&self) -> Vec<OutlineItem> {
        let mut items = Vec::new();
        let first = self
            .doc
            .trailer
            .get(b"Root")
            .ok()
            .map(|o| self.resolve(o))
            .and_then(|o| o.as_dict().ok())
            .and_then(|catalog| catalog.get(b"Outlines").ok())
            .map(|o| self.resolve(o))
            .and_then(|o| o.as_dict().ok())
            .and_then(|outlines| match outlines.get(b"First") {
                Ok(Object::Reference(id)) => Some(*id),
                _ => None,
            });

        if let Some(first_id) = first {
            let mut visited = HashSet::new();
            self.walk_outline(first_id, 0, &mut visited, &mut items);
        }
        debug!("outline: {} bookmarks", items.len());
        items
    }

    fn page_text(&self, page: u32) -> Option<String> {
        self.doc.extract_text(&[page]).ok()
    }
}

/// Decode a PDF text string: UTF-16 BE when BOM-prefixed, UTF-8/Latin-1
/// lossy otherwise. Name objects are accepted too.
fn decode_text_string(obj: &Object) -> Option<String> {
    let bytes = match obj {
        Object::String(bytes, _) => bytes,
        Object::Name(bytes) => bytes,
        _ => return None,
    };
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        String::from_utf16(&units).ok()
    } else {
        Some(String::from_utf8_lossy(bytes).into_owned())
    }
}
