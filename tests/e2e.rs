//! End-to-end integration tests for pfpdf.
//!
//! The PDF-reading collaborator is specified by the `PdfSource` trait, so
//! the whole pipeline — labeling, deduplication, hierarchy, assembly, and
//! the on-disk writer — is exercised here with small in-memory documents
//! instead of fixture PDFs. Every scenario writes into its own
//! `tempfile::TempDir`.

use pfpdf::{
    convert_source, ConvertConfig, ModuleIdentity, OutlineItem, PageSelection, PdfSource,
    PfpdfError, RawImage,
};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;
use tempfile::TempDir;

// ── Test fixture ─────────────────────────────────────────────────────────────

/// An in-memory PDF document: pages of images, an outline, page text.
#[derive(Default)]
struct FakePdf {
    pages: Vec<Vec<RawImage>>,
    outline: Vec<OutlineItem>,
    texts: HashMap<u32, String>,
}

impl FakePdf {
    fn page(mut self, images: Vec<RawImage>) -> Self {
        self.pages.push(images);
        self
    }

    fn bookmark(mut self, title: &str, depth: u32, page: u32) -> Self {
        self.outline.push(OutlineItem {
            title: title.into(),
            depth,
            page,
        });
        self
    }

    fn text(mut self, page: u32, text: &str) -> Self {
        self.texts.insert(page, text.into());
        self
    }
}

impl PdfSource for FakePdf {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_images(&self, page: u32) -> Vec<RawImage> {
        self.pages
            .get((page - 1) as usize)
            .cloned()
            .unwrap_or_default()
    }

    fn outline(&self) -> Vec<OutlineItem> {
        self.outline.clone()
    }

    fn page_text(&self, page: u32) -> Option<String> {
        self.texts.get(&page).cloned()
    }
}

fn img(bytes: &[u8], alt: Option<&str>) -> RawImage {
    RawImage {
        bytes: Some(bytes.to_vec()),
        alt_text: alt.map(str::to_owned),
    }
}

fn broken_img(alt: Option<&str>) -> RawImage {
    RawImage {
        bytes: None,
        alt_text: alt.map(str::to_owned),
    }
}

fn identity() -> ModuleIdentity {
    ModuleIdentity {
        module_id: "test_module".into(),
        title: "Test Module".into(),
    }
}

fn run(pdf: &FakePdf, config: &ConvertConfig) -> (TempDir, pfpdf::ConversionSummary) {
    let dir = TempDir::new().unwrap();
    let summary = convert_source(pdf, dir.path(), &identity(), config).unwrap();
    (dir, summary)
}

fn read_entries(dir: &Path) -> Vec<Value> {
    let json = std::fs::read_to_string(dir.join("packs").join("images.json")).unwrap();
    serde_json::from_str::<Vec<Value>>(&json).unwrap()
}

// ── Scenarios from the labeling/dedup rules ──────────────────────────────────

#[test]
fn pure_dedup_same_alt_text_merges_into_one_entry() {
    let pdf = FakePdf::default()
        .page(vec![img(b"goblin-page-1", Some("Goblin"))])
        .page(vec![img(b"goblin-page-2", Some("Goblin"))]);
    let (dir, summary) = run(&pdf, &ConvertConfig::default());

    assert_eq!(summary.images_found, 2);
    assert_eq!(summary.entries, 1);

    let entries = read_entries(dir.path());
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["name"], "Goblin");
    let pages = entries[0]["pages"].as_array().unwrap();
    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0]["image"]["src"], "list/0.png");
    assert_eq!(pages[1]["image"]["src"], "list/1.png");

    // Both occurrences keep their own bytes on disk.
    assert_eq!(
        std::fs::read(dir.path().join("list/0.png")).unwrap(),
        b"goblin-page-1"
    );
    assert_eq!(
        std::fs::read(dir.path().join("list/1.png")).unwrap(),
        b"goblin-page-2"
    );
}

#[test]
fn positional_fallback_without_metadata_or_bookmarks() {
    let pdf = FakePdf::default().page(vec![img(b"a", None), img(b"b", None)]);
    let (dir, summary) = run(&pdf, &ConvertConfig::default());

    assert_eq!(summary.entries, 2);
    let entries = read_entries(dir.path());
    assert_eq!(entries[0]["name"], "page_1_0");
    assert_eq!(entries[1]["name"], "page_1_1");
    assert!(entries[0].get("folder").is_none());
}

#[test]
fn nested_folders_mirror_the_bookmark_outline() {
    let pdf = FakePdf::default()
        .page(vec![])
        .page(vec![img(b"ambush", Some("Goblin Ambush"))])
        .bookmark("Chapter 1", 0, 1)
        .bookmark("Encounters", 1, 2);
    let (dir, _) = run(&pdf, &ConvertConfig::default());

    let entries = read_entries(dir.path());
    assert_eq!(entries[0]["name"], "Goblin Ambush");
    assert_eq!(entries[0]["folder"], "Chapter 1/Encounters");
}

#[test]
fn page_before_first_bookmark_stays_top_level() {
    let pdf = FakePdf::default()
        .page(vec![img(b"cover", Some("Cover Art"))])
        .page(vec![])
        .bookmark("Chapter 1", 0, 2);
    let (dir, _) = run(&pdf, &ConvertConfig::default());

    let entries = read_entries(dir.path());
    assert_eq!(entries[0]["name"], "Cover Art");
    assert!(entries[0].get("folder").is_none());
}

#[test]
fn identical_alt_text_far_apart_merges_instead_of_colliding() {
    let mut pdf = FakePdf::default().page(vec![img(b"first", Some("Red Dragon"))]);
    for _ in 0..40 {
        pdf = pdf.page(vec![]);
    }
    pdf = pdf.page(vec![img(b"last", Some("  Red   Dragon "))]);

    let (dir, summary) = run(&pdf, &ConvertConfig::default());
    assert_eq!(summary.entries, 1);
    let entries = read_entries(dir.path());
    assert_eq!(entries[0]["name"], "Red Dragon");
    assert_eq!(entries[0]["pages"].as_array().unwrap().len(), 2);
}

#[test]
fn distinct_keys_with_same_name_and_folder_are_fatal() {
    // Alt text "Goblin" and bookmark "Goblin" both target page 2, so two
    // distinct keys would import as 'Goblin' inside folder 'Goblin'.
    let pdf = FakePdf::default()
        .page(vec![])
        .page(vec![img(b"labelled", Some("Goblin")), img(b"anon", None)])
        .bookmark("Goblin", 0, 2);

    let dir = TempDir::new().unwrap();
    let err =
        convert_source(&pdf, dir.path(), &identity(), &ConvertConfig::default()).unwrap_err();
    match err {
        PfpdfError::NameCollision { name, folder, .. } => {
            assert_eq!(name, "Goblin");
            assert_eq!(folder, "Goblin");
        }
        other => panic!("expected NameCollision, got {other:?}"),
    }
    // The compendium must not have been written.
    assert!(!dir.path().join("packs").join("images.json").exists());
}

#[test]
fn bookmark_title_names_only_the_first_unlabelled_image_per_page() {
    let pdf = FakePdf::default()
        .page(vec![img(b"a", None), img(b"b", None)])
        .bookmark("Encounters", 0, 1);
    let (dir, _) = run(&pdf, &ConvertConfig::default());

    let entries = read_entries(dir.path());
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["name"], "Encounters");
    assert_eq!(entries[1]["name"], "page_1_1");
}

// ── Robustness ───────────────────────────────────────────────────────────────

#[test]
fn unreadable_image_is_skipped_not_fatal() {
    let pdf = FakePdf::default().page(vec![
        img(b"ok", Some("Fine")),
        broken_img(Some("Broken")),
    ]);
    let (dir, summary) = run(&pdf, &ConvertConfig::default());

    assert_eq!(summary.images_found, 1);
    assert_eq!(summary.images_skipped, 1);
    assert_eq!(read_entries(dir.path()).len(), 1);
}

#[test]
fn empty_page_selection_is_out_of_range() {
    let pdf = FakePdf::default().page(vec![img(b"a", None)]);
    let config = ConvertConfig::builder()
        .pages(PageSelection::Single(9))
        .build()
        .unwrap();
    let dir = TempDir::new().unwrap();
    let err = convert_source(&pdf, dir.path(), &identity(), &config).unwrap_err();
    assert!(matches!(err, PfpdfError::PageOutOfRange { .. }));
}

#[test]
fn page_range_restricts_extraction_but_keeps_real_page_numbers() {
    let pdf = FakePdf::default()
        .page(vec![img(b"a", None)])
        .page(vec![img(b"b", None)])
        .page(vec![img(b"c", None)]);
    let config = ConvertConfig::builder()
        .pages(PageSelection::Range(2, 3))
        .build()
        .unwrap();
    let dir = TempDir::new().unwrap();
    let summary = convert_source(&pdf, dir.path(), &identity(), &config).unwrap();

    assert_eq!(summary.pages_scanned, 2);
    let entries = read_entries(dir.path());
    assert_eq!(entries[0]["name"], "page_2_0");
    assert_eq!(entries[1]["name"], "page_3_0");
}

// ── Flags ────────────────────────────────────────────────────────────────────

#[test]
fn no_metadata_uses_positional_labels_and_no_folders() {
    let pdf = FakePdf::default()
        .page(vec![img(b"a", Some("Goblin"))])
        .bookmark("Chapter 1", 0, 1);
    let config = ConvertConfig::builder().use_metadata(false).build().unwrap();
    let dir = TempDir::new().unwrap();
    convert_source(&pdf, dir.path(), &identity(), &config).unwrap();

    let entries = read_entries(dir.path());
    assert_eq!(entries[0]["name"], "page_1_0");
    assert!(entries[0].get("folder").is_none());
}

#[test]
fn tags_from_text_combines_folders_and_page_tokens() {
    let pdf = FakePdf::default()
        .page(vec![img(b"a", Some("Ambush"))])
        .bookmark("Encounters", 0, 1)
        .text(1, "Goblins attack! Goblins flee.");
    let config = ConvertConfig::builder().tags_from_text(true).build().unwrap();
    let dir = TempDir::new().unwrap();
    convert_source(&pdf, dir.path(), &identity(), &config).unwrap();

    let entries = read_entries(dir.path());
    let tags: Vec<&str> = entries[0]["tags"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t.as_str().unwrap())
        .collect();
    assert_eq!(tags, ["encounters", "goblins", "attack", "flee"]);
}

#[test]
fn note_lands_on_every_entry() {
    let pdf = FakePdf::default().page(vec![img(b"a", None), img(b"b", None)]);
    let config = ConvertConfig::builder().note("GM only").build().unwrap();
    let dir = TempDir::new().unwrap();
    convert_source(&pdf, dir.path(), &identity(), &config).unwrap();

    for entry in read_entries(dir.path()) {
        assert_eq!(entry["notes"], "GM only");
    }
}

// ── Output shape & determinism ───────────────────────────────────────────────

#[test]
fn output_layout_and_manifest_fields() {
    let pdf = FakePdf::default().page(vec![img(b"a", Some("Map"))]);
    let (dir, _) = run(&pdf, &ConvertConfig::default());

    assert!(dir.path().join("module.json").exists());
    assert!(dir.path().join("packs").join("images.json").exists());
    assert!(dir.path().join("list").join("0.png").exists());

    let manifest: Value =
        serde_json::from_str(&std::fs::read_to_string(dir.path().join("module.json")).unwrap())
            .unwrap();
    assert_eq!(manifest["name"], "test_module");
    assert_eq!(manifest["title"], "Test Module");
    assert_eq!(manifest["packs"][0]["type"], "JournalEntry");
    assert_eq!(manifest["packs"][0]["path"], "packs/images.json");

    let entries = read_entries(dir.path());
    assert_eq!(entries[0]["_id"], "pfpdfimg00000000");
    assert_eq!(entries[0]["flags"]["pfpdf"]["module_id"], "test_module");
}

#[test]
fn reruns_are_byte_identical() {
    let pdf = FakePdf::default()
        .page(vec![img(b"x", Some("Goblin")), img(b"y", None)])
        .page(vec![img(b"z", Some("Goblin"))])
        .bookmark("Chapter 1", 0, 1);
    let config = ConvertConfig::default();

    let (dir_a, _) = run(&pdf, &config);
    let (dir_b, _) = run(&pdf, &config);

    for file in ["module.json", "packs/images.json"] {
        let a = std::fs::read(dir_a.path().join(file)).unwrap();
        let b = std::fs::read(dir_b.path().join(file)).unwrap();
        assert_eq!(a, b, "{file} differs between reruns");
    }
}
