//! Pipeline stages for PDF-to-module conversion.
//!
//! Each submodule implements exactly one transformation step.
//! Keeping stages separate makes each independently testable and lets us
//! swap implementations (e.g. a different PDF backend) without touching
//! the others. Data flows strictly forward as in-memory values; no stage
//! reads anything another stage wrote to disk.
//!
//! ## Data Flow
//!
//! ```text
//! extract ──▶ resolve ──▶ assemble
//! (records)   (dedup keys)  (entries + files)
//!      hierarchy ─────┘
//!      (bookmark folders)
//! ```
//!
//! 1. [`extract`]   — flatten the backend's page/image enumeration into
//!    sequence-numbered [`extract::ImageRecord`]s; unreadable occurrences
//!    are skipped with a warning
//! 2. [`hierarchy`] — one pass over the bookmark outline producing the
//!    enclosing-folder path for every page
//! 3. [`resolve`]   — assign each record a stable deduplication key
//!    (alt text > bookmark title > positional fallback) and merge
//!    occurrences that share one
//! 4. [`assemble`]  — produce one [`assemble::CompendiumEntry`] per key,
//!    number the image files, attach tags/notes, and reject ambiguous
//!    name collisions

pub mod assemble;
pub mod extract;
pub mod hierarchy;
pub mod resolve;
