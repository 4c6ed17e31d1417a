//! CLI binary for pfpdf.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConvertConfig` and prints the run summary.

use anyhow::{Context, Result};
use clap::Parser;
use pfpdf::{convert, ConvertConfig, PageSelection};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract a rulebook into a module directory
  pfpdf rulebook.pdf out/

  # Explicit module identity
  pfpdf --module-id dark-tower --title "Dark Tower" rulebook.pdf out/

  # Only chapter pages, with tags and a note on every entry
  pfpdf --pages 12-48 --tags-from-text --note "GM only" rulebook.pdf out/

  # Ignore alt text and bookmarks entirely (positional names)
  pfpdf --no-metadata scan.pdf out/

  # Machine-readable run summary
  pfpdf --json rulebook.pdf out/ > summary.json

OUTPUT LAYOUT:
  out/module.json           module manifest
  out/packs/images.json     JournalEntry compendium (JSON array)
  out/list/0.png, 1.png, …  extracted image files

ENVIRONMENT VARIABLES:
  PFPDF_MODULE_ID   Override the module id (takes precedence over --module-id)
  PFPDF_TITLE       Override the module title (takes precedence over --title)

Reruns are deterministic: the same PDF and flags produce byte-identical
module.json and packs/images.json.
"#;

/// Extract images from a rulebook PDF into a Foundry VTT module.
#[derive(Parser, Debug)]
#[command(
    name = "pfpdf",
    version,
    about = "Extract images from a rulebook PDF into a Foundry VTT module",
    long_about = "Extract every embedded image from a PDF, label it from alt text or the \
bookmark outline, deduplicate repeats, and write a Foundry VTT module with a JournalEntry \
compendium whose folders mirror the PDF's bookmarks.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Path to the source PDF file.
    pdf: PathBuf,

    /// Directory to write the module into (created if missing).
    out: PathBuf,

    /// Module identifier for the manifest (defaults to the PDF filename,
    /// slugified). PFPDF_MODULE_ID overrides this flag.
    #[arg(long)]
    module_id: Option<String>,

    /// Module title for the manifest (defaults to the PDF filename).
    /// PFPDF_TITLE overrides this flag.
    #[arg(long)]
    title: Option<String>,

    /// Use positional names only; ignore alt text and bookmarks.
    #[arg(long)]
    no_metadata: bool,

    /// Generate entry tags from bookmark folders and page text.
    #[arg(long)]
    tags_from_text: bool,

    /// Attach a note to every entry.
    #[arg(long)]
    note: Option<String>,

    /// Page selection: all, 5, 3-15, or 1,3,5,7.
    #[arg(long, default_value = "all")]
    pages: String,

    /// Print the run summary as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let pages = parse_pages(&cli.pages)?;
    let mut builder = ConvertConfig::builder()
        .use_metadata(!cli.no_metadata)
        .tags_from_text(cli.tags_from_text)
        .pages(pages);
    if let Some(ref note) = cli.note {
        builder = builder.note(note.clone());
    }
    if let Some(ref id) = cli.module_id {
        builder = builder.module_id(id.clone());
    }
    if let Some(ref title) = cli.title {
        builder = builder.title(title.clone());
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Run ──────────────────────────────────────────────────────────────
    let summary = convert(&cli.pdf, &cli.out, &config).context("Conversion failed")?;

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&summary).context("Failed to serialise summary")?
        );
    } else if !cli.quiet {
        eprintln!(
            "{} {} entries from {} images ({} pages scanned)  {}",
            green("✔"),
            bold(&summary.entries.to_string()),
            summary.images_found,
            summary.pages_scanned,
            dim(&format!("{}ms", summary.duration_ms)),
        );
        if summary.images_skipped > 0 {
            eprintln!("  {} unreadable images skipped", summary.images_skipped);
        }
        eprintln!(
            "  module '{}' written to {}",
            summary.module_id,
            bold(&cli.out.display().to_string())
        );
    }

    Ok(())
}

/// Parse `--pages` into a `PageSelection`.
fn parse_pages(s: &str) -> Result<PageSelection> {
    let s = s.trim().to_lowercase();

    if s == "all" {
        return Ok(PageSelection::All);
    }

    // Range: "3-15"
    if let Some((start, end)) = s.split_once('-') {
        let start: u32 = start.trim().parse().context("Invalid start page in range")?;
        let end: u32 = end.trim().parse().context("Invalid end page in range")?;
        if start < 1 {
            anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {start})");
        }
        if start > end {
            anyhow::bail!("Invalid page range '{start}-{end}': start must be <= end");
        }
        return Ok(PageSelection::Range(start, end));
    }

    // Set: "1,3,5,7"
    if s.contains(',') {
        let pages: Vec<u32> = s
            .split(',')
            .map(|p| {
                p.trim()
                    .parse::<u32>()
                    .context(format!("Invalid page number: '{}'", p.trim()))
            })
            .collect::<Result<Vec<_>>>()?;
        if pages.iter().any(|&p| p < 1) {
            anyhow::bail!("Pages are 1-indexed, minimum is 1");
        }
        return Ok(PageSelection::Set(pages));
    }

    // Single page: "5"
    let page: u32 = s.parse().context("Invalid page number")?;
    if page < 1 {
        anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {page})");
    }
    Ok(PageSelection::Single(page))
}
