//! CLI binary for edgequake-pdf2text.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ExtractionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_pdf2text::{
    extract, extract_batch, extract_to_file, inspect, DocumentError, DocumentResult,
    ExtractionConfig, ExtractionOutput, ExtractionProgressCallback, PageSelection,
    Pdf2TextError, ProgressCallback, ReassemblyMode, StopPhrases,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

/// Exit code for recoverable outcomes (nothing extracted, phrase not found).
const EXIT_NO_TEXT: u8 = 2;

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress for batches: one bar plus a log line per document.
/// Documents complete out of order, so start times are keyed by index.
struct CliProgressCallback {
    bar: ProgressBar,
    start_times: Mutex<HashMap<usize, Instant>>,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} documents  \
             ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix("Extracting");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
            errors: AtomicUsize::new(0),
        })
    }

    fn elapsed_secs(&self, index: usize) -> f64 {
        self.start_times
            .lock()
            .ok()
            .and_then(|mut m| m.remove(&index))
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl ExtractionProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_documents: usize) {
        self.bar.set_length(total_documents as u64);
    }

    fn on_document_start(&self, index: usize, _total: usize, input: &str) {
        if let Ok(mut m) = self.start_times.lock() {
            m.insert(index, Instant::now());
        }
        self.bar.set_message(input.to_string());
    }

    fn on_document_complete(&self, index: usize, total: usize, chars: usize) {
        let secs = self.elapsed_secs(index);
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}",
            green("✓"),
            index + 1,
            total,
            dim(&format!("{chars:>8} chars")),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_document_error(&self, index: usize, total: usize, error: &str) {
        let secs = self.elapsed_secs(index);
        self.errors.fetch_add(1, Ordering::SeqCst);

        // Keep the first line only; pdfium hints span several.
        let first_line = error.lines().next().unwrap_or(error);
        let msg: String = if first_line.chars().count() > 80 {
            first_line.chars().take(79).chain(['…']).collect()
        } else {
            first_line.to_string()
        };

        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}",
            red("✗"),
            index + 1,
            total,
            red(&msg),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total_documents: usize, success_count: usize) {
        self.bar.finish_and_clear();
        let failed = total_documents.saturating_sub(success_count);
        if failed == 0 {
            eprintln!(
                "{} {} documents extracted",
                green("✔"),
                bold(&success_count.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} documents extracted  ({} failed)",
                if failed == total_documents {
                    red("✘")
                } else {
                    yellow("⚠")
                },
                bold(&success_count.to_string()),
                total_documents,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Clean the whole document (stdout)
  pdf2text book.pdf

  # Pages 10-25 into a file
  pdf2text --pages 10-25 book.pdf -o chapter.txt

  # Everything from one phrase through another
  pdf2text --from "Chapter Two" --to "End of chapter" book.pdf

  # Drop publisher boilerplate and cut each page at its notes section
  pdf2text --stop-phrase "Downloaded from" --stop-phrase "All rights reserved" \
           --footer-marker "Notes" article.pdf

  # Text from pdftotext / OCR (pages separated by form feeds)
  pdftotext scan.pdf - | tee scan.txt >/dev/null && pdf2text scan.txt

  # Several documents at once into a directory
  pdf2text a.pdf b.pdf c.pdf -o cleaned/

  # JSON output with metrics and stats
  pdf2text --json article.pdf > article.json

CLEANING RULES (in order):
  1. Cut each page at --footer-marker (case-insensitive), if given
  2. Drop blank lines, bare page numbers and lines containing a stop phrase
  3. Drop running headers: capitalised, no final punctuation, contains a digit
     (disable with --keep-running-headers)
  4. Strip footnote markers: society5 → society, freedom”12 → freedom”
     (disable with --keep-footnotes)
  5. Join wrapped lines; undo hyphenation; new paragraph after . ! ? when the
     next line starts with a capital letter
  6. Slice from --from through --to, if given

EXIT CODES:
  0  text extracted
  1  fatal error (file not found, corrupt PDF, bad arguments, ...)
  2  nothing extracted (empty document, everything filtered, phrase not found)

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH         Path to libpdfium (file or directory)
  RUST_LOG                Log filter, e.g. RUST_LOG=edgequake_pdf2text=debug
"#;

/// Reconstruct clean prose from PDF text layers.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2text",
    version,
    about = "Reconstruct clean, paragraph-structured text from PDF files",
    long_about = "Extract the text layer of PDF documents (local files or URLs) and rebuild \
readable paragraphs: page numbers, running headers and footnote markers are removed, \
hyphenated words are rejoined, and wrapped lines are merged. Plain-text inputs with \
form-feed page breaks are accepted too.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local file paths or HTTP/HTTPS URLs (PDF or form-feed separated text).
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Write text to this file (one input) or directory (several inputs).
    #[arg(short, long, env = "PDF2TEXT_OUTPUT")]
    output: Option<PathBuf>,

    /// Page selection: all, 5, 3-15, or 1,3,5,7.
    #[arg(long, env = "PDF2TEXT_PAGES", default_value = "all")]
    pages: String,

    /// Start phrase: output begins at its first occurrence.
    #[arg(long = "from", env = "PDF2TEXT_FROM", requires = "end_phrase")]
    start_phrase: Option<String>,

    /// End phrase: output ends after its first occurrence following --from.
    #[arg(long = "to", env = "PDF2TEXT_TO", requires = "start_phrase")]
    end_phrase: Option<String>,

    /// Drop every line containing this phrase (case-insensitive). Repeatable.
    #[arg(long = "stop-phrase", value_name = "PHRASE")]
    stop_phrases: Vec<String>,

    /// File with one stop phrase per line.
    #[arg(long, env = "PDF2TEXT_STOP_PHRASES_FILE")]
    stop_phrases_file: Option<PathBuf>,

    /// Cut each page at the first occurrence of this marker (case-insensitive).
    #[arg(long, env = "PDF2TEXT_FOOTER_MARKER")]
    footer_marker: Option<String>,

    /// How page breaks interact with paragraphs.
    #[arg(long, env = "PDF2TEXT_REASSEMBLY", value_enum, default_value = "auto")]
    reassembly: ReassemblyArg,

    /// Keep lines that look like running headers/footers.
    #[arg(long, env = "PDF2TEXT_KEEP_RUNNING_HEADERS")]
    keep_running_headers: bool,

    /// Keep digits glued to words and closing quotes.
    #[arg(long, env = "PDF2TEXT_KEEP_FOOTNOTES")]
    keep_footnotes: bool,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF2TEXT_PASSWORD")]
    password: Option<String>,

    /// Documents processed at once when several inputs are given.
    #[arg(short, long, env = "PDF2TEXT_CONCURRENCY", default_value_t = 4)]
    concurrency: usize,

    /// Output structured JSON instead of plain text.
    #[arg(long, env = "PDF2TEXT_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2TEXT_NO_PROGRESS")]
    no_progress: bool,

    /// Print document metadata only, no extraction.
    #[arg(long)]
    inspect_only: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2TEXT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2TEXT_QUIET")]
    quiet: bool,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "PDF2TEXT_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum ReassemblyArg {
    Auto,
    Document,
    PerPage,
}

impl From<ReassemblyArg> for ReassemblyMode {
    fn from(v: ReassemblyArg) -> Self {
        match v {
            ReassemblyArg::Auto => ReassemblyMode::Auto,
            ReassemblyArg::Document => ReassemblyMode::Document,
            ReassemblyArg::PerPage => ReassemblyMode::PerPage,
        }
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let batch = cli.inputs.len() > 1;
    let show_progress = batch && !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        for input in &cli.inputs {
            let meta = inspect(input, cli.password.as_deref())
                .await
                .with_context(|| format!("Failed to inspect {input}"))?;

            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&meta).context("Failed to serialize metadata")?
                );
            } else {
                println!("File:         {}", input);
                println!("Source:       {:?}", meta.source);
                if let Some(ref t) = meta.title {
                    println!("Title:        {}", t);
                }
                if let Some(ref a) = meta.author {
                    println!("Author:       {}", a);
                }
                if let Some(ref s) = meta.subject {
                    println!("Subject:      {}", s);
                }
                println!("Pages:        {}", meta.page_count);
                if !meta.pdf_version.is_empty() {
                    println!("PDF Version:  {}", meta.pdf_version);
                }
                if let Some(ref p) = meta.producer {
                    println!("Producer:     {}", p);
                }
                if let Some(ref c) = meta.creator {
                    println!("Creator:      {}", c);
                }
            }
        }
        return Ok(ExitCode::SUCCESS);
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ExtractionProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb).await?;

    if batch {
        run_batch(&cli, &config).await
    } else {
        run_single(&cli, &cli.inputs[0], &config).await
    }
}

/// One input: stdout or `--output` file.
async fn run_single(cli: &Cli, input: &str, config: &ExtractionConfig) -> Result<ExitCode> {
    let result = match cli.output {
        Some(ref path) => extract_to_file(input, path, config).await,
        None => extract(input, config).await,
    };

    let output = match result {
        Ok(output) => output,
        Err(e) if e.is_recoverable() => {
            report_no_text(input, &e);
            return Ok(ExitCode::from(EXIT_NO_TEXT));
        }
        Err(e) => return Err(e).context("Extraction failed"),
    };

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        println!("{json}");
    } else if cli.output.is_none() {
        write_stdout(&output.text)?;
    }

    if !cli.quiet && !cli.json {
        print_summary(&output, cli.output.as_deref());
    }

    Ok(ExitCode::SUCCESS)
}

/// Several inputs: progress bar, per-document outputs, one summary.
async fn run_batch(cli: &Cli, config: &ExtractionConfig) -> Result<ExitCode> {
    let results = extract_batch(cli.inputs.iter().cloned(), config).await;

    if let Some(ref dir) = cli.output {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
        for (r, output) in results.iter().filter_map(|r| r.output.as_ref().map(|o| (r, o))) {
            let path = dir.join(output_file_name(&r.input, r.index));
            tokio::fs::write(&path, &output.text)
                .await
                .with_context(|| format!("Failed to write {}", path.display()))?;
            if !cli.quiet && !show_batch_progress(cli) {
                print_summary(output, Some(&path));
            }
        }
    }

    if cli.json {
        let json = serde_json::to_string_pretty(&results).context("Failed to serialise output")?;
        println!("{json}");
    } else if cli.output.is_none() {
        let texts: Vec<&str> = results
            .iter()
            .filter_map(|r| r.output.as_ref().map(|o| o.text.as_str()))
            .collect();
        write_stdout(&texts.join("\n\n"))?;
    }

    if !show_batch_progress(cli) && !cli.quiet {
        for r in results.iter().filter(|r| !r.is_ok()) {
            if let Some(ref e) = r.error {
                eprintln!("{} {}", red("✗"), e);
            }
        }
    }

    Ok(batch_exit_code(&results))
}

fn show_batch_progress(cli: &Cli) -> bool {
    !cli.quiet && !cli.no_progress && !cli.json
}

/// 0 if anything succeeded, 2 if every failure was recoverable, else 1.
fn batch_exit_code(results: &[DocumentResult]) -> ExitCode {
    if results.iter().any(DocumentResult::is_ok) {
        ExitCode::SUCCESS
    } else if results
        .iter()
        .all(|r| matches!(r.error, Some(DocumentError::Clean { .. })))
    {
        ExitCode::from(EXIT_NO_TEXT)
    } else {
        ExitCode::FAILURE
    }
}

fn report_no_text(input: &str, err: &Pdf2TextError) {
    eprintln!("{} {}: {}", yellow("⚠"), input, err);
}

fn print_summary(output: &ExtractionOutput, path: Option<&Path>) {
    let target = path
        .map(|p| format!("  →  {}", bold(&p.display().to_string())))
        .unwrap_or_default();
    eprintln!(
        "{}  {}/{} pages  {} paragraphs  {}ms{}",
        green("✔"),
        output.stats.selected_pages,
        output.stats.total_pages,
        output.stats.paragraphs,
        output.stats.total_duration_ms,
        target,
    );
    eprintln!(
        "   {} chars without spaces  /  {} A4 pages",
        cyan(&output.metrics.chars_without_spaces.to_string()),
        cyan(&output.metrics.a4_pages_display()),
    );
}

fn write_stdout(text: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(text.as_bytes())
        .context("Failed to write to stdout")?;
    if !text.ends_with('\n') {
        handle.write_all(b"\n").ok();
    }
    Ok(())
}

/// `<stem>.txt` for a path or URL; falls back to the batch index.
fn output_file_name(input: &str, index: usize) -> String {
    let last = input
        .trim_end_matches('/')
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    let stem = Path::new(last)
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty());
    match stem {
        Some(stem) => format!("{:03}-{}.txt", index + 1, stem),
        None => format!("{:03}.txt", index + 1),
    }
}

/// Map CLI args to `ExtractionConfig`.
async fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ExtractionConfig> {
    let mut phrases = cli.stop_phrases.clone();
    if let Some(ref path) = cli.stop_phrases_file {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read stop phrases from {:?}", path))?;
        phrases.extend(StopPhrases::from_lines(&text).iter().map(str::to_string));
    }

    let pages = parse_pages(&cli.pages)?;

    let mut builder = ExtractionConfig::builder()
        .pages(pages)
        .stop_phrases(&phrases)
        .reassembly(cli.reassembly.clone().into())
        .drop_running_headers(!cli.keep_running_headers)
        .strip_footnotes(!cli.keep_footnotes)
        .concurrency(cli.concurrency)
        .download_timeout_secs(cli.download_timeout);

    if let Some(ref marker) = cli.footer_marker {
        builder = builder.footer_marker(marker);
    }
    if let (Some(start), Some(end)) = (&cli.start_phrase, &cli.end_phrase) {
        builder = builder.phrase_range(start, end);
    }
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Parse `--pages` string into `PageSelection`.
fn parse_pages(s: &str) -> Result<PageSelection> {
    let s = s.trim().to_lowercase();

    if s == "all" {
        return Ok(PageSelection::All);
    }

    // Range: "3-15"
    if let Some((start, end)) = s.split_once('-') {
        let start: usize = start
            .trim()
            .parse()
            .context("Invalid start page in range")?;
        let end: usize = end.trim().parse().context("Invalid end page in range")?;

        if start < 1 {
            anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", start);
        }
        if start > end {
            anyhow::bail!(
                "Invalid page range '{}-{}': start must be <= end",
                start,
                end
            );
        }

        return Ok(PageSelection::Range(start, end));
    }

    // Set: "1,3,5,7"
    if s.contains(',') {
        let pages: Vec<usize> = s
            .split(',')
            .map(|p| {
                p.trim()
                    .parse::<usize>()
                    .context(format!("Invalid page number: '{}'", p.trim()))
            })
            .collect::<Result<Vec<_>>>()?;

        if let Some(&p) = pages.iter().find(|&&p| p < 1) {
            anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", p);
        }

        return Ok(PageSelection::Set(pages));
    }

    // Single page: "5"
    let page: usize = s.parse().context("Invalid page number")?;
    if page < 1 {
        anyhow::bail!("Pages are 1-indexed, minimum is 1 (got {})", page);
    }

    Ok(PageSelection::Single(page))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pages() {
        assert_eq!(parse_pages("all").unwrap(), PageSelection::All);
        assert_eq!(parse_pages(" ALL ").unwrap(), PageSelection::All);
        assert_eq!(parse_pages("5").unwrap(), PageSelection::Single(5));
        assert_eq!(parse_pages("3-15").unwrap(), PageSelection::Range(3, 15));
        assert_eq!(
            parse_pages("1, 3,5").unwrap(),
            PageSelection::Set(vec![1, 3, 5])
        );
    }

    #[test]
    fn test_parse_pages_rejects_bad_input() {
        assert!(parse_pages("0").is_err());
        assert!(parse_pages("9-3").is_err());
        assert!(parse_pages("0-3").is_err());
        assert!(parse_pages("1,0").is_err());
        assert!(parse_pages("abc").is_err());
    }

    #[test]
    fn test_output_file_name() {
        assert_eq!(output_file_name("docs/book.pdf", 0), "001-book.txt");
        assert_eq!(
            output_file_name("https://example.com/papers/article.pdf", 9),
            "010-article.txt"
        );
        assert_eq!(output_file_name("https://example.com/", 2), "003-example.txt");
        assert_eq!(output_file_name("", 4), "005.txt");
    }

    #[test]
    fn test_cli_requires_both_phrases() {
        let err = Cli::try_parse_from(["pdf2text", "--from", "Intro", "a.pdf"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);

        let cli =
            Cli::try_parse_from(["pdf2text", "--from", "Intro", "--to", "End", "a.pdf"]).unwrap();
        assert_eq!(cli.start_phrase.as_deref(), Some("Intro"));
        assert_eq!(cli.end_phrase.as_deref(), Some("End"));
    }

    #[test]
    fn test_cli_collects_repeated_stop_phrases() {
        let cli = Cli::try_parse_from([
            "pdf2text",
            "--stop-phrase",
            "Downloaded from",
            "--stop-phrase",
            "JSTOR",
            "a.pdf",
            "b.txt",
        ])
        .unwrap();
        assert_eq!(cli.stop_phrases, vec!["Downloaded from", "JSTOR"]);
        assert_eq!(cli.inputs, vec!["a.pdf", "b.txt"]);
    }
}
