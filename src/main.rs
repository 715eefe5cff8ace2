//! StaticMD - Markdown to themed HTML
//!
//! Entry point for the command-line shell. Handles argument parsing, logging
//! initialization and the session flow: restore the last document snapshot,
//! apply the requested changes, save it back, then render.

use anyhow::{anyhow, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use staticmd::config::Config;
use staticmd::error::FileError;
use staticmd::file_handler::{
    ensure_parent_dir, import_markdown, write_file_atomic_sync, ChangeDebouncer, SourceWatcher, WatchEvent,
};
use staticmd::markdown::{DiagramOutcome, PreviewComposer, PreviewTarget, StandaloneCompiler};
use staticmd::state::{clamp_font_size, DocumentState, HeaderFooterMode, SessionStore};
use staticmd::utils::{path, text};
use staticmd::{extract_headings, templates, DiagramRenderer, FontId, MarkdownRenderer, ThemeId, THEMES};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;

/// Default log filter when RUST_LOG is not set
const DEFAULT_LOG_FILTER: &str = "info,staticmd=debug";

/// File name of the live preview page
const PREVIEW_FILE_NAME: &str = "preview-staticmd.html";

/// How often the watch loop drains file events
const WATCH_POLL_INTERVAL: Duration = Duration::from_millis(100);

#[derive(Parser)]
#[command(name = "staticmd")]
#[command(version, about = "Markdown to themed, self-contained HTML", long_about = None)]
#[command(after_help = "EXAMPLES:
    staticmd export notes.md                 Export next to the source
    staticmd export notes.md --theme sepia   Export with the sepia theme
    staticmd preview notes.md --watch        Re-render the preview on save
    staticmd toc notes.md                    List H1-H3 headings")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Session file (defaults to the platform data directory)
    #[arg(long, global = true, value_name = "FILE")]
    session: Option<PathBuf>,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Compile the document into a standalone HTML file
    Export {
        /// Markdown source; the saved session document is used when omitted
        #[arg(value_name = "INPUT")]
        input: Option<PathBuf>,

        /// Output file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        #[command(flatten)]
        style: StyleArgs,
    },

    /// Write the live preview page, optionally re-rendering on change
    Preview {
        #[arg(value_name = "INPUT")]
        input: Option<PathBuf>,

        /// Output file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Watch INPUT and re-render whenever it settles
        #[arg(short, long, requires = "input")]
        watch: bool,

        #[command(flatten)]
        style: StyleArgs,
    },

    /// List the document's H1-H3 headings
    Toc {
        #[arg(value_name = "INPUT")]
        input: Option<PathBuf>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the starter templates
    Templates,

    /// List the available themes
    Themes,

    /// Replace the session document with a template
    New {
        /// Template id
        #[arg(value_name = "TEMPLATE", default_value = templates::DEFAULT_TEMPLATE_ID)]
        template: String,

        /// Also write the template's markdown to this file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

#[derive(Args, Default)]
struct StyleArgs {
    /// Theme: modern, sepia or notebook
    #[arg(long)]
    theme: Option<String>,

    /// Font family: sans, serif or mono
    #[arg(long)]
    font: Option<String>,

    /// Base font size in pixels
    #[arg(long, value_name = "PX")]
    font_size: Option<u32>,

    /// Header markdown
    #[arg(long)]
    header: Option<String>,

    /// Footer markdown
    #[arg(long)]
    footer: Option<String>,

    #[arg(long, value_enum)]
    header_mode: Option<ModeArg>,

    #[arg(long, value_enum)]
    footer_mode: Option<ModeArg>,

    /// Hide the table of contents
    #[arg(long)]
    no_toc: bool,

    /// Start from a template before applying the other options
    #[arg(long)]
    template: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Normal,
    Fixed,
}

impl From<ModeArg> for HeaderFooterMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Normal => HeaderFooterMode::Normal,
            ModeArg::Fixed => HeaderFooterMode::Fixed,
        }
    }
}

impl StyleArgs {
    fn apply(&self, mut document: DocumentState) -> anyhow::Result<DocumentState> {
        if let Some(id) = &self.template {
            let template = templates::find(id).ok_or_else(|| anyhow!("unknown template '{id}'"))?;
            document = document.apply_template(template);
        }
        if let Some(theme) = &self.theme {
            document.theme = ThemeId::parse_or_default(theme);
        }
        if let Some(font) = &self.font {
            document.font_family = FontId::parse_or_default(font);
        }
        if let Some(size) = self.font_size {
            document.font_size = clamp_font_size(size);
        }
        if let Some(header) = &self.header {
            document.header = header.clone();
        }
        if let Some(footer) = &self.footer {
            document.footer = footer.clone();
        }
        if let Some(mode) = self.header_mode {
            document.header_mode = mode.into();
        }
        if let Some(mode) = self.footer_mode {
            document.footer_mode = mode.into();
        }
        if self.no_toc {
            document.show_toc = false;
        }
        Ok(document)
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    init_logging();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<FileError>() {
                Some(file_error) => eprintln!("error: {}", file_error.user_message()),
                None => eprintln!("error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

/// Initialize the logging system
fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_LOG_FILTER))
        .format_timestamp_millis()
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match &cli.config {
        Some(file) => Config::load_from(&path::expand_tilde(file))?,
        None => Config::load().unwrap_or_else(|e| {
            log::warn!("Failed to load config: {}, using defaults", e);
            Config::default()
        }),
    };
    let session = match &cli.session {
        Some(file) => SessionStore::new(path::expand_tilde(file)),
        None => SessionStore::default_location()?,
    };

    match cli.command {
        Command::Export { input, output, style } => {
            let document = prepare_document(&session, input.as_deref(), &style)?;
            let output = output_path(output, input.as_deref(), &config.export.file_name);

            let html = StandaloneCompiler::new(MarkdownRenderer::shared(), config.export.clone())
                .compile(&document);
            ensure_parent_dir(&output)?;
            write_file_atomic_sync(&output, &html)?;

            log::info!("Exported {} ({} bytes)", output.display(), html.len());
            println!("{}", output.display());
        }

        Command::Preview { input, output, watch, style } => {
            let mut document = prepare_document(&session, input.as_deref(), &style)?;
            let output = output_path(output, input.as_deref(), PREVIEW_FILE_NAME);

            let target = Arc::new(PreviewTarget::new());
            let mut composer = PreviewComposer::new(
                MarkdownRenderer::shared(),
                Arc::new(DiagramRenderer::default()),
                Arc::clone(&target),
            )
            .with_settle_delay(Duration::from_millis(config.preview.diagram_settle_ms));

            let pass = composer.render_preview(&document);
            settle(pass).await;
            write_preview(&target, &config, &output)?;
            println!("{}", output.display());

            if let (true, Some(input)) = (watch, input) {
                let interrupted = async {
                    if let Err(e) = tokio::signal::ctrl_c().await {
                        log::warn!("Cannot listen for Ctrl+C: {}", e);
                        std::future::pending::<()>().await;
                    }
                };
                watch_source(
                    &input,
                    &output,
                    &config,
                    &session,
                    &mut composer,
                    &mut document,
                    interrupted,
                )
                .await?;
            }
        }

        Command::Toc { input, json } => {
            let document = match &input {
                Some(input) => load_source(&session.load_or_default(), input)?,
                None => session.load_or_default(),
            };
            let headings = extract_headings(&document.markdown);

            if json {
                println!("{}", serde_json::to_string_pretty(&headings)?);
            } else if headings.is_empty() {
                println!("No H1-H3 headings found.");
            } else {
                for item in &headings {
                    let indent = "  ".repeat(usize::from(item.level - 1));
                    println!("{indent}{}", item.text);
                }
            }
        }

        Command::Templates => {
            for template in &templates::TEMPLATES {
                println!("{:<8} {:<28} {}", template.id, template.name, template.description);
            }
        }

        Command::Themes => {
            for theme in &THEMES {
                println!(
                    "{:<10} {:<16} bg {} text {} accent {} diagrams {}",
                    theme.id,
                    theme.name,
                    theme.bg,
                    theme.text,
                    theme.accent,
                    theme.id.diagram_palette()
                );
            }
        }

        Command::New { template, output } => {
            let template = templates::find(&template)
                .ok_or_else(|| anyhow!("unknown template '{template}'"))?;
            let document = session.load_or_default().apply_template(template);
            session.save(&document)?;

            if let Some(output) = output {
                write_file_atomic_sync(&output, &document.markdown)?;
                println!("{}", output.display());
            }
            log::info!(
                "Session document reset to template '{}' in {}",
                template.id,
                session.path().display()
            );
        }
    }

    Ok(())
}

/// Restore the session snapshot, apply the import and style flags, and save
/// the result back
fn prepare_document(
    session: &SessionStore,
    input: Option<&Path>,
    style: &StyleArgs,
) -> anyhow::Result<DocumentState> {
    let mut document = session.load_or_default();
    document = style.apply(document)?;
    if let Some(input) = input {
        document = load_source(&document, input)?;
    }

    if let Err(e) = session.save(&document) {
        log::warn!("Failed to save session: {}", e);
    }
    log_statistics(&document);
    Ok(document)
}

/// Replace the document's markdown with the contents of `input`
fn load_source(document: &DocumentState, input: &Path) -> anyhow::Result<DocumentState> {
    let input = path::expand_tilde(input);
    if !path::is_importable(&input) {
        log::warn!("{} does not look like a markdown file", input.display());
    }

    let imported = import_markdown(&input)?;
    if imported.lossy {
        log::warn!("{} contained invalid text; some characters were replaced", input.display());
    }
    log::debug!(
        "Imported {} ({} bytes, {:?})",
        imported.path.display(),
        imported.size_bytes,
        imported.encoding
    );
    Ok(document.with_markdown(imported.content))
}

fn output_path(output: Option<PathBuf>, input: Option<&Path>, default_name: &str) -> PathBuf {
    match (output, input) {
        (Some(output), _) => path::expand_tilde(&output),
        (None, Some(input)) => path::sibling(&path::expand_tilde(input), default_name),
        (None, None) => PathBuf::from(default_name),
    }
}

fn log_statistics(document: &DocumentState) {
    log::info!(
        "{} characters, {} words",
        text::char_count(&document.markdown),
        text::word_count(&document.markdown)
    );
}

/// Wait for a scheduled diagram pass
async fn settle(pass: Option<JoinHandle<DiagramOutcome>>) {
    let Some(handle) = pass else { return };
    match handle.await {
        Ok(DiagramOutcome::Applied { rendered, failed }) => {
            log::debug!("Diagram pass: {} rendered, {} failed", rendered, failed);
        }
        Ok(DiagramOutcome::Stale) => log::debug!("Diagram pass superseded"),
        Err(e) => log::error!("Diagram pass panicked: {}", e),
    }
}

fn write_preview(target: &PreviewTarget, config: &Config, output: &Path) -> anyhow::Result<()> {
    let view = target.snapshot().context("no preview mounted")?;
    ensure_parent_dir(output)?;
    write_file_atomic_sync(output, &view.to_page(&config.export))?;
    log::debug!("Preview generation {} written to {}", view.generation, output.display());
    Ok(())
}

/// Re-render the preview whenever the source settles, until `shutdown`
/// resolves
async fn watch_source(
    input: &Path,
    output: &Path,
    config: &Config,
    session: &SessionStore,
    composer: &mut PreviewComposer,
    document: &mut DocumentState,
    shutdown: impl Future<Output = ()>,
) -> anyhow::Result<()> {
    let watcher = SourceWatcher::new(path::expand_tilde(input))
        .with_context(|| format!("failed to watch {}", input.display()))?;
    let mut debouncer = ChangeDebouncer::new(config.preview.watch_debounce_ms);
    let mut ticker = tokio::time::interval(WATCH_POLL_INTERVAL);

    log::info!("Watching {} (Ctrl+C to stop)", watcher.source().display());

    // One future for the whole loop so a signal during a re-render is kept
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                log::info!("Stopped watching");
                return Ok(());
            }
            _ = ticker.tick() => {}
        }

        for event in watcher.poll() {
            match event {
                WatchEvent::Modified(_) => debouncer.touch(Instant::now()),
                WatchEvent::Removed(source) => log::warn!("{} was removed", source.display()),
                WatchEvent::Error(e) => log::warn!("Watch error: {}", e),
            }
        }

        if !debouncer.take_ready(Instant::now()) {
            continue;
        }

        match load_source(document, watcher.source()) {
            Ok(updated) => *document = updated,
            Err(e) => {
                log::error!("Failed to reload {}: {:#}", watcher.source().display(), e);
                continue;
            }
        }

        let pass = composer.update(document);
        settle(pass).await;
        write_preview(composer.target(), config, output)?;
        log_statistics(document);

        if let Err(e) = session.save(document) {
            log::warn!("Failed to save session: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn composer() -> PreviewComposer {
        PreviewComposer::new(
            MarkdownRenderer::shared(),
            Arc::new(DiagramRenderer::default()),
            Arc::new(PreviewTarget::new()),
        )
    }

    #[test]
    fn test_style_flags_update_snapshot() {
        let style = StyleArgs {
            theme: Some("sepia".to_string()),
            font_size: Some(200),
            header: Some("Top".to_string()),
            header_mode: Some(ModeArg::Fixed),
            no_toc: true,
            template: Some("corp".to_string()),
            ..StyleArgs::default()
        };
        let document = style.apply(DocumentState::default()).unwrap();

        assert_eq!(document.theme, ThemeId::Sepia);
        assert_eq!(document.font_size, 48);
        assert_eq!(document.header, "Top");
        assert_eq!(document.header_mode, HeaderFooterMode::Fixed);
        assert!(!document.show_toc);
        assert!(document.markdown.starts_with("# Relatório Executivo Trimestral"));
    }

    #[test]
    fn test_unknown_template_flag_is_an_error() {
        let style = StyleArgs {
            template: Some("nope".to_string()),
            ..StyleArgs::default()
        };
        assert!(style.apply(DocumentState::default()).is_err());
    }

    #[tokio::test]
    async fn test_watch_stops_on_shutdown() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("notes.md");
        std::fs::write(&input, "# One").unwrap();
        let output = dir.path().join("preview.html");
        let session = SessionStore::new(dir.path().join("session.json"));
        let mut composer = composer();
        let mut document = DocumentState::empty();

        let (tx, rx) = tokio::sync::oneshot::channel::<()>();
        tx.send(()).unwrap();
        let shutdown = async move {
            let _ = rx.await;
        };

        let result = tokio::time::timeout(
            Duration::from_secs(5),
            watch_source(
                &input,
                &output,
                &Config::default(),
                &session,
                &mut composer,
                &mut document,
                shutdown,
            ),
        )
        .await;
        assert!(matches!(result, Ok(Ok(()))));
    }

    #[tokio::test]
    async fn test_watch_rerenders_then_stops() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("notes.md");
        std::fs::write(&input, "# One").unwrap();
        let output = dir.path().join("out").join("preview.html");
        let session = SessionStore::new(dir.path().join("session.json"));
        let mut composer = composer();
        let mut document = DocumentState::empty();
        let config = Config {
            preview: staticmd::config::PreviewConfig {
                diagram_settle_ms: 1,
                watch_debounce_ms: 50,
            },
            ..Config::default()
        };

        let writer = input.clone();
        let shutdown = async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            std::fs::write(&writer, "# Two").unwrap();
            tokio::time::sleep(Duration::from_millis(1500)).await;
        };

        let result = tokio::time::timeout(
            Duration::from_secs(10),
            watch_source(&input, &output, &config, &session, &mut composer, &mut document, shutdown),
        )
        .await;
        assert!(matches!(result, Ok(Ok(()))));
        assert_eq!(document.markdown, "# Two");
        assert!(std::fs::read_to_string(&output).unwrap().contains("<h1>Two</h1>"));
    }
}
