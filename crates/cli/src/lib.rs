use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use editor_core::{plan_export, EditorAction, EditorSession};
use markup_model::EditorSettings;
use pdf_engine::{
    default_renderer, DocumentHandle, LopdfDocument, LopdfRenderer, OpenSource, PageRenderer,
    PdfDocument,
};
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use storage::Storage;

#[derive(Debug, Parser)]
#[command(name = "pdf-markup")]
#[command(about = "Add text boxes and pen strokes to PDF pages")]
pub struct Cli {
    /// Directory holding settings.json. Defaults to the platform data directory.
    #[arg(long, global = true, value_name = "DIR")]
    config_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Print machine-readable page layout.
    Info {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Print the draw calls an export would make, then what it would skip.
    Plan {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[arg(long, value_name = "EDITS")]
        edits: PathBuf,
    },
    /// Apply an edit script and write the annotated PDF.
    Annotate {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[arg(long, value_name = "EDITS")]
        edits: PathBuf,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Apply an edit script and write a PNG of one page with its annotations.
    Preview {
        #[arg(value_name = "FILE")]
        file: PathBuf,
        #[arg(long, value_name = "EDITS")]
        edits: PathBuf,
        /// One-based. Defaults to the page the script ends on.
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the effective editor settings.
    Settings {
        /// Overwrite the stored settings with the defaults first.
        #[arg(long)]
        reset: bool,
    },
    /// Print CLI version.
    Version,
}

#[derive(Debug, Serialize)]
struct InfoOutput {
    path: String,
    page_count: u32,
    pages: Vec<PageOutput>,
}

#[derive(Debug, Serialize)]
struct PageOutput {
    page: u32,
    native_width: f32,
    native_height: f32,
    rotation: u16,
    crop_box: BoxOutput,
}

#[derive(Debug, Serialize)]
struct BoxOutput {
    x: f32,
    y: f32,
    width: f32,
    height: f32,
}

/// Pages to lay out before the actions run, then the actions in order.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EditScript {
    #[serde(default)]
    render: RenderSelection,
    #[serde(default)]
    actions: Vec<EditorAction>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RenderSelection {
    Pages(Vec<u32>),
    Keyword(String),
}

impl Default for RenderSelection {
    fn default() -> Self {
        Self::Keyword("all".to_owned())
    }
}

impl RenderSelection {
    fn pages(&self, page_count: u32) -> Result<Vec<u32>> {
        match self {
            Self::Pages(pages) => Ok(pages.clone()),
            Self::Keyword(keyword) if keyword == "all" => Ok((1..=page_count).collect()),
            Self::Keyword(other) => {
                anyhow::bail!("render must be \"all\" or a list of page numbers, got {other:?}")
            }
        }
    }
}

struct LoadedSession {
    session: EditorSession,
    renderer: LopdfRenderer,
    handle: DocumentHandle,
}

/// Installs the stderr log subscriber. `RUST_LOG` overrides the default `warn` level.
pub fn init_logging() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    // A subscriber may already be installed when running embedded.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn run<I, T>(args: I) -> Result<()>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    let config_dir = cli.config_dir;

    match cli.command {
        Commands::Info { file } => run_info(&file),
        Commands::Plan { file, edits } => run_plan(&storage(config_dir)?, &file, &edits),
        Commands::Annotate { file, edits, output } => {
            run_annotate(&storage(config_dir)?, &file, &edits, output.as_deref())
        }
        Commands::Preview { file, edits, page, output } => {
            run_preview(&storage(config_dir)?, &file, &edits, page, output.as_deref())
        }
        Commands::Settings { reset } => run_settings(&storage(config_dir)?, reset),
        Commands::Version => {
            println!("{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn storage(config_dir: Option<PathBuf>) -> Result<Storage> {
    match config_dir {
        Some(dir) => Ok(Storage::with_root(dir)),
        None => Storage::from_default_project().context("failed to locate settings directory"),
    }
}

fn run_info(file: &Path) -> Result<()> {
    ensure_pdf_exists(file)?;

    let mut renderer = default_renderer(1.0);
    let handle = renderer.open(OpenSource::from(file)).context("failed to open PDF")?;
    let bytes = fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
    let document = LopdfDocument::load(&bytes).context("failed to open PDF")?;

    let page_count = renderer.page_count(handle)?;
    let mut pages = Vec::new();
    for page in 1..=page_count {
        let layout = renderer.page_layout(handle, page)?;
        let crop = document.crop_box(page - 1)?;
        pages.push(PageOutput {
            page,
            native_width: layout.native_width,
            native_height: layout.native_height,
            rotation: layout.rotation,
            crop_box: BoxOutput { x: crop.x, y: crop.y, width: crop.width, height: crop.height },
        });
    }

    let payload = InfoOutput { path: file.display().to_string(), page_count, pages };

    let json = serde_json::to_string_pretty(&payload)?;
    println!("{json}");

    renderer.close(handle)?;

    Ok(())
}

fn run_plan(storage: &Storage, file: &Path, edits: &Path) -> Result<()> {
    let loaded = load_session(storage, file, edits)?;
    let session = &loaded.session;

    let document = LopdfDocument::load(session.source()).context("failed to open PDF")?;
    let plan = plan_export(
        &document,
        session.store().snapshot(),
        session.geometry(),
        session.settings(),
    )
    .context("failed to plan export")?;

    for command in &plan.commands {
        println!("{command}");
    }
    for skipped in &plan.skipped {
        println!("{skipped}");
    }

    Ok(())
}

fn run_annotate(storage: &Storage, file: &Path, edits: &Path, output: Option<&Path>) -> Result<()> {
    let mut loaded = load_session(storage, file, edits)?;
    let report =
        loaded.session.export::<LopdfDocument>().context("failed to export annotated PDF")?;

    let output = output
        .map(ToOwned::to_owned)
        .unwrap_or_else(|| file.with_file_name(&report.file.file_name));

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }

    fs::write(&output, &report.file.bytes)
        .with_context(|| format!("failed to write PDF to {}", output.display()))?;

    println!("{}", output.display());

    loaded.renderer.close(loaded.handle)?;

    Ok(())
}

fn run_preview(
    storage: &Storage,
    file: &Path,
    edits: &Path,
    page: Option<u32>,
    output: Option<&Path>,
) -> Result<()> {
    if page == Some(0) {
        anyhow::bail!("--page is 1-based and must be >= 1");
    }

    let mut loaded = load_session(storage, file, edits)?;
    let page = page.unwrap_or_else(|| loaded.session.current_page());

    let image = loaded
        .session
        .preview(&loaded.renderer, loaded.handle, page)
        .with_context(|| format!("failed to render page {page}"))?;

    let output =
        output.map(ToOwned::to_owned).unwrap_or_else(|| default_preview_output(file, page));

    if let Some(parent) = output.parent() {
        fs::create_dir_all(parent)?;
    }

    image
        .save(&output)
        .with_context(|| format!("failed to write image to {}", output.display()))?;

    println!("{}", output.display());

    loaded.renderer.close(loaded.handle)?;

    Ok(())
}

fn run_settings(storage: &Storage, reset: bool) -> Result<()> {
    let settings = if reset {
        let defaults = EditorSettings::default();
        storage.save_settings(&defaults).context("failed to write settings")?;
        defaults
    } else {
        storage.load_settings().context("failed to load settings")?
    };

    let json = serde_json::to_string_pretty(&settings)?;
    println!("{json}");

    Ok(())
}

/// Opens `file`, lays out the pages the script asks for, then replays its actions.
fn load_session(storage: &Storage, file: &Path, edits: &Path) -> Result<LoadedSession> {
    ensure_pdf_exists(file)?;

    let script = read_edit_script(edits)?;
    let settings = storage.load_settings().context("failed to load settings")?;
    let bytes = fs::read(file).with_context(|| format!("failed to read {}", file.display()))?;
    let file_name = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.display().to_string());

    let mut renderer = default_renderer(settings.pixels_per_point);
    let (mut session, handle) = EditorSession::open(&mut renderer, file_name, bytes, settings)
        .context("failed to open PDF")?;

    for page in script.render.pages(session.page_count())? {
        session
            .render_page(&renderer, handle, page)
            .with_context(|| format!("failed to render page {page}"))?;
    }

    for (index, action) in script.actions.into_iter().enumerate() {
        session.apply(action).with_context(|| format!("edit action {} failed", index + 1))?;
    }

    Ok(LoadedSession { session, renderer, handle })
}

fn read_edit_script(path: &Path) -> Result<EditScript> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read edit script {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse edit script {}", path.display()))
}

fn ensure_pdf_exists(path: &Path) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("file does not exist: {}", path.display());
    }

    if !path.is_file() {
        anyhow::bail!("path is not a file: {}", path.display());
    }

    Ok(())
}

fn default_preview_output(file: &Path, page: u32) -> PathBuf {
    let stem = file.file_stem().and_then(|name| name.to_str()).unwrap_or("preview");

    file.with_file_name(format!("{stem}-page-{page}-preview.png"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_selection_defaults_to_every_page() {
        let script: EditScript =
            serde_json::from_str(r#"{"actions":[]}"#).expect("script should parse");

        assert_eq!(script.render.pages(3).expect("pages should resolve"), vec![1, 2, 3]);
    }

    #[test]
    fn render_selection_accepts_explicit_pages() {
        let script: EditScript = serde_json::from_str(r#"{"render":[2],"actions":[{"type":"undo"}]}"#)
            .expect("script should parse");

        assert_eq!(script.render.pages(3).expect("pages should resolve"), vec![2]);
        assert_eq!(script.actions, vec![EditorAction::Undo]);
    }

    #[test]
    fn render_selection_rejects_other_keywords() {
        let script: EditScript =
            serde_json::from_str(r#"{"render":"some"}"#).expect("script should parse");

        let error = script.render.pages(2).expect_err("keyword should be rejected");
        assert!(error.to_string().contains("\"some\""));
    }

    #[test]
    fn unknown_script_fields_are_rejected() {
        let parsed = serde_json::from_str::<EditScript>(r#"{"pages":[1]}"#);

        assert!(parsed.is_err());
    }

    #[test]
    fn preview_output_sits_next_to_the_input() {
        let output = default_preview_output(Path::new("/tmp/docs/report.pdf"), 2);

        assert_eq!(output, PathBuf::from("/tmp/docs/report-page-2-preview.png"));
    }
}
