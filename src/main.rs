use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Context};
use bytes::Bytes;
use clap::{Parser, Subcommand};
use markplace::backend::{Document, HttpRenderBackend, PageModifiers, RenderBackend};
use markplace::config::Config;
use markplace::geometry::PageGeometry;
use markplace::preview::{PreviewMode, PreviewSynchronizer, RenderPlan};
use markplace::session::{
    export_document, RemovalEvent, RemovalSession, WatermarkEvent, WatermarkSession,
};
use markplace::watermark::{generate_placements, WatermarkSpec};

/// Markplace - watermark placement and preview for PDF documents
#[derive(Parser, Debug)]
#[command(name = "markplace")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file (defaults apply when it does not exist)
    #[arg(short, long, default_value = "markplace.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the wire placements for one page without contacting the engine
    Plan {
        #[arg(long)]
        width: f64,
        #[arg(long)]
        height: f64,
        /// Watermark recipe (YAML); defaults to the configured one
        #[arg(long)]
        spec: Option<PathBuf>,
    },

    /// Watermark every page of a PDF
    Export {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long)]
        spec: Option<PathBuf>,
        /// Image for image watermarks; its size comes from the recipe
        #[arg(long)]
        watermark_image: Option<PathBuf>,
    },

    /// Render one page as the interactive preview would
    Preview {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        #[arg(long, default_value_t = 0)]
        page: usize,
        #[arg(long)]
        spec: Option<PathBuf>,
    },

    /// Remove text from a PDF
    Remove {
        #[arg(short, long)]
        input: PathBuf,
        #[arg(short, long)]
        output: PathBuf,
        /// Text to remove; exact matches on the analysed page are locked by position
        #[arg(long = "text", required = true)]
        texts: Vec<String>,
        #[arg(long, default_value_t = 0)]
        page: usize,
        /// Also write a preview of the page with the removals applied
        #[arg(long)]
        preview: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = Config::load(&args.config).context("Failed to load configuration")?;

    // A subscriber may already be installed by an embedding process
    let _ = markplace::logging::init_subscriber(&config.logging);

    tracing::info!(
        config_file = %args.config.display(),
        renderer = %config.renderer.base_url,
        layout = ?config.watermark.layout,
        "Configuration loaded"
    );

    match args.command {
        Command::Plan {
            width,
            height,
            spec,
        } => {
            let spec = load_spec(spec.as_deref(), &config)?;
            let page = PageGeometry::new(width, height);
            let placements = generate_placements(&spec, &page, None);
            let modifiers = PageModifiers::single_page(0, placements.to_wire(&spec));
            println!("{}", serde_json::to_string_pretty(&modifiers)?);
        }

        Command::Export {
            input,
            output,
            spec,
            watermark_image,
        } => {
            let backend = HttpRenderBackend::new(&config.renderer)?;
            let spec = load_spec(spec.as_deref(), &config)?;
            let mut session = load_watermark_session(&backend, &input, spec).await?;

            if let Some(path) = watermark_image {
                let (natural_width, natural_height) = match session.spec().image_attributes() {
                    Some(image) => (image.natural_width, image.natural_height),
                    None => bail!("--watermark-image requires an image watermark recipe"),
                };
                let image = tokio::fs::read(&path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?;
                session = session.apply(WatermarkEvent::ImageLoaded {
                    image: Bytes::from(image),
                    natural_width,
                    natural_height,
                });
            }

            let pdf = export_document(&backend, &session).await?;
            write_output(&output, &pdf).await?;
        }

        Command::Preview {
            input,
            output,
            page,
            spec,
        } => {
            let backend = Arc::new(HttpRenderBackend::new(&config.renderer)?);
            let spec = load_spec(spec.as_deref(), &config)?;
            let session = load_watermark_session(&backend, &input, spec)
                .await?
                .apply(WatermarkEvent::PageSelected(page));

            let plan = session
                .preview_plan()
                .context("Page geometry unavailable for preview")?;
            if plan.mode == PreviewMode::Clean {
                tracing::info!(
                    position = ?session.position(),
                    "Single-point layout: rendering clean page, watermark is drawn locally"
                );
            }

            let sync = PreviewSynchronizer::for_watermark(backend, &config.preview);
            let image = render_preview(&sync, plan, &config).await?;
            write_output(&output, &image).await?;
        }

        Command::Remove {
            input,
            output,
            texts,
            page,
            preview,
        } => {
            let backend = Arc::new(HttpRenderBackend::new(&config.renderer)?);
            let document = read_document(&input).await?;
            let info = backend.pdf_info(&document).await?;

            let mut session = RemovalSession::new()
                .apply(RemovalEvent::DocumentLoaded(document.clone()))
                .apply(RemovalEvent::PageCountLoaded(info.page_count))
                .apply(RemovalEvent::PageSelected(page));

            if let Some((page_index, analyze_all)) = session.analysis_request() {
                session = match backend.analyze(&document, page_index, analyze_all).await {
                    Ok(analysis) => session.apply(RemovalEvent::AnalysisLoaded(analysis)),
                    Err(e) => {
                        tracing::warn!(error = %e, "Analysis failed, removing by text only");
                        session.apply(RemovalEvent::AnalysisFailed)
                    }
                };
            }

            for text in texts {
                session = session.apply(RemovalEvent::KeywordAdded(text));
            }
            let pending = session.pending_suggestions();
            if !pending.is_empty() {
                tracing::info!(suggestions = ?pending, "Other repeated text found");
            }

            if let (Some(path), Some(plan)) = (preview, session.preview_plan()) {
                let sync = PreviewSynchronizer::for_removal(backend.clone(), &config.preview);
                let image = render_preview(&sync, plan, &config).await?;
                write_output(&path, &image).await?;
            }

            let pdf = backend
                .reconstruct(&document, &session.export_request())
                .await?;
            write_output(&output, &pdf).await?;
        }
    }

    Ok(())
}

fn load_spec(path: Option<&Path>, config: &Config) -> anyhow::Result<WatermarkSpec> {
    let spec = match path {
        Some(path) => {
            let yaml = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_yaml::from_str(&yaml)
                .with_context(|| format!("Invalid watermark recipe in {}", path.display()))?
        }
        None => config.watermark.clone(),
    };
    spec.validate()?;
    Ok(spec)
}

async fn render_preview(
    sync: &PreviewSynchronizer<HttpRenderBackend>,
    plan: RenderPlan,
    config: &Config,
) -> anyhow::Result<Bytes> {
    let limit = Duration::from_secs(config.renderer.timeout_seconds);
    let frame = sync
        .render(plan, limit)
        .await
        .context("Preview render failed, see the warning above")?;
    Ok(frame.image)
}

async fn read_document(path: &Path) -> anyhow::Result<Document> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document.pdf".to_string());
    Ok(Document::new(name, bytes))
}

async fn load_watermark_session(
    backend: &HttpRenderBackend,
    input: &Path,
    spec: WatermarkSpec,
) -> anyhow::Result<WatermarkSession> {
    let document = read_document(input).await?;
    let session = WatermarkSession::new(spec);
    let session = match backend.pdf_info(&document).await {
        Ok(info) => session.apply(WatermarkEvent::DocumentLoaded { document, info }),
        Err(e) => {
            tracing::warn!(error = %e, "pdf-info failed");
            session.apply(WatermarkEvent::DocumentInfoFailed { document })
        }
    };
    Ok(session)
}

async fn write_output(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    tokio::fs::write(path, bytes)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    tracing::info!(output = %path.display(), bytes = bytes.len(), "Output written");
    Ok(())
}
