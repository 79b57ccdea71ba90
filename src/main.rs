use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{ArgAction, Parser};
use image::RgbaImage;

use pageshot::capture::open_capture;
use pageshot::config::PdfLayout;
use pageshot::export::{self, clipboard, pdf, png};
use pageshot::session::messages::parse_script;
use pageshot::{EditorConfig, EditorSession, Renderer};

/// Annotate a captured web page and export the result
#[derive(Parser, Debug)]
#[command(name = "pageshot", version, about = "Annotate and export captured web pages")]
struct Args {
    /// Capture hand-off record (`{screenshots, meta}` JSON)
    #[arg(value_name = "SESSION")]
    session: PathBuf,

    /// JSON array of editor commands to replay before exporting
    #[arg(long, value_name = "FILE")]
    script: Option<PathBuf>,

    /// Directory for exported files; defaults to the configured save location
    #[arg(long, value_name = "DIR")]
    out: Option<PathBuf>,

    /// Save a PNG (the default when no other export is requested)
    #[arg(long)]
    png: bool,

    /// Save a PDF, optionally choosing the layout: single or paged
    #[arg(long, value_name = "LAYOUT", num_args = 0..=1)]
    pdf: Option<Option<PdfLayout>>,

    /// Copy the flattened image to the clipboard
    #[arg(long)]
    clipboard: bool,

    /// Also write the live display (with editing aids) to this PNG
    #[arg(long, value_name = "FILE")]
    preview: Option<PathBuf>,

    /// Configuration file; defaults to the platform config directory
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// More logging (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let level = match args.verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let config = EditorConfig::load(args.config.as_deref());
    let (base, meta) = open_capture(&args.session)
        .await
        .with_context(|| format!("Failed to open {}", args.session.display()))?;
    let mut session = EditorSession::new(base, &config).with_meta(meta);

    if let Some(script) = &args.script {
        replay(&mut session, script)?;
    }

    let renderer = Renderer::from_config(&config);
    if let Some(path) = &args.preview {
        let surface = session
            .render_display(&renderer)
            .context("Failed to allocate the display surface")?;
        png::save_png(&surface.to_rgba(), path).context("Failed to write preview")?;
    }

    // everything below works on the snapshot, never on the live session
    let frame = session.snapshot();
    let title = frame.title().map(str::to_string);
    let flattened = tokio::task::spawn_blocking(move || frame.flatten(&renderer))
        .await
        .context("Render task failed")?
        .context("Failed to flatten the annotated image")?;

    let want_png = args.png || (args.pdf.is_none() && !args.clipboard);
    let mut failures = 0;

    if want_png {
        failures += report(save_png(&flattened, args.out.as_deref(), &config));
    }
    if let Some(layout) = args.pdf {
        let options = pdf::PdfOptions {
            page_size: config.pdf_page_size,
            layout: layout.unwrap_or(config.pdf_layout),
            title,
        };
        failures += report(save_pdf(&flattened, args.out.as_deref(), &config, &options));
    }
    if args.clipboard || (want_png && config.copy_to_clipboard_on_save) {
        failures += report(clipboard::copy_image(&flattened).context("Failed to copy to clipboard"));
    }

    if failures > 0 {
        anyhow::bail!("{failures} export(s) failed");
    }
    Ok(())
}

fn replay(session: &mut EditorSession, script: &Path) -> anyhow::Result<()> {
    let text = std::fs::read_to_string(script)
        .with_context(|| format!("Failed to read {}", script.display()))?;
    let commands =
        parse_script(&text).with_context(|| format!("Invalid command script {}", script.display()))?;

    log::info!("Replaying {} command(s)", commands.len());
    let mut changed = 0;
    for command in commands {
        let update = session.dispatch(command);
        if update.needs_redraw() {
            changed += 1;
            log::debug!("-> {:?}", update);
        }
    }
    log::info!("{} command(s) changed the canvas", changed);
    Ok(())
}

fn save_png(image: &RgbaImage, out: Option<&Path>, config: &EditorConfig) -> anyhow::Result<()> {
    let path = export::output_path(out, config.save_location, "png")
        .context("No directory to save the PNG in")?;
    png::save_png(image, &path).with_context(|| format!("Failed to save {}", path.display()))?;
    println!("{}", path.display());
    Ok(())
}

fn save_pdf(
    image: &RgbaImage,
    out: Option<&Path>,
    config: &EditorConfig,
    options: &pdf::PdfOptions,
) -> anyhow::Result<()> {
    let path = export::output_path(out, config.save_location, "pdf")
        .context("No directory to save the PDF in")?;
    pdf::save_pdf(image, &path, options)
        .with_context(|| format!("Failed to save {}", path.display()))?;
    println!("{}", path.display());
    Ok(())
}

fn report(result: anyhow::Result<()>) -> usize {
    match result {
        Ok(()) => 0,
        Err(err) => {
            log::error!("{:#}", err);
            1
        }
    }
}
