use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};

use orbis_core::{
    Annotator, Config, ImagePayload, Viewer,
    consts::DEFAULT_MODEL_INFO,
    export::{draw::load_font, export_to_dir, overlay::overlays},
};

#[derive(Parser)]
#[command(name = "annotate")]
#[command(about = "Detect safety equipment in an image and export the annotations")]
struct Args {
    #[arg(help = "Input image path", required_unless_present = "model_info")]
    input: Option<PathBuf>,

    #[arg(long, help = "Confidence threshold (0-1), applied after --optimize")]
    confidence: Option<f64>,

    #[arg(long, help = "IoU threshold (0-1), applied after --optimize")]
    iou: Option<f64>,

    #[arg(long, help = "Ask the recommendation service for thresholds first")]
    optimize: bool,

    #[arg(short, long, default_value = "annotated", help = "Output directory")]
    output: PathBuf,

    #[arg(long, help = "Image name recorded in the exported metadata")]
    image_name: Option<String>,

    #[arg(long, help = "Print information about the detection model")]
    model_info: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("orbis_core=info")),
        )
        .init();

    let args = Args::parse();

    if args.model_info {
        println!("{}", serde_json::to_string_pretty(&DEFAULT_MODEL_INFO)?);
        if args.input.is_none() {
            return Ok(());
        }
    }

    let input = args.input.context("an input image is required")?;
    let config = Config::from_env();
    let font = match config.font_path.as_ref().map(load_font).transpose() {
        Ok(font) => font,
        Err(err) => {
            warn!("labels will not be drawn: {}", err);
            None
        }
    };

    let bytes = tokio::fs::read(&input)
        .await
        .with_context(|| format!("failed to read {}", input.display()))?;
    let source = ImagePayload::from_bytes(bytes)
        .with_context(|| format!("{} is not a supported image", input.display()))?;

    let mut viewer = Viewer::new(Annotator::from_config(&config));

    if args.optimize {
        let params = viewer
            .optimize_parameters()
            .await
            .context("parameter optimisation failed")?;
        info!(
            "using recommended confidence {} and iou {}",
            params.confidence_threshold, params.iou_threshold
        );
        if let Some(note) = viewer.optimization_note() {
            println!("Optimization: {note}");
        }
    }

    let mut params = viewer.params();
    if let Some(confidence) = args.confidence {
        params.confidence_threshold = confidence;
    }
    if let Some(iou) = args.iou {
        params.iou_threshold = iou;
    }
    viewer.set_params(params);

    info!("Input image: {}", input.display());
    let image = viewer
        .submit(source)
        .await
        .context("detection round failed")?;

    if image.is_empty() {
        println!("No objects detected.");
        return Ok(());
    }

    println!("Detected {} objects:", image.detections().len());
    for (label, count) in image.label_counts() {
        println!("  {label}: {count}");
    }
    for overlay in overlays(image) {
        println!("  - {}", overlay.aria_label());
    }

    let paths = export_to_dir(
        image,
        args.image_name.as_deref(),
        font.as_ref(),
        &args.output,
    )?;
    println!("Annotated image: {}", paths.annotated_png.display());
    println!("Metadata: {}", paths.metadata_json.display());

    Ok(())
}
