use anyhow::{Context, bail};
use log::info;
use pixel_sort::utils::image_helper;
use pixel_sort::{Configuration, Control, Effect, ParallelPipeline, PixelBuffer, Session};
use std::env;
use std::path::{Path, PathBuf};

const USAGE: &str = "Usage: sort_tester [--config <file.json>] [--keys <keys>] [--frames <n>] <output_dir> <image>...";

struct Args {
    config: Option<PathBuf>,
    keys: String,
    frames: usize,
    output_dir: PathBuf,
    images: Vec<PathBuf>,
}

fn parse_args() -> anyhow::Result<Args> {
    let mut config = None;
    let mut keys = String::new();
    let mut frames = 1;
    let mut positional = Vec::new();

    let mut args = env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => config = Some(PathBuf::from(args.next().context("--config needs a path")?)),
            "--keys" => keys = args.next().context("--keys needs a value")?,
            "--frames" => {
                frames = args
                    .next()
                    .context("--frames needs a count")?
                    .parse()
                    .context("--frames must be a number")?
            }
            _ => positional.push(PathBuf::from(arg)),
        }
    }

    if positional.len() < 2 {
        bail!(USAGE);
    }
    let output_dir = positional.remove(0);
    Ok(Args {
        config,
        keys,
        frames: frames.max(1),
        output_dir,
        images: positional,
    })
}

fn load_images(paths: &[PathBuf]) -> anyhow::Result<Vec<PixelBuffer>> {
    paths
        .iter()
        .map(|path| {
            image_helper::load(path).with_context(|| format!("failed to load {}", path.display()))
        })
        .collect()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // --- 1. Argument Parsing & Setup ---
    let args = parse_args()?;
    let config = match &args.config {
        Some(path) => Configuration::load(path)
            .with_context(|| format!("failed to read config {}", path.display()))?,
        None => Configuration::default(),
    };
    let images = load_images(&args.images)?;
    std::fs::create_dir_all(&args.output_dir)
        .with_context(|| format!("failed to create {}", args.output_dir.display()))?;

    // --- 2. Apply scripted controls, the way a host applies key presses ---
    let mut session = Session::new(config, images.len());
    for key in args.keys.chars() {
        match Control::from_key(key) {
            Some(control) => {
                if let Effect::ImageChanged(index) = session.apply(control) {
                    info!("Switched to {}", args.images[index].display());
                }
            }
            None => info!("Ignoring unbound key {:?}", key),
        }
    }
    for line in session.summary() {
        info!("{}", line);
    }

    // --- 3. Main Processing Loop ---
    let pipeline = ParallelPipeline::new();
    let source = &images[session.image_index()];
    for frame in 0..args.frames {
        let output = if session.show_mask {
            pixel_sort::core_modules::mask::render_mask(source, &session.config)?
        } else {
            let (sorted, report) = pipeline
                .render_frame(source.clone(), &session.config, &session.animation)
                .await?;
            info!(
                "Frame {}: {} runs sorted across {} lines ({} demoted)",
                frame, report.sorted_runs, report.lines, report.demoted_runs
            );
            sorted
        };

        write_frame(&args.output_dir, frame, &output)?;
        session.tick();
    }

    info!("Processing complete. Output saved to {}", args.output_dir.display());
    Ok(())
}

fn write_frame(output_dir: &Path, frame: usize, buffer: &PixelBuffer) -> anyhow::Result<()> {
    let path = output_dir.join(format!("frame_{:04}.png", frame));
    image_helper::save(&path, buffer).with_context(|| format!("failed to write {}", path.display()))
}
