use std::{
    future::Future,
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(name = "auramatic", version)]
struct Cli {
    /// JSON configuration file. Environment variables override it.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Use the offline mock provider even when an API key is set.
    #[arg(long, global = true)]
    mock: bool,

    /// Log filter, e.g. `debug` or `auramatic=trace`. Defaults to `RUST_LOG`, then `info`.
    #[arg(long, global = true)]
    log: Option<String>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate an image from a prompt.
    Image(ImageArgs),
    /// Generate a video from a prompt and an optional source image.
    Video(VideoArgs),
    /// Edit an image with one of the editor tools.
    Edit(EditArgs),
}

#[derive(Args, Debug)]
struct ImageArgs {
    /// What to draw.
    #[arg(long)]
    prompt: String,

    /// Style name, e.g. "Anime" or "Ghibli".
    #[arg(long, default_value = auramatic::DEFAULT_STYLE)]
    style: String,

    /// Aspect ratio: 1:1, 4:3, 3:4, 16:9 or 9:16.
    #[arg(long, default_value = "1:1")]
    aspect: String,

    /// Output path. Defaults to a name derived from the prompt.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct VideoArgs {
    /// What should happen in the video.
    #[arg(long)]
    prompt: String,

    /// Aspect ratio label or prefix, e.g. "9:16".
    #[arg(long, default_value = "16:9")]
    aspect: String,

    /// Source image for image-to-video.
    #[arg(long)]
    image: Option<PathBuf>,

    /// Output path for a downloaded video. Defaults to a name derived from the prompt.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ToolChoice {
    Background,
    Text,
    Object,
    Enhancer,
}

impl From<ToolChoice> for auramatic::EditTool {
    fn from(c: ToolChoice) -> Self {
        match c {
            ToolChoice::Background => auramatic::EditTool::Background,
            ToolChoice::Text => auramatic::EditTool::Text,
            ToolChoice::Object => auramatic::EditTool::Object,
            ToolChoice::Enhancer => auramatic::EditTool::Enhancer,
        }
    }
}

#[derive(Args, Debug)]
struct EditArgs {
    /// Tool to run.
    #[arg(long, value_enum)]
    tool: ToolChoice,

    /// Image to edit.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Painted stroke in image pixels, `x,y;x,y;...`. Repeat for several strokes. Selects brush mode.
    #[arg(long = "stroke")]
    strokes: Vec<String>,

    /// Erased stroke in image pixels, applied after the painted ones.
    #[arg(long = "erase")]
    erases: Vec<String>,

    /// Brush diameter in canvas pixels.
    #[arg(long)]
    brush: Option<f64>,

    /// Also write the exported mask here.
    #[arg(long)]
    mask_out: Option<PathBuf>,

    /// Output path. Defaults to `edited_{tool}_{id}.png`.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    auramatic::init_logging(auramatic::LoggingConfig {
        env_filter: cli.log.clone(),
        ansi: false,
    });

    let mut config = match &cli.config {
        Some(path) => auramatic::StudioConfig::from_path(path)?.with_env_overrides(),
        None => auramatic::StudioConfig::from_env(),
    };
    if cli.mock {
        config.api_key = None;
    }
    let studio = auramatic::Studio::from_config(config)?;

    match cli.cmd {
        Command::Image(args) => cmd_image(&studio, args).await,
        Command::Video(args) => cmd_video(&studio, args).await,
        Command::Edit(args) => cmd_edit(&studio, args).await,
    }
}

type Studio = auramatic::Studio<auramatic::AnyProvider>;

fn write_output(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output directory '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write '{}'", path.display()))?;
    println!("{}", path.display());
    Ok(())
}

async fn finish(
    site: &auramatic::ActionSite,
    fut: impl Future<Output = auramatic::StudioResult<Arc<auramatic::GenerationResult>>>,
) -> anyhow::Result<Arc<auramatic::GenerationResult>> {
    match fut.await {
        Ok(result) => Ok(result),
        Err(err) => {
            let shown = site
                .state()
                .failure()
                .map(|f| f.message.clone())
                .unwrap_or_else(|| err.user_message());
            Err(anyhow::Error::new(err).context(shown))
        }
    }
}

fn parse_stroke(text: &str) -> anyhow::Result<Vec<auramatic::Point>> {
    text.split(';')
        .filter(|s| !s.trim().is_empty())
        .map(|pair| {
            let (x, y) = pair
                .split_once(',')
                .with_context(|| format!("stroke point '{pair}' must be 'x,y'"))?;
            let x: f64 = x.trim().parse().with_context(|| format!("bad x in '{pair}'"))?;
            let y: f64 = y.trim().parse().with_context(|| format!("bad y in '{pair}'"))?;
            Ok(auramatic::Point::new(x, y))
        })
        .collect()
}

async fn cmd_image(studio: &Studio, args: ImageArgs) -> anyhow::Result<()> {
    let mut form = studio.image_generator();
    form.set_prompt(args.prompt);
    form.set_style(&args.style)?;
    form.set_aspect_ratio(auramatic::AspectRatio::parse(&args.aspect)?);

    let result = finish(form.site(), form.generate()).await?;
    let bytes = result.output.bytes().context("image result carries no bytes")?;
    let out = args.out.unwrap_or_else(|| PathBuf::from(result.download_name()));
    write_output(&out, bytes)
}

async fn cmd_video(studio: &Studio, args: VideoArgs) -> anyhow::Result<()> {
    let mut form = studio.video_generator();
    form.set_prompt(args.prompt);
    form.set_aspect_ratio(&args.aspect)?;
    if let Some(path) = &args.image {
        let bytes =
            std::fs::read(path).with_context(|| format!("read source image '{}'", path.display()))?;
        form.set_source_image(bytes)?;
        form.set_tab(auramatic::VideoTab::ImageToVideo);
    }

    let mut progress = form.site().subscribe_progress();
    let job = finish(form.site(), form.generate());
    tokio::pin!(job);
    let result = loop {
        tokio::select! {
            res = &mut job => break res?,
            changed = progress.changed() => {
                if changed.is_err() {
                    break (&mut job).await?;
                }
                if let Some(message) = progress.borrow_and_update().clone() {
                    eprintln!("{message}");
                }
            }
        }
    };

    match &result.output {
        auramatic::MediaRef::Video(auramatic::VideoResource::Inline(media)) => {
            let out = args.out.unwrap_or_else(|| PathBuf::from(result.download_name()));
            write_output(&out, media.bytes.as_slice())
        }
        other => {
            println!("{}", other.display_url());
            Ok(())
        }
    }
}

fn check_edit_args(args: &EditArgs) -> anyhow::Result<()> {
    let tool = auramatic::EditTool::from(args.tool);
    let brush_flags = !args.strokes.is_empty()
        || !args.erases.is_empty()
        || args.brush.is_some()
        || args.mask_out.is_some();
    if tool.runs_on_upload() && brush_flags {
        anyhow::bail!(
            "{} runs on upload and takes no mask; drop --stroke, --erase, --brush and --mask-out",
            tool.name()
        );
    }
    Ok(())
}

async fn cmd_edit(studio: &Studio, args: EditArgs) -> anyhow::Result<()> {
    check_edit_args(&args)?;
    let mut editor = studio.editor();
    editor.select_tool(args.tool.into());
    if let Some(d) = args.brush {
        editor.set_brush_diameter(d);
    }

    let bytes = std::fs::read(&args.in_path)
        .with_context(|| format!("read image '{}'", args.in_path.display()))?;
    let auto_run = editor.upload(bytes)?;

    let result = match auto_run {
        Some(fut) => finish(editor.site(), fut).await?,
        None => {
            let passes = args
                .strokes
                .iter()
                .map(|s| (auramatic::BrushMode::Paint, s))
                .chain(args.erases.iter().map(|s| (auramatic::BrushMode::Erase, s)));
            for (mode, stroke) in passes {
                editor.set_brush_mode(mode);
                let points = parse_stroke(stroke)?;
                let surface = editor.surface().context("no canvas after upload")?;
                let mapped: Vec<_> = points.iter().map(|&p| surface.map_image_point(p)).collect();
                if let Some((&first, rest)) = mapped.split_first() {
                    editor.pointer_down(first);
                    for &p in rest {
                        editor.pointer_move(p);
                    }
                    editor.pointer_up()?;
                }
            }
            if let (Some(path), Some(mask)) = (&args.mask_out, editor.mask_snapshot()) {
                write_output(path, mask.bytes.as_slice())?;
            }
            if !args.strokes.is_empty() {
                editor.set_mode(auramatic::EditMode::Brush)?;
            }
            finish(editor.site(), editor.apply()).await?
        }
    };

    let bytes = result.output.bytes().context("edit result carries no bytes")?;
    let out = args.out.unwrap_or_else(|| PathBuf::from(result.download_name()));
    write_output(&out, bytes)
}
