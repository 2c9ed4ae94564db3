use std::{
    cell::RefCell,
    path::{Path, PathBuf},
    rc::Rc,
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

use cinescroll::{
    CineResult, DeviceSize, DriverState, Experience, FrameCanvas, FrameImage, FsFrameLoader,
    IntersectionEntry, ListenerLedger, MediaElement, PlaybackSession, Progress, RasterCanvas,
    SceneDriver, SceneSurface, SurfaceProvider, VideoSource, Viewport, VisualSource,
};

#[derive(Parser, Debug)]
#[command(name = "cinescroll", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate an experience file and print a scene summary.
    Check(CheckArgs),
    /// Simulate a full scroll (or carousel swipe) and print every tick as JSON.
    Sweep(SweepArgs),
    /// Drive one frame-sequence scene to a progress value and write its canvas as a PNG.
    Frame(FrameArgs),
}

#[derive(Parser, Debug)]
struct CheckArgs {
    /// Input experience JSON.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug, Clone, Copy)]
struct ViewportArgs {
    /// Viewport width in CSS pixels.
    #[arg(long, default_value_t = 1280.0)]
    width: f64,

    /// Viewport height in CSS pixels.
    #[arg(long, default_value_t = 720.0)]
    height: f64,

    /// Device pixel ratio.
    #[arg(long, default_value_t = 1.0)]
    dpr: f64,
}

impl ViewportArgs {
    fn viewport(self) -> anyhow::Result<Viewport> {
        Ok(Viewport::new(self.width, self.height)?.with_device_pixel_ratio(self.dpr)?)
    }
}

#[derive(Parser, Debug)]
struct SweepArgs {
    /// Input experience JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    #[command(flatten)]
    viewport: ViewportArgs,

    /// Number of scroll samples between the top and the bottom of the page.
    #[arg(long, default_value_t = 24)]
    steps: u32,

    /// Duration reported for every video scene, in seconds.
    #[arg(long, default_value_t = 10.0)]
    duration: f64,

    /// Run the small-viewport carousel instead of the scroll stack.
    #[arg(long)]
    small: bool,

    /// Time between carousel swipes, in milliseconds.
    #[arg(long, default_value_t = 1500)]
    swipe_ms: u64,
}

#[derive(Parser, Debug)]
struct FrameArgs {
    /// Input experience JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Scene index (0-based).
    #[arg(long)]
    scene: usize,

    /// Scene progress in [0, 1].
    #[arg(long)]
    progress: f64,

    /// Output PNG path.
    #[arg(long)]
    out: PathBuf,

    #[command(flatten)]
    viewport: ViewportArgs,

    /// Use the scene's small-viewport visual, if it has one.
    #[arg(long)]
    small: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Check(args) => cmd_check(args),
        Command::Sweep(args) => cmd_sweep(args),
        Command::Frame(args) => cmd_frame(args),
    }
}

fn read_experience(path: &Path) -> anyhow::Result<Experience> {
    Experience::from_json_file(path)
        .with_context(|| format!("load experience '{}'", path.display()))
}

fn assets_root(in_path: &Path) -> &Path {
    in_path.parent().unwrap_or_else(|| Path::new("."))
}

fn cmd_check(args: CheckArgs) -> anyhow::Result<()> {
    let exp = read_experience(&args.in_path)?;
    for (index, scene) in exp.scenes.iter().enumerate() {
        let source = match &scene.visual {
            VisualSource::Video(v) => v.source.clone(),
            VisualSource::Frames(f) => format!("{} ({} frames)", f.folder, f.frame_count),
        };
        let small = scene
            .small_viewport_visual
            .as_ref()
            .map(|v| format!(" small={}", v.kind_name()))
            .unwrap_or_default();
        println!(
            "scene {index}: {} {source} overlays={} spacer={}vh{small}",
            scene.visual.kind_name(),
            scene.overlays.len(),
            scene.spacer_ratio(&exp.config) * 100.0,
        );
    }
    println!("ok: {} scenes", exp.scenes.len());
    Ok(())
}

/// Media element for headless runs; seeks and play state only show up in trace logs.
#[derive(Debug)]
struct StubMedia {
    scene: usize,
}

impl MediaElement for StubMedia {
    fn set_current_time(&mut self, seconds: f64) {
        tracing::trace!(scene = self.scene, seconds, "seek");
    }

    fn play(&mut self) -> CineResult<()> {
        tracing::trace!(scene = self.scene, "play");
        Ok(())
    }

    fn pause(&mut self) {
        tracing::trace!(scene = self.scene, "pause");
    }
}

/// Canvas handle that lets the CLI read pixels back after the driver drew them.
#[derive(Clone)]
struct SharedRaster(Rc<RefCell<RasterCanvas>>);

impl FrameCanvas for SharedRaster {
    fn resize(&mut self, size: DeviceSize) {
        self.0.borrow_mut().resize(size);
    }

    fn size(&self) -> DeviceSize {
        self.0.borrow().size()
    }

    fn clear(&mut self) {
        self.0.borrow_mut().clear();
    }

    fn draw_frame(&mut self, frame: &FrameImage) {
        self.0.borrow_mut().draw_frame(frame);
    }
}

struct CliSurfaces {
    initial: DeviceSize,
}

impl SurfaceProvider for CliSurfaces {
    fn surface_for(&mut self, scene: usize, visual: &VisualSource) -> CineResult<SceneSurface> {
        Ok(match visual {
            VisualSource::Video(_) => SceneSurface::Media(Box::new(StubMedia { scene })),
            VisualSource::Frames(_) => SceneSurface::Canvas(Box::new(RasterCanvas::new(self.initial))),
        })
    }

    fn media_for(&mut self, scene: usize, _video: &VideoSource) -> CineResult<Box<dyn MediaElement>> {
        Ok(Box::new(StubMedia { scene }))
    }
}

fn print_json(value: &serde_json::Value) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string(value).context("serialize tick")?);
    Ok(())
}

fn cmd_sweep(args: SweepArgs) -> anyhow::Result<()> {
    let exp = read_experience(&args.in_path)?;
    let viewport = args.viewport.viewport()?;
    let mut provider = CliSurfaces {
        initial: viewport.device_size(),
    };
    let mut host = ListenerLedger::new();
    let mut session = PlaybackSession::new(&exp, viewport, args.small, &mut provider)?;
    session.attach(&mut host);

    if args.small {
        let mut now_ms = 0u64;
        for index in 0..exp.scenes.len() {
            let entry = IntersectionEntry {
                index,
                visible_ratio: 1.0,
            };
            let tick = session.on_intersection(now_ms, &[entry]);
            print_json(&serde_json::json!({ "now_ms": now_ms, "tick": tick }))?;
            now_ms += args.swipe_ms;
        }
        let settle = now_ms + exp.config.settle_delay_ms;
        let tick = session.tick(settle);
        print_json(&serde_json::json!({ "now_ms": settle, "tick": tick }))?;
    } else {
        let loader = FsFrameLoader::new(assets_root(&args.in_path));
        for (index, scene) in exp.scenes.iter().enumerate() {
            match scene.visual_for(false) {
                VisualSource::Video(_) => {
                    session.on_media_metadata(index, args.duration);
                }
                VisualSource::Frames(seq) => loader.load_each(seq, |slot, result| {
                    session.on_frame_resolved(index, slot, result);
                }),
            }
        }

        let max_scroll = session
            .as_stack()
            .map(|s| s.layout().max_scroll(viewport))
            .unwrap_or(0.0);
        let steps = args.steps.max(1);
        for step in 0..=steps {
            let scroll_top = max_scroll * f64::from(step) / f64::from(steps);
            let tick = session.on_scroll(scroll_top);
            print_json(&serde_json::json!({ "scroll_top": scroll_top, "tick": tick }))?;
        }
    }

    session.teardown(&mut host);
    anyhow::ensure!(
        host.active().is_empty(),
        "{} listeners still registered after teardown",
        host.active().len()
    );
    Ok(())
}

fn cmd_frame(args: FrameArgs) -> anyhow::Result<()> {
    let exp = read_experience(&args.in_path)?;
    let viewport = args.viewport.viewport()?;
    let scene = exp
        .scenes
        .get(args.scene)
        .with_context(|| format!("scene {} out of range ({} scenes)", args.scene, exp.scenes.len()))?;
    let visual = scene.visual_for(args.small);
    let VisualSource::Frames(seq) = visual else {
        anyhow::bail!("scene {} is not a frame sequence", args.scene);
    };

    let canvas = SharedRaster(Rc::new(RefCell::new(RasterCanvas::new(viewport.device_size()))));
    let mut driver = SceneDriver::new(
        args.scene,
        scene,
        visual,
        SceneSurface::Canvas(Box::new(canvas.clone())),
        &exp.config,
    )?;

    let mut host = ListenerLedger::new();
    driver.attach(&mut host);
    driver.on_resize(viewport);
    FsFrameLoader::new(assets_root(&args.in_path))
        .load_each(seq, |slot, result| {
            driver.on_frame_resolved(slot, result);
        });
    anyhow::ensure!(
        driver.state() == DriverState::Ready,
        "scene {} did not become ready",
        args.scene
    );

    let update = driver
        .on_progress(Progress::new(args.progress))
        .context("driver produced no update")?;
    driver.teardown(&mut host);
    eprintln!("{}", serde_json::to_string(&update).context("serialize update")?);

    let img = canvas
        .0
        .borrow()
        .to_image()
        .context("canvas buffer does not match its size")?;

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    img.save_with_format(&args.out, image::ImageFormat::Png)
        .with_context(|| format!("write png '{}'", args.out.display()))?;

    eprintln!("wrote {}", args.out.display());
    Ok(())
}
