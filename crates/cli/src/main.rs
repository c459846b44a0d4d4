use std::error::Error;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use vsmp_core::config::config_store::ConfigStore;
use vsmp_core::display::domain::display_sink::DisplaySink;
#[cfg(all(target_os = "linux", feature = "epaper"))]
use vsmp_core::display::infrastructure::epaper_display::EPaperDisplay;
#[cfg(all(target_os = "linux", feature = "epaper"))]
use vsmp_core::display::infrastructure::linux_panel_bus::LinuxPanelBus;
#[cfg(not(all(target_os = "linux", feature = "epaper")))]
use vsmp_core::display::infrastructure::png_file_sink::PngFileSink;
use vsmp_core::pipeline::play_movies_use_case::PlayMoviesUseCase;
use vsmp_core::playback::domain::state_manager::PlaybackStateManager;
use vsmp_core::playback::infrastructure::json_state_store::JsonStateStore;
use vsmp_core::schedule::infrastructure::system_clock::SystemClock;
#[cfg(not(all(target_os = "linux", feature = "epaper")))]
use vsmp_core::shared::constants::PREVIEW_FILE_NAME;
use vsmp_core::shared::constants::{PANEL_HEIGHT, PANEL_WIDTH};
use vsmp_core::video::infrastructure::ffmpeg_decoder::FfmpegOpener;

/// Very slow movie player: shows one dithered frame at a time on a 7.5"
/// e-paper panel, resuming where it left off after a restart.
#[derive(Parser, Debug)]
#[command(name = "vsmp", version)]
struct Cli {
    /// Configuration directory holding options.json and state.json
    /// (default: ~/.vsmp).
    #[arg(long)]
    config_dir: Option<PathBuf>,

    /// Draw the configured visible region on the panel and exit.
    #[arg(long)]
    test: bool,

    /// PNG file receiving frames when no panel is attached
    /// (default: <config dir>/frame.png).
    #[arg(long)]
    preview: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let config_dir = match &cli.config_dir {
        Some(dir) => dir.clone(),
        None => ConfigStore::default_dir()?,
    };
    let store = ConfigStore::new(config_dir);
    let options = store.load_options()?;
    options.validate(PANEL_WIDTH, PANEL_HEIGHT)?;

    let mut display = build_display(&cli, &store)?;
    display.init()?;

    if cli.test {
        display.test_pattern(&options)?;
        log::info!(
            "Test pattern drawn at {},{} size {}x{}",
            options.offset_x,
            options.offset_y,
            options.width,
            options.height
        );
        return Ok(());
    }

    let state_manager = PlaybackStateManager::new(
        Box::new(JsonStateStore::new(store.state_path())),
        options.path.clone(),
    );
    let mut use_case = PlayMoviesUseCase::new(
        Box::new(FfmpegOpener::new()),
        display,
        Box::new(SystemClock::new()),
        state_manager,
        options,
        PANEL_WIDTH,
        PANEL_HEIGHT,
    );
    use_case.run()?;
    Ok(())
}

#[cfg(all(target_os = "linux", feature = "epaper"))]
fn build_display(_cli: &Cli, _store: &ConfigStore) -> Result<Box<dyn DisplaySink>, Box<dyn Error>> {
    Ok(Box::new(EPaperDisplay::new(LinuxPanelBus::open()?)))
}

#[cfg(not(all(target_os = "linux", feature = "epaper")))]
fn build_display(cli: &Cli, store: &ConfigStore) -> Result<Box<dyn DisplaySink>, Box<dyn Error>> {
    let path = cli
        .preview
        .clone()
        .unwrap_or_else(|| store.dir().join(PREVIEW_FILE_NAME));
    Ok(Box::new(PngFileSink::new(path, PANEL_WIDTH, PANEL_HEIGHT)))
}

fn validate(cli: &Cli) -> Result<(), Box<dyn Error>> {
    if cfg!(all(target_os = "linux", feature = "epaper")) && cli.preview.is_some() {
        return Err("--preview is only available when built without the epaper feature".into());
    }
    if let Some(dir) = &cli.config_dir {
        if dir.exists() && !dir.is_dir() {
            return Err(format!("Config dir is not a directory: {}", dir.display()).into());
        }
    }
    if let Some(preview) = &cli.preview {
        if preview.is_dir() {
            return Err(format!("Preview path is a directory: {}", preview.display()).into());
        }
    }
    Ok(())
}
