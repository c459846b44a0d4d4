/// Physical resolution of the 7.5" e-paper panel.
pub const PANEL_WIDTH: u32 = 800;
pub const PANEL_HEIGHT: u32 = 480;

/// Extensions (suffix match, case-sensitive) eligible for the catalog.
pub const MOVIE_EXTENSIONS: &[&str] = &["mp4", "mkv", "avi"];

/// Progress is written to disk once per this many rendered frames.
pub const PERSIST_EVERY: u32 = 10;

/// Forward gaps (in pts units) above this use a backend seek first.
pub const COARSE_SEEK_THRESHOLD: i64 = 1000;

/// Coarse seeks land at this fraction of the target to avoid overshoot.
pub const COARSE_SEEK_FRACTION: f64 = 0.95;

pub const CONFIG_DIR_NAME: &str = ".vsmp";
pub const OPTIONS_FILE_NAME: &str = "options.json";
pub const STATE_FILE_NAME: &str = "state.json";
pub const DEFAULT_MOVIES_DIR_NAME: &str = "movies";
pub const PREVIEW_FILE_NAME: &str = "frame.png";
