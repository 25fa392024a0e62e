/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::domain::activity::{DEFAULT_CAPACITY, DEFAULT_DELIMITER};

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub data: DataConfig,
    pub timing: TimingConfig,
    pub losing: LosingConfig,
    pub log: LogConfig,
    pub image_cache_entries: usize,
}

#[derive(Clone, Debug)]
pub struct DataConfig {
    pub catalog_file: PathBuf,
    pub ledger_file: PathBuf,
    pub assets_dir: PathBuf,
    pub delimiter: char,
    pub capacity: usize,
}

#[derive(Clone, Debug)]
pub struct TimingConfig {
    pub poll_sleep: Duration,
    pub flash_period: Duration,
    pub reveal_steps: u32,
    pub reveal_step: Duration,
    pub reveal_hold: Duration,
    pub verdict_frames: u32,       // correct/incorrect animation length
    pub verdict_frame: Duration,
    pub verdict_hold: Duration,
    pub slide_steps: u32,
    pub slide_step: Duration,
    pub losing_frame: Duration,    // 40ms = 25 FPS
}

#[derive(Clone, Debug)]
pub struct LosingConfig {
    /// Frame count per looping clip; clip `n` lives in folder `n + 1`.
    pub clip_frames: Vec<u32>,
}

#[derive(Clone, Debug)]
pub struct LogConfig {
    pub level: String,
    pub file: PathBuf,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    data: TomlData,
    #[serde(default)]
    timing: TomlTiming,
    #[serde(default)]
    losing: TomlLosing,
    #[serde(default)]
    log: TomlLog,
    #[serde(default)]
    display: TomlDisplay,
}

#[derive(Deserialize, Debug)]
struct TomlData {
    #[serde(default = "default_catalog_file")]
    catalog_file: String,
    #[serde(default = "default_ledger_file")]
    ledger_file: String,
    #[serde(default = "default_assets_dir")]
    assets_dir: String,
    #[serde(default = "default_delimiter")]
    delimiter: char,
    #[serde(default = "default_capacity")]
    capacity: usize,
}

#[derive(Deserialize, Debug)]
struct TomlTiming {
    #[serde(default = "default_poll_sleep")]
    poll_sleep_ms: u64,
    #[serde(default = "default_flash_period")]
    flash_period_ms: u64,
    #[serde(default = "default_anim_steps")]
    reveal_steps: u32,
    #[serde(default = "default_step_ms")]
    reveal_step_ms: u64,
    #[serde(default = "default_hold_ms")]
    reveal_hold_ms: u64,
    #[serde(default = "default_verdict_frames")]
    verdict_frames: u32,
    #[serde(default = "default_verdict_frame")]
    verdict_frame_ms: u64,
    #[serde(default = "default_hold_ms")]
    verdict_hold_ms: u64,
    #[serde(default = "default_anim_steps")]
    slide_steps: u32,
    #[serde(default = "default_step_ms")]
    slide_step_ms: u64,
    #[serde(default = "default_losing_frame")]
    losing_frame_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlLosing {
    #[serde(default = "default_clip_frames")]
    clip_frames: Vec<u32>,
}

#[derive(Deserialize, Debug)]
struct TomlLog {
    #[serde(default = "default_log_level")]
    level: String,
    #[serde(default = "default_log_file")]
    file: String,
}

#[derive(Deserialize, Debug)]
struct TomlDisplay {
    #[serde(default = "default_cache_entries")]
    image_cache_entries: usize,
}

// ── Defaults ──

fn default_catalog_file() -> String { "emissions_data.csv".into() }
fn default_ledger_file() -> String { "losing_scores.txt".into() }
fn default_assets_dir() -> String { ".".into() }
fn default_delimiter() -> char { DEFAULT_DELIMITER }
fn default_capacity() -> usize { DEFAULT_CAPACITY }

fn default_poll_sleep() -> u64 { 1 }
fn default_flash_period() -> u64 { 500 }
fn default_anim_steps() -> u32 { 30 }
fn default_step_ms() -> u64 { 5 }
fn default_hold_ms() -> u64 { 1000 }   // keep the verdict up before moving on
fn default_verdict_frames() -> u32 { 31 }
fn default_verdict_frame() -> u64 { 10 }
fn default_losing_frame() -> u64 { 40 }

fn default_clip_frames() -> Vec<u32> { vec![25, 9, 79, 55, 98, 91, 50, 65, 97, 92, 99] }

fn default_log_level() -> String { "info".into() }
fn default_log_file() -> String { "co2quiz.log".into() }
fn default_cache_entries() -> usize { 64 }

impl Default for TomlData {
    fn default() -> Self {
        TomlData {
            catalog_file: default_catalog_file(),
            ledger_file: default_ledger_file(),
            assets_dir: default_assets_dir(),
            delimiter: default_delimiter(),
            capacity: default_capacity(),
        }
    }
}

impl Default for TomlTiming {
    fn default() -> Self {
        TomlTiming {
            poll_sleep_ms: default_poll_sleep(),
            flash_period_ms: default_flash_period(),
            reveal_steps: default_anim_steps(),
            reveal_step_ms: default_step_ms(),
            reveal_hold_ms: default_hold_ms(),
            verdict_frames: default_verdict_frames(),
            verdict_frame_ms: default_verdict_frame(),
            verdict_hold_ms: default_hold_ms(),
            slide_steps: default_anim_steps(),
            slide_step_ms: default_step_ms(),
            losing_frame_ms: default_losing_frame(),
        }
    }
}

impl Default for TomlLosing {
    fn default() -> Self {
        TomlLosing { clip_frames: default_clip_frames() }
    }
}

impl Default for TomlLog {
    fn default() -> Self {
        TomlLog { level: default_log_level(), file: default_log_file() }
    }
}

impl Default for TomlDisplay {
    fn default() -> Self {
        TomlDisplay { image_cache_entries: default_cache_entries() }
    }
}

impl From<&TomlTiming> for TimingConfig {
    fn from(t: &TomlTiming) -> Self {
        TimingConfig {
            poll_sleep: Duration::from_millis(t.poll_sleep_ms),
            flash_period: Duration::from_millis(t.flash_period_ms),
            reveal_steps: t.reveal_steps,
            reveal_step: Duration::from_millis(t.reveal_step_ms),
            reveal_hold: Duration::from_millis(t.reveal_hold_ms),
            verdict_frames: t.verdict_frames,
            verdict_frame: Duration::from_millis(t.verdict_frame_ms),
            verdict_hold: Duration::from_millis(t.verdict_hold_ms),
            slide_steps: t.slide_steps,
            slide_step: Duration::from_millis(t.slide_step_ms),
            losing_frame: Duration::from_millis(t.losing_frame_ms),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    ///
    /// Returns the config plus any warnings; logging is not up yet when
    /// this runs, so the caller reports them once the subscriber exists.
    pub fn load() -> (Self, Vec<String>) {
        let search_dirs = candidate_dirs();
        let mut warnings = Vec::new();
        let toml_cfg = load_toml(&search_dirs, &mut warnings);
        (Self::resolve(toml_cfg, &search_dirs), warnings)
    }

    /// Parse a config document against the given search directories.
    #[cfg(test)]
    pub(crate) fn from_toml_str(text: &str, search_dirs: &[PathBuf]) -> Result<Self, toml::de::Error> {
        let cfg = toml::from_str::<TomlConfig>(text)?;
        Ok(Self::resolve(cfg, search_dirs))
    }

    fn resolve(cfg: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        let mut clip_frames = cfg.losing.clip_frames;
        clip_frames.retain(|&n| n > 0);
        if clip_frames.is_empty() {
            clip_frames = default_clip_frames();
        }

        GameConfig {
            data: DataConfig {
                catalog_file: resolve_path(&cfg.data.catalog_file, search_dirs),
                ledger_file: resolve_path(&cfg.data.ledger_file, search_dirs),
                assets_dir: resolve_path(&cfg.data.assets_dir, search_dirs),
                delimiter: cfg.data.delimiter,
                capacity: cfg.data.capacity,
            },
            timing: TimingConfig::from(&cfg.timing),
            losing: LosingConfig { clip_frames },
            log: LogConfig {
                level: cfg.log.level,
                file: resolve_path(&cfg.log.file, search_dirs),
            },
            image_cache_entries: cfg.display.image_cache_entries.max(1),
        }
    }
}

/// Absolute paths pass through; relative ones resolve against the first
/// candidate directory where they exist, else against the CWD.
fn resolve_path(raw: &str, search_dirs: &[PathBuf]) -> PathBuf {
    let path = Path::new(raw);
    if path.is_absolute() {
        return path.to_path_buf();
    }
    search_dirs.iter()
        .map(|d| d.join(path))
        .find(|p| p.exists())
        .unwrap_or_else(|| path.to_path_buf())
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf], warnings: &mut Vec<String>) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        warnings.push(format!("config.toml parse error: {e}; using defaults"));
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    warnings.push(format!("could not read {}: {e}", path.display()));
                }
            }
        }
    }
    TomlConfig::default()
}
