/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;

use crate::sim::level::KEY_POSITIONS;
use std::path::{Path, PathBuf};

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub speed: SpeedConfig,
    pub interaction: InteractionConfig,
    pub quest: QuestConfig,
    pub audio: AudioConfig,
    pub gamepad: GamepadConfig,
    pub save_dir: Option<PathBuf>,
    pub log_file: PathBuf,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SpeedConfig {
    pub tick_rate_ms: u64,
    pub player_speed: f32,       // pixels per tick per held axis
}

#[derive(Clone, Debug, PartialEq)]
pub struct InteractionConfig {
    pub collision_padding: f32,  // corner probe inset, pixels
    pub pickup_radius: f32,
    pub interact_radius: f32,
    pub open_cooldown: u32,      // ticks after a dialogue opens
    pub advance_cooldown: u32,   // ticks after each advance
}

#[derive(Clone, Debug, PartialEq)]
pub struct QuestConfig {
    pub keys_required: usize,
    pub reward_delay_ms: u64,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AudioConfig {
    pub music: bool,
    pub volume: f32,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub interact: Vec<String>,
    pub confirm: Vec<String>,
    pub cancel: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("config.toml parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    interaction: TomlInteraction,
    #[serde(default)]
    quest: TomlQuest,
    #[serde(default)]
    audio: TomlAudio,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_player_speed")]
    player_speed: f32,
}

#[derive(Deserialize, Debug)]
struct TomlInteraction {
    #[serde(default = "default_padding")]
    collision_padding: f32,
    #[serde(default = "default_pickup_radius")]
    pickup_radius: f32,
    #[serde(default = "default_interact_radius")]
    interact_radius: f32,
    #[serde(default = "default_open_cooldown")]
    open_cooldown: u32,
    #[serde(default = "default_advance_cooldown")]
    advance_cooldown: u32,
}

#[derive(Deserialize, Debug)]
struct TomlQuest {
    #[serde(default = "default_keys_required")]
    keys_required: usize,
    #[serde(default = "default_reward_delay")]
    reward_delay_ms: u64,
}

#[derive(Deserialize, Debug)]
struct TomlAudio {
    #[serde(default = "default_music")]
    music: bool,
    #[serde(default = "default_volume")]
    volume: f32,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_interact")]
    interact: Vec<String>,
    #[serde(default = "default_confirm")]
    confirm: Vec<String>,
    #[serde(default = "default_cancel")]
    cancel: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default)]
    save_dir: String,
    #[serde(default = "default_log_file")]
    log_file: String,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 16 }          // ~60 Hz
fn default_player_speed() -> f32 { 3.0 }
fn default_padding() -> f32 { 6.0 }
fn default_pickup_radius() -> f32 { 24.0 }
fn default_interact_radius() -> f32 { 48.0 }
fn default_open_cooldown() -> u32 { 20 }
fn default_advance_cooldown() -> u32 { 15 }
fn default_keys_required() -> usize { 3 }
fn default_reward_delay() -> u64 { 1000 }
fn default_music() -> bool { true }
fn default_volume() -> f32 { 0.3 }

fn default_interact() -> Vec<String> { vec!["A".into(), "X".into()] }
fn default_confirm() -> Vec<String> { vec!["Start".into()] }
fn default_cancel() -> Vec<String> { vec!["Select".into()] }
fn default_log_file() -> String { "keyquest.log".into() }

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed {
            tick_rate_ms: default_tick_rate(),
            player_speed: default_player_speed(),
        }
    }
}

impl Default for TomlInteraction {
    fn default() -> Self {
        TomlInteraction {
            collision_padding: default_padding(),
            pickup_radius: default_pickup_radius(),
            interact_radius: default_interact_radius(),
            open_cooldown: default_open_cooldown(),
            advance_cooldown: default_advance_cooldown(),
        }
    }
}

impl Default for TomlQuest {
    fn default() -> Self {
        TomlQuest {
            keys_required: default_keys_required(),
            reward_delay_ms: default_reward_delay(),
        }
    }
}

impl Default for TomlAudio {
    fn default() -> Self {
        TomlAudio {
            music: default_music(),
            volume: default_volume(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            interact: default_interact(),
            confirm: default_confirm(),
            cancel: default_cancel(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            save_dir: String::new(),
            log_file: default_log_file(),
        }
    }
}

// ── Loading ──

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default())
    }
}

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// A missing file or missing keys fall back to defaults; an unreadable
    /// or malformed file is reported so the caller can log it and carry on
    /// with `GameConfig::default()`.
    pub fn load() -> Result<Self, ConfigError> {
        match find_config(&candidate_dirs()) {
            Some(path) => read_config(&path),
            None => Ok(GameConfig::default()),
        }
    }

    /// Parse config from TOML text.
    pub fn parse(text: &str) -> Result<Self, ConfigError> {
        let cfg: TomlConfig = toml::from_str(text)?;
        Ok(GameConfig::from_toml(cfg))
    }

    fn from_toml(toml_cfg: TomlConfig) -> Self {
        let save_dir = if toml_cfg.general.save_dir.is_empty() {
            None
        } else {
            Some(PathBuf::from(&toml_cfg.general.save_dir))
        };

        GameConfig {
            speed: SpeedConfig {
                tick_rate_ms: toml_cfg.speed.tick_rate_ms.max(1),
                player_speed: toml_cfg.speed.player_speed,
            },
            interaction: InteractionConfig {
                collision_padding: toml_cfg.interaction.collision_padding,
                pickup_radius: toml_cfg.interaction.pickup_radius,
                interact_radius: toml_cfg.interaction.interact_radius,
                open_cooldown: toml_cfg.interaction.open_cooldown,
                advance_cooldown: toml_cfg.interaction.advance_cooldown,
            },
            quest: QuestConfig {
                keys_required: toml_cfg.quest.keys_required.clamp(1, KEY_POSITIONS.len()),
                reward_delay_ms: toml_cfg.quest.reward_delay_ms,
            },
            audio: AudioConfig {
                music: toml_cfg.audio.music,
                volume: toml_cfg.audio.volume.clamp(0.0, 1.0),
            },
            gamepad: GamepadConfig {
                interact: toml_cfg.gamepad.interact,
                confirm: toml_cfg.gamepad.confirm,
                cancel: toml_cfg.gamepad.cancel,
            },
            save_dir,
            log_file: PathBuf::from(toml_cfg.general.log_file),
        }
    }
}

/// Candidate directories to search: exe dir + CWD + XDG data dir (deduplicated).
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

    // 3. XDG data home (~/.local/share/keyquest)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/keyquest");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

fn find_config(search_dirs: &[PathBuf]) -> Option<PathBuf> {
    search_dirs
        .iter()
        .map(|d| d.join("config.toml"))
        .find(|p| p.exists())
}

fn read_config(path: &Path) -> Result<GameConfig, ConfigError> {
    let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    GameConfig::parse(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_reference_tuning() {
        let cfg = GameConfig::default();
        assert_eq!(cfg.speed.tick_rate_ms, 16);
        assert_eq!(cfg.speed.player_speed, 3.0);
        assert_eq!(cfg.interaction.collision_padding, 6.0);
        assert_eq!(cfg.interaction.pickup_radius, 24.0);
        assert_eq!(cfg.interaction.interact_radius, 48.0);
        assert_eq!(cfg.interaction.open_cooldown, 20);
        assert_eq!(cfg.interaction.advance_cooldown, 15);
        assert_eq!(cfg.quest.keys_required, 3);
        assert_eq!(cfg.quest.reward_delay_ms, 1000);
        assert!(cfg.save_dir.is_none());
        assert_eq!(cfg.log_file, PathBuf::from("keyquest.log"));
    }

    #[test]
    fn empty_text_is_all_defaults() {
        let cfg = GameConfig::parse("").expect("empty config parses");
        assert_eq!(cfg.interaction, GameConfig::default().interaction);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let cfg = GameConfig::parse(
            "[interaction]\npickup_radius = 30.0\n\n[general]\nsave_dir = \"/tmp/kq\"\n",
        )
        .expect("partial config parses");
        assert_eq!(cfg.interaction.pickup_radius, 30.0);
        assert_eq!(cfg.interaction.interact_radius, 48.0);
        assert_eq!(cfg.speed.player_speed, 3.0);
        assert_eq!(cfg.save_dir, Some(PathBuf::from("/tmp/kq")));
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let cfg = GameConfig::parse(
            "[speed]\ntick_rate_ms = 0\n[quest]\nkeys_required = 0\n[audio]\nvolume = 4.0\n",
        )
        .expect("config parses");
        assert_eq!(cfg.speed.tick_rate_ms, 1);
        assert_eq!(cfg.quest.keys_required, 1);
        assert_eq!(cfg.audio.volume, 1.0);
    }

    #[test]
    fn keys_required_cannot_exceed_placed_keys() {
        let cfg = GameConfig::parse("[quest]\nkeys_required = 9\n").expect("config parses");
        assert_eq!(cfg.quest.keys_required, KEY_POSITIONS.len());
        assert_eq!(cfg.quest.keys_required, 3);
    }

    #[test]
    fn malformed_toml_is_an_error() {
        let err = GameConfig::parse("[speed\ntick_rate_ms = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn read_missing_file_is_read_error() {
        let err = read_config(Path::new("/definitely/not/here/config.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
