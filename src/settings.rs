//! Simulation configuration
//!
//! Every tunable that isn't a fixed game constant lives here. Persisted as
//! JSON: in LocalStorage on the web, in the file named by
//! `ARCANE_ARENA_CONFIG` natively. Missing fields fall back to defaults, so
//! partial files are fine.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_WORLD_HEIGHT, DEFAULT_WORLD_WIDTH, PLAYER_ID};
use crate::sim::attributes::{PrimaryStats, XpTable};
use crate::sim::element::ElementId;
use crate::sim::quadtree::QuadtreeConfig;

/// Where collision pairs are computed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub enum CollisionMode {
    /// Synchronously, inside `update`
    #[default]
    InProcess,
    /// On a background thread, consumed one tick later
    Worker,
}

impl CollisionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CollisionMode::InProcess => "inProcess",
            CollisionMode::Worker => "worker",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "inprocess" | "in-process" | "sync" => Some(CollisionMode::InProcess),
            "worker" | "thread" => Some(CollisionMode::Worker),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CollisionConfig {
    pub mode: CollisionMode,
    /// Seconds a pair is ignored after its callbacks ran; 0 disables
    pub pair_cooldown: f32,
    pub quadtree: QuadtreeConfig,
}

impl Default for CollisionConfig {
    fn default() -> Self {
        Self {
            mode: CollisionMode::InProcess,
            pair_cooldown: 0.05,
            quadtree: QuadtreeConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerConfig {
    pub id: ElementId,
    /// Top-left spawn position; centered in the world when absent
    pub position: Option<Vec2>,
    pub level: u32,
    pub stats: PrimaryStats,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            id: PLAYER_ID,
            position: None,
            level: 1,
            stats: PrimaryStats::default(),
        }
    }
}

/// Enemies placed when the world is created
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpawnConfig {
    pub enabled: bool,
    /// Top-left of the slime grid
    pub slime_origin: Vec2,
    pub slime_columns: u32,
    pub slime_rows: u32,
    pub slime_spacing: f32,
    pub slime_level: u32,
    pub black_enemies: Vec<Vec2>,
    pub black_enemy_level: u32,
    pub enemy_stats: PrimaryStats,
}

impl Default for SpawnConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            slime_origin: Vec2::new(300.0, 300.0),
            slime_columns: 4,
            slime_rows: 3,
            slime_spacing: 48.0,
            slime_level: 1,
            black_enemies: vec![Vec2::new(200.0, 200.0)],
            black_enemy_level: 1,
            enemy_stats: PrimaryStats::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimConfig {
    /// Dice seed; a random one is drawn when absent
    pub seed: Option<u64>,
    /// World size used by drivers that don't get one from a canvas
    pub world_width: f32,
    pub world_height: f32,
    pub player: PlayerConfig,
    pub xp: XpTable,
    pub spawn: SpawnConfig,
    pub collision: CollisionConfig,
    /// Include hitbox geometry in render states
    pub debug_hitboxes: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: None,
            world_width: DEFAULT_WORLD_WIDTH,
            world_height: DEFAULT_WORLD_HEIGHT,
            player: PlayerConfig::default(),
            xp: XpTable::default(),
            spawn: SpawnConfig::default(),
            collision: CollisionConfig::default(),
            debug_hitboxes: false,
        }
    }
}

impl SimConfig {
    /// LocalStorage key
    const STORAGE_KEY: &'static str = "arcane_arena_config";

    /// Environment variable naming the native config file
    pub const CONFIG_ENV: &'static str = "ARCANE_ARENA_CONFIG";

    /// Config with a fixed seed and no initial enemies, for scripted runs
    pub fn seeded(seed: u64) -> Self {
        let mut config = Self::default();
        config.seed = Some(seed);
        config.spawn.enabled = false;
        config
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The configured seed, or a fresh random one
    pub fn resolve_seed(&self) -> u64 {
        self.seed.unwrap_or_else(rand::random)
    }

    /// Load config from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                match Self::from_json(&json) {
                    Ok(config) => {
                        log::info!("Loaded config from LocalStorage");
                        return config;
                    }
                    Err(e) => log::warn!("Ignoring stored config: {e}"),
                }
            }
        }

        log::info!("Using default config");
        Self::default()
    }

    /// Save config to LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Config saved");
            }
        }
    }

    /// Load config from the file named by `ARCANE_ARENA_CONFIG`, if set
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        let Ok(path) = std::env::var(Self::CONFIG_ENV) else {
            log::info!("Using default config");
            return Self::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(config) => {
                    log::info!("Loaded config from {path}");
                    config
                }
                Err(e) => {
                    log::warn!("Ignoring config {path}: {e}");
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Can't read config {path}: {e}");
                Self::default()
            }
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        let Ok(path) = std::env::var(Self::CONFIG_ENV) else {
            return;
        };
        match serde_json::to_string_pretty(self) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&path, json) {
                    log::warn!("Can't write config {path}: {e}");
                } else {
                    log::info!("Config saved to {path}");
                }
            }
            Err(e) => log::warn!("Can't serialize config: {e}"),
        }
    }
}
