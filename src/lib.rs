//! Arcane Arena - simulation core of a browser action game
//!
//! Core modules:
//! - `sim`: Simulation engine (entities, combat, quadtree collisions, lifecycle)
//! - `settings`: Data-driven configuration
//! - `error`: Error taxonomy of the core
//! - `platform`: Browser bindings (wasm32 only)

pub mod error;
pub mod platform;
pub mod settings;
pub mod sim;

pub use error::{SimError, SimResult};
pub use settings::SimConfig;
pub use sim::Simulation;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep used by drivers that step at a fixed rate (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// The player's fixed id
    pub const PLAYER_ID: u32 = 1;
    /// First id handed out by the manager (ids below are reserved)
    pub const FIRST_MANAGED_ID: u32 = 100;

    /// Default world size
    pub const DEFAULT_WORLD_WIDTH: f32 = 1024.0;
    pub const DEFAULT_WORLD_HEIGHT: f32 = 1024.0;

    /// Actor footprint (player and enemies are 16x16)
    pub const ACTOR_SIZE: f32 = 16.0;
    /// Actor hitbox radius
    pub const ACTOR_HITBOX_RADIUS: f32 = 8.0;

    /// Bullet footprint (8x8)
    pub const BULLET_SIZE: f32 = 8.0;
    /// Bullet travel speed (units/s)
    pub const BULLET_SPEED: f32 = 150.0;
    /// Bullet range (units travelled before it expires)
    pub const BULLET_MAX_RANGE: f32 = 150.0;
    /// Maximum lateral deviation applied to a bullet at spawn
    pub const BULLET_LATERAL_NOISE: f32 = 0.1;
    /// Base damage of the player's shot
    pub const BULLET_BASE_DAMAGE: i32 = 6;

    /// Knockback scale: fraction of current hp lost -> accelerator length per tick
    pub const HURT_LAUNCH_FACTOR: f32 = 4.0;
    /// Knockback fraction cap
    pub const MAX_KNOCKBACK_FRACTION: f32 = 1.0;
    /// How long a knockback/dash impulse stays in the accelerator (seconds)
    pub const ACCELERATOR_RESET_DELAY: f32 = 0.12;

    /// Dash impulse (units per tick while active)
    pub const DASH_IMPULSE: f32 = 6.0;
    /// Dash lock window (seconds)
    pub const DASH_COOLDOWN: f32 = 1.0;
    /// Dash impulse lifetime (seconds)
    pub const DASH_DURATION: f32 = 0.15;
    /// Shoot lock window before recharge is applied (seconds)
    pub const SHOOT_COOLDOWN: f32 = 0.35;

    /// Slime moves at half its attribute speed
    pub const SLIME_SPEED_MODIFIER: f32 = 0.5;
    /// Black enemies are slower but relentless
    pub const BLACK_ENEMY_SPEED_MODIFIER: f32 = 0.35;
    /// Black enemies wake up once the player is this close
    pub const BLACK_ENEMY_AGGRO_RADIUS: f32 = 220.0;
    /// Heading deviation tried when the direct path is blocked (degrees)
    pub const STEERING_DEVIATION_DEG: f32 = 45.0;
    /// Push applied when two enemies overlap
    pub const DISPERSE_IMPULSE: f32 = 0.6;

    /// Contact (melee) damage dealt by enemies to the player
    pub const CONTACT_BASE_DAMAGE: i32 = 2;
    /// Minimum time between two contact hits from the same enemy (seconds)
    pub const CONTACT_COOLDOWN: f32 = 0.8;

    /// XP granted per enemy level
    pub const SLIME_BASE_XP: f64 = 25.0;
    pub const BLACK_ENEMY_BASE_XP: f64 = 40.0;

    /// Hit dice used for enemy hp
    pub const ENEMY_HP_DICE: u32 = 8;
    /// Hit dice used for the player's hp
    pub const PLAYER_HP_DICE: u32 = 10;
}
