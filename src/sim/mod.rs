//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied timestep only
//! - Seeded dice only
//! - Stable iteration order (by element id)
//! - No rendering or platform dependencies

pub mod actions;
pub mod attributes;
pub mod behavior;
pub mod bullet;
pub mod collision;
pub mod combat;
pub mod dice;
pub mod element;
pub mod enemy;
pub mod entity;
pub mod events;
pub mod facade;
pub mod hitbox;
pub mod manager;
pub mod player;
pub mod quadtree;
pub mod render_state;
pub mod timers;
pub mod vector;
pub mod worker;

pub use actions::{Action, ActionManager};
pub use attributes::{Attributes, BonusStat, PrimaryStats, XpTable};
pub use collision::{CollisionBody, CollisionRequest, CollisionResponse, find_colliding_pairs};
pub use combat::{AttackInfo, DamageOutcome, DamageType, resolve_attack};
pub use dice::Dice;
pub use element::{ElementId, EntityKind, EntityState, ObjectElement, Rect, Size};
pub use entity::{Entity, KindData};
pub use events::{EventBus, EventPayload, EventTopic, GameEvent, SpawnRequest, SubscriptionId};
pub use facade::{Simulation, TickSummary};
pub use hitbox::{HitBox, HitboxShape};
pub use manager::{ObjectElementManager, TickReport};
pub use quadtree::{Quadtree, QuadtreeConfig};
pub use render_state::{RenderState, RenderableState, WorldState};
pub use vector::{Vector2D, Vector2DExt};
