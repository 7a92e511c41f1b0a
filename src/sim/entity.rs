//! The single simulated-object record
//!
//! Player, enemies and projectiles are all `Entity` values told apart by
//! their `EntityKind`; per-kind behavior lives in the strategy table in
//! `behavior`, and per-kind state in `KindData`.

use glam::Vec2;

use super::attributes::Attributes;
use super::combat::{AttackInfo, DamageOutcome};
use super::element::{ElementId, EntityKind, EntityState, ObjectElement, Rect, Size};
use super::events::{EventBus, GameEvent};
use super::hitbox::{HitBox, HitboxShape};
use super::timers::{TimerKind, Timers};
use super::vector::Vector2DExt;
use crate::consts::*;

/// Player-only state
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerData {
    /// Last non-zero heading, used by dash/shoot when there is no intent
    pub facing: Vec2,
}

/// Enemy-only state
#[derive(Debug, Clone, PartialEq)]
pub struct EnemyData {
    /// Top-left of the player as last announced on the bus
    pub last_player_pos: Option<Vec2>,
    pub speed_modifier: f32,
    /// XP awarded to the killer
    pub xp_given: f64,
}

/// Projectile-only state
#[derive(Debug, Clone, PartialEq)]
pub struct BulletData {
    pub attack: AttackInfo,
    pub speed: f32,
    pub distance_traveled: f32,
    pub max_range: f32,
    /// Extra enemies this bullet may pass through
    pub pierce_left: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum KindData {
    None,
    Player(PlayerData),
    Enemy(EnemyData),
    Bullet(BulletData),
}

#[derive(Debug, Clone)]
pub struct Entity {
    pub element: ObjectElement,
    /// Displacement applied by the last move (not integrated across ticks)
    pub velocity: Vec2,
    /// Movement intent for this tick
    pub direction: Vec2,
    pub attributes: Attributes,
    pub hitboxes: Vec<HitBox>,
    /// Transient knockback/dash contribution, added to every move until reset
    pub accelerator: Vec2,
    pub timers: Timers,
    pub data: KindData,
    alive: bool,
}

impl Entity {
    pub fn new(element: ObjectElement, attributes: Attributes, data: KindData) -> Self {
        Self {
            element,
            velocity: Vec2::ZERO,
            direction: Vec2::ZERO,
            attributes,
            hitboxes: Vec::new(),
            accelerator: Vec2::ZERO,
            timers: Timers::new(),
            data,
            alive: true,
        }
    }

    pub fn with_hitbox(mut self, hitbox: HitBox) -> Self {
        self.hitboxes.push(hitbox);
        self
    }

    pub fn id(&self) -> ElementId {
        self.element.id
    }

    pub fn kind(&self) -> EntityKind {
        self.element.kind
    }

    pub fn state(&self) -> EntityState {
        self.element.state
    }

    pub fn set_state(&mut self, state: EntityState) {
        if self.alive {
            self.element.state = state;
        }
    }

    pub fn coordinates(&self) -> Vec2 {
        self.element.coordinates
    }

    pub fn size(&self) -> Size {
        self.element.size()
    }

    pub fn center(&self) -> Vec2 {
        self.element.center()
    }

    pub fn bounds(&self) -> Rect {
        self.element.bounds()
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    /// World-space hitboxes at the current position
    pub fn hitbox_shapes(&self) -> Vec<HitboxShape> {
        self.hitboxes_at(self.element.coordinates)
    }

    /// World-space hitboxes if this entity stood at `origin`
    pub fn hitboxes_at(&self, origin: Vec2) -> Vec<HitboxShape> {
        self.hitboxes
            .iter()
            .map(|hb| hb.shape_at(origin, self.element.rotation))
            .collect()
    }

    /// Footprint grown to cover every hitbox
    pub fn broad_bounds(&self) -> Rect {
        let mut r = self.bounds();
        for shape in self.hitbox_shapes() {
            let b = shape.bounds();
            let x = r.x.min(b.x);
            let y = r.y.min(b.y);
            r = Rect::new(x, y, r.right().max(b.right()) - x, r.bottom().max(b.bottom()) - y);
        }
        r
    }

    /// `velocity = normalize(direction) * speed * modifier * dt + accelerator`, then apply it
    pub fn move_by(&mut self, dt: f32, speed_modifier: f32) {
        let step = self.attributes.speed() * speed_modifier * dt;
        self.velocity = self.direction.normalized() * step + self.accelerator;
        self.update_position();
    }

    /// Apply `velocity` to the position. Hitboxes are derived from the
    /// position, so they follow without a separate sync.
    pub fn update_position(&mut self) {
        self.element.coordinates += self.velocity;
    }

    /// Add an impulse to the accelerator and schedule it to be cleared
    pub fn push(&mut self, impulse: Vec2, duration: f32) {
        self.accelerator += impulse;
        self.timers.start(TimerKind::AcceleratorReset, duration);
    }

    /// Count timers down; an expired accelerator reset zeroes the accelerator
    pub fn advance_timers(&mut self, dt: f32) -> Vec<TimerKind> {
        let expired = self.timers.advance(dt);
        if expired.contains(&TimerKind::AcceleratorReset) {
            self.accelerator = Vec2::ZERO;
        }
        expired
    }

    /// Apply a resolved hit.
    ///
    /// Knockback scales with the share of current hp the hit takes. A hit
    /// that brings hp to zero or below kills: the state becomes `dead` and
    /// the death is announced on the bus. Hits on a dead entity do nothing.
    pub fn take_damage(&mut self, attack: &AttackInfo, bus: &mut EventBus) -> DamageOutcome {
        if !self.alive {
            return DamageOutcome::Defeated;
        }

        let hp_before = self.attributes.hp();
        let fraction = if hp_before > 0 {
            (attack.total_damage as f32 / hp_before as f32).clamp(0.0, MAX_KNOCKBACK_FRACTION)
        } else {
            MAX_KNOCKBACK_FRACTION
        };
        let launch = fraction * HURT_LAUNCH_FACTOR;

        self.attributes.adjust_hp(-attack.total_damage);
        log::debug!(
            "{} {} took {} damage{} (hp {} -> {})",
            self.kind(),
            self.id(),
            attack.total_damage,
            if attack.is_critical { " (crit)" } else { "" },
            hp_before,
            self.attributes.hp()
        );

        if self.attributes.hp() <= 0 {
            self.die(attack.attacker_id, bus);
            return DamageOutcome::Defeated;
        }

        self.push(attack.direction.normalized() * launch, ACCELERATOR_RESET_DELAY);
        DamageOutcome::Survived
    }

    fn die(&mut self, killer_id: ElementId, bus: &mut EventBus) {
        self.element.state = EntityState::Dead;
        self.alive = false;
        self.velocity = Vec2::ZERO;
        self.accelerator = Vec2::ZERO;
        self.timers.clear();

        match &self.data {
            KindData::Player(_) => {
                log::info!("player {} died", self.id());
                bus.dispatch(GameEvent::PlayerDied);
            }
            KindData::Enemy(enemy) => {
                log::info!("{} {} defeated by {}", self.kind(), self.id(), killer_id);
                bus.dispatch(GameEvent::EnemyDied {
                    enemy_id: self.id(),
                    xp_given: enemy.xp_given,
                    killer_id,
                });
                bus.dispatch(GameEvent::Despawn {
                    object_id: self.id(),
                });
            }
            _ => bus.dispatch(GameEvent::Despawn {
                object_id: self.id(),
            }),
        }
    }

    /// Remove this entity from play without a kill (expired, spent)
    pub fn destroy(&mut self, bus: &mut EventBus) {
        if !self.alive {
            return;
        }
        self.alive = false;
        self.element.state = EntityState::Dead;
        bus.dispatch(GameEvent::Despawn {
            object_id: self.id(),
        });
    }

    pub fn clamp_to(&mut self, world: Size) {
        self.element.clamp_to(world);
    }
}
