//! Per-kind strategy table
//!
//! Each `EntityKind` maps to a `Behavior`: a per-tick update and a collision
//! reaction. Kinds without an entry (debug circles) are simply not updated.
//!
//! Collision callbacks never see the other entity itself. They get a
//! `CollisionPeer`: a snapshot of the other side taken before either callback
//! of the pair runs, so the order A-then-B can't leak into B's view of A.

use glam::Vec2;

use super::combat::{AttackInfo, DamageType, resolve_attack};
use super::dice::Dice;
use super::element::{ElementId, EntityKind, Size};
use super::entity::{Entity, KindData};
use super::events::EventBus;
use super::hitbox::HitboxShape;
use super::timers::TimerKind;
use super::{bullet, enemy, player};
use crate::consts::CONTACT_BASE_DAMAGE;

/// Another entity as seen by the AI of its neighbors
#[derive(Debug, Clone)]
pub struct Neighbor {
    pub id: ElementId,
    pub kind: EntityKind,
    pub shapes: Vec<HitboxShape>,
}

impl Neighbor {
    pub fn of(entity: &Entity) -> Self {
        Self {
            id: entity.id(),
            kind: entity.kind(),
            shapes: entity.hitbox_shapes(),
        }
    }
}

pub struct UpdateContext<'a> {
    pub dt: f32,
    pub world: Size,
    pub bus: &'a mut EventBus,
    pub dice: &'a mut Dice,
    /// Entities near this one, before anyone moved this tick
    pub neighbors: &'a [Neighbor],
}

pub struct CollisionContext<'a> {
    pub bus: &'a mut EventBus,
    pub dice: &'a mut Dice,
}

/// The other side of a collision
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionPeer {
    pub id: ElementId,
    pub kind: EntityKind,
    pub center: Vec2,
    pub alive: bool,
    /// What touching this peer does to you, if anything
    pub attack: Option<AttackInfo>,
}

impl CollisionPeer {
    /// Snapshot `entity` as seen from `other`
    pub fn snapshot(entity: &Entity, other: &Entity, dice: &mut Dice) -> Self {
        let attack = if !entity.is_alive() {
            None
        } else {
            match &entity.data {
                KindData::Bullet(b) => Some(b.attack),
                KindData::Enemy(_)
                    if other.kind() == EntityKind::Player
                        && !entity.timers.is_running(TimerKind::ContactLock) =>
                {
                    Some(resolve_attack(
                        entity.id(),
                        &entity.attributes,
                        CONTACT_BASE_DAMAGE,
                        DamageType::Physical,
                        other.center() - entity.center(),
                        dice,
                    ))
                }
                _ => None,
            }
        };

        Self {
            id: entity.id(),
            kind: entity.kind(),
            center: entity.center(),
            alive: entity.is_alive(),
            attack,
        }
    }
}

pub type UpdateFn = fn(&mut Entity, &mut UpdateContext<'_>);
pub type CollisionFn = fn(&mut Entity, &CollisionPeer, &mut CollisionContext<'_>);

#[derive(Clone, Copy)]
pub struct Behavior {
    pub update: UpdateFn,
    pub on_collision: CollisionFn,
}

static PLAYER: Behavior = Behavior {
    update: player::update,
    on_collision: player::on_collision,
};

static SLIME: Behavior = Behavior {
    update: enemy::update_slime,
    on_collision: enemy::on_collision,
};

static BLACK_ENEMY: Behavior = Behavior {
    update: enemy::update_black_enemy,
    on_collision: enemy::on_collision,
};

static SIMPLE_BULLET: Behavior = Behavior {
    update: bullet::update,
    on_collision: bullet::on_collision,
};

pub fn behavior_for(kind: EntityKind) -> Option<&'static Behavior> {
    match kind {
        EntityKind::Player => Some(&PLAYER),
        EntityKind::Slime => Some(&SLIME),
        EntityKind::BlackEnemy => Some(&BLACK_ENEMY),
        EntityKind::SimpleBullet => Some(&SIMPLE_BULLET),
        EntityKind::Circle => None,
    }
}
