//! The player-controlled character
//!
//! Input arrives as discrete callbacks (one per action) that only record
//! intent or start an ability; the movement itself happens once per tick in
//! `update`. Callbacks on a dead player, or on a non-player entity, do nothing.

use glam::Vec2;

use super::attributes::{Attributes, PrimaryStats};
use super::behavior::{CollisionContext, CollisionPeer, UpdateContext};
use super::bullet;
use super::combat::{DamageType, resolve_attack};
use super::dice::Dice;
use super::element::{ElementId, EntityKind, EntityState, ObjectElement, Size};
use super::entity::{Entity, KindData, PlayerData};
use super::events::{EventBus, GameEvent, SpawnRequest};
use super::hitbox::HitBox;
use super::timers::TimerKind;
use super::vector::Vector2DExt;
use crate::consts::*;

pub fn create(id: ElementId, position: Vec2, level: u32, stats: PrimaryStats, dice: &mut Dice) -> Entity {
    let size = Size::new(ACTOR_SIZE, ACTOR_SIZE);
    let element = ObjectElement::new(id, EntityKind::Player, position, size, EntityState::Idle);
    let attributes = Attributes::new(PLAYER_HP_DICE, level, stats, dice);
    Entity::new(
        element,
        attributes,
        KindData::Player(PlayerData { facing: Vec2::X }),
    )
    .with_hitbox(HitBox::centered_circle(size, ACTOR_HITBOX_RADIUS))
}

impl Entity {
    fn controllable(&self) -> bool {
        self.is_alive() && matches!(self.data, KindData::Player(_))
    }

    fn facing(&self) -> Vec2 {
        match &self.data {
            KindData::Player(p) => p.facing,
            _ => Vec2::X,
        }
    }

    fn set_facing(&mut self, facing: Vec2) {
        if facing == Vec2::ZERO {
            return;
        }
        if let KindData::Player(p) = &mut self.data {
            p.facing = facing;
        }
        self.element.rotation = facing.heading();
    }

    pub fn on_up_action(&mut self) {
        if self.controllable() {
            self.direction.y -= 1.0;
        }
    }

    pub fn on_down_action(&mut self) {
        if self.controllable() {
            self.direction.y += 1.0;
        }
    }

    pub fn on_left_action(&mut self) {
        if self.controllable() {
            self.direction.x -= 1.0;
        }
    }

    pub fn on_right_action(&mut self) {
        if self.controllable() {
            self.direction.x += 1.0;
        }
    }

    /// Dash along the current intent, or the facing when standing still.
    /// Returns false while the dash is cooling down.
    pub fn on_shift_action(&mut self) -> bool {
        if !self.controllable() || self.timers.is_running(TimerKind::DashLock) {
            return false;
        }
        let heading = if self.direction != Vec2::ZERO {
            self.direction.normalized()
        } else {
            self.facing()
        };
        self.push(heading * DASH_IMPULSE, DASH_DURATION);
        let lock = cooldown(DASH_COOLDOWN, self);
        self.timers.start(TimerKind::DashLock, lock);
        true
    }

    /// Fire a bullet from the player's center toward `mouse`.
    /// Returns false while shooting is cooling down.
    pub fn on_left_click_action(&mut self, mouse: Vec2, bus: &mut EventBus, dice: &mut Dice) -> bool {
        if !self.controllable() || self.timers.is_running(TimerKind::ShootLock) {
            return false;
        }
        let origin = self.center();
        let mut aim = (mouse - origin).normalized();
        if aim == Vec2::ZERO {
            aim = self.facing();
        }
        self.set_facing(aim);

        let attack = resolve_attack(
            self.id(),
            &self.attributes,
            BULLET_BASE_DAMAGE,
            DamageType::Physical,
            aim,
            dice,
        );
        let pierce = bullet::pierce_of(&self.attributes);
        bus.dispatch(GameEvent::Spawn(SpawnRequest::new(move |id, dice| {
            bullet::create(id, origin, aim, attack, pierce, dice)
        })));
        let lock = cooldown(SHOOT_COOLDOWN, self);
        self.timers.start(TimerKind::ShootLock, lock);
        true
    }

    /// Turn toward `mouse` without firing
    pub fn on_right_click_action(&mut self, mouse: Vec2) {
        if self.controllable() {
            self.set_facing((mouse - self.center()).normalized());
        }
    }
}

/// Ability cooldown shortened by the recharge stat, never below a tenth
fn cooldown(base: f32, entity: &Entity) -> f32 {
    base * (1.0 - entity.attributes.recharge() / 100.0).max(0.1)
}

pub fn update(entity: &mut Entity, ctx: &mut UpdateContext<'_>) {
    entity.advance_timers(ctx.dt);
    if !entity.is_alive() {
        return;
    }

    let before = entity.coordinates();
    let walking = entity.direction != Vec2::ZERO;
    if walking {
        entity.set_facing(entity.direction.normalized());
    }

    entity.move_by(ctx.dt, 1.0);
    entity.clamp_to(ctx.world);
    entity.set_state(if walking {
        EntityState::Walking
    } else {
        EntityState::Idle
    });
    entity.direction = Vec2::ZERO;
    entity.attributes.regenerate(ctx.dt);

    let after = entity.coordinates();
    if after != before {
        ctx.bus.dispatch(GameEvent::PlayerMoved {
            x: after.x,
            y: after.y,
        });
    }
}

pub fn on_collision(entity: &mut Entity, peer: &CollisionPeer, ctx: &mut CollisionContext<'_>) {
    if peer.kind.is_enemy() && peer.alive {
        if let Some(attack) = &peer.attack {
            entity.take_damage(attack, ctx.bus);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::events::EventTopic;

    fn hero() -> Entity {
        let mut dice = Dice::new(1);
        create(PLAYER_ID, Vec2::new(512.0, 512.0), 1, PrimaryStats::default(), &mut dice)
    }

    fn tick(entity: &mut Entity, dt: f32, bus: &mut EventBus) {
        let mut dice = Dice::new(0);
        let mut ctx = UpdateContext {
            dt,
            world: Size::new(DEFAULT_WORLD_WIDTH, DEFAULT_WORLD_HEIGHT),
            bus,
            dice: &mut dice,
            neighbors: &[],
        };
        update(entity, &mut ctx);
    }

    #[test]
    fn test_right_moves_by_speed_times_dt() {
        let mut bus = EventBus::new();
        let mut p = hero();
        p.on_right_action();
        tick(&mut p, 0.1, &mut bus);
        assert!((p.coordinates().x - (512.0 + 101.0 * 0.1)).abs() < 1e-3);
        assert_eq!(p.coordinates().y, 512.0);
        assert_eq!(p.state(), EntityState::Walking);
        assert_eq!(p.direction, Vec2::ZERO);

        let moved: Vec<_> = bus.drain().into_iter().map(|e| e.topic()).collect();
        assert_eq!(moved, vec![EventTopic::PlayerMoved]);
    }

    #[test]
    fn test_diagonal_is_normalized() {
        let mut bus = EventBus::new();
        let mut p = hero();
        p.on_up_action();
        p.on_right_action();
        tick(&mut p, 1.0, &mut bus);
        let travelled = p.coordinates() - Vec2::new(512.0, 512.0);
        assert!((travelled.length() - 101.0).abs() < 1e-2);
    }

    #[test]
    fn test_idle_does_not_announce() {
        let mut bus = EventBus::new();
        let mut p = hero();
        tick(&mut p, 0.1, &mut bus);
        assert_eq!(p.state(), EntityState::Idle);
        assert_eq!(bus.pending(), 0);
    }

    #[test]
    fn test_shoot_spawns_once_per_cooldown() {
        let mut bus = EventBus::new();
        let mut dice = Dice::new(9);
        let mut p = hero();
        assert!(p.on_left_click_action(Vec2::new(700.0, 520.0), &mut bus, &mut dice));
        assert!(!p.on_left_click_action(Vec2::new(700.0, 520.0), &mut bus, &mut dice));
        let events = bus.drain();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].topic(), EventTopic::Spawn);

        tick(&mut p, SHOOT_COOLDOWN + 0.01, &mut bus);
        assert!(p.on_left_click_action(Vec2::new(700.0, 520.0), &mut bus, &mut dice));
    }

    #[test]
    fn test_dash_adds_impulse_then_wears_off() {
        let mut bus = EventBus::new();
        let mut p = hero();
        p.on_right_action();
        assert!(p.on_shift_action());
        assert!(!p.on_shift_action());
        assert_eq!(p.accelerator, Vec2::X * DASH_IMPULSE);

        tick(&mut p, DASH_DURATION + 0.01, &mut bus);
        assert_eq!(p.accelerator, Vec2::ZERO);
    }

    #[test]
    fn test_right_click_faces_mouse() {
        let mut p = hero();
        p.on_right_click_action(Vec2::new(520.0, 0.0));
        // straight up in a y-down world
        assert!(p.element.rotation.abs() < 1e-4);
    }

    #[test]
    fn test_dead_player_ignores_input() {
        let mut bus = EventBus::new();
        let mut dice = Dice::new(2);
        let mut p = hero();
        let lethal = resolve_attack(100, &p.attributes, 10_000, DamageType::Physical, Vec2::X, &mut dice);
        p.take_damage(&lethal, &mut bus);
        assert_eq!(bus.drain()[0].topic(), EventTopic::PlayerDied);

        p.on_right_action();
        assert_eq!(p.direction, Vec2::ZERO);
        assert!(!p.on_left_click_action(Vec2::ZERO, &mut bus, &mut dice));
        tick(&mut p, 0.1, &mut bus);
        assert_eq!(p.state(), EntityState::Dead);
    }
}
