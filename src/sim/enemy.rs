//! Hostile actors
//!
//! Both enemy kinds chase the player's last announced position. Slimes steer
//! around each other: they try the direct heading first, then 45° to either
//! side, and hold still when all three would run into another slime. Black
//! enemies wait until the player comes within their aggro radius.

use glam::Vec2;

use super::attributes::{Attributes, PrimaryStats};
use super::behavior::{CollisionContext, CollisionPeer, Neighbor, UpdateContext};
use super::dice::Dice;
use super::element::{ElementId, EntityKind, EntityState, ObjectElement, Size};
use super::entity::{EnemyData, Entity, KindData};
use super::hitbox::HitBox;
use super::timers::TimerKind;
use super::vector::Vector2DExt;
use crate::consts::*;

/// What distinguishes one enemy kind from another at spawn time
struct Archetype {
    kind: EntityKind,
    speed_modifier: f32,
    base_xp: f64,
}

const SLIME: Archetype = Archetype {
    kind: EntityKind::Slime,
    speed_modifier: SLIME_SPEED_MODIFIER,
    base_xp: SLIME_BASE_XP,
};

const BLACK_ENEMY: Archetype = Archetype {
    kind: EntityKind::BlackEnemy,
    speed_modifier: BLACK_ENEMY_SPEED_MODIFIER,
    base_xp: BLACK_ENEMY_BASE_XP,
};

fn create(archetype: &Archetype, id: ElementId, position: Vec2, level: u32, stats: PrimaryStats, dice: &mut Dice) -> Entity {
    let level = level.max(1);
    let size = Size::new(ACTOR_SIZE, ACTOR_SIZE);
    let element = ObjectElement::new(id, archetype.kind, position, size, EntityState::Waiting);
    let attributes = Attributes::new(ENEMY_HP_DICE, level, stats, dice);
    Entity::new(
        element,
        attributes,
        KindData::Enemy(EnemyData {
            last_player_pos: None,
            speed_modifier: archetype.speed_modifier,
            xp_given: archetype.base_xp * level as f64,
        }),
    )
    .with_hitbox(HitBox::centered_circle(size, ACTOR_HITBOX_RADIUS))
}

pub fn create_slime(id: ElementId, position: Vec2, level: u32, stats: PrimaryStats, dice: &mut Dice) -> Entity {
    create(&SLIME, id, position, level, stats, dice)
}

pub fn create_black_enemy(id: ElementId, position: Vec2, level: u32, stats: PrimaryStats, dice: &mut Dice) -> Entity {
    create(&BLACK_ENEMY, id, position, level, stats, dice)
}

fn enemy_data(entity: &Entity) -> Option<(Option<Vec2>, f32)> {
    match &entity.data {
        KindData::Enemy(e) => Some((e.last_player_pos, e.speed_modifier)),
        _ => None,
    }
}

/// Apply only the accelerator (knockback) and stand still otherwise
fn hold(entity: &mut Entity, state: EntityState) {
    entity.velocity = entity.accelerator;
    entity.update_position();
    entity.set_state(state);
}

/// Would stepping along `heading` overlap another entity of the same kind?
fn blocked(entity: &Entity, heading: Vec2, step: f32, neighbors: &[Neighbor]) -> bool {
    let projected = entity.hitboxes_at(entity.coordinates() + heading * step);
    neighbors
        .iter()
        .filter(|n| n.kind == entity.kind() && n.id != entity.id())
        .any(|n| {
            projected
                .iter()
                .any(|mine| n.shapes.iter().any(|theirs| mine.intersects(theirs)))
        })
}

pub fn update_slime(entity: &mut Entity, ctx: &mut UpdateContext<'_>) {
    entity.advance_timers(ctx.dt);
    if !entity.is_alive() {
        return;
    }
    let Some((target, modifier)) = enemy_data(entity) else {
        return;
    };
    let Some(target) = target else {
        hold(entity, EntityState::Waiting);
        return;
    };

    let primary = (target - entity.coordinates()).normalized();
    if primary == Vec2::ZERO {
        hold(entity, EntityState::Idle);
        return;
    }

    let step = entity.attributes.speed() * modifier * ctx.dt;
    let heading = [
        primary,
        primary.rotated_deg(-STEERING_DEVIATION_DEG),
        primary.rotated_deg(STEERING_DEVIATION_DEG),
    ]
    .into_iter()
    .find(|h| !blocked(entity, *h, step, ctx.neighbors));

    match heading {
        Some(heading) => {
            entity.direction = heading;
            entity.element.rotation = heading.heading();
            entity.move_by(ctx.dt, modifier);
            entity.set_state(EntityState::Walking);
            entity.direction = Vec2::ZERO;
        }
        None => hold(entity, EntityState::Idle),
    }
}

pub fn update_black_enemy(entity: &mut Entity, ctx: &mut UpdateContext<'_>) {
    entity.advance_timers(ctx.dt);
    if !entity.is_alive() {
        return;
    }
    let Some((target, modifier)) = enemy_data(entity) else {
        return;
    };
    let Some(target) = target.filter(|t| t.distance(entity.coordinates()) <= BLACK_ENEMY_AGGRO_RADIUS) else {
        hold(entity, EntityState::Waiting);
        return;
    };

    let heading = (target - entity.coordinates()).normalized();
    entity.direction = heading;
    if heading != Vec2::ZERO {
        entity.element.rotation = heading.heading();
    }
    entity.move_by(ctx.dt, modifier);
    entity.set_state(EntityState::Walking);
    entity.direction = Vec2::ZERO;
}

/// Shared by both enemy kinds
pub fn on_collision(entity: &mut Entity, peer: &CollisionPeer, ctx: &mut CollisionContext<'_>) {
    if !entity.is_alive() {
        return;
    }
    match peer.kind {
        EntityKind::Slime | EntityKind::BlackEnemy => {
            let mut away = (entity.center() - peer.center).normalized();
            if away == Vec2::ZERO {
                away = if entity.id() < peer.id { Vec2::NEG_X } else { Vec2::X };
            }
            entity.push(away * DISPERSE_IMPULSE, ACCELERATOR_RESET_DELAY);
        }
        EntityKind::Player => {
            if peer.alive && !entity.timers.is_running(TimerKind::ContactLock) {
                entity.timers.start(TimerKind::ContactLock, CONTACT_COOLDOWN);
            }
        }
        EntityKind::SimpleBullet => {
            if let Some(attack) = &peer.attack {
                entity.take_damage(attack, ctx.bus);
            }
        }
        EntityKind::Circle => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::events::{EventBus, EventTopic};

    fn run(entity: &mut Entity, dt: f32, neighbors: &[Neighbor]) {
        let mut bus = EventBus::new();
        let mut dice = Dice::new(0);
        let mut ctx = UpdateContext {
            dt,
            world: Size::new(DEFAULT_WORLD_WIDTH, DEFAULT_WORLD_HEIGHT),
            bus: &mut bus,
            dice: &mut dice,
            neighbors,
        };
        (if entity.kind() == EntityKind::Slime {
            update_slime
        } else {
            update_black_enemy
        })(entity, &mut ctx);
    }

    fn chase(entity: &mut Entity, target: Vec2) {
        if let KindData::Enemy(e) = &mut entity.data {
            e.last_player_pos = Some(target);
        }
    }

    #[test]
    fn test_slime_waits_without_target() {
        let mut dice = Dice::new(1);
        let mut slime = create_slime(100, Vec2::new(50.0, 50.0), 1, PrimaryStats::default(), &mut dice);
        run(&mut slime, 0.1, &[]);
        assert_eq!(slime.coordinates(), Vec2::new(50.0, 50.0));
        assert_eq!(slime.state(), EntityState::Waiting);
    }

    #[test]
    fn test_slime_walks_toward_player_at_half_speed() {
        let mut dice = Dice::new(1);
        let mut slime = create_slime(100, Vec2::new(50.0, 50.0), 1, PrimaryStats::default(), &mut dice);
        chase(&mut slime, Vec2::new(250.0, 50.0));
        run(&mut slime, 0.1, &[]);
        assert!((slime.coordinates().x - (50.0 + 101.0 * 0.5 * 0.1)).abs() < 1e-3);
        assert_eq!(slime.state(), EntityState::Walking);
    }

    #[test]
    fn test_slime_steers_around_blocking_slime() {
        let mut dice = Dice::new(1);
        let mut slime = create_slime(100, Vec2::new(50.0, 50.0), 1, PrimaryStats::default(), &mut dice);
        let ahead = create_slime(101, Vec2::new(70.0, 50.0), 1, PrimaryStats::default(), &mut dice);
        chase(&mut slime, Vec2::new(250.0, 50.0));
        run(&mut slime, 0.1, &[Neighbor::of(&ahead)]);
        let moved = slime.coordinates() - Vec2::new(50.0, 50.0);
        assert!(moved.length() > 0.0);
        assert!(moved.y.abs() > 1.0, "expected a sidestep, got {moved:?}");
    }

    #[test]
    fn test_slime_holds_when_fully_blocked() {
        let mut dice = Dice::new(1);
        let mut slime = create_slime(100, Vec2::new(50.0, 50.0), 1, PrimaryStats::default(), &mut dice);
        // Overlapping already: every heading stays blocked
        let on_top = create_slime(101, Vec2::new(52.0, 50.0), 1, PrimaryStats::default(), &mut dice);
        chase(&mut slime, Vec2::new(250.0, 50.0));
        run(&mut slime, 0.1, &[Neighbor::of(&on_top)]);
        assert_eq!(slime.coordinates(), Vec2::new(50.0, 50.0));
        assert_eq!(slime.state(), EntityState::Idle);
    }

    #[test]
    fn test_black_enemy_needs_aggro_range() {
        let mut dice = Dice::new(1);
        let mut enemy = create_black_enemy(100, Vec2::new(0.0, 0.0), 0, PrimaryStats::default(), &mut dice);
        chase(&mut enemy, Vec2::new(BLACK_ENEMY_AGGRO_RADIUS + 50.0, 0.0));
        run(&mut enemy, 0.1, &[]);
        assert_eq!(enemy.coordinates(), Vec2::ZERO);
        assert_eq!(enemy.state(), EntityState::Waiting);

        chase(&mut enemy, Vec2::new(100.0, 0.0));
        run(&mut enemy, 0.1, &[]);
        assert!(enemy.coordinates().x > 0.0);
        assert_eq!(enemy.state(), EntityState::Walking);
    }

    #[test]
    fn test_xp_scales_with_level() {
        let mut dice = Dice::new(1);
        let enemy = create_slime(100, Vec2::ZERO, 3, PrimaryStats::default(), &mut dice);
        let KindData::Enemy(data) = &enemy.data else {
            panic!("slime without enemy data");
        };
        assert_eq!(data.xp_given, SLIME_BASE_XP * 3.0);
        // level 0 counts as 1
        let lvl0 = create_black_enemy(101, Vec2::ZERO, 0, PrimaryStats::default(), &mut dice);
        assert_eq!(lvl0.attributes.level(), 1);
    }

    #[test]
    fn test_bullet_hit_kills_and_reports_killer() {
        let mut dice = Dice::new(1);
        let mut bus = EventBus::new();
        let mut slime = create_slime(100, Vec2::new(200.0, 200.0), 1, PrimaryStats::default(), &mut dice);
        let peer = CollisionPeer {
            id: 150,
            kind: EntityKind::SimpleBullet,
            center: Vec2::new(190.0, 208.0),
            alive: true,
            attack: Some(crate::sim::combat::AttackInfo {
                attacker_id: PLAYER_ID,
                total_damage: 999,
                damage_type: crate::sim::combat::DamageType::Physical,
                is_critical: false,
                direction: Vec2::X,
            }),
        };
        let mut ctx = CollisionContext {
            bus: &mut bus,
            dice: &mut dice,
        };
        on_collision(&mut slime, &peer, &mut ctx);
        assert_eq!(slime.state(), EntityState::Dead);
        let topics: Vec<_> = bus.drain().iter().map(|e| e.topic()).collect();
        assert_eq!(topics, vec![EventTopic::EnemyDied, EventTopic::Despawn]);
    }

    #[test]
    fn test_touching_enemies_push_apart() {
        let mut dice = Dice::new(1);
        let mut bus = EventBus::new();
        let mut slime = create_slime(100, Vec2::new(100.0, 100.0), 1, PrimaryStats::default(), &mut dice);
        let peer = CollisionPeer {
            id: 101,
            kind: EntityKind::Slime,
            center: Vec2::new(118.0, 108.0),
            alive: true,
            attack: None,
        };
        let mut ctx = CollisionContext {
            bus: &mut bus,
            dice: &mut dice,
        };
        on_collision(&mut slime, &peer, &mut ctx);
        assert!(slime.accelerator.x < 0.0);
    }
}
