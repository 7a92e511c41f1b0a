//! Straight-flying projectile
//!
//! A bullet carries an already-resolved attack. It flies at constant speed,
//! destroys itself once it has covered its range, and passes through as many
//! enemies as its pierce count before it is spent.

use glam::Vec2;

use super::attributes::{Attributes, PrimaryStats};
use super::behavior::{CollisionContext, CollisionPeer, UpdateContext};
use super::combat::AttackInfo;
use super::dice::Dice;
use super::element::{ElementId, EntityKind, EntityState, ObjectElement, Size};
use super::entity::{BulletData, Entity, KindData};
use super::hitbox::HitBox;
use super::vector::Vector2DExt;
use crate::consts::*;

/// Pierce count granted by the shooter's stats
pub fn pierce_of(shooter: &Attributes) -> u32 {
    shooter.piercing().max(0.0) as u32
}

/// Bullet centered on `origin`, with a little lateral spread on its heading
pub fn create(id: ElementId, origin: Vec2, direction: Vec2, attack: AttackInfo, pierce: u32, dice: &mut Dice) -> Entity {
    let heading = direction.normalized();
    let spread = dice.range(-BULLET_LATERAL_NOISE, BULLET_LATERAL_NOISE);
    create_exact(id, origin, heading + heading.perpendicular() * spread, attack, pierce)
}

/// Bullet flying exactly along `direction`
pub fn create_exact(id: ElementId, origin: Vec2, direction: Vec2, attack: AttackInfo, pierce: u32) -> Entity {
    let size = Size::new(BULLET_SIZE, BULLET_SIZE);
    let heading = direction.normalized();
    let mut element = ObjectElement::new(
        id,
        EntityKind::SimpleBullet,
        origin - size.as_vec2() * 0.5,
        size,
        EntityState::Travelling,
    );
    element.rotation = heading.heading();

    let mut bullet = Entity::new(
        element,
        Attributes::with_hp(1, 1, PrimaryStats::default()),
        KindData::Bullet(BulletData {
            attack,
            speed: BULLET_SPEED,
            distance_traveled: 0.0,
            max_range: BULLET_MAX_RANGE,
            pierce_left: pierce,
        }),
    )
    .with_hitbox(HitBox::centered_circle(size, BULLET_SIZE * 0.5));
    bullet.direction = heading;
    bullet
}

pub fn update(entity: &mut Entity, ctx: &mut UpdateContext<'_>) {
    if !entity.is_alive() {
        return;
    }
    let KindData::Bullet(data) = &mut entity.data else {
        return;
    };

    let travel = data.speed * ctx.dt;
    data.distance_traveled += travel;
    let expired = data.distance_traveled >= data.max_range;

    entity.velocity = entity.direction * travel;
    entity.update_position();
    if expired {
        entity.destroy(ctx.bus);
    }
}

pub fn on_collision(entity: &mut Entity, peer: &CollisionPeer, ctx: &mut CollisionContext<'_>) {
    if !entity.is_alive() || !peer.kind.is_enemy() || !peer.alive {
        return;
    }
    let KindData::Bullet(data) = &mut entity.data else {
        return;
    };
    if data.pierce_left > 0 {
        data.pierce_left -= 1;
    } else {
        entity.destroy(ctx.bus);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::combat::DamageType;
    use crate::sim::events::{EventBus, EventTopic};

    fn payload() -> AttackInfo {
        AttackInfo {
            attacker_id: PLAYER_ID,
            total_damage: 16,
            damage_type: DamageType::Physical,
            is_critical: false,
            direction: Vec2::X,
        }
    }

    /// Run the bullet in chunks of `dt` until it dies; returns elapsed time
    fn fly(dt: f32) -> f32 {
        let mut bus = EventBus::new();
        let mut dice = Dice::new(0);
        let mut b = create_exact(200, Vec2::new(100.0, 100.0), Vec2::X, payload(), 0);
        let mut elapsed = 0.0;
        while b.is_alive() && elapsed < 10.0 {
            let mut ctx = UpdateContext {
                dt,
                world: Size::new(DEFAULT_WORLD_WIDTH, DEFAULT_WORLD_HEIGHT),
                bus: &mut bus,
                dice: &mut dice,
                neighbors: &[],
            };
            update(&mut b, &mut ctx);
            elapsed += dt;
        }
        assert_eq!(bus.drain().last().map(|e| e.topic()), Some(EventTopic::Despawn));
        elapsed
    }

    #[test]
    fn test_range_is_independent_of_chunking() {
        let expected = BULLET_MAX_RANGE / BULLET_SPEED;
        for dt in [1.0 / 60.0, 1.0 / 30.0, 0.1, 0.25] {
            let elapsed = fly(dt);
            assert!(
                elapsed >= expected - 1e-4 && elapsed < expected + dt + 1e-4,
                "dt {dt}: died after {elapsed}s"
            );
        }
    }

    #[test]
    fn test_spawns_centered_on_origin() {
        let b = create_exact(200, Vec2::new(100.0, 100.0), Vec2::new(0.0, 5.0), payload(), 0);
        assert_eq!(b.center(), Vec2::new(100.0, 100.0));
        assert_eq!(b.direction, Vec2::Y);
        assert_eq!(b.state(), EntityState::Travelling);
    }

    #[test]
    fn test_spread_stays_small() {
        let mut dice = Dice::new(11);
        for id in 0..50 {
            let b = create(id, Vec2::ZERO, Vec2::X, payload(), 0, &mut dice);
            assert!(b.direction.x > 0.99);
            assert!(b.direction.y.abs() <= BULLET_LATERAL_NOISE);
        }
    }

    #[test]
    fn test_spent_on_first_enemy() {
        let mut bus = EventBus::new();
        let mut dice = Dice::new(0);
        let mut b = create_exact(200, Vec2::ZERO, Vec2::X, payload(), 0);
        let player = CollisionPeer {
            id: PLAYER_ID,
            kind: EntityKind::Player,
            center: Vec2::ZERO,
            alive: true,
            attack: None,
        };
        let slime = CollisionPeer {
            kind: EntityKind::Slime,
            id: 100,
            ..player.clone()
        };
        let mut ctx = CollisionContext {
            bus: &mut bus,
            dice: &mut dice,
        };
        on_collision(&mut b, &player, &mut ctx);
        assert!(b.is_alive());
        on_collision(&mut b, &slime, &mut ctx);
        assert!(!b.is_alive());
        assert_eq!(bus.pending(), 1);
    }

    #[test]
    fn test_pierce_lets_bullet_through_extra_enemies() {
        let mut bus = EventBus::new();
        let mut dice = Dice::new(0);
        let mut b = create_exact(200, Vec2::ZERO, Vec2::X, payload(), 2);
        let slime = CollisionPeer {
            id: 100,
            kind: EntityKind::Slime,
            center: Vec2::ZERO,
            alive: true,
            attack: None,
        };
        let mut ctx = CollisionContext {
            bus: &mut bus,
            dice: &mut dice,
        };
        on_collision(&mut b, &slime, &mut ctx);
        on_collision(&mut b, &slime, &mut ctx);
        assert!(b.is_alive());
        on_collision(&mut b, &slime, &mut ctx);
        assert!(!b.is_alive());
    }

    #[test]
    fn test_pierce_follows_shooter_dexterity() {
        let mut stats = PrimaryStats::default();
        stats.dexterity = 25;
        assert_eq!(pierce_of(&Attributes::with_hp(10, 1, stats)), 2);
        stats.dexterity = 5;
        assert_eq!(pierce_of(&Attributes::with_hp(10, 1, stats)), 0);
    }
}
