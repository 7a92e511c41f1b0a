//! Owner of every non-player entity
//!
//! The manager hands out ids, runs the per-tick pipeline over its entities
//! and applies lifecycle events (spawn, despawn) from the bus. The player is
//! owned by the facade and passed in by reference, so it takes part in
//! collisions without being stored here.
//!
//! Tick order:
//! 1. apply queued lifecycle events, drop dead entities
//! 2. update every live entity through its kind's strategy (id order)
//! 3. clamp everyone to the world
//! 4. find colliding pairs and run both callbacks of each pair
//! 5. apply the lifecycle events the tick produced

use std::collections::{BTreeMap, HashMap};
use std::iter;

use glam::Vec2;

use super::behavior::{CollisionContext, CollisionPeer, Neighbor, UpdateContext, behavior_for};
use super::collision::{CollisionBody, CollisionRequest, find_colliding_pairs};
use super::dice::Dice;
use super::element::{ElementId, EntityKind, EntityState, Rect, Size};
use super::entity::{Entity, KindData};
use super::enemy;
use super::events::{EventBus, GameEvent, SpawnRequest};
use super::quadtree::Quadtree;
use super::render_state::RenderableState;
use super::worker::CollisionWorker;
use crate::consts::FIRST_MANAGED_ID;
use crate::error::{SimError, SimResult};
use crate::settings::{CollisionConfig, CollisionMode, SpawnConfig};

/// What one `update_all` did
#[derive(Debug, Default)]
pub struct TickReport {
    /// Non-lifecycle events, in dispatch order, for the facade to route
    pub events: Vec<GameEvent>,
    /// Pairs whose callbacks ran
    pub collisions: usize,
    pub spawned: usize,
    pub removed: usize,
}

pub struct ObjectElementManager {
    elements: BTreeMap<ElementId, Entity>,
    next_id: ElementId,
    config: CollisionConfig,
    pair_cooldowns: HashMap<(ElementId, ElementId), f32>,
    worker: Option<CollisionWorker>,
    last_player_pos: Option<Vec2>,
}

impl ObjectElementManager {
    pub fn new(config: CollisionConfig) -> Self {
        let worker = match config.mode {
            CollisionMode::InProcess => None,
            CollisionMode::Worker => match CollisionWorker::spawn() {
                Ok(worker) => Some(worker),
                Err(e) => {
                    log::warn!("{e}; falling back to in-process collision");
                    None
                }
            },
        };

        Self {
            elements: BTreeMap::new(),
            next_id: FIRST_MANAGED_ID,
            config,
            pair_cooldowns: HashMap::new(),
            worker,
            last_player_pos: None,
        }
    }

    pub fn collision_mode(&self) -> CollisionMode {
        if self.worker.is_some() {
            CollisionMode::Worker
        } else {
            CollisionMode::InProcess
        }
    }

    /// Allocate the next id and register what `factory` builds with it
    pub fn spawn<F>(&mut self, factory: F, dice: &mut Dice) -> SimResult<&Entity>
    where
        F: FnOnce(ElementId, &mut Dice) -> Entity,
    {
        let id = self.next_id;
        self.next_id += 1;

        let mut entity = factory(id, dice);
        if entity.kind() == EntityKind::Player {
            return Err(SimError::PlayerSpawnedInManager {
                kind: entity.kind(),
            });
        }
        if entity.id() != id {
            return Err(SimError::FactoryIdMismatch {
                expected: id,
                got: entity.id(),
            });
        }
        if let KindData::Enemy(data) = &mut entity.data {
            data.last_player_pos = self.last_player_pos;
        }

        log::debug!("spawned {} {}", entity.kind(), id);
        Ok(self.elements.entry(id).or_insert(entity))
    }

    /// Place the opening enemies: a grid of slimes plus the listed black enemies
    pub fn spawn_initial_elements(&mut self, config: &SpawnConfig, dice: &mut Dice) -> SimResult<usize> {
        let before = self.elements.len();
        for row in 0..config.slime_rows {
            for col in 0..config.slime_columns {
                let position = config.slime_origin
                    + Vec2::new(col as f32, row as f32) * config.slime_spacing;
                let (level, stats) = (config.slime_level, config.enemy_stats);
                self.spawn(
                    |id, dice| enemy::create_slime(id, position, level, stats, dice),
                    dice,
                )?;
            }
        }
        for &position in &config.black_enemies {
            let (level, stats) = (config.black_enemy_level, config.enemy_stats);
            self.spawn(
                |id, dice| enemy::create_black_enemy(id, position, level, stats, dice),
                dice,
            )?;
        }
        let spawned = self.elements.len() - before;
        log::info!("spawned {spawned} initial enemies");
        Ok(spawned)
    }

    /// Returns whether an entity was removed
    pub fn remove_by_id(&mut self, id: ElementId) -> bool {
        let removed = self.elements.remove(&id).is_some();
        if removed {
            self.pair_cooldowns.retain(|(a, b), _| *a != id && *b != id);
            log::debug!("removed {id}");
        }
        removed
    }

    pub fn get(&self, id: ElementId) -> Option<&Entity> {
        self.elements.get(&id)
    }

    pub fn get_mut(&mut self, id: ElementId) -> Option<&mut Entity> {
        self.elements.get_mut(&id)
    }

    /// Live and not-yet-purged entities, in id order
    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.elements.values()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn get_all_renderable_states(&self, with_hitboxes: bool) -> Vec<RenderableState> {
        self.elements
            .values()
            .filter(|e| e.is_alive())
            .map(|e| RenderableState::of(e, with_hitboxes))
            .collect()
    }

    /// Run one tick over every managed entity, with `player` taking part in
    /// collisions. A failing spawn factory aborts the tick once the events
    /// queued alongside it have been applied.
    pub fn update_all(
        &mut self,
        dt: f32,
        world: Size,
        player: &mut Entity,
        bus: &mut EventBus,
        dice: &mut Dice,
    ) -> SimResult<TickReport> {
        let mut report = TickReport::default();

        self.process_events(bus, dice, &mut report)?;
        self.purge_dead(&mut report);

        self.update_entities(dt, world, player, bus, dice);

        for entity in self.elements.values_mut() {
            entity.clamp_to(world);
        }
        player.clamp_to(world);

        let pairs = self.collect_pairs(world, player)?;
        self.pair_cooldowns.retain(|_, remaining| {
            *remaining -= dt;
            *remaining > 0.0
        });
        for [a, b] in pairs {
            if self.resolve_pair(a, b, player, bus, dice)? {
                report.collisions += 1;
            }
        }

        self.process_events(bus, dice, &mut report)?;
        Ok(report)
    }

    fn purge_dead(&mut self, report: &mut TickReport) {
        let dead: Vec<ElementId> = self
            .elements
            .values()
            .filter(|e| !e.is_alive() || e.state() == EntityState::Dead)
            .map(Entity::id)
            .collect();
        for id in dead {
            if self.remove_by_id(id) {
                report.removed += 1;
            }
        }
    }

    fn update_entities(&mut self, dt: f32, world: Size, player: &Entity, bus: &mut EventBus, dice: &mut Dice) {
        let neighbors: Vec<Neighbor> = iter::once(player)
            .chain(self.elements.values())
            .filter(|e| e.is_alive())
            .map(Neighbor::of)
            .collect();
        let mut index = Quadtree::new(world_rect(world), self.config.quadtree);
        for (i, entity) in iter::once(player)
            .chain(self.elements.values())
            .filter(|e| e.is_alive())
            .enumerate()
        {
            index.insert(entity.broad_bounds(), i);
        }

        let ids: Vec<ElementId> = self.elements.keys().copied().collect();
        for id in ids {
            let Some(entity) = self.elements.get_mut(&id) else {
                continue;
            };
            if !entity.is_alive() {
                continue;
            }
            let Some(behavior) = behavior_for(entity.kind()) else {
                log::trace!("no behavior for {} {id}", entity.kind());
                continue;
            };

            let reach = entity.size().width.max(entity.size().height);
            let area = entity.broad_bounds().expanded(reach);
            let nearby: Vec<Neighbor> = index
                .retrieve(&area)
                .into_iter()
                .map(|i| neighbors[i].clone())
                .filter(|n| n.id != id)
                .collect();

            let mut ctx = UpdateContext {
                dt,
                world,
                bus: &mut *bus,
                dice: &mut *dice,
                neighbors: &nearby,
            };
            (behavior.update)(entity, &mut ctx);
        }
    }

    fn collect_pairs(&mut self, world: Size, player: &Entity) -> SimResult<Vec<[ElementId; 2]>> {
        let request = CollisionRequest {
            elements: iter::once(player)
                .chain(self.elements.values())
                .filter(|e| e.is_alive())
                .map(CollisionBody::of)
                .collect(),
            world_bounds: world_rect(world),
            quadtree: self.config.quadtree,
        };

        match &mut self.worker {
            Some(worker) => {
                let ready = worker.poll()?;
                if !worker.submit(request)? {
                    log::trace!("collision pass still in flight, skipping submit");
                }
                Ok(ready.unwrap_or_default())
            }
            None => Ok(find_colliding_pairs(&request)),
        }
    }

    /// Run both callbacks of a pair. Returns false when the pair was skipped.
    fn resolve_pair(
        &mut self,
        a: ElementId,
        b: ElementId,
        player: &mut Entity,
        bus: &mut EventBus,
        dice: &mut Dice,
    ) -> SimResult<bool> {
        let key = (a.min(b), a.max(b));
        if self.pair_cooldowns.contains_key(&key) {
            return Ok(false);
        }

        let (peer_a, peer_b) = {
            let (Some(ea), Some(eb)) = (
                lookup(&self.elements, player, a),
                lookup(&self.elements, player, b),
            ) else {
                return Ok(false);
            };
            if !ea.is_alive() || !eb.is_alive() {
                return Ok(false);
            }
            (
                CollisionPeer::snapshot(ea, eb, dice),
                CollisionPeer::snapshot(eb, ea, dice),
            )
        };

        let mut ctx = CollisionContext { bus, dice };
        for (id, peer) in [(a, &peer_b), (b, &peer_a)] {
            let Some(entity) = lookup_mut(&mut self.elements, player, id) else {
                continue;
            };
            if let Some(behavior) = behavior_for(entity.kind()) {
                (behavior.on_collision)(entity, peer, &mut ctx);
            }
        }

        if self.config.pair_cooldown > 0.0 {
            self.pair_cooldowns.insert(key, self.config.pair_cooldown);
        }
        Ok(true)
    }

    /// Apply every drained event even when one fails; the first failure is
    /// returned afterwards.
    fn process_events(&mut self, bus: &mut EventBus, dice: &mut Dice, report: &mut TickReport) -> SimResult<()> {
        let mut first_error = None;
        for event in bus.drain() {
            match event {
                GameEvent::Spawn(SpawnRequest { factory, on_spawned }) => match self.spawn(factory, dice) {
                    Ok(entity) => {
                        if let Some(callback) = on_spawned {
                            callback(entity);
                        }
                        report.spawned += 1;
                    }
                    Err(e) => {
                        log::error!("spawn failed: {e}");
                        first_error.get_or_insert(e);
                    }
                },
                GameEvent::Despawn { object_id } => {
                    if self.remove_by_id(object_id) {
                        report.removed += 1;
                    }
                }
                GameEvent::PlayerMoved { x, y } => {
                    self.broadcast_player_position(Vec2::new(x, y));
                    report.events.push(GameEvent::PlayerMoved { x, y });
                }
                other => report.events.push(other),
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    fn broadcast_player_position(&mut self, position: Vec2) {
        self.last_player_pos = Some(position);
        for entity in self.elements.values_mut() {
            if let KindData::Enemy(data) = &mut entity.data {
                data.last_player_pos = Some(position);
            }
        }
    }

    #[cfg(test)]
    pub(crate) fn worker_mut(&mut self) -> Option<&mut CollisionWorker> {
        self.worker.as_mut()
    }
}

impl std::fmt::Debug for ObjectElementManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectElementManager")
            .field("elements", &self.elements.len())
            .field("next_id", &self.next_id)
            .field("mode", &self.collision_mode())
            .finish()
    }
}

fn world_rect(world: Size) -> Rect {
    Rect::new(0.0, 0.0, world.width, world.height)
}

fn lookup<'a>(elements: &'a BTreeMap<ElementId, Entity>, player: &'a Entity, id: ElementId) -> Option<&'a Entity> {
    if id == player.id() {
        Some(player)
    } else {
        elements.get(&id)
    }
}

fn lookup_mut<'a>(
    elements: &'a mut BTreeMap<ElementId, Entity>,
    player: &'a mut Entity,
    id: ElementId,
) -> Option<&'a mut Entity> {
    if id == player.id() {
        Some(player)
    } else {
        elements.get_mut(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::*;
    use crate::sim::attributes::PrimaryStats;
    use crate::sim::bullet;
    use crate::sim::combat::{AttackInfo, DamageType};
    use crate::sim::events::EventTopic;
    use crate::sim::hitbox::HitBox;
    use crate::sim::player;
    use std::time::Duration;

    const WORLD: Size = Size::new(1024.0, 1024.0);

    struct Fixture {
        manager: ObjectElementManager,
        player: Entity,
        bus: EventBus,
        dice: Dice,
    }

    impl Fixture {
        fn new(config: CollisionConfig) -> Self {
            let mut dice = Dice::new(5);
            let player = player::create(PLAYER_ID, Vec2::new(900.0, 900.0), 1, PrimaryStats::default(), &mut dice);
            Self {
                manager: ObjectElementManager::new(config),
                player,
                bus: EventBus::new(),
                dice,
            }
        }

        fn tick(&mut self, dt: f32) -> TickReport {
            self.manager
                .update_all(dt, WORLD, &mut self.player, &mut self.bus, &mut self.dice)
                .unwrap()
        }

        fn slime_at(&mut self, position: Vec2) -> ElementId {
            self.manager
                .spawn(
                    |id, dice| enemy::create_slime(id, position, 1, PrimaryStats::default(), dice),
                    &mut self.dice,
                )
                .unwrap()
                .id()
        }
    }

    fn lethal() -> AttackInfo {
        AttackInfo {
            attacker_id: PLAYER_ID,
            total_damage: 999,
            damage_type: DamageType::Physical,
            is_critical: false,
            direction: Vec2::X,
        }
    }

    #[test]
    fn test_ids_start_at_100_and_increase() {
        let mut f = Fixture::new(CollisionConfig::default());
        assert_eq!(f.slime_at(Vec2::ZERO), 100);
        assert_eq!(f.slime_at(Vec2::new(50.0, 0.0)), 101);
        f.manager.remove_by_id(101);
        assert_eq!(f.slime_at(Vec2::new(90.0, 0.0)), 102);
    }

    #[test]
    fn test_factory_with_wrong_id_is_rejected() {
        let mut f = Fixture::new(CollisionConfig::default());
        let err = f
            .manager
            .spawn(
                |_, dice| enemy::create_slime(7, Vec2::ZERO, 1, PrimaryStats::default(), dice),
                &mut f.dice,
            )
            .unwrap_err();
        assert_eq!(err, SimError::FactoryIdMismatch { expected: 100, got: 7 });
        assert!(f.manager.is_empty());
    }

    #[test]
    fn test_player_cannot_be_managed() {
        let mut f = Fixture::new(CollisionConfig::default());
        let err = f
            .manager
            .spawn(
                |id, dice| player::create(id, Vec2::ZERO, 1, PrimaryStats::default(), dice),
                &mut f.dice,
            )
            .unwrap_err();
        assert!(matches!(err, SimError::PlayerSpawnedInManager { .. }));
    }

    #[test]
    fn test_remove_unknown_is_false() {
        let mut f = Fixture::new(CollisionConfig::default());
        assert!(!f.manager.remove_by_id(4242));
    }

    #[test]
    fn test_initial_layout() {
        let mut f = Fixture::new(CollisionConfig::default());
        let config = SpawnConfig::default();
        let n = f.manager.spawn_initial_elements(&config, &mut f.dice).unwrap();
        assert_eq!(n, (config.slime_columns * config.slime_rows) as usize + config.black_enemies.len());
        assert_eq!(f.manager.get(100).unwrap().coordinates(), config.slime_origin);
        let blacks = f
            .manager
            .iter()
            .filter(|e| e.kind() == EntityKind::BlackEnemy)
            .count();
        assert_eq!(blacks, config.black_enemies.len());
    }

    #[test]
    fn test_killed_enemy_is_gone_after_the_tick() {
        let mut f = Fixture::new(CollisionConfig::default());
        let id = f.slime_at(Vec2::new(200.0, 200.0));
        f.manager.get_mut(id).unwrap().take_damage(&lethal(), &mut f.bus);

        let report = f.tick(SIM_DT);
        assert!(f.manager.get(id).is_none());
        assert_eq!(report.removed, 1);
        let died: Vec<_> = report
            .events
            .iter()
            .filter(|e| e.topic() == EventTopic::EnemyDied)
            .collect();
        assert_eq!(died.len(), 1);
        assert!(f.manager.get_all_renderable_states(false).iter().all(|r| r.id != id));
    }

    #[test]
    fn test_bullet_spawned_through_bus_kills_enemy() {
        let mut f = Fixture::new(CollisionConfig::default());
        let target = f.slime_at(Vec2::new(300.0, 200.0));
        let origin = Vec2::new(297.0, 208.0);
        f.bus.dispatch(GameEvent::Spawn(SpawnRequest::new(move |id, _| {
            bullet::create_exact(id, origin, Vec2::X, lethal(), 0)
        })));

        let report = f.tick(SIM_DT);
        assert_eq!(report.spawned, 1);
        assert_eq!(report.collisions, 1);
        assert!(f.manager.get(target).is_none());
        // The spent bullet is gone too
        assert!(f.manager.is_empty());
        assert!(report.events.iter().any(|e| matches!(
            e,
            GameEvent::EnemyDied { enemy_id, killer_id: PLAYER_ID, .. } if *enemy_id == target
        )));
    }

    #[test]
    fn test_overlap_on_several_hitboxes_resolves_once() {
        let mut f = Fixture::new(CollisionConfig {
            pair_cooldown: 0.0,
            ..CollisionConfig::default()
        });
        let target = f.slime_at(Vec2::new(300.0, 200.0));
        let slime = f.manager.get_mut(target).unwrap();
        // A second, smaller hitbox on the leading edge, also under the bullet
        slime.hitboxes.push(HitBox::Circle {
            offset: Vec2::new(4.0, 8.0),
            radius: 4.0,
        });
        let hp = slime.attributes.hp();

        let graze = AttackInfo {
            total_damage: 3,
            ..lethal()
        };
        let origin = Vec2::new(297.0, 208.0);
        f.bus.dispatch(GameEvent::Spawn(SpawnRequest::new(move |id, _| {
            bullet::create_exact(id, origin, Vec2::X, graze, 1)
        })));

        let report = f.tick(SIM_DT);
        assert_eq!(report.collisions, 1);
        // One hit taken, one pierce spent
        assert_eq!(f.manager.get(target).unwrap().attributes.hp(), hp - 3);
        let shot = f
            .manager
            .iter()
            .find(|e| e.kind() == EntityKind::SimpleBullet)
            .expect("bullet still flying");
        assert!(shot.is_alive());
        let KindData::Bullet(data) = &shot.data else {
            panic!("bullet without bullet data");
        };
        assert_eq!(data.pierce_left, 0);
    }

    #[test]
    fn test_spawn_failure_still_applies_queued_events() {
        let mut f = Fixture::new(CollisionConfig::default());
        let doomed = f.slime_at(Vec2::new(600.0, 600.0));
        f.bus.dispatch(GameEvent::Spawn(SpawnRequest::new(|_, dice| {
            enemy::create_slime(7, Vec2::ZERO, 1, PrimaryStats::default(), dice)
        })));
        f.bus.dispatch(GameEvent::Despawn { object_id: doomed });
        f.bus.dispatch(GameEvent::Spawn(SpawnRequest::new(|id, dice| {
            enemy::create_slime(id, Vec2::new(100.0, 100.0), 1, PrimaryStats::default(), dice)
        })));

        let err = f
            .manager
            .update_all(SIM_DT, WORLD, &mut f.player, &mut f.bus, &mut f.dice)
            .unwrap_err();
        assert_eq!(err, SimError::FactoryIdMismatch { expected: 101, got: 7 });
        assert!(f.manager.get(doomed).is_none());
        assert_eq!(f.manager.len(), 1);
        assert_eq!(f.manager.get(102).unwrap().kind(), EntityKind::Slime);
        assert_eq!(f.bus.pending(), 0);
    }

    #[test]
    fn test_pair_cooldown_suppresses_repeat_contact() {
        let mut f = Fixture::new(CollisionConfig {
            pair_cooldown: 0.05,
            ..CollisionConfig::default()
        });
        f.player.element.coordinates = Vec2::new(400.0, 400.0);
        let slime = f.slime_at(Vec2::new(410.0, 400.0));

        let first = f.tick(0.01);
        assert_eq!(first.collisions, 1);
        assert!(f.manager.get(slime).unwrap().timers.is_running(crate::sim::timers::TimerKind::ContactLock));
        let second = f.tick(0.01);
        assert_eq!(second.collisions, 0);
    }

    #[test]
    fn test_contact_damages_player_once_per_cooldown() {
        let mut f = Fixture::new(CollisionConfig {
            pair_cooldown: 0.0,
            ..CollisionConfig::default()
        });
        f.player.element.coordinates = Vec2::new(400.0, 400.0);
        f.slime_at(Vec2::new(405.0, 400.0));
        let hp = f.player.attributes.hp();

        f.tick(0.01);
        let after_first = f.player.attributes.hp();
        assert!(after_first < hp);
        f.tick(0.01);
        assert_eq!(f.player.attributes.hp(), after_first);
    }

    #[test]
    fn test_player_position_reaches_enemies() {
        let mut f = Fixture::new(CollisionConfig::default());
        let id = f.slime_at(Vec2::new(100.0, 100.0));
        f.bus.dispatch(GameEvent::PlayerMoved { x: 500.0, y: 100.0 });
        f.tick(0.1);
        let slime = f.manager.get(id).unwrap();
        assert!(slime.coordinates().x > 100.0);
        assert_eq!(slime.state(), EntityState::Walking);

        // Spawned later, still knows where to go
        let late = f.slime_at(Vec2::new(100.0, 300.0));
        let KindData::Enemy(data) = &f.manager.get(late).unwrap().data else {
            panic!("slime without enemy data");
        };
        assert_eq!(data.last_player_pos, Some(Vec2::new(500.0, 100.0)));
    }

    #[test]
    fn test_entities_stay_in_world() {
        let mut f = Fixture::new(CollisionConfig::default());
        let id = f.slime_at(Vec2::new(1020.0, -30.0));
        f.tick(SIM_DT);
        let c = f.manager.get(id).unwrap().coordinates();
        assert_eq!(c, Vec2::new(1024.0 - ACTOR_SIZE, 0.0));
    }

    #[test]
    fn test_worker_mode_reports_pairs_a_tick_later() {
        let mut f = Fixture::new(CollisionConfig {
            mode: CollisionMode::Worker,
            pair_cooldown: 0.0,
            ..CollisionConfig::default()
        });
        assert_eq!(f.manager.collision_mode(), CollisionMode::Worker);
        f.player.element.coordinates = Vec2::new(400.0, 400.0);
        f.slime_at(Vec2::new(405.0, 400.0));

        // First pass only submits the snapshot
        assert_eq!(f.tick(0.001).collisions, 0);
        let mut seen = 0;
        for _ in 0..200 {
            seen += f.tick(0.001).collisions;
            if seen > 0 {
                break;
            }
            std::thread::sleep(Duration::from_millis(2));
        }
        assert!(seen > 0);
        assert!(f.manager.worker_mut().is_some());
    }
}
