//! The simulation's public surface
//!
//! `Simulation` owns the world, the player, the entity manager, the event
//! bus and the dice. A driver calls `set_world` once, then per frame feeds
//! input with `handle_player_interactions`, advances with `update`, and reads
//! `render_state`. Gameplay consequences that cross entities (XP awards,
//! level-ups) are settled here after the manager's pass.

use glam::Vec2;

use super::actions::{Action, ActionManager};
use super::behavior::{UpdateContext, behavior_for};
use super::combat::{AttackInfo, DamageOutcome};
use super::dice::Dice;
use super::element::ElementId;
use super::element::Size;
use super::entity::Entity;
use super::events::{EventBus, EventTopic, GameEvent, SubscriptionId};
use super::manager::{ObjectElementManager, TickReport};
use super::player;
use super::render_state::{RenderState, RenderableState, WorldState};
use crate::consts::FIRST_MANAGED_ID;
use crate::error::{SimError, SimResult};
use crate::settings::SimConfig;

/// Per-tick numbers for drivers and logs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub tick: u64,
    pub entities: usize,
    pub collisions: usize,
    pub spawned: usize,
    pub removed: usize,
}

pub struct Simulation {
    config: SimConfig,
    world: Option<Size>,
    player: Option<Entity>,
    manager: ObjectElementManager,
    bus: EventBus,
    dice: Dice,
    tick: u64,
}

impl Simulation {
    pub fn new(config: SimConfig) -> Self {
        let seed = config.resolve_seed();
        log::info!("simulation seed {seed}");
        Self {
            manager: ObjectElementManager::new(config.collision.clone()),
            config,
            world: None,
            player: None,
            bus: EventBus::new(),
            dice: Dice::new(seed),
            tick: 0,
        }
    }

    /// Create the world: place the player and, if enabled, the opening
    /// enemies. Calling it again only resizes the world. The player id must
    /// sit below the managed range so every id stays unique.
    pub fn set_world(&mut self, width: f32, height: f32) -> SimResult<()> {
        let id = self.config.player.id;
        if id >= FIRST_MANAGED_ID {
            return Err(SimError::PlayerIdInManagedRange {
                id,
                first_managed: FIRST_MANAGED_ID,
            });
        }
        let size = Size::new(width, height);
        self.world = Some(size);
        log::info!("world set to {width}x{height}");

        if self.player.is_some() {
            return Ok(());
        }

        let cfg = &self.config.player;
        let position = cfg
            .position
            .unwrap_or_else(|| size.as_vec2() * 0.5 - Vec2::splat(crate::consts::ACTOR_SIZE * 0.5));
        let mut hero = player::create(cfg.id, position, cfg.level, cfg.stats, &mut self.dice);
        // Seed the XP threshold for the starting level
        hero.attributes.add_xp(0.0, &self.config.xp);
        self.player = Some(hero);

        if self.config.spawn.enabled {
            self.manager
                .spawn_initial_elements(&self.config.spawn, &mut self.dice)?;
        }
        Ok(())
    }

    pub fn world(&self) -> Option<Size> {
        self.world
    }

    /// Apply this frame's input to the player right away. Abilities that
    /// create entities only queue a spawn; it lands on the next `update`.
    pub fn handle_player_interactions(&mut self, actions: &[Action], mouse: Vec2) -> SimResult<()> {
        let player = self.player.as_mut().ok_or(SimError::WorldNotInitialized)?;
        ActionManager::apply(player, actions, mouse, &mut self.bus, &mut self.dice);
        Ok(())
    }

    /// Advance the simulation by `dt` seconds
    pub fn update(&mut self, dt: f32) -> SimResult<TickSummary> {
        let world = self.world.ok_or(SimError::WorldNotInitialized)?;
        let player = self.player.as_mut().ok_or(SimError::WorldNotInitialized)?;

        if let Some(behavior) = behavior_for(player.kind()) {
            let mut ctx = UpdateContext {
                dt,
                world,
                bus: &mut self.bus,
                dice: &mut self.dice,
                neighbors: &[],
            };
            (behavior.update)(player, &mut ctx);
        }

        let report = self
            .manager
            .update_all(dt, world, player, &mut self.bus, &mut self.dice)?;
        self.tick += 1;
        let summary = TickSummary {
            tick: self.tick,
            entities: self.manager.len() + 1,
            collisions: report.collisions,
            spawned: report.spawned,
            removed: report.removed,
        };
        self.settle(report);
        Ok(summary)
    }

    fn settle(&mut self, report: TickReport) {
        let Some(player) = self.player.as_mut() else {
            return;
        };
        for event in report.events {
            match event {
                GameEvent::EnemyDied {
                    enemy_id,
                    xp_given,
                    killer_id,
                } if killer_id == player.id() => {
                    let gained = player.attributes.add_xp(xp_given, &self.config.xp);
                    log::debug!("player earned {xp_given} xp from {enemy_id}");
                    if gained > 0 {
                        let level = player.attributes.level();
                        log::info!("player reached level {level}");
                        self.bus.dispatch(GameEvent::LevelUp {
                            entity_id: player.id(),
                            level,
                        });
                    }
                }
                GameEvent::PlayerDied => log::warn!("player died on tick {}", self.tick),
                _ => {}
            }
        }
    }

    /// Apply a resolved hit to the player or a managed entity. A kill is
    /// settled on the next `update`.
    pub fn apply_attack(&mut self, target: ElementId, attack: &AttackInfo) -> SimResult<DamageOutcome> {
        let entity = match self.player.as_mut() {
            Some(player) if player.id() == target => Some(player),
            _ => self.manager.get_mut(target),
        };
        let entity = entity.ok_or(SimError::UnknownEntity(target))?;
        Ok(entity.take_damage(attack, &mut self.bus))
    }

    pub fn render_state(&self) -> SimResult<RenderState> {
        let world = self.world.ok_or(SimError::WorldNotInitialized)?;
        let player = self.player.as_ref().ok_or(SimError::WorldNotInitialized)?;

        let with_hitboxes = self.config.debug_hitboxes;
        let mut renderables = vec![RenderableState::of(player, with_hitboxes)];
        renderables.extend(self.manager.get_all_renderable_states(with_hitboxes));

        Ok(RenderState {
            world: WorldState {
                width: world.width,
                height: world.height,
            },
            renderables,
        })
    }

    pub fn set_debug_hitboxes(&mut self, enabled: bool) {
        self.config.debug_hitboxes = enabled;
    }

    pub fn subscribe(&mut self, topic: EventTopic, listener: impl FnMut(&GameEvent) + 'static) -> SubscriptionId {
        self.bus.on(topic, listener)
    }

    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.bus.off(id)
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn seed(&self) -> u64 {
        self.dice.seed()
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn player(&self) -> Option<&Entity> {
        self.player.as_ref()
    }

    pub fn player_mut(&mut self) -> Option<&mut Entity> {
        self.player.as_mut()
    }

    pub fn manager(&self) -> &ObjectElementManager {
        &self.manager
    }

    /// Manager plus the dice, for spawning from outside a tick
    pub fn manager_mut(&mut self) -> (&mut ObjectElementManager, &mut Dice) {
        (&mut self.manager, &mut self.dice)
    }

    pub fn bus_mut(&mut self) -> &mut EventBus {
        &mut self.bus
    }
}

impl std::fmt::Debug for Simulation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Simulation")
            .field("world", &self.world)
            .field("tick", &self.tick)
            .field("manager", &self.manager)
            .finish_non_exhaustive()
    }
}
