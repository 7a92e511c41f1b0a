//! Typed publish/subscribe bus
//!
//! Entities never hold references to each other; they talk through this bus.
//! It is an ordinary value owned by the simulation and passed down explicitly,
//! so every scenario gets its own isolated bus.
//!
//! `dispatch` notifies subscribers immediately and also queues the event; the
//! manager and the facade drain the queue at fixed points of the tick to apply
//! spawns, despawns and XP awards.

use std::collections::VecDeque;
use std::fmt;

use serde::Serialize;

use super::dice::Dice;
use super::element::ElementId;
use super::entity::Entity;

pub type SpawnFactory = Box<dyn FnOnce(ElementId, &mut Dice) -> Entity>;
pub type SpawnCallback = Box<dyn FnOnce(&Entity)>;
pub type Listener = Box<dyn FnMut(&GameEvent)>;

/// Ask the manager to create an element
pub struct SpawnRequest {
    pub factory: SpawnFactory,
    pub on_spawned: Option<SpawnCallback>,
}

impl SpawnRequest {
    pub fn new(factory: impl FnOnce(ElementId, &mut Dice) -> Entity + 'static) -> Self {
        Self {
            factory: Box::new(factory),
            on_spawned: None,
        }
    }

    pub fn on_spawned(mut self, callback: impl FnOnce(&Entity) + 'static) -> Self {
        self.on_spawned = Some(Box::new(callback));
        self
    }
}

impl fmt::Debug for SpawnRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SpawnRequest")
            .field("on_spawned", &self.on_spawned.is_some())
            .finish_non_exhaustive()
    }
}

#[derive(Debug)]
pub enum GameEvent {
    PlayerMoved { x: f32, y: f32 },
    EnemyDied {
        enemy_id: ElementId,
        xp_given: f64,
        killer_id: ElementId,
    },
    PlayerDied,
    Spawn(SpawnRequest),
    Despawn { object_id: ElementId },
    LevelUp { entity_id: ElementId, level: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventTopic {
    PlayerMoved,
    EnemyDied,
    PlayerDied,
    Spawn,
    Despawn,
    LevelUp,
}

impl EventTopic {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "playerMoved" => Some(EventTopic::PlayerMoved),
            "enemyDied" => Some(EventTopic::EnemyDied),
            "playerDied" => Some(EventTopic::PlayerDied),
            "spawn" => Some(EventTopic::Spawn),
            "despawn" => Some(EventTopic::Despawn),
            "levelUp" => Some(EventTopic::LevelUp),
            _ => None,
        }
    }
}

/// Serializable view of an event, for observers outside the core (HUD)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "topic", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum EventPayload {
    PlayerMoved { x: f32, y: f32 },
    EnemyDied {
        enemy_id: ElementId,
        xp_given: f64,
        killer_id: ElementId,
    },
    PlayerDied {},
    Spawn { has_callback: bool },
    Despawn { object_id: ElementId },
    LevelUp { entity_id: ElementId, level: u32 },
}

impl GameEvent {
    pub fn topic(&self) -> EventTopic {
        match self {
            GameEvent::PlayerMoved { .. } => EventTopic::PlayerMoved,
            GameEvent::EnemyDied { .. } => EventTopic::EnemyDied,
            GameEvent::PlayerDied => EventTopic::PlayerDied,
            GameEvent::Spawn(_) => EventTopic::Spawn,
            GameEvent::Despawn { .. } => EventTopic::Despawn,
            GameEvent::LevelUp { .. } => EventTopic::LevelUp,
        }
    }

    pub fn payload(&self) -> EventPayload {
        match self {
            GameEvent::PlayerMoved { x, y } => EventPayload::PlayerMoved { x: *x, y: *y },
            GameEvent::EnemyDied {
                enemy_id,
                xp_given,
                killer_id,
            } => EventPayload::EnemyDied {
                enemy_id: *enemy_id,
                xp_given: *xp_given,
                killer_id: *killer_id,
            },
            GameEvent::PlayerDied => EventPayload::PlayerDied {},
            GameEvent::Spawn(request) => EventPayload::Spawn {
                has_callback: request.on_spawned.is_some(),
            },
            GameEvent::Despawn { object_id } => EventPayload::Despawn {
                object_id: *object_id,
            },
            GameEvent::LevelUp { entity_id, level } => EventPayload::LevelUp {
                entity_id: *entity_id,
                level: *level,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriptionId(u32);

#[derive(Default)]
pub struct EventBus {
    listeners: Vec<(SubscriptionId, EventTopic, Listener)>,
    queue: VecDeque<GameEvent>,
    next_subscription: u32,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for one topic
    pub fn on(&mut self, topic: EventTopic, listener: impl FnMut(&GameEvent) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, topic, Box::new(listener)));
        id
    }

    pub fn off(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sub, _, _)| *sub != id);
        self.listeners.len() != before
    }

    /// Notify listeners of the event's topic, then queue it for the core
    pub fn dispatch(&mut self, event: GameEvent) {
        let topic = event.topic();
        log::debug!("event {:?}", event.payload());
        for (_, t, listener) in self.listeners.iter_mut() {
            if *t == topic {
                listener(&event);
            }
        }
        self.queue.push_back(event);
    }

    /// Take every queued event, oldest first
    pub fn drain(&mut self) -> Vec<GameEvent> {
        self.queue.drain(..).collect()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .field("queued", &self.queue.len())
            .finish()
    }
}
