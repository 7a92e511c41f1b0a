//! Read-only snapshot handed to the renderer
//!
//! Field names and type tags are the wire contract with the presentation
//! layer (camelCase JSON).

use glam::Vec2;
use serde::Serialize;

use super::element::{ElementId, EntityKind, EntityState, Size};
use super::entity::{Entity, KindData};
use super::hitbox::HitboxShape;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub x: f32,
    pub y: f32,
}

impl From<Vec2> for Coordinates {
    fn from(v: Vec2) -> Self {
        Self { x: v.x, y: v.y }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderableState {
    pub id: ElementId,
    pub entity_type_id: EntityKind,
    pub coordinates: Coordinates,
    pub size: Size,
    pub state: EntityState,
    pub rotation: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hitboxes: Option<Vec<HitboxShape>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_xp: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xp_to_next_level: Option<f64>,
}

impl RenderableState {
    pub fn of(entity: &Entity, with_hitboxes: bool) -> Self {
        let is_player = matches!(entity.data, KindData::Player(_));
        let attrs = &entity.attributes;
        Self {
            id: entity.id(),
            entity_type_id: entity.kind(),
            coordinates: entity.coordinates().into(),
            size: entity.size(),
            state: entity.state(),
            rotation: entity.element.rotation,
            hitboxes: with_hitboxes.then(|| entity.hitbox_shapes()),
            level: is_player.then(|| attrs.level()),
            current_xp: is_player.then(|| attrs.current_xp()),
            xp_to_next_level: is_player.then(|| attrs.xp_to_next_level()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct WorldState {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderState {
    pub world: WorldState,
    pub renderables: Vec<RenderableState>,
}

impl RenderState {
    pub fn find(&self, id: ElementId) -> Option<&RenderableState> {
        self.renderables.iter().find(|r| r.id == id)
    }
}
