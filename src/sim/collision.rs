//! Narrow-phase pair finding
//!
//! Pure function over a snapshot of bodies: no entity references cross this
//! boundary, so the same code runs in-process or on the collision worker.
//! Each unordered pair is reported at most once per pass, with the body seen
//! first in snapshot order on the left.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::element::{ElementId, Rect};
use super::entity::Entity;
use super::hitbox::HitboxShape;
use super::quadtree::{Quadtree, QuadtreeConfig};

/// Plain-data view of an entity for one collision pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionBody {
    pub id: ElementId,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// `None` for bodies that never collide
    pub hitboxes: Option<Vec<HitboxShape>>,
}

impl CollisionBody {
    pub fn of(entity: &Entity) -> Self {
        let bounds = entity.broad_bounds();
        let shapes = entity.hitbox_shapes();
        Self {
            id: entity.id(),
            x: bounds.x,
            y: bounds.y,
            width: bounds.width,
            height: bounds.height,
            hitboxes: (!shapes.is_empty()).then_some(shapes),
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollisionRequest {
    pub elements: Vec<CollisionBody>,
    pub world_bounds: Rect,
    #[serde(default)]
    pub quadtree: QuadtreeConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CollisionResponse(pub Vec<[ElementId; 2]>);

pub fn find_colliding_pairs(request: &CollisionRequest) -> Vec<[ElementId; 2]> {
    let bodies = &request.elements;
    let mut tree = Quadtree::new(request.world_bounds, request.quadtree);
    for (i, body) in bodies.iter().enumerate() {
        tree.insert(body.bounds(), i);
    }

    let mut tested: HashSet<(ElementId, ElementId)> = HashSet::new();
    let mut pairs = Vec::new();

    for a in bodies {
        let Some(a_shapes) = &a.hitboxes else {
            continue;
        };
        let area = a.bounds();
        for j in tree.retrieve(&area) {
            let b = &bodies[j];
            if b.id == a.id {
                continue;
            }
            let Some(b_shapes) = &b.hitboxes else {
                continue;
            };
            let key = (a.id.min(b.id), a.id.max(b.id));
            if !tested.insert(key) {
                continue;
            }
            if !area.overlaps(&b.bounds()) {
                continue;
            }
            let hit = a_shapes
                .iter()
                .any(|sa| b_shapes.iter().any(|sb| sa.intersects(sb)));
            if hit {
                pairs.push([a.id, b.id]);
            }
        }
    }

    log::trace!("collision pass: {} bodies, {} pairs", bodies.len(), pairs.len());
    pairs
}
