//! Identity record shared by everything that lives in the world

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

pub type ElementId = u32;

/// Type tag of a simulated object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityKind {
    Player,
    Slime,
    BlackEnemy,
    SimpleBullet,
    /// Passive marker shape, no behavior
    Circle,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Player => "player",
            EntityKind::Slime => "slime",
            EntityKind::BlackEnemy => "blackEnemy",
            EntityKind::SimpleBullet => "simpleBullet",
            EntityKind::Circle => "circle",
        }
    }

    pub fn is_enemy(&self) -> bool {
        matches!(self, EntityKind::Slime | EntityKind::BlackEnemy)
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Behavioral state tag, used by presentation to pick animations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EntityState {
    Idle,
    Walking,
    Waiting,
    Travelling,
    Dead,
}

impl EntityState {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityState::Idle => "idle",
            EntityState::Walking => "walking",
            EntityState::Waiting => "waiting",
            EntityState::Travelling => "travelling",
            EntityState::Dead => "dead",
        }
    }
}

impl fmt::Display for EntityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn as_vec2(&self) -> Vec2 {
        Vec2::new(self.width, self.height)
    }
}

/// Axis-aligned rectangle anchored at its top-left corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Inclusive overlap test (touching edges count)
    pub fn overlaps(&self, other: &Rect) -> bool {
        !(other.x > self.right()
            || other.right() < self.x
            || other.y > self.bottom()
            || other.bottom() < self.y)
    }

    /// True if `other` lies entirely inside this rectangle
    pub fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Grow by `margin` on every side
    pub fn expanded(&self, margin: f32) -> Rect {
        Rect::new(
            self.x - margin,
            self.y - margin,
            self.width + margin * 2.0,
            self.height + margin * 2.0,
        )
    }
}

/// Base identity record: no behavior of its own
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectElement {
    pub id: ElementId,
    /// Top-left position in world space
    pub coordinates: Vec2,
    size: Size,
    pub kind: EntityKind,
    pub state: EntityState,
    /// Radians
    pub rotation: f32,
}

impl ObjectElement {
    pub fn new(id: ElementId, kind: EntityKind, coordinates: Vec2, size: Size, state: EntityState) -> Self {
        Self {
            id,
            coordinates,
            size,
            kind,
            state,
            rotation: 0.0,
        }
    }

    pub fn size(&self) -> Size {
        self.size
    }

    pub fn center(&self) -> Vec2 {
        self.coordinates + self.size.as_vec2() * 0.5
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.coordinates.x,
            self.coordinates.y,
            self.size.width,
            self.size.height,
        )
    }

    /// Keep the whole footprint inside `[0, world]`
    pub fn clamp_to(&mut self, world: Size) {
        let max_x = (world.width - self.size.width).max(0.0);
        let max_y = (world.height - self.size.height).max(0.0);
        self.coordinates.x = self.coordinates.x.clamp(0.0, max_x);
        self.coordinates.y = self.coordinates.y.clamp(0.0, max_y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_tags() {
        assert_eq!(EntityKind::BlackEnemy.to_string(), "blackEnemy");
        assert_eq!(EntityKind::SimpleBullet.as_str(), "simpleBullet");
        assert_eq!(
            serde_json::to_string(&EntityKind::BlackEnemy).unwrap(),
            "\"blackEnemy\""
        );
        assert!(EntityKind::Slime.is_enemy());
        assert!(!EntityKind::Player.is_enemy());
    }

    #[test]
    fn test_rect_overlap_and_containment() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(a.overlaps(&Rect::new(10.0, 10.0, 5.0, 5.0)));
        assert!(!a.overlaps(&Rect::new(10.5, 0.0, 5.0, 5.0)));
        assert!(a.contains(&Rect::new(2.0, 2.0, 3.0, 3.0)));
        assert!(!a.contains(&Rect::new(8.0, 8.0, 3.0, 3.0)));
    }

    #[test]
    fn test_clamp_keeps_footprint_inside() {
        let mut el = ObjectElement::new(
            1,
            EntityKind::Player,
            Vec2::new(1020.0, -5.0),
            Size::new(16.0, 16.0),
            EntityState::Idle,
        );
        el.clamp_to(Size::new(1024.0, 1024.0));
        assert_eq!(el.coordinates, Vec2::new(1008.0, 0.0));
        assert_eq!(el.center(), Vec2::new(1016.0, 8.0));
    }
}
