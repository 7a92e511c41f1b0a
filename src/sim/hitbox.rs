//! Collision shapes
//!
//! A `HitBox` is stored relative to its owner's top-left corner, so its world
//! geometry is always derived from the owner's current position and can't go
//! stale after a move. `HitboxShape` is the resolved world-space shape; it is
//! plain data and is what crosses the collision worker boundary and what the
//! debug overlay draws.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::element::{Rect, Size};

#[derive(Debug, Clone, PartialEq)]
pub enum HitBox {
    Circle {
        /// Center, relative to the owner's top-left corner
        offset: Vec2,
        radius: f32,
    },
    /// Convex polygon, vertices relative to `offset`, rotated with the owner
    Polygon { offset: Vec2, vertices: Vec<Vec2> },
}

impl HitBox {
    /// Circle centered on a footprint of the given size
    pub fn centered_circle(size: Size, radius: f32) -> Self {
        HitBox::Circle {
            offset: size.as_vec2() * 0.5,
            radius,
        }
    }

    pub fn polygon(offset: Vec2, vertices: Vec<Vec2>) -> Self {
        HitBox::Polygon { offset, vertices }
    }

    /// World-space shape for an owner at `origin` with `rotation`
    pub fn shape_at(&self, origin: Vec2, rotation: f32) -> HitboxShape {
        match self {
            HitBox::Circle { offset, radius } => {
                let c = origin + *offset;
                HitboxShape::Circle {
                    x: c.x,
                    y: c.y,
                    radius: *radius,
                }
            }
            HitBox::Polygon { offset, vertices } => {
                let rot = Vec2::from_angle(rotation);
                let base = origin + *offset;
                HitboxShape::Polygon {
                    vertices: vertices
                        .iter()
                        .map(|v| {
                            let p = base + rot.rotate(*v);
                            [p.x, p.y]
                        })
                        .collect(),
                }
            }
        }
    }
}

/// Resolved world-space shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HitboxShape {
    Circle { x: f32, y: f32, radius: f32 },
    Polygon { vertices: Vec<[f32; 2]> },
}

impl HitboxShape {
    pub fn intersects(&self, other: &HitboxShape) -> bool {
        match (self, other) {
            (
                HitboxShape::Circle { x, y, radius },
                HitboxShape::Circle {
                    x: ox,
                    y: oy,
                    radius: or,
                },
            ) => circle_circle(Vec2::new(*x, *y), *radius, Vec2::new(*ox, *oy), *or),
            (HitboxShape::Circle { x, y, radius }, HitboxShape::Polygon { vertices })
            | (HitboxShape::Polygon { vertices }, HitboxShape::Circle { x, y, radius }) => {
                circle_polygon(Vec2::new(*x, *y), *radius, &to_points(vertices))
            }
            (HitboxShape::Polygon { vertices: a }, HitboxShape::Polygon { vertices: b }) => {
                polygon_polygon(&to_points(a), &to_points(b))
            }
        }
    }

    /// Axis-aligned bounds of the shape
    pub fn bounds(&self) -> Rect {
        match self {
            HitboxShape::Circle { x, y, radius } => {
                Rect::new(x - radius, y - radius, radius * 2.0, radius * 2.0)
            }
            HitboxShape::Polygon { vertices } => {
                let mut min = Vec2::splat(f32::INFINITY);
                let mut max = Vec2::splat(f32::NEG_INFINITY);
                for [vx, vy] in vertices {
                    min = min.min(Vec2::new(*vx, *vy));
                    max = max.max(Vec2::new(*vx, *vy));
                }
                if vertices.is_empty() {
                    return Rect::new(0.0, 0.0, 0.0, 0.0);
                }
                Rect::new(min.x, min.y, max.x - min.x, max.y - min.y)
            }
        }
    }
}

fn to_points(vertices: &[[f32; 2]]) -> Vec<Vec2> {
    vertices.iter().map(|[x, y]| Vec2::new(*x, *y)).collect()
}

/// Touching circles intersect
#[inline]
pub fn circle_circle(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let sum = ra + rb;
    a.distance_squared(b) <= sum * sum
}

fn circle_polygon(center: Vec2, radius: f32, poly: &[Vec2]) -> bool {
    if poly.is_empty() {
        return false;
    }
    let n = poly.len();
    for i in 0..n {
        let p1 = poly[i];
        let p2 = poly[(i + 1) % n];
        let edge = p2 - p1;
        let len_sq = edge.length_squared();
        let t = if len_sq > 0.0 {
            ((center - p1).dot(edge) / len_sq).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let closest = p1 + edge * t;
        if center.distance_squared(closest) <= radius * radius {
            return true;
        }
    }
    point_in_polygon(center, poly)
}

/// Ray casting, works for any simple polygon
fn point_in_polygon(point: Vec2, poly: &[Vec2]) -> bool {
    let mut inside = false;
    let n = poly.len();
    let mut j = n - 1;
    for i in 0..n {
        let (pi, pj) = (poly[i], poly[j]);
        if (pi.y > point.y) != (pj.y > point.y)
            && point.x < (pj.x - pi.x) * (point.y - pi.y) / (pj.y - pi.y) + pi.x
        {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Separating axis test for two convex polygons
fn polygon_polygon(a: &[Vec2], b: &[Vec2]) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    for poly in [a, b] {
        let n = poly.len();
        for i in 0..n {
            let axis = (poly[(i + 1) % n] - poly[i]).perp();
            if axis.length_squared() == 0.0 {
                continue;
            }
            let (min_a, max_a) = project(a, axis);
            let (min_b, max_b) = project(b, axis);
            if max_a < min_b || max_b < min_a {
                return false;
            }
        }
    }
    true
}

fn project(poly: &[Vec2], axis: Vec2) -> (f32, f32) {
    poly.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| {
        let d = p.dot(axis);
        (lo.min(d), hi.max(d))
    })
}
