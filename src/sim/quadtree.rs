//! Region quadtree for broad-phase queries
//!
//! Items are stored with their bounding rectangle. A node splits into four
//! quadrants once it holds more than `max_objects` items and it is above
//! `max_levels`; an item moves down only if it fits wholly inside one
//! quadrant, otherwise it stays on the node. Items outside the root bounds
//! stay on the root, so queries never miss anything.
//!
//! `retrieve` returns a superset of the items overlapping the query area;
//! callers run the exact test themselves.

use serde::{Deserialize, Serialize};

use super::element::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct QuadtreeConfig {
    pub max_objects: usize,
    pub max_levels: u32,
}

impl Default for QuadtreeConfig {
    fn default() -> Self {
        Self {
            max_objects: 10,
            max_levels: 4,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Quadtree<T> {
    bounds: Rect,
    level: u32,
    config: QuadtreeConfig,
    items: Vec<(Rect, T)>,
    children: Option<Box<[Quadtree<T>; 4]>>,
}

impl<T: Clone> Quadtree<T> {
    pub fn new(bounds: Rect, config: QuadtreeConfig) -> Self {
        Self::with_level(bounds, 0, config)
    }

    fn with_level(bounds: Rect, level: u32, config: QuadtreeConfig) -> Self {
        Self {
            bounds,
            level,
            config,
            items: Vec::new(),
            children: None,
        }
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn insert(&mut self, rect: Rect, item: T) {
        if let Some(children) = &mut self.children {
            if let Some(child) = children.iter_mut().find(|c| c.bounds.contains(&rect)) {
                child.insert(rect, item);
                return;
            }
        }

        self.items.push((rect, item));

        if self.children.is_none()
            && self.items.len() > self.config.max_objects
            && self.level < self.config.max_levels
        {
            self.split();
        }
    }

    fn split(&mut self) {
        let Rect { x, y, width, height } = self.bounds;
        let (hw, hh) = (width / 2.0, height / 2.0);
        let level = self.level + 1;
        let config = self.config;
        let mut children = Box::new([
            Quadtree::with_level(Rect::new(x + hw, y, hw, hh), level, config),
            Quadtree::with_level(Rect::new(x, y, hw, hh), level, config),
            Quadtree::with_level(Rect::new(x, y + hh, hw, hh), level, config),
            Quadtree::with_level(Rect::new(x + hw, y + hh, hw, hh), level, config),
        ]);

        let mut kept = Vec::new();
        for (rect, item) in self.items.drain(..) {
            match children.iter_mut().find(|c| c.bounds.contains(&rect)) {
                Some(child) => child.insert(rect, item),
                None => kept.push((rect, item)),
            }
        }
        self.items = kept;
        self.children = Some(children);
    }

    /// Every item stored in a node whose region overlaps `area`
    pub fn retrieve(&self, area: &Rect) -> Vec<T> {
        let mut out = Vec::new();
        self.retrieve_into(area, &mut out);
        out
    }

    fn retrieve_into(&self, area: &Rect, out: &mut Vec<T>) {
        out.extend(self.items.iter().map(|(_, item)| item.clone()));
        if let Some(children) = &self.children {
            for child in children.iter() {
                if child.bounds.overlaps(area) {
                    child.retrieve_into(area, out);
                }
            }
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
        self.children = None;
    }

    pub fn len(&self) -> usize {
        self.items.len()
            + self
                .children
                .as_ref()
                .map_or(0, |c| c.iter().map(Quadtree::len).sum())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn depth(&self) -> u32 {
        match &self.children {
            Some(c) => c.iter().map(Quadtree::depth).max().unwrap_or(0) + 1,
            None => 0,
        }
    }
}
