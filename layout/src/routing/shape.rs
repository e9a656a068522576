//! The obstacle hierarchy of the router. Shapes own their children and keep
//! back references to their parents. Clusters are shapes with children, and
//! the nodes are the leaves. The parent relation may form a DAG (a node can
//! belong to several clusters), but never a cycle.

use super::polygon::Polygon;
use crate::core::error::{LayoutError, Result};
use std::collections::HashSet;

/// A handle to a shape in a ShapeArena.
#[derive(Copy, Clone, Default, PartialEq, PartialOrd, Eq, Ord, Hash, Debug)]
pub struct ShapeId {
    idx: usize,
}

impl ShapeId {
    pub fn new(idx: usize) -> Self {
        Self { idx }
    }
    pub fn get_index(&self) -> usize {
        self.idx
    }
}

#[derive(Debug, Clone)]
struct Shape {
    boundary: Polygon,
    children: Vec<ShapeId>,
    parents: Vec<ShapeId>,
}

#[derive(Debug, Clone, Default)]
pub struct ShapeArena {
    shapes: Vec<Shape>,
}

impl ShapeArena {
    pub fn new() -> Self {
        Self { shapes: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn add_shape(&mut self, boundary: Polygon) -> ShapeId {
        self.shapes.push(Shape {
            boundary,
            children: Vec::new(),
            parents: Vec::new(),
        });
        ShapeId::new(self.shapes.len() - 1)
    }

    pub fn iter(&self) -> impl Iterator<Item = ShapeId> {
        (0..self.shapes.len()).map(ShapeId::new)
    }

    pub fn boundary(&self, s: ShapeId) -> &Polygon {
        &self.shapes[s.idx].boundary
    }

    pub fn children(&self, s: ShapeId) -> &[ShapeId] {
        &self.shapes[s.idx].children
    }

    pub fn parents(&self, s: ShapeId) -> &[ShapeId] {
        &self.shapes[s.idx].parents
    }

    pub fn is_cluster(&self, s: ShapeId) -> bool {
        !self.shapes[s.idx].children.is_empty()
    }

    /// Make \p parent a parent of \p child. Links that would make a shape
    /// its own ancestor are rejected.
    pub fn add_parent(&mut self, child: ShapeId, parent: ShapeId) -> Result<()> {
        if child == parent || self.ancestors(parent).any(|a| a == child) {
            return Err(LayoutError::CyclicHierarchy {
                child: child.idx,
                parent: parent.idx,
            });
        }
        if self.shapes[child.idx].parents.contains(&parent) {
            return Ok(());
        }
        self.shapes[child.idx].parents.push(parent);
        self.shapes[parent.idx].children.push(child);
        Ok(())
    }

    /// Remove the link between \p child and \p parent, on both sides.
    /// \returns True if the link existed.
    pub fn remove_parent(&mut self, child: ShapeId, parent: ShapeId) -> bool {
        let parents = &mut self.shapes[child.idx].parents;
        let Some(pos) = parents.iter().position(|p| *p == parent) else {
            return false;
        };
        parents.remove(pos);
        let children = &mut self.shapes[parent.idx].children;
        let Some(pos) = children.iter().position(|c| *c == child) else {
            panic!("The parent and child lists disagree");
        };
        children.remove(pos);
        true
    }

    /// \returns an iterator over the transitive parents of \p s.
    pub fn ancestors(&self, s: ShapeId) -> Walk<'_> {
        Walk::new(self, s, true)
    }

    /// \returns an iterator over the transitive children of \p s.
    pub fn descendants(&self, s: ShapeId) -> Walk<'_> {
        Walk::new(self, s, false)
    }

    /// \returns the shapes that a route between \p s and \p t may cross: the
    /// ancestors of one end that are not ancestors of the other end.
    pub fn passable_between(&self, s: ShapeId, t: ShapeId) -> HashSet<ShapeId> {
        let a: HashSet<ShapeId> = self.ancestors(s).collect();
        let b: HashSet<ShapeId> = self.ancestors(t).collect();
        a.symmetric_difference(&b).copied().collect()
    }

    pub fn verify(&self) {
        for (i, shape) in self.shapes.iter().enumerate() {
            let id = ShapeId::new(i);
            for p in shape.parents.iter() {
                assert!(self.shapes[p.idx].children.contains(&id));
            }
            for c in shape.children.iter() {
                assert!(self.shapes[c.idx].parents.contains(&id));
            }
            assert!(!self.ancestors(id).any(|a| a == id), "Cyclic hierarchy");
        }
    }
}

/// A breadth first walk up or down the shape hierarchy. Every shape is
/// reported once, even when it's reachable in several ways.
#[derive(Debug, Clone)]
pub struct Walk<'a> {
    arena: &'a ShapeArena,
    upwards: bool,
    worklist: std::collections::VecDeque<ShapeId>,
    visited: HashSet<ShapeId>,
}

impl<'a> Walk<'a> {
    fn new(arena: &'a ShapeArena, start: ShapeId, upwards: bool) -> Self {
        let mut walk = Self {
            arena,
            upwards,
            worklist: Default::default(),
            visited: HashSet::new(),
        };
        walk.visited.insert(start);
        walk.push_neighbors(start);
        walk
    }

    fn push_neighbors(&mut self, s: ShapeId) {
        let next = if self.upwards {
            self.arena.parents(s)
        } else {
            self.arena.children(s)
        };
        for n in next.iter() {
            if self.visited.insert(*n) {
                self.worklist.push_back(*n);
            }
        }
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = ShapeId;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.worklist.pop_front()?;
        self.push_neighbors(current);
        Some(current)
    }
}

#[cfg(test)]
fn square(x: f64) -> Polygon {
    use crate::core::geometry::{Point, Rectangle};
    Polygon::from_rectangle(&Rectangle::new(
        Point::new(x, x),
        Point::new(x + 1., x + 1.),
    ))
}

#[test]
fn test_hierarchy() {
    let mut arena = ShapeArena::new();
    let a = arena.add_shape(square(0.));
    let b = arena.add_shape(square(1.));
    let c = arena.add_shape(square(2.));
    arena.add_parent(a, b).unwrap();
    arena.add_parent(b, c).unwrap();
    // Adding the same link twice is fine.
    arena.add_parent(a, b).unwrap();
    arena.verify();

    assert_eq!(arena.ancestors(a).collect::<Vec<_>>(), vec![b, c]);
    assert_eq!(arena.descendants(c).count(), 2);
    assert_eq!(arena.children(c), &[b]);
    assert!(arena.children(a).is_empty());
    assert!(arena.is_cluster(b));
    assert!(!arena.is_cluster(a));

    // Cycles are rejected, and leave the hierarchy untouched.
    let err = arena.add_parent(c, a);
    assert_eq!(err, Err(LayoutError::CyclicHierarchy { child: 2, parent: 0 }));
    assert!(arena.add_parent(a, a).is_err());
    arena.verify();

    let passable = arena.passable_between(a, b);
    assert_eq!(passable, [b].into_iter().collect());

    assert!(arena.remove_parent(b, c));
    assert!(!arena.remove_parent(b, c));
    assert_eq!(arena.ancestors(a).count(), 1);
    arena.verify();
}
