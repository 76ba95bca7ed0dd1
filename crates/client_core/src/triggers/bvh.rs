//! Dynamic bounding-volume tree over trigger volumes.
//!
//! Leaves store a fattened copy of the caller's box, so small movements skip
//! the remove/reinsert path entirely. Insertion descends toward the child
//! whose surface area grows least.

use glam::Vec3;

/// Margin added around leaf boxes. Moves smaller than this stay in place.
const FAT_MARGIN: f32 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    #[must_use]
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    #[must_use]
    pub fn contains(self, other: Self) -> bool {
        self.min.cmple(other.min).all() && self.max.cmpge(other.max).all()
    }

    #[must_use]
    pub fn contains_point(self, p: Vec3) -> bool {
        self.min.cmple(p).all() && self.max.cmpge(p).all()
    }

    #[must_use]
    pub fn fattened(self) -> Self {
        Self {
            min: self.min - Vec3::splat(FAT_MARGIN),
            max: self.max + Vec3::splat(FAT_MARGIN),
        }
    }

    #[must_use]
    pub fn surface_area(self) -> f32 {
        let d = (self.max - self.min).max(Vec3::ZERO);
        2.0 * (d.x * d.y + d.y * d.z + d.z * d.x)
    }
}

const NULL: usize = usize::MAX;

#[derive(Debug)]
struct Node {
    aabb: Aabb,
    parent: usize,
    left: usize,
    right: usize,
    /// Leaf payload; interior nodes carry `None`.
    key: Option<u32>,
    next_free: usize,
}

#[derive(Debug)]
pub struct AabbTree {
    nodes: Vec<Node>,
    root: usize,
    free: usize,
    leaves: std::collections::HashMap<u32, usize>,
}

// root and free must start at NULL, not zero.
impl Default for AabbTree {
    fn default() -> Self {
        Self::new()
    }
}

impl AabbTree {
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: NULL,
            free: NULL,
            leaves: std::collections::HashMap::new(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.leaves.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.leaves.is_empty()
    }

    /// Insert a new proxy. Replaces any existing proxy under the same key.
    pub fn insert(&mut self, key: u32, aabb: Aabb) {
        if self.leaves.contains_key(&key) {
            self.remove(key);
        }
        let leaf = self.alloc(Node {
            aabb: aabb.fattened(),
            parent: NULL,
            left: NULL,
            right: NULL,
            key: Some(key),
            next_free: NULL,
        });
        self.leaves.insert(key, leaf);
        self.insert_leaf(leaf);
    }

    pub fn remove(&mut self, key: u32) -> bool {
        let Some(leaf) = self.leaves.remove(&key) else {
            return false;
        };
        self.remove_leaf(leaf);
        self.dealloc(leaf);
        true
    }

    /// Update a proxy's box. Returns true when the proxy actually moved in
    /// the tree (its new box escaped the fattened one).
    pub fn move_proxy(&mut self, key: u32, aabb: Aabb) -> bool {
        let Some(&leaf) = self.leaves.get(&key) else {
            self.insert(key, aabb);
            return true;
        };
        if self.nodes[leaf].aabb.contains(aabb) {
            return false;
        }
        self.remove_leaf(leaf);
        self.nodes[leaf].aabb = aabb.fattened();
        self.insert_leaf(leaf);
        true
    }

    /// Collect leaf keys whose fattened box contains `p`. The caller narrows
    /// against exact trigger boxes afterwards.
    pub fn query_point(&self, p: Vec3, out: &mut Vec<u32>) {
        if self.root == NULL {
            return;
        }
        let mut stack = vec![self.root];
        while let Some(idx) = stack.pop() {
            let node = &self.nodes[idx];
            if !node.aabb.contains_point(p) {
                continue;
            }
            match node.key {
                Some(key) => out.push(key),
                None => {
                    stack.push(node.left);
                    stack.push(node.right);
                }
            }
        }
    }

    fn alloc(&mut self, node: Node) -> usize {
        if self.free == NULL {
            self.nodes.push(node);
            self.nodes.len() - 1
        } else {
            let idx = self.free;
            self.free = self.nodes[idx].next_free;
            self.nodes[idx] = node;
            idx
        }
    }

    fn dealloc(&mut self, idx: usize) {
        self.nodes[idx].key = None;
        self.nodes[idx].next_free = self.free;
        self.free = idx;
    }

    fn insert_leaf(&mut self, leaf: usize) {
        if self.root == NULL {
            self.root = leaf;
            self.nodes[leaf].parent = NULL;
            return;
        }
        let leaf_aabb = self.nodes[leaf].aabb;

        // Descend toward the cheaper child by area growth.
        let mut idx = self.root;
        while self.nodes[idx].key.is_none() {
            let left = self.nodes[idx].left;
            let right = self.nodes[idx].right;
            let grow = |a: Aabb| a.union(leaf_aabb).surface_area() - a.surface_area();
            idx = if grow(self.nodes[left].aabb) <= grow(self.nodes[right].aabb) {
                left
            } else {
                right
            };
        }

        let sibling = idx;
        let old_parent = self.nodes[sibling].parent;
        let new_parent = self.alloc(Node {
            aabb: leaf_aabb.union(self.nodes[sibling].aabb),
            parent: old_parent,
            left: sibling,
            right: leaf,
            key: None,
            next_free: NULL,
        });
        self.nodes[sibling].parent = new_parent;
        self.nodes[leaf].parent = new_parent;
        if old_parent == NULL {
            self.root = new_parent;
        } else if self.nodes[old_parent].left == sibling {
            self.nodes[old_parent].left = new_parent;
        } else {
            self.nodes[old_parent].right = new_parent;
        }
        self.refit_upward(new_parent);
    }

    fn remove_leaf(&mut self, leaf: usize) {
        if self.root == leaf {
            self.root = NULL;
            return;
        }
        let parent = self.nodes[leaf].parent;
        let sibling = if self.nodes[parent].left == leaf {
            self.nodes[parent].right
        } else {
            self.nodes[parent].left
        };
        let grand = self.nodes[parent].parent;
        self.nodes[sibling].parent = grand;
        if grand == NULL {
            self.root = sibling;
        } else {
            if self.nodes[grand].left == parent {
                self.nodes[grand].left = sibling;
            } else {
                self.nodes[grand].right = sibling;
            }
            self.refit_upward(grand);
        }
        self.dealloc(parent);
    }

    fn refit_upward(&mut self, mut idx: usize) {
        while idx != NULL {
            let left = self.nodes[idx].left;
            let right = self.nodes[idx].right;
            self.nodes[idx].aabb = self.nodes[left].aabb.union(self.nodes[right].aabb);
            idx = self.nodes[idx].parent;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_box(center: Vec3) -> Aabb {
        Aabb::new(center - Vec3::splat(0.5), center + Vec3::splat(0.5))
    }

    #[test]
    fn default_tree_accepts_inserts() {
        let mut t = AabbTree::default();
        t.insert(1, unit_box(Vec3::ZERO));
        t.insert(2, unit_box(Vec3::new(4.0, 0.0, 0.0)));
        let mut hits = Vec::new();
        t.query_point(Vec3::ZERO, &mut hits);
        assert_eq!(hits, vec![1]);
    }

    #[test]
    fn point_query_hits_only_containing_leaves() {
        let mut t = AabbTree::new();
        t.insert(1, unit_box(Vec3::ZERO));
        t.insert(2, unit_box(Vec3::new(10.0, 0.0, 0.0)));
        t.insert(3, unit_box(Vec3::new(0.0, 10.0, 0.0)));
        let mut hits = Vec::new();
        t.query_point(Vec3::ZERO, &mut hits);
        assert_eq!(hits, vec![1]);
    }

    #[test]
    fn small_moves_keep_the_proxy_in_place() {
        let mut t = AabbTree::new();
        t.insert(1, unit_box(Vec3::ZERO));
        assert!(!t.move_proxy(1, unit_box(Vec3::splat(0.1))));
        assert!(t.move_proxy(1, unit_box(Vec3::splat(5.0))));
        let mut hits = Vec::new();
        t.query_point(Vec3::splat(5.0), &mut hits);
        assert_eq!(hits, vec![1]);
    }

    #[test]
    fn remove_keeps_remaining_leaves_queryable() {
        let mut t = AabbTree::new();
        for i in 0..8 {
            t.insert(i, unit_box(Vec3::new(i as f32 * 3.0, 0.0, 0.0)));
        }
        assert!(t.remove(3));
        assert!(!t.remove(3));
        assert_eq!(t.len(), 7);
        let mut hits = Vec::new();
        t.query_point(Vec3::new(12.0, 0.0, 0.0), &mut hits);
        assert_eq!(hits, vec![4]);
        t.query_point(Vec3::new(9.0, 0.0, 0.0), &mut hits);
        assert!(!hits.contains(&3));
    }
}
