//! A dynamic AABB tree (bounding volume hierarchy) used as the broad
//! phase. Leaves correspond 1:1 with rigid bodies (see
//! [`crate::object::RigidBody`]); internal nodes exist purely to bound
//! their children.
//!
//! The original implementation this is ported from links nodes with raw
//! pointers and gives each [`crate::object::RigidBody`] *be* a tree leaf.
//! This crate keeps that identity coupling (a body's [`NodeId`] is part
//! of its public identity) but replaces the pointer graph with an arena
//! (`Vec<Slot>`) addressed by index, so the tree never needs
//! `unsafe_code`.

use crate::Real;
use crate::math::Vec2;

mod bounds;
pub use self::bounds::Aabb;

/// Index of a node within an [`AabbTree`]'s arena. Stable across
/// insertions and removals of *other* nodes; invalidated only when the
/// node itself is removed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

#[derive(Clone, Debug)]
enum Slot {
    Occupied(Node),
    Free { next_free: Option<u32> },
}

#[derive(Clone, Debug)]
struct Node {
    parent: Option<NodeId>,
    /// `None` for a leaf.
    children: Option<[NodeId; 2]>,
    inner: Aabb,
    outer: Aabb,
}

impl Node {
    fn is_leaf(&self) -> bool {
        self.children.is_none()
    }
}

/// A dynamic AABB tree. `margin` is the fixed padding applied to a
/// leaf's tight (`inner`) box to produce its fattened (`outer`) box, on
/// top of the velocity-directional fattening applied by callers that
/// know about body velocity (see `RigidBody::update_aabb`).
#[derive(Clone, Debug)]
pub struct AabbTree {
    slots: Vec<Slot>,
    free_head: Option<u32>,
    root: Option<NodeId>,
    margin: Real,
}

impl AabbTree {
    /// Creates an empty tree with the given fattening margin.
    pub fn new(margin: Real) -> Self {
        AabbTree {
            slots: Vec::new(),
            free_head: None,
            root: None,
            margin,
        }
    }

    fn get(&self, id: NodeId) -> &Node {
        match &self.slots[id.0 as usize] {
            Slot::Occupied(n) => n,
            Slot::Free { .. } => panic!("stale NodeId"),
        }
    }

    fn get_mut(&mut self, id: NodeId) -> &mut Node {
        match &mut self.slots[id.0 as usize] {
            Slot::Occupied(n) => n,
            Slot::Free { .. } => panic!("stale NodeId"),
        }
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        if let Some(i) = self.free_head {
            let next = match &self.slots[i as usize] {
                Slot::Free { next_free } => *next_free,
                Slot::Occupied(_) => unreachable!(),
            };
            self.free_head = next;
            self.slots[i as usize] = Slot::Occupied(node);
            NodeId(i)
        } else {
            let id = NodeId(self.slots.len() as u32);
            self.slots.push(Slot::Occupied(node));
            id
        }
    }

    fn free(&mut self, id: NodeId) {
        self.slots[id.0 as usize] = Slot::Free {
            next_free: self.free_head,
        };
        self.free_head = Some(id.0);
    }

    /// The tight (unfattened) AABB of a node.
    pub fn inner(&self, id: NodeId) -> Aabb {
        self.get(id).inner
    }

    /// The fattened AABB of a node, used for pair queries.
    pub fn outer(&self, id: NodeId) -> Aabb {
        self.get(id).outer
    }

    fn update_aabb(&mut self, id: NodeId) {
        let node = self.get(id);
        let outer = if let Some(children) = node.children {
            self.outer(children[0]).union(self.outer(children[1]))
        } else {
            node.inner.expand(self.margin)
        };
        self.get_mut(id).outer = outer;
    }

    /// Inserts a new leaf with the given tight AABB, returning its id.
    pub fn insert(&mut self, aabb: Aabb) -> NodeId {
        let id = self.alloc(Node {
            parent: None,
            children: None,
            inner: aabb,
            outer: Aabb::degenerate(),
        });
        self.update_aabb(id);
        self.insert_existing(id);
        id
    }

    fn insert_node(&mut self, node: NodeId, new_node: NodeId) {
        if self.get(node).is_leaf() {
            let new_parent = self.alloc(Node {
                parent: self.get(node).parent,
                children: Some([node, new_node]),
                inner: Aabb::degenerate(),
                outer: Aabb::degenerate(),
            });

            if Some(node) == self.root {
                self.root = Some(new_parent);
            } else {
                let grandparent = self.get(node).parent.unwrap();
                self.replace_child(grandparent, node, new_parent);
            }

            self.get_mut(node).parent = Some(new_parent);
            self.get_mut(new_node).parent = Some(new_parent);

            self.update_aabb(new_parent);
        } else {
            let children = self.get(node).children.unwrap();
            let aabb0 = self.outer(children[0]);
            let aabb1 = self.outer(children[1]);
            let new_outer = self.outer(new_node);

            let area_diff0 = aabb0.union(new_outer).area() - aabb0.area();
            let area_diff1 = aabb1.union(new_outer).area() - aabb1.area();

            if area_diff0 < area_diff1 {
                self.insert_node(children[0], new_node);
            } else {
                self.insert_node(children[1], new_node);
            }

            self.update_aabb(node);
        }
    }

    fn replace_child(&mut self, parent: NodeId, old: NodeId, new: NodeId) {
        let children = self.get_mut(parent).children.as_mut().unwrap();
        if children[0] == old {
            children[0] = new;
        } else {
            children[1] = new;
        }
    }

    fn sibling(&self, id: NodeId) -> NodeId {
        let parent = self.get(id).parent.unwrap();
        let children = self.get(parent).children.unwrap();
        if children[0] == id {
            children[1]
        } else {
            children[0]
        }
    }

    /// Unlinks a leaf from the tree structure without freeing the
    /// leaf's own slot, freeing its now-unneeded former parent instead.
    /// The leaf keeps its `NodeId` and can be re-inserted with
    /// [`AabbTree::insert_existing`].
    fn unlink(&mut self, id: NodeId) {
        debug_assert!(self.get(id).is_leaf());

        if Some(id) == self.root {
            self.root = None;
        } else {
            let parent = self.get(id).parent.unwrap();
            let sibling = self.sibling(id);

            if Some(parent) == self.root {
                self.root = Some(sibling);
                self.get_mut(sibling).parent = None;
            } else {
                let grandparent = self.get(parent).parent.unwrap();
                self.get_mut(sibling).parent = Some(grandparent);
                self.replace_child(grandparent, parent, sibling);
            }
            self.free(parent);
        }
        self.get_mut(id).parent = None;
    }

    /// Removes a leaf from the tree and frees its slot entirely.
    pub fn remove(&mut self, id: NodeId) {
        self.unlink(id);
        self.free(id);
    }

    fn insert_existing(&mut self, id: NodeId) {
        match self.root {
            None => self.root = Some(id),
            Some(root) => self.insert_node(root, id),
        }
    }

    /// Re-fattens the AABB of a leaf (call after moving its tight box)
    /// and, if the new tight box has drifted outside the leaf's current
    /// fattened box, re-inserts it into the tree at the right spot.
    pub fn update_leaf(&mut self, id: NodeId, new_inner: Aabb) {
        self.get_mut(id).inner = new_inner;
        if self.get(id).outer.contains(new_inner) {
            return;
        }
        self.unlink(id);
        self.update_aabb(id);
        self.insert_existing(id);
    }

    /// Directly overwrite the outer (fattened) box of a leaf, e.g. to
    /// apply the velocity-directional fattening on top of the margin.
    /// Must be called after [`AabbTree::insert`]/[`AabbTree::update_leaf`].
    pub fn fatten_leaf(&mut self, id: NodeId, outer: Aabb) {
        self.get_mut(id).outer = outer;
    }

    /// All intersecting pairs of leaves currently in the tree, found by
    /// walking the tree once.
    pub fn compute_pairs(&self) -> Vec<(NodeId, NodeId)> {
        let mut pairs = Vec::new();
        if let Some(root) = self.root {
            self.find_all_pairs(root, &mut pairs);
        }
        pairs
    }

    fn find_all_pairs(&self, node: NodeId, out: &mut Vec<(NodeId, NodeId)>) {
        if let Some(children) = self.get(node).children {
            self.find_pairs(children[0], children[1], out);
            self.find_all_pairs(children[0], out);
            self.find_all_pairs(children[1], out);
        }
    }

    fn find_pairs(&self, n0: NodeId, n1: NodeId, out: &mut Vec<(NodeId, NodeId)>) {
        let leaf0 = self.get(n0).is_leaf();
        let leaf1 = self.get(n1).is_leaf();
        match (leaf0, leaf1) {
            (true, true) => {
                if self.inner(n0).intersects(self.inner(n1)) {
                    out.push((n0, n1));
                }
            }
            (true, false) => {
                if self.inner(n0).intersects(self.outer(n1)) {
                    let children = self.get(n1).children.unwrap();
                    self.find_pairs_for_leaf(n0, children[0], out);
                    self.find_pairs_for_leaf(n0, children[1], out);
                }
            }
            (false, true) => {
                if self.outer(n0).intersects(self.inner(n1)) {
                    let children = self.get(n0).children.unwrap();
                    self.find_pairs_for_leaf(n1, children[0], out);
                    self.find_pairs_for_leaf(n1, children[1], out);
                }
            }
            (false, false) => {
                if self.outer(n0).intersects(self.outer(n1)) {
                    let c0 = self.get(n0).children.unwrap();
                    let c1 = self.get(n1).children.unwrap();
                    self.find_pairs(c0[0], c1[0], out);
                    self.find_pairs(c0[0], c1[1], out);
                    self.find_pairs(c0[1], c1[0], out);
                    self.find_pairs(c0[1], c1[1], out);
                }
            }
        }
    }

    fn find_pairs_for_leaf(&self, leaf: NodeId, branch: NodeId, out: &mut Vec<(NodeId, NodeId)>) {
        if self.get(branch).is_leaf() {
            if self.inner(branch).intersects(self.inner(leaf)) {
                out.push((leaf, branch));
            }
        } else if self.outer(branch).intersects(self.inner(leaf)) {
            let children = self.get(branch).children.unwrap();
            self.find_pairs_for_leaf(leaf, children[0], out);
            self.find_pairs_for_leaf(leaf, children[1], out);
        }
    }
}

/// Multiplier applied to a body's velocity before adding it to the
/// leaf's fattened box, so a coherently-moving body's leaf doesn't need
/// re-insertion every step. See `objects.cpp::updateAABB` in the system
/// this is ported from.
pub const VELOCITY_FATTEN_FACTOR: Real = 2.0;

/// Computes the velocity-directionally fattened outer box for a leaf,
/// given its already-margin-fattened box and the body's velocity: the
/// box is extended further in the direction of travel on each axis.
pub fn velocity_fatten(margined: Aabb, velocity: Vec2) -> Aabb {
    let mut upper = margined.upper;
    let mut lower = margined.lower;
    if velocity.x > 0.0 {
        upper.x += velocity.x * VELOCITY_FATTEN_FACTOR;
    } else {
        lower.x += velocity.x * VELOCITY_FATTEN_FACTOR;
    }
    if velocity.y > 0.0 {
        upper.y += velocity.y * VELOCITY_FATTEN_FACTOR;
    } else {
        lower.y += velocity.y * VELOCITY_FATTEN_FACTOR;
    }
    Aabb { upper, lower }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn box_at(x: Real, y: Real, half: Real) -> Aabb {
        Aabb {
            lower: Vec2::new(x - half, y - half),
            upper: Vec2::new(x + half, y + half),
        }
    }

    #[test]
    fn two_overlapping_leaves_pair_up() {
        let mut tree = AabbTree::new(0.0);
        let a = tree.insert(box_at(0.0, 0.0, 1.0));
        let b = tree.insert(box_at(0.5, 0.0, 1.0));
        let pairs = tree.compute_pairs();
        assert_eq!(pairs.len(), 1);
        assert!(pairs[0] == (a, b) || pairs[0] == (b, a));
    }

    #[test]
    fn far_apart_leaves_do_not_pair() {
        let mut tree = AabbTree::new(0.0);
        tree.insert(box_at(0.0, 0.0, 1.0));
        tree.insert(box_at(100.0, 0.0, 1.0));
        assert!(tree.compute_pairs().is_empty());
    }

    #[test]
    fn remove_then_reinsert_keeps_tree_consistent() {
        let mut tree = AabbTree::new(0.0);
        let a = tree.insert(box_at(0.0, 0.0, 1.0));
        let b = tree.insert(box_at(0.5, 0.0, 1.0));
        tree.remove(a);
        assert_eq!(tree.compute_pairs().len(), 0);
        let c = tree.insert(box_at(0.5, 0.1, 1.0));
        let pairs = tree.compute_pairs();
        assert_eq!(pairs.len(), 1);
        assert!(pairs[0] == (b, c) || pairs[0] == (c, b));
    }
}
