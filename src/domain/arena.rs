use generational_arena::{Arena, Index};
use std::fmt;
use termtree::Tree;
use tracing::instrument;

use crate::domain::entities::RecruitNode;

/// Data payload for tree nodes representing pyramid members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberData {
    /// Backend identifier of the member
    pub id: String,
    /// Display label (name if known, else id)
    pub name: String,
}

impl MemberData {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl From<&RecruitNode> for MemberData {
    fn from(node: &RecruitNode) -> Self {
        Self::new(node.id.clone(), node.display_name())
    }
}

impl fmt::Display for MemberData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name == self.id {
            write!(f, "{}", self.id)
        } else {
            write!(f, "{} ({})", self.name, self.id)
        }
    }
}

/// Tree node in the arena-based recruiting hierarchy.
#[derive(Debug)]
pub struct TreeNode {
    /// Member data for this node
    pub data: MemberData,
    /// Index of parent node in the arena, None for the root
    pub parent: Option<Index>,
    /// Indices of direct recruits, in backend order
    pub children: Vec<Index>,
}

/// Arena-based recruiting tree.
///
/// The root is the member whose pyramid is being looked at; it never counts
/// toward any pyramid level. Indices are stable for the lifetime of the
/// arena, so level pools can be tracked as plain `Vec<Index>`.
#[derive(Debug)]
pub struct RecruitArena {
    arena: Arena<TreeNode>,
    root: Option<Index>,
}

impl Default for RecruitArena {
    fn default() -> Self {
        Self::new()
    }
}

impl RecruitArena {
    pub fn new() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
        }
    }

    /// Build an arena under `root` from the root's direct recruits.
    ///
    /// Child order is preserved at every level.
    #[instrument(level = "debug", skip(children), fields(root = %root.id, direct = children.len()))]
    pub fn from_root_children(root: MemberData, children: &[RecruitNode]) -> Self {
        let mut tree = Self::new();
        let root_idx = tree.insert_node(root, None);

        let mut stack: Vec<(&RecruitNode, Index)> =
            children.iter().rev().map(|c| (c, root_idx)).collect();

        while let Some((node, parent_idx)) = stack.pop() {
            let idx = tree.insert_node(MemberData::from(node), Some(parent_idx));
            stack.extend(node.children.iter().rev().map(|c| (c, idx)));
        }

        tree
    }

    #[instrument(level = "trace", skip(self))]
    pub fn insert_node(&mut self, data: MemberData, parent: Option<Index>) -> Index {
        let node = TreeNode {
            data,
            parent,
            children: Vec::new(),
        };
        let node_idx = self.arena.insert(node);

        if let Some(parent_idx) = parent {
            if let Some(parent) = self.arena.get_mut(parent_idx) {
                parent.children.push(node_idx);
            }
        } else {
            self.root = Some(node_idx);
        }

        node_idx
    }

    pub fn get_node(&self, idx: Index) -> Option<&TreeNode> {
        self.arena.get(idx)
    }

    pub fn root(&self) -> Option<Index> {
        self.root
    }

    /// Direct recruits of the root: the natural level-1 pool.
    pub fn root_children(&self) -> Vec<Index> {
        self.root
            .and_then(|root| self.get_node(root))
            .map(|node| node.children.clone())
            .unwrap_or_default()
    }

    /// Flattened children of `pool`, keeping pool order then child order.
    pub fn children_of(&self, pool: &[Index]) -> Vec<Index> {
        pool.iter()
            .filter_map(|&idx| self.get_node(idx))
            .flat_map(|node| node.children.iter().copied())
            .collect()
    }

    /// Number of members, root excluded.
    pub fn len(&self) -> usize {
        self.arena.len().saturating_sub(usize::from(self.root.is_some()))
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Members per natural depth below the root; index 0 is level 1.
    #[instrument(level = "debug", skip(self))]
    pub fn level_sizes(&self) -> Vec<usize> {
        let mut sizes = Vec::new();
        let mut pool = self.root_children();
        while !pool.is_empty() {
            sizes.push(pool.len());
            pool = self.children_of(&pool);
        }
        sizes
    }

    /// Number of populated levels below the root.
    pub fn depth(&self) -> usize {
        self.level_sizes().len()
    }

    pub fn iter(&self) -> TreeIterator {
        TreeIterator::new(self)
    }
}

/// Pre-order traversal, root first, children left to right.
pub struct TreeIterator<'a> {
    arena: &'a RecruitArena,
    stack: Vec<Index>,
}

impl<'a> TreeIterator<'a> {
    fn new(arena: &'a RecruitArena) -> Self {
        let mut stack = Vec::new();
        if let Some(root) = arena.root() {
            stack.push(root);
        }
        Self { arena, stack }
    }
}

impl<'a> Iterator for TreeIterator<'a> {
    type Item = (Index, &'a TreeNode);

    fn next(&mut self) -> Option<Self::Item> {
        let current_idx = self.stack.pop()?;
        let node = self.arena.get_node(current_idx)?;
        // Push children in reverse order for left-to-right traversal
        self.stack.extend(node.children.iter().rev());
        Some((current_idx, node))
    }
}

/// Rendering of a recruiting tree for terminal display.
pub trait TreeRender {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeRender for RecruitArena {
    fn to_tree_string(&self) -> Tree<String> {
        fn build_tree(arena: &RecruitArena, node_idx: Index, parent_tree: &mut Tree<String>) {
            if let Some(node) = arena.get_node(node_idx) {
                for &child_idx in &node.children {
                    if let Some(child) = arena.get_node(child_idx) {
                        let mut child_tree = Tree::new(child.data.to_string());
                        build_tree(arena, child_idx, &mut child_tree);
                        parent_tree.push(child_tree);
                    }
                }
            }
        }

        match self.root.and_then(|idx| self.get_node(idx).map(|n| (idx, n))) {
            Some((root_idx, root)) => {
                let mut tree = Tree::new(root.data.to_string());
                build_tree(self, root_idx, &mut tree);
                tree
            }
            None => Tree::new("Empty tree".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<RecruitNode> {
        vec![
            RecruitNode::new("a").with_children(vec![
                RecruitNode::new("a1"),
                RecruitNode::new("a2").with_children(vec![RecruitNode::new("a2x")]),
            ]),
            RecruitNode::new("b").with_attribute("nombre", "Beto"),
            RecruitNode::new("c").with_children(vec![RecruitNode::new("c1")]),
        ]
    }

    fn ids(arena: &RecruitArena, pool: &[Index]) -> Vec<String> {
        pool.iter()
            .map(|&i| arena.get_node(i).unwrap().data.id.clone())
            .collect()
    }

    #[test]
    fn given_children_when_building_arena_then_root_is_excluded_from_len() {
        let arena = RecruitArena::from_root_children(MemberData::new("me", "me"), &sample());

        assert_eq!(arena.len(), 7);
        assert!(!arena.is_empty());
        assert_eq!(arena.depth(), 3);
        assert_eq!(arena.level_sizes(), vec![3, 3, 1]);
    }

    #[test]
    fn given_arena_when_flattening_children_then_order_is_preserved() {
        let arena = RecruitArena::from_root_children(MemberData::new("me", "me"), &sample());

        let level1 = arena.root_children();
        let level2 = arena.children_of(&level1);

        assert_eq!(ids(&arena, &level1), vec!["a", "b", "c"]);
        assert_eq!(ids(&arena, &level2), vec!["a1", "a2", "c1"]);
    }

    #[test]
    fn given_arena_when_iterating_then_visits_preorder() {
        let arena = RecruitArena::from_root_children(MemberData::new("me", "me"), &sample());

        let visited: Vec<_> = arena.iter().map(|(_, n)| n.data.id.as_str()).collect();

        assert_eq!(visited, vec!["me", "a", "a1", "a2", "a2x", "b", "c", "c1"]);
    }

    #[test]
    fn given_empty_children_when_building_then_only_root_exists() {
        let arena = RecruitArena::from_root_children(MemberData::new("me", "me"), &[]);

        assert!(arena.is_empty());
        assert_eq!(arena.depth(), 0);
        assert!(arena.root_children().is_empty());
    }

    #[test]
    fn given_arena_when_rendering_then_uses_names_and_ids() {
        let arena = RecruitArena::from_root_children(MemberData::new("me", "me"), &sample());

        let rendered = arena.to_tree_string().to_string();

        assert!(rendered.starts_with("me\n"));
        assert!(rendered.contains("Beto (b)"));
        assert!(rendered.contains("a2x"));
    }

    #[test]
    fn given_default_arena_when_rendering_then_reports_empty_tree() {
        let rendered = RecruitArena::default().to_tree_string().to_string();
        assert!(rendered.starts_with("Empty tree"));
    }
}
