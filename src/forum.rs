//! Forum hierarchy
//!
//! Forums form a tree. The tree is kept as an arena of nodes that point at
//! their parent and children by index, so ancestor walks are O(depth) and
//! descendant walks are O(subtree).

use crate::orm::forums;
use std::collections::HashMap;

pub type ForumId = i32;

/// A single forum in the arena.
#[derive(Clone, Debug)]
pub struct ForumNode {
    pub id: ForumId,
    pub name: String,
    parent: Option<usize>,
    children: Vec<usize>,
}

/// Errors raised while assembling a forum tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TreeError {
    /// The same forum id appeared twice
    DuplicateForum(ForumId),
    /// A forum points at a parent that does not exist
    UnknownParent { forum: ForumId, parent: ForumId },
    /// Following parents from this forum never reaches a root
    Cycle(ForumId),
}

impl std::fmt::Display for TreeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TreeError::DuplicateForum(id) => write!(f, "Forum {} is defined twice", id),
            TreeError::UnknownParent { forum, parent } => {
                write!(f, "Forum {} has unknown parent {}", forum, parent)
            }
            TreeError::Cycle(id) => write!(f, "Forum {} is part of a parent cycle", id),
        }
    }
}

impl std::error::Error for TreeError {}

#[derive(Clone, Debug, Default)]
pub struct ForumTree {
    nodes: Vec<ForumNode>,
    index: HashMap<ForumId, usize>,
}

impl ForumTree {
    /// Builds a tree from `(id, parent_id, name)` rows given in any order.
    /// Children keep the order in which their rows were supplied.
    pub fn build<I, S>(rows: I) -> Result<Self, TreeError>
    where
        I: IntoIterator<Item = (ForumId, Option<ForumId>, S)>,
        S: Into<String>,
    {
        let mut tree = ForumTree::default();
        let mut parent_ids: Vec<Option<ForumId>> = Vec::new();

        for (id, parent_id, name) in rows {
            if tree.index.contains_key(&id) {
                return Err(TreeError::DuplicateForum(id));
            }
            tree.index.insert(id, tree.nodes.len());
            tree.nodes.push(ForumNode {
                id,
                name: name.into(),
                parent: None,
                children: Vec::new(),
            });
            parent_ids.push(parent_id);
        }

        for (pos, parent_id) in parent_ids.into_iter().enumerate() {
            if let Some(parent_id) = parent_id {
                let parent_pos = match tree.index.get(&parent_id) {
                    Some(p) => *p,
                    None => {
                        return Err(TreeError::UnknownParent {
                            forum: tree.nodes[pos].id,
                            parent: parent_id,
                        })
                    }
                };
                tree.nodes[pos].parent = Some(parent_pos);
                tree.nodes[parent_pos].children.push(pos);
            }
        }

        // Anything not reachable from a root hangs off a cycle.
        let mut reached = vec![false; tree.nodes.len()];
        let mut stack: Vec<usize> = (0..tree.nodes.len())
            .filter(|pos| tree.nodes[*pos].parent.is_none())
            .collect();
        while let Some(pos) = stack.pop() {
            reached[pos] = true;
            stack.extend(tree.nodes[pos].children.iter().copied());
        }
        if let Some(id) = tree
            .nodes
            .iter()
            .zip(reached.iter())
            .filter(|(_, reached)| !**reached)
            .map(|(node, _)| node.id)
            .min()
        {
            return Err(TreeError::Cycle(id));
        }

        Ok(tree)
    }

    /// Builds a tree from forum rows.
    pub fn from_models(models: &[forums::Model]) -> Result<Self, TreeError> {
        let mut sorted: Vec<&forums::Model> = models.iter().collect();
        sorted.sort_by_key(|f| (f.display_order, f.id));
        Self::build(
            sorted
                .into_iter()
                .map(|f| (f.id, f.parent_id, f.name.clone())),
        )
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: ForumId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn get(&self, id: ForumId) -> Option<&ForumNode> {
        self.index.get(&id).map(|pos| &self.nodes[*pos])
    }

    /// All forum ids in insertion order.
    pub fn ids(&self) -> impl Iterator<Item = ForumId> + '_ {
        self.nodes.iter().map(|n| n.id)
    }

    pub fn roots(&self) -> Vec<ForumId> {
        self.nodes
            .iter()
            .filter(|n| n.parent.is_none())
            .map(|n| n.id)
            .collect()
    }

    pub fn parent(&self, id: ForumId) -> Option<ForumId> {
        let pos = *self.index.get(&id)?;
        self.nodes[pos].parent.map(|p| self.nodes[p].id)
    }

    pub fn children(&self, id: ForumId) -> Vec<ForumId> {
        match self.index.get(&id) {
            Some(pos) => self.nodes[*pos]
                .children
                .iter()
                .map(|c| self.nodes[*c].id)
                .collect(),
            None => Vec::new(),
        }
    }

    /// Ancestors of a forum, root first. Empty for roots and unknown ids.
    pub fn ancestors(&self, id: ForumId) -> Vec<ForumId> {
        let mut ancestors = Vec::new();
        let mut current = self.index.get(&id).and_then(|pos| self.nodes[*pos].parent);
        while let Some(pos) = current {
            ancestors.push(self.nodes[pos].id);
            current = self.nodes[pos].parent;
        }
        ancestors.reverse();
        ancestors
    }

    /// Descendants of a forum in pre-order, optionally starting with the forum itself.
    pub fn descendants(&self, id: ForumId, include_self: bool) -> Vec<ForumId> {
        let start = match self.index.get(&id) {
            Some(pos) => *pos,
            None => return Vec::new(),
        };

        let mut out = Vec::new();
        let mut stack = vec![start];
        while let Some(pos) = stack.pop() {
            if pos != start || include_self {
                out.push(self.nodes[pos].id);
            }
            // Reverse so the first child is visited first.
            stack.extend(self.nodes[pos].children.iter().rev().copied());
        }
        out
    }

    /// Depth of a forum, roots being 0.
    pub fn depth(&self, id: ForumId) -> Option<usize> {
        self.index.get(&id)?;
        Some(self.ancestors(id).len())
    }
}
