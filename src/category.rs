//! Two-level category tree and its deterministic flattening.
//!
//! The tree is declared as an ordered list of parent categories, each with an
//! ordered list of leaf children. The declared order fixes the flattened
//! index: parents first, then each parent's children in turn.

use crate::error::{LayersError, Result};
use geolayers_types::id::CategoryId;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Declaration of one parent category and its leaves, as written in configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CategoryDecl {
    pub id: CategoryId,
    #[serde(default)]
    pub children: Vec<CategoryId>,
}

impl CategoryDecl {
    pub fn new<I, C>(id: impl Into<CategoryId>, children: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<CategoryId>,
    {
        Self {
            id: id.into(),
            children: children.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryNode {
    pub id: CategoryId,
    pub parent: Option<CategoryId>,
    pub children: SmallVec<[CategoryId; 8]>,
}

impl CategoryNode {
    pub fn is_parent(&self) -> bool {
        self.parent.is_none()
    }
}

/// Dense bijection between category ids and `[0, len)`.
#[derive(Debug, Clone, Default)]
pub struct FlattenedIndex {
    ids: Vec<CategoryId>,
    positions: FxHashMap<CategoryId, usize>,
}

impl FlattenedIndex {
    fn push(&mut self, id: CategoryId) -> Result<()> {
        if self.positions.contains_key(&id) {
            return Err(LayersError::InvalidTree(format!(
                "Category '{}' is declared more than once",
                id
            )));
        }
        self.positions.insert(id.clone(), self.ids.len());
        self.ids.push(id);
        Ok(())
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.positions.get(id).copied()
    }

    pub fn id_at(&self, position: usize) -> Option<&CategoryId> {
        self.ids.get(position)
    }

    pub fn ids(&self) -> &[CategoryId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Immutable parent/leaf category tree.
///
/// # Examples
///
/// ```rust
/// use geolayers::category::CategoryTree;
///
/// let tree = CategoryTree::builder()
///     .parent("money", ["bank", "bureau_de_change"])
///     .parent("pub", ["pub_small", "cafe"])
///     .build()?;
///
/// assert!(tree.is_parent("money"));
/// assert_eq!(tree.children_of("pub").len(), 2);
/// assert_eq!(tree.total_categories(), 6);
///
/// let order: Vec<&str> = tree.all_ids().iter().map(|id| id.as_str()).collect();
/// assert_eq!(order, ["money", "pub", "bank", "bureau_de_change", "pub_small", "cafe"]);
/// # Ok::<(), geolayers::LayersError>(())
/// ```
#[derive(Debug, Clone)]
pub struct CategoryTree {
    nodes: Vec<CategoryNode>,
    index: FlattenedIndex,
    parent_count: usize,
}

impl CategoryTree {
    pub fn builder() -> CategoryTreeBuilder {
        CategoryTreeBuilder::default()
    }

    /// Build a tree from ordered declarations.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTree` for empty ids, duplicate declarations, a leaf
    /// listed under two parents, or a parent listed as a child.
    pub fn from_declarations(decls: &[CategoryDecl]) -> Result<Self> {
        let mut index = FlattenedIndex::default();
        let mut nodes = Vec::new();

        for decl in decls {
            if decl.id.is_empty() {
                return Err(LayersError::InvalidTree(
                    "Category id cannot be empty".into(),
                ));
            }
            index.push(decl.id.clone())?;
            nodes.push(CategoryNode {
                id: decl.id.clone(),
                parent: None,
                children: decl.children.iter().cloned().collect(),
            });
        }
        let parent_count = nodes.len();

        for decl in decls {
            for child in &decl.children {
                if child.is_empty() {
                    return Err(LayersError::InvalidTree(format!(
                        "Parent '{}' has a child with an empty id",
                        decl.id
                    )));
                }
                if let Some(position) = index.position(child) {
                    let reason = if position < parent_count {
                        format!("Parent '{}' cannot be a child of '{}'", child, decl.id)
                    } else {
                        format!(
                            "Leaf '{}' belongs to more than one parent (or is listed twice)",
                            child
                        )
                    };
                    return Err(LayersError::InvalidTree(reason));
                }
                index.push(child.clone())?;
                nodes.push(CategoryNode {
                    id: child.clone(),
                    parent: Some(decl.id.clone()),
                    children: SmallVec::new(),
                });
            }
        }

        log::debug!(
            "Built category tree: {} parents, {} categories total",
            parent_count,
            nodes.len()
        );

        Ok(Self {
            nodes,
            index,
            parent_count,
        })
    }

    /// Ordered declarations that rebuild this tree.
    pub fn declarations(&self) -> Vec<CategoryDecl> {
        self.parents()
            .map(|node| CategoryDecl {
                id: node.id.clone(),
                children: node.children.to_vec(),
            })
            .collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.position(id).is_some()
    }

    pub fn node(&self, id: &str) -> Option<&CategoryNode> {
        self.index.position(id).map(|position| &self.nodes[position])
    }

    pub fn is_parent(&self, id: &str) -> bool {
        self.node(id).is_some_and(CategoryNode::is_parent)
    }

    pub fn is_leaf(&self, id: &str) -> bool {
        self.node(id).is_some_and(|node| !node.is_parent())
    }

    /// Children of a parent in declared order; empty for leaves and unknown ids.
    pub fn children_of(&self, id: &str) -> &[CategoryId] {
        self.node(id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn parent_of(&self, id: &str) -> Option<&CategoryId> {
        self.node(id).and_then(|node| node.parent.as_ref())
    }

    /// Every id in flattened order.
    pub fn all_ids(&self) -> &[CategoryId] {
        self.index.ids()
    }

    pub fn parents(&self) -> impl Iterator<Item = &CategoryNode> {
        self.nodes[..self.parent_count].iter()
    }

    pub fn leaves(&self) -> impl Iterator<Item = &CategoryNode> {
        self.nodes[self.parent_count..].iter()
    }

    pub fn flattened(&self) -> &FlattenedIndex {
        &self.index
    }

    pub fn position(&self, id: &str) -> Option<usize> {
        self.index.position(id)
    }

    /// Number of parents plus the sum of their children counts.
    pub fn total_categories(&self) -> usize {
        self.nodes.len()
    }

    pub fn parent_count(&self) -> usize {
        self.parent_count
    }
}

#[derive(Debug, Default)]
pub struct CategoryTreeBuilder {
    decls: Vec<CategoryDecl>,
}

impl CategoryTreeBuilder {
    /// Declare a parent category with its leaves, in order.
    pub fn parent<I, C>(mut self, id: impl Into<CategoryId>, children: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<CategoryId>,
    {
        self.decls.push(CategoryDecl::new(id, children));
        self
    }

    pub fn build(self) -> Result<CategoryTree> {
        CategoryTree::from_declarations(&self.decls)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_tree() -> CategoryTree {
        CategoryTree::builder()
            .parent("p", ["a", "b"])
            .parent("q", ["c"])
            .build()
            .unwrap()
    }

    #[test]
    fn test_flattened_order_parents_first() {
        let tree = sample_tree();
        let ids: Vec<&str> = tree.all_ids().iter().map(|id| id.as_str()).collect();
        assert_eq!(ids, ["p", "q", "a", "b", "c"]);

        for (position, id) in tree.all_ids().iter().enumerate() {
            assert_eq!(tree.position(id), Some(position));
            assert_eq!(tree.flattened().id_at(position), Some(id));
        }
        assert_eq!(tree.total_categories(), 5);
        assert_eq!(tree.parent_count(), 2);
    }

    #[test]
    fn test_queries() {
        let tree = sample_tree();
        assert!(tree.is_parent("p"));
        assert!(!tree.is_parent("a"));
        assert!(tree.is_leaf("a"));
        assert_eq!(
            tree.children_of("p"),
            [CategoryId::new("a"), CategoryId::new("b")]
        );
        assert_eq!(tree.parent_of("c").map(|id| id.as_str()), Some("q"));
        assert!(tree.parent_of("q").is_none());
    }

    #[test]
    fn test_unknown_ids_yield_empty_results() {
        let tree = sample_tree();
        assert!(!tree.contains("zzz"));
        assert!(!tree.is_parent("zzz"));
        assert!(!tree.is_leaf("zzz"));
        assert!(tree.children_of("zzz").is_empty());
        assert!(tree.children_of("a").is_empty());
        assert!(tree.position("zzz").is_none());
    }

    #[test]
    fn test_parent_without_children() {
        let tree = CategoryTree::builder()
            .parent("lonely", Vec::<&str>::new())
            .build()
            .unwrap();
        assert!(tree.is_parent("lonely"));
        assert!(tree.children_of("lonely").is_empty());
        assert_eq!(tree.total_categories(), 1);
    }

    #[test]
    fn test_rejects_leaf_under_two_parents() {
        let err = CategoryTree::builder()
            .parent("p", ["a"])
            .parent("q", ["a"])
            .build()
            .unwrap_err();
        assert!(matches!(err, LayersError::InvalidTree(_)));
    }

    #[test]
    fn test_rejects_parent_as_child() {
        let err = CategoryTree::builder()
            .parent("p", ["q"])
            .parent("q", ["a"])
            .build()
            .unwrap_err();
        assert!(matches!(err, LayersError::InvalidTree(_)));
    }

    #[test]
    fn test_rejects_duplicate_parent_and_empty_id() {
        assert!(
            CategoryTree::builder()
                .parent("p", ["a"])
                .parent("p", ["b"])
                .build()
                .is_err()
        );
        assert!(CategoryTree::builder().parent("", ["a"]).build().is_err());
        assert!(CategoryTree::builder().parent("p", [""]).build().is_err());
    }

    #[test]
    fn test_declarations_round_trip() {
        let tree = sample_tree();
        let rebuilt = CategoryTree::from_declarations(&tree.declarations()).unwrap();
        assert_eq!(rebuilt.all_ids(), tree.all_ids());
    }
}
