//! Per-session checkbox state over a category tree.

use crate::category::CategoryTree;
use crate::error::{LayersError, Result};
use geolayers_types::id::CategoryId;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

const WORD_BITS: usize = u64::BITS as usize;

/// Fixed-width bit vector; bit `i` is the state of the category at flattened position `i`.
///
/// Unused high bits of the last word are always zero, so two vectors with the
/// same width and the same set bits compare equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct SelectionBits {
    len: usize,
    words: SmallVec<[u64; 2]>,
}

impl SelectionBits {
    /// All-zero vector of the given width.
    pub fn zeros(len: usize) -> Self {
        Self {
            len,
            words: SmallVec::from_elem(0, len.div_ceil(WORD_BITS)),
        }
    }

    pub(crate) fn set(&mut self, position: usize, value: bool) {
        debug_assert!(position < self.len);
        let mask = 1u64 << (position % WORD_BITS);
        let word = &mut self.words[position / WORD_BITS];
        if value {
            *word |= mask;
        } else {
            *word &= !mask;
        }
    }

    /// Bit at `position`, or `None` past the end.
    pub fn get(&self, position: usize) -> Option<bool> {
        if position >= self.len {
            return None;
        }
        Some(self.words[position / WORD_BITS] & (1u64 << (position % WORD_BITS)) != 0)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn count_ones(&self) -> usize {
        self.words.iter().map(|word| word.count_ones() as usize).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        (0..self.len).map(|position| self.get(position).unwrap_or(false))
    }

    /// Positions whose bits differ. Bits past the shorter width count as zero.
    pub fn differing_bits(&self, other: &SelectionBits) -> Vec<usize> {
        (0..self.len.max(other.len))
            .filter(|&position| {
                self.get(position).unwrap_or(false) != other.get(position).unwrap_or(false)
            })
            .collect()
    }

    /// `'0'`/`'1'` rendering, position 0 first.
    pub fn to_bit_string(&self) -> String {
        self.iter().map(|bit| if bit { '1' } else { '0' }).collect()
    }

    /// Parse a `'0'`/`'1'` string produced by [`SelectionBits::to_bit_string`].
    pub fn parse(bits: &str) -> Result<Self> {
        let mut parsed = Self::zeros(bits.chars().count());
        for (position, ch) in bits.chars().enumerate() {
            match ch {
                '0' => {}
                '1' => parsed.set(position, true),
                other => {
                    return Err(LayersError::InvalidConfig(format!(
                        "Selection bits may only contain '0' or '1', found '{}' at {}",
                        other, position
                    )));
                }
            }
        }
        Ok(parsed)
    }
}

impl fmt::Display for SelectionBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_bit_string())
    }
}

impl From<SelectionBits> for String {
    fn from(bits: SelectionBits) -> Self {
        bits.to_bit_string()
    }
}

impl TryFrom<String> for SelectionBits {
    type Error = LayersError;

    fn try_from(bits: String) -> Result<Self> {
        Self::parse(&bits)
    }
}

/// Checked/unchecked flag for every category of a tree.
///
/// The state always holds exactly one flag per tree id and starts all-false.
/// It changes only through [`SelectionState::toggle`].
///
/// # Examples
///
/// ```rust
/// use geolayers::category::CategoryTree;
/// use geolayers::selection::SelectionState;
/// use std::sync::Arc;
///
/// let tree = Arc::new(CategoryTree::builder().parent("p", ["a", "b"]).build()?);
/// let mut selection = SelectionState::new(tree);
///
/// selection.toggle("p")?;
/// assert!(selection.current("a")? && selection.current("b")?);
///
/// selection.toggle("a")?;
/// assert!(selection.current("p")?);
/// assert!(!selection.current("a")?);
/// assert_eq!(selection.encode().to_bit_string(), "101");
/// # Ok::<(), geolayers::LayersError>(())
/// ```
#[derive(Debug, Clone)]
pub struct SelectionState {
    tree: Arc<CategoryTree>,
    checked: Vec<bool>,
}

impl SelectionState {
    pub fn new(tree: Arc<CategoryTree>) -> Self {
        let checked = vec![false; tree.total_categories()];
        Self { tree, checked }
    }

    /// Restore a state from an encoding of the same tree.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` when the width differs from the tree's category count.
    pub fn from_bits(tree: Arc<CategoryTree>, bits: &SelectionBits) -> Result<Self> {
        if bits.len() != tree.total_categories() {
            return Err(LayersError::InvalidConfig(format!(
                "Selection has {} bits but the category tree has {} categories",
                bits.len(),
                tree.total_categories()
            )));
        }
        let checked = bits.iter().collect();
        Ok(Self { tree, checked })
    }

    pub fn tree(&self) -> &Arc<CategoryTree> {
        &self.tree
    }

    fn position(&self, id: &str) -> Result<usize> {
        self.tree
            .position(id)
            .ok_or_else(|| LayersError::UnknownCategory(CategoryId::from(id)))
    }

    pub fn current(&self, id: &str) -> Result<bool> {
        Ok(self.checked[self.position(id)?])
    }

    /// Flip `id`. A parent pushes its new value to all of its children; a
    /// leaf changes alone and leaves its parent's flag as it was.
    ///
    /// Returns the new value of `id`.
    pub fn toggle(&mut self, id: &str) -> Result<bool> {
        let position = self.position(id)?;
        let new_val = !self.checked[position];

        for child in self.tree.children_of(id) {
            if let Some(child_position) = self.tree.position(child) {
                self.checked[child_position] = new_val;
            }
        }
        self.checked[position] = new_val;

        log::debug!("Toggled category '{}' -> {}", id, new_val);
        Ok(new_val)
    }

    pub fn encode(&self) -> SelectionBits {
        let mut bits = SelectionBits::zeros(self.checked.len());
        for (position, &checked) in self.checked.iter().enumerate() {
            if checked {
                bits.set(position, true);
            }
        }
        bits
    }

    /// Checked ids in flattened order.
    pub fn selected_ids(&self) -> impl Iterator<Item = &CategoryId> {
        self.tree
            .all_ids()
            .iter()
            .zip(&self.checked)
            .filter_map(|(id, &checked)| checked.then_some(id))
    }

    /// Checked leaves in flattened order.
    pub fn selected_leaves(&self) -> impl Iterator<Item = &CategoryId> {
        let parent_count = self.tree.parent_count();
        self.tree.all_ids()[parent_count..]
            .iter()
            .zip(&self.checked[parent_count..])
            .filter_map(|(id, &checked)| checked.then_some(id))
    }

    /// Whether every child of `parent` is checked. Vacuously true for a
    /// parent without children; false for leaves.
    pub fn is_fully_selected(&self, parent: &str) -> Result<bool> {
        self.position(parent)?;
        if !self.tree.is_parent(parent) {
            return Ok(false);
        }
        Ok(self
            .tree
            .children_of(parent)
            .iter()
            .all(|child| self.current(child).unwrap_or(false)))
    }
}
