//! Checklist templates: kinds, the two-level item tree, and answer validation.
//!
//! Items reference an optional parent item of the same checklist. A parent
//! groups sub-items ("Freios" → "Pastilhas", "Fluido"); only leaves are
//! answered when a driver fills the checklist. An item with no children is a
//! leaf even at the top level.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

pub const KIND_DAILY: &str = "daily";
pub const KIND_WEEKLY: &str = "weekly";
pub const KIND_MONTHLY: &str = "monthly";
pub const KIND_TRIP: &str = "trip";

pub const VALID_KINDS: &[&str] = &[KIND_DAILY, KIND_WEEKLY, KIND_MONTHLY, KIND_TRIP];

pub fn validate_kind(kind: &str) -> Result<(), CoreError> {
    if VALID_KINDS.contains(&kind) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid checklist kind '{kind}'. Must be one of: {}",
            VALID_KINDS.join(", ")
        )))
    }
}

/// Answer given to a single checklist item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Conformity {
    Conforming,
    NonConforming,
}

impl Conformity {
    pub fn as_str(self) -> &'static str {
        match self {
            Conformity::Conforming => "conforming",
            Conformity::NonConforming => "non_conforming",
        }
    }

    pub fn parse(value: &str) -> Result<Self, CoreError> {
        match value {
            "conforming" => Ok(Conformity::Conforming),
            "non_conforming" => Ok(Conformity::NonConforming),
            other => Err(CoreError::Validation(format!(
                "Invalid conformity '{other}'. Must be one of: conforming, non_conforming"
            ))),
        }
    }

    /// Whether this answer opens a pendency.
    pub fn opens_pendency(self) -> bool {
        self == Conformity::NonConforming
    }
}

/// Accessors the tree builder needs from an item row.
pub trait TreeItem {
    fn id(&self) -> DbId;
    fn parent_id(&self) -> Option<DbId>;
    fn sort_order(&self) -> i32;
}

/// A top-level item with its (possibly empty) sub-items.
#[derive(Debug, Clone, Serialize)]
pub struct ItemNode<T> {
    #[serde(flatten)]
    pub item: T,
    pub children: Vec<T>,
}

/// Group items into top-level nodes, each with its children.
///
/// Both levels are ordered by `(sort_order, id)`. Fails if an item points to
/// a parent that is missing or that is itself a child.
pub fn build_tree<T: TreeItem + Clone>(items: &[T]) -> Result<Vec<ItemNode<T>>, CoreError> {
    let by_id: HashMap<DbId, &T> = items.iter().map(|i| (i.id(), i)).collect();

    let mut roots: Vec<&T> = Vec::new();
    let mut children: HashMap<DbId, Vec<&T>> = HashMap::new();

    for item in items {
        match item.parent_id() {
            None => roots.push(item),
            Some(parent_id) => {
                let parent = by_id.get(&parent_id).ok_or_else(|| {
                    CoreError::Validation(format!(
                        "Item {} references missing parent {parent_id}",
                        item.id()
                    ))
                })?;
                if parent.parent_id().is_some() {
                    return Err(CoreError::Validation(format!(
                        "Item {} is nested more than two levels deep",
                        item.id()
                    )));
                }
                children.entry(parent_id).or_default().push(item);
            }
        }
    }

    roots.sort_by_key(|i| (i.sort_order(), i.id()));

    Ok(roots
        .into_iter()
        .map(|root| {
            let mut kids = children.remove(&root.id()).unwrap_or_default();
            kids.sort_by_key(|i| (i.sort_order(), i.id()));
            ItemNode {
                item: root.clone(),
                children: kids.into_iter().cloned().collect(),
            }
        })
        .collect())
}

/// Ids of items that have no children.
pub fn leaf_ids<T: TreeItem>(items: &[T]) -> HashSet<DbId> {
    let parents: HashSet<DbId> = items.iter().filter_map(TreeItem::parent_id).collect();
    items
        .iter()
        .map(TreeItem::id)
        .filter(|id| !parents.contains(id))
        .collect()
}

/// Validate a proposed parent for a new or moved item.
///
/// `parent` is `(checklist_id, parent_id)` of the proposed parent row.
pub fn validate_parent(
    checklist_id: DbId,
    item_id: Option<DbId>,
    parent: (DbId, Option<DbId>),
    parent_id: DbId,
) -> Result<(), CoreError> {
    let (parent_checklist, grandparent) = parent;
    if parent_checklist != checklist_id {
        return Err(CoreError::Validation(format!(
            "Parent item {parent_id} belongs to another checklist"
        )));
    }
    if grandparent.is_some() {
        return Err(CoreError::Validation(format!(
            "Parent item {parent_id} is already a sub-item; only two levels are allowed"
        )));
    }
    if item_id == Some(parent_id) {
        return Err(CoreError::Validation("An item cannot be its own parent".into()));
    }
    Ok(())
}

/// Check a submission's answers against the checklist's items.
///
/// Every answer must target a leaf of this checklist, no leaf may be answered
/// twice, and every leaf must be answered.
pub fn validate_answers<T: TreeItem>(items: &[T], answered: &[DbId]) -> Result<(), CoreError> {
    if items.is_empty() {
        return Err(CoreError::Validation("Checklist has no items".into()));
    }
    let all: HashSet<DbId> = items.iter().map(TreeItem::id).collect();
    let leaves = leaf_ids(items);
    let mut seen = HashSet::new();

    for id in answered {
        if !all.contains(id) {
            return Err(CoreError::Validation(format!(
                "Item {id} does not belong to this checklist"
            )));
        }
        if !leaves.contains(id) {
            return Err(CoreError::Validation(format!(
                "Item {id} groups sub-items and cannot be answered directly"
            )));
        }
        if !seen.insert(*id) {
            return Err(CoreError::Validation(format!("Item {id} answered more than once")));
        }
    }

    let mut missing: Vec<DbId> = leaves.difference(&seen).copied().collect();
    if !missing.is_empty() {
        missing.sort_unstable();
        let ids: Vec<String> = missing.iter().map(ToString::to_string).collect();
        return Err(CoreError::Validation(format!(
            "Unanswered items: {}",
            ids.join(", ")
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        id: DbId,
        parent: Option<DbId>,
        order: i32,
    }

    impl TreeItem for Item {
        fn id(&self) -> DbId {
            self.id
        }
        fn parent_id(&self) -> Option<DbId> {
            self.parent
        }
        fn sort_order(&self) -> i32 {
            self.order
        }
    }

    fn item(id: DbId, parent: Option<DbId>, order: i32) -> Item {
        Item { id, parent, order }
    }

    /// 1 Freios (2 Pastilhas, 3 Fluido), 4 Pneus, 5 Luzes (6 Farol)
    fn sample() -> Vec<Item> {
        vec![
            item(5, None, 3),
            item(3, Some(1), 2),
            item(1, None, 1),
            item(6, Some(5), 1),
            item(2, Some(1), 1),
            item(4, None, 2),
        ]
    }

    #[test]
    fn tree_is_ordered_at_both_levels() {
        let tree = build_tree(&sample()).unwrap();
        let roots: Vec<DbId> = tree.iter().map(|n| n.item.id).collect();
        assert_eq!(roots, vec![1, 4, 5]);
        let freios: Vec<DbId> = tree[0].children.iter().map(|c| c.id).collect();
        assert_eq!(freios, vec![2, 3]);
        assert!(tree[1].children.is_empty());
    }

    #[test]
    fn tree_rejects_third_level() {
        let items = vec![item(1, None, 1), item(2, Some(1), 1), item(3, Some(2), 1)];
        assert_matches!(build_tree(&items), Err(CoreError::Validation(_)));
    }

    #[test]
    fn tree_rejects_missing_parent() {
        let items = vec![item(2, Some(99), 1)];
        assert_matches!(build_tree(&items), Err(CoreError::Validation(_)));
    }

    #[test]
    fn leaves_exclude_group_items() {
        let leaves = leaf_ids(&sample());
        let mut ids: Vec<DbId> = leaves.into_iter().collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![2, 3, 4, 6]);
    }

    #[test]
    fn complete_answers_pass() {
        assert!(validate_answers(&sample(), &[2, 3, 4, 6]).is_ok());
    }

    #[test]
    fn answering_a_group_fails() {
        let err = validate_answers(&sample(), &[1, 2, 3, 4, 6]).unwrap_err();
        assert!(err.to_string().contains("cannot be answered directly"));
    }

    #[test]
    fn foreign_item_fails() {
        let err = validate_answers(&sample(), &[2, 3, 4, 6, 42]).unwrap_err();
        assert!(err.to_string().contains("does not belong"));
    }

    #[test]
    fn duplicate_answer_fails() {
        let err = validate_answers(&sample(), &[2, 2, 3, 4, 6]).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn missing_leaves_are_listed() {
        let err = validate_answers(&sample(), &[2, 4]).unwrap_err();
        assert!(err.to_string().contains("Unanswered items: 3, 6"));
    }

    #[test]
    fn parent_rules() {
        assert!(validate_parent(1, None, (1, None), 10).is_ok());
        assert!(validate_parent(1, None, (2, None), 10).is_err());
        assert!(validate_parent(1, None, (1, Some(5)), 10).is_err());
        assert!(validate_parent(1, Some(10), (1, None), 10).is_err());
    }

    #[test]
    fn conformity_round_trip_and_pendency_rule() {
        assert_eq!(Conformity::parse("non_conforming").unwrap(), Conformity::NonConforming);
        assert!(Conformity::NonConforming.opens_pendency());
        assert!(!Conformity::Conforming.opens_pendency());
        assert!(Conformity::parse("maybe").is_err());
    }

    #[test]
    fn kinds() {
        assert!(validate_kind(KIND_DAILY).is_ok());
        assert!(validate_kind("yearly").is_err());
    }
}
