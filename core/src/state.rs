use crate::tree::{self, CollectionNode, ItemKind, NewItem, TreeError};

/// A change to the forest, expressed as data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Add {
        kind: ItemKind,
        parent_id: Option<String>,
        item: NewItem,
    },
    Rename {
        id: String,
        kind: ItemKind,
        name: String,
    },
    Delete {
        id: String,
        kind: ItemKind,
        parent_id: Option<String>,
    },
    ToggleOpen {
        id: String,
    },
    /// Wholesale replacement, e.g. after a reload.
    Replace(Vec<CollectionNode>),
}

/// The forest together with a version counter.
///
/// The version only moves when an action actually changed the forest, which lets callers tell a
/// no-op (absent id, unknown parent) from a real mutation without comparing trees.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForestState {
    version: u64,
    forest: Vec<CollectionNode>,
}

impl ForestState {
    pub fn new(forest: Vec<CollectionNode>) -> Self {
        Self { version: 0, forest }
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn forest(&self) -> &[CollectionNode] {
        &self.forest
    }

    pub fn into_forest(self) -> Vec<CollectionNode> {
        self.forest
    }

    /// The next state holding `forest`, whatever it contains.
    pub fn replaced(&self, forest: Vec<CollectionNode>) -> ForestState {
        ForestState {
            version: self.version + 1,
            forest,
        }
    }

    /// Applies `action` and returns the next state. `self` is left untouched.
    pub fn reduce(&self, action: Action) -> Result<ForestState, TreeError> {
        let forest = match action {
            Action::Add { kind, parent_id, item } => tree::add_item(&self.forest, kind, parent_id.as_deref(), item)?,
            Action::Rename { id, kind, name } => tree::rename_item(&self.forest, &id, kind, &name),
            Action::Delete { id, kind, parent_id } => tree::delete_item(&self.forest, &id, kind, parent_id.as_deref()),
            Action::ToggleOpen { id } => tree::toggle_open(&self.forest, &id),
            Action::Replace(forest) => return Ok(self.replaced(forest)),
        };

        if forest == self.forest {
            return Ok(self.clone());
        }
        Ok(ForestState {
            version: self.version + 1,
            forest,
        })
    }
}
