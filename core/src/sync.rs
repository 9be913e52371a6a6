//! Keeping the in-memory forest and the [`ResourceStore`] in step.
//!
//! [`SyncController`] owns the current [`ForestState`], the selection workflow and any cascade
//! delete that stopped midway. Mutations that the user expects to see immediately (adding and
//! renaming) are applied locally first and rolled back if the store refuses them. Deletions go to
//! the store first and only then leave the local tree.

use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::cascade::{CascadePlan, CascadeRun, CascadeStep};
use crate::codec::{flatten, unflatten};
use crate::compose::{compose, MERGED_FILE_NAME};
use crate::editor::EditorBuffer;
use crate::filter::filter_tree;
use crate::ids::{random_id, IdGenerator, TimestampIds};
use crate::selection::{SelectOutcome, Selection, SelectionMode, SelectionState};
use crate::state::{Action, ForestState};
use crate::store::{FilePayload, NewCollection, ResourceStore, StoreError};
use crate::tree::{file_location, find_collection, find_item_name, CollectionNode, ItemKind, NewItem, TreeError};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Cascade delete of collection '{collection_id}' stopped at '{step}' ({completed} steps done, {remaining} left)")]
    Cascade {
        collection_id: String,
        step: CascadeStep,
        completed: usize,
        remaining: usize,
        #[source]
        source: StoreError,
    },

    #[error("A merge needs at least two selected files, {selected} selected")]
    MergeNotReady { selected: usize },

    #[error("No merge is in progress")]
    NoMergeInProgress,

    #[error("No files selected")]
    NothingSelected,

    #[error("Collection '{0}' does not exist")]
    UnknownCollection(String),
}

pub type Result<T> = std::result::Result<T, SyncError>;

/// Result of [`SyncController::save_structure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveStatus {
    /// The forest was empty; nothing was sent so the persisted structure cannot be wiped.
    SkippedEmpty,
    /// This many records were written.
    Saved(usize),
}

/// Where [`SyncController::execute_merge`] puts the merged file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MergeDestination {
    Existing(String),
    New { name: String, parent_id: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub collection_id: String,
    pub file_id: String,
    pub merged: usize,
    pub success: bool,
}

pub struct SyncController<S> {
    store: S,
    state: ForestState,
    selection: SelectionState,
    pending_cascade: Option<CascadeRun>,
    ids: Box<dyn IdGenerator>,
}

impl<S: ResourceStore> SyncController<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            state: ForestState::default(),
            selection: SelectionState::default(),
            pending_cascade: None,
            ids: Box::new(TimestampIds::new()),
        }
    }

    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn state(&self) -> &ForestState {
        &self.state
    }

    pub fn forest(&self) -> &[CollectionNode] {
        self.state.forest()
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// The cascade delete that failed last, if it has not been resumed to completion.
    pub fn pending_cascade(&self) -> Option<&CascadeRun> {
        self.pending_cascade.as_ref()
    }

    /// The forest as the sidebar shows it for `term`.
    pub fn filtered(&self, term: &str) -> Vec<CollectionNode> {
        filter_tree(self.state.forest(), term)
    }

    /// Replaces the local forest with the store's. Any failure leaves an empty forest.
    #[instrument(skip(self))]
    pub async fn load_structure(&mut self) -> &[CollectionNode] {
        let forest = match self.store.get_collection_structure().await {
            Ok(records) => {
                debug!(records = records.len(), "Loaded collection structure");
                unflatten(&records)
            }
            Err(e) => {
                error!(error = %e, "Failed to load collection structure");
                Vec::new()
            }
        };
        self.state = self.state.replaced(forest);
        self.state.forest()
    }

    /// Persists the skeleton of the current forest.
    #[instrument(skip(self))]
    pub async fn save_structure(&self) -> Result<SaveStatus> {
        if self.state.forest().is_empty() {
            warn!("Refusing to save an empty collection structure");
            return Ok(SaveStatus::SkippedEmpty);
        }
        let records = flatten(self.state.forest());
        self.store.save_collection_structure(&records).await?;
        debug!(records = records.len(), "Saved collection structure");
        Ok(SaveStatus::Saved(records.len()))
    }

    /// Adds a collection under `parent_id` (or at the root) and persists the structure.
    ///
    /// Returns the new id, or `None` when the name is blank or the parent is unknown and nothing
    /// changed.
    #[instrument(skip(self))]
    pub async fn add_collection(&mut self, name: &str, parent_id: Option<&str>) -> Result<Option<String>> {
        if name.trim().is_empty() {
            debug!("Ignoring blank collection name");
            return Ok(None);
        }
        let id = self.ids.next_id();
        let next = self.state.reduce(Action::Add {
            kind: ItemKind::Collection,
            parent_id: parent_id.map(str::to_string),
            item: NewItem::new(id.as_str(), name),
        })?;
        if next.version() == self.state.version() {
            return Ok(None);
        }

        let previous = std::mem::replace(&mut self.state, next);
        if let Err(e) = self.save_structure().await {
            warn!(error = %e, "Rolling back new collection");
            self.state = previous;
            return Err(e);
        }
        info!(%id, "Collection added");
        Ok(Some(id))
    }

    /// Adds an empty file to collection `parent_id`, creates it in the store and persists the
    /// structure.
    #[instrument(skip(self))]
    pub async fn add_file(&mut self, name: &str, parent_id: &str) -> Result<Option<String>> {
        if name.trim().is_empty() {
            debug!("Ignoring blank file name");
            return Ok(None);
        }
        let id = self.ids.next_id();
        let next = self.state.reduce(Action::Add {
            kind: ItemKind::File,
            parent_id: Some(parent_id.to_string()),
            item: NewItem::new(id.as_str(), name),
        })?;
        if next.version() == self.state.version() {
            return Ok(None);
        }

        let previous = std::mem::replace(&mut self.state, next);
        let payload = FilePayload::new(parent_id, Some(id.clone()), name, String::new());
        let persisted = match self.store.save_file(&payload).await {
            Ok(_) => self.save_structure().await.map(|_| ()),
            Err(e) => Err(e.into()),
        };
        if let Err(e) = persisted {
            warn!(error = %e, "Rolling back new file");
            self.state = previous;
            return Err(e);
        }
        info!(%id, "File added");
        Ok(Some(id))
    }

    /// Renames a collection or file. Returns `false` when the id is unknown or the new name is
    /// blank. Renaming to the current name succeeds without touching the store.
    #[instrument(skip(self))]
    pub async fn rename(&mut self, id: &str, kind: ItemKind, new_name: &str) -> Result<bool> {
        if new_name.trim().is_empty() {
            debug!("Ignoring blank name");
            return Ok(false);
        }
        let next = self.state.reduce(Action::Rename {
            id: id.to_string(),
            kind,
            name: new_name.to_string(),
        })?;
        if next.version() == self.state.version() {
            return Ok(find_item_name(self.state.forest(), id, kind).is_some());
        }

        let previous = std::mem::replace(&mut self.state, next);
        let persisted = match kind {
            ItemKind::Collection => self.persist_collection_rename(id, new_name).await,
            ItemKind::File => self.persist_file_rename(id, new_name).await,
        };
        if let Err(e) = persisted {
            warn!(error = %e, "Rolling back rename");
            self.state = previous;
            return Err(e);
        }
        Ok(true)
    }

    async fn persist_collection_rename(&self, id: &str, new_name: &str) -> Result<()> {
        self.store.rename_collection(id, new_name).await?;
        self.save_structure().await?;
        Ok(())
    }

    /// The store has no rename for files; the file is rewritten under its new name.
    async fn persist_file_rename(&self, id: &str, new_name: &str) -> Result<()> {
        let Some((owner, _)) = file_location(self.state.forest(), id) else {
            return Err(TreeError::NotFound { kind: ItemKind::File, id: id.to_string() }.into());
        };
        let stored = self
            .store
            .get_file(id)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("file {id}")))?;
        let payload = FilePayload::new(owner.id.as_str(), Some(id.to_string()), new_name, stored.content);
        self.store.save_file(&payload).await?;
        Ok(())
    }

    /// Flips a collection's open flag. Local only.
    pub fn toggle_open(&mut self, id: &str) -> bool {
        match self.state.reduce(Action::ToggleOpen { id: id.to_string() }) {
            Ok(next) if next.version() != self.state.version() => {
                self.state = next;
                true
            }
            _ => false,
        }
    }

    /// Deletes a file in the store, then from the local tree. Returns `false` for unknown ids.
    #[instrument(skip(self))]
    pub async fn delete_file(&mut self, file_id: &str) -> Result<bool> {
        let Some((owner, _)) = file_location(self.state.forest(), file_id) else {
            debug!("File not in forest");
            return Ok(false);
        };
        let parent_id = owner.id.clone();

        self.store.delete_file(file_id).await?;
        self.state = self.state.reduce(Action::Delete {
            id: file_id.to_string(),
            kind: ItemKind::File,
            parent_id: Some(parent_id),
        })?;
        Ok(true)
    }

    /// Deletes a collection with all its files and sub-collections, then reloads the forest.
    ///
    /// If a remote call fails the run is kept and can be continued with
    /// [`SyncController::resume_cascade`]; the local forest is left as it was.
    #[instrument(skip(self))]
    pub async fn delete_collection(&mut self, collection_id: &str) -> Result<bool> {
        let Some(node) = find_collection(self.state.forest(), collection_id) else {
            debug!("Collection not in forest");
            return Ok(false);
        };
        let run = CascadeRun::new(CascadePlan::for_collection(node));
        if let Some(stale) = self.pending_cascade.take() {
            warn!(
                collection_id = stale.plan().root_id(),
                "Discarding unfinished cascade delete"
            );
        }
        self.run_cascade(run).await?;
        Ok(true)
    }

    /// Continues the last failed cascade. Returns `false` when there is none.
    #[instrument(skip(self))]
    pub async fn resume_cascade(&mut self) -> Result<bool> {
        let Some(run) = self.pending_cascade.take() else {
            return Ok(false);
        };
        self.run_cascade(run).await?;
        Ok(true)
    }

    async fn run_cascade(&mut self, mut run: CascadeRun) -> Result<()> {
        match run.execute(&self.store).await {
            Ok(()) => {
                info!(collection_id = run.plan().root_id(), "Cascade delete finished");
                self.load_structure().await;
                Ok(())
            }
            Err(failure) => {
                let err = SyncError::Cascade {
                    collection_id: run.plan().root_id().to_string(),
                    step: failure.step,
                    completed: run.completed_count(),
                    remaining: run.remaining().count(),
                    source: failure.source,
                };
                self.pending_cascade = Some(run);
                Err(err)
            }
        }
    }

    /// Starts collecting files for an insert.
    pub fn begin_insert(&mut self) {
        self.selection.begin_insert();
    }

    /// Starts collecting files for a merge.
    pub fn begin_merge(&mut self) {
        self.selection.begin_merge();
    }

    pub fn cancel_selection(&mut self) {
        self.selection.cancel();
    }

    /// Feeds a click on `file_id` into the active selection workflow.
    pub fn select_file(&mut self, file_id: &str) -> SelectOutcome {
        match file_location(self.state.forest(), file_id) {
            Some((owner, file)) => self.selection.select(&owner.id, &file.id, &file.name),
            None => SelectOutcome::Ignored,
        }
    }

    /// Concatenates the merge selection into a new file placed at `destination`, then reloads.
    ///
    /// The selection workflow ends whether or not the merge goes through.
    #[instrument(skip(self))]
    pub async fn execute_merge(&mut self, destination: MergeDestination) -> Result<MergeOutcome> {
        if self.selection.mode() != SelectionMode::Merge {
            return Err(SyncError::NoMergeInProgress);
        }
        let selection = self.selection.take().unwrap_or_default();
        if selection.len() < 2 {
            return Err(SyncError::MergeNotReady { selected: selection.len() });
        }

        let collection_id = match destination {
            MergeDestination::Existing(id) => {
                if find_collection(self.state.forest(), &id).is_none() {
                    return Err(SyncError::UnknownCollection(id));
                }
                id
            }
            MergeDestination::New { name, parent_id } => {
                let collection = NewCollection {
                    collection_id: self.ids.next_id(),
                    collection_name: name,
                    parent_id,
                };
                self.store.create_collection(&collection).await?;
                collection.collection_id
            }
        };

        let content = self.collect_content(&selection).await;
        let file_id = random_id();
        let payload = FilePayload::new(collection_id.as_str(), Some(file_id.clone()), MERGED_FILE_NAME, content);
        let outcome = self.store.create_file(&payload).await?;
        info!(%collection_id, %file_id, merged = selection.len(), "Merged files");

        self.load_structure().await;
        Ok(MergeOutcome {
            collection_id,
            file_id,
            merged: selection.len(),
            success: outcome.success,
        })
    }

    /// Appends the selected files' content to `buffer` and ends the selection workflow.
    ///
    /// Returns the number of files inserted.
    #[instrument(skip(self, selection, buffer), fields(selected = selection.len()))]
    pub async fn execute_insert(&mut self, selection: &Selection, buffer: &mut EditorBuffer) -> Result<usize> {
        if selection.is_empty() {
            return Err(SyncError::NothingSelected);
        }
        let text = self.collect_content(selection).await;
        buffer.append(&text);
        if self.selection.mode() == SelectionMode::Insert {
            self.selection.cancel();
        }
        Ok(selection.len())
    }

    /// Fetches every selected file in selection order. Files that cannot be read contribute an
    /// empty block.
    async fn collect_content(&self, selection: &Selection) -> String {
        let mut parts = Vec::with_capacity(selection.len());
        for entry in selection.ordered() {
            let content = self.fetch_content(&entry.file_id).await.unwrap_or_default();
            parts.push((entry.file_name.as_str(), content));
        }
        compose(parts.iter().map(|(name, content)| (*name, content.as_str())))
    }

    async fn fetch_content(&self, file_id: &str) -> Option<String> {
        match self.store.get_file(file_id).await {
            Ok(Some(file)) => Some(file.content),
            Ok(None) => {
                warn!(file_id, "Selected file not found in store");
                None
            }
            Err(e) => {
                error!(file_id, error = %e, "Failed to fetch selected file");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cascade_error_names_the_step() {
        let err = SyncError::Cascade {
            collection_id: "c1".into(),
            step: CascadeStep::DeleteFile("f2".into()),
            completed: 1,
            remaining: 2,
            source: StoreError::Rejected("busy".into()),
        };
        assert_eq!(
            err.to_string(),
            "Cascade delete of collection 'c1' stopped at 'delete file f2' (1 steps done, 2 left)"
        );
    }

    #[test]
    fn merge_errors_read_well() {
        assert_eq!(
            SyncError::MergeNotReady { selected: 1 }.to_string(),
            "A merge needs at least two selected files, 1 selected"
        );
    }
}
