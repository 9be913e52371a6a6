//! Deleting a collection together with everything it holds.
//!
//! A [`CascadePlan`] lists the remote calls needed to remove a subtree: every file first, then
//! every collection record with children before their parents. A [`CascadeRun`] executes the plan
//! one call at a time and remembers which steps already went through, so a run that failed midway
//! can be resumed without repeating (or tripping over) the finished steps.

use std::collections::HashSet;
use std::fmt;

use tracing::{debug, instrument, warn};

use crate::store::{ResourceStore, StoreError};
use crate::tree::{collection_ids_post_order, CollectionNode};

/// One remote call of a cascade.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CascadeStep {
    DeleteFile(String),
    DeleteCollection(String),
}

impl CascadeStep {
    /// Stable key identifying the step across retries.
    pub fn retry_key(&self) -> String {
        match self {
            CascadeStep::DeleteFile(id) => format!("file:{id}"),
            CascadeStep::DeleteCollection(id) => format!("collection:{id}"),
        }
    }

    async fn run<S: ResourceStore + ?Sized>(&self, store: &S) -> Result<(), StoreError> {
        match self {
            CascadeStep::DeleteFile(id) => store.delete_file(id).await,
            CascadeStep::DeleteCollection(id) => store.delete_collection(id).await,
        }
    }
}

impl fmt::Display for CascadeStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CascadeStep::DeleteFile(id) => write!(f, "delete file {id}"),
            CascadeStep::DeleteCollection(id) => write!(f, "delete collection {id}"),
        }
    }
}

/// Ordered steps that remove a collection subtree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CascadePlan {
    root_id: String,
    steps: Vec<CascadeStep>,
}

impl CascadePlan {
    /// Plans the removal of `node` and all of its descendants.
    ///
    /// Files are visited depth-first (a collection's own files before those of its
    /// sub-collections); collection records follow in post-order.
    pub fn for_collection(node: &CollectionNode) -> Self {
        let mut steps = Vec::new();
        push_file_steps(node, &mut steps);
        steps.extend(
            collection_ids_post_order(node)
                .into_iter()
                .map(CascadeStep::DeleteCollection),
        );
        Self {
            root_id: node.id.clone(),
            steps,
        }
    }

    /// Plans only the file deletions of the subtree; the collection records stay.
    pub fn files_of(node: &CollectionNode) -> Self {
        let mut steps = Vec::new();
        push_file_steps(node, &mut steps);
        Self {
            root_id: node.id.clone(),
            steps,
        }
    }

    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    pub fn steps(&self) -> &[CascadeStep] {
        &self.steps
    }
}

fn push_file_steps(node: &CollectionNode, steps: &mut Vec<CascadeStep>) {
    steps.extend(node.files.iter().map(|f| CascadeStep::DeleteFile(f.id.clone())));
    for child in &node.collections {
        push_file_steps(child, steps);
    }
}

/// The step that stopped a cascade, and why.
#[derive(Debug)]
pub struct CascadeFailure {
    pub step: CascadeStep,
    pub source: StoreError,
}

/// Execution state of a [`CascadePlan`].
#[derive(Debug, Clone)]
pub struct CascadeRun {
    plan: CascadePlan,
    completed: HashSet<String>,
}

impl CascadeRun {
    pub fn new(plan: CascadePlan) -> Self {
        Self {
            plan,
            completed: HashSet::new(),
        }
    }

    pub fn plan(&self) -> &CascadePlan {
        &self.plan
    }

    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }

    pub fn remaining(&self) -> impl Iterator<Item = &CascadeStep> {
        self.plan
            .steps
            .iter()
            .filter(|step| !self.completed.contains(&step.retry_key()))
    }

    pub fn is_complete(&self) -> bool {
        self.remaining().next().is_none()
    }

    /// Runs every step not yet completed, strictly in order, stopping at the first failure.
    ///
    /// A step the store reports as [`StoreError::NotFound`] is treated as done: it was removed
    /// by an earlier attempt whose acknowledgement got lost.
    #[instrument(skip(self, store), fields(collection_id = %self.plan.root_id))]
    pub async fn execute<S: ResourceStore + ?Sized>(&mut self, store: &S) -> Result<(), CascadeFailure> {
        let pending: Vec<CascadeStep> = self.remaining().cloned().collect();
        debug!(steps = pending.len(), "Running cascade");

        for step in pending {
            match step.run(store).await {
                Ok(()) => debug!(%step, "Cascade step done"),
                Err(StoreError::NotFound(what)) => {
                    debug!(%step, what = %what, "Cascade step target already gone");
                }
                Err(source) => {
                    warn!(%step, error = %source, "Cascade step failed");
                    return Err(CascadeFailure { step, source });
                }
            }
            self.completed.insert(step.retry_key());
        }
        Ok(())
    }
}

/// Deletes every file held by `node` or any of its sub-collections, depth-first.
///
/// Returns the number of files removed. The first failing delete stops the sweep.
pub async fn delete_all_files_in_collection<S: ResourceStore + ?Sized>(
    store: &S,
    node: &CollectionNode,
) -> Result<usize, CascadeFailure> {
    let mut run = CascadeRun::new(CascadePlan::files_of(node));
    run.execute(store).await?;
    Ok(run.completed_count())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::FileRef;

    #[test]
    fn plan_deletes_files_then_collections_bottom_up() {
        let node = CollectionNode::new("root", "Root")
            .with_files([FileRef::new("f1", "a")])
            .with_collections([
                CollectionNode::new("a", "A")
                    .with_files([FileRef::new("f2", "b")])
                    .with_collections([CollectionNode::new("a1", "A1").with_files([FileRef::new("f3", "c")])]),
                CollectionNode::new("b", "B").with_files([FileRef::new("f4", "d")]),
            ]);

        let plan = CascadePlan::for_collection(&node);
        let keys: Vec<_> = plan.steps().iter().map(CascadeStep::retry_key).collect();
        assert_eq!(
            keys,
            [
                "file:f1",
                "file:f2",
                "file:f3",
                "file:f4",
                "collection:a1",
                "collection:a",
                "collection:b",
                "collection:root",
            ]
        );
        assert_eq!(plan.root_id(), "root");
    }

    #[test]
    fn files_only_plan_keeps_the_collections() {
        let node = CollectionNode::new("root", "Root")
            .with_files([FileRef::new("f1", "a")])
            .with_collections([CollectionNode::new("a", "A").with_files([FileRef::new("f2", "b")])]);

        let plan = CascadePlan::files_of(&node);
        assert_eq!(
            plan.steps(),
            [CascadeStep::DeleteFile("f1".into()), CascadeStep::DeleteFile("f2".into())]
        );
    }

    #[test]
    fn fresh_run_has_everything_remaining() {
        let plan = CascadePlan::for_collection(&CollectionNode::new("c", "C"));
        let run = CascadeRun::new(plan);
        assert_eq!(run.remaining().count(), 1);
        assert!(!run.is_complete());
        assert_eq!(run.completed_count(), 0);
    }
}
