#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use folio_core::codec::{FlatFile, FlatRecord};
use folio_core::ids::IdGenerator;
use folio_core::store::{FilePayload, NewCollection, ResourceStore, SaveOutcome, StoreError, StoredFile};

#[derive(Debug, Clone)]
struct StoredEntry {
    collection_id: String,
    file_id: String,
    file_name: String,
    content: String,
}

#[derive(Debug, Default)]
struct Inner {
    collections: Vec<FlatRecord>,
    files: Vec<StoredEntry>,
    calls: Vec<String>,
    failures: HashMap<String, usize>,
}

/// In-memory store that behaves like the resource API and records every call.
///
/// Failures are injected per call key: either the operation name (`"delete_file"`) or the
/// operation with its id (`"delete_file:f2"`).
#[derive(Debug, Default)]
pub struct ScriptedStore {
    inner: Mutex<Inner>,
}

impl ScriptedStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collection(self, id: &str, name: &str, parent_id: Option<&str>) -> Self {
        self.inner.lock().unwrap().collections.push(FlatRecord::new(id, name, parent_id));
        self
    }

    pub fn with_file(self, collection_id: &str, file_id: &str, file_name: &str, content: &str) -> Self {
        self.inner.lock().unwrap().files.push(StoredEntry {
            collection_id: collection_id.into(),
            file_id: file_id.into(),
            file_name: file_name.into(),
            content: content.into(),
        });
        self
    }

    /// Makes the next `times` calls matching `key` fail with a 500.
    pub fn fail(&self, key: &str, times: usize) {
        self.inner.lock().unwrap().failures.insert(key.to_string(), times);
    }

    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.inner.lock().unwrap().calls.clear();
    }

    pub fn has_collection(&self, id: &str) -> bool {
        self.inner.lock().unwrap().collections.iter().any(|c| c.collection_id == id)
    }

    pub fn collection_name(&self, id: &str) -> Option<String> {
        self.inner
            .lock()
            .unwrap()
            .collections
            .iter()
            .find(|c| c.collection_id == id)
            .map(|c| c.collection_name.clone())
    }

    pub fn file(&self, id: &str) -> Option<(String, String, String)> {
        self.inner
            .lock()
            .unwrap()
            .files
            .iter()
            .find(|f| f.file_id == id)
            .map(|f| (f.collection_id.clone(), f.file_name.clone(), f.content.clone()))
    }

    pub fn files_in(&self, collection_id: &str) -> Vec<(String, String, String)> {
        self.inner
            .lock()
            .unwrap()
            .files
            .iter()
            .filter(|f| f.collection_id == collection_id)
            .map(|f| (f.file_id.clone(), f.file_name.clone(), f.content.clone()))
            .collect()
    }

    fn enter(&self, op: &str, arg: Option<&str>) -> Result<std::sync::MutexGuard<'_, Inner>, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let call = match arg {
            Some(arg) => format!("{op}:{arg}"),
            None => op.to_string(),
        };
        inner.calls.push(call.clone());

        for key in [call.as_str(), op] {
            if let Some(left) = inner.failures.get_mut(key) {
                if *left > 0 {
                    *left -= 1;
                    return Err(StoreError::Api {
                        status: 500,
                        message: format!("injected failure for {call}"),
                    });
                }
            }
        }
        Ok(inner)
    }
}

#[async_trait]
impl ResourceStore for ScriptedStore {
    async fn get_collection_structure(&self) -> Result<Vec<FlatRecord>, StoreError> {
        let inner = self.enter("get_collection_structure", None)?;
        Ok(inner
            .collections
            .iter()
            .map(|c| {
                let files = inner
                    .files
                    .iter()
                    .filter(|f| f.collection_id == c.collection_id)
                    .map(|f| FlatFile::new(f.file_id.as_str(), f.file_name.as_str()));
                c.clone().with_files(files)
            })
            .collect())
    }

    async fn save_collection_structure(&self, records: &[FlatRecord]) -> Result<(), StoreError> {
        let mut inner = self.enter("save_collection_structure", None)?;
        inner.collections = records.to_vec();
        Ok(())
    }

    async fn get_file(&self, file_id: &str) -> Result<Option<StoredFile>, StoreError> {
        let inner = self.enter("get_file", Some(file_id))?;
        Ok(inner.files.iter().find(|f| f.file_id == file_id).map(|f| StoredFile {
            file_id: Some(f.file_id.clone()),
            file_name: Some(f.file_name.clone()),
            content: f.content.clone(),
        }))
    }

    async fn save_file(&self, file: &FilePayload) -> Result<SaveOutcome, StoreError> {
        let file_id = file.file_id.clone().unwrap_or_else(|| format!("srv-{}", file.file_name));
        let mut inner = self.enter("save_file", Some(&file_id))?;
        let entry = StoredEntry {
            collection_id: file.collection_id.clone(),
            file_id: file_id.clone(),
            file_name: file.file_name.clone(),
            content: file.content.clone(),
        };
        match inner.files.iter_mut().find(|f| f.file_id == file_id) {
            Some(existing) => *existing = entry,
            None => inner.files.push(entry),
        }
        Ok(SaveOutcome { success: true })
    }

    async fn create_file(&self, file: &FilePayload) -> Result<SaveOutcome, StoreError> {
        let file_id = file.file_id.clone().unwrap_or_default();
        let mut inner = self.enter("create_file", Some(&file_id))?;
        inner.files.push(StoredEntry {
            collection_id: file.collection_id.clone(),
            file_id,
            file_name: file.file_name.clone(),
            content: file.content.clone(),
        });
        Ok(SaveOutcome { success: true })
    }

    async fn delete_file(&self, file_id: &str) -> Result<(), StoreError> {
        let mut inner = self.enter("delete_file", Some(file_id))?;
        let before = inner.files.len();
        inner.files.retain(|f| f.file_id != file_id);
        if inner.files.len() == before {
            return Err(StoreError::NotFound(format!("file {file_id}")));
        }
        Ok(())
    }

    async fn rename_collection(&self, collection_id: &str, new_name: &str) -> Result<(), StoreError> {
        let mut inner = self.enter("rename_collection", Some(collection_id))?;
        match inner.collections.iter_mut().find(|c| c.collection_id == collection_id) {
            Some(record) => {
                record.collection_name = new_name.to_string();
                Ok(())
            }
            None => Err(StoreError::NotFound(format!("collection {collection_id}"))),
        }
    }

    async fn delete_collection(&self, collection_id: &str) -> Result<(), StoreError> {
        let mut inner = self.enter("delete_collection", Some(collection_id))?;
        let before = inner.collections.len();
        inner.collections.retain(|c| c.collection_id != collection_id);
        if inner.collections.len() == before {
            return Err(StoreError::NotFound(format!("collection {collection_id}")));
        }
        Ok(())
    }

    async fn create_collection(&self, collection: &NewCollection) -> Result<(), StoreError> {
        let mut inner = self.enter("create_collection", Some(&collection.collection_id))?;
        inner.collections.push(FlatRecord::new(
            collection.collection_id.as_str(),
            collection.collection_name.as_str(),
            collection.parent_id.as_deref(),
        ));
        Ok(())
    }
}

/// Ids `n1`, `n2`, ... in call order.
#[derive(Debug, Default)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> String {
        format!("n{}", self.next.fetch_add(1, Ordering::SeqCst) + 1)
    }
}

/// Library store used by most tests:
///
/// ```text
/// Papers (p)
///   Drafts (d)
///     outline.tex (f3)
///   intro.tex (f1)
///   method.tex (f2)
/// Notes (n)
///   todo.md (f4)
/// ```
pub fn library() -> ScriptedStore {
    ScriptedStore::new()
        .with_collection("p", "Papers", None)
        .with_collection("d", "Drafts", Some("p"))
        .with_collection("n", "Notes", None)
        .with_file("p", "f1", "intro.tex", "\\section{Intro}")
        .with_file("p", "f2", "method.tex", "\\section{Method}")
        .with_file("d", "f3", "outline.tex", "% outline")
        .with_file("n", "f4", "todo.md", "- write")
}
