use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::store::{FilePayload, ResourceStore, SaveOutcome, StoreError};

/// The file currently open in the editor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveFile {
    pub collection_id: Option<String>,
    pub file_id: Option<String>,
    pub file_name: Option<String>,
}

impl ActiveFile {
    pub fn new(collection_id: &str, file_id: &str, file_name: &str) -> Self {
        Self {
            collection_id: Some(collection_id.to_string()),
            file_id: Some(file_id.to_string()),
            file_name: Some(file_name.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum EditorError {
    #[error("No collection is associated with the open file")]
    MissingCollection,

    #[error("The open file has no name")]
    MissingFileName,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Text of the open file, decoupled from the store until [`EditorBuffer::save`] is called.
#[derive(Debug, Clone, Default)]
pub struct EditorBuffer {
    active: ActiveFile,
    content: String,
}

impl EditorBuffer {
    /// Loads the active file. A file the store cannot produce opens as an empty buffer.
    #[instrument(skip(store, active), fields(file_id = ?active.file_id))]
    pub async fn open<S: ResourceStore + ?Sized>(store: &S, active: ActiveFile) -> Self {
        let content = match active.file_id.as_deref() {
            Some(file_id) => match store.get_file(file_id).await {
                Ok(Some(file)) => file.content,
                Ok(None) => {
                    debug!("File not found in store, starting empty");
                    String::new()
                }
                Err(e) => {
                    warn!(error = %e, "Failed to load file content, starting empty");
                    String::new()
                }
            },
            None => String::new(),
        };
        Self { active, content }
    }

    pub fn active(&self) -> &ActiveFile {
        &self.active
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
    }

    /// Appends text on a new line, as done when inserting other files' content.
    pub fn append(&mut self, text: &str) {
        self.content.push('\n');
        self.content.push_str(text);
    }

    /// Writes the buffer back; the store creates the file if it does not know it yet.
    #[instrument(skip(self, store), fields(file_id = ?self.active.file_id))]
    pub async fn save<S: ResourceStore + ?Sized>(&self, store: &S) -> Result<SaveOutcome, EditorError> {
        let collection_id = self.active.collection_id.as_deref().ok_or(EditorError::MissingCollection)?;
        let file_name = self.active.file_name.as_deref().ok_or(EditorError::MissingFileName)?;

        let payload = FilePayload::new(
            collection_id,
            self.active.file_id.clone(),
            file_name,
            self.content.clone(),
        );
        let outcome = store.save_file(&payload).await?;
        if outcome.success {
            debug!(bytes = self.content.len(), "File saved");
        } else {
            warn!("Store did not confirm the save");
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_starts_on_a_new_line() {
        let mut buffer = EditorBuffer::default();
        buffer.set_content("\\begin{document}");
        buffer.append("inserted");
        assert_eq!(buffer.content(), "\\begin{document}\ninserted");
    }
}
