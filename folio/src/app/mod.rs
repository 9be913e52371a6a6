use std::time::Duration;

use anyhow::{Context, Result};
use folio_core::editor::{ActiveFile, EditorBuffer};
use folio_core::store::ResourceStore;
use folio_core::sync::SyncController;
use folio_core::tree::{file_location, CollectionNode};
use folio_extensions::resource_api::{ResourceApiClient, ResourceApiConfig};
use tracing::debug;

mod render;
pub use render::render_tree;

/// The application: one controller bound to a store.
pub struct Folio<S> {
    controller: SyncController<S>,
}

impl Folio<ResourceApiClient> {
    /// Connects to the resource API at `endpoint`, or at the default local endpoint.
    pub fn connect(endpoint: Option<&str>, timeout: Duration) -> Result<Self> {
        let mut config = ResourceApiConfig::new()?;
        if let Some(endpoint) = endpoint {
            config = config
                .base_url(endpoint)
                .with_context(|| format!("Invalid endpoint '{endpoint}'"))?;
        }
        let config = config.timeout(timeout);
        debug!(endpoint = %config.endpoint(), ?timeout, "Connecting to resource API");
        let client = ResourceApiClient::new_with_options(config, None)?;
        Ok(Self::new(client))
    }
}

impl<S: ResourceStore> Folio<S> {
    pub fn new(store: S) -> Self {
        Self {
            controller: SyncController::new(store),
        }
    }

    pub fn controller(&self) -> &SyncController<S> {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut SyncController<S> {
        &mut self.controller
    }

    pub async fn load(&mut self) -> &[CollectionNode] {
        self.controller.load_structure().await
    }

    /// Opens a file of the loaded forest in an editor buffer.
    pub async fn open_file(&self, file_id: &str) -> Result<EditorBuffer> {
        let (owner, file) = file_location(self.controller.forest(), file_id)
            .with_context(|| format!("No file with id '{file_id}'"))?;
        let active = ActiveFile::new(&owner.id, &file.id, &file.name);
        Ok(EditorBuffer::open(self.controller.store(), active).await)
    }
}
