use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, instrument, trace};

use folio_core::codec::FlatRecord;
use folio_core::ids::random_id;
use folio_core::store::{FilePayload, NewCollection, ResourceStore, SaveOutcome, StoreError, StoredFile};

use super::error::{map_response_error, ResourceApiError};
use super::helpers::{
    CollectionIdRequest, CollectionsData, DataEnvelope, FileIdRequest, FileWriteRequest, FilesData,
    RenameCollectionRequest, SaveStructureRequest,
};
use super::shared::ResourceApiConfig;

/// HTTP client for the resource endpoint.
#[derive(Clone, Debug)]
pub struct ResourceApiClient {
    config: ResourceApiConfig,
    http_client: Client,
}

impl ResourceApiClient {
    /// Creates a client for the default local endpoint.
    pub fn new() -> Result<Self, ResourceApiError> {
        Self::new_with_options(ResourceApiConfig::new()?, None)
    }

    /// Creates a client from `config`, building an HTTP client unless one is supplied.
    #[instrument(name = "resource_api_client_new", skip(config, client_override))]
    pub fn new_with_options(config: ResourceApiConfig, client_override: Option<Client>) -> Result<Self, ResourceApiError> {
        let http_client = match client_override {
            Some(client) => {
                debug!("Using provided HTTP client.");
                client
            }
            None => {
                debug!(timeout = ?config.timeout, "Building default HTTP client.");
                Client::builder()
                    .timeout(config.timeout)
                    .build()
                    .map_err(|e| ResourceApiError::InvalidConfiguration(format!("Failed to build HTTP client: {e}")))?
            }
        };
        debug!(endpoint = %config.base_url, "Resource API client initialized.");
        Ok(Self { config, http_client })
    }

    pub fn config(&self) -> &ResourceApiConfig {
        &self.config
    }

    /// `GET endpoint?name=op[&json=...]`, decoding the response body as `T`.
    async fn get<Q, T>(&self, op: &str, query: Option<&Q>) -> Result<T, ResourceApiError>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let mut url = self.config.op_url(op);
        if let Some(query) = query {
            let json = serde_json::to_string(query).map_err(ResourceApiError::RequestSerialization)?;
            url.query_pairs_mut().append_pair("json", &json);
        }
        trace!(%url, "GET");

        let response = self.http_client.get(url).send().await?;
        self.decode(op, response).await
    }

    /// `POST endpoint?name=op` with a JSON body, decoding the response body as `T`.
    async fn post<B, T>(&self, op: &str, body: &B) -> Result<T, ResourceApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.config.op_url(op);
        let body = serde_json::to_string(body).map_err(ResourceApiError::RequestSerialization)?;
        trace!(%url, %body, "POST");

        let response = self
            .http_client
            .post(url)
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await?;
        self.decode(op, response).await
    }

    /// `POST` whose response body is not inspected.
    async fn post_ignoring_body<B>(&self, op: &str, body: &B) -> Result<(), ResourceApiError>
    where
        B: Serialize + ?Sized,
    {
        self.post::<B, serde::de::IgnoredAny>(op, body).await.map(|_| ())
    }

    async fn decode<T: DeserializeOwned>(&self, op: &str, response: reqwest::Response) -> Result<T, ResourceApiError> {
        let status = response.status();
        if !status.is_success() {
            error!(%status, op, "Resource API returned error status");
            return Err(map_response_error(response).await);
        }

        let raw_body = response.text().await?;
        trace!(op, body = %raw_body, "Resource API response");
        // Some write endpoints answer with an empty body.
        let raw_body = if raw_body.trim().is_empty() { "{}" } else { raw_body.as_str() };
        serde_json::from_str(raw_body).map_err(|source| {
            error!(op, error = %source, "Failed to parse response");
            ResourceApiError::ResponseParsing {
                context: format!("parsing '{op}' response"),
                source,
            }
        })
    }

    async fn write_file(&self, op: &str, file_id: &str, file: &FilePayload) -> Result<SaveOutcome, ResourceApiError> {
        let body = FileWriteRequest {
            collection_id: &file.collection_id,
            file_id,
            file_name: &file.file_name,
            content: &file.content,
        };
        self.post(op, &body).await
    }
}

#[async_trait]
impl ResourceStore for ResourceApiClient {
    #[instrument(skip(self))]
    async fn get_collection_structure(&self) -> Result<Vec<FlatRecord>, StoreError> {
        let envelope: DataEnvelope<CollectionsData> = self.get::<(), _>("get_collection_structure", None).await?;
        let records = envelope.data.unwrap_or_default().editor_collections;
        debug!(records = records.len(), "Fetched collection structure");
        Ok(records)
    }

    #[instrument(skip(self, records), fields(records = records.len()))]
    async fn save_collection_structure(&self, records: &[FlatRecord]) -> Result<(), StoreError> {
        self.post_ignoring_body("save_collection_structure", &SaveStructureRequest { collections: records })
            .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn get_file(&self, file_id: &str) -> Result<Option<StoredFile>, StoreError> {
        let envelope: DataEnvelope<FilesData> = self.get("get_file", Some(&FileIdRequest { file_id })).await?;
        Ok(envelope.data.unwrap_or_default().editor_files.into_iter().next())
    }

    #[instrument(skip(self, file), fields(file_id = ?file.file_id, collection_id = %file.collection_id))]
    async fn save_file(&self, file: &FilePayload) -> Result<SaveOutcome, StoreError> {
        let (op, file_id) = match file.file_id.as_deref() {
            Some(id) => {
                let exists = self.get_file(id).await?.is_some();
                (if exists { "update_file" } else { "create_file" }, id.to_string())
            }
            None => ("create_file", random_id()),
        };
        debug!(op, %file_id, "Saving file");
        Ok(self.write_file(op, &file_id, file).await?)
    }

    #[instrument(skip(self, file), fields(file_id = ?file.file_id, collection_id = %file.collection_id))]
    async fn create_file(&self, file: &FilePayload) -> Result<SaveOutcome, StoreError> {
        let file_id = file.file_id.clone().unwrap_or_else(random_id);
        Ok(self.write_file("create_file", &file_id, file).await?)
    }

    #[instrument(skip(self))]
    async fn delete_file(&self, file_id: &str) -> Result<(), StoreError> {
        self.post_ignoring_body("delete_editor_file", &FileIdRequest { file_id }).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn rename_collection(&self, collection_id: &str, new_name: &str) -> Result<(), StoreError> {
        let body = RenameCollectionRequest {
            collection_id,
            collection_name: new_name,
        };
        self.post_ignoring_body("rename_collection", &body).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_collection(&self, collection_id: &str) -> Result<(), StoreError> {
        self.post_ignoring_body("delete_editor_collection", &CollectionIdRequest { collection_id })
            .await?;
        Ok(())
    }

    #[instrument(skip(self, collection), fields(collection_id = %collection.collection_id))]
    async fn create_collection(&self, collection: &NewCollection) -> Result<(), StoreError> {
        self.post_ignoring_body("create_collection", collection).await?;
        Ok(())
    }
}
