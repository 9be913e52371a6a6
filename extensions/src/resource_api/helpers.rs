// Wire envelopes of the resource endpoint.

use serde::{Deserialize, Serialize};

use folio_core::codec::FlatRecord;
use folio_core::store::StoredFile;

/// Successful read responses wrap their payload in `data`.
#[derive(Deserialize, Debug)]
pub(crate) struct DataEnvelope<T> {
    #[serde(default)]
    pub data: Option<T>,
}

#[derive(Deserialize, Debug, Default)]
pub(crate) struct CollectionsData {
    #[serde(default)]
    pub editor_collections: Vec<FlatRecord>,
}

#[derive(Deserialize, Debug, Default)]
pub(crate) struct FilesData {
    #[serde(default)]
    pub editor_files: Vec<StoredFile>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct ApiErrorResponse {
    #[serde(default)]
    pub errors: Vec<ApiErrorMessage>,
}

#[derive(Deserialize, Debug)]
pub(crate) struct ApiErrorMessage {
    pub message: String,
}

#[derive(Serialize, Debug)]
pub(crate) struct SaveStructureRequest<'a> {
    pub collections: &'a [FlatRecord],
}

#[derive(Serialize, Debug)]
pub(crate) struct FileIdRequest<'a> {
    pub file_id: &'a str,
}

#[derive(Serialize, Debug)]
pub(crate) struct CollectionIdRequest<'a> {
    pub collection_id: &'a str,
}

#[derive(Serialize, Debug)]
pub(crate) struct RenameCollectionRequest<'a> {
    pub collection_id: &'a str,
    pub collection_name: &'a str,
}

/// Body of `create_file` and `update_file`. Unlike the store's payload the id is always present.
#[derive(Serialize, Debug)]
pub(crate) struct FileWriteRequest<'a> {
    pub collection_id: &'a str,
    pub file_id: &'a str,
    pub file_name: &'a str,
    pub content: &'a str,
}
