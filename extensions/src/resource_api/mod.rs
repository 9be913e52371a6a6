//! [`ResourceStore`](folio_core::store::ResourceStore) over the HTTP resource endpoint.
//!
//! Every operation goes to one base URL and is selected with the `name` query parameter. Reads
//! are `GET` requests that carry their arguments as a URL-encoded JSON document in `json`; writes
//! are `POST` requests with a JSON body.

mod client;
mod error;
mod helpers;
mod shared;

pub use client::ResourceApiClient;
pub use error::ResourceApiError;
pub use shared::ResourceApiConfig;
