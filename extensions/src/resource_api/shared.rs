use std::time::Duration;

use url::Url;

use super::error::ResourceApiError;

const DEFAULT_RESOURCE_ENDPOINT: &str = "http://127.0.0.1:5000/api/resource";

/// Configuration for [`ResourceApiClient`](super::ResourceApiClient).
#[derive(Clone, Debug)]
pub struct ResourceApiConfig {
    /// The single endpoint all operations are sent to.
    pub(crate) base_url: Url,
    /// Timeout for HTTP requests. Defaults to 30 seconds.
    pub(crate) timeout: Duration,
}

impl ResourceApiConfig {
    pub fn new() -> Result<Self, ResourceApiError> {
        let base_url = Url::parse(DEFAULT_RESOURCE_ENDPOINT).map_err(|e| {
            ResourceApiError::InvalidConfiguration(format!("Failed to parse default endpoint: {e}"))
        })?;
        Ok(Self {
            base_url,
            timeout: Duration::from_secs(30),
        })
    }

    /// Points the client at another endpoint.
    pub fn base_url(mut self, url: &str) -> Result<Self, ResourceApiError> {
        let parsed = Url::parse(url)
            .map_err(|e| ResourceApiError::InvalidConfiguration(format!("Invalid endpoint '{url}': {e}")))?;
        if parsed.cannot_be_a_base() {
            return Err(ResourceApiError::InvalidConfiguration(format!(
                "Endpoint '{url}' is not a hierarchical URL"
            )));
        }
        self.base_url = parsed;
        Ok(self)
    }

    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.base_url
    }

    pub fn request_timeout(&self) -> Duration {
        self.timeout
    }

    /// URL for operation `op`, e.g. `…/api/resource?name=get_file`.
    pub(crate) fn op_url(&self, op: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut().append_pair("name", op);
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_local_endpoint() {
        let config = ResourceApiConfig::new().unwrap();
        assert_eq!(config.endpoint().as_str(), DEFAULT_RESOURCE_ENDPOINT);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
    }

    #[test]
    fn rejects_bad_endpoints() {
        let err = ResourceApiConfig::new().unwrap().base_url("not a url").unwrap_err();
        assert!(matches!(err, ResourceApiError::InvalidConfiguration(_)));

        let err = ResourceApiConfig::new().unwrap().base_url("mailto:someone@example.com").unwrap_err();
        assert!(matches!(err, ResourceApiError::InvalidConfiguration(_)));
    }

    #[test]
    fn op_url_carries_the_operation_name() {
        let config = ResourceApiConfig::new()
            .unwrap()
            .base_url("http://localhost:8080/api/resource")
            .unwrap();
        assert_eq!(
            config.op_url("get_file").as_str(),
            "http://localhost:8080/api/resource?name=get_file"
        );
    }
}
