use std::time::Duration;

use medialog_core::types::Provider;
use tracing::debug;

use crate::MetadataError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

pub(crate) fn build_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .user_agent(concat!("medialog/", env!("CARGO_PKG_VERSION")))
        .build()
        .unwrap_or_default()
}

/// GET `url` with `params` and return the decoded JSON body.
pub(crate) async fn get_json(
    client: &reqwest::Client,
    provider: Provider,
    url: &str,
    params: &[(&str, String)],
) -> Result<serde_json::Value, MetadataError> {
    debug!(provider = %provider, url = %url, "catalog request");

    let resp = client
        .get(url)
        .query(params)
        .send()
        .await
        .map_err(|e| MetadataError::Network(e.to_string()))?;

    let status = resp.status();
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(MetadataError::NotFound);
    }

    if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
        return Err(MetadataError::Provider(format!("{provider} rate limit exceeded")));
    }

    if !status.is_success() {
        return Err(MetadataError::Provider(format!("{provider} returned {status}")));
    }

    resp.json()
        .await
        .map_err(|e| MetadataError::Provider(format!("parse JSON: {e}")))
}
