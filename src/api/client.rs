use std::time::Duration;

use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;

use crate::{error::Failure, prelude::*};

/// Build a default client.
pub fn try_new() -> Result<Client> {
    Ok(Client::builder().timeout(Duration::from_secs(10)).build()?)
}

/// Send the request and deserialize the successful response.
///
/// Transport errors, non-success statuses, and malformed payloads are all upstream failures.
pub async fn fetch_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T> {
    let response = request
        .send()
        .await
        .map_err(|error| Failure::UpstreamFailure(format!("failed to call: {error}")))?;
    info!(status = %response.status(), url = %response.url(), "received");
    response
        .error_for_status()
        .map_err(|error| Failure::UpstreamFailure(format!("request failed: {error}")))?
        .json::<T>()
        .await
        .map_err(|error| Failure::UpstreamFailure(format!("malformed response: {error}")).into())
}
