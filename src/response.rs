//! Response Boundary
//!
//! Attaches transport metadata to models built from HTTP responses. Requests
//! are sent elsewhere; this module only reads a response that already
//! arrived.

use crate::model::{Model, ModelError, ModelType};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Status and headers of the response a model was built from
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMeta {
    pub status: u16,
    /// Header names are lower-case
    pub headers: BTreeMap<String, String>,
}

impl ResponseMeta {
    pub fn new<I, K, V>(status: u16, headers: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        Self {
            status,
            headers: headers
                .into_iter()
                .map(|(name, value)| (name.as_ref().to_ascii_lowercase(), value.into()))
                .collect(),
        }
    }

    /// Capture status and headers of a reqwest response
    ///
    /// Header values that are not valid UTF-8 are skipped.
    pub fn from_reqwest(response: &reqwest::Response) -> Self {
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| Some((name.as_str(), value.to_str().ok()?)));
        Self::new(response.status().as_u16(), headers)
    }

    /// Header value, case-insensitive
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Map the headers themselves as a model (`x-ms-request-id` -> `x_ms_request_id`)
    ///
    /// Dashes in header names become underscores before key normalization.
    pub fn headers_model(&self, ty: &Arc<ModelType>) -> Result<Model, ModelError> {
        let headers = self
            .headers
            .iter()
            .map(|(name, value)| {
                (
                    name.replace('-', "_"),
                    serde_json::Value::String(value.clone()),
                )
            })
            .collect();
        Model::new(ty, serde_json::Value::Object(headers))
    }
}

/// Map the JSON body of a single-resource response
pub async fn model_from_response(
    ty: &Arc<ModelType>,
    response: reqwest::Response,
) -> Result<Model, ModelError> {
    let meta = ResponseMeta::from_reqwest(&response);
    tracing::debug!("Mapping {} response as {}", meta.status, ty.name());

    let body: serde_json::Value = response.json().await?;
    Model::from_response(ty, body, meta)
}

/// Map the JSON body of a list response
///
/// Every model gets the response metadata. A `nextLink` in the body is not
/// followed.
pub async fn models_from_response(
    ty: &Arc<ModelType>,
    response: reqwest::Response,
) -> Result<Vec<Model>, ModelError> {
    let meta = ResponseMeta::from_reqwest(&response);
    let body: serde_json::Value = response.json().await?;

    if body.get("nextLink").is_some_and(|link| !link.is_null()) {
        tracing::debug!("{} list response has more pages; only the first is mapped", ty.name());
    }

    Ok(Model::collection(ty, body)?
        .into_iter()
        .map(|model| model.with_response(meta.clone()))
        .collect())
}
