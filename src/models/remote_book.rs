//! Remote catalog search result model

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Book record returned by the external catalog lookup
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RemoteBook {
    pub title: String,
    pub authors: String,
    pub isbn: String,
    #[serde(default)]
    pub publisher: Option<String>,
    #[serde(default)]
    pub published_date: Option<String>,
}
