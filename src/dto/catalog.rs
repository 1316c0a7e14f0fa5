use serde::Serialize;
use utoipa::ToSchema;

use crate::state::{Catalog, FALLBACK_LANGUAGE};

/// Languages a client may request in its `INIT` message.
#[derive(Debug, Serialize, ToSchema)]
pub struct LanguagesResponse {
    /// Language used when the requested one is unknown.
    pub default: String,
    /// Every language key in the catalog, sorted.
    pub languages: Vec<String>,
}

impl From<&Catalog> for LanguagesResponse {
    fn from(catalog: &Catalog) -> Self {
        Self {
            default: FALLBACK_LANGUAGE.to_string(),
            languages: catalog.languages(),
        }
    }
}
