use poem_openapi::Object;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A resolved request location, as produced by an external geo-IP resolver.
/// All fields are optional: a resolver may only know the country, and an
/// unresolvable address yields an empty location.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Object)]
#[oai(rename = "Location", rename_all = "camelCase")]
pub struct Location {
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub state: Option<String>,
    pub state_code: Option<String>,
    pub city: Option<String>,
    pub zip_code: Option<String>,
}
