//! The execute form as posted by the page.

use serde::Deserialize;

use partiql_bridge::QueryRequest;

/// Fields posted to the execute path. Missing fields read as empty.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExecuteForm {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub env: String,
}

impl ExecuteForm {
    pub fn into_request(self) -> QueryRequest {
        QueryRequest::new(self.query, self.env)
    }
}
