use serde::{Deserialize, Serialize};

/// Body of `POST /generate` and `POST /refine`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
    pub session_id: String,
    pub is_refinement: bool,
}

impl GenerateRequest {
    /// Endpoint path this request is posted to.
    pub fn endpoint(&self) -> &'static str {
        if self.is_refinement {
            "/refine"
        } else {
            "/generate"
        }
    }
}

/// Response of a generation or refinement request.
///
/// Produced by the backend and consumed once by the controller; every field
/// is optional on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationResult {
    pub success: bool,
    pub model_glb: String,
    pub model_obj: String,
    pub model_params: ModelParams,
    pub interpretation: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParams {
    pub objects: Vec<ModelObject>,
}

/// One primitive the backend composed into the model.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelObject {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(flatten)]
    pub attributes: serde_json::Map<String, serde_json::Value>,
}

/// `GET /health` response. Only presence matters to the front end.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Structured error body some backend failures carry.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
}
