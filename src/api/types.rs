//! API request and response types

use crate::graph::flows;
use serde::{Deserialize, Serialize};

fn default_flow() -> String {
    flows::ACOLHIMENTO.to_string()
}

/// Request to mount a conversation
#[derive(Debug, Deserialize)]
pub struct CreateConversationRequest {
    #[serde(default = "default_flow")]
    pub flow: String,
}

/// Request to pick an option, 1-based
#[derive(Debug, Deserialize)]
pub struct ChoiceRequest {
    pub index: usize,
}

/// Summary of an available flow
#[derive(Debug, Serialize)]
pub struct FlowInfo {
    pub name: String,
    pub start: String,
    pub node_count: usize,
}

/// Response with the available flows
#[derive(Debug, Serialize)]
pub struct FlowsResponse {
    pub flows: Vec<FlowInfo>,
}

/// Response for lifecycle actions
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
