use serde::{Deserialize, Serialize};

use crate::domain::CommandId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreCommandRequest {
    #[serde(default)]
    pub command: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StoreStatus {
    Success,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreCommandResponse {
    pub status: StoreStatus,
    pub command: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommandRecord {
    pub id: CommandId,
    pub command: String,
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
