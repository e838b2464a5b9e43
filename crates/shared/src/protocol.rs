use serde::{Deserialize, Serialize};

use crate::domain::{ImageType, Operation};

/// Request body posted to the processing service.
///
/// The operation name and its operation-specific fields travel together in
/// [`OperationParams`], so a payload can never carry fields that belong to a
/// different operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestPayload {
    pub email: String,
    pub image_type: ImageType,
    /// Base64 text without any `data:<mime>;base64,` prefix.
    pub file: String,
    #[serde(flatten)]
    pub params: OperationParams,
}

impl RequestPayload {
    pub fn operation(&self) -> Operation {
        self.params.operation()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum OperationParams {
    /// Dimensions are forwarded exactly as entered; the service parses them.
    Resize {
        width: String,
        height: String,
    },
    Compress,
    Convert {
        #[serde(rename = "toType")]
        to_type: ImageType,
    },
    Analyze,
}

impl OperationParams {
    pub fn operation(&self) -> Operation {
        match self {
            OperationParams::Resize { .. } => Operation::Resize,
            OperationParams::Compress => Operation::Compress,
            OperationParams::Convert { .. } => Operation::Convert,
            OperationParams::Analyze => Operation::Analyze,
        }
    }
}

/// Success body. Only `message` is consumed; anything else is ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessingResponse {
    pub message: String,
}
