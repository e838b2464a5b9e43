//! Validation and payload assembly for a single submission.

use shared::{
    domain::Operation,
    protocol::{OperationParams, RequestPayload},
};
use thiserror::Error;

use crate::{
    encoding::{strip_data_uri_prefix, EncodingError, FileEncoder},
    form::{FileBlob, FormState},
};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please choose an image file to upload.")]
    MissingFile,
    #[error("Please enter an email address.")]
    MissingEmail,
    #[error("'{0}' is not a valid email address.")]
    InvalidEmail(String),
    #[error("Please enter a width to resize to.")]
    MissingWidth,
    #[error("Please enter a height to resize to.")]
    MissingHeight,
    #[error("The {field} must be a positive number, got '{value}'.")]
    InvalidDimension { field: &'static str, value: String },
}

impl ValidationError {
    /// Name of the form field the error belongs to.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::MissingFile => "file",
            ValidationError::MissingEmail | ValidationError::InvalidEmail(_) => "email",
            ValidationError::MissingWidth => "width",
            ValidationError::MissingHeight => "height",
            ValidationError::InvalidDimension { field, .. } => *field,
        }
    }
}

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

/// Checks the fields required for the selected operation and returns the file
/// to encode.
pub fn validate(state: &FormState) -> Result<&FileBlob, ValidationError> {
    let file = state.file.as_ref().ok_or(ValidationError::MissingFile)?;

    let email = state.email.trim();
    if email.is_empty() {
        return Err(ValidationError::MissingEmail);
    }
    if !looks_like_email(email) {
        return Err(ValidationError::InvalidEmail(email.to_string()));
    }

    if state.operation == Operation::Resize {
        check_dimension("width", &state.width, ValidationError::MissingWidth)?;
        check_dimension("height", &state.height, ValidationError::MissingHeight)?;
    }

    Ok(file)
}

/// Validates the form, encodes the file and assembles the request body.
///
/// The form itself is never modified.
pub async fn build_payload(
    state: &FormState,
    encoder: &dyn FileEncoder,
) -> Result<RequestPayload, BuildError> {
    let file = validate(state)?;
    let encoded = encoder.encode(file).await?;
    let body = strip_data_uri_prefix(&encoded);
    if body.is_empty() {
        return Err(EncodingError::EmptyFile {
            name: file.name().into_owned(),
        }
        .into());
    }

    let params = match state.operation {
        Operation::Resize => OperationParams::Resize {
            width: state.width.clone(),
            height: state.height.clone(),
        },
        Operation::Convert => OperationParams::Convert {
            to_type: state.to_type,
        },
        Operation::Compress => OperationParams::Compress,
        Operation::Analyze => OperationParams::Analyze,
    };

    Ok(RequestPayload {
        email: state.email.trim().to_string(),
        image_type: state.image_type,
        file: body.to_string(),
        params,
    })
}

fn check_dimension(
    field: &'static str,
    value: &str,
    missing: ValidationError,
) -> Result<(), ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(missing);
    }
    match trimmed.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() && parsed > 0.0 => Ok(()),
        _ => Err(ValidationError::InvalidDimension {
            field,
            value: value.to_string(),
        }),
    }
}

fn looks_like_email(value: &str) -> bool {
    let mut parts = value.split('@');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(local), Some(domain), None) => {
            !local.is_empty() && !domain.is_empty() && !value.contains(char::is_whitespace)
        }
        _ => false,
    }
}
