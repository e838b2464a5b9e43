//! Form state container and the pure reducer that drives it.

use std::{borrow::Cow, path::PathBuf};

use shared::domain::{ImageType, Operation};

/// The image selected for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileBlob {
    Path(PathBuf),
    Memory { name: String, bytes: Vec<u8> },
}

impl FileBlob {
    pub fn name(&self) -> Cow<'_, str> {
        match self {
            FileBlob::Path(path) => path.to_string_lossy(),
            FileBlob::Memory { name, .. } => Cow::Borrowed(name),
        }
    }

    pub async fn read_bytes(&self) -> std::io::Result<Vec<u8>> {
        match self {
            FileBlob::Path(path) => tokio::fs::read(path).await,
            FileBlob::Memory { bytes, .. } => Ok(bytes.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormState {
    pub file: Option<FileBlob>,
    pub operation: Operation,
    pub width: String,
    pub height: String,
    pub to_type: ImageType,
    pub image_type: ImageType,
    pub email: String,
    pub loading: bool,
    pub notification: Option<String>,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            file: None,
            operation: Operation::Resize,
            width: String::new(),
            height: String::new(),
            to_type: ImageType::Png,
            image_type: ImageType::Jpeg,
            email: String::new(),
            loading: false,
            notification: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    FileSelected(Option<FileBlob>),
    OperationChanged(Operation),
    WidthChanged(String),
    HeightChanged(String),
    ToTypeChanged(ImageType),
    ImageTypeChanged(ImageType),
    EmailChanged(String),
    NotificationDismissed,
    /// Local validation blocked the submission; nothing was sent.
    ValidationFailed {
        message: String,
    },
    SubmitStarted,
    SubmitSucceeded {
        message: String,
    },
    SubmitFailed {
        notification: String,
    },
}

/// Applies one event to the form.
///
/// Field edits are ignored while a submission is in flight. Values for fields
/// the current operation does not use are kept, so switching back restores them.
pub fn reduce(state: FormState, event: FormEvent) -> FormState {
    if state.loading && is_field_edit(&event) {
        return state;
    }

    match event {
        FormEvent::FileSelected(file) => FormState { file, ..state },
        FormEvent::OperationChanged(operation) => FormState { operation, ..state },
        FormEvent::WidthChanged(width) => FormState { width, ..state },
        FormEvent::HeightChanged(height) => FormState { height, ..state },
        FormEvent::ToTypeChanged(to_type) => FormState { to_type, ..state },
        FormEvent::ImageTypeChanged(image_type) => FormState { image_type, ..state },
        FormEvent::EmailChanged(email) => FormState { email, ..state },
        FormEvent::NotificationDismissed => FormState {
            notification: None,
            ..state
        },
        FormEvent::ValidationFailed { message } => FormState {
            notification: Some(message),
            ..state
        },
        FormEvent::SubmitStarted => FormState {
            loading: true,
            notification: None,
            ..state
        },
        FormEvent::SubmitSucceeded { message } => FormState {
            notification: Some(message),
            ..FormState::default()
        },
        FormEvent::SubmitFailed { notification } => FormState {
            loading: false,
            notification: Some(notification),
            ..state
        },
    }
}

fn is_field_edit(event: &FormEvent) -> bool {
    matches!(
        event,
        FormEvent::FileSelected(_)
            | FormEvent::OperationChanged(_)
            | FormEvent::WidthChanged(_)
            | FormEvent::HeightChanged(_)
            | FormEvent::ToTypeChanged(_)
            | FormEvent::ImageTypeChanged(_)
            | FormEvent::EmailChanged(_)
    )
}
