//! One form instance and its submission cycle.

use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::{
    builder::{build_payload, validate, BuildError, ValidationError},
    encoding::{Base64FileEncoder, FileEncoder},
    form::{reduce, FormEvent, FormState},
    transport::{SubmissionTransport, GENERIC_FAILURE_NOTIFICATION},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The service accepted the request; the form was reset.
    Submitted { message: String },
    /// Encoding or submission failed; the form kept its values.
    Failed,
    /// Local validation failed; nothing was sent.
    Rejected(ValidationError),
    /// A submission is already in flight; nothing was sent.
    AlreadyInFlight,
}

pub struct FormSession {
    state: FormState,
    encoder: Arc<dyn FileEncoder>,
    transport: Arc<dyn SubmissionTransport>,
}

impl FormSession {
    pub fn new(transport: Arc<dyn SubmissionTransport>) -> Self {
        Self::with_encoder(transport, Arc::new(Base64FileEncoder))
    }

    pub fn with_encoder(
        transport: Arc<dyn SubmissionTransport>,
        encoder: Arc<dyn FileEncoder>,
    ) -> Self {
        Self {
            state: FormState::default(),
            encoder,
            transport,
        }
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn dispatch(&mut self, event: FormEvent) {
        let state = std::mem::take(&mut self.state);
        self.state = reduce(state, event);
    }

    /// Runs one submission cycle: validate, encode, send, then fold the outcome
    /// back into the form. `loading` is false again when this returns, and also
    /// if the future is dropped part way through.
    pub async fn submit(&mut self) -> SubmitOutcome {
        if self.state.loading {
            warn!("submission already in flight; ignoring submit");
            return SubmitOutcome::AlreadyInFlight;
        }

        if let Some(err) = validate(&self.state).err() {
            debug!(field = err.field(), error = %err, "form rejected before submission");
            self.dispatch(FormEvent::ValidationFailed {
                message: err.to_string(),
            });
            return SubmitOutcome::Rejected(err);
        }

        let encoder = Arc::clone(&self.encoder);
        let transport = Arc::clone(&self.transport);
        let mut in_flight = InFlight::begin(&mut self.state);

        let built = build_payload(in_flight.state(), encoder.as_ref()).await;
        let payload = match built {
            Ok(payload) => payload,
            Err(BuildError::Encoding(err)) => {
                error!(error = %err, "failed to encode image file");
                in_flight.finish(FormEvent::SubmitFailed {
                    notification: GENERIC_FAILURE_NOTIFICATION.to_string(),
                });
                return SubmitOutcome::Failed;
            }
            Err(BuildError::Validation(err)) => {
                in_flight.finish(FormEvent::ValidationFailed {
                    message: err.to_string(),
                });
                return SubmitOutcome::Rejected(err);
            }
        };

        info!(
            operation = %payload.operation(),
            image_type = %payload.image_type,
            "submitting image processing request"
        );
        match transport.submit(&payload).await {
            Ok(response) => {
                info!("image processing request accepted");
                in_flight.finish(FormEvent::SubmitSucceeded {
                    message: response.message.clone(),
                });
                SubmitOutcome::Submitted {
                    message: response.message,
                }
            }
            Err(err) => {
                error!(error = %err, "Error uploading the image");
                in_flight.finish(FormEvent::SubmitFailed {
                    notification: err.user_message().to_string(),
                });
                SubmitOutcome::Failed
            }
        }
    }
}

/// Holds the form in its submitting state and clears `loading` on drop.
struct InFlight<'a> {
    state: &'a mut FormState,
}

impl<'a> InFlight<'a> {
    fn begin(state: &'a mut FormState) -> Self {
        *state = reduce(std::mem::take(state), FormEvent::SubmitStarted);
        Self { state }
    }

    fn state(&self) -> &FormState {
        &*self.state
    }

    fn finish(&mut self, event: FormEvent) {
        *self.state = reduce(std::mem::take(self.state), event);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.state.loading = false;
    }
}
