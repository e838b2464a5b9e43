//! Client-side request construction and submission for the image processing
//! service.

pub mod builder;
pub mod config;
pub mod encoding;
pub mod form;
pub mod session;
pub mod transport;

pub use builder::{build_payload, validate, BuildError, ValidationError};
pub use config::{load_settings, ClientSettings, ConfigError};
pub use encoding::{strip_data_uri_prefix, Base64FileEncoder, EncodingError, FileEncoder};
pub use form::{reduce, FileBlob, FormEvent, FormState};
pub use session::{FormSession, SubmitOutcome};
pub use transport::{
    HttpSubmissionTransport, SubmissionError, SubmissionTransport, GENERIC_FAILURE_NOTIFICATION,
};

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
