//! Key lifecycle engine
//!
//! This module provides key encoding, generation under collision
//! pressure, the validation pipeline and the manager facade that ties
//! them to a credential store and audit sink.

mod codec;
mod generator;
mod manager;
mod validator;

pub use codec::{mask_key, GeneratedKey, KeyCodec};
pub use generator::{ExpiryPolicy, GenerateKeyParams, KeyGenerationResult, KeyGenerator};
pub use manager::KeyManager;
pub use validator::{KeyValidator, ValidatedKeyInfo, ValidationReason, ValidationResult};

use std::future::Future;
use std::time::Duration;

use crate::domain::DomainError;

/// Bound a store call by the configured timeout.
///
/// A timed-out call is indistinguishable from an unavailable store;
/// callers map it to their fail-closed path.
pub(crate) async fn bounded<T, F>(timeout: Duration, fut: F) -> Result<T, DomainError>
where
    F: Future<Output = Result<T, DomainError>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(DomainError::timeout("credential store call timed out")),
    }
}
