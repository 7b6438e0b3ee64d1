//! Infrastructure layer - Engine implementations and adapters

pub mod audit;
pub mod keys;
pub mod logging;
pub mod store;

pub use audit::TracingAuditSink;
pub use keys::{
    mask_key, ExpiryPolicy, GenerateKeyParams, GeneratedKey, KeyCodec, KeyGenerationResult,
    KeyGenerator, KeyManager, KeyValidator, ValidatedKeyInfo, ValidationReason, ValidationResult,
};
pub use logging::init_logging;
pub use store::InMemoryCredentialStore;
