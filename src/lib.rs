//! Rust toolkit for Croatian fiscalization: ZKI computation, enveloped
//! XML-DSIG signing and verification, and submission to the CIS web service.
//!
//! # Examples
//! ```rust,no_run
//! use fiskal_core::config::{Config, Environment};
//! use fiskal_core::sign::Signer;
//!
//! let config = Config::new(Environment::Demo, "certs/fina_ca.pem")?;
//! let signer = Signer::from_files("certs/company.cert.pem", None, None)?;
//! # let _ = (config, signer);
//! # Ok::<(), fiskal_core::Error>(())
//! ```
pub mod api;
pub mod codes;
pub mod config;
pub mod invoice;
pub mod sign;
pub mod soap;

use thiserror::Error;

/// Top-level error wrapper for core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Validation(#[from] invoice::ValidationError),
    #[error(transparent)]
    Document(#[from] invoice::DocumentError),
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Signing(#[from] sign::SigningError),
    #[error(transparent)]
    Signature(#[from] sign::SignatureError),
    #[error(transparent)]
    Transport(#[from] soap::TransportError),
    #[error(transparent)]
    Fault(#[from] codes::ResponseError),
    #[error(transparent)]
    Client(#[from] api::ClientError),
}
