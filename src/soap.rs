//! SOAP transport boundary and the enveloped-signature hook.
use std::fs;

use libxml::tree::Document;
use thiserror::Error;
use tracing::debug;

use crate::config::{Config, ConfigError};
use crate::sign::{SignatureError, Signer, SigningError, Verifier};

pub(crate) const SOAPENV_NS: &str = "http://schemas.xmlsoap.org/soap/envelope/";

/// Wrap a serialized body element into a SOAP 1.1 envelope.
pub fn wrap_envelope(body: &str) -> String {
    format!(
        r#"<soapenv:Envelope xmlns:soapenv="{SOAPENV_NS}"><soapenv:Body>{body}</soapenv:Body></soapenv:Envelope>"#
    )
}

/// Transport-level failures, distinct from decoded service faults.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("service returned a fault (HTTP {status})")]
    Fault { status: u16, body: String },
}

/// The transport required by the protocol client: a single blocking
/// request/response invocation per operation. A service-level error surfaces
/// as [`TransportError::Fault`] carrying the raw fault payload.
pub trait Transport {
    fn invoke(&self, operation: &str, envelope: &str) -> Result<String, TransportError>;
}

/// HTTP transport for the CIS endpoint, trusting only the configured CA
/// bundle for TLS.
pub struct HttpTransport {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl HttpTransport {
    /// Build the transport from the client configuration.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the CA bundle cannot be read or parsed, or
    /// the HTTP client cannot be built.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let bundle_path = config.tls_ca_bundle();
        let bundle = fs::read(bundle_path).map_err(|source| ConfigError::Io {
            description: "TLS CA bundle",
            path: bundle_path.to_path_buf(),
            source,
        })?;
        let roots = reqwest::Certificate::from_pem_bundle(&bundle).map_err(|e| {
            ConfigError::InvalidMaterial {
                description: "TLS CA bundle",
                path: bundle_path.to_path_buf(),
                reason: e.to_string(),
            }
        })?;

        let mut builder = reqwest::blocking::Client::builder()
            .use_rustls_tls()
            .tls_built_in_root_certs(false);
        for root in roots {
            builder = builder.add_root_certificate(root);
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint().to_string(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl Transport for HttpTransport {
    fn invoke(&self, operation: &str, envelope: &str) -> Result<String, TransportError> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "text/xml; charset=utf-8")
            .header("SOAPAction", operation)
            .body(envelope.to_string())
            .send()?;

        let status = response.status();
        let body = response.text().unwrap_or_default();
        debug!(operation, status = status.as_u16(), "service responded");

        if status.is_success() {
            Ok(body)
        } else {
            Err(TransportError::Fault {
                status: status.as_u16(),
                body,
            })
        }
    }
}

/// Signs outbound envelopes and verifies inbound ones around every call whose
/// operation the supplied predicate selects. The predicate belongs to the
/// protocol client; Signer and Verifier know nothing about operations.
pub(crate) struct EnvelopedSignatureInterceptor<'a> {
    signer: &'a Signer,
    verifier: &'a Verifier,
    requires_signature: fn(&str) -> bool,
}

impl<'a> EnvelopedSignatureInterceptor<'a> {
    pub(crate) fn new(
        signer: &'a Signer,
        verifier: &'a Verifier,
        requires_signature: fn(&str) -> bool,
    ) -> Self {
        Self {
            signer,
            verifier,
            requires_signature,
        }
    }

    pub(crate) fn egress(&self, operation: &str, doc: &mut Document) -> Result<(), SigningError> {
        if (self.requires_signature)(operation) {
            self.signer.sign_envelope(doc)?;
        }
        Ok(())
    }

    pub(crate) fn ingress(&self, operation: &str, doc: &Document) -> Result<(), SignatureError> {
        if (self.requires_signature)(operation) {
            self.verifier.verify_envelope(doc)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_wraps_body_verbatim() {
        let envelope = wrap_envelope("<tns:EchoRequest>ping</tns:EchoRequest>");
        assert!(envelope.starts_with("<soapenv:Envelope"));
        assert!(envelope.contains("<soapenv:Body><tns:EchoRequest>ping</tns:EchoRequest></soapenv:Body>"));
    }
}
