//! Protocol client for the CIS fiscalization service.
use chrono::{Local, NaiveDateTime};
use libxml::parser::Parser;
use libxml::tree::Document;
use libxml::xpath;
use thiserror::Error;
use tracing::{debug, info};
use uuid::Uuid;

use crate::codes::ResponseError;
use crate::config::{Config, ConfigError};
use crate::invoice::xml::{
    self, EchoRequest, PrateciDokumentiZahtjev, PromijeniNacPlacZahtjev, ProvjeraZahtjev,
    RacunPDZahtjev, RacunZahtjev, Zaglavlje,
};
use crate::invoice::{Invoice, InvoicePaymentMethodChange, InvoiceWithDoc, SupportingDocument};
use crate::sign::{SignatureError, Signer, SigningError, Verifier};
use crate::soap::{self, EnvelopedSignatureInterceptor, HttpTransport, Transport, TransportError};

const ECHO_OPERATION: &str = "echo";

/// Errors surfaced by client operations.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Document(#[from] crate::invoice::DocumentError),
    #[error(transparent)]
    Signing(#[from] SigningError),
    #[error(transparent)]
    Signature(#[from] SignatureError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Fault(#[from] ResponseError),
    #[error("XML serialization error: {0}")]
    Xml(#[from] quick_xml::se::SeError),
    #[error("invalid response from service: {0}")]
    InvalidResponse(String),
}

fn requires_signature(operation: &str) -> bool {
    operation != ECHO_OPERATION
}

/// Client for the fiscalization web service.
///
/// Every call is a single blocking request/response exchange: the request
/// body is serialized, the envelope signed, the response envelope verified,
/// and service faults are decoded into [`ResponseError`]. Retry policy
/// belongs to the caller.
///
/// # Examples
/// ```rust,no_run
/// use fiskal_core::api::FiskalClient;
/// use fiskal_core::config::{Config, Environment};
/// use fiskal_core::sign::{Signer, Verifier};
///
/// let config = Config::new(Environment::Demo, "certs/fina_ca.pem")?;
/// let signer = Signer::from_files("certs/company.pem", None, None)?;
/// let verifier = Verifier::from_files("certs/service.pem", &[])?;
/// let client = FiskalClient::new(&config, signer, verifier)?;
/// # let _ = client;
/// # Ok::<(), fiskal_core::Error>(())
/// ```
pub struct FiskalClient<T = HttpTransport> {
    transport: T,
    signer: Signer,
    verifier: Verifier,
}

impl FiskalClient<HttpTransport> {
    /// Create a client over the HTTP transport described by `config`.
    ///
    /// # Errors
    /// Returns [`ConfigError`] if the transport cannot be built.
    pub fn new(config: &Config, signer: Signer, verifier: Verifier) -> Result<Self, ConfigError> {
        Ok(Self {
            transport: HttpTransport::new(config)?,
            signer,
            verifier,
        })
    }
}

impl<T: Transport> FiskalClient<T> {
    /// Create a client over a custom transport.
    pub fn with_transport(transport: T, signer: Signer, verifier: Verifier) -> Self {
        Self {
            transport,
            signer,
            verifier,
        }
    }

    pub fn signer(&self) -> &Signer {
        &self.signer
    }

    /// Whether an operation's envelopes are signed and verified. Only the
    /// echo health check goes out unsigned.
    pub fn requires_signature(&self, operation: &str) -> bool {
        requires_signature(operation)
    }

    /// Create a request header. A fresh random message id and the current
    /// time are used unless supplied.
    pub fn create_request_header(
        &self,
        message_id: Option<Uuid>,
        at: Option<NaiveDateTime>,
    ) -> Zaglavlje {
        Zaglavlje::new(
            message_id.unwrap_or_else(Uuid::new_v4),
            at.unwrap_or_else(|| Local::now().naive_local()),
        )
    }

    /// Check service availability through the unsigned echo operation.
    ///
    /// # Errors
    /// Returns [`ClientError::InvalidResponse`] when the echoed message does
    /// not match.
    pub fn test_service(&self, message: &str) -> Result<(), ClientError> {
        let body = xml::to_xml(&EchoRequest::new(message))?;
        let doc = self.call(ECHO_OPERATION, &body)?;
        let echoed = response_text(&doc, "EchoResponse")
            .ok_or_else(|| ClientError::InvalidResponse("no echo response".into()))?;
        if echoed != message {
            return Err(ClientError::InvalidResponse(format!(
                "echo returned '{echoed}', expected '{message}'"
            )));
        }
        Ok(())
    }

    /// Submit an invoice, returning the assigned JIR.
    ///
    /// # Errors
    /// Returns [`ClientError::Fault`] with the decoded error list on a
    /// service-level fault.
    pub fn submit_invoice(&self, invoice: &Invoice) -> Result<String, ClientError> {
        let racun = invoice.to_wire_object(&self.signer)?;
        let request = RacunZahtjev::new(self.create_request_header(None, None), racun);
        let doc = self.call("racuni", &xml::to_xml(&request)?)?;
        self.extract_jir(&doc)
    }

    /// Submit an invoice referencing a supporting document, returning the
    /// assigned JIR.
    ///
    /// # Errors
    /// As [`FiskalClient::submit_invoice`].
    pub fn submit_invoice_with_doc(&self, invoice: &InvoiceWithDoc) -> Result<String, ClientError> {
        let racun = invoice.to_wire_object(&self.signer)?;
        let request = RacunPDZahtjev::new(self.create_request_header(None, None), racun);
        let doc = self.call("racuniPD", &xml::to_xml(&request)?)?;
        self.extract_jir(&doc)
    }

    /// Report a payment-method change for a registered invoice.
    ///
    /// # Errors
    /// As [`FiskalClient::submit_invoice`].
    pub fn change_payment_method(
        &self,
        invoice: &InvoicePaymentMethodChange,
    ) -> Result<(), ClientError> {
        let racun = invoice.to_wire_object()?;
        let request = PromijeniNacPlacZahtjev::new(self.create_request_header(None, None), racun);
        self.call("promijeniNacPlac", &xml::to_xml(&request)?)?;
        Ok(())
    }

    /// Submit a supporting document, returning the assigned JIR.
    ///
    /// # Errors
    /// As [`FiskalClient::submit_invoice`].
    pub fn submit_supporting_document(
        &self,
        document: &SupportingDocument,
    ) -> Result<String, ClientError> {
        let body = document.to_wire_object(&self.signer)?;
        let request = PrateciDokumentiZahtjev::new(self.create_request_header(None, None), body);
        let doc = self.call("prateciDokumenti", &xml::to_xml(&request)?)?;
        self.extract_jir(&doc)
    }

    /// Check an invoice without registering it. The operation exists only on
    /// the demo environment; the production service faults on it.
    ///
    /// # Errors
    /// As [`FiskalClient::submit_invoice`].
    pub fn check_invoice(&self, invoice: &Invoice) -> Result<(), ClientError> {
        let racun = invoice.to_wire_object(&self.signer)?;
        let request = ProvjeraZahtjev::new(self.create_request_header(None, None), racun);
        self.call("provjera", &xml::to_xml(&request)?)?;
        Ok(())
    }

    // One request/response round trip: wrap, sign, invoke, decode faults,
    // verify the response envelope.
    fn call(&self, operation: &str, body: &str) -> Result<Document, ClientError> {
        let interceptor =
            EnvelopedSignatureInterceptor::new(&self.signer, &self.verifier, requires_signature);

        let envelope = soap::wrap_envelope(body);
        let mut request_doc = Parser::default()
            .parse_string(&envelope)
            .map_err(|e| SigningError::Xml(format!("request does not parse: {e:?}")))?;
        interceptor.egress(operation, &mut request_doc)?;

        info!(operation, "invoking fiscalization service");
        let response = self
            .transport
            .invoke(operation, &request_doc.to_string())
            .map_err(|err| match err {
                TransportError::Fault { status, body } => {
                    debug!(operation, status, "decoding service fault");
                    ClientError::Fault(ResponseError::from_fault_payload(&body))
                }
                other => ClientError::Transport(other),
            })?;

        let response_doc = Parser::default()
            .parse_string(&response)
            .map_err(|e| ClientError::InvalidResponse(format!("response does not parse: {e:?}")))?;
        interceptor.ingress(operation, &response_doc)?;
        Ok(response_doc)
    }

    fn extract_jir(&self, doc: &Document) -> Result<String, ClientError> {
        response_text(doc, "Jir")
            .ok_or_else(|| ClientError::InvalidResponse("response carries no JIR".into()))
    }
}

fn response_text(doc: &Document, name: &str) -> Option<String> {
    let ctx = xpath::Context::new(doc).ok()?;
    let nodes = ctx
        .evaluate(&format!("//*[local-name()='{name}']"))
        .ok()?
        .get_nodes_as_vec();
    let node = nodes.first()?;
    let text = node.get_content().trim().to_string();
    if text.is_empty() {
        return None;
    }
    Some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_echo_skips_signing() {
        assert!(!requires_signature("echo"));
        assert!(requires_signature("racuni"));
        assert!(requires_signature("racuniPD"));
        assert!(requires_signature("promijeniNacPlac"));
        assert!(requires_signature("prateciDokumenti"));
        assert!(requires_signature("provjera"));
    }

    #[test]
    fn response_text_reads_first_match() {
        let doc = Parser::default()
            .parse_string(
                r#"<e:Envelope xmlns:e="http://schemas.xmlsoap.org/soap/envelope/"><e:Body><o:RacunOdgovor xmlns:o="http://www.apis-it.hr/fin/2012/types/f73"><o:Jir>abc-123</o:Jir></o:RacunOdgovor></e:Body></e:Envelope>"#,
            )
            .expect("parse");
        assert_eq!(response_text(&doc, "Jir").as_deref(), Some("abc-123"));
        assert!(response_text(&doc, "Greska").is_none());
    }
}
