//! Request signing and response verification.
//!
//! Outbound envelopes receive an enveloped XML-DSIG signature (exclusive
//! C14N, SHA-1 digest, RSA-SHA1 signature) scoped to the application-data
//! element inside the SOAP body. Inbound envelopes are verified against the
//! service certificate or a chain to a trusted CA. The same private key also
//! signs raw ZKI payloads.
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use base64ct::{Base64, Encoding};
use libxml::parser::Parser;
use libxml::tree::{c14n, Document, Node};
use md5::Md5;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey};
use rsa::{Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use sha1::{Digest, Sha1};
use sha2::Sha256;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;
use x509_cert::der::{Decode, DecodePem, Encode};
use x509_cert::spki::ObjectIdentifier;
use x509_cert::Certificate;

use crate::config::ConfigError;

pub(crate) const DS_NS: &str = "http://www.w3.org/2000/09/xmldsig#";

const SHA256_WITH_RSA_ENCRYPTION: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.11");
const SHA1_WITH_RSA_ENCRYPTION: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.5");

// The SignedInfo re-declares the xmldsig namespace so the subtree stays
// self-contained when canonicalized on its own.
const SIGNATURE_TEMPLATE: &str = r#"<Signature xmlns="http://www.w3.org/2000/09/xmldsig#"><SignedInfo xmlns="http://www.w3.org/2000/09/xmldsig#"><CanonicalizationMethod Algorithm="http://www.w3.org/2001/10/xml-exc-c14n#"/><SignatureMethod Algorithm="http://www.w3.org/2000/09/xmldsig#rsa-sha1"/><Reference URI=""><Transforms><Transform Algorithm="http://www.w3.org/2000/09/xmldsig#enveloped-signature"/><Transform Algorithm="http://www.w3.org/2001/10/xml-exc-c14n#"/></Transforms><DigestMethod Algorithm="http://www.w3.org/2000/09/xmldsig#sha1"/><DigestValue></DigestValue></Reference></SignedInfo><SignatureValue></SignatureValue><KeyInfo><X509Data><X509IssuerSerial><X509IssuerName></X509IssuerName><X509SerialNumber></X509SerialNumber></X509IssuerSerial><X509Certificate></X509Certificate></X509Data></KeyInfo></Signature>"#;

/// Errors while producing an enveloped signature or a ZKI digest.
#[derive(Debug, Error)]
pub enum SigningError {
    #[error("unable to find request element to sign")]
    MissingRequestElement,
    #[error("XML signing error: {0}")]
    Xml(String),
    #[error("RSA signing error: {0}")]
    Rsa(#[from] rsa::Error),
}

/// Errors while verifying an inbound envelope. These are trust failures and
/// must never be downgraded to warnings.
#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("malformed XML document: {0}")]
    MalformedDocument(String),
    #[error("unable to find request element in envelope")]
    MissingApplicationData,
    #[error("no signature found on {element}")]
    MissingSignature { element: String },
    #[error("certificate presented in {element} does not chain to a trusted authority")]
    UntrustedCertificate { element: String },
    #[error("signature verification of {element} failed: {reason}")]
    VerificationFailed { element: String, reason: String },
}

/// Holds the issuer's private key and certificate.
///
/// A `Signer` is read-only after construction, so a single instance can be
/// shared across threads.
#[derive(Debug)]
pub struct Signer {
    key: RsaPrivateKey,
    cert: Certificate,
    cert_der: Vec<u8>,
}

impl Signer {
    /// Load the signing certificate and private key from PEM files.
    ///
    /// When `key_path` is `None` the key is read from `cert_path` (combined
    /// PEM). A `password` selects encrypted PKCS#8 key material.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when a file is missing, unreadable, or the key
    /// cannot be parsed or decrypted.
    pub fn from_files(
        cert_path: impl AsRef<Path>,
        key_path: Option<&Path>,
        password: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let cert_path = cert_path.as_ref();
        let key_path = key_path.unwrap_or(cert_path);

        let key = load_private_key(key_path, password)?;
        let (cert, cert_der) = load_certificate(cert_path, "company certificate PEM")?;

        Ok(Self {
            key,
            cert,
            cert_der,
        })
    }

    pub fn certificate(&self) -> &Certificate {
        &self.cert
    }

    /// Sign a raw ZKI payload.
    ///
    /// The payload is signed with RSA-SHA1 (PKCS#1 v1.5) and the *signature*
    /// is then hashed with MD5; the hex form of that digest is the ZKI. The
    /// two-stage construction is what the service-side verifier expects and
    /// must not be altered.
    ///
    /// # Errors
    /// Returns [`SigningError::Rsa`] if the RSA operation fails.
    pub fn sign_zki_payload(&self, payload: &[u8]) -> Result<String, SigningError> {
        let digest = Sha1::digest(payload);
        let signature = self.key.sign(Pkcs1v15Sign::new::<Sha1>(), digest.as_slice())?;
        Ok(md5_hex(&signature))
    }

    /// Sign an envelope given as an XML string, returning the signed XML.
    ///
    /// # Errors
    /// Returns [`SigningError::Xml`] if the input does not parse, and
    /// [`SigningError::MissingRequestElement`] if the SOAP body is empty.
    pub fn sign_xml(&self, xml: &str) -> Result<String, SigningError> {
        let mut doc = Parser::default()
            .parse_string(xml)
            .map_err(|e| SigningError::Xml(format!("XML parse error: {e:?}")))?;
        self.sign_envelope(&mut doc)?;
        Ok(doc.to_string())
    }

    /// Apply an enveloped signature to the request element of `doc` in place.
    ///
    /// The application-data element under the SOAP body is tagged with a fresh
    /// `Id`, a signature block referencing it is appended, the exclusive-C14N
    /// SHA-1 digest of the referenced subtree is recorded, and `SignedInfo` is
    /// signed with RSA-SHA1. `KeyInfo` receives the certificate together with
    /// its issuer and decimal serial number.
    ///
    /// # Errors
    /// Returns [`SigningError::MissingRequestElement`] when the body holds no
    /// element, [`SigningError::Xml`] for structural failures.
    pub fn sign_envelope(&self, doc: &mut Document) -> Result<(), SigningError> {
        let mut app = application_node(doc).ok_or(SigningError::MissingRequestElement)?;

        let reference_id = Uuid::new_v4().to_string();
        app.set_attribute("Id", &reference_id)
            .map_err(|e| SigningError::Xml(e.to_string()))?;

        // Digest is taken before the signature block exists, which matches
        // the enveloped-signature transform on the verifying side.
        let digest = canonicalize_standalone(doc, &app, true).map_err(SigningError::Xml)?;
        let digest = Base64::encode_string(Sha1::digest(digest.as_bytes()).as_slice());

        let mut signature = import_fragment(doc, SIGNATURE_TEMPLATE)?;
        app.add_child(&mut signature)
            .map_err(|e| SigningError::Xml(e.to_string()))?;

        let mut reference = find_descendant(&signature, "Reference")
            .ok_or_else(|| SigningError::Xml("signature template is missing Reference".into()))?;
        reference
            .set_attribute("URI", &format!("#{reference_id}"))
            .map_err(|e| SigningError::Xml(e.to_string()))?;
        set_descendant_text(&signature, "DigestValue", &digest)?;
        set_descendant_text(&signature, "X509IssuerName", &issuer_name(&self.cert))?;
        set_descendant_text(
            &signature,
            "X509SerialNumber",
            &serial_decimal(self.cert.tbs_certificate.serial_number.as_bytes()),
        )?;
        set_descendant_text(
            &signature,
            "X509Certificate",
            &Base64::encode_string(&self.cert_der),
        )?;

        let signed_info = find_descendant(&signature, "SignedInfo")
            .ok_or_else(|| SigningError::Xml("signature template is missing SignedInfo".into()))?;
        let canonical = canonicalize_standalone(doc, &signed_info, false).map_err(SigningError::Xml)?;
        let signature_value = self.key.sign(
            Pkcs1v15Sign::new::<Sha1>(),
            Sha1::digest(canonical.as_bytes()).as_slice(),
        )?;
        set_descendant_text(
            &signature,
            "SignatureValue",
            &Base64::encode_string(&signature_value),
        )?;

        debug!(reference = %reference_id, "applied enveloped signature");
        Ok(())
    }
}

/// Verifies inbound envelopes against the service certificate and an optional
/// set of trusted CA certificates.
///
/// Stateless per call; a single instance can be shared across threads.
#[derive(Debug)]
pub struct Verifier {
    service_cert: Certificate,
    service_cert_der: Vec<u8>,
    ca_certs: Vec<Certificate>,
}

impl Verifier {
    /// Load the service certificate and trusted CA certificates from PEM
    /// files. Each CA file may contain several certificates.
    ///
    /// # Errors
    /// Returns [`ConfigError`] when a file is missing or unparsable.
    pub fn from_files(
        cert_path: impl AsRef<Path>,
        ca_cert_paths: &[PathBuf],
    ) -> Result<Self, ConfigError> {
        let (service_cert, service_cert_der) =
            load_certificate(cert_path.as_ref(), "service certificate PEM")?;

        let mut ca_certs = Vec::new();
        for path in ca_cert_paths {
            if !path.exists() {
                return Err(ConfigError::FileNotFound {
                    description: "CA certificate PEM",
                    path: path.clone(),
                });
            }
            let bytes = fs::read(path).map_err(|source| ConfigError::Io {
                description: "CA certificate PEM",
                path: path.clone(),
                source,
            })?;
            let certs = Certificate::load_pem_chain(&bytes).map_err(|e| {
                ConfigError::InvalidMaterial {
                    description: "CA certificate PEM",
                    path: path.clone(),
                    reason: format!("{e:?}"),
                }
            })?;
            ca_certs.extend(certs);
        }

        Ok(Self {
            service_cert,
            service_cert_der,
            ca_certs,
        })
    }

    /// Verify an envelope given as an XML string.
    ///
    /// # Errors
    /// Returns [`SignatureError::MalformedDocument`] if the input does not
    /// parse, otherwise as [`Verifier::verify_envelope`].
    pub fn verify_xml(&self, xml: &str) -> Result<(), SignatureError> {
        let doc = Parser::default()
            .parse_string(xml)
            .map_err(|e| SignatureError::MalformedDocument(format!("{e:?}")))?;
        self.verify_envelope(&doc)
    }

    /// Verify the enveloped signature on the request element of `doc`.
    ///
    /// Checks that the recorded digest matches the exclusive-C14N SHA-1 digest
    /// of the referenced subtree and that the RSA-SHA1 signature over
    /// `SignedInfo` verifies against a certificate that is either the pinned
    /// service certificate or chains to a trusted CA.
    ///
    /// # Errors
    /// Returns a [`SignatureError`] naming the element on any mismatch,
    /// untrusted chain, or malformed signature block.
    pub fn verify_envelope(&self, doc: &Document) -> Result<(), SignatureError> {
        let app = application_node(doc).ok_or(SignatureError::MissingApplicationData)?;
        let element = app.get_name();

        let fail = |reason: &str| SignatureError::VerificationFailed {
            element: element.clone(),
            reason: reason.to_string(),
        };

        let reference_id = app
            .get_attribute("Id")
            .ok_or_else(|| fail("request element has no Id attribute"))?;

        let signature = find_descendant_ns(&app, "Signature", DS_NS)
            .ok_or_else(|| SignatureError::MissingSignature {
                element: element.clone(),
            })?;

        let reference = find_descendant(&signature, "Reference")
            .ok_or_else(|| fail("signature block has no Reference"))?;
        let uri = reference.get_attribute("URI").unwrap_or_default();
        if uri != format!("#{reference_id}") {
            return Err(fail("reference URI does not match the request element"));
        }

        let recorded_digest = descendant_text(&reference, "DigestValue")
            .ok_or_else(|| fail("signature block has no DigestValue"))?;
        let canonical = canonicalize_standalone(doc, &app, true).map_err(|e| fail(&e))?;
        let actual_digest = Base64::encode_string(Sha1::digest(canonical.as_bytes()).as_slice());
        if recorded_digest != actual_digest {
            return Err(fail("digest of the referenced subtree does not match"));
        }

        let signature_value = descendant_text(&signature, "SignatureValue")
            .ok_or_else(|| fail("signature block has no SignatureValue"))?;
        let signature_value: String = signature_value
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let signature_bytes = Base64::decode_vec(&signature_value)
            .map_err(|_| fail("SignatureValue is not valid base64"))?;

        let cert = match descendant_text(&signature, "X509Certificate") {
            Some(encoded) => {
                let cleaned: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
                let der = Base64::decode_vec(&cleaned)
                    .map_err(|_| fail("embedded certificate is not valid base64"))?;
                let cert = Certificate::from_der(&der)
                    .map_err(|_| fail("embedded certificate does not parse"))?;
                if !self.is_trusted(&cert, &der) {
                    return Err(SignatureError::UntrustedCertificate {
                        element: element.clone(),
                    });
                }
                cert
            }
            None => self.service_cert.clone(),
        };

        let public_key = rsa_public_key(&cert).map_err(|e| fail(&e))?;
        let signed_info = find_descendant(&signature, "SignedInfo")
            .ok_or_else(|| fail("signature block has no SignedInfo"))?;
        let canonical = canonicalize_standalone(doc, &signed_info, false).map_err(|e| fail(&e))?;
        public_key
            .verify(
                Pkcs1v15Sign::new::<Sha1>(),
                Sha1::digest(canonical.as_bytes()).as_slice(),
                &signature_bytes,
            )
            .map_err(|_| fail("SignedInfo signature does not verify"))?;

        debug!(element = %element, "verified enveloped signature");
        Ok(())
    }

    fn is_trusted(&self, cert: &Certificate, der: &[u8]) -> bool {
        if der == self.service_cert_der.as_slice() {
            return true;
        }
        self.ca_certs.iter().any(|ca| issued_by(cert, ca))
    }
}

fn issued_by(cert: &Certificate, ca: &Certificate) -> bool {
    cert.tbs_certificate.issuer == ca.tbs_certificate.subject
        && verify_certificate_signature(cert, ca).is_ok()
}

fn verify_certificate_signature(cert: &Certificate, ca: &Certificate) -> Result<(), String> {
    let public_key = rsa_public_key(ca)?;
    let tbs = cert
        .tbs_certificate
        .to_der()
        .map_err(|e| format!("{e:?}"))?;
    let signature = cert
        .signature
        .as_bytes()
        .ok_or_else(|| "certificate signature has unused bits".to_string())?;

    let oid = cert.signature_algorithm.oid;
    let result = if oid == SHA256_WITH_RSA_ENCRYPTION {
        public_key.verify(
            Pkcs1v15Sign::new::<Sha256>(),
            Sha256::digest(&tbs).as_slice(),
            signature,
        )
    } else if oid == SHA1_WITH_RSA_ENCRYPTION {
        public_key.verify(
            Pkcs1v15Sign::new::<Sha1>(),
            Sha1::digest(&tbs).as_slice(),
            signature,
        )
    } else {
        return Err(format!("unsupported certificate signature algorithm {oid}"));
    };
    result.map_err(|e| e.to_string())
}

fn rsa_public_key(cert: &Certificate) -> Result<RsaPublicKey, String> {
    let spki = cert
        .tbs_certificate
        .subject_public_key_info
        .to_der()
        .map_err(|e| format!("{e:?}"))?;
    RsaPublicKey::from_public_key_der(&spki).map_err(|e| format!("{e:?}"))
}

fn load_private_key(path: &Path, password: Option<&str>) -> Result<RsaPrivateKey, ConfigError> {
    const DESCRIPTION: &str = "company private key PEM";
    if !path.exists() {
        return Err(ConfigError::FileNotFound {
            description: DESCRIPTION,
            path: path.to_path_buf(),
        });
    }
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        description: DESCRIPTION,
        path: path.to_path_buf(),
        source,
    })?;
    let invalid = |reason: String| ConfigError::InvalidMaterial {
        description: DESCRIPTION,
        path: path.to_path_buf(),
        reason,
    };

    if let Some(password) = password {
        let block = pem_block(&text, "ENCRYPTED PRIVATE KEY")
            .ok_or_else(|| invalid("no encrypted private key block found".into()))?;
        return RsaPrivateKey::from_pkcs8_encrypted_pem(block, password.as_bytes())
            .map_err(|e| invalid(format!("cannot decrypt private key: {e}")));
    }
    if let Some(block) = pem_block(&text, "PRIVATE KEY") {
        return RsaPrivateKey::from_pkcs8_pem(block).map_err(|e| invalid(e.to_string()));
    }
    if let Some(block) = pem_block(&text, "RSA PRIVATE KEY") {
        return RsaPrivateKey::from_pkcs1_pem(block).map_err(|e| invalid(e.to_string()));
    }
    Err(invalid("no private key block found".into()))
}

fn load_certificate(
    path: &Path,
    description: &'static str,
) -> Result<(Certificate, Vec<u8>), ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound {
            description,
            path: path.to_path_buf(),
        });
    }
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        description,
        path: path.to_path_buf(),
        source,
    })?;
    let invalid = |reason: String| ConfigError::InvalidMaterial {
        description,
        path: path.to_path_buf(),
        reason,
    };

    let block = pem_block(&text, "CERTIFICATE")
        .ok_or_else(|| invalid("no certificate block found".into()))?;
    let cert =
        Certificate::from_pem(block.as_bytes()).map_err(|e| invalid(format!("{e:?}")))?;
    let der = cert.to_der().map_err(|e| invalid(format!("{e:?}")))?;
    Ok((cert, der))
}

// Extract a single PEM block by label from text that may hold several blocks
// (combined key + certificate files are common).
fn pem_block<'a>(text: &'a str, label: &str) -> Option<&'a str> {
    let begin = format!("-----BEGIN {label}-----");
    let end = format!("-----END {label}-----");
    let start = text.find(&begin)?;
    let stop = text[start..].find(&end)? + start + end.len();
    Some(&text[start..stop])
}

fn md5_hex(data: &[u8]) -> String {
    let digest = Md5::digest(data);
    let mut hex = String::with_capacity(digest.len() * 2);
    for byte in digest {
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}

fn issuer_name(cert: &Certificate) -> String {
    let issuer = cert.tbs_certificate.issuer.to_string();
    issuer
        .split(',')
        .map(|part| part.trim())
        .collect::<Vec<_>>()
        .join(", ")
}

fn serial_decimal(bytes: &[u8]) -> String {
    if bytes.is_empty() {
        return "0".to_string();
    }

    let mut digits: Vec<u8> = vec![0];
    for &byte in bytes {
        let mut carry = byte as u32;
        for digit in digits.iter_mut() {
            let value = (*digit as u32) * 256 + carry;
            *digit = (value % 10) as u8;
            carry = value / 10;
        }
        while carry > 0 {
            digits.push((carry % 10) as u8);
            carry /= 10;
        }
    }

    while digits.len() > 1 && matches!(digits.last(), Some(0)) {
        digits.pop();
    }

    digits.iter().rev().map(|d| (b'0' + *d) as char).collect()
}

// Locates the application-data element: the first element child of the SOAP
// body.
pub(crate) fn application_node(doc: &Document) -> Option<Node> {
    let root = doc.get_root_element()?;
    let body = find_child(&root, "Body")?;
    first_element_child(&body)
}

fn first_element_child(node: &Node) -> Option<Node> {
    let mut current = node.get_first_child();
    while let Some(child) = current {
        if child.is_element_node() {
            return Some(child);
        }
        current = child.get_next_sibling();
    }
    None
}

fn find_child(node: &Node, name: &str) -> Option<Node> {
    let mut current = node.get_first_child();
    while let Some(child) = current {
        if child.is_element_node() && child.get_name() == name {
            return Some(child);
        }
        current = child.get_next_sibling();
    }
    None
}

fn find_descendant(node: &Node, name: &str) -> Option<Node> {
    let mut current = node.get_first_child();
    while let Some(child) = current {
        if child.is_element_node() && child.get_name() == name {
            return Some(child);
        }
        if let Some(found) = find_descendant(&child, name) {
            return Some(found);
        }
        current = child.get_next_sibling();
    }
    None
}

fn find_descendant_ns(node: &Node, name: &str, href: &str) -> Option<Node> {
    let found = find_descendant(node, name)?;
    match found.get_namespace() {
        Some(ns) if ns.get_href() == href => Some(found),
        _ => None,
    }
}

fn descendant_text(node: &Node, name: &str) -> Option<String> {
    let found = find_descendant(node, name)?;
    let text = found.get_content().trim().to_string();
    if text.is_empty() {
        return None;
    }
    Some(text)
}

fn set_descendant_text(root: &Node, name: &str, value: &str) -> Result<(), SigningError> {
    let mut node = find_descendant(root, name)
        .ok_or_else(|| SigningError::Xml(format!("signature template is missing {name}")))?;
    node.set_content(value)
        .map_err(|e| SigningError::Xml(e.to_string()))
}

fn import_fragment(doc: &mut Document, xml: &str) -> Result<Node, SigningError> {
    let fragment = Parser::default()
        .parse_string(xml)
        .map_err(|e| SigningError::Xml(format!("XML parse error: {e:?}")))?;
    let mut node = fragment
        .get_root_element()
        .ok_or_else(|| SigningError::Xml("missing fragment root".into()))?;
    node.unlink();
    doc.import_node(&mut node)
        .map_err(|_| SigningError::Xml("failed to import fragment".into()))
}

// Serializes a subtree into its own document and canonicalizes it with
// exclusive C14N. With `strip_signature` the embedded xmldsig block is removed
// first, matching the enveloped-signature transform. The subtree must declare
// the namespaces it uses, which holds for all request and signature shapes
// produced by this crate.
fn canonicalize_standalone(
    doc: &Document,
    node: &Node,
    strip_signature: bool,
) -> Result<String, String> {
    let xml = doc.node_to_string(node);
    let standalone = Parser::default()
        .parse_string(&xml)
        .map_err(|e| format!("cannot isolate subtree: {e:?}"))?;

    if strip_signature {
        if let Some(root) = standalone.get_root_element() {
            let mut doomed = Vec::new();
            let mut current = root.get_first_child();
            while let Some(child) = current {
                current = child.get_next_sibling();
                if child.is_element_node()
                    && child.get_name() == "Signature"
                    && child
                        .get_namespace()
                        .map(|ns| ns.get_href() == DS_NS)
                        .unwrap_or(false)
                {
                    doomed.push(child);
                }
            }
            for mut node in doomed {
                node.unlink();
            }
        }
    }

    let options = c14n::CanonicalizationOptions {
        mode: c14n::CanonicalizationMode::ExclusiveCanonical1_0,
        inclusive_ns_prefixes: vec![],
        with_comments: false,
    };
    standalone
        .canonicalize(options, None)
        .map_err(|e| format!("canonicalization failed: {e:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serial_decimal_handles_large_values() {
        assert_eq!(serial_decimal(&[0x01]), "1");
        assert_eq!(serial_decimal(&[0x01, 0x00]), "256");
        assert_eq!(serial_decimal(&[0x00, 0x01]), "1");
        assert_eq!(serial_decimal(&[0xFF, 0xFF]), "65535");
        assert_eq!(serial_decimal(&[]), "0");
    }

    #[test]
    fn md5_hex_is_lowercase_32_chars() {
        let digest = md5_hex(b"payload");
        assert_eq!(digest.len(), 32);
        assert!(digest
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b)));
    }

    #[test]
    fn pem_block_extracts_labeled_section() {
        let text = "garbage\n-----BEGIN CERTIFICATE-----\nabc\n-----END CERTIFICATE-----\ntrailer";
        let block = pem_block(text, "CERTIFICATE").expect("block");
        assert!(block.starts_with("-----BEGIN CERTIFICATE-----"));
        assert!(block.ends_with("-----END CERTIFICATE-----"));
        assert!(pem_block(text, "PRIVATE KEY").is_none());
    }

    #[test]
    fn application_node_finds_first_body_element() {
        let xml = r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/"><soapenv:Body><tns:RacunZahtjev xmlns:tns="http://www.apis-it.hr/fin/2012/types/f73"/></soapenv:Body></soapenv:Envelope>"#;
        let doc = Parser::default().parse_string(xml).expect("parse");
        let node = application_node(&doc).expect("application node");
        assert_eq!(node.get_name(), "RacunZahtjev");
    }

    #[test]
    fn application_node_missing_for_empty_body() {
        let xml = r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/"><soapenv:Body/></soapenv:Envelope>"#;
        let doc = Parser::default().parse_string(xml).expect("parse");
        assert!(application_node(&doc).is_none());
    }
}
