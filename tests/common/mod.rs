use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::OnceLock;
use std::time::Duration;

use rsa::pkcs8::{EncodePrivateKey, EncodePublicKey, LineEnding};
use rsa::{Pkcs1v15Sign, RsaPrivateKey};
use sha2::{Digest, Sha256};
use x509_cert::certificate::{TbsCertificate, Version};
use x509_cert::der::asn1::{Any, AnyRef, BitString};
use x509_cert::der::{Decode, Encode, EncodePem};
use x509_cert::name::Name;
use x509_cert::serial_number::SerialNumber;
use x509_cert::spki::{AlgorithmIdentifierOwned, ObjectIdentifier, SubjectPublicKeyInfoOwned};
use x509_cert::time::Validity;
use x509_cert::Certificate;

const SHA256_WITH_RSA_ENCRYPTION: ObjectIdentifier =
    ObjectIdentifier::new_unwrap("1.2.840.113549.1.1.11");

#[derive(Clone)]
pub struct TestIdentity {
    pub key: RsaPrivateKey,
    pub cert: Certificate,
}

// Key generation dominates test time, so each identity is minted once per
// test binary. 1024-bit keys keep debug builds fast.
fn generate_key() -> RsaPrivateKey {
    RsaPrivateKey::new(&mut rand::thread_rng(), 1024).expect("generate RSA key")
}

fn self_signed(subject: &str) -> TestIdentity {
    let key = generate_key();
    let cert = mint_certificate(&key, &key, subject, subject, &[2]);
    TestIdentity { key, cert }
}

/// The invoicing company's identity, self-signed.
#[allow(dead_code)]
pub fn company() -> &'static TestIdentity {
    static IDENTITY: OnceLock<TestIdentity> = OnceLock::new();
    IDENTITY.get_or_init(|| self_signed("CN=Company,O=Fiskal Test"))
}

/// The fiscalization service's identity, self-signed.
#[allow(dead_code)]
pub fn service() -> &'static TestIdentity {
    static IDENTITY: OnceLock<TestIdentity> = OnceLock::new();
    IDENTITY.get_or_init(|| self_signed("CN=Service,O=Fiskal Test"))
}

/// An unrelated identity sharing no trust with the others.
#[allow(dead_code)]
pub fn stranger() -> &'static TestIdentity {
    static IDENTITY: OnceLock<TestIdentity> = OnceLock::new();
    IDENTITY.get_or_init(|| self_signed("CN=Stranger,O=Elsewhere"))
}

/// A CA identity plus a leaf identity issued by it.
#[allow(dead_code)]
pub fn ca_and_leaf() -> &'static (TestIdentity, TestIdentity) {
    static IDENTITIES: OnceLock<(TestIdentity, TestIdentity)> = OnceLock::new();
    IDENTITIES.get_or_init(|| {
        let ca = self_signed("CN=Test CA,O=Fiskal Test");
        let leaf_key = generate_key();
        let leaf_cert = mint_certificate(
            &leaf_key,
            &ca.key,
            "CN=Leaf,O=Fiskal Test",
            "CN=Test CA,O=Fiskal Test",
            &[3],
        );
        (
            ca,
            TestIdentity {
                key: leaf_key,
                cert: leaf_cert,
            },
        )
    })
}

fn mint_certificate(
    subject_key: &RsaPrivateKey,
    issuer_key: &RsaPrivateKey,
    subject: &str,
    issuer: &str,
    serial: &[u8],
) -> Certificate {
    let spki_der = subject_key
        .to_public_key()
        .to_public_key_der()
        .expect("public key DER");
    let spki = SubjectPublicKeyInfoOwned::from_der(spki_der.as_bytes()).expect("spki");
    let algorithm = AlgorithmIdentifierOwned {
        oid: SHA256_WITH_RSA_ENCRYPTION,
        parameters: Some(Any::from(AnyRef::NULL)),
    };

    let tbs_certificate = TbsCertificate {
        version: Version::V3,
        serial_number: SerialNumber::new(serial).expect("serial"),
        signature: algorithm.clone(),
        issuer: Name::from_str(issuer).expect("issuer name"),
        validity: Validity::from_now(Duration::from_secs(3600)).expect("validity"),
        subject: Name::from_str(subject).expect("subject name"),
        subject_public_key_info: spki,
        issuer_unique_id: None,
        subject_unique_id: None,
        extensions: None,
    };

    let tbs_der = tbs_certificate.to_der().expect("TBS DER");
    let digest = Sha256::digest(&tbs_der);
    let signature = issuer_key
        .sign(Pkcs1v15Sign::new::<Sha256>(), digest.as_slice())
        .expect("sign TBS");

    Certificate {
        tbs_certificate,
        signature_algorithm: algorithm,
        signature: BitString::from_bytes(&signature).expect("signature bits"),
    }
}

/// Write an identity's certificate and key as PEM files, returning
/// (cert path, key path).
#[allow(dead_code)]
pub fn write_identity(dir: &Path, name: &str, identity: &TestIdentity) -> (PathBuf, PathBuf) {
    let cert_path = write_certificate(dir, &format!("{name}.cert"), &identity.cert);
    let key_path = dir.join(format!("{name}.key.pem"));
    let key_pem = identity
        .key
        .to_pkcs8_pem(LineEnding::LF)
        .expect("key PEM");
    std::fs::write(&key_path, key_pem.as_bytes()).expect("write key");
    (cert_path, key_path)
}

#[allow(dead_code)]
pub fn write_certificate(dir: &Path, name: &str, cert: &Certificate) -> PathBuf {
    let path = dir.join(format!("{name}.pem"));
    let pem = cert.to_pem(LineEnding::LF).expect("cert PEM");
    std::fs::write(&path, pem).expect("write cert");
    path
}

/// A Signer over the company identity, backed by PEM files in `dir`.
#[allow(dead_code)]
pub fn company_signer(dir: &Path) -> fiskal_core::sign::Signer {
    let (cert_path, key_path) = write_identity(dir, "company", company());
    fiskal_core::sign::Signer::from_files(&cert_path, Some(key_path.as_path()), None)
        .expect("company signer")
}

/// A Verifier trusting the service identity, backed by PEM files in `dir`.
#[allow(dead_code)]
pub fn service_verifier(dir: &Path) -> fiskal_core::sign::Verifier {
    let cert_path = write_certificate(dir, "service.cert", &service().cert);
    fiskal_core::sign::Verifier::from_files(&cert_path, &[]).expect("service verifier")
}

/// A Signer over the service identity, used by tests to fabricate signed
/// service responses.
#[allow(dead_code)]
pub fn service_signer(dir: &Path) -> fiskal_core::sign::Signer {
    let (cert_path, key_path) = write_identity(dir, "service", service());
    fiskal_core::sign::Signer::from_files(&cert_path, Some(key_path.as_path()), None)
        .expect("service signer")
}
