use std::fmt;

use chrono::NaiveDateTime;

use super::{wire_datetime, Amount, InvoiceNumber, Oib, ValidationError};
use crate::sign::{Signer, SigningError};

/// Zaštitni kod izdavatelja: the per-invoice tamper-evidence code.
///
/// A fixed 32-character lowercase hexadecimal string. Normally produced by
/// [`Zki::calculate`]; constructing one directly from a known hex string is
/// supported for referencing a previously issued invoice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zki(String);

impl Zki {
    /// Wrap a known ZKI hex string, validating its shape.
    ///
    /// # Errors
    /// Returns [`ValidationError::InvalidZkiFormat`] unless the input is
    /// exactly 32 lowercase hex characters.
    pub fn new<S: Into<String>>(value: S) -> Result<Self, ValidationError> {
        let value = value.into();
        let well_formed = value.len() == 32
            && value
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b));
        if !well_formed {
            return Err(ValidationError::InvalidZkiFormat(value));
        }
        Ok(Zki(value))
    }

    /// Calculate the ZKI for an invoice or supporting document.
    ///
    /// The payload concatenates OIB, issue timestamp, invoice number parts and
    /// total amount without separators, and is signed with the issuer's key;
    /// see [`Signer::sign_zki_payload`] for the digest construction.
    ///
    /// # Errors
    /// Propagates [`SigningError`] from the signing operation.
    pub fn calculate(
        oib: &Oib,
        issued_at: NaiveDateTime,
        number: &InvoiceNumber,
        total: Amount,
        signer: &Signer,
    ) -> Result<Zki, SigningError> {
        let payload = Self::payload(oib, issued_at, number, total);
        Ok(Zki(signer.sign_zki_payload(payload.as_bytes())?))
    }

    // Exact byte layout required by the service-side verifier.
    pub(crate) fn payload(
        oib: &Oib,
        issued_at: NaiveDateTime,
        number: &InvoiceNumber,
        total: Amount,
    ) -> String {
        format!(
            "{}{}{}{}{}{}",
            oib,
            wire_datetime(issued_at),
            number.sequence_number(),
            number.location_code(),
            number.device_number(),
            total,
        )
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Zki {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Zki {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_lowercase_hex() {
        let raw = "abcd".repeat(8);
        let zki = Zki::new(raw.clone()).expect("valid ZKI");
        assert_eq!(zki.to_string(), raw);
    }

    #[test]
    fn rejects_wrong_length_and_non_hex() {
        assert!(Zki::new("123").is_err());
        assert!(Zki::new("xywz".repeat(8)).is_err());
        assert!(Zki::new("ABCD".repeat(8)).is_err());
    }

    #[test]
    fn equality_is_value_based() {
        assert_eq!(Zki::new("abcd".repeat(8)), Zki::new("abcdabcd".repeat(4)));
        assert_ne!(
            Zki::new("abcd".repeat(8)).unwrap(),
            Zki::new("1234".repeat(8)).unwrap()
        );
    }

    #[test]
    fn payload_layout_is_exact() {
        let oib = Oib::parse("12312312316").unwrap();
        let number = InvoiceNumber::parse("1/X/1").unwrap();
        let issued_at = chrono::NaiveDate::from_ymd_opt(2022, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();

        let payload = Zki::payload(&oib, issued_at, &number, Amount::from(100));
        assert_eq!(payload, "1231231231601.01.2022T00:00:001X1100.00");
    }
}
