//! Invoice domain types and document builders.
mod builder;
mod qr;
pub mod xml;
mod zki;

pub use builder::{Invoice, InvoicePaymentMethodChange, InvoiceWithDoc, SupportingDocument};
pub use zki::Zki;

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Serialize, Serializer};
use thiserror::Error;

use crate::sign::SigningError;

type Result<T> = std::result::Result<T, ValidationError>;

/// Local validation failures: malformed value objects or tax-line arithmetic.
///
/// These are always raised before any network traffic and are never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("OIB must have exactly 11 digits")]
    InvalidOibFormat,
    #[error("incorrect OIB (control digit {actual}, expected {expected})")]
    OibChecksumMismatch { actual: char, expected: u32 },
    #[error("invoice number must be in format nnn/ABC/nnn")]
    InvalidInvoiceNumber,
    #[error("incorrect ZKI format: {0}")]
    InvalidZkiFormat(String),
    #[error("invalid amount: {input}")]
    InvalidAmount { input: String },
    #[error("calculated tax amount {calculated} differs from provided {provided}")]
    TaxAmountMismatch {
        calculated: Amount,
        provided: Amount,
    },
    #[error("{list} must not be an empty list")]
    EmptyItemList { list: &'static str },
}

/// Document fields referenced by requiredness checks and
/// [`DocumentError::MissingField`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentField {
    Oib,
    InvoiceNumber,
    Total,
    DocumentReference,
    OriginalZki,
    NewPaymentMethod,
}

impl fmt::Display for DocumentField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DocumentField::Oib => "OIB",
            DocumentField::InvoiceNumber => "invoice number",
            DocumentField::Total => "total amount",
            DocumentField::DocumentReference => "document reference",
            DocumentField::OriginalZki => "original ZKI",
            DocumentField::NewPaymentMethod => "new payment method",
        };
        f.write_str(name)
    }
}

/// Structural document failures raised at serialization time, before any
/// network call.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("required field missing: {0}")]
    MissingField(DocumentField),
    #[error("exactly one of document JIR or document ZKI must be set")]
    AmbiguousDocumentReference,
    #[error("new payment method must differ from the current payment method")]
    PaymentMethodUnchanged,
    #[error(transparent)]
    Signing(#[from] SigningError),
    #[error("JSON rendering error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Osobni identifikacijski broj: the checksum-validated national identifier.
///
/// # Examples
/// ```rust
/// use fiskal_core::invoice::Oib;
///
/// let oib = Oib::parse("12312312316")?;
/// assert_eq!(oib.as_str(), "12312312316");
/// # Ok::<(), fiskal_core::invoice::ValidationError>(())
/// ```
///
/// # Errors
/// Returns [`ValidationError::InvalidOibFormat`] unless the input is exactly
/// 11 ASCII digits, and [`ValidationError::OibChecksumMismatch`] when the
/// control digit does not match the ISO 7064 mod-11,10 recurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Oib(String);

impl Oib {
    pub fn parse<S: Into<String>>(s: S) -> Result<Self> {
        let s = s.into();
        if s.len() != 11 || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ValidationError::InvalidOibFormat);
        }
        let expected = Self::check_digit(&s);
        let actual = s.as_bytes()[10] as char;
        if actual.to_digit(10) != Some(expected) {
            return Err(ValidationError::OibChecksumMismatch { actual, expected });
        }
        Ok(Oib(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    // Mod-11,10 recurrence over the first ten digits.
    fn check_digit(digits: &str) -> u32 {
        let mut acc = 10u32;
        for b in digits.bytes().take(10) {
            acc = ((b - b'0') as u32 + acc) % 10;
            if acc == 0 {
                acc = 10;
            }
            acc = (acc * 2) % 11;
        }
        (11 - acc) % 10
    }
}

impl fmt::Display for Oib {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Oib {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl FromStr for Oib {
    type Err = ValidationError;
    fn from_str(s: &str) -> Result<Self> {
        Oib::parse(s)
    }
}

impl TryFrom<&str> for Oib {
    type Error = ValidationError;
    fn try_from(value: &str) -> Result<Self> {
        Oib::parse(value)
    }
}

/// Broj računa: the composite `sequence/location/device` invoice identifier.
///
/// The original string form is preserved so parsing and re-stringifying is
/// lossless.
///
/// # Examples
/// ```rust
/// use fiskal_core::invoice::InvoiceNumber;
///
/// let number = InvoiceNumber::parse("1001/VP1/9")?;
/// assert_eq!(number.sequence_number(), 1001);
/// assert_eq!(number.location_code(), "VP1");
/// assert_eq!(number.device_number(), 9);
/// assert_eq!(number.to_string(), "1001/VP1/9");
/// # Ok::<(), fiskal_core::invoice::ValidationError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceNumber {
    value: String,
    sequence_number: u64,
    location_code: String,
    device_number: u64,
}

impl InvoiceNumber {
    pub fn parse<S: Into<String>>(s: S) -> Result<Self> {
        let value = s.into();
        let mut parts = value.split('/');
        let (seq, loc, dev) = match (parts.next(), parts.next(), parts.next(), parts.next()) {
            (Some(seq), Some(loc), Some(dev), None) => (seq, loc, dev),
            _ => return Err(ValidationError::InvalidInvoiceNumber),
        };
        if seq.is_empty()
            || dev.is_empty()
            || loc.is_empty()
            || !seq.bytes().all(|b| b.is_ascii_digit())
            || !dev.bytes().all(|b| b.is_ascii_digit())
            || !loc.bytes().all(|b| b.is_ascii_alphanumeric())
        {
            return Err(ValidationError::InvalidInvoiceNumber);
        }
        let sequence_number = seq
            .parse()
            .map_err(|_| ValidationError::InvalidInvoiceNumber)?;
        let device_number = dev
            .parse()
            .map_err(|_| ValidationError::InvalidInvoiceNumber)?;
        let location_code = loc.to_string();
        Ok(InvoiceNumber {
            value,
            sequence_number,
            location_code,
            device_number,
        })
    }

    pub fn sequence_number(&self) -> u64 {
        self.sequence_number
    }

    pub fn location_code(&self) -> &str {
        &self.location_code
    }

    pub fn device_number(&self) -> u64 {
        self.device_number
    }
}

impl fmt::Display for InvoiceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl FromStr for InvoiceNumber {
    type Err = ValidationError;
    fn from_str(s: &str) -> Result<Self> {
        InvoiceNumber::parse(s)
    }
}

/// Monetary amount fixed to exactly two decimal places.
///
/// Values are normalized with banker's rounding on construction, so every
/// amount renders as e.g. `"314.16"` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Amount(Decimal);

impl Amount {
    pub fn new(value: Decimal) -> Self {
        let mut value = value.round_dp(2);
        value.rescale(2);
        Amount(value)
    }

    pub fn as_decimal(&self) -> Decimal {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Amount::new(value)
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Amount::new(Decimal::from(value))
    }
}

impl TryFrom<f64> for Amount {
    type Error = ValidationError;

    fn try_from(value: f64) -> Result<Self> {
        Decimal::try_from(value)
            .map(Amount::new)
            .map_err(|_| ValidationError::InvalidAmount {
                input: value.to_string(),
            })
    }
}

impl FromStr for Amount {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self> {
        Decimal::from_str(s)
            .map(Amount::new)
            .map_err(|_| ValidationError::InvalidAmount {
                input: s.to_string(),
            })
    }
}

impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A single tax line: base, rate and amount, all fixed-point.
///
/// # Errors
/// Construction fails with [`ValidationError::TaxAmountMismatch`] unless
/// `amount == round(base * rate / 100, 2)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaxItem {
    base: Amount,
    rate: Amount,
    amount: Amount,
}

impl TaxItem {
    pub fn new(
        base: impl Into<Amount>,
        rate: impl Into<Amount>,
        amount: impl Into<Amount>,
    ) -> Result<Self> {
        let base = base.into();
        let rate = rate.into();
        let amount = amount.into();
        let calculated = Amount::new(base.as_decimal() * rate.as_decimal() / Decimal::from(100));
        if calculated != amount {
            return Err(ValidationError::TaxAmountMismatch {
                calculated,
                provided: amount,
            });
        }
        Ok(TaxItem { base, rate, amount })
    }

    pub fn base(&self) -> Amount {
        self.base
    }

    pub fn rate(&self) -> Amount {
        self.rate
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }
}

impl fmt::Display for TaxItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.rate)
    }
}

/// A tax line with a label, used for named surcharges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedTaxItem {
    name: String,
    item: TaxItem,
}

impl NamedTaxItem {
    pub fn new(
        name: impl Into<String>,
        base: impl Into<Amount>,
        rate: impl Into<Amount>,
        amount: impl Into<Amount>,
    ) -> Result<Self> {
        Ok(NamedTaxItem {
            name: name.into(),
            item: TaxItem::new(base, rate, amount)?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn base(&self) -> Amount {
        self.item.base()
    }

    pub fn rate(&self) -> Amount {
        self.item.rate()
    }

    pub fn amount(&self) -> Amount {
        self.item.amount()
    }
}

impl fmt::Display for NamedTaxItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}%)", self.name, self.rate())
    }
}

/// A named surcharge amount with no arithmetic invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fee {
    name: String,
    amount: Amount,
}

impl Fee {
    pub fn new(name: impl Into<String>, amount: impl Into<Amount>) -> Self {
        Fee {
            name: name.into(),
            amount: amount.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }
}

impl fmt::Display for Fee {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Način plaćanja: payment method codes used on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaymentMethod {
    /// Gotovina
    Cash,
    /// Kartica
    Card,
    /// Ček
    Check,
    /// Transakcijski račun
    Wire,
    /// Ostalo
    #[default]
    Other,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "G",
            PaymentMethod::Card => "K",
            PaymentMethod::Check => "C",
            PaymentMethod::Wire => "T",
            PaymentMethod::Other => "O",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Oznaka slijednosti: whether invoice sequence numbers reset per business
/// location or per charging device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SequenceScope {
    #[default]
    Location,
    Device,
}

impl SequenceScope {
    pub fn as_str(&self) -> &'static str {
        match self {
            SequenceScope::Location => "P",
            SequenceScope::Device => "N",
        }
    }
}

impl fmt::Display for SequenceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// All wire timestamps use the same zero-padded 24-hour format.
pub(crate) fn wire_datetime(dt: NaiveDateTime) -> String {
    dt.format("%d.%m.%YT%H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const VALID_OIB: &str = "12312312316";

    #[test]
    fn correct_oib_passes_validation() {
        let oib = Oib::parse(VALID_OIB).expect("valid OIB");
        assert_eq!(oib.as_str(), VALID_OIB);
    }

    #[test]
    fn incorrect_oib_length_fails() {
        assert_eq!(Oib::parse("123"), Err(ValidationError::InvalidOibFormat));
        assert_eq!(
            Oib::parse("1231231231a"),
            Err(ValidationError::InvalidOibFormat)
        );
    }

    #[test]
    fn incorrect_oib_checksum_fails() {
        let err = Oib::parse("12312312312").unwrap_err();
        assert_eq!(
            err,
            ValidationError::OibChecksumMismatch {
                actual: '2',
                expected: 6,
            }
        );
    }

    #[test]
    fn oib_parses_from_str() {
        let oib: Oib = VALID_OIB.parse().expect("valid OIB");
        assert_eq!(oib.to_string(), VALID_OIB);
    }

    #[test]
    fn invoice_number_round_trips() {
        let number = InvoiceNumber::parse("1001/VP1/9").expect("valid number");
        assert_eq!(number.sequence_number(), 1001);
        assert_eq!(number.location_code(), "VP1");
        assert_eq!(number.device_number(), 9);
        assert_eq!(
            InvoiceNumber::parse(number.to_string()).expect("round trip"),
            number
        );
    }

    #[test]
    fn invoice_number_rejects_malformed_input() {
        for input in [
            "",
            "1001/VP1",
            "1001/VP1/9/2",
            "a/VP1/9",
            "1001/VP 1/9",
            "1001/VP-1/9",
            "1001//9",
            "1001/VP1/x",
        ] {
            assert_eq!(
                InvoiceNumber::parse(input),
                Err(ValidationError::InvalidInvoiceNumber),
                "input {input:?} should be rejected"
            );
        }
    }

    #[test]
    fn amount_normalizes_to_two_decimals() {
        assert_eq!(Amount::from(42).to_string(), "42.00");
        assert_eq!("3.14".parse::<Amount>().unwrap().to_string(), "3.14");
        assert_eq!(Amount::from(dec!(3.141592)).to_string(), "3.14");
        assert_eq!(Amount::from(dec!(1)).to_string(), "1.00");
    }

    #[test]
    fn amount_rounds_half_to_even() {
        assert_eq!(Amount::from(dec!(2.125)).to_string(), "2.12");
        assert_eq!(Amount::from(dec!(2.135)).to_string(), "2.14");
    }

    #[test]
    fn amount_rejects_garbage_strings() {
        assert!(matches!(
            "many".parse::<Amount>(),
            Err(ValidationError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn tax_item_accepts_matching_arithmetic() {
        let item = TaxItem::new(100, dec!(2.5), dec!(2.5)).expect("valid tax item");
        assert_eq!(item.base().to_string(), "100.00");
        assert_eq!(item.rate().to_string(), "2.50");
        assert_eq!(item.amount().to_string(), "2.50");
        assert_eq!(item.to_string(), "2.50%");
    }

    #[test]
    fn tax_item_rejects_mismatched_arithmetic() {
        let err = TaxItem::new(100, 20, 30).unwrap_err();
        assert!(matches!(err, ValidationError::TaxAmountMismatch { .. }));
        assert!(TaxItem::new(100, 25, 25).is_ok());
    }

    #[test]
    fn named_tax_item_displays_label() {
        let item = NamedTaxItem::new("PDV", 100, 25, 25).expect("valid item");
        assert_eq!(item.name(), "PDV");
        assert_eq!(item.to_string(), "PDV (25.00%)");
    }

    #[test]
    fn fee_carries_no_invariant() {
        let fee = Fee::new("Misc", 100);
        assert_eq!(fee.to_string(), "Misc");
        assert_eq!(fee.amount().to_string(), "100.00");
    }

    #[test]
    fn enum_wire_codes() {
        assert_eq!(PaymentMethod::Cash.as_str(), "G");
        assert_eq!(PaymentMethod::default().as_str(), "O");
        assert_eq!(SequenceScope::default().as_str(), "P");
        assert_eq!(SequenceScope::Device.as_str(), "N");
    }

    #[test]
    fn wire_datetime_is_zero_padded() {
        let dt = chrono::NaiveDate::from_ymd_opt(2022, 1, 1)
            .unwrap()
            .and_hms_opt(9, 5, 7)
            .unwrap();
        assert_eq!(wire_datetime(dt), "01.01.2022T09:05:07");
    }
}
