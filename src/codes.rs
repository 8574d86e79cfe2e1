//! Response-code catalog and fault decoding.
//!
//! The catalog maps the service's short alphanumeric codes to stable variants
//! and human-readable descriptions. It is a fixed table compiled into the
//! binary; `v100` is the "no error" sentinel reported on success.
use std::fmt;

use libxml::parser::Parser;
use libxml::tree::{Document, Node};

/// One entry of the fixed response-code catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum ResponseCode {
    /// The message is correct; not an error.
    NoError,
    InvalidXml,
    InvalidClientCertificate,
    WrongClientCertificateType,
    IncorrectDigitalSignature,
    OibMismatch,
    ServerError,
    PaymentMethodChangeDateMismatch,
    PaymentMethodChangeDataDiffers,
    MessageDatetimeOutOfBounds,
    InvoiceDatetimeOutOfBounds,
    InvoiceIssuedAfterSending,
    InvalidInvoiceSequenceNumber,
    InvoiceSequenceNumberTooLarge,
    InvoiceVatRateUnknown,
    VatBaseGreaterThanTotal,
    VatBaseLessThanTotal,
    VatSignMismatch,
    VatAmountLessThanCalculated,
    VatAmountGreaterThanCalculated,
    ConsumptionTaxRateNegative,
    ConsumptionTaxRateTooLarge,
    ConsumptionTaxBaseGreaterThanTotal,
    ConsumptionTaxBaseLessThanTotal,
    ConsumptionTaxSignMismatch,
    ConsumptionTaxAmountLessThanCalculated,
    ConsumptionTaxAmountGreaterThanCalculated,
    OtherTaxIncluded,
    VatExemptAmountGreaterThanTotal,
    VatExemptAmountLessThanTotal,
    VatExemptSignMismatch,
    MarginTaxationAmountGreaterThanTotal,
    MarginTaxationAmountLessThanTotal,
    MarginTaxationSignMismatch,
    TaxExemptTotalGreaterThanTotal,
    TaxExemptTotalLessThanTotal,
    TaxExemptTotalSignMismatch,
    FeeTooLarge,
    FeeTooSmall,
    TotalAmountDiffersFromCalculated,
    WireTotalAmountTooLarge,
    SpecificPurposeNotEmpty,
    NonzeroVat,
    NonzeroVatExempt,
    NonzeroMarginTaxation,
    NonzeroTaxExemptTotal,
    CashTotalAmountTooLarge,
    LateInvoiceTwoDays,
    LateInvoiceFiveDays,
    /// Placeholder for codes absent from the catalog; kept, never dropped.
    Unknown,
}

impl ResponseCode {
    /// Look up a wire code; codes outside the catalog decode to
    /// [`ResponseCode::Unknown`].
    pub fn from_code(code: &str) -> ResponseCode {
        use ResponseCode::*;
        match code {
            "v100" => NoError,
            "s001" => InvalidXml,
            "s002" => InvalidClientCertificate,
            "s003" => WrongClientCertificateType,
            "s004" => IncorrectDigitalSignature,
            "s005" => OibMismatch,
            "s006" => ServerError,
            "s007" => PaymentMethodChangeDateMismatch,
            "s008" => PaymentMethodChangeDataDiffers,
            "v101" => MessageDatetimeOutOfBounds,
            "v103" => InvoiceDatetimeOutOfBounds,
            "v104" => InvoiceIssuedAfterSending,
            "v105" => InvalidInvoiceSequenceNumber,
            "v106" => InvoiceSequenceNumberTooLarge,
            "v110" => InvoiceVatRateUnknown,
            "v112" => VatBaseGreaterThanTotal,
            "v113" => VatBaseLessThanTotal,
            "v114" => VatSignMismatch,
            "v115" => VatAmountLessThanCalculated,
            "v116" => VatAmountGreaterThanCalculated,
            "v117" => ConsumptionTaxRateNegative,
            "v118" => ConsumptionTaxRateTooLarge,
            "v120" => ConsumptionTaxBaseGreaterThanTotal,
            "v121" => ConsumptionTaxBaseLessThanTotal,
            "v122" => ConsumptionTaxSignMismatch,
            "v123" => ConsumptionTaxAmountLessThanCalculated,
            "v124" => ConsumptionTaxAmountGreaterThanCalculated,
            "v125" => OtherTaxIncluded,
            "v126" => VatExemptAmountGreaterThanTotal,
            "v127" => VatExemptAmountLessThanTotal,
            "v128" => VatExemptSignMismatch,
            "v129" => MarginTaxationAmountGreaterThanTotal,
            "v130" => MarginTaxationAmountLessThanTotal,
            "v131" => MarginTaxationSignMismatch,
            "v132" => TaxExemptTotalGreaterThanTotal,
            "v133" => TaxExemptTotalLessThanTotal,
            "v134" => TaxExemptTotalSignMismatch,
            "v135" => FeeTooLarge,
            "v136" => FeeTooSmall,
            "v137" => TotalAmountDiffersFromCalculated,
            "v139" => WireTotalAmountTooLarge,
            "v141" => SpecificPurposeNotEmpty,
            "v142" => NonzeroVat,
            "v143" => NonzeroVatExempt,
            "v144" => NonzeroMarginTaxation,
            "v145" => NonzeroTaxExemptTotal,
            "v148" => CashTotalAmountTooLarge,
            "v152" => LateInvoiceTwoDays,
            "v153" => LateInvoiceFiveDays,
            _ => Unknown,
        }
    }

    /// Catalog description of this code.
    pub fn description(&self) -> &'static str {
        use ResponseCode::*;
        match self {
            NoError => "The message is correct",
            InvalidXml => "The message does not conform to the XML schema",
            InvalidClientCertificate => {
                "The certificate was not issued by the FINA RDC CA, or has expired or been revoked"
            }
            WrongClientCertificateType => "The certificate does not carry the 'Fiskal' name",
            IncorrectDigitalSignature => "Incorrect digital signature",
            OibMismatch => "The OIB in the request differs from the OIB in the certificate",
            ServerError => "System error while processing the request",
            PaymentMethodChangeDateMismatch => {
                "The invoice issue date in the payment-method-change message is not today"
            }
            PaymentMethodChangeDataDiffers => {
                "Invoice data in the payment-method-change message differs from the registered invoice, or the invoice was never registered"
            }
            MessageDatetimeOutOfBounds => {
                "The message timestamp is more than 6 hours away from the time of receipt"
            }
            InvoiceDatetimeOutOfBounds => {
                "The invoice issue time is more than 6 hours after the time of receipt"
            }
            InvoiceIssuedAfterSending => "The invoice issue time is after the message timestamp",
            InvalidInvoiceSequenceNumber => "The invoice sequence number is 0",
            InvoiceSequenceNumberTooLarge => "The invoice sequence number has more than 6 digits",
            InvoiceVatRateUnknown => "The VAT rate is not from the allowed set",
            VatBaseGreaterThanTotal => "A VAT base exceeds a non-negative total",
            VatBaseLessThanTotal => "A VAT base is below a non-positive total",
            VatSignMismatch => "A VAT base differs in sign from the total",
            VatAmountLessThanCalculated => {
                "A VAT amount is more than 1 unit below the calculated value"
            }
            VatAmountGreaterThanCalculated => {
                "A VAT amount is more than 1 unit above the calculated value"
            }
            ConsumptionTaxRateNegative => "A consumption tax rate is below 0.00",
            ConsumptionTaxRateTooLarge => "A consumption tax rate is above 3.00",
            ConsumptionTaxBaseGreaterThanTotal => {
                "A consumption tax base exceeds a non-negative total"
            }
            ConsumptionTaxBaseLessThanTotal => {
                "A consumption tax base is below a non-positive total"
            }
            ConsumptionTaxSignMismatch => "A consumption tax base differs in sign from the total",
            ConsumptionTaxAmountLessThanCalculated => {
                "A consumption tax amount is more than 1 unit below the calculated value"
            }
            ConsumptionTaxAmountGreaterThanCalculated => {
                "A consumption tax amount is more than 1 unit above the calculated value"
            }
            OtherTaxIncluded => "The reserved 'other taxes' field is not 0.00",
            VatExemptAmountGreaterThanTotal => "The VAT-exempt amount exceeds a non-negative total",
            VatExemptAmountLessThanTotal => "The VAT-exempt amount is below a non-positive total",
            VatExemptSignMismatch => "The VAT-exempt amount differs in sign from the total",
            MarginTaxationAmountGreaterThanTotal => {
                "The margin-taxation amount exceeds a non-negative total"
            }
            MarginTaxationAmountLessThanTotal => {
                "The margin-taxation amount is below a non-positive total"
            }
            MarginTaxationSignMismatch => {
                "The margin-taxation amount differs in sign from the total"
            }
            TaxExemptTotalGreaterThanTotal => {
                "The tax-exempt total exceeds a non-negative total"
            }
            TaxExemptTotalLessThanTotal => "The tax-exempt total is below a non-positive total",
            TaxExemptTotalSignMismatch => "The tax-exempt total differs in sign from the total",
            FeeTooLarge => "A fee amount is above 1,000.00",
            FeeTooSmall => "A fee amount is below -1,000.00",
            TotalAmountDiffersFromCalculated => {
                "The invoice total does not match the control formula (tolerance 0.01)"
            }
            WireTotalAmountTooLarge => {
                "The total exceeds the limit for wire or other payment methods"
            }
            SpecificPurposeNotEmpty => "The 'specific purpose' field is reserved for future use",
            NonzeroVat => "VAT is present although the issuer is not VAT-registered",
            NonzeroVatExempt => {
                "A VAT-exempt amount is present although the issuer is not VAT-registered"
            }
            NonzeroMarginTaxation => {
                "A margin-taxation amount is present although the issuer is not VAT-registered"
            }
            NonzeroTaxExemptTotal => {
                "A tax-exempt total is present although the issuer is not VAT-registered"
            }
            CashTotalAmountTooLarge => {
                "The total exceeds the limit for cash, card or check payment methods"
            }
            LateInvoiceTwoDays => "The invoice issue time is between 2 and 5 days in the past",
            LateInvoiceFiveDays => "The invoice issue time is more than 5 days in the past",
            Unknown => "Unknown response code",
        }
    }
}

/// A single decoded service error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseErrorDetail {
    code: String,
    kind: ResponseCode,
    message: String,
}

impl ResponseErrorDetail {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        let code = code.into();
        let kind = ResponseCode::from_code(&code);
        Self {
            code,
            kind,
            message: message.into(),
        }
    }

    /// Raw wire code, e.g. `s005`.
    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn kind(&self) -> ResponseCode {
        self.kind
    }

    /// Message carried by the service response.
    pub fn message(&self) -> &str {
        &self.message
    }

    // Collects Greska entries below `root`, dropping the "no error" sentinel.
    fn collect(root: &Node, details: &mut Vec<ResponseErrorDetail>) {
        let mut current = root.get_first_child();
        while let Some(child) = current {
            current = child.get_next_sibling();
            if !child.is_element_node() {
                continue;
            }
            if child.get_name() == "Greska" {
                let code = child_text(&child, "SifraGreske").unwrap_or_default();
                let message = child_text(&child, "PorukaGreske").unwrap_or_default();
                let detail = ResponseErrorDetail::new(code, message);
                if detail.kind != ResponseCode::NoError {
                    details.push(detail);
                }
            } else {
                Self::collect(&child, details);
            }
        }
    }
}

impl fmt::Display for ResponseErrorDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// Aggregate service-level error: the decoded detail list under a generic
/// message. An empty list means the fault payload carried no recognizable
/// error details.
#[derive(Debug)]
pub struct ResponseError {
    message: &'static str,
    details: Vec<ResponseErrorDetail>,
}

impl ResponseError {
    pub fn new(details: Vec<ResponseErrorDetail>) -> Self {
        Self {
            message: "Service error",
            details,
        }
    }

    pub fn details(&self) -> &[ResponseErrorDetail] {
        &self.details
    }

    /// Decode a fault payload into structured details.
    ///
    /// Unparsable payloads and payloads without a recognizable body decode to
    /// an aggregate with an empty detail list; a parser failure never escapes
    /// this boundary.
    pub fn from_fault_payload(payload: &str) -> Self {
        let doc: Document = match Parser::default().parse_string(payload) {
            Ok(doc) => doc,
            Err(_) => return Self::new(vec![]),
        };
        let Some(body_content) = fault_body(&doc) else {
            return Self::new(vec![]);
        };

        let mut details = Vec::new();
        ResponseErrorDetail::collect(&body_content, &mut details);
        Self::new(details)
    }
}

impl fmt::Display for ResponseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let codes = self
            .details
            .iter()
            .map(|detail| detail.code())
            .collect::<Vec<_>>()
            .join(",");
        write!(f, "{}: {}", self.message, codes)
    }
}

impl std::error::Error for ResponseError {}

fn fault_body(doc: &Document) -> Option<Node> {
    let root = doc.get_root_element()?;
    let body = if root.get_name() == "Body" {
        root
    } else {
        find_descendant(&root, "Body")?
    };
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

fn child_text(node: &Node, name: &str) -> Option<String> {
    let mut current = node.get_first_child();
    while let Some(child) = current {
        if child.is_element_node() && child.get_name() == name {
            return Some(child.get_content().trim().to_string());
        }
        current = child.get_next_sibling();
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const FAULT: &str = r#"<soapenv:Envelope xmlns:soapenv="http://schemas.xmlsoap.org/soap/envelope/">
      <soapenv:Body>
        <soapenv:Fault>
          <faultcode>soapenv:Client</faultcode>
          <faultstring>Service error</faultstring>
          <detail>
            <tns:RacunOdgovor xmlns:tns="http://www.apis-it.hr/fin/2012/types/f73">
              <tns:Greske>
                <tns:Greska>
                  <tns:SifraGreske>s005</tns:SifraGreske>
                  <tns:PorukaGreske>text</tns:PorukaGreske>
                </tns:Greska>
                <tns:Greska>
                  <tns:SifraGreske>v114</tns:SifraGreske>
                  <tns:PorukaGreske>sign mismatch</tns:PorukaGreske>
                </tns:Greska>
              </tns:Greske>
            </tns:RacunOdgovor>
          </detail>
        </soapenv:Fault>
      </soapenv:Body>
    </soapenv:Envelope>"#;

    #[test]
    fn catalog_round_trips_known_codes() {
        assert_eq!(ResponseCode::from_code("s005"), ResponseCode::OibMismatch);
        assert_eq!(ResponseCode::from_code("v100"), ResponseCode::NoError);
        assert_eq!(ResponseCode::from_code("v153"), ResponseCode::LateInvoiceFiveDays);
        assert_eq!(ResponseCode::from_code("x999"), ResponseCode::Unknown);
    }

    #[test]
    fn detail_display_uses_raw_code() {
        let detail = ResponseErrorDetail::new("s005", "text");
        assert_eq!(detail.kind(), ResponseCode::OibMismatch);
        assert_eq!(detail.to_string(), "s005: text");
    }

    #[test]
    fn unknown_code_is_kept_with_placeholder_kind() {
        let detail = ResponseErrorDetail::new("z042", "novel failure");
        assert_eq!(detail.kind(), ResponseCode::Unknown);
        assert_eq!(detail.kind().description(), "Unknown response code");
        assert_eq!(detail.to_string(), "z042: novel failure");
    }

    #[test]
    fn fault_payload_decodes_error_list() {
        let error = ResponseError::from_fault_payload(FAULT);
        assert_eq!(error.details().len(), 2);
        assert_eq!(error.details()[0].code(), "s005");
        assert_eq!(error.details()[0].message(), "text");
        assert_eq!(error.details()[1].kind(), ResponseCode::VatSignMismatch);
        assert_eq!(error.to_string(), "Service error: s005,v114");
    }

    #[test]
    fn no_error_sentinel_is_filtered() {
        let payload = FAULT.replace("s005", "v100");
        let error = ResponseError::from_fault_payload(&payload);
        assert_eq!(error.details().len(), 1);
        assert_eq!(error.details()[0].code(), "v114");
    }

    #[test]
    fn sentinel_only_fault_decodes_to_empty_list() {
        let payload = r#"<e:Envelope xmlns:e="http://schemas.xmlsoap.org/soap/envelope/"><e:Body><e:Fault><detail><Odgovor><Greske><Greska><SifraGreske>v100</SifraGreske><PorukaGreske>ok</PorukaGreske></Greska></Greske></Odgovor></detail></e:Fault></e:Body></e:Envelope>"#;
        let error = ResponseError::from_fault_payload(payload);
        assert!(error.details().is_empty());
    }

    #[test]
    fn malformed_payload_decodes_to_empty_list() {
        let error = ResponseError::from_fault_payload("<not-xml");
        assert!(error.details().is_empty());
        assert_eq!(error.to_string(), "Service error: ");

        let error = ResponseError::from_fault_payload("<Envelope/>");
        assert!(error.details().is_empty());
    }
}
