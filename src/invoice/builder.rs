//! Fiscal document variants and their wire-shape construction.
//!
//! Documents are plain structs with a fixed, enumerated field set. Every
//! field is independently settable, readable and resettable to its documented
//! default; requiredness is enforced when the wire shape is built, before any
//! network call.
use chrono::{Local, NaiveDateTime};

use super::xml;
use super::zki::Zki;
use super::{
    wire_datetime, Amount, DocumentError, DocumentField, Fee, InvoiceNumber, Oib, PaymentMethod,
    SequenceScope, TaxItem, ValidationError,
};
use crate::sign::Signer;

/// Fields shared by every document variant.
#[derive(Debug, Clone)]
pub(crate) struct DocumentCore {
    pub(crate) oib: Option<Oib>,
    pub(crate) issued_at: NaiveDateTime,
    pub(crate) invoice_number: Option<InvoiceNumber>,
    pub(crate) total: Option<Amount>,
    pub(crate) late_registration: bool,
}

impl Default for DocumentCore {
    fn default() -> Self {
        Self {
            oib: None,
            issued_at: Local::now().naive_local(),
            invoice_number: None,
            total: None,
            late_registration: false,
        }
    }
}

impl DocumentCore {
    fn require(&self) -> Result<(&Oib, &InvoiceNumber, Amount), DocumentError> {
        let number = self
            .invoice_number
            .as_ref()
            .ok_or(DocumentError::MissingField(DocumentField::InvoiceNumber))?;
        let oib = self
            .oib
            .as_ref()
            .ok_or(DocumentError::MissingField(DocumentField::Oib))?;
        let total = self
            .total
            .ok_or(DocumentError::MissingField(DocumentField::Total))?;
        Ok((oib, number, total))
    }

    fn calculate_zki(&self, signer: &Signer) -> Result<Zki, DocumentError> {
        let (oib, number, total) = self.require()?;
        Ok(Zki::calculate(oib, self.issued_at, number, total, signer)?)
    }
}

/// Invoice data for the submit, check and payment-method-change operations.
///
/// # Examples
/// ```rust
/// use fiskal_core::invoice::{Invoice, Oib, InvoiceNumber};
///
/// let mut invoice = Invoice::new();
/// invoice.set_oib(Oib::parse("12312312316")?);
/// invoice.set_invoice_number(InvoiceNumber::parse("1/X/1")?);
/// invoice.set_total("100.00".parse()?);
/// # Ok::<(), fiskal_core::invoice::ValidationError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Invoice {
    core: DocumentCore,
    vat: Option<Vec<TaxItem>>,
    consumption_tax: Option<Vec<TaxItem>>,
    fees: Option<Vec<Fee>>,
    vat_registered: bool,
    sequence_scope: SequenceScope,
    vat_exempt: Option<Amount>,
    margin_taxation: Option<Amount>,
    tax_exempt_total: Option<Amount>,
    payment_method: PaymentMethod,
    operator_oib: Option<Oib>,
    paragon_number: Option<String>,
}

impl Invoice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issuer OIB; must match the OIB the signing certificate is issued to.
    /// Required.
    pub fn oib(&self) -> Option<&Oib> {
        self.core.oib.as_ref()
    }

    pub fn set_oib(&mut self, oib: Oib) {
        self.core.oib = Some(oib);
    }

    pub fn clear_oib(&mut self) {
        self.core.oib = None;
    }

    /// Issue date and time. Defaults to the current local time.
    pub fn issued_at(&self) -> NaiveDateTime {
        self.core.issued_at
    }

    pub fn set_issued_at(&mut self, at: NaiveDateTime) {
        self.core.issued_at = at;
    }

    pub fn reset_issued_at(&mut self) {
        self.core.issued_at = Local::now().naive_local();
    }

    /// Invoice number. Required.
    pub fn invoice_number(&self) -> Option<&InvoiceNumber> {
        self.core.invoice_number.as_ref()
    }

    pub fn set_invoice_number(&mut self, number: InvoiceNumber) {
        self.core.invoice_number = Some(number);
    }

    pub fn clear_invoice_number(&mut self) {
        self.core.invoice_number = None;
    }

    /// Total amount shown on the invoice. Required.
    pub fn total(&self) -> Option<Amount> {
        self.core.total
    }

    pub fn set_total(&mut self, total: Amount) {
        self.core.total = Some(total);
    }

    pub fn clear_total(&mut self) {
        self.core.total = None;
    }

    /// Late-registration marker. Defaults to `false`.
    pub fn is_late_registration(&self) -> bool {
        self.core.late_registration
    }

    pub fn set_late_registration(&mut self, late: bool) {
        self.core.late_registration = late;
    }

    pub fn clear_late_registration(&mut self) {
        self.core.late_registration = false;
    }

    /// VAT lines. Set only when the invoice carries VAT.
    pub fn vat(&self) -> Option<&[TaxItem]> {
        self.vat.as_deref()
    }

    /// # Errors
    /// Rejects an empty list; absent VAT is expressed by [`Invoice::clear_vat`].
    pub fn set_vat(&mut self, items: Vec<TaxItem>) -> Result<(), ValidationError> {
        if items.is_empty() {
            return Err(ValidationError::EmptyItemList { list: "VAT" });
        }
        self.vat = Some(items);
        Ok(())
    }

    pub fn clear_vat(&mut self) {
        self.vat = None;
    }

    /// Consumption tax lines. Set only when the invoice carries the tax.
    pub fn consumption_tax(&self) -> Option<&[TaxItem]> {
        self.consumption_tax.as_deref()
    }

    /// # Errors
    /// Rejects an empty list.
    pub fn set_consumption_tax(&mut self, items: Vec<TaxItem>) -> Result<(), ValidationError> {
        if items.is_empty() {
            return Err(ValidationError::EmptyItemList {
                list: "consumption tax",
            });
        }
        self.consumption_tax = Some(items);
        Ok(())
    }

    pub fn clear_consumption_tax(&mut self) {
        self.consumption_tax = None;
    }

    /// Fees. Set only when the invoice carries special fees.
    pub fn fees(&self) -> Option<&[Fee]> {
        self.fees.as_deref()
    }

    /// # Errors
    /// Rejects an empty list.
    pub fn set_fees(&mut self, fees: Vec<Fee>) -> Result<(), ValidationError> {
        if fees.is_empty() {
            return Err(ValidationError::EmptyItemList { list: "fees" });
        }
        self.fees = Some(fees);
        Ok(())
    }

    pub fn clear_fees(&mut self) {
        self.fees = None;
    }

    /// VAT registration marker. Defaults to `false`.
    pub fn is_vat_registered(&self) -> bool {
        self.vat_registered
    }

    pub fn set_vat_registered(&mut self, registered: bool) {
        self.vat_registered = registered;
    }

    pub fn clear_vat_registered(&mut self) {
        self.vat_registered = false;
    }

    /// Sequencing scope. Defaults to per-location.
    pub fn sequence_scope(&self) -> SequenceScope {
        self.sequence_scope
    }

    pub fn set_sequence_scope(&mut self, scope: SequenceScope) {
        self.sequence_scope = scope;
    }

    pub fn clear_sequence_scope(&mut self) {
        self.sequence_scope = SequenceScope::default();
    }

    /// VAT-exempt amount, when part of the total is exempt.
    pub fn vat_exempt(&self) -> Option<Amount> {
        self.vat_exempt
    }

    pub fn set_vat_exempt(&mut self, amount: Amount) {
        self.vat_exempt = Some(amount);
    }

    pub fn clear_vat_exempt(&mut self) {
        self.vat_exempt = None;
    }

    /// Amount under the special margin-taxation scheme.
    pub fn margin_taxation(&self) -> Option<Amount> {
        self.margin_taxation
    }

    pub fn set_margin_taxation(&mut self, amount: Amount) {
        self.margin_taxation = Some(amount);
    }

    pub fn clear_margin_taxation(&mut self) {
        self.margin_taxation = None;
    }

    /// Amount not subject to taxation.
    pub fn tax_exempt_total(&self) -> Option<Amount> {
        self.tax_exempt_total
    }

    pub fn set_tax_exempt_total(&mut self, amount: Amount) {
        self.tax_exempt_total = Some(amount);
    }

    pub fn clear_tax_exempt_total(&mut self) {
        self.tax_exempt_total = None;
    }

    /// Payment method. Defaults to [`PaymentMethod::Other`].
    pub fn payment_method(&self) -> PaymentMethod {
        self.payment_method
    }

    pub fn set_payment_method(&mut self, method: PaymentMethod) {
        self.payment_method = method;
    }

    pub fn clear_payment_method(&mut self) {
        self.payment_method = PaymentMethod::default();
    }

    /// Operator OIB at the charging device. Defaults to the issuer OIB.
    pub fn operator_oib(&self) -> Option<&Oib> {
        self.operator_oib.as_ref().or(self.core.oib.as_ref())
    }

    pub fn set_operator_oib(&mut self, oib: Oib) {
        self.operator_oib = Some(oib);
    }

    pub fn clear_operator_oib(&mut self) {
        self.operator_oib = None;
    }

    /// Paragon invoice marker, for late registration of manually issued
    /// invoices.
    pub fn paragon_number(&self) -> Option<&str> {
        self.paragon_number.as_deref()
    }

    pub fn set_paragon_number(&mut self, number: impl Into<String>) {
        self.paragon_number = Some(number.into());
    }

    pub fn clear_paragon_number(&mut self) {
        self.paragon_number = None;
    }

    /// Fields that must be set before the wire shape can be built.
    pub fn required_fields(&self) -> &'static [DocumentField] {
        &[
            DocumentField::Oib,
            DocumentField::InvoiceNumber,
            DocumentField::Total,
        ]
    }

    /// Calculate the ZKI for this invoice, verifying the required fields are
    /// present.
    ///
    /// # Errors
    /// Returns [`DocumentError::MissingField`] for absent required fields and
    /// propagates signing failures.
    pub fn calculate_zki(&self, signer: &Signer) -> Result<Zki, DocumentError> {
        self.core.calculate_zki(signer)
    }

    /// Build the wire shape, computing the ZKI as a side effect.
    ///
    /// # Errors
    /// As [`Invoice::calculate_zki`].
    pub fn to_wire_object(&self, signer: &Signer) -> Result<xml::Racun, DocumentError> {
        let zki = self.core.calculate_zki(signer)?;
        self.wire_with_zki(zki)
    }

    /// Render the wire shape as JSON, e.g. for audit logging.
    ///
    /// # Errors
    /// As [`Invoice::to_wire_object`].
    pub fn to_json(&self, signer: &Signer) -> Result<serde_json::Value, DocumentError> {
        Ok(serde_json::to_value(self.to_wire_object(signer)?)?)
    }

    pub(crate) fn wire_with_zki(&self, zki: Zki) -> Result<xml::Racun, DocumentError> {
        let (oib, number, total) = self.core.require()?;
        Ok(xml::Racun {
            oib: oib.to_string(),
            u_sust_pdv: self.vat_registered,
            dat_vrijeme: wire_datetime(self.core.issued_at),
            ozn_slijed: self.sequence_scope.as_str(),
            br_rac: xml::BrojRacuna {
                br_ozn_rac: number.sequence_number(),
                ozn_pos_pr: number.location_code().to_string(),
                ozn_nap_ur: number.device_number(),
            },
            pdv: self.vat.as_deref().map(tax_lines),
            pnp: self.consumption_tax.as_deref().map(tax_lines),
            ostali_por: String::new(),
            iznos_oslob_pdv: self.vat_exempt,
            iznos_marza: self.margin_taxation,
            iznos_ne_podl_opor: self.tax_exempt_total,
            naknade: self.fees.as_deref().map(fee_lines),
            iznos_ukupno: total,
            nacin_plac: self.payment_method.as_str(),
            oib_oper: self.operator_oib().map(|oib| oib.to_string()),
            zast_kod: zki.to_string(),
            nak_dost: self.core.late_registration,
            paragon_br_rac: self.paragon_number.clone(),
            spec_namj: String::new(),
            prateci_dokument: None,
            promijenjeni_nacin_plac: None,
        })
    }
}

/// Invoice referencing a previously registered supporting document.
///
/// Exactly one of the document JIR or the document ZKI must be set before
/// serialization.
#[derive(Debug, Clone, Default)]
pub struct InvoiceWithDoc {
    invoice: Invoice,
    document_jir: Option<String>,
    document_zki: Option<Zki>,
}

impl InvoiceWithDoc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_invoice(invoice: Invoice) -> Self {
        Self {
            invoice,
            document_jir: None,
            document_zki: None,
        }
    }

    pub fn invoice(&self) -> &Invoice {
        &self.invoice
    }

    pub fn invoice_mut(&mut self) -> &mut Invoice {
        &mut self.invoice
    }

    /// JIR of the supporting document, when it was registered online.
    pub fn document_jir(&self) -> Option<&str> {
        self.document_jir.as_deref()
    }

    pub fn set_document_jir(&mut self, jir: impl Into<String>) {
        self.document_jir = Some(jir.into());
    }

    pub fn clear_document_jir(&mut self) {
        self.document_jir = None;
    }

    /// ZKI of the supporting document, when no JIR exists.
    pub fn document_zki(&self) -> Option<&Zki> {
        self.document_zki.as_ref()
    }

    pub fn set_document_zki(&mut self, zki: Zki) {
        self.document_zki = Some(zki);
    }

    pub fn clear_document_zki(&mut self) {
        self.document_zki = None;
    }

    pub fn required_fields(&self) -> &'static [DocumentField] {
        &[
            DocumentField::Oib,
            DocumentField::InvoiceNumber,
            DocumentField::Total,
            DocumentField::DocumentReference,
        ]
    }

    /// Build the wire shape, computing the invoice ZKI as a side effect.
    ///
    /// # Errors
    /// Returns [`DocumentError::AmbiguousDocumentReference`] unless exactly
    /// one of the document JIR and document ZKI is set, otherwise as
    /// [`Invoice::to_wire_object`].
    pub fn to_wire_object(&self, signer: &Signer) -> Result<xml::Racun, DocumentError> {
        let reference = self.document_reference()?;
        let mut racun = self.invoice.to_wire_object(signer)?;
        racun.prateci_dokument = Some(reference);
        Ok(racun)
    }

    /// Render the wire shape as JSON.
    ///
    /// # Errors
    /// As [`InvoiceWithDoc::to_wire_object`].
    pub fn to_json(&self, signer: &Signer) -> Result<serde_json::Value, DocumentError> {
        Ok(serde_json::to_value(self.to_wire_object(signer)?)?)
    }

    fn document_reference(&self) -> Result<xml::PrateciDokumentRef, DocumentError> {
        match (&self.document_jir, &self.document_zki) {
            (Some(jir), None) => Ok(xml::PrateciDokumentRef {
                jir_pd: Some(jir.clone()),
                zast_kod_pd: None,
            }),
            (None, Some(zki)) => Ok(xml::PrateciDokumentRef {
                jir_pd: None,
                zast_kod_pd: Some(zki.to_string()),
            }),
            _ => Err(DocumentError::AmbiguousDocumentReference),
        }
    }
}

/// Original invoice data for the payment-method-change operation.
///
/// Carries the ZKI of the registered invoice, which is supplied by the caller
/// and never recomputed, plus the new payment method.
#[derive(Debug, Clone, Default)]
pub struct InvoicePaymentMethodChange {
    invoice: Invoice,
    original_zki: Option<Zki>,
    new_payment_method: Option<PaymentMethod>,
}

impl InvoicePaymentMethodChange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_invoice(invoice: Invoice) -> Self {
        Self {
            invoice,
            original_zki: None,
            new_payment_method: None,
        }
    }

    pub fn invoice(&self) -> &Invoice {
        &self.invoice
    }

    pub fn invoice_mut(&mut self) -> &mut Invoice {
        &mut self.invoice
    }

    /// ZKI of the registered invoice. Required.
    pub fn original_zki(&self) -> Option<&Zki> {
        self.original_zki.as_ref()
    }

    pub fn set_original_zki(&mut self, zki: Zki) {
        self.original_zki = Some(zki);
    }

    pub fn clear_original_zki(&mut self) {
        self.original_zki = None;
    }

    /// New payment method; must differ from the invoice's current one.
    /// Required.
    pub fn new_payment_method(&self) -> Option<PaymentMethod> {
        self.new_payment_method
    }

    pub fn set_new_payment_method(&mut self, method: PaymentMethod) {
        self.new_payment_method = Some(method);
    }

    pub fn clear_new_payment_method(&mut self) {
        self.new_payment_method = None;
    }

    pub fn required_fields(&self) -> &'static [DocumentField] {
        &[
            DocumentField::Oib,
            DocumentField::InvoiceNumber,
            DocumentField::Total,
            DocumentField::OriginalZki,
            DocumentField::NewPaymentMethod,
        ]
    }

    /// Build the wire shape, reusing the supplied original ZKI. Presence of
    /// the base fields is still validated; no signing takes place.
    ///
    /// # Errors
    /// Returns [`DocumentError::MissingField`] when the original ZKI, the new
    /// payment method or a base field is absent, and
    /// [`DocumentError::PaymentMethodUnchanged`] when the new method equals
    /// the current one.
    pub fn to_wire_object(&self) -> Result<xml::Racun, DocumentError> {
        let original = self
            .original_zki
            .clone()
            .ok_or(DocumentError::MissingField(DocumentField::OriginalZki))?;
        let new_method = self
            .new_payment_method
            .ok_or(DocumentError::MissingField(DocumentField::NewPaymentMethod))?;
        if new_method == self.invoice.payment_method() {
            return Err(DocumentError::PaymentMethodUnchanged);
        }

        let mut racun = self.invoice.wire_with_zki(original)?;
        racun.promijenjeni_nacin_plac = Some(new_method.as_str());
        Ok(racun)
    }

    /// Render the wire shape as JSON.
    ///
    /// # Errors
    /// As [`InvoicePaymentMethodChange::to_wire_object`].
    pub fn to_json(&self) -> Result<serde_json::Value, DocumentError> {
        Ok(serde_json::to_value(self.to_wire_object()?)?)
    }
}

/// Prateći dokument: the minimal sibling of [`Invoice`] carrying only the
/// shared base fields.
#[derive(Debug, Clone, Default)]
pub struct SupportingDocument {
    core: DocumentCore,
}

impl SupportingDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issuer OIB. Required.
    pub fn oib(&self) -> Option<&Oib> {
        self.core.oib.as_ref()
    }

    pub fn set_oib(&mut self, oib: Oib) {
        self.core.oib = Some(oib);
    }

    pub fn clear_oib(&mut self) {
        self.core.oib = None;
    }

    /// Issue date and time. Defaults to the current local time.
    pub fn issued_at(&self) -> NaiveDateTime {
        self.core.issued_at
    }

    pub fn set_issued_at(&mut self, at: NaiveDateTime) {
        self.core.issued_at = at;
    }

    pub fn reset_issued_at(&mut self) {
        self.core.issued_at = Local::now().naive_local();
    }

    /// Document number. Required.
    pub fn invoice_number(&self) -> Option<&InvoiceNumber> {
        self.core.invoice_number.as_ref()
    }

    pub fn set_invoice_number(&mut self, number: InvoiceNumber) {
        self.core.invoice_number = Some(number);
    }

    pub fn clear_invoice_number(&mut self) {
        self.core.invoice_number = None;
    }

    /// Total amount. Required.
    pub fn total(&self) -> Option<Amount> {
        self.core.total
    }

    pub fn set_total(&mut self, total: Amount) {
        self.core.total = Some(total);
    }

    pub fn clear_total(&mut self) {
        self.core.total = None;
    }

    /// Late-registration marker. Defaults to `false`.
    pub fn is_late_registration(&self) -> bool {
        self.core.late_registration
    }

    pub fn set_late_registration(&mut self, late: bool) {
        self.core.late_registration = late;
    }

    pub fn clear_late_registration(&mut self) {
        self.core.late_registration = false;
    }

    pub fn required_fields(&self) -> &'static [DocumentField] {
        &[
            DocumentField::Oib,
            DocumentField::InvoiceNumber,
            DocumentField::Total,
        ]
    }

    /// Calculate the ZKI for this document.
    ///
    /// # Errors
    /// As [`Invoice::calculate_zki`].
    pub fn calculate_zki(&self, signer: &Signer) -> Result<Zki, DocumentError> {
        self.core.calculate_zki(signer)
    }

    /// Build the wire shape, computing the ZKI as a side effect.
    ///
    /// # Errors
    /// As [`Invoice::to_wire_object`].
    pub fn to_wire_object(&self, signer: &Signer) -> Result<xml::PrateciDokument, DocumentError> {
        let zki = self.core.calculate_zki(signer)?;
        let (oib, number, total) = self.core.require()?;
        Ok(xml::PrateciDokument {
            oib: oib.to_string(),
            dat_vrijeme: wire_datetime(self.core.issued_at),
            br_prateceg_dokumenta: xml::BrojPD {
                br_ozn_pd: number.sequence_number(),
                ozn_pos_pr: number.location_code().to_string(),
                ozn_nap_ur: number.device_number(),
            },
            iznos_ukupno: total,
            zast_kod_pd: zki.to_string(),
            nak_dost: self.core.late_registration,
        })
    }

    /// Render the wire shape as JSON.
    ///
    /// # Errors
    /// As [`SupportingDocument::to_wire_object`].
    pub fn to_json(&self, signer: &Signer) -> Result<serde_json::Value, DocumentError> {
        Ok(serde_json::to_value(self.to_wire_object(signer)?)?)
    }
}

fn tax_lines(items: &[TaxItem]) -> xml::Porezi {
    xml::Porezi {
        porez: items
            .iter()
            .map(|item| xml::Porez {
                stopa: item.rate(),
                osnovica: item.base(),
                iznos: item.amount(),
            })
            .collect(),
    }
}

fn fee_lines(fees: &[Fee]) -> xml::Naknade {
    xml::Naknade {
        naknada: fees
            .iter()
            .map(|fee| xml::Naknada {
                naziv_n: fee.name().to_string(),
                iznos_n: fee.amount(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_datetime() -> NaiveDateTime {
        chrono::NaiveDate::from_ymd_opt(2022, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn populated_invoice() -> Invoice {
        let mut invoice = Invoice::new();
        invoice.set_oib(Oib::parse("12312312316").unwrap());
        invoice.set_invoice_number(InvoiceNumber::parse("1/X/1").unwrap());
        invoice.set_total(Amount::from(100));
        invoice.set_issued_at(fixed_datetime());
        invoice
    }

    #[test]
    fn defaults_match_documentation() {
        let invoice = Invoice::new();
        assert!(invoice.oib().is_none());
        assert!(invoice.invoice_number().is_none());
        assert!(invoice.total().is_none());
        assert!(!invoice.is_late_registration());
        assert!(!invoice.is_vat_registered());
        assert_eq!(invoice.sequence_scope(), SequenceScope::Location);
        assert_eq!(invoice.payment_method(), PaymentMethod::Other);
        assert!(invoice.vat().is_none());
        assert!(invoice.paragon_number().is_none());
    }

    #[test]
    fn fields_reset_to_defaults() {
        let mut invoice = populated_invoice();
        invoice.set_payment_method(PaymentMethod::Card);
        invoice.set_sequence_scope(SequenceScope::Device);
        invoice.set_late_registration(true);

        invoice.clear_payment_method();
        invoice.clear_sequence_scope();
        invoice.clear_late_registration();
        invoice.clear_total();

        assert_eq!(invoice.payment_method(), PaymentMethod::Other);
        assert_eq!(invoice.sequence_scope(), SequenceScope::Location);
        assert!(!invoice.is_late_registration());
        assert!(invoice.total().is_none());

        invoice.reset_issued_at();
        assert_ne!(invoice.issued_at(), fixed_datetime());
    }

    #[test]
    fn empty_item_lists_are_rejected() {
        let mut invoice = Invoice::new();
        assert!(matches!(
            invoice.set_vat(vec![]),
            Err(ValidationError::EmptyItemList { list: "VAT" })
        ));
        assert!(invoice.set_consumption_tax(vec![]).is_err());
        assert!(invoice.set_fees(vec![]).is_err());

        invoice
            .set_vat(vec![TaxItem::new(100, 25, 25).unwrap()])
            .expect("non-empty list");
        assert_eq!(invoice.vat().unwrap().len(), 1);
        invoice.clear_vat();
        assert!(invoice.vat().is_none());
    }

    #[test]
    fn operator_oib_falls_back_to_issuer() {
        let mut invoice = populated_invoice();
        assert_eq!(invoice.operator_oib().unwrap().as_str(), "12312312316");

        invoice.set_operator_oib(Oib::parse("96745903992").unwrap());
        assert_eq!(invoice.operator_oib().unwrap().as_str(), "96745903992");

        invoice.clear_operator_oib();
        assert_eq!(invoice.operator_oib().unwrap().as_str(), "12312312316");
    }

    #[test]
    fn required_field_sets_per_variant() {
        assert_eq!(Invoice::new().required_fields().len(), 3);
        assert!(InvoiceWithDoc::new()
            .required_fields()
            .contains(&DocumentField::DocumentReference));
        let change = InvoicePaymentMethodChange::new();
        assert!(change.required_fields().contains(&DocumentField::OriginalZki));
        assert!(change
            .required_fields()
            .contains(&DocumentField::NewPaymentMethod));
        assert_eq!(SupportingDocument::new().required_fields().len(), 3);
    }

    #[test]
    fn payment_method_change_requires_zki_and_method() {
        let mut change = InvoicePaymentMethodChange::from_invoice(populated_invoice());
        assert!(matches!(
            change.to_wire_object(),
            Err(DocumentError::MissingField(DocumentField::OriginalZki))
        ));

        change.set_original_zki(Zki::new("ab".repeat(16)).unwrap());
        assert!(matches!(
            change.to_wire_object(),
            Err(DocumentError::MissingField(DocumentField::NewPaymentMethod))
        ));
    }

    #[test]
    fn payment_method_change_rejects_same_method() {
        let mut change = InvoicePaymentMethodChange::from_invoice(populated_invoice());
        change.set_original_zki(Zki::new("ab".repeat(16)).unwrap());
        change.set_new_payment_method(PaymentMethod::Other);
        assert!(matches!(
            change.to_wire_object(),
            Err(DocumentError::PaymentMethodUnchanged)
        ));
    }

    #[test]
    fn payment_method_change_reuses_original_zki() {
        let mut change = InvoicePaymentMethodChange::from_invoice(populated_invoice());
        let original = Zki::new("ab".repeat(16)).unwrap();
        change.set_original_zki(original.clone());
        change.set_new_payment_method(PaymentMethod::Card);

        let racun = change.to_wire_object().expect("wire object");
        assert_eq!(racun.zast_kod, original.to_string());
        assert_eq!(racun.promijenjeni_nacin_plac, Some("K"));
        assert_eq!(racun.nacin_plac, "O");
    }

    #[test]
    fn payment_method_change_validates_base_fields() {
        let mut change = InvoicePaymentMethodChange::new();
        change.set_original_zki(Zki::new("ab".repeat(16)).unwrap());
        change.set_new_payment_method(PaymentMethod::Card);
        assert!(matches!(
            change.to_wire_object(),
            Err(DocumentError::MissingField(DocumentField::InvoiceNumber))
        ));
    }
}
