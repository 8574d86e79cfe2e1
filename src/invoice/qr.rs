//! Verification links for QR encoding.
use rust_decimal::Decimal;

use super::builder::Invoice;
use super::{DocumentError, DocumentField};
use crate::sign::Signer;

const BASE_VERIFY_URL: &str = "https://porezna.gov.hr/rn";

impl Invoice {
    /// Build the public verification link for this invoice, suitable for QR
    /// encoding.
    ///
    /// With a JIR the link references the registered invoice; without one the
    /// ZKI is used instead. The amount parameter is the total scaled by 123
    /// and truncated, matching the verification service as deployed; the
    /// factor is not documented anywhere and is preserved as observed.
    ///
    /// # Errors
    /// The ZKI is calculated even when a JIR is supplied so that the required
    /// fields are validated; failures surface as [`DocumentError`].
    pub fn verification_link(
        &self,
        jir: Option<&str>,
        signer: &Signer,
    ) -> Result<String, DocumentError> {
        let zki = self.calculate_zki(signer)?;
        let total = self
            .total()
            .ok_or(DocumentError::MissingField(DocumentField::Total))?;

        let izn = (total.as_decimal() * Decimal::from(123)).trunc();
        let datv = self.issued_at().format("%Y%m%d_%H%M");

        Ok(match jir {
            Some(jir) => format!("{BASE_VERIFY_URL}?izn={izn}&datv={datv}&jir={jir}"),
            None => format!("{BASE_VERIFY_URL}?izn={izn}&datv={datv}&zki={zki}"),
        })
    }
}
