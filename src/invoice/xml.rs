//! Wire shapes for the fiscalization service.
//!
//! The shapes mirror the service schema field for field; they carry data and
//! ordering only, all invariants live on the domain types. Elements are
//! namespace-qualified through a default namespace declaration on each
//! request element, which keeps the signed subtree self-contained.
use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

use super::{wire_datetime, Amount};

/// Application namespace of the fiscalization service.
pub const TNS: &str = "http://www.apis-it.hr/fin/2012/types/f73";

/// Serialize a wire shape to its XML element form.
///
/// # Errors
/// Returns the underlying serializer error; with the shapes in this module
/// this only occurs on formatter failures.
pub fn to_xml<T: Serialize>(value: &T) -> Result<String, quick_xml::se::SeError> {
    quick_xml::se::to_string(value)
}

/// Request header: unique message id and message timestamp.
#[derive(Debug, Clone, Serialize)]
pub struct Zaglavlje {
    #[serde(rename = "IdPoruke")]
    pub(crate) id_poruke: String,
    #[serde(rename = "DatumVrijeme")]
    pub(crate) datum_vrijeme: String,
}

impl Zaglavlje {
    pub(crate) fn new(message_id: Uuid, at: NaiveDateTime) -> Self {
        Self {
            id_poruke: message_id.to_string(),
            datum_vrijeme: wire_datetime(at),
        }
    }

    pub fn message_id(&self) -> &str {
        &self.id_poruke
    }

    pub fn timestamp(&self) -> &str {
        &self.datum_vrijeme
    }
}

/// Invoice number triple.
#[derive(Debug, Clone, Serialize)]
pub struct BrojRacuna {
    #[serde(rename = "BrOznRac")]
    pub(crate) br_ozn_rac: u64,
    #[serde(rename = "OznPosPr")]
    pub(crate) ozn_pos_pr: String,
    #[serde(rename = "OznNapUr")]
    pub(crate) ozn_nap_ur: u64,
}

/// Single tax line.
#[derive(Debug, Clone, Serialize)]
pub struct Porez {
    #[serde(rename = "Stopa")]
    pub(crate) stopa: Amount,
    #[serde(rename = "Osnovica")]
    pub(crate) osnovica: Amount,
    #[serde(rename = "Iznos")]
    pub(crate) iznos: Amount,
}

/// Tax line list wrapper.
#[derive(Debug, Clone, Serialize)]
pub struct Porezi {
    #[serde(rename = "Porez")]
    pub(crate) porez: Vec<Porez>,
}

/// Single fee entry.
#[derive(Debug, Clone, Serialize)]
pub struct Naknada {
    #[serde(rename = "NazivN")]
    pub(crate) naziv_n: String,
    #[serde(rename = "IznosN")]
    pub(crate) iznos_n: Amount,
}

/// Fee list wrapper.
#[derive(Debug, Clone, Serialize)]
pub struct Naknade {
    #[serde(rename = "Naknada")]
    pub(crate) naknada: Vec<Naknada>,
}

/// Reference to a previously registered supporting document: exactly one of
/// its JIR or its ZKI.
#[derive(Debug, Clone, Serialize)]
pub struct PrateciDokumentRef {
    #[serde(rename = "JirPD", skip_serializing_if = "Option::is_none")]
    pub jir_pd: Option<String>,
    #[serde(rename = "ZastKodPD", skip_serializing_if = "Option::is_none")]
    pub zast_kod_pd: Option<String>,
}

/// Invoice body shared by the submit, check and payment-method-change
/// operations. `OstaliPor` and `SpecNamj` are reserved by the protocol and
/// always emitted empty.
#[derive(Debug, Clone, Serialize)]
pub struct Racun {
    #[serde(rename = "Oib")]
    pub(crate) oib: String,
    #[serde(rename = "USustPdv")]
    pub(crate) u_sust_pdv: bool,
    #[serde(rename = "DatVrijeme")]
    pub(crate) dat_vrijeme: String,
    #[serde(rename = "OznSlijed")]
    pub(crate) ozn_slijed: &'static str,
    #[serde(rename = "BrRac")]
    pub(crate) br_rac: BrojRacuna,
    #[serde(rename = "Pdv", skip_serializing_if = "Option::is_none")]
    pub(crate) pdv: Option<Porezi>,
    #[serde(rename = "Pnp", skip_serializing_if = "Option::is_none")]
    pub(crate) pnp: Option<Porezi>,
    #[serde(rename = "OstaliPor")]
    pub(crate) ostali_por: String,
    #[serde(rename = "IznosOslobPdv", skip_serializing_if = "Option::is_none")]
    pub(crate) iznos_oslob_pdv: Option<Amount>,
    #[serde(rename = "IznosMarza", skip_serializing_if = "Option::is_none")]
    pub(crate) iznos_marza: Option<Amount>,
    #[serde(rename = "IznosNePodlOpor", skip_serializing_if = "Option::is_none")]
    pub(crate) iznos_ne_podl_opor: Option<Amount>,
    #[serde(rename = "Naknade", skip_serializing_if = "Option::is_none")]
    pub(crate) naknade: Option<Naknade>,
    #[serde(rename = "IznosUkupno")]
    pub(crate) iznos_ukupno: Amount,
    #[serde(rename = "NacinPlac")]
    pub(crate) nacin_plac: &'static str,
    #[serde(rename = "OibOper", skip_serializing_if = "Option::is_none")]
    pub oib_oper: Option<String>,
    #[serde(rename = "ZastKod")]
    pub zast_kod: String,
    #[serde(rename = "NakDost")]
    pub(crate) nak_dost: bool,
    #[serde(rename = "ParagonBrRac", skip_serializing_if = "Option::is_none")]
    pub(crate) paragon_br_rac: Option<String>,
    #[serde(rename = "SpecNamj")]
    pub(crate) spec_namj: String,
    #[serde(rename = "PrateciDokument", skip_serializing_if = "Option::is_none")]
    pub prateci_dokument: Option<PrateciDokumentRef>,
    #[serde(rename = "PromijenjeniNacinPlac", skip_serializing_if = "Option::is_none")]
    pub(crate) promijenjeni_nacin_plac: Option<&'static str>,
}

/// Supporting document number triple.
#[derive(Debug, Clone, Serialize)]
pub struct BrojPD {
    #[serde(rename = "BrOznPD")]
    pub br_ozn_pd: u64,
    #[serde(rename = "OznPosPr")]
    pub ozn_pos_pr: String,
    #[serde(rename = "OznNapUr")]
    pub ozn_nap_ur: u64,
}

/// Supporting document body.
#[derive(Debug, Clone, Serialize)]
pub struct PrateciDokument {
    #[serde(rename = "Oib")]
    pub(crate) oib: String,
    #[serde(rename = "DatVrijeme")]
    pub(crate) dat_vrijeme: String,
    #[serde(rename = "BrPratecegDokumenta")]
    pub br_prateceg_dokumenta: BrojPD,
    #[serde(rename = "IznosUkupno")]
    pub(crate) iznos_ukupno: Amount,
    #[serde(rename = "ZastKodPD")]
    pub zast_kod_pd: String,
    #[serde(rename = "NakDost")]
    pub(crate) nak_dost: bool,
}

/// Invoice submission request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename = "RacunZahtjev")]
pub struct RacunZahtjev {
    #[serde(rename = "@xmlns")]
    pub(crate) xmlns: &'static str,
    #[serde(rename = "Zaglavlje")]
    pub(crate) zaglavlje: Zaglavlje,
    #[serde(rename = "Racun")]
    pub(crate) racun: Racun,
}

impl RacunZahtjev {
    pub(crate) fn new(zaglavlje: Zaglavlje, racun: Racun) -> Self {
        Self {
            xmlns: TNS,
            zaglavlje,
            racun,
        }
    }
}

/// Submission request for an invoice referencing a supporting document.
#[derive(Debug, Clone, Serialize)]
#[serde(rename = "RacunPDZahtjev")]
pub struct RacunPDZahtjev {
    #[serde(rename = "@xmlns")]
    pub(crate) xmlns: &'static str,
    #[serde(rename = "Zaglavlje")]
    pub(crate) zaglavlje: Zaglavlje,
    #[serde(rename = "Racun")]
    pub(crate) racun: Racun,
}

impl RacunPDZahtjev {
    pub(crate) fn new(zaglavlje: Zaglavlje, racun: Racun) -> Self {
        Self {
            xmlns: TNS,
            zaglavlje,
            racun,
        }
    }
}

/// Payment-method-change request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename = "PromijeniNacPlacZahtjev")]
pub struct PromijeniNacPlacZahtjev {
    #[serde(rename = "@xmlns")]
    pub(crate) xmlns: &'static str,
    #[serde(rename = "Zaglavlje")]
    pub(crate) zaglavlje: Zaglavlje,
    #[serde(rename = "Racun")]
    pub(crate) racun: Racun,
}

impl PromijeniNacPlacZahtjev {
    pub(crate) fn new(zaglavlje: Zaglavlje, racun: Racun) -> Self {
        Self {
            xmlns: TNS,
            zaglavlje,
            racun,
        }
    }
}

/// Invoice check request (demo environment only).
#[derive(Debug, Clone, Serialize)]
#[serde(rename = "ProvjeraZahtjev")]
pub struct ProvjeraZahtjev {
    #[serde(rename = "@xmlns")]
    pub(crate) xmlns: &'static str,
    #[serde(rename = "Zaglavlje")]
    pub(crate) zaglavlje: Zaglavlje,
    #[serde(rename = "Racun")]
    pub(crate) racun: Racun,
}

impl ProvjeraZahtjev {
    pub(crate) fn new(zaglavlje: Zaglavlje, racun: Racun) -> Self {
        Self {
            xmlns: TNS,
            zaglavlje,
            racun,
        }
    }
}

/// Supporting document submission request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename = "PrateciDokumentiZahtjev")]
pub struct PrateciDokumentiZahtjev {
    #[serde(rename = "@xmlns")]
    pub(crate) xmlns: &'static str,
    #[serde(rename = "Zaglavlje")]
    pub(crate) zaglavlje: Zaglavlje,
    #[serde(rename = "PrateciDokument")]
    pub(crate) prateci_dokument: PrateciDokument,
}

impl PrateciDokumentiZahtjev {
    pub(crate) fn new(zaglavlje: Zaglavlje, prateci_dokument: PrateciDokument) -> Self {
        Self {
            xmlns: TNS,
            zaglavlje,
            prateci_dokument,
        }
    }
}

/// Echo request used by the service health check; never signed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename = "EchoRequest")]
pub struct EchoRequest {
    #[serde(rename = "@xmlns")]
    pub(crate) xmlns: &'static str,
    #[serde(rename = "$text")]
    pub(crate) message: String,
}

impl EchoRequest {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            xmlns: TNS,
            message: message.into(),
        }
    }
}
