use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Closed set of tracked device kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceKind {
    Cctv,
    Fingerprint,
    KomputerPh1,
    KomputerPh2,
    Printer,
    Telepon,
    Toa,
    Ups,
}

const NAMA_LOKASI_KODE: &[&str] = &["nama", "lokasi", "kode"];
const KOMPUTER: &[&str] = &[
    "nama", "merk", "pc", "monitor", "cpu", "ram", "internal", "lokasi",
];
const PRINTER: &[&str] = &["nama", "departemen", "tipe_printer", "no_seri"];
const TELEPON: &[&str] = &["lokasi", "departemen", "user", "ext", "merk", "tipe"];
const TOA: &[&str] = &["nama", "lokasi", "kode", "posisi"];
const UPS: &[&str] = &["nama", "departemen", "tipe", "no_seri", "lokasi"];

impl DeviceKind {
    pub const ALL: [DeviceKind; 8] = [
        DeviceKind::Cctv,
        DeviceKind::Fingerprint,
        DeviceKind::KomputerPh1,
        DeviceKind::KomputerPh2,
        DeviceKind::Printer,
        DeviceKind::Telepon,
        DeviceKind::Toa,
        DeviceKind::Ups,
    ];

    /// Wire name, also used as the `device` query value.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceKind::Cctv => "cctv",
            DeviceKind::Fingerprint => "fingerprint",
            DeviceKind::KomputerPh1 => "komputer_ph1",
            DeviceKind::KomputerPh2 => "komputer_ph2",
            DeviceKind::Printer => "printer",
            DeviceKind::Telepon => "telepon",
            DeviceKind::Toa => "toa",
            DeviceKind::Ups => "ups",
        }
    }

    /// Human label used in response messages.
    pub fn label(&self) -> &'static str {
        match self {
            DeviceKind::Cctv => "CCTV",
            DeviceKind::Fingerprint => "Fingerprint",
            DeviceKind::KomputerPh1 => "Komputer PH1",
            DeviceKind::KomputerPh2 => "Komputer PH2",
            DeviceKind::Printer => "Printer",
            DeviceKind::Telepon => "Telepon",
            DeviceKind::Toa => "TOA",
            DeviceKind::Ups => "UPS",
        }
    }

    /// Store collection holding devices of this kind.
    pub fn collection(&self) -> &'static str {
        match self {
            DeviceKind::Cctv => "cctvs",
            DeviceKind::Fingerprint => "fingerprints",
            DeviceKind::KomputerPh1 => "komputer_ph1s",
            DeviceKind::KomputerPh2 => "komputer_ph2s",
            DeviceKind::Printer => "printers",
            DeviceKind::Telepon => "telepons",
            DeviceKind::Toa => "toas",
            DeviceKind::Ups => "ups",
        }
    }

    /// Path segment for single-item routes, e.g. `/api/komputer-ph1/{id}`.
    pub fn segment(&self) -> &'static str {
        match self {
            DeviceKind::Cctv => "cctv",
            DeviceKind::Fingerprint => "fingerprint",
            DeviceKind::KomputerPh1 => "komputer-ph1",
            DeviceKind::KomputerPh2 => "komputer-ph2",
            DeviceKind::Printer => "printer",
            DeviceKind::Telepon => "telepon",
            DeviceKind::Toa => "toa",
            DeviceKind::Ups => "ups",
        }
    }

    /// Path segment for list routes, e.g. `/api/komputer-ph1s`.
    pub fn list_segment(&self) -> &'static str {
        match self {
            DeviceKind::Cctv => "cctvs",
            DeviceKind::Fingerprint => "fingerprints",
            DeviceKind::KomputerPh1 => "komputer-ph1s",
            DeviceKind::KomputerPh2 => "komputer-ph2s",
            DeviceKind::Printer => "printers",
            DeviceKind::Telepon => "telepons",
            DeviceKind::Toa => "toas",
            DeviceKind::Ups => "ups",
        }
    }

    /// Attribute schema, in form order.
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            DeviceKind::Cctv | DeviceKind::Fingerprint => NAMA_LOKASI_KODE,
            DeviceKind::KomputerPh1 | DeviceKind::KomputerPh2 => KOMPUTER,
            DeviceKind::Printer => PRINTER,
            DeviceKind::Telepon => TELEPON,
            DeviceKind::Toa => TOA,
            DeviceKind::Ups => UPS,
        }
    }

    /// Attribute matched by the `q` search parameter.
    pub fn name_field(&self) -> &'static str {
        match self {
            DeviceKind::Telepon => "tipe",
            _ => "nama",
        }
    }
}

impl std::fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown device kind: {0}")]
pub struct UnknownDeviceKind(pub String);

impl FromStr for DeviceKind {
    type Err = UnknownDeviceKind;

    /// Accepts the wire name or the route segment.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DeviceKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s || kind.segment() == s)
            .ok_or_else(|| UnknownDeviceKind(s.to_string()))
    }
}
