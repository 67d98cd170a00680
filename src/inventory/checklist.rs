use super::DeviceKind;
use crate::db::Record;
use crate::types::{AppError, ByAt, RecordId, Result};
use serde::{Deserialize, Serialize};

/// The list of checks inspectors run for one device kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChecklistTemplate {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub device: DeviceKind,
    pub checkpoint: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated: Option<ByAt>,
}

impl Record for ChecklistTemplate {
    fn id(&self) -> RecordId {
        self.id
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ChecklistForm {
    #[serde(default)]
    pub checkpoint: Vec<String>,
}

impl ChecklistForm {
    /// Trimmed, non-empty items; at least one is required.
    pub fn into_items(self) -> Result<Vec<String>> {
        let items: Vec<String> = self
            .checkpoint
            .into_iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty())
            .collect();

        if items.is_empty() {
            return Err(AppError::InvalidInput("Checkpoint is required".to_string()));
        }
        Ok(items)
    }
}

impl ChecklistTemplate {
    pub fn new(device: DeviceKind, checkpoint: Vec<String>) -> Self {
        Self {
            id: RecordId::new(),
            device,
            checkpoint,
            updated: None,
        }
    }

    /// Factory checklist for a kind.
    pub fn default_for(device: DeviceKind) -> Self {
        Self::new(
            device,
            default_items(device).iter().map(|s| s.to_string()).collect(),
        )
    }
}

fn default_items(device: DeviceKind) -> &'static [&'static str] {
    match device {
        DeviceKind::Cctv => &["Kebersihan Perangkat", "Penyimpanan histori", "Tampilan Gambar"],
        DeviceKind::Fingerprint => &[
            "Jam Finger",
            "Kondisi Sensor",
            "Kondisi Tombol",
            "Kondisi Baterai",
            "Kapasitas Foto",
            "Kebersihan perangkat",
        ],
        DeviceKind::KomputerPh1 | DeviceKind::KomputerPh2 => &[
            "Kebersihan perangkat",
            "Kipas pendingin",
            "Fungsi keyboard, mouse",
            "Jam CMOS",
            "Kondisi Harddisk",
            "Software/aplikasi",
            "Antivirus",
            "Backup",
        ],
        DeviceKind::Printer => &[
            "Kebersihan perangkat",
            "Hasil cetak / scan",
            "Kondisi head print",
            "Kondisi mata pisau",
            "Pembuangan tinta",
            "Software / aplikasi",
        ],
        DeviceKind::Telepon => &[
            "Kebersihan perangkat",
            "Suara Dering",
            "Suara Panggilan",
            "Fungsi Tombol",
        ],
        DeviceKind::Toa => &["Kebersihan Perangkat", "Suara"],
        DeviceKind::Ups => &["Kebersihan Perangkat", "Pemeriksaan daya", "Pengujian daya"],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_kind_has_a_default_checklist() {
        for kind in DeviceKind::ALL {
            let template = ChecklistTemplate::default_for(kind);
            assert_eq!(template.device, kind);
            assert!(!template.checkpoint.is_empty());
        }
    }

    #[test]
    fn test_form_drops_blank_items() {
        let form = ChecklistForm {
            checkpoint: vec![" Suara ".to_string(), "".to_string(), "  ".to_string()],
        };
        assert_eq!(form.into_items().expect("one item left"), vec!["Suara"]);
    }

    #[test]
    fn test_form_requires_an_item() {
        let form = ChecklistForm {
            checkpoint: vec![" ".to_string()],
        };
        assert!(matches!(form.into_items(), Err(AppError::InvalidInput(_))));
    }
}
