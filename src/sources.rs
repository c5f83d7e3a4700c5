//! Static source and fallback tables.

/// One DVF bulk archive on data.gouv.fr.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DvfSource {
    pub label: &'static str,
    pub url: &'static str,
}

impl DvfSource {
    /// Year part of the label: "2020_H2" -> "2020".
    pub fn year(&self) -> &'static str {
        self.label.split('_').next().unwrap_or(self.label)
    }
}

/// Processed in this order.
pub const DVF_SOURCES: &[DvfSource] = &[
    DvfSource {
        label: "2020_H2",
        url: "https://www.data.gouv.fr/api/1/datasets/r/8d771135-57c8-480f-a853-3d1d00ea0b69",
    },
    DvfSource {
        label: "2021",
        url: "https://www.data.gouv.fr/api/1/datasets/r/e117fe7d-f7fb-4c52-8089-231e755d19d3",
    },
    DvfSource {
        label: "2022",
        url: "https://www.data.gouv.fr/api/1/datasets/r/8c8abe23-2a82-4b95-8174-1c1e0734c921",
    },
    DvfSource {
        label: "2023",
        url: "https://www.data.gouv.fr/api/1/datasets/r/cc8a50e4-c8d1-4ac2-8de2-c1e4b3c44c86",
    },
    DvfSource {
        label: "2024",
        url: "https://www.data.gouv.fr/api/1/datasets/r/af812b0e-a898-4226-8cc8-5a570b257326",
    },
    DvfSource {
        label: "2025_H1",
        url: "https://www.data.gouv.fr/api/1/datasets/r/4d741143-8331-4b59-95c2-3b24a7bdbe3c",
    },
];

pub const LEPRIXIMMO_URL: &str = "https://www.lepriximmo.fr/prix-immobilier/ile-de-france/hauts-de-seine/courbevoie-92400/?page_voies=2&annee_voies={year}";

pub fn lepriximmo_url(template: &str, year: i32) -> String {
    template.replace("{year}", &year.to_string())
}

/// Known or estimated €/m² per year, used when scraping yields nothing.
pub const FALLBACK_PRICES: &[(i32, u32)] = &[
    (2020, 4800),
    (2021, 5100),
    (2022, 5500),
    (2023, 5900),
    (2024, 6400),
    (2025, 5005), // published on lepriximmo.fr
    (2026, 5100),
    (2027, 5200),
    (2028, 5300),
    (2029, 5400),
    (2030, 5500),
];

/// Used for years outside `FALLBACK_PRICES`.
pub const DEFAULT_PRICE_PER_M2: u32 = 5500;

pub fn fallback_price(year: i32) -> u32 {
    FALLBACK_PRICES
        .iter()
        .find(|(y, _)| *y == year)
        .map(|(_, p)| *p)
        .unwrap_or(DEFAULT_PRICE_PER_M2)
}

pub const DVF_DATA_SOURCE: &str = "DVF (data.gouv.fr)";
pub const SAMPLE_DATA_SOURCE: &str =
    "Sample data (DVF real data available at https://www.data.gouv.fr)";
pub const LEPRIXIMMO_DATA_SOURCE: &str =
    "LePrixImmo.fr (based on DVF - Demandes de Valeurs Foncières)";
