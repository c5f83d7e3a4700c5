//! DVF archive download and row reading.
//!
//! Each source is a ZIP holding one `|`-delimited `.txt` file. Rows are read
//! lazily from the decompressed member; the archive itself stays in memory.

use std::io::Cursor;

use csv::{ByteRecord, ReaderBuilder};
use reqwest::blocking::Client;
use tracing::{info, warn};
use zip::ZipArchive;

use crate::error::SourceError;
use crate::http;
use crate::sources::DvfSource;

/// The columns this crate reads from a DVF row. Absent columns read as "".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    pub code_postal: String,
    pub adresse_numero: String,
    pub adresse_nom_voie: String,
    pub valeur_fonciere: String,
    pub surface_reelle_bati: String,
    pub date_mutation: String,
    pub type_local: String,
}

/// Outcome of fetching one source: rows to read, or nothing at all.
pub enum SourceRows {
    Loaded(DvfArchive),
    Empty,
}

/// Download one source. Any failure is logged and becomes `SourceRows::Empty`.
pub fn fetch_source(client: &Client, source: &DvfSource) -> SourceRows {
    match download(client, source) {
        Ok(archive) => SourceRows::Loaded(archive),
        Err(e) => {
            warn!(source = source.label, "Skipping source: {}", e);
            SourceRows::Empty
        }
    }
}

fn download(client: &Client, source: &DvfSource) -> Result<DvfArchive, SourceError> {
    info!(source = source.label, url = source.url, "Downloading DVF archive");
    let bytes = http::get_bytes(client, source.url)?;
    info!(source = source.label, bytes = bytes.len(), "Downloaded");
    DvfArchive::from_bytes(bytes)
}

pub struct DvfArchive {
    archive: ZipArchive<Cursor<Vec<u8>>>,
    member: usize,
    member_name: String,
}

impl DvfArchive {
    /// Open an in-memory ZIP and locate its first `.txt` member.
    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, SourceError> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;
        let mut found = None;
        for i in 0..archive.len() {
            let f = archive.by_index(i)?;
            if f.is_file() && f.name().ends_with(".txt") {
                found = Some((i, f.name().to_string()));
                break;
            }
        }
        let (member, member_name) = found.ok_or(SourceError::MissingMember {
            members: archive.len(),
        })?;
        Ok(DvfArchive {
            archive,
            member,
            member_name,
        })
    }

    pub fn member_name(&self) -> &str {
        &self.member_name
    }

    /// Lazily decode the member's rows. A row error other than I/O only
    /// concerns that row; an I/O error means the member is corrupt.
    pub fn records(
        &mut self,
    ) -> Result<impl Iterator<Item = csv::Result<RawRecord>> + '_, SourceError> {
        let file = self.archive.by_index(self.member)?;
        let mut reader = ReaderBuilder::new()
            .delimiter(b'|')
            .flexible(true)
            .quoting(false)
            .from_reader(file);
        let columns = Columns::from_headers(reader.byte_headers()?);
        Ok(reader
            .into_byte_records()
            .map(move |row| row.map(|r| columns.read(&r))))
    }
}

struct Columns {
    code_postal: Option<usize>,
    adresse_numero: Option<usize>,
    adresse_nom_voie: Option<usize>,
    valeur_fonciere: Option<usize>,
    surface_reelle_bati: Option<usize>,
    date_mutation: Option<usize>,
    type_local: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &ByteRecord) -> Self {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| String::from_utf8_lossy(h).trim() == name)
        };
        Columns {
            code_postal: find("code_postal"),
            adresse_numero: find("adresse_numero"),
            adresse_nom_voie: find("adresse_nom_voie"),
            valeur_fonciere: find("valeur_fonciere"),
            surface_reelle_bati: find("surface_reelle_bati"),
            date_mutation: find("date_mutation"),
            type_local: find("type_local"),
        }
    }

    fn read(&self, row: &ByteRecord) -> RawRecord {
        let field = |idx: Option<usize>| {
            idx.and_then(|i| row.get(i))
                .map(|b| String::from_utf8_lossy(b).into_owned())
                .unwrap_or_default()
        };
        RawRecord {
            code_postal: field(self.code_postal),
            adresse_numero: field(self.adresse_numero),
            adresse_nom_voie: field(self.adresse_nom_voie),
            valeur_fonciere: field(self.valeur_fonciere),
            surface_reelle_bati: field(self.surface_reelle_bati),
            date_mutation: field(self.date_mutation),
            type_local: field(self.type_local),
        }
    }
}
