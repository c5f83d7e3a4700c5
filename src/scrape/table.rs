//! Street price table on a lepriximmo.fr city page.
//!
//! Rows look like `<tr><td>Rue Pierre Brossolette</td>…<td>5 005 €/m²</td></tr>`,
//! with regular or non-breaking spaces as thousands separators.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

static ROW_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("tr").unwrap());
static CELL_SELECTOR: LazyLock<Selector> = LazyLock::new(|| Selector::parse("td").unwrap());
static PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9][0-9\s]*)\s*€\s*/\s*m²").unwrap());

/// €/m² of the first row whose leading cell contains `needle`
/// (case-insensitive). Cells are scanned left to right; the first one with a
/// parsable price wins.
pub fn street_price(html: &str, needle: &str) -> Option<u32> {
    let document = Html::parse_document(html);
    let needle = needle.to_uppercase();

    let cells = document.select(&ROW_SELECTOR).find_map(|row| {
        let cells: Vec<ElementRef> = row.select(&CELL_SELECTOR).collect();
        let first = cells.first()?;
        cell_text(first).to_uppercase().contains(&needle).then_some(cells)
    })?;

    cells.iter().find_map(|cell| price_in(&cell_text(cell)))
}

/// First `<digits> €/m²` in `text`, grouping separators removed.
pub fn price_in(text: &str) -> Option<u32> {
    let caps = PRICE_RE.captures(text)?;
    let digits: String = caps[1].chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

/// Text nodes trimmed and joined without separator.
fn cell_text(cell: &ElementRef) -> String {
    cell.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}
