use crate::dvf::archive::RawRecord;
use crate::error::Rejection;
use crate::report::Transaction;
use crate::settings::Settings;
use crate::utils::{parse_decimal, round2};

/// Postal code and street-name substring a row must match.
#[derive(Debug, Clone)]
pub struct StreetFilter {
    postal_code: String,
    street_match: String,
}

impl StreetFilter {
    pub fn new(postal_code: &str, street_match: &str) -> Self {
        StreetFilter {
            postal_code: postal_code.trim().to_string(),
            street_match: street_match.trim().to_uppercase(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        StreetFilter::new(&settings.postal_code, &settings.street_match)
    }

    pub fn matches(&self, record: &RawRecord) -> bool {
        record.code_postal.trim() == self.postal_code
            && record
                .adresse_nom_voie
                .trim()
                .to_uppercase()
                .contains(&self.street_match)
    }
}

/// Turn a row into a transaction for `year`, or say why it was dropped.
///
/// `price_per_m2` keeps the full quotient rounded half away from zero;
/// `price` and `surface_m2` are truncated toward zero.
pub fn transform(
    record: &RawRecord,
    year: &str,
    filter: &StreetFilter,
) -> Result<Transaction, Rejection> {
    if !filter.matches(record) {
        return Err(Rejection::NotTarget);
    }

    let value_raw = record.valeur_fonciere.trim();
    let surface_raw = record.surface_reelle_bati.trim();
    if value_raw.is_empty() {
        return Err(Rejection::MissingValue);
    }
    if surface_raw.is_empty() {
        return Err(Rejection::MissingSurface);
    }

    let value = parse_decimal(value_raw).ok_or(Rejection::InvalidNumber)?;
    let surface = parse_decimal(surface_raw).ok_or(Rejection::InvalidNumber)?;

    // surface_m2 is stored truncated and must stay positive
    if surface < 1.0 {
        return Err(Rejection::NonPositiveSurface);
    }

    let postal_code = record.code_postal.trim();
    let date = record
        .date_mutation
        .trim()
        .get(..10)
        .or_else(|| Some(record.date_mutation.trim()))
        .filter(|d| !d.is_empty())
        .map(str::to_string);
    let address = format!(
        "{} {}, {}",
        record.adresse_numero.trim(),
        record.adresse_nom_voie.trim(),
        postal_code
    )
    .trim_start()
    .to_string();
    let property_type = match record.type_local.trim() {
        "" => "Unknown".to_string(),
        t => t.to_string(),
    };

    Ok(Transaction {
        year: year.to_string(),
        date,
        address,
        price: value.trunc() as i64,
        surface_m2: surface.trunc() as i64,
        price_per_m2: round2(value / surface),
        property_type,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter() -> StreetFilter {
        StreetFilter::new("92400", "Brossolette")
    }

    fn row(postal: &str, street: &str, value: &str, surface: &str) -> RawRecord {
        RawRecord {
            code_postal: postal.to_string(),
            adresse_numero: "12".to_string(),
            adresse_nom_voie: street.to_string(),
            valeur_fonciere: value.to_string(),
            surface_reelle_bati: surface.to_string(),
            date_mutation: "2021-03-15".to_string(),
            type_local: "Appartement".to_string(),
        }
    }

    #[test]
    fn keeps_matching_row() {
        let t = transform(&row("92400", "RUE PIERRE BROSSOLETTE", "1000000", "100"), "2021", &filter()).unwrap();
        assert_eq!(t.year, "2021");
        assert_eq!(t.price, 1_000_000);
        assert_eq!(t.surface_m2, 100);
        assert_eq!(t.price_per_m2, 10000.00);
        assert_eq!(t.date.as_deref(), Some("2021-03-15"));
        assert_eq!(t.address, "12 RUE PIERRE BROSSOLETTE, 92400");
        assert_eq!(t.property_type, "Appartement");
    }

    #[test]
    fn street_match_is_case_insensitive_and_trimmed() {
        let r = row(" 92400 ", "  rue pierre brossolette ", "300000", "60");
        assert!(transform(&r, "2022", &filter()).is_ok());
    }

    #[test]
    fn rejects_other_postal_codes_and_streets() {
        let f = filter();
        assert_eq!(
            transform(&row("75011", "RUE BROSSOLETTE", "300000", "60"), "2021", &f),
            Err(Rejection::NotTarget)
        );
        assert_eq!(
            transform(&row("92400", "AV DE LA REPUBLIQUE", "300000", "60"), "2021", &f),
            Err(Rejection::NotTarget)
        );
    }

    #[test]
    fn rejects_zero_or_empty_surface() {
        let f = filter();
        assert_eq!(
            transform(&row("92400", "RUE BROSSOLETTE", "300000", "0"), "2021", &f),
            Err(Rejection::NonPositiveSurface)
        );
        assert_eq!(
            transform(&row("92400", "RUE BROSSOLETTE", "300000", ""), "2021", &f),
            Err(Rejection::MissingSurface)
        );
        assert_eq!(
            transform(&row("92400", "RUE BROSSOLETTE", "300000", "-5"), "2021", &f),
            Err(Rejection::NonPositiveSurface)
        );
        assert_eq!(
            transform(&row("92400", "RUE BROSSOLETTE", "300000", "0,5"), "2021", &f),
            Err(Rejection::NonPositiveSurface)
        );
    }

    #[test]
    fn rejects_missing_or_bad_value() {
        let f = filter();
        assert_eq!(
            transform(&row("92400", "RUE BROSSOLETTE", "", "60"), "2021", &f),
            Err(Rejection::MissingValue)
        );
        assert_eq!(
            transform(&row("92400", "RUE BROSSOLETTE", "abc", "60"), "2021", &f),
            Err(Rejection::InvalidNumber)
        );
        assert_eq!(
            transform(&row("92400", "RUE BROSSOLETTE", "300000", "6O"), "2021", &f),
            Err(Rejection::InvalidNumber)
        );
    }

    #[test]
    fn comma_decimals_and_truncation() {
        let t = transform(&row("92400", "RUE BROSSOLETTE", "250000,99", "45,8"), "2023", &filter()).unwrap();
        assert_eq!(t.price, 250_000);
        assert_eq!(t.surface_m2, 45);
        // 250000.99 / 45.8 = 5458.5369...
        assert_eq!(t.price_per_m2, 5458.54);
    }

    #[test]
    fn price_per_m2_rounds_half_away_from_zero() {
        // 1001 / 8 = 125.125 exactly
        let t = transform(&row("92400", "RUE BROSSOLETTE", "1001", "8"), "2023", &filter()).unwrap();
        assert_eq!(t.price_per_m2, 125.13);
        let t = transform(&row("92400", "RUE BROSSOLETTE", "250000", "3"), "2023", &filter()).unwrap();
        assert_eq!(t.price_per_m2, 83333.33);
    }

    #[test]
    fn optional_fields() {
        let mut r = row("92400", "RUE BROSSOLETTE", "300000", "60");
        r.adresse_numero = String::new();
        r.type_local = "  ".to_string();
        r.date_mutation = String::new();
        let t = transform(&r, "2024", &filter()).unwrap();
        assert_eq!(t.address, "RUE BROSSOLETTE, 92400");
        assert_eq!(t.property_type, "Unknown");
        assert_eq!(t.date, None);
    }

    #[test]
    fn date_is_cut_to_day() {
        let mut r = row("92400", "RUE BROSSOLETTE", "300000", "60");
        r.date_mutation = "2024-07-09 00:00:00".to_string();
        let t = transform(&r, "2024", &filter()).unwrap();
        assert_eq!(t.date.as_deref(), Some("2024-07-09"));
    }
}
