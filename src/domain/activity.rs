/// Activity catalog: the read-only table of activities and their emissions.
///
/// Source format, one record per line:
///
///   description<D>value<D>note
///
/// where `<D>` is a sentinel character (default `@`) so that commas can
/// appear freely in the text fields. Loading stops at the first malformed
/// record or at capacity, whichever comes first.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{GameError, Result};

pub const DEFAULT_CAPACITY: usize = 99;
pub const DEFAULT_DELIMITER: char = '@';

const MAX_DESCRIPTION: usize = 127;
const MAX_NOTE: usize = 511;

#[derive(Clone, Debug, PartialEq)]
pub struct Activity {
    pub description: String,
    /// Emissions in kg CO2eq, never negative.
    pub co2: f64,
    pub note: String,
}

impl Activity {
    /// Display string for the emissions value.
    pub fn value_text(&self) -> String {
        format_value(self.co2)
    }
}

/// Immutable activity table, indexed by position.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    activities: Vec<Activity>,
}

impl Catalog {
    #[cfg(test)]
    pub fn new(activities: Vec<Activity>) -> Self {
        Catalog { activities }
    }

    /// Open and parse the catalog file. An unreadable file is fatal.
    pub fn load(path: &Path, delimiter: char, capacity: usize) -> Result<Self> {
        let file = File::open(path).map_err(|source| GameError::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog = Self::parse(BufReader::new(file), delimiter, capacity)?;
        tracing::info!(count = catalog.len(), path = %path.display(), "catalog loaded");
        Ok(catalog)
    }

    /// Parse records from any buffered reader.
    ///
    /// Blank lines are skipped. A malformed record ends the load; everything
    /// parsed before it is kept.
    pub fn parse<R: BufRead>(reader: R, delimiter: char, capacity: usize) -> Result<Self> {
        let mut activities = Vec::with_capacity(capacity.min(DEFAULT_CAPACITY));

        for (idx, line) in reader.lines().enumerate() {
            if activities.len() >= capacity {
                break;
            }
            let line = line?;
            let record = line.trim_start().trim_end_matches(['\r', '\n']);
            if record.trim().is_empty() {
                continue;
            }
            match parse_record(record, delimiter) {
                Ok(activity) => activities.push(activity),
                Err(reason) => {
                    let err = GameError::MalformedRecord { line: idx + 1, reason };
                    tracing::warn!("{err}; keeping {} records", activities.len());
                    break;
                }
            }
        }

        Ok(Catalog { activities })
    }

    pub fn len(&self) -> usize {
        self.activities.len()
    }

    /// Index lookups outside the table are programming errors.
    pub fn get(&self, index: usize) -> &Activity {
        &self.activities[index]
    }
}

fn parse_record(record: &str, delimiter: char) -> std::result::Result<Activity, String> {
    let mut fields = record.splitn(3, delimiter);
    let (Some(description), Some(value), Some(note)) = (fields.next(), fields.next(), fields.next())
    else {
        return Err("expected three fields".into());
    };

    if description.is_empty() {
        return Err("empty description".into());
    }
    if description.chars().count() > MAX_DESCRIPTION {
        return Err(format!("description longer than {MAX_DESCRIPTION} characters"));
    }

    let co2: f64 = value
        .trim()
        .parse()
        .map_err(|e| format!("bad value {value:?}: {e}"))?;
    if !co2.is_finite() || co2 < 0.0 {
        return Err(format!("value {co2} out of range"));
    }

    let note = note.trim_end();
    if note.is_empty() {
        return Err("empty note".into());
    }
    if note.chars().count() > MAX_NOTE {
        return Err(format!("note longer than {MAX_NOTE} characters"));
    }

    Ok(Activity {
        description: description.to_string(),
        co2,
        note: note.to_string(),
    })
}

/// Shortest of integer, one-decimal, two-decimal that represents `value`.
pub fn format_value(value: f64) -> String {
    if value == value.trunc() {
        format!("{}", value as i64)
    } else if value == (value * 10.0).trunc() / 10.0 {
        format!("{value:.1}")
    } else {
        format!("{value:.2}")
    }
}

/// Scroll-in text for intermediate reveal steps: integer when exact, else two decimals.
pub fn format_rolling(value: f64) -> String {
    if value == value.trunc() {
        format!("{}", value as i64)
    } else {
        format!("{value:.2}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn parse(text: &str) -> Catalog {
        Catalog::parse(Cursor::new(text), '@', DEFAULT_CAPACITY).unwrap()
    }

    #[test]
    fn parses_records_with_commas_in_text() {
        let c = parse(
            "Driving 10 km, petrol car@2.3@Cars, vans and trucks\n\
             Boiling a kettle@0.07@Full kettle, 1.7 L\n",
        );
        assert_eq!(c.len(), 2);
        assert_eq!(c.get(0).description, "Driving 10 km, petrol car");
        assert_eq!(c.get(0).co2, 2.3);
        assert_eq!(c.get(1).note, "Full kettle, 1.7 L");
    }

    #[test]
    fn malformed_record_truncates_load() {
        let c = parse("A@1@n\nB@oops@n\nC@3@n\n");
        assert_eq!(c.len(), 1);
        assert_eq!(c.get(0).description, "A");
    }

    #[test]
    fn missing_field_truncates_load() {
        let c = parse("A@1@n\nB@2\nC@3@n\n");
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn negative_value_is_malformed() {
        let c = parse("A@-1@n\n");
        assert_eq!(c.len(), 0);
    }

    #[test]
    fn stops_at_capacity() {
        let text: String = (0..10).map(|i| format!("A{i}@{i}@n\n")).collect();
        let c = Catalog::parse(Cursor::new(text), '@', 4).unwrap();
        assert_eq!(c.len(), 4);
        assert_eq!(c.get(3).description, "A3");
    }

    #[test]
    fn tolerates_blank_lines_and_crlf() {
        let c = parse("A@1@first\r\n\r\n  B@2.5@second\r\n");
        assert_eq!(c.len(), 2);
        assert_eq!(c.get(0).note, "first");
        assert_eq!(c.get(1).description, "B");
    }

    #[test]
    fn note_may_contain_delimiter() {
        let c = parse("A@1@mail me @ home\n");
        assert_eq!(c.get(0).note, "mail me @ home");
    }

    #[test]
    fn overlong_description_is_malformed() {
        let long = "x".repeat(MAX_DESCRIPTION + 1);
        let c = parse(&format!("A@1@n\n{long}@2@n\n"));
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn missing_file_is_source_unavailable() {
        let err = Catalog::load(Path::new("/nonexistent/emissions.csv"), '@', 99).unwrap_err();
        assert!(matches!(err, GameError::SourceUnavailable { .. }));
    }

    #[test]
    fn value_formatting_uses_minimal_precision() {
        assert_eq!(format_value(12.0), "12");
        assert_eq!(format_value(0.0), "0");
        assert_eq!(format_value(2.5), "2.5");
        assert_eq!(format_value(0.07), "0.07");
        assert_eq!(format_value(1.25), "1.25");
        assert!(!format_value(340.0).contains('.'));
    }

    #[test]
    fn rolling_format_has_no_single_decimal_case() {
        assert_eq!(format_rolling(3.0), "3");
        assert_eq!(format_rolling(2.5), "2.50");
    }
}
