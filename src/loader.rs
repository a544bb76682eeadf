// Ingest side: turn CSV exports into loosely-typed rows, and read an
// explicit column mapping when the user supplies one.
use crate::error::{ReportError, Result};
use crate::types::{CellValue, Field, FieldMap, RawRow};
use csv::ReaderBuilder;
use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// A loaded sheet: headers in file order plus one row per data line.
#[derive(Debug, Clone, Default)]
pub struct Sheet {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

pub fn read_sheet<R: Read>(reader: R) -> Result<Sheet> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);
    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        // Short lines leave trailing columns blank, like an empty cell.
        let row: RawRow = headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.clone(), CellValue::from(record.get(i).unwrap_or(""))))
            .collect();
        rows.push(row);
    }
    Ok(Sheet { headers, rows })
}

pub fn load_sheet<P: AsRef<Path>>(path: P) -> Result<Sheet> {
    let path = path.as_ref();
    let file = std::fs::File::open(path)?;
    let sheet = read_sheet(file)?;
    debug!(path = %path.display(), rows = sheet.rows.len(), "loaded sheet");
    Ok(sheet)
}

/// Parse a JSON object of `field -> column`.
pub fn parse_field_map(json: &str) -> Result<FieldMap> {
    let raw: BTreeMap<String, String> = serde_json::from_str(json)?;
    raw.iter().try_fold(FieldMap::new(), |map, (field, column)| {
        let field: Field = field
            .parse()
            .map_err(ReportError::UnknownField)?;
        Ok(map.with(field, column))
    })
}

pub fn load_field_map<P: AsRef<Path>>(path: P) -> Result<FieldMap> {
    let json = std::fs::read_to_string(path)?;
    parse_field_map(&json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_headers_and_cells() {
        let csv = "Broker , Month,GWP\nAcme,2024-01-15,1000\nBeta,2024-02,\nShort\n";
        let sheet = read_sheet(csv.as_bytes()).unwrap();
        assert_eq!(sheet.headers, vec!["Broker", "Month", "GWP"]);
        assert_eq!(sheet.rows.len(), 3);
        assert_eq!(sheet.rows[0]["GWP"], CellValue::Text("1000".into()));
        assert_eq!(sheet.rows[1]["GWP"], CellValue::Empty);
        assert_eq!(sheet.rows[2]["Month"], CellValue::Empty);
    }

    #[test]
    fn field_map_from_json() {
        let map = parse_field_map(r#"{"intermediary": "Broker", "loss_ratio": "LR %"}"#).unwrap();
        assert_eq!(map.get(Field::Intermediary), Some("Broker"));
        assert_eq!(map.get(Field::LossRatio), Some("LR %"));
        assert!(!map.is_mapped(Field::Premium));
    }

    #[test]
    fn unknown_field_is_rejected() {
        let err = parse_field_map(r#"{"gross": "GWP"}"#).unwrap_err();
        assert!(matches!(err, ReportError::UnknownField(f) if f == "gross"));
    }
}
