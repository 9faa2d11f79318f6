//! Transaction batch loaders
//!
//! The data-access layer hands over a batch either as JSON (the record shape
//! of [`TransactionRecord`]) or as a flat CSV export with one column per
//! relationship link. [`active_only`] and [`prefilter`] apply the selection
//! the data-access layer is responsible for. Rental statements need the
//! whole active batch, since the rental is looked up before the dates
//! narrow it; the other reports can take [`prefilter`]'s output directly.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use csv::{ReaderBuilder, Trim};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::models::{
    BuildingRef, MonthlyRent, PropertyRef, RecordState, RentPayment, RentalRef, ServiceRef,
    TransactionKind, TransactionRecord,
};

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonBatch {
    Bare(Vec<TransactionRecord>),
    Wrapped { transactions: Vec<TransactionRecord> },
}

/// Parse a JSON batch: a bare array or `{"transactions": [...]}`
pub fn parse_json(content: &str) -> Result<Vec<TransactionRecord>> {
    let batch: JsonBatch = serde_json::from_str(content)
        .map_err(|e| Error::InvalidData(format!("Invalid transaction batch: {}", e)))?;
    let records = match batch {
        JsonBatch::Bare(records) => records,
        JsonBatch::Wrapped { transactions } => transactions,
    };
    debug!("Parsed {} JSON transactions", records.len());
    Ok(records)
}

/// One row of the flat CSV export
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct CsvRow {
    id: Option<String>,
    date: Option<String>,
    kind: Option<String>,
    amount: Option<String>,
    category: Option<String>,
    description: Option<String>,
    state: Option<String>,
    building_id: Option<String>,
    building_name: Option<String>,
    property_id: Option<String>,
    property_name: Option<String>,
    property_building_id: Option<String>,
    property_building_name: Option<String>,
    service_id: Option<String>,
    service_name: Option<String>,
    monthly_rent_id: Option<String>,
    monthly_rent_period: Option<String>,
    rental_id: Option<String>,
    rental_label: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    for fmt in ["%Y-%m-%d", "%d/%m/%Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Ok(date);
        }
    }
    Err(Error::InvalidData(format!("Unable to parse date: {}", s)))
}

fn parse_amount(s: &str) -> Result<f64> {
    let cleaned = s.trim().replace(['$', ',', ' '], "");
    cleaned
        .parse::<f64>()
        .map(f64::abs)
        .map_err(|_| Error::InvalidData(format!("Unable to parse amount: {}", s)))
}

impl CsvRow {
    fn into_record(self) -> Result<TransactionRecord> {
        let id = present(self.id).ok_or_else(|| Error::InvalidData("Missing id".into()))?;
        let date = present(self.date)
            .ok_or_else(|| Error::InvalidData(format!("{}: missing date", id)))
            .and_then(|d| parse_date(&d))?;
        let amount = present(self.amount)
            .ok_or_else(|| Error::InvalidData(format!("{}: missing amount", id)))
            .and_then(|a| parse_amount(&a))?;
        let state = match present(self.state) {
            Some(state) => state.parse::<RecordState>().map_err(Error::InvalidData)?,
            None => RecordState::Active,
        };

        let property = present(self.property_id).map(|property_id| PropertyRef {
            id: property_id,
            name: present(self.property_name),
            building: present(self.property_building_id).map(|building_id| BuildingRef {
                id: building_id,
                name: present(self.property_building_name),
            }),
        });

        let kind = match present(self.kind).map(|k| k.to_lowercase()).as_deref() {
            Some("income") | Some("ingreso") => {
                let rental = present(self.rental_id).map(|rental_id| RentalRef {
                    id: rental_id,
                    label: present(self.rental_label),
                    property,
                });
                let monthly_rent = present(self.monthly_rent_id).map(|rent_id| MonthlyRent {
                    id: rent_id,
                    period: present(self.monthly_rent_period),
                    rental,
                });
                TransactionKind::Income {
                    payment: monthly_rent.map(|rent| RentPayment {
                        monthly_rent: Some(rent),
                    }),
                }
            }
            Some("expense") | Some("gasto") => TransactionKind::Expense {
                building: present(self.building_id).map(|building_id| BuildingRef {
                    id: building_id,
                    name: present(self.building_name),
                }),
                property,
                service: present(self.service_id).map(|service_id| ServiceRef {
                    id: service_id,
                    name: present(self.service_name),
                }),
            },
            other => {
                return Err(Error::InvalidData(format!(
                    "{}: unknown kind {:?}",
                    id,
                    other.unwrap_or("")
                )))
            }
        };

        Ok(TransactionRecord {
            id,
            date,
            amount,
            category: present(self.category),
            description: present(self.description),
            state,
            kind,
        })
    }
}

/// Parse a flat CSV batch
///
/// Rows that cannot be turned into a record (missing id, bad date, unknown
/// kind) are skipped with a warning; malformed CSV is an error.
pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<TransactionRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for (line, row) in rdr.deserialize::<CsvRow>().enumerate() {
        match row?.into_record() {
            Ok(record) => records.push(record),
            Err(e) => {
                skipped += 1;
                warn!(row = line + 2, error = %e, "Skipping CSV row");
            }
        }
    }

    debug!(parsed = records.len(), skipped, "Parsed CSV transactions");
    Ok(records)
}

/// Load a batch file, choosing the format by extension (`.json` or `.csv`)
pub fn load_path(path: &Path) -> Result<Vec<TransactionRecord>> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);
    match extension.as_deref() {
        Some("json") => {
            let content = std::fs::read_to_string(path)?;
            parse_json(&content)
        }
        Some("csv") => parse_csv(File::open(path)?),
        _ => Err(Error::InvalidData(format!(
            "Unsupported batch file {} (expected .json or .csv)",
            path.display()
        ))),
    }
}

/// Drop voided records, whatever their date
pub fn active_only(records: Vec<TransactionRecord>) -> Vec<TransactionRecord> {
    let total = records.len();
    let kept: Vec<TransactionRecord> = records
        .into_iter()
        .filter(|r| r.state == RecordState::Active)
        .collect();
    debug!(total, kept = kept.len(), "Dropped voided records");
    kept
}

/// Keep active records dated inside `[from, to]`
pub fn prefilter(records: Vec<TransactionRecord>, from: NaiveDate, to: NaiveDate) -> Vec<TransactionRecord> {
    let total = records.len();
    let kept: Vec<TransactionRecord> = active_only(records)
        .into_iter()
        .filter(|r| from <= r.date && r.date <= to)
        .collect();
    debug!(total, kept = kept.len(), "Prefiltered batch");
    kept
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attribution;
    use crate::test_utils::{expense, income, parse_date as date};

    const CSV: &str = "\
id,date,kind,amount,category,description,state,building_id,building_name,property_id,property_name,property_building_id,property_building_name,service_id,service_name,monthly_rent_id,rental_id,rental_label
p1,2024-01-15,income,\"1,200.00\",Rent,,,,,prop1,Depto 101,b1,Torre Norte,,,mr1,r1,Ana Perez
e1,2024-01-20,expense,40,Maintenance,Pipe repair,,b2,Torre Sur,,,,,s1,Plumbing,,,
e2,2024-01-21,expense,15,,,voided,,,prop1,,b1,,,,,,
x1,not-a-date,expense,10,,,,,,,,,,,,,,
";

    #[test]
    fn test_parse_csv_rebuilds_links() {
        let records = parse_csv(CSV.as_bytes()).unwrap();
        assert_eq!(records.len(), 3);

        let payment = &records[0];
        assert!(payment.is_income());
        assert_eq!(payment.amount, 1200.0);
        let building = attribution::building_of(payment).unwrap();
        assert_eq!(building.id, "b1");
        assert_eq!(building.name.as_deref(), Some("Torre Norte"));
        assert_eq!(
            attribution::rental_of(payment).unwrap().label.as_deref(),
            Some("Ana Perez")
        );

        let repair = &records[1];
        assert_eq!(attribution::building_of(repair).unwrap().id, "b2");
        assert_eq!(repair.description.as_deref(), Some("Pipe repair"));

        let voided = &records[2];
        assert_eq!(voided.state, RecordState::Voided);
        assert_eq!(attribution::building_of(voided).unwrap().id, "b1");
    }

    #[test]
    fn test_parse_json_shapes() {
        let bare = r#"[{"id": "e1", "date": "2024-01-20", "amount": 40.0, "kind": "expense"}]"#;
        assert_eq!(parse_json(bare).unwrap().len(), 1);

        let wrapped = r#"{"transactions": [{"id": "p1", "date": "2024-01-15", "amount": 100.0, "kind": "income"}]}"#;
        let records = parse_json(wrapped).unwrap();
        assert!(records[0].is_income());

        assert!(matches!(parse_json("{\"rows\": []}"), Err(Error::InvalidData(_))));
    }

    #[test]
    fn test_prefilter_drops_voided_and_out_of_range() {
        let records = vec![
            income("p1", "2024-01-15", 100.0).build(),
            expense("e1", "2024-01-20", 40.0).voided().build(),
            expense("e2", "2023-12-31", 40.0).build(),
            expense("e3", "2024-01-31", 40.0).build(),
        ];
        let kept = prefilter(records, date("2024-01-01"), date("2024-01-31"));
        let ids: Vec<&str> = kept.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["p1", "e3"]);
    }

    #[test]
    fn test_active_only_keeps_every_date() {
        let records = vec![
            income("p1", "2023-06-01", 100.0).build(),
            expense("e1", "2024-01-20", 40.0).voided().build(),
            expense("e2", "2025-01-01", 40.0).build(),
        ];
        let ids: Vec<String> = active_only(records).into_iter().map(|r| r.id).collect();
        assert_eq!(ids, vec!["p1", "e2"]);
    }

    #[test]
    fn test_load_path_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("batch.csv");
        std::fs::write(&csv_path, CSV).unwrap();
        assert_eq!(load_path(&csv_path).unwrap().len(), 3);

        let other = dir.path().join("batch.xlsx");
        std::fs::write(&other, "").unwrap();
        assert!(load_path(&other).is_err());
    }
}
