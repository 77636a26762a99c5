//! CSV preview reader for exchange ledger exports
//!
//! Reads just enough of an export to classify it: the header record and a
//! handful of sample rows, keyed by their source column names.

use std::io::Read;

use csv::ReaderBuilder;
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{ClassificationRequest, SampleRow};

/// Default number of sample rows to read from an export.
pub const DEFAULT_PREVIEW_ROWS: usize = 3;

/// Read the headers and up to `max_rows` sample rows from a CSV export.
pub fn read_export_preview<R: Read>(reader: R, max_rows: usize) -> Result<ClassificationRequest> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(|h| h.to_string()).collect();
    if headers.is_empty() {
        return Err(Error::InvalidRequest(
            "export has no header record".to_string(),
        ));
    }

    let mut sample_rows = Vec::new();
    for result in rdr.records().take(max_rows) {
        let record = result?;
        let mut row = SampleRow::new();
        for (i, header) in headers.iter().enumerate() {
            if let Some(value) = record.get(i) {
                row.insert(header.clone(), Value::String(value.to_string()));
            }
        }
        sample_rows.push(row);
    }

    debug!(
        headers = headers.len(),
        rows = sample_rows.len(),
        "Read export preview"
    );

    Ok(ClassificationRequest {
        headers,
        sample_rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preview_binance_spot_export() {
        let csv = "Date(UTC),Pair,Side,Price,Executed,Amount,Fee\n\
                   2025-06-01 10:00:00,BTCUSDT,BUY,67000.00,0.5BTC,33500USDT,0.0005BTC\n\
                   2025-06-01 11:30:00,ETHUSDT,SELL,3500.00,2ETH,7000USDT,7USDT\n";

        let request = read_export_preview(csv.as_bytes(), DEFAULT_PREVIEW_ROWS).unwrap();
        assert_eq!(request.headers[1], "Pair");
        assert_eq!(request.sample_rows.len(), 2);
        assert_eq!(
            request.sample_rows[0].get("Pair"),
            Some(&Value::String("BTCUSDT".to_string()))
        );
    }

    #[test]
    fn test_preview_caps_rows() {
        let csv = "a,b\n1,2\n3,4\n5,6\n7,8\n";
        let request = read_export_preview(csv.as_bytes(), 2).unwrap();
        assert_eq!(request.sample_rows.len(), 2);
    }

    #[test]
    fn test_preview_tolerates_ragged_rows() {
        let csv = "a,b,c\n1,2\n";
        let request = read_export_preview(csv.as_bytes(), 3).unwrap();
        assert_eq!(request.sample_rows.len(), 1);
        assert!(request.sample_rows[0].get("c").is_none());
    }

    #[test]
    fn test_preview_headers_only() {
        let csv = "Date,Pair,Executed\n";
        let request = read_export_preview(csv.as_bytes(), 3).unwrap();
        assert_eq!(request.headers.len(), 3);
        assert!(request.sample_rows.is_empty());
    }
}
