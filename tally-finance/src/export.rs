//! CSV export of consolidated records

use anyhow::Result;
use rust_decimal::Decimal;
use serde::Serialize;
use std::io::Write;
use tally_core::AggregateRecord;
use tally_ingest::iso_date;

#[derive(Debug, Serialize)]
struct Row<'a> {
    counterparty: &'a str,
    kind: &'static str,
    events: usize,
    dates: String,
    /// Only filled when the statement year is known
    first_date: Option<String>,
    total: Decimal,
}

/// Write one row per aggregate. `year` turns the first `MM/DD` into an ISO date.
pub fn write_records_csv<W: Write>(records: &[AggregateRecord], year: Option<i32>, out: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    for record in records {
        let first_date = year.and_then(|y| {
            record
                .events()
                .first()
                .and_then(|e| iso_date(&e.date, y))
                .map(|d| d.format("%Y-%m-%d").to_string())
        });
        wtr.serialize(Row {
            counterparty: record.counterparty(),
            kind: record.kind().label(),
            events: record.events().len(),
            dates: record.dates(),
            first_date,
            total: record.total(),
        })?;
    }
    wtr.flush()?;
    Ok(())
}
