//! Report sinks for the accepted invoice records.

use std::fmt::Write as _;
use std::io::Write;

use chrono::NaiveDate;
use serde::Serialize;

use proscan_core::{InvoiceRecord, ProscanError, ReportSink, UNSET_DATE};

/// Column headers of the tabular report.
pub const HEADERS: [&str; 4] = ["PRO", "Pieces", "Date", "LoadID"];

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Comma-separated values with a header row
    Csv,
    /// JSON array of records
    Json,
    /// Aligned plain-text table
    Text,
}

/// Render an invoice date, leaving unset dates blank.
pub fn format_date(date: NaiveDate, format: &str) -> proscan_core::Result<String> {
    if date == UNSET_DATE {
        return Ok(String::new());
    }

    let mut out = String::new();
    write!(out, "{}", date.format(format))
        .map_err(|_| ProscanError::Report(format!("Invalid date format: {format}")))?;
    Ok(out)
}

fn report_error(e: impl std::fmt::Display) -> ProscanError {
    ProscanError::Report(e.to_string())
}

/// One report row with the date already rendered.
#[derive(Debug, Serialize)]
struct Row<'a> {
    pro: &'a str,
    pieces: u32,
    date: String,
    load_id: &'a str,
}

fn rows<'a>(records: &'a [InvoiceRecord], date_format: &str) -> proscan_core::Result<Vec<Row<'a>>> {
    records
        .iter()
        .map(|r| {
            Ok(Row {
                pro: r.tracking_number(),
                pieces: r.piece_count(),
                date: format_date(r.invoice_date(), date_format)?,
                load_id: r.load_id(),
            })
        })
        .collect()
}

pub struct CsvReport<W: Write> {
    writer: W,
    date_format: String,
}

impl<W: Write> CsvReport<W> {
    pub fn new(writer: W, date_format: impl Into<String>) -> Self {
        Self {
            writer,
            date_format: date_format.into(),
        }
    }
}

impl<W: Write> ReportSink for CsvReport<W> {
    fn write_records(&mut self, records: &[InvoiceRecord]) -> proscan_core::Result<()> {
        let rows = rows(records, &self.date_format)?;
        let mut wtr = csv::Writer::from_writer(&mut self.writer);

        wtr.write_record(HEADERS).map_err(report_error)?;
        for row in &rows {
            wtr.write_record([
                row.pro,
                row.pieces.to_string().as_str(),
                row.date.as_str(),
                row.load_id,
            ])
            .map_err(report_error)?;
        }

        wtr.flush()?;
        Ok(())
    }
}

pub struct JsonReport<W: Write> {
    writer: W,
    date_format: String,
}

impl<W: Write> JsonReport<W> {
    pub fn new(writer: W, date_format: impl Into<String>) -> Self {
        Self {
            writer,
            date_format: date_format.into(),
        }
    }
}

impl<W: Write> ReportSink for JsonReport<W> {
    fn write_records(&mut self, records: &[InvoiceRecord]) -> proscan_core::Result<()> {
        let rows = rows(records, &self.date_format)?;
        serde_json::to_writer_pretty(&mut self.writer, &rows).map_err(report_error)?;
        writeln!(self.writer)?;
        self.writer.flush()?;
        Ok(())
    }
}

pub struct TextReport<W: Write> {
    writer: W,
    date_format: String,
}

impl<W: Write> TextReport<W> {
    pub fn new(writer: W, date_format: impl Into<String>) -> Self {
        Self {
            writer,
            date_format: date_format.into(),
        }
    }
}

impl<W: Write> ReportSink for TextReport<W> {
    fn write_records(&mut self, records: &[InvoiceRecord]) -> proscan_core::Result<()> {
        let rows = rows(records, &self.date_format)?;
        let cells: Vec<[String; 4]> = rows
            .iter()
            .map(|r| {
                [
                    r.pro.to_string(),
                    r.pieces.to_string(),
                    r.date.clone(),
                    r.load_id.to_string(),
                ]
            })
            .collect();

        let mut widths = HEADERS.map(str::len);
        for row in &cells {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.len());
            }
        }

        let header = HEADERS.map(str::to_string);
        for row in std::iter::once(&header).chain(&cells) {
            let line = row
                .iter()
                .zip(widths)
                .map(|(cell, width)| format!("{cell:<width$}"))
                .collect::<Vec<_>>()
                .join("  ");
            writeln!(self.writer, "{}", line.trim_end())?;
        }

        self.writer.flush()?;
        Ok(())
    }
}

/// Build the sink for `format` over `writer`.
pub fn create_sink<'a>(
    format: OutputFormat,
    writer: Box<dyn Write + 'a>,
    date_format: &str,
) -> Box<dyn ReportSink + 'a> {
    match format {
        OutputFormat::Csv => Box::new(CsvReport::new(writer, date_format)),
        OutputFormat::Json => Box::new(JsonReport::new(writer, date_format)),
        OutputFormat::Text => Box::new(TextReport::new(writer, date_format)),
    }
}
