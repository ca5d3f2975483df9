//! File exports of fetched listings.
//!
//! Three local renderings are supported over JSON rows exactly as the backend
//! sent them: a column projection to CSV, a full XLSX workbook (every key of
//! every row), and pretty JSON. Server-rendered exports arrive as bytes and
//! are only named and written here.

use chrono::{DateTime, Utc};
use rust_xlsxwriter::{Workbook, XlsxError};
use serde_json::Value;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{AdminError, AdminResult};
use crate::validation::ValidationError;

/// Format requested from the server-side order export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Csv,
    Excel,
    Pdf,
}

impl ExportFormat {
    /// Value sent in the request body.
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "excel",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "csv",
            ExportFormat::Excel => "xlsx",
            ExportFormat::Pdf => "pdf",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Csv => "text/csv",
            ExportFormat::Excel => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Pdf => "application/pdf",
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExportFormat {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "excel" | "xlsx" => Ok(ExportFormat::Excel),
            "pdf" => Ok(ExportFormat::Pdf),
            other => Err(ValidationError::new(
                "format",
                format!("unsupported export format '{}'", other),
            )),
        }
    }
}

/// One CSV column: header text and a dotted path into each row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column<'a> {
    pub label: &'a str,
    pub key: &'a str,
}

impl<'a> Column<'a> {
    pub const fn new(label: &'a str, key: &'a str) -> Self {
        Column { label, key }
    }
}

pub const PRODUCT_COLUMNS: &[Column<'static>] = &[
    Column::new("Name", "name"),
    Column::new("ID", "_id"),
    Column::new("Description", "description"),
    Column::new("Price", "price"),
    Column::new("Category", "category"),
    Column::new("Subcategory", "subCategory"),
    Column::new("Minicategory", "miniCategory"),
    Column::new("Stock", "stock"),
];

pub const ORDER_COLUMNS: &[Column<'static>] = &[
    Column::new("Order ID", "_id"),
    Column::new("Customer", "customerId.name"),
    Column::new("Status", "status"),
    Column::new("Total", "totalAmount"),
    Column::new("Payment", "paymentStatus"),
    Column::new("Method", "paymentMethod"),
    Column::new("Placed On", "createdAt"),
];

pub const DELIVERED_COLUMNS: &[Column<'static>] = &[
    Column::new("Order ID", "orderId"),
    Column::new("Customer Name", "userName"),
    Column::new("Customer Email", "userEmail"),
    Column::new("Delivery Partner Name", "deliveryPartner.name"),
    Column::new("Phone", "deliveryPartner.phone"),
    Column::new("Placed At", "placedAt"),
    Column::new("Delivered At", "deliveredAt"),
    Column::new("Total Amount", "totalAmount"),
];

pub const EARNINGS_COLUMNS: &[Column<'static>] = &[
    Column::new("Partner ID", "partnerId"),
    Column::new("Name", "name"),
    Column::new("Phone", "phone"),
    Column::new("Orders", "orders"),
    Column::new("Total ₹", "earnings"),
];

/// Follows a dotted path through nested objects. Numeric segments index
/// into arrays.
pub fn lookup<'v>(row: &'v Value, key: &str) -> Option<&'v Value> {
    key.split('.').try_fold(row, |value, segment| match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
        _ => None,
    })
}

/// Text of one cell. Missing and null values are empty; nested values are
/// JSON-encoded.
pub fn cell_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(nested) => nested.to_string(),
    }
}

fn write_csv(header: &[&str], rows: impl Iterator<Item = Vec<String>>) -> AdminResult<String> {
    let mut writer = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    writer
        .write_record(header)
        .map_err(|e| AdminError::Io(e.into()))?;
    for record in rows {
        writer
            .write_record(&record)
            .map_err(|e| AdminError::Io(e.into()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| AdminError::Io(e.into_error()))?;
    let mut out = String::from_utf8(bytes).map_err(|e| AdminError::Decode(e.to_string()))?;
    if out.ends_with('\n') {
        out.pop();
    }
    Ok(out)
}

/// Projects `rows` onto `columns`. Lines are joined with `\n` and the output
/// has no trailing newline.
pub fn to_csv(rows: &[Value], columns: &[Column<'_>]) -> AdminResult<String> {
    let header: Vec<&str> = columns.iter().map(|c| c.label).collect();
    write_csv(
        &header,
        rows.iter().map(|row| {
            columns
                .iter()
                .map(|c| cell_text(lookup(row, c.key)))
                .collect()
        }),
    )
}

/// Every top-level key of every row, in order of first appearance.
pub fn sheet_columns(rows: &[Value]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for row in rows {
        if let Value::Object(map) = row {
            for key in map.keys() {
                if !columns.iter().any(|c| c == key) {
                    columns.push(key.clone());
                }
            }
        }
    }
    columns
}

fn xlsx_error(e: XlsxError) -> AdminError {
    AdminError::Export(e.to_string())
}

/// Full dump of `rows` as an XLSX workbook with a single worksheet. The
/// header row holds every key seen in any row; numbers and booleans keep
/// their cell type and nested values are JSON-encoded text.
pub fn sheet_xlsx(rows: &[Value], sheet_name: &str) -> AdminResult<Vec<u8>> {
    let columns = sheet_columns(rows);
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(sheet_name).map_err(xlsx_error)?;

    for (col, key) in columns.iter().enumerate() {
        sheet
            .write_string(0, col as u16, key.as_str())
            .map_err(xlsx_error)?;
    }

    for (index, row) in rows.iter().enumerate() {
        let r = index as u32 + 1;
        for (col, key) in columns.iter().enumerate() {
            let c = col as u16;
            match row.get(key.as_str()) {
                None | Some(Value::Null) => {}
                Some(Value::Bool(b)) => {
                    sheet.write_boolean(r, c, *b).map_err(xlsx_error)?;
                }
                Some(Value::Number(n)) => match n.as_f64() {
                    Some(f) => {
                        sheet.write_number(r, c, f).map_err(xlsx_error)?;
                    }
                    None => {
                        sheet.write_string(r, c, n.to_string()).map_err(xlsx_error)?;
                    }
                },
                value => {
                    sheet.write_string(r, c, cell_text(value)).map_err(xlsx_error)?;
                }
            }
        }
    }

    workbook.save_to_buffer().map_err(xlsx_error)
}

pub fn json_dump(rows: &[Value]) -> AdminResult<String> {
    serde_json::to_string_pretty(rows).map_err(|e| AdminError::Decode(e.to_string()))
}

/// `orders_export_YYYY-MM-DDTHH-MM-SS.<ext>`, with colons made file-safe.
pub fn export_file_name(format: ExportFormat, now: DateTime<Utc>) -> String {
    format!(
        "orders_export_{}.{}",
        now.format("%Y-%m-%dT%H-%M-%S"),
        format.extension()
    )
}

/// Writes `contents` to `dir/name`, creating `dir` if needed.
pub async fn write_export(dir: &Path, name: &str, contents: &[u8]) -> AdminResult<PathBuf> {
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(name);
    tokio::fs::write(&path, contents).await?;
    tracing::info!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(path)
}
