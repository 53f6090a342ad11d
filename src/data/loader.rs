use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result, bail};
use calamine::{Data, Reader, open_workbook_auto_from_rs};

use super::model::{Series, SeriesCollection};

/// Message shown to the user in place of a file that failed to parse.
pub const FILE_ERROR_MESSAGE: &str = "There was an error processing this file.";

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// One raw upload: the file's bytes plus the name it was uploaded under.
#[derive(Debug, Clone)]
pub struct Upload {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    /// Read a file from disk, keeping only its file name.
    pub fn from_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("{} has no usable file name", path.display()))?;
        Ok(Self::new(filename, bytes))
    }
}

/// A file that could not be parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct FileError {
    pub filename: String,
    pub message: String,
}

/// Result of processing a batch of uploads.
#[derive(Debug, Default)]
pub struct UploadOutcome {
    /// Successfully parsed series paired with the filename they came from.
    pub parsed: Vec<(String, Series)>,
    pub errors: Vec<FileError>,
}

impl UploadOutcome {
    pub fn collection(&self) -> SeriesCollection {
        self.parsed.iter().map(|(_, s)| s.clone()).collect()
    }
}

/// Parse every upload. A failing file is recorded and does not stop the rest.
pub fn process_uploads(uploads: &[Upload]) -> UploadOutcome {
    let mut outcome = UploadOutcome::default();
    for upload in uploads {
        match parse_upload(&upload.bytes, &upload.filename) {
            Ok(series) => {
                log::info!(
                    "Parsed {} ({} samples, columns {:?})",
                    upload.filename,
                    series.len(),
                    series.columns
                );
                outcome.parsed.push((upload.filename.clone(), series));
            }
            Err(e) => {
                log::error!("Failed to parse {}: {e:#}", upload.filename);
                outcome.errors.push(FileError {
                    filename: upload.filename.clone(),
                    message: FILE_ERROR_MESSAGE.to_string(),
                });
            }
        }
    }
    outcome
}

/// Parse an uploaded file into a series.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`          – comma separated, header row optional
/// * `.xls` / `.xlsx` – first worksheet
/// * `.dat`          – whitespace separated text
///
/// Only the first two columns are used; the rest are ignored. A first row
/// whose two leading cells are numbers is kept as data, not taken as a header.
/// Non-finite values (`inf`, `NaN`) are rejected.
pub fn parse_upload(bytes: &[u8], filename: &str) -> Result<Series> {
    let ext = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let rows = match ext.as_str() {
        "csv" => read_csv(bytes)?,
        "xls" | "xlsx" => read_excel(bytes)?,
        "dat" => read_whitespace(bytes)?,
        other => bail!("Unsupported file extension: .{other}"),
    };

    let (columns, x, y) = two_columns(rows).with_context(|| format!("reading {filename}"))?;
    Ok(Series::new(file_base(filename), columns, x, y))
}

/// File name with its extension stripped.
pub fn file_base(filename: &str) -> String {
    Path::new(filename)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(filename)
        .to_string()
}

// ---------------------------------------------------------------------------
// Row readers – every format is reduced to rows of text cells
// ---------------------------------------------------------------------------

fn decode_text(bytes: &[u8]) -> Result<&str> {
    let text = std::str::from_utf8(bytes).context("file is not valid UTF-8")?;
    Ok(text.strip_prefix('\u{feff}').unwrap_or(text))
}

fn read_csv(bytes: &[u8]) -> Result<Vec<Vec<String>>> {
    let text = decode_text(bytes)?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        if record.iter().all(|field| field.is_empty()) {
            continue;
        }
        rows.push(record.iter().map(str::to_string).collect());
    }
    Ok(rows)
}

fn read_whitespace(bytes: &[u8]) -> Result<Vec<Vec<String>>> {
    let text = decode_text(bytes)?;
    Ok(text
        .lines()
        .map(|line| line.split_whitespace().map(str::to_string).collect::<Vec<_>>())
        .filter(|fields| !fields.is_empty())
        .collect())
}

fn read_excel(bytes: &[u8]) -> Result<Vec<Vec<String>>> {
    let mut workbook =
        open_workbook_auto_from_rs(Cursor::new(bytes)).context("opening spreadsheet")?;
    let range = workbook
        .worksheet_range_at(0)
        .context("spreadsheet has no worksheets")?
        .context("reading first worksheet")?;

    Ok(range
        .rows()
        .map(|row| row.iter().map(cell_text).collect::<Vec<_>>())
        .filter(|fields| fields.iter().any(|f| !f.is_empty()))
        .collect())
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::String(s) => s.trim().to_string(),
        Data::Bool(b) => b.to_string(),
        other => format!("{other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Table shaping
// ---------------------------------------------------------------------------

type TwoColumns = ([String; 2], Vec<f64>, Vec<f64>);

/// Reduce rows to the first two numeric columns. The first row is a header
/// unless both of its leading cells are numbers.
fn two_columns(rows: Vec<Vec<String>>) -> Result<TwoColumns> {
    let mut rows = rows.into_iter().enumerate().peekable();

    let Some((_, first)) = rows.peek() else {
        bail!("file contains no rows");
    };
    if first.len() < 2 {
        bail!("expected at least two columns, found {}", first.len());
    }

    let headerless = parse_number(&first[0]).is_some() && parse_number(&first[1]).is_some();
    let columns = if headerless {
        ["0".to_string(), "1".to_string()]
    } else {
        let header = [first[0].clone(), first[1].clone()];
        rows.next();
        header
    };

    let mut x = Vec::new();
    let mut y = Vec::new();
    for (row_no, row) in rows {
        if row.len() < 2 {
            bail!("row {row_no}: expected at least two columns, found {}", row.len());
        }
        x.push(parse_cell(&row[0], row_no, &columns[0])?);
        y.push(parse_cell(&row[1], row_no, &columns[1])?);
    }

    if y.is_empty() {
        bail!("file contains a header but no data rows");
    }
    Ok((columns, x, y))
}

fn parse_number(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_cell(s: &str, row: usize, col: &str) -> Result<f64> {
    parse_number(s).with_context(|| format!("row {row}, column '{col}': '{s}' is not a number"))
}
