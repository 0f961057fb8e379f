//! Spreadsheet (CSV) parsing for bulk creation of drivers, plates, and vehicle sets.
//!
//! Spreadsheets are exported by hand from office tools, so the parser is
//! lenient about layout: the delimiter (`,` or `;`) is detected from the
//! header line, header names are matched case-insensitively against English
//! and Portuguese aliases, and cells are trimmed. Each data row is validated
//! independently; a bad row is reported with its spreadsheet line number and
//! does not stop the rest of the file.

use std::collections::{HashMap, HashSet};

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Serialize;

use crate::credentials::{require_text, validate_cpf, validate_plate};
use crate::error::CoreError;
use crate::fleet::{PLATE_TRACTOR, PLATE_TRAILER};

/// A row that failed validation. `line` is the spreadsheet line (header = 1).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowError {
    pub line: usize,
    pub message: String,
}

/// Parsed rows paired with their spreadsheet line, plus per-row failures.
#[derive(Debug)]
pub struct Parsed<T> {
    pub rows: Vec<(usize, T)>,
    pub errors: Vec<RowError>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DriverRow {
    pub name: String,
    pub cpf: String,
    pub rg: String,
    pub cnh: String,
    pub unit: String,
    pub operation: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlateRow {
    pub plate: String,
    pub kind: &'static str,
    pub unit: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct VehicleRow {
    pub name: String,
    pub tractor_plate: String,
    pub trailer_plates: Vec<String>,
    pub unit: String,
    pub operation: Option<String>,
}

/// Column definition: canonical name, accepted header aliases, required flag.
struct Column {
    name: &'static str,
    aliases: &'static [&'static str],
    required: bool,
}

const DRIVER_COLUMNS: &[Column] = &[
    Column { name: "name", aliases: &["name", "nome"], required: true },
    Column { name: "cpf", aliases: &["cpf"], required: true },
    Column { name: "rg", aliases: &["rg"], required: true },
    Column { name: "cnh", aliases: &["cnh"], required: true },
    Column { name: "unit", aliases: &["unit", "unidade"], required: true },
    Column {
        name: "operation",
        aliases: &["operation", "operacao", "operação", "frota"],
        required: false,
    },
];

const PLATE_COLUMNS: &[Column] = &[
    Column { name: "plate", aliases: &["plate", "placa"], required: true },
    Column { name: "kind", aliases: &["kind", "tipo"], required: true },
    Column { name: "unit", aliases: &["unit", "unidade"], required: true },
];

const VEHICLE_COLUMNS: &[Column] = &[
    Column { name: "name", aliases: &["name", "nome", "conjunto"], required: true },
    Column { name: "tractor", aliases: &["tractor", "cavalo"], required: true },
    Column { name: "trailer1", aliases: &["trailer1", "carreta1", "carreta 1"], required: false },
    Column { name: "trailer2", aliases: &["trailer2", "carreta2", "carreta 2"], required: false },
    Column { name: "unit", aliases: &["unit", "unidade"], required: true },
    Column {
        name: "operation",
        aliases: &["operation", "operacao", "operação"],
        required: false,
    },
];

/// Pick `;` when the header line has more semicolons than commas.
pub fn detect_delimiter(data: &[u8]) -> u8 {
    let header = data.split(|b| *b == b'\n').next().unwrap_or(&[]);
    let commas = header.iter().filter(|b| **b == b',').count();
    let semicolons = header.iter().filter(|b| **b == b';').count();
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}

/// Map a plate kind cell (English or Portuguese) to the stored kind.
pub fn parse_plate_kind(raw: &str) -> Option<&'static str> {
    match raw.trim().to_lowercase().as_str() {
        "tractor" | "cavalo" | "cavalo mecânico" | "cavalo mecanico" => Some(PLATE_TRACTOR),
        "trailer" | "carreta" | "semirreboque" | "reboque" => Some(PLATE_TRAILER),
        _ => None,
    }
}

/// A record with header-resolved column access.
struct Row<'a> {
    record: &'a StringRecord,
    index: &'a HashMap<&'static str, usize>,
}

impl Row<'_> {
    fn get(&self, column: &str) -> Option<&str> {
        self.index
            .get(column)
            .and_then(|i| self.record.get(*i))
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    fn required(&self, column: &str) -> Result<String, CoreError> {
        let value = self.get(column).unwrap_or("");
        require_text(column, value)?;
        Ok(value.to_string())
    }
}

/// Read the file and hand each data row to `parse_row`.
fn parse_with<T>(
    data: &[u8],
    columns: &[Column],
    mut parse_row: impl FnMut(&Row<'_>) -> Result<T, CoreError>,
) -> Result<Parsed<T>, CoreError> {
    let data = data.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(data);
    let mut reader = ReaderBuilder::new()
        .delimiter(detect_delimiter(data))
        .trim(Trim::All)
        .flexible(true)
        .from_reader(data);

    let headers = reader
        .headers()
        .map_err(|e| CoreError::Validation(format!("Unreadable header row: {e}")))?
        .clone();

    let mut index: HashMap<&'static str, usize> = HashMap::new();
    for (i, header) in headers.iter().enumerate() {
        let header = header.trim().to_lowercase();
        if let Some(col) = columns.iter().find(|c| c.aliases.contains(&header.as_str())) {
            index.entry(col.name).or_insert(i);
        }
    }

    let missing: Vec<&str> = columns
        .iter()
        .filter(|c| c.required && !index.contains_key(c.name))
        .map(|c| c.name)
        .collect();
    if !missing.is_empty() {
        return Err(CoreError::Validation(format!(
            "Missing required columns: {}",
            missing.join(", ")
        )));
    }

    let mut parsed = Parsed { rows: Vec::new(), errors: Vec::new() };
    for (i, record) in reader.records().enumerate() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                let line = e.position().map(|p| p.line() as usize).unwrap_or(i + 2);
                parsed.errors.push(RowError { line, message: e.to_string() });
                continue;
            }
        };
        let line = record.position().map(|p| p.line() as usize).unwrap_or(i + 2);
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        let row = Row { record: &record, index: &index };
        match parse_row(&row) {
            Ok(value) => parsed.rows.push((line, value)),
            Err(e) => parsed.errors.push(RowError { line, message: error_message(e) }),
        }
    }
    Ok(parsed)
}

fn error_message(err: CoreError) -> String {
    match err {
        CoreError::Validation(msg) | CoreError::Conflict(msg) => msg,
        other => other.to_string(),
    }
}

/// Parse a driver spreadsheet. A CPF, RG or CNH repeated within the file is
/// a row error; the first row carrying it is kept.
pub fn parse_drivers(data: &[u8]) -> Result<Parsed<DriverRow>, CoreError> {
    let mut seen_cpf = HashSet::new();
    let mut seen_rg = HashSet::new();
    let mut seen_cnh = HashSet::new();
    parse_with(data, DRIVER_COLUMNS, |row| {
        let cpf = validate_cpf(&row.required("cpf")?)?;
        let rg = row.required("rg")?;
        let cnh = row.required("cnh")?;
        if seen_cpf.contains(&cpf) {
            return Err(CoreError::Conflict(format!("CPF {cpf} repeated in file")));
        }
        if seen_rg.contains(&rg) {
            return Err(CoreError::Conflict(format!("RG {rg} repeated in file")));
        }
        if seen_cnh.contains(&cnh) {
            return Err(CoreError::Conflict(format!("CNH {cnh} repeated in file")));
        }
        let driver = DriverRow {
            name: row.required("name")?,
            cpf,
            rg,
            cnh,
            unit: row.required("unit")?,
            operation: row.get("operation").map(str::to_string),
        };
        seen_cpf.insert(driver.cpf.clone());
        seen_rg.insert(driver.rg.clone());
        seen_cnh.insert(driver.cnh.clone());
        Ok(driver)
    })
}

/// Parse a plate spreadsheet. Duplicate plates within the file are row errors.
pub fn parse_plates(data: &[u8]) -> Result<Parsed<PlateRow>, CoreError> {
    let mut seen = HashSet::new();
    parse_with(data, PLATE_COLUMNS, |row| {
        let plate = validate_plate(&row.required("plate")?)?;
        let kind_raw = row.required("kind")?;
        let kind = parse_plate_kind(&kind_raw).ok_or_else(|| {
            CoreError::Validation(format!("Unknown plate kind '{kind_raw}'"))
        })?;
        if !seen.insert(plate.clone()) {
            return Err(CoreError::Conflict(format!("Plate {plate} repeated in file")));
        }
        Ok(PlateRow { plate, kind, unit: row.required("unit")? })
    })
}

/// Parse a vehicle-set spreadsheet. Plates are normalized but not resolved.
pub fn parse_vehicles(data: &[u8]) -> Result<Parsed<VehicleRow>, CoreError> {
    parse_with(data, VEHICLE_COLUMNS, |row| {
        let tractor_plate = validate_plate(&row.required("tractor")?)?;
        let trailer_plates = ["trailer1", "trailer2"]
            .iter()
            .filter_map(|c| row.get(c))
            .map(validate_plate)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(VehicleRow {
            name: row.required("name")?,
            tractor_plate,
            trailer_plates,
            unit: row.required("unit")?,
            operation: row.get("operation").map(str::to_string),
        })
    })
}
