use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::DashboardError;
use crate::record::{Dimension, REVENUE_COLUMN, SalesRecord};

/// Where the full, unfiltered sales records come from
///
/// The cross-filter core calls `load` whenever it has to start over: on a new session,
/// on reset, and whenever the stored working dataset cannot be reused.
pub trait SalesSource {
    fn load(&self) -> Result<Vec<SalesRecord>, DashboardError>;
}

/// Sales records read from a CSV file on every load
#[derive(Clone, Debug)]
pub struct CsvSource {
    path: PathBuf,
}

impl CsvSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        CsvSource { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SalesSource for CsvSource {
    fn load(&self) -> Result<Vec<SalesRecord>, DashboardError> {
        log::info!("Reading sales data from {}", self.path.display());
        from_csv(&self.path)
    }
}

/// Load sales records from a CSV file
///
/// The file must have a header row naming the `Product Name`, `Region Name`,
/// `Month Name` and `Revenue` columns; other columns are ignored and column order
/// does not matter.
///
/// # Arguments
/// * `filepath` - Path to the CSV file to load
///
/// # Returns
/// * `Result<Vec<SalesRecord>, DashboardError>` - The records in file order, or
///   `DataSourceUnavailable` if the file is missing, unreadable or malformed
///
/// # Examples
/// ```no_run
/// use sales_dashboard::loader::from_csv;
///
/// match from_csv("assets/sales_data.csv") {
///     Ok(records) => println!("Loaded {} sales records", records.len()),
///     Err(e) => eprintln!("Error loading CSV: {}", e),
/// }
/// ```
pub fn from_csv(filepath: impl AsRef<Path>) -> Result<Vec<SalesRecord>, DashboardError> {
    let path = filepath.as_ref();
    let file = File::open(path).map_err(|e| DashboardError::unavailable(path, e))?;
    from_reader(file, path)
}

/// Parse sales records from any CSV stream; `origin` only labels errors.
pub fn from_reader<R: Read>(reader: R, origin: &Path) -> Result<Vec<SalesRecord>, DashboardError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .map_err(|e| DashboardError::unavailable(origin, e))?
        .clone();

    let column_index = |name: &str| {
        headers
            .iter()
            .position(|header| header == name)
            .ok_or_else(|| DashboardError::unavailable(origin, format!("missing column '{}'", name)))
    };

    let product_col = column_index(Dimension::Product.column())?;
    let region_col = column_index(Dimension::Region.column())?;
    let month_col = column_index(Dimension::Month.column())?;
    let revenue_col = column_index(REVENUE_COLUMN)?;

    let mut records = Vec::new();
    for result in csv_reader.records() {
        let row = result.map_err(|e| DashboardError::unavailable(origin, e))?;
        let line = row.position().map(|p| p.line()).unwrap_or(0);

        let field = |index: usize, name: &str| {
            row.get(index).ok_or_else(|| {
                DashboardError::unavailable(
                    origin,
                    format!("line {}: missing value for '{}'", line, name),
                )
            })
        };

        let revenue_text = field(revenue_col, REVENUE_COLUMN)?;
        let revenue = parse_revenue(revenue_text).ok_or_else(|| {
            DashboardError::unavailable(
                origin,
                format!("line {}: revenue '{}' is not a number", line, revenue_text),
            )
        })?;

        records.push(SalesRecord {
            product: field(product_col, Dimension::Product.column())?.to_string(),
            region: field(region_col, Dimension::Region.column())?.to_string(),
            month: field(month_col, Dimension::Month.column())?.to_string(),
            revenue,
        });
    }

    log::debug!("Parsed {} sales records from {}", records.len(), origin.display());
    Ok(records)
}

fn parse_revenue(text: &str) -> Option<f64> {
    let value: f64 = text.trim().parse().ok()?;
    value.is_finite().then_some(value)
}
