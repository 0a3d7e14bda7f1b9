use crate::error::DashboardError;
use crate::record::{Dimension, REVENUE_COLUMN, SalesRecord};

/// Header row shared by both export formats, in source column order
pub const EXPORT_HEADERS: [&str; 4] = [
    Dimension::Product.column(),
    Dimension::Region.column(),
    Dimension::Month.column(),
    REVENUE_COLUMN,
];

/// Convert a working dataset to CSV
///
/// The output has the same header row as the source file, so an export of the
/// unfiltered dataset can be loaded back as a source.
///
/// # Arguments
/// * `records` - The working dataset to write
///
/// # Returns
/// * `Result<String, DashboardError>` - CSV content, or `Export` on a writer failure
///
/// # Examples
/// ```
/// use sales_dashboard::downloader::to_csv;
/// use sales_dashboard::record::SalesRecord;
///
/// let records = vec![SalesRecord::new("P1", "R1", "M1", 100.0)];
/// let csv = to_csv(&records).unwrap();
/// assert!(csv.starts_with("Product Name,Region Name,Month Name,Revenue"));
/// ```
pub fn to_csv(records: &[SalesRecord]) -> Result<String, DashboardError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    writer
        .write_record(EXPORT_HEADERS)
        .map_err(|e| DashboardError::Export(e.to_string()))?;

    for record in records {
        let revenue = record.revenue.to_string();
        writer
            .write_record([
                record.product.as_str(),
                record.region.as_str(),
                record.month.as_str(),
                revenue.as_str(),
            ])
            .map_err(|e| DashboardError::Export(e.to_string()))?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| DashboardError::Export(e.to_string()))?;
    String::from_utf8(bytes).map_err(|e| DashboardError::Export(e.to_string()))
}

/// Convert a working dataset to XLSX
///
/// One worksheet: the header row, then one row per record with revenue as a number.
///
/// # Arguments
/// * `records` - The working dataset to write
///
/// # Returns
/// * `Result<Vec<u8>, DashboardError>` - XLSX file content as bytes
#[cfg(feature = "web")]
pub fn to_xlsx(records: &[SalesRecord]) -> Result<Vec<u8>, DashboardError> {
    use rust_xlsxwriter::{Workbook, Worksheet, XlsxError};

    let export_error = |e: XlsxError| DashboardError::Export(e.to_string());

    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();
    worksheet.set_name("Working dataset").map_err(export_error)?;

    for (col, header) in EXPORT_HEADERS.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, *header)
            .map_err(export_error)?;
    }

    for (index, record) in records.iter().enumerate() {
        let row = (index + 1) as u32;
        worksheet
            .write_string(row, 0, record.product.as_str())
            .map_err(export_error)?;
        worksheet
            .write_string(row, 1, record.region.as_str())
            .map_err(export_error)?;
        worksheet
            .write_string(row, 2, record.month.as_str())
            .map_err(export_error)?;
        worksheet
            .write_number(row, 3, record.revenue)
            .map_err(export_error)?;
    }

    workbook.push_worksheet(worksheet);

    workbook.save_to_buffer().map_err(export_error)
}
