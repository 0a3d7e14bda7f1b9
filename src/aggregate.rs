use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::record::{Dimension, REVENUE_COLUMN, SalesRecord};

/// Summed revenue for one category of a dimension
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct AggregateRow {
    pub category: String,
    pub revenue: f64,
}

/// Everything the page needs to draw one bar chart
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct ChartSpec {
    /// DOM id of the graph element
    pub id: String,
    pub dimension: Dimension,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub rows: Vec<AggregateRow>,
}

impl ChartSpec {
    pub fn total(&self) -> f64 {
        self.rows.iter().map(|row| row.revenue).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Group `records` by `dimension` and sum revenue per category
///
/// Categories come out in ascending order. An empty input gives an empty output.
pub fn aggregate_by(records: &[SalesRecord], dimension: Dimension) -> Vec<AggregateRow> {
    let mut sums: BTreeMap<&str, f64> = BTreeMap::new();

    for record in records {
        *sums.entry(record.value_of(dimension)).or_insert(0.0) += record.revenue;
    }

    sums.into_iter()
        .map(|(category, revenue)| AggregateRow {
            category: category.to_string(),
            revenue,
        })
        .collect()
}

/// Build the chart for a single dimension
pub fn chart_for(records: &[SalesRecord], dimension: Dimension) -> ChartSpec {
    ChartSpec {
        id: dimension.chart_id().to_string(),
        dimension,
        title: dimension.title().to_string(),
        x_label: dimension.column().to_string(),
        y_label: REVENUE_COLUMN.to_string(),
        rows: aggregate_by(records, dimension),
    }
}

/// Build all three charts in page order (product, region, month)
pub fn build_charts(records: &[SalesRecord]) -> Vec<ChartSpec> {
    Dimension::ALL
        .iter()
        .map(|&dimension| chart_for(records, dimension))
        .collect()
}
