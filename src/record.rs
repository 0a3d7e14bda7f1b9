use serde::{Deserialize, Serialize};
use std::fmt;

/// One row of the sales source file
///
/// Field names serialize to the source column headers so a stored working dataset
/// reads like the CSV it came from.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct SalesRecord {
    #[serde(rename = "Product Name")]
    pub product: String,

    #[serde(rename = "Region Name")]
    pub region: String,

    #[serde(rename = "Month Name")]
    pub month: String,

    #[serde(rename = "Revenue")]
    pub revenue: f64,
}

impl SalesRecord {
    pub fn new(
        product: impl Into<String>,
        region: impl Into<String>,
        month: impl Into<String>,
        revenue: f64,
    ) -> Self {
        SalesRecord {
            product: product.into(),
            region: region.into(),
            month: month.into(),
            revenue,
        }
    }

    /// Category value of this record along `dimension`
    pub fn value_of(&self, dimension: Dimension) -> &str {
        match dimension {
            Dimension::Product => &self.product,
            Dimension::Region => &self.region,
            Dimension::Month => &self.month,
        }
    }
}

/// The measure column summed by every chart
pub const REVENUE_COLUMN: &str = "Revenue";

/// A categorical column the dashboard charts and filters on
///
/// Each dimension owns exactly one chart; clicking a bar in that chart filters the
/// working dataset on this dimension.
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Dimension {
    Product,
    Region,
    Month,
}

impl Dimension {
    /// Chart order on the page
    pub const ALL: [Dimension; 3] = [Dimension::Product, Dimension::Region, Dimension::Month];

    /// Header of the source column holding this dimension
    pub const fn column(self) -> &'static str {
        match self {
            Dimension::Product => "Product Name",
            Dimension::Region => "Region Name",
            Dimension::Month => "Month Name",
        }
    }

    /// DOM id of the graph element showing this dimension
    pub fn chart_id(self) -> &'static str {
        match self {
            Dimension::Product => "revenue-by-product-graph-id",
            Dimension::Region => "revenue-by-region-graph-id",
            Dimension::Month => "revenue-by-month-graph-id",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Dimension::Product => "Revenue by product",
            Dimension::Region => "Revenue by region",
            Dimension::Month => "Revenue by month",
        }
    }

    /// Accepts either the short name (`product`) or the graph id.
    pub fn parse(name: &str) -> Option<Dimension> {
        Dimension::ALL.into_iter().find(|dimension| {
            let short = match dimension {
                Dimension::Product => "product",
                Dimension::Region => "region",
                Dimension::Month => "month",
            };
            name.eq_ignore_ascii_case(short) || name == dimension.chart_id()
        })
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}
