/*!
# Sales Dashboard

A browser-based sales dashboard with cross-filtering, built in Rust.

## Overview

The dashboard shows total revenue by product, by region and by month as three bar
charts over a CSV file of sales records. Clicking a bar narrows every chart to the
rows matching that bar; further clicks keep narrowing. A reset control starts over
from the full file.

## Architecture

### Frontend
- A single HTML page (`src/static/dashboard.html`) draws the charts as SVG bars,
  keeps the working dataset in the browser's session storage and sends each
  interaction to the server.

### Backend
- **Cross-filter core** (`crossfilter`): decides between reloading the source and
  reusing the stored working dataset, applies the clicked filter and builds the charts.
  It holds no state of its own; the working dataset travels with each request.
- **Session lifecycle** (`session`): opaque tokens issued on page load and replaced on
  reset. A dataset stored under another token is never reused.
- **Aggregation** (`aggregate`): group-by-and-sum per dimension.
- **Source** (`loader`): CSV reading with required columns.
- **Exports** (`downloader`, `graph`): CSV/XLSX downloads of the working dataset and
  PNG renderings of a chart.

## REST API Endpoints

- `GET /` - Dashboard page; starts a session
- `POST /api/interact` - Session created or chart clicked
- `POST /api/reset` - Replace the session token and reload
- `POST /api/export/csv`, `/api/export/xlsx` - Download the working dataset
- `POST /api/chart/{dimension}` - PNG of one chart
- `GET /health` - Liveness
*/

pub mod aggregate;
pub mod crossfilter;
pub mod downloader;
pub mod error;
pub mod loader;
pub mod record;
pub mod session;

#[cfg(feature = "web")]
pub mod app;
#[cfg(feature = "web")]
pub mod config;
#[cfg(feature = "web")]
pub mod graph;

/// Re-export the types most callers need
pub use aggregate::{AggregateRow, ChartSpec};
pub use crossfilter::{Event, Filter, Interaction, StoredState, interact};
pub use error::DashboardError;
pub use loader::{CsvSource, SalesSource};
pub use record::{Dimension, SalesRecord};
pub use session::SessionToken;
