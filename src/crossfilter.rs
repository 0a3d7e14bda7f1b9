//! Cross-filter state machine.
//!
//! Every interaction with the dashboard lands in [`interact`]: it picks the dataset to
//! work on (fresh from the source, or the one stored by the previous interaction),
//! narrows it by the clicked category if the event was a chart click, and aggregates
//! the result into the three charts. The narrowed dataset goes back to the caller to
//! be stored until the next interaction; nothing is kept between calls.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::aggregate::{ChartSpec, build_charts};
use crate::error::DashboardError;
use crate::loader::SalesSource;
use crate::record::{Dimension, SalesRecord};
use crate::session::SessionToken;

/// What triggered an interaction
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    /// The page was loaded and a session token issued.
    SessionCreated,

    /// A bar was clicked; `payload` is the chart's click data.
    ChartClicked { chart: Dimension, payload: Value },

    /// The reset control was activated and the session token replaced.
    ResetActivated,
}

/// An equality filter applied by one chart click
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Filter {
    pub dimension: Dimension,
    pub value: String,
}

impl Filter {
    pub fn matches(&self, record: &SalesRecord) -> bool {
        record.value_of(self.dimension) == self.value
    }
}

/// The working dataset as handed to the client-side store between interactions
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoredState {
    /// Session the dataset was produced under.
    pub session: SessionToken,

    /// Filters applied since the last reload, oldest first.
    #[serde(default)]
    pub filters: Vec<Filter>,

    pub records: Vec<SalesRecord>,
}

impl StoredState {
    fn fresh(session: SessionToken, records: Vec<SalesRecord>) -> Self {
        StoredState {
            session,
            filters: Vec::new(),
            records,
        }
    }

    /// Keep only records matching `filter`; earlier filters stay in effect.
    fn narrow(&mut self, filter: Filter) {
        self.records.retain(|record| filter.matches(record));
        self.filters.push(filter);
    }
}

/// Result of one interaction
#[derive(Clone, Debug, PartialEq)]
pub struct Interaction {
    /// Product, region and month charts, in that order.
    pub charts: Vec<ChartSpec>,

    /// Working dataset to store for the next interaction.
    pub stored: StoredState,

    /// Whether the source was read for this interaction.
    pub reloaded: bool,
}

impl Interaction {
    /// True when the filters left no rows; the charts are then empty too.
    pub fn is_empty(&self) -> bool {
        self.stored.records.is_empty()
    }
}

/// Handle one dashboard interaction
///
/// # Arguments
/// * `source` - Where the full dataset is reloaded from
/// * `session` - The session's current token (already replaced if this is a reset)
/// * `event` - What triggered the interaction
/// * `stored` - Working dataset stored by the previous interaction, if any
///
/// # Returns
/// * `Result<Interaction, DashboardError>` - The three charts and the next working
///   dataset
///
/// # Errors
/// * `InvalidInteractionPayload` if a click payload has no clicked category
/// * `DataSourceUnavailable` if a reload was needed and the source failed
///
/// # Notes
/// * The source is reloaded when nothing is stored, when the session was created or
///   reset, or when the stored dataset belongs to another session token.
/// * A click always narrows the dataset it is applied to, so two clicks on the same
///   chart combine like clicks on different charts: the second keeps only rows that
///   match both values.
pub fn interact<S: SalesSource + ?Sized>(
    source: &S,
    session: SessionToken,
    event: &Event,
    stored: Option<StoredState>,
) -> Result<Interaction, DashboardError> {
    let click = match event {
        Event::ChartClicked { chart, payload } => Some(Filter {
            dimension: *chart,
            value: clicked_category(payload)?,
        }),
        Event::SessionCreated | Event::ResetActivated => None,
    };

    let (mut working, reloaded) = match (event, stored) {
        (Event::SessionCreated | Event::ResetActivated, _) | (_, None) => {
            (StoredState::fresh(session, source.load()?), true)
        }
        (_, Some(state)) if state.session != session => {
            log::info!(
                "Stored dataset belongs to session {}, reloading for {}",
                state.session,
                session
            );
            (StoredState::fresh(session, source.load()?), true)
        }
        (_, Some(state)) => {
            log::debug!("Reusing stored dataset of {} rows", state.records.len());
            (state, false)
        }
    };

    if let Some(filter) = click {
        let before = working.records.len();
        log::info!("Filtering on {} = '{}'", filter.dimension, filter.value);
        working.narrow(filter);
        log::debug!("Filter kept {} of {} rows", working.records.len(), before);
    }

    if working.records.is_empty() {
        log::info!("Working dataset is empty, rendering empty charts");
    }

    Ok(Interaction {
        charts: render(&working),
        stored: working,
        reloaded,
    })
}

/// Charts for a stored working dataset without applying any new interaction
pub fn render(stored: &StoredState) -> Vec<ChartSpec> {
    build_charts(&stored.records)
}

/// Category of the first clicked point (`points[0].x`)
///
/// Numeric categories are accepted and compared by their text form.
pub fn clicked_category(payload: &Value) -> Result<String, DashboardError> {
    let point = payload
        .get("points")
        .and_then(Value::as_array)
        .and_then(|points| points.first())
        .ok_or_else(|| DashboardError::invalid_payload("click data has no points"))?;

    match point.get("x") {
        Some(Value::String(category)) => Ok(category.clone()),
        Some(Value::Number(number)) => Ok(number.to_string()),
        Some(other) => Err(DashboardError::invalid_payload(format!(
            "clicked category must be text, got {}",
            other
        ))),
        None => Err(DashboardError::invalid_payload(
            "clicked point has no 'x' category",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::AggregateRow;
    use serde_json::json;
    use std::cell::Cell;

    /// Source that counts how often it is read
    struct CountingSource {
        records: Vec<SalesRecord>,
        loads: Cell<usize>,
    }

    impl CountingSource {
        fn new(records: Vec<SalesRecord>) -> Self {
            CountingSource {
                records,
                loads: Cell::new(0),
            }
        }
    }

    impl SalesSource for CountingSource {
        fn load(&self) -> Result<Vec<SalesRecord>, DashboardError> {
            self.loads.set(self.loads.get() + 1);
            Ok(self.records.clone())
        }
    }

    struct MissingSource;

    impl SalesSource for MissingSource {
        fn load(&self) -> Result<Vec<SalesRecord>, DashboardError> {
            Err(DashboardError::unavailable("assets/sales_data.csv", "not found"))
        }
    }

    fn example_rows() -> Vec<SalesRecord> {
        vec![
            SalesRecord::new("P1", "R1", "M1", 100.0),
            SalesRecord::new("P1", "R2", "M1", 50.0),
            SalesRecord::new("P2", "R1", "M2", 30.0),
        ]
    }

    fn wider_rows() -> Vec<SalesRecord> {
        vec![
            SalesRecord::new("P1", "R1", "M1", 100.0),
            SalesRecord::new("P1", "R2", "M1", 50.0),
            SalesRecord::new("P2", "R1", "M2", 30.0),
            SalesRecord::new("P1", "R1", "M2", 20.0),
            SalesRecord::new("P3", "R3", "M3", 5.0),
            SalesRecord::new("P2", "R2", "M1", 75.0),
        ]
    }

    fn click(chart: Dimension, category: &str) -> Event {
        Event::ChartClicked {
            chart,
            payload: json!({
                "points": [{
                    "curveNumber": 0,
                    "pointNumber": 0,
                    "x": category,
                    "y": 0,
                }]
            }),
        }
    }

    fn pairs(rows: &[AggregateRow]) -> Vec<(&str, f64)> {
        rows.iter()
            .map(|row| (row.category.as_str(), row.revenue))
            .collect()
    }

    #[test]
    fn test_session_created_loads_full_source() {
        let source = CountingSource::new(example_rows());
        let session = SessionToken::issue();

        let result = interact(&source, session, &Event::SessionCreated, None).unwrap();

        assert!(result.reloaded);
        assert_eq!(source.loads.get(), 1);
        assert_eq!(result.stored.records, example_rows());
        assert_eq!(result.stored.session, session);
        assert!(result.stored.filters.is_empty());
        assert_eq!(
            pairs(&result.charts[0].rows),
            vec![("P1", 150.0), ("P2", 30.0)]
        );
    }

    #[test]
    fn test_product_click_cross_filters_other_charts() {
        let source = CountingSource::new(example_rows());
        let session = SessionToken::issue();
        let start = interact(&source, session, &Event::SessionCreated, None).unwrap();

        let result = interact(
            &source,
            session,
            &click(Dimension::Product, "P1"),
            Some(start.stored),
        )
        .unwrap();

        assert!(!result.reloaded);
        assert_eq!(source.loads.get(), 1);
        assert_eq!(
            result.stored.records,
            vec![
                SalesRecord::new("P1", "R1", "M1", 100.0),
                SalesRecord::new("P1", "R2", "M1", 50.0),
            ]
        );
        assert_eq!(pairs(&result.charts[0].rows), vec![("P1", 150.0)]);
        assert_eq!(
            pairs(&result.charts[1].rows),
            vec![("R1", 100.0), ("R2", 50.0)]
        );
        assert_eq!(pairs(&result.charts[2].rows), vec![("M1", 150.0)]);
    }

    #[test]
    fn test_successive_clicks_combine_with_and() {
        let source = CountingSource::new(wider_rows());
        let session = SessionToken::issue();
        let clicks = [
            (Dimension::Product, "P1"),
            (Dimension::Region, "R1"),
            (Dimension::Month, "M2"),
        ];

        let mut stored = interact(&source, session, &Event::SessionCreated, None)
            .unwrap()
            .stored;
        let mut previous_len = stored.records.len();

        for (step, (dimension, value)) in clicks.iter().enumerate() {
            stored = interact(&source, session, &click(*dimension, value), Some(stored))
                .unwrap()
                .stored;

            assert!(stored.records.len() <= previous_len);
            previous_len = stored.records.len();

            let applied = &clicks[..=step];
            let expected: Vec<SalesRecord> = wider_rows()
                .into_iter()
                .filter(|r| applied.iter().all(|(d, v)| r.value_of(*d) == *v))
                .collect();
            assert_eq!(stored.records, expected);
        }

        assert_eq!(stored.records, vec![SalesRecord::new("P1", "R1", "M2", 20.0)]);
        assert_eq!(stored.filters.len(), 3);
        assert_eq!(source.loads.get(), 1);
    }

    #[test]
    fn test_second_click_on_same_chart_narrows_further() {
        let source = CountingSource::new(wider_rows());
        let session = SessionToken::issue();
        let stored = interact(&source, session, &click(Dimension::Product, "P1"), None)
            .unwrap()
            .stored;

        let result = interact(&source, session, &click(Dimension::Product, "P2"), Some(stored))
            .unwrap();

        assert!(result.is_empty());
        assert_eq!(
            result.stored.filters,
            vec![
                Filter {
                    dimension: Dimension::Product,
                    value: "P1".to_string()
                },
                Filter {
                    dimension: Dimension::Product,
                    value: "P2".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_reset_restores_full_dataset_under_new_token() {
        let source = CountingSource::new(wider_rows());
        let session = SessionToken::issue();
        let mut stored = interact(&source, session, &Event::SessionCreated, None)
            .unwrap()
            .stored;
        stored = interact(&source, session, &click(Dimension::Region, "R2"), Some(stored))
            .unwrap()
            .stored;
        stored = interact(&source, session, &click(Dimension::Month, "M1"), Some(stored))
            .unwrap()
            .stored;
        assert_eq!(stored.records.len(), 2);

        let next = session.reset();
        let result = interact(&source, next, &Event::ResetActivated, Some(stored)).unwrap();

        assert_ne!(next, session);
        assert!(result.reloaded);
        assert_eq!(result.stored.records, wider_rows());
        assert_eq!(result.stored.session, next);
        assert!(result.stored.filters.is_empty());
        assert_eq!(source.loads.get(), 2);
    }

    #[test]
    fn test_dataset_from_old_session_is_discarded() {
        let source = CountingSource::new(example_rows());
        let old = SessionToken::issue();
        let stored = interact(&source, old, &click(Dimension::Product, "P2"), None)
            .unwrap()
            .stored;

        let current = old.reset();
        let result = interact(&source, current, &click(Dimension::Region, "R1"), Some(stored))
            .unwrap();

        assert!(result.reloaded);
        assert_eq!(
            result.stored.records,
            vec![
                SalesRecord::new("P1", "R1", "M1", 100.0),
                SalesRecord::new("P2", "R1", "M2", 30.0),
            ]
        );
        assert_eq!(result.stored.filters.len(), 1);
    }

    #[test]
    fn test_click_without_stored_dataset_filters_source() {
        let source = CountingSource::new(example_rows());

        let result = interact(
            &source,
            SessionToken::issue(),
            &click(Dimension::Month, "M2"),
            None,
        )
        .unwrap();

        assert!(result.reloaded);
        assert_eq!(
            result.stored.records,
            vec![SalesRecord::new("P2", "R1", "M2", 30.0)]
        );
    }

    #[test]
    fn test_absent_category_gives_empty_charts() {
        let source = CountingSource::new(example_rows());
        let session = SessionToken::issue();

        let result = interact(&source, session, &click(Dimension::Region, "Atlantis"), None)
            .unwrap();

        assert!(result.is_empty());
        assert_eq!(result.charts.len(), 3);
        assert!(result.charts.iter().all(|chart| chart.rows.is_empty()));
    }

    #[test]
    fn test_render_is_idempotent() {
        let source = CountingSource::new(wider_rows());
        let session = SessionToken::issue();
        let result = interact(&source, session, &click(Dimension::Region, "R1"), None).unwrap();

        assert_eq!(render(&result.stored), result.charts);
        assert_eq!(render(&result.stored), render(&result.stored));
    }

    #[test]
    fn test_aggregates_conserve_working_total() {
        let source = CountingSource::new(wider_rows());
        let result = interact(
            &source,
            SessionToken::issue(),
            &click(Dimension::Product, "P1"),
            None,
        )
        .unwrap();
        let total: f64 = result.stored.records.iter().map(|r| r.revenue).sum();

        for chart in &result.charts {
            assert_eq!(chart.total(), total);
        }
    }

    #[test]
    fn test_click_payload_errors() {
        let source = CountingSource::new(example_rows());
        let session = SessionToken::issue();

        for payload in [
            json!({}),
            json!({ "points": [] }),
            json!({ "points": [{ "y": 10 }] }),
            json!({ "points": [{ "x": null }] }),
        ] {
            let event = Event::ChartClicked {
                chart: Dimension::Product,
                payload,
            };
            let err = interact(&source, session, &event, None).unwrap_err();
            assert!(matches!(err, DashboardError::InvalidInteractionPayload(_)));
        }

        assert_eq!(source.loads.get(), 0);
    }

    #[test]
    fn test_numeric_category_matches_text() {
        let source = CountingSource::new(vec![
            SalesRecord::new("P1", "R1", "1", 10.0),
            SalesRecord::new("P1", "R1", "2", 20.0),
        ]);
        let event = Event::ChartClicked {
            chart: Dimension::Month,
            payload: json!({ "points": [{ "x": 2 }] }),
        };

        let result = interact(&source, SessionToken::issue(), &event, None).unwrap();

        assert_eq!(result.stored.records, vec![SalesRecord::new("P1", "R1", "2", 20.0)]);
    }

    #[test]
    fn test_source_failure_aborts_interaction() {
        let err = interact(&MissingSource, SessionToken::issue(), &Event::SessionCreated, None)
            .unwrap_err();
        assert!(matches!(err, DashboardError::DataSourceUnavailable { .. }));
    }

    #[test]
    fn test_event_wire_format() {
        let event: Event = serde_json::from_value(json!({
            "kind": "chart_clicked",
            "chart": "region",
            "payload": { "points": [{ "x": "R1" }] }
        }))
        .unwrap();
        assert_eq!(
            event,
            Event::ChartClicked {
                chart: Dimension::Region,
                payload: json!({ "points": [{ "x": "R1" }] }),
            }
        );

        let event: Event = serde_json::from_value(json!({ "kind": "session_created" })).unwrap();
        assert_eq!(event, Event::SessionCreated);
    }
}
