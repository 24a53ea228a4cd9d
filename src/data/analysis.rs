use super::aggregate::{category_frequency, category_ratings, RankedSeries};
use super::categories::CategorySet;
use super::error::EngineError;
use super::filter::{filtered_indices, FilterCriteria};
use super::model::{RestaurantRecord, RestaurantTable};

// ---------------------------------------------------------------------------
// One recomputation pass: filter → aggregate
// ---------------------------------------------------------------------------

/// Result of the rating aggregation.
#[derive(Debug, Clone, PartialEq)]
pub enum RatingOutcome {
    /// Rows matched, but no category reached the minimum sample size.
    NoQualifyingCategories,
    Ranked(RankedSeries<f64>),
}

/// Derived view for one set of filter criteria.
#[derive(Debug, Clone, PartialEq)]
pub enum Analysis {
    /// No row passed the filters; aggregation was skipped.
    NoMatchingRows,
    Summary {
        /// Indices of the matching rows, in table order.
        rows: Vec<usize>,
        frequency: RankedSeries<usize>,
        ratings: RatingOutcome,
    },
}

impl Analysis {
    pub fn matched(&self) -> usize {
        match self {
            Analysis::NoMatchingRows => 0,
            Analysis::Summary { rows, .. } => rows.len(),
        }
    }
}

/// Filter `table` by `criteria` and aggregate the survivors over `categories`.
pub fn analyze(
    table: &RestaurantTable,
    categories: &CategorySet,
    criteria: &FilterCriteria,
) -> Result<Analysis, EngineError> {
    let rows = filtered_indices(table, criteria)?;
    if rows.is_empty() {
        log::debug!("No rows match {criteria:?}");
        return Ok(Analysis::NoMatchingRows);
    }

    let frequency = category_frequency(table, &rows, categories)?;
    let ranked = category_ratings(table, &rows, categories, criteria.min_sample_size)?;
    log::debug!(
        "{} rows matched; {} categories counted, {} rated (min sample {})",
        rows.len(),
        frequency.len(),
        ranked.len(),
        criteria.min_sample_size
    );

    let ratings = if ranked.is_empty() {
        RatingOutcome::NoQualifyingCategories
    } else {
        RatingOutcome::Ranked(ranked)
    };

    Ok(Analysis::Summary {
        rows,
        frequency,
        ratings,
    })
}

/// Typed records for `rows`, each tagged with the categories it belongs to.
pub fn matching_records(
    table: &RestaurantTable,
    rows: &[usize],
    categories: &CategorySet,
) -> Vec<RestaurantRecord> {
    let positions: Vec<(usize, &str)> = categories
        .iter()
        .filter_map(|name| table.column_position(name).map(|col| (col, name)))
        .collect();

    rows.iter()
        .map(|&row| {
            let mut record = table.record(row);
            record.categories = positions
                .iter()
                .filter(|(col, _)| table.cell(row, *col).is_one())
                .map(|(_, name)| name.to_string())
                .collect();
            record
        })
        .collect()
}
