use std::cmp::Ordering;

use super::categories::CategorySet;
use super::error::EngineError;
use super::model::{RestaurantTable, STARS_COLUMN};

// ---------------------------------------------------------------------------
// RankedSeries
// ---------------------------------------------------------------------------

/// Values a [`RankedSeries`] can be ordered by.
pub trait RankValue {
    fn rank_cmp(&self, other: &Self) -> Ordering;
}

impl RankValue for usize {
    fn rank_cmp(&self, other: &Self) -> Ordering {
        self.cmp(other)
    }
}

impl RankValue for f64 {
    fn rank_cmp(&self, other: &Self) -> Ordering {
        self.total_cmp(other)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry<V> {
    pub category: String,
    pub value: V,
    /// Rows that contributed to `value`.
    pub samples: usize,
}

/// Category → value pairs, descending by value. Equal values keep the order
/// they were supplied in.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedSeries<V> {
    entries: Vec<RankedEntry<V>>,
}

impl<V: RankValue> RankedSeries<V> {
    pub fn from_unranked(mut entries: Vec<RankedEntry<V>>) -> Self {
        // `sort_by` is stable.
        entries.sort_by(|a, b| b.value.rank_cmp(&a.value));
        RankedSeries { entries }
    }
}

impl<V> RankedSeries<V> {
    pub fn entries(&self) -> &[RankedEntry<V>] {
        &self.entries
    }

    /// The first `n` entries (all of them if there are fewer).
    pub fn top(&self, n: usize) -> &[RankedEntry<V>] {
        &self.entries[..n.min(self.entries.len())]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Aggregators
// ---------------------------------------------------------------------------

/// Count, per category, the rows in `rows` whose indicator equals 1.
///
/// Always yields one entry per category; there is no thresholding.
pub fn category_frequency(
    table: &RestaurantTable,
    rows: &[usize],
    categories: &CategorySet,
) -> Result<RankedSeries<usize>, EngineError> {
    let entries = categories
        .iter()
        .map(|name| {
            let col = table.require_column(name)?;
            let count = rows
                .iter()
                .filter(|&&row| table.cell(row, col).is_one())
                .count();
            Ok(RankedEntry {
                category: name.to_string(),
                value: count,
                samples: count,
            })
        })
        .collect::<Result<Vec<_>, EngineError>>()?;

    Ok(RankedSeries::from_unranked(entries))
}

/// Mean `stars` per category over the rows in `rows` whose indicator
/// equals 1.
///
/// Categories with fewer than `min_sample_size` member rows are left out.
/// Member rows without a numeric rating count towards the sample size but
/// not the mean; a category with no rated member rows is left out.
pub fn category_ratings(
    table: &RestaurantTable,
    rows: &[usize],
    categories: &CategorySet,
    min_sample_size: usize,
) -> Result<RankedSeries<f64>, EngineError> {
    let stars_col = table.require_column(STARS_COLUMN)?;

    let mut entries = Vec::new();
    for name in categories.iter() {
        let col = table.require_column(name)?;
        let members: Vec<usize> = rows
            .iter()
            .copied()
            .filter(|&row| table.cell(row, col).is_one())
            .collect();
        if members.len() < min_sample_size {
            continue;
        }

        let ratings: Vec<f64> = members
            .iter()
            .filter_map(|&row| table.cell(row, stars_col).as_f64())
            .collect();
        if ratings.is_empty() {
            continue;
        }
        let mean = ratings.iter().sum::<f64>() / ratings.len() as f64;

        entries.push(RankedEntry {
            category: name.to_string(),
            value: mean,
            samples: members.len(),
        });
    }

    Ok(RankedSeries::from_unranked(entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::{s, table};
    use crate::data::model::CellValue::{Float, Integer, Null};

    fn sample() -> (RestaurantTable, CategorySet) {
        let t = table(
            &["state", "stars", "Pizza", "Sushi"],
            vec![
                vec![s("CA"), Float(4.0), Integer(1), Integer(0)],
                vec![s("CA"), Float(5.0), Integer(1), Integer(1)],
                vec![s("NV"), Float(2.0), Integer(0), Integer(1)],
            ],
        );
        let cats = ["Pizza", "Sushi"].iter().map(|c| c.to_string()).collect();
        (t, cats)
    }

    fn pairs<V: Copy>(series: &RankedSeries<V>) -> Vec<(&str, V)> {
        series
            .entries()
            .iter()
            .map(|e| (e.category.as_str(), e.value))
            .collect()
    }

    #[test]
    fn frequency_counts_ones() {
        let (t, cats) = sample();
        let series = category_frequency(&t, &[0, 1], &cats).unwrap();
        assert_eq!(pairs(&series), vec![("Pizza", 2), ("Sushi", 1)]);
    }

    #[test]
    fn frequency_has_one_entry_per_category_even_without_rows() {
        let (t, cats) = sample();
        let series = category_frequency(&t, &[], &cats).unwrap();
        assert_eq!(series.len(), cats.len());
        assert!(series.entries().iter().all(|e| e.value == 0));
    }

    #[test]
    fn ties_keep_category_order() {
        let (t, cats) = sample();
        let series = category_frequency(&t, &[0, 1, 2], &cats).unwrap();
        assert_eq!(pairs(&series), vec![("Pizza", 2), ("Sushi", 2)]);

        let reversed: CategorySet = ["Sushi", "Pizza"].iter().map(|c| c.to_string()).collect();
        let series = category_frequency(&t, &[0, 1, 2], &reversed).unwrap();
        assert_eq!(pairs(&series), vec![("Sushi", 2), ("Pizza", 2)]);
    }

    #[test]
    fn ratings_are_means_sorted_descending() {
        let (t, cats) = sample();
        let series = category_ratings(&t, &[0, 1], &cats, 1).unwrap();
        assert_eq!(pairs(&series), vec![("Sushi", 5.0), ("Pizza", 4.5)]);
        assert_eq!(series.entries()[1].samples, 2);
    }

    #[test]
    fn ratings_drop_categories_below_threshold() {
        let (t, cats) = sample();
        let series = category_ratings(&t, &[0, 1], &cats, 2).unwrap();
        assert_eq!(pairs(&series), vec![("Pizza", 4.5)]);

        let series = category_ratings(&t, &[0, 1], &cats, 10).unwrap();
        assert!(series.is_empty());
        // Frequency is unaffected by the threshold.
        assert_eq!(category_frequency(&t, &[0, 1], &cats).unwrap().len(), 2);
    }

    #[test]
    fn ratings_never_exceed_category_count() {
        let (t, cats) = sample();
        for min in 0..4 {
            let series = category_ratings(&t, &[0, 1, 2], &cats, min).unwrap();
            assert!(series.len() <= cats.len());
        }
    }

    #[test]
    fn unrated_members_count_towards_sample_size_only() {
        let t = table(
            &["stars", "Bars"],
            vec![
                vec![Float(3.0), Integer(1)],
                vec![Null, Integer(1)],
            ],
        );
        let cats: CategorySet = std::iter::once("Bars".to_string()).collect();
        let series = category_ratings(&t, &[0, 1], &cats, 2).unwrap();
        assert_eq!(pairs(&series), vec![("Bars", 3.0)]);
        assert_eq!(series.entries()[0].samples, 2);
    }

    #[test]
    fn top_is_a_prefix() {
        let (t, cats) = sample();
        let series = category_frequency(&t, &[0, 1], &cats).unwrap();
        assert_eq!(series.top(1).len(), 1);
        assert_eq!(series.top(1)[0].category, "Pizza");
        assert_eq!(series.top(50).len(), 2);
        assert!(series.top(0).is_empty());
    }

    #[test]
    fn missing_columns_are_errors() {
        let (t, _) = sample();
        let cats: CategorySet = std::iter::once("Tacos".to_string()).collect();
        assert_eq!(
            category_frequency(&t, &[0], &cats).unwrap_err(),
            EngineError::MissingColumn {
                column: "Tacos".into()
            }
        );

        let no_stars = table(&["Pizza"], vec![vec![Integer(1)]]);
        let cats: CategorySet = std::iter::once("Pizza".to_string()).collect();
        assert!(matches!(
            category_ratings(&no_stars, &[0], &cats, 0),
            Err(EngineError::MissingColumn { column }) if column == "stars"
        ));
    }
}
