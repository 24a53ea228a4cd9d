use std::fmt;

use super::error::EngineError;
use super::model::{RestaurantTable, STARS_COLUMN, STATE_COLUMN};

// ---------------------------------------------------------------------------
// Filter criteria: what the filter controls currently select
// ---------------------------------------------------------------------------

/// State selector value: every state, or exactly one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StateSelection {
    #[default]
    All,
    Only(String),
}

impl fmt::Display for StateSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateSelection::All => write!(f, "All states"),
            StateSelection::Only(s) => write!(f, "{s}"),
        }
    }
}

/// Immutable snapshot of the filter controls.
/// Any combination is legal, including `min_stars > max_stars`.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterCriteria {
    pub state: StateSelection,
    pub min_stars: f64,
    pub max_stars: f64,
    pub min_sample_size: usize,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            state: StateSelection::All,
            min_stars: 0.0,
            max_stars: 5.0,
            min_sample_size: 0,
        }
    }
}

impl FilterCriteria {
    /// Whether `stars` falls inside the inclusive rating range.
    pub fn accepts_stars(&self, stars: f64) -> bool {
        self.min_stars <= stars && stars <= self.max_stars
    }
}

/// Return indices of rows that satisfy `criteria`, in table order.
///
/// A row passes when:
/// * the state selection is `All`, or the row's `state` reads as the selected
///   one (the same text [`RestaurantTable::states`] lists)
/// * its `stars` is numeric and inside `[min_stars, max_stars]`
///
/// Rows with missing `stars` never pass. The `state` column is only
/// required when a specific state is selected.
pub fn filtered_indices(
    table: &RestaurantTable,
    criteria: &FilterCriteria,
) -> Result<Vec<usize>, EngineError> {
    let stars_col = table.require_column(STARS_COLUMN)?;
    let state_filter = match &criteria.state {
        StateSelection::All => None,
        StateSelection::Only(wanted) => Some((table.require_column(STATE_COLUMN)?, wanted)),
    };

    Ok((0..table.len())
        .filter(|&row| {
            if let Some((col, wanted)) = state_filter {
                if !table.cell(row, col).reads_as(wanted) {
                    return false;
                }
            }
            table
                .cell(row, stars_col)
                .as_f64()
                .is_some_and(|stars| criteria.accepts_stars(stars))
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::{s, table};
    use crate::data::model::CellValue::{Float, Integer, Null};

    fn sample() -> RestaurantTable {
        table(
            &["name", "state", "stars"],
            vec![
                vec![s("a"), s("CA"), Float(4.0)],
                vec![s("b"), s("CA"), Float(5.0)],
                vec![s("c"), s("NV"), Float(2.0)],
                vec![s("d"), s("CA"), Null],
                vec![s("e"), s("NV"), Integer(3)],
            ],
        )
    }

    fn criteria(state: StateSelection, min: f64, max: f64) -> FilterCriteria {
        FilterCriteria {
            state,
            min_stars: min,
            max_stars: max,
            min_sample_size: 0,
        }
    }

    #[test]
    fn all_states_inclusive_range() {
        let rows = filtered_indices(&sample(), &criteria(StateSelection::All, 2.0, 4.0)).unwrap();
        assert_eq!(rows, vec![0, 2, 4]);
    }

    #[test]
    fn single_state() {
        let c = criteria(StateSelection::Only("CA".into()), 0.0, 5.0);
        assert_eq!(filtered_indices(&sample(), &c).unwrap(), vec![0, 1]);
    }

    #[test]
    fn missing_stars_never_pass() {
        let rows = filtered_indices(&sample(), &FilterCriteria::default()).unwrap();
        assert!(!rows.contains(&3));
    }

    #[test]
    fn inverted_range_is_empty() {
        for (min, max) in [(5.0, 0.0), (3.5, 3.0), (0.5, 0.0)] {
            let rows = filtered_indices(&sample(), &criteria(StateSelection::All, min, max)).unwrap();
            assert!(rows.is_empty(), "range [{min}, {max}] matched {rows:?}");
        }
    }

    #[test]
    fn unknown_state_is_empty_not_error() {
        let c = criteria(StateSelection::Only("ZZ".into()), 0.0, 5.0);
        assert_eq!(filtered_indices(&sample(), &c).unwrap(), Vec::<usize>::new());
    }

    #[test]
    fn rerunning_yields_identical_rows() {
        let t = sample();
        let c = criteria(StateSelection::All, 0.0, 5.0);
        assert_eq!(filtered_indices(&t, &c).unwrap(), filtered_indices(&t, &c).unwrap());
    }

    #[test]
    fn listed_numeric_state_codes_match() {
        let t = table(
            &["state", "stars"],
            vec![
                vec![Integer(12), Float(4.0)],
                vec![s("12"), Float(3.0)],
                vec![Null, Float(3.5)],
                vec![Integer(13), Float(2.0)],
            ],
        );
        let listed = t.states();
        assert_eq!(listed, vec!["12".to_string(), "13".to_string()]);

        let c = criteria(StateSelection::Only(listed[0].clone()), 0.0, 5.0);
        assert_eq!(filtered_indices(&t, &c).unwrap(), vec![0, 1]);
    }

    #[test]
    fn missing_stars_column_is_an_error() {
        let t = table(&["state"], vec![vec![s("CA")]]);
        let err = filtered_indices(&t, &FilterCriteria::default()).unwrap_err();
        assert_eq!(
            err,
            EngineError::MissingColumn {
                column: "stars".into()
            }
        );
    }

    #[test]
    fn state_column_only_required_for_specific_state() {
        let t = table(&["stars"], vec![vec![Float(3.0)]]);
        assert_eq!(filtered_indices(&t, &FilterCriteria::default()).unwrap(), vec![0]);

        let c = criteria(StateSelection::Only("CA".into()), 0.0, 5.0);
        assert!(matches!(
            filtered_indices(&t, &c),
            Err(EngineError::MissingColumn { column }) if column == "state"
        ));
    }
}
