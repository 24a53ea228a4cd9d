use std::sync::Arc;

use super::model::{CellValue, RestaurantTable, TableId};

// ---------------------------------------------------------------------------
// Category detection
// ---------------------------------------------------------------------------

/// Ordered set of category indicator column names (table column order).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategorySet {
    names: Vec<String>,
}

impl CategorySet {
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl FromIterator<String> for CategorySet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        CategorySet {
            names: iter.into_iter().collect(),
        }
    }
}

/// Return the columns whose non-missing values are all numeric 0/1, minus
/// `excluded`.
///
/// A column with no non-missing values passes the binary check vacuously and
/// is kept; such columns are logged as suspect.
pub fn detect_categories(table: &RestaurantTable, excluded: &[String]) -> CategorySet {
    let mut suspect = Vec::new();

    let set: CategorySet = table
        .columns()
        .iter()
        .enumerate()
        .filter(|(col, _)| {
            table
                .column_values(*col)
                .filter(|v| !v.is_null())
                .all(CellValue::is_binary)
        })
        .filter(|(_, name)| !excluded.iter().any(|e| e == *name))
        .inspect(|(col, name)| {
            if table.column_values(*col).all(CellValue::is_null) {
                suspect.push(name.as_str());
            }
        })
        .map(|(_, name)| name.clone())
        .collect();

    if !suspect.is_empty() {
        log::warn!("All-missing columns treated as categories: {suspect:?}");
    }
    log::debug!(
        "Detected {} categories out of {} columns: {:?}",
        set.len(),
        table.columns().len(),
        set.names()
    );
    set
}

// ---------------------------------------------------------------------------
// Memoized detection
// ---------------------------------------------------------------------------

/// Caches the [`CategorySet`] of the most recently seen table.
/// Recomputes only when the table identity or the exclusion list changes.
#[derive(Debug, Default)]
pub struct CategoryCache {
    key: Option<(TableId, Vec<String>)>,
    categories: Arc<CategorySet>,
}

impl CategoryCache {
    pub fn get(&mut self, table: &RestaurantTable, excluded: &[String]) -> Arc<CategorySet> {
        let hit = matches!(
            &self.key,
            Some((id, ex)) if *id == table.id() && ex.as_slice() == excluded
        );
        if !hit {
            self.categories = Arc::new(detect_categories(table, excluded));
            self.key = Some((table.id(), excluded.to_vec()));
        }
        Arc::clone(&self.categories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::{s, table};
    use crate::data::model::CellValue::{Float, Integer, Null};

    fn has(set: &CategorySet, name: &str) -> bool {
        set.iter().any(|n| n == name)
    }

    fn excluded() -> Vec<String> {
        vec!["is_open".to_string(), "stars".to_string()]
    }

    fn sample() -> RestaurantTable {
        table(
            &["name", "stars", "is_open", "Pizza", "Mixed", "Sushi", "Empty", "Label"],
            vec![
                vec![s("A"), Float(4.0), Integer(1), Integer(1), Integer(2), Float(0.0), Null, s("x")],
                vec![s("B"), Float(1.0), Integer(0), Null, Integer(0), Float(1.0), Null, s("y")],
                vec![s("C"), Float(0.0), Integer(1), Integer(0), Integer(1), Null, Null, s("z")],
            ],
        )
    }

    #[test]
    fn detects_binary_columns_in_table_order() {
        let set = detect_categories(&sample(), &excluded());
        assert_eq!(set.names(), ["Pizza", "Sushi", "Empty"]);
    }

    #[test]
    fn exclusion_applies_to_binary_columns() {
        // `stars` is not binary here anyway; `is_open` is binary and excluded.
        let set = detect_categories(&sample(), &excluded());
        assert!(!has(&set, "is_open"));
        assert!(!has(&set, "stars"));

        let set = detect_categories(&sample(), &[]);
        assert!(has(&set, "is_open"));
        assert!(!has(&set, "stars"));
    }

    #[test]
    fn excluded_and_non_binary_columns_never_appear() {
        let t = sample();
        let ex = excluded();
        let set = detect_categories(&t, &ex);
        for name in set.iter() {
            assert!(!ex.iter().any(|e| e == name));
            let col = t.column_position(name).unwrap();
            assert!(t
                .column_values(col)
                .filter(|v| !v.is_null())
                .all(|v| v.is_binary()));
        }
    }

    #[test]
    fn all_missing_column_is_kept() {
        let set = detect_categories(&sample(), &excluded());
        assert!(has(&set, "Empty"));
    }

    #[test]
    fn cache_recomputes_only_on_identity_or_exclusion_change() {
        let t = sample();
        let mut cache = CategoryCache::default();

        let first = cache.get(&t, &excluded());
        let second = cache.get(&t, &excluded());
        assert!(Arc::ptr_eq(&first, &second));

        let third = cache.get(&t, &[]);
        assert!(!Arc::ptr_eq(&second, &third));
        assert!(has(&third, "is_open"));

        let reloaded = sample();
        let fourth = cache.get(&reloaded, &[]);
        assert!(!Arc::ptr_eq(&third, &fourth));
        assert_eq!(*third, *fourth);
    }
}
