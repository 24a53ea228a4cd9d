use std::path::Path;
use std::sync::Arc;

use crate::color::CategoryColors;
use crate::config::{ChartOrientation, DashboardConfig};
use crate::data::analysis::{analyze, Analysis};
use crate::data::categories::{CategoryCache, CategorySet};
use crate::data::error::EngineError;
use crate::data::filter::{FilterCriteria, StateSelection};
use crate::data::loader::DatasetCache;
use crate::data::model::RestaurantTable;

/// Which ranked view the central panel shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Frequency,
    Ratings,
    Restaurants,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: DashboardConfig,

    /// Loaded table (None until user loads a file).
    pub table: Option<Arc<RestaurantTable>>,

    /// Category columns of `table`.
    pub categories: Arc<CategorySet>,

    pub colors: Option<CategoryColors>,

    /// Distinct states, for the state selector.
    pub states: Vec<String>,

    /// Slider bounds for the rating range.
    pub stars_bounds: (f64, f64),

    /// Current filter selection. Replaced, never edited in place.
    pub criteria: FilterCriteria,

    /// How many ranked entries the charts show.
    pub top_n: usize,

    pub orientation: ChartOrientation,

    pub tab: Tab,

    /// Derived view for `criteria` (cached until the next change).
    pub analysis: Option<Analysis>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    datasets: DatasetCache,
    category_cache: CategoryCache,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DashboardConfig::default())
    }
}

impl AppState {
    pub fn new(config: DashboardConfig) -> Self {
        let criteria = FilterCriteria {
            min_sample_size: config.default_min_sample_size,
            ..FilterCriteria::default()
        };
        Self {
            top_n: config.default_top_n,
            orientation: config.chart_orientation,
            config,
            table: None,
            categories: Arc::new(CategorySet::default()),
            colors: None,
            states: Vec::new(),
            stars_bounds: (0.0, 5.0),
            criteria,
            tab: Tab::default(),
            analysis: None,
            status_message: None,
            datasets: DatasetCache::default(),
            category_cache: CategoryCache::default(),
        }
    }

    /// Load `path` (through the load cache) and make it the active table.
    pub fn open_path(&mut self, path: &Path, force_reload: bool) {
        let result = if force_reload {
            self.datasets.reload(path)
        } else {
            self.datasets.load(path)
        };
        match result {
            Ok(table) => self.set_table(table),
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
            }
        }
    }

    /// Reload the active table from disk, if it came from a file.
    pub fn reload(&mut self) {
        let source = self.table.as_ref().and_then(|t| t.source.clone());
        if let Some(path) = source {
            self.open_path(&path, true);
        }
    }

    /// Ingest a newly loaded table, reset the filters to span it and
    /// recompute.
    pub fn set_table(&mut self, table: Arc<RestaurantTable>) {
        self.categories = self
            .category_cache
            .get(&table, &self.config.excluded_columns);
        self.colors = Some(CategoryColors::new(&self.categories));
        self.states = table.states();
        self.stars_bounds = table.stars_bounds().unwrap_or((0.0, 5.0));

        // A selected state survives only if the new table has it.
        let state = match &self.criteria.state {
            StateSelection::Only(st) if self.states.contains(st) => {
                StateSelection::Only(st.clone())
            }
            _ => StateSelection::All,
        };
        self.criteria = FilterCriteria {
            state,
            min_stars: self.stars_bounds.0,
            max_stars: self.stars_bounds.1,
            ..self.criteria.clone()
        };
        self.top_n = self.config.default_top_n;

        self.table = Some(table);
        self.status_message = None;
        self.recompute();
    }

    /// Replace the filter selection; recomputes only when it changed.
    pub fn set_criteria(&mut self, criteria: FilterCriteria) {
        if criteria != self.criteria {
            self.criteria = criteria;
            self.recompute();
        }
    }

    /// Rerun filter → aggregate for the current criteria.
    pub fn recompute(&mut self) {
        let Some(table) = &self.table else {
            self.analysis = None;
            return;
        };
        match analyze(table, &self.categories, &self.criteria) {
            Ok(analysis) => {
                self.analysis = Some(analysis);
                self.status_message = None;
            }
            Err(e) => self.report_engine_error(e),
        }
    }

    fn report_engine_error(&mut self, e: EngineError) {
        log::error!("Aggregation failed: {e}");
        self.analysis = None;
        self.status_message = Some(format!("Error: {e}"));
    }
}
