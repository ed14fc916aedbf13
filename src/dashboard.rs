//! The state of an interactive session: loaded data plus what the user has chosen to display.
use crate::aggregate::Metric;
use crate::input::DashboardData;
use crate::render::{
    ChoroplethMap, DASHBOARD_DESCRIPTION, DASHBOARD_TITLE, DATA_SOURCE_URL, Renderer,
    STACKED_BAR_TITLE, StackedBarChart,
};
use crate::selection::{SourceSelection, source_options};
use anyhow::Result;
use log::{debug, info};
use strum::IntoEnumIterator;

/// The energy source chosen for each of the maps
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selections {
    production: SourceSelection,
    capacity: SourceSelection,
    count: SourceSelection,
}

impl Selections {
    /// Get the selection for the given metric
    pub fn get(&self, metric: Metric) -> &SourceSelection {
        match metric {
            Metric::Production => &self.production,
            Metric::Capacity => &self.capacity,
            Metric::Count => &self.count,
        }
    }

    /// Change the selection for the given metric
    pub fn set(&mut self, metric: Metric, selection: SourceSelection) {
        let current = match metric {
            Metric::Production => &mut self.production,
            Metric::Capacity => &mut self.capacity,
            Metric::Count => &mut self.count,
        };
        *current = selection;
    }
}

/// A dashboard showing renewable-energy statistics by canton
pub struct Dashboard {
    data: DashboardData,
    selections: Selections,
    show_table: bool,
}

impl Dashboard {
    /// Create a new [`Dashboard`] with "All" selected for every map and the raw table hidden
    pub fn new(data: DashboardData) -> Self {
        Self {
            data,
            selections: Selections::default(),
            show_table: false,
        }
    }

    /// The data shown on the dashboard
    pub fn data(&self) -> &DashboardData {
        &self.data
    }

    /// The current selections
    pub fn selections(&self) -> &Selections {
        &self.selections
    }

    /// Change which plants are shown on the map for `metric`
    pub fn select(&mut self, metric: Metric, selection: SourceSelection) {
        debug!("Selected {selection} for {metric} map");
        self.selections.set(metric, selection);
    }

    /// Change which plants are shown on the map for `metric`, parsing the selection from a string
    pub fn select_str(&mut self, metric: Metric, selection: &str) -> Result<()> {
        let selection = SourceSelection::parse(selection, self.data.views.sources())?;
        self.select(metric, selection);
        Ok(())
    }

    /// Whether the table of raw data is shown
    pub fn show_table(&self) -> bool {
        self.show_table
    }

    /// Show or hide the table of raw data
    pub fn set_show_table(&mut self, show_table: bool) {
        self.show_table = show_table;
    }

    /// The options available for each energy-source selector
    pub fn source_options(&self) -> Vec<String> {
        source_options(self.data.views.sources())
    }

    /// The map for the given metric, according to the current selection
    pub fn choropleth(&self, metric: Metric) -> ChoroplethMap {
        let selection = self.selections.get(metric).clone();
        let series = selection.select(&self.data.views, metric);
        ChoroplethMap {
            metric,
            selection,
            series,
        }
    }

    /// The yearly production of each canton, split by energy source
    pub fn stacked_bar(&self) -> StackedBarChart {
        let view = self.data.views.view(Metric::Production);
        let categories = self
            .data
            .views
            .sources()
            .iter()
            .map(|source| (source.clone(), view.for_source(source)))
            .collect();

        StackedBarChart {
            title: STACKED_BAR_TITLE,
            categories,
        }
    }

    /// Draw every element of the dashboard
    pub fn render<R: Renderer>(&self, renderer: &mut R) -> Result<()> {
        renderer.render_header(DASHBOARD_TITLE, DASHBOARD_DESCRIPTION)?;
        renderer.render_table(self.show_table.then_some(self.data.plants.as_slice()))?;

        let boundaries = &self.data.boundaries;
        for metric in Metric::iter() {
            let map = self.choropleth(metric);
            renderer.render_choropleth(&map, boundaries, boundaries.join_key())?;
        }

        renderer.render_stacked_bar(&self.stacked_bar())?;
        renderer.render_citation(DATA_SOURCE_URL)?;
        renderer.finish()?;

        info!(
            "Rendered dashboard (production: {}, capacity: {}, count: {})",
            self.selections.production, self.selections.capacity, self.selections.count
        );

        Ok(())
    }
}
