//! The interface between the dashboard and whatever draws its maps and charts.
//!
//! The dashboard only prepares data series; how they are displayed is up to the [`Renderer`].
use crate::aggregate::{Metric, Series};
use crate::input::boundary::BoundaryDocument;
use crate::plant::{EnergySource, PowerPlant};
use crate::selection::SourceSelection;
use anyhow::Result;
use indexmap::IndexMap;

/// The title of the dashboard
pub const DASHBOARD_TITLE: &str = "Renewable Energy in Switzerland";

/// Text shown beneath the title of the dashboard
pub const DASHBOARD_DESCRIPTION: &str = "The charts show all renewable-energy power plants in \
    Switzerland in the selected category supported by the feed-in-tariff KEV (Kostendeckende \
    Einspeisevergütung).";

/// Where the power-plant data comes from
pub const DATA_SOURCE_URL: &str = "https://open-power-system-data.org/";

/// The title of the stacked bar chart
pub const STACKED_BAR_TITLE: &str = "The yearly production in MWh";

/// A map with cantons shaded according to the value of a metric
#[derive(Debug, Clone, PartialEq)]
pub struct ChoroplethMap {
    /// The metric shown on the map
    pub metric: Metric,
    /// Which plants are included
    pub selection: SourceSelection,
    /// The value for each canton
    pub series: Series,
}

/// A bar chart with one bar per canton, split by energy source
#[derive(Debug, Clone, PartialEq)]
pub struct StackedBarChart {
    /// The chart title
    pub title: &'static str,
    /// The values for each canton, for each energy source
    pub categories: IndexMap<EnergySource, Series>,
}

/// Draws the elements of the dashboard
pub trait Renderer {
    /// Draw the title and description of the dashboard
    fn render_header(&mut self, title: &str, description: &str) -> Result<()>;

    /// Draw the table of raw data, or remove it if `plants` is `None`
    fn render_table(&mut self, plants: Option<&[PowerPlant]>) -> Result<()>;

    /// Draw a choropleth map.
    ///
    /// # Arguments
    ///
    /// * `map` - The values to plot
    /// * `boundaries` - Region boundaries
    /// * `join_key` - The property of the boundary features matching the keys of `map.series`
    fn render_choropleth(
        &mut self,
        map: &ChoroplethMap,
        boundaries: &BoundaryDocument,
        join_key: &str,
    ) -> Result<()>;

    /// Draw a stacked bar chart
    fn render_stacked_bar(&mut self, chart: &StackedBarChart) -> Result<()>;

    /// Show where the data comes from
    fn render_citation(&mut self, url: &str) -> Result<()>;

    /// Called once every element has been drawn
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}
