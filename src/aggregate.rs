//! Grouped statistics over power plants, by canton and by energy source.
//!
//! All the views are computed once from the loaded data and are read-only afterwards. Selecting
//! what to display only ever picks out a slice of one of these views (see [`crate::selection`]).
use crate::canton::CantonName;
use crate::plant::{EnergySource, PowerPlant};
use anyhow::{Result, ensure};
use float_cmp::approx_eq;
use indexmap::{IndexMap, IndexSet};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// Relative tolerance used when comparing totals computed in different orders
const TOTAL_RELATIVE_TOLERANCE: f64 = 1e-9;

/// A series of values keyed by canton, sorted by canton name
pub type Series = IndexMap<CantonName, f64>;

/// A quantity which can be aggregated over power plants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Metric {
    /// Yearly production in MWh (summed)
    Production,
    /// Installed electrical capacity in MW (summed)
    Capacity,
    /// Number of power plants
    Count,
}

impl Metric {
    /// The contribution of a single plant to this metric
    pub fn value_of(self, plant: &PowerPlant) -> f64 {
        match self {
            Self::Production => plant.production_or_zero().value(),
            Self::Capacity => plant.capacity_or_zero().value(),
            Self::Count => 1.0,
        }
    }

    /// A heading describing what is shown for this metric
    pub fn title(self) -> &'static str {
        match self {
            Self::Production => "Yearly production in MWh",
            Self::Capacity => "Installed electrical capacity in MW",
            Self::Count => "The number of installed power plants producing renewable energy",
        }
    }

    /// The name (without extension) of files containing the map for this metric
    pub fn map_file_stem(self) -> &'static str {
        match self {
            Self::Production => "production_map",
            Self::Capacity => "capacity_map",
            Self::Count => "plant_count_map",
        }
    }
}

/// The values of one metric, grouped by energy source and canton and by canton alone
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateView {
    by_source_region: IndexMap<(EnergySource, CantonName), f64>,
    by_region: Series,
}

impl AggregateView {
    /// Aggregate the given metric over power plants
    pub fn from_plants(metric: Metric, plants: &[PowerPlant]) -> Self {
        let mut by_source_region = IndexMap::new();
        let mut by_region = Series::new();
        for plant in plants {
            let value = metric.value_of(plant);
            *by_source_region
                .entry((plant.energy_source.clone(), plant.canton.clone()))
                .or_insert(0.0) += value;
            *by_region.entry(plant.canton.clone()).or_insert(0.0) += value;
        }

        // Sort so that output doesn't depend on the order of rows in the input
        by_source_region.sort_keys();
        by_region.sort_keys();

        Self {
            by_source_region,
            by_region,
        }
    }

    /// Values for each combination of energy source and canton
    pub fn by_source_region(&self) -> &IndexMap<(EnergySource, CantonName), f64> {
        &self.by_source_region
    }

    /// Values for each canton, across all energy sources
    pub fn by_region(&self) -> &Series {
        &self.by_region
    }

    /// Values for each canton, considering only plants with the given energy source.
    ///
    /// Cantons with no plants of this type are absent from the series.
    pub fn for_source(&self, source: &EnergySource) -> Series {
        self.by_source_region
            .iter()
            .filter(|((plant_source, _), _)| plant_source == source)
            .map(|((_, canton), value)| (canton.clone(), *value))
            .collect()
    }
}

/// All of the aggregated statistics used by the dashboard
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateViews {
    production: AggregateView,
    capacity: AggregateView,
    count: AggregateView,
    sources: IndexSet<EnergySource>,
    cantons: IndexSet<CantonName>,
}

impl AggregateViews {
    /// Compute every view from the given power plants
    pub fn from_plants(plants: &[PowerPlant]) -> Self {
        let mut sources: IndexSet<_> = plants.iter().map(|p| p.energy_source.clone()).collect();
        sources.sort();
        let mut cantons: IndexSet<_> = plants.iter().map(|p| p.canton.clone()).collect();
        cantons.sort();

        Self {
            production: AggregateView::from_plants(Metric::Production, plants),
            capacity: AggregateView::from_plants(Metric::Capacity, plants),
            count: AggregateView::from_plants(Metric::Count, plants),
            sources,
            cantons,
        }
    }

    /// Get the view for the specified metric
    pub fn view(&self, metric: Metric) -> &AggregateView {
        match metric {
            Metric::Production => &self.production,
            Metric::Capacity => &self.capacity,
            Metric::Count => &self.count,
        }
    }

    /// Every energy source found in the data, sorted
    pub fn sources(&self) -> &IndexSet<EnergySource> {
        &self.sources
    }

    /// Every canton found in the data, sorted
    pub fn cantons(&self) -> &IndexSet<CantonName> {
        &self.cantons
    }

    /// Check that the totals of every view agree with each other and with the raw data
    pub fn check_consistency(&self, plants: &[PowerPlant]) -> Result<()> {
        for metric in Metric::iter() {
            let view = self.view(metric);
            let raw_total: f64 = plants.iter().map(|plant| metric.value_of(plant)).sum();
            let by_source_total: f64 = view.by_source_region.values().sum();
            let by_region_total: f64 = view.by_region.values().sum();

            for (description, total) in [
                ("by energy source and canton", by_source_total),
                ("by canton", by_region_total),
            ] {
                ensure!(
                    totals_match(total, raw_total),
                    "Total {metric} {description} ({total}) does not match the input data \
                    ({raw_total})"
                );
            }
        }

        Ok(())
    }
}

/// Whether two totals are equal, allowing for rounding errors from summing in a different order
fn totals_match(total1: f64, total2: f64) -> bool {
    let margin = TOTAL_RELATIVE_TOLERANCE * total1.abs().max(total2.abs()).max(1.0);
    approx_eq!(f64, total1, total2, epsilon = margin)
}
