//! Power plants are the rows of the input data set, one per plant receiving the feed-in tariff.
use crate::canton::CantonName;
use crate::id::define_id_type;
use crate::units::{Capacity, Energy, MoneyPerEnergy};
use serde::Serialize;

define_id_type! {EnergySource}

/// A single renewable-energy power plant.
///
/// This is the normalised form of a row in the input CSV file: the canton code has been replaced
/// with the canton's full name (where known).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PowerPlant {
    /// The canton in which the plant is located (e.g. "Zürich")
    pub canton: CantonName,
    /// The category of energy source (e.g. "Hydro")
    pub energy_source: EnergySource,
    /// Installed electrical capacity, if known
    pub electrical_capacity: Option<Capacity>,
    /// Yearly production, if known
    pub production: Option<Energy>,
    /// Date on which the plant was commissioned
    pub commissioning_date: Option<String>,
    /// End of the subsidy contract
    pub contract_period_end: Option<String>,
    /// Feed-in tariff for 2016
    pub tariff: Option<MoneyPerEnergy>,
}

impl PowerPlant {
    /// Yearly production, with missing values counted as zero
    pub fn production_or_zero(&self) -> Energy {
        self.production.unwrap_or_default()
    }

    /// Installed capacity, with missing values counted as zero
    pub fn capacity_or_zero(&self) -> Capacity {
        self.electrical_capacity.unwrap_or_default()
    }
}
