//! Fixtures for tests
use crate::aggregate::AggregateViews;
use crate::plant::PowerPlant;
use crate::units::{Capacity, Energy};
use rstest::fixture;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

/// Create a [`PowerPlant`] with only the fields used for aggregation filled in
pub fn plant(
    canton: &str,
    energy_source: &str,
    capacity: Option<f64>,
    production: Option<f64>,
) -> PowerPlant {
    PowerPlant {
        canton: canton.into(),
        energy_source: energy_source.into(),
        electrical_capacity: capacity.map(Capacity),
        production: production.map(Energy),
        commissioning_date: None,
        contract_period_end: None,
        tariff: None,
    }
}

#[fixture]
pub fn two_zurich_plants() -> Vec<PowerPlant> {
    vec![
        plant("Zürich", "Hydro", Some(10.0), Some(1000.0)),
        plant("Zürich", "Solar", Some(5.0), None),
    ]
}

#[fixture]
pub fn plants() -> Vec<PowerPlant> {
    vec![
        plant("Zürich", "Hydro", Some(10.0), Some(1000.0)),
        plant("Zürich", "Solar", Some(5.0), None),
        plant("Bern", "Hydro", Some(20.0), Some(500.0)),
        plant("Bern", "Solar", Some(2.5), Some(20.0)),
        plant("Valais", "Wind", Some(3.0), Some(300.0)),
    ]
}

#[fixture]
pub fn views(plants: Vec<PowerPlant>) -> AggregateViews {
    AggregateViews::from_plants(&plants)
}
