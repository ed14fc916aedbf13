//! Code for reading [`PowerPlant`]s from a CSV file.
use super::*;
use crate::canton::CantonNormaliser;
use crate::units::{Capacity, Energy, MoneyPerEnergy};
use itertools::Itertools;
use log::warn;
use serde::Deserialize;

/// The name of the file containing power-plant data
pub const PLANTS_FILE_NAME: &str = "renewable_power_plants_CH.csv";

/// A row of the power-plant CSV file.
///
/// Other columns present in the file (e.g. `project_name`, `lat`, `lon`) are ignored.
#[derive(Debug, Deserialize, PartialEq)]
struct PowerPlantRaw {
    canton: String,
    energy_source_level_2: String,
    electrical_capacity: Option<Capacity>,
    production: Option<Energy>,
    commissioning_date: Option<String>,
    contract_period_end: Option<String>,
    tariff: Option<MoneyPerEnergy>,
}

/// Read power plants from the specified CSV file.
///
/// Canton codes are converted to canton names as the file is read.
pub fn read_power_plants(file_path: &Path) -> Result<Vec<PowerPlant>> {
    let plants_csv = read_csv(file_path)?;
    read_power_plants_from_iter(plants_csv.into_iter(), &CantonNormaliser::new())
        .with_context(|| input_err_msg(file_path))
}

/// Process power plants from an iterator.
///
/// # Arguments
///
/// * `iter` - Iterator of `PowerPlantRaw`s
/// * `normaliser` - Used to convert canton codes to names
fn read_power_plants_from_iter<I>(
    iter: I,
    normaliser: &CantonNormaliser,
) -> Result<Vec<PowerPlant>>
where
    I: Iterator<Item = PowerPlantRaw>,
{
    iter.enumerate()
        .filter_map(|(idx, raw)| {
            // Row numbers as seen in a spreadsheet, counting the header
            let row = idx + 2;

            // Rows which can't be grouped are left out of the data set
            if raw.canton.is_empty() || raw.energy_source_level_2.is_empty() {
                warn!("Row {row}: Missing canton or energy source; power plant will be ignored");
                return None;
            }

            Some(validate_power_plant(raw, row, normaliser))
        })
        .try_collect()
}

/// Check the numeric fields of a row and convert it into a [`PowerPlant`]
fn validate_power_plant(
    raw: PowerPlantRaw,
    row: usize,
    normaliser: &CantonNormaliser,
) -> Result<PowerPlant> {
    if let Some(capacity) = raw.electrical_capacity {
        ensure!(
            capacity.is_finite_non_negative(),
            "Row {row}: Electrical capacity must be a finite, non-negative number"
        );
    }
    if let Some(production) = raw.production {
        ensure!(
            production.is_finite_non_negative(),
            "Row {row}: Production must be a finite, non-negative number"
        );
    }

    Ok(PowerPlant {
        canton: normaliser.normalise(&raw.canton),
        energy_source: raw.energy_source_level_2.as_str().into(),
        electrical_capacity: raw.electrical_capacity,
        production: raw.production,
        commissioning_date: raw.commissioning_date,
        contract_period_end: raw.contract_period_end,
        tariff: raw.tariff,
    })
}
