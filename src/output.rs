//! The module responsible for writing the dashboard's maps and charts to disk.
use crate::canton::CantonName;
use crate::input::boundary::BoundaryDocument;
use crate::plant::{EnergySource, PowerPlant};
use crate::render::{ChoroplethMap, Renderer, StackedBarChart};
use anyhow::{Context, Result, ensure};
use log::{debug, info};
use serde::Serialize;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

pub mod metadata;

/// The root folder in which output folders will be created
const OUTPUT_DIRECTORY_ROOT: &str = "swiss_renewables_results";

/// The output file name for the raw data table
const PLANTS_TABLE_FILE_NAME: &str = "power_plants.csv";

/// The output file name for the stacked bar chart
const STACKED_BAR_FILE_NAME: &str = "production_by_source.csv";

/// The output file name for the dashboard's text
const CAPTION_FILE_NAME: &str = "dashboard.txt";

/// Get the default output directory for the data in the specified folder
pub fn get_output_dir(data_dir: &Path) -> Result<PathBuf> {
    // Get the data set name from the dir path
    let data_dir = data_dir
        .canonicalize() // canonicalise in case the user has specified "."
        .context("Could not resolve path to data")?;

    let data_name = data_dir
        .file_name()
        .context("Data cannot be in root folder")?
        .to_str()
        .context("Invalid chars in data dir name")?;

    // Construct path
    Ok([OUTPUT_DIRECTORY_ROOT, data_name].iter().collect())
}

/// Create a new output directory, optionally replacing an existing one.
///
/// # Returns
///
/// True if an existing, non-empty directory was overwritten.
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    let overwrite = if let Ok(mut it) = fs::read_dir(output_dir) {
        if it.next().is_none() {
            // Empty folder, nothing to overwrite
            return Ok(false);
        }

        ensure!(
            allow_overwrite,
            "Output folder already exists and is not empty. Please delete the folder or pass the \
            --overwrite command-line option."
        );

        fs::remove_dir_all(output_dir)?;
        true
    } else {
        false
    };

    // Try to create the directory, with parents
    fs::create_dir_all(output_dir)?;

    Ok(overwrite)
}

/// Represents a row in a choropleth map CSV file
#[derive(Serialize, Debug, PartialEq)]
struct MapRow<'a> {
    canton: &'a CantonName,
    value: f64,
}

/// Represents a row in the stacked bar chart CSV file
#[derive(Serialize, Debug, PartialEq)]
struct StackedBarRow<'a> {
    source: &'a EnergySource,
    canton: &'a CantonName,
    value: f64,
}

/// Draws the dashboard by writing each element to a file in the output folder.
///
/// Maps are written both as CSV files and as GeoJSON feature collections with a `value` property,
/// ready to be shaded by a GIS tool. Text elements are collected and written on [`Renderer::finish`].
pub struct OutputWriter {
    output_path: PathBuf,
    caption: String,
}

impl OutputWriter {
    /// Create a writer which saves files in `output_path`.
    ///
    /// The folder must already exist.
    pub fn new(output_path: &Path) -> Self {
        Self {
            output_path: output_path.to_path_buf(),
            caption: String::new(),
        }
    }

    /// Open a CSV writer for a file in the output folder
    fn csv_writer(&self, file_name: &str) -> Result<csv::Writer<fs::File>> {
        let file_path = self.output_path.join(file_name);
        csv::Writer::from_path(&file_path)
            .with_context(|| format!("Failed to create {}", file_path.display()))
    }
}

impl Renderer for OutputWriter {
    fn render_header(&mut self, title: &str, description: &str) -> Result<()> {
        self.caption.clear();
        writeln!(&mut self.caption, "{title}\n\n{description}\n")?;
        Ok(())
    }

    fn render_table(&mut self, plants: Option<&[PowerPlant]>) -> Result<()> {
        let file_path = self.output_path.join(PLANTS_TABLE_FILE_NAME);
        let Some(plants) = plants else {
            // Remove the table left over from a previous render, if any
            if file_path.is_file() {
                fs::remove_file(&file_path)?;
            }
            return Ok(());
        };

        let mut writer = self.csv_writer(PLANTS_TABLE_FILE_NAME)?;
        for plant in plants {
            writer.serialize(plant)?;
        }
        writer.flush()?;
        debug!("Wrote {} power plants to {}", plants.len(), file_path.display());

        Ok(())
    }

    fn render_choropleth(
        &mut self,
        map: &ChoroplethMap,
        boundaries: &BoundaryDocument,
        join_key: &str,
    ) -> Result<()> {
        let stem = map.metric.map_file_stem();
        let mut writer = self.csv_writer(&format!("{stem}.csv"))?;
        for (canton, value) in &map.series {
            writer.serialize(MapRow {
                canton,
                value: *value,
            })?;
        }
        writer.flush()?;

        let joined = boundaries.join(&map.series);
        let file_path = self.output_path.join(format!("{stem}.geojson"));
        fs::write(&file_path, serde_json::to_string(&joined)?)
            .with_context(|| format!("Failed to write {}", file_path.display()))?;
        debug!(
            "Joined {} of {} cantons with boundaries on '{join_key}' for {} map",
            joined.features.len(),
            map.series.len(),
            map.metric
        );

        writeln!(
            &mut self.caption,
            "{} (energy source: {})",
            map.metric.title(),
            map.selection
        )?;

        Ok(())
    }

    fn render_stacked_bar(&mut self, chart: &StackedBarChart) -> Result<()> {
        let mut writer = self.csv_writer(STACKED_BAR_FILE_NAME)?;
        for (source, series) in &chart.categories {
            for (canton, value) in series {
                writer.serialize(StackedBarRow {
                    source,
                    canton,
                    value: *value,
                })?;
            }
        }
        writer.flush()?;

        writeln!(&mut self.caption, "{}", chart.title)?;
        Ok(())
    }

    fn render_citation(&mut self, url: &str) -> Result<()> {
        writeln!(&mut self.caption, "\nData Source: {url}")?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        let file_path = self.output_path.join(CAPTION_FILE_NAME);
        fs::write(&file_path, &self.caption)
            .with_context(|| format!("Failed to write {}", file_path.display()))?;
        info!("Dashboard written to {}", self.output_path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{Metric, Series};
    use crate::fixture::{assert_error, plants};
    use crate::input::boundary::CANTON_NAME_PROPERTY;
    use crate::render::DATA_SOURCE_URL;
    use crate::selection::SourceSelection;
    use geojson::GeoJson;
    use indexmap::IndexMap;
    use rstest::rstest;
    use serde_json::json;
    use tempfile::tempdir;

    fn boundaries() -> BoundaryDocument {
        let features = ["Zürich", "Bern"]
            .map(|name| json!({"type": "Feature", "properties": {"kan_name": name}, "geometry": null}));
        let geojson =
            GeoJson::from_json_value(json!({"type": "FeatureCollection", "features": features}))
                .unwrap();
        BoundaryDocument::from_geojson(geojson, CANTON_NAME_PROPERTY).unwrap()
    }

    #[test]
    fn test_create_output_directory_new_directory() {
        let temp_dir = tempdir().unwrap();
        let output_dir = temp_dir.path().join("results");
        assert!(!create_output_directory(&output_dir, false).unwrap());
        assert!(output_dir.is_dir());
    }

    #[test]
    fn test_create_output_directory_existing_empty_directory() {
        let temp_dir = tempdir().unwrap();
        assert!(!create_output_directory(temp_dir.path(), false).unwrap());
    }

    #[test]
    fn test_create_output_directory_existing_non_empty_directory() {
        let temp_dir = tempdir().unwrap();
        let file_path = temp_dir.path().join("file.txt");
        fs::write(&file_path, "contents").unwrap();

        assert!(create_output_directory(temp_dir.path(), false).is_err());
        assert!(file_path.is_file());

        assert!(create_output_directory(temp_dir.path(), true).unwrap());
        assert!(!file_path.exists());
        assert!(temp_dir.path().is_dir());
    }

    #[test]
    fn test_render_choropleth() {
        let dir = tempdir().unwrap();
        let mut writer = OutputWriter::new(dir.path());
        let map = ChoroplethMap {
            metric: Metric::Capacity,
            selection: SourceSelection::Source("Solar".into()),
            series: Series::from([(CantonName::new("Uri"), 1.5), (CantonName::new("Zürich"), 5.0)]),
        };
        writer
            .render_choropleth(&map, &boundaries(), CANTON_NAME_PROPERTY)
            .unwrap();

        let csv = fs::read_to_string(dir.path().join("capacity_map.csv")).unwrap();
        assert_eq!(csv, "canton,value\nUri,1.5\nZürich,5.0\n");

        // Uri has no boundary, so only Zürich is drawn
        let geojson: GeoJson = fs::read_to_string(dir.path().join("capacity_map.geojson"))
            .unwrap()
            .parse()
            .unwrap();
        let GeoJson::FeatureCollection(collection) = geojson else {
            panic!("Expected a feature collection");
        };
        assert_eq!(collection.features.len(), 1);
        assert_eq!(collection.features[0].property("value"), Some(&json!(5.0)));
    }

    #[test]
    fn test_render_choropleth_empty_series() {
        let dir = tempdir().unwrap();
        let mut writer = OutputWriter::new(dir.path());
        let map = ChoroplethMap {
            metric: Metric::Count,
            selection: SourceSelection::Source("Geothermal".into()),
            series: Series::new(),
        };
        writer
            .render_choropleth(&map, &boundaries(), CANTON_NAME_PROPERTY)
            .unwrap();

        // Only the header is written, as there is nothing to plot
        let csv = fs::read_to_string(dir.path().join("plant_count_map.csv")).unwrap();
        assert!(csv.is_empty() || csv == "canton,value\n");
        assert!(dir.path().join("plant_count_map.geojson").is_file());
    }

    #[test]
    fn test_render_stacked_bar() {
        let dir = tempdir().unwrap();
        let mut writer = OutputWriter::new(dir.path());
        let chart = StackedBarChart {
            title: "Production",
            categories: IndexMap::from([
                (
                    EnergySource::new("Hydro"),
                    Series::from([(CantonName::new("Bern"), 500.0)]),
                ),
                (
                    EnergySource::new("Wind"),
                    Series::from([(CantonName::new("Valais"), 300.0)]),
                ),
            ]),
        };
        writer.render_stacked_bar(&chart).unwrap();

        let csv = fs::read_to_string(dir.path().join(STACKED_BAR_FILE_NAME)).unwrap();
        assert_eq!(
            csv,
            "source,canton,value\nHydro,Bern,500.0\nWind,Valais,300.0\n"
        );
    }

    #[rstest]
    fn test_render_table(plants: Vec<PowerPlant>) {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join(PLANTS_TABLE_FILE_NAME);
        let mut writer = OutputWriter::new(dir.path());

        writer.render_table(Some(&plants)).unwrap();
        let csv = fs::read_to_string(&file_path).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next(),
            Some(
                "canton,energy_source,electrical_capacity,production,commissioning_date,\
                contract_period_end,tariff"
            )
        );
        assert_eq!(lines.next(), Some("Zürich,Hydro,10.0,1000.0,,,"));
        assert_eq!(lines.count(), plants.len() - 1);

        // Hiding the table removes the file
        writer.render_table(None).unwrap();
        assert!(!file_path.exists());
    }

    #[test]
    fn test_caption() {
        let dir = tempdir().unwrap();
        let mut writer = OutputWriter::new(dir.path());
        writer.render_header("Title", "Description").unwrap();
        writer.render_citation(DATA_SOURCE_URL).unwrap();
        writer.finish().unwrap();

        assert_eq!(
            fs::read_to_string(dir.path().join(CAPTION_FILE_NAME)).unwrap(),
            "Title\n\nDescription\n\n\nData Source: https://open-power-system-data.org/\n"
        );
    }

    #[test]
    fn test_finish_missing_directory() {
        let dir = tempdir().unwrap();
        let output_path = dir.path().join("missing");
        let mut writer = OutputWriter::new(&output_path);
        assert_error!(
            writer.finish(),
            format!(
                "Failed to write {}",
                output_path.join(CAPTION_FILE_NAME).display()
            )
        );
    }
}
