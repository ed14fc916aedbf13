//! Common routines for handling input data.
use crate::aggregate::AggregateViews;
use crate::plant::PowerPlant;
use anyhow::{Context, Result, ensure};
use log::{debug, info};
use serde::de::DeserializeOwned;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

pub mod boundary;
use boundary::{BOUNDARIES_FILE_NAME, BoundaryDocument, read_boundaries};
pub mod plant;
use plant::{PLANTS_FILE_NAME, read_power_plants};

/// Read a series of type `T`s from a CSV file.
///
/// Whitespace around fields is ignored and empty fields are read as missing values.
///
/// # Arguments
///
/// * `file_path` - Path to the CSV file
pub fn read_csv<T: DeserializeOwned>(file_path: &Path) -> Result<Vec<T>> {
    let vec: Vec<T> = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(file_path)
        .with_context(|| input_err_msg(file_path))?
        .into_deserialize()
        .collect::<Result<_, _>>()
        .with_context(|| input_err_msg(file_path))?;

    ensure!(!vec.is_empty(), "CSV file {} cannot be empty", file_path.display());

    Ok(vec)
}

/// Parse a TOML file at the specified path.
///
/// # Arguments
///
/// * `file_path` - Path to the TOML file
///
/// # Returns
///
/// * The deserialised TOML data or an error if the file could not be read or parsed.
pub fn read_toml<T: DeserializeOwned>(file_path: &Path) -> Result<T> {
    let toml_str = fs::read_to_string(file_path).with_context(|| input_err_msg(file_path))?;
    let toml_data = toml::from_str(&toml_str).with_context(|| input_err_msg(file_path))?;
    Ok(toml_data)
}

/// Format an error message to include the file path. To be used with `anyhow::Context`.
pub fn input_err_msg<P: AsRef<Path>>(file_path: P) -> String {
    format!("Error reading {}", file_path.as_ref().display())
}

/// Results of loading a file, memoised on the file's path.
///
/// Input files are assumed not to change while the program is running, so entries are never
/// invalidated.
pub struct FileCache<T> {
    entries: HashMap<PathBuf, Rc<T>>,
}

impl<T> Default for FileCache<T> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<T> FileCache<T> {
    /// Get the cached value for `file_path`, calling `load` to create it if not yet cached
    pub fn get_or_load<F>(&mut self, file_path: &Path, load: F) -> Result<Rc<T>>
    where
        F: FnOnce(&Path) -> Result<T>,
    {
        if let Some(value) = self.entries.get(file_path) {
            debug!("Using cached data for {}", file_path.display());
            return Ok(Rc::clone(value));
        }

        let value = Rc::new(load(file_path)?);
        self.entries
            .insert(file_path.to_path_buf(), Rc::clone(&value));

        Ok(value)
    }

    /// The number of cached entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The data displayed by the dashboard
#[derive(Clone)]
pub struct DashboardData {
    /// Every power plant in the input data
    pub plants: Rc<Vec<PowerPlant>>,
    /// Canton boundaries
    pub boundaries: Rc<BoundaryDocument>,
    /// Statistics aggregated over `plants`
    pub views: Rc<AggregateViews>,
}

/// Loads input data, memoising the results so each file is read and aggregated at most once
#[derive(Default)]
pub struct DataStore {
    plants: FileCache<Vec<PowerPlant>>,
    boundaries: FileCache<BoundaryDocument>,
    views: FileCache<AggregateViews>,
}

impl DataStore {
    /// Create a new, empty [`DataStore`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the power plants and boundaries in `data_dir` and aggregate them
    pub fn load(&mut self, data_dir: &Path) -> Result<DashboardData> {
        let plants_path = data_dir.join(PLANTS_FILE_NAME);
        let plants = self.plants.get_or_load(&plants_path, read_power_plants)?;
        let boundaries = self
            .boundaries
            .get_or_load(&data_dir.join(BOUNDARIES_FILE_NAME), read_boundaries)?;
        let views = self
            .views
            .get_or_load(&plants_path, |_| Ok(AggregateViews::from_plants(&plants)))?;

        info!(
            "Loaded {} power plants in {} cantons with {} energy sources",
            plants.len(),
            views.cantons().len(),
            views.sources().len()
        );

        Ok(DashboardData {
            plants,
            boundaries,
            views,
        })
    }
}

thread_local! {
    /// Data loaded so far by this process
    static DATA_STORE: RefCell<DataStore> = RefCell::new(DataStore::new());
}

/// Load the data for the dashboard from the specified folder.
///
/// Files which have already been loaded by this process are not read again.
///
/// # Arguments
///
/// * `data_dir` - Folder containing the power plant and canton boundary files
pub fn load_data(data_dir: &Path) -> Result<DashboardData> {
    DATA_STORE.with_borrow_mut(|store| store.load(data_dir))
}

/// Format a list of items for display in log messages
pub(crate) fn format_items<T: Display>(items: impl IntoIterator<Item = T>) -> String {
    items
        .into_iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;
    use serde::Deserialize;
    use std::cell::Cell;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    #[derive(Debug, PartialEq, Deserialize)]
    struct Record {
        id: String,
        value: Option<u32>,
    }

    /// Create an example CSV file in dir_path
    fn create_csv_file(dir_path: &Path, contents: &str) -> PathBuf {
        let file_path = dir_path.join("test.csv");
        let mut file = File::create(&file_path).unwrap();
        writeln!(file, "{contents}").unwrap();
        file_path
    }

    #[test]
    fn test_read_csv() {
        let dir = tempdir().unwrap();
        let file_path = create_csv_file(dir.path(), "id,value\nhello, 1\nworld,");
        let records: Vec<Record> = read_csv(&file_path).unwrap();
        assert_eq!(
            records,
            &[
                Record {
                    id: "hello".to_string(),
                    value: Some(1),
                },
                Record {
                    id: "world".to_string(),
                    value: None,
                },
            ]
        );

        // File with no data rows
        let file_path = create_csv_file(dir.path(), "id,value");
        assert_error!(
            read_csv::<Record>(&file_path),
            format!("CSV file {} cannot be empty", file_path.display())
        );
    }

    #[test]
    fn test_read_csv_missing_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("missing.csv");
        assert_error!(read_csv::<Record>(&file_path), input_err_msg(&file_path));
    }

    #[derive(Debug, PartialEq, Deserialize)]
    struct Record2 {
        value: u32,
    }

    #[test]
    fn test_read_toml() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.toml");
        {
            let mut file = File::create(&file_path).unwrap();
            writeln!(file, "value = 1").unwrap();
        }

        assert_eq!(read_toml::<Record2>(&file_path).unwrap(), Record2 { value: 1 });

        {
            let mut file = File::create(&file_path).unwrap();
            writeln!(file, "bad toml syntax").unwrap();
        }

        assert!(read_toml::<Record2>(&file_path).is_err());
    }

    #[test]
    fn test_file_cache_loads_once() {
        let mut cache = FileCache::default();
        let num_loads = Cell::new(0);
        let load = |_: &Path| -> Result<u32> {
            num_loads.set(num_loads.get() + 1);
            Ok(42)
        };

        let first = cache.get_or_load(Path::new("a.csv"), load).unwrap();
        let second = cache.get_or_load(Path::new("a.csv"), load).unwrap();
        assert_eq!(*first, 42);
        assert!(Rc::ptr_eq(&first, &second));
        assert_eq!(num_loads.get(), 1);

        cache.get_or_load(Path::new("b.csv"), load).unwrap();
        assert_eq!(num_loads.get(), 2);
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_file_cache_error_not_cached() {
        let mut cache: FileCache<u32> = FileCache::default();
        assert!(
            cache
                .get_or_load(Path::new("a.csv"), |_| anyhow::bail!("Failed"))
                .is_err()
        );
        assert!(cache.is_empty());
    }

    #[test]
    fn test_load_data_memoised() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join(PLANTS_FILE_NAME),
            "canton,energy_source_level_2,electrical_capacity,production\nZH,Hydro,10,1000\n",
        )
        .unwrap();
        fs::write(
            dir.path().join(BOUNDARIES_FILE_NAME),
            r#"{"type": "FeatureCollection", "features": [
                {"type": "Feature", "properties": {"kan_name": "Zürich"}, "geometry": null}
            ]}"#,
        )
        .unwrap();

        let first = load_data(dir.path()).unwrap();

        // The files are only read once, so removing them doesn't matter
        fs::remove_file(dir.path().join(PLANTS_FILE_NAME)).unwrap();
        fs::remove_file(dir.path().join(BOUNDARIES_FILE_NAME)).unwrap();
        let second = load_data(dir.path()).unwrap();
        assert!(Rc::ptr_eq(&first.plants, &second.plants));
        assert!(Rc::ptr_eq(&first.boundaries, &second.boundaries));
        assert!(Rc::ptr_eq(&first.views, &second.views));
    }

    #[test]
    fn test_format_items() {
        assert_eq!(format_items(["a", "b", "c"]), "a, b, c");
        assert_eq!(format_items(Vec::<String>::new()), "");
    }
}
