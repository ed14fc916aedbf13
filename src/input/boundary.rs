//! Code for reading canton boundaries from a GeoJSON file.
use super::*;
use crate::aggregate::Series;
use crate::canton::CantonName;
use anyhow::bail;
use geojson::{Feature, FeatureCollection, GeoJson};
use indexmap::IndexMap;
use log::warn;
use serde_json::Value;

/// The name of the file containing canton boundaries
pub const BOUNDARIES_FILE_NAME: &str = "georef-switzerland-kanton.geojson";

/// The feature property holding the canton name, used to join boundaries with statistics
pub const CANTON_NAME_PROPERTY: &str = "kan_name";

/// The feature property holding the value to plot when boundaries are joined with a series
pub const VALUE_PROPERTY: &str = "value";

/// A collection of region boundaries, keyed by region name
#[derive(Debug, Clone, PartialEq)]
pub struct BoundaryDocument {
    join_key: String,
    features: IndexMap<CantonName, Feature>,
}

impl BoundaryDocument {
    /// Create a [`BoundaryDocument`] from GeoJSON.
    ///
    /// # Arguments
    ///
    /// * `geojson` - A GeoJSON feature collection
    /// * `join_key` - The feature property containing the region name
    pub fn from_geojson(geojson: GeoJson, join_key: &str) -> Result<Self> {
        let collection = FeatureCollection::try_from(geojson)
            .context("Boundary file must contain a GeoJSON feature collection")?;
        ensure!(
            !collection.features.is_empty(),
            "Boundary file contains no features"
        );

        let mut features = IndexMap::new();
        for (idx, feature) in collection.features.into_iter().enumerate() {
            let Some(name) = feature.property(join_key).and_then(region_name) else {
                bail!("Feature {idx} has no '{join_key}' property");
            };
            let name = CantonName::new(name);

            if features.contains_key(&name) {
                warn!("Duplicate boundary for {name}: only the first will be drawn");
                continue;
            }
            features.insert(name, feature);
        }

        Ok(Self {
            join_key: join_key.to_string(),
            features,
        })
    }

    /// The feature property used as the join key
    pub fn join_key(&self) -> &str {
        &self.join_key
    }

    /// The names of all regions with a boundary, in file order
    pub fn region_names(&self) -> impl Iterator<Item = &CantonName> {
        self.features.keys()
    }

    /// Whether there is a boundary for the given region
    pub fn contains(&self, name: &CantonName) -> bool {
        self.features.contains_key(name)
    }

    /// Get the boundary feature for the given region
    pub fn feature(&self, name: &CantonName) -> Option<&Feature> {
        self.features.get(name)
    }

    /// Join a series with the boundaries.
    ///
    /// Each region in the series with a boundary yields a copy of its feature with the value added
    /// as a property. Regions without a boundary are left out.
    pub fn join(&self, series: &Series) -> FeatureCollection {
        let features = series
            .iter()
            .filter_map(|(name, value)| {
                let Some(feature) = self.features.get(name) else {
                    debug!("No boundary found for {name}: it will not be drawn");
                    return None;
                };

                let mut feature = feature.clone();
                feature.set_property(VALUE_PROPERTY, *value);
                Some(feature)
            })
            .collect();

        FeatureCollection {
            bbox: None,
            features,
            foreign_members: None,
        }
    }
}

/// Get a region name from a property value.
///
/// Some boundary files store names as a list (e.g. `["Zürich"]`), in which case the first entry is
/// used.
fn region_name(value: &Value) -> Option<&str> {
    match value {
        Value::String(name) => Some(name),
        Value::Array(names) => names.first().and_then(Value::as_str),
        _ => None,
    }
}

/// Read canton boundaries from the specified GeoJSON file.
pub fn read_boundaries(file_path: &Path) -> Result<BoundaryDocument> {
    let contents = fs::read_to_string(file_path).with_context(|| input_err_msg(file_path))?;
    let geojson: GeoJson = contents.parse().with_context(|| input_err_msg(file_path))?;
    BoundaryDocument::from_geojson(geojson, CANTON_NAME_PROPERTY)
        .with_context(|| input_err_msg(file_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;
    use rstest::{fixture, rstest};
    use serde_json::json;
    use tempfile::tempdir;

    fn square(name: Value) -> Value {
        json!({
            "type": "Feature",
            "properties": {"kan_name": name},
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[8.0, 47.0], [8.5, 47.0], [8.5, 47.5], [8.0, 47.5], [8.0, 47.0]]]
            }
        })
    }

    fn collection(features: Vec<Value>) -> GeoJson {
        GeoJson::from_json_value(json!({"type": "FeatureCollection", "features": features}))
            .unwrap()
    }

    #[fixture]
    fn boundaries() -> BoundaryDocument {
        let geojson = collection(vec![square(json!("Zürich")), square(json!(["Bern"]))]);
        BoundaryDocument::from_geojson(geojson, CANTON_NAME_PROPERTY).unwrap()
    }

    #[rstest]
    fn test_region_names(boundaries: BoundaryDocument) {
        assert!(
            boundaries
                .region_names()
                .map(CantonName::as_str)
                .eq(["Zürich", "Bern"])
        );
        assert!(boundaries.contains(&"Bern".into()));
        assert!(!boundaries.contains(&"Uri".into()));
        assert_eq!(boundaries.join_key(), "kan_name");
    }

    #[rstest]
    fn test_join(boundaries: BoundaryDocument) {
        let series = Series::from([
            (CantonName::new("Bern"), 2.0),
            (CantonName::new("Uri"), 3.0),
            (CantonName::new("Zürich"), 1.0),
        ]);
        let joined = boundaries.join(&series);

        // Uri has no boundary so is dropped
        assert_eq!(joined.features.len(), 2);
        assert_eq!(
            joined.features[0].property(VALUE_PROPERTY),
            Some(&json!(2.0))
        );
        assert_eq!(
            joined.features[1].property(CANTON_NAME_PROPERTY),
            Some(&json!("Zürich"))
        );
    }

    #[rstest]
    fn test_join_empty_series(boundaries: BoundaryDocument) {
        assert!(boundaries.join(&Series::new()).features.is_empty());
    }

    #[rstest]
    #[case(
        collection(vec![square(json!(42))]),
        "Feature 0 has no 'kan_name' property"
    )]
    #[case(collection(Vec::new()), "Boundary file contains no features")]
    fn test_from_geojson_invalid(#[case] geojson: GeoJson, #[case] msg: &str) {
        assert_error!(
            BoundaryDocument::from_geojson(geojson, CANTON_NAME_PROPERTY),
            msg
        );
    }

    #[test]
    fn test_from_geojson_duplicate_keeps_first() {
        let mut second = square(json!("Zürich"));
        second["properties"]["kan_code"] = json!("2");
        let geojson = collection(vec![square(json!("Zürich")), second, square(json!("Bern"))]);
        let boundaries = BoundaryDocument::from_geojson(geojson, CANTON_NAME_PROPERTY).unwrap();

        assert!(
            boundaries
                .region_names()
                .map(CantonName::as_str)
                .eq(["Zürich", "Bern"])
        );
        let zurich = boundaries.feature(&"Zürich".into()).unwrap();
        assert!(zurich.property("kan_code").is_none());
    }

    #[test]
    fn test_from_geojson_not_collection() {
        let geojson = GeoJson::from_json_value(square(json!("Zürich"))).unwrap();
        assert_error!(
            BoundaryDocument::from_geojson(geojson, CANTON_NAME_PROPERTY),
            "Boundary file must contain a GeoJSON feature collection"
        );
    }

    #[test]
    fn test_read_boundaries() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join(BOUNDARIES_FILE_NAME);
        fs::write(&file_path, collection(vec![square(json!("Uri"))]).to_string()).unwrap();
        let boundaries = read_boundaries(&file_path).unwrap();
        assert!(boundaries.feature(&"Uri".into()).is_some());

        fs::write(&file_path, "not json").unwrap();
        assert_error!(read_boundaries(&file_path), input_err_msg(&file_path));
    }
}
