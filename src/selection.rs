//! Choosing which slice of the aggregated data to display.
use crate::aggregate::{AggregateViews, Metric, Series};
use crate::plant::EnergySource;
use anyhow::{Result, ensure};
use indexmap::IndexSet;
use log::warn;
use std::fmt;
use std::iter;
use unicase::UniCase;

/// The option used to select plants of every energy source
pub const ALL_SOURCES: &str = "All";

/// Which power plants to include, by energy source
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SourceSelection {
    /// Plants of every energy source
    #[default]
    All,
    /// Only plants with the given energy source
    Source(EnergySource),
}

impl SourceSelection {
    /// Parse a selection from a string.
    ///
    /// The string can be either "all" (case-insensitive) or the name of an energy source. Names are
    /// matched case-insensitively against `sources` and the spelling from `sources` is used. A name
    /// which isn't in `sources` is still accepted (with a warning), but will select no plants.
    pub fn parse(s: &str, sources: &IndexSet<EnergySource>) -> Result<Self> {
        let s = s.trim();
        ensure!(!s.is_empty(), "No energy source provided");

        if s.eq_ignore_ascii_case(ALL_SOURCES) {
            return Ok(Self::All);
        }

        let wanted = UniCase::new(s);
        if let Some(source) = sources
            .iter()
            .find(|source| UniCase::new(source.as_str()) == wanted)
        {
            return Ok(Self::Source(source.clone()));
        }

        warn!("No power plants found with energy source '{s}'");
        Ok(Self::Source(s.into()))
    }

    /// Get the values of `metric` for each canton for this selection
    pub fn select(&self, views: &AggregateViews, metric: Metric) -> Series {
        let view = views.view(metric);
        match self {
            Self::All => view.by_region().clone(),
            Self::Source(source) => view.for_source(source),
        }
    }
}

impl fmt::Display for SourceSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "{ALL_SOURCES}"),
            Self::Source(source) => write!(f, "{source}"),
        }
    }
}

/// The options offered to the user when choosing an energy source: "All" then every source
pub fn source_options(sources: &IndexSet<EnergySource>) -> Vec<String> {
    let mut sorted: Vec<_> = sources.iter().map(ToString::to_string).collect();
    sorted.sort();

    iter::once(ALL_SOURCES.to_string()).chain(sorted).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canton::CantonName;
    use crate::fixture::{assert_error, views};
    use itertools::Itertools;
    use rstest::rstest;
    use strum::IntoEnumIterator;

    #[rstest]
    #[case("All", SourceSelection::All)]
    #[case(" all ", SourceSelection::All)]
    #[case("Hydro", SourceSelection::Source("Hydro".into()))]
    #[case("hydro", SourceSelection::Source("Hydro".into()))]
    #[case("SOLAR", SourceSelection::Source("Solar".into()))]
    #[case("Geothermal", SourceSelection::Source("Geothermal".into()))]
    fn test_parse(
        #[case] input: &str,
        #[case] expected: SourceSelection,
        views: AggregateViews,
    ) {
        assert_eq!(
            SourceSelection::parse(input, views.sources()).unwrap(),
            expected
        );
    }

    #[rstest]
    fn test_parse_empty(views: AggregateViews) {
        assert_error!(
            SourceSelection::parse("  ", views.sources()),
            "No energy source provided"
        );
    }

    #[rstest]
    fn test_select_all_one_value_per_canton(views: AggregateViews) {
        for metric in Metric::iter() {
            let series = SourceSelection::All.select(&views, metric);
            assert!(series.keys().eq(views.cantons().iter()));
        }
    }

    #[rstest]
    fn test_select_source(views: AggregateViews) {
        let selection = SourceSelection::Source("Hydro".into());
        assert_eq!(
            selection.select(&views, Metric::Production),
            Series::from([
                (CantonName::new("Bern"), 500.0),
                (CantonName::new("Zürich"), 1000.0)
            ])
        );
        assert_eq!(
            selection.select(&views, Metric::Count),
            Series::from([(CantonName::new("Bern"), 1.0), (CantonName::new("Zürich"), 1.0)])
        );
    }

    #[rstest]
    fn test_select_source_only_cantons_with_plants(views: AggregateViews) {
        let series = SourceSelection::Source("Wind".into()).select(&views, Metric::Capacity);
        assert_eq!(
            series.keys().map(CantonName::as_str).collect_vec(),
            ["Valais"]
        );
    }

    #[rstest]
    fn test_select_unknown_source_is_empty(views: AggregateViews) {
        let selection = SourceSelection::parse("Geothermal", views.sources()).unwrap();
        for metric in Metric::iter() {
            assert!(selection.select(&views, metric).is_empty());
        }
    }

    #[rstest]
    fn test_source_options(views: AggregateViews) {
        assert_eq!(
            source_options(views.sources()),
            ["All", "Hydro", "Solar", "Wind"]
        );
    }

    #[test]
    fn test_display() {
        assert_eq!(SourceSelection::All.to_string(), "All");
        assert_eq!(SourceSelection::Source("Wind".into()).to_string(), "Wind");
    }
}
