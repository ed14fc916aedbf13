//! Cantons are the regions by which power-plant statistics are grouped and mapped.
use crate::id::define_id_type;
use log::warn;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

define_id_type! {CantonName}

/// The number of Swiss cantons
pub const NUM_CANTONS: usize = 26;

/// Two-letter canton codes and the names used for them in the boundary file
pub const CANTONS: [(&str, &str); NUM_CANTONS] = [
    ("TG", "Thurgau"),
    ("GR", "Graubünden"),
    ("LU", "Luzern"),
    ("BE", "Bern"),
    ("VS", "Valais"),
    ("BL", "Basel-Landschaft"),
    ("SO", "Solothurn"),
    ("VD", "Vaud"),
    ("SH", "Schaffhausen"),
    ("ZH", "Zürich"),
    ("AG", "Aargau"),
    ("UR", "Uri"),
    ("NE", "Neuchâtel"),
    ("TI", "Ticino"),
    ("SG", "St. Gallen"),
    ("GE", "Genève"),
    ("GL", "Glarus"),
    ("JU", "Jura"),
    ("ZG", "Zug"),
    ("OW", "Obwalden"),
    ("FR", "Fribourg"),
    ("SZ", "Schwyz"),
    ("AR", "Appenzell Ausserrhoden"),
    ("AI", "Appenzell Innerrhoden"),
    ("NW", "Nidwalden"),
    ("BS", "Basel-Stadt"),
];

/// Lookup from canton code to canton name
static CANTON_NAMES: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| CANTONS.into_iter().collect());

/// Look up the full name for a two-letter canton code.
///
/// Surrounding whitespace is ignored and the code is matched case-insensitively.
pub fn canton_name(code: &str) -> Option<&'static str> {
    CANTON_NAMES
        .get(code.trim().to_ascii_uppercase().as_str())
        .copied()
}

/// Converts canton codes found in the data into [`CantonName`]s.
///
/// Codes without an entry in the lookup table are passed through unchanged. A warning is logged
/// the first time each such code is seen.
#[derive(Default)]
pub struct CantonNormaliser {
    unknown_codes: RefCell<HashSet<String>>,
}

impl CantonNormaliser {
    /// Create a new [`CantonNormaliser`]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the canton name for the given code
    pub fn normalise(&self, code: &str) -> CantonName {
        if let Some(name) = canton_name(code) {
            return name.into();
        }

        if self.unknown_codes.borrow_mut().insert(code.to_string()) {
            warn!("Unknown canton code '{code}': plants will be listed under this code");
        }

        code.into()
    }

    /// The codes seen so far which had no entry in the lookup table
    pub fn unknown_codes(&self) -> Vec<String> {
        let mut codes: Vec<_> = self.unknown_codes.borrow().iter().cloned().collect();
        codes.sort();
        codes
    }
}
