//! Common functionality for swiss-renewables.
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod aggregate;
pub mod canton;
pub mod cli;
pub mod dashboard;
pub mod id;
pub mod input;
pub mod log;
pub mod output;
pub mod plant;
pub mod render;
pub mod selection;
pub mod settings;
pub mod units;

#[cfg(test)]
mod fixture;

/// Get the directory in which program configuration files are stored.
///
/// Falls back on the current working directory if the platform has no standard config folder.
pub fn get_config_dir() -> PathBuf {
    let Some(mut dir) = dirs::config_dir() else {
        return PathBuf::from(".");
    };
    dir.push("swiss-renewables");

    dir
}
