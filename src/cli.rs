//! The command line interface for the dashboard.
use crate::aggregate::Metric;
use crate::dashboard::Dashboard;
use crate::input::{format_items, load_data};
use crate::log;
use crate::output::metadata::write_metadata;
use crate::output::{OutputWriter, create_output_directory, get_output_dir};
use crate::selection::{ALL_SOURCES, source_options};
use crate::settings::Settings;
use ::log::{info, warn};
use anyhow::{Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand};
use itertools::Itertools;
use std::io;
use std::path::{Path, PathBuf};

pub mod example;
use example::ExampleSubcommands;
pub mod explore;
pub mod settings;
use settings::SettingsSubcommands;

/// The command line interface for the dashboard.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// The available commands.
    #[command(subcommand)]
    command: Option<Commands>,
    /// Flag to provide the CLI docs as markdown
    #[arg(long, hide = true)]
    markdown_help: bool,
}

/// Options for commands which write a dashboard
#[derive(Args)]
pub struct RunOpts {
    /// Directory for output files
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,
    /// Whether to overwrite the output directory if it already exists
    #[arg(long)]
    pub overwrite: bool,
}

/// The initial state of the dashboard's controls
#[derive(Args)]
pub struct SelectionOpts {
    /// Energy source shown on the production map
    #[arg(long, default_value = ALL_SOURCES)]
    pub production: String,
    /// Energy source shown on the capacity map
    #[arg(long, default_value = ALL_SOURCES)]
    pub capacity: String,
    /// Energy source shown on the plant count map
    #[arg(long, default_value = ALL_SOURCES)]
    pub count: String,
    /// Whether to write the table of raw power-plant data
    #[arg(long)]
    pub show_table: bool,
}

impl Default for SelectionOpts {
    fn default() -> Self {
        Self {
            production: ALL_SOURCES.into(),
            capacity: ALL_SOURCES.into(),
            count: ALL_SOURCES.into(),
            show_table: false,
        }
    }
}

impl SelectionOpts {
    /// The selection for each metric
    fn selections(&self) -> [(Metric, &str); 3] {
        [
            (Metric::Production, self.production.as_str()),
            (Metric::Capacity, self.capacity.as_str()),
            (Metric::Count, self.count.as_str()),
        ]
    }
}

/// The available commands.
#[derive(Subcommand)]
enum Commands {
    /// Write the dashboard for a data set.
    Run {
        /// Path to the data directory.
        data_dir: PathBuf,
        /// Output options
        #[command(flatten)]
        opts: RunOpts,
        /// Energy sources to show and whether to include the raw data
        #[command(flatten)]
        selection: SelectionOpts,
    },
    /// Interactively change the dashboard's selections, rewriting it after each change.
    Explore {
        /// Path to the data directory.
        data_dir: PathBuf,
        /// Output options
        #[command(flatten)]
        opts: RunOpts,
    },
    /// List the energy sources which can be selected for a data set.
    Sources {
        /// Path to the data directory.
        data_dir: PathBuf,
    },
    /// Validate a data set.
    Validate {
        /// Path to the data directory.
        data_dir: PathBuf,
    },
    /// Manage example data sets.
    Example {
        /// The available subcommands for managing example data sets.
        #[command(subcommand)]
        subcommand: ExampleSubcommands,
    },
    /// Manage settings file.
    Settings {
        /// The subcommands for managing the settings file.
        #[command(subcommand)]
        subcommand: SettingsSubcommands,
    },
}

impl Commands {
    /// Execute the supplied CLI command
    fn execute(self) -> Result<()> {
        match self {
            Self::Run {
                data_dir,
                opts,
                selection,
            } => handle_run_command(&data_dir, &opts, &selection, None),
            Self::Explore { data_dir, opts } => handle_explore_command(&data_dir, &opts, None),
            Self::Sources { data_dir } => handle_sources_command(&data_dir, None),
            Self::Validate { data_dir } => handle_validate_command(&data_dir, None),
            Self::Example { subcommand } => subcommand.execute(),
            Self::Settings { subcommand } => subcommand.execute(),
        }
    }
}

/// Parse CLI arguments and run the requested command
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    // Invoked as: `$ swiss-renewables --markdown-help`
    if cli.markdown_help {
        clap_markdown::print_help_markdown::<Cli>();
        return Ok(());
    }

    let Some(command) = cli.command else {
        let help_str = Cli::command().render_long_help().to_string();
        println!("{help_str}");
        return Ok(());
    };

    command.execute()
}

/// Load program settings, if not provided
fn load_settings(settings: Option<Settings>) -> Result<Settings> {
    match settings {
        Some(settings) => Ok(settings),
        None => Settings::load().context("Failed to load settings."),
    }
}

/// Create the output folder and start logging to it.
///
/// # Returns
///
/// The path to the output folder.
fn prepare_output(data_path: &Path, opts: &RunOpts, settings: &Settings) -> Result<PathBuf> {
    let output_path = match &opts.output_dir {
        Some(path) => path.clone(),
        None => get_output_dir(data_path)?,
    };

    let overwrite = create_output_directory(&output_path, opts.overwrite || settings.overwrite)
        .with_context(|| {
            format!(
                "Failed to create output directory: {}",
                output_path.display()
            )
        })?;

    // Initialise program logger
    log::init(Some(settings.log_level.as_str()), Some(&output_path))
        .context("Failed to initialise logging.")?;

    // NB: We have to wait until the logger is initialised to display this warning
    if overwrite {
        warn!("Output folder will be overwritten");
    }
    info!("Output folder: {}", output_path.display());

    Ok(output_path)
}

/// Write every element of the dashboard to the output folder, along with run metadata
fn write_dashboard(dashboard: &Dashboard, data_path: &Path, output_path: &Path) -> Result<()> {
    let mut writer = OutputWriter::new(output_path);
    dashboard.render(&mut writer)?;
    write_metadata(output_path, data_path, dashboard).context("Failed to save metadata.")
}

/// Handle the `run` command.
pub fn handle_run_command(
    data_path: &Path,
    opts: &RunOpts,
    selection: &SelectionOpts,
    settings: Option<Settings>,
) -> Result<()> {
    let settings = load_settings(settings)?;
    let output_path = prepare_output(data_path, opts, &settings)?;

    let data = load_data(data_path).context("Failed to load data.")?;
    info!("Loaded data from {}", data_path.display());

    let mut dashboard = Dashboard::new(data);
    for (metric, source) in selection.selections() {
        dashboard
            .select_str(metric, source)
            .with_context(|| format!("Invalid selection for {metric} map"))?;
    }
    dashboard.set_show_table(selection.show_table || settings.show_table);

    write_dashboard(&dashboard, data_path, &output_path)
}

/// Handle the `explore` command.
///
/// The dashboard is written once with default selections, then again after each command read
/// from stdin which changes it.
pub fn handle_explore_command(
    data_path: &Path,
    opts: &RunOpts,
    settings: Option<Settings>,
) -> Result<()> {
    let settings = load_settings(settings)?;
    let output_path = prepare_output(data_path, opts, &settings)?;

    let data = load_data(data_path).context("Failed to load data.")?;
    let mut dashboard = Dashboard::new(data);
    dashboard.set_show_table(settings.show_table);
    write_dashboard(&dashboard, data_path, &output_path)?;

    explore::run_session(
        &mut dashboard,
        io::stdin().lock(),
        io::stdout().lock(),
        |dashboard| write_dashboard(dashboard, data_path, &output_path),
    )
}

/// Handle the `sources` command.
pub fn handle_sources_command(data_path: &Path, settings: Option<Settings>) -> Result<()> {
    let settings = load_settings(settings)?;

    // No log files are saved for this command
    log::init(Some(settings.log_level.as_str()), None).context("Failed to initialise logging.")?;

    let data = load_data(data_path).context("Failed to load data.")?;
    for option in source_options(data.views.sources()) {
        println!("{option}");
    }

    Ok(())
}

/// Handle the `validate` command.
pub fn handle_validate_command(data_path: &Path, settings: Option<Settings>) -> Result<()> {
    let settings = load_settings(settings)?;

    // Initialise program logger (we won't save log files when running the validate command)
    log::init(Some(settings.log_level.as_str()), None).context("Failed to initialise logging.")?;

    let data = load_data(data_path).context("Failed to validate data.")?;
    data.views
        .check_consistency(&data.plants)
        .context("Failed to validate data.")?;

    let boundaries = &data.boundaries;
    let views = &data.views;
    let missing_boundaries = views
        .cantons()
        .iter()
        .filter(|canton| !boundaries.contains(canton))
        .collect_vec();
    if !missing_boundaries.is_empty() {
        warn!(
            "No boundary found for the following cantons, which will not be shown on maps: {}",
            format_items(missing_boundaries)
        );
    }

    let missing_data = boundaries
        .region_names()
        .filter(|canton| !views.cantons().contains(*canton))
        .collect_vec();
    if !missing_data.is_empty() {
        info!(
            "No power plants found in the following cantons: {}",
            format_items(missing_data)
        );
    }

    info!("Data validation successful!");

    Ok(())
}
