//! An interactive session in which the user changes the dashboard's controls from the console.
use crate::aggregate::Metric;
use crate::dashboard::Dashboard;
use anyhow::{Context, Result, bail};
use std::io::{BufRead, Write};
use std::str::FromStr;

/// Text listing the commands available in an explore session
const HELP_TEXT: &str = "Commands:
  production <SOURCE>  Show plants with the given energy source on the production map
  capacity <SOURCE>    Show plants with the given energy source on the capacity map
  count <SOURCE>       Show plants with the given energy source on the plant count map
  table on|off         Show or hide the table of raw data
  options              List the energy sources which can be selected
  help                 Show this message
  quit                 End the session";

/// A command entered during an explore session
#[derive(Debug, PartialEq)]
pub enum ExploreCommand {
    /// Change the energy source shown on a map
    Select(Metric, String),
    /// Show or hide the raw data table
    Table(bool),
    /// List the available energy sources
    Options,
    /// Show the available commands
    Help,
    /// End the session
    Quit,
}

impl ExploreCommand {
    /// Parse a command from a line of input
    pub fn parse(line: &str) -> Result<Self> {
        let line = line.trim();
        let (name, arg) = match line.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (line, ""),
        };

        let command = match name.to_lowercase().as_str() {
            "table" => match arg.to_lowercase().as_str() {
                "on" => Self::Table(true),
                "off" => Self::Table(false),
                _ => bail!("Expected 'table on' or 'table off'"),
            },
            "options" => Self::Options,
            "help" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => {
                let metric = Metric::from_str(other)
                    .with_context(|| format!("Unknown command '{other}'. Type 'help' for help."))?;
                Self::Select(metric, arg.to_string())
            }
        };

        Ok(command)
    }
}

/// Read commands from `input` until it is exhausted or the user quits.
///
/// `on_change` is called each time the dashboard's state changes. Invalid commands are reported
/// to `output` and do not end the session.
pub fn run_session<R, W, F>(
    dashboard: &mut Dashboard,
    input: R,
    mut output: W,
    mut on_change: F,
) -> Result<()>
where
    R: BufRead,
    W: Write,
    F: FnMut(&Dashboard) -> Result<()>,
{
    writeln!(output, "{HELP_TEXT}")?;
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let command = match ExploreCommand::parse(&line) {
            Ok(command) => command,
            Err(err) => {
                writeln!(output, "{err:#}")?;
                continue;
            }
        };

        match command {
            ExploreCommand::Select(metric, source) => {
                if let Err(err) = dashboard.select_str(metric, &source) {
                    writeln!(output, "{err:#}")?;
                    continue;
                }
                on_change(dashboard)?;
            }
            ExploreCommand::Table(show_table) => {
                dashboard.set_show_table(show_table);
                on_change(dashboard)?;
            }
            ExploreCommand::Options => writeln!(output, "{}", dashboard.source_options().join("\n"))?,
            ExploreCommand::Help => writeln!(output, "{HELP_TEXT}")?,
            ExploreCommand::Quit => break,
        }
    }

    Ok(())
}
