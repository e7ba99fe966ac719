use chrono::{Datelike, Duration, NaiveDate};
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use thiserror::Error;

use crate::api::{ApiClient, ApiError};
use crate::schedule::{self, Granularity, Grid, ProjectionError, ScheduleEntry, Window};
use crate::utils::{parse_date, today};

#[derive(Parser)]
#[command(name = "sprig")]
#[command(about = "Garden manager - catalog search, sections and schedules in your terminal")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(short, long)]
    pub config: Option<String>,

    /// Use development mode (uses separate dev config)
    #[arg(long)]
    pub dev: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Launch interactive TUI (default if no subcommand)
    Tui,
    /// Search the plant catalog
    Search {
        /// Search term (matched against names and type)
        query: String,
    },
    /// Add a catalog plant to your garden
    AddPlant {
        /// Plant catalog id
        plant_id: i64,
    },
    /// Remove a plant from your garden
    RemovePlant {
        /// Plant catalog id
        plant_id: i64,
    },
    /// Move a plant into a section (or unassign it)
    Assign {
        /// Plant catalog id
        plant_id: i64,
        /// Section identifier; omit to unassign
        #[arg(long)]
        section: Option<String>,
    },
    /// List your garden sections
    Sections,
    /// Print the watering grid for the current week
    Watering {
        /// Show next week instead of this week
        #[arg(long)]
        next_week: bool,
        /// Group rows by plant type instead of section
        #[arg(long)]
        by_type: bool,
    },
    /// Print the pruning grid (plant type x month)
    Pruning {
        /// Calendar year (defaults to the current year)
        #[arg(long)]
        year: Option<i32>,
    },
    /// Record a watering for a plant
    Water {
        /// Plant catalog id
        plant_id: i64,
        /// Scheduled date (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        date: Option<String>,
        /// Undo a recorded watering instead
        #[arg(long)]
        undo: bool,
    },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Backend error: {0}")]
    Api(#[from] ApiError),
    #[error("Projection error: {0}")]
    Projection(#[from] ProjectionError),
    #[error("Failed to parse date: {0}")]
    DateParseError(String),
}

/// Handle the search command
pub fn handle_search(query: &str, api: &ApiClient) -> Result<(), CliError> {
    let results = api.search_plants(query)?;
    if results.is_empty() {
        println!("No plants matched '{}'", query);
        return Ok(());
    }

    for plant in results {
        let marker = if plant.in_user_garden { " [in garden]" } else { "" };
        let scientific = plant.scientific_name.first().cloned().unwrap_or_default();
        let type_str = plant.plant_type.as_deref().unwrap_or("-");
        println!(
            "{:>6}  {} ({})  {}{}",
            plant.id, plant.common_name, scientific, type_str, marker
        );
    }
    Ok(())
}

/// Handle the add-plant command
pub fn handle_add_plant(plant_id: i64, api: &ApiClient) -> Result<(), CliError> {
    let plant = api.add_plant(plant_id)?;
    println!("Added '{}' to your garden (ID: {})", plant.common_name, plant.id);
    Ok(())
}

/// Handle the remove-plant command
pub fn handle_remove_plant(plant_id: i64, api: &ApiClient) -> Result<(), CliError> {
    api.remove_plant(plant_id)?;
    println!("Removed plant {} from your garden", plant_id);
    Ok(())
}

/// Handle the assign command
pub fn handle_assign(
    plant_id: i64,
    section: Option<&str>,
    api: &ApiClient,
) -> Result<(), CliError> {
    api.assign_section(plant_id, section)?;
    match section {
        Some(s) => println!("Moved plant {} to section {}", plant_id, s),
        None => println!("Unassigned plant {}", plant_id),
    }
    Ok(())
}

/// Handle the sections command
pub fn handle_sections(api: &ApiClient) -> Result<(), CliError> {
    let sections = api.sections()?;
    if sections.is_empty() {
        println!("No sections defined yet");
        return Ok(());
    }
    for section in sections {
        println!("{:>3}  {}", section.section_id, section.display_name());
    }
    Ok(())
}

/// Handle the watering command: fetch, project and print the weekly grid
pub fn handle_watering(next_week: bool, by_type: bool, api: &ApiClient) -> Result<(), CliError> {
    let fetch = api.watering_schedule()?;
    let start = if next_week {
        today() + Duration::days(7)
    } else {
        today()
    };

    let grid = if by_type {
        let types = plant_type_index(api)?;
        schedule::build_grid(&fetch.entries, start, 7, |e| type_label(&types, e))?
    } else {
        schedule::build_grid(&fetch.entries, start, 7, |e| e.section_label())?
    };

    let week = if next_week { "next week" } else { "this week" };
    println!("Watering schedule, {}:", week);
    print_grid(&grid);
    if fetch.skipped > 0 {
        println!("Note: {} malformed records were skipped", fetch.skipped);
    }
    Ok(())
}

/// Handle the pruning command: 12-month plant-type grid
pub fn handle_pruning(year: Option<i32>, api: &ApiClient) -> Result<(), CliError> {
    let year = year.unwrap_or_else(|| today().year());
    let fetch = api.pruning_schedule(year)?;
    let types = plant_type_index(api)?;

    let start = NaiveDate::from_ymd_opt(year, 1, 1)
        .ok_or_else(|| CliError::DateParseError(format!("invalid year {}", year)))?;
    let grid = schedule::project(
        Window::months(start, 12),
        &fetch.entries,
        |e| type_label(&types, e),
        None,
    )?;

    println!("Pruning schedule for {}:", year);
    print_grid(&grid);
    if fetch.skipped > 0 {
        println!("Note: {} malformed records were skipped", fetch.skipped);
    }
    Ok(())
}

/// Handle the water command
pub fn handle_water(
    plant_id: i64,
    date: Option<&str>,
    undo: bool,
    api: &ApiClient,
) -> Result<(), CliError> {
    let date = match date {
        Some(date_str) => parse_date(date_str).map_err(|e| {
            CliError::DateParseError(format!("Invalid date format '{}': {}", date_str, e))
        })?,
        None => today(),
    };

    api.mark_watered(plant_id, date, !undo)?;
    if undo {
        println!("Cleared watering record for plant {} on {}", plant_id, date);
    } else {
        println!("Recorded watering for plant {} on {}", plant_id, date);
    }
    Ok(())
}

/// plant_id → type label map for type-grouped grids
fn plant_type_index(api: &ApiClient) -> Result<HashMap<i64, String>, CliError> {
    Ok(api
        .garden_plants()?
        .into_iter()
        .map(|p| (p.id, p.type_label()))
        .collect())
}

fn type_label(types: &HashMap<i64, String>, entry: &ScheduleEntry) -> String {
    types
        .get(&entry.plant_id)
        .cloned()
        .unwrap_or_else(|| "Other".to_string())
}

/// Print a projected grid as a plain text table
fn print_grid(grid: &Grid) {
    if grid.is_empty() {
        println!("  (no scheduled entries in this window)");
        return;
    }

    let col_width = match grid.granularity() {
        Granularity::Day => 8,
        Granularity::Month => 5,
    };
    let label_width = grid
        .rows()
        .iter()
        .map(|r| r.chars().count())
        .max()
        .unwrap_or(0)
        .max(5);

    // Header
    print!("{:<width$}", "", width = label_width + 2);
    for column in grid.columns() {
        let header = match grid.granularity() {
            Granularity::Day => column.format("%a %d").to_string(),
            Granularity::Month => column.format("%b").to_string(),
        };
        print!("{:>width$}", header, width = col_width);
    }
    println!("{:>8}", "Total");

    // Rows
    for (row_idx, label) in grid.rows().iter().enumerate() {
        print!("{:<width$}", label, width = label_width + 2);
        for col_idx in 0..grid.columns().len() {
            let count = grid.count_at(row_idx, col_idx);
            if count == 0 {
                print!("{:>width$}", "·", width = col_width);
            } else {
                print!("{:>width$}", count, width = col_width);
            }
        }
        println!("{:>8}", grid.row_totals()[row_idx]);
    }

    // Column totals
    print!("{:<width$}", "Total", width = label_width + 2);
    for total in grid.column_totals() {
        print!("{:>width$}", total, width = col_width);
    }
    println!("{:>8}", grid.total());
}
