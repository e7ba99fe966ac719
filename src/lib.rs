pub mod api;
pub mod cli;
pub mod config;
pub mod logging;
pub mod models;
pub mod schedule;
pub mod tui;
pub mod utils;

pub use api::{ApiClient, ScheduleFetch};
pub use config::Config;
pub use models::{Plant, PlantSummary, ScheduleKind, Section};
pub use schedule::{apply_optimistic_update, build_grid, Grid, RefreshGate, ScheduleEntry, Window};
pub use utils::Profile;
