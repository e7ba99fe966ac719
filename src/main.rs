use clap::Parser;
use color_eyre::Result;
use sprig::{
    cli::{Cli, Commands},
    ApiClient, Config, Profile,
};

fn main() -> Result<()> {
    // Set up error reporting with color-eyre
    color_eyre::install()?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Determine profile: --dev flag enables dev mode, otherwise use prod
    let profile = if cli.dev { Profile::Dev } else { Profile::Prod };

    // Logs go to a file; stdout belongs to the TUI
    sprig::logging::init(profile);

    // Load configuration with the determined profile
    let config = Config::load_with_profile(profile)?;

    // The backend owns all persistent state; everything goes through the API client
    let api = ApiClient::new(
        &config.backend_url,
        config.user_id,
        config.request_timeout_secs,
    )?;

    // Dispatch to appropriate command handler
    match cli.command.unwrap_or(Commands::Tui) {
        Commands::Tui => {
            let app = sprig::tui::App::new(config, api)?;
            sprig::tui::run_event_loop(app)?;
        }
        Commands::Search { query } => {
            sprig::cli::handle_search(&query, &api)?;
        }
        Commands::AddPlant { plant_id } => {
            sprig::cli::handle_add_plant(plant_id, &api)?;
        }
        Commands::RemovePlant { plant_id } => {
            sprig::cli::handle_remove_plant(plant_id, &api)?;
        }
        Commands::Assign { plant_id, section } => {
            sprig::cli::handle_assign(plant_id, section.as_deref(), &api)?;
        }
        Commands::Sections => {
            sprig::cli::handle_sections(&api)?;
        }
        Commands::Watering { next_week, by_type } => {
            sprig::cli::handle_watering(next_week, by_type, &api)?;
        }
        Commands::Pruning { year } => {
            sprig::cli::handle_pruning(year, &api)?;
        }
        Commands::Water {
            plant_id,
            date,
            undo,
        } => {
            sprig::cli::handle_water(plant_id, date.as_deref(), undo, &api)?;
        }
    }

    Ok(())
}
