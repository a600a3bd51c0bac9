//! Football Prediction CLI
//!
//! Match and season predictions from stored league statistics, using trained
//! model artifacts when present and a statistical fallback when not.

use clap::{Parser, Subcommand};
use footy::{Config, Result};

#[derive(Parser)]
#[command(name = "footy")]
#[command(about = "Football match and season prediction", long_about = None)]
struct Cli {
    /// Config file path
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Data management commands
    Data {
        #[command(subcommand)]
        action: DataCommands,
    },
    /// Show stored statistics for a team
    Stats {
        /// Team name (fuzzy matched against stored names)
        team: String,
    },
    /// Predict a single match outcome
    Predict {
        /// Home team name
        home: String,
        /// Away team name
        away: String,
        /// Output format
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
    /// Project the final season table
    Season {
        /// Output format
        #[arg(long, default_value = "table")]
        format: OutputFormat,
    },
    /// Model management commands
    Model {
        #[command(subcommand)]
        action: ModelCommands,
    },
    /// Initialize a new project with default config
    Init,
}

#[derive(Subcommand)]
enum DataCommands {
    /// Load the built-in offline fixtures into the store
    Seed {
        /// Matches played so far by each team
        #[arg(long, default_value = "19")]
        matches_played: u32,
    },
    /// Show database status
    Status,
}

#[derive(Subcommand)]
enum ModelCommands {
    /// Show which model artifacts are loaded
    Info,
}

#[derive(Clone, Debug)]
enum OutputFormat {
    Table,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}. Use table or json.", s)),
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    // Load or create config
    let config = if std::path::Path::new(&cli.config).exists() {
        match Config::load(&cli.config) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error loading config: {}", e);
                std::process::exit(1);
            }
        }
    } else {
        Config::default()
    };

    // Run command
    let result = match cli.command {
        Commands::Data { action } => match action {
            DataCommands::Seed { matches_played } => commands::data_seed(&config, matches_played),
            DataCommands::Status => commands::data_status(&config),
        },
        Commands::Stats { team } => commands::stats(&config, &team),
        Commands::Predict { home, away, format } => {
            commands::predict(&config, &home, &away, format)
        }
        Commands::Season { format } => commands::season(&config, format),
        Commands::Model { action } => match action {
            ModelCommands::Info => commands::model_info(&config),
        },
        Commands::Init => commands::init(&cli.config),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

mod commands {
    use super::*;
    use footy::data::{sync_store, FixtureProvider, StatsStore};
    use footy::form_to_string;
    use footy::model::ModelBundle;
    use footy::predict::matches::format_prediction;
    use footy::predict::{MatchPredictor, SeasonPredictor};

    pub fn init(config_path: &str) -> Result<()> {
        let config = Config::default();
        config.save(config_path)?;
        println!("Created default config at {}", config_path);

        std::fs::create_dir_all("data")?;
        std::fs::create_dir_all("model")?;
        println!("Created data/ and model/ directories");

        println!("\nNext steps:");
        println!("  1. Edit {} to customize settings", config_path);
        println!("  2. Run 'footy data seed' to load fixture data");
        println!("  3. Run 'footy predict \"Team A\" \"Team B\"' to make predictions");
        println!("  4. Run 'footy season' to project the final table");

        Ok(())
    }

    pub fn data_seed(config: &Config, matches_played: u32) -> Result<()> {
        let store = StatsStore::open(&config.data.database_path)?;
        let provider = FixtureProvider::with_matches_played(matches_played);

        println!("Seeding store from offline fixtures...");
        let written = sync_store(&store, &provider)?;
        println!("Stored statistics for {} teams", written);

        Ok(())
    }

    pub fn data_status(config: &Config) -> Result<()> {
        let store = StatsStore::open(&config.data.database_path)?;
        let summary = store.summary()?;

        println!("Database Status");
        println!("───────────────────────────────");
        println!("  Path:     {}", config.data.database_path);
        println!("  Teams:    {}", summary.team_count);
        println!("  Stats:    {}", summary.stats_count);
        println!("  Matches:  {}", summary.match_count);

        Ok(())
    }

    pub fn stats(config: &Config, team: &str) -> Result<()> {
        let store = StatsStore::open(&config.data.database_path)?;

        match store.resolve_team_stats(team)? {
            Some(stats) => {
                println!("{}", stats.team_name);
                println!("───────────────────────────────");
                println!("  Played:    {}", stats.matches_played);
                println!(
                    "  Record:    {}W {}D {}L",
                    stats.wins, stats.draws, stats.losses
                );
                println!(
                    "  Goals:     {} for, {} against ({:+})",
                    stats.goals_for, stats.goals_against, stats.goal_diff
                );
                println!("  Points:    {}", stats.points);
                if let Some(position) = stats.league_position {
                    println!("  Position:  {}", position);
                }
                if !stats.form.is_empty() {
                    println!("  Form:      {}", form_to_string(&stats.form));
                }
            }
            None => {
                println!("No statistics found for '{}'", team);
                println!("Run 'footy data seed' or check the team name.");
            }
        }

        Ok(())
    }

    pub fn predict(
        config: &Config,
        home: &str,
        away: &str,
        format: OutputFormat,
    ) -> Result<()> {
        let store = StatsStore::open(&config.data.database_path)?;
        let models = ModelBundle::load(&config.data.model_dir);
        let predictor = MatchPredictor::new(&store, models, config.prediction.clone());

        let prediction = predictor.predict(home, away)?;

        match format {
            OutputFormat::Table => {
                print!("{}", format_prediction(&prediction));
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&prediction)?);
            }
        }

        Ok(())
    }

    pub fn season(config: &Config, format: OutputFormat) -> Result<()> {
        let store = StatsStore::open(&config.data.database_path)?;
        let teams = store.teams()?;

        if teams.is_empty() {
            println!("No teams in store. Run 'footy data seed' first.");
            return Ok(());
        }

        let predictor = SeasonPredictor::new(&store, config.prediction.clone());
        let prediction = predictor.predict(&teams)?;

        match format {
            OutputFormat::Table => {
                println!("Projected Table — {}", prediction.season);
                println!("{:>4}  {:<32} {:>8} {:>8}", "Pos", "Team", "Pts", "Proj");
                println!("{}", "-".repeat(56));
                for row in &prediction.standings {
                    println!(
                        "{:>4}  {:<32} {:>8} {:>8.1}",
                        row.predicted_position, row.team, row.current_points, row.predicted_points
                    );
                }
                if let Some(champion) = &prediction.predicted_champion {
                    println!("\nChampion:  {}", champion);
                }
                if !prediction.predicted_relegated.is_empty() {
                    println!("Relegated: {}", prediction.predicted_relegated.join(", "));
                }
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&prediction)?);
            }
        }

        Ok(())
    }

    pub fn model_info(config: &Config) -> Result<()> {
        let models = ModelBundle::load(&config.data.model_dir);

        println!("Model Information");
        println!("───────────────────────────────");
        println!("  Directory:   {}", config.data.model_dir);
        println!(
            "  Classifier:  {}",
            if models.has_classifier() { "loaded" } else { "absent (heuristic path)" }
        );
        println!(
            "  Regressor:   {}",
            if models.has_regressor() { "loaded" } else { "absent" }
        );

        Ok(())
    }
}
