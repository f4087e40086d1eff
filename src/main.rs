//! ReviewBadge CLI entry point.
//!
//! Configures the badge settings and annotates saved GitHub pages offline.

use std::io::Read;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use reviewbadge::app::App;
use reviewbadge::services::settings_engine::SettingsEngineTrait;
use reviewbadge::types::command::ConfigCommand;
use reviewbadge::types::settings::{DisplayMode, Scope};

#[derive(Parser, Debug)]
#[command(name = "reviewbadge")]
#[command(version)]
#[command(about = "Shows your own review status next to GitHub pull request links", long_about = None)]
struct Args {
    /// Settings file to use instead of the platform config directory
    #[arg(long, global = true)]
    config: Option<String>,

    /// GitHub API root (for GitHub Enterprise)
    #[arg(long, global = true)]
    api_base: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Store the GitHub personal access token
    SetToken { token: String },

    /// Store your GitHub login (case does not matter)
    SetUsername { username: String },

    /// Badge display: icon, icon-text or icon-text-color
    Display { mode: DisplayMode },

    /// Where badges appear: review-requested, all-notifications or everywhere
    Scope { scope: Scope },

    /// Print the current settings
    Show,

    /// Annotate a saved page and print the resulting HTML
    Annotate {
        /// Address the page was loaded from
        #[arg(long)]
        url: String,

        /// HTML file; reads stdin when omitted
        file: Option<PathBuf>,
    },
}

fn read_page(file: Option<PathBuf>) -> std::io::Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path),
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut app = App::new(args.config, args.api_base)?;

    let command = match args.command {
        Commands::SetToken { token } => ConfigCommand::SetToken(token),
        Commands::SetUsername { username } => ConfigCommand::SetUsername(username),
        Commands::Display { mode } => ConfigCommand::SetDisplayMode(mode),
        Commands::Scope { scope } => ConfigCommand::SetScope(scope),
        Commands::Show => {
            let settings = app.settings();
            println!("config:   {}", app.settings_engine.get_config_path());
            println!("token:    {}", if settings.token.is_empty() { "(not set)" } else { "(set)" });
            println!(
                "username: {}",
                if settings.username.is_empty() { "(not set)" } else { settings.username.as_str() }
            );
            println!("display:  {}", settings.display_mode);
            println!("scope:    {}", settings.scope);
            return Ok(());
        }
        Commands::Annotate { url, file } => {
            let page = read_page(file)?;
            if !app.open_page(&url, &page)? {
                log::info!("no badges for {}: out of scope or not configured", url);
            }
            app.settle().await;
            print!("{}", app.snapshot()?);
            return Ok(());
        }
    };

    let outcome = app.execute(command.clone())?;
    if outcome.changed {
        println!("Saved {}. Reload open GitHub pages to apply.", command.name());
    } else {
        println!("Nothing to save: value was empty.");
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match run(Args::parse()).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
