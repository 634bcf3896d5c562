use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "shogidojo-cli", version, about = "Shogidojo CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Heart balance inspection
    Hearts {
        #[command(subcommand)]
        action: commands::hearts::HeartsAction,
    },
    /// Daily streak inspection
    Streak {
        #[command(subcommand)]
        action: commands::streak::StreakAction,
    },
    /// Record a content completion
    Complete(commands::complete::CompleteArgs),
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn main() {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Hearts { action } => commands::hearts::run(action),
        Commands::Streak { action } => commands::streak::run(action),
        Commands::Complete(args) => commands::complete::run(args),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
