use clap::Subcommand;

#[derive(Subcommand)]
pub enum StreakAction {
    /// Show a user's streak
    Show {
        /// User id
        #[arg(short, long, default_value = "local")]
        user: String,
    },
}

pub fn run(action: StreakAction) -> Result<(), Box<dyn std::error::Error>> {
    let (db, coordinator) = super::open()?;

    match action {
        StreakAction::Show { user } => {
            let view = coordinator.get_streak(&db, &user)?;
            println!("{}", serde_json::to_string_pretty(&view)?);
        }
    }
    Ok(())
}
