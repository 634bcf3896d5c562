use clap::Subcommand;

#[derive(Subcommand)]
pub enum HeartsAction {
    /// Show a user's heart state
    Show {
        /// User id
        #[arg(short, long, default_value = "local")]
        user: String,
    },
}

pub fn run(action: HeartsAction) -> Result<(), Box<dyn std::error::Error>> {
    let (db, coordinator) = super::open()?;

    match action {
        HeartsAction::Show { user } => {
            let state = coordinator.get_hearts(&db, &user)?;
            println!("{}", serde_json::to_string_pretty(&state)?);
        }
    }
    Ok(())
}
