use clap::Args;
use shogidojo_core::CompletionOptions;

#[derive(Args)]
pub struct CompleteArgs {
    /// User id
    #[arg(short, long, default_value = "local")]
    pub user: String,

    /// Free content: advance the streak without spending hearts
    #[arg(long)]
    pub free: bool,

    /// Hearts to spend (ignored with --free)
    #[arg(long, default_value_t = 1)]
    pub hearts: u32,
}

pub fn run(args: CompleteArgs) -> Result<(), Box<dyn std::error::Error>> {
    let (db, coordinator) = super::open()?;

    let options = if args.free {
        CompletionOptions::free()
    } else {
        CompletionOptions::consuming(args.hearts)
    };

    let result = coordinator.record_completion(&db, &args.user, options)?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
