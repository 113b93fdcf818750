use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[clap(author, version)]
#[clap(name = "hexit-train")]
#[clap(about = "Trains the Hex policy/value network from self-play game records", long_about = None)]
pub struct Cli {
    #[clap(short, long, default_value_t = String::from("trainer.conf"))]
    pub config: String,

    #[clap(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Trains over every record in the games directory. This is the default.
    Train(TrainCommand),
    /// Takes a single optimization step over one record.
    TrainOne(TrainOneCommand),
}

#[derive(Args)]
pub struct TrainCommand {
    /// Overrides `games_dir` from the config.
    #[clap(short, long)]
    pub games_dir: Option<String>,
}

#[derive(Args)]
pub struct TrainOneCommand {
    /// Overrides `record` from the config.
    #[clap(short, long)]
    pub record: Option<String>,
}
