mod cli;

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use cli::{Cli, Commands, TrainCommand};
use common::{create_rng, ConfigLoader, FsExt};
use dotenv::dotenv;
use env_logger::Env;
use log::info;
use model::ModelOptions;
use replay_buffer::{assemble_corpus, assemble_single};
use std::path::{Path, PathBuf};
use trainer::{save_checkpoint, sgd_training_context, TrainBackend, TrainOptions, Trainer};
use training_game::RecordReader;

const DEFAULT_GAMES_DIR: &str = "training_games";
const DEFAULT_RECORD: &str = "training_games/0";

fn main() -> Result<()> {
    dotenv().ok();
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config_path = cli.config.relative_to_cwd()?;
    let config = ConfigLoader::load_or_default(config_path, "train".to_string())?;

    let model_options: ModelOptions = config.load()?;
    let train_options: TrainOptions = config.load()?;

    info!("{:?}", model_options);
    info!("{:?}", train_options);

    let mut rng = create_rng(train_options.seed);
    let context =
        sgd_training_context::<TrainBackend>(&model_options, &train_options, &Default::default())?;
    let mut trainer = Trainer::new(context);

    match cli.command.unwrap_or(Commands::Train(TrainCommand { games_dir: None })) {
        Commands::Train(train_args) => {
            let games_dir = resolve_path(
                &config,
                train_args.games_dir,
                "games_dir",
                DEFAULT_GAMES_DIR,
            )?;

            assert_dir_exists(&games_dir)?;

            let dataset = assemble_corpus(&RecordReader::new(games_dir), &mut rng)?;
            let reports = trainer.run(dataset, &train_options, &mut rng)?;

            if let Some(last) = reports.last() {
                info!("Final training loss: {:?}", last.train);
            }
        }
        Commands::TrainOne(train_one_args) => {
            let record = resolve_path(&config, train_one_args.record, "record", DEFAULT_RECORD)?;

            let batch = assemble_single(&record, &mut rng)?;
            let losses = trainer.step(&batch)?;

            info!(
                "loss: {:.4} - policy_loss: {:.4} - value_loss: {:.4} - l2: {:.6}",
                losses.total, losses.policy, losses.value, losses.l2
            );
        }
    }

    if let Some(model_dir) = config.get_path("model_dir") {
        let model_dir = model_dir.relative_to_cwd()?;
        save_checkpoint(trainer.context(), &model_dir)
            .with_context(|| format!("Failed to save model to {:?}", model_dir))?;
    }

    Ok(())
}

fn resolve_path(
    config: &ConfigLoader,
    arg: Option<String>,
    key: &str,
    default: &str,
) -> Result<PathBuf> {
    arg.map(PathBuf::from)
        .or_else(|| config.get_path(key))
        .unwrap_or_else(|| PathBuf::from(default))
        .relative_to_cwd()
}

fn assert_dir_exists<P: AsRef<Path>>(dir: P) -> Result<()> {
    if dir.as_ref().is_dir() {
        Ok(())
    } else {
        Err(anyhow!("{:?} is not a valid directory", dir.as_ref()))
    }
}
