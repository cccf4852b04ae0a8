use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;

use othello_zero::config::Config;
use othello_zero::training::TrainingSession;
use othello_zero::{logging, play};

#[derive(Parser)]
#[command(author, version, about = "AlphaZero-style self-play training for Othello")]
struct Cli {
    /// JSON configuration file; missing fields keep their defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the self-play training loop
    Train {
        /// Override the number of training iterations
        #[arg(long)]
        iterations: Option<usize>,
        /// Override the number of self-play games per iteration
        #[arg(long)]
        games: Option<usize>,
        /// Override the number of MCTS simulations per move
        #[arg(long)]
        sims: Option<usize>,
        /// Override the RNG seed
        #[arg(long)]
        seed: Option<u64>,
        /// Override the checkpoint directory
        #[arg(long)]
        model_dir: Option<String>,
    },
    /// Play against the best trained model on the terminal
    Play,
    /// Pit a challenger checkpoint directory against the current best
    Arena {
        /// Model directory holding the challenger's best_model checkpoint
        challenger_dir: String,
        /// Number of games to play
        #[arg(long, default_value_t = 10)]
        games: usize,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> othello_zero::Result<()> {
    let cli = Cli::parse();
    logging::setup_logging()?;

    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    match cli.command {
        Command::Train {
            iterations,
            games,
            sims,
            seed,
            model_dir,
        } => {
            if let Some(iterations) = iterations {
                config.num_iterations = iterations;
            }
            if let Some(games) = games {
                config.num_games = games;
            }
            if let Some(sims) = sims {
                config.num_mcts_sims = sims;
            }
            if let Some(seed) = seed {
                config.seed = seed;
            }
            if let Some(model_dir) = model_dir {
                config.model_dir = model_dir;
            }
            log::info!(
                "🚀 {} v{} training: {} iterations, {} games, {} sims",
                othello_zero::NAME,
                othello_zero::VERSION,
                config.num_iterations,
                config.num_games,
                config.num_mcts_sims
            );
            let mut rng = StdRng::seed_from_u64(config.seed);
            TrainingSession::new(&config)?.run(&mut rng)
        }
        Command::Play => {
            let mut rng = StdRng::seed_from_u64(config.seed);
            play::human::run(&config, &mut rng)
        }
        Command::Arena {
            challenger_dir,
            games,
        } => {
            let mut rng = StdRng::seed_from_u64(config.seed);
            play::arena::run(&config, &challenger_dir, games, &mut rng)
        }
    }
}
