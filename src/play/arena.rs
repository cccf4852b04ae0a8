//! AI vs AI: pit a challenger checkpoint against the current best.

use rand::Rng;

use crate::config::Config;
use crate::game::OthelloGame;
use crate::neural::NetworkManager;
use crate::training::evaluator::Evaluator;
use crate::Result;

/// Play `num_games` between the challenger's `"best_model"` (as the `+1`
/// role) and the one in `config.model_dir`, logging the tally from the
/// challenger's perspective.
pub fn run<R: Rng>(
    config: &Config,
    challenger_dir: &str,
    num_games: usize,
    rng: &mut R,
) -> Result<()> {
    let mut best = NetworkManager::new(config)?;
    best.load_checkpoint("best_model")?;

    let challenger_config = Config {
        model_dir: challenger_dir.to_string(),
        ..config.clone()
    };
    let mut challenger = NetworkManager::new(&challenger_config)?;
    challenger.load_checkpoint("best_model")?;

    let match_config = Config {
        num_eval_games: num_games,
        ..config.clone()
    };
    let evaluator = Evaluator::new(&challenger, &best, &match_config);
    let stats = evaluator.run(&OthelloGame::new(), rng)?;

    log::info!(
        "🏟️ arena over {} games: challenger {} - {} best ({} draws)",
        stats.total(),
        stats.wins,
        stats.losses,
        stats.draws
    );
    println!(
        "challenger {} - {} best ({} draws, win rate {:.2})",
        stats.wins,
        stats.losses,
        stats.draws,
        stats.win_rate()
    );
    Ok(())
}
