//! PUCT search engine.
//!
//! One engine instance drives the whole game: the caller keeps the root
//! between moves and reroots it after playing, so the subtree of the chosen
//! action carries over. Simulations clone the game state, walk down with
//! PUCT selection, expand one leaf with the predictor, and back the value up
//! on the recursion unwind, negating it at every ply transition.

use rand::{Rng, RngExt};
use rand_distr::{Distribution, Gamma};

use crate::config::Config;
use crate::game::Game;
use crate::mcts::node::SearchNode;
use crate::mcts::Predictor;
use crate::{Error, Result};

/// Temperatures at or below this are treated as deterministic argmax.
pub const DETERMINISTIC_TEMP: f64 = 1e-3;

/// Search knobs, split out of [`Config`] so evaluation and self-play can
/// differ in exploration noise.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub c_puct: f64,
    pub num_simulations: usize,
    pub dirichlet_alpha: f64,
    pub epsilon: f64,
    /// Mix Dirichlet noise into the root priors once per search call.
    pub add_root_noise: bool,
}

impl SearchConfig {
    pub fn from_config(config: &Config, add_root_noise: bool) -> Self {
        Self {
            c_puct: config.c_puct,
            num_simulations: config.num_mcts_sims,
            dirichlet_alpha: config.dirichlet_alpha,
            epsilon: config.epsilon,
            add_root_noise,
        }
    }
}

/// Result of one search call.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Normalized raw visit counts over the full action space. This is the
    /// training target, independent of the temperature used for `action`.
    pub policy: Vec<f32>,
    /// Move chosen under the requested temperature.
    pub action: usize,
}

/// The search engine, borrowing its predictor for the duration of a game.
pub struct Mcts<'a, P> {
    predictor: &'a P,
    config: SearchConfig,
}

impl<'a, P> Mcts<'a, P> {
    pub fn new(predictor: &'a P, config: SearchConfig) -> Self {
        Self { predictor, config }
    }

    /// Run the configured number of simulations from `state` and pick a
    /// move.
    ///
    /// Expanding the root (when it is fresh) costs one predictor call that
    /// is not counted as a simulation, so afterwards the root's child visit
    /// counts sum to exactly `num_simulations`.
    pub fn search<G, R>(
        &self,
        state: &G,
        root: &mut SearchNode,
        temperature: f64,
        rng: &mut R,
    ) -> Result<SearchOutcome>
    where
        G: Game,
        P: Predictor<G>,
        R: Rng,
    {
        if !root.is_expanded() {
            let (priors, _) = self.evaluate_leaf(state)?;
            root.expand(&priors);
        }
        if !root.is_expanded() {
            return Err(Error::Training(
                "search called on a terminal state".to_string(),
            ));
        }
        if self.config.add_root_noise {
            self.inject_root_noise(root, rng);
        }

        for _ in 0..self.config.num_simulations {
            let mut scratch = state.clone();
            self.simulate(root, &mut scratch)?;
        }

        let total = f64::from(root.total_visits());
        let mut policy = vec![0.0f32; state.action_size()];
        for (action, visits) in root.visit_counts() {
            policy[action] = (f64::from(visits) / total) as f32;
        }

        let visits: Vec<(usize, u32)> = root.visit_counts().collect();
        let action = choose_action(&visits, temperature, rng).ok_or_else(|| {
            Error::Training("no visited action to choose from".to_string())
        })?;
        log::trace!(
            "search done: {} visits, action {} (T={})",
            root.total_visits(),
            action,
            temperature
        );

        Ok(SearchOutcome { policy, action })
    }

    /// One simulation: descend by PUCT, expand the first unexpanded node,
    /// back the leaf value up. Returns the value from the perspective of the
    /// player to move in `state` on entry.
    fn simulate<G>(&self, node: &mut SearchNode, state: &mut G) -> Result<f64>
    where
        G: Game,
        P: Predictor<G>,
    {
        let (terminal, outcome) = state.check_game_over(state.current_player());
        if terminal {
            return Ok(f64::from(outcome));
        }
        if !node.is_expanded() {
            let (priors, value) = self.evaluate_leaf(state)?;
            node.expand(&priors);
            return Ok(value);
        }

        let action = node.select(self.config.c_puct).ok_or_else(|| {
            Error::Training("expanded node has no children".to_string())
        })?;
        state.apply_move(action)?;
        let child = node
            .child_mut(action)
            .ok_or_else(|| Error::Training(format!("selected unknown action {}", action)))?;
        let value = -self.simulate(child, state)?;
        child.visit_count += 1;
        child.value_sum += value;
        Ok(value)
    }

    /// Ask the predictor, mask the policy to the legal moves, renormalize.
    /// A fully masked-out policy falls back to uniform over legal moves.
    fn evaluate_leaf<G>(&self, state: &G) -> Result<(Vec<(usize, f32)>, f64)>
    where
        G: Game,
        P: Predictor<G>,
    {
        let (policy, value) = self.predictor.predict(state)?;
        let legal = state.legal_moves(state.current_player());
        if legal.is_empty() {
            return Ok((Vec::new(), f64::from(value)));
        }
        let mass: f32 = legal
            .iter()
            .map(|&action| policy.get(action).copied().unwrap_or(0.0))
            .sum();

        let priors: Vec<(usize, f32)> = if mass > 0.0 {
            legal
                .iter()
                .map(|&action| (action, policy.get(action).copied().unwrap_or(0.0) / mass))
                .collect()
        } else {
            log::warn!("predictor put no mass on legal moves, using uniform priors");
            let uniform = 1.0 / legal.len() as f32;
            legal.iter().map(|&action| (action, uniform)).collect()
        };
        Ok((priors, f64::from(value)))
    }

    /// Mix `(1 - eps) * prior + eps * Dir(alpha)` into the root priors.
    /// The Dirichlet draw is per-component Gamma(alpha, 1) normalized.
    fn inject_root_noise<R: Rng>(&self, root: &mut SearchNode, rng: &mut R) {
        let gamma = match Gamma::new(self.config.dirichlet_alpha, 1.0) {
            Ok(gamma) => gamma,
            Err(e) => {
                log::warn!("skipping root noise, bad alpha: {}", e);
                return;
            }
        };
        let draws: Vec<f64> = root
            .children_mut()
            .map(|_| gamma.sample(rng))
            .collect();
        let total: f64 = draws.iter().sum();
        if total <= 0.0 {
            return;
        }
        let eps = self.config.epsilon;
        for (child, draw) in root.children_mut().zip(draws) {
            child.prior = ((1.0 - eps) * f64::from(child.prior) + eps * draw / total) as f32;
        }
    }
}

/// Pick an action from `(action, visit_count)` pairs: argmax at
/// near-deterministic temperatures (ties to the lowest action), otherwise a
/// sample proportional to `visits^(1/T)`.
pub(crate) fn choose_action<R: Rng>(
    visits: &[(usize, u32)],
    temperature: f64,
    rng: &mut R,
) -> Option<usize> {
    if visits.is_empty() {
        return None;
    }
    if temperature <= DETERMINISTIC_TEMP {
        let mut best: Option<(usize, u32)> = None;
        for &(action, count) in visits {
            if best.is_none_or(|(_, best_count)| count > best_count) {
                best = Some((action, count));
            }
        }
        return best.map(|(action, _)| action);
    }

    let max_count = visits.iter().map(|&(_, count)| count).max().unwrap_or(0);
    if max_count == 0 {
        // No visits at all; fall back to the first action.
        return visits.first().map(|&(action, _)| action);
    }
    // Normalize by the max count before exponentiating: the ratios stay in
    // [0, 1], so a sharp temperature underflows to 0 instead of overflowing
    // to infinity.
    let weights: Vec<f64> = visits
        .iter()
        .map(|&(_, count)| (f64::from(count) / f64::from(max_count)).powf(1.0 / temperature))
        .collect();
    let total: f64 = weights.iter().sum();
    let mut threshold = rng.random::<f64>() * total;
    for (&(action, _), &weight) in visits.iter().zip(&weights) {
        threshold -= weight;
        if threshold <= 0.0 {
            return Some(action);
        }
    }
    visits.last().map(|&(action, _)| action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::OthelloGame;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Uniform policy, neutral value.
    struct FlatPredictor;

    impl Predictor<OthelloGame> for FlatPredictor {
        fn predict(&self, state: &OthelloGame) -> crate::Result<(Vec<f32>, f32)> {
            let n = state.action_size();
            Ok((vec![1.0 / n as f32; n], 0.0))
        }
    }

    fn test_config(num_simulations: usize, add_root_noise: bool) -> SearchConfig {
        SearchConfig {
            c_puct: 5.0,
            num_simulations,
            dirichlet_alpha: 0.5,
            epsilon: 0.25,
            add_root_noise,
        }
    }

    #[test]
    fn visits_sum_to_simulation_count() {
        let predictor = FlatPredictor;
        let mcts = Mcts::new(&predictor, test_config(48, false));
        let mut rng = StdRng::seed_from_u64(7);
        let game = OthelloGame::new();
        let mut root = SearchNode::new_root();

        let outcome = mcts.search(&game, &mut root, 1e-3, &mut rng).unwrap();

        assert_eq!(root.total_visits(), 48);
        let sum: f32 = outcome.policy.iter().sum();
        assert!((sum - 1.0).abs() < 1e-5);
        // Only the four legal opening moves may carry probability.
        for (action, &p) in outcome.policy.iter().enumerate() {
            if p > 0.0 {
                assert!([20, 29, 34, 43].contains(&action));
            }
        }
    }

    #[test]
    fn search_keeps_working_across_reroots() {
        let predictor = FlatPredictor;
        let mcts = Mcts::new(&predictor, test_config(16, false));
        let mut rng = StdRng::seed_from_u64(3);
        let mut game = OthelloGame::new();
        let mut root = SearchNode::new_root();

        for _ in 0..6 {
            let (over, _) = game.check_game_over(game.current_player());
            if over {
                break;
            }
            let outcome = mcts.search(&game, &mut root, 1e-3, &mut rng).unwrap();
            game.apply_move(outcome.action).unwrap();
            root = root.reroot(outcome.action);
        }
    }

    #[test]
    fn root_noise_perturbs_priors_only() {
        let predictor = FlatPredictor;
        let game = OthelloGame::new();
        let mut rng = StdRng::seed_from_u64(11);

        let mut quiet = SearchNode::new_root();
        let mcts = Mcts::new(&predictor, test_config(4, false));
        mcts.search(&game, &mut quiet, 1e-3, &mut rng).unwrap();

        let mut noisy = SearchNode::new_root();
        let mcts = Mcts::new(&predictor, test_config(4, true));
        mcts.search(&game, &mut noisy, 1e-3, &mut rng).unwrap();

        let quiet_actions: Vec<usize> = quiet.visit_counts().map(|(a, _)| a).collect();
        let noisy_actions: Vec<usize> = noisy.visit_counts().map(|(a, _)| a).collect();
        assert_eq!(quiet_actions, noisy_actions);

        let noisy_priors: Vec<f32> = noisy_actions
            .iter()
            .map(|&a| noisy.child(a).unwrap().prior)
            .collect();
        let quiet_priors: Vec<f32> = quiet_actions
            .iter()
            .map(|&a| quiet.child(a).unwrap().prior)
            .collect();
        assert_ne!(noisy_priors, quiet_priors);
        let sum: f32 = noisy_priors.iter().sum();
        assert!((sum - 1.0).abs() < 1e-4);
    }

    #[test]
    fn choose_action_argmax_breaks_ties_low() {
        let mut rng = StdRng::seed_from_u64(0);
        let visits = vec![(3, 10), (8, 25), (12, 25), (40, 5)];
        assert_eq!(choose_action(&visits, 1e-3, &mut rng), Some(8));
        assert_eq!(choose_action(&[], 1e-3, &mut rng), None);
    }

    #[test]
    fn choose_action_samples_proportionally_at_temperature_one() {
        let mut rng = StdRng::seed_from_u64(99);
        let visits = vec![(0, 10), (1, 30), (2, 60)];
        let mut counts = [0usize; 3];
        let trials = 20_000;
        for _ in 0..trials {
            let action = choose_action(&visits, 1.0, &mut rng).unwrap();
            counts[action] += 1;
        }
        for (i, &expected) in [0.1, 0.3, 0.6].iter().enumerate() {
            let observed = counts[i] as f64 / trials as f64;
            assert!(
                (observed - expected).abs() < 0.02,
                "action {}: observed {} vs expected {}",
                i,
                observed,
                expected
            );
        }
    }

    #[test]
    fn sharp_temperatures_stay_finite_with_large_visit_counts() {
        let mut rng = StdRng::seed_from_u64(13);
        // A temperature just above the argmax cutoff raises counts to the
        // 500th power; the weights must not blow up to infinity.
        let visits = vec![(0, 7), (1, 2_000_000), (2, 1_000_000)];
        for _ in 0..200 {
            let action = choose_action(&visits, 2e-3, &mut rng).unwrap();
            assert_eq!(action, 1);
        }
    }

    #[test]
    fn high_temperature_flattens_the_sample() {
        let mut rng = StdRng::seed_from_u64(5);
        let visits = vec![(0, 1), (1, 99)];
        let mut low = 0usize;
        for _ in 0..10_000 {
            if choose_action(&visits, 10.0, &mut rng) == Some(0) {
                low += 1;
            }
        }
        // visits^(1/10) gives action 0 a weight of about 1 / (1 + 99^0.1) ≈ 0.39.
        assert!(low > 3_000);
    }
}
