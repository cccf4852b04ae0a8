//! # Othello Zero
//!
//! AlphaZero-style self-play reinforcement learning for Othello.
//!
//! ## Features
//!
//! - **Game Engine**: Othello rules behind a capability trait, so other
//!   board games can slot into the same pipeline
//! - **Search Engine**: PUCT-guided Monte Carlo Tree Search with Dirichlet
//!   root noise, temperature-based move sampling and tree reuse
//! - **Training System**: self-play → train → evaluate → promote loop with
//!   a regression-safe promotion gate
//! - **Neural Networks**: policy/value residual CNNs (tch-rs) persisted as
//!   safetensors checkpoints
//!
//! ## Usage
//!
//! ```no_run
//! use othello_zero::config::Config;
//! use othello_zero::training::session::TrainingSession;
//! use rand::rngs::StdRng;
//! use rand::SeedableRng;
//!
//! # fn main() -> othello_zero::Result<()> {
//! let config = Config::default();
//! let mut rng = StdRng::seed_from_u64(config.seed);
//! let mut session = TrainingSession::new(&config)?;
//! session.run(&mut rng)?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// PUBLIC API MODULES
// ============================================================================

/// Training configuration
pub mod config;

/// Game rules behind the capability interface
pub mod game;

/// Monte Carlo Tree Search engine
pub mod mcts;

/// Policy/value networks, checkpoints and the trainer
pub mod neural;

/// Interactive play modes (human vs AI, AI arena)
pub mod play;

/// Self-play, augmentation, evaluation and the training loop
pub mod training;

/// Logging setup
pub mod logging;

// ============================================================================
// ERROR TYPES
// ============================================================================

/// Main error type for the Othello Zero library
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Externally supplied move input could not be parsed
    #[error("invalid move input: {0}")]
    Format(String),

    /// A move was rejected by the game rules (occupied square, no flips)
    #[error("illegal move: {0}")]
    InvalidMove(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("model error: {0}")]
    Model(String),

    #[error("training error: {0}")]
    Training(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("torch error: {0}")]
    Torch(#[from] tch::TchError),
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Error>;

// ============================================================================
// LIBRARY VERSION INFO
// ============================================================================

/// Library version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
