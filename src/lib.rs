//! Monte Carlo tree search for hidden-information trick-taking card games.
//!
//! The crate splits into three layers:
//!
//! - [`core`]: cards, players, the seeded [`core::SearchRng`], errors, and
//!   the [`core::GameState`] contract the search operates on.
//! - [`mcts`]: a domain-agnostic engine: arena tree, UCB1 selection with an
//!   exploitation-biased tree policy, pluggable rollouts, re-rooting.
//! - [`hearts`]: the trick-taking adapter: determinized round states,
//!   penalty-rule evaluation, and the `play`/`watch` environment boundary.
//!
//! Hidden information is handled by determinization: each expansion and
//! rollout from an observed position samples one plausible assignment of the
//! unseen cards to the opponents, so averaged rewards approximate play
//! against the true distribution of deals.
//!
//! ```
//! use hearts_mcts::core::{PlayerId, SearchRng};
//! use hearts_mcts::hearts::{DeterminizedRound, TrickEvaluator};
//! use hearts_mcts::mcts::{MctsEngine, SearchConfig, SearchTree};
//!
//! let config = SearchConfig::default().with_budget(50).with_seed(1);
//! let mut rng = SearchRng::new(1);
//!
//! let root = DeterminizedRound::deal(
//!     PlayerId::new(0),
//!     4,
//!     TrickEvaluator::default(),
//!     &config,
//!     &mut rng,
//! )?;
//! let mut tree = SearchTree::new(root);
//! let mut engine = MctsEngine::new(config.clone());
//!
//! let best = engine.search(&mut tree, config.budget)?;
//! assert!(tree.get(best).state.last_play().is_some());
//! # Ok::<(), hearts_mcts::core::EngineError>(())
//! ```

pub mod core;
pub mod hearts;
pub mod mcts;

pub use crate::core::{Card, EngineError, GameState, PlayerId, Rank, SearchRng, Suit};
pub use crate::hearts::{DeterminizedRound, MctsStrategy, RoundObservation, TrickEvaluator, WatchInfo};
pub use crate::mcts::{MctsEngine, SearchConfig, SearchTree};
