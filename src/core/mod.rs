//! Core value types and contracts: cards, players, RNG, errors, and the
//! `GameState` trait the search engine is generic over.

pub mod card;
pub mod error;
pub mod player;
pub mod rng;
pub mod state;

pub use card::{standard_deck, Card, Rank, Suit, DECK_SIZE};
pub use error::EngineError;
pub use player::{PlayerId, PlayerMap};
pub use rng::SearchRng;
pub use state::GameState;
