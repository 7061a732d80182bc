//! Scannerless parsing
//!
//! - `state`: the scanner ([`ParseState`]) with trivia skipping and
//!   furthest-failure tracking
//! - `combinators`: the generic parser-combinator engine
//! - `grammar`: the language grammar built from the engine

mod combinators;
mod grammar;
mod state;

pub use combinators::*;
pub use grammar::*;
pub use state::*;
