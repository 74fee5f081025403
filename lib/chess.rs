mod action;
mod bitboard;
mod board;
mod clock;
mod color;
mod defense;
mod effective;
mod error;
mod file;
mod game;
mod history;
mod r#move;
mod movegen;
mod outcome;
mod piece;
mod position;
mod rank;
mod request;
mod role;
mod rules;
mod session;
mod square;
mod terrain;

pub use action::*;
pub use bitboard::*;
pub use board::*;
pub use clock::*;
pub use color::*;
pub use defense::*;
pub use effective::*;
pub use error::*;
pub use file::*;
pub use game::*;
pub use history::*;
pub use movegen::*;
pub use outcome::*;
pub use piece::*;
pub use position::*;
pub use r#move::*;
pub use rank::*;
pub use request::*;
pub use role::*;
pub use rules::*;
pub use session::*;
pub use square::*;
pub use terrain::*;
