/// Domain types and the rules engine.
pub mod chess;
/// Assorted utilities.
pub mod util;
