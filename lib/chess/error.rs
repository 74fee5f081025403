use crate::chess::{ParseMoveRequestError, ParseSquareError, StackCompositionError};
use derive_more::{Display, Error, From};

/// The reason why a move or deploy was rejected.
///
/// Every rejection happens before anything changes, the game is left as it was.
#[derive(Debug, Display, Clone, Eq, PartialEq, Error, From)]
pub enum MoveError {
    #[display(fmt = "invalid square")]
    InvalidSquare(ParseSquareError),

    #[display(fmt = "invalid move notation")]
    #[from(ignore)]
    InvalidNotation,

    #[display(fmt = "no legal move matches the request")]
    #[from(ignore)]
    NoMatchingLegalMove,

    #[display(fmt = "more than one legal move matches the request")]
    #[from(ignore)]
    AmbiguousMove,

    #[display(fmt = "the move would leave the commander attacked or exposed")]
    #[from(ignore)]
    IllegalMove,

    #[display(fmt = "the deploy does not account for every piece of the stack exactly once")]
    #[from(ignore)]
    DeployAccounting,

    #[display(fmt = "the target square holds no enemy piece to capture")]
    #[from(ignore)]
    CaptureTargetInvalid,

    #[display(fmt = "invalid stack composition")]
    StackComposition(StackCompositionError),

    #[display(fmt = "no deploy is in progress")]
    #[from(ignore)]
    NoActiveDeploy,

    #[display(fmt = "another deploy is in progress")]
    #[from(ignore)]
    DeployInProgress,
}

impl From<ParseMoveRequestError> for MoveError {
    fn from(e: ParseMoveRequestError) -> Self {
        match e {
            ParseMoveRequestError::InvalidSquare(e) => MoveError::InvalidSquare(e),
            ParseMoveRequestError::InvalidSyntax => MoveError::InvalidNotation,
        }
    }
}
