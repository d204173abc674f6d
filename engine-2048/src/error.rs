use std::{error, fmt};

use grid_2048::GridError;

#[derive(Clone, Debug, PartialEq)]
pub enum GameError {
    Grid(GridError),
    InvalidConfig(String),
}

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Grid(err) => write!(f, "board invariant violated: {err}"),
            Self::InvalidConfig(reason) => write!(f, "invalid game configuration: {reason}"),
        }
    }
}

impl error::Error for GameError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Grid(err) => Some(err),
            Self::InvalidConfig(_) => None,
        }
    }
}

impl From<GridError> for GameError {
    fn from(err: GridError) -> Self {
        Self::Grid(err)
    }
}
