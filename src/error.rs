use std::fmt;
use std::io;

/// Failures that can stop the game from starting or from driving the terminal.
#[derive(Debug)]
pub enum GameError {
    /// The play field has a non-finite or non-positive extent.
    InvalidBounds { width: f64, height: f64 },
    /// Terminal or device I/O failed.
    Io(io::Error),
}

pub type GameResult<T> = Result<T, GameError>;

impl fmt::Display for GameError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameError::InvalidBounds { width, height } => {
                write!(f, "invalid play field size: {}x{}", width, height)
            }
            GameError::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for GameError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GameError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for GameError {
    fn from(err: io::Error) -> Self {
        GameError::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_bad_size() {
        let err = GameError::InvalidBounds { width: 0.0, height: 480.0 };
        assert_eq!(err.to_string(), "invalid play field size: 0x480");
    }

    #[test]
    fn io_errors_keep_their_source() {
        let err: GameError = io::Error::new(io::ErrorKind::Other, "tty gone").into();
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("tty gone"));
    }
}
