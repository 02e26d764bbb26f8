use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Expected opening {delimiter:?} at offset {offset}")]
    ExpectedDelimiter { delimiter: char, offset: usize },
    #[error("Unterminated string : expected closing {delimiter:?} at offset {offset}")]
    UnterminatedString { delimiter: char, offset: usize },
    #[error("Seek out of bounds : offset {offset} is outside {low}..={high}")]
    SeekOutOfBounds {
        offset: usize,
        low: usize,
        high: usize,
    },
    #[error("Invalid utf-8 at character offset {offset}")]
    InvalidUtf8 { offset: usize },
    #[error(transparent)]
    IOError(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
