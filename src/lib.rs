mod cursor;
mod error;
mod stream;

pub mod scanner;

pub use cursor::{Cursor, ReadCursor, StrCursor};
pub use error::{Error, Result};
pub use stream::{tokenize_path, tokenize_str, tokens, Token, TokenStream};

pub(crate) mod internal_prelude {
    pub use super::{Error, Result};
}
