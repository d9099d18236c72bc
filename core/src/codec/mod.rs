//! Recipe set file codec
//!
//! Sets are written as a small JSON document:
//!
//! ```text
//! {"name":"combo","recipeList":[{"name":"spark","effectName":"fx_spark",...}]}
//! ```
//!
//! Encoding goes through serde. Decoding is a single-pass line scanner that
//! only understands the shape the encoder produces: it walks the outer object
//! itself and hands each recipe object in `recipeList` to serde as a unit.
//! Other JSON documents may be rejected even when they are valid JSON.

mod decode;
mod encode;

pub use decode::{decode_reader, decode_str};
pub use encode::{check_recipe, encode, encode_to_writer};

/// Key of the set name in the outer object
pub const SET_NAME_KEY: &str = "name";

/// Key of the recipe array in the outer object
pub const RECIPE_LIST_KEY: &str = "recipeList";

/// Errors produced while reading or writing a set document
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("line {line}: unterminated string")]
    UnterminatedString { line: usize },

    #[error("line {line}: unexpected character {ch:?}")]
    UnexpectedCharacter { line: usize, ch: char },

    #[error("line {line}: unbalanced braces")]
    UnbalancedBraces { line: usize },

    #[error("line {line}: \\u escapes are not supported")]
    UnsupportedEscape { line: usize },

    #[error("line {line}: invalid string literal")]
    InvalidString { line: usize },

    #[error("line {line}: content after the closing brace")]
    TrailingContent { line: usize },

    #[error("input ended inside the set object")]
    UnexpectedEof,

    #[error("no set object found")]
    MissingOuterObject,

    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    #[error("recipe #{index}: {source}")]
    Recipe {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("recipe {recipe:?}: numeric field is not finite")]
    NonFinite { recipe: String },

    #[error("{field} {value:?} would not decode (trailing backslash or control character)")]
    UnreadableText { field: &'static str, value: String },

    #[error("encode failed: {0}")]
    Encode(#[source] serde_json::Error),
}
