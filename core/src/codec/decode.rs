//! Streaming set decoder
//!
//! Reads one trimmed line at a time and one character at a time within a
//! line. The outer object is scanned by hand; while inside `recipeList`,
//! every character of a nested recipe object is copied into a buffer that is
//! decoded with serde once its closing brace arrives.
//!
//! Known limitations:
//! - Strings may not span lines.
//! - A quote counts as escaped when the character before it is a backslash,
//!   so a value ending in an escaped backslash (`"a\\"`) is misread. The
//!   encoder refuses to write such values.
//! - `\u` escapes are rejected. An escaped backslash followed by `u`
//!   (`"a\\ui"`) is not an escape and reads normally.

use std::io::BufRead;

use fxrecipe_types::Recipe;

use super::{CodecError, RECIPE_LIST_KEY, SET_NAME_KEY};
use crate::set::RecipeSet;

/// Decode a set from text
pub fn decode_str(text: &str) -> Result<RecipeSet, CodecError> {
    let mut scanner = Scanner::new();
    for (i, line) in text.lines().enumerate() {
        scanner.feed_line(i + 1, line)?;
    }
    scanner.finish()
}

/// Decode a set from a buffered reader, line by line
pub fn decode_reader<R: BufRead>(reader: R) -> Result<RecipeSet, CodecError> {
    let mut scanner = Scanner::new();
    for (i, line) in reader.lines().enumerate() {
        scanner.feed_line(i + 1, &line?)?;
    }
    scanner.finish()
}

struct Scanner {
    /// -1 outside the set object, 0 directly inside it
    depth: i32,
    opened: bool,
    closed: bool,

    in_quote: bool,
    quote_start: usize,
    /// Previous character inside the string was an escaping backslash
    escape_pending: bool,

    /// Most recently closed string at depth 0
    last_scalar: Option<String>,
    /// Key awaiting its value at depth 0
    key: Option<String>,

    /// Open `[` at depth 0
    array_depth: u32,
    /// Inside the `recipeList` value
    collecting: bool,
    saw_list: bool,
    buffer: String,

    name: Option<String>,
    recipes: Vec<Recipe>,
    line: usize,
}

impl Scanner {
    fn new() -> Self {
        Self {
            depth: -1,
            opened: false,
            closed: false,
            in_quote: false,
            quote_start: 0,
            escape_pending: false,
            last_scalar: None,
            key: None,
            array_depth: 0,
            collecting: false,
            saw_list: false,
            buffer: String::new(),
            name: None,
            recipes: Vec::new(),
            line: 0,
        }
    }

    fn feed_line(&mut self, line_no: usize, raw: &str) -> Result<(), CodecError> {
        self.line = line_no;
        let line = raw.trim_start_matches('\u{feff}').trim();
        if line.is_empty() {
            return Ok(());
        }

        let mut prev: Option<char> = None;
        for (pos, c) in line.char_indices() {
            self.step(line, pos, c, prev)?;
            prev = Some(c);
        }

        if self.in_quote {
            return Err(CodecError::UnterminatedString { line: line_no });
        }
        if self.in_recipe() {
            self.buffer.push('\n');
        }
        Ok(())
    }

    fn in_recipe(&self) -> bool {
        self.collecting && self.depth > 0
    }

    fn step(
        &mut self,
        line: &str,
        pos: usize,
        c: char,
        prev: Option<char>,
    ) -> Result<(), CodecError> {
        if self.in_quote {
            if self.in_recipe() {
                self.buffer.push(c);
            }
            if self.escape_pending {
                self.escape_pending = false;
                if c == 'u' {
                    return Err(CodecError::UnsupportedEscape { line: self.line });
                }
            } else if c == '\\' {
                self.escape_pending = true;
            }
            if c == '"' && prev != Some('\\') {
                self.in_quote = false;
                if self.depth == 0 {
                    let raw = &line[self.quote_start..pos];
                    self.last_scalar = Some(unescape(raw, self.line)?);
                }
            }
            return Ok(());
        }

        if self.depth < 0 && c != '{' {
            if c.is_whitespace() {
                return Ok(());
            }
            return Err(if self.closed {
                CodecError::TrailingContent { line: self.line }
            } else {
                CodecError::UnexpectedCharacter { line: self.line, ch: c }
            });
        }

        match c {
            '"' => {
                self.in_quote = true;
                self.escape_pending = false;
                self.quote_start = pos + c.len_utf8();
                if self.in_recipe() {
                    self.buffer.push(c);
                }
            }
            '{' => self.open_brace(c)?,
            '}' => self.close_brace(c)?,
            _ if self.depth > 0 => {
                if self.in_recipe() {
                    self.buffer.push(c);
                }
            }
            ':' => {
                let Some(key) = self.last_scalar.take() else {
                    return Err(CodecError::UnexpectedCharacter { line: self.line, ch: c });
                };
                if key == RECIPE_LIST_KEY {
                    self.collecting = true;
                }
                self.key = Some(key);
            }
            ',' => {
                if self.array_depth == 0 {
                    self.finalize_field();
                }
            }
            '[' => {
                if self.collecting {
                    // Recipes sit directly in the list
                    if self.array_depth > 0 {
                        return Err(CodecError::UnexpectedCharacter { line: self.line, ch: c });
                    }
                    self.saw_list = true;
                }
                self.array_depth += 1;
            }
            ']' => {
                if self.array_depth == 0 {
                    return Err(CodecError::UnexpectedCharacter { line: self.line, ch: c });
                }
                self.array_depth -= 1;
                if self.array_depth == 0 {
                    self.collecting = false;
                }
            }
            // Bare scalars (numbers, true/false/null) of keys we don't read
            _ => {}
        }
        Ok(())
    }

    fn open_brace(&mut self, c: char) -> Result<(), CodecError> {
        if self.closed {
            return Err(CodecError::TrailingContent { line: self.line });
        }
        self.depth += 1;
        if self.depth == 0 {
            self.opened = true;
            return Ok(());
        }
        if self.depth == 1 && self.collecting && self.array_depth == 0 {
            return Err(CodecError::UnexpectedCharacter { line: self.line, ch: c });
        }
        if self.in_recipe() {
            self.buffer.push(c);
        }
        Ok(())
    }

    fn close_brace(&mut self, c: char) -> Result<(), CodecError> {
        if self.in_recipe() {
            self.buffer.push(c);
        }
        self.depth -= 1;

        if self.depth == 0 && self.collecting {
            self.finish_recipe()?;
        } else if self.depth == -1 {
            self.finalize_field();
            self.closed = true;
        } else if self.depth < -1 {
            return Err(CodecError::UnbalancedBraces { line: self.line });
        }
        Ok(())
    }

    fn finish_recipe(&mut self) -> Result<(), CodecError> {
        let index = self.recipes.len();
        let recipe = serde_json::from_str::<Recipe>(&self.buffer)
            .map_err(|source| CodecError::Recipe { index, source })?;
        self.recipes.push(recipe);
        self.buffer.clear();
        Ok(())
    }

    /// A key/value pair at depth 0 is complete
    fn finalize_field(&mut self) {
        let value = self.last_scalar.take();
        match self.key.take().as_deref() {
            Some(SET_NAME_KEY) => {
                if value.is_some() {
                    self.name = value;
                }
            }
            // `recipeList` followed by something other than an array
            Some(RECIPE_LIST_KEY) => self.collecting = false,
            _ => {}
        }
    }

    fn finish(self) -> Result<RecipeSet, CodecError> {
        if !self.opened {
            return Err(CodecError::MissingOuterObject);
        }
        if !self.closed {
            return Err(CodecError::UnexpectedEof);
        }
        let name = self.name.ok_or(CodecError::MissingField(SET_NAME_KEY))?;
        if !self.saw_list {
            return Err(CodecError::MissingField(RECIPE_LIST_KEY));
        }
        Ok(RecipeSet::from_decoded(name, self.recipes))
    }
}

/// Resolve the simple escapes (`\"`, `\\`, `\n`, ...) of a captured string
fn unescape(raw: &str, line: usize) -> Result<String, CodecError> {
    if !raw.contains('\\') {
        return Ok(raw.to_string());
    }
    serde_json::from_str::<String>(&format!("\"{raw}\""))
        .map_err(|_| CodecError::InvalidString { line })
}
