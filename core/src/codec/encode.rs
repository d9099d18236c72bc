use std::io::Write;

use fxrecipe_types::Recipe;
use serde::Serialize;

use super::{CodecError, SET_NAME_KEY};
use crate::set::RecipeSet;

/// Outer document shape; field order matters to the decoder only in that
/// both keys must be present.
#[derive(Serialize)]
struct SetDocument<'a> {
    name: &'a str,
    #[serde(rename = "recipeList")]
    recipe_list: &'a [Recipe],
}

impl<'a> From<&'a RecipeSet> for SetDocument<'a> {
    fn from(set: &'a RecipeSet) -> Self {
        Self {
            name: set.name(),
            recipe_list: set.recipes(),
        }
    }
}

/// Reject a recipe whose encoded form would not decode again
pub fn check_recipe(recipe: &Recipe) -> Result<(), CodecError> {
    if !recipe.is_finite() {
        return Err(CodecError::NonFinite {
            recipe: recipe.name.clone(),
        });
    }
    for (field, value) in recipe.text_fields() {
        check_text(field, value)?;
    }
    Ok(())
}

fn check_set(set: &RecipeSet) -> Result<(), CodecError> {
    check_text(SET_NAME_KEY, set.name())?;
    set.iter().try_for_each(check_recipe)
}

/// The decoder closes a string on any quote not preceded by a backslash and
/// rejects `\u` escapes, which serde_json emits for most control characters.
fn check_text(field: &'static str, value: &str) -> Result<(), CodecError> {
    let unreadable = value.ends_with('\\')
        || value
            .chars()
            .any(|c| c < '\u{20}' && !matches!(c, '\n' | '\r' | '\t' | '\u{8}' | '\u{c}'));
    if unreadable {
        return Err(CodecError::UnreadableText {
            field,
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Encode a set. `pretty` only adds indentation and line breaks.
///
/// Fails without producing output if any value would not decode again.
pub fn encode(set: &RecipeSet, pretty: bool) -> Result<String, CodecError> {
    check_set(set)?;
    let doc = SetDocument::from(set);
    let text = if pretty {
        serde_json::to_string_pretty(&doc)
    } else {
        serde_json::to_string(&doc)
    };
    text.map_err(CodecError::Encode)
}

/// Encode a set straight into a writer
pub fn encode_to_writer<W: Write>(
    writer: W,
    set: &RecipeSet,
    pretty: bool,
) -> Result<(), CodecError> {
    check_set(set)?;
    let doc = SetDocument::from(set);
    let result = if pretty {
        serde_json::to_writer_pretty(writer, &doc)
    } else {
        serde_json::to_writer(writer, &doc)
    };
    result.map_err(|e| {
        if e.is_io() {
            CodecError::Io(e.into())
        } else {
            CodecError::Encode(e)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_compact_shape() {
        let mut set = RecipeSet::new("combo");
        let mut spark = Recipe::new("spark", "");
        spark.scale = 2.0;
        set.upsert(spark);

        let text = encode(&set, false).unwrap();
        assert!(text.starts_with(r#"{"name":"combo","recipeList":[{"name":"spark","effectName":"","attach":false,"#));
        assert!(text.contains(r#""scale":2"#));
        assert!(text.contains(r#""location":{"x":0"#));
        assert!(!text.contains("\n"));
        assert!(text.ends_with("}]}"));
    }

    #[test]
    fn test_encode_pretty_is_multiline() {
        let mut set = RecipeSet::new("combo");
        set.upsert(Recipe::new("a", "fx"));
        let text = encode(&set, true).unwrap();
        assert!(text.lines().count() > 3);
        assert!(text.contains("\"recipeList\": ["));
    }

    #[test]
    fn test_encode_empty_set() {
        let set = RecipeSet::new("empty");
        assert_eq!(
            encode(&set, false).unwrap(),
            r#"{"name":"empty","recipeList":[]}"#
        );
    }

    #[test]
    fn test_non_finite_numbers_refused() {
        let mut set = RecipeSet::new("n");
        let mut bad = Recipe::new("bad", "");
        bad.scale = f32::INFINITY;
        set.upsert(bad);

        let err = encode(&set, false).unwrap_err();
        assert!(matches!(err, CodecError::NonFinite { ref recipe } if recipe == "bad"));

        let mut buf = Vec::new();
        assert!(encode_to_writer(&mut buf, &set, true).is_err());
        assert!(buf.is_empty());
    }

    #[test]
    fn test_unreadable_text_refused() {
        let mut recipe = Recipe::new("a", "effects\\");
        assert!(matches!(
            check_recipe(&recipe).unwrap_err(),
            CodecError::UnreadableText { field: "effectName", .. }
        ));

        recipe.effect_name = "ok".to_string();
        recipe.target_id = "m\u{1}".to_string();
        assert!(matches!(
            check_recipe(&recipe).unwrap_err(),
            CodecError::UnreadableText { field: "maid", .. }
        ));

        recipe.target_id = "tab\there\nnewline \\back\\slash".to_string();
        assert!(check_recipe(&recipe).is_ok());
    }

    #[test]
    fn test_encode_to_writer_matches_encode() {
        let mut set = RecipeSet::new("w");
        set.upsert(Recipe::new("a", "fx"));
        let mut buf = Vec::new();
        encode_to_writer(&mut buf, &set, false).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap(), encode(&set, false).unwrap());
    }
}
