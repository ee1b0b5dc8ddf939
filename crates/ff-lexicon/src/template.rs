//! `{list}` and `{list.category}` placeholder substitution.

use rand::rngs::StdRng;

use ff_core::WordList;

use crate::words::random_word;

fn is_token_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

/// Substitute every `{list}` / `{list.category}` token in `text` with
/// a random word from the matching list.
///
/// Each token occurrence resolves independently; the same `{list}`
/// appearing twice may produce two different words. Consistency across
/// occurrences is NOT guaranteed. Tokens naming an unknown list or
/// category are left in the output verbatim, so a caller can detect a
/// bad template by literal braces in the result. Pure given the
/// supplied RNG.
pub fn resolve_template(text: &str, word_lists: &[WordList], rng: &mut StdRng) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after_open = &rest[open + 1..];

        let token_len = after_open.find(|c: char| !is_token_char(c));
        match token_len {
            Some(len) if after_open[len..].starts_with('}') && len > 0 => {
                let token = &after_open[..len];
                let (list_name, category) = match token.split_once('.') {
                    Some((list, cat)) => (list, Some(cat)),
                    None => (token, None),
                };
                match random_word(word_lists, list_name, category, rng) {
                    Some(word) => out.push_str(word),
                    // Unknown list/category: keep the token verbatim.
                    None => {
                        out.push('{');
                        out.push_str(token);
                        out.push('}');
                    }
                }
                rest = &after_open[len + 1..];
            }
            // Not a well-formed token; emit the brace and move on.
            _ => {
                out.push('{');
                rest = after_open;
            }
        }
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use std::collections::HashMap;

    fn lists() -> Vec<WordList> {
        vec![
            WordList {
                name: "colors".to_string(),
                description: String::new(),
                categories: HashMap::from([("primary".to_string(), vec!["red".into()])]),
            },
            WordList {
                name: "weapons".to_string(),
                description: String::new(),
                categories: HashMap::from([("melee".to_string(), vec!["sword".into()])]),
            },
        ]
    }

    #[test]
    fn substitutes_category_tokens() {
        let mut rng = StdRng::seed_from_u64(1);
        let out = resolve_template("I see a {colors.primary} {weapons.melee}.", &lists(), &mut rng);
        assert_eq!(out, "I see a red sword.");
    }

    #[test]
    fn substitutes_bare_list_tokens() {
        let mut rng = StdRng::seed_from_u64(1);
        let out = resolve_template("A {colors} glow.", &lists(), &mut rng);
        assert_eq!(out, "A red glow.");
    }

    #[test]
    fn valid_tokens_leave_no_braces() {
        let mut rng = StdRng::seed_from_u64(9);
        let out = resolve_template("{colors} and {weapons.melee}", &lists(), &mut rng);
        assert!(!out.contains('{'));
        assert!(!out.contains('}'));
    }

    #[test]
    fn unknown_list_left_verbatim() {
        let mut rng = StdRng::seed_from_u64(1);
        let out = resolve_template("I see a {missing_list}.", &lists(), &mut rng);
        assert_eq!(out, "I see a {missing_list}.");
    }

    #[test]
    fn unknown_category_left_verbatim() {
        let mut rng = StdRng::seed_from_u64(1);
        let out = resolve_template("{colors.missing}", &lists(), &mut rng);
        assert_eq!(out, "{colors.missing}");
    }

    #[test]
    fn non_token_braces_pass_through() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(resolve_template("a { b } c", &lists(), &mut rng), "a { b } c");
        assert_eq!(resolve_template("{}", &lists(), &mut rng), "{}");
        assert_eq!(resolve_template("tail {", &lists(), &mut rng), "tail {");
    }

    #[test]
    fn each_occurrence_resolves_independently() {
        // Two tokens both resolve; single-word pools make the output
        // deterministic without pinning RNG order.
        let mut rng = StdRng::seed_from_u64(4);
        let out = resolve_template("{colors} {colors}", &lists(), &mut rng);
        assert_eq!(out, "red red");
    }
}
