//! Uniform draws from adventure word lists.

use rand::Rng;
use rand::rngs::StdRng;

use ff_core::WordList;

/// Draw a random word from a named list.
///
/// With a category, the draw is from that category's pool only. Bare
/// list names draw from the union of all categories. Returns `None`
/// when the list or category is unknown, or the pool is empty.
pub fn random_word<'a>(
    word_lists: &'a [WordList],
    list_name: &str,
    category: Option<&str>,
    rng: &mut StdRng,
) -> Option<&'a str> {
    let list = word_lists.iter().find(|wl| wl.name == list_name)?;

    match category {
        Some(cat) => {
            let pool = list.categories.get(cat)?;
            if pool.is_empty() {
                return None;
            }
            Some(pool[rng.random_range(0..pool.len())].as_str())
        }
        None => {
            let pool: Vec<&str> = list
                .categories
                .values()
                .flat_map(|words| words.iter().map(String::as_str))
                .collect();
            if pool.is_empty() {
                return None;
            }
            Some(pool[rng.random_range(0..pool.len())])
        }
    }
}

/// Build a prompt asking the narrator to invent a word when no
/// predefined list applies.
pub fn word_prompt(list_name: &str, category: Option<&str>, context: Option<&str>) -> String {
    let category_part = category
        .map(|c| format!(" in the {c} category"))
        .unwrap_or_default();
    let context_part = context.map(|c| format!(" for a {c}")).unwrap_or_default();
    format!(
        "Generate a unique {}{category_part}{context_part}. \
         Return only the word/name, no explanation.",
        list_name.replace('_', " "),
    )
}
