//! Word-list drawing and `{list.category}` template substitution.
//!
//! Adventures carry named word lists; templates reference them with
//! `{list}` or `{list.category}` tokens to generate unique opening
//! content. Resolution is fail-soft: an unresolvable token stays in
//! the output verbatim, so bad templates are visible as literal braces
//! rather than hidden behind an error.

/// Template token scanning and substitution.
pub mod template;
/// Random draws from word lists.
pub mod words;

/// Re-export the template resolver.
pub use template::resolve_template;
/// Re-export word drawing helpers.
pub use words::{random_word, word_prompt};
