//! Naming helpers shared by route synthesis and gateway projection.
//!
//! The word-boundary rule is the same everywhere: a new word starts at an
//! uppercase letter that is either followed by a lowercase letter or preceded
//! by a lowercase letter or digit. `JournalEntry` becomes `journal-entry`,
//! `HTTPRoute` becomes `http-route`.

use std::collections::HashMap;

/// PascalCase resource token → path segment
///
/// Tokens without an alias fall back to [`to_kebab_case`]. Built once from
/// configuration and shared read-only.
#[derive(Debug, Clone, Default)]
pub struct ResourceAliasTable {
    aliases: HashMap<String, String>,
}

impl ResourceAliasTable {
    /// Build the table from `(resource, segment)` pairs
    pub fn new(aliases: HashMap<String, String>) -> Self {
        ResourceAliasTable { aliases }
    }

    /// Explicit alias for `resource`, if one is configured
    pub fn alias(&self, resource: &str) -> Option<&str> {
        self.aliases.get(resource).map(String::as_str)
    }

    /// Path segment for `resource`
    pub fn segment(&self, resource: &str) -> String {
        match self.alias(resource) {
            Some(segment) => segment.to_string(),
            None => to_kebab_case(resource),
        }
    }

    /// Number of configured aliases
    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    /// True when no alias is configured
    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

/// `JournalEntry` → `journal-entry`
pub fn to_kebab_case(name: &str) -> String {
    split_words(name, '-')
}

/// `JournalEntry` → `journal_entry`
pub fn to_snake_case(name: &str) -> String {
    split_words(name, '_')
}

/// Singular snake-case form used for scoped identifier parameters
///
/// `JournalEntries` → `journal_entry`, `Accounts` → `account`,
/// `Address` → `address`.
pub fn singular_snake(resource: &str) -> String {
    let snake = to_snake_case(resource);
    if let Some(stem) = snake.strip_suffix("ies") {
        format!("{stem}y")
    } else if snake.ends_with('s') && !snake.ends_with("ss") {
        snake[..snake.len() - 1].to_string()
    } else {
        snake
    }
}

fn split_words(name: &str, separator: char) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);

    for (i, &ch) in chars.iter().enumerate() {
        if ch.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|c| c.is_lowercase());
            let prev_is_lower_or_digit = prev.is_lowercase() || prev.is_ascii_digit();
            let prev_is_separator = prev == '-' || prev == '_';
            if (next_is_lower || prev_is_lower_or_digit) && !prev_is_separator {
                out.push(separator);
            }
        }
        out.extend(ch.to_lowercase());
    }

    out
}
