//! Text rendering utilities for human-friendly error messages.
//!
//! Provides helpers to format resolution chains, shorten key names,
//! and produce "did you mean?" suggestions in error output.

/// Renders a resolution chain as a readable string.
///
/// # Examples
/// ```
/// use wirebox_support::rendering::render_chain;
///
/// let chain = vec!["Service", "ServiceImpl", "Repository", "Service"];
/// let rendered = render_chain(&chain);
/// assert_eq!(rendered, "Service → ServiceImpl → Repository → Service");
/// ```
pub fn render_chain(chain: &[impl AsRef<str>]) -> String {
    chain
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join(" → ")
}

/// Shortens a path-qualified key name for display.
///
/// Keys built from Rust types carry their full path; keys chosen by hand
/// usually don't, and pass through unchanged.
///
/// ```
/// use wirebox_support::rendering::shorten_name;
///
/// assert_eq!(shorten_name("my_app::repo::RepositoryImpl"), "RepositoryImpl");
/// assert_eq!(shorten_name("Service<my_app::repo::Repository>"), "Service<Repository>");
/// assert_eq!(shorten_name("Repository"), "Repository");
/// ```
pub fn shorten_name(full_name: &str) -> String {
    let mut result = String::with_capacity(full_name.len());
    let mut chars = full_name.chars().peekable();
    let mut segment = String::new();

    while let Some(ch) = chars.next() {
        match ch {
            ':' if chars.peek() == Some(&':') => {
                chars.next();
                segment.clear();
            }
            '<' | '>' | ',' | ' ' => {
                result.push_str(&segment);
                result.push(ch);
                segment.clear();
            }
            _ => segment.push(ch),
        }
    }

    result.push_str(&segment);
    result
}

/// Ranks `available` names by closeness to `requested` and returns
/// at most `max_suggestions` of them, best first.
///
/// Exact names are never suggested back to the caller.
pub fn suggest_similar<'a>(
    requested: &str,
    available: impl IntoIterator<Item = &'a str>,
    max_suggestions: usize,
) -> Vec<String> {
    if max_suggestions == 0 {
        return Vec::new();
    }

    let requested_short = shorten_name(requested).to_lowercase();

    let mut scored: Vec<(&str, usize)> = available
        .into_iter()
        .filter(|name| *name != requested)
        .filter_map(|name| {
            let name_short = shorten_name(name).to_lowercase();

            if name_short.contains(&requested_short) || requested_short.contains(&name_short) {
                return Some((name, 100));
            }

            if roughly_equal(&requested_short, &name_short) {
                return Some((name, 90));
            }

            let common = name_short
                .chars()
                .zip(requested_short.chars())
                .take_while(|(a, b)| a == b)
                .count();

            (common >= 3).then_some((name, common * 10))
        })
        .collect();

    // stable: equal scores keep input order
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored.dedup_by(|a, b| a.0 == b.0);
    scored
        .into_iter()
        .take(max_suggestions)
        .map(|(name, _)| name.to_string())
        .collect()
}

/// Cheap typo check: lengths within 3 and at least 60% of positions agree.
fn roughly_equal(a: &str, b: &str) -> bool {
    if a.len().abs_diff(b.len()) > 3 {
        return false;
    }

    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return true;
    }

    let common = a.chars().zip(b.chars()).filter(|(x, y)| x == y).count();
    common * 100 / max_len >= 60
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_cycle_chain() {
        let chain = vec!["A", "B", "C", "A"];
        assert_eq!(render_chain(&chain), "A → B → C → A");
    }

    #[test]
    fn render_single_element_chain() {
        assert_eq!(render_chain(&["A"]), "A");
    }

    #[test]
    fn render_empty_chain() {
        let chain: Vec<&str> = vec![];
        assert_eq!(render_chain(&chain), "");
    }

    #[test]
    fn shorten_nested_generics() {
        assert_eq!(
            shorten_name("alloc::sync::Arc<dyn my_app::traits::Logger>"),
            "Arc<dyn Logger>"
        );
    }

    #[test]
    fn suggest_typo() {
        let available = ["Repository", "SomeService", "Logger"];
        let suggestions = suggest_similar("Repositroy", available, 3);
        assert_eq!(suggestions.first().map(String::as_str), Some("Repository"));
    }

    #[test]
    fn suggest_substring_before_prefix() {
        let available = ["ServiceImpl", "Serializer"];
        let suggestions = suggest_similar("Service", available, 3);
        assert_eq!(suggestions[0], "ServiceImpl");
    }

    #[test]
    fn suggest_respects_limit_and_skips_exact() {
        let available = ["Repository", "RepositoryImpl", "RepositoryCache"];
        let suggestions = suggest_similar("Repository", available, 1);
        assert_eq!(suggestions, vec!["RepositoryImpl".to_string()]);
        assert!(suggest_similar("Repository", available, 0).is_empty());
    }

    #[test]
    fn suggest_no_match() {
        let suggestions = suggest_similar("XyzAbcDef", ["Database"], 3);
        assert!(suggestions.is_empty());
    }

    #[test]
    fn roughly_equal_check() {
        assert!(roughly_equal("userservice", "userservise"));
        assert!(!roughly_equal("database", "logger"));
    }
}
