//! Folder and file name sanitization for archive entries.

/// Characters that are illegal in file names on at least one common file system.
pub const ILLEGAL_NAME_CHARS: [char; 10] = ['/', '\\', '?', '%', '*', ':', '|', '"', '<', '>'];

/// Placeholder used when both a label and the configured placeholder sanitize to nothing.
pub const DEFAULT_PLACEHOLDER: &str = "Untitled_Section";

/// Strip illegal and control characters from `label` and trim the result.
///
/// Returns `None` when nothing usable remains. A name made only of dots is
/// treated as empty so it can never address a parent directory.
pub fn sanitize_name(label: &str) -> Option<String> {
    let cleaned: String = label
        .chars()
        .filter(|c| !ILLEGAL_NAME_CHARS.contains(c) && !c.is_control())
        .collect();
    let trimmed = cleaned.trim();

    if trimmed.is_empty() || trimmed.chars().all(|c| c == '.') {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Sanitize `label`, falling back to `placeholder` when nothing usable remains.
///
/// Never fails: the placeholder is sanitized too, and [`DEFAULT_PLACEHOLDER`]
/// covers a placeholder that is itself unusable.
pub fn sanitize_or(label: &str, placeholder: &str) -> String {
    sanitize_name(label)
        .or_else(|| sanitize_name(placeholder))
        .unwrap_or_else(|| DEFAULT_PLACEHOLDER.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_every_illegal_character() {
        let label = r#"a/b\c?d%e*f:g|h"i<j>k"#;
        let name = sanitize_name(label).expect("non-empty");
        assert_eq!(name, "abcdefghijk");
        assert!(!name.contains(ILLEGAL_NAME_CHARS));
    }

    #[test]
    fn trims_surrounding_whitespace() {
        assert_eq!(sanitize_name("  Login Flow  ").as_deref(), Some("Login Flow"));
        assert_eq!(sanitize_name(" : Notes : ").as_deref(), Some("Notes"));
    }

    #[test]
    fn keeps_inner_spaces_and_unicode() {
        assert_eq!(
            sanitize_name("Überblick & Ziele").as_deref(),
            Some("Überblick & Ziele")
        );
    }

    #[test]
    fn punctuation_only_label_is_empty() {
        assert_eq!(sanitize_name("/?*:"), None);
        assert_eq!(sanitize_name("   "), None);
        assert_eq!(sanitize_name(""), None);
    }

    #[test]
    fn dot_names_are_rejected() {
        assert_eq!(sanitize_name(".."), None);
        assert_eq!(sanitize_name(" . "), None);
        assert_eq!(sanitize_name("../x").as_deref(), Some("..x"));
    }

    #[test]
    fn control_characters_are_removed() {
        assert_eq!(sanitize_name("Tab\there").as_deref(), Some("Tabhere"));
    }

    #[test]
    fn placeholder_fallbacks() {
        assert_eq!(sanitize_or("Scope", "Fallback"), "Scope");
        assert_eq!(sanitize_or("***", "Fallback"), "Fallback");
        assert_eq!(sanitize_or("***", "///"), DEFAULT_PLACEHOLDER);
    }
}
