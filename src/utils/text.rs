// Terminal-safe text

use std::borrow::Cow;

/// Drop control characters (escape sequences, carriage returns, tabs) so
/// stored text cannot move the cursor or restyle the terminal.
pub fn printable(text: &str) -> Cow<'_, str> {
    if text.chars().any(char::is_control) {
        Cow::Owned(text.chars().filter(|c| !c.is_control()).collect())
    } else {
        Cow::Borrowed(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_borrowed() {
        assert!(matches!(printable("Buy milk"), Cow::Borrowed("Buy milk")));
    }

    #[test]
    fn test_control_characters_removed() {
        assert_eq!(printable("a\x1b[2Jb\rc\u{9b}d\te"), "a[2Jbcde");
        assert_eq!(printable("\x07\x08"), "");
    }
}
