pub mod dashboard;
pub mod form;
pub mod record_detail;
pub mod records;

pub(crate) fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_short_string() {
        assert_eq!(truncate("Math", 10), "Math");
    }

    #[test]
    fn truncate_long_string() {
        assert_eq!(truncate("Linear Algebra", 8), "Linea...");
    }

    #[test]
    fn truncate_exact_length() {
        assert_eq!(truncate("hello", 5), "hello");
    }

    #[test]
    fn truncate_counts_chars_not_bytes() {
        assert_eq!(truncate("Égalité", 7), "Égalité");
    }
}
