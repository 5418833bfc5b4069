use similar::TextDiff;

/// Unified diff between two versions of `path`, or `None` when they are identical.
pub fn build_unified_diff(original: &str, modified: &str, path: &str) -> Option<String> {
    if original == modified {
        return None;
    }

    let diff = TextDiff::from_lines(original, modified);
    let header_old = format!("a/{path}");
    let header_new = format!("b/{path}");

    Some(
        diff.unified_diff()
            .header(&header_old, &header_new)
            .to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn returns_none_for_identical_content() {
        assert!(build_unified_diff("abc", "abc", "doc.md").is_none());
    }

    #[test]
    fn produces_diff_for_changes() {
        let diff = build_unified_diff("## 1 Intro\n", "## 一、Intro\n", "doc.md").unwrap();
        assert!(diff.contains("--- a/doc.md"));
        assert!(diff.contains("-## 1 Intro"));
        assert!(diff.contains("+## 一、Intro"));
    }
}
