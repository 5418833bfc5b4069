//! Level-2 heading enumerators: `## 3 Overview` ↔ `## 三、Overview`.

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

use crate::lines::rewrite_lines;
use crate::numeral::{self, ENUMERATION_MARK};
use crate::report::{Diagnostic, RewriteReport};

/// A numbered heading whose number has no numeral glyph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("heading number {digits} has no numeral (expected 1-9); left unchanged")]
pub struct OutOfRange {
    pub digits: String,
}

fn numeric_heading() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(##\s+)([0-9]+)\s+(.*)$").expect("numeric heading pattern is valid")
    })
}

fn enumerated_heading() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^(##\s+)([一二三四五六七八九])、(.*)$")
            .expect("enumerated heading pattern is valid")
    })
}

/// Rewrite a single `## N Title` line into `## <numeral>、Title`.
///
/// Returns `Ok(None)` when the line is not a numbered level-2 heading.
pub fn to_enumerated(line: &str) -> Result<Option<String>, OutOfRange> {
    let Some(caps) = numeric_heading().captures(line) else {
        return Ok(None);
    };

    let prefix = &caps[1];
    let digits = &caps[2];
    let title = caps[3].trim_start();

    let glyph = digits
        .parse::<u32>()
        .ok()
        .and_then(numeral::encode)
        .ok_or_else(|| OutOfRange {
            digits: digits.to_string(),
        })?;

    Ok(Some(format!("{prefix}{glyph}{ENUMERATION_MARK}{title}")))
}

/// Rewrite a single `## <numeral>、Title` line into `## N Title`.
///
/// Any further enumeration marks inside the title become spaces.
pub fn to_numeric(line: &str) -> Option<String> {
    let caps = enumerated_heading().captures(line)?;

    let prefix = &caps[1];
    let value = caps[2].chars().next().and_then(numeral::decode)?;
    let title = caps[3].replace(ENUMERATION_MARK, " ");
    let title = title.trim_start();

    Some(format!("{prefix}{value} {title}"))
}

/// Convert every numbered level-2 heading in `text` to the enumerated form.
///
/// Headings numbered outside 1-9 are kept as-is and recorded as diagnostics.
pub fn enumerate_headings(text: &str, report: &mut RewriteReport) -> String {
    rewrite_lines(text, |line| match to_enumerated(line.body) {
        Ok(Some(rewritten)) => {
            report.headings_rewritten += 1;
            Some(rewritten)
        }
        Ok(None) => None,
        Err(err) => {
            tracing::warn!(line = line.number, digits = %err.digits, "skipping heading without numeral");
            report.diagnostics.push(Diagnostic {
                line: line.number,
                message: err.to_string(),
            });
            None
        }
    })
}

/// Convert every enumerated level-2 heading in `text` back to the numeric form.
pub fn number_headings(text: &str, report: &mut RewriteReport) -> String {
    rewrite_lines(text, |line| {
        let rewritten = to_numeric(line.body)?;
        report.headings_rewritten += 1;
        Some(rewritten)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enumerates_numbered_heading() {
        assert_eq!(
            to_enumerated("## 3 Overview"),
            Ok(Some("## 三、Overview".to_string()))
        );
    }

    #[test]
    fn keeps_original_marker_whitespace() {
        assert_eq!(
            to_enumerated("##   1    Intro  text"),
            Ok(Some("##   一、Intro  text".to_string()))
        );
    }

    #[test]
    fn leading_zeros_parse_as_decimal() {
        assert_eq!(to_enumerated("## 07 Notes"), Ok(Some("## 七、Notes".to_string())));
    }

    #[test]
    fn ignores_other_heading_levels_and_shapes() {
        assert_eq!(to_enumerated("# 3 Title"), Ok(None));
        assert_eq!(to_enumerated("### 3 Title"), Ok(None));
        assert_eq!(to_enumerated("##3 Title"), Ok(None));
        assert_eq!(to_enumerated("## 3"), Ok(None));
        assert_eq!(to_enumerated("## 2024年 计划"), Ok(None));
        assert_eq!(to_enumerated(" ## 3 Title"), Ok(None));
        assert_eq!(to_enumerated("## ３ Fullwidth"), Ok(None));
    }

    #[test]
    fn out_of_range_numbers_are_reported() {
        assert_eq!(
            to_enumerated("## 10 Appendix"),
            Err(OutOfRange {
                digits: "10".into()
            })
        );
        assert!(to_enumerated("## 0 Preface").is_err());
        assert!(to_enumerated("## 99999999999999999999 Huge").is_err());
    }

    #[test]
    fn numbers_enumerated_heading() {
        assert_eq!(to_numeric("## 三、Overview"), Some("## 3 Overview".to_string()));
    }

    #[test]
    fn replaces_inner_marks_and_strips_leading_space() {
        assert_eq!(
            to_numeric("## 二、、背景、目标"),
            Some("## 2 背景 目标".to_string())
        );
    }

    #[test]
    fn unknown_glyph_is_not_matched() {
        assert_eq!(to_numeric("## 十、Appendix"), None);
        assert_eq!(to_numeric("## 三 Overview"), None);
        assert_eq!(to_numeric("### 三、Overview"), None);
    }

    #[test]
    fn document_pass_records_counts_and_diagnostics() {
        let mut report = RewriteReport::default();
        let text = "# Title\n## 1 Intro\n\n## 12 Later\r\n## 2 Body";
        let output = enumerate_headings(text, &mut report);

        assert_eq!(output, "# Title\n## 一、Intro\n\n## 12 Later\r\n## 二、Body");
        assert_eq!(report.headings_rewritten, 2);
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].line, 4);
        assert!(report.diagnostics[0].message.contains("12"));
    }

    #[test]
    fn document_round_trip_restores_numbers() {
        let text = "## 1 Intro\ntext\n## 9 End\n";
        let mut report = RewriteReport::default();
        let enumerated = enumerate_headings(text, &mut report);
        let restored = number_headings(&enumerated, &mut report);
        assert_eq!(restored, text);
        assert_eq!(report.headings_rewritten, 4);
    }
}
