/// A single line of document text with its terminator split off.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRecord<'a> {
    /// 1-based line number.
    pub number: usize,
    pub body: &'a str,
    /// `"\n"`, `"\r\n"`, or empty for a final unterminated line.
    pub terminator: &'a str,
}

/// Iterate the lines of `text`, keeping enough information to rebuild it byte for byte.
pub fn read_lines(text: &str) -> impl Iterator<Item = LineRecord<'_>> {
    text.split_inclusive('\n')
        .enumerate()
        .map(|(idx, segment)| {
            let body_len = if segment.ends_with("\r\n") {
                segment.len() - 2
            } else if segment.ends_with('\n') {
                segment.len() - 1
            } else {
                segment.len()
            };
            LineRecord {
                number: idx + 1,
                body: &segment[..body_len],
                terminator: &segment[body_len..],
            }
        })
}

/// Rebuild `text`, replacing the body of every line for which `rewrite` returns a value.
///
/// Terminators are preserved, and lines the callback declines pass through unchanged.
pub fn rewrite_lines<F>(text: &str, mut rewrite: F) -> String
where
    F: FnMut(&LineRecord<'_>) -> Option<String>,
{
    let mut output = String::with_capacity(text.len());
    for line in read_lines(text) {
        match rewrite(&line) {
            Some(body) => output.push_str(&body),
            None => output.push_str(line.body),
        }
        output.push_str(line.terminator);
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_mixed_terminators() {
        let lines: Vec<_> = read_lines("one\r\ntwo\nthree").collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].body, "one");
        assert_eq!(lines[0].terminator, "\r\n");
        assert_eq!(lines[1].body, "two");
        assert_eq!(lines[1].terminator, "\n");
        assert_eq!(lines[2].body, "three");
        assert_eq!(lines[2].terminator, "");
        assert_eq!(lines[2].number, 3);
    }

    #[test]
    fn rewrite_preserves_untouched_lines() {
        let text = "keep\r\nchange\n\nlast";
        let rewritten = rewrite_lines(text, |line| {
            (line.body == "change").then(|| "changed".to_string())
        });
        assert_eq!(rewritten, "keep\r\nchanged\n\nlast");
    }

    #[test]
    fn empty_text_yields_no_lines() {
        assert_eq!(read_lines("").count(), 0);
        assert_eq!(rewrite_lines("", |_| Some("x".into())), "");
    }
}
