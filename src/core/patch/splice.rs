//! Compare-and-swap splice of a replacement into one line of a file

/// Result of a splice attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpliceOutcome {
    /// New file content
    Applied(String),
    /// The span no longer holds the scanned text. `actual` is `None` when the
    /// line or span no longer exists.
    Conflict {
        expected: String,
        actual: Option<String>,
    },
    /// Malformed position
    Invalid(String),
}

/// Position of a span inside a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    /// 1-based line number
    pub line_at: i64,
    /// 0-based char offset into the line
    pub start: i64,
    /// Exclusive char offset into the line
    pub end: i64,
}

impl Span {
    pub fn new(line_at: i64, start: i64, end: i64) -> Self {
        Self {
            line_at,
            start,
            end,
        }
    }

    /// Error message for a malformed position
    pub fn check(&self) -> Option<String> {
        if self.line_at < 1 {
            Some(format!("line_at must be at least 1, got {}", self.line_at))
        } else if self.start < 0 {
            Some(format!("start must not be negative, got {}", self.start))
        } else if self.end < self.start {
            Some(format!("end {} is before start {}", self.end, self.start))
        } else {
            None
        }
    }
}

/// Split a line into its body and terminator
fn split_terminator(line: &str) -> (&str, &str) {
    if let Some(body) = line.strip_suffix("\r\n") {
        (body, "\r\n")
    } else if let Some(body) = line.strip_suffix('\n') {
        (body, "\n")
    } else {
        (line, "")
    }
}

/// Replace `span` in `content` with `replacement`, provided the span still
/// holds `expected`. Every other byte of the file, the target line's
/// terminator included, is preserved.
pub fn splice(content: &str, span: Span, expected: &str, replacement: &str) -> SpliceOutcome {
    if let Some(problem) = span.check() {
        return SpliceOutcome::Invalid(problem);
    }

    let conflict = |actual: Option<String>| SpliceOutcome::Conflict {
        expected: expected.to_string(),
        actual,
    };

    let index = (span.line_at - 1) as usize;
    let lines: Vec<&str> = content.split_inclusive('\n').collect();
    let Some(line) = lines.get(index) else {
        return conflict(None);
    };

    let (body, terminator) = split_terminator(line);
    let chars: Vec<char> = body.chars().collect();
    let (start, end) = (span.start as usize, span.end as usize);
    if end > chars.len() {
        return conflict(None);
    }

    let actual: String = chars[start..end].iter().collect();
    if actual != expected {
        return conflict(Some(actual));
    }

    let mut spliced = String::with_capacity(content.len() + replacement.len());
    for earlier in &lines[..index] {
        spliced.push_str(earlier);
    }
    spliced.extend(&chars[..start]);
    spliced.push_str(replacement);
    spliced.extend(&chars[end..]);
    spliced.push_str(terminator);
    for later in &lines[index + 1..] {
        spliced.push_str(later);
    }
    SpliceOutcome::Applied(spliced)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splice_multibyte_span() {
        let content = "greeting = \"你好\"\n";
        let outcome = splice(content, Span::new(1, 11, 15), "\"你好\"", "\"hello\"");
        assert_eq!(
            outcome,
            SpliceOutcome::Applied("greeting = \"hello\"\n".to_string())
        );
    }

    #[test]
    fn test_splice_detects_changed_text() {
        let content = "greeting = \"hi\"\n";
        let outcome = splice(content, Span::new(1, 11, 15), "\"你好\"", "\"hello\"");
        assert_eq!(
            outcome,
            SpliceOutcome::Conflict {
                expected: "\"你好\"".to_string(),
                actual: Some("\"hi\"".to_string()),
            }
        );

        let content = "greeting = \"hiya\"\n";
        let outcome = splice(content, Span::new(1, 11, 15), "\"你好\"", "\"hello\"");
        assert_eq!(
            outcome,
            SpliceOutcome::Conflict {
                expected: "\"你好\"".to_string(),
                actual: Some("\"hiy".to_string()),
            }
        );
    }

    #[test]
    fn test_splice_missing_line_or_span_is_conflict() {
        let outcome = splice("one\n", Span::new(3, 0, 1), "x", "y");
        assert!(matches!(outcome, SpliceOutcome::Conflict { actual: None, .. }));

        let outcome = splice("greeting = 1\n", Span::new(1, 11, 15), "\"你好\"", "\"hello\"");
        assert!(matches!(outcome, SpliceOutcome::Conflict { actual: None, .. }));
    }

    #[test]
    fn test_splice_keeps_other_lines_and_terminators() {
        let content = "a = 1\r\nb = \"旧\"\r\nc = 3";
        let outcome = splice(content, Span::new(2, 4, 7), "\"旧\"", "\"new\"");
        assert_eq!(
            outcome,
            SpliceOutcome::Applied("a = 1\r\nb = \"new\"\r\nc = 3".to_string())
        );

        let outcome = splice(content, Span::new(3, 4, 5), "3", "4");
        assert_eq!(
            outcome,
            SpliceOutcome::Applied("a = 1\r\nb = \"旧\"\r\nc = 4".to_string())
        );
    }

    #[test]
    fn test_splice_rejects_malformed_span() {
        assert!(matches!(
            splice("x\n", Span::new(0, 0, 1), "x", "y"),
            SpliceOutcome::Invalid(_)
        ));
        assert!(matches!(
            splice("x\n", Span::new(1, -1, 1), "x", "y"),
            SpliceOutcome::Invalid(_)
        ));
        assert!(matches!(
            splice("x\n", Span::new(1, 1, 0), "x", "y"),
            SpliceOutcome::Invalid(_)
        ));
    }

    #[test]
    fn test_empty_span_inserts() {
        let outcome = splice("ab\n", Span::new(1, 1, 1), "", "-");
        assert_eq!(outcome, SpliceOutcome::Applied("a-b\n".to_string()));
    }
}
