//! Source spans reported by the engine, and widening them over arguments

use crate::classify::ArgumentToken;
use facet::Facet;

/// Line/column range of an invocation in a source file
///
/// Positions are exactly as the engine reports them: 1-indexed, with `0`
/// for invocations the engine could not anchor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Facet)]
pub struct Span {
    pub start_line: usize,
    pub start_col: usize,
    pub end_line: usize,
    pub end_col: usize,
}

impl Span {
    pub fn new(start_line: usize, start_col: usize, end_line: usize, end_col: usize) -> Self {
        Self {
            start_line,
            start_col,
            end_line,
            end_col,
        }
    }

    /// Same start, new end.
    pub fn with_end_of(self, other: Span) -> Self {
        Self {
            end_line: other.end_line,
            end_col: other.end_col,
            ..self
        }
    }
}

impl std::fmt::Display for Span {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}-{}:{}",
            self.start_line, self.start_col, self.end_line, self.end_col
        )
    }
}

/// Compute the final span of a top-level invocation.
///
/// The span declared on the start line only covers the control sequence
/// name. When arguments were consumed the end moves to the end of the last
/// argument token, so the span covers the whole invocation.
pub fn resolve_span(declared: Span, arguments: &[ArgumentToken]) -> Span {
    match arguments.last() {
        Some(last) => declared.with_end_of(last.span),
        None => declared,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn arg(text: &str, start_col: usize, end_col: usize) -> ArgumentToken {
        ArgumentToken {
            text: text.as_bytes().to_vec(),
            file: Some(PathBuf::from("/path/to/main.tex")),
            span: Span::new(2, start_col, 2, end_col),
        }
    }

    #[test]
    fn test_no_arguments_keeps_declared_span() {
        let declared = Span::new(2, 1, 2, 11);
        assert_eq!(resolve_span(declared, &[]), declared);
    }

    #[test]
    fn test_arguments_widen_end() {
        let declared = Span::new(2, 1, 2, 13);
        let args = [arg("{", 13, 14), arg("x", 14, 15), arg("}", 15, 16)];
        assert_eq!(resolve_span(declared, &args), Span::new(2, 1, 2, 16));
    }

    #[test]
    fn test_last_argument_on_later_line() {
        let declared = Span::new(4, 3, 4, 8);
        let mut last = arg("}", 1, 2);
        last.span = Span::new(6, 1, 6, 2);
        assert_eq!(resolve_span(declared, &[last]), Span::new(4, 3, 6, 2));
    }

    #[test]
    fn test_display() {
        assert_eq!(Span::new(2, 1, 2, 19).to_string(), "2:1-2:19");
    }
}
