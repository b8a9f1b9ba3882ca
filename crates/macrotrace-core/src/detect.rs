//! Lazy expansion detection over a sequence of trace lines

use crate::report::{Expansion, TraceReport};
use crate::tracker::{DetectConfig, ExpansionTracker};

/// Iterator over the expansions reconstructed from a trace
///
/// Lines are pulled from the underlying iterator only as far as needed to
/// produce the next record. The iterator is single-use: once exhausted, the
/// input has been consumed and [`Expansions::into_report`] holds the warnings
/// and statistics for the whole pass.
pub struct Expansions<I> {
    lines: I,
    tracker: ExpansionTracker,
    exhausted: bool,
}

impl<I, L> Expansions<I>
where
    I: Iterator<Item = L>,
    L: AsRef<[u8]>,
{
    pub fn new(lines: impl IntoIterator<IntoIter = I>, config: DetectConfig) -> Self {
        Self {
            lines: lines.into_iter(),
            tracker: ExpansionTracker::new(config),
            exhausted: false,
        }
    }

    /// Warnings and statistics so far
    pub fn report(&self) -> &TraceReport {
        self.tracker.report()
    }

    /// Stop and return the report.
    ///
    /// If the input was not fully consumed, the unread part is ignored and
    /// any frame still open is reported as dangling.
    pub fn into_report(mut self) -> TraceReport {
        self.tracker.finish();
        self.tracker.into_report()
    }
}

impl<I, L> Iterator for Expansions<I>
where
    I: Iterator<Item = L>,
    L: AsRef<[u8]>,
{
    type Item = Expansion;

    fn next(&mut self) -> Option<Expansion> {
        loop {
            if let Some(expansion) = self.tracker.pop_ready() {
                return Some(expansion);
            }
            if self.exhausted {
                return None;
            }
            match self.lines.next() {
                Some(line) => self.tracker.process_line(line.as_ref()),
                None => {
                    self.exhausted = true;
                    self.tracker.finish();
                }
            }
        }
    }
}

/// Detect expansions in a raw trace log.
///
/// The log is split on `\n`; a trailing `\r` on each line is ignored.
pub fn detect_expansions<'a>(
    log: &'a [u8],
    config: DetectConfig,
) -> Expansions<impl Iterator<Item = &'a [u8]> + 'a> {
    Expansions::new(log.split(|b| *b == b'\n'), config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::WarningKind;

    fn log(lines: &[&str]) -> Vec<u8> {
        lines.join("\n").into_bytes()
    }

    #[test]
    fn test_simple_macro() {
        let log = log(&[
            r"Start of expansion. Control sequence: T_CS[\simpledef]. (object ID: 1). Current expansion depth: 1. (If this was a literal control sequence in a file rather than from an expansion, it appeared in /path/to/main.tex from line 2, col 1 to line 2, col 11).",
            r"Expansion token: x (object ID 2). Category: 11. Expandable: false.",
            r"End of expansion (object ID: 1). Current expansion depth: 1. Expansion: x.",
        ]);
        let expansions: Vec<_> =
            detect_expansions(&log, DetectConfig::in_files(["/path/to/main.tex"])).collect();
        assert_eq!(
            expansions,
            vec![Expansion::new(r"\simpledef".as_bytes(), 2, 1, 2, 11, "x")]
        );
    }

    #[test]
    fn test_lazy_yields_before_input_ends() {
        let lines = vec![
            r"Start of expansion. Control sequence: T_CS[\a]. (object ID: 1). Current expansion depth: 1. (If this was a literal control sequence in a file rather than from an expansion, it appeared in main.tex from line 1, col 1 to line 1, col 3).",
            r"Expansion token: a (object ID 2). Category: 11. Expandable: false.",
            r"End of expansion (object ID: 1). Current expansion depth: 1. Expansion: a.",
            r"Start of expansion. Control sequence: T_CS[\b]. (object ID: 3). Current expansion depth: 1. (If this was a literal control sequence in a file rather than from an expansion, it appeared in main.tex from line 2, col 1 to line 2, col 3).",
        ];
        let mut read = 0;
        let counted = lines.iter().inspect(|_| read += 1);
        let mut expansions = Expansions::new(counted, DetectConfig::in_files(["main.tex"]));

        let first = expansions.next().unwrap();
        assert_eq!(first.text, b"a");
        drop(expansions);
        assert_eq!(read, 3);
    }

    #[test]
    fn test_report_after_exhaustion() {
        let log = log(&[
            "This is LaTeXML, version 0.8.6",
            r"End of expansion (object ID: 7). Current expansion depth: 1. Expansion: x.",
            r"Expansion token: x (object ID ?). Category: 11. Expandable: false.",
        ]);
        let mut expansions = detect_expansions(&log, DetectConfig::any_file());
        assert!(expansions.next().is_none());

        let report = expansions.into_report();
        assert_eq!(report.stats.lines, 3);
        assert_eq!(report.stats.events, 1);
        assert_eq!(report.warnings.len(), 2);
        assert_eq!(report.warnings[0].line, 2);
        assert_eq!(report.warnings[0].kind, WarningKind::UnmatchedEnd(7));
        assert_eq!(report.warnings[1].line, 3);
    }

    #[test]
    fn test_into_report_before_exhaustion_marks_dangling() {
        let log = log(&[
            r"Start of expansion. Control sequence: T_CS[\a]. (object ID: 1). Current expansion depth: 1. (If this was a literal control sequence in a file rather than from an expansion, it appeared in main.tex from line 1, col 1 to line 1, col 3).",
        ]);
        let mut expansions = detect_expansions(&log, DetectConfig::any_file());
        assert!(expansions.next().is_none());
        let report = expansions.into_report();
        assert_eq!(report.warnings[0].kind, WarningKind::DanglingFrame(1));
    }
}
