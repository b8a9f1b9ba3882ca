//! Line classifier for instrumented LaTeXML traces
//!
//! Every line of a trace is classified on its own, with no state. Lines that
//! start with one of the four known markers are parsed into a [`TraceEvent`];
//! everything else is engine noise and becomes [`TraceEvent::Unrecognized`].

use crate::span::Span;
use facet::Facet;
use std::path::PathBuf;

const START_MARKER: &[u8] = b"Start of expansion.";
const ARGUMENT_MARKER: &[u8] = b"Argument token:";
const EXPANSION_MARKER: &[u8] = b"Expansion token:";
const END_MARKER: &[u8] = b"End of expansion";

/// Which of the four line shapes a line claimed to be
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Facet)]
#[repr(u8)]
pub enum LineKind {
    Start,
    Argument,
    Expansion,
    End,
}

impl LineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineKind::Start => "start",
            LineKind::Argument => "argument",
            LineKind::Expansion => "expansion",
            LineKind::End => "end",
        }
    }
}

impl std::fmt::Display for LineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A line carried a known marker but one of its fields could not be parsed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedLine {
    pub kind: LineKind,
    pub field: &'static str,
}

impl std::fmt::Display for MalformedLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "malformed {} line: bad {}", self.kind, self.field)
    }
}

impl std::error::Error for MalformedLine {}

/// The start of one macro invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StartExpansion {
    /// Control sequence name, including the escape character
    pub name: Vec<u8>,
    pub object_id: u64,
    /// `None` when the engine could not anchor the invocation in a real file
    pub file: Option<PathBuf>,
    pub span: Span,
}

/// One token consumed as an argument, in source order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentToken {
    pub text: Vec<u8>,
    /// `None` when the argument came out of another expansion rather than a file
    pub file: Option<PathBuf>,
    pub span: Span,
}

/// One token of the body produced by the currently open expansion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpansionToken {
    pub text: Vec<u8>,
    pub object_id: u64,
    /// Category code, kept as an opaque tag
    pub category: u8,
    /// Expandable tokens stand in for a nested expansion logged later
    pub expandable: bool,
}

/// A typed trace line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceEvent {
    StartExpansion(StartExpansion),
    ArgumentToken(ArgumentToken),
    ExpansionToken(ExpansionToken),
    EndExpansion { object_id: u64, depth: usize },
    Unrecognized,
}

/// Classify one trace line, folding malformed lines into `Unrecognized`.
pub fn classify(line: &[u8]) -> TraceEvent {
    classify_checked(line).unwrap_or(TraceEvent::Unrecognized)
}

/// Classify one trace line.
///
/// Lines without a marker are `Ok(TraceEvent::Unrecognized)`. Lines with a
/// marker but a broken field are `Err`, so callers can report them.
pub fn classify_checked(line: &[u8]) -> Result<TraceEvent, MalformedLine> {
    let line = trim_line(line);

    if let Some(rest) = line.strip_prefix(START_MARKER) {
        parse_start(line, rest).map(TraceEvent::StartExpansion)
    } else if let Some(rest) = line.strip_prefix(ARGUMENT_MARKER) {
        parse_argument(rest).map(TraceEvent::ArgumentToken)
    } else if let Some(rest) = line.strip_prefix(EXPANSION_MARKER) {
        parse_expansion_token(rest).map(TraceEvent::ExpansionToken)
    } else if let Some(rest) = line.strip_prefix(END_MARKER) {
        parse_end(rest)
    } else {
        Ok(TraceEvent::Unrecognized)
    }
}

/// Strip leading ASCII whitespace and a trailing carriage return.
///
/// Trailing spaces are kept: a token line may end in meaningful whitespace.
fn trim_line(line: &[u8]) -> &[u8] {
    let start = line
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(line.len());
    let line = &line[start..];
    line.strip_suffix(b"\r").unwrap_or(line)
}

// Start of expansion. Control sequence: T_CS[\name]. (object ID: 1). Current expansion depth: 1.
// (If this was a literal control sequence ..., it appeared in FILE from line 2, col 1 to line 2, col 11).
fn parse_start(line: &[u8], rest: &[u8]) -> Result<StartExpansion, MalformedLine> {
    let bad = |field| MalformedLine {
        kind: LineKind::Start,
        field,
    };

    let after_label = after(rest, b"Control sequence: ").ok_or(bad("control sequence"))?;
    let open = find(after_label, b"[").ok_or(bad("control sequence"))?;
    let close = find(after_label, b"]. (object ID: ").ok_or(bad("control sequence"))?;
    if close <= open + 1 {
        return Err(bad("control sequence"));
    }
    let name = after_label[open + 1..close].to_vec();

    let mut cursor = Cursor::new(&after_label[close + b"]. (object ID: ".len()..]);
    let object_id = cursor.number().ok_or(bad("object id"))?;
    cursor.expect(b")").ok_or(bad("object id"))?;

    let (file, span) = match after(line, b"it appeared in ") {
        Some(location) => {
            let from = rfind(location, b" from line ").ok_or(bad("position"))?;
            let file = path_from_bytes(&location[..from]);
            let mut cursor = Cursor::new(&location[from + b" from line ".len()..]);
            let span = cursor
                .span(b", col ", b" to line ", b", col ")
                .ok_or(bad("position"))?;
            cursor.expect(b")").ok_or(bad("position"))?;
            (file, span)
        }
        None => (None, Span::default()),
    };

    Ok(StartExpansion {
        name,
        object_id,
        file,
        span,
    })
}

// Argument token: "{" (source file /path/to/main.tex, from line 2 col 13 to line 2 col 14).
fn parse_argument(rest: &[u8]) -> Result<ArgumentToken, MalformedLine> {
    let bad = |field| MalformedLine {
        kind: LineKind::Argument,
        field,
    };

    let rest = rest.strip_prefix(b" \"").ok_or(bad("text"))?;
    let text_end = rfind(rest, b"\" (source file ").ok_or(bad("text"))?;
    let text = rest[..text_end].to_vec();

    let location = &rest[text_end + b"\" (source file ".len()..];
    let from = rfind(location, b", from line ").ok_or(bad("position"))?;
    let file = path_from_bytes(&location[..from]);

    let mut cursor = Cursor::new(&location[from + b", from line ".len()..]);
    let span = cursor
        .span(b" col ", b" to line ", b" col ")
        .ok_or(bad("position"))?;
    cursor.expect(b")").ok_or(bad("position"))?;

    Ok(ArgumentToken { text, file, span })
}

// Expansion token: x (object ID 2). Category: 11. Expandable: false.
fn parse_expansion_token(rest: &[u8]) -> Result<ExpansionToken, MalformedLine> {
    let bad = |field| MalformedLine {
        kind: LineKind::Expansion,
        field,
    };

    let rest = rest.strip_prefix(b" ").ok_or(bad("text"))?;
    let text_end = rfind(rest, b" (object ID ").ok_or(bad("text"))?;
    let text = rest[..text_end].to_vec();

    let mut cursor = Cursor::new(&rest[text_end + b" (object ID ".len()..]);
    let object_id = cursor.number().ok_or(bad("object id"))?;
    cursor.expect(b")").ok_or(bad("object id"))?;

    let tail = cursor.rest();
    let category = after(tail, b"Category: ")
        .and_then(|c| Cursor::new(c).number())
        .ok_or(bad("category"))?;
    let expandable = match after(tail, b"Expandable: ") {
        Some(flag) if flag.starts_with(b"true") => true,
        Some(flag) if flag.starts_with(b"false") => false,
        _ => return Err(bad("expandable flag")),
    };

    Ok(ExpansionToken {
        text,
        object_id,
        category,
        expandable,
    })
}

// End of expansion (object ID: 1). Current expansion depth: 1. Expansion: x.
fn parse_end(rest: &[u8]) -> Result<TraceEvent, MalformedLine> {
    let bad = |field| MalformedLine {
        kind: LineKind::End,
        field,
    };

    let id_field = after(rest, b"(object ID: ").ok_or(bad("object id"))?;
    let mut cursor = Cursor::new(id_field);
    let object_id = cursor.number().ok_or(bad("object id"))?;
    cursor.expect(b")").ok_or(bad("object id"))?;

    let depth = match after(cursor.rest(), b"Current expansion depth: ") {
        Some(depth) => Cursor::new(depth).number().ok_or(bad("depth"))?,
        None => 0,
    };

    Ok(TraceEvent::EndExpansion { object_id, depth })
}

/// A blank path means "not anchored in any file".
fn path_from_bytes(bytes: &[u8]) -> Option<PathBuf> {
    let path = bytes.trim_ascii();
    if path.is_empty() {
        return None;
    }

    #[cfg(unix)]
    {
        use std::os::unix::ffi::OsStrExt;
        Some(PathBuf::from(std::ffi::OsStr::from_bytes(path)))
    }

    #[cfg(not(unix))]
    {
        Some(PathBuf::from(String::from_utf8_lossy(path).into_owned()))
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

fn rfind(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).rposition(|w| w == needle)
}

/// Bytes following the first occurrence of `needle`
fn after<'a>(haystack: &'a [u8], needle: &[u8]) -> Option<&'a [u8]> {
    find(haystack, needle).map(|i| &haystack[i + needle.len()..])
}

/// Forward-only reader over the fixed-format tail of a line
struct Cursor<'a> {
    rest: &'a [u8],
}

impl<'a> Cursor<'a> {
    fn new(rest: &'a [u8]) -> Self {
        Self { rest }
    }

    fn rest(&self) -> &'a [u8] {
        self.rest
    }

    fn expect(&mut self, literal: &[u8]) -> Option<()> {
        self.rest = self.rest.strip_prefix(literal)?;
        Some(())
    }

    fn number<T: std::str::FromStr>(&mut self) -> Option<T> {
        let len = self
            .rest
            .iter()
            .position(|b| !b.is_ascii_digit())
            .unwrap_or(self.rest.len());
        if len == 0 {
            return None;
        }
        let digits = std::str::from_utf8(&self.rest[..len]).ok()?;
        let value = digits.parse().ok()?;
        self.rest = &self.rest[len..];
        Some(value)
    }

    /// `L1 <col> C1 <to> L2 <col> C2`, with the separators given by the line shape
    fn span(&mut self, col: &[u8], to: &[u8], end_col: &[u8]) -> Option<Span> {
        let start_line = self.number()?;
        self.expect(col)?;
        let start_col = self.number()?;
        self.expect(to)?;
        let end_line = self.number()?;
        self.expect(end_col)?;
        let end_col = self.number()?;
        Some(Span::new(start_line, start_col, end_line, end_col))
    }
}
