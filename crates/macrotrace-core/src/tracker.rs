//! The expansion tracker: a single-pass state machine over trace events
//!
//! The engine expands depth-first, but the trace does not nest lexically: an
//! expandable token in one frame's body is logged as its own start/end pair
//! later on, often after the frame that produced it has already ended. The
//! tracker therefore keys everything on object ids. Each expandable body token
//! becomes a placeholder slot, queued under its object id; the next start line
//! for that id claims the slot, and when the claiming frame completes its
//! resolved text is written into the slot.
//!
//! A frame *completes* once it has ended and all of its placeholders are
//! filled. Completion of a nested frame fills its parent's slot (which may in
//! turn complete the parent); completion of a top-level frame emits an
//! [`Expansion`].

use crate::anchor::AnchorFilter;
use crate::classify::{
    ArgumentToken, ExpansionToken, LineKind, StartExpansion, TraceEvent, classify_checked,
};
use crate::report::{Expansion, TraceReport, TraceWarning, WarningKind};
use crate::span::{Span, resolve_span};
use crate::wrapper::WrapperFilter;
use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;
use tracing::{debug, trace};

/// What a pass reports and how it assembles text
#[derive(Debug, Clone)]
pub struct DetectConfig {
    pub anchor: AnchorFilter,
    pub wrappers: WrapperFilter,
}

impl DetectConfig {
    /// Report invocations anchored in any of `files`, with the default wrapper filter
    pub fn in_files(files: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            anchor: AnchorFilter::files(files),
            wrappers: WrapperFilter::default(),
        }
    }

    /// Report every anchored invocation, with the default wrapper filter
    pub fn any_file() -> Self {
        Self {
            anchor: AnchorFilter::AnyFile,
            wrappers: WrapperFilter::default(),
        }
    }

    pub fn wrappers(mut self, wrappers: WrapperFilter) -> Self {
        self.wrappers = wrappers;
        self
    }
}

/// Arena key of a frame, unique within one pass
type FrameKey = usize;

/// A placeholder slot in some frame's body
#[derive(Debug, Clone, Copy)]
struct SlotRef {
    frame: FrameKey,
    slot: usize,
}

#[derive(Debug)]
enum Slot {
    Literal(Vec<u8>),
    Placeholder { object_id: u64, text: Option<Vec<u8>> },
}

#[derive(Debug, Clone, Copy)]
enum Role {
    TopLevel,
    /// Nested under a pending id; `None` when the id was pending only because
    /// another nested frame for it was still open
    Nested(Option<SlotRef>),
}

#[derive(Debug)]
struct Frame {
    name: Vec<u8>,
    object_id: u64,
    declared: Span,
    file: Option<PathBuf>,
    arguments: Vec<ArgumentToken>,
    body: Vec<Slot>,
    role: Role,
    unfilled: usize,
    /// Position in end-line order, once ended
    closed: Option<usize>,
}

/// Consumes trace events in order and produces completed expansions
#[derive(Debug)]
pub struct ExpansionTracker {
    config: DetectConfig,
    frames: HashMap<FrameKey, Frame>,
    next_key: FrameKey,
    /// Open frames, oldest first; the last one is the current frame
    open: Vec<FrameKey>,
    /// Placeholder slots not yet claimed, per object id, oldest first
    waiting: HashMap<u64, VecDeque<SlotRef>>,
    /// Open nested frames per object id
    claimed: HashMap<u64, usize>,
    closed_count: usize,
    ready: VecDeque<Expansion>,
    report: TraceReport,
    finished: bool,
}

impl ExpansionTracker {
    pub fn new(config: DetectConfig) -> Self {
        Self {
            config,
            frames: HashMap::new(),
            next_key: 0,
            open: Vec::new(),
            waiting: HashMap::new(),
            claimed: HashMap::new(),
            closed_count: 0,
            ready: VecDeque::new(),
            report: TraceReport::default(),
            finished: false,
        }
    }

    /// Classify and process one raw trace line.
    pub fn process_line(&mut self, line: &[u8]) {
        self.report.stats.lines += 1;
        let line_no = self.report.stats.lines;

        match classify_checked(line) {
            Ok(TraceEvent::Unrecognized) => {}
            Ok(event) => {
                self.report.stats.events += 1;
                self.process_event(line_no, event);
            }
            Err(malformed) => {
                self.warn(
                    line_no,
                    WarningKind::MalformedLine(malformed.kind, malformed.field.to_string()),
                );
            }
        }
    }

    /// Process one event; `line_no` is only used for warnings.
    pub fn process_event(&mut self, line_no: usize, event: TraceEvent) {
        match event {
            TraceEvent::StartExpansion(start) => self.start(start),
            TraceEvent::ArgumentToken(argument) => self.argument(line_no, argument),
            TraceEvent::ExpansionToken(token) => self.token(line_no, token),
            TraceEvent::EndExpansion { object_id, .. } => self.end(line_no, object_id),
            TraceEvent::Unrecognized => {}
        }
    }

    /// Next completed expansion, in completion order
    pub fn pop_ready(&mut self) -> Option<Expansion> {
        self.ready.pop_front()
    }

    pub fn report(&self) -> &TraceReport {
        &self.report
    }

    pub fn into_report(self) -> TraceReport {
        self.report
    }

    fn start(&mut self, start: StartExpansion) {
        let id = start.object_id;
        let role = match self.claim_slot(id) {
            Some(slot) => Role::Nested(Some(slot)),
            None if self.claimed.get(&id).is_some_and(|&n| n > 0) => Role::Nested(None),
            None => Role::TopLevel,
        };
        if let Role::Nested(_) = role {
            *self.claimed.entry(id).or_default() += 1;
            self.report.stats.nested += 1;
        }

        let key = self.next_key;
        self.next_key += 1;
        trace!(
            key,
            object_id = id,
            name = %String::from_utf8_lossy(&start.name),
            ?role,
            "open frame"
        );

        self.frames.insert(
            key,
            Frame {
                name: start.name,
                object_id: id,
                declared: start.span,
                file: start.file,
                arguments: Vec::new(),
                body: Vec::new(),
                role,
                unfilled: 0,
                closed: None,
            },
        );
        self.open.push(key);
        self.report.stats.frames_opened += 1;
    }

    fn claim_slot(&mut self, id: u64) -> Option<SlotRef> {
        let queue = self.waiting.get_mut(&id)?;
        let slot = queue.pop_front();
        if queue.is_empty() {
            self.waiting.remove(&id);
        }
        slot
    }

    fn current_frame(&mut self) -> Option<&mut Frame> {
        let key = *self.open.last()?;
        self.frames.get_mut(&key)
    }

    fn argument(&mut self, line_no: usize, argument: ArgumentToken) {
        let warning = match self.current_frame() {
            None => Some(WarningKind::OrphanToken(LineKind::Argument)),
            Some(frame) if !frame.body.is_empty() => {
                Some(WarningKind::ArgumentAfterBody(frame.object_id))
            }
            Some(frame) => {
                frame.arguments.push(argument);
                None
            }
        };
        if let Some(kind) = warning {
            self.warn(line_no, kind);
        }
    }

    fn token(&mut self, line_no: usize, token: ExpansionToken) {
        let Some(&key) = self.open.last() else {
            self.warn(line_no, WarningKind::OrphanToken(LineKind::Expansion));
            return;
        };
        let Some(frame) = self.frames.get_mut(&key) else {
            return;
        };

        if token.expandable {
            let slot = SlotRef {
                frame: key,
                slot: frame.body.len(),
            };
            frame.body.push(Slot::Placeholder {
                object_id: token.object_id,
                text: None,
            });
            frame.unfilled += 1;
            self.waiting
                .entry(token.object_id)
                .or_default()
                .push_back(slot);
        } else {
            frame.body.push(Slot::Literal(token.text));
        }
    }

    fn end(&mut self, line_no: usize, object_id: u64) {
        let position = self.open.iter().rposition(|key| {
            self.frames
                .get(key)
                .is_some_and(|frame| frame.object_id == object_id)
        });
        let Some(position) = position else {
            self.warn(line_no, WarningKind::UnmatchedEnd(object_id));
            return;
        };
        let key = self.open.remove(position);

        let seq = self.closed_count;
        self.closed_count += 1;

        let Some(frame) = self.frames.get_mut(&key) else {
            return;
        };
        frame.closed = Some(seq);
        let nested = matches!(frame.role, Role::Nested(_));
        let complete = frame.unfilled == 0;
        trace!(key, object_id, unfilled = frame.unfilled, "close frame");

        if nested {
            self.release_claim(object_id);
        }
        if complete {
            if let Some((_, expansion)) = self.complete(key) {
                self.ready.push_back(expansion);
            }
        }
    }

    fn release_claim(&mut self, id: u64) {
        if let Some(count) = self.claimed.get_mut(&id) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                self.claimed.remove(&id);
            }
        }
    }

    /// Finish a frame whose body is fully resolved.
    ///
    /// Returns the expansion emitted by the cascade, if it reached a
    /// reportable top-level frame, tagged with that frame's end order.
    fn complete(&mut self, key: FrameKey) -> Option<(usize, Expansion)> {
        let mut key = key;
        loop {
            let frame = self.frames.remove(&key)?;
            let text = assemble(&frame.body, &self.config.wrappers);

            match frame.role {
                Role::TopLevel => return self.emit(frame, text),
                Role::Nested(None) => return None,
                Role::Nested(Some(target)) => {
                    let parent = self.frames.get_mut(&target.frame)?;
                    if let Some(Slot::Placeholder { text: slot, .. }) =
                        parent.body.get_mut(target.slot)
                    {
                        if slot.is_none() {
                            *slot = Some(text);
                            parent.unfilled -= 1;
                        }
                    }
                    if parent.closed.is_none() || parent.unfilled > 0 {
                        return None;
                    }
                    key = target.frame;
                }
            }
        }
    }

    fn emit(&mut self, frame: Frame, text: Vec<u8>) -> Option<(usize, Expansion)> {
        if !self.config.anchor.accepts(frame.file.as_deref()) {
            trace!(
                name = %String::from_utf8_lossy(&frame.name),
                file = ?frame.file,
                "dropping expansion outside files of interest"
            );
            self.report.stats.dropped_unanchored += 1;
            return None;
        }

        self.report.stats.emitted += 1;
        let span = resolve_span(frame.declared, &frame.arguments);
        Some((
            frame.closed.unwrap_or_default(),
            Expansion {
                name: frame.name,
                span,
                text,
            },
        ))
    }

    /// Handle end of input.
    ///
    /// Frames that never ended are discarded. Placeholders nobody will fill
    /// are resolved to empty text, which lets the frames waiting on them
    /// complete; those late expansions are queued in end-line order.
    pub fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;

        for key in std::mem::take(&mut self.open) {
            if let Some(frame) = self.frames.remove(&key) {
                self.warn(0, WarningKind::DanglingFrame(frame.object_id));
            }
        }
        self.waiting.clear();
        self.claimed.clear();

        // A nested frame always has a larger key than the frame whose slot it
        // claimed, so children are forced before their parents.
        let mut keys: Vec<FrameKey> = self.frames.keys().copied().collect();
        keys.sort_unstable_by(|a, b| b.cmp(a));

        let mut late = Vec::new();
        for key in keys {
            let Some(frame) = self.frames.get_mut(&key) else {
                continue;
            };
            let mut unresolved = Vec::new();
            for slot in &mut frame.body {
                if let Slot::Placeholder { object_id, text } = slot {
                    if text.is_none() {
                        *text = Some(Vec::new());
                        unresolved.push(*object_id);
                    }
                }
            }
            frame.unfilled = 0;

            for object_id in unresolved {
                self.warn(0, WarningKind::UnresolvedPlaceholder(object_id));
            }
            if let Some(expansion) = self.complete(key) {
                late.push(expansion);
            }
        }

        late.sort_by_key(|(seq, _)| *seq);
        self.ready.extend(late.into_iter().map(|(_, expansion)| expansion));
    }

    fn warn(&mut self, line: usize, kind: WarningKind) {
        debug!(line, %kind, "trace warning");
        self.report.warnings.push(TraceWarning { line, kind });
    }
}

/// Concatenate a resolved body, dropping wrapper tokens.
fn assemble(body: &[Slot], wrappers: &WrapperFilter) -> Vec<u8> {
    let mut out = Vec::new();
    for slot in body {
        let piece: &[u8] = match slot {
            Slot::Literal(text) if wrappers.is_wrapper(text) => continue,
            Slot::Literal(text) => text,
            Slot::Placeholder { text, .. } => text.as_deref().unwrap_or_default(),
        };
        push_piece(&mut out, piece);
    }
    out
}

/// Append a token's text, keeping a control word from absorbing following letters.
fn push_piece(out: &mut Vec<u8>, piece: &[u8]) {
    if piece.first().is_some_and(u8::is_ascii_alphabetic) && ends_with_control_word(out) {
        out.push(b' ');
    }
    out.extend_from_slice(piece);
}

/// Whether `text` ends in `\` followed by one or more letters (`@` included).
fn ends_with_control_word(text: &[u8]) -> bool {
    let letters = text
        .iter()
        .rev()
        .take_while(|b| b.is_ascii_alphabetic() || **b == b'@')
        .count();
    if letters == 0 || letters == text.len() {
        return false;
    }
    let before = &text[..text.len() - letters];
    let escapes = before.iter().rev().take_while(|b| **b == b'\\').count();
    escapes % 2 == 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> ExpansionTracker {
        ExpansionTracker::new(DetectConfig::in_files(["main.tex"]))
    }

    fn start(tracker: &mut ExpansionTracker, name: &str, id: u64, file: Option<&str>) {
        tracker.process_event(
            1,
            TraceEvent::StartExpansion(StartExpansion {
                name: name.as_bytes().to_vec(),
                object_id: id,
                file: file.map(PathBuf::from),
                span: Span::new(1, 1, 1, 1 + name.len()),
            }),
        );
    }

    fn token(tracker: &mut ExpansionTracker, text: &str, id: u64, expandable: bool) {
        tracker.process_event(
            1,
            TraceEvent::ExpansionToken(ExpansionToken {
                text: text.as_bytes().to_vec(),
                object_id: id,
                category: 11,
                expandable,
            }),
        );
    }

    fn end(tracker: &mut ExpansionTracker, id: u64) {
        tracker.process_event(
            1,
            TraceEvent::EndExpansion {
                object_id: id,
                depth: 1,
            },
        );
    }

    fn drain(tracker: &mut ExpansionTracker) -> Vec<String> {
        std::iter::from_fn(|| tracker.pop_ready())
            .map(|e| String::from_utf8_lossy(&e.text).into_owned())
            .collect()
    }

    #[test]
    fn test_control_word_detection() {
        assert!(ends_with_control_word(br"\mathbf"));
        assert!(ends_with_control_word(br"x\op@name"));
        assert!(!ends_with_control_word(br"\\ab"));
        assert!(ends_with_control_word(br"\\\ab"));
        assert!(!ends_with_control_word(b"abc"));
        assert!(!ends_with_control_word(br"\{"));
        assert!(!ends_with_control_word(b""));
    }

    #[test]
    fn test_push_piece_spacing() {
        let mut out = br"\mathbf".to_vec();
        push_piece(&mut out, b"x");
        assert_eq!(out, br"\mathbf x");

        let mut out = br"\operatorname".to_vec();
        push_piece(&mut out, b"{");
        assert_eq!(out, br"\operatorname{");
    }

    #[test]
    fn test_depth_first_nesting() {
        // The nested expansion is logged inside the outer one
        let mut t = tracker();
        start(&mut t, r"\outer", 1, Some("main.tex"));
        token(&mut t, "(", 2, false);
        token(&mut t, r"\inner", 3, true);
        start(&mut t, r"\inner", 3, None);
        token(&mut t, "z", 4, false);
        end(&mut t, 3);
        token(&mut t, ")", 5, false);
        end(&mut t, 1);
        t.finish();

        assert_eq!(drain(&mut t), vec!["(z)"]);
        assert!(t.report().is_clean());
        assert_eq!(t.report().stats.nested, 1);
    }

    #[test]
    fn test_repeated_placeholder_id_claims_in_order() {
        // The same token object appears twice in one body
        let mut t = tracker();
        start(&mut t, r"\twice", 1, Some("main.tex"));
        token(&mut t, r"\a", 2, true);
        token(&mut t, "+", 3, false);
        token(&mut t, r"\a", 2, true);
        end(&mut t, 1);
        start(&mut t, r"\a", 2, None);
        token(&mut t, "p", 4, false);
        end(&mut t, 2);
        assert!(t.pop_ready().is_none());
        start(&mut t, r"\a", 2, None);
        token(&mut t, "q", 5, false);
        end(&mut t, 2);

        assert_eq!(drain(&mut t), vec!["p+q"]);
    }

    #[test]
    fn test_cascading_completion() {
        let mut t = tracker();
        start(&mut t, r"\a", 1, Some("main.tex"));
        token(&mut t, r"\b", 2, true);
        end(&mut t, 1);
        start(&mut t, r"\b", 2, None);
        token(&mut t, "[", 3, false);
        token(&mut t, r"\c", 4, true);
        token(&mut t, "]", 5, false);
        end(&mut t, 2);
        assert!(t.pop_ready().is_none());
        start(&mut t, r"\c", 4, None);
        token(&mut t, "c", 6, false);
        end(&mut t, 4);

        assert_eq!(drain(&mut t), vec!["[c]"]);
        assert!(t.frames.is_empty());
    }

    #[test]
    fn test_end_closes_sibling_below_innermost() {
        // \b opens before \a ends, but they are unrelated invocations
        let mut t = tracker();
        start(&mut t, r"\a", 1, Some("main.tex"));
        token(&mut t, "a", 2, false);
        start(&mut t, r"\b", 5, Some("main.tex"));
        token(&mut t, "b", 6, false);
        end(&mut t, 1);
        assert_eq!(drain(&mut t), vec!["a"]);
        end(&mut t, 5);

        assert_eq!(drain(&mut t), vec!["b"]);
        assert!(t.report().is_clean());
        assert_eq!(t.report().stats.nested, 0);
    }

    #[test]
    fn test_end_out_of_order_with_claimed_placeholder() {
        let mut t = tracker();
        start(&mut t, r"\a", 1, Some("main.tex"));
        token(&mut t, "<", 2, false);
        token(&mut t, r"\b", 5, true);
        token(&mut t, ">", 3, false);
        start(&mut t, r"\b", 5, None);
        token(&mut t, "b", 6, false);
        end(&mut t, 1);
        assert!(t.pop_ready().is_none());
        end(&mut t, 5);

        assert_eq!(drain(&mut t), vec!["<b>"]);
        assert!(t.report().is_clean());
        assert_eq!(t.report().stats.nested, 1);
        assert!(t.frames.is_empty());
    }

    #[test]
    fn test_unanchored_arguments_recorded() {
        let lines: [&[u8]; 7] = [
            br"Start of expansion. Control sequence: T_CS[\outer]. (object ID: 1). Current expansion depth: 1. (If this was a literal control sequence in a file rather than from an expansion, it appeared in main.tex from line 3, col 1 to line 3, col 7).",
            br"Expansion token: \pair (object ID 2). Category: 16. Expandable: true.",
            br"End of expansion (object ID: 1). Current expansion depth: 1. Expansion: \pair{x}.",
            br"Start of expansion. Control sequence: T_CS[\pair]. (object ID: 2). Current expansion depth: 1. (If this was a literal control sequence in a file rather than from an expansion, it appeared in  from line 0, col 0 to line 0, col 0).",
            br#"Argument token: "{" (source file , from line 0 col 0 to line 0 col 0)."#,
            br"Expansion token: x (object ID 3). Category: 11. Expandable: false.",
            br"End of expansion (object ID: 2). Current expansion depth: 1. Expansion: x.",
        ];

        let mut t = tracker();
        for line in &lines[..5] {
            t.process_line(line);
        }
        assert!(t.frames.values().any(|f| f.arguments.len() == 1));
        for line in &lines[5..] {
            t.process_line(line);
        }

        let expansion = t.pop_ready().unwrap();
        assert_eq!(expansion.text, b"x");
        assert_eq!(expansion.span, Span::new(3, 1, 3, 7));
        assert!(t.report().is_clean(), "{:?}", t.report().warnings);
    }

    #[test]
    fn test_unmatched_end_warns() {
        let mut t = tracker();
        end(&mut t, 42);
        assert_eq!(
            t.report().warnings,
            vec![TraceWarning {
                line: 1,
                kind: WarningKind::UnmatchedEnd(42)
            }]
        );
    }

    #[test]
    fn test_orphan_token_warns() {
        let mut t = tracker();
        token(&mut t, "x", 1, false);
        assert_eq!(
            t.report().warnings[0].kind,
            WarningKind::OrphanToken(LineKind::Expansion)
        );
    }

    #[test]
    fn test_dangling_frame_discarded() {
        let mut t = tracker();
        start(&mut t, r"\never", 1, Some("main.tex"));
        token(&mut t, "x", 2, false);
        t.finish();
        assert!(t.pop_ready().is_none());
        assert_eq!(t.report().warnings[0].kind, WarningKind::DanglingFrame(1));
        assert!(t.frames.is_empty());
    }

    #[test]
    fn test_unresolved_placeholder_becomes_empty() {
        let mut t = tracker();
        start(&mut t, r"\outer", 1, Some("main.tex"));
        token(&mut t, "a", 2, false);
        token(&mut t, r"\ifmmode", 3, true);
        token(&mut t, "b", 4, false);
        end(&mut t, 1);
        assert!(t.pop_ready().is_none());
        t.finish();

        assert_eq!(drain(&mut t), vec!["ab"]);
        assert_eq!(
            t.report().warnings[0].kind,
            WarningKind::UnresolvedPlaceholder(3)
        );
    }

    #[test]
    fn test_finish_keeps_text_of_closed_children() {
        // The child ends but waits on its own unresolvable placeholder
        let mut t = tracker();
        start(&mut t, r"\outer", 1, Some("main.tex"));
        token(&mut t, r"\mid", 2, true);
        end(&mut t, 1);
        start(&mut t, r"\mid", 2, None);
        token(&mut t, "m", 3, false);
        token(&mut t, r"\gone", 4, true);
        end(&mut t, 2);
        t.finish();

        assert_eq!(drain(&mut t), vec!["m"]);
    }

    #[test]
    fn test_finish_emits_in_end_order() {
        let mut t = tracker();
        start(&mut t, r"\first", 1, Some("main.tex"));
        token(&mut t, "1", 2, false);
        token(&mut t, r"\x", 3, true);
        end(&mut t, 1);
        start(&mut t, r"\second", 4, Some("main.tex"));
        token(&mut t, "2", 5, false);
        token(&mut t, r"\y", 6, true);
        end(&mut t, 4);
        t.finish();

        assert_eq!(drain(&mut t), vec!["1", "2"]);
    }

    #[test]
    fn test_reentrant_start_of_claimed_id_is_nested() {
        let mut t = tracker();
        start(&mut t, r"\outer", 1, Some("main.tex"));
        token(&mut t, r"\rec", 2, true);
        end(&mut t, 1);
        start(&mut t, r"\rec", 2, Some("main.tex"));
        start(&mut t, r"\rec", 2, Some("main.tex"));
        token(&mut t, "r", 3, false);
        end(&mut t, 2);
        token(&mut t, "s", 4, false);
        end(&mut t, 2);

        assert_eq!(drain(&mut t), vec!["s"]);
        assert_eq!(t.report().stats.nested, 2);
    }

    #[test]
    fn test_argument_after_body_ignored() {
        let mut t = tracker();
        start(&mut t, r"\m", 1, Some("main.tex"));
        token(&mut t, "x", 2, false);
        t.process_event(
            9,
            TraceEvent::ArgumentToken(ArgumentToken {
                text: b"y".to_vec(),
                file: Some(PathBuf::from("main.tex")),
                span: Span::new(1, 5, 1, 6),
            }),
        );
        end(&mut t, 1);

        let expansion = t.pop_ready().unwrap();
        assert_eq!(expansion.span, Span::new(1, 1, 1, 3));
        assert_eq!(
            t.report().warnings,
            vec![TraceWarning {
                line: 9,
                kind: WarningKind::ArgumentAfterBody(1)
            }]
        );
    }

    #[test]
    fn test_unanchored_top_level_dropped() {
        let mut t = tracker();
        start(&mut t, r"\pkg", 1, Some("/texmf/pkg.sty"));
        token(&mut t, "x", 2, false);
        end(&mut t, 1);
        start(&mut t, r"\anon", 3, None);
        token(&mut t, "y", 4, false);
        end(&mut t, 3);

        assert!(t.pop_ready().is_none());
        assert_eq!(t.report().stats.dropped_unanchored, 2);
        assert_eq!(t.report().stats.emitted, 0);
    }

    #[test]
    fn test_finish_is_idempotent() {
        let mut t = tracker();
        start(&mut t, r"\never", 1, Some("main.tex"));
        t.finish();
        t.finish();
        assert_eq!(t.report().warnings.len(), 1);
    }
}
