//! Byte-level line classification.
//!
//! Every supported language uses `//` line comments and `/* */` block
//! comments; they differ only in whether block comments nest. Both grammars
//! are one state machine, [`Classifier`], parameterised by its block
//! comment [`Nesting`] policy:
//!
//! - [`CStyleClassifier`]: a single "inside block comment" flag
//! - [`NestedClassifier`]: a depth counter, so `/* /* */ */` is one comment
//!
//! Automata are fed one byte at a time through [`LineAutomaton`]. CR bytes
//! are dropped before they reach the automaton and LF bytes end a line.
//! [`LineCounter`] does that framing for a stream of chunks.
//!
//! # Classification rules
//!
//! - A line is Blank until a byte above 32 is seen.
//! - A printable byte outside any comment makes the line Code. If that byte
//!   is a `/` on a line with no code so far, the next byte may still turn
//!   it into a comment opener, and the line becomes Comment instead.
//! - `//` and `/*` make the line Comment unless real code precedes them.
//! - A printable byte inside a block comment makes a blank line Comment.
//! - Both bytes of an opener or closer are consumed together, so `/*/` does
//!   not close the comment it opens.
//! - Block comment state survives line ends. Line comment state does not.
//!
//! # Examples
//!
//! ```
//! use cloc_core::{Language, Stats};
//! use cloc_scanner::count_bytes;
//!
//! let stats = count_bytes(b"int x; // set\n\n/* doc */\n", Language::C);
//! assert_eq!(
//!     stats,
//!     Stats { blank: 1, comment: 1, code: 1, files: 1 }
//! );
//! ```

use cloc_core::{CommentStyle, Language, LineKind, Stats};

/// A per-grammar state machine mapping bytes to line classifications.
pub trait LineAutomaton {
    /// Clears all state, ready for a new file.
    fn reset(&mut self);

    /// Feeds one byte that is neither CR nor LF.
    fn consume(&mut self, byte: u8);

    /// Ends the current line and returns its classification.
    ///
    /// Only line-scoped state is cleared. An open block comment stays open.
    fn end_of_line(&mut self) -> LineKind;
}

/// How block comments open and close.
pub trait Nesting: Default {
    /// Whether `/*` inside a block comment opens another level.
    const NESTS: bool;

    /// Returns `true` while inside a block comment.
    fn inside(&self) -> bool;

    /// Handles a `/*`.
    fn open(&mut self);

    /// Handles a `*/` seen inside a block comment.
    fn close(&mut self);
}

/// Non-nesting block comments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Flat(bool);

impl Nesting for Flat {
    const NESTS: bool = false;

    #[inline]
    fn inside(&self) -> bool {
        self.0
    }

    #[inline]
    fn open(&mut self) {
        self.0 = true;
    }

    #[inline]
    fn close(&mut self) {
        self.0 = false;
    }
}

/// Nesting block comments.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Nested(u32);

impl Nesting for Nested {
    const NESTS: bool = true;

    #[inline]
    fn inside(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    fn open(&mut self) {
        self.0 = self.0.saturating_add(1);
    }

    #[inline]
    fn close(&mut self) {
        self.0 = self.0.saturating_sub(1);
    }
}

/// State that lives for one line.
#[derive(Debug, Clone, Copy, Default)]
struct LineState {
    kind: LineKind,
    previous: u8,
    in_line_comment: bool,
    /// The line is Code only because of a `/` that may start an opener.
    lone_opener: bool,
}

impl LineState {
    #[inline]
    fn enter_comment(&mut self) {
        if self.kind == LineKind::Blank || self.lone_opener {
            self.kind = LineKind::Comment;
        }
        self.previous = 0;
    }
}

/// The line classifier for `//` and `/* */` comment grammars.
#[derive(Debug, Clone, Default)]
pub struct Classifier<N> {
    line: LineState,
    block: N,
}

/// Classifier for grammars whose block comments do not nest.
pub type CStyleClassifier = Classifier<Flat>;

/// Classifier for grammars whose block comments nest.
pub type NestedClassifier = Classifier<Nested>;

impl<N: Nesting> Classifier<N> {
    /// Creates a classifier at the start of a file.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` while inside a block comment.
    #[inline]
    #[must_use]
    pub fn in_block_comment(&self) -> bool {
        self.block.inside()
    }
}

impl NestedClassifier {
    /// Returns the current block comment nesting depth.
    #[inline]
    #[must_use]
    pub const fn depth(&self) -> u32 {
        self.block.0
    }
}

impl<N: Nesting> LineAutomaton for Classifier<N> {
    fn reset(&mut self) {
        *self = Self::default();
    }

    #[inline]
    fn consume(&mut self, byte: u8) {
        let previous = self.line.previous;
        self.line.previous = byte;

        if self.line.in_line_comment {
            return;
        }

        if self.block.inside() {
            match (previous, byte) {
                (b'*', b'/') => {
                    self.block.close();
                    self.line.previous = 0;
                }
                (b'/', b'*') if N::NESTS => {
                    self.block.open();
                    self.line.previous = 0;
                }
                _ if byte > b' ' && self.line.kind == LineKind::Blank => {
                    self.line.kind = LineKind::Comment;
                }
                _ => {}
            }
            return;
        }

        match (previous, byte) {
            (b'/', b'/') => {
                self.line.enter_comment();
                self.line.in_line_comment = true;
            }
            (b'/', b'*') => {
                self.line.enter_comment();
                self.block.open();
            }
            _ if byte > b' ' => {
                self.line.lone_opener = byte == b'/' && self.line.kind != LineKind::Code;
                self.line.kind = LineKind::Code;
            }
            _ => {}
        }
    }

    #[inline]
    fn end_of_line(&mut self) -> LineKind {
        let kind = self.line.kind;
        self.line = LineState {
            previous: b'\n',
            ..LineState::default()
        };
        kind
    }
}

/// Streams one file's bytes, in any chunking, through an automaton.
///
/// CR bytes are dropped and LF bytes end a line. A final line without a
/// trailing LF is counted by [`finish`](Self::finish).
#[derive(Debug)]
pub struct LineCounter<'c, A> {
    automaton: &'c mut A,
    stats: Stats,
    last: Option<u8>,
}

impl<'c, A: LineAutomaton> LineCounter<'c, A> {
    /// Resets `automaton` and starts counting a new file.
    pub fn new(automaton: &'c mut A) -> Self {
        automaton.reset();
        Self {
            automaton,
            stats: Stats::for_file(),
            last: None,
        }
    }

    /// Feeds the next chunk of the file.
    #[inline]
    pub fn feed(&mut self, chunk: &[u8]) {
        for &byte in chunk {
            match byte {
                b'\r' => {}
                b'\n' => self.stats.record(self.automaton.end_of_line()),
                _ => self.automaton.consume(byte),
            }
        }
        if let Some(&byte) = chunk.last() {
            self.last = Some(byte);
        }
    }

    /// Accounts for an unterminated final line and returns the totals.
    #[must_use]
    pub fn finish(self) -> Stats {
        let mut stats = self.stats;
        if self.last.is_some_and(|byte| byte != b'\n') {
            stats.record(self.automaton.end_of_line());
        }
        stats
    }
}

/// Classifies an in-memory buffer as one file of the given language.
///
/// The returned statistics have `files == 1`.
#[must_use]
pub fn count_bytes(bytes: &[u8], language: Language) -> Stats {
    fn run<A: LineAutomaton + Default>(bytes: &[u8]) -> Stats {
        let mut automaton = A::default();
        let mut counter = LineCounter::new(&mut automaton);
        counter.feed(bytes);
        counter.finish()
    }

    match language.comment_style() {
        CommentStyle::CStyle => run::<CStyleClassifier>(bytes),
        CommentStyle::NestedCStyle => run::<NestedClassifier>(bytes),
    }
}
