//! Token-level classification of a modified entry.
//!
//! Both canonical lines are split on runs of `:`, `(`, `)`, `,` and space,
//! keeping the delimiter runs as tokens, and compared position by position.
//! The alignment is by index only: a token inserted near the start of a
//! line marks everything after it as distinct. Renderers decide how to
//! decorate the two classes.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

fn delimiter_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[:(), ]+").expect("valid delimiter regex"))
}

/// Split `line` into alternating text and delimiter tokens.
///
/// Concatenating the tokens gives back `line`. A line that starts or ends
/// with a delimiter yields an empty leading or trailing text token, so two
/// lines with the same shape always align.
pub fn tokenize(line: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    let mut last = 0;
    for m in delimiter_regex().find_iter(line) {
        tokens.push(&line[last..m.start()]);
        tokens.push(m.as_str());
        last = m.end();
    }
    tokens.push(&line[last..]);
    tokens
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Marker {
    Removed,
    Added,
}

impl Marker {
    pub fn symbol(self) -> char {
        match self {
            Marker::Removed => '-',
            Marker::Added => '+',
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment {
    pub text: String,
    pub distinct: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HighlightedLine {
    pub marker: Marker,
    pub segments: Vec<Segment>,
}

impl HighlightedLine {
    /// The line text without classification.
    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    /// Non-empty tokens marked distinct, in order.
    pub fn distinct_tokens(&self) -> Vec<&str> {
        self.segments
            .iter()
            .filter(|s| s.distinct && !s.text.is_empty())
            .map(|s| s.text.as_str())
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Highlight {
    pub removed: HighlightedLine,
    pub added: HighlightedLine,
}

/// Classify the tokens of `old` and `new` as common or distinct.
pub fn highlight(old: &str, new: &str) -> Highlight {
    let old_tokens = tokenize(old);
    let new_tokens = tokenize(new);

    Highlight {
        removed: classify(Marker::Removed, &old_tokens, &new_tokens),
        added: classify(Marker::Added, &new_tokens, &old_tokens),
    }
}

fn classify(marker: Marker, tokens: &[&str], other: &[&str]) -> HighlightedLine {
    let segments = tokens
        .iter()
        .enumerate()
        .map(|(i, token)| Segment {
            text: (*token).to_owned(),
            distinct: other.get(i) != Some(token),
        })
        .collect();
    HighlightedLine { marker, segments }
}
