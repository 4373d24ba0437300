//! Human-readable rendering of a diff report.
//!
//! Styling goes through [`Stylize`] so the same layout can be printed with
//! terminal colors or as plain text for pipes and tests.

use console::Style;
use lockdiff_core::{highlight, Change, DiffReport, HighlightedLine, Marker};
use std::fmt::Write;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Removed,
    Added,
}

impl From<Marker> for Tone {
    fn from(marker: Marker) -> Self {
        match marker {
            Marker::Removed => Tone::Removed,
            Marker::Added => Tone::Added,
        }
    }
}

pub trait Stylize {
    fn header(&self, text: &str) -> String;
    /// `strong` marks a token that differs between the two sides.
    fn paint(&self, text: &str, tone: Tone, strong: bool) -> String;
}

pub struct PlainStylizer;

impl Stylize for PlainStylizer {
    fn header(&self, text: &str) -> String {
        text.to_owned()
    }

    fn paint(&self, text: &str, _tone: Tone, _strong: bool) -> String {
        text.to_owned()
    }
}

pub struct ConsoleStylizer {
    header: Style,
    removed: Style,
    added: Style,
}

impl ConsoleStylizer {
    pub fn new() -> Self {
        Self {
            header: Style::new().cyan().bold().force_styling(true),
            removed: Style::new().red().force_styling(true),
            added: Style::new().green().force_styling(true),
        }
    }
}

impl Default for ConsoleStylizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Stylize for ConsoleStylizer {
    fn header(&self, text: &str) -> String {
        self.header.apply_to(text).to_string()
    }

    fn paint(&self, text: &str, tone: Tone, strong: bool) -> String {
        let base = match tone {
            Tone::Removed => &self.removed,
            Tone::Added => &self.added,
        };
        if strong {
            base.clone().bold().underlined().apply_to(text).to_string()
        } else {
            base.apply_to(text).to_string()
        }
    }
}

pub fn stylizer(color: bool) -> Box<dyn Stylize> {
    if color {
        Box::new(ConsoleStylizer::new())
    } else {
        Box::new(PlainStylizer)
    }
}

pub fn render_report(report: &DiffReport, style: &dyn Stylize) -> String {
    if report.is_empty() {
        return "no changes\n".to_owned();
    }

    let mut out = String::new();
    for hunk in &report.hunks {
        let _ = writeln!(out, "{}", style.header(&hunk.section.to_string()));
        for change in &hunk.changes {
            match change {
                Change::Removed { a } => {
                    push_plain(&mut out, style, Tone::Removed, a);
                }
                Change::Added { b } => {
                    push_plain(&mut out, style, Tone::Added, b);
                }
                Change::Modified { a, b } => {
                    let h = highlight(a, b);
                    push_highlighted(&mut out, style, &h.removed);
                    push_highlighted(&mut out, style, &h.added);
                }
            }
        }
    }
    out
}

fn marker_prefix(tone: Tone) -> &'static str {
    match tone {
        Tone::Removed => "  - ",
        Tone::Added => "  + ",
    }
}

fn push_plain(out: &mut String, style: &dyn Stylize, tone: Tone, repr: &str) {
    let _ = writeln!(
        out,
        "{}",
        style.paint(&format!("{}{repr}", marker_prefix(tone)), tone, false)
    );
}

fn push_highlighted(out: &mut String, style: &dyn Stylize, line: &HighlightedLine) {
    let tone = Tone::from(line.marker);
    out.push_str(&style.paint(marker_prefix(tone), tone, false));
    for segment in &line.segments {
        if segment.text.is_empty() {
            continue;
        }
        out.push_str(&style.paint(&segment.text, tone, segment.distinct));
    }
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use lockdiff_core::{Hunk, Section};

    /// Wraps distinct tokens in brackets so emphasis is visible in asserts.
    struct Brackets;

    impl Stylize for Brackets {
        fn header(&self, text: &str) -> String {
            format!("## {text}")
        }

        fn paint(&self, text: &str, _tone: Tone, strong: bool) -> String {
            if strong {
                format!("[{text}]")
            } else {
                text.to_owned()
            }
        }
    }

    fn report(section: Section, changes: Vec<Change>) -> DiffReport {
        DiffReport {
            hunks: vec![Hunk { section, changes }],
        }
    }

    #[test]
    fn empty_report_says_no_changes() {
        let out = render_report(&DiffReport::default(), &PlainStylizer);
        assert_eq!(out, "no changes\n");
    }

    #[test]
    fn removal_and_addition_lines() {
        let r = report(
            Section::Packages,
            vec![
                Change::Removed {
                    a: "node_modules/old: 1.0.0".into(),
                },
                Change::Added {
                    b: "node_modules/new: 2.0.0".into(),
                },
            ],
        );
        let out = render_report(&r, &PlainStylizer);
        assert_eq!(
            out,
            "packages\n  - node_modules/old: 1.0.0\n  + node_modules/new: 2.0.0\n"
        );
    }

    #[test]
    fn modification_emphasises_distinct_tokens() {
        let r = report(
            Section::Packages,
            vec![Change::Modified {
                a: "node_modules/foo: 1.2.3".into(),
                b: "node_modules/foo: 1.3.0".into(),
            }],
        );
        let out = render_report(&r, &Brackets);
        assert_eq!(
            out,
            "## packages\n  - node_modules/foo: [1.2.3]\n  + node_modules/foo: [1.3.0]\n"
        );
    }

    #[test]
    fn meta_hunk_header() {
        let r = report(
            Section::Meta,
            vec![Change::Modified {
                a: "lockfileVersion: 2".into(),
                b: "lockfileVersion: 3".into(),
            }],
        );
        let out = render_report(&r, &PlainStylizer);
        assert!(out.starts_with("meta\n"));
        assert!(out.contains("  - lockfileVersion: 2\n"));
        assert!(out.contains("  + lockfileVersion: 3\n"));
    }

    #[test]
    fn console_stylizer_emits_escape_codes() {
        let style = ConsoleStylizer::new();
        let painted = style.paint("1.3.0", Tone::Added, true);
        assert!(painted.contains("1.3.0"));
        assert!(painted.contains('\u{1b}'));
    }

    #[test]
    fn plain_stylizer_is_identity() {
        assert_eq!(PlainStylizer.paint("x", Tone::Removed, true), "x");
        assert_eq!(PlainStylizer.header("meta"), "meta");
    }
}
