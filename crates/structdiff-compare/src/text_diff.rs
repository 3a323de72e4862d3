//! Line diff of multi-line text values.
//!
//! Only the changed regions are kept, each padded with a few unchanged
//! context lines. Formatters print these in place of a wholesale
//! remove-and-add of a large string and mark the skipped spans between them.

use std::ops::Range;

use similar::{Change, ChangeTag, TextDiff};

/// The changed regions of a text value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineDiff {
    pub hunks: Vec<TextHunk>,
    /// Number of lines in the old text.
    pub old_lines: usize,
}

impl LineDiff {
    /// Returns `true` if the two texts are identical.
    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty()
    }
}

/// One changed region with its context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextHunk {
    /// Old-text lines this region spans, zero-based.
    pub old_range: Range<usize>,
    pub lines: Vec<DiffLine>,
}

/// A line of a region, tagged with the side it belongs to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiffLine {
    Context(String),
    Removed(String),
    Added(String),
}

impl From<Change<&str>> for DiffLine {
    fn from(change: Change<&str>) -> Self {
        let text = change.value().trim_end_matches('\n').to_string();
        match change.tag() {
            ChangeTag::Equal => Self::Context(text),
            ChangeTag::Delete => Self::Removed(text),
            ChangeTag::Insert => Self::Added(text),
        }
    }
}

/// Diff two texts line by line, keeping `context` unchanged lines around
/// each change.
///
/// Both texts are newline-terminated first, so a missing final newline on
/// one side is not reported as a change of the last line.
pub fn diff_text(old: &str, new: &str, context: usize) -> LineDiff {
    let old_text = format!("{old}\n");
    let new_text = format!("{new}\n");
    let diff = TextDiff::from_lines(old_text.as_str(), new_text.as_str());

    let hunks = diff
        .grouped_ops(context)
        .iter()
        .filter_map(|group| {
            let start = group.first()?.old_range().start;
            let end = group.last()?.old_range().end;
            let lines = group
                .iter()
                .flat_map(|op| diff.iter_changes(op))
                .map(DiffLine::from)
                .collect();
            Some(TextHunk {
                old_range: start..end,
                lines,
            })
        })
        .collect();

    LineDiff {
        hunks,
        old_lines: diff.old_slices().len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_texts() {
        let diff = diff_text("hello\nworld", "hello\nworld", 1);
        assert!(diff.is_empty());
        assert_eq!(diff.old_lines, 2);
    }

    #[test]
    fn changed_middle_line_keeps_one_line_of_context() {
        let diff = diff_text("line1\na\nline3", "line1\nb\nline3", 1);
        assert_eq!(diff.hunks.len(), 1);
        assert_eq!(diff.hunks[0].old_range, 0..3);
        assert_eq!(
            diff.hunks[0].lines,
            vec![
                DiffLine::Context("line1".into()),
                DiffLine::Removed("a".into()),
                DiffLine::Added("b".into()),
                DiffLine::Context("line3".into()),
            ]
        );
    }

    #[test]
    fn distant_changes_are_separate_regions() {
        let diff = diff_text("a\nb\nc\nd\ne\nf\ng\nh", "A\nb\nc\nd\ne\nf\ng\nH", 1);
        assert_eq!(diff.old_lines, 8);
        let ranges: Vec<_> = diff.hunks.iter().map(|h| h.old_range.clone()).collect();
        assert_eq!(ranges, vec![0..2, 6..8]);
    }

    #[test]
    fn appended_line_region_ends_at_old_end() {
        let diff = diff_text("one\ntwo", "one\ntwo\nthree", 1);
        assert_eq!(diff.hunks[0].old_range, 1..2);
        assert_eq!(
            diff.hunks[0].lines,
            vec![DiffLine::Context("two".into()), DiffLine::Added("three".into())]
        );
    }

    #[test]
    fn trailing_newline_difference_is_one_empty_line() {
        let diff = diff_text("one\ntwo", "one\ntwo\n", 0);
        assert_eq!(diff.hunks.len(), 1);
        assert_eq!(diff.hunks[0].lines, vec![DiffLine::Added(String::new())]);
    }
}
