//! The shared depth-first walk over a change descriptor.
//!
//! Per mapping the walk emits removed entries, then added entries, then
//! updated entries, each group in key order. Sequences are walked in index
//! order (updated, then removed, then added, which is ascending for anything
//! the comparator produces) and gaps between rendered positions become an
//! [`Part::Elision`].

use serde_json::Value;
use structdiff_compare::{diff_text, Change, ChangeDescriptor, DescriptorKind, DiffLine};
use structdiff_types::{is_multiline_string, DiffKey};
use tracing::debug;

use crate::error::{FormatError, FormatResult};
use crate::part::{Marker, Part, RenderedDiff, Sink};

/// Context lines kept around each change of a multi-line string.
pub const TEXT_CONTEXT: usize = 1;

/// Translates walk parts into marked lines.
pub trait Formatter {
    /// Render one part. `key` is the entry the part belongs to, if any;
    /// `depth` is the nesting level of the part.
    fn output(
        &mut self,
        sink: &mut dyn Sink,
        marker: Marker,
        part: Part<'_>,
        key: Option<&DiffKey>,
        depth: usize,
    ) -> FormatResult<()>;

    /// Whether replaced multi-line strings should be shown as a line diff.
    fn supports_text_diff(&self) -> bool {
        false
    }

    /// Drop any state left by an earlier walk. Called before every walk.
    fn reset(&mut self) {}
}

/// Walk `descriptor`, rendering through `formatter` into `sink`.
///
/// Nothing reaches `sink` unless the whole render succeeds.
pub fn render<F: Formatter + ?Sized>(
    descriptor: &ChangeDescriptor,
    formatter: &mut F,
    sink: &mut dyn Sink,
) -> FormatResult<()> {
    let rendered = render_lines(descriptor, formatter)?;
    rendered.replay(sink);
    Ok(())
}

/// Walk `descriptor` and collect the rendered lines.
pub fn render_lines<F: Formatter + ?Sized>(
    descriptor: &ChangeDescriptor,
    formatter: &mut F,
) -> FormatResult<RenderedDiff> {
    formatter.reset();
    let mut out = RenderedDiff::new();
    if !descriptor.is_empty() {
        Walker {
            formatter,
            sink: &mut out,
        }
        .node(None, descriptor, 0)?;
    }
    debug!(lines = out.len(), "rendered change descriptor");
    Ok(out)
}

struct Walker<'a, F: Formatter + ?Sized> {
    formatter: &'a mut F,
    sink: &'a mut RenderedDiff,
}

impl<F: Formatter + ?Sized> Walker<'_, F> {
    fn emit(
        &mut self,
        marker: Marker,
        part: Part<'_>,
        key: Option<&DiffKey>,
        depth: usize,
    ) -> FormatResult<()> {
        self.formatter.output(&mut *self.sink, marker, part, key, depth)
    }

    fn node(
        &mut self,
        key: Option<&DiffKey>,
        descriptor: &ChangeDescriptor,
        depth: usize,
    ) -> FormatResult<()> {
        match descriptor.kind {
            DescriptorKind::Object => {
                self.emit(Marker::Context, Part::ObjectBegin, key, depth)?;
                self.object(descriptor, depth + 1)?;
                self.emit(Marker::Context, Part::ObjectEnd, key, depth)
            }
            DescriptorKind::Array => {
                self.emit(Marker::Context, Part::ArrayBegin, key, depth)?;
                self.array(descriptor, depth + 1)?;
                self.emit(Marker::Context, Part::ArrayEnd, key, depth)
            }
            DescriptorKind::None => self.replacement(key, descriptor, depth),
        }
    }

    fn replacement(
        &mut self,
        key: Option<&DiffKey>,
        descriptor: &ChangeDescriptor,
        depth: usize,
    ) -> FormatResult<()> {
        if !descriptor.updated.is_empty() {
            return Err(malformed(
                "update bucket on a descriptor without a type",
                descriptor,
            ));
        }

        if let (Some(old), Some(new)) = (
            descriptor.removed.get(&DiffKey::Anonymous),
            descriptor.added.get(&DiffKey::Anonymous),
        ) {
            if descriptor.len() == 2 {
                if let Some((old, new)) = self.text_change(old, new) {
                    return self.text(key, old, new, depth);
                }
            }
        }

        for (entry, value) in &descriptor.removed {
            let entry = if entry.is_anonymous() { key } else { Some(entry) };
            self.emit(Marker::Removed, Part::Leaf(value), entry, depth)?;
        }
        for (entry, value) in &descriptor.added {
            let entry = if entry.is_anonymous() { key } else { Some(entry) };
            self.emit(Marker::Added, Part::Leaf(value), entry, depth)?;
        }
        Ok(())
    }

    fn object(&mut self, descriptor: &ChangeDescriptor, depth: usize) -> FormatResult<()> {
        for (key, value) in &descriptor.removed {
            self.emit(Marker::Removed, Part::Leaf(value), Some(key), depth)?;
        }
        for (key, value) in &descriptor.added {
            self.emit(Marker::Added, Part::Leaf(value), Some(key), depth)?;
        }
        for (key, change) in &descriptor.updated {
            self.update(key, change, descriptor, depth)?;
        }
        Ok(())
    }

    fn array(&mut self, descriptor: &ChangeDescriptor, depth: usize) -> FormatResult<()> {
        let mut last: Option<usize> = None;

        for (key, change) in &descriptor.updated {
            let idx = index_of(key, descriptor)?;
            self.gap(last, idx, depth)?;
            self.update(key, change, descriptor, depth)?;
            last = Some(idx);
        }

        for (key, value) in &descriptor.removed {
            let idx = index_of(key, descriptor)?;
            self.gap(last, idx, depth)?;
            self.emit(Marker::Removed, Part::Leaf(value), Some(key), depth)?;
            last = Some(idx);
        }

        if let Some(first_added) = descriptor.added.keys().next() {
            let length = match descriptor.length {
                Some(length) => length,
                None => index_of(first_added, descriptor)?,
            };
            if next_index(last) < length {
                self.emit(Marker::Context, Part::Elision, None, depth)?;
            }
            for (key, value) in &descriptor.added {
                index_of(key, descriptor)?;
                self.emit(Marker::Added, Part::Leaf(value), Some(key), depth)?;
            }
        }
        Ok(())
    }

    fn gap(&mut self, last: Option<usize>, idx: usize, depth: usize) -> FormatResult<()> {
        if idx > next_index(last) {
            self.emit(Marker::Context, Part::Elision, None, depth)?;
        }
        Ok(())
    }

    fn update(
        &mut self,
        key: &DiffKey,
        change: &Change,
        parent: &ChangeDescriptor,
        depth: usize,
    ) -> FormatResult<()> {
        match change {
            Change::Nested(nested) => self.node(Some(key), nested, depth),
            Change::Value(new) => {
                let old = parent.original.get(key).ok_or_else(|| {
                    malformed(&format!("updated entry {key:?} has no original value"), parent)
                })?;
                if let Some((old, new)) = self.text_change(old, new) {
                    return self.text(Some(key), old, new, depth);
                }
                self.emit(Marker::Removed, Part::Leaf(old), Some(key), depth)?;
                self.emit(Marker::Added, Part::Leaf(new), Some(key), depth)
            }
        }
    }

    /// Both sides as text, when the pair should be shown as a line diff.
    fn text_change<'v>(&self, old: &'v Value, new: &'v Value) -> Option<(&'v str, &'v str)> {
        if !self.formatter.supports_text_diff()
            || !is_multiline_string(old)
            || !is_multiline_string(new)
        {
            return None;
        }
        Some((old.as_str()?, new.as_str()?))
    }

    fn text(
        &mut self,
        key: Option<&DiffKey>,
        old: &str,
        new: &str,
        depth: usize,
    ) -> FormatResult<()> {
        let diff = diff_text(old, new, TEXT_CONTEXT);

        self.emit(Marker::Context, Part::TextBegin, key, depth)?;
        let mut covered = 0usize;
        for hunk in &diff.hunks {
            if hunk.old_range.start > covered {
                self.emit(Marker::Context, Part::Elision, key, depth + 1)?;
            }
            for line in &hunk.lines {
                let (marker, text) = match line {
                    DiffLine::Context(text) => (Marker::Context, text),
                    DiffLine::Removed(text) => (Marker::Removed, text),
                    DiffLine::Added(text) => (Marker::Added, text),
                };
                self.emit(marker, Part::TextLine(text), key, depth + 1)?;
            }
            covered = hunk.old_range.end;
        }
        if covered < diff.old_lines {
            self.emit(Marker::Context, Part::Elision, key, depth + 1)?;
        }
        self.emit(Marker::Context, Part::TextEnd, key, depth)
    }
}

fn next_index(last: Option<usize>) -> usize {
    last.map_or(0, |idx| idx + 1)
}

fn index_of(key: &DiffKey, descriptor: &ChangeDescriptor) -> FormatResult<usize> {
    key.as_index()
        .ok_or_else(|| malformed(&format!("array entry with non-index key {key:?}"), descriptor))
}

fn malformed(reason: &str, descriptor: &ChangeDescriptor) -> FormatError {
    FormatError::MalformedDescriptor {
        reason: reason.to_string(),
        fragment: descriptor.to_value().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use structdiff_compare::{compare, CompareOptions};

    /// Records parts as compact strings.
    #[derive(Default)]
    struct Recorder {
        text: bool,
        resets: usize,
    }

    impl Formatter for Recorder {
        fn output(
            &mut self,
            sink: &mut dyn Sink,
            marker: Marker,
            part: Part<'_>,
            key: Option<&DiffKey>,
            depth: usize,
        ) -> FormatResult<()> {
            let key = key.map(ToString::to_string).unwrap_or_default();
            let part = match part {
                Part::ObjectBegin => "{".to_string(),
                Part::ObjectEnd => "}".to_string(),
                Part::ArrayBegin => "[".to_string(),
                Part::ArrayEnd => "]".to_string(),
                Part::Elision => "...".to_string(),
                Part::Leaf(value) => value.to_string(),
                Part::TextBegin => "<<".to_string(),
                Part::TextLine(line) => line.to_string(),
                Part::TextEnd => ">>".to_string(),
            };
            sink.emit(marker, &format!("{depth}|{key}|{part}"));
            Ok(())
        }

        fn supports_text_diff(&self) -> bool {
            self.text
        }

        fn reset(&mut self) {
            self.resets += 1;
        }
    }

    fn walk(old: Value, new: Value) -> Vec<String> {
        let d = compare(&old, &new, &CompareOptions::new());
        record(&d, false)
    }

    fn record(d: &ChangeDescriptor, text: bool) -> Vec<String> {
        let mut recorder = Recorder {
            text,
            ..Recorder::default()
        };
        render_lines(d, &mut recorder)
            .unwrap()
            .lines()
            .iter()
            .map(|(marker, line)| format!("{marker}{line}"))
            .collect()
    }

    #[test]
    fn empty_descriptor_renders_nothing() {
        assert!(walk(json!({"a": 1}), json!({"a": 1})).is_empty());
    }

    #[test]
    fn object_order_is_removed_added_updated() {
        let lines = walk(
            json!({"b": 1, "z": 1, "y": 1}),
            json!({"b": 2, "a": 1, "c": 1}),
        );
        assert_eq!(
            lines,
            vec![
                " 0||{", "-1|y|1", "-1|z|1", "+1|a|1", "+1|c|1", "-1|b|1", "+1|b|2", " 0||}",
            ]
        );
    }

    #[test]
    fn nested_descriptor_recurses_with_key() {
        let lines = walk(json!({"cfg": {"x": 1}}), json!({"cfg": {"x": 2}}));
        assert_eq!(
            lines,
            vec![" 0||{", " 1|cfg|{", "-2|x|1", "+2|x|2", " 1|cfg|}", " 0||}"]
        );
    }

    #[test]
    fn array_gap_becomes_elision() {
        let lines = walk(json!([1, 2, 3, 4]), json!([1, 9, 3, 8]));
        assert_eq!(
            lines,
            vec![
                " 0||[", " 1||...", "-1|1|2", "+1|1|9", " 1||...", "-1|3|4", "+1|3|8", " 0||]",
            ]
        );
    }

    #[test]
    fn consecutive_indices_have_no_elision() {
        let lines = walk(json!([1, 2]), json!([3, 4]));
        assert_eq!(
            lines,
            vec![" 0||[", "-1|0|1", "+1|0|3", "-1|1|2", "+1|1|4", " 0||]"]
        );
    }

    #[test]
    fn elision_before_appends_past_unchanged_tail() {
        let lines = walk(json!([1, 2, 3]), json!([1, 2, 3, 4]));
        assert_eq!(lines, vec![" 0||[", " 1||...", "+1|3|4", " 0||]"]);
    }

    #[test]
    fn no_elision_when_appends_follow_last_rendered() {
        let lines = walk(json!([1, 2]), json!([1, 5, 6]));
        assert_eq!(
            lines,
            vec![" 0||[", " 1||...", "-1|1|2", "+1|1|5", "+1|2|6", " 0||]"]
        );
    }

    #[test]
    fn removed_tail_after_update() {
        let lines = walk(json!([1, 2, 3]), json!([1, 9]));
        assert_eq!(
            lines,
            vec![" 0||[", " 1||...", "-1|1|2", "+1|1|9", "-1|2|3", " 0||]"]
        );
    }

    #[test]
    fn root_replacement() {
        let lines = walk(json!(1), json!("one"));
        assert_eq!(lines, vec!["-0||1", "+0||\"one\""]);
    }

    #[test]
    fn text_diff_only_when_supported() {
        let d = compare(
            &json!({"t": "a\nb\nc"}),
            &json!({"t": "a\nB\nc"}),
            &CompareOptions::new(),
        );
        assert_eq!(
            record(&d, true),
            vec![" 0||{", " 1|t|<<", " 2|t|a", "-2|t|b", "+2|t|B", " 2|t|c", " 1|t|>>", " 0||}"]
        );
        assert_eq!(record(&d, false)[1], "-1|t|\"a\\nb\\nc\"");
    }

    #[test]
    fn every_walk_starts_with_reset() {
        let d = compare(&json!({"a": 1}), &json!({"a": 2}), &CompareOptions::new());
        let mut recorder = Recorder::default();
        render_lines(&d, &mut recorder).unwrap();
        render_lines(&ChangeDescriptor::empty(), &mut recorder).unwrap();
        assert_eq!(recorder.resets, 2);
    }

    #[test]
    fn root_text_replacement_becomes_line_diff() {
        let d = compare(&json!("a\nb"), &json!("a\nc"), &CompareOptions::new());
        assert_eq!(
            record(&d, true),
            vec![" 0||<<", " 1||a", "-1||b", "+1||c", " 0||>>"]
        );
    }

    #[test]
    fn text_diff_elides_unchanged_lines() {
        let d = compare(
            &json!("1\n2\n3\n4\n5\n6\n7"),
            &json!("1\n2\n3\nX\n5\n6\n7"),
            &CompareOptions::new(),
        );
        assert_eq!(
            record(&d, true),
            vec![" 0||<<", " 1||...", " 1||3", "-1||4", "+1||X", " 1||5", " 1||...", " 0||>>"]
        );
    }

    #[test]
    fn update_under_untyped_descriptor_is_malformed() {
        let mut d = ChangeDescriptor::replacement(json!(1), json!(2));
        d.updated.insert(DiffKey::from("x"), Change::Value(json!(3)));
        let err = render_lines(&d, &mut Recorder::default()).unwrap_err();
        match err {
            FormatError::MalformedDescriptor { fragment, .. } => {
                assert!(fragment.contains("__update"));
            }
            other => panic!("expected MalformedDescriptor, got {:?}", other),
        }
    }

    #[test]
    fn update_without_original_is_malformed() {
        let mut d = ChangeDescriptor::new(DescriptorKind::Object);
        d.updated.insert(DiffKey::from("x"), Change::Value(json!(3)));
        assert!(matches!(
            render_lines(&d, &mut Recorder::default()),
            Err(FormatError::MalformedDescriptor { .. })
        ));
    }

    #[test]
    fn failed_render_leaves_sink_untouched() {
        let mut d = ChangeDescriptor::new(DescriptorKind::Object);
        d.removed.insert(DiffKey::from("a"), json!(1));
        d.updated.insert(DiffKey::from("x"), Change::Value(json!(3)));
        let mut sink = RenderedDiff::new();
        assert!(render(&d, &mut Recorder::default(), &mut sink).is_err());
        assert!(sink.is_empty());
    }
}
