//! Format-preserving source patching.
//!
//! A [`SourcePatch`] collects insertions and replacements against byte spans
//! of an immutable source string and applies them in one pass. Bytes outside
//! the edited spans are copied verbatim, so untouched code keeps its exact
//! formatting and comments.

use crate::error::{GenError, Result};

#[derive(Debug, Clone)]
struct Splice {
    start: u32,
    end: u32,
    text: String,
    seq: usize,
}

impl Splice {
    fn is_insert(&self) -> bool {
        self.start == self.end
    }
}

/// Pending edits against one source text.
///
/// Replacements may not overlap each other, and an insertion may not land
/// strictly inside a replaced range. Insertions at the same offset are
/// emitted in the order they were added.
///
/// # Example
///
/// ```
/// use vedit_gen::SourcePatch;
///
/// let source = r#"<p className="a">hi</p>"#;
/// let mut patch = SourcePatch::new(source);
/// patch.replace(13, 16, "\"b\"").unwrap();
/// patch.insert(16, " id=\"x\"").unwrap();
/// assert_eq!(patch.apply(), r#"<p className="b" id="x">hi</p>"#);
/// ```
#[derive(Debug, Clone)]
pub struct SourcePatch<'s> {
    source: &'s str,
    splices: Vec<Splice>,
}

impl<'s> SourcePatch<'s> {
    pub fn new(source: &'s str) -> Self {
        Self {
            source,
            splices: Vec::new(),
        }
    }

    pub fn source(&self) -> &'s str {
        self.source
    }

    pub fn is_empty(&self) -> bool {
        self.splices.is_empty()
    }

    pub fn len(&self) -> usize {
        self.splices.len()
    }

    /// Insert `text` at byte offset `at`.
    pub fn insert(&mut self, at: u32, text: impl Into<String>) -> Result<()> {
        self.push(at, at, text.into())
    }

    /// Replace bytes `start..end` with `text`.
    pub fn replace(&mut self, start: u32, end: u32, text: impl Into<String>) -> Result<()> {
        self.push(start, end, text.into())
    }

    /// Delete bytes `start..end`.
    pub fn remove(&mut self, start: u32, end: u32) -> Result<()> {
        self.push(start, end, String::new())
    }

    /// Whether a replacement over `start..end` would be accepted.
    pub fn can_replace(&self, start: u32, end: u32) -> bool {
        self.conflict(start, end).is_none()
    }

    fn push(&mut self, start: u32, end: u32, text: String) -> Result<()> {
        let len = self.source.len() as u32;
        if start > end
            || end > len
            || !self.source.is_char_boundary(start as usize)
            || !self.source.is_char_boundary(end as usize)
        {
            return Err(GenError::OutOfBounds { start, end, len });
        }

        if let Some(other) = self.conflict(start, end) {
            return Err(GenError::PatchConflict {
                start,
                end,
                other_start: other.start,
                other_end: other.end,
            });
        }

        let seq = self.splices.len();
        self.splices.push(Splice {
            start,
            end,
            text,
            seq,
        });
        Ok(())
    }

    fn conflict(&self, start: u32, end: u32) -> Option<&Splice> {
        self.splices.iter().find(|other| {
            if start == end {
                // Insertion: only conflicts when strictly inside a replacement
                !other.is_insert() && other.start < start && start < other.end
            } else if other.is_insert() {
                start < other.start && other.start < end
            } else {
                start < other.end && other.start < end
            }
        })
    }

    /// Produce the patched text.
    pub fn apply(mut self) -> String {
        // Insertions sort before a replacement starting at the same offset
        self.splices
            .sort_by(|a, b| (a.start, a.end, a.seq).cmp(&(b.start, b.end, b.seq)));

        let extra: usize = self.splices.iter().map(|s| s.text.len()).sum();
        let mut out = String::with_capacity(self.source.len() + extra);
        let mut cursor = 0usize;

        for splice in &self.splices {
            let start = splice.start as usize;
            if start > cursor {
                out.push_str(&self.source[cursor..start]);
            }
            out.push_str(&splice.text);
            cursor = cursor.max(splice.end as usize);
        }
        out.push_str(&self.source[cursor..]);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_insertions_keep_order_at_same_offset() {
        let mut patch = SourcePatch::new("{a}{b}");
        patch.insert(0, "<s>").unwrap();
        patch.insert(3, "</s>").unwrap();
        patch.insert(3, "<s>").unwrap();
        patch.insert(6, "</s>").unwrap();
        assert_eq!(patch.apply(), "<s>{a}</s><s>{b}</s>");
    }

    #[test]
    fn test_overlapping_replacements_rejected() {
        let mut patch = SourcePatch::new("abcdef");
        patch.replace(1, 4, "X").unwrap();
        let err = patch.replace(3, 5, "Y").unwrap_err();
        assert!(matches!(err, GenError::PatchConflict { .. }));
        // Adjacent ranges are fine
        patch.replace(4, 6, "Z").unwrap();
        assert_eq!(patch.apply(), "aXZ");
    }

    #[test]
    fn test_insert_inside_replacement_rejected() {
        let mut patch = SourcePatch::new("abcdef");
        patch.replace(1, 4, "X").unwrap();
        assert!(patch.insert(2, "!").is_err());
        assert!(patch.insert(1, "<").is_ok());
        assert!(patch.insert(4, ">").is_ok());
        assert_eq!(patch.apply(), "a<X>ef");
    }

    #[test]
    fn test_out_of_bounds() {
        let mut patch = SourcePatch::new("abc");
        assert!(matches!(
            patch.replace(2, 9, "x"),
            Err(GenError::OutOfBounds { .. })
        ));
        // Not a char boundary
        let mut patch = SourcePatch::new("é");
        assert!(patch.insert(1, "x").is_err());
    }

    #[test]
    fn test_remove() {
        let mut patch = SourcePatch::new("<a x-id=\"1\" b>");
        patch.remove(2, 11).unwrap();
        assert_eq!(patch.apply(), "<a b>");
    }

    proptest! {
        #[test]
        fn insertions_only_add_text(
            source in "[a-z\n ]{0,40}",
            inserts in proptest::collection::vec((0usize..41, "[A-Z]{1,3}"), 0..8),
        ) {
            let mut patch = SourcePatch::new(&source);
            let mut added = 0;
            for (at, text) in &inserts {
                let at = (*at).min(source.len()) as u32;
                patch.insert(at, text.clone()).unwrap();
                added += text.len();
            }
            let out = patch.apply();
            prop_assert_eq!(out.len(), source.len() + added);
            let kept: String = out.chars().filter(|c| !c.is_ascii_uppercase()).collect();
            prop_assert_eq!(kept, source);
        }
    }
}
