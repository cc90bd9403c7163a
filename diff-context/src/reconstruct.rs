//! Rebuilds absolute new-file line numbers from a file's hunks and
//! classifies every line that survives into the new file.

use std::collections::BTreeSet;

use crate::types::{ChangeKind, ClassifiedLine, DiffLine, Hunk};

/// Maximum distance between a removed line (old numbering) and the added line
/// right after it (new numbering) for the pair to count as a modification.
pub const MODIFIED_LINE_DISTANCE: u32 = 3;

/// Classified lines plus line-number sets for one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reconstruction {
    pub lines: Vec<ClassifiedLine>,
    pub added: BTreeSet<u32>,
    pub modified: BTreeSet<u32>,
    pub removed: BTreeSet<u32>,
}

/// Walks `hunks` in order and assigns new-file positions.
///
/// Lines between hunks are not synthesized: when a hunk starts past the
/// current position the counter jumps to the hunk's `target_start`, leaving
/// a gap. Removed lines are tracked by their old-file number only.
///
/// After each hunk, an added line that immediately follows a removed line is
/// reclassified as [`ChangeKind::Modified`] when their positions differ by at
/// most `modified_distance`. This is positional only and may misfire on
/// unrelated neighbouring edits.
pub fn reconstruct(hunks: &[Hunk], modified_distance: u32) -> Reconstruction {
    let mut out = Reconstruction::default();
    let mut current_new_line: u32 = 1;

    for hunk in hunks {
        if current_new_line < hunk.target_start {
            current_new_line = hunk.target_start;
        }

        // New-file position assigned to each hunk line (None for removals).
        let mut positions: Vec<Option<u32>> = Vec::with_capacity(hunk.lines.len());
        // Index into `out.lines` for each added line, to reclassify in place.
        let mut slots: Vec<Option<usize>> = Vec::with_capacity(hunk.lines.len());

        for line in &hunk.lines {
            match line {
                DiffLine::Added { content, .. } => {
                    slots.push(Some(out.lines.len()));
                    positions.push(Some(current_new_line));
                    out.lines.push(ClassifiedLine {
                        line_number: current_new_line,
                        content: content.clone(),
                        kind: ChangeKind::Added,
                    });
                    out.added.insert(current_new_line);
                    current_new_line = current_new_line.saturating_add(1);
                }
                DiffLine::Removed { source_line, .. } => {
                    slots.push(None);
                    positions.push(None);
                    out.removed.insert(*source_line);
                }
                DiffLine::Context { content, .. } => {
                    slots.push(None);
                    positions.push(Some(current_new_line));
                    out.lines.push(ClassifiedLine {
                        line_number: current_new_line,
                        content: content.clone(),
                        kind: ChangeKind::Context,
                    });
                    current_new_line = current_new_line.saturating_add(1);
                }
            }
        }

        for i in 1..hunk.lines.len() {
            let DiffLine::Removed { source_line, .. } = &hunk.lines[i - 1] else {
                continue;
            };
            if !hunk.lines[i].is_added() {
                continue;
            }
            let (Some(added_pos), Some(slot)) = (positions[i], slots[i]) else {
                continue;
            };
            if added_pos.abs_diff(*source_line) <= modified_distance {
                out.lines[slot].kind = ChangeKind::Modified;
                out.added.remove(&added_pos);
                out.modified.insert(added_pos);
            }
        }
    }

    out.lines.sort_by_key(|l| l.line_number);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn hunk(source_start: u32, target_start: u32, body: &[(&str, &str)]) -> Hunk {
        let mut src = source_start;
        let mut dst = target_start;
        let mut lines = Vec::new();
        for (tag, text) in body {
            let content = text.to_string();
            match *tag {
                "+" => {
                    lines.push(DiffLine::Added {
                        target_line: dst,
                        content,
                    });
                    dst += 1;
                }
                "-" => {
                    lines.push(DiffLine::Removed {
                        source_line: src,
                        content,
                    });
                    src += 1;
                }
                _ => {
                    lines.push(DiffLine::Context {
                        source_line: src,
                        target_line: dst,
                        content,
                    });
                    src += 1;
                    dst += 1;
                }
            }
        }
        Hunk {
            source_start,
            source_length: src - source_start,
            target_start,
            target_length: dst - target_start,
            section_header: None,
            lines,
        }
    }

    fn numbers(r: &Reconstruction) -> Vec<(u32, ChangeKind)> {
        r.lines.iter().map(|l| (l.line_number, l.kind)).collect()
    }

    #[test]
    fn pure_insertion_numbers_are_contiguous() {
        let h = hunk(
            10,
            10,
            &[
                (" ", "a"),
                (" ", "b"),
                ("+", "new1"),
                ("+", "new2"),
                (" ", "c"),
                (" ", "d"),
                (" ", "e"),
            ],
        );
        let r = reconstruct(&[h], MODIFIED_LINE_DISTANCE);
        use ChangeKind::*;
        assert_eq!(
            numbers(&r),
            vec![
                (10, Context),
                (11, Context),
                (12, Added),
                (13, Added),
                (14, Context),
                (15, Context),
                (16, Context),
            ]
        );
        assert_eq!(r.added, BTreeSet::from([12, 13]));
        assert!(r.modified.is_empty() && r.removed.is_empty());
    }

    #[test]
    fn gap_between_hunks_is_not_filled() {
        let first = hunk(1, 1, &[(" ", "a"), ("+", "b")]);
        let second = hunk(20, 21, &[("-", "x"), (" ", "y")]);
        let r = reconstruct(&[first, second], MODIFIED_LINE_DISTANCE);
        let nums: Vec<u32> = r.lines.iter().map(|l| l.line_number).collect();
        assert_eq!(nums, vec![1, 2, 21]);
        assert_eq!(r.removed, BTreeSet::from([20]));
    }

    #[test]
    fn replacement_within_distance_is_modified() {
        // -100 / +103: distance 3
        let h = hunk(100, 103, &[("-", "old"), ("+", "new")]);
        let r = reconstruct(&[h], MODIFIED_LINE_DISTANCE);
        assert_eq!(numbers(&r), vec![(103, ChangeKind::Modified)]);
        assert_eq!(r.modified, BTreeSet::from([103]));
        assert!(r.added.is_empty());
        assert_eq!(r.removed, BTreeSet::from([100]));
    }

    #[test]
    fn replacement_past_distance_stays_added() {
        // -100 / +104: distance 4
        let h = hunk(100, 104, &[("-", "old"), ("+", "new")]);
        let r = reconstruct(&[h], MODIFIED_LINE_DISTANCE);
        assert_eq!(numbers(&r), vec![(104, ChangeKind::Added)]);
        assert!(r.modified.is_empty());
    }

    #[test]
    fn only_the_addition_right_after_a_removal_is_modified() {
        let h = hunk(
            5,
            5,
            &[("-", "a"), ("-", "b"), ("+", "A"), ("+", "B"), (" ", "c")],
        );
        let r = reconstruct(&[h], MODIFIED_LINE_DISTANCE);
        use ChangeKind::*;
        assert_eq!(numbers(&r), vec![(5, Modified), (6, Added), (7, Context)]);
        assert_eq!(r.removed, BTreeSet::from([5, 6]));
    }

    #[test]
    fn context_after_removal_is_never_modified() {
        let h = hunk(3, 3, &[("-", "gone"), (" ", "kept")]);
        let r = reconstruct(&[h], MODIFIED_LINE_DISTANCE);
        assert_eq!(numbers(&r), vec![(3, ChangeKind::Context)]);
    }

    #[test]
    fn threshold_is_configurable() {
        let h = hunk(100, 103, &[("-", "old"), ("+", "new")]);
        let r = reconstruct(&[h], 0);
        assert_eq!(numbers(&r), vec![(103, ChangeKind::Added)]);
    }
}
