use std::collections::BTreeSet;

use diff_context::{ChangeKind, parse_diff_with_line_numbers};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn single_file(hunks: &str) -> String {
    format!("diff --git a/src/lib.rs b/src/lib.rs\n--- a/src/lib.rs\n+++ b/src/lib.rs\n{hunks}")
}

#[test]
fn injected_lines_inside_declared_hunk() {
    let diff = single_file(
        "@@ -10,5 +10,7 @@\n one\n two\n+inserted a\n+inserted b\n three\n four\n five\n",
    );
    let all = parse_diff_with_line_numbers(&diff);
    let ctx = &all["src/lib.rs"];

    let got: Vec<(u32, ChangeKind)> = ctx.lines.iter().map(|l| (l.line_number, l.kind)).collect();
    use ChangeKind::*;
    assert_eq!(
        got,
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
}

#[test]
fn parsing_is_idempotent() {
    let diff = single_file("@@ -1,2 +1,2 @@\n-a\n+b\n c\n@@ -9 +9,2 @@\n x\n+y\n");
    let first = parse_diff_with_line_numbers(&diff);
    let second = parse_diff_with_line_numbers(&diff);
    assert_eq!(
        first["src/lib.rs"].context_text,
        second["src/lib.rs"].context_text
    );
    assert_eq!(first, second);
}

#[test]
fn modified_heuristic_boundary() {
    let far = single_file("@@ -100 +104 @@\n-old\n+new\n");
    let ctx = &parse_diff_with_line_numbers(&far)["src/lib.rs"];
    assert_eq!(ctx.lines[0].kind, ChangeKind::Added);
    assert!(ctx.modified.is_empty());

    let near = single_file("@@ -100 +103 @@\n-old\n+new\n");
    let ctx = &parse_diff_with_line_numbers(&near)["src/lib.rs"];
    assert_eq!(ctx.lines[0].kind, ChangeKind::Modified);
    assert_eq!(ctx.modified, BTreeSet::from([103]));
    assert!(ctx.context_text.contains("~  103: new"));
}

#[test]
fn pure_deletion_leaves_no_classified_line() {
    let diff = single_file("@@ -4,3 +4,2 @@\n keep\n-drop\n keep too\n");
    let ctx = &parse_diff_with_line_numbers(&diff)["src/lib.rs"];
    assert_eq!(ctx.removed, BTreeSet::from([5]));
    assert!(ctx.lines.iter().all(|l| l.content != "drop"));
    assert_eq!(
        ctx.lines.iter().map(|l| l.line_number).collect::<Vec<_>>(),
        vec![4, 5]
    );
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Add,
    Remove,
    Keep,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![Just(Op::Add), Just(Op::Remove), Just(Op::Keep)]
}

/// Builds a well-formed single-file diff; returns the text, the expected
/// new-file numbers of kept/added lines, and the number of removals.
fn render(hunks: &[(u32, Vec<Op>)]) -> (String, Vec<u32>, usize) {
    let mut body = String::new();
    let mut expected = Vec::new();
    let mut removals = 0;
    let (mut old_pos, mut new_pos) = (1u32, 1u32);
    let mut serial = 0u32;

    for (gap, ops) in hunks {
        old_pos += gap;
        new_pos += gap;
        let src_len = ops.iter().filter(|o| !matches!(o, Op::Add)).count() as u32;
        let dst_len = ops.iter().filter(|o| !matches!(o, Op::Remove)).count() as u32;
        body.push_str(&format!("@@ -{old_pos},{src_len} +{new_pos},{dst_len} @@\n"));
        let mut cursor = new_pos;
        for o in ops {
            serial += 1;
            match o {
                Op::Add => {
                    body.push_str(&format!("+added {serial}\n"));
                    expected.push(cursor);
                    cursor += 1;
                }
                Op::Remove => {
                    body.push_str(&format!("-removed {serial}\n"));
                    removals += 1;
                }
                Op::Keep => {
                    body.push_str(&format!(" kept {serial}\n"));
                    expected.push(cursor);
                    cursor += 1;
                }
            }
        }
        old_pos += src_len;
        new_pos += dst_len;
    }
    (single_file(&body), expected, removals)
}

proptest! {
    #[test]
    fn classified_lines_follow_hunk_positions(
        hunks in prop::collection::vec((0u32..6, prop::collection::vec(op(), 1..12)), 1..6)
    ) {
        let (diff, expected, removals) = render(&hunks);
        let all = parse_diff_with_line_numbers(&diff);
        let ctx = &all["src/lib.rs"];

        let numbers: Vec<u32> = ctx.lines.iter().map(|l| l.line_number).collect();
        prop_assert!(numbers.windows(2).all(|w| w[0] < w[1]));
        prop_assert_eq!(&numbers, &expected);

        prop_assert_eq!(ctx.removed.len(), removals);
        prop_assert!(ctx.lines.iter().all(|l| !l.content.starts_with("removed")));

        let present: BTreeSet<u32> = numbers.iter().copied().collect();
        prop_assert!(ctx.added.is_subset(&present));
        prop_assert!(ctx.modified.is_subset(&present));
        prop_assert!(ctx.added.is_disjoint(&ctx.modified));
        for l in &ctx.lines {
            if l.content.starts_with("kept") {
                prop_assert_eq!(l.kind, ChangeKind::Context);
            }
        }
    }
}
