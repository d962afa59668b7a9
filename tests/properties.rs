//! Property-based tests for the formatting pipeline.

use proptest::prelude::*;

use testsmith::format::answer_key::parse_answer_entries;
use testsmith::format::columns::column_count;
use testsmith::format::lines::{classify_line, mark_correct, ClassifierState};
use testsmith::format::spans::segment_line;
use testsmith::format::{format_content, AnswerKeyMap, ClassifiedLine, SpanKind, SpanRole, Tone};

fn word() -> impl Strategy<Value = String> {
    "[a-z]{1,8}"
}

/// Every well-formed entry survives extraction, paired with its number, and
/// reassembly lists them in ascending order.
#[test]
fn proptest_answer_key_round_trip() {
    proptest!(|(entries in prop::collection::btree_map(1u32..200, word(), 1..15))| {
        let key_text = entries
            .iter()
            .rev()
            .map(|(n, v)| format!("{n}: {v}"))
            .collect::<Vec<_>>()
            .join(", ");
        let raw = format!("Question 1. Something.\n\n**Answer Key:** {key_text}");
        let out = format_content(&raw);

        prop_assert_eq!(out.answer_key.len(), entries.len());
        for (n, v) in &entries {
            prop_assert_eq!(out.answer_key.get(*n), Some(v.as_str()));
        }
        let numbers: Vec<u32> = out.answer_key.iter().map(|(n, _)| n).collect();
        prop_assert_eq!(numbers, entries.keys().copied().collect::<Vec<_>>());

        let reparsed = parse_answer_entries(&out.answer_key.render());
        prop_assert_eq!(reparsed, out.answer_key.clone());
    });
}

/// Canonical headers pass through the classifier unchanged.
#[test]
fn proptest_canonical_header_is_fixed_point() {
    proptest!(|(n in 1u32..500, words in prop::collection::vec(word(), 1..6))| {
        let line = format!("Question {n}. {}", words.join(" "));
        let (state, classified) = classify_line(ClassifierState::default(), &line, &AnswerKeyMap::default());
        let classified = classified.expect("kept");
        let is_header = matches!(classified, ClassifiedLine::QuestionHeader { number, .. } if number == n);
        prop_assert!(is_header);
        prop_assert_eq!(classified.to_text(), line);
        prop_assert_eq!(state.current_question, Some(n));
    });
}

/// Injection marks exactly the answer's marker, once.
#[test]
fn proptest_correct_marker_injected_once() {
    proptest!(|(letter in prop::sample::select(vec!['A', 'B', 'C', 'D']), texts in prop::collection::vec(word(), 4))| {
        let line = format!("A. {} B. {} C. {} D. {}", texts[0], texts[1], texts[2], texts[3]);
        let marked = mark_correct(&line, letter);

        prop_assert_eq!(marked.matches('*').count(), 1);
        let marker = format!("{letter}.");
        prop_assert_eq!(marked.replacen(&format!("*{marker}"), &marker, 1), line.clone());
        prop_assert_eq!(mark_correct(&marked, letter), marked.clone());
    });
}

#[test]
fn column_thresholds_are_strict() {
    assert_eq!(column_count(10), 4);
    assert_eq!(column_count(20), 2);
    assert_eq!(column_count(40), 1);
    assert_eq!(column_count(18), 4);
    assert_eq!(column_count(35), 2);
    assert_eq!(column_count(19), 2);
    assert_eq!(column_count(36), 1);
}

#[test]
fn proptest_columns_never_increase_with_length() {
    proptest!(|(a in 0usize..100, b in 0usize..100)| {
        let (short, long) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(column_count(long) <= column_count(short));
    });
}

/// Only the first emphasis span on a dialogue line is the speaker name.
#[test]
fn proptest_speaker_name_styled_once() {
    proptest!(|(marker in prop::sample::select(vec!['a', 'b', 'c', 'd', 'e']), name in "[A-Z][a-z]{1,8}", other in word())| {
        let line = format!("{marker}. **{name}**: I really like **{other}** today.");
        let spans = segment_line(&line);
        let emphasis: Vec<_> = spans.iter().filter(|s| s.kind == SpanKind::Emphasis).collect();

        prop_assert_eq!(emphasis.len(), 2);
        prop_assert_eq!(emphasis[0].role, Some(SpanRole::SpeakerName));
        prop_assert_eq!(emphasis[0].style().tone, Tone::Accent);
        prop_assert_eq!(emphasis[1].role, None);
        prop_assert!(emphasis[1].style().bold);
        prop_assert_eq!(emphasis[1].style().tone, Tone::Inherit);
    });
}
