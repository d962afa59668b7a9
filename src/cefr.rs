//! CEFR vocabulary analysis records and term highlighting.
//!
//! Highlighting rewrites the analysed text into annotation links
//! `[term](#cefr-LEVEL||meaning)` (target percent-encoded), which the inline
//! segmenter turns into hover spans.

use std::collections::HashMap;

use regex::{Captures, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::util::percent_encode;

/// One analysed word or expression.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CefrItem {
  #[serde(default)]
  pub field: String,
  pub word: String,
  /// Academic Word, Collocation, Idiom or Phrasal Verb.
  #[serde(default)]
  pub form: String,
  pub level: String,
  #[serde(default)]
  pub meaning: String,
  #[serde(default)]
  pub synonyms: String,
  #[serde(default)]
  pub antonyms: String,
}

impl CefrItem {
  /// Selected by level (`B2`) or by form (`idiom`, case-insensitive).
  pub fn is_selected(&self, selected: &[String]) -> bool {
    selected.iter().any(|s| {
      s.trim() == self.level.trim() || s.trim().eq_ignore_ascii_case(self.form.trim())
    })
  }
}

fn level_rank(level: &str) -> u8 {
  match level.trim().to_ascii_uppercase().as_str() {
    "C2" => 6,
    "C1" => 5,
    "B2" => 4,
    "B1" => 3,
    "A2" => 2,
    "A1" => 1,
    _ => 0,
  }
}

/// Table order: highest level first, then by field.
pub fn sort_for_table(items: &mut [CefrItem]) {
  items.sort_by(|a, b| {
    level_rank(&b.level)
      .cmp(&level_rank(&a.level))
      .then_with(|| a.field.cmp(&b.field))
  });
}

/// Drop items the model returned without a usable word or level.
pub fn clean_items(items: Vec<CefrItem>) -> Vec<CefrItem> {
  items
    .into_iter()
    .filter(|i| !i.word.trim().is_empty() && !i.level.trim().is_empty())
    .map(|mut i| {
      i.word = i.word.trim().to_string();
      i.level = i.level.trim().to_uppercase();
      i
    })
    .collect()
}

/// Wrap every whole-word, case-insensitive occurrence of a selected term in an
/// annotation link. Longer terms win over terms they contain.
pub fn highlight_terms(text: &str, items: &[CefrItem], selected: &[String]) -> String {
  let mut active: Vec<&CefrItem> = items
    .iter()
    .filter(|i| i.is_selected(selected))
    .filter(|i| !i.word.trim().is_empty() && !i.word.contains(['[', ']']))
    .collect();
  if active.is_empty() {
    return text.to_string();
  }
  active.sort_by(|a, b| b.word.chars().count().cmp(&a.word.chars().count()));

  let pattern = active
    .iter()
    .map(|i| regex::escape(i.word.trim()))
    .collect::<Vec<_>>()
    .join("|");
  let Ok(re) = RegexBuilder::new(&format!(r"\b(?:{pattern})\b"))
    .case_insensitive(true)
    .build()
  else {
    return text.to_string();
  };

  let mut by_word: HashMap<String, &CefrItem> = HashMap::new();
  for item in &active {
    by_word.entry(item.word.trim().to_lowercase()).or_insert(item);
  }

  re.replace_all(text, |caps: &Captures| {
    let matched = &caps[0];
    match by_word.get(&matched.to_lowercase()) {
      Some(item) => {
        let meaning = if item.meaning.trim().is_empty() { "No translation" } else { item.meaning.trim() };
        let target = percent_encode(&format!("{}||{}", item.level, meaning));
        format!("[{matched}](#cefr-{target})")
      }
      None => matched.to_string(),
    }
  })
  .into_owned()
}

#[cfg(test)]
mod tests {
  use super::*;

  fn item(word: &str, form: &str, level: &str, meaning: &str) -> CefrItem {
    CefrItem {
      field: String::new(),
      word: word.into(),
      form: form.into(),
      level: level.into(),
      meaning: meaning.into(),
      synonyms: String::new(),
      antonyms: String::new(),
    }
  }

  #[test]
  fn longest_term_wins_and_case_is_kept() {
    let items = vec![
      item("break", "Academic Word", "B1", "vỡ"),
      item("break a leg", "Idiom", "B2", "chúc may mắn"),
    ];
    let out = highlight_terms("Break a leg tonight, then take a break.", &items, &["B1".into(), "idiom".into()]);
    assert_eq!(
      out,
      format!(
        "[Break a leg](#cefr-{}) tonight, then take a [break](#cefr-B1%7C%7Cv%E1%BB%A1).",
        percent_encode("B2||chúc may mắn")
      )
    );
  }

  #[test]
  fn whole_words_only() {
    let items = vec![item("art", "Academic Word", "A2", "nghệ thuật")];
    let out = highlight_terms("Start the art class.", &items, &["A2".into()]);
    assert_eq!(out.matches("#cefr-").count(), 1);
    assert!(out.starts_with("Start the [art]"));
  }

  #[test]
  fn unselected_items_leave_text_alone() {
    let items = vec![item("ubiquitous", "Academic Word", "C1", "")];
    assert_eq!(highlight_terms("ubiquitous", &items, &["B1".into()]), "ubiquitous");
  }

  #[test]
  fn table_sorts_by_level_then_field() {
    let mut items = vec![
      CefrItem { field: "b".into(), ..item("x", "", "B1", "") },
      CefrItem { field: "a".into(), ..item("y", "", "C2", "") },
      CefrItem { field: "a".into(), ..item("z", "", "B1", "") },
    ];
    sort_for_table(&mut items);
    let words: Vec<_> = items.iter().map(|i| i.word.as_str()).collect();
    assert_eq!(words, ["y", "z", "x"]);
  }

  #[test]
  fn clean_drops_blank_words() {
    let items = clean_items(vec![item(" ", "", "B1", ""), item(" thrive ", "", "b2", "")]);
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].word, "thrive");
    assert_eq!(items[0].level, "B2");
  }
}
