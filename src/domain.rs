//! Domain models: test categories, level systems and the per-category section.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A tab in the UI. The first seven produce test sections; the last three are tools.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
  Vocabulary,
  WordList,
  Grammar,
  Reading,
  Rewriting,
  Arrangement,
  Communication,
  Dictionary,
  Translate,
  #[serde(rename = "CEFR Check")]
  CefrCheck,
}

impl Category {
  pub const ALL: [Category; 10] = [
    Category::Vocabulary,
    Category::WordList,
    Category::Grammar,
    Category::Reading,
    Category::Rewriting,
    Category::Arrangement,
    Category::Communication,
    Category::Dictionary,
    Category::Translate,
    Category::CefrCheck,
  ];

  /// Section order in the exported document, independent of tab order.
  pub const EXPORT_ORDER: [Category; 7] = [
    Category::Vocabulary,
    Category::WordList,
    Category::Grammar,
    Category::Communication,
    Category::Reading,
    Category::Rewriting,
    Category::Arrangement,
  ];

  pub fn is_utility(self) -> bool {
    matches!(self, Category::Dictionary | Category::Translate | Category::CefrCheck)
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Category::Vocabulary => "Vocabulary",
      Category::WordList => "WordList",
      Category::Grammar => "Grammar",
      Category::Reading => "Reading",
      Category::Rewriting => "Rewriting",
      Category::Arrangement => "Arrangement",
      Category::Communication => "Communication",
      Category::Dictionary => "Dictionary",
      Category::Translate => "Translate",
      Category::CefrCheck => "CEFR Check",
    }
  }

  /// Stable short id of the section slot.
  pub fn section_id(self) -> &'static str {
    match self {
      Category::Vocabulary => "vocab",
      Category::WordList => "wordlist",
      Category::Grammar => "grammar",
      Category::Reading => "reading",
      Category::Rewriting => "rewriting",
      Category::Arrangement => "arrangement",
      Category::Communication => "communication",
      Category::Dictionary => "dict",
      Category::Translate => "trans",
      Category::CefrCheck => "cefr",
    }
  }

  /// Accepts the display name or the section id, case-insensitively.
  pub fn parse(s: &str) -> Option<Category> {
    let s = s.trim();
    Category::ALL
      .into_iter()
      .find(|c| c.as_str().eq_ignore_ascii_case(s) || c.section_id().eq_ignore_ascii_case(s))
  }
}

impl fmt::Display for Category {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum LevelSystem {
  #[serde(rename = "Global Success")]
  GlobalSuccess,
  #[serde(rename = "CEFR")]
  Cefr,
  #[serde(rename = "IELTS")]
  Ielts,
  #[serde(rename = "TOEFL")]
  Toefl,
  #[serde(rename = "TOEIC")]
  Toeic,
}

impl LevelSystem {
  pub const ALL: [LevelSystem; 5] = [
    LevelSystem::GlobalSuccess,
    LevelSystem::Cefr,
    LevelSystem::Ielts,
    LevelSystem::Toefl,
    LevelSystem::Toeic,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      LevelSystem::GlobalSuccess => "Global Success",
      LevelSystem::Cefr => "CEFR",
      LevelSystem::Ielts => "IELTS",
      LevelSystem::Toefl => "TOEFL",
      LevelSystem::Toeic => "TOEIC",
    }
  }

  pub fn sub_levels(self) -> &'static [&'static str] {
    match self {
      LevelSystem::GlobalSuccess => &["Grade 10", "Grade 11", "Grade 12", "High School Final Exam"],
      LevelSystem::Cefr => &["A1", "A2", "B1", "B2", "C1", "C2"],
      LevelSystem::Ielts => &["4.0", "5.0", "6.0", "7.0", "8.0", "9.0"],
      LevelSystem::Toefl => &["0-31", "32-59", "60-78", "79-101", "102-120"],
      LevelSystem::Toeic => &["10-180", "185-250", "255-400", "405-600", "605-780", "785-990"],
    }
  }
}

/// Level picked in the UI, e.g. CEFR B1.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LevelOption {
  pub system: LevelSystem,
  pub sub_level: String,
}

impl Default for LevelOption {
  fn default() -> Self {
    Self { system: LevelSystem::Cefr, sub_level: "B1".into() }
  }
}

impl fmt::Display for LevelOption {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} {}", self.system.as_str(), self.sub_level)
  }
}

/// Generated content of one category. Replaced whole on generate/refine.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TestSection {
  pub id: String,
  pub category: Category,
  pub content: String,
  pub is_generated: bool,
}

impl TestSection {
  pub fn empty(category: Category) -> Self {
    Self {
      id: category.section_id().to_string(),
      category,
      content: String::new(),
      is_generated: false,
    }
  }
}

/// Which optional blocks a dictionary lookup should include.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DictionaryOptions {
  pub phrases: bool,
  pub collocations: bool,
  pub idioms: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DictionaryExample {
  pub en: String,
  #[serde(default)]
  pub vn: String,
}

/// A phrase/collocation/idiom with its translation. The model names the
/// phrase field after the block, so all three spellings are accepted.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DictionaryPhrase {
  #[serde(alias = "collocation", alias = "idiom")]
  pub phrase: String,
  #[serde(default)]
  pub vn: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DictionaryEntry {
  pub word: String,
  #[serde(default)]
  pub phonetic: String,
  #[serde(default)]
  pub level: String,
  #[serde(default, rename = "partOfSpeech")]
  pub part_of_speech: String,
  #[serde(default)]
  pub translation: String,
  #[serde(default)]
  pub definition: String,
  #[serde(default)]
  pub examples: Vec<DictionaryExample>,
  #[serde(default)]
  pub usage_note: String,
  #[serde(default)]
  pub prepositional_phrases: Vec<DictionaryPhrase>,
  #[serde(default)]
  pub collocations: Vec<DictionaryPhrase>,
  #[serde(default)]
  pub idioms: Vec<DictionaryPhrase>,
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn category_serde_uses_display_names() {
    let json = serde_json::to_string(&Category::CefrCheck).unwrap();
    assert_eq!(json, "\"CEFR Check\"");
    let back: Category = serde_json::from_str("\"WordList\"").unwrap();
    assert_eq!(back, Category::WordList);
  }

  #[test]
  fn parse_accepts_ids_and_names() {
    assert_eq!(Category::parse("vocab"), Some(Category::Vocabulary));
    assert_eq!(Category::parse("cefr check"), Some(Category::CefrCheck));
    assert_eq!(Category::parse("nope"), None);
  }

  #[test]
  fn export_order_excludes_utilities() {
    assert!(Category::EXPORT_ORDER.iter().all(|c| !c.is_utility()));
  }

  #[test]
  fn dictionary_entry_tolerates_partial_json() {
    let entry: DictionaryEntry = serde_json::from_str(
      r#"{"word": "thrive", "partOfSpeech": "verb", "collocations": [{"collocation": "thrive on", "vn": "phát triển nhờ"}]}"#,
    )
    .unwrap();
    assert_eq!(entry.part_of_speech, "verb");
    assert_eq!(entry.collocations[0].phrase, "thrive on");
    assert!(entry.examples.is_empty());
  }
}
