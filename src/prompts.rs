//! Prompt assembly for section generation, plus the form/subtype catalog the UI
//! offers for each category.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Category, LevelOption, LevelSystem};

pub type SubtypeTable = &'static [(&'static str, &'static str)];

pub const VOCAB_FORMS: &[&str] = &[
  "Word Choice", "Synonyms", "Antonyms", "Word Formation 1", "Word Formation 2",
  "Preposition", "Phrasal Verb", "Collocation", "Idiom",
];

pub const GRAMMAR_TYPES: &[&str] = &[
  "Multiple Choice", "Sentence Transformation", "Rewrite 1", "Rewrite 2", "Reorder sentence",
];

pub const GRAMMAR_CATEGORIES: &[&str] = &[
  "All", "Tenses", "Verbs", "Nouns & Articles", "Adjectives & Adverbs", "Prepositions",
  "Conditionals", "Passive Voice", "Reported Speech", "Modals", "Sentence Structure",
];

pub const READING_FORMS: &[&str] = &[
  "Reading Comprehension",
  "Reading (Answer/True/False)",
  "Reading Cloze (Advertisement)",
  "Reading Cloze (Leaflet)",
  "Reading Cloze Advanced",
  "Reading Matching",
  "Reading Open-Guided",
];

pub const CEFR_LEVELS: &[&str] = &["A1", "A2", "B1", "B2", "C1", "C2"];
pub const HIGHLIGHT_FORMS: &[&str] = &["Collocation", "Idiom", "Phrasal Verb"];

pub const READING_CLOZE_SUBTYPES: SubtypeTable = &[
  ("Quantifiers", "some, any, much, many, few, little, several, enough, all, most, no, range, amount, deal, number"),
  ("Determiners", "a, an, the, other, another"),
  ("Distributives", "each, every, either, neither, both, all, none"),
  ("Word Formation", "Converting word classes (e.g., act -> active)."),
  ("Word Choice", "Selecting the most appropriate vocabulary contextually."),
  ("Relative Clauses", "Who, which, that, whose usage."),
  ("Reduced relative clause", "Focus on reduced relative clauses in passive form (V3/ed)."),
  ("Passive voice", "Focus on passive verb forms, specifically the (V3/ED + BY) structure."),
  ("Phrasal Verbs", "Verb + particle combinations."),
  ("Conjunctions", "Linking words (however, despite, because)."),
  ("Collocations", "Natural word pairings."),
  ("Prepositions", "Dependent prepositions and time/place markers."),
  ("Gerund/Infinitive", "Verb patterns (enjoy doing vs want to do)."),
  ("Word Order", "Correct sentence structure placement."),
];

pub const READING_CLOZE_ADVANCED_SUBTYPES: SubtypeTable = &[
  ("Word Choice", "Selecting the most appropriate vocabulary contextually (Advanced/C1-C2)."),
  ("Collocations", "Focus on pairings of verb+adverb, adverb+adjective, or adjective+noun."),
  ("Phrasal Verbs", "Complex and formal phrasal verbs."),
  ("Conjunctions", "Strictly focus on Subordinating Conjunctions (because, although, if, since, while)."),
  ("Idioms", "Common and advanced idiomatic expressions."),
  ("Quantifiers", "some, any, much, many, few, little, several, enough, all, most, no, range, amount, deal, number"),
  ("Distributives", "each, every, either, neither, both, all, none"),
  ("Prepositional Phrases", "Idiomatic fixed phrases starting with or containing prepositions."),
];

pub const READING_COMP_SUBTYPES: SubtypeTable = &[
  ("Main Idea", "Identify the primary theme or purpose."),
  ("Detail", "Retrieve specific stated information."),
  ("Factual: TRUE/MENTIONED", "Identify which statement is true or mentioned."),
  ("Negative Factual", "Identify what is NOT mentioned or true."),
  ("Vocabulary", "Synonyms/Antonyms in context."),
  ("Inference", "Draw conclusions not explicitly stated."),
  ("Rhetorical Purpose", "Why the author included specific information."),
  ("Reference", "Identify what a pronoun refers to."),
  ("Restatement", "Paraphrasing essential information."),
  ("Sentence Insertion", "Best placement for a new sentence."),
  ("Best Summary (Passage)", "Choose the option that best summarizes the entire text."),
  ("Best Summary (Paragraph)", "Choose the option that best summarizes a specific paragraph."),
  ("Discussion", "Identify the paragraph containing specific information."),
];

pub const READING_MIXED_SUBTYPES: SubtypeTable = &[
  ("Reading and answer", "Short answer questions requiring open-ended text response."),
  ("Reading True/False", "Determining whether statements are correct or incorrect based on the passage."),
];

pub const READING_MATCHING_SUBTYPES: SubtypeTable = &[
  ("Sentence Insertion", "Choose the correct sentence to complete the paragraph (Logic/Coherence)."),
  ("Grammar & Structure", "Choose the correct clause or phrase (Relative clauses, conjunctions, etc.)."),
];

pub const READING_OPEN_GUIDED_SUBTYPES: SubtypeTable = &[
  ("Preposition", "Supply the correct preposition."),
  ("Word Formation", "Supply the correct word form."),
  ("Conjunction", "Supply the correct linking word."),
  ("Idiom", "Supply the missing word to complete a common idiom."),
  ("Gerund/Infinitive", "Supply the correct verb form."),
  ("Comparison", "Focusing on form of adjective and adverb."),
];

pub const COMMUNICATION_SUBTYPES: SubtypeTable = &[
  ("Type 1", "Request, Suggest, Permission, Agree/Disagree"),
  ("Type 2", "Invitation, Recommendation, Advice"),
  ("Type 3", "Warning, Apologizing, Compliment, Congratulation, Encouragement"),
  ("Type 4", "Asking (direction, time, plan, transportation)"),
];

pub const ARRANGEMENT_SUBTYPES: SubtypeTable = &[
  ("Word Order (Adjectives)", "OSASCOMP rules (Opinion, Size, Age, Shape, Color, Origin, Material, Purpose)."),
  ("Dialogue (3 lines)", "Reorder a short conversation (a, b, c)."),
  ("Dialogue (5 lines)", "Reorder a longer conversation (a, b, c, d, e)."),
  ("Letter/Email", "Reorder body sentences of a formal letter/email."),
  ("Paragraph", "Reorder sentences to form a coherent paragraph."),
];

pub const VOCAB_COLLOCATION_SUBTYPES: SubtypeTable = &[
  ("Verb & Adverb", "Example: \"whisper softly\", \"walk quickly\", \"badly need\", \"completely understand\"."),
  ("Adverb + Adjective", "Example: \"extremely happy\", \"highly successful\", \"bitterly cold\"."),
  ("Verb + Noun", "Example: \"match the requirements\", \"show interest\", \"gain experience\"."),
];

pub const GRAMMAR_REORDER_SUBTYPES: SubtypeTable = &[
  ("Reorder MTC", "Rearrange scrambled words/phrases into a complete sentence as MULTIPLE CHOICE (options A, B, C, D)."),
  ("Reorder Essay", "Rearrange scrambled words/phrases into a complete sentence as an OPEN answer (write the whole sentence)."),
];

pub const DEFAULT_QUANTITY: u32 = 10;
const FALLBACK_TOPIC: &str = "General Content";

/// Everything the UI sends to generate one section.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
  pub category: Category,
  #[serde(default)]
  pub topic: String,
  #[serde(default)]
  pub level: LevelOption,
  #[serde(default = "default_quantity")]
  pub quantity: u32,
  /// Vocabulary form, grammar test type or reading form; defaults per category.
  #[serde(default)]
  pub form: Option<String>,
  /// Subtype name → number of items, for forms that use a breakdown table.
  #[serde(default)]
  pub breakdown: BTreeMap<String, u32>,
  /// Grammar concepts picked from the suggestion chips.
  #[serde(default)]
  pub grammar_concepts: Vec<String>,
  #[serde(default)]
  pub additional_instructions: String,
}

fn default_quantity() -> u32 {
  DEFAULT_QUANTITY
}

impl GenerationRequest {
  pub fn new(category: Category, topic: impl Into<String>) -> Self {
    Self {
      category,
      topic: topic.into(),
      level: LevelOption::default(),
      quantity: DEFAULT_QUANTITY,
      form: None,
      breakdown: BTreeMap::new(),
      grammar_concepts: Vec::new(),
      additional_instructions: String::new(),
    }
  }

  /// A request needs a topic, except Grammar which may run on picked concepts.
  pub fn has_subject(&self) -> bool {
    !self.topic.trim().is_empty()
      || (self.category == Category::Grammar && !self.grammar_concepts.is_empty())
  }

  pub fn form(&self) -> &str {
    match self.form.as_deref().map(str::trim) {
      Some(f) if !f.is_empty() => f,
      _ => match self.category {
        Category::Vocabulary => "Word Choice",
        Category::Grammar => "Multiple Choice",
        Category::Reading => "Reading Comprehension",
        _ => "",
      },
    }
  }

  pub fn effective_topic(&self) -> String {
    let topic = self.topic.trim();
    if !topic.is_empty() {
      topic.to_string()
    } else if !self.grammar_concepts.is_empty() {
      self.grammar_concepts.join(", ")
    } else {
      FALLBACK_TOPIC.to_string()
    }
  }

  /// The breakdown table in effect for this category/form, if any.
  pub fn breakdown_table(&self) -> Option<SubtypeTable> {
    let form = self.form();
    match self.category {
      Category::Reading => Some(reading_table(form)),
      Category::Communication => Some(COMMUNICATION_SUBTYPES),
      Category::Arrangement => Some(ARRANGEMENT_SUBTYPES),
      Category::Vocabulary if form == "Collocation" => Some(VOCAB_COLLOCATION_SUBTYPES),
      Category::Grammar if form == "Reorder sentence" => Some(GRAMMAR_REORDER_SUBTYPES),
      _ => None,
    }
  }

  /// Selected subtypes with a positive count, in table order.
  fn selected_subtypes(&self) -> Vec<(&'static str, u32)> {
    self.breakdown_table()
      .unwrap_or(&[])
      .iter()
      .filter_map(|(name, _)| match self.breakdown.get(*name) {
        Some(&n) if n > 0 => Some((*name, n)),
        _ => None,
      })
      .collect()
  }

  /// Sum of the breakdown for table-driven forms, the plain quantity otherwise.
  pub fn effective_quantity(&self) -> u32 {
    if self.breakdown_table().is_some() {
      self.selected_subtypes().iter().map(|(_, n)| n).sum()
    } else {
      self.quantity
    }
  }

  /// `k: n items, ...` for the selected subtypes.
  pub fn details(&self) -> String {
    self.selected_subtypes()
      .iter()
      .map(|(name, n)| format!("{name}: {n} items"))
      .collect::<Vec<_>>()
      .join(", ")
  }

  /// Short description of the requested form, e.g. `Form: Collocation (Details: Verb + Noun: 4 items)`.
  pub fn subtype_info(&self) -> String {
    let form = self.form();
    match self.category {
      Category::Vocabulary | Category::Grammar if self.breakdown_table().is_none() => {
        format!("Form: {form}")
      }
      Category::Vocabulary | Category::Grammar | Category::Reading => {
        format!("Form: {form} (Details: {})", self.details())
      }
      Category::Communication | Category::Arrangement => {
        format!("Form: {} (Details: {})", self.category, self.details())
      }
      _ => String::new(),
    }
  }
}

fn reading_table(form: &str) -> SubtypeTable {
  if form == "Reading Cloze Advanced" {
    READING_CLOZE_ADVANCED_SUBTYPES
  } else if form.starts_with("Reading Cloze") {
    READING_CLOZE_SUBTYPES
  } else if form == "Reading Matching" {
    READING_MATCHING_SUBTYPES
  } else if form == "Reading Open-Guided" {
    READING_OPEN_GUIDED_SUBTYPES
  } else if form == "Reading (Answer/True/False)" {
    READING_MIXED_SUBTYPES
  } else {
    READING_COMP_SUBTYPES
  }
}

/// Full generation prompt for a request.
pub fn build_generation_prompt(req: &GenerationRequest) -> String {
  let topic = req.effective_topic();
  let quantity = req.effective_quantity();
  let skip_key = req.category == Category::WordList;
  let form_block = form_block(req, &topic, quantity);

  let key_rule = if skip_key {
    "- DO NOT PROVIDE AN ANSWER KEY.".to_string()
  } else {
    "- You MUST end with an \"**Answer Key:**\" section.\n- Answer key format: \"1. A, 2. B, 3. C, 4. D...\"; for open answers (Reorder, Rewrite) \"1. [Full Correct Sentence]\", \"2. safety\"; for True/False \"1. T, 2. F\".".to_string()
  };

  let mut prompt = format!(
    "You are an expert writer of national-level English exams.\n\
Task: Create the **{category}** section ({info}).\n\
Topic: {topic}. Level: {level}.\n\
Quantity: EXACTLY **{quantity}** QUESTIONS/ITEMS.\n\n\
ANSWER BALANCE RULES (MANDATORY):\n\
- Correct answers must be spread evenly across A, B, C and D (about a quarter each).\n\
- Never let one letter hold most of the correct answers.\n\
- The position of the correct answer must be shuffled with no predictable pattern.\n\n\
FORMAT RULES:\n\
1. Question format: always start with \"Question N.\" (Question 1., Question 2.). Do not wrap question numbers in ** markers.\n\
2. For multiple-choice questions, put * directly before the letter of the correct option (*A. , *B. , *C. , *D. ).\n\
3. Options A, B, C, D must be on THE SAME LINE.\n\
4. Use ___________ for blanks.\n",
    category = req.category,
    info = req.subtype_info(),
    level = req.level,
  );
  if !form_block.is_empty() {
    prompt.push_str(&form_block);
    prompt.push('\n');
  }
  prompt.push_str("\nANSWER KEY:\n");
  prompt.push_str(&key_rule);
  prompt.push_str(if skip_key {
    "\n\nReturn only the test content.\n"
  } else {
    "\n\nReturn only the test content and the Answer Key.\n"
  });
  let extra = req.additional_instructions.trim();
  if !extra.is_empty() {
    prompt.push('\n');
    prompt.push_str(extra);
    prompt.push('\n');
  }
  prompt
}

fn form_block(req: &GenerationRequest, topic: &str, quantity: u32) -> String {
  let form = req.form();
  let details = req.details();
  let details_or = |fallback: &str| if details.is_empty() { fallback.to_string() } else { details.clone() };

  match req.category {
    Category::WordList => {
      let level_info = if req.level.system == LevelSystem::GlobalSuccess {
        format!(
          "Base it on the Global Success textbook series used in Vietnam (level: {}). Vocabulary MUST follow the words that appear in that grade's books.",
          req.level.sub_level
        )
      } else {
        format!("Base it on the {} level system ({}).", req.level.system.as_str(), req.level.sub_level)
      };
      format!(
        "WORD LIST FORMAT:\n\
- Task: list vocabulary related to \"{topic}\" grouped by CEFR level.\n\
- CORE RULE: {level_info}\n\
- Provide EXACTLY {quantity} words for EACH level: B1, B2, C1 and C2.\n\
- DISPLAY (MANDATORY):\n  B1: word_1, word_2, ..., word_{quantity}.\n  B2: word_1, word_2, ..., word_{quantity}.\n  C1: word_1, word_2, ..., word_{quantity}.\n  C2: word_1, word_2, ..., word_{quantity}.\n\
- Words only, no IPA, meanings or examples; comma separated; one line per level."
      )
    }
    Category::Vocabulary => match form {
      "Word Choice" => "WORD CHOICE FORMAT:\n- Task: choose the word that best fits the context.\n- Options A, B, C, D must be words with clearly different meanings.".into(),
      "Synonyms" => "SYNONYMS FORMAT:\n- Task: choose the word/phrase CLOSEST in meaning to the quoted \"WORD\".".into(),
      "Antonyms" => "ANTONYMS FORMAT:\n- Task: choose the word/phrase OPPOSITE in meaning to the quoted \"WORD\".".into(),
      "Word Formation 1" => "WORD FORMATION 1 FORMAT:\n- Multiple choice.\n- Options A, B, C, D are different forms of the same root (develop, developing, development, developer).\n- Example: Question 1. The ___________ of extensive green parks is a key part of the new city plan.\n  A. developing   *B. development   C. develop   D. developer".into(),
      "Word Formation 2" => "WORD FORMATION 2 FORMAT:\n- Open gap fill.\n- Give the root word in parentheses at the end of the sentence.\n- Example: Question 2. Smart streetlights and cameras are installed to improve public ___________. (SAFE)".into(),
      "Collocation" => format!(
        "COLLOCATION FORMAT:\n- Task: choose the word that forms a natural collocation.\n- Distribution of collocation types: {}\n- Never use word-formation items (suffix changes of one root).\n- The correct answer must be a COMMON, widely recognised collocation.\n- Options A, B, C, D must be COMPLETELY DIFFERENT words, not sharing a root.",
        details_or("focus on common collocations.")
      ),
      _ => String::new(),
    },
    Category::Grammar => match form {
      "Rewrite 2" => "REWRITE 2 FORMAT:\n- Task: rewrite the sentence starting from the given prompt.\n- Layout (MANDATORY):\n  Question N. [Original sentence]\n  ➔ [Start of the rewritten sentence] ............................................................\n- Example:\n  Question 1. The scientist discovered a new element.\n  ➔ A new element ............................................................".into(),
      "Sentence Transformation" => "SENTENCE TRANSFORMATION FORMAT:\n- Task: rewrite the sentence using the given keyword.\n- Layout (MANDATORY):\n  Question N. [Original sentence] ([KEYWORD])\n  ➝ [Start of the rewritten sentence]\n- The keyword MUST be in parentheses at the end of the original sentence. Use the arrow ➝ (U+279E) for the rewrite line.\n- Example:\n  Question 1. We should not react without thinking twice. (HIP)\n  ➝ Due".into(),
      "Reorder sentence" => format!(
        "REORDER SENTENCE FORMAT:\n- Task: rearrange scrambled words/phrases into a complete sentence.\n- Distribution: {}\n- Reorder MTC: give the scrambled sentence and 4 options A, B, C, D for the right order.\n- Reorder Essay: give the scrambled sentence (e.g. the / scientist / a / new / discovered / element).\n- For Reorder Essay the Answer Key MUST give the COMPLETE sentence, e.g. 1. The scientist discovered a new element.",
        details_or("mix multiple choice and open items.")
      ),
      _ => String::new(),
    },
    Category::Reading => reading_block(form, &details_or("use a variety of grammar and vocabulary points."), quantity),
    Category::Arrangement => {
      if req.selected_subtypes().iter().any(|(name, _)| *name == "Word Order (Adjectives)") {
        "WORD ORDER (ADJECTIVES) FORMAT:\n- Task: choose the option with the correct adjective order (OSASCOMP: Opinion - Size - Age - Shape - Color - Origin - Material - Purpose).\n- Each question takes 2-3 lines: A and B on one line, C and D on the next.\n- Example (FOLLOW CLOSELY):\n  Question 1.\n  A. a wooden small old house\t\t\tB. a small wooden old house\n  C. an old small wooden house\t\t\t*D. a small old wooden house".into()
      } else {
        format!(
          "ARRANGEMENT FORMAT:\n- Task: reorder sentences/turns into a complete paragraph, dialogue or letter.\n- Distribution: {}\n- LABELS: use lowercase letters with a dot (a., b., c., d., e.) for the parts to reorder.\n- OPTIONS: A, B, C, D show the order with long dashes — (U+2014) between letters.\n- Dialogue: a. **[Speaker name]**: [Line]; speaker names MUST be bold with **.\n  Example:\n  a. **John**: Have you ever celebrated Thanksgiving?\n  b. **Tina**: No, but I've seen it in movies; it looks fun.\n  c. **John**: It is! It's all about family and gratitude.\n  A. a—b—c    *B. a—c—b\n- Letter/Email: greeting at the top, closing and sender name below the lettered parts.\n- Paragraph: loose sentences labelled a, b, c, d, e.",
          details_or("mix the arrangement types.")
        )
      }
    }
    Category::Communication => format!(
      "COMMUNICATION FORMAT:\n- Task: short everyday exchanges; choose the most suitable response.\n- Distribution of conversation types: {}\n- Layout: Question N. [Speaker A line] - [Speaker B] ___________\n  A. ...   B. ...   C. ...   D. ...",
      details_or("balance the four conversation types.")
    ),
    _ => String::new(),
  }
}

fn reading_block(form: &str, details: &str, quantity: u32) -> String {
  const PARAGRAPH_MARK: &str = "- PASSAGE: put the symbol ► (U+25BA) BEFORE every paragraph of the passage.";
  match form {
    "Reading (Answer/True/False)" => format!(
      "READING (ANSWER/TRUE/FALSE) FORMAT:\n- Task: read the passage and answer a mix of short open questions and True/False statements.\n{PARAGRAPH_MARK}\n- Distribution: {details}\n- Open question layout:\n  Question N. [Question]\n  Answer: ............................................................\n- True/False layout:\n  Question N. [Statement] (T / F)\n- Answer Key: full, concise answers for open questions; T or F for statements."
    ),
    "Reading Cloze (Advertisement)" => format!(
      "READING CLOZE (ADVERTISEMENT) FORMAT:\n- Instructions: \"Read the following advertisement and mark the letter A, B, C or D on your answer sheet to indicate the option that best fits each of the numbered blanks.\"\n- Title: \"JOB ADVERTISEMENT: [Job title]!\"\n- Blanks are written (1) ___________, (2) ___________, ...\n- End with \"Contact Us: Email your application to [email] or call us at [phone] for more information.\"\n- Question types, strictly: {details}\n- Layout: Question N. (N) A. ...  B. ...  C. ...  D. ...\n- Example: Question 1. (1) A. energy   *B. energetic   C. energetically   D. energize"
    ),
    "Reading Cloze (Leaflet)" => format!(
      "READING CLOZE (LEAFLET) FORMAT:\n- Instructions: \"Read the following leaflet and mark the letter A, B, C or D on your answer sheet to indicate the option that best fits each of the numbered blanks.\"\n- Structure: title, slogan, sections such as \"Why is STEM Important?\" and \"How to Get Involved:\"; bullet points start with ✙ (U+271A).\n- Blanks are written (1) ___________, (2) ___________, ...\n- Question types, strictly: {details}\n- Layout: Question N. (N) A. ...  B. ...  C. ...  D. ...\n- Example: Question 7. (1) A. stands up   B. asks for   *C. stands for   D. writes down"
    ),
    "Reading Cloze Advanced" => format!(
      "READING CLOZE ADVANCED FORMAT:\n- Task: an advanced (C1-C2) cloze passage with a bold, centred title.\n- Instructions: \"Read the following passage and mark the letter A, B, C, or D on your answer sheet to indicate the correct word or phrase that fits best each of the numbered blanks.\"\n- Blanks are written (N) ___________; end with an italic, right-aligned \"Adapted from [Source Name]\" line.\n- Question types: {details}\n- Layout: Question N. (N) A. ... B. ... C. ... D. ...\n- Example: Question 51. (51) A. condensing *B. throwing C. saturating D. diluting"
    ),
    "Reading Matching" => format!(
      "READING MATCHING (SENTENCE CLOZE) FORMAT:\n- Task: choose the clause or sentence that best fills each numbered blank.\n- The passage has a bold, centred title and several paragraphs; blanks are written (1), (2), ...\n- Question types: {details}\n- Layout: Question N: (X) followed by options A-D, each a long phrase or full clause, one per line.\n- Example:\n  Question 18: (1)\n  A. which was officially launched...\n  *B. was officially launched to the public in July 2016\n  C. of which the app was...\n  D. having been officially..."
    ),
    "Reading Open-Guided" => format!(
      "READING OPEN-GUIDED FORMAT:\n- Task: fill each gap with a word from the box.\n- Instructions: \"Read the following passage and choose the most suitable word from the ones given in the box to fill in each gap.\"\n- List the box words (as many as the gaps) right below the instructions, separated by spaces or tabs.\n- Blanks are written (1) ___________, (2) ___________, ...\n- Gap types: {details}\n- Answer Key: the number and the correct word."
    ),
    _ => format!(
      "READING COMPREHENSION (MCQ) FORMAT:\n- Task: a complete reading passage followed by multiple-choice questions A, B, C, D.\n- Present the WHOLE passage first, then the questions.\n{PARAGRAPH_MARK} Never write \"Paragraph\" or any label after ►.\n- Target words in the passage or the questions must be quoted and bold: **\"word\"**.\n- Insertion markers [A], [B], [C], [D] in the passage must be bold: **[A]**.\n- The * of the correct answer sits directly before the letter: *A., *B., *C., *D.\n- Keep the four options of a question about the same length.\n- Question 1 is always a Main Idea question; Discussion / paragraph-identification questions come last, grouped together.\n- Question types: {details}\n- Total: {quantity} questions."
    ),
  }
}

/// Static data the UI needs to build its selectors.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Catalog {
  pub categories: Vec<CategoryInfo>,
  pub level_systems: Vec<LevelSystemInfo>,
  pub vocab_forms: &'static [&'static str],
  pub grammar_types: &'static [&'static str],
  pub grammar_categories: &'static [&'static str],
  pub reading_forms: &'static [&'static str],
  pub highlight_options: Vec<&'static str>,
  pub subtypes: BTreeMap<&'static str, Vec<SubtypeInfo>>,
  pub default_quantity: u32,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInfo {
  pub name: Category,
  pub id: &'static str,
  pub utility: bool,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelSystemInfo {
  pub system: LevelSystem,
  pub sub_levels: &'static [&'static str],
}

#[derive(Clone, Debug, Serialize)]
pub struct SubtypeInfo {
  pub name: &'static str,
  pub description: &'static str,
}

pub fn catalog() -> Catalog {
  let table = |t: SubtypeTable| -> Vec<SubtypeInfo> {
    t.iter().map(|(name, description)| SubtypeInfo { name, description }).collect()
  };
  let subtypes = BTreeMap::from([
    ("readingCloze", table(READING_CLOZE_SUBTYPES)),
    ("readingClozeAdvanced", table(READING_CLOZE_ADVANCED_SUBTYPES)),
    ("readingComprehension", table(READING_COMP_SUBTYPES)),
    ("readingMixed", table(READING_MIXED_SUBTYPES)),
    ("readingMatching", table(READING_MATCHING_SUBTYPES)),
    ("readingOpenGuided", table(READING_OPEN_GUIDED_SUBTYPES)),
    ("communication", table(COMMUNICATION_SUBTYPES)),
    ("arrangement", table(ARRANGEMENT_SUBTYPES)),
    ("vocabCollocation", table(VOCAB_COLLOCATION_SUBTYPES)),
    ("grammarReorder", table(GRAMMAR_REORDER_SUBTYPES)),
  ]);
  Catalog {
    categories: Category::ALL
      .into_iter()
      .map(|c| CategoryInfo { name: c, id: c.section_id(), utility: c.is_utility() })
      .collect(),
    level_systems: LevelSystem::ALL
      .into_iter()
      .map(|s| LevelSystemInfo { system: s, sub_levels: s.sub_levels() })
      .collect(),
    vocab_forms: VOCAB_FORMS,
    grammar_types: GRAMMAR_TYPES,
    grammar_categories: GRAMMAR_CATEGORIES,
    reading_forms: READING_FORMS,
    highlight_options: CEFR_LEVELS.iter().chain(HIGHLIGHT_FORMS).copied().collect(),
    subtypes,
    default_quantity: DEFAULT_QUANTITY,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn topic_falls_back_to_concepts_then_default() {
    let mut req = GenerationRequest::new(Category::Grammar, "  ");
    assert_eq!(req.effective_topic(), "General Content");
    req.grammar_concepts = vec!["Articles".into(), "Modals".into()];
    assert_eq!(req.effective_topic(), "Articles, Modals");
    assert!(req.has_subject());
  }

  #[test]
  fn breakdown_drives_quantity_and_details() {
    let mut req = GenerationRequest::new(Category::Reading, "Oceans");
    req.form = Some("Reading Cloze (Leaflet)".into());
    req.breakdown.insert("Prepositions".into(), 2);
    req.breakdown.insert("Quantifiers".into(), 3);
    req.breakdown.insert("Main Idea".into(), 4); // not in the cloze table
    req.breakdown.insert("Determiners".into(), 0);
    assert_eq!(req.effective_quantity(), 5);
    assert_eq!(
      req.subtype_info(),
      "Form: Reading Cloze (Leaflet) (Details: Quantifiers: 3 items, Prepositions: 2 items)"
    );
  }

  #[test]
  fn plain_forms_use_quantity() {
    let mut req = GenerationRequest::new(Category::Vocabulary, "Space");
    req.quantity = 15;
    assert_eq!(req.effective_quantity(), 15);
    assert_eq!(req.subtype_info(), "Form: Word Choice");
  }

  #[test]
  fn word_list_prompt_skips_answer_key() {
    let req = GenerationRequest::new(Category::WordList, "Travel");
    let prompt = build_generation_prompt(&req);
    assert!(prompt.contains("DO NOT PROVIDE AN ANSWER KEY"));
    assert!(prompt.contains("word_10"));
    assert!(!prompt.contains("**Answer Key:**"));
  }

  #[test]
  fn prompt_carries_format_rules_and_extra_instructions() {
    let mut req = GenerationRequest::new(Category::Vocabulary, "Smart cities");
    req.additional_instructions = "Avoid brand names.".into();
    let prompt = build_generation_prompt(&req);
    assert!(prompt.contains("Topic: Smart cities. Level: CEFR B1."));
    assert!(prompt.contains("\"Question N.\""));
    assert!(prompt.contains("**Answer Key:**"));
    assert!(prompt.trim_end().ends_with("Avoid brand names."));
  }

  #[test]
  fn catalog_lists_every_category() {
    let c = catalog();
    assert_eq!(c.categories.len(), Category::ALL.len());
    assert_eq!(c.highlight_options.len(), 9);
  }
}
