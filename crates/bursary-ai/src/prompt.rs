//! Prompt construction.
//!
//! Output is a pure function of its inputs: the same preferences and listings
//! always produce byte-identical text.

use bursary_core::{
  completion::ChatMessage,
  listing::{Accommodation, Bursary},
  preferences::Preferences,
};

use crate::Result;

/// Fixed instructions establishing the assistant's role.
pub const SYSTEM_PROMPT: &str = "You are an expert financial aid advisor for South African \
university students. You combine affordable student accommodation with suitable bursaries into \
complete funding packs.

For every pack you recommend, explain:
1. Coverage breakdown: how the bursary covers rent and what the student still has to pay.
2. Amounts: exact monthly and annual figures in rand (R).
3. Application steps: a concrete, ordered strategy for applying to both the accommodation and \
the bursary, including NSFAS where relevant.
4. Match rationale: why this combination suits this particular student.";

const PACK_INSTRUCTION: &str = "Create 3-5 personalized bursary packs from the data above. \
Respond ONLY with a JSON array. Each element must have exactly these fields: \"packName\", \
\"accommodation\", \"bursary\", \"financialBreakdown\", \"applicationStrategy\", \"whyMatch\".";

/// A system/user message pair ready for a completion call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
  pub system: String,
  pub user:   String,
}

impl Prompt {
  pub fn messages(&self) -> [ChatMessage; 2] {
    [ChatMessage::system(self.system.clone()), ChatMessage::user(self.user.clone())]
  }
}

/// Build the prompt for `prefs` over the fetched listings.
///
/// One line per preference in fixed order; absent preferences leave a blank
/// line rather than placeholder text. The listings are embedded in full, so
/// callers bound their size when fetching.
pub fn build(
  prefs: &Preferences,
  accommodations: &[Accommodation],
  bursaries: &[Bursary],
) -> Result<Prompt> {
  let lines = [
    prefs.university.as_ref().map(|u| format!("University: {u}")),
    prefs.city.as_ref().map(|c| format!("Preferred City: {c}")),
    prefs.max_budget.map(|b| format!("Budget: Up to R{b}/month")),
    prefs.field_of_study.as_ref().map(|f| format!("Field of Study: {f}")),
    prefs.academic_performance.map(|p| format!("Academic Performance: {p}")),
    prefs
      .nsfas_eligible
      .map(|e| format!("NSFAS Eligible: {}", if e { "Yes" } else { "No" })),
    prefs.diversity.as_ref().map(|d| format!("Background/Diversity: {d}")),
  ];

  let mut user = String::from("Student Profile:\n");
  for line in lines {
    user.push_str(line.as_deref().unwrap_or_default());
    user.push('\n');
  }

  user.push_str("\nAvailable Accommodations:\n");
  user.push_str(&serde_json::to_string_pretty(accommodations)?);
  user.push_str("\n\nAvailable Bursaries:\n");
  user.push_str(&serde_json::to_string_pretty(bursaries)?);
  user.push_str("\n\n");
  user.push_str(PACK_INSTRUCTION);

  Ok(Prompt { system: SYSTEM_PROMPT.to_owned(), user })
}
