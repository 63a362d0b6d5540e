//! Plain-text rendering of API responses.

use std::fmt::Write as _;

use bursary_core::{
  ledger::RequestRecord,
  pack::{Pack, PackResponse, PackResult},
};
use serde_json::Value;

const NA: &str = "N/A";

/// Render a generation result for the terminal.
pub fn pack_response(resp: &PackResponse) -> String {
  let mut out = String::new();
  if resp.from_cache {
    out.push_str("(served from cache)\n\n");
  }

  match &resp.pack {
    PackResult::ValidPacks(packs) if packs.is_empty() => {
      out.push_str("No packs were generated for these preferences.\n");
    }
    PackResult::ValidPacks(packs) => {
      for (i, p) in packs.iter().enumerate() {
        if i > 0 {
          out.push('\n');
        }
        out.push_str(&pack(i + 1, p));
      }
    }
    PackResult::RawFallback { raw_response, message } => {
      let _ = writeln!(out, "{message}\n");
      out.push_str(raw_response.trim_end());
      out.push('\n');
    }
  }
  out
}

fn pack(n: usize, p: &Pack) -> String {
  let mut out = String::new();
  let _ = writeln!(out, "── Pack {n}: {} ──", p.pack_name.as_deref().unwrap_or(NA));
  let _ = writeln!(out, "Accommodation:        {}", accommodation(p.accommodation.as_ref()));
  let _ = writeln!(out, "Bursary:              {}", bursary(p.bursary.as_ref()));
  let _ = writeln!(out, "Financial breakdown:  {}", p.financial_breakdown.as_deref().unwrap_or(NA));
  let _ = writeln!(out, "Application strategy: {}", p.application_strategy.as_deref().unwrap_or(NA));
  let _ = writeln!(out, "Why it matches:       {}", p.why_match.as_deref().unwrap_or(NA));
  out
}

/// First present field among `keys`, as display text.
fn field(obj: &Value, keys: &[&str]) -> Option<String> {
  keys.iter().find_map(|k| match obj.get(*k)? {
    Value::Null => None,
    Value::String(s) => Some(s.clone()),
    other => Some(other.to_string()),
  })
}

fn accommodation(v: Option<&Value>) -> String {
  match v {
    Some(Value::String(s)) => s.clone(),
    Some(obj @ Value::Object(_)) => {
      let name = field(obj, &["propertyName", "property_name", "name"]).unwrap_or_else(|| NA.into());
      match field(obj, &["monthlyCost", "monthly_cost"]) {
        Some(cost) => format!("{name} (R{cost}/month)"),
        None => name,
      }
    }
    _ => NA.into(),
  }
}

fn bursary(v: Option<&Value>) -> String {
  match v {
    Some(Value::String(s)) => s.clone(),
    Some(obj @ Value::Object(_)) => {
      let name = field(obj, &["name", "bursaryName"]).unwrap_or_else(|| NA.into());
      let mut out = name;
      if let Some(provider) = field(obj, &["provider"]) {
        let _ = write!(out, ", {provider}");
      }
      if let Some(amount) = field(obj, &["amount"]) {
        let _ = write!(out, " (R{amount})");
      }
      out
    }
    _ => NA.into(),
  }
}

/// Render the caller's request history, one line per record.
pub fn history(records: &[RequestRecord]) -> String {
  if records.is_empty() {
    return "No requests yet.\n".into();
  }

  let mut out = String::new();
  for r in records {
    let source = match r.from_cache {
      Some(true) => "cache",
      Some(false) => "generated",
      None => "-",
    };
    let _ = write!(
      out,
      "{}  {:<10}  {:<9}  {}",
      r.created_at.format("%Y-%m-%d %H:%M"),
      r.status.as_str(),
      source,
      r.id
    );
    if let Some(err) = &r.error {
      let _ = write!(out, "  {err}");
    }
    out.push('\n');
  }
  out
}
