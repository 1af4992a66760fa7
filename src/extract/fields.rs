//! Per-source pattern rules applied to the extracted agenda text.
//!
//! Each rule is a named regex. The value of a field is the first capture
//! group that participated in the match, or the whole match when the pattern
//! has no groups. Whitespace inside the value is collapsed (PDF text tends to
//! break lines mid-sentence). A rule that does not match yields an absent
//! value; extraction as a whole never fails.

use std::collections::BTreeMap;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use regex::Regex;
use serde::Serialize;

#[derive(Debug, Clone, Default)]
pub struct PatternRules {
    rules: Vec<(String, Regex)>,
}

impl PatternRules {
    /// Compile `name -> pattern` pairs. Fails on the first invalid regex so
    /// broken catalogs are caught at load time rather than mid-run.
    pub fn from_patterns<I, K, V>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: AsRef<str>,
    {
        let mut rules = Vec::new();
        for (name, pat) in patterns {
            let name = name.into();
            let re = Regex::new(pat.as_ref())
                .with_context(|| format!("compiling pattern for field `{name}`"))?;
            rules.push((name, re));
        }
        Ok(Self { rules })
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Field name -> value; `None` when the pattern found nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(transparent)]
pub struct ExtractedFields(BTreeMap<String, Option<String>>);

impl ExtractedFields {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(|v| v.as_deref())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&str>)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_deref()))
    }

    pub fn matched(&self) -> usize {
        self.0.values().filter(|v| v.is_some()).count()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, Option<String>)> for ExtractedFields {
    fn from_iter<T: IntoIterator<Item = (String, Option<String>)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Apply every rule to `text`. Every configured field appears in the output.
pub fn extract_fields(rules: &PatternRules, text: &str) -> ExtractedFields {
    rules
        .rules
        .iter()
        .map(|(name, re)| (name.clone(), first_value(re, text)))
        .collect()
}

fn first_value(re: &Regex, text: &str) -> Option<String> {
    let caps = re.captures(text)?;
    let m = caps
        .iter()
        .skip(1)
        .flatten()
        .next()
        .or_else(|| caps.get(0))?;
    let v = collapse_ws(m.as_str());
    (!v.is_empty()).then_some(v)
}

fn collapse_ws(s: &str) -> String {
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").expect("static regex"));
    re_ws.replace_all(s, " ").trim().to_string()
}
