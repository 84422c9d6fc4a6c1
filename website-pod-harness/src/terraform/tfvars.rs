//! Parameter-file assembly.
//!
//! Each scenario writes a fresh `terraform.tfvars` before invoking the
//! engine. Entries keep insertion order so the rendered file diffs
//! predictably between runs.

use std::fmt::Write as _;

/// A single tfvars value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TfValue {
    Str(String),
    Bool(bool),
    List(Vec<String>),
    Map(Vec<(String, String)>),
}

impl From<&str> for TfValue {
    fn from(value: &str) -> Self {
        TfValue::Str(value.to_string())
    }
}

impl From<String> for TfValue {
    fn from(value: String) -> Self {
        TfValue::Str(value)
    }
}

impl From<bool> for TfValue {
    fn from(value: bool) -> Self {
        TfValue::Bool(value)
    }
}

impl From<Vec<String>> for TfValue {
    fn from(value: Vec<String>) -> Self {
        TfValue::List(value)
    }
}

impl From<&[String]> for TfValue {
    fn from(value: &[String]) -> Self {
        TfValue::List(value.to_vec())
    }
}

/// Ordered set of tfvars entries with a renderer.
#[derive(Debug, Clone, Default)]
pub struct TfVars {
    entries: Vec<(String, TfValue)>,
}

impl TfVars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace an entry, keeping the original position on replace.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<TfValue>) -> Self {
        let key = key.into();
        let value = value.into();
        if let Some(entry) = self.entries.iter_mut().find(|(k, _)| *k == key) {
            entry.1 = value;
        } else {
            self.entries.push((key, value));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render the entries as a tfvars document.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (key, value) in &self.entries {
            match value {
                TfValue::Str(s) => {
                    let _ = writeln!(out, "{key} = \"{}\"", escape(s));
                }
                TfValue::Bool(b) => {
                    let _ = writeln!(out, "{key} = {b}");
                }
                TfValue::List(items) => {
                    let rendered: Vec<String> =
                        items.iter().map(|item| format!("\"{}\"", escape(item))).collect();
                    let _ = writeln!(out, "{key} = [{}]", rendered.join(", "));
                }
                TfValue::Map(pairs) => {
                    let _ = writeln!(out, "{key} = {{");
                    for (k, v) in pairs {
                        let _ = writeln!(out, "  {k} = \"{}\"", escape(v));
                    }
                    let _ = writeln!(out, "}}");
                }
            }
        }
        out
    }
}

fn escape(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}
