//! Canonical label sets.
//!
//! A `LabelSet` is an order-insensitive mapping of label keys to values with a
//! deterministic rendered form: pairs sorted by key, each `key="value"`,
//! joined by commas. The rendered form participates in series identity, so it
//! must come out identical for the same mapping no matter how the input was
//! ordered.

use std::collections::BTreeMap;
use std::fmt;
use std::fmt::Write;

use serde::Deserialize;

/// Helper to escape label values.
fn escape_label(v: &str) -> String {
    v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n")
}

/// Order-insensitive label mapping with a canonical string form.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(transparent)]
pub struct LabelSet(BTreeMap<String, String>);

impl LabelSet {
    /// Empty label set.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Insert or replace one label.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Canonical `key="value",...` form; the empty set renders as "".
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (i, (k, v)) in self.0.iter().enumerate() {
            if i > 0 {
                out.push(',');
            }
            let _ = write!(out, "{}=\"{}\"", k, escape_label(v));
        }
        out
    }

    /// This set widened with `defaults`; keys present here win on collision.
    pub fn merged_over(&self, defaults: &LabelSet) -> LabelSet {
        if defaults.is_empty() {
            return self.clone();
        }
        let mut merged = defaults.0.clone();
        merged.extend(self.0.iter().map(|(k, v)| (k.clone(), v.clone())));
        LabelSet(merged)
    }
}

impl fmt::Display for LabelSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LabelSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_is_sorted_and_order_insensitive() {
        let mut a = LabelSet::new();
        a.insert("zone", "eu");
        a.insert("env", "prod");
        let mut b = LabelSet::new();
        b.insert("env", "prod");
        b.insert("zone", "eu");
        assert_eq!(a.render(), "env=\"prod\",zone=\"eu\"");
        assert_eq!(a.render(), b.render());
        assert_eq!(a, b);
    }

    #[test]
    fn render_is_stable_across_calls() {
        let set: LabelSet = [("b", "2"), ("a", "1"), ("c", "3")].into_iter().collect();
        let first = set.render();
        assert_eq!(first, "a=\"1\",b=\"2\",c=\"3\"");
        assert_eq!(set.render(), first);
    }

    #[test]
    fn empty_set_renders_empty() {
        assert_eq!(LabelSet::new().render(), "");
        assert!(LabelSet::new().is_empty());
    }

    #[test]
    fn values_are_escaped() {
        let set: LabelSet = [("path", "a\\b"), ("msg", "say \"hi\"\n")].into_iter().collect();
        assert_eq!(set.render(), "msg=\"say \\\"hi\\\"\\n\",path=\"a\\\\b\"");
    }

    #[test]
    fn merge_prefers_series_labels() {
        let series: LabelSet = [("env", "prod")].into_iter().collect();
        let defaults: LabelSet = [("env", "staging"), ("origin", "forge")].into_iter().collect();
        let merged = series.merged_over(&defaults);
        assert_eq!(merged.render(), "env=\"prod\",origin=\"forge\"");
    }

    #[test]
    fn merge_with_empty_defaults_is_identity() {
        let series: LabelSet = [("env", "prod")].into_iter().collect();
        assert_eq!(series.merged_over(&LabelSet::new()), series);
    }
}
