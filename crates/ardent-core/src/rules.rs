use crate::value::Value;
use derive_more::{Deref, DerefMut, IntoIterator};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Rule name treated as the uniqueness rule by the exclusion rewriter.
pub const UNIQUE_RULE: &str = "unique";

/// Ordered rule expressions for one field.
pub type RuleList = Vec<String>;

///
/// RuleSet
///
/// Mapping from field name to an ordered list of rule expressions. Never
/// mutated in place during validation; each pass computes an effective set
/// from a per-call override or the type-level default table.
///

#[derive(
    Clone, Debug, Default, Deref, DerefMut, Deserialize, IntoIterator, PartialEq, Serialize,
)]
#[serde(transparent)]
pub struct RuleSet(BTreeMap<String, RuleList>);

impl RuleSet {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Declare rules for a field from a pipe-delimited expression.
    #[must_use]
    pub fn rule(mut self, field: impl Into<String>, expr: &str) -> Self {
        self.0.insert(field.into(), split_expr(expr));
        self
    }

    pub fn insert(&mut self, field: impl Into<String>, rules: RuleList) {
        self.0.insert(field.into(), rules);
    }
}

// Normalize a pipe-delimited rule expression into an ordered list.
fn split_expr(expr: &str) -> RuleList {
    expr.split('|')
        .filter(|rule| !rule.is_empty())
        .map(str::to_string)
        .collect()
}

/// Compute the effective rule set for one validation pass.
///
/// The override wins when non-empty, otherwise the type defaults apply.
/// Entries whose rule expressions are empty are discarded.
#[must_use]
pub fn effective(overrides: &RuleSet, defaults: &RuleSet) -> RuleSet {
    let source = if overrides.is_empty() {
        defaults
    } else {
        overrides
    };

    let mut out = RuleSet::new();
    for (field, list) in source.iter() {
        let rules: RuleList = list.iter().filter(|r| !r.is_empty()).cloned().collect();
        if !rules.is_empty() {
            out.insert(field.clone(), rules);
        }
    }

    out
}

/// Rewrite uniqueness rules so the check ignores the entity's own row.
///
/// The target table defaults to the entity's table, the target column to the
/// field name. When the entity has a primary-key value, an exclusion clause
/// is appended using it and either the rule's own where-column or the
/// primary-key column. Rules other than the uniqueness rule pass through
/// untouched.
#[must_use]
pub fn build_unique_exclusion_rules(
    rules: &RuleSet,
    table: &str,
    primary_key: &str,
    key_value: Option<&Value>,
) -> RuleSet {
    let mut out = RuleSet::new();
    for (field, list) in rules.iter() {
        let rewritten = list
            .iter()
            .map(|rule| rewrite_unique_rule(rule, field, table, primary_key, key_value))
            .collect();
        out.insert(field.clone(), rewritten);
    }

    out
}

// Rewrite a single rule expression when it names the uniqueness rule.
fn rewrite_unique_rule(
    rule: &str,
    field: &str,
    table: &str,
    primary_key: &str,
    key_value: Option<&Value>,
) -> String {
    let rest = match rule.strip_prefix(UNIQUE_RULE) {
        Some("") => "",
        Some(params) if params.starts_with(':') => &params[1..],
        _ => return rule.to_string(),
    };

    // Stop splitting at 4 so the final segment keeps an optional where-column.
    let mut params = rest.splitn(4, ',');
    let rule_table = params.next().filter(|s| !s.is_empty()).unwrap_or(table);
    let rule_column = params.next().filter(|s| !s.is_empty()).unwrap_or(field);
    // Any exclusion already present is superseded by the current key.
    let _ = params.next();
    let where_column = params.next().filter(|s| !s.is_empty());

    match key_value {
        Some(key) => {
            let where_column = where_column.unwrap_or(primary_key);
            format!("{UNIQUE_RULE}:{rule_table},{rule_column},{key},{where_column}")
        }
        None => format!("{UNIQUE_RULE}:{rule_table},{rule_column}"),
    }
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::{RuleSet, build_unique_exclusion_rules, effective};
    use crate::value::Value;

    fn rewrite(rule: &str, field: &str, key: Option<&Value>) -> String {
        let rules = RuleSet::new().rule(field, rule);
        let out = build_unique_exclusion_rules(&rules, "users", "id", key);
        out.get(field).unwrap()[0].clone()
    }

    #[test]
    fn effective_prefers_non_empty_override() {
        let defaults = RuleSet::new().rule("name", "required");
        let overrides = RuleSet::new().rule("email", "email");

        let out = effective(&overrides, &defaults);
        assert!(out.contains_key("email"));
        assert!(!out.contains_key("name"));
    }

    #[test]
    fn effective_falls_back_to_defaults() {
        let defaults = RuleSet::new().rule("name", "required");

        let out = effective(&RuleSet::new(), &defaults);
        assert_eq!(out.get("name").unwrap(), &vec!["required".to_string()]);
    }

    #[test]
    fn effective_discards_empty_entries() {
        let mut defaults = RuleSet::new().rule("name", "required|email");
        defaults.insert("junk", vec![String::new()]);

        let out = effective(&RuleSet::new(), &defaults);
        assert!(!out.contains_key("junk"));
        assert_eq!(out.get("name").unwrap().len(), 2);
    }

    #[test]
    fn pipe_expressions_split_in_order() {
        let rules = RuleSet::new().rule("email", "required|email|max:64");
        assert_eq!(
            rules.get("email").unwrap(),
            &vec![
                "required".to_string(),
                "email".to_string(),
                "max:64".to_string()
            ]
        );
    }

    #[test]
    fn bare_unique_gains_table_column_and_exclusion() {
        let key = Value::Int(42);
        assert_eq!(
            rewrite("unique", "email", Some(&key)),
            "unique:users,email,42,id"
        );
    }

    #[test]
    fn unique_keeps_explicit_table_and_column() {
        let key = Value::Int(7);
        assert_eq!(
            rewrite("unique:accounts,login", "email", Some(&key)),
            "unique:accounts,login,7,id"
        );
    }

    #[test]
    fn unique_honors_custom_where_column() {
        let key = Value::Int(7);
        assert_eq!(
            rewrite("unique:accounts,login,99,uid", "email", Some(&key)),
            "unique:accounts,login,7,uid"
        );
    }

    #[test]
    fn unique_without_key_value_gets_no_exclusion() {
        assert_eq!(rewrite("unique", "email", None), "unique:users,email");
    }

    #[test]
    fn non_unique_rules_pass_through() {
        let key = Value::Int(1);
        assert_eq!(rewrite("required", "email", Some(&key)), "required");
        assert_eq!(
            rewrite("unique_together:x", "email", Some(&key)),
            "unique_together:x"
        );
    }
}
