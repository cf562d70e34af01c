use crate::{
    base::validator::{
        Confirmed, FieldContext, InSet, Required, RuleCheck,
        len::{Between, Max, Min, Size},
        num::{Integer, Numeric},
        text::{Alpha, AlphaNum, Email, Url},
    },
    core::{
        bag::{AttributeBag, ErrorBag},
        rules::{RuleSet, UNIQUE_RULE},
        traits::{AttributeLabels, MessageOverrides, ValidationOutcome, Validator},
        value::Value,
    },
};

///
/// PresenceVerifier
///
/// Backing store lookup for the uniqueness rule: how many rows in `table`
/// carry `value` in `column`, excluding the row where `id_column` equals
/// `except` when given.
///

pub trait PresenceVerifier {
    fn count(
        &self,
        table: &str,
        column: &str,
        value: &Value,
        except: Option<&str>,
        id_column: &str,
    ) -> usize;
}

///
/// RuleEngine
///
/// The stand-alone `Validator` implementation. Interprets rule expressions
/// of the form `name` or `name:param,param` against the attribute bag.
/// Without a presence verifier attached, uniqueness rules are skipped.
///

#[derive(Default)]
pub struct RuleEngine {
    presence: Option<Box<dyn PresenceVerifier>>,
}

impl RuleEngine {
    #[must_use]
    pub fn new() -> Self {
        Self { presence: None }
    }

    #[must_use]
    pub fn with_presence_verifier(mut self, verifier: Box<dyn PresenceVerifier>) -> Self {
        self.presence = Some(verifier);
        self
    }

    // Dispatch one rule expression against one field.
    fn apply(&self, name: &str, params: &str, ctx: &FieldContext<'_>) -> Option<String> {
        match name {
            "required" => Required.check(ctx),
            "email" => Email.check(ctx),
            "alpha" => Alpha.check(ctx),
            "alpha_num" => AlphaNum.check(ctx),
            "url" => Url.check(ctx),
            "numeric" => Numeric.check(ctx),
            "integer" => Integer.check(ctx),
            "confirmed" => Confirmed.check(ctx),
            "in" => InSet::new(params.split(',').map(str::trim)).check(ctx),

            "min" => match parse_target(params) {
                Some(target) => Min::new(target).check(ctx),
                None => Some(invalid_params(name)),
            },
            "max" => match parse_target(params) {
                Some(target) => Max::new(target).check(ctx),
                None => Some(invalid_params(name)),
            },
            "size" => match parse_target(params) {
                Some(target) => Size::new(target).check(ctx),
                None => Some(invalid_params(name)),
            },
            "between" => match parse_pair(params) {
                Some((min, max)) => Between::new(min, max).check(ctx),
                None => Some(invalid_params(name)),
            },

            UNIQUE_RULE => self.check_unique(params, ctx),

            _ => Some(format!("unknown validation rule '{name}'")),
        }
    }

    // Uniqueness delegates to the presence verifier; no verifier, no check.
    fn check_unique(&self, params: &str, ctx: &FieldContext<'_>) -> Option<String> {
        let value = ctx.value.filter(|value| !value.is_null())?;
        let verifier = self.presence.as_deref()?;

        let mut parts = params.splitn(4, ',').map(str::trim);
        let Some(table) = parts.next().filter(|s| !s.is_empty()) else {
            return Some(invalid_params(UNIQUE_RULE));
        };
        let column = parts.next().filter(|s| !s.is_empty()).unwrap_or(ctx.field);
        let except = parts.next().filter(|s| !s.is_empty());
        let id_column = parts.next().filter(|s| !s.is_empty()).unwrap_or("id");

        if verifier.count(table, column, value, except, id_column) > 0 {
            Some(format!("the {} has already been taken", ctx.label))
        } else {
            None
        }
    }
}

impl Validator for RuleEngine {
    fn validate(
        &self,
        data: &AttributeBag,
        rules: &RuleSet,
        messages: &MessageOverrides,
        labels: &AttributeLabels,
    ) -> ValidationOutcome {
        let mut errors = ErrorBag::new();

        for (field, list) in rules.iter() {
            let label = labels.get(field).map_or(field.as_str(), String::as_str);
            let ctx = FieldContext {
                field,
                label,
                value: data.get(field),
                data,
            };

            for expr in list {
                let (name, params) = split_rule(expr);
                if let Some(default) = self.apply(name, params, &ctx) {
                    errors.add(field.clone(), resolve_message(messages, field, name, label, default));
                }
            }
        }

        if errors.is_empty() {
            ValidationOutcome::pass()
        } else {
            ValidationOutcome::fail(errors)
        }
    }
}

fn split_rule(expr: &str) -> (&str, &str) {
    expr.split_once(':').unwrap_or((expr, ""))
}

fn parse_target(params: &str) -> Option<f64> {
    params.trim().parse().ok()
}

fn parse_pair(params: &str) -> Option<(f64, f64)> {
    let (min, max) = params.split_once(',')?;
    Some((parse_target(min)?, parse_target(max)?))
}

fn invalid_params(rule: &str) -> String {
    format!("invalid parameters for rule '{rule}'")
}

// Override lookup order: `field.rule`, then `rule`, then the rule's own
// default. Overrides may reference the field through `:attribute`.
fn resolve_message(
    messages: &MessageOverrides,
    field: &str,
    rule: &str,
    label: &str,
    default: String,
) -> String {
    let scoped = format!("{field}.{rule}");
    messages
        .get(&scoped)
        .or_else(|| messages.get(rule))
        .map_or(default, |template| template.replace(":attribute", label))
}

///
/// TESTS
///

#[cfg(test)]
mod tests {
    use super::{PresenceVerifier, RuleEngine};
    use crate::core::{
        bag::AttributeBag,
        rules::RuleSet,
        traits::{AttributeLabels, MessageOverrides, Validator},
        value::Value,
    };
    use std::{cell::RefCell, rc::Rc};

    fn run(engine: &RuleEngine, data: &AttributeBag, rules: &RuleSet) -> super::ValidationOutcome {
        engine.validate(
            data,
            rules,
            &MessageOverrides::new(),
            &AttributeLabels::new(),
        )
    }

    #[test]
    fn passing_data_produces_empty_errors() {
        let engine = RuleEngine::new();
        let data = AttributeBag::new()
            .with("name", "ada")
            .with("email", "ada@example.com");
        let rules = RuleSet::new()
            .rule("name", "required|alpha")
            .rule("email", "required|email");

        let outcome = run(&engine, &data, &rules);
        assert!(outcome.passed);
        assert!(outcome.errors.is_empty());
    }

    #[test]
    fn each_failing_rule_adds_a_message() {
        let engine = RuleEngine::new();
        let data = AttributeBag::new().with("email", "nope");
        let rules = RuleSet::new().rule("email", "email|min:10");

        let outcome = run(&engine, &data, &rules);
        assert!(!outcome.passed);
        assert_eq!(outcome.errors.all("email").len(), 2);
    }

    #[test]
    fn non_required_rules_skip_absent_fields() {
        let engine = RuleEngine::new();
        let rules = RuleSet::new().rule("email", "email");

        let outcome = run(&engine, &AttributeBag::new(), &rules);
        assert!(outcome.passed);
    }

    #[test]
    fn unknown_rules_surface_as_failures() {
        let engine = RuleEngine::new();
        let data = AttributeBag::new().with("name", "ada");
        let rules = RuleSet::new().rule("name", "telepathic");

        let outcome = run(&engine, &data, &rules);
        assert_eq!(
            outcome.errors.first("name"),
            Some("unknown validation rule 'telepathic'")
        );
    }

    #[test]
    fn message_overrides_win_and_expand_attribute() {
        let engine = RuleEngine::new();
        let data = AttributeBag::new();
        let rules = RuleSet::new().rule("name", "required");

        let mut messages = MessageOverrides::new();
        messages.insert("required".to_string(), "give us the :attribute".to_string());
        let mut labels = AttributeLabels::new();
        labels.insert("name".to_string(), "full name".to_string());

        let outcome = engine.validate(&data, &rules, &messages, &labels);
        assert_eq!(outcome.errors.first("name"), Some("give us the full name"));
    }

    #[test]
    fn field_scoped_overrides_beat_rule_overrides() {
        let engine = RuleEngine::new();
        let data = AttributeBag::new();
        let rules = RuleSet::new().rule("name", "required");

        let mut messages = MessageOverrides::new();
        messages.insert("required".to_string(), "generic".to_string());
        messages.insert("name.required".to_string(), "specific".to_string());

        let outcome = engine.validate(&data, &rules, &messages, &AttributeLabels::new());
        assert_eq!(outcome.errors.first("name"), Some("specific"));
    }

    struct ScriptedVerifier {
        matches: usize,
        seen: Rc<RefCell<Vec<String>>>,
    }

    impl PresenceVerifier for ScriptedVerifier {
        fn count(
            &self,
            table: &str,
            column: &str,
            value: &Value,
            except: Option<&str>,
            id_column: &str,
        ) -> usize {
            self.seen.borrow_mut().push(format!(
                "{table}.{column}={value} except {except:?} via {id_column}"
            ));
            self.matches
        }
    }

    #[test]
    fn unique_consults_the_presence_verifier() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let engine = RuleEngine::new().with_presence_verifier(Box::new(ScriptedVerifier {
            matches: 1,
            seen: Rc::clone(&seen),
        }));
        let data = AttributeBag::new().with("email", "ada@example.com");
        let rules = RuleSet::new().rule("email", "unique:users,email,42,id");

        let outcome = run(&engine, &data, &rules);
        assert!(!outcome.passed);
        assert_eq!(
            outcome.errors.first("email"),
            Some("the email has already been taken")
        );
        assert_eq!(
            seen.borrow()[0],
            "users.email=ada@example.com except Some(\"42\") via id"
        );
    }

    #[test]
    fn unique_without_verifier_is_skipped() {
        let engine = RuleEngine::new();
        let data = AttributeBag::new().with("email", "ada@example.com");
        let rules = RuleSet::new().rule("email", "unique:users");

        assert!(run(&engine, &data, &rules).passed);
    }

    #[test]
    fn unique_without_table_is_a_config_failure() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let engine = RuleEngine::new().with_presence_verifier(Box::new(ScriptedVerifier {
            matches: 0,
            seen,
        }));
        let data = AttributeBag::new().with("email", "ada@example.com");
        let rules = RuleSet::new().rule("email", "unique");

        let outcome = run(&engine, &data, &rules);
        assert_eq!(
            outcome.errors.first("email"),
            Some("invalid parameters for rule 'unique'")
        );
    }
}
