use crate::{
    base::validator::{FieldContext, RuleCheck, present},
    core::value::Value,
};

///
/// Numeric
/// Native numbers pass; text passes when it parses as a number, since
/// request hydration delivers form input as text.
///

pub struct Numeric;

impl RuleCheck for Numeric {
    fn check(&self, ctx: &FieldContext<'_>) -> Option<String> {
        let value = present(ctx)?;
        let numeric = match value {
            Value::Int(_) | Value::Uint(_) | Value::Float(_) => true,
            Value::Text(s) => s.parse::<f64>().is_ok(),
            _ => false,
        };

        if numeric {
            None
        } else {
            Some(format!("the {} must be a number", ctx.label))
        }
    }
}

///
/// Integer
///

pub struct Integer;

impl RuleCheck for Integer {
    fn check(&self, ctx: &FieldContext<'_>) -> Option<String> {
        let value = present(ctx)?;
        let integral = match value {
            Value::Int(_) | Value::Uint(_) => true,
            Value::Text(s) => s.parse::<i64>().is_ok(),
            _ => false,
        };

        if integral {
            None
        } else {
            Some(format!("the {} must be an integer", ctx.label))
        }
    }
}

///
/// TESTS
///
