use crate::{
    base::validator::{FieldContext, RuleCheck, present},
    core::value::Value,
};

// Text rules fail non-text values outright; a number is never a valid email.
fn text_value<'a>(ctx: &FieldContext<'a>) -> Option<Result<&'a str, String>> {
    let value = present(ctx)?;
    match value {
        Value::Text(s) => Some(Ok(s)),
        _ => Some(Err(format!("the {} must be text", ctx.label))),
    }
}

///
/// Email
/// Deliberately modest shape check: one `@`, non-empty local part, dotted
/// domain, no whitespace.
///

pub struct Email;

impl RuleCheck for Email {
    fn check(&self, ctx: &FieldContext<'_>) -> Option<String> {
        let s = match text_value(ctx)? {
            Ok(s) => s,
            Err(message) => return Some(message),
        };

        let valid = s.split_once('@').is_some_and(|(local, domain)| {
            !local.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !s.chars().any(char::is_whitespace)
        });

        if valid {
            None
        } else {
            Some(format!("the {} must be a valid email address", ctx.label))
        }
    }
}

///
/// Alpha
/// Unicode `is_alphabetic`; ASCII-only input is not enforced here.
///

pub struct Alpha;

impl RuleCheck for Alpha {
    fn check(&self, ctx: &FieldContext<'_>) -> Option<String> {
        let s = match text_value(ctx)? {
            Ok(s) => s,
            Err(message) => return Some(message),
        };

        if s.chars().all(char::is_alphabetic) {
            None
        } else {
            Some(format!("the {} may only contain letters", ctx.label))
        }
    }
}

///
/// AlphaNum
///

pub struct AlphaNum;

impl RuleCheck for AlphaNum {
    fn check(&self, ctx: &FieldContext<'_>) -> Option<String> {
        let s = match text_value(ctx)? {
            Ok(s) => s,
            Err(message) => return Some(message),
        };

        if s.chars().all(char::is_alphanumeric) {
            None
        } else {
            Some(format!(
                "the {} may only contain letters and numbers",
                ctx.label
            ))
        }
    }
}

///
/// Url
///

pub struct Url;

impl RuleCheck for Url {
    fn check(&self, ctx: &FieldContext<'_>) -> Option<String> {
        let s = match text_value(ctx)? {
            Ok(s) => s,
            Err(message) => return Some(message),
        };

        let valid = ["http://", "https://"]
            .iter()
            .any(|scheme| s.len() > scheme.len() && s.starts_with(scheme))
            && !s.chars().any(char::is_whitespace);

        if valid {
            None
        } else {
            Some(format!("the {} must be a valid url", ctx.label))
        }
    }
}

///
/// TESTS
///
