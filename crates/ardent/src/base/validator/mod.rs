pub mod len;
pub mod num;
pub mod text;

use crate::core::{bag::AttributeBag, value::Value};

///
/// FieldContext
///
/// One field under validation: its raw name, display label, current value
/// (absent fields carry `None`), and the full bag for cross-field rules.
///

pub struct FieldContext<'a> {
    pub field: &'a str,
    pub label: &'a str,
    pub value: Option<&'a Value>,
    pub data: &'a AttributeBag,
}

///
/// RuleCheck
///
/// One rule applied to one field. `None` means the rule passes. Rules other
/// than `Required` skip absent fields.
///

pub trait RuleCheck {
    fn check(&self, ctx: &FieldContext<'_>) -> Option<String>;
}

// A field counts as present when it carries a non-null value.
pub(crate) fn present<'a>(ctx: &FieldContext<'a>) -> Option<&'a Value> {
    ctx.value.filter(|value| !value.is_null())
}

///
/// Required
///

pub struct Required;

impl RuleCheck for Required {
    fn check(&self, ctx: &FieldContext<'_>) -> Option<String> {
        let missing = match ctx.value {
            None => true,
            Some(Value::Null) => true,
            Some(Value::Text(s)) => s.is_empty(),
            Some(_) => false,
        };

        missing.then(|| format!("the {} field is required", ctx.label))
    }
}

///
/// InSet
///

pub struct InSet {
    allowed: Vec<String>,
}

impl InSet {
    #[must_use]
    pub fn new<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
        }
    }
}

impl RuleCheck for InSet {
    fn check(&self, ctx: &FieldContext<'_>) -> Option<String> {
        let value = present(ctx)?;
        let rendered = value.to_string();

        if self.allowed.iter().any(|allowed| allowed == &rendered) {
            None
        } else {
            Some(format!("the selected {} is invalid", ctx.label))
        }
    }
}

///
/// Confirmed
/// The field must equal its `{field}_confirmation` twin.
///

pub struct Confirmed;

impl RuleCheck for Confirmed {
    fn check(&self, ctx: &FieldContext<'_>) -> Option<String> {
        let value = present(ctx)?;
        let twin = format!("{}_confirmation", ctx.field);

        if ctx.data.get(&twin) == Some(value) {
            None
        } else {
            Some(format!("the {} confirmation does not match", ctx.label))
        }
    }
}

///
/// TESTS
///
