#![allow(clippy::cast_precision_loss)]

use crate::{
    base::validator::{FieldContext, RuleCheck, present},
    core::value::Value,
};

// Magnitude for native numbers, length for text and lists.
enum Measure {
    Magnitude(f64),
    Length(usize),
}

fn measure(value: &Value) -> Option<Measure> {
    if let Some(number) = value.as_f64() {
        return Some(Measure::Magnitude(number));
    }

    value.len().map(Measure::Length)
}

fn unmeasurable(ctx: &FieldContext<'_>) -> String {
    format!("the {} cannot be measured for size rules", ctx.label)
}

///
/// Min
///

pub struct Min {
    target: f64,
}

impl Min {
    #[must_use]
    pub const fn new(target: f64) -> Self {
        Self { target }
    }
}

impl RuleCheck for Min {
    fn check(&self, ctx: &FieldContext<'_>) -> Option<String> {
        let value = present(ctx)?;
        match measure(value) {
            Some(Measure::Magnitude(n)) if n < self.target => Some(format!(
                "the {} must be at least {}",
                ctx.label, self.target
            )),
            Some(Measure::Length(len)) if (len as f64) < self.target => Some(format!(
                "the {} length ({len}) is lower than minimum of {}",
                ctx.label, self.target
            )),
            Some(_) => None,
            None => Some(unmeasurable(ctx)),
        }
    }
}

///
/// Max
///

pub struct Max {
    target: f64,
}

impl Max {
    #[must_use]
    pub const fn new(target: f64) -> Self {
        Self { target }
    }
}

impl RuleCheck for Max {
    fn check(&self, ctx: &FieldContext<'_>) -> Option<String> {
        let value = present(ctx)?;
        match measure(value) {
            Some(Measure::Magnitude(n)) if n > self.target => Some(format!(
                "the {} may not be greater than {}",
                ctx.label, self.target
            )),
            Some(Measure::Length(len)) if (len as f64) > self.target => Some(format!(
                "the {} length ({len}) is greater than maximum of {}",
                ctx.label, self.target
            )),
            Some(_) => None,
            None => Some(unmeasurable(ctx)),
        }
    }
}

///
/// Between
///

pub struct Between {
    min: f64,
    max: f64,
}

impl Between {
    #[must_use]
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
}

impl RuleCheck for Between {
    fn check(&self, ctx: &FieldContext<'_>) -> Option<String> {
        let value = present(ctx)?;
        let out_of_bounds = |n: f64| n < self.min || n > self.max;

        match measure(value) {
            Some(Measure::Magnitude(n)) if out_of_bounds(n) => Some(format!(
                "the {} must be between {} and {}",
                ctx.label, self.min, self.max
            )),
            Some(Measure::Length(len)) if out_of_bounds(len as f64) => Some(format!(
                "the {} length ({len}) must be between {} and {} (inclusive)",
                ctx.label, self.min, self.max
            )),
            Some(_) => None,
            None => Some(unmeasurable(ctx)),
        }
    }
}

///
/// Size
/// Exact magnitude or length.
///

pub struct Size {
    target: f64,
}

impl Size {
    #[must_use]
    pub const fn new(target: f64) -> Self {
        Self { target }
    }
}

impl RuleCheck for Size {
    fn check(&self, ctx: &FieldContext<'_>) -> Option<String> {
        let value = present(ctx)?;
        let matches = match measure(value) {
            Some(Measure::Magnitude(n)) => (n - self.target).abs() < f64::EPSILON,
            Some(Measure::Length(len)) => (len as f64 - self.target).abs() < f64::EPSILON,
            None => return Some(unmeasurable(ctx)),
        };

        if matches {
            None
        } else {
            Some(format!("the {} must be exactly {}", ctx.label, self.target))
        }
    }
}

///
/// TESTS
///
