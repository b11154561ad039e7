//! Property validators
//!
//! A validator inspects a candidate value and returns `Some(reason)` when it
//! rejects it. Validators are shared (`Arc`) between a declared property and
//! its copies made during group fan-out.

use std::fmt::Debug;
use std::sync::Arc;

use crate::property::PropertyValue;

/// Check applied to a property value before it is accepted
pub trait Validator: Send + Sync + Debug {
    /// Return the rejection reason, or `None` when the value is acceptable
    fn check(&self, value: &PropertyValue) -> Option<String>;

    /// Allowed values, for list-like validators (used by `describe`)
    fn allowed_values(&self) -> Vec<String> {
        Vec::new()
    }
}

pub type SharedValidator = Arc<dyn Validator>;

/// Numeric bounds, inclusive on both ends
#[derive(Debug, Clone, Copy, Default)]
pub struct Bounded {
    lower: Option<f64>,
    upper: Option<f64>,
}

impl Bounded {
    pub fn new(lower: f64, upper: f64) -> Self {
        Self {
            lower: Some(lower),
            upper: Some(upper),
        }
    }

    pub fn at_least(lower: f64) -> Self {
        Self {
            lower: Some(lower),
            upper: None,
        }
    }

    pub fn at_most(upper: f64) -> Self {
        Self {
            lower: None,
            upper: Some(upper),
        }
    }

    /// Any number except NaN
    pub fn any() -> Self {
        Self::default()
    }

    fn check_one(&self, v: f64) -> Option<String> {
        if v.is_nan() {
            return Some("NaN is not a valid number".to_string());
        }
        if let Some(lo) = self.lower {
            if v < lo {
                return Some(format!("{v} is below the lower bound {lo}"));
            }
        }
        if let Some(hi) = self.upper {
            if v > hi {
                return Some(format!("{v} is above the upper bound {hi}"));
            }
        }
        None
    }
}

impl Validator for Bounded {
    fn check(&self, value: &PropertyValue) -> Option<String> {
        match value {
            PropertyValue::Int(i) => self.check_one(*i as f64),
            PropertyValue::Float(f) => self.check_one(*f),
            PropertyValue::IntArray(v) => v.iter().find_map(|i| self.check_one(*i as f64)),
            PropertyValue::FloatArray(v) => v.iter().find_map(|f| self.check_one(*f)),
            other => Some(format!("bounds do not apply to {}", other.kind())),
        }
    }
}

/// Value must be one of a fixed list of strings
#[derive(Debug, Clone)]
pub struct OneOf {
    allowed: Vec<String>,
}

impl OneOf {
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

impl Validator for OneOf {
    fn check(&self, value: &PropertyValue) -> Option<String> {
        let text = value.to_text();
        if self.allowed.iter().any(|a| a == &text) {
            None
        } else {
            Some(format!(
                "'{}' is not one of [{}]",
                text,
                self.allowed.join(", ")
            ))
        }
    }

    fn allowed_values(&self) -> Vec<String> {
        self.allowed.clone()
    }
}

/// Value must be set to something non-empty
#[derive(Debug, Clone, Copy, Default)]
pub struct Mandatory;

impl Validator for Mandatory {
    fn check(&self, value: &PropertyValue) -> Option<String> {
        if value.is_empty() {
            Some("a value is required".to_string())
        } else {
            None
        }
    }
}

/// Array must contain at least `min` elements
#[derive(Debug, Clone, Copy)]
pub struct MinLength {
    min: usize,
}

impl MinLength {
    pub fn new(min: usize) -> Self {
        Self { min }
    }
}

impl Validator for MinLength {
    fn check(&self, value: &PropertyValue) -> Option<String> {
        let len = match value {
            PropertyValue::IntArray(v) => v.len(),
            PropertyValue::FloatArray(v) => v.len(),
            PropertyValue::StrArray(v) => v.len(),
            PropertyValue::Str(s) => s.len(),
            other => return Some(format!("length does not apply to {}", other.kind())),
        };
        (len < self.min).then(|| format!("needs at least {} elements, got {len}", self.min))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounded_accepts_inside_range() {
        let v = Bounded::new(0.0, 10.0);
        assert!(v.check(&PropertyValue::Float(5.0)).is_none());
        assert!(v.check(&PropertyValue::Int(10)).is_none());
    }

    #[test]
    fn bounded_rejects_outside_range() {
        let v = Bounded::at_least(1.0);
        let reason = v.check(&PropertyValue::Float(0.5)).unwrap();
        assert!(reason.contains("lower bound"));
        assert!(Bounded::at_most(2.0)
            .check(&PropertyValue::FloatArray(vec![1.0, 3.0]))
            .is_some());
    }

    #[test]
    fn bounded_rejects_nan() {
        assert!(Bounded::any().check(&PropertyValue::Float(-3.0)).is_none());
        assert!(Bounded::any()
            .check(&PropertyValue::Float(f64::NAN))
            .unwrap()
            .contains("NaN"));
        assert!(Bounded::new(0.0, 1.0)
            .check(&PropertyValue::FloatArray(vec![0.5, f64::NAN]))
            .is_some());
    }

    #[test]
    fn bounded_rejects_strings() {
        assert!(Bounded::new(0.0, 1.0)
            .check(&PropertyValue::Str("x".into()))
            .is_some());
    }

    #[test]
    fn one_of_lists_allowed_values() {
        let v = OneOf::new(["Multiply", "Add"]);
        assert!(v.check(&PropertyValue::Str("Add".into())).is_none());
        assert!(v.check(&PropertyValue::Str("Divide".into())).is_some());
        assert_eq!(v.allowed_values(), vec!["Multiply", "Add"]);
    }

    #[test]
    fn mandatory_rejects_empty() {
        assert!(Mandatory.check(&PropertyValue::Str(String::new())).is_some());
        assert!(Mandatory.check(&PropertyValue::Str("x".into())).is_none());
    }

    #[test]
    fn min_length() {
        let v = MinLength::new(2);
        assert!(v.check(&PropertyValue::FloatArray(vec![1.0])).is_some());
        assert!(v.check(&PropertyValue::FloatArray(vec![1.0, 2.0])).is_none());
    }
}
