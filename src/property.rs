//! Typed property store
//!
//! Each algorithm instance owns one `PropertyStore`. Properties are declared
//! during `initialize()` and afterwards read and written either as typed
//! `PropertyValue`s or through their canonical text form, which is what the
//! history records and generated scripts carry.
//!
//! Lookup is case-insensitive; the declared spelling is preserved.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::datastore::{DataObject, DataStore, Dataset, DatasetGroup};
use crate::error::AlgoError;
use crate::validator::{SharedValidator, Validator};

/// Valid property names: a letter followed by letters, digits or underscores
static PROPERTY_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_]*$").expect("static regex"));

// ═══════════════════════════════════════════════════════════════
// Direction + Kind
// ═══════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Input,
    Output,
    InOut,
}

impl Direction {
    /// Read by the engine during validation
    pub fn is_input(self) -> bool {
        matches!(self, Direction::Input | Direction::InOut)
    }

    /// Written by the algorithm
    pub fn is_output(self) -> bool {
        matches!(self, Direction::Output | Direction::InOut)
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Input => write!(f, "Input"),
            Direction::Output => write!(f, "Output"),
            Direction::InOut => write!(f, "InOut"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyKind {
    Bool,
    Int,
    Float,
    Str,
    IntArray,
    FloatArray,
    StrArray,
    Dataset,
}

impl PropertyKind {
    /// Scalars written unquoted in scripts
    pub fn is_numeric(self) -> bool {
        matches!(self, PropertyKind::Bool | PropertyKind::Int | PropertyKind::Float)
    }
}

impl fmt::Display for PropertyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PropertyKind::Bool => "bool",
            PropertyKind::Int => "int",
            PropertyKind::Float => "float",
            PropertyKind::Str => "string",
            PropertyKind::IntArray => "int list",
            PropertyKind::FloatArray => "float list",
            PropertyKind::StrArray => "string list",
            PropertyKind::Dataset => "dataset",
        };
        f.write_str(s)
    }
}

// ═══════════════════════════════════════════════════════════════
// Values
// ═══════════════════════════════════════════════════════════════

/// Dataset-valued property: the name is the text form, the object is
/// resolved from the data store (inputs) or produced by the run (outputs)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataRef {
    pub name: String,
    pub object: Option<DataObject>,
}

impl DataRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            object: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    IntArray(Vec<i64>),
    FloatArray(Vec<f64>),
    StrArray(Vec<String>),
    Data(DataRef),
}

impl PropertyValue {
    pub fn kind(&self) -> PropertyKind {
        match self {
            PropertyValue::Bool(_) => PropertyKind::Bool,
            PropertyValue::Int(_) => PropertyKind::Int,
            PropertyValue::Float(_) => PropertyKind::Float,
            PropertyValue::Str(_) => PropertyKind::Str,
            PropertyValue::IntArray(_) => PropertyKind::IntArray,
            PropertyValue::FloatArray(_) => PropertyKind::FloatArray,
            PropertyValue::StrArray(_) => PropertyKind::StrArray,
            PropertyValue::Data(_) => PropertyKind::Dataset,
        }
    }

    /// Canonical text form
    pub fn to_text(&self) -> String {
        match self {
            PropertyValue::Bool(b) => if *b { "1" } else { "0" }.to_string(),
            PropertyValue::Int(i) => i.to_string(),
            PropertyValue::Float(f) => f.to_string(),
            PropertyValue::Str(s) => s.clone(),
            PropertyValue::IntArray(v) => join(v),
            PropertyValue::FloatArray(v) => join(v),
            PropertyValue::StrArray(v) => v.join(","),
            PropertyValue::Data(d) => d.name.clone(),
        }
    }

    /// Parse `text` as a value of `kind`
    ///
    /// Dataset names are returned unresolved; the store resolves them.
    pub fn parse(kind: PropertyKind, property: &str, text: &str) -> Result<Self, AlgoError> {
        let trimmed = text.trim();
        let bad = |what: &str| AlgoError::validation(property, format!("cannot parse '{text}' as {what}"));
        Ok(match kind {
            PropertyKind::Bool => match trimmed.to_ascii_lowercase().as_str() {
                "1" | "true" => PropertyValue::Bool(true),
                "0" | "false" => PropertyValue::Bool(false),
                _ => return Err(bad("bool")),
            },
            PropertyKind::Int => PropertyValue::Int(trimmed.parse().map_err(|_| bad("int"))?),
            PropertyKind::Float => {
                PropertyValue::Float(trimmed.parse().map_err(|_| bad("float"))?)
            }
            PropertyKind::Str => PropertyValue::Str(text.to_string()),
            PropertyKind::IntArray => PropertyValue::IntArray(
                split(trimmed)
                    .map(|s| s.parse().map_err(|_| bad("int list")))
                    .collect::<Result<_, _>>()?,
            ),
            PropertyKind::FloatArray => PropertyValue::FloatArray(
                split(trimmed)
                    .map(|s| s.parse().map_err(|_| bad("float list")))
                    .collect::<Result<_, _>>()?,
            ),
            PropertyKind::StrArray => {
                PropertyValue::StrArray(split(trimmed).map(str::to_string).collect())
            }
            PropertyKind::Dataset => PropertyValue::Data(DataRef::named(trimmed)),
        })
    }

    /// Empty string, empty list, or dataset without a name
    pub fn is_empty(&self) -> bool {
        match self {
            PropertyValue::Str(s) => s.is_empty(),
            PropertyValue::IntArray(v) => v.is_empty(),
            PropertyValue::FloatArray(v) => v.is_empty(),
            PropertyValue::StrArray(v) => v.is_empty(),
            PropertyValue::Data(d) => d.name.is_empty() && d.object.is_none(),
            PropertyValue::Bool(_) | PropertyValue::Int(_) | PropertyValue::Float(_) => false,
        }
    }

    /// Data object held by a dataset value
    pub fn data_object(&self) -> Option<&DataObject> {
        match self {
            PropertyValue::Data(d) => d.object.as_ref(),
            _ => None,
        }
    }
}

fn join<T: ToString>(v: &[T]) -> String {
    v.iter().map(ToString::to_string).collect::<Vec<_>>().join(",")
}

fn split(text: &str) -> impl Iterator<Item = &str> {
    text.split(',').map(str::trim).filter(|s| !s.is_empty())
}

impl From<bool> for PropertyValue {
    fn from(v: bool) -> Self {
        PropertyValue::Bool(v)
    }
}

impl From<i64> for PropertyValue {
    fn from(v: i64) -> Self {
        PropertyValue::Int(v)
    }
}

impl From<i32> for PropertyValue {
    fn from(v: i32) -> Self {
        PropertyValue::Int(v.into())
    }
}

impl From<f64> for PropertyValue {
    fn from(v: f64) -> Self {
        PropertyValue::Float(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        PropertyValue::Str(v.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        PropertyValue::Str(v)
    }
}

impl From<Vec<i64>> for PropertyValue {
    fn from(v: Vec<i64>) -> Self {
        PropertyValue::IntArray(v)
    }
}

impl From<Vec<f64>> for PropertyValue {
    fn from(v: Vec<f64>) -> Self {
        PropertyValue::FloatArray(v)
    }
}

impl From<Vec<String>> for PropertyValue {
    fn from(v: Vec<String>) -> Self {
        PropertyValue::StrArray(v)
    }
}

impl From<DataObject> for PropertyValue {
    fn from(v: DataObject) -> Self {
        PropertyValue::Data(DataRef {
            name: v.name().to_string(),
            object: Some(v),
        })
    }
}

impl From<Arc<Dataset>> for PropertyValue {
    fn from(v: Arc<Dataset>) -> Self {
        DataObject::Dataset(v).into()
    }
}

impl From<Arc<DatasetGroup>> for PropertyValue {
    fn from(v: Arc<DatasetGroup>) -> Self {
        DataObject::Group(v).into()
    }
}

/// Typed extraction from a property value
pub trait FromProperty: Sized {
    fn from_property(property: &str, value: &PropertyValue) -> Result<Self, AlgoError>;
}

fn mismatch(property: &str, expected: &str, value: &PropertyValue) -> AlgoError {
    AlgoError::TypeMismatch {
        property: property.to_string(),
        expected: expected.to_string(),
        found: value.kind().to_string(),
    }
}

macro_rules! impl_from_property {
    ($ty:ty, $variant:ident, $expected:literal) => {
        impl FromProperty for $ty {
            fn from_property(property: &str, value: &PropertyValue) -> Result<Self, AlgoError> {
                match value {
                    PropertyValue::$variant(v) => Ok(v.clone()),
                    other => Err(mismatch(property, $expected, other)),
                }
            }
        }
    };
}

impl_from_property!(bool, Bool, "bool");
impl_from_property!(i64, Int, "int");
impl_from_property!(String, Str, "string");
impl_from_property!(Vec<i64>, IntArray, "int list");
impl_from_property!(Vec<f64>, FloatArray, "float list");
impl_from_property!(Vec<String>, StrArray, "string list");

impl FromProperty for f64 {
    fn from_property(property: &str, value: &PropertyValue) -> Result<Self, AlgoError> {
        match value {
            PropertyValue::Float(v) => Ok(*v),
            PropertyValue::Int(v) => Ok(*v as f64),
            other => Err(mismatch(property, "float", other)),
        }
    }
}

impl FromProperty for DataObject {
    fn from_property(property: &str, value: &PropertyValue) -> Result<Self, AlgoError> {
        match value {
            PropertyValue::Data(DataRef {
                object: Some(obj), ..
            }) => Ok(obj.clone()),
            PropertyValue::Data(d) => Err(AlgoError::DataNotFound {
                name: d.name.clone(),
            }),
            other => Err(mismatch(property, "dataset", other)),
        }
    }
}

impl FromProperty for Arc<Dataset> {
    fn from_property(property: &str, value: &PropertyValue) -> Result<Self, AlgoError> {
        match DataObject::from_property(property, value)? {
            DataObject::Dataset(ds) => Ok(ds),
            DataObject::Group(_) => Err(AlgoError::TypeMismatch {
                property: property.to_string(),
                expected: "dataset".into(),
                found: "dataset group".into(),
            }),
        }
    }
}

impl FromProperty for Arc<DatasetGroup> {
    fn from_property(property: &str, value: &PropertyValue) -> Result<Self, AlgoError> {
        match DataObject::from_property(property, value)? {
            DataObject::Group(g) => Ok(g),
            DataObject::Dataset(_) => Err(AlgoError::TypeMismatch {
                property: property.to_string(),
                expected: "dataset group".into(),
                found: "dataset".into(),
            }),
        }
    }
}

// ═══════════════════════════════════════════════════════════════
// Property
// ═══════════════════════════════════════════════════════════════

/// One declared property
#[derive(Debug, Clone)]
pub struct Property {
    name: String,
    doc: String,
    direction: Direction,
    value: PropertyValue,
    default: PropertyValue,
    validator: Option<SharedValidator>,
    optional: bool,
}

impl Property {
    pub fn new(name: impl Into<String>, default: impl Into<PropertyValue>, direction: Direction) -> Self {
        let default = default.into();
        Self {
            name: name.into(),
            doc: String::new(),
            direction,
            value: default.clone(),
            default,
            validator: None,
            optional: false,
        }
    }

    pub fn input(name: impl Into<String>, default: impl Into<PropertyValue>) -> Self {
        Self::new(name, default, Direction::Input)
    }

    pub fn output(name: impl Into<String>, default: impl Into<PropertyValue>) -> Self {
        Self::new(name, default, Direction::Output)
    }

    /// Dataset-valued property with an empty default name
    pub fn dataset(name: impl Into<String>, direction: Direction) -> Self {
        Self::new(name, PropertyValue::Data(DataRef::default()), direction)
    }

    pub fn with_validator(mut self, validator: impl Validator + 'static) -> Self {
        self.validator = Some(Arc::new(validator));
        self
    }

    pub fn with_doc(mut self, doc: impl Into<String>) -> Self {
        self.doc = doc.into();
        self
    }

    /// Dataset inputs are required unless marked optional
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn doc(&self) -> &str {
        &self.doc
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn kind(&self) -> PropertyKind {
        self.default.kind()
    }

    pub fn value(&self) -> &PropertyValue {
        &self.value
    }

    pub fn default_value(&self) -> &PropertyValue {
        &self.default
    }

    pub fn validator(&self) -> Option<&SharedValidator> {
        self.validator.as_ref()
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn value_text(&self) -> String {
        self.value.to_text()
    }

    pub fn is_default(&self) -> bool {
        self.value.to_text() == self.default.to_text()
    }

    /// Problem with the current value, if any
    pub fn validity(&self) -> Option<String> {
        if self.kind() == PropertyKind::Dataset && self.direction.is_input() && !self.optional {
            if let PropertyValue::Data(d) = &self.value {
                if d.object.is_none() {
                    return Some(if d.name.is_empty() {
                        "a dataset is required".to_string()
                    } else {
                        format!("no data object named '{}'", d.name)
                    });
                }
            }
        }
        self.validator.as_ref().and_then(|v| v.check(&self.value))
    }

    fn coerce(&self, value: PropertyValue) -> Result<PropertyValue, AlgoError> {
        match (self.kind(), value) {
            (k, v) if v.kind() == k => Ok(v),
            (PropertyKind::Float, PropertyValue::Int(i)) => Ok(PropertyValue::Float(i as f64)),
            (PropertyKind::FloatArray, PropertyValue::IntArray(v)) => {
                Ok(PropertyValue::FloatArray(v.into_iter().map(|i| i as f64).collect()))
            }
            (_, v) => Err(mismatch(&self.name, &self.kind().to_string(), &v)),
        }
    }

    fn assign(&mut self, value: PropertyValue) -> Result<(), AlgoError> {
        let value = self.coerce(value)?;
        // Empty values pass here; Mandatory is enforced at validation time
        if !value.is_empty() {
            if let Some(reason) = self.validator.as_ref().and_then(|v| v.check(&value)) {
                return Err(AlgoError::validation(&self.name, reason));
            }
        }
        self.value = value;
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════
// PropertyStore
// ═══════════════════════════════════════════════════════════════

/// Ordered, named property container owned by one algorithm instance
#[derive(Debug, Clone, Default)]
pub struct PropertyStore {
    owner: String,
    properties: Vec<Property>,
}

impl PropertyStore {
    pub fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            properties: Vec::new(),
        }
    }

    /// Declare a property (during init only)
    pub fn declare(&mut self, property: Property) -> Result<(), AlgoError> {
        if !PROPERTY_NAME.is_match(&property.name) {
            return Err(AlgoError::InvalidPropertyName {
                property: property.name,
            });
        }
        if self.position(&property.name).is_some() {
            return Err(AlgoError::DuplicateProperty {
                property: property.name,
            });
        }
        self.properties.push(property);
        Ok(())
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.properties
            .iter()
            .position(|p| p.name.eq_ignore_ascii_case(name))
    }

    fn not_found(&self, name: &str) -> AlgoError {
        AlgoError::PropertyNotFound {
            algorithm: self.owner.clone(),
            property: name.to_string(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn property(&self, name: &str) -> Result<&Property, AlgoError> {
        self.position(name)
            .map(|i| &self.properties[i])
            .ok_or_else(|| self.not_found(name))
    }

    pub fn value(&self, name: &str) -> Result<&PropertyValue, AlgoError> {
        self.property(name).map(Property::value)
    }

    /// Typed read
    pub fn get<T: FromProperty>(&self, name: &str) -> Result<T, AlgoError> {
        let prop = self.property(name)?;
        T::from_property(&prop.name, &prop.value)
    }

    /// Typed write, checked against the declared kind and validator
    pub fn set(&mut self, name: &str, value: impl Into<PropertyValue>) -> Result<(), AlgoError> {
        let idx = self.position(name).ok_or_else(|| self.not_found(name))?;
        self.properties[idx].assign(value.into())
    }

    /// Canonical text of a property value
    pub fn get_text(&self, name: &str) -> Result<String, AlgoError> {
        self.property(name).map(Property::value_text)
    }

    /// Text write; dataset inputs are resolved against `data`
    pub fn set_text(&mut self, name: &str, text: &str, data: &DataStore) -> Result<(), AlgoError> {
        let idx = self.position(name).ok_or_else(|| self.not_found(name))?;
        let prop = &self.properties[idx];
        let mut value = PropertyValue::parse(prop.kind(), &prop.name, text)?;

        if let PropertyValue::Data(data_ref) = &mut value {
            if prop.direction.is_input() && !data_ref.name.is_empty() {
                match data.get(&data_ref.name) {
                    Some(obj) => data_ref.object = Some(obj),
                    None if prop.direction == Direction::Input => {
                        return Err(AlgoError::validation(
                            &prop.name,
                            format!("no data object named '{}'", data_ref.name),
                        ));
                    }
                    None => {}
                }
            }
        }
        self.properties[idx].assign(value)
    }

    /// Reset a property to its declared default
    pub fn reset(&mut self, name: &str) -> Result<(), AlgoError> {
        let idx = self.position(name).ok_or_else(|| self.not_found(name))?;
        let prop = &mut self.properties[idx];
        prop.value = prop.default.clone();
        Ok(())
    }

    /// Problems with all Input/InOut properties, keyed by property name
    pub fn validate(&self) -> BTreeMap<String, String> {
        self.properties
            .iter()
            .filter(|p| p.direction.is_input())
            .filter_map(|p| p.validity().map(|reason| (p.name.clone(), reason)))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Property> {
        self.properties.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.properties.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::{Bounded, Mandatory, OneOf};

    fn store() -> PropertyStore {
        let mut s = PropertyStore::new("Scale");
        s.declare(Property::input("Factor", 1.0).with_validator(Bounded::at_least(0.0)))
            .unwrap();
        s.declare(Property::input("Operation", "Multiply").with_validator(OneOf::new(["Multiply", "Add"])))
            .unwrap();
        s.declare(Property::input("Flag", false)).unwrap();
        s.declare(Property::input("Indices", Vec::<i64>::new())).unwrap();
        s.declare(Property::dataset("InputDataset", Direction::Input)).unwrap();
        s.declare(Property::dataset("OutputDataset", Direction::Output)).unwrap();
        s
    }

    // ═══════════════════════════════════════════════════════════════
    // Declaration
    // ═══════════════════════════════════════════════════════════════

    #[test]
    fn duplicate_names_rejected_case_insensitively() {
        let mut s = store();
        let err = s.declare(Property::input("factor", 2.0)).unwrap_err();
        assert!(matches!(err, AlgoError::DuplicateProperty { .. }));
    }

    #[test]
    fn invalid_names_rejected() {
        let mut s = PropertyStore::new("T");
        assert!(matches!(
            s.declare(Property::input("1abc", 0.0)).unwrap_err(),
            AlgoError::InvalidPropertyName { .. }
        ));
        assert!(s.declare(Property::input("with space", 0.0)).is_err());
    }

    // ═══════════════════════════════════════════════════════════════
    // Text round-trip
    // ═══════════════════════════════════════════════════════════════

    #[test]
    fn text_round_trip_is_canonical() {
        let mut s = store();
        let data = DataStore::new();

        s.set_text("Factor", "2.50", &data).unwrap();
        assert_eq!(s.get_text("Factor").unwrap(), "2.5");

        s.set_text("Flag", "TRUE", &data).unwrap();
        assert_eq!(s.get_text("Flag").unwrap(), "1");

        s.set_text("Indices", "1, 2,3", &data).unwrap();
        assert_eq!(s.get_text("Indices").unwrap(), "1,2,3");

        s.set_text("Operation", "Add", &data).unwrap();
        assert_eq!(s.get_text("operation").unwrap(), "Add");
    }

    #[test]
    fn parse_failure_is_validation_error() {
        let mut s = store();
        let err = s.set_text("Factor", "abc", &DataStore::new()).unwrap_err();
        assert!(matches!(err, AlgoError::Validation { .. }));
        assert_eq!(s.get_text("Factor").unwrap(), "1");
    }

    #[test]
    fn validator_rejects_on_set() {
        let mut s = store();
        assert!(s.set("Factor", -1.0).is_err());
        assert!(s.set("Operation", "Divide").is_err());
        assert_eq!(s.get::<f64>("Factor").unwrap(), 1.0);
    }

    #[test]
    fn unknown_property() {
        let s = store();
        let err = s.get_text("Nope").unwrap_err();
        assert!(matches!(err, AlgoError::PropertyNotFound { .. }));
    }

    #[test]
    fn int_coerces_to_float() {
        let mut s = store();
        s.set("Factor", 3i64).unwrap();
        assert_eq!(s.get::<f64>("Factor").unwrap(), 3.0);
    }

    #[test]
    fn kind_mismatch_rejected() {
        let mut s = store();
        let err = s.set("Flag", "yes").unwrap_err();
        assert!(matches!(err, AlgoError::TypeMismatch { .. }));
    }

    // ═══════════════════════════════════════════════════════════════
    // Datasets
    // ═══════════════════════════════════════════════════════════════

    #[test]
    fn dataset_input_resolves_from_store() {
        let data = DataStore::new();
        data.add(Dataset::from_values("raw", vec![1.0, 2.0]));
        let mut s = store();

        s.set_text("InputDataset", "raw", &data).unwrap();
        let ds: Arc<Dataset> = s.get("InputDataset").unwrap();
        assert_eq!(ds.y(), &[1.0, 2.0]);

        let err = s.set_text("InputDataset", "missing", &data).unwrap_err();
        assert!(err.to_string().contains("missing"));
    }

    #[test]
    fn output_dataset_takes_name_only() {
        let mut s = store();
        s.set_text("OutputDataset", "out", &DataStore::new()).unwrap();
        assert_eq!(s.get_text("OutputDataset").unwrap(), "out");
        assert!(s.value("OutputDataset").unwrap().data_object().is_none());
    }

    #[test]
    fn validate_reports_missing_dataset_and_mandatory() {
        let mut s = store();
        s.declare(Property::input("Label", "").with_validator(Mandatory)).unwrap();
        let problems = s.validate();
        assert_eq!(problems.len(), 2);
        assert!(problems.contains_key("InputDataset"));
        assert!(problems.contains_key("Label"));
        assert!(!problems.contains_key("OutputDataset"));
    }

    #[test]
    fn is_default_tracks_text() {
        let mut s = store();
        assert!(s.property("Factor").unwrap().is_default());
        s.set("Factor", 2.0).unwrap();
        assert!(!s.property("Factor").unwrap().is_default());
        s.reset("Factor").unwrap();
        assert!(s.property("Factor").unwrap().is_default());
    }
}
