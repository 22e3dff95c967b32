use std::fmt;

use indexmap::IndexSet;
use serde::{Serialize, Serializer};

use super::operations::HttpMethod;
use super::schemas::NumericKind;

/// JSON binding library the generated models are annotated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Serialization {
    Jackson,
    Gson,
}

impl fmt::Display for Serialization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Serialization::Jackson => "jackson",
            Serialization::Gson => "gson",
        })
    }
}

/// A supporting declaration an operation, parameter, property or model
/// needs when rendered.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Capability {
    PatternValidation,
    MinValidation(NumericKind),
    MaxValidation(NumericKind),
    NotNullValidation,
    SizeValidation,
    NestedValidation,
    DateFormat,
    /// Dates are rendered as local date-times; the zone must be dropped.
    OmitTimeZone,
    OffsetDateTime,
    EnumSerialization,
    EnumCreator,
    PropertyBinding(Serialization),
    ValueObjectSupport,
    Serializable,
    HttpMethod(HttpMethod),
    MatrixParameter,
    /// A model referenced by name from outside the model dictionary walk.
    ModelReference(String),
}

impl Capability {
    /// Whether this is a bean-validation tag, suppressed when validation is off.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Capability::PatternValidation
                | Capability::MinValidation(_)
                | Capability::MaxValidation(_)
                | Capability::NotNullValidation
                | Capability::SizeValidation
                | Capability::NestedValidation
        )
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Capability::PatternValidation => f.write_str("needs-pattern-validation"),
            Capability::MinValidation(kind) => write!(f, "needs-min-validation({kind})"),
            Capability::MaxValidation(kind) => write!(f, "needs-max-validation({kind})"),
            Capability::NotNullValidation => f.write_str("needs-not-null-validation"),
            Capability::SizeValidation => f.write_str("needs-size-validation"),
            Capability::NestedValidation => f.write_str("needs-nested-validation"),
            Capability::DateFormat => f.write_str("needs-date-format"),
            Capability::OmitTimeZone => f.write_str("omit-time-zone"),
            Capability::OffsetDateTime => f.write_str("needs-offset-date-time"),
            Capability::EnumSerialization => f.write_str("needs-enum-serialization"),
            Capability::EnumCreator => f.write_str("needs-enum-creator"),
            Capability::PropertyBinding(s) => write!(f, "needs-property-binding({s})"),
            Capability::ValueObjectSupport => f.write_str("needs-value-object-support"),
            Capability::Serializable => f.write_str("needs-serializable"),
            Capability::HttpMethod(m) => write!(f, "needs-http-method({m})"),
            Capability::MatrixParameter => f.write_str("needs-matrix-parameter"),
            Capability::ModelReference(name) => write!(f, "needs-model({name})"),
        }
    }
}

impl Serialize for Capability {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Insertion-ordered, union-only set of capabilities.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct CapabilitySet(IndexSet<Capability>);

impl CapabilitySet {
    /// Add a capability. Returns false if it was already present.
    pub fn insert(&mut self, capability: Capability) -> bool {
        self.0.insert(capability)
    }

    /// Union another set into this one, keeping first-seen order.
    pub fn union_with(&mut self, other: &CapabilitySet) {
        self.0.extend(other.0.iter().cloned());
    }

    pub fn contains(&self, capability: &Capability) -> bool {
        self.0.contains(capability)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Capability> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Rendered tags, in insertion order.
    pub fn tags(&self) -> Vec<String> {
        self.0.iter().map(ToString::to_string).collect()
    }
}

impl Extend<Capability> for CapabilitySet {
    fn extend<I: IntoIterator<Item = Capability>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl FromIterator<Capability> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Capability>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.tags().join(", "))
    }
}
