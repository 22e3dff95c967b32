use std::fmt;

use serde::{Serialize, Serializer};

use super::capability::CapabilitySet;
use super::types::NormalizedName;

/// A resolved type reference.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IrType {
    String,
    /// 32-bit integer.
    Integer,
    /// 64-bit integer.
    Long,
    Float,
    Double,
    /// A number without a format; rendered as an arbitrary-precision decimal.
    Decimal,
    Boolean,
    Date,
    DateTime,
    /// Date-time with an explicit zone offset, substituted on request.
    OffsetDateTime,
    Binary,
    Array(Box<IrType>),
    Map(Box<IrType>),
    /// Reference to a model, by its key in `IrSpec::models`.
    Ref(String),
    Any,
}

/// Whether a numeric bound is rendered against an integral or a decimal type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NumericKind {
    Integer,
    Decimal,
}

impl fmt::Display for NumericKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NumericKind::Integer => "integer",
            NumericKind::Decimal => "decimal",
        })
    }
}

impl IrType {
    pub fn numeric_kind(&self) -> Option<NumericKind> {
        match self {
            IrType::Integer | IrType::Long => Some(NumericKind::Integer),
            IrType::Float | IrType::Double | IrType::Decimal => Some(NumericKind::Decimal),
            _ => None,
        }
    }

    pub fn is_date(&self) -> bool {
        matches!(
            self,
            IrType::Date | IrType::DateTime | IrType::OffsetDateTime
        )
    }

    pub fn is_floating(&self) -> bool {
        matches!(self, IrType::Float | IrType::Double | IrType::Decimal)
    }

    /// Types rendered as built-in scalars. Containers count as primitive when
    /// their element type does.
    pub fn is_primitive(&self) -> bool {
        match self {
            IrType::String
            | IrType::Integer
            | IrType::Long
            | IrType::Float
            | IrType::Double
            | IrType::Boolean
            | IrType::Binary
            | IrType::Any => true,
            IrType::Array(inner) | IrType::Map(inner) => inner.is_primitive(),
            IrType::Decimal
            | IrType::Date
            | IrType::DateTime
            | IrType::OffsetDateTime
            | IrType::Ref(_) => false,
        }
    }

    /// The primitives an alias model may be unwrapped to.
    pub fn is_unwrappable_primitive(&self) -> bool {
        matches!(
            self,
            IrType::String
                | IrType::Boolean
                | IrType::Double
                | IrType::Integer
                | IrType::Long
                | IrType::Float
        )
    }

    /// The element type of an array, if this is one.
    pub fn items(&self) -> Option<&IrType> {
        match self {
            IrType::Array(inner) => Some(inner),
            _ => None,
        }
    }
}

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IrType::String => f.write_str("string"),
            IrType::Integer => f.write_str("integer"),
            IrType::Long => f.write_str("long"),
            IrType::Float => f.write_str("float"),
            IrType::Double => f.write_str("double"),
            IrType::Decimal => f.write_str("decimal"),
            IrType::Boolean => f.write_str("boolean"),
            IrType::Date => f.write_str("date"),
            IrType::DateTime => f.write_str("date-time"),
            IrType::OffsetDateTime => f.write_str("offset-date-time"),
            IrType::Binary => f.write_str("binary"),
            IrType::Any => f.write_str("any"),
            IrType::Array(inner) => write!(f, "array<{inner}>"),
            IrType::Map(inner) => write!(f, "map<{inner}>"),
            IrType::Ref(name) => f.write_str(name),
        }
    }
}

impl Serialize for IrType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Validation constraints declared on a property or parameter.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Constraints {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_items: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
}

impl Constraints {
    pub fn has_size(&self) -> bool {
        self.min_length.is_some()
            || self.max_length.is_some()
            || self.min_items.is_some()
            || self.max_items.is_some()
    }
}

/// Vendor markers that mean a primitive-typed model is already wrapped in a
/// dedicated type and must not be treated as an alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "value")]
pub enum WrapperExtension {
    /// `x-ref`: the model stands for an externally referenced type.
    Reference(String),
    /// `x-complexType`
    ComplexType,
    /// `x-enumeration`: a primitive rendered as an enumeration class.
    Enumeration,
}

/// The structural shape of a model.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum ModelKind {
    Object,
    Enum { base: IrType, variants: Vec<String> },
    /// A named `type: array` schema.
    Array { items: IrType },
    /// A named schema with only `additionalProperties`.
    Map { values: IrType },
    Primitive { target: IrType },
}

/// Seeds for generated equality and hash support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HashSeeds {
    pub initial: u32,
    pub multiplier: u32,
}

/// A named model definition.
#[derive(Debug, Clone, Serialize)]
pub struct IrModel {
    pub name: NormalizedName,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub kind: ModelKind,
    pub properties: Vec<IrProperty>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrapper: Option<WrapperExtension>,

    // Derived during post-processing.
    pub is_alias: bool,
    pub simple: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash_seeds: Option<HashSeeds>,
    pub capabilities: CapabilitySet,
}

impl IrModel {
    pub fn new(name: NormalizedName, kind: ModelKind) -> Self {
        Self {
            name,
            description: None,
            kind,
            properties: Vec::new(),
            wrapper: None,
            is_alias: false,
            simple: false,
            hash_seeds: None,
            capabilities: CapabilitySet::default(),
        }
    }

    pub fn is_enum(&self) -> bool {
        matches!(self.kind, ModelKind::Enum { .. })
    }

    /// The wrapped primitive, when this model is a bare alias of one: a
    /// primitive-typed model that carries no wrapper marker and whose target
    /// can stand in for it. Any other target stays a model.
    pub fn alias_target(&self) -> Option<&IrType> {
        match (&self.kind, &self.wrapper) {
            (ModelKind::Primitive { target }, None) if target.is_unwrappable_primitive() => {
                Some(target)
            }
            _ => None,
        }
    }

    pub fn property(&self, original_name: &str) -> Option<&IrProperty> {
        self.properties
            .iter()
            .find(|p| p.original_name == original_name)
    }
}

/// A property on a model.
#[derive(Debug, Clone, Serialize)]
pub struct IrProperty {
    pub name: NormalizedName,
    pub original_name: String,
    pub property_type: IrType,
    pub required: bool,
    pub nullable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub constraints: Constraints,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub enum_values: Vec<String>,
    /// `x-use-offset-date-time`
    pub use_offset_date_time: bool,

    // Derived during post-processing.
    pub constant_name: String,
    pub cloneable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items_cloneable: Option<bool>,
    pub capabilities: CapabilitySet,
}

impl IrProperty {
    pub fn new(name: NormalizedName, original_name: &str, property_type: IrType) -> Self {
        Self {
            name,
            original_name: original_name.to_string(),
            property_type,
            required: false,
            nullable: false,
            description: None,
            constraints: Constraints::default(),
            enum_values: Vec::new(),
            use_offset_date_time: false,
            constant_name: String::new(),
            cloneable: false,
            items_cloneable: None,
            capabilities: CapabilitySet::default(),
        }
    }

    pub fn is_enum(&self) -> bool {
        !self.enum_values.is_empty()
    }
}
