use indexmap::IndexMap;

/// A request type.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    /// The type of `null`
    Null,

    /// Boolean value
    Bool,

    /// Signed 64-bit integer
    I64,

    /// 64-bit float
    F64,

    /// String type
    String,

    /// A list of a single type
    List(Box<Type>),

    /// A mapping with named fields
    Mapping(TypeMapping),

    /// A type that could not be narrowed (e.g., elements of an empty list)
    Any,
}

/// Field types of a mapping, plus the source the mapping was read from (if any).
#[derive(Debug, Clone, PartialEq)]
pub struct TypeMapping {
    pub fields: IndexMap<String, Type>,
    pub source: Option<String>,
}

impl Type {
    pub fn list(ty: impl Into<Self>) -> Self {
        Self::List(Box::new(ty.into()))
    }

    pub fn mapping(fields: impl IntoIterator<Item = (String, Type)>) -> Self {
        Self::Mapping(TypeMapping {
            fields: fields.into_iter().collect(),
            source: None,
        })
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }

    pub fn is_bool(&self) -> bool {
        matches!(self, Self::Bool)
    }

    pub fn is_string(&self) -> bool {
        matches!(self, Self::String)
    }

    pub fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, Self::Mapping(_))
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::I64 | Self::F64)
    }

    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Self::Null | Self::Bool | Self::I64 | Self::F64 | Self::String
        )
    }

    /// Element type when the type is a sequence.
    pub fn as_item(&self) -> Option<&Type> {
        match self {
            Self::List(item) => Some(item),
            Self::String => Some(&Type::String),
            Self::Any => Some(&Type::Any),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&TypeMapping> {
        match self {
            Self::Mapping(mapping) => Some(mapping),
            _ => None,
        }
    }

    /// Returns `true` when the type (or any nested type) is a list.
    pub fn contains_list(&self) -> bool {
        match self {
            Self::List(_) => true,
            Self::Mapping(mapping) => mapping.fields.values().any(Type::contains_list),
            _ => false,
        }
    }

    /// Least common type of `self` and `other`.
    ///
    /// `Null` unifies with anything, integers widen to floats, and unrelated types become `Any`.
    pub fn unify(self, other: Type) -> Type {
        match (self, other) {
            (lhs, rhs) if lhs == rhs => lhs,
            (Type::Null, ty) | (ty, Type::Null) => ty,
            (Type::I64, Type::F64) | (Type::F64, Type::I64) => Type::F64,
            (Type::List(lhs), Type::List(rhs)) => Type::list(lhs.unify(*rhs)),
            (Type::Mapping(lhs), Type::Mapping(rhs)) => {
                if lhs.fields.len() != rhs.fields.len()
                    || !lhs.fields.keys().all(|name| rhs.fields.contains_key(name))
                {
                    return Type::Any;
                }

                let source = if lhs.source == rhs.source {
                    lhs.source
                } else {
                    None
                };
                let mut rhs = rhs.fields;
                let fields = lhs
                    .fields
                    .into_iter()
                    .map(|(name, ty)| {
                        let other = rhs.shift_remove(&name).unwrap_or(Type::Any);
                        (name, ty.unify(other))
                    })
                    .collect();

                Type::Mapping(TypeMapping { fields, source })
            }
            _ => Type::Any,
        }
    }
}

impl From<TypeMapping> for Type {
    fn from(value: TypeMapping) -> Self {
        Self::Mapping(value)
    }
}
