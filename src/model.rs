//! The documentation tree handed to the renderer.
//!
//! Everything here is plain data. It is built once by [`crate::module`] and
//! never mutated afterwards.

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

/// A name with its rendered type. `name` is empty for unnamed results and
/// embedded fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NamedValue {
    pub name: String,
    #[serde(rename = "type")]
    pub typ: String,
}

impl NamedValue {
    pub fn new(name: impl Into<String>, typ: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            typ: typ.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Function {
    pub name: String,
    pub doc: String,
    pub arguments: Vec<NamedValue>,
    pub results: Vec<NamedValue>,
}

/// What a type declaration is made of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    Struct,
    Interface,
    /// The identifier a type is defined from (`int`, `error`), empty for any other shape.
    Other(String),
}

impl TypeKind {
    pub fn as_str(&self) -> &str {
        match self {
            TypeKind::Struct => "struct",
            TypeKind::Interface => "interface",
            TypeKind::Other(s) => s,
        }
    }
}

impl Serialize for TypeKind {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeDoc {
    pub name: String,
    pub doc: String,
    pub kind: TypeKind,
    /// Struct fields in declaration order; empty for every other kind.
    pub fields: Vec<NamedValue>,
    /// Always empty: interface and receiver methods are not extracted.
    pub methods: Vec<Function>,
}

/// A constant or variable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Value {
    pub name: String,
    /// Initializer text; empty when there is none.
    pub value: String,
    #[serde(rename = "type")]
    pub typ: String,
    pub doc: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PackageDoc {
    pub overview: String,
    pub constants: Vec<Value>,
    pub variables: Vec<Value>,
    pub types: Vec<TypeDoc>,
    pub functions: Vec<Function>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Package {
    pub name: String,
    /// Slash-separated path relative to the module root.
    pub reference: String,
    pub documentation: PackageDoc,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dependency {
    pub path: String,
    pub version: String,
    pub indirect: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Module {
    pub name: String,
    pub version: String,
    pub release_date: DateTime<Utc>,
    pub license: String,
    /// README rendered to HTML.
    pub readme: Option<String>,
    pub documentation: PackageDoc,
    pub packages: Vec<Package>,
    pub source_files: Vec<String>,
    pub dependencies: Vec<Dependency>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_serializes_as_plain_string() {
        let t = TypeDoc {
            name: "ID".into(),
            doc: String::new(),
            kind: TypeKind::Other("int64".into()),
            fields: vec![],
            methods: vec![],
        };
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["kind"], "int64");
        assert_eq!(json["methods"], serde_json::json!([]));

        let json = serde_json::to_value(TypeKind::Struct).unwrap();
        assert_eq!(json, "struct");
    }

    #[test]
    fn named_value_uses_type_key() {
        let json = serde_json::to_value(NamedValue::new("", "error")).unwrap();
        assert_eq!(json, serde_json::json!({"name": "", "type": "error"}));
    }
}
