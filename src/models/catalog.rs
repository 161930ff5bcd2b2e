//! Shapes returned by the remote data source.

use mongodb::bson::{Bson, Document};
use serde::{Deserialize, Serialize};

/// A database as listed by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseInfo {
    pub name: String,
}

impl DatabaseInfo {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Collection type as reported by `listCollections`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionKind {
    #[default]
    Collection,
    View,
    Timeseries,
}

impl CollectionKind {
    pub fn label(self) -> &'static str {
        match self {
            CollectionKind::Collection => "collection",
            CollectionKind::View => "view",
            CollectionKind::Timeseries => "timeseries",
        }
    }
}

/// A collection as listed by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionInfo {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: CollectionKind,
}

impl CollectionInfo {
    pub fn new(name: impl Into<String>, kind: CollectionKind) -> Self {
        Self { name: name.into(), kind }
    }

    pub fn is_system(&self) -> bool {
        self.name.starts_with("system.")
    }
}

/// Index definition: `{ v, key, name }`.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexDefinition {
    pub name: String,
    /// Key -> direction/kind, in declaration order.
    pub key: Document,
    pub version: Option<i32>,
}

impl IndexDefinition {
    pub fn new(name: impl Into<String>, key: Document) -> Self {
        Self { name: name.into(), key, version: None }
    }

    /// Index keys with their decoded kind, in declaration order.
    pub fn keys(&self) -> Vec<(String, IndexKeyType)> {
        self.key
            .iter()
            .map(|(field, value)| (field.clone(), IndexKeyType::from_bson(value)))
            .collect()
    }
}

/// Kind of a single index key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexKeyType {
    Ascending,
    Descending,
    Text,
    Hashed,
    Geo,
    Geosphere,
    GeoHaystack,
    Other(String),
}

impl IndexKeyType {
    pub fn from_bson(value: &Bson) -> Self {
        let numeric = match value {
            Bson::Int32(v) => Some(*v as f64),
            Bson::Int64(v) => Some(*v as f64),
            Bson::Double(v) => Some(*v),
            _ => None,
        };
        if let Some(n) = numeric {
            return if n == 1.0 {
                IndexKeyType::Ascending
            } else if n == -1.0 {
                IndexKeyType::Descending
            } else {
                IndexKeyType::Other(n.to_string())
            };
        }

        match value {
            Bson::String(kind) => match kind.as_str() {
                "text" => IndexKeyType::Text,
                "hashed" => IndexKeyType::Hashed,
                "2d" => IndexKeyType::Geo,
                "2dsphere" => IndexKeyType::Geosphere,
                "geoHaystack" => IndexKeyType::GeoHaystack,
                other => IndexKeyType::Other(other.to_string()),
            },
            other => IndexKeyType::Other(other.to_string()),
        }
    }

    /// Human label shown next to the key; empty for unknown kinds.
    pub fn display_name(&self) -> &'static str {
        match self {
            IndexKeyType::Ascending => "Ascending",
            IndexKeyType::Descending => "Descending",
            IndexKeyType::Text => "Text",
            IndexKeyType::Hashed => "Hashed",
            IndexKeyType::Geo | IndexKeyType::Geosphere | IndexKeyType::GeoHaystack => {
                "Geospatial"
            }
            IndexKeyType::Other(_) => "",
        }
    }
}

/// An Atlas stream processor as listed by a stream processing instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamProcessorInfo {
    pub name: String,
    pub state: String,
}

/// One change stream notification, reduced to what the tree renders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub operation_type: String,
    pub id: String,
}
