//! Schema inference over a sample of documents.
//!
//! Fields keep the order in which they were first seen in the sample. Array
//! values are described by a synthetic `[*]` element field covering every item.

use indexmap::IndexMap;
use mongodb::bson::{Bson, Document};

/// Name of the synthetic field describing array elements.
pub const ARRAY_ELEMENT_NAME: &str = "[*]";

pub const DOCUMENT_TYPE: &str = "Document";
pub const ARRAY_TYPE: &str = "Array";

/// One observed BSON type of a field.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaType {
    pub name: String,
    pub count: u64,
    /// Share of this field's values that had this type.
    pub probability: f64,
}

/// Inferred description of a single field.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaField {
    pub name: String,
    pub path: String,
    /// Fraction of sampled parents that contained the field.
    pub probability: f64,
    pub types: Vec<SchemaType>,
    /// Nested fields when the field holds documents.
    pub fields: Vec<SchemaField>,
    /// Element descriptor when the field holds arrays.
    pub element: Option<Box<SchemaField>>,
}

impl SchemaField {
    /// The type name when the field has exactly one type.
    pub fn single_type(&self) -> Option<&str> {
        match self.types.as_slice() {
            [only] => Some(only.name.as_str()),
            _ => None,
        }
    }

    /// Missing from some parents or seen with more than one type.
    pub fn is_mixed(&self) -> bool {
        self.probability < 1.0 || self.single_type().is_none()
    }

    /// Type label rendered next to the field.
    pub fn type_label(&self) -> &str {
        if self.is_mixed() {
            return "mixed-type";
        }
        self.single_type().unwrap_or("mixed-type")
    }

    /// Deterministic documents and arrays can be drilled into.
    pub fn is_expandable(&self) -> bool {
        !self.is_mixed() && matches!(self.single_type(), Some(DOCUMENT_TYPE | ARRAY_TYPE))
    }

    /// Nested descriptors: sub-fields of a document, or the `[*]` element of an array.
    pub fn children(&self) -> Vec<&SchemaField> {
        match self.single_type() {
            Some(DOCUMENT_TYPE) => self.fields.iter().collect(),
            Some(ARRAY_TYPE) => self.element.as_deref().into_iter().collect(),
            _ => Vec::new(),
        }
    }
}

/// Result of inferring a sample.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    /// Number of sampled documents.
    pub count: usize,
    pub fields: Vec<SchemaField>,
}

#[derive(Default)]
struct FieldAccum {
    /// Parents that contained the field.
    presence: u64,
    types: IndexMap<&'static str, u64>,
    fields: IndexMap<String, FieldAccum>,
    element: Option<Box<FieldAccum>>,
}

impl FieldAccum {
    fn add_value(&mut self, value: &Bson) {
        *self.types.entry(bson_type_name(value)).or_insert(0) += 1;

        match value {
            Bson::Document(doc) => add_document(&mut self.fields, doc),
            Bson::Array(items) => {
                let element = self.element.get_or_insert_with(Default::default);
                for item in items {
                    element.presence += 1;
                    element.add_value(item);
                }
            }
            _ => {}
        }
    }

    fn document_count(&self) -> u64 {
        self.types.get(DOCUMENT_TYPE).copied().unwrap_or(0)
    }
}

fn add_document(fields: &mut IndexMap<String, FieldAccum>, doc: &Document) {
    for (key, value) in doc {
        let accum = fields.entry(key.clone()).or_default();
        accum.presence += 1;
        accum.add_value(value);
    }
}

/// Infer the schema of `docs`.
pub fn infer_schema(docs: &[Document]) -> Schema {
    let mut fields = IndexMap::new();
    for doc in docs {
        add_document(&mut fields, doc);
    }

    Schema { count: docs.len(), fields: build_fields("", &fields, docs.len() as u64) }
}

fn build_fields(
    prefix: &str,
    accums: &IndexMap<String, FieldAccum>,
    parents: u64,
) -> Vec<SchemaField> {
    accums
        .iter()
        .map(|(name, accum)| {
            let path = if prefix.is_empty() { name.clone() } else { format!("{prefix}.{name}") };
            let probability = ratio(accum.presence, parents);
            build_field(name.clone(), path, probability, accum)
        })
        .collect()
}

fn build_field(name: String, path: String, probability: f64, accum: &FieldAccum) -> SchemaField {
    let total_values: u64 = accum.types.values().sum();
    let types = accum
        .types
        .iter()
        .map(|(type_name, count)| SchemaType {
            name: type_name.to_string(),
            count: *count,
            probability: ratio(*count, total_values),
        })
        .collect();

    let fields = build_fields(&path, &accum.fields, accum.document_count());

    let element = accum.element.as_deref().filter(|element| element.presence > 0).map(|element| {
        Box::new(build_field(
            ARRAY_ELEMENT_NAME.to_string(),
            format!("{path}.{ARRAY_ELEMENT_NAME}"),
            1.0,
            element,
        ))
    });

    SchemaField { name, path, probability, types, fields, element }
}

fn ratio(part: u64, whole: u64) -> f64 {
    if whole == 0 { 0.0 } else { part as f64 / whole as f64 }
}

pub fn bson_type_name(value: &Bson) -> &'static str {
    match value {
        Bson::Double(_) => "Double",
        Bson::String(_) => "String",
        Bson::Document(_) => DOCUMENT_TYPE,
        Bson::Array(_) => ARRAY_TYPE,
        Bson::Binary(_) => "Binary",
        Bson::ObjectId(_) => "ObjectId",
        Bson::Boolean(_) => "Boolean",
        Bson::DateTime(_) => "Date",
        Bson::Null => "Null",
        Bson::RegularExpression(_) => "Regex",
        Bson::Int32(_) => "Int32",
        Bson::Timestamp(_) => "Timestamp",
        Bson::Int64(_) => "Int64",
        Bson::Decimal128(_) => "Decimal128",
        _ => "Unknown",
    }
}
