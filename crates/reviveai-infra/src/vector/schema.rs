//! Arrow schema definition for the LanceDB carbon catalogue table.
//!
//! A single table holds the product-footprint records with a
//! 384-dimensional float32 vector field for BGESmallENV15 embeddings.
//!
//! Arrow versions MUST match lancedb's transitive dependency (57.3 for lancedb 0.26).

use std::sync::Arc;

use arrow_schema::{DataType, Field, Schema};

/// BGESmallENV15 embedding dimension.
pub const EMBEDDING_DIMENSION: i32 = 384;

/// Name of the carbon catalogue table.
pub const CATALOG_TABLE: &str = "carbon_catalogue";

/// Schema for the carbon catalogue table in LanceDB.
///
/// `document` is the text that was embedded (identifying fields first,
/// free-text detail last); the remaining columns mirror the source CSV.
pub fn catalog_schema() -> Schema {
    Schema::new(vec![
        Field::new("product_id", DataType::Utf8, false),
        Field::new("product_name", DataType::Utf8, false),
        Field::new("company", DataType::Utf8, false),
        Field::new("sector", DataType::Utf8, false),
        Field::new("weight_kg", DataType::Float64, false),
        Field::new("carbon_footprint", DataType::Float64, false),
        Field::new("country", DataType::Utf8, false),
        Field::new("year", DataType::Int32, false),
        Field::new("detail", DataType::Utf8, false),
        Field::new("document", DataType::Utf8, false),
        Field::new("embedding_model", DataType::Utf8, false),
        Field::new(
            "vector",
            DataType::FixedSizeList(
                Arc::new(Field::new("item", DataType::Float32, true)),
                EMBEDDING_DIMENSION,
            ),
            false,
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_schema_has_correct_fields() {
        let schema = catalog_schema();
        assert_eq!(schema.fields().len(), 12);
        assert!(schema.field_with_name("product_id").is_ok());
        assert!(schema.field_with_name("carbon_footprint").is_ok());
        assert!(schema.field_with_name("document").is_ok());
        assert!(schema.field_with_name("vector").is_ok());

        let vector_field = schema.field_with_name("vector").unwrap();
        match vector_field.data_type() {
            DataType::FixedSizeList(_, size) => assert_eq!(*size, EMBEDDING_DIMENSION),
            other => panic!("Expected FixedSizeList, got {:?}", other),
        }
    }

    #[test]
    fn test_embedding_dimension_constant() {
        assert_eq!(EMBEDDING_DIMENSION, 384);
    }
}
