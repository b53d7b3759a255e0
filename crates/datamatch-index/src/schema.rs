//! Index mappings for the dataset document collection.

use serde_json::{json, Value};

/// Full mapping: keyword/text fields for every document attribute plus a
/// dense-vector field of dimension `dim`.
pub fn full_mapping(dim: usize) -> Value {
    json!({
        "mappings": {
            "properties": {
                "dataset_id": {"type": "keyword"},
                "name": {"type": "text"},
                "description": {"type": "text"},
                "keywords": {"type": "keyword"},
                "domain": {"type": "keyword"},
                "data_summary": {"type": "text"},
                "columns_info": {"type": "text"},
                "tree_node_id": {"type": "keyword"},
                "file_path": {"type": "keyword"},
                "status": {"type": "keyword"},
                "embedding": {"type": "dense_vector", "dims": dim},
                "created_at": {"type": "date"},
                "updated_at": {"type": "date"}
            }
        },
        "settings": {
            "number_of_shards": 1,
            "number_of_replicas": 0
        }
    })
}

/// Fallback mapping for constrained backends: id, name, description and
/// the vector only. Documents written under it deserialize through the
/// record defaults.
pub fn reduced_mapping(dim: usize) -> Value {
    json!({
        "mappings": {
            "properties": {
                "dataset_id": {"type": "keyword"},
                "name": {"type": "text"},
                "description": {"type": "text"},
                "embedding": {"type": "dense_vector", "dims": dim}
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_mapping_carries_vector_dimension() {
        let mapping = full_mapping(1024);
        assert_eq!(
            mapping["mappings"]["properties"]["embedding"]["dims"],
            1024
        );
        assert_eq!(
            mapping["mappings"]["properties"]["keywords"]["type"],
            "keyword"
        );
        assert_eq!(mapping["settings"]["number_of_shards"], 1);
    }

    #[test]
    fn reduced_mapping_keeps_only_core_fields() {
        let mapping = reduced_mapping(8);
        let props = mapping["mappings"]["properties"]
            .as_object()
            .expect("properties");
        assert_eq!(props.len(), 4);
        assert_eq!(props["embedding"]["dims"], 8);
    }
}
