//! MCP Resource Definitions
//!
//! Read-only views of the in-memory index.

use super::protocol::{Resource, ResourceContent, ResourceReadResult};
use tubeindex_core::SemanticIndex;

pub const STATS_URI: &str = "tubeindex://index/stats";
pub const RECORDS_URI: &str = "tubeindex://index/records";

/// Get all available resources
pub fn get_all_resources() -> Vec<Resource> {
    vec![
        Resource {
            uri: STATS_URI.to_string(),
            name: "Index Statistics".to_string(),
            description: Some(
                "Record count, embedding dimension, model and cached embeddings".to_string(),
            ),
            mime_type: Some("application/json".to_string()),
        },
        Resource {
            uri: RECORDS_URI.to_string(),
            name: "Indexed Records".to_string(),
            description: Some(
                "Every indexed transcript in id order, without the transcript text".to_string(),
            ),
            mime_type: Some("application/json".to_string()),
        },
    ]
}

/// Read a resource by URI
pub fn read_resource(uri: &str, index: &SemanticIndex) -> Option<ResourceReadResult> {
    let text = match uri {
        STATS_URI => serde_json::to_string_pretty(&index.stats()),
        RECORDS_URI => serde_json::to_string_pretty(&serde_json::json!({
            "records": index.records(),
        })),
        _ => return None,
    };

    Some(ResourceReadResult {
        contents: vec![ResourceContent {
            uri: uri.to_string(),
            mime_type: Some("application/json".to_string()),
            text: Some(text.unwrap_or_default()),
        }],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_all_resources() {
        let resources = get_all_resources();
        assert_eq!(resources.len(), 2);
        assert!(resources.iter().any(|r| r.uri == STATS_URI));
        assert!(resources.iter().any(|r| r.uri == RECORDS_URI));
        assert!(resources.iter().all(|r| r.description.is_some()));
    }
}
