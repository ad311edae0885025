use serde_json::Value;
use tracing::info;

use crate::{
    error::AppResult,
    infrastructure::CollectionStore,
    models::{Schema, PAGES_COLLECTION, TEMPLATES_COLLECTION},
};

/// Register the reserved `pages` and `templates` collections when missing.
/// Existing schemas and items are left untouched.
pub async fn seed_reserved_collections(store: &CollectionStore) -> AppResult<()> {
    let reserved = [
        (
            PAGES_COLLECTION,
            text_schema(&["title", "dataSource", "dataKey", "template", "templateId", "templateContent"]),
        ),
        (TEMPLATES_COLLECTION, text_schema(&["name", "content"])),
    ];

    for (name, schema) in reserved {
        if store.is_registered(name).await {
            continue;
        }
        store.put_schema(name, schema).await?;
        info!("Seeded reserved collection {}", name);
    }

    Ok(())
}

fn text_schema(fields: &[&str]) -> Schema {
    fields
        .iter()
        .map(|field| (field.to_string(), Value::String("text".to_string())))
        .collect()
}
