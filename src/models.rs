// Data model shared by the store, the resolver and the HTTP surface

use serde_json::{Map, Value};

use crate::template::truthy;

/// One stored record: a JSON object with a string `id` plus arbitrary fields
pub type Item = Map<String, Value>;

/// Field name -> declared type tag (e.g. `"text"`). Not enforced on write.
pub type Schema = Map<String, Value>;

/// Reserved collection holding page configurations
pub const PAGES_COLLECTION: &str = "pages";
/// Reserved collection holding template records
pub const TEMPLATES_COLLECTION: &str = "templates";

pub const DEFAULT_DATA_KEY: &str = "items";

/// Schema used when a collection is registered without one
pub fn default_schema() -> Schema {
    let mut schema = Schema::new();
    schema.insert("name".to_string(), Value::String("text".to_string()));
    schema
}

/// Returns the item's `id` when it is a string
pub fn item_id(item: &Item) -> Option<&str> {
    item.get("id").and_then(Value::as_str)
}

/// Read-only view over a page configuration item
#[derive(Debug, Clone, Copy)]
pub struct PageConfig<'a> {
    item: &'a Item,
}

impl<'a> PageConfig<'a> {
    pub fn new(item: &'a Item) -> Self {
        Self { item }
    }

    pub fn fields(&self) -> &'a Item {
        self.item
    }

    pub fn id(&self) -> Option<&'a str> {
        item_id(self.item)
    }

    /// Collection feeding the page, when set to a non-empty string
    pub fn data_source(&self) -> Option<&'a str> {
        self.truthy_str("dataSource")
    }

    /// Context key for the full data list, `items` unless configured
    pub fn data_key(&self) -> &'a str {
        self.truthy_str("dataKey").unwrap_or(DEFAULT_DATA_KEY)
    }

    pub fn template_id(&self) -> Option<&'a Value> {
        self.item.get("templateId").filter(|v| truthy(v))
    }

    pub fn template_content(&self) -> Option<&'a str> {
        self.truthy_str("templateContent")
    }

    pub fn template_file(&self) -> Option<&'a str> {
        self.truthy_str("template")
    }

    fn truthy_str(&self, key: &str) -> Option<&'a str> {
        self.item
            .get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(value: Value) -> Item {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_page_config_defaults() {
        let page = item(json!({"id": "home", "dataSource": "menu"}));
        let config = PageConfig::new(&page);

        assert_eq!(config.id(), Some("home"));
        assert_eq!(config.data_source(), Some("menu"));
        assert_eq!(config.data_key(), DEFAULT_DATA_KEY);
        assert!(config.template_id().is_none());
        assert!(config.template_content().is_none());
    }

    #[test]
    fn test_empty_fields_are_unset() {
        let page = item(json!({
            "id": "home",
            "dataSource": "",
            "dataKey": "",
            "templateId": "",
            "templateContent": ""
        }));
        let config = PageConfig::new(&page);

        assert!(config.data_source().is_none());
        assert_eq!(config.data_key(), "items");
        assert!(config.template_id().is_none());
        assert!(config.template_content().is_none());
    }

    #[test]
    fn test_item_id_requires_string() {
        assert_eq!(item_id(&item(json!({"id": "7"}))), Some("7"));
        assert_eq!(item_id(&item(json!({"id": 7}))), None);
    }
}
