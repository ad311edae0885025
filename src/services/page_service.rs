// PageService - resolves a page id into rendered text
// Reads the page configuration and its data source, builds the render context,
// picks the template and hands both to the template engine. Never writes.

use std::sync::Arc;
use tracing::{error, info, warn};

use crate::{
    error::{AppError, AppResult},
    infrastructure::traits::{ItemReader, TemplateSource},
    models::{PageConfig, PAGES_COLLECTION, TEMPLATES_COLLECTION},
    template::{display_value, RenderContext, TemplateEngine},
};

/// Where the template text for a page came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateChoice {
    /// Template text to render with the page context
    Text(String),
    /// No usable template; the message is the response body as is
    Unresolved(String),
}

#[derive(Clone)]
pub struct PageService {
    items: Arc<dyn ItemReader>,
    templates: Arc<dyn TemplateSource>,
    engine: TemplateEngine,
}

impl PageService {
    pub fn new(items: Arc<dyn ItemReader>, templates: Arc<dyn TemplateSource>) -> Self {
        Self {
            items,
            templates,
            engine: TemplateEngine::new(),
        }
    }

    /// Render the page `page_id`. `query_id` selects one item of the page's
    /// data source; without it the whole collection is exposed under `dataKey`.
    pub async fn resolve_page(&self, page_id: &str, query_id: Option<&str>) -> AppResult<String> {
        let page = match self.items.get_by_id(PAGES_COLLECTION, page_id).await {
            Some(page) => page,
            None => {
                warn!("Page ID not found: {}", page_id);
                return Err(AppError::NotFound("Page Configuration Not Found".to_string()));
            }
        };
        info!("Serving page: {}", page_id);

        let config = PageConfig::new(&page);
        let context = self.build_context(config, query_id).await;

        match self.select_template(config).await? {
            TemplateChoice::Text(template) => Ok(self.engine.render(&template, &context)),
            TemplateChoice::Unresolved(message) => Ok(message),
        }
    }

    /// Page fields, extended by one data item or by the full data list
    pub async fn build_context(&self, config: PageConfig<'_>, query_id: Option<&str>) -> RenderContext {
        let mut context = config.fields().clone();

        let Some(source) = config.data_source() else {
            return context;
        };
        info!("Fetching data from source: {}", source);

        match query_id.filter(|id| !id.is_empty()) {
            Some(id) => match self.items.get_by_id(source, id).await {
                Some(item) => {
                    info!("Found specific item: {}", id);
                    context.extend(item);
                }
                None => warn!("Item not found: {} in {}", id, source),
            },
            None => {
                let items = self.items.get_all(source).await;
                info!("Fetched {} items", items.len());
                let list = items.into_iter().map(serde_json::Value::Object).collect();
                context.insert(config.data_key().to_string(), serde_json::Value::Array(list));
            }
        }

        context
    }

    /// `templateId` wins over `templateContent`, which wins over `template`
    pub async fn select_template(&self, config: PageConfig<'_>) -> AppResult<TemplateChoice> {
        if let Some(template_id) = config.template_id() {
            info!("Using template ID: {}", template_id);

            let record = match template_id.as_str() {
                Some(id) => self.items.get_by_id(TEMPLATES_COLLECTION, id).await,
                None => None,
            };
            let content = record
                .as_ref()
                .and_then(|t| t.get("content"))
                .and_then(|c| c.as_str())
                .filter(|c| !c.is_empty());

            return Ok(match content {
                Some(content) => TemplateChoice::Text(content.to_string()),
                None => {
                    let id = display_value(template_id);
                    error!("Template ID {} not found", id);
                    TemplateChoice::Unresolved(format!("Error: Template ID {} not found", id))
                }
            });
        }

        if let Some(content) = config.template_content() {
            info!("Using direct template content");
            return Ok(TemplateChoice::Text(content.to_string()));
        }

        let Some(name) = config.template_file() else {
            warn!("Page {:?} has no template configured", config.id());
            return Ok(TemplateChoice::Unresolved("Error: Template not configured".to_string()));
        };

        info!("Using file template: {}", name);
        Ok(match self.templates.load(name).await? {
            Some(text) => TemplateChoice::Text(text),
            None => {
                warn!("Template {} not found", name);
                TemplateChoice::Unresolved(format!("Error: Template {} not found", name))
            }
        })
    }
}
