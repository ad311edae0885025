use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tracing::debug;

use crate::error::{AppError, AppResult};
use super::traits::TemplateSource;

/// Template files under one directory, looked up by file name
#[derive(Debug, Clone)]
pub struct FsTemplateSource {
    templates_dir: PathBuf,
}

impl FsTemplateSource {
    pub fn new(templates_dir: impl Into<PathBuf>) -> Self {
        Self {
            templates_dir: templates_dir.into(),
        }
    }
}

#[async_trait]
impl TemplateSource for FsTemplateSource {
    async fn load(&self, name: &str) -> AppResult<Option<String>> {
        // Only plain file names resolve; anything that could leave the directory does not
        let mut components = Path::new(name).components();
        let is_plain = matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        );
        if !is_plain {
            debug!("Rejected template name {:?}", name);
            return Ok(None);
        }

        let path = self.templates_dir.join(name);
        match tokio::fs::read_to_string(&path).await {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Storage(format!(
                "Failed to read template {}: {}",
                path.display(),
                e
            ))),
        }
    }
}
