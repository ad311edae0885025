use std::sync::Arc;
use crate::{
    config::Config,
    data_seeder::seed_reserved_collections,
    infrastructure::{CollectionStore, FsTemplateSource},
    services::PageService,
};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<CollectionStore>,
    pub pages: PageService,
    pub config: Config,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        // Initialize collection store
        let store = Arc::new(CollectionStore::open(&config.storage.data_dir).await?);
        seed_reserved_collections(&store).await?;

        // Page resolution reads through the store and the template directory
        let templates = Arc::new(FsTemplateSource::new(&config.storage.templates_dir));
        let pages = PageService::new(store.clone(), templates);

        Ok(Self {
            store,
            pages,
            config,
        })
    }
}
