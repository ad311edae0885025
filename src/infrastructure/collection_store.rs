use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::models::{item_id, Item, Schema};
use super::id_generator::ItemIdGenerator;
use super::traits::ItemReader;

const SCHEMAS_FILE: &str = "schemas.json";

/// Collection names become file names, so they are restricted to a safe alphabet
static COLLECTION_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("valid collection name pattern"));

/// Result of reading one JSON file from the data directory
enum Loaded<T> {
    Missing,
    Parsed(T),
    Unreadable(String),
}

/// File-backed store of named collections
///
/// Layout: `<data_dir>/schemas.json` maps collection name to schema, and each
/// collection lives in `<data_dir>/<name>.json` as a JSON array. Every
/// mutation rewrites the whole collection file; mutations on one collection are
/// serialized so concurrent writers cannot lose each other's changes.
#[derive(Debug)]
pub struct CollectionStore {
    data_dir: PathBuf,
    /// Schema registry, kept in memory and mirrored to `schemas.json`
    schemas: RwLock<Map<String, Value>>,
    /// Set when `schemas.json` exists but could not be parsed at open time.
    /// The registry is then read-only so the damaged file is never replaced.
    registry_error: Option<String>,
    /// One writer lock per collection name
    collection_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
    id_generator: ItemIdGenerator,
}

impl CollectionStore {
    /// Open (or initialise) a store rooted at `data_dir`
    pub async fn open(data_dir: impl Into<PathBuf>) -> AppResult<Self> {
        let data_dir = data_dir.into();

        tokio::fs::create_dir_all(&data_dir).await.map_err(|e| {
            AppError::Storage(format!(
                "Failed to create data directory {}: {}",
                data_dir.display(),
                e
            ))
        })?;

        let schemas_path = data_dir.join(SCHEMAS_FILE);
        let (schemas, registry_error) = match read_json::<Map<String, Value>>(&schemas_path).await {
            Loaded::Parsed(schemas) => (schemas, None),
            Loaded::Missing => {
                write_json_atomic(&schemas_path, &Map::new()).await?;
                (Map::new(), None)
            }
            Loaded::Unreadable(reason) => {
                warn!(
                    "Schema registry {} is unreadable, opening read-only: {}",
                    schemas_path.display(),
                    reason
                );
                (Map::new(), Some(reason))
            }
        };
        info!(
            "Collection store opened at {} with {} collections",
            data_dir.display(),
            schemas.len()
        );

        Ok(Self {
            data_dir,
            schemas: RwLock::new(schemas),
            registry_error,
            collection_locks: Mutex::new(HashMap::new()),
            id_generator: ItemIdGenerator::new(),
        })
    }

    // Schema management

    /// Register a new collection and create its empty backing file
    pub async fn register_collection(&self, name: &str, schema: Schema) -> AppResult<Value> {
        validate_collection_name(name)?;
        self.check_registry_writable()?;

        let mut schemas = self.schemas.write().await;
        if schemas.contains_key(name) {
            return Err(AppError::AlreadyExists(format!(
                "Collection {} already exists",
                name
            )));
        }

        // Backing file first: a registry entry never points at a missing file
        {
            let lock = self.collection_lock(name).await;
            let _guard = lock.lock().await;
            self.save_collection(name, &[]).await?;
        }

        let schema = Value::Object(schema);
        schemas.insert(name.to_string(), schema.clone());
        if let Err(e) = self.persist_schemas(&schemas).await {
            schemas.remove(name);
            return Err(e);
        }

        info!("Registered collection {}", name);
        Ok(schema)
    }

    /// Create or overwrite a schema; an existing collection file is left as is
    pub async fn put_schema(&self, name: &str, schema: Schema) -> AppResult<Value> {
        validate_collection_name(name)?;
        self.check_registry_writable()?;

        let mut schemas = self.schemas.write().await;

        {
            let lock = self.collection_lock(name).await;
            let _guard = lock.lock().await;
            if !tokio::fs::try_exists(self.collection_path(name)).await? {
                self.save_collection(name, &[]).await?;
            }
        }

        let schema = Value::Object(schema);
        let previous = schemas.insert(name.to_string(), schema.clone());
        if let Err(e) = self.persist_schemas(&schemas).await {
            match previous {
                Some(previous) => schemas.insert(name.to_string(), previous),
                None => schemas.remove(name),
            };
            return Err(e);
        }

        info!("Saved schema for collection {}", name);
        Ok(schema)
    }

    /// Registered collection names, in registration order
    pub async fn list_collection_names(&self) -> Vec<String> {
        self.schemas.read().await.keys().cloned().collect()
    }

    pub async fn get_schema(&self, name: &str) -> Option<Value> {
        self.schemas.read().await.get(name).cloned()
    }

    /// The whole registry
    pub async fn schemas(&self) -> Map<String, Value> {
        self.schemas.read().await.clone()
    }

    pub async fn is_registered(&self, name: &str) -> bool {
        self.schemas.read().await.contains_key(name)
    }

    // Item CRUD

    /// All items of a collection; missing or unreadable files read as empty
    pub async fn get_all(&self, name: &str) -> Vec<Item> {
        if let Err(e) = validate_collection_name(name) {
            warn!("Refusing to read collection: {}", e);
            return Vec::new();
        }

        match self.load_collection(name).await {
            Loaded::Parsed(items) => items,
            Loaded::Missing => Vec::new(),
            Loaded::Unreadable(reason) => {
                warn!("Error loading collection {}: {}", name, reason);
                Vec::new()
            }
        }
    }

    /// First item whose string `id` equals `id`
    pub async fn get_by_id(&self, name: &str, id: &str) -> Option<Item> {
        self.get_all(name)
            .await
            .into_iter()
            .find(|item| item_id(item) == Some(id))
    }

    /// Append a new item. A generated `id` comes first; an `id` in `fields`
    /// takes precedence over it.
    pub async fn create(&self, name: &str, fields: Item) -> AppResult<Item> {
        validate_collection_name(name)?;

        let lock = self.collection_lock(name).await;
        let _guard = lock.lock().await;

        let mut items = self.load_for_write(name).await?;

        let mut item = Item::new();
        item.insert("id".to_string(), Value::String(self.id_generator.next_id()));
        item.extend(fields);

        items.push(item.clone());
        self.save_collection(name, &items).await?;

        debug!("Created item {:?} in {}", item.get("id"), name);
        Ok(item)
    }

    /// Shallow-merge `patch` over an existing item. The `id` is never changed.
    pub async fn update(&self, name: &str, id: &str, patch: Item) -> AppResult<Item> {
        validate_collection_name(name)?;

        let lock = self.collection_lock(name).await;
        let _guard = lock.lock().await;

        let mut items = self.load_for_write(name).await?;
        let index = items
            .iter()
            .position(|item| item_id(item) == Some(id))
            .ok_or_else(|| AppError::NotFound(format!("Item {} not found in {}", id, name)))?;

        let item = &mut items[index];
        for (key, value) in patch {
            if key == "id" {
                continue;
            }
            item.insert(key, value);
        }
        let merged = item.clone();

        self.save_collection(name, &items).await?;

        debug!("Updated item {} in {}", id, name);
        Ok(merged)
    }

    /// Remove the first item with the given `id`
    pub async fn delete(&self, name: &str, id: &str) -> AppResult<()> {
        validate_collection_name(name)?;

        let lock = self.collection_lock(name).await;
        let _guard = lock.lock().await;

        let mut items = self.load_for_write(name).await?;
        let index = items
            .iter()
            .position(|item| item_id(item) == Some(id))
            .ok_or_else(|| AppError::NotFound(format!("Item {} not found in {}", id, name)))?;

        items.remove(index);
        self.save_collection(name, &items).await?;

        debug!("Deleted item {} from {}", id, name);
        Ok(())
    }

    // Persistence helpers

    fn collection_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(format!("{}.json", name))
    }

    async fn collection_lock(&self, name: &str) -> Arc<Mutex<()>> {
        let mut locks = self.collection_locks.lock().await;
        locks
            .entry(name.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn load_collection(&self, name: &str) -> Loaded<Vec<Item>> {
        read_json(&self.collection_path(name)).await
    }

    /// Like `get_all`, but refuses to hand out an empty sequence for a file
    /// that exists and cannot be parsed, so a write never clobbers it.
    async fn load_for_write(&self, name: &str) -> AppResult<Vec<Item>> {
        match self.load_collection(name).await {
            Loaded::Parsed(items) => Ok(items),
            Loaded::Missing => Ok(Vec::new()),
            Loaded::Unreadable(reason) => {
                warn!("Refusing to rewrite unreadable collection {}: {}", name, reason);
                Err(AppError::StorageUnreadable(format!(
                    "Collection {} could not be read: {}",
                    name, reason
                )))
            }
        }
    }

    fn check_registry_writable(&self) -> AppResult<()> {
        match &self.registry_error {
            None => Ok(()),
            Some(reason) => Err(AppError::StorageUnreadable(format!(
                "Schema registry could not be read: {}",
                reason
            ))),
        }
    }

    async fn save_collection(&self, name: &str, items: &[Item]) -> AppResult<()> {
        write_json_atomic(&self.collection_path(name), items).await
    }

    async fn persist_schemas(&self, schemas: &Map<String, Value>) -> AppResult<()> {
        write_json_atomic(&self.data_dir.join(SCHEMAS_FILE), schemas).await
    }
}

#[async_trait]
impl ItemReader for CollectionStore {
    async fn get_all(&self, collection: &str) -> Vec<Item> {
        CollectionStore::get_all(self, collection).await
    }

    async fn get_by_id(&self, collection: &str, id: &str) -> Option<Item> {
        CollectionStore::get_by_id(self, collection, id).await
    }
}

pub fn validate_collection_name(name: &str) -> AppResult<()> {
    if COLLECTION_NAME.is_match(name) {
        Ok(())
    } else {
        Err(AppError::Validation(format!("Invalid collection name: {:?}", name)))
    }
}

async fn read_json<T: DeserializeOwned>(path: &Path) -> Loaded<T> {
    let contents = match tokio::fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Loaded::Missing,
        Err(e) => return Loaded::Unreadable(e.to_string()),
    };

    match serde_json::from_str(&contents) {
        Ok(value) => Loaded::Parsed(value),
        Err(e) => Loaded::Unreadable(e.to_string()),
    }
}

/// Write pretty-printed JSON to a sibling temp file, then rename it into place
async fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> AppResult<()> {
    let body = serde_json::to_string_pretty(value)?;

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let tmp_path = path.with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4()));

    tokio::fs::write(&tmp_path, body).await.map_err(|e| {
        AppError::Storage(format!("Failed to write {}: {}", tmp_path.display(), e))
    })?;

    if let Err(e) = tokio::fs::rename(&tmp_path, path).await {
        let _ = tokio::fs::remove_file(&tmp_path).await;
        return Err(AppError::Storage(format!(
            "Failed to replace {}: {}",
            path.display(),
            e
        )));
    }

    Ok(())
}
