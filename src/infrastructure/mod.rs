// Core infrastructure modules
pub mod collection_store;      // File-backed collections and schema registry
pub mod id_generator;          // Item ID generation
pub mod template_files;        // Named template files on disk
pub mod middleware;            // HTTP middleware
pub mod traits;                // Infrastructure traits

pub use collection_store::{validate_collection_name, CollectionStore};
pub use id_generator::ItemIdGenerator;
pub use template_files::FsTemplateSource;
pub use traits::{ItemReader, TemplateSource};
