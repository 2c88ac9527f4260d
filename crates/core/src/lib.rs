//! propview - Typed property views over associative data
//!
//! This crate contains the core runtime: the value model, declarative
//! property schemas resolved into cached descriptors, and the alias-aware
//! [`PropertyView`] container with getter/setter dispatch, level-filtered
//! export, nested-map wrapping, bulk ingestion, cursor iteration and
//! in-place sorts.
//!
//! # Re-exports
//!
//! The `ViewSchema` derive from the companion macro crate is re-exported
//! alongside the trait, so one `use propview_core::ViewSchema;` covers both.

// Allow the crate to refer to itself as `propview_core` for proc macro compatibility
extern crate self as propview_core;

pub mod cache;
pub mod config;
pub mod engine;
pub mod schema;
pub mod value;
pub mod view;

// Re-export commonly used items
pub use cache::{
    CacheError, CacheService, DescriptorCache, MemoryCacheService, NullCacheService,
};
pub use config::{CacheSettings, ConfigError, ConfigResult, EngineConfig};
pub use engine::ViewEngine;
pub use schema::{
    AccessorTable, DeclarationBlock, Descriptor, SchemaRegistry, Statement, ViewSchema, LEVEL_ALL,
};
pub use value::{SharedView, Value};
pub use view::{
    IngestPolicy, LevelExport, PropertyView, ToPlainMap, ViewError, ViewFlags,
};

// The derive macro shares the trait's name; they live in different
// namespaces.
pub use propview_macros::ViewSchema;
