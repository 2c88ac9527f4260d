//! Schema system - declarative property metadata for views
//!
//! A type describes itself with an ordered sequence of declarative property
//! statements (properties, level switches, aliases) and a table of accessor
//! methods. The resolver turns those declarations into a per-type
//! [`Descriptor`] exactly once; the descriptor cache memoizes and optionally
//! persists the result.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  #[derive(ViewSchema)]  or  hand-written impl            │
//! │    declarations() -> Vec<DeclarationBlock>               │
//! │    accessors()    -> AccessorTable                       │
//! └────────────────────────────┬─────────────────────────────┘
//!                              │ register
//!                              ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │  SchemaRegistry (name -> RegisteredSchema)               │
//! └────────────────────────────┬─────────────────────────────┘
//!                              │ resolve (once per type)
//!                              ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │  Descriptor: properties, levels, aliases,                │
//! │              getter/setter method bindings               │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Resolution is pure and infallible; a type with no declarations gets an
//! empty descriptor and behaves as a fully dynamic view.

pub mod accessor;
pub mod descriptor;
pub mod registry;
pub mod resolver;
pub mod statement;

pub use accessor::{AccessorTable, GetterFn, SetterFn};
pub use descriptor::Descriptor;
pub use registry::{RegisteredSchema, SchemaRegistry};
pub use resolver::resolve;
pub use statement::{DeclarationBlock, Statement, LEVEL_ALL};

/// A type with a declarative property schema.
///
/// Usually implemented with `#[derive(ViewSchema)]`; a manual impl is the
/// escape hatch for schemas that cannot be expressed as field attributes.
pub trait ViewSchema {
    /// Type name used as the descriptor cache key.
    fn class_name() -> &'static str;

    /// Declaration blocks, most-base-first across an inheritance chain.
    fn declarations() -> Vec<DeclarationBlock>;

    /// The type's accessor method set. Defaults to none.
    fn accessors() -> AccessorTable {
        AccessorTable::new()
    }

    /// Level used by exports when the caller passes none.
    fn default_level() -> String {
        LEVEL_ALL.to_string()
    }
}
