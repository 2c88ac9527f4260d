//! propview proc macros
//!
//! This crate provides the `#[derive(ViewSchema)]` macro: it turns a struct
//! definition annotated with `#[view(...)]` attributes into the declarative
//! property statements the core resolver consumes.
//!
//! # Example
//!
//! ```ignore
//! use propview_core::ViewSchema;
//!
//! #[derive(ViewSchema)]
//! #[view(class = "Customer")]
//! pub struct Customer {
//!     #[view(levels = "public", alias = "identifier")]
//!     id: i64,
//!
//!     #[view(levels = "public")]
//!     name: String,
//!
//!     secret: String,
//! }
//!
//! // Generated:
//! // - Customer::class_name() == "Customer"
//! // - declarations(): id and name on level "public", secret on every
//! //   level, plus the alias identifier -> id
//! ```
//!
//! # Attributes
//!
//! ## Struct Attributes
//!
//! - `#[view(class = "Name")]` - **Required.** Type name used as the
//!   descriptor cache key.
//! - `#[view(default_level = "public")]` - Optional. Level used by exports
//!   when the caller passes none.
//! - `#[view(accessors = path::to_fn)]` - Optional. A `fn() -> AccessorTable`
//!   providing the type's getter/setter methods.
//! - `#[view(extends = BaseType)]` - Optional. Prepend another `ViewSchema`
//!   type's declaration blocks and merge over its accessor table.
//!
//! ## Field Attributes
//!
//! - `#[view(levels = "a,b")]` - Declare the property on these levels only.
//!   Without it the property belongs to every level.
//! - `#[view(alias = "other")]` - Declare `other` as an alias of this
//!   property.
//! - `#[view(skip)]` - The field is not a property.

mod parse;
mod view_schema;

use proc_macro::TokenStream;
use syn::{parse_macro_input, DeriveInput};

/// Derive macro generating a `ViewSchema` implementation from `#[view(...)]`
/// attributes.
///
/// Consecutive fields sharing a `levels` list compile into one level-switch
/// statement; the declaration order of fields is the declaration order of
/// properties, which fixes export ordering.
#[proc_macro_derive(ViewSchema, attributes(view))]
pub fn derive_view_schema(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    view_schema::derive_view_schema(input).into()
}
