//! Attribute parsing for the ViewSchema derive macro

use darling::{FromDeriveInput, FromField};
use syn::{DeriveInput, Ident, Path, Type};

/// Parsed #[view(...)] attributes on the struct
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(view), supports(struct_named))]
pub struct ViewSchemaArgs {
    /// Struct identifier
    pub ident: Ident,

    /// Struct fields
    pub data: darling::ast::Data<(), ViewFieldArgs>,

    /// Type name used as the descriptor cache key
    #[darling(rename = "class")]
    pub class_name: String,

    /// Level used by exports when the caller passes none
    #[darling(default)]
    pub default_level: Option<String>,

    /// Path to a `fn() -> AccessorTable` with the type's methods
    #[darling(default)]
    pub accessors: Option<Path>,

    /// Base `ViewSchema` type whose declarations come first
    #[darling(default)]
    pub extends: Option<Path>,
}

/// Parsed #[view(...)] attributes on a field
#[derive(Debug, FromField)]
#[darling(attributes(view))]
pub struct ViewFieldArgs {
    /// Field identifier
    pub ident: Option<Ident>,

    /// Field type (unused by generation; properties are untyped at runtime)
    #[allow(dead_code)]
    pub ty: Type,

    /// Comma-separated level list; absent means "every level"
    #[darling(default)]
    pub levels: Option<String>,

    /// An alias name declared for this property
    #[darling(default)]
    pub alias: Option<String>,

    /// The field is not a property
    #[darling(default)]
    pub skip: bool,
}

impl ViewFieldArgs {
    /// The parsed level list, empty when the field belongs to every level.
    pub fn level_list(&self) -> Vec<String> {
        self.levels
            .as_deref()
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Parse a DeriveInput into ViewSchemaArgs
pub fn parse_view_schema(input: &DeriveInput) -> darling::Result<ViewSchemaArgs> {
    ViewSchemaArgs::from_derive_input(input)
}
