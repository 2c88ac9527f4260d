//! ViewSchema derive macro implementation

use proc_macro2::TokenStream;
use quote::quote;
use syn::DeriveInput;

use crate::parse::{parse_view_schema, ViewSchemaArgs};

/// Generate the ViewSchema implementation
pub fn derive_view_schema(input: DeriveInput) -> TokenStream {
    match parse_view_schema(&input) {
        Ok(args) => generate_impl(args),
        Err(e) => e.write_errors(),
    }
}

fn generate_impl(args: ViewSchemaArgs) -> TokenStream {
    let struct_name = &args.ident;
    let class_name = &args.class_name;

    let fields = match &args.data {
        darling::ast::Data::Struct(fields) => &fields.fields,
        _ => {
            return syn::Error::new_spanned(
                &args.ident,
                "ViewSchema can only be derived for structs with named fields",
            )
            .to_compile_error()
        }
    };

    // One statement list for the whole struct: consecutive fields with the
    // same level list share one level switch, aliases go at the end. Field
    // order is property declaration order.
    let mut statements: Vec<TokenStream> = Vec::new();
    let mut active: Vec<String> = Vec::new();
    for field in fields.iter().filter(|f| !f.skip) {
        let Some(ident) = &field.ident else { continue };
        let property = ident.to_string();
        let levels = field.level_list();
        if levels != active {
            if levels.is_empty() {
                statements.push(quote! { .level_reset() });
            } else {
                let names = levels.iter();
                statements.push(quote! { .level_switch(&[#(#names),*]) });
            }
            active = levels;
        }
        statements.push(quote! { .property(#property) });
    }
    for field in fields.iter().filter(|f| !f.skip) {
        if let (Some(ident), Some(alias)) = (&field.ident, &field.alias) {
            let target = ident.to_string();
            statements.push(quote! { .alias(#alias, #target) });
        }
    }

    let base_blocks = match &args.extends {
        Some(base) => quote! {
            <#base as ::propview_core::schema::ViewSchema>::declarations()
        },
        None => quote! { ::std::vec::Vec::new() },
    };

    let accessors_fn = match (&args.accessors, &args.extends) {
        (Some(path), Some(base)) => quote! {
            fn accessors() -> ::propview_core::schema::AccessorTable {
                #path().merged_over(
                    <#base as ::propview_core::schema::ViewSchema>::accessors(),
                )
            }
        },
        (Some(path), None) => quote! {
            fn accessors() -> ::propview_core::schema::AccessorTable {
                #path()
            }
        },
        (None, Some(base)) => quote! {
            fn accessors() -> ::propview_core::schema::AccessorTable {
                <#base as ::propview_core::schema::ViewSchema>::accessors()
            }
        },
        (None, None) => TokenStream::new(),
    };

    let default_level_fn = match (&args.default_level, &args.extends) {
        (Some(level), _) => quote! {
            fn default_level() -> ::std::string::String {
                #level.to_string()
            }
        },
        (None, Some(base)) => quote! {
            fn default_level() -> ::std::string::String {
                <#base as ::propview_core::schema::ViewSchema>::default_level()
            }
        },
        (None, None) => TokenStream::new(),
    };

    quote! {
        impl ::propview_core::schema::ViewSchema for #struct_name {
            fn class_name() -> &'static str {
                #class_name
            }

            fn declarations() -> ::std::vec::Vec<::propview_core::schema::DeclarationBlock> {
                let mut blocks: ::std::vec::Vec<::propview_core::schema::DeclarationBlock> =
                    #base_blocks;
                blocks.push(
                    ::propview_core::schema::DeclarationBlock::new()
                        #(#statements)*
                );
                blocks
            }

            #accessors_fn

            #default_level_fn
        }
    }
}
