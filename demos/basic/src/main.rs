//! Walkthrough of the main propview features: a derived schema with levels
//! and an alias, getter dispatch, nested-map wrapping and level exports.

use indexmap::IndexMap;
use propview_core::{
    AccessorTable, IngestPolicy, PropertyView, Value, ViewEngine, ViewFlags, ViewSchema,
};
use tracing::info;

fn customer_accessors() -> AccessorTable {
    AccessorTable::new().with_getter("getname", |view| match view.raw("name") {
        Value::Str(s) => Value::Str(s.to_uppercase()),
        other => other,
    })
}

#[derive(ViewSchema)]
#[view(class = "Customer", accessors = customer_accessors)]
#[allow(dead_code)]
struct Customer {
    #[view(levels = "public", alias = "identifier")]
    id: i64,
    #[view(levels = "public")]
    name: String,
    secret: String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let engine = ViewEngine::in_memory();

    let data = Value::Map(IndexMap::from_iter([
        ("identifier".to_string(), Value::Int(7)),
        ("name".to_string(), Value::Str("ada".into())),
        ("secret".to_string(), Value::Str("tops3cret".into())),
    ]));

    let mut view = engine
        .view::<Customer>(data)
        .expect("customer data is a map");

    info!(id = ?view.get("id"), via_alias = ?view.get("identifier"), "aliased access");
    info!(name = %view.get("name"), "getter applied");

    info!(all = ?view.to_map(None, true), "export at the default level");
    info!(public = ?view.to_map(Some("public"), true), "export at \"public\"");

    // Wrapping: mutate a nested map through a child view.
    view.set_flags(view.flags() | ViewFlags::WRAP_NESTED);
    let mut address = PropertyView::new();
    address.set("city", Value::Str("Valencia".into())).unwrap();
    view.set("address", Value::Map(address.to_map(None, true)))
        .unwrap();

    if let Value::View(child) = view.at("address") {
        child
            .borrow_mut()
            .set("city", Value::Str("London".into()))
            .unwrap();
    }
    info!(address = ?view.get("address"), "mutated through the wrapper");

    // Ingestion policies: fill gaps without clobbering real data.
    view.ingest(
        Value::Map(IndexMap::from_iter([
            ("name".to_string(), Value::Str("grace".into())),
            ("plan".to_string(), Value::Str("pro".into())),
        ])),
        IngestPolicy::IfAbsent,
    )
    .unwrap();
    info!(name = %view.get("name"), plan = %view.get("plan"), "after IfAbsent ingest");
}
