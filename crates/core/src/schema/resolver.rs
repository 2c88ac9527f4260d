//! Statement-to-descriptor resolution
//!
//! Pure function of a type's declaration blocks and its accessor table.
//! Resolution runs once per type (the descriptor cache memoizes the result)
//! and cannot fail: a type with no declarations resolves to an empty
//! descriptor that accepts every key dynamically.

use indexmap::IndexMap;
use tracing::debug;

use super::accessor::AccessorTable;
use super::descriptor::Descriptor;
use super::statement::{DeclarationBlock, Statement, LEVEL_ALL};

pub(crate) fn push_unique(list: &mut Vec<String>, item: &str) {
    if !list.iter().any(|x| x == item) {
        list.push(item.to_string());
    }
}

/// Name candidates probed against the accessor table for one property:
/// `<prefix><name>` and `<prefix><name-without-underscores>`.
fn accessor_candidates(prefix: &str, property: &str) -> Vec<String> {
    let exact = format!("{prefix}{property}");
    let squashed = format!("{prefix}{}", property.replace('_', ""));
    if exact == squashed {
        vec![exact]
    } else {
        vec![exact, squashed]
    }
}

/// Resolve a type's declaration blocks into its descriptor.
///
/// Blocks are walked most-base-first; the active level set resets at each
/// block boundary, so a derived type's level switches never leak into (or out
/// of) its base declarations.
pub fn resolve(
    class_name: &str,
    default_level: &str,
    blocks: &[DeclarationBlock],
    accessors: &AccessorTable,
) -> Descriptor {
    let mut forall: Vec<String> = Vec::new();
    // Direct (per-level) declarations; the "all" entry accumulates everything.
    let mut direct: IndexMap<String, Vec<String>> = IndexMap::new();
    let mut aliases_different: IndexMap<String, String> = IndexMap::new();

    for block in blocks {
        let mut active: Vec<String> = Vec::new();
        for statement in &block.statements {
            match statement {
                Statement::LevelSwitch { levels } => {
                    active = levels.clone();
                }
                Statement::Alias { alias, target } => {
                    aliases_different.insert(alias.clone(), target.clone());
                }
                Statement::Property { name, .. } => {
                    push_unique(direct.entry(LEVEL_ALL.to_string()).or_default(), name);
                    if active.is_empty() {
                        push_unique(&mut forall, name);
                    } else {
                        for level in &active {
                            push_unique(direct.entry(level.clone()).or_default(), name);
                        }
                    }
                }
            }
        }
    }

    // Final per-level sets: for-all properties first, then the level's own,
    // first appearance wins. The "all" entry already holds every property in
    // scan order and stays that way. Levels that declared nothing directly
    // are omitted entirely.
    let mut levels: IndexMap<String, Vec<String>> = IndexMap::new();
    for (level, list) in &direct {
        if list.is_empty() {
            continue;
        }
        if level == LEVEL_ALL {
            levels.insert(level.clone(), list.clone());
            continue;
        }
        let mut merged: Vec<String> = Vec::new();
        for p in forall.iter().chain(list.iter()) {
            push_unique(&mut merged, p);
        }
        levels.insert(level.clone(), merged);
    }

    let properties: Vec<String> = levels.get(LEVEL_ALL).cloned().unwrap_or_default();

    let mut aliases: IndexMap<String, String> = properties
        .iter()
        .map(|p| (p.clone(), p.clone()))
        .collect();
    for (alias, target) in &aliases_different {
        aliases.insert(alias.clone(), target.clone());
    }

    let mut getters: IndexMap<String, String> = IndexMap::new();
    let mut setters: IndexMap<String, String> = IndexMap::new();
    for property in &properties {
        let all_names: Vec<&String> = aliases
            .iter()
            .filter(|(_, target)| *target == property)
            .map(|(name, _)| name)
            .collect();

        for candidate in accessor_candidates("get", property) {
            if accessors.has_getter(&candidate) {
                for name in &all_names {
                    getters.insert((*name).clone(), candidate.clone());
                }
            }
        }
        for candidate in accessor_candidates("set", property) {
            if accessors.has_setter(&candidate) {
                for name in &all_names {
                    setters.insert((*name).clone(), candidate.clone());
                }
            }
        }
    }

    debug!(
        class = class_name,
        properties = properties.len(),
        levels = levels.len(),
        aliases = aliases_different.len(),
        "resolved descriptor"
    );

    Descriptor {
        class_name: class_name.to_string(),
        properties,
        levels,
        aliases,
        aliases_different,
        getters,
        setters,
        default_level: default_level.to_string(),
    }
}
