//! Declarative property statements
//!
//! A type's schema is an ordered sequence of statements, grouped into
//! declaration blocks (one block per type in an inheritance chain, base
//! first). Statements are resolved once per type by the
//! [resolver](crate::schema::resolver) and never consulted again at runtime.

/// The implicit level that always contains every declared property.
pub const LEVEL_ALL: &str = "";

/// One parsed declaration unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    /// Declares a property. The type hint is informational only; typed and
    /// untyped declarations have the same effect.
    Property {
        name: String,
        type_hint: Option<String>,
    },
    /// Replaces the set of active levels for subsequent property statements.
    /// An empty list resets to "applies to every level".
    LevelSwitch { levels: Vec<String> },
    /// Declares an alternate name for a property, independent of levels.
    Alias { alias: String, target: String },
}

impl Statement {
    pub fn property(name: impl Into<String>) -> Self {
        Statement::Property {
            name: name.into(),
            type_hint: None,
        }
    }

    pub fn typed_property(name: impl Into<String>, type_hint: impl Into<String>) -> Self {
        Statement::Property {
            name: name.into(),
            type_hint: Some(type_hint.into()),
        }
    }

    pub fn level_switch(levels: &[&str]) -> Self {
        Statement::LevelSwitch {
            levels: levels.iter().map(|l| l.to_string()).collect(),
        }
    }

    pub fn level_reset() -> Self {
        Statement::LevelSwitch { levels: Vec::new() }
    }

    pub fn alias(alias: impl Into<String>, target: impl Into<String>) -> Self {
        Statement::Alias {
            alias: alias.into(),
            target: target.into(),
        }
    }
}

/// An ordered run of statements from one declaration site.
///
/// Level switches are scoped to their block: the active level set resets at
/// each block boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeclarationBlock {
    pub statements: Vec<Statement>,
}

impl DeclarationBlock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn property(mut self, name: impl Into<String>) -> Self {
        self.statements.push(Statement::property(name));
        self
    }

    pub fn typed_property(
        mut self,
        name: impl Into<String>,
        type_hint: impl Into<String>,
    ) -> Self {
        self.statements.push(Statement::typed_property(name, type_hint));
        self
    }

    pub fn level_switch(mut self, levels: &[&str]) -> Self {
        self.statements.push(Statement::level_switch(levels));
        self
    }

    pub fn level_reset(mut self) -> Self {
        self.statements.push(Statement::level_reset());
        self
    }

    pub fn alias(mut self, alias: impl Into<String>, target: impl Into<String>) -> Self {
        self.statements.push(Statement::alias(alias, target));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_builder_preserves_order() {
        let block = DeclarationBlock::new()
            .property("id")
            .level_switch(&["public"])
            .typed_property("name", "string")
            .level_reset()
            .property("secret")
            .alias("identifier", "id");

        assert_eq!(block.statements.len(), 6);
        assert_eq!(block.statements[0], Statement::property("id"));
        assert_eq!(block.statements[1], Statement::level_switch(&["public"]));
        assert_eq!(
            block.statements[5],
            Statement::alias("identifier", "id")
        );
    }

    #[test]
    fn test_level_reset_is_empty_switch() {
        assert_eq!(
            Statement::level_reset(),
            Statement::LevelSwitch { levels: vec![] }
        );
    }
}
