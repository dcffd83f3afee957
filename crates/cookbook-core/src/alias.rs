//! Alias entries and the alias table
//!
//! An alias is a short command name (`recipe-cook`) standing in for a
//! canonical invocation of the recipe tool (`recipe cook ...`). The table is
//! built once at start-up and read-only afterwards.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::error;

use crate::error::{Error, Result};

/// Flag emitted in front of the first user argument for ID-taking aliases
pub const ID_FLAG: &str = "--id";

/// One registered shortcut
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasEntry {
    /// User-facing command name, matched exactly and case-sensitively
    pub name: String,
    /// Tokens placed before the user's arguments (never empty)
    #[serde(rename = "canonical")]
    pub canonical_args: Vec<String>,
    /// Rewrite the first user argument into `--id <arg>`
    #[serde(default)]
    pub inject_id: bool,
    /// One-line description for listings
    #[serde(default)]
    pub summary: String,
}

impl AliasEntry {
    pub fn new<I, S>(name: impl Into<String>, canonical_args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let entry = Self {
            name: name.into(),
            canonical_args: canonical_args.into_iter().map(Into::into).collect(),
            inject_id: false,
            summary: String::new(),
        };
        entry.validate()?;
        Ok(entry)
    }

    pub fn with_id_injection(mut self) -> Self {
        self.inject_id = true;
        self
    }

    pub fn with_summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    /// Check the structural invariants. Entries deserialized from config
    /// bypass `new`, so the table calls this again on registration.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidAlias("alias name is empty".to_string()));
        }
        if self.name.chars().any(char::is_whitespace) {
            return Err(Error::InvalidAlias(format!(
                "alias name contains whitespace: {:?}",
                self.name
            )));
        }
        if self.canonical_args.is_empty() {
            return Err(Error::InvalidAlias(format!(
                "{} has no canonical arguments",
                self.name
            )));
        }
        Ok(())
    }

    /// Human-readable canonical form, e.g. `recipe edit --id *`
    pub fn canonical_form(&self) -> String {
        let mut form = self.canonical_args.join(" ");
        if self.inject_id {
            form.push(' ');
            form.push_str(ID_FLAG);
        }
        form.push_str(" *");
        form
    }
}

/// Compile-time description of a built-in alias
struct Builtin {
    name: &'static str,
    canonical: &'static [&'static str],
    inject_id: bool,
    summary: &'static str,
}

impl Builtin {
    const fn new(name: &'static str, canonical: &'static [&'static str], summary: &'static str) -> Self {
        Self {
            name,
            canonical,
            inject_id: false,
            summary,
        }
    }

    const fn with_id(name: &'static str, canonical: &'static [&'static str], summary: &'static str) -> Self {
        Self {
            name,
            canonical,
            inject_id: true,
            summary,
        }
    }

    fn to_entry(&self) -> AliasEntry {
        AliasEntry {
            name: self.name.to_string(),
            canonical_args: self.canonical.iter().map(|s| s.to_string()).collect(),
            inject_id: self.inject_id,
            summary: self.summary.to_string(),
        }
    }
}

/// Every alias shipped with the front end
const BUILTINS: &[Builtin] = &[
    // Recipes
    Builtin::new("recipe-search", &["recipe", "list"], "Search recipes by name"),
    Builtin::new("recipe-list", &["recipe", "list"], "List all recipes"),
    Builtin::new("recipe-cook", &["recipe", "cook"], "Find recipes using the given ingredients"),
    Builtin::new("recipe-tag", &["recipe", "tag"], "List recipes with a tag"),
    Builtin::new("recipe-info", &["recipe", "info"], "Show recipe details"),
    Builtin::new("recipe-add", &["recipe", "add"], "Add a recipe from a JSON staging file"),
    Builtin::with_id("recipe-edit", &["recipe", "edit"], "Edit a recipe by ID"),
    Builtin::with_id("recipe-remove", &["recipe", "delete"], "Delete a recipe by ID"),
    // Ingredients
    Builtin::new("ing-add", &["ingredient", "add"], "Add an ingredient from a JSON staging file"),
    Builtin::with_id("ing-edit", &["ingredient", "edit"], "Edit an ingredient by ID"),
    Builtin::with_id("ing-info", &["ingredient", "info"], "Show ingredient details by ID"),
    Builtin::new("ing-list", &["ingredient", "list"], "List or search ingredients"),
    Builtin::with_id("ing-remove", &["ingredient", "delete"], "Delete an ingredient by ID"),
    Builtin::new("ing-type", &["ingredient", "type"], "List ingredients grouped by type"),
    // Tags
    Builtin::new("tag-add", &["tag", "add"], "Add a tag"),
    Builtin::with_id("tag-edit", &["tag", "edit"], "Edit a tag by ID"),
    Builtin::new("tag-list", &["tag", "list"], "List all tags"),
    Builtin::with_id("tag-remove", &["tag", "remove"], "Remove a tag by ID"),
    // Ingredient types
    Builtin::new("type-add", &["type", "add"], "Add an ingredient type"),
    Builtin::new("type-list", &["type", "list"], "List ingredient types"),
    Builtin::with_id("type-remove", &["type", "remove"], "Remove an ingredient type by ID"),
    // Subtags
    Builtin::new("subtag-add", &["subtag", "add"], "Add a subtag"),
    Builtin::new("subtag-list", &["subtag", "list"], "List subtags"),
    Builtin::with_id("subtag-remove", &["subtag", "remove"], "Remove a subtag by ID"),
    // Articles
    Builtin::new("article-add", &["article", "add"], "Add an article from a JSON staging file"),
    Builtin::new("article-list", &["article", "list"], "List all articles"),
    Builtin::with_id("article-edit", &["article", "edit"], "Edit an article by ID"),
    Builtin::with_id("article-remove", &["article", "delete"], "Delete an article by ID"),
    // Maintenance
    Builtin::new("cleanup", &["cleanup"], "Delete JSON staging files"),
    Builtin::new("backup", &["backup"], "Create a timestamped database backup"),
    Builtin::new("consistent", &["consistent"], "Check database consistency"),
    Builtin::new("stats", &["stats"], "Show database statistics"),
];

/// Ordered alias table with exact-match lookup
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    entries: Vec<AliasEntry>,
    index: HashMap<String, usize>,
}

impl AliasTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Table holding every built-in alias
    pub fn builtin() -> Self {
        let mut table = Self::new();
        for builtin in BUILTINS {
            let registered = table.register(builtin.to_entry());
            if let Err(err) = &registered {
                error!(alias = builtin.name, %err, "built-in alias rejected");
            }
            debug_assert!(registered.is_ok(), "built-in alias {} rejected", builtin.name);
        }
        table
    }

    /// Add an entry. The first registration of a name wins.
    pub fn register(&mut self, entry: AliasEntry) -> Result<()> {
        entry.validate()?;
        if self.index.contains_key(&entry.name) {
            return Err(Error::DuplicateAlias(entry.name));
        }
        self.index.insert(entry.name.clone(), self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&AliasEntry> {
        self.index.get(name).map(|&i| &self.entries[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Entries in registration order
    pub fn iter(&self) -> impl Iterator<Item = &AliasEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtins_are_unique() {
        let table = AliasTable::builtin();
        assert_eq!(table.len(), BUILTINS.len());
    }

    #[test]
    fn test_every_builtin_is_registered() {
        let table = AliasTable::builtin();
        for builtin in BUILTINS {
            let entry = table.get(builtin.name).unwrap();
            assert_eq!(entry.canonical_args, builtin.canonical);
            assert_eq!(entry.inject_id, builtin.inject_id);
        }
    }

    #[test]
    fn test_builtin_lookup() {
        let table = AliasTable::builtin();
        let edit = table.get("recipe-edit").unwrap();
        assert_eq!(edit.canonical_args, vec!["recipe", "edit"]);
        assert!(edit.inject_id);

        let search = table.get("recipe-search").unwrap();
        let list = table.get("recipe-list").unwrap();
        assert_eq!(search.canonical_args, list.canonical_args);
        assert!(!search.inject_id);
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let table = AliasTable::builtin();
        assert!(table.contains("tag-add"));
        assert!(!table.contains("Tag-Add"));
        assert!(!table.contains("tag-add "));
    }

    #[test]
    fn test_duplicate_keeps_first() {
        let mut table = AliasTable::new();
        table
            .register(AliasEntry::new("backup", ["backup"]).unwrap())
            .unwrap();

        let err = table
            .register(AliasEntry::new("backup", ["cleanup"]).unwrap())
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateAlias(ref n) if n == "backup"));
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("backup").unwrap().canonical_args, vec!["backup"]);
    }

    #[test]
    fn test_invalid_entries_rejected() {
        let empty: [&str; 0] = [];
        assert!(matches!(
            AliasEntry::new("nothing", empty),
            Err(Error::InvalidAlias(_))
        ));
        assert!(matches!(
            AliasEntry::new("", ["stats"]),
            Err(Error::InvalidAlias(_))
        ));

        // Deserialized entries skip `new`, registration still checks them
        let mut table = AliasTable::new();
        let entry = AliasEntry {
            name: "broken".into(),
            canonical_args: vec![],
            inject_id: false,
            summary: String::new(),
        };
        assert!(table.register(entry).is_err());
        assert!(table.is_empty());
    }

    #[test]
    fn test_canonical_form() {
        let table = AliasTable::builtin();
        assert_eq!(table.get("recipe-remove").unwrap().canonical_form(), "recipe delete --id *");
        assert_eq!(table.get("backup").unwrap().canonical_form(), "backup *");
    }

    #[test]
    fn test_iter_preserves_registration_order() {
        let names: Vec<_> = AliasTable::builtin().iter().map(|e| e.name.clone()).collect();
        assert_eq!(names.first().map(String::as_str), Some("recipe-search"));
        assert_eq!(names.last().map(String::as_str), Some("stats"));
    }
}
