//! Original parameter-name index
//!
//! A companion artifact mapping `{type source name}.{function name}{descriptor}`
//! keys to the original parameter names, in a properties-style text format:
//!
//! ```text
//! org.acme.Container.withType(Ljava/lang/Class;)Lorg/acme/Container;=type
//! org.acme.Factory.create(Ljava/lang/Class;Ljava/lang/String;)V=instanceType,name
//! ```
//!
//! A missing or unreadable index file aborts the whole generation pass:
//! downstream naming quality depends on it. Absent individual entries simply
//! fall back to synthetic positional names.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::ApiError;

/// Lookup of original parameter names by declaring type, function name and
/// raw descriptor
#[derive(Debug, Default)]
pub struct ParameterNamesIndex {
    names: HashMap<String, Vec<String>>,
}

impl ParameterNamesIndex {
    /// Load the index from a properties-style file
    pub fn load(path: &Path) -> Result<Self, ApiError> {
        let text = fs::read_to_string(path).map_err(|source| ApiError::NamesIndex {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::parse(&text))
    }

    /// Parse index content; blank lines and `#` comments are ignored
    pub fn parse(text: &str) -> Self {
        let mut names = HashMap::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((key, value)) = line.split_once('=') {
                let parameter_names = value
                    .split(',')
                    .map(|name| name.trim().to_string())
                    .filter(|name| !name.is_empty())
                    .collect();
                names.insert(key.trim().to_string(), parameter_names);
            }
        }
        Self { names }
    }

    /// Insert one entry; used by tests and index producers
    pub fn insert(&mut self, type_source_name: &str, function_name: &str, descriptor: &str, parameter_names: Vec<String>) {
        self.names
            .insert(key_for(type_source_name, function_name, descriptor), parameter_names);
    }

    /// Original parameter names for the given function, when indexed
    pub fn names_for(
        &self,
        type_source_name: &str,
        function_name: &str,
        descriptor: &str,
    ) -> Option<&[String]> {
        self.names
            .get(&key_for(type_source_name, function_name, descriptor))
            .map(|names| names.as_slice())
    }
}

fn key_for(type_source_name: &str, function_name: &str, descriptor: &str) -> String {
    format!("{type_source_name}.{function_name}{descriptor}")
}
