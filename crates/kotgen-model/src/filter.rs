//! Public-API filter
//!
//! A static policy narrowing the full type model down to the intended public
//! surface: visibility, include path patterns and exclude regexes (excludes
//! always win), plus small name deny-lists at the type and function level.

use std::collections::HashSet;

use regex::Regex;

use crate::api::ApiType;
use crate::error::ApiError;
use crate::spec::ApiSpec;

/// Compiled public-API policy
#[derive(Debug)]
pub struct ApiFilter {
    includes: Vec<Regex>,
    excludes: Vec<Regex>,
    type_deny: HashSet<String>,
    function_deny: HashSet<String>,
}

impl ApiFilter {
    /// Compile the policy carried by the given spec
    pub fn new(spec: &ApiSpec) -> Result<Self, ApiError> {
        let mut includes = Vec::with_capacity(spec.includes.len());
        for pattern in &spec.includes {
            includes.push(compile_include(pattern)?);
        }
        let mut excludes = Vec::with_capacity(spec.excludes.len());
        for pattern in &spec.excludes {
            excludes.push(Regex::new(&format!("^(?:{pattern})$"))?);
        }
        Ok(Self {
            includes,
            excludes,
            type_deny: spec.type_deny.iter().cloned().collect(),
            function_deny: spec.function_deny.iter().cloned().collect(),
        })
    }

    /// Whether the type belongs to the public API surface
    pub fn is_public_api(&self, api_type: &ApiType) -> bool {
        let source_name = api_type.source_name();
        api_type.is_public()
            && !self.type_deny.contains(source_name)
            && !self.excludes.iter().any(|e| e.is_match(source_name))
            && self.includes.iter().any(|i| i.is_match(source_name))
    }

    /// Whether a function name is eligible at all (not deny-listed)
    pub fn is_api_function_name(&self, name: &str) -> bool {
        !self.function_deny.contains(name)
    }
}

/// `pkg/*` matches exactly one additional capitalized segment (a single
/// top-level type in that package); `pkg/**` matches any depth.
fn compile_include(pattern: &str) -> Result<Regex, ApiError> {
    let source = if let Some(prefix) = pattern.strip_suffix("**") {
        format!("^{}.*$", regex_prefix(prefix))
    } else if let Some(prefix) = pattern.strip_suffix('*') {
        format!("^{}[A-Z][^.]*(?:\\.[A-Z][^.]*)*$", regex_prefix(prefix))
    } else {
        return Err(ApiError::InvalidPattern(pattern.to_string()));
    };
    Ok(Regex::new(&source)?)
}

fn regex_prefix(prefix: &str) -> String {
    regex::escape(&prefix.replace('/', "."))
}
