//! Target-API description
//!
//! One [`ApiSpec`] value describes the API being adapted: the public-API
//! policy, the well-known types that drive candidate detection, and the
//! naming of the generated output. The generator core carries no built-in
//! knowledge of any particular host project.

/// Description of the introspected API and of the generated surface
#[derive(Debug, Clone)]
pub struct ApiSpec {
    /// Display name used in generated deprecation messages
    pub api_name: String,
    /// Package declared at the top of the generated source file
    pub output_package: String,
    /// Include path patterns: `pkg/*` matches exactly one additional
    /// capitalized segment, `pkg/**` matches any depth
    pub includes: Vec<String>,
    /// Exclude regular expressions, evaluated after includes; excludes win
    pub excludes: Vec<String>,
    /// Source names of types never considered part of the API
    pub type_deny: Vec<String>,
    /// Function names never eligible for generation
    pub function_deny: Vec<String>,
    /// Source name of the host scripting engine's closure type; functions
    /// taking it are untranslatable and skipped
    pub closure_type: Option<String>,
    /// Source name of the callback wrapper rendered as a receiver-style
    /// lambda parameter
    pub action_type: Option<String>,
    /// Source name of the reflective type-token type eligible for reification
    pub type_of_type: Option<String>,
    /// Source name of the incubating marker annotation, when the API has one
    pub incubating_annotation: Option<String>,
}

impl Default for ApiSpec {
    fn default() -> Self {
        Self {
            api_name: "API".to_string(),
            output_package: "kotgen.generated".to_string(),
            includes: Vec::new(),
            excludes: vec![r".*\.internal\..*".to_string()],
            type_deny: Vec::new(),
            function_deny: vec!["<init>".to_string()],
            closure_type: None,
            action_type: None,
            type_of_type: None,
            incubating_annotation: None,
        }
    }
}

impl ApiSpec {
    /// The incubating annotation as a class-file descriptor, e.g.
    /// `Lorg/acme/Incubating;` for `org.acme.Incubating`
    pub fn incubating_descriptor(&self) -> Option<String> {
        self.incubating_annotation
            .as_ref()
            .map(|name| format!("L{};", name.replace('.', "/")))
    }
}
