//! Kotlin extension-function generation for kotgen
//!
//! Walks every public-API type of an introspected class path, analyzes its
//! functions for patterns worth adapting (class tokens, named-argument maps,
//! reifiable type parameters), and writes one deterministic Kotlin source
//! file of extension declarations.

#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

pub mod analyzer;
pub mod emitter;
pub mod error;

use std::fs;
use std::path::Path;

use tracing::debug;

use kotgen_model::{ApiError, ApiSpec, ApiTypeProvider, ClassBytesRepository, ParameterNamesIndex};

pub use analyzer::{candidates_for, ExtensionCandidate, SignatureKey};
pub use emitter::render;
pub use error::CodegenError;

/// Every rendered declaration for the provider's class path, in type
/// enumeration order and, within a type, in detection rule order.
pub fn api_extension_declarations_for(api: &ApiTypeProvider) -> Result<Vec<String>, ApiError> {
    let mut declarations = Vec::new();
    for api_type in api.all_types()? {
        if !api.filter().is_public_api(&api_type) {
            continue;
        }
        for candidate in candidates_for(api, &api_type)? {
            declarations.push(render(&candidate, api)?);
        }
    }
    Ok(declarations)
}

/// Generate extensions for the given class path and write them to `output`.
///
/// `parameter_names` optionally points to a properties-style index of
/// original parameter names; a missing index file aborts the run. Returns the
/// number of declarations written.
pub fn write_api_extensions_to<P: AsRef<Path>>(
    output: &Path,
    class_path: &[P],
    spec: ApiSpec,
    parameter_names: Option<&Path>,
) -> Result<usize, CodegenError> {
    let repository = ClassBytesRepository::open(class_path)?;
    let api = match parameter_names {
        Some(path) => {
            let index = ParameterNamesIndex::load(path)?;
            ApiTypeProvider::with_parameter_names(repository, spec, index)?
        }
        None => ApiTypeProvider::new(repository, spec)?,
    };

    let header = file_header(&api.spec().output_package);
    let declarations = api_extension_declarations_for(&api);
    api.close();
    let declarations = declarations?;
    debug!(
        declarations = declarations.len(),
        output = %output.display(),
        "writing generated extensions"
    );

    let mut text = header;
    for declaration in &declarations {
        text.push('\n');
        text.push_str(declaration);
        text.push('\n');
    }
    fs::write(output, text)?;
    Ok(declarations.len())
}

fn file_header(output_package: &str) -> String {
    format!(
        "// GENERATED FILE - do not edit\n\
         //\n\
         // Generated by kotgen from the compiled API class path.\n\
         \n\
         package {output_package}\n"
    )
}
