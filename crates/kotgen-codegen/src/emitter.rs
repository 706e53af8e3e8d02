//! Kotlin source emission
//!
//! Pure text generation over already-analyzed candidates. Rendering rules:
//!
//! - deprecation and incubating annotation lines, in that order, when flagged
//! - type parameter lists with `reified` prefixes and single-bound rendering
//!   (only the first bound of a formal parameter is rendered; multiple bounds
//!   would need a `where` clause the generated surface does not use)
//! - raw usages of generic types are star-projected to matching arity
//! - a trailing array parameter becomes `vararg`; the configured action type
//!   becomes a receiver-style lambda, `noinline` inside inline functions
//! - the body is a single forwarding call built by the analyzer

use kotgen_classfile::names;
use kotgen_model::{ApiError, ApiFunctionParameter, ApiTypeProvider, ApiTypeUsage};

use crate::analyzer::ExtensionCandidate;

/// Render one candidate as a complete Kotlin declaration
pub fn render(candidate: &ExtensionCandidate, api: &ApiTypeProvider) -> Result<String, ApiError> {
    let spec = api.spec();
    let mut out = String::new();

    out.push_str("/**\n");
    out.push_str(&format!(" * {}.\n", candidate.description));
    out.push_str(" */\n");
    if candidate.is_deprecated {
        out.push_str(&format!("@Deprecated(\"Deprecated {} API\")\n", spec.api_name));
    }
    if candidate.is_incubating {
        if let Some(annotation) = &spec.incubating_annotation {
            out.push_str(&format!("@{annotation}\n"));
        }
    }

    if candidate.is_inline {
        out.push_str("inline ");
    }
    out.push_str("fun ");
    if !candidate.type_parameters.is_empty() {
        let mut rendered = Vec::with_capacity(candidate.type_parameters.len());
        for (usage, reified) in &candidate.type_parameters {
            let prefix = if *reified { "reified " } else { "" };
            rendered.push(format!("{prefix}{}", render_type_parameter(usage, api)?));
        }
        out.push('<');
        out.push_str(&rendered.join(", "));
        out.push_str("> ");
    }

    out.push_str(candidate.target_type.source_name());
    let target_formals = candidate.target_type.formal_type_parameters(api)?;
    if !target_formals.is_empty() {
        let arguments: Vec<&str> = target_formals
            .iter()
            .map(|formal| formal.source_name.as_str())
            .collect();
        out.push('<');
        out.push_str(&arguments.join(", "));
        out.push('>');
    }
    out.push('.');
    out.push_str(&candidate.name);

    out.push('(');
    let last = candidate.parameters.len().saturating_sub(1);
    let mut rendered = Vec::with_capacity(candidate.parameters.len());
    for (position, parameter) in candidate.parameters.iter().enumerate() {
        rendered.push(render_parameter(
            parameter,
            position == last,
            candidate.is_inline,
            api,
        )?);
    }
    out.push_str(&rendered.join(", "));
    out.push_str("): ");
    out.push_str(&render_type_argument(&candidate.return_type, api)?);

    out.push_str(" =\n    ");
    out.push_str(&candidate.expression_body);
    Ok(out)
}

fn render_parameter(
    parameter: &ApiFunctionParameter,
    is_last: bool,
    inline: bool,
    api: &ApiTypeProvider,
) -> Result<String, ApiError> {
    let name = parameter.source_name();
    let ty = &parameter.ty;
    if is_last && ty.source_name == names::ARRAY && ty.type_arguments.len() == 1 {
        return Ok(format!(
            "vararg {name}: {}",
            render_type_argument(&ty.type_arguments[0], api)?
        ));
    }
    if let Some(action) = &api.spec().action_type {
        if &ty.source_name == action && ty.type_arguments.len() == 1 {
            let noinline = if inline { "noinline " } else { "" };
            return Ok(format!(
                "{noinline}{name}: {}.() -> Unit",
                render_type_argument(&ty.type_arguments[0], api)?
            ));
        }
    }
    Ok(format!("{name}: {}", render_type_argument(ty, api)?))
}

/// `Name : Bound` for formal type parameter declarations; only the first
/// bound is rendered.
fn render_type_parameter(usage: &ApiTypeUsage, api: &ApiTypeProvider) -> Result<String, ApiError> {
    let mut out = usage.source_name.clone();
    if let Some(bound) = usage.bounds.first() {
        out.push_str(" : ");
        out.push_str(&render_type_argument(bound, api)?);
    }
    Ok(out)
}

fn render_type_argument(usage: &ApiTypeUsage, api: &ApiTypeProvider) -> Result<String, ApiError> {
    if usage.is_wildcard() {
        return Ok(names::WILDCARD.to_string());
    }
    let mut out = usage.source_name.clone();
    let arguments = star_projected_arguments(usage, api)?;
    if !arguments.is_empty() {
        out.push('<');
        out.push_str(&arguments.join(", "));
        out.push('>');
    }
    if usage.nullable {
        out.push('?');
    }
    Ok(out)
}

/// The rendered argument list of a usage. A raw usage of a type that
/// declares formal parameters gets stars of matching arity, never an empty
/// list.
fn star_projected_arguments(
    usage: &ApiTypeUsage,
    api: &ApiTypeProvider,
) -> Result<Vec<String>, ApiError> {
    if !usage.type_arguments.is_empty() {
        let mut rendered = Vec::with_capacity(usage.type_arguments.len());
        for argument in &usage.type_arguments {
            rendered.push(render_type_argument(argument, api)?);
        }
        return Ok(rendered);
    }
    let arity = match usage.resolve(api)? {
        Some(resolved) => resolved.formal_type_parameters(api)?.len(),
        None => 0,
    };
    Ok(vec![names::WILDCARD.to_string(); arity])
}
