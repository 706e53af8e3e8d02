//! Extension candidate analysis
//!
//! Scans the filtered function set of one API type for declarations worth
//! generating. Three independent detection rules run in a fixed order, so a
//! function matching several rules yields several candidates:
//!
//! 1. class-token substitution: `Class` parameters (direct, array or
//!    collection) become `kotlin.reflect.KClass`
//! 2. named-argument map: a leading `Map<String, *>` parameter becomes a
//!    trailing `vararg` of key/value pairs
//! 3. reification: a lone type parameter carried by a single type-token
//!    parameter becomes a `reified` type parameter and the token parameter
//!    disappears
//!
//! Candidates are deduplicated per type by a structural signature key that is
//! insensitive to parameter naming but distinguishes parameter types; the
//! first candidate in rule order wins.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;

use kotgen_classfile::names;
use kotgen_model::{
    ApiError, ApiFunction, ApiFunctionParameter, ApiType, ApiTypeProvider, ApiTypeUsage,
};

const JAVA_CLASS: &str = "java.lang.Class";
const KOTLIN_CLASS: &str = "kotlin.reflect.KClass";
const COLLECTION: &str = "kotlin.collections.Collection";
const MAP: &str = "kotlin.collections.Map";
const STRING: &str = "String";
const PAIR: &str = "Pair";

/// One generated declaration, fully analyzed and rewritten
pub struct ExtensionCandidate {
    /// Doc comment body
    pub description: String,
    /// Whether to render the deprecation annotation
    pub is_deprecated: bool,
    /// Whether to render the incubating annotation
    pub is_incubating: bool,
    /// Whether the declaration is `inline`
    pub is_inline: bool,
    /// Declared type parameters, each with its `reified` flag
    pub type_parameters: Vec<(ApiTypeUsage, bool)>,
    /// Receiver type
    pub target_type: Rc<ApiType>,
    /// Function name
    pub name: String,
    /// Declared parameters, after rule substitution
    pub parameters: Vec<ApiFunctionParameter>,
    /// Declared return type
    pub return_type: ApiTypeUsage,
    /// Forwarding call expression
    pub expression_body: String,
}

/// Structural deduplication key: declaring type, its formal parameters,
/// function name, and rewritten parameter types only
#[derive(Debug, PartialEq, Eq, Hash)]
pub struct SignatureKey {
    target: String,
    target_formals: Vec<ApiTypeUsage>,
    name: String,
    parameter_types: Vec<ApiTypeUsage>,
}

impl ExtensionCandidate {
    /// The candidate's structural signature key
    pub fn signature_key(&self, api: &ApiTypeProvider) -> Result<SignatureKey, ApiError> {
        Ok(SignatureKey {
            target: self.target_type.source_name().to_string(),
            target_formals: self.target_type.formal_type_parameters(api)?.to_vec(),
            name: self.name.clone(),
            parameter_types: self.parameters.iter().map(|p| p.ty.clone()).collect(),
        })
    }
}

/// All deduplicated candidates for one type, in rule order
pub fn candidates_for(
    api: &ApiTypeProvider,
    target: &Rc<ApiType>,
) -> Result<Vec<ExtensionCandidate>, ApiError> {
    let spec = api.spec();
    let target_formals = target.formal_type_parameters(api)?.to_vec();

    let mut eligible = Vec::new();
    for function in target.functions(api)? {
        if !function.is_public()
            || function.is_static()
            || !api.filter().is_api_function_name(function.name())
        {
            continue;
        }
        let untranslatable = match &spec.closure_type {
            Some(closure) => function
                .parameters(api)?
                .iter()
                .any(|p| &p.ty.source_name == closure),
            None => false,
        };
        if !untranslatable {
            eligible.push(function);
        }
    }

    let mut candidates = Vec::new();
    for function in &eligible {
        if let Some(candidate) = class_token_candidate(api, target, &target_formals, function)? {
            candidates.push(candidate);
        }
    }
    for function in &eligible {
        if let Some(candidate) = named_arguments_candidate(api, target, &target_formals, function)? {
            candidates.push(candidate);
        }
    }

    // Stable sort so type-token-taking overloads come first: when a type-token
    // and a class-token overload erase to the same rewritten signature, the
    // type-token form survives deduplication.
    let mut reifiable = Vec::new();
    for function in &eligible {
        if let Some((parameter_index, is_type_of)) = reified_parameter_of(api, function)? {
            reifiable.push((*function, parameter_index, is_type_of));
        }
    }
    reifiable.sort_by_key(|(_, _, is_type_of)| if *is_type_of { 0 } else { 1 });
    for (function, parameter_index, is_type_of) in reifiable {
        candidates.push(reified_candidate(
            api,
            target,
            &target_formals,
            function,
            parameter_index,
            is_type_of,
        )?);
    }

    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for candidate in candidates {
        if seen.insert(candidate.signature_key(api)?) {
            unique.push(candidate);
        }
    }
    Ok(unique)
}

fn class_token_candidate(
    api: &ApiTypeProvider,
    target: &Rc<ApiType>,
    target_formals: &[ApiTypeUsage],
    function: &ApiFunction,
) -> Result<Option<ExtensionCandidate>, ApiError> {
    let parameters = function.parameters(api)?;
    if !parameters.iter().any(|p| is_class_token_shape(&p.ty)) {
        return Ok(None);
    }
    let rewritten: Vec<ApiFunctionParameter> =
        parameters.iter().map(class_token_declaration).collect();
    let (declared, declared_names) = renumber_parameters(&rewritten);
    let arguments: Vec<String> = parameters
        .iter()
        .map(|p| {
            let name = &declared_names[&p.index];
            class_token_invocation(&p.ty, name).unwrap_or_else(|| name.clone())
        })
        .collect();
    Ok(Some(ExtensionCandidate {
        description: format!(
            "Kotlin extension function taking [kotlin.reflect.KClass] for [{}.{}]",
            target.source_name(),
            function.name()
        ),
        is_deprecated: function.is_deprecated(),
        is_incubating: function.is_incubating(),
        is_inline: false,
        type_parameters: function
            .formal_type_parameters(api)?
            .iter()
            .chain(target_formals)
            .map(|usage| (usage.clone(), false))
            .collect(),
        target_type: Rc::clone(target),
        name: function.name().to_string(),
        parameters: declared,
        return_type: function.return_type(api)?.clone(),
        expression_body: format!("{}({})", function.name(), arguments.join(", ")),
    }))
}

fn named_arguments_candidate(
    api: &ApiTypeProvider,
    target: &Rc<ApiType>,
    target_formals: &[ApiTypeUsage],
    function: &ApiFunction,
) -> Result<Option<ExtensionCandidate>, ApiError> {
    let parameters = function.parameters(api)?;
    let Some(first) = parameters.first() else {
        return Ok(None);
    };
    if !is_string_keyed_map(&first.ty) {
        return Ok(None);
    }

    // The map moves to the end as a vararg of pairs; everything else keeps
    // its position. The body rebuilds the map where the API expects it.
    let pair = ApiTypeUsage::with_arguments(
        PAIR,
        vec![
            ApiTypeUsage::named(STRING),
            ApiTypeUsage {
                source_name: names::ANY.to_string(),
                nullable: true,
                type_arguments: Vec::new(),
                bounds: Vec::new(),
            },
        ],
    );
    let mut rewritten: Vec<ApiFunctionParameter> = parameters[1..].to_vec();
    rewritten.push(ApiFunctionParameter {
        index: first.index,
        name: first.name.clone(),
        ty: ApiTypeUsage::with_arguments(names::ARRAY, vec![pair]),
    });
    let (declared, declared_names) = renumber_parameters(&rewritten);
    let arguments: Vec<String> = parameters
        .iter()
        .enumerate()
        .map(|(position, p)| {
            let name = &declared_names[&p.index];
            if position == 0 {
                format!("mapOf(*{name})")
            } else {
                name.clone()
            }
        })
        .collect();

    Ok(Some(ExtensionCandidate {
        description: format!(
            "Kotlin extension function taking named arguments for [{}.{}]",
            target.source_name(),
            function.name()
        ),
        is_deprecated: function.is_deprecated(),
        is_incubating: function.is_incubating(),
        is_inline: false,
        type_parameters: function
            .formal_type_parameters(api)?
            .iter()
            .chain(target_formals)
            .map(|usage| (usage.clone(), false))
            .collect(),
        target_type: Rc::clone(target),
        name: function.name().to_string(),
        parameters: declared,
        return_type: function.return_type(api)?.clone(),
        expression_body: format!("{}({})", function.name(), arguments.join(", ")),
    }))
}

/// The `(parameter index, is type-token form)` of the reifiable parameter,
/// when the function has exactly one formal type parameter carried by a
/// single type-token or class-token parameter.
fn reified_parameter_of(
    api: &ApiTypeProvider,
    function: &ApiFunction,
) -> Result<Option<(usize, bool)>, ApiError> {
    let formals = function.formal_type_parameters(api)?;
    if formals.len() != 1 {
        return Ok(None);
    }
    let variable = &formals[0].source_name;
    let parameters = function.parameters(api)?;
    if let Some(type_of) = &api.spec().type_of_type {
        if let Some(p) = parameters.iter().find(|p| is_token_of(&p.ty, type_of, variable)) {
            return Ok(Some((p.index, true)));
        }
    }
    if let Some(p) = parameters
        .iter()
        .find(|p| is_token_of(&p.ty, JAVA_CLASS, variable))
    {
        return Ok(Some((p.index, false)));
    }
    Ok(None)
}

fn reified_candidate(
    api: &ApiTypeProvider,
    target: &Rc<ApiType>,
    target_formals: &[ApiTypeUsage],
    function: &ApiFunction,
    parameter_index: usize,
    is_type_of: bool,
) -> Result<ExtensionCandidate, ApiError> {
    let parameters = function.parameters(api)?;
    let formal = function.formal_type_parameters(api)?[0].clone();
    let variable = formal.source_name.clone();

    let mut type_parameters = vec![(formal, true)];
    type_parameters.extend(target_formals.iter().map(|usage| (usage.clone(), false)));

    let rewritten: Vec<ApiFunctionParameter> = parameters
        .iter()
        .filter(|p| p.index != parameter_index)
        .map(class_token_declaration)
        .collect();
    let (declared, declared_names) = renumber_parameters(&rewritten);
    let arguments: Vec<String> = parameters
        .iter()
        .map(|p| {
            if p.index == parameter_index {
                if is_type_of {
                    format!("typeOf<{variable}>()")
                } else {
                    format!("{variable}::class.java")
                }
            } else {
                let name = &declared_names[&p.index];
                class_token_invocation(&p.ty, name).unwrap_or_else(|| name.clone())
            }
        })
        .collect();

    Ok(ExtensionCandidate {
        description: format!(
            "Kotlin extension function with reified type parameter for [{}.{}]",
            target.source_name(),
            function.name()
        ),
        is_deprecated: function.is_deprecated(),
        is_incubating: function.is_incubating(),
        is_inline: true,
        type_parameters,
        target_type: Rc::clone(target),
        name: function.name().to_string(),
        parameters: declared,
        return_type: function.return_type(api)?.clone(),
        expression_body: format!("{}({})", function.name(), arguments.join(", ")),
    })
}

fn is_class_token(ty: &ApiTypeUsage) -> bool {
    ty.source_name == JAVA_CLASS
}

fn is_array_of_class_tokens(ty: &ApiTypeUsage) -> bool {
    ty.source_name == names::ARRAY
        && ty.type_arguments.len() == 1
        && is_class_token(&ty.type_arguments[0])
}

fn is_collection_of_class_tokens(ty: &ApiTypeUsage) -> bool {
    ty.source_name == COLLECTION
        && ty.type_arguments.len() == 1
        && is_class_token(&ty.type_arguments[0])
}

fn is_class_token_shape(ty: &ApiTypeUsage) -> bool {
    is_class_token(ty) || is_array_of_class_tokens(ty) || is_collection_of_class_tokens(ty)
}

fn is_string_keyed_map(ty: &ApiTypeUsage) -> bool {
    ty.source_name == MAP
        && ty.type_arguments.len() == 2
        && ty.type_arguments[0].source_name == STRING
        && (ty.type_arguments[1].is_wildcard() || ty.type_arguments[1].source_name == names::ANY)
}

fn is_token_of(ty: &ApiTypeUsage, token: &str, variable: &str) -> bool {
    ty.source_name == token
        && ty.type_arguments.len() == 1
        && ty.type_arguments[0].source_name == variable
}

fn class_token_declaration(p: &ApiFunctionParameter) -> ApiFunctionParameter {
    let ty = &p.ty;
    let rewritten = if is_class_token(ty) {
        ApiTypeUsage {
            source_name: KOTLIN_CLASS.to_string(),
            nullable: ty.nullable,
            type_arguments: ty.type_arguments.clone(),
            bounds: Vec::new(),
        }
    } else if is_array_of_class_tokens(ty) || is_collection_of_class_tokens(ty) {
        ApiTypeUsage {
            source_name: ty.source_name.clone(),
            nullable: ty.nullable,
            type_arguments: vec![ApiTypeUsage {
                source_name: KOTLIN_CLASS.to_string(),
                nullable: false,
                type_arguments: ty.type_arguments[0].type_arguments.clone(),
                bounds: Vec::new(),
            }],
            bounds: Vec::new(),
        }
    } else {
        return p.clone();
    };
    ApiFunctionParameter {
        index: p.index,
        name: p.name.clone(),
        ty: rewritten,
    }
}

fn class_token_invocation(ty: &ApiTypeUsage, name: &str) -> Option<String> {
    if is_class_token(ty) {
        Some(format!("{name}.java"))
    } else if is_array_of_class_tokens(ty) {
        Some(format!("*{name}.map {{ it.java }}.toTypedArray()"))
    } else if is_collection_of_class_tokens(ty) {
        Some(format!("{name}.map {{ it.java }}"))
    } else {
        None
    }
}

/// Renumber declared parameters positionally and map each original
/// descriptor index to the name the parameter is declared under. Synthetic
/// names follow declaration order, so a dropped or moved parameter never
/// leaves a gap such as `p1` without `p0`.
fn renumber_parameters(
    order: &[ApiFunctionParameter],
) -> (Vec<ApiFunctionParameter>, HashMap<usize, String>) {
    let mut names = HashMap::new();
    let mut declared = Vec::with_capacity(order.len());
    for (position, parameter) in order.iter().enumerate() {
        let renumbered = ApiFunctionParameter {
            index: position,
            name: parameter.name.clone(),
            ty: parameter.ty.clone(),
        };
        names.insert(parameter.index, renumbered.source_name());
        declared.push(renumbered);
    }
    (declared, names)
}
