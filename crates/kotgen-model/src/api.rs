//! API type graph
//!
//! [`ApiTypeProvider`] provides [`ApiType`] instances by Kotlin source name
//! from a class path. Nodes are built on demand from raw class bytes and
//! memoized in a single name-indexed cache; usages resolve back into full
//! types through the provider rather than through object pointers, so the
//! naturally cyclic generic graph carries no ownership cycles.
//!
//! The provider keeps archive handles open for fast lookup and must be
//! closed. Once closed, all type graph navigation fails with
//! [`ApiError::Closed`], including lazily-evaluated fields on nodes obtained
//! earlier.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use once_cell::unsync::OnceCell;
use tracing::warn;

use kotgen_classfile::class::{ClassFile, MethodInfo};
use kotgen_classfile::names as source_names;
use kotgen_classfile::signature::{ClassSignature, FormalTypeParameter, MethodSignature, TypeSignature};
use kotgen_classfile::{parse_class_signature, parse_method_descriptor, parse_method_signature};

use crate::error::ApiError;
use crate::filter::ApiFilter;
use crate::names::ParameterNamesIndex;
use crate::repository::ClassBytesRepository;
use crate::spec::ApiSpec;

const DEPRECATED_DESCRIPTOR: &str = "Ljava/lang/Deprecated;";
const NULLABLE_DESCRIPTOR: &str = "Ljavax/annotation/Nullable;";

/// Memoizing provider of [`ApiType`] nodes over a class path
pub struct ApiTypeProvider {
    repository: RefCell<ClassBytesRepository>,
    spec: ApiSpec,
    filter: ApiFilter,
    parameter_names: Option<ParameterNamesIndex>,
    incubating_descriptor: Option<String>,
    cache: RefCell<HashMap<String, Option<Rc<ApiType>>>>,
    closed: Cell<bool>,
}

impl ApiTypeProvider {
    /// Create a provider over an open repository
    pub fn new(repository: ClassBytesRepository, spec: ApiSpec) -> Result<Self, ApiError> {
        Self::with(repository, spec, None)
    }

    /// Create a provider that resolves original parameter names through the
    /// given index
    pub fn with_parameter_names(
        repository: ClassBytesRepository,
        spec: ApiSpec,
        parameter_names: ParameterNamesIndex,
    ) -> Result<Self, ApiError> {
        Self::with(repository, spec, Some(parameter_names))
    }

    fn with(
        repository: ClassBytesRepository,
        spec: ApiSpec,
        parameter_names: Option<ParameterNamesIndex>,
    ) -> Result<Self, ApiError> {
        let filter = ApiFilter::new(&spec)?;
        let incubating_descriptor = spec.incubating_descriptor();
        Ok(Self {
            repository: RefCell::new(repository),
            spec,
            filter,
            parameter_names,
            incubating_descriptor,
            cache: RefCell::new(HashMap::new()),
            closed: Cell::new(false),
        })
    }

    /// The target-API description this provider was created with
    pub fn spec(&self) -> &ApiSpec {
        &self.spec
    }

    /// The compiled public-API filter
    pub fn filter(&self) -> &ApiFilter {
        &self.filter
    }

    /// The type with the given Kotlin source name, when present on the class
    /// path and readable. Memoized: repeated lookups return the same node.
    pub fn type_of(&self, source_name: &str) -> Result<Option<Rc<ApiType>>, ApiError> {
        self.ensure_open()?;
        if let Some(cached) = self.cache.borrow().get(source_name) {
            return Ok(cached.clone());
        }
        let bytes = self.repository.borrow_mut().class_bytes_for(source_name)?;
        let node = bytes.and_then(|bytes| self.materialize(source_name, &bytes));
        self.cache
            .borrow_mut()
            .insert(source_name.to_string(), node.clone());
        Ok(node)
    }

    /// Every readable type on the class path, in enumeration order.
    ///
    /// Honors the memo cache: a type materialized earlier is reused, never
    /// duplicated. Unreadable classes are excluded, not fatal.
    pub fn all_types(&self) -> Result<Vec<Rc<ApiType>>, ApiError> {
        self.ensure_open()?;
        let names = self.repository.borrow_mut().all_class_source_names()?;
        let mut types = Vec::with_capacity(names.len());
        for name in names {
            if let Some(node) = self.type_of(&name)? {
                types.push(node);
            }
        }
        Ok(types)
    }

    /// Close the provider, releasing all archive handles. Idempotent.
    pub fn close(&self) {
        self.repository.borrow_mut().close();
        self.closed.set(true);
    }

    /// Whether the provider has been closed
    pub fn is_closed(&self) -> bool {
        self.closed.get()
    }

    pub(crate) fn ensure_open(&self) -> Result<(), ApiError> {
        if self.closed.get() {
            Err(ApiError::Closed)
        } else {
            Ok(())
        }
    }

    fn materialize(&self, source_name: &str, bytes: &[u8]) -> Option<Rc<ApiType>> {
        match ClassFile::parse(bytes) {
            Ok(class) => Some(Rc::new(ApiType::new(
                source_name.to_string(),
                class,
                self.incubating_descriptor.clone(),
            ))),
            Err(error) => {
                warn!(source_name, %error, "skipping unreadable class");
                None
            }
        }
    }

    fn parameter_names_for(
        &self,
        type_source_name: &str,
        function_name: &str,
        descriptor: &str,
    ) -> Option<Vec<String>> {
        self.parameter_names
            .as_ref()
            .and_then(|index| index.names_for(type_source_name, function_name, descriptor))
            .map(|names| names.to_vec())
    }
}

/// One type of the introspected API
pub struct ApiType {
    source_name: String,
    class: ClassFile,
    is_deprecated: bool,
    is_incubating: bool,
    incubating_descriptor: Option<String>,
    class_signature: OnceCell<Option<ClassSignature>>,
    formal_type_parameters: OnceCell<Vec<ApiTypeUsage>>,
    functions: OnceCell<Vec<ApiFunction>>,
}

impl ApiType {
    fn new(source_name: String, class: ClassFile, incubating_descriptor: Option<String>) -> Self {
        let is_deprecated = class.deprecated_attribute
            || class.annotations.iter().any(|a| a == DEPRECATED_DESCRIPTOR);
        let is_incubating = incubating_descriptor
            .as_deref()
            .is_some_and(|descriptor| class.annotations.iter().any(|a| a == descriptor));
        Self {
            source_name,
            class,
            is_deprecated,
            is_incubating,
            incubating_descriptor,
            class_signature: OnceCell::new(),
            formal_type_parameters: OnceCell::new(),
            functions: OnceCell::new(),
        }
    }

    /// Fully-qualified Kotlin source name, nested types joined by dots
    pub fn source_name(&self) -> &str {
        &self.source_name
    }

    /// Whether the type is declared public
    pub fn is_public(&self) -> bool {
        self.class.is_public()
    }

    /// Whether the type is deprecated
    pub fn is_deprecated(&self) -> bool {
        self.is_deprecated
    }

    /// Whether the type carries the incubating marker annotation
    pub fn is_incubating(&self) -> bool {
        self.is_incubating
    }

    /// Formal type parameters declared by the type, lazily computed once
    pub fn formal_type_parameters(&self, api: &ApiTypeProvider) -> Result<&[ApiTypeUsage], ApiError> {
        api.ensure_open()?;
        let parameters = self.formal_type_parameters.get_or_init(|| {
            match self.class_signature() {
                Some(signature) => usages_of_formal_parameters(&signature.formal_type_parameters),
                None => Vec::new(),
            }
        });
        Ok(parameters.as_slice())
    }

    /// Declared functions in class-file order, lazily computed once
    pub fn functions(&self, api: &ApiTypeProvider) -> Result<&[ApiFunction], ApiError> {
        api.ensure_open()?;
        let functions = self.functions.get_or_init(|| {
            self.class
                .methods
                .iter()
                .map(|method| {
                    let parameter_names = api.parameter_names_for(
                        &self.source_name,
                        &method.name,
                        &method.descriptor,
                    );
                    ApiFunction::new(self, method.clone(), parameter_names)
                })
                .collect()
        });
        Ok(functions.as_slice())
    }

    fn class_signature(&self) -> Option<&ClassSignature> {
        self.class_signature
            .get_or_init(|| match self.class.signature.as_deref() {
                Some(text) => match parse_class_signature(text) {
                    Ok(signature) => Some(signature),
                    Err(error) => {
                        warn!(source_name = self.source_name.as_str(), %error,
                            "unrecognized class signature, treating type as non-generic");
                        None
                    }
                },
                None => None,
            })
            .as_ref()
    }
}

impl fmt::Debug for ApiType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiType")
            .field("source_name", &self.source_name)
            .finish_non_exhaustive()
    }
}

/// One declared function of an [`ApiType`]
pub struct ApiFunction {
    owner_source_name: String,
    method: MethodInfo,
    is_deprecated: bool,
    is_incubating: bool,
    parameter_names: Option<Vec<String>>,
    signature: OnceCell<Option<MethodSignature>>,
    formal_type_parameters: OnceCell<Vec<ApiTypeUsage>>,
    parameters: OnceCell<Vec<ApiFunctionParameter>>,
    return_type: OnceCell<ApiTypeUsage>,
}

impl ApiFunction {
    fn new(owner: &ApiType, method: MethodInfo, parameter_names: Option<Vec<String>>) -> Self {
        let is_deprecated = owner.is_deprecated()
            || method.deprecated_attribute
            || method.annotations.iter().any(|a| a == DEPRECATED_DESCRIPTOR);
        let is_incubating = owner.is_incubating()
            || owner
                .incubating_descriptor
                .as_deref()
                .is_some_and(|descriptor| method.annotations.iter().any(|a| a == descriptor));
        Self {
            owner_source_name: owner.source_name.clone(),
            method,
            is_deprecated,
            is_incubating,
            parameter_names,
            signature: OnceCell::new(),
            formal_type_parameters: OnceCell::new(),
            parameters: OnceCell::new(),
            return_type: OnceCell::new(),
        }
    }

    /// Function name (`<init>` for constructors)
    pub fn name(&self) -> &str {
        &self.method.name
    }

    /// Raw descriptor; together with the declaring type and name it
    /// identifies the function among overloads
    pub fn descriptor(&self) -> &str {
        &self.method.descriptor
    }

    /// Whether the function is declared public
    pub fn is_public(&self) -> bool {
        self.method.is_public()
    }

    /// Whether the function is declared static
    pub fn is_static(&self) -> bool {
        self.method.is_static()
    }

    /// Whether the function or its declaring type is deprecated
    pub fn is_deprecated(&self) -> bool {
        self.is_deprecated
    }

    /// Whether the function or its declaring type is incubating
    pub fn is_incubating(&self) -> bool {
        self.is_incubating
    }

    /// Formal type parameters declared by the function, lazily computed once
    pub fn formal_type_parameters(&self, api: &ApiTypeProvider) -> Result<&[ApiTypeUsage], ApiError> {
        api.ensure_open()?;
        let parameters = self.formal_type_parameters.get_or_init(|| {
            match self.signature() {
                Some(signature) => usages_of_formal_parameters(&signature.formal_type_parameters),
                None => Vec::new(),
            }
        });
        Ok(parameters.as_slice())
    }

    /// Parameters in descriptor order, lazily computed once.
    ///
    /// Signature-derived when a generic signature is present and its count
    /// agrees with the descriptor; descriptor-derived otherwise.
    pub fn parameters(&self, api: &ApiTypeProvider) -> Result<&[ApiFunctionParameter], ApiError> {
        api.ensure_open()?;
        let parameters = self
            .parameters
            .get_or_try_init(|| self.compute_parameters())?;
        Ok(parameters.as_slice())
    }

    /// Return type, lazily computed once
    pub fn return_type(&self, api: &ApiTypeProvider) -> Result<&ApiTypeUsage, ApiError> {
        api.ensure_open()?;
        self.return_type.get_or_try_init(|| {
            let nullable = self.method.annotations.iter().any(|a| a == NULLABLE_DESCRIPTOR);
            match self.signature() {
                Some(signature) => Ok(usage_of(&signature.return_type, nullable)),
                None => {
                    let (_, return_type) = self.descriptor_types()?;
                    Ok(usage_of(&return_type, nullable))
                }
            }
        })
    }

    fn compute_parameters(&self) -> Result<Vec<ApiFunctionParameter>, ApiError> {
        let (descriptor_parameters, _) = self.descriptor_types()?;
        let types = match self.signature() {
            Some(signature) if signature.parameters.len() == descriptor_parameters.len() => {
                signature.parameters.clone()
            }
            Some(_) => {
                warn!(
                    owner = self.owner_source_name.as_str(),
                    function = self.method.name.as_str(),
                    "signature and descriptor parameter counts disagree, using descriptor"
                );
                descriptor_parameters
            }
            None => descriptor_parameters,
        };
        Ok(types
            .into_iter()
            .enumerate()
            .map(|(index, type_signature)| ApiFunctionParameter {
                index,
                name: self
                    .parameter_names
                    .as_ref()
                    .and_then(|names| names.get(index).cloned()),
                ty: usage_of(&type_signature, self.parameter_is_nullable(index)),
            })
            .collect())
    }

    fn descriptor_types(&self) -> Result<(Vec<TypeSignature>, TypeSignature), ApiError> {
        parse_method_descriptor(&self.method.descriptor).map_err(|_| {
            ApiError::MalformedDescriptor {
                function: format!("{}.{}", self.owner_source_name, self.method.name),
                descriptor: self.method.descriptor.clone(),
            }
        })
    }

    fn parameter_is_nullable(&self, index: usize) -> bool {
        self.method
            .parameter_annotations
            .get(index)
            .is_some_and(|annotations| annotations.iter().any(|a| a == NULLABLE_DESCRIPTOR))
    }

    fn signature(&self) -> Option<&MethodSignature> {
        self.signature
            .get_or_init(|| match self.method.signature.as_deref() {
                Some(text) => match parse_method_signature(text) {
                    Ok(signature) => Some(signature),
                    Err(error) => {
                        warn!(
                            owner = self.owner_source_name.as_str(),
                            function = self.method.name.as_str(),
                            %error,
                            "unrecognized method signature, falling back to descriptor"
                        );
                        None
                    }
                },
                None => None,
            })
            .as_ref()
    }
}

impl fmt::Debug for ApiFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiFunction")
            .field("owner", &self.owner_source_name)
            .field("name", &self.method.name)
            .field("descriptor", &self.method.descriptor)
            .finish_non_exhaustive()
    }
}

/// One parameter of an [`ApiFunction`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ApiFunctionParameter {
    /// Zero-based position in the descriptor
    pub index: usize,
    /// Original parameter name, when the names index supplied one
    pub name: Option<String>,
    /// Parameter type
    pub ty: ApiTypeUsage,
}

impl ApiFunctionParameter {
    /// The name used in generated source: the original name, or a synthetic
    /// positional one
    pub fn source_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("p{}", self.index),
        }
    }
}

/// A recursive type reference: usage of a type, type variable or wildcard
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ApiTypeUsage {
    /// Kotlin source name of the used type, or `*` for wildcards
    pub source_name: String,
    /// Whether the usage is nullable
    pub nullable: bool,
    /// Type arguments, in order
    pub type_arguments: Vec<ApiTypeUsage>,
    /// Bounds; only populated for formal type parameter declarations, with
    /// bounds equal to the universal object type dropped
    pub bounds: Vec<ApiTypeUsage>,
}

impl ApiTypeUsage {
    /// A plain usage with no arguments or bounds
    pub fn named(source_name: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            nullable: false,
            type_arguments: Vec::new(),
            bounds: Vec::new(),
        }
    }

    /// A usage with the given type arguments
    pub fn with_arguments(source_name: impl Into<String>, type_arguments: Vec<ApiTypeUsage>) -> Self {
        Self {
            source_name: source_name.into(),
            nullable: false,
            type_arguments,
            bounds: Vec::new(),
        }
    }

    /// Whether this is the unbounded wildcard marker
    pub fn is_wildcard(&self) -> bool {
        self.source_name == source_names::WILDCARD
    }

    /// Resolve the usage back into its full type through the provider.
    ///
    /// Type variables, primitives and off-class-path types resolve to `None`.
    pub fn resolve(&self, api: &ApiTypeProvider) -> Result<Option<Rc<ApiType>>, ApiError> {
        if self.is_wildcard() {
            return Ok(None);
        }
        api.type_of(&self.source_name)
    }
}

impl fmt::Display for ApiTypeUsage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.source_name)?;
        if !self.type_arguments.is_empty() {
            write!(f, "<")?;
            for (index, argument) in self.type_arguments.iter().enumerate() {
                if index > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{argument}")?;
            }
            write!(f, ">")?;
        }
        if self.nullable {
            write!(f, "?")?;
        }
        Ok(())
    }
}

fn usage_of(signature: &TypeSignature, nullable: bool) -> ApiTypeUsage {
    ApiTypeUsage {
        source_name: signature.name.clone(),
        nullable,
        type_arguments: signature.arguments.iter().map(|a| usage_of(a, false)).collect(),
        bounds: Vec::new(),
    }
}

fn usages_of_formal_parameters(parameters: &[FormalTypeParameter]) -> Vec<ApiTypeUsage> {
    parameters
        .iter()
        .map(|parameter| ApiTypeUsage {
            source_name: parameter.name.clone(),
            nullable: false,
            type_arguments: Vec::new(),
            bounds: parameter
                .bounds
                .iter()
                .filter(|bound| bound.name != source_names::ANY)
                .map(|bound| usage_of(bound, false))
                .collect(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_display() {
        let usage = ApiTypeUsage {
            source_name: "kotlin.collections.Map".to_string(),
            nullable: true,
            type_arguments: vec![ApiTypeUsage::named("String"), ApiTypeUsage::named("*")],
            bounds: Vec::new(),
        };
        assert_eq!(usage.to_string(), "kotlin.collections.Map<String, *>?");
    }

    #[test]
    fn test_wildcard_marker() {
        assert!(ApiTypeUsage::named("*").is_wildcard());
        assert!(!ApiTypeUsage::named("T").is_wildcard());
    }

    #[test]
    fn test_synthetic_parameter_names() {
        let parameter = ApiFunctionParameter {
            index: 2,
            name: None,
            ty: ApiTypeUsage::named("String"),
        };
        assert_eq!(parameter.source_name(), "p2");
        let named = ApiFunctionParameter {
            name: Some("type".to_string()),
            ..parameter
        };
        assert_eq!(named.source_name(), "type");
    }
}
