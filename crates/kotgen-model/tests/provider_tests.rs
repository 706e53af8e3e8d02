//! Integration tests for the lazily-resolved API type graph

use std::rc::Rc;

use kotgen_model::{
    ApiError, ApiSpec, ApiTypeProvider, ClassBytesRepository, ParameterNamesIndex,
};
use kotgen_testkit::{write_class_jar, ClassFileBuilder, MethodBuilder};
use tempfile::TempDir;

fn acme_spec() -> ApiSpec {
    ApiSpec {
        includes: vec!["org/acme/**".to_string()],
        incubating_annotation: Some("org.acme.Incubating".to_string()),
        ..ApiSpec::default()
    }
}

fn container_class() -> Vec<u8> {
    ClassFileBuilder::new("org/acme/Container")
        .signature("<T:Lorg/acme/Plugin;>Ljava/lang/Object;")
        .method(
            MethodBuilder::new("withType", "(Ljava/lang/Class;)Lorg/acme/Container;")
                .signature("<S:TT;>(Ljava/lang/Class<TS;>;)Lorg/acme/Container<TS;>;"),
        )
        .build()
}

fn provider_over(classes: &[(&str, Vec<u8>)], spec: ApiSpec) -> (TempDir, ApiTypeProvider) {
    let temp = TempDir::new().unwrap();
    let jar = temp.path().join("api.jar");
    write_class_jar(&jar, classes).unwrap();
    let repository = ClassBytesRepository::open(&[jar]).unwrap();
    let api = ApiTypeProvider::new(repository, spec).unwrap();
    (temp, api)
}

#[test]
fn test_type_lookup_is_memoized() {
    let (_temp, api) = provider_over(&[("org/acme/Container", container_class())], acme_spec());

    let first = api.type_of("org.acme.Container").unwrap().unwrap();
    let second = api.type_of("org.acme.Container").unwrap().unwrap();
    assert!(Rc::ptr_eq(&first, &second));

    let all = api.all_types().unwrap();
    assert_eq!(all.len(), 1);
    assert!(Rc::ptr_eq(&first, &all[0]));
    api.close();
}

#[test]
fn test_generic_type_graph_navigation() {
    let (_temp, api) = provider_over(&[("org/acme/Container", container_class())], acme_spec());

    let container = api.type_of("org.acme.Container").unwrap().unwrap();
    assert_eq!(container.source_name(), "org.acme.Container");
    assert!(container.is_public());

    let formals = container.formal_type_parameters(&api).unwrap();
    assert_eq!(formals.len(), 1);
    assert_eq!(formals[0].source_name, "T");
    assert_eq!(formals[0].bounds.len(), 1);
    assert_eq!(formals[0].bounds[0].source_name, "org.acme.Plugin");

    let functions = container.functions(&api).unwrap();
    assert_eq!(functions.len(), 1);
    let with_type = &functions[0];
    assert_eq!(with_type.name(), "withType");

    let function_formals = with_type.formal_type_parameters(&api).unwrap();
    assert_eq!(function_formals[0].source_name, "S");
    assert_eq!(function_formals[0].bounds[0].source_name, "T");

    let parameters = with_type.parameters(&api).unwrap();
    assert_eq!(parameters.len(), 1);
    assert_eq!(parameters[0].source_name(), "p0");
    assert_eq!(parameters[0].ty.source_name, "java.lang.Class");
    assert_eq!(parameters[0].ty.type_arguments[0].source_name, "S");

    let return_type = with_type.return_type(&api).unwrap();
    assert_eq!(return_type.source_name, "org.acme.Container");
    assert_eq!(return_type.type_arguments[0].source_name, "S");
    api.close();
}

#[test]
fn test_object_bound_is_dropped() {
    let bytes = ClassFileBuilder::new("org/acme/Box")
        .signature("<T:Ljava/lang/Object;>Ljava/lang/Object;")
        .build();
    let (_temp, api) = provider_over(&[("org/acme/Box", bytes)], acme_spec());

    let boxed = api.type_of("org.acme.Box").unwrap().unwrap();
    let formals = boxed.formal_type_parameters(&api).unwrap();
    assert_eq!(formals[0].source_name, "T");
    assert!(formals[0].bounds.is_empty());
    api.close();
}

#[test]
fn test_malformed_method_signature_falls_back_to_descriptor() {
    let bytes = ClassFileBuilder::new("org/acme/Registry")
        .method(MethodBuilder::new("find", "(Ljava/lang/String;I)V").signature("<T:>(((garbage"))
        .build();
    let (_temp, api) = provider_over(&[("org/acme/Registry", bytes)], acme_spec());

    let registry = api.type_of("org.acme.Registry").unwrap().unwrap();
    let find = &registry.functions(&api).unwrap()[0];
    assert!(find.formal_type_parameters(&api).unwrap().is_empty());

    let parameters = find.parameters(&api).unwrap();
    assert_eq!(parameters.len(), 2);
    assert_eq!(parameters[0].ty.source_name, "String");
    assert_eq!(parameters[1].ty.source_name, "Int");
    assert!(parameters[0].ty.type_arguments.is_empty());
    assert_eq!(find.return_type(&api).unwrap().source_name, "Unit");
    api.close();
}

#[test]
fn test_signature_disagreeing_with_descriptor_falls_back_to_descriptor() {
    // A syntactically valid signature whose parameter count does not match
    // the descriptor cannot be trusted for parameter typing.
    let bytes = ClassFileBuilder::new("org/acme/Registry")
        .method(
            MethodBuilder::new("find", "(Ljava/lang/String;I)V")
                .signature("(Ljava/util/List<Ljava/lang/String;>;)V"),
        )
        .build();
    let (_temp, api) = provider_over(&[("org/acme/Registry", bytes)], acme_spec());

    let registry = api.type_of("org.acme.Registry").unwrap().unwrap();
    let find = &registry.functions(&api).unwrap()[0];
    let parameters = find.parameters(&api).unwrap();
    assert_eq!(parameters.len(), 2);
    assert_eq!(parameters[0].ty.source_name, "String");
    assert!(parameters[0].ty.type_arguments.is_empty());
    assert_eq!(parameters[1].ty.source_name, "Int");
    api.close();
}

#[test]
fn test_every_bound_of_a_formal_is_kept() {
    let bytes = ClassFileBuilder::new("org/acme/SortedBox")
        .signature("<T::Ljava/lang/Comparable;:Ljava/io/Serializable;>Ljava/lang/Object;")
        .build();
    let (_temp, api) = provider_over(&[("org/acme/SortedBox", bytes)], acme_spec());

    let sorted = api.type_of("org.acme.SortedBox").unwrap().unwrap();
    let formals = sorted.formal_type_parameters(&api).unwrap();
    assert_eq!(formals[0].source_name, "T");
    assert_eq!(formals[0].bounds.len(), 2);
    assert_eq!(formals[0].bounds[0].source_name, "java.lang.Comparable");
    assert_eq!(formals[0].bounds[1].source_name, "java.io.Serializable");
    api.close();
}

#[test]
fn test_parameter_names_come_from_the_index() {
    let mut index = ParameterNamesIndex::default();
    index.insert(
        "org.acme.Container",
        "withType",
        "(Ljava/lang/Class;)Lorg/acme/Container;",
        vec!["type".to_string()],
    );

    let temp = TempDir::new().unwrap();
    let jar = temp.path().join("api.jar");
    write_class_jar(&jar, &[("org/acme/Container", container_class())]).unwrap();
    let repository = ClassBytesRepository::open(&[jar]).unwrap();
    let api = ApiTypeProvider::with_parameter_names(repository, acme_spec(), index).unwrap();

    let container = api.type_of("org.acme.Container").unwrap().unwrap();
    let parameters = container.functions(&api).unwrap()[0].parameters(&api).unwrap();
    assert_eq!(parameters[0].source_name(), "type");
    api.close();
}

#[test]
fn test_nullability_from_parameter_annotations() {
    let bytes = ClassFileBuilder::new("org/acme/Registry")
        .method(
            MethodBuilder::new("find", "(Ljava/lang/String;)Ljava/lang/Object;")
                .annotation("Ljavax/annotation/Nullable;")
                .parameter_annotations(&[&["Ljavax/annotation/Nullable;"]]),
        )
        .build();
    let (_temp, api) = provider_over(&[("org/acme/Registry", bytes)], acme_spec());

    let registry = api.type_of("org.acme.Registry").unwrap().unwrap();
    let find = &registry.functions(&api).unwrap()[0];
    assert!(find.parameters(&api).unwrap()[0].ty.nullable);
    assert!(find.return_type(&api).unwrap().nullable);
    api.close();
}

#[test]
fn test_deprecation_and_incubation_are_inherited_from_the_type() {
    let bytes = ClassFileBuilder::new("org/acme/Legacy")
        .annotation("Ljava/lang/Deprecated;")
        .annotation("Lorg/acme/Incubating;")
        .method(MethodBuilder::new("run", "()V"))
        .build();
    let (_temp, api) = provider_over(&[("org/acme/Legacy", bytes)], acme_spec());

    let legacy = api.type_of("org.acme.Legacy").unwrap().unwrap();
    assert!(legacy.is_deprecated());
    assert!(legacy.is_incubating());
    let run = &legacy.functions(&api).unwrap()[0];
    assert!(run.is_deprecated());
    assert!(run.is_incubating());
    api.close();
}

#[test]
fn test_unreadable_class_is_skipped_not_fatal() {
    let (_temp, api) = provider_over(
        &[
            ("org/acme/Broken", vec![0xDE, 0xAD, 0xBE, 0xEF]),
            ("org/acme/Container", container_class()),
        ],
        acme_spec(),
    );

    assert!(api.type_of("org.acme.Broken").unwrap().is_none());
    let all = api.all_types().unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].source_name(), "org.acme.Container");
    api.close();
}

#[test]
fn test_lazy_navigation_fails_after_close() {
    let (_temp, api) = provider_over(&[("org/acme/Container", container_class())], acme_spec());

    let container = api.type_of("org.acme.Container").unwrap().unwrap();
    api.close();
    api.close();
    assert!(api.is_closed());

    assert!(matches!(api.type_of("org.acme.Container"), Err(ApiError::Closed)));
    assert!(matches!(api.all_types(), Err(ApiError::Closed)));
    assert!(matches!(container.functions(&api), Err(ApiError::Closed)));
    assert!(matches!(
        container.formal_type_parameters(&api),
        Err(ApiError::Closed)
    ));
}
