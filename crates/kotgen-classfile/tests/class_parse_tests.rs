//! Integration tests parsing synthesized class files

use kotgen_classfile::{parse_method_signature, ClassFile};
use kotgen_testkit::{ClassFileBuilder, MethodBuilder};

#[test]
fn test_parses_flags_names_and_signatures() {
    let bytes = ClassFileBuilder::new("org/acme/Container")
        .signature("<T:Lorg/acme/Plugin;>Ljava/lang/Object;")
        .method(
            MethodBuilder::new("withType", "(Ljava/lang/Class;)Lorg/acme/Container;")
                .signature("<S:TT;>(Ljava/lang/Class<TS;>;)Lorg/acme/Container<TS;>;"),
        )
        .build();

    let class = ClassFile::parse(&bytes).unwrap();
    assert!(class.is_public());
    assert_eq!(class.internal_name, "org/acme/Container");
    assert_eq!(
        class.signature.as_deref(),
        Some("<T:Lorg/acme/Plugin;>Ljava/lang/Object;")
    );

    let method = &class.methods[0];
    assert_eq!(method.name, "withType");
    assert_eq!(method.descriptor, "(Ljava/lang/Class;)Lorg/acme/Container;");
    assert!(method.is_public());
    assert!(!method.is_static());

    let signature = parse_method_signature(method.signature.as_deref().unwrap()).unwrap();
    assert_eq!(signature.formal_type_parameters[0].name, "S");
}

#[test]
fn test_parses_annotations_and_deprecation() {
    let bytes = ClassFileBuilder::new("org/acme/Registry")
        .annotation("Lorg/acme/Incubating;")
        .method(
            MethodBuilder::new("find", "(Ljava/lang/String;)Ljava/lang/Object;")
                .annotation("Ljavax/annotation/Nullable;")
                .annotation("Ljava/lang/Deprecated;")
                .parameter_annotations(&[&["Ljavax/annotation/Nullable;"]])
                .deprecated(),
        )
        .build();

    let class = ClassFile::parse(&bytes).unwrap();
    assert_eq!(class.annotations, vec!["Lorg/acme/Incubating;"]);
    assert!(!class.deprecated_attribute);

    let method = &class.methods[0];
    assert_eq!(
        method.annotations,
        vec!["Ljavax/annotation/Nullable;", "Ljava/lang/Deprecated;"]
    );
    assert_eq!(
        method.parameter_annotations,
        vec![vec!["Ljavax/annotation/Nullable;".to_string()]]
    );
    assert!(method.deprecated_attribute);
}

#[test]
fn test_identical_bytes_yield_identical_trees() {
    let bytes = ClassFileBuilder::new("org/acme/Thing")
        .method(MethodBuilder::new("size", "()I"))
        .build();

    let first = ClassFile::parse(&bytes).unwrap();
    let second = ClassFile::parse(&bytes).unwrap();
    assert_eq!(first.internal_name, second.internal_name);
    assert_eq!(first.methods.len(), second.methods.len());
    assert_eq!(first.methods[0].descriptor, second.methods[0].descriptor);
}
