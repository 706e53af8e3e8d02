//! Mapping from JVM binary names to Kotlin source names

/// The synthetic source name used for array types
pub const ARRAY: &str = "kotlin.Array";

/// The marker source name used for unbounded wildcard arguments
pub const WILDCARD: &str = "*";

/// The universal object type; bounds equal to it carry no information
pub const ANY: &str = "Any";

/// Map a dotted JVM binary name to the Kotlin source name used by the model.
///
/// Primitives and well-known `java.lang` / `java.util` types map to their
/// Kotlin counterparts; nested-class markers become plain dots; everything
/// else passes through unchanged.
pub fn kotlin_source_name_of(binary_name: &str) -> String {
    match binary_name {
        "void" => "Unit".to_string(),
        "boolean" | "java.lang.Boolean" => "Boolean".to_string(),
        "byte" | "java.lang.Byte" => "Byte".to_string(),
        "short" | "java.lang.Short" => "Short".to_string(),
        "int" | "java.lang.Integer" => "Int".to_string(),
        "char" | "java.lang.Character" => "Char".to_string(),
        "long" | "java.lang.Long" => "Long".to_string(),
        "float" | "java.lang.Float" => "Float".to_string(),
        "double" | "java.lang.Double" => "Double".to_string(),
        "java.lang.Object" => ANY.to_string(),
        "java.lang.String" => "String".to_string(),
        "java.lang.Iterable" => "kotlin.collections.Iterable".to_string(),
        "java.util.Iterator" => "kotlin.collections.Iterator".to_string(),
        "java.util.Collection" => "kotlin.collections.Collection".to_string(),
        "java.util.List" => "kotlin.collections.List".to_string(),
        "java.util.Set" => "kotlin.collections.Set".to_string(),
        "java.util.Map" => "kotlin.collections.Map".to_string(),
        other => other.replace('$', "."),
    }
}

/// Kotlin source name for a base-type descriptor character, if it is one
pub fn base_type_name(descriptor: char) -> Option<&'static str> {
    match descriptor {
        'Z' => Some("Boolean"),
        'B' => Some("Byte"),
        'S' => Some("Short"),
        'I' => Some("Int"),
        'C' => Some("Char"),
        'J' => Some("Long"),
        'F' => Some("Float"),
        'D' => Some("Double"),
        'V' => Some("Unit"),
        _ => None,
    }
}
