//! Generic-signature grammar parsing (JVMS 4.7.9.1)
//!
//! A recursive-descent parser over the optional signature strings attached to
//! classes and methods. The output tree uses Kotlin source names throughout:
//! arrays become the synthetic `kotlin.Array` wrapper, unbounded wildcards the
//! `*` marker, bounded wildcards collapse to their bound (variance is not
//! distinguished), and type variables keep their bare name for later
//! resolution against the enclosing formal scope.

use crate::error::SignatureError;
use crate::names::{self, kotlin_source_name_of};

/// A parsed type reference: a source name plus recursively parsed arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSignature {
    /// Kotlin source name of the referenced type, type variable, or marker
    pub name: String,
    /// Type arguments (the element type, for arrays)
    pub arguments: Vec<TypeSignature>,
}

impl TypeSignature {
    /// A type signature with no arguments
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: Vec::new(),
        }
    }

    /// The descriptor-level erasure of this signature: arguments are dropped,
    /// array element types are kept (erased recursively).
    pub fn erasure(&self) -> TypeSignature {
        if self.name == names::ARRAY {
            TypeSignature {
                name: self.name.clone(),
                arguments: self.arguments.iter().map(|a| a.erasure()).collect(),
            }
        } else {
            TypeSignature::named(self.name.clone())
        }
    }
}

/// A named type variable declaration with its ordered bound list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormalTypeParameter {
    /// The type variable name
    pub name: String,
    /// Class and interface bounds, retained positionally.
    ///
    /// The emitter's target language can express only one bound; extra bounds
    /// are still kept here rather than silently dropped at parse time.
    pub bounds: Vec<TypeSignature>,
}

/// A parsed class-level signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassSignature {
    /// Formal type parameters declared by the class
    pub formal_type_parameters: Vec<FormalTypeParameter>,
}

/// A parsed method-level signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSignature {
    /// Formal type parameters declared by the method
    pub formal_type_parameters: Vec<FormalTypeParameter>,
    /// Parameter types in declaration order
    pub parameters: Vec<TypeSignature>,
    /// Return type
    pub return_type: TypeSignature,
}

/// Parse a class-level generic signature
pub fn parse_class_signature(signature: &str) -> Result<ClassSignature, SignatureError> {
    let mut parser = Parser::new(signature);
    let formal_type_parameters = parser.formal_type_parameters()?;
    // Superclass and interface signatures follow; the model has no use for
    // them but they must still parse.
    while parser.has_more() {
        parser.field_type()?;
    }
    Ok(ClassSignature {
        formal_type_parameters,
    })
}

/// Parse a method-level generic signature
pub fn parse_method_signature(signature: &str) -> Result<MethodSignature, SignatureError> {
    let mut parser = Parser::new(signature);
    let formal_type_parameters = parser.formal_type_parameters()?;
    parser.expect('(')?;
    let mut parameters = Vec::new();
    while parser.peek()? != ')' {
        parameters.push(parser.type_signature()?);
    }
    parser.expect(')')?;
    let return_type = parser.type_signature()?;
    // Trailing ^Throws clauses are irrelevant here and left unparsed.
    Ok(MethodSignature {
        formal_type_parameters,
        parameters,
        return_type,
    })
}

struct Parser<'a> {
    signature: &'a str,
    bytes: &'a [u8],
    position: usize,
}

impl<'a> Parser<'a> {
    fn new(signature: &'a str) -> Self {
        Self {
            signature,
            bytes: signature.as_bytes(),
            position: 0,
        }
    }

    fn has_more(&self) -> bool {
        self.position < self.bytes.len() && self.bytes[self.position] != b'^'
    }

    fn peek(&self) -> Result<char, SignatureError> {
        self.bytes
            .get(self.position)
            .map(|b| *b as char)
            .ok_or_else(|| SignatureError::UnexpectedEnd(self.signature.to_string()))
    }

    fn advance(&mut self) -> Result<char, SignatureError> {
        let c = self.peek()?;
        self.position += 1;
        Ok(c)
    }

    fn expect(&mut self, expected: char) -> Result<(), SignatureError> {
        let found = self.advance()?;
        if found == expected {
            Ok(())
        } else {
            Err(self.unexpected(found, self.position - 1))
        }
    }

    fn unexpected(&self, found: char, position: usize) -> SignatureError {
        SignatureError::UnexpectedChar {
            found,
            position,
            signature: self.signature.to_string(),
        }
    }

    /// `<X:boundA:boundB Y:...>` or nothing
    fn formal_type_parameters(&mut self) -> Result<Vec<FormalTypeParameter>, SignatureError> {
        let mut parameters = Vec::new();
        if self.position >= self.bytes.len() || self.peek()? != '<' {
            return Ok(parameters);
        }
        self.advance()?;
        while self.peek()? != '>' {
            let name = self.identifier(&[':'])?;
            let mut bounds = Vec::new();
            self.expect(':')?;
            // The class bound may be empty when only interface bounds exist.
            if !matches!(self.peek()?, ':' | '>') {
                bounds.push(self.field_type()?);
            }
            while self.peek()? == ':' {
                self.advance()?;
                bounds.push(self.field_type()?);
            }
            parameters.push(FormalTypeParameter { name, bounds });
        }
        self.advance()?;
        Ok(parameters)
    }

    /// BaseType | FieldType
    fn type_signature(&mut self) -> Result<TypeSignature, SignatureError> {
        match self.peek()? {
            'L' | 'T' | '[' => self.field_type(),
            c => match crate::names::base_type_name(c) {
                Some(base) => {
                    self.advance()?;
                    Ok(TypeSignature::named(base))
                }
                None => Err(self.unexpected(c, self.position)),
            },
        }
    }

    /// ClassType | TypeVariable | ArrayType
    fn field_type(&mut self) -> Result<TypeSignature, SignatureError> {
        match self.peek()? {
            'L' => self.class_type(),
            'T' => self.type_variable(),
            '[' => {
                self.advance()?;
                let element = self.type_signature()?;
                Ok(TypeSignature {
                    name: names::ARRAY.to_string(),
                    arguments: vec![element],
                })
            }
            found => Err(self.unexpected(found, self.position)),
        }
    }

    /// `Lpkg/Name<Args>(.Local<Args>)*;`
    fn class_type(&mut self) -> Result<TypeSignature, SignatureError> {
        self.expect('L')?;
        let mut binary_name = self.identifier(&['<', ';', '.'])?;
        let mut arguments = Vec::new();
        loop {
            if self.peek()? == '<' {
                arguments.extend(self.type_arguments()?);
            }
            match self.advance()? {
                ';' => break,
                '.' => {
                    // Inner class: appended to the outer name with a dot.
                    let local = self.identifier(&['<', ';', '.'])?;
                    binary_name.push('.');
                    binary_name.push_str(&local);
                }
                found => return Err(self.unexpected(found, self.position - 1)),
            }
        }
        Ok(TypeSignature {
            name: kotlin_source_name_of(&binary_name.replace('/', ".")),
            arguments,
        })
    }

    /// `<TypeArgument+>`
    fn type_arguments(&mut self) -> Result<Vec<TypeSignature>, SignatureError> {
        self.expect('<')?;
        let mut arguments = Vec::new();
        while self.peek()? != '>' {
            arguments.push(match self.peek()? {
                '*' => {
                    self.advance()?;
                    TypeSignature::named(names::WILDCARD)
                }
                '+' | '-' => {
                    // Bounded wildcard: variance is not distinguished, the
                    // bound stands in for the argument.
                    self.advance()?;
                    self.field_type()?
                }
                _ => self.field_type()?,
            });
        }
        self.advance()?;
        Ok(arguments)
    }

    /// `Tname;`
    fn type_variable(&mut self) -> Result<TypeSignature, SignatureError> {
        self.expect('T')?;
        let name = self.identifier(&[';'])?;
        self.expect(';')?;
        Ok(TypeSignature::named(name))
    }

    fn identifier(&mut self, terminators: &[char]) -> Result<String, SignatureError> {
        let start = self.position;
        while self.position < self.bytes.len() {
            let c = self.bytes[self.position] as char;
            if terminators.contains(&c) {
                break;
            }
            self.position += 1;
        }
        if self.position == start {
            let found = self.peek()?;
            return Err(self.unexpected(found, self.position));
        }
        if self.position >= self.bytes.len() {
            return Err(SignatureError::UnexpectedEnd(self.signature.to_string()));
        }
        Ok(self.signature[start..self.position].to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_class_signature_with_bound() {
        let signature = "<T:Lorg/acme/Plugin;>Ljava/lang/Object;";
        let parsed = parse_class_signature(signature).unwrap();
        assert_eq!(parsed.formal_type_parameters.len(), 1);
        let t = &parsed.formal_type_parameters[0];
        assert_eq!(t.name, "T");
        assert_eq!(t.bounds, vec![TypeSignature::named("org.acme.Plugin")]);
    }

    #[test]
    fn test_class_signature_with_interface_bounds() {
        let signature = "<T::Ljava/lang/Comparable<TT;>;:Ljava/io/Serializable;>Ljava/lang/Object;";
        let parsed = parse_class_signature(signature).unwrap();
        let t = &parsed.formal_type_parameters[0];
        assert_eq!(t.bounds.len(), 2);
        assert_eq!(t.bounds[0].name, "java.lang.Comparable");
        assert_eq!(t.bounds[0].arguments, vec![TypeSignature::named("T")]);
        assert_eq!(t.bounds[1].name, "java.io.Serializable");
    }

    #[test]
    fn test_method_signature_with_type_variable_bound() {
        let signature = "<S:TT;>(Ljava/lang/Class<TS;>;)Lorg/acme/Container<TS;>;";
        let parsed = parse_method_signature(signature).unwrap();

        assert_eq!(parsed.formal_type_parameters.len(), 1);
        let s = &parsed.formal_type_parameters[0];
        assert_eq!(s.name, "S");
        assert_eq!(s.bounds, vec![TypeSignature::named("T")]);

        assert_eq!(parsed.parameters.len(), 1);
        assert_eq!(parsed.parameters[0].name, "java.lang.Class");
        assert_eq!(parsed.parameters[0].arguments, vec![TypeSignature::named("S")]);

        assert_eq!(parsed.return_type.name, "org.acme.Container");
        assert_eq!(parsed.return_type.arguments, vec![TypeSignature::named("S")]);
    }

    #[test]
    fn test_wildcard_argument() {
        let signature = "(Ljava/util/Map<Ljava/lang/String;*>;)V";
        let parsed = parse_method_signature(signature).unwrap();
        let map = &parsed.parameters[0];
        assert_eq!(map.name, "kotlin.collections.Map");
        assert_eq!(map.arguments.len(), 2);
        assert_eq!(map.arguments[0].name, "String");
        assert_eq!(map.arguments[1].name, "*");
        assert_eq!(parsed.return_type.name, "Unit");
    }

    #[test]
    fn test_bounded_wildcard_collapses_to_bound() {
        let signature = "(Ljava/util/List<+Lorg/acme/Plugin;>;Ljava/util/List<-TT;>;)V";
        let parsed = parse_method_signature(signature).unwrap();
        assert_eq!(parsed.parameters[0].arguments[0].name, "org.acme.Plugin");
        assert_eq!(parsed.parameters[1].arguments[0].name, "T");
    }

    #[test]
    fn test_array_of_parameterized_class() {
        let signature = "([Ljava/lang/Class<Lorg/acme/Artifact;>;)V";
        let parsed = parse_method_signature(signature).unwrap();
        let array = &parsed.parameters[0];
        assert_eq!(array.name, "kotlin.Array");
        assert_eq!(array.arguments.len(), 1);
        assert_eq!(array.arguments[0].name, "java.lang.Class");
        assert_eq!(array.arguments[0].arguments[0].name, "org.acme.Artifact");
    }

    #[test]
    fn test_base_types_and_primitive_array() {
        let signature = "(IZ[J)D";
        let parsed = parse_method_signature(signature).unwrap();
        assert_eq!(parsed.parameters[0].name, "Int");
        assert_eq!(parsed.parameters[1].name, "Boolean");
        assert_eq!(parsed.parameters[2].name, "kotlin.Array");
        assert_eq!(parsed.parameters[2].arguments[0].name, "Long");
        assert_eq!(parsed.return_type.name, "Double");
    }

    #[test]
    fn test_inner_class_type() {
        let signature = "(Lorg/acme/Outer<TT;>.Inner;)V";
        let parsed = parse_method_signature(signature).unwrap();
        assert_eq!(parsed.parameters[0].name, "org.acme.Outer.Inner");
        assert_eq!(parsed.parameters[0].arguments[0].name, "T");
    }

    #[test]
    fn test_malformed_signature_is_an_error_not_a_panic() {
        assert!(parse_method_signature("(Q)V").is_err());
        assert!(parse_method_signature("<T:>(").is_err());
        assert!(parse_method_signature("(Ljava/lang/Class").is_err());
    }

    #[test]
    fn test_erasure_drops_arguments_but_keeps_array_elements() {
        let signature = "(Ljava/lang/Class<TS;>;[Ljava/lang/Class<TS;>;)V";
        let parsed = parse_method_signature(signature).unwrap();
        assert_eq!(
            parsed.parameters[0].erasure(),
            TypeSignature::named("java.lang.Class")
        );
        let erased_array = parsed.parameters[1].erasure();
        assert_eq!(erased_array.name, "kotlin.Array");
        assert_eq!(erased_array.arguments[0].name, "java.lang.Class");
    }
}
