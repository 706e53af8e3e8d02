//! Plain method-descriptor parsing
//!
//! Descriptors are the mandatory, non-generic encoding of a member's
//! parameter and return types. They decode into the same [`TypeSignature`]
//! shape as the generic-signature grammar, just without type arguments, so
//! the model can fall back to them transparently.

use crate::error::SignatureError;
use crate::names::{self, base_type_name, kotlin_source_name_of};
use crate::signature::TypeSignature;

/// Parse a method descriptor such as `(ILjava/lang/String;[J)V` into its
/// ordered parameter types and return type.
pub fn parse_method_descriptor(
    descriptor: &str,
) -> Result<(Vec<TypeSignature>, TypeSignature), SignatureError> {
    let bytes = descriptor.as_bytes();
    let mut position = 0;
    expect(descriptor, bytes, &mut position, '(')?;
    let mut parameters = Vec::new();
    while peek(descriptor, bytes, position)? != ')' {
        parameters.push(field_type(descriptor, bytes, &mut position)?);
    }
    position += 1;
    let return_type = field_type(descriptor, bytes, &mut position)?;
    Ok((parameters, return_type))
}

fn field_type(
    descriptor: &str,
    bytes: &[u8],
    position: &mut usize,
) -> Result<TypeSignature, SignatureError> {
    match peek(descriptor, bytes, *position)? {
        'L' => {
            let start = *position + 1;
            let end = descriptor[start..]
                .find(';')
                .map(|i| start + i)
                .ok_or_else(|| SignatureError::UnexpectedEnd(descriptor.to_string()))?;
            *position = end + 1;
            let binary_name = descriptor[start..end].replace('/', ".");
            Ok(TypeSignature::named(kotlin_source_name_of(&binary_name)))
        }
        '[' => {
            *position += 1;
            let element = field_type(descriptor, bytes, position)?;
            Ok(TypeSignature {
                name: names::ARRAY.to_string(),
                arguments: vec![element],
            })
        }
        c => match base_type_name(c) {
            Some(base) => {
                *position += 1;
                Ok(TypeSignature::named(base))
            }
            None => Err(SignatureError::UnexpectedChar {
                found: c,
                position: *position,
                signature: descriptor.to_string(),
            }),
        },
    }
}

fn peek(descriptor: &str, bytes: &[u8], position: usize) -> Result<char, SignatureError> {
    bytes
        .get(position)
        .map(|b| *b as char)
        .ok_or_else(|| SignatureError::UnexpectedEnd(descriptor.to_string()))
}

fn expect(
    descriptor: &str,
    bytes: &[u8],
    position: &mut usize,
    expected: char,
) -> Result<(), SignatureError> {
    let found = peek(descriptor, bytes, *position)?;
    if found != expected {
        return Err(SignatureError::UnexpectedChar {
            found,
            position: *position,
            signature: descriptor.to_string(),
        });
    }
    *position += 1;
    Ok(())
}
