//! Class-file structure decoding
//!
//! [`ClassFile::parse`] walks the full binary layout (constant pool, fields,
//! methods, attributes) and keeps exactly what the type model needs: access
//! flags, generic signatures, annotation type descriptors, parameter
//! annotations, and the `Deprecated` attribute. Everything else, including
//! method bodies, is structurally skipped. No code is ever loaded.

use crate::error::ClassFileError;
use crate::pool::ConstantPool;
use crate::reader::ClassReader;

/// Magic number opening every class file
pub const MAGIC: u32 = 0xCAFE_BABE;

/// Access flags used by the model
pub mod access {
    /// Declared public
    pub const ACC_PUBLIC: u16 = 0x0001;
    /// Declared static
    pub const ACC_STATIC: u16 = 0x0008;
}

/// The structural metadata of one parsed class file
#[derive(Debug, Clone)]
pub struct ClassFile {
    /// Class access flags
    pub access_flags: u16,
    /// Internal (slash-separated) name of this class
    pub internal_name: String,
    /// Class-level generic signature, when present
    pub signature: Option<String>,
    /// Runtime-visible annotation type descriptors on the class
    pub annotations: Vec<String>,
    /// Whether the class carries the `Deprecated` attribute
    pub deprecated_attribute: bool,
    /// Declared methods in class-file order
    pub methods: Vec<MethodInfo>,
}

/// The structural metadata of one declared method
#[derive(Debug, Clone)]
pub struct MethodInfo {
    /// Method access flags
    pub access_flags: u16,
    /// Method name (`<init>` for constructors)
    pub name: String,
    /// Plain descriptor, always present
    pub descriptor: String,
    /// Generic signature, when present
    pub signature: Option<String>,
    /// Runtime-visible annotation type descriptors on the method
    pub annotations: Vec<String>,
    /// Runtime-visible annotation type descriptors per parameter
    pub parameter_annotations: Vec<Vec<String>>,
    /// Whether the method carries the `Deprecated` attribute
    pub deprecated_attribute: bool,
}

impl ClassFile {
    /// Parse a class file from its raw bytes
    pub fn parse(bytes: &[u8]) -> Result<Self, ClassFileError> {
        let mut reader = ClassReader::new(bytes);

        let magic = reader.read_u32()?;
        if magic != MAGIC {
            return Err(ClassFileError::InvalidMagic(magic));
        }
        reader.read_u16()?; // minor version
        reader.read_u16()?; // major version

        let pool = ConstantPool::parse(&mut reader)?;

        let access_flags = reader.read_u16()?;
        let this_class = reader.read_u16()?;
        let internal_name = pool.class_name(this_class)?.to_string();
        reader.read_u16()?; // super class
        let interface_count = reader.read_u16()?;
        reader.skip(interface_count as usize * 2)?;

        // Fields carry nothing the model needs; skip them structurally.
        let field_count = reader.read_u16()?;
        for _ in 0..field_count {
            reader.skip(6)?;
            skip_attributes(&mut reader)?;
        }

        let method_count = reader.read_u16()?;
        let mut methods = Vec::with_capacity(method_count as usize);
        for _ in 0..method_count {
            methods.push(MethodInfo::parse(&mut reader, &pool)?);
        }

        let mut class_attributes = MemberAttributes::default();
        class_attributes.parse(&mut reader, &pool)?;

        Ok(Self {
            access_flags,
            internal_name,
            signature: class_attributes.signature,
            annotations: class_attributes.annotations,
            deprecated_attribute: class_attributes.deprecated,
            methods,
        })
    }

    /// Whether the class is declared public
    pub fn is_public(&self) -> bool {
        self.access_flags & access::ACC_PUBLIC != 0
    }
}

impl MethodInfo {
    fn parse(reader: &mut ClassReader<'_>, pool: &ConstantPool) -> Result<Self, ClassFileError> {
        let access_flags = reader.read_u16()?;
        let name = pool.utf8(reader.read_u16()?)?.to_string();
        let descriptor = pool.utf8(reader.read_u16()?)?.to_string();

        let mut attributes = MemberAttributes::default();
        attributes.parse(reader, pool)?;

        Ok(Self {
            access_flags,
            name,
            descriptor,
            signature: attributes.signature,
            annotations: attributes.annotations,
            parameter_annotations: attributes.parameter_annotations,
            deprecated_attribute: attributes.deprecated,
        })
    }

    /// Whether the method is declared public
    pub fn is_public(&self) -> bool {
        self.access_flags & access::ACC_PUBLIC != 0
    }

    /// Whether the method is declared static
    pub fn is_static(&self) -> bool {
        self.access_flags & access::ACC_STATIC != 0
    }
}

#[derive(Default)]
struct MemberAttributes {
    signature: Option<String>,
    annotations: Vec<String>,
    parameter_annotations: Vec<Vec<String>>,
    deprecated: bool,
}

impl MemberAttributes {
    fn parse(
        &mut self,
        reader: &mut ClassReader<'_>,
        pool: &ConstantPool,
    ) -> Result<(), ClassFileError> {
        let count = reader.read_u16()?;
        for _ in 0..count {
            let name_index = reader.read_u16()?;
            let length = reader.read_u32()? as usize;
            let payload = reader.read_bytes(length)?;
            match pool.utf8(name_index)? {
                "Signature" => {
                    let mut inner = ClassReader::new(payload);
                    self.signature = Some(pool.utf8(inner.read_u16()?)?.to_string());
                }
                "RuntimeVisibleAnnotations" => {
                    let mut inner = ClassReader::new(payload);
                    let count = inner.read_u16()?;
                    for _ in 0..count {
                        self.annotations.push(parse_annotation(&mut inner, pool)?);
                    }
                }
                "RuntimeVisibleParameterAnnotations" => {
                    let mut inner = ClassReader::new(payload);
                    let parameter_count = inner.read_u8()?;
                    for _ in 0..parameter_count {
                        let count = inner.read_u16()?;
                        let mut descriptors = Vec::with_capacity(count as usize);
                        for _ in 0..count {
                            descriptors.push(parse_annotation(&mut inner, pool)?);
                        }
                        self.parameter_annotations.push(descriptors);
                    }
                }
                "Deprecated" => {
                    self.deprecated = true;
                }
                _ => {}
            }
        }
        Ok(())
    }
}

fn skip_attributes(reader: &mut ClassReader<'_>) -> Result<(), ClassFileError> {
    let count = reader.read_u16()?;
    for _ in 0..count {
        reader.read_u16()?;
        let length = reader.read_u32()? as usize;
        reader.skip(length)?;
    }
    Ok(())
}

/// Parse one annotation, returning its type descriptor and skipping all
/// element values per JVMS 4.7.16.1.
fn parse_annotation(
    reader: &mut ClassReader<'_>,
    pool: &ConstantPool,
) -> Result<String, ClassFileError> {
    let type_index = reader.read_u16()?;
    let descriptor = pool.utf8(type_index)?.to_string();
    let pair_count = reader.read_u16()?;
    for _ in 0..pair_count {
        reader.read_u16()?; // element name
        skip_element_value(reader, pool)?;
    }
    Ok(descriptor)
}

fn skip_element_value(
    reader: &mut ClassReader<'_>,
    pool: &ConstantPool,
) -> Result<(), ClassFileError> {
    let offset = reader.position();
    let tag = reader.read_u8()? as char;
    match tag {
        'B' | 'C' | 'D' | 'F' | 'I' | 'J' | 'S' | 'Z' | 's' | 'c' => {
            reader.skip(2)?;
        }
        'e' => {
            reader.skip(4)?;
        }
        '@' => {
            parse_annotation(reader, pool)?;
        }
        '[' => {
            let count = reader.read_u16()?;
            for _ in 0..count {
                skip_element_value(reader, pool)?;
            }
        }
        tag => return Err(ClassFileError::UnknownElementTag { tag, offset }),
    }
    Ok(())
}
