//! Class-file synthesis
//!
//! Emits the minimal class-file layout the kotgen parser consumes: a
//! deduplicated constant pool, access flags, methods with descriptors, and
//! the `Signature`, `RuntimeVisibleAnnotations`,
//! `RuntimeVisibleParameterAnnotations` and `Deprecated` attributes.
//! All multi-byte values are big-endian per the class-file format.

use std::collections::HashMap;

const MAGIC: u32 = 0xCAFE_BABE;
const MAJOR_VERSION: u16 = 52; // Java 8

/// Declared public
pub const ACC_PUBLIC: u16 = 0x0001;
/// Declared static
pub const ACC_STATIC: u16 = 0x0008;

const TAG_UTF8: u8 = 1;
const TAG_CLASS: u8 = 7;

#[derive(Default)]
struct PoolBuilder {
    bytes: Vec<u8>,
    count: u16,
    utf8_indices: HashMap<String, u16>,
    class_indices: HashMap<String, u16>,
}

impl PoolBuilder {
    fn utf8(&mut self, text: &str) -> u16 {
        if let Some(index) = self.utf8_indices.get(text) {
            return *index;
        }
        self.count += 1;
        self.bytes.push(TAG_UTF8);
        self.bytes.extend_from_slice(&(text.len() as u16).to_be_bytes());
        self.bytes.extend_from_slice(text.as_bytes());
        self.utf8_indices.insert(text.to_string(), self.count);
        self.count
    }

    fn class(&mut self, internal_name: &str) -> u16 {
        if let Some(index) = self.class_indices.get(internal_name) {
            return *index;
        }
        let name_index = self.utf8(internal_name);
        self.count += 1;
        self.bytes.push(TAG_CLASS);
        self.bytes.extend_from_slice(&name_index.to_be_bytes());
        self.class_indices.insert(internal_name.to_string(), self.count);
        self.count
    }
}

/// Builder for one method of a synthesized class
pub struct MethodBuilder {
    access_flags: u16,
    name: String,
    descriptor: String,
    signature: Option<String>,
    annotations: Vec<String>,
    parameter_annotations: Vec<Vec<String>>,
    deprecated: bool,
}

impl MethodBuilder {
    /// Start a public method with the given name and descriptor
    pub fn new(name: &str, descriptor: &str) -> Self {
        Self {
            access_flags: ACC_PUBLIC,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            signature: None,
            annotations: Vec::new(),
            parameter_annotations: Vec::new(),
            deprecated: false,
        }
    }

    /// Replace the access flags
    pub fn access(mut self, flags: u16) -> Self {
        self.access_flags = flags;
        self
    }

    /// Attach a generic signature
    pub fn signature(mut self, signature: &str) -> Self {
        self.signature = Some(signature.to_string());
        self
    }

    /// Attach a runtime-visible annotation by type descriptor
    pub fn annotation(mut self, descriptor: &str) -> Self {
        self.annotations.push(descriptor.to_string());
        self
    }

    /// Attach runtime-visible parameter annotations, one list per parameter
    pub fn parameter_annotations(mut self, per_parameter: &[&[&str]]) -> Self {
        self.parameter_annotations = per_parameter
            .iter()
            .map(|descriptors| descriptors.iter().map(|d| d.to_string()).collect())
            .collect();
        self
    }

    /// Mark the method with the `Deprecated` attribute
    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    fn emit(&self, pool: &mut PoolBuilder, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.access_flags.to_be_bytes());
        out.extend_from_slice(&pool.utf8(&self.name).to_be_bytes());
        out.extend_from_slice(&pool.utf8(&self.descriptor).to_be_bytes());
        emit_attributes(
            pool,
            out,
            self.signature.as_deref(),
            &self.annotations,
            Some(&self.parameter_annotations),
            self.deprecated,
        );
    }
}

/// Builder for a complete synthesized class file
pub struct ClassFileBuilder {
    access_flags: u16,
    internal_name: String,
    signature: Option<String>,
    annotations: Vec<String>,
    deprecated: bool,
    methods: Vec<MethodBuilder>,
}

impl ClassFileBuilder {
    /// Start a public class with the given internal (slash-separated) name
    pub fn new(internal_name: &str) -> Self {
        Self {
            access_flags: ACC_PUBLIC,
            internal_name: internal_name.to_string(),
            signature: None,
            annotations: Vec::new(),
            deprecated: false,
            methods: Vec::new(),
        }
    }

    /// Replace the access flags
    pub fn access(mut self, flags: u16) -> Self {
        self.access_flags = flags;
        self
    }

    /// Attach a class-level generic signature
    pub fn signature(mut self, signature: &str) -> Self {
        self.signature = Some(signature.to_string());
        self
    }

    /// Attach a runtime-visible annotation by type descriptor
    pub fn annotation(mut self, descriptor: &str) -> Self {
        self.annotations.push(descriptor.to_string());
        self
    }

    /// Mark the class with the `Deprecated` attribute
    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    /// Add a method
    pub fn method(mut self, method: MethodBuilder) -> Self {
        self.methods.push(method);
        self
    }

    /// Serialize the class file
    pub fn build(self) -> Vec<u8> {
        let mut pool = PoolBuilder::default();
        let this_class = pool.class(&self.internal_name);
        let super_class = pool.class("java/lang/Object");

        let mut body = Vec::new();
        body.extend_from_slice(&self.access_flags.to_be_bytes());
        body.extend_from_slice(&this_class.to_be_bytes());
        body.extend_from_slice(&super_class.to_be_bytes());
        body.extend_from_slice(&0u16.to_be_bytes()); // interfaces
        body.extend_from_slice(&0u16.to_be_bytes()); // fields

        body.extend_from_slice(&(self.methods.len() as u16).to_be_bytes());
        for method in &self.methods {
            method.emit(&mut pool, &mut body);
        }

        emit_attributes(
            &mut pool,
            &mut body,
            self.signature.as_deref(),
            &self.annotations,
            None,
            self.deprecated,
        );

        let mut out = Vec::new();
        out.extend_from_slice(&MAGIC.to_be_bytes());
        out.extend_from_slice(&0u16.to_be_bytes());
        out.extend_from_slice(&MAJOR_VERSION.to_be_bytes());
        out.extend_from_slice(&(pool.count + 1).to_be_bytes());
        out.extend_from_slice(&pool.bytes);
        out.extend_from_slice(&body);
        out
    }
}

fn emit_attributes(
    pool: &mut PoolBuilder,
    out: &mut Vec<u8>,
    signature: Option<&str>,
    annotations: &[String],
    parameter_annotations: Option<&Vec<Vec<String>>>,
    deprecated: bool,
) {
    let mut attributes: Vec<(u16, Vec<u8>)> = Vec::new();

    if let Some(signature) = signature {
        let name = pool.utf8("Signature");
        let payload = pool.utf8(signature).to_be_bytes().to_vec();
        attributes.push((name, payload));
    }
    if !annotations.is_empty() {
        let name = pool.utf8("RuntimeVisibleAnnotations");
        let mut payload = Vec::new();
        payload.extend_from_slice(&(annotations.len() as u16).to_be_bytes());
        for descriptor in annotations {
            payload.extend_from_slice(&pool.utf8(descriptor).to_be_bytes());
            payload.extend_from_slice(&0u16.to_be_bytes()); // no element pairs
        }
        attributes.push((name, payload));
    }
    if let Some(per_parameter) = parameter_annotations {
        if !per_parameter.is_empty() {
            let name = pool.utf8("RuntimeVisibleParameterAnnotations");
            let mut payload = Vec::new();
            payload.push(per_parameter.len() as u8);
            for descriptors in per_parameter {
                payload.extend_from_slice(&(descriptors.len() as u16).to_be_bytes());
                for descriptor in descriptors {
                    payload.extend_from_slice(&pool.utf8(descriptor).to_be_bytes());
                    payload.extend_from_slice(&0u16.to_be_bytes());
                }
            }
            attributes.push((name, payload));
        }
    }
    if deprecated {
        attributes.push((pool.utf8("Deprecated"), Vec::new()));
    }

    out.extend_from_slice(&(attributes.len() as u16).to_be_bytes());
    for (name_index, payload) in attributes {
        out.extend_from_slice(&name_index.to_be_bytes());
        out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        out.extend_from_slice(&payload);
    }
}
