//! Packing synthesized classes into JARs and class directories

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Write the given `(internal_name, bytes)` classes into a JAR at `path`.
pub fn write_class_jar(path: &Path, classes: &[(&str, Vec<u8>)]) -> io::Result<()> {
    let file = File::create(path)?;
    let mut jar = ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);
    for (internal_name, bytes) in classes {
        jar.start_file(format!("{internal_name}.class"), options)
            .map_err(io::Error::other)?;
        jar.write_all(bytes)?;
    }
    jar.finish().map_err(io::Error::other)?;
    Ok(())
}

/// Write the given `(internal_name, bytes)` classes as files under `root`.
pub fn write_class_dir(root: &Path, classes: &[(&str, Vec<u8>)]) -> io::Result<()> {
    for (internal_name, bytes) in classes {
        let path = root.join(format!("{internal_name}.class"));
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, bytes)?;
    }
    Ok(())
}
