#![allow(dead_code)]

pub mod command;
pub mod file;

const TMPDIR: &str = "../playground";

pub fn redirect_temp_dir() {
    unsafe {
        std::env::set_var("TMPDIR", TMPDIR);
    }

    // Ensure the TMPDIR exists
    if !std::path::Path::new(TMPDIR).exists() {
        std::fs::create_dir_all(TMPDIR).expect("Failed to create TMPDIR");
    }
}

/// Decompress a loose object into its framed `<kind> <size>\0<payload>` form
pub fn read_loose_object(
    repository: &std::path::Path,
    oid: &str,
) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    use std::io::Read;

    let (dir, file) = oid.split_at(2);
    let compressed = std::fs::read(repository.join(".git/objects").join(dir).join(file))?;

    let mut framed = Vec::new();
    flate2::read::ZlibDecoder::new(compressed.as_slice()).read_to_end(&mut framed)?;

    Ok(framed)
}

/// Current value of `refs/heads/master`, without the trailing newline
pub fn read_master(repository: &std::path::Path) -> Result<String, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(repository.join(".git/refs/heads/master"))?;
    Ok(content.trim_end().to_string())
}
