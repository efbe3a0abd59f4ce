//! Read-only access to `.pkg` archives shipped alongside backgrounds.
//!
//! Layout (all integers little-endian `u32`):
//!
//! ```text
//! version_len, version ("PKGV0001"...)
//! entry_count
//! entry_count x { name_len, name, offset, length }
//! data...
//! ```
//!
//! Entry offsets are relative to the first byte after the entry table.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::container::{AssetSource, normalize_name};
use crate::core::error::{Error, Result};

const VERSION_PREFIX: &str = "PKGV";
const MAX_STRING_LEN: usize = 4096;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
struct Entry {
    offset: usize,
    length: usize,
}

pub struct PackageSource {
    path: PathBuf,
    version: String,
    data: Vec<u8>,
    entries: HashMap<String, Entry>,
}

impl PackageSource {
    /// Opens and indexes a package. Returns `Ok(None)` when the file does
    /// not exist so callers can treat packages as optional.
    pub fn open_optional(path: impl AsRef<Path>) -> Result<Option<Self>> {
        let path = path.as_ref();
        if !path.is_file() {
            return Ok(None);
        }
        Self::open(path).map(Some)
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        Self::from_bytes(path, data)
    }

    pub fn from_bytes(path: impl Into<PathBuf>, data: Vec<u8>) -> Result<Self> {
        let path = path.into();
        let mut reader = Reader::new(&data);

        let version = reader
            .string()
            .map_err(|reason| Error::package(&path, reason))?;
        if !version.starts_with(VERSION_PREFIX) {
            return Err(Error::package(
                &path,
                format!("unexpected version tag '{}'", version),
            ));
        }

        let count = reader
            .u32()
            .map_err(|reason| Error::package(&path, reason))?
            as usize;

        let mut raw_entries = Vec::with_capacity(count.min(1024));
        for _ in 0..count {
            let entry = reader
                .entry()
                .map_err(|reason| Error::package(&path, reason))?;
            raw_entries.push(entry);
        }

        let base = reader.position();
        let mut entries = HashMap::with_capacity(raw_entries.len());

        for (name, offset, length) in raw_entries {
            let start = base + offset;
            let end = start.checked_add(length).filter(|&e| e <= data.len());
            if end.is_none() {
                return Err(Error::package(
                    &path,
                    format!("entry '{}' exceeds package bounds", name),
                ));
            }

            let name = normalize_name(&name)
                .map_err(|err| Error::package(&path, err))?;
            entries.insert(
                name,
                Entry {
                    offset: start,
                    length,
                },
            );
        }

        Ok(Self {
            path,
            version,
            data,
            entries,
        })
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn bytes(&self, name: &str) -> Option<&[u8]> {
        self.entries
            .get(name)
            .map(|entry| &self.data[entry.offset..entry.offset + entry.length])
    }
}

impl AssetSource for PackageSource {
    fn describe(&self) -> String {
        format!("pkg:{}", self.path.display())
    }

    fn exists(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    fn read(&self, name: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.bytes(name).map(<[u8]>::to_vec))
    }
}

struct Reader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> Reader<'a> {
    fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    fn position(&self) -> usize {
        self.position
    }

    fn take(&mut self, len: usize) -> std::result::Result<&'a [u8], String> {
        let end = self
            .position
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| {
                format!("truncated header at byte {}", self.position)
            })?;
        let bytes = &self.data[self.position..end];
        self.position = end;
        Ok(bytes)
    }

    fn u32(&mut self) -> std::result::Result<u32, String> {
        let bytes = self.take(4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    fn string(&mut self) -> std::result::Result<String, String> {
        let len = self.u32()? as usize;
        if len > MAX_STRING_LEN {
            return Err(format!("string length {} is implausible", len));
        }
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|err| format!("invalid UTF-8 in header: {}", err))
    }

    fn entry(&mut self) -> std::result::Result<(String, usize, usize), String> {
        let name = self.string()?;
        let offset = self.u32()? as usize;
        let length = self.u32()? as usize;
        Ok((name, offset, length))
    }
}

/// Serializes `files` into package bytes. Used to build fixtures and by
/// tooling that repacks backgrounds.
pub fn build_package(files: &[(&str, &[u8])]) -> Vec<u8> {
    fn put_string(out: &mut Vec<u8>, value: &str) {
        out.extend_from_slice(&(value.len() as u32).to_le_bytes());
        out.extend_from_slice(value.as_bytes());
    }

    let mut out = Vec::new();
    put_string(&mut out, "PKGV0001");
    out.extend_from_slice(&(files.len() as u32).to_le_bytes());

    let mut offset = 0u32;
    for (name, bytes) in files {
        put_string(&mut out, name);
        out.extend_from_slice(&offset.to_le_bytes());
        out.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
        offset += bytes.len() as u32;
    }

    for (_, bytes) in files {
        out.extend_from_slice(bytes);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indexes_and_reads_entries() {
        let bytes = build_package(&[
            ("project.json", b"{}"),
            ("materials\\a.json", b"[1]"),
        ]);
        let pkg = PackageSource::from_bytes("scene.pkg", bytes).expect("parse");

        assert_eq!(pkg.version(), "PKGV0001");
        assert_eq!(pkg.len(), 2);
        assert_eq!(
            pkg.read("project.json").expect("read"),
            Some(b"{}".to_vec())
        );
        assert_eq!(
            pkg.read("materials/a.json").expect("read"),
            Some(b"[1]".to_vec())
        );
        assert_eq!(pkg.read("missing.json").expect("read"), None);
    }

    #[test]
    fn rejects_truncated_data() {
        let mut bytes = build_package(&[("project.json", b"{\"a\":1}")]);
        bytes.truncate(bytes.len() - 3);

        let err = PackageSource::from_bytes("scene.pkg", bytes)
            .err()
            .expect("truncated package must fail");
        assert!(err.to_string().contains("exceeds package bounds"));
    }

    #[test]
    fn rejects_foreign_files() {
        let err = PackageSource::from_bytes("scene.pkg", b"hello".to_vec())
            .err()
            .expect("garbage must fail");
        assert!(matches!(err, Error::Package { .. }));
    }

    #[test]
    fn missing_optional_package_is_none() {
        let path = std::env::temp_dir().join("backdrop-missing-scene.pkg");
        assert!(
            PackageSource::open_optional(path)
                .expect("missing is not an error")
                .is_none()
        );
    }
}
