//! Descriptor discovery and loading from disk.

use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::descriptor::schema::HandlerDescriptor;
use crate::descriptor::validation::ValidationError;

/// File suffix of TOML descriptors.
pub const TOML_SUFFIX: &str = ".handler.toml";
/// File suffix of JSON descriptors.
pub const JSON_SUFFIX: &str = ".handler.json";

/// Error type for descriptor loading.
#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse error in {}: {source}", .path.display())]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Parse error in {}: {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{} is not a '.handler.toml' or '.handler.json' file", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("Validation failed for '{name}': {}", join_errors(.errors))]
    Validation {
        name: String,
        errors: Vec<ValidationError>,
    },
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Whether `path` names a descriptor file.
pub fn is_descriptor_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(TOML_SUFFIX) || n.ends_with(JSON_SUFFIX))
}

/// Default handler name for a descriptor file: its name minus the suffix.
pub fn descriptor_stem(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    [TOML_SUFFIX, JSON_SUFFIX]
        .iter()
        .find_map(|suffix| file_name.strip_suffix(suffix))
        .map(str::to_string)
        .unwrap_or(file_name)
}

/// Parse one descriptor file. The name defaults to the file stem.
pub fn load_descriptor(path: &Path) -> Result<HandlerDescriptor, DescriptorError> {
    let content = fs::read_to_string(path).map_err(|source| DescriptorError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let file_name = path.to_string_lossy();
    let mut descriptor: HandlerDescriptor = if file_name.ends_with(TOML_SUFFIX) {
        toml::from_str(&content).map_err(|source| DescriptorError::Toml {
            path: path.to_path_buf(),
            source,
        })?
    } else if file_name.ends_with(JSON_SUFFIX) {
        serde_json::from_str(&content).map_err(|source| DescriptorError::Json {
            path: path.to_path_buf(),
            source,
        })?
    } else {
        return Err(DescriptorError::UnsupportedFormat(path.to_path_buf()));
    };

    if descriptor.name.is_none() {
        descriptor.name = Some(descriptor_stem(path));
    }
    Ok(descriptor)
}

/// Every descriptor file directly inside `dir`, sorted by path.
pub fn discover(dir: &Path) -> Result<Vec<PathBuf>, DescriptorError> {
    let entries = fs::read_dir(dir).map_err(|source| DescriptorError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
        .map(|entry| entry.path())
        .filter(|path| is_descriptor_file(path))
        .collect();
    files.sort();

    if files.is_empty() {
        tracing::error!(dir = %dir.display(), "Could not find any handler descriptor files");
    }
    Ok(files)
}

/// Descriptor paths listed in an index file, one per line.
///
/// Blank lines and `#` comments are ignored; relative paths resolve against
/// the index file's directory. Listed files that do not exist are logged and
/// left out.
pub fn read_index(index: &Path) -> Result<Vec<PathBuf>, DescriptorError> {
    let content = fs::read_to_string(index).map_err(|source| DescriptorError::Io {
        path: index.to_path_buf(),
        source,
    })?;
    let base = index.parent().unwrap_or_else(|| Path::new("."));

    let mut files = Vec::new();
    let mut missing = 0usize;
    for line in content.lines().map(str::trim) {
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let path = base.join(line);
        if path.is_file() {
            files.push(path);
        } else {
            tracing::warn!(
                file = %line,
                index = %index.display(),
                "Failed to find descriptor file referenced in index"
            );
            missing += 1;
        }
    }

    if missing > 0 {
        tracing::warn!(
            missing,
            index = %index.display(),
            "Some index entries do not point at files"
        );
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).expect("write fixture");
        path
    }

    #[test]
    fn test_descriptor_stem() {
        assert_eq!(descriptor_stem(Path::new("/x/users.handler.toml")), "users");
        assert_eq!(descriptor_stem(Path::new("items.handler.json")), "items");
        assert_eq!(descriptor_stem(Path::new("plain.toml")), "plain.toml");
    }

    #[test]
    fn test_load_toml_and_json() {
        let dir = TempDir::new().expect("create temp dir");
        let toml_path = write(&dir, "hello.handler.toml", "path = \"/hello\"\n");
        let json_path = write(&dir, 
            "named.handler.json",
            r#"{ "name": "explicit", "path": "/named", "method": "PUT" }"#,
        );

        let d = load_descriptor(&toml_path).unwrap();
        assert_eq!(d.name.as_deref(), Some("hello"));
        assert_eq!(d.path, "/hello");

        let d = load_descriptor(&json_path).unwrap();
        assert_eq!(d.name.as_deref(), Some("explicit"));
        assert_eq!(d.method, "PUT");
    }

    #[test]
    fn test_load_errors() {
        let dir = TempDir::new().expect("create temp dir");
        let broken = write(&dir, "broken.handler.toml", "path = ");
        assert!(matches!(
            load_descriptor(&broken),
            Err(DescriptorError::Toml { .. })
        ));

        let other = write(&dir, "notes.txt", "hi");
        assert!(matches!(
            load_descriptor(&other),
            Err(DescriptorError::UnsupportedFormat(_))
        ));

        assert!(matches!(
            load_descriptor(&dir.path().join("absent.handler.toml")),
            Err(DescriptorError::Io { .. })
        ));
    }

    #[test]
    fn test_discover_filters_and_sorts() {
        let dir = TempDir::new().expect("create temp dir");
        write(&dir, "b.handler.toml", "path = \"/b\"\n");
        write(&dir, "a.handler.json", r#"{ "path": "/a" }"#);
        write(&dir, "readme.md", "ignored");

        let files = discover(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.handler.json", "b.handler.toml"]);
    }

    #[test]
    fn test_read_index_skips_missing() {
        let dir = TempDir::new().expect("create temp dir");
        write(&dir, "one.handler.toml", "path = \"/one\"\n");
        let index = write(&dir, 
            "handlers.index",
            "# handlers\none.handler.toml\n\nmissing.handler.toml\n",
        );

        let files = read_index(&index).unwrap();
        assert_eq!(files, vec![dir.path().join("one.handler.toml")]);
    }
}
