//! Local manifest files.

use std::fs;
use std::io;
use std::path::Path;

use tracing::debug;

use super::ManifestError;
use super::types::Manifest;

/// Read a manifest from a local YAML file.
///
/// Fails with [`ManifestError::NotFound`] if the path does not exist.
pub fn read_manifest_file(path: &Path) -> Result<Manifest, ManifestError> {
  let content = match fs::read_to_string(path) {
    Ok(content) => content,
    Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(ManifestError::NotFound(path.to_path_buf())),
    Err(e) => return Err(ManifestError::Read(e)),
  };

  let manifest = Manifest::from_yaml(&content)?;
  debug!(path = %path.display(), packages = manifest.len(), "read manifest file");
  Ok(manifest)
}

/// Write a manifest to a local YAML file.
///
/// Uses atomic write (write to temp, then rename) to prevent corruption.
pub fn write_manifest_file(path: &Path, manifest: &Manifest) -> Result<(), ManifestError> {
  let content = manifest.to_yaml()?;

  if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
    fs::create_dir_all(parent).map_err(ManifestError::Write)?;
  }

  let mut temp_name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
  temp_name.push(".tmp");
  let temp_path = path.with_file_name(temp_name);

  fs::write(&temp_path, &content).map_err(ManifestError::Write)?;
  fs::rename(&temp_path, path).map_err(ManifestError::Write)?;

  debug!(path = %path.display(), packages = manifest.len(), "wrote manifest file");
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::manifest::PackageSpec;
  use tempfile::TempDir;

  #[test]
  fn read_missing_file_is_not_found() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("missing.yaml");

    let result = read_manifest_file(&path);
    assert!(matches!(result, Err(ManifestError::NotFound(p)) if p == path));
  }

  #[test]
  fn write_then_read() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("GistGet.yaml");

    let manifest: Manifest = [PackageSpec::new("Git.Git"), PackageSpec::new("Foo.Bar")]
      .into_iter()
      .collect();
    write_manifest_file(&path, &manifest).unwrap();

    assert_eq!(read_manifest_file(&path).unwrap(), manifest);
    assert!(!temp.path().join("nested").join("GistGet.yaml.tmp").exists());
  }

  #[test]
  fn read_corrupted_file_is_parse_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("bad.yaml");
    fs::write(&path, "Foo.Bar: [unclosed").unwrap();

    assert!(matches!(read_manifest_file(&path), Err(ManifestError::Parse(_))));
  }
}
