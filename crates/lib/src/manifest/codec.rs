//! YAML encoding of the manifest.
//!
//! The document is a mapping of package identifier to entry attributes. An
//! entry without attributes is written as a bare key with a `null` value.

use serde::{Deserialize, Deserializer, Serialize};
use serde_yaml::{Mapping, Value};
use tracing::warn;

use super::types::{InstallerAttrs, Manifest, PackageSpec, PinType};
use super::ManifestError;

/// Entry body as stored in YAML; the identifier is the mapping key.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageEntry {
  #[serde(default, deserialize_with = "scalar_string", skip_serializing_if = "Option::is_none")]
  version: Option<String>,
  #[serde(default, deserialize_with = "scalar_string", skip_serializing_if = "Option::is_none")]
  pin: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pin_type: Option<PinType>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  uninstall: Option<bool>,
  #[serde(flatten)]
  attrs: InstallerAttrs,
}

impl PackageEntry {
  fn is_empty(&self) -> bool {
    *self == PackageEntry::default()
  }

  fn into_spec(self, id: String) -> PackageSpec {
    PackageSpec {
      id,
      version: self.version,
      pin: self.pin,
      pin_type: self.pin_type,
      uninstall: self.uninstall,
      attrs: self.attrs,
    }
  }
}

impl From<&PackageSpec> for PackageEntry {
  fn from(spec: &PackageSpec) -> Self {
    Self {
      version: spec.version.clone(),
      pin: spec.pin.clone(),
      pin_type: spec.pin_type,
      uninstall: spec.uninstall,
      attrs: spec.attrs.clone(),
    }
  }
}

/// Accept unquoted numeric versions such as `pin: 3` as strings.
///
/// YAML reads an unquoted `1.10` as the float `1.1` before it gets here, so
/// trailing zeros of decimal versions are lost. Such values are logged; the
/// encoder quotes them so only hand-edited manifests are affected.
fn scalar_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
  #[derive(Deserialize)]
  #[serde(untagged)]
  enum Scalar {
    Str(String),
    Int(i64),
    Float(f64),
  }

  Ok(Option::<Scalar>::deserialize(deserializer)?.map(|s| match s {
    Scalar::Str(s) => s,
    Scalar::Int(i) => i.to_string(),
    Scalar::Float(f) => {
      warn!(value = f, "unquoted decimal version in manifest, quote it to keep trailing zeros");
      f.to_string()
    }
  }))
}

impl Manifest {
  /// Decode a manifest from YAML text.
  ///
  /// Empty documents, including comment-only ones, decode to an empty manifest.
  pub fn from_yaml(content: &str) -> Result<Manifest, ManifestError> {
    let blank = content.lines().map(str::trim).all(|l| l.is_empty() || l.starts_with('#'));
    if blank {
      return Ok(Manifest::new());
    }

    let root: Value = serde_yaml::from_str(content).map_err(ManifestError::Parse)?;
    let mapping = match root {
      Value::Null => return Ok(Manifest::new()),
      Value::Mapping(mapping) => mapping,
      _ => return Err(ManifestError::NotAMapping),
    };

    let mut manifest = Manifest::new();
    for (key, value) in mapping {
      let id = match key {
        Value::String(s) if !s.trim().is_empty() => s.trim().to_string(),
        Value::String(_) | Value::Null => return Err(ManifestError::EmptyIdentifier),
        _ => return Err(ManifestError::NotAMapping),
      };
      if manifest.contains(&id) {
        return Err(ManifestError::DuplicateIdentifier(id));
      }

      let entry: Option<PackageEntry> = serde_yaml::from_value(value).map_err(ManifestError::Parse)?;
      manifest.insert(entry.unwrap_or_default().into_spec(id));
    }

    Ok(manifest)
  }

  /// Encode the manifest as YAML, entries in identifier order.
  pub fn to_yaml(&self) -> Result<String, ManifestError> {
    let mut doc = Mapping::new();
    for spec in self.iter() {
      let entry = PackageEntry::from(spec);
      let value = if entry.is_empty() {
        Value::Null
      } else {
        serde_yaml::to_value(&entry).map_err(ManifestError::Serialize)?
      };
      doc.insert(Value::String(spec.id.clone()), value);
    }

    serde_yaml::to_string(&doc).map_err(ManifestError::Serialize)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use tracing_test::traced_test;

  const SAMPLE: &str = r#"
Microsoft.PowerToys:
  pin: 0.80.0
  pinType: blocking
  version: 0.80.0
  scope: user
Git.Git:
Old.Tool:
  uninstall: true
"#;

  #[test]
  fn decode_sample() {
    let manifest = Manifest::from_yaml(SAMPLE).unwrap();
    assert_eq!(manifest.len(), 3);

    let toys = manifest.get("microsoft.powertoys").unwrap();
    assert_eq!(toys.id, "Microsoft.PowerToys");
    assert_eq!(toys.pin(), Some("0.80.0"));
    assert_eq!(toys.pin_type, Some(PinType::Blocking));
    assert_eq!(toys.attrs.scope.as_deref(), Some("user"));

    assert_eq!(manifest.get("Git.Git").unwrap(), &PackageSpec::new("Git.Git"));
    assert!(manifest.get("Old.Tool").unwrap().is_uninstall());
  }

  #[test]
  fn decode_empty_document() {
    assert!(Manifest::from_yaml("").unwrap().is_empty());
    assert!(Manifest::from_yaml("\n  \n").unwrap().is_empty());
    assert!(Manifest::from_yaml("# nothing yet\n").unwrap().is_empty());
  }

  #[test]
  fn decode_numeric_versions_as_strings() {
    let manifest = Manifest::from_yaml("Foo.Bar:\n  pin: 3\n  version: 2.5\n").unwrap();
    let spec = manifest.get("Foo.Bar").unwrap();
    assert_eq!(spec.pin(), Some("3"));
    assert_eq!(spec.version.as_deref(), Some("2.5"));
  }

  #[test]
  #[traced_test]
  fn decode_warns_about_unquoted_decimal_versions() {
    let manifest = Manifest::from_yaml("Foo.Bar:\n  pin: 1.10\n").unwrap();
    assert_eq!(manifest.get("Foo.Bar").unwrap().pin(), Some("1.1"));
    assert!(logs_contain("unquoted decimal version"));

    let quoted = Manifest::from_yaml("Foo.Bar:\n  pin: \"1.10\"\n").unwrap();
    assert_eq!(quoted.get("Foo.Bar").unwrap().pin(), Some("1.10"));
  }

  #[test]
  fn decode_rejects_case_insensitive_duplicates() {
    let result = Manifest::from_yaml("Git.Git:\ngit.git:\n");
    assert!(matches!(result, Err(ManifestError::DuplicateIdentifier(_))));
  }

  #[test]
  fn decode_rejects_empty_identifier() {
    let result = Manifest::from_yaml("'':\n  uninstall: true\n");
    assert!(matches!(result, Err(ManifestError::EmptyIdentifier)));
  }

  #[test]
  fn decode_rejects_non_mapping_root() {
    let result = Manifest::from_yaml("- Git.Git\n- Foo.Bar\n");
    assert!(matches!(result, Err(ManifestError::NotAMapping)));
  }

  #[test]
  fn decode_rejects_unknown_pin_type() {
    let result = Manifest::from_yaml("Foo.Bar:\n  pin: 1.0.0\n  pinType: sometimes\n");
    assert!(matches!(result, Err(ManifestError::Parse(_))));
  }

  #[test]
  fn encode_omits_absent_fields_and_writes_bare_keys() {
    let mut manifest = Manifest::new();
    manifest.insert(PackageSpec::new("Git.Git"));
    manifest.insert(PackageSpec {
      pin: Some("1.2.3".into()),
      ..PackageSpec::new("Foo.Bar")
    });

    let yaml = manifest.to_yaml().unwrap();
    assert!(yaml.contains("Git.Git: null"));
    assert!(yaml.contains("pin: 1.2.3"));
    assert!(!yaml.contains("pinType"));
    assert!(!yaml.contains("uninstall"));
    assert!(yaml.find("Foo.Bar").unwrap() < yaml.find("Git.Git").unwrap());
  }

  #[test]
  fn encode_then_decode_preserves_entries() {
    let manifest = Manifest::from_yaml(SAMPLE).unwrap();
    let decoded = Manifest::from_yaml(&manifest.to_yaml().unwrap()).unwrap();
    assert_eq!(decoded, manifest);
  }

  #[test]
  fn encode_quotes_float_like_versions() {
    let mut manifest = Manifest::new();
    manifest.insert(PackageSpec {
      pin: Some("1.10".into()),
      ..PackageSpec::new("Foo.Bar")
    });

    let decoded = Manifest::from_yaml(&manifest.to_yaml().unwrap()).unwrap();
    assert_eq!(decoded.get("Foo.Bar").unwrap().pin(), Some("1.10"));
  }
}
