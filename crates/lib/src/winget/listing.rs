//! Parsing of winget's installed-package export and pin table.

use serde::Deserialize;

use super::{DriverError, InstalledPackage, LocalPin};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct Export {
  #[serde(default)]
  sources: Vec<ExportSource>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ExportSource {
  #[serde(default)]
  packages: Vec<ExportPackage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ExportPackage {
  package_identifier: String,
  #[serde(default)]
  version: Option<String>,
}

/// Parse the JSON written by `winget export --include-versions`.
///
/// Packages that appear under more than one source are reported once.
pub fn parse_export(content: &str) -> Result<Vec<InstalledPackage>, DriverError> {
  let content = content.trim_start_matches('\u{feff}');
  let export: Export = serde_json::from_str(content).map_err(|e| DriverError::InvalidListing(e.to_string()))?;

  let mut packages: Vec<InstalledPackage> = Vec::new();
  for package in export.sources.into_iter().flat_map(|s| s.packages) {
    if package.package_identifier.is_empty() {
      continue;
    }
    let duplicate = packages
      .iter()
      .any(|p| p.id.eq_ignore_ascii_case(&package.package_identifier));
    if !duplicate {
      packages.push(InstalledPackage::new(
        package.package_identifier,
        package.version.unwrap_or_default(),
      ));
    }
  }

  Ok(packages)
}

const NO_PINS: &str = "There are no pins configured";

/// Parse the table printed by `winget pin list`.
///
/// Returns `None` when the output is not a recognizable table, for example
/// when winget prints localized headers.
pub fn parse_pin_list(output: &str) -> Option<Vec<LocalPin>> {
  let lines: Vec<&str> = output
    .lines()
    .map(|l| l.rsplit('\r').next().unwrap_or(l))
    .collect();

  let is_rule = |l: &&str| {
    let t = l.trim();
    t.len() >= 3 && t.chars().all(|c| c == '-')
  };
  let Some(rule) = lines.iter().position(is_rule) else {
    return output.contains(NO_PINS).then(Vec::new);
  };
  let header = *lines.get(rule.checked_sub(1)?)?;

  let col = |name: &str| header.find(name).map(|byte| text_width(&header[..byte]));
  let id_col = col("Id")?;
  let version_col = col("Version")?;
  let type_col = col("Pin type")?;
  let pinned_col = col("Pinned version")?;

  let pins = lines[rule + 1..]
    .iter()
    .filter(|l| !l.trim().is_empty())
    .filter_map(|line| {
      let cells = cells(line);
      let id = column(&cells, id_col, version_col);
      // truncated ids end in an ellipsis and name no package
      if id.is_empty() || id.ends_with('…') {
        return None;
      }
      let pin_type = column(&cells, type_col, pinned_col);
      let pinned = column(&cells, pinned_col, usize::MAX);
      Some(LocalPin {
        id,
        version: (!pinned.is_empty()).then_some(pinned),
        blocking: pin_type.eq_ignore_ascii_case("blocking"),
      })
    })
    .collect();

  Some(pins)
}

/// Terminal columns taken by `c`. winget pads its tables by display width,
/// so East Asian wide characters count twice.
fn char_width(c: char) -> usize {
  match c as u32 {
    0x1100..=0x115F
    | 0x2E80..=0x303E
    | 0x3041..=0x33FF
    | 0x3400..=0x4DBF
    | 0x4E00..=0x9FFF
    | 0xA000..=0xA4CF
    | 0xAC00..=0xD7A3
    | 0xF900..=0xFAFF
    | 0xFE30..=0xFE4F
    | 0xFF00..=0xFF60
    | 0xFFE0..=0xFFE6
    | 0x1F300..=0x1F64F
    | 0x1F900..=0x1F9FF
    | 0x20000..=0x3FFFD => 2,
    _ => 1,
  }
}

fn text_width(text: &str) -> usize {
  text.chars().map(char_width).sum()
}

/// Each character of a row with the display column it starts at.
fn cells(line: &str) -> Vec<(usize, char)> {
  let mut at = 0;
  line
    .chars()
    .map(|c| {
      let cell = (at, c);
      at += char_width(c);
      cell
    })
    .collect()
}

fn column(cells: &[(usize, char)], start: usize, end: usize) -> String {
  cells
    .iter()
    .filter(|(at, _)| (start..end).contains(at))
    .map(|(_, c)| *c)
    .collect::<String>()
    .trim()
    .to_string()
}
