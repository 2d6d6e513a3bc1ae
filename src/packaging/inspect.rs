//! Reading dependencies back out of produced artifacts.
//!
//! OS packages declare dependencies on other OS packages (`python-requests (>= 2.0)`),
//! so their names need mapping back into declaration space before they can be
//! pinned. Wheels already declare Python requirement strings.

use std::io::Read;
use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;

use crate::core::PinpackError;
use crate::descriptor::strip_requirement;
use crate::naming::{NameSchemeTable, PackageName};

static FPM_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#":path\s*=>\s*"([^"]+)""#).expect("fpm path pattern")
});

static PIP_SAVED: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*Saved\s+(\S+\.whl)\s*$").expect("pip saved pattern"));

/// Artifact path reported by fpm.
///
/// fpm logs a Ruby hash (`{:message=>"Created package", :path=>"x.deb"}`), or JSON
/// lines with `--log json`. The last reported path wins.
pub fn parse_fpm_output(output: &str) -> Option<String> {
    let mut found = None;
    for line in output.lines() {
        let line = line.trim();
        if line.starts_with('{') {
            if let Ok(value) = serde_json::from_str::<serde_json::Value>(line) {
                if let Some(path) = value.get("path").and_then(|p| p.as_str()) {
                    found = Some(path.to_string());
                    continue;
                }
            }
        }
        if let Some(captures) = FPM_PATH.captures(line) {
            found = Some(captures[1].to_string());
        }
    }
    found
}

/// Wheel file reported by `pip wheel`.
pub fn parse_pip_output(output: &str) -> Option<String> {
    PIP_SAVED.captures_iter(output).last().map(|captures| captures[1].to_string())
}

/// Map OS package dependency names into declaration space.
///
/// The baseline runtime dependency and packages outside the namespace prefix are
/// dropped.
pub fn system_names_to_declared<'a>(
    system_names: impl IntoIterator<Item = &'a str>,
    scheme: &NameSchemeTable,
    runtime_dependency: &str,
) -> Vec<PackageName> {
    let runtime = PackageName::new(runtime_dependency);
    let mut names: Vec<PackageName> = Vec::new();
    for system_name in system_names {
        let system_name = PackageName::new(system_name);
        if system_name.is_empty() || system_name == runtime {
            continue;
        }
        if let Some(name) = scheme.from_system_package_name(system_name.as_str()) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

/// Package names in a Debian `Depends` field.
///
/// `python (>= 2.7), python-yaml | python-pyyaml, python-requests (>= 2.0)` yields
/// `python`, `python-yaml` and `python-requests`; only the first of a set of
/// alternatives is kept.
pub fn parse_debian_depends(field: &str) -> Vec<String> {
    field
        .split(',')
        .filter_map(|clause| clause.split('|').next())
        .filter_map(|alternative| {
            let name = alternative
                .trim()
                .split(|c: char| c.is_whitespace() || c == '(' || c == ':')
                .next()
                .unwrap_or_default();
            (!name.is_empty()).then(|| name.to_string())
        })
        .collect()
}

/// Package names in `rpm -qp --requires` output, one capability per line.
///
/// File dependencies (`/usr/bin/python`) and rpmlib capabilities
/// (`rpmlib(PayloadIsXz) <= 5.2-1`) are skipped.
pub fn parse_rpm_requires(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| line.split_whitespace().next())
        .filter(|name| !name.starts_with('/') && !name.contains('('))
        .map(str::to_string)
        .collect()
}

/// `Requires-Dist` entries of a wheel's `METADATA`, stripped to names.
///
/// Requirements that only apply to an extra are skipped.
pub fn parse_wheel_metadata(metadata: &str) -> Vec<PackageName> {
    let mut names: Vec<PackageName> = Vec::new();
    for line in metadata.lines() {
        // Headers end at the first blank line; the rest is the description
        if line.trim().is_empty() {
            break;
        }
        let Some(value) = line.strip_prefix("Requires-Dist:") else {
            continue;
        };
        if value.split(';').nth(1).is_some_and(|marker| marker.contains("extra")) {
            continue;
        }
        if let Some(name) = strip_requirement(value) {
            if !names.contains(&name) {
                names.push(name);
            }
        }
    }
    names
}

/// Read the `METADATA` file out of a wheel archive.
pub fn read_wheel_metadata(path: &Path) -> Result<String, PinpackError> {
    let inspection_failed = |reason: String| PinpackError::ArtifactInspectionFailed {
        path: path.display().to_string(),
        reason,
    };

    let file = std::fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file).map_err(|e| inspection_failed(e.to_string()))?;

    let entry_name = archive
        .file_names()
        .find(|name| name.ends_with(".dist-info/METADATA"))
        .map(str::to_string)
        .ok_or_else(|| inspection_failed("no .dist-info/METADATA entry".to_string()))?;

    let mut entry = archive.by_name(&entry_name).map_err(|e| inspection_failed(e.to_string()))?;
    let mut metadata = String::new();
    entry.read_to_string(&mut metadata)?;
    Ok(metadata)
}
