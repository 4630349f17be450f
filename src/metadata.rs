/*!
 * Project metadata extraction
 *
 * `package.json` is preferred; `Cargo.toml` is used when no `package.json`
 * exists. Failures never abort a run: they are reported through
 * [`ProjectInfo::Missing`] and [`ProjectInfo::Unreadable`].
 */

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::{error, warn};
use serde::Deserialize;

use crate::error::{Result, ResultExt};
use crate::types::{Dependency, ProjectInfo, ProjectMetadata};

const PACKAGE_JSON: &str = "package.json";
const CARGO_TOML: &str = "Cargo.toml";

#[derive(Debug, Deserialize)]
struct PackageJson {
    name: Option<String>,
    description: Option<String>,
    version: Option<String>,
    #[serde(default)]
    dependencies: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct CargoManifest {
    package: Option<CargoPackage>,
    #[serde(default)]
    dependencies: BTreeMap<String, toml::Value>,
}

#[derive(Debug, Deserialize)]
struct CargoPackage {
    name: Option<String>,
    description: Option<toml::Value>,
    version: Option<toml::Value>,
}

/// Look up project metadata in `root`
pub fn load_project_info(root: &Path) -> ProjectInfo {
    let candidates: [(&str, fn(&str) -> Result<ProjectMetadata>); 2] =
        [(PACKAGE_JSON, parse_package_json), (CARGO_TOML, parse_cargo_toml)];

    for (manifest, parse) in candidates {
        let path = root.join(manifest);
        if !path.is_file() {
            continue;
        }

        let parsed = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))
            .and_then(|content| parse(&content));

        return match parsed {
            Ok(metadata) => ProjectInfo::Found(metadata),
            Err(e) => {
                error!("Error reading {}: {}", manifest, e);
                ProjectInfo::Unreadable {
                    manifest: manifest.to_string(),
                    reason: e.to_string(),
                }
            }
        };
    }

    warn!("No {} or {} found in target directory", PACKAGE_JSON, CARGO_TOML);
    ProjectInfo::Missing
}

fn parse_package_json(content: &str) -> Result<ProjectMetadata> {
    let package: PackageJson = serde_json::from_str(content)
        .map_err(|e| crate::error!(Manifest, "{}: {}", PACKAGE_JSON, e))?;

    let dependencies = package
        .dependencies
        .into_iter()
        .map(|(name, version)| Dependency {
            name,
            version: match version {
                serde_json::Value::String(version) => version,
                other => other.to_string(),
            },
        })
        .collect();

    Ok(ProjectMetadata {
        manifest: PACKAGE_JSON.to_string(),
        name: package.name,
        description: package.description,
        version: package.version,
        dependencies,
    })
}

fn parse_cargo_toml(content: &str) -> Result<ProjectMetadata> {
    let manifest: CargoManifest =
        toml::from_str(content).map_err(|e| crate::error!(Manifest, "{}: {}", CARGO_TOML, e))?;
    let package = manifest.package;

    let dependencies = manifest
        .dependencies
        .into_iter()
        .map(|(name, spec)| Dependency {
            name,
            version: match &spec {
                toml::Value::String(version) => version.clone(),
                toml::Value::Table(table) => table
                    .get("version")
                    .and_then(toml::Value::as_str)
                    .unwrap_or("*")
                    .to_string(),
                _ => "*".to_string(),
            },
        })
        .collect();

    // Workspace-inherited fields (`version.workspace = true`) carry no string
    let field = |select: fn(&CargoPackage) -> Option<&toml::Value>| {
        package
            .as_ref()
            .and_then(select)
            .and_then(toml::Value::as_str)
            .map(String::from)
    };

    Ok(ProjectMetadata {
        manifest: CARGO_TOML.to_string(),
        name: package.as_ref().and_then(|p| p.name.clone()),
        description: field(|p| p.description.as_ref()),
        version: field(|p| p.version.as_ref()),
        dependencies,
    })
}
