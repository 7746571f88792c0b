//! package.json metadata

use crate::diagnostics::{ExtractError, ExtractResult};
use openpkg_checker::{OsHost, ProgramHost};
use openpkg_spec::SpecMeta;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// `repository` is either a URL string or an object with a `url`
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
enum Repository {
    Url(String),
    Object { url: Option<String> },
}

/// Partial package.json structure for the document header
#[derive(Debug, Deserialize)]
struct PackageJson {
    name: Option<String>,
    version: Option<String>,
    description: Option<String>,
    license: Option<String>,
    repository: Option<Repository>,
}

/// Package metadata that lands in `meta`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageMeta {
    pub name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    pub license: Option<String>,
    pub repository: Option<String>,
}

impl PackageMeta {
    /// Read a package.json on disk
    pub fn from_package_json(path: &Path) -> ExtractResult<Self> {
        Self::load(path, &OsHost)
    }

    /// Read a package.json through `host`
    pub fn load(path: &Path, host: &dyn ProgramHost) -> ExtractResult<Self> {
        let content = host
            .read_file(path)
            .map_err(|e| ExtractError::package(path, format!("Failed to read package.json: {}", e)))?;
        let package: PackageJson = serde_json::from_str(&content)
            .map_err(|e| ExtractError::package(path, format!("Failed to parse package.json: {}", e)))?;

        debug!(path = %path.display(), name = ?package.name, "Read package metadata");
        Ok(Self {
            name: package.name,
            version: package.version,
            description: package.description,
            license: package.license,
            repository: package.repository.and_then(|repo| match repo {
                Repository::Url(url) => Some(url),
                Repository::Object { url } => url,
            }),
        })
    }

    /// Nearest package.json at or above the directory of `entry`
    pub fn find_package_json(entry: &Path, host: &dyn ProgramHost) -> Option<PathBuf> {
        entry
            .ancestors()
            .skip(1)
            .map(|dir| dir.join("package.json"))
            .find(|candidate| host.file_exists(candidate))
    }

    /// Document header, named `fallback_name` when the package has no name
    pub fn into_meta(self, fallback_name: &str) -> SpecMeta {
        let mut meta = SpecMeta::named(self.name.unwrap_or_else(|| fallback_name.to_string()));
        meta.version = self.version;
        meta.description = self.description;
        meta.license = self.license;
        meta.repository = self.repository;
        meta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use openpkg_checker::MemoryHost;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_from_package_json() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("package.json");
        fs::write(
            &path,
            r#"{
                "name": "@acme/widgets",
                "version": "1.4.0",
                "description": "Widget toolkit",
                "license": "MIT",
                "repository": { "type": "git", "url": "https://github.com/acme/widgets" },
                "dependencies": { "left-pad": "^1.0.0" }
            }"#,
        )
        .unwrap();

        let meta = PackageMeta::from_package_json(&path).unwrap();
        assert_eq!(
            meta,
            PackageMeta {
                name: Some("@acme/widgets".to_string()),
                version: Some("1.4.0".to_string()),
                description: Some("Widget toolkit".to_string()),
                license: Some("MIT".to_string()),
                repository: Some("https://github.com/acme/widgets".to_string()),
            }
        );
    }

    #[test]
    fn test_repository_as_string() {
        let host = MemoryHost::new().with_file(
            "/pkg/package.json",
            r#"{ "name": "tiny", "repository": "github:acme/tiny" }"#,
        );
        let meta = PackageMeta::load(Path::new("/pkg/package.json"), &host).unwrap();
        assert_eq!(meta.repository.as_deref(), Some("github:acme/tiny"));
        assert_eq!(meta.version, None);
    }

    #[test]
    fn test_invalid_package_json() {
        let host = MemoryHost::new().with_file("/pkg/package.json", "{ name: ");
        let err = PackageMeta::load(Path::new("/pkg/package.json"), &host).unwrap_err();
        assert!(matches!(err, ExtractError::Package { .. }));
        assert!(err.to_string().contains("Failed to parse package.json"));
    }

    #[test]
    fn test_find_package_json_walks_up() {
        let host = MemoryHost::new()
            .with_file("/repo/package.json", "{}")
            .with_file("/repo/src/lib/index.ts", "");
        assert_eq!(
            PackageMeta::find_package_json(Path::new("/repo/src/lib/index.ts"), &host),
            Some(PathBuf::from("/repo/package.json"))
        );
        assert_eq!(
            PackageMeta::find_package_json(Path::new("/elsewhere/index.ts"), &host),
            None
        );
    }

    #[test]
    fn test_into_meta() {
        let meta = PackageMeta {
            version: Some("0.1.0".to_string()),
            ..PackageMeta::default()
        }
        .into_meta("widgets");
        assert_eq!(meta.name, "widgets");
        assert_eq!(meta.version.as_deref(), Some("0.1.0"));
        assert_eq!(meta.ecosystem, "js/ts");
    }
}
