use crate::config::GuardConfig;
use crate::domain::model::{NasDependentServices, ServiceDescriptor};
use crate::utils::error::{GuardError, Result};
use serde_yaml::{Mapping, Value};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Walks a directory tree of compose files and collects NAS-dependent services.
#[derive(Debug, Clone)]
pub struct ComposeScanner {
    root: PathBuf,
    extension: String,
    marker: String,
}

impl ComposeScanner {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>, marker: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
            marker: marker.into(),
        }
    }

    pub fn from_config(config: &GuardConfig) -> Self {
        Self::new(config.compose_root(), config.extension(), config.nas_marker())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Compose files under the root, sorted by path, symlinked files included.
    /// Unreadable subdirectories are skipped with a warning; a missing root is
    /// an error.
    pub fn compose_files(&self) -> Result<Vec<PathBuf>> {
        let is_dir = fs::metadata(&self.root).map(|m| m.is_dir()).unwrap_or(false);
        if !is_dir {
            return Err(GuardError::ComposeRootError {
                path: self.root.clone(),
            });
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&self.root).follow_links(false).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    if e.depth() == 0 {
                        return Err(GuardError::ComposeRootError {
                            path: self.root.clone(),
                        });
                    }
                    tracing::warn!("⚠️ Skipping unreadable path during scan: {}", e);
                    continue;
                }
            };

            // Linked compose files are kept, linked directories are not entered.
            // A dangling link stays in the list so reading it reports the error.
            let file_type = entry.file_type();
            let is_file = if file_type.is_symlink() {
                fs::metadata(entry.path()).map(|m| m.is_file()).unwrap_or(true)
            } else {
                file_type.is_file()
            };
            if !is_file {
                continue;
            }

            let matches = entry
                .path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext == self.extension);
            if matches {
                files.push(entry.into_path());
            }
        }

        Ok(files)
    }

    /// Any unreadable or malformed compose file aborts the scan.
    pub fn scan(&self) -> Result<NasDependentServices> {
        let files = self.compose_files()?;
        tracing::debug!("Found {} compose files under {}", files.len(), self.root.display());

        let mut services = NasDependentServices::new();
        for file in &files {
            let descriptors = parse_compose_file(file)?;
            let before = services.len();
            services.extend_from(&descriptors, &self.marker);
            tracing::debug!(
                "{}: {} services, {} NAS-dependent",
                file.display(),
                descriptors.len(),
                services.len() - before
            );
        }

        tracing::info!(
            "🔍 Discovered {} NAS-dependent services in {} compose files",
            services.len(),
            files.len()
        );
        Ok(services)
    }
}

pub fn parse_compose_file(path: &Path) -> Result<Vec<ServiceDescriptor>> {
    let content = fs::read_to_string(path).map_err(|source| GuardError::ComposeReadError {
        path: path.to_path_buf(),
        source,
    })?;
    parse_compose_str(&content, path)
}

/// Services of one compose document, in declaration order. Entries with a
/// `profiles` key are left out whatever its value.
pub fn parse_compose_str(content: &str, source: &Path) -> Result<Vec<ServiceDescriptor>> {
    if content.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut document: Value =
        serde_yaml::from_str(content).map_err(|e| GuardError::ComposeParseError {
            path: source.to_path_buf(),
            source: e,
        })?;
    document
        .apply_merge()
        .map_err(|e| GuardError::ComposeParseError {
            path: source.to_path_buf(),
            source: e,
        })?;

    let malformed = |message: String| GuardError::MalformedComposeError {
        path: source.to_path_buf(),
        message,
    };

    let services = match &document {
        Value::Null => return Ok(Vec::new()),
        Value::Mapping(root) => match root.get("services") {
            None | Some(Value::Null) => return Ok(Vec::new()),
            Some(Value::Mapping(services)) => services,
            Some(_) => return Err(malformed("'services' is not a mapping".to_string())),
        },
        _ => return Err(malformed("top-level value is not a mapping".to_string())),
    };

    let mut descriptors = Vec::with_capacity(services.len());
    for (key, value) in services {
        let name = key
            .as_str()
            .ok_or_else(|| malformed(format!("service name {:?} is not a string", key)))?;

        let declared_volumes = match value {
            Value::Null => Vec::new(),
            Value::Mapping(service) => {
                if service.contains_key("profiles") {
                    tracing::debug!("Ignoring service '{}' with profiles", name);
                    continue;
                }
                declared_volumes(service).map_err(|message| {
                    malformed(format!("service '{}': {}", name, message))
                })?
            }
            _ => {
                return Err(malformed(format!(
                    "service '{}' is not a mapping",
                    name
                )))
            }
        };

        descriptors.push(ServiceDescriptor {
            name: name.to_string(),
            declared_volumes,
        });
    }

    Ok(descriptors)
}

/// Short-syntax entries are kept verbatim; long-syntax entries contribute
/// their `source`. Matching on `source` also selects long-syntax NAS mounts,
/// which a plain membership test on the entry mapping would never match.
fn declared_volumes(service: &Mapping) -> std::result::Result<Vec<String>, String> {
    let entries = match service.get("volumes") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::Sequence(entries)) => entries,
        Some(_) => return Err("'volumes' is not a list".to_string()),
    };

    Ok(entries
        .iter()
        .filter_map(|entry| match entry {
            Value::String(volume) => Some(volume.clone()),
            Value::Mapping(long) => long
                .get("source")
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(content: &str) -> Vec<ServiceDescriptor> {
        parse_compose_str(content, Path::new("test.yml")).unwrap()
    }

    fn names(descriptors: &[ServiceDescriptor]) -> Vec<&str> {
        descriptors.iter().map(|d| d.name.as_str()).collect()
    }

    #[test]
    fn test_services_keep_declaration_order() {
        let descriptors = parse(
            r#"
services:
  zeta:
    image: a
  alpha:
    image: b
  mid:
    image: c
"#,
        );
        assert_eq!(names(&descriptors), vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_profiles_key_excludes_service_regardless_of_value() {
        let descriptors = parse(
            r#"
services:
  tools:
    profiles: ["debug"]
    volumes: ["NAS_media:/data"]
  nulled:
    profiles:
    volumes: ["NAS_media:/data"]
  empty:
    profiles: []
  kept:
    volumes: ["NAS_media:/data"]
"#,
        );
        assert_eq!(names(&descriptors), vec!["kept"]);
    }

    #[test]
    fn test_missing_services_and_volumes() {
        assert!(parse("version: '3'\n").is_empty());
        assert!(parse("services:\n").is_empty());
        assert!(parse("").is_empty());

        let descriptors = parse(
            r#"
services:
  bare:
  novolumes:
    image: nginx
"#,
        );
        assert_eq!(names(&descriptors), vec!["bare", "novolumes"]);
        assert!(descriptors.iter().all(|d| d.declared_volumes.is_empty()));
    }

    #[test]
    fn test_long_syntax_volume_uses_source() {
        let descriptors = parse(
            r#"
services:
  plex:
    volumes:
      - type: bind
        source: /mnt/NAS_media
        target: /media
      - ./config:/config
"#,
        );
        assert_eq!(
            descriptors[0].declared_volumes,
            vec!["/mnt/NAS_media".to_string(), "./config:/config".to_string()]
        );
        assert!(descriptors[0].depends_on_nas("NAS_"));
    }

    #[test]
    fn test_merge_keys_are_applied() {
        let descriptors = parse(
            r#"
x-nas: &nas
  volumes:
    - NAS_downloads:/downloads
services:
  sabnzbd:
    <<: *nas
    image: sabnzbd
"#,
        );
        assert!(descriptors[0].depends_on_nas("NAS_"));
    }

    #[test]
    fn test_malformed_documents_are_errors() {
        let path = Path::new("broken.yml");
        assert!(matches!(
            parse_compose_str("services: [a, b]\n", path),
            Err(GuardError::MalformedComposeError { .. })
        ));
        assert!(matches!(
            parse_compose_str("- just\n- a list\n", path),
            Err(GuardError::MalformedComposeError { .. })
        ));
        assert!(matches!(
            parse_compose_str("services:\n  web:\n    volumes: ./data\n", path),
            Err(GuardError::MalformedComposeError { .. })
        ));
        assert!(matches!(
            parse_compose_str("services:\n  web: [\n", path),
            Err(GuardError::ComposeParseError { .. })
        ));
    }
}
