use crate::utils::error::{GuardError, Result};
use crate::utils::validation::{self, Validate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

pub const DEFAULT_MOUNT_PATH: &str = "/mnt/nastea/download/";
pub const DEFAULT_COMPOSE_ROOT: &str = "~/code/docker-compose";
pub const DEFAULT_MASTER_FILE: &str = "docker-compose.yml";
pub const DEFAULT_EXTENSION: &str = "yml";
pub const DEFAULT_NAS_MARKER: &str = "NAS_";
pub const DEFAULT_ORCHESTRATOR: &str = "docker";

static ENV_VAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GuardConfig {
    pub mount: MountConfig,
    pub compose: ComposeConfig,
    pub orchestrator: OrchestratorConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MountConfig {
    pub path: String,
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_MOUNT_PATH.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ComposeConfig {
    pub root: String,
    pub master_file: String, // 相對路徑以 root 為基準
    pub extension: String,
    pub nas_marker: String,
}

impl Default for ComposeConfig {
    fn default() -> Self {
        Self {
            root: DEFAULT_COMPOSE_ROOT.to_string(),
            master_file: DEFAULT_MASTER_FILE.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
            nas_marker: DEFAULT_NAS_MARKER.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OrchestratorConfig {
    pub binary: String,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            binary: DEFAULT_ORCHESTRATOR.to_string(),
        }
    }
}

/// Values given on the command line; each one replaces the file/default value.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub mount_path: Option<String>,
    pub compose_root: Option<String>,
    pub master_file: Option<String>,
    pub nas_marker: Option<String>,
    pub orchestrator: Option<String>,
}

impl GuardConfig {
    /// 未指定設定檔時使用內建預設值
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| GuardError::ConfigParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content).map_err(|e| match e {
            GuardError::ConfigError { message } => GuardError::ConfigParseError {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);

        toml::from_str(&processed_content).map_err(|e| GuardError::ConfigError {
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${HOME})，未定義的變數保留原樣
    fn substitute_env_vars(content: &str) -> String {
        ENV_VAR_PATTERN
            .replace_all(content, |caps: &regex::Captures| {
                let var_name = &caps[1];
                std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
            })
            .into_owned()
    }

    pub fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(path) = overrides.mount_path {
            self.mount.path = path;
        }
        if let Some(root) = overrides.compose_root {
            self.compose.root = root;
        }
        if let Some(master) = overrides.master_file {
            self.compose.master_file = master;
        }
        if let Some(marker) = overrides.nas_marker {
            self.compose.nas_marker = marker;
        }
        if let Some(binary) = overrides.orchestrator {
            self.orchestrator.binary = binary;
        }
    }

    pub fn mount_path(&self) -> PathBuf {
        expand_home(&self.mount.path)
    }

    pub fn compose_root(&self) -> PathBuf {
        expand_home(&self.compose.root)
    }

    /// The compose file every orchestrator call is pointed at.
    pub fn master_file(&self) -> PathBuf {
        let master = expand_home(&self.compose.master_file);
        if master.is_absolute() {
            master
        } else {
            self.compose_root().join(master)
        }
    }

    pub fn extension(&self) -> &str {
        &self.compose.extension
    }

    pub fn nas_marker(&self) -> &str {
        &self.compose.nas_marker
    }

    pub fn orchestrator_binary(&self) -> &str {
        &self.orchestrator.binary
    }
}

impl Validate for GuardConfig {
    fn validate(&self) -> Result<()> {
        validation::validate_path("mount.path", &self.mount.path)?;
        validation::validate_path("compose.root", &self.compose.root)?;
        validation::validate_path("compose.master_file", &self.compose.master_file)?;
        validation::validate_file_extension("compose.extension", &self.compose.extension)?;
        validation::validate_non_empty_string("compose.nas_marker", &self.compose.nas_marker)?;
        validation::validate_non_empty_string("orchestrator.binary", &self.orchestrator.binary)?;
        Ok(())
    }
}

/// Expands a leading `~` to the home directory; other paths pass through.
pub fn expand_home(path: &str) -> PathBuf {
    let rest = match path {
        "~" => "",
        _ => match path.strip_prefix("~/") {
            Some(rest) => rest,
            None => return PathBuf::from(path),
        },
    };

    match dirs::home_dir() {
        Some(home) if rest.is_empty() => home,
        Some(home) => home.join(rest),
        None => PathBuf::from(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_match_historical_layout() {
        let config = GuardConfig::default();
        assert_eq!(config.mount_path(), PathBuf::from("/mnt/nastea/download/"));
        assert_eq!(config.nas_marker(), "NAS_");
        assert_eq!(config.extension(), "yml");
        assert_eq!(config.orchestrator_binary(), "docker");
        assert!(config.master_file().ends_with("code/docker-compose/docker-compose.yml"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_partial_toml_config() {
        let toml_content = r#"
[mount]
path = "/mnt/nas"

[compose]
root = "/srv/compose"
"#;

        let config = GuardConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.mount_path(), PathBuf::from("/mnt/nas"));
        assert_eq!(config.compose_root(), PathBuf::from("/srv/compose"));
        assert_eq!(
            config.master_file(),
            PathBuf::from("/srv/compose/docker-compose.yml")
        );
        assert_eq!(config.nas_marker(), "NAS_");
    }

    #[test]
    fn test_absolute_master_file_is_not_joined() {
        let toml_content = r#"
[compose]
root = "/srv/compose"
master_file = "/etc/stack/compose.yml"
"#;
        let config = GuardConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.master_file(), PathBuf::from("/etc/stack/compose.yml"));
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("GUARD_TEST_NAS_ROOT", "/mnt/from-env");

        let toml_content = r#"
[mount]
path = "${GUARD_TEST_NAS_ROOT}/media"

[compose]
root = "${GUARD_TEST_UNDEFINED_VAR}"
"#;

        let config = GuardConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.mount.path, "/mnt/from-env/media");
        assert_eq!(config.compose.root, "${GUARD_TEST_UNDEFINED_VAR}");

        std::env::remove_var("GUARD_TEST_NAS_ROOT");
    }

    #[test]
    fn test_unknown_keys_are_rejected() {
        let toml_content = r#"
[mount]
pth = "/mnt/nas"
"#;
        assert!(GuardConfig::from_toml_str(toml_content).is_err());
    }

    #[test]
    fn test_overrides_take_precedence() {
        let mut config = GuardConfig::from_toml_str(
            r#"
[compose]
nas_marker = "FILE_"
"#,
        )
        .unwrap();

        config.apply_overrides(ConfigOverrides {
            nas_marker: Some("CLI_".to_string()),
            orchestrator: Some("podman".to_string()),
            ..Default::default()
        });

        assert_eq!(config.nas_marker(), "CLI_");
        assert_eq!(config.orchestrator_binary(), "podman");
        assert_eq!(config.mount.path, DEFAULT_MOUNT_PATH);
    }

    #[test]
    fn test_config_validation() {
        let config = GuardConfig::from_toml_str(
            r#"
[compose]
nas_marker = ""
"#,
        )
        .unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[orchestrator]\nbinary = \"podman\"\n")
            .unwrap();

        let config = GuardConfig::load(Some(temp_file.path())).unwrap();
        assert_eq!(config.orchestrator_binary(), "podman");
    }

    #[test]
    fn test_missing_config_file_names_the_path() {
        let err = GuardConfig::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, GuardError::ConfigParseError { .. }));
        assert!(err.to_string().contains("/definitely/not/here.toml"));
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("/abs/path"), PathBuf::from("/abs/path"));
        assert_eq!(expand_home("relative"), PathBuf::from("relative"));
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~/code"), home.join("code"));
            assert_eq!(expand_home("~"), home);
        }
    }
}
