use anyhow::{Result, anyhow, bail};
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_USDA_BASE_URL: &str = "https://api.nal.usda.gov";
pub const DEFAULT_NINJAS_BASE_URL: &str = "https://api.api-ninjas.com";
pub const DEFAULT_TELEGRAM_BASE_URL: &str = "https://api.telegram.org";

/// Fallback destination used when a notification is requested without an
/// explicit chat id.
pub const DEFAULT_TELEGRAM_CHAT_ID: &str = "8504254528";

const CONFIG_DIR_NAME: &str = "nutrigym";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub telegram_token: Option<String>,
    pub telegram_chat_id: String,
    pub api_ninjas_key: Option<String>,
    pub usda_api_key: Option<String>,
    pub usda_base_url: String,
    pub ninjas_base_url: String,
    pub telegram_base_url: String,
    /// Directory holding perfil.json, progreso.json and the exported report.
    pub data_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFileConfig {
    telegram_token: Option<String>,
    telegram_chat_id: Option<String>,
    api_ninjas_key: Option<String>,
    usda_api_key: Option<String>,
    usda_base_url: Option<String>,
    ninjas_base_url: Option<String>,
    telegram_base_url: Option<String>,
    data_dir: Option<PathBuf>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::load_with_path(None)
    }

    pub fn load_with_path(explicit_path: Option<&Path>) -> Result<Self> {
        let config_path = match explicit_path {
            Some(path) => path.to_path_buf(),
            None => discover_config_path()?,
        };
        let file_config = load_file_config(&config_path)?;

        // API credentials may also live in a local .env file.
        dotenvy::dotenv().ok();

        let file = |get: fn(&RawFileConfig) -> Option<&String>| {
            file_config
                .as_ref()
                .and_then(get)
                .and_then(|value| non_empty(value).map(ToOwned::to_owned))
        };

        let data_dir = env_non_empty("NUTRIGYM_DATA_DIR")
            .map(PathBuf::from)
            .or_else(|| file_config.as_ref().and_then(|cfg| cfg.data_dir.clone()))
            .unwrap_or_else(|| PathBuf::from("."));

        Ok(Self {
            telegram_token: env_non_empty("TELEGRAM_TOKEN")
                .or_else(|| file(|cfg| cfg.telegram_token.as_ref())),
            telegram_chat_id: env_non_empty("TELEGRAM_CHAT_ID")
                .or_else(|| file(|cfg| cfg.telegram_chat_id.as_ref()))
                .unwrap_or_else(|| DEFAULT_TELEGRAM_CHAT_ID.to_string()),
            api_ninjas_key: env_non_empty("API_NINJAS_KEY")
                .or_else(|| file(|cfg| cfg.api_ninjas_key.as_ref())),
            usda_api_key: env_non_empty("USDA_API_KEY")
                .or_else(|| file(|cfg| cfg.usda_api_key.as_ref())),
            usda_base_url: file(|cfg| cfg.usda_base_url.as_ref())
                .unwrap_or_else(|| DEFAULT_USDA_BASE_URL.to_string()),
            ninjas_base_url: file(|cfg| cfg.ninjas_base_url.as_ref())
                .unwrap_or_else(|| DEFAULT_NINJAS_BASE_URL.to_string()),
            telegram_base_url: file(|cfg| cfg.telegram_base_url.as_ref())
                .unwrap_or_else(|| DEFAULT_TELEGRAM_BASE_URL.to_string()),
            data_dir,
        })
    }
}

fn discover_config_path() -> Result<PathBuf> {
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        let trimmed = xdg.trim();
        if trimmed.is_empty() {
            bail!("Failed to resolve config path: XDG_CONFIG_HOME is set but empty");
        }

        return Ok(PathBuf::from(trimmed)
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME));
    }

    let home = dirs::home_dir().ok_or_else(|| {
        anyhow!("Failed to resolve config path: HOME directory is unavailable")
    })?;

    Ok(home
        .join(".config")
        .join(CONFIG_DIR_NAME)
        .join(CONFIG_FILE_NAME))
}

fn load_file_config(config_path: &Path) -> Result<Option<RawFileConfig>> {
    if !config_path.is_file() {
        return Ok(None);
    }

    let config_text = fs::read_to_string(config_path).map_err(|err| {
        anyhow!(
            "Failed to load config {}: unable to read file: {err}",
            config_path.display()
        )
    })?;

    toml::from_str(&config_text).map(Some).map_err(|err| {
        anyhow!(
            "Failed to load config {}: {err}",
            config_path.display()
        )
    })
}

fn env_non_empty(key: &str) -> Option<String> {
    env::var(key).ok().and_then(|value| {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, DEFAULT_TELEGRAM_CHAT_ID, DEFAULT_USDA_BASE_URL};
    use serial_test::serial;
    use std::env;
    use std::fs;
    use std::path::{Path, PathBuf};

    fn reset_vars() {
        unsafe {
            env::remove_var("TELEGRAM_TOKEN");
            env::remove_var("TELEGRAM_CHAT_ID");
            env::remove_var("API_NINJAS_KEY");
            env::remove_var("USDA_API_KEY");
            env::remove_var("NUTRIGYM_DATA_DIR");
            env::remove_var("XDG_CONFIG_HOME");
        }
    }

    fn with_cwd<T>(path: &Path, f: impl FnOnce() -> T) -> T {
        let cwd = env::current_dir().expect("current dir");
        env::set_current_dir(path).expect("set current dir");
        let result = f();
        env::set_current_dir(cwd).expect("restore current dir");
        result
    }

    #[test]
    #[serial]
    fn load_uses_defaults_when_nothing_is_configured() {
        let tmp = tempfile::tempdir().expect("tempdir");
        reset_vars();
        unsafe {
            env::set_var("XDG_CONFIG_HOME", tmp.path());
        }

        let cfg = with_cwd(tmp.path(), || AppConfig::load().expect("load config"));
        assert_eq!(cfg.telegram_token, None);
        assert_eq!(cfg.telegram_chat_id, DEFAULT_TELEGRAM_CHAT_ID);
        assert_eq!(cfg.usda_base_url, DEFAULT_USDA_BASE_URL);
        assert_eq!(cfg.data_dir, PathBuf::from("."));
    }

    #[test]
    #[serial]
    fn load_env_overrides_file() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let config_dir = tmp.path().join("nutrigym");
        fs::create_dir_all(&config_dir).expect("create config dir");
        fs::write(
            config_dir.join("config.toml"),
            r#"
usda_api_key = "file_key"
api_ninjas_key = "file_ninjas"
telegram_chat_id = "42"
"#,
        )
        .expect("write config");

        reset_vars();
        unsafe {
            env::set_var("XDG_CONFIG_HOME", tmp.path());
            env::set_var("USDA_API_KEY", "os_key");
        }

        let cfg = with_cwd(tmp.path(), || AppConfig::load().expect("load config"));
        assert_eq!(cfg.usda_api_key.as_deref(), Some("os_key"));
        assert_eq!(cfg.api_ninjas_key.as_deref(), Some("file_ninjas"));
        assert_eq!(cfg.telegram_chat_id, "42");
    }

    #[test]
    #[serial]
    fn load_with_explicit_path_ignores_discovery() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let config_path = tmp.path().join("custom.toml");
        fs::write(&config_path, r#"telegram_token = "tok""#).expect("write config");

        reset_vars();
        let cfg = with_cwd(tmp.path(), || {
            AppConfig::load_with_path(Some(&config_path)).expect("load config")
        });
        assert_eq!(cfg.telegram_token.as_deref(), Some("tok"));
    }

    #[test]
    #[serial]
    fn load_fails_on_unknown_root_key() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let config_dir = tmp.path().join("nutrigym");
        fs::create_dir_all(&config_dir).expect("create config dir");
        fs::write(config_dir.join("config.toml"), "unknown_key = 1").expect("write config");

        reset_vars();
        unsafe {
            env::set_var("XDG_CONFIG_HOME", tmp.path());
        }

        let err = with_cwd(tmp.path(), || AppConfig::load().expect_err("load should fail"));
        assert!(err.to_string().contains("Failed to load config"));
        assert!(err.to_string().contains("unknown field"));
    }

    #[test]
    #[serial]
    fn load_fails_when_xdg_config_home_is_empty() {
        reset_vars();
        unsafe {
            env::set_var("XDG_CONFIG_HOME", "   ");
        }

        let err = AppConfig::load().expect_err("load should fail");
        assert!(
            err.to_string()
                .contains("Failed to resolve config path: XDG_CONFIG_HOME is set but empty")
        );
    }

    #[test]
    #[serial]
    fn blank_file_values_fall_back_to_defaults() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let config_dir = tmp.path().join("nutrigym");
        fs::create_dir_all(&config_dir).expect("create config dir");
        fs::write(
            config_dir.join("config.toml"),
            r#"
usda_api_key = "   "
usda_base_url = ""
"#,
        )
        .expect("write config");

        reset_vars();
        unsafe {
            env::set_var("XDG_CONFIG_HOME", tmp.path());
        }

        let cfg = with_cwd(tmp.path(), || AppConfig::load().expect("load config"));
        assert_eq!(cfg.usda_api_key, None);
        assert_eq!(cfg.usda_base_url, DEFAULT_USDA_BASE_URL);
    }
}
