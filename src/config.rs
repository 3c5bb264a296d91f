use crate::error::PraiError;
use crate::llm::prompts;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Template sentinel meaning "use the built-in template".
pub const DEFAULT_TEMPLATE: &str = "default";

/// Language used when the locale environment gives nothing usable.
const FALLBACK_LANGUAGE: &str = "en";

/// Persisted settings for prai.
///
/// Every field has a default, so a file written by an older version (or by
/// hand) with missing keys still loads into a complete record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_language")]
    pub language: String,
    #[serde(default = "default_template")]
    pub template: String,
    /// Stored and shown by `config show`; never sent to the model.
    #[serde(default = "default_prompt")]
    pub prompt: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            api_key: String::new(),
            language: default_language(),
            template: default_template(),
            prompt: default_prompt(),
        }
    }
}

fn default_language() -> String {
    detect_language(|name| env::var(name).ok())
}

fn default_template() -> String {
    DEFAULT_TEMPLATE.to_string()
}

fn default_prompt() -> String {
    prompts::DEFAULT_PROMPT.to_string()
}

/// Derive a language code from the POSIX locale variables.
///
/// Checked in the order the C library uses: `LC_ALL`, `LC_MESSAGES`, `LANG`.
/// `ja_JP.UTF-8` becomes `ja`; `C` and `POSIX` mean no preference.
pub fn detect_language<F>(lookup: F) -> String
where
    F: Fn(&str) -> Option<String>,
{
    for name in ["LC_ALL", "LC_MESSAGES", "LANG"] {
        let Some(value) = lookup(name) else {
            continue;
        };

        let code = value
            .split(['_', '.', '@', '-'])
            .next()
            .unwrap_or_default()
            .trim()
            .to_lowercase();

        if code.is_empty() || code == "c" || code == "posix" {
            continue;
        }

        return code;
    }

    FALLBACK_LANGUAGE.to_string()
}

/// The settings a user can change with `prai config <key> <value>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKey {
    ApiKey,
    Language,
    Template,
    Prompt,
}

impl SettingKey {
    pub const ALL: [SettingKey; 4] = [
        SettingKey::ApiKey,
        SettingKey::Language,
        SettingKey::Template,
        SettingKey::Prompt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::ApiKey => "api_key",
            SettingKey::Language => "language",
            SettingKey::Template => "template",
            SettingKey::Prompt => "prompt",
        }
    }
}

impl FromStr for SettingKey {
    type Err = PraiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "api_key" | "credential" => Ok(SettingKey::ApiKey),
            "language" => Ok(SettingKey::Language),
            "template" => Ok(SettingKey::Template),
            "prompt" => Ok(SettingKey::Prompt),
            other => Err(PraiError::UnknownKey(other.to_string())),
        }
    }
}

impl Settings {
    pub fn get(&self, key: SettingKey) -> &str {
        match key {
            SettingKey::ApiKey => &self.api_key,
            SettingKey::Language => &self.language,
            SettingKey::Template => &self.template,
            SettingKey::Prompt => &self.prompt,
        }
    }

    fn field_mut(&mut self, key: SettingKey) -> &mut String {
        match key {
            SettingKey::ApiKey => &mut self.api_key,
            SettingKey::Language => &mut self.language,
            SettingKey::Template => &mut self.template,
            SettingKey::Prompt => &mut self.prompt,
        }
    }
}

/// Reads and writes the settings file.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ConfigStore { path: path.into() }
    }

    /// Return `~/.config/prai/config.json`
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().context("failed to determine home directory")?;
        Ok(home.join(".config").join("prai").join("config.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the stored settings, falling back to defaults on any failure.
    pub fn load(&self) -> Settings {
        let data = match fs::read_to_string(&self.path) {
            Ok(data) => data,
            Err(err) => {
                log::debug!("No readable config at {}: {err}", self.path.display());
                return Settings::default();
            }
        };

        match serde_json::from_str::<Settings>(&data) {
            Ok(settings) => settings,
            Err(err) => {
                log::warn!(
                    "Ignoring unreadable config file {}: {err}",
                    self.path.display()
                );
                Settings::default()
            }
        }
    }

    /// Write the settings through a temp file in the same directory, so an
    /// interrupted write never leaves a truncated config behind.
    pub fn save(&self, settings: &Settings) -> Result<()> {
        let dir = match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };

        fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create config directory {}", dir.display()))?;

        let mut json =
            serde_json::to_string_pretty(settings).context("failed to serialize config")?;
        json.push('\n');

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)
            .with_context(|| format!("failed to create temp file in {}", dir.display()))?;
        tmp.write_all(json.as_bytes())
            .context("failed to write config")?;
        tmp.as_file().sync_all().context("failed to flush config")?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(tmp.path(), fs::Permissions::from_mode(0o600))
                .context("failed to restrict config file permissions")?;
        }

        tmp.persist(&self.path)
            .with_context(|| format!("failed to write config file {}", self.path.display()))?;

        log::debug!("Saved config to {}", self.path.display());
        Ok(())
    }

    /// Change one setting and persist it. Unknown keys write nothing.
    pub fn set(&self, key: &str, value: &str) -> Result<Settings> {
        let key = SettingKey::from_str(key)?;
        let mut settings = self.load();
        *settings.field_mut(key) = value.to_string();
        self.save(&settings)?;
        Ok(settings)
    }

    pub fn reset(&self) -> Result<Settings> {
        let settings = Settings::default();
        self.save(&settings)?;
        Ok(settings)
    }
}

/// Mask a secret for display, keeping a short prefix so users can tell keys apart.
pub fn mask_secret(secret: &str) -> String {
    if secret.is_empty() {
        return "(not set)".to_string();
    }
    let prefix: String = secret.chars().take(3).collect();
    format!("{prefix}****")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> ConfigStore {
        ConfigStore::new(dir.path().join("nested").join("config.json"))
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        let settings = store.load();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.template, DEFAULT_TEMPLATE);
        assert_eq!(settings.prompt, prompts::DEFAULT_PROMPT);
        assert!(settings.api_key.is_empty());
    }

    #[test]
    fn set_changes_only_the_named_field() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        for key in SettingKey::ALL {
            let before = store.load();
            let value = format!("value-for-{}", key.as_str());
            store.set(key.as_str(), &value).unwrap();

            let after = store.load();
            assert_eq!(after.get(key), value);
            for other in SettingKey::ALL.into_iter().filter(|k| *k != key) {
                assert_eq!(after.get(other), before.get(other), "{} changed", other.as_str());
            }
        }
    }

    #[test]
    fn credential_is_an_alias_for_api_key() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.set("credential", "sk-test").unwrap();
        assert_eq!(store.load().api_key, "sk-test");
    }

    #[test]
    fn unknown_key_is_rejected_without_writing() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.set("language", "fr").unwrap();
        let before = fs::read_to_string(store.path()).unwrap();

        let err = store.set("bogus", "x").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PraiError>(),
            Some(PraiError::UnknownKey(k)) if k == "bogus"
        ));
        assert_eq!(fs::read_to_string(store.path()).unwrap(), before);
    }

    #[test]
    fn unknown_key_on_fresh_store_creates_no_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        assert!(store.set("bogus", "x").is_err());
        assert!(!store.path().exists());
    }

    #[test]
    fn reset_matches_first_load() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        let first = store.load();

        store.set("api_key", "sk-123").unwrap();
        store.set("template", "/tmp/tpl.md").unwrap();
        store.reset().unwrap();

        assert_eq!(store.load(), first);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"api_key": "sk-abc"}"#).unwrap();

        let settings = ConfigStore::new(&path).load();
        assert_eq!(settings.api_key, "sk-abc");
        assert_eq!(settings.template, DEFAULT_TEMPLATE);
        assert_eq!(settings.prompt, prompts::DEFAULT_PROMPT);
    }

    #[test]
    fn truncated_file_is_not_trusted() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"api_key": "sk-ab"#).unwrap();

        assert_eq!(ConfigStore::new(&path).load(), Settings::default());
    }

    #[test]
    fn saved_file_has_stable_key_order() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.set("language", "ja").unwrap();

        let text = fs::read_to_string(store.path()).unwrap();
        let positions: Vec<usize> = ["\"api_key\"", "\"language\"", "\"template\"", "\"prompt\""]
            .iter()
            .map(|k| text.find(k).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[cfg(unix)]
    #[test]
    fn saved_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.reset().unwrap();

        let mode = fs::metadata(store.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn language_comes_from_the_first_usable_locale_variable() {
        let env = |pairs: &'static [(&'static str, &'static str)]| {
            move |name: &str| {
                pairs
                    .iter()
                    .find(|(k, _)| *k == name)
                    .map(|(_, v)| v.to_string())
            }
        };

        assert_eq!(detect_language(env(&[("LANG", "ja_JP.UTF-8")])), "ja");
        assert_eq!(
            detect_language(env(&[("LC_ALL", "de_DE.UTF-8"), ("LANG", "ja_JP.UTF-8")])),
            "de"
        );
        assert_eq!(
            detect_language(env(&[("LC_ALL", "C"), ("LC_MESSAGES", "fr_FR")])),
            "fr"
        );
        assert_eq!(detect_language(env(&[("LANG", "POSIX")])), "en");
        assert_eq!(detect_language(env(&[])), "en");
    }

    #[test]
    fn secrets_are_masked() {
        assert_eq!(mask_secret(""), "(not set)");
        assert_eq!(mask_secret("sk-abcdef"), "sk-****");
    }
}
