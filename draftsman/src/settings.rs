const DOCUMENTATION: &str = r#"# Draftsman settings. You may edit this file, but be aware that formatting and comments will not
# be preserved, and all keys and values are case sensitive.

# history_limit: how many edits can be undone. Remove the key for no limit.
# log_level: one of "OFF", "ERROR", "WARN", "INFO", "DEBUG", "TRACE".

# Examples:
# history_limit = 500
# log_level = "DEBUG"

"#;

#[must_use]
pub fn preferences_dir() -> Option<std::path::PathBuf> {
    let mut base_dir = dirs::preference_dir()?;
    base_dir.push(env!("CARGO_PKG_NAME"));
    Some(base_dir)
}

#[derive(serde::Serialize, serde::Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Edits retained for undo, oldest are forgotten first. `None` retains everything.
    pub history_limit: Option<usize>,
    pub log_level: log::LevelFilter,
}
impl Default for Settings {
    fn default() -> Self {
        Self {
            history_limit: None,
            log_level: log::LevelFilter::Info,
        }
    }
}
impl Settings {
    const FILENAME: &'static str = "settings.toml";
    /// Settings from the user's preferences, or defaults if unavailable for some reason.
    #[must_use]
    pub fn load() -> Self {
        match preferences_dir() {
            None => {
                log::warn!("No preferences dir found, using default settings.");
                Self::default()
            }
            Some(mut dir) => {
                dir.push(Self::FILENAME);
                Self::load_or_default(&dir)
            }
        }
    }
    #[must_use]
    pub fn load_or_default(path: &std::path::Path) -> Self {
        let read = || -> anyhow::Result<Self> {
            let string = std::fs::read_to_string(path)?;
            Self::from_toml(&string)
        };
        match read() {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Failed to load settings from {path:?}, defaulting: {e:#}");
                Self::default()
            }
        }
    }
    pub fn from_toml(string: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(string)?)
    }
    /// Serialized settings, prefixed with some documentation.
    pub fn to_toml(&self) -> anyhow::Result<String> {
        let string = toml::ser::to_string_pretty(self)?;
        Ok(DOCUMENTATION.to_owned() + &string)
    }
    pub fn save(&self) -> anyhow::Result<()> {
        let preferences =
            preferences_dir().ok_or_else(|| anyhow::anyhow!("No preferences dir found"))?;
        // Explicity do *not* create recursively. If not found, the user probably has a good reason.
        // Ignore errors (could already exist). Any real errors will be emitted by file access below.
        let _ = std::fs::DirBuilder::new().create(&preferences);
        self.save_to(&preferences.join(Self::FILENAME))
    }
    pub fn save_to(&self, path: &std::path::Path) -> anyhow::Result<()> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::Settings;

    #[test]
    fn round_trip() {
        let settings = Settings {
            history_limit: Some(64),
            log_level: log::LevelFilter::Trace,
        };
        let string = settings.to_toml().unwrap();
        assert!(string.starts_with("# Draftsman settings."));
        assert_eq!(Settings::from_toml(&string).unwrap(), settings);
    }
    #[test]
    fn missing_keys_default() {
        let settings = Settings::from_toml("log_level = \"WARN\"").unwrap();
        assert_eq!(settings.history_limit, None);
        assert_eq!(settings.log_level, log::LevelFilter::Warn);
        assert_eq!(Settings::from_toml("").unwrap(), Settings::default());
    }
    #[test]
    fn bad_files_default() {
        let dir = std::env::temp_dir().join(format!("draftsman-test-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.toml");

        assert_eq!(Settings::load_or_default(&path), Settings::default());
        std::fs::write(&path, "history_limit = \"lots\"").unwrap();
        assert_eq!(Settings::load_or_default(&path), Settings::default());

        let settings = Settings {
            history_limit: Some(3),
            ..Settings::default()
        };
        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_or_default(&path), settings);
        let _ = std::fs::remove_dir_all(dir);
    }
}
