use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::model::{StripLength, Theme};

/// Storage key of the settings blob. Bump the suffix on incompatible changes.
pub const SETTINGS_KEY: &str = "lp-settings-v1";

pub const DEFAULT_RSS_FEEDS: &[&str] = &[
    "https://feeds.bbci.co.uk/news/world/rss.xml",
    "https://hnrss.org/frontpage",
];

pub const DEFAULT_REDDIT_SUBS: &[&str] = &["upliftingnews", "todayilearned"];

pub const DEFAULT_COMIC_FEEDS: &[&str] = &["https://xkcd.com/rss.xml"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleFlags {
    pub news: bool,
    pub reddit: bool,
    pub comics: bool,
    pub quotes: bool,
    pub puzzle: bool,
}

impl Default for ModuleFlags {
    fn default() -> Self {
        Self {
            news: true,
            reddit: true,
            comics: true,
            quotes: true,
            puzzle: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    pub theme: Theme,
    pub modules: ModuleFlags,
    pub rss_feeds: Vec<String>,
    pub comic_feeds: Vec<String>,
    pub subreddits: Vec<String>,
    pub strip_length: StripLength,
}

fn owned(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            theme: Theme::Cozy,
            modules: ModuleFlags::default(),
            rss_feeds: owned(DEFAULT_RSS_FEEDS),
            comic_feeds: owned(DEFAULT_COMIC_FEEDS),
            subreddits: owned(DEFAULT_REDDIT_SUBS),
            strip_length: StripLength::Medium,
        }
    }
}

/// Lays a stored blob over the defaults. Each top-level key replaces its
/// default on its own; `modules` is merged flag by flag so a missing flag
/// keeps its default. A value that does not fit its key is dropped with a
/// warning and the default kept. Only a non-object blob is an error.
pub fn merge_onto_defaults(stored: Value) -> anyhow::Result<UserSettings> {
    let Value::Object(mut stored) = stored else {
        bail!("settings blob is not a JSON object");
    };

    let defaults = UserSettings::default();
    let modules = match stored.remove("modules") {
        None => defaults.modules,
        Some(Value::Object(mut flags)) => {
            let base = defaults.modules;
            ModuleFlags {
                news: take_or(&mut flags, "news", base.news),
                reddit: take_or(&mut flags, "reddit", base.reddit),
                comics: take_or(&mut flags, "comics", base.comics),
                quotes: take_or(&mut flags, "quotes", base.quotes),
                puzzle: take_or(&mut flags, "puzzle", base.puzzle),
            }
        }
        Some(other) => {
            warn!("Ignoring non-object modules in stored settings: {}", other);
            defaults.modules
        }
    };

    Ok(UserSettings {
        theme: take_or(&mut stored, "theme", defaults.theme),
        modules,
        rss_feeds: take_or(&mut stored, "rssFeeds", defaults.rss_feeds),
        comic_feeds: take_or(&mut stored, "comicFeeds", defaults.comic_feeds),
        subreddits: take_or(&mut stored, "subreddits", defaults.subreddits),
        strip_length: take_or(&mut stored, "stripLength", defaults.strip_length),
    })
}

fn take_or<T: DeserializeOwned>(
    stored: &mut Map<String, Value>,
    key: &str,
    default: T,
) -> T {
    let Some(value) = stored.remove(key) else {
        return default;
    };
    match serde_json::from_value(value) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Ignoring stored settings value {}: {}", key, e);
            default
        }
    }
}

/// File-backed home of the settings blob.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Store keeping `<dir>/lp-settings-v1.json`.
    pub fn in_dir<P: AsRef<Path>>(dir: P) -> Self {
        Self::new(dir.as_ref().join(format!("{}.json", SETTINGS_KEY)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the stored blob; `Ok(None)` when nothing has been saved yet.
    pub fn try_load(&self) -> anyhow::Result<Option<UserSettings>> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", self.path.display()));
            }
        };

        let stored: Value = serde_json::from_str(&raw)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        merge_onto_defaults(stored).map(Some)
    }

    /// Never fails: anything unusable means defaults.
    pub fn load(&self) -> UserSettings {
        match self.try_load() {
            Ok(Some(settings)) => {
                info!("Loaded settings from {}", self.path.display());
                settings
            }
            Ok(None) => {
                info!("No saved settings at {}, using defaults", self.path.display());
                UserSettings::default()
            }
            Err(e) => {
                warn!("Failed to load settings, using defaults: {:#}", e);
                UserSettings::default()
            }
        }
    }

    /// Writes the full settings object, replacing the previous blob in one
    /// rename.
    pub fn save(&self, settings: &UserSettings) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(settings)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, json).with_context(|| format!("writing {}", tmp.display()))?;
        std::fs::rename(&tmp, &self.path)
            .with_context(|| format!("replacing {}", self.path.display()))?;
        Ok(())
    }
}

/// The settings form as posted by the index page. Checkboxes are present
/// only when ticked; list fields hold one entry per line.
#[derive(Debug, Deserialize)]
pub struct SettingsForm {
    pub theme: Theme,
    pub strip_length: StripLength,
    #[serde(default)]
    pub news: Option<String>,
    #[serde(default)]
    pub reddit: Option<String>,
    #[serde(default)]
    pub comics: Option<String>,
    #[serde(default)]
    pub quotes: Option<String>,
    #[serde(default)]
    pub puzzle: Option<String>,
    #[serde(default)]
    pub rss_feeds: String,
    #[serde(default)]
    pub subreddits: String,
    #[serde(default)]
    pub comic_feeds: String,
}

fn lines_to_list(value: &str) -> Vec<String> {
    value
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

impl SettingsForm {
    pub fn into_settings(self) -> UserSettings {
        UserSettings {
            theme: self.theme,
            modules: ModuleFlags {
                news: self.news.is_some(),
                reddit: self.reddit.is_some(),
                comics: self.comics.is_some(),
                quotes: self.quotes.is_some(),
                puzzle: self.puzzle.is_some(),
            },
            rss_feeds: lines_to_list(&self.rss_feeds),
            comic_feeds: lines_to_list(&self.comic_feeds),
            subreddits: lines_to_list(&self.subreddits),
            strip_length: self.strip_length,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let settings = UserSettings::default();
        assert_eq!(settings.theme, Theme::Cozy);
        assert_eq!(settings.strip_length, StripLength::Medium);
        assert_eq!(settings.modules, ModuleFlags::default());
        assert_eq!(settings.rss_feeds.len(), 2);
        assert_eq!(settings.subreddits, vec!["upliftingnews", "todayilearned"]);
        assert_eq!(settings.comic_feeds, vec!["https://xkcd.com/rss.xml"]);
    }

    #[test]
    fn test_blob_shape_is_camel_case() {
        let value = serde_json::to_value(UserSettings::default()).unwrap();
        assert!(value.get("rssFeeds").is_some());
        assert!(value.get("comicFeeds").is_some());
        assert_eq!(value["stripLength"], "medium");
        assert_eq!(value["theme"], "cozy");
        assert_eq!(value["modules"]["puzzle"], true);
    }

    mod merge_tests {
        use super::*;

        #[test]
        fn test_missing_module_flag_keeps_default() {
            let stored = json!({
                "modules": { "news": false, "reddit": true, "comics": false, "quotes": false }
            });

            let settings = merge_onto_defaults(stored).unwrap();

            assert!(settings.modules.puzzle);
            assert!(!settings.modules.news);
            assert!(settings.modules.reddit);
            assert!(!settings.modules.comics);
            assert!(!settings.modules.quotes);
        }

        #[test]
        fn test_top_level_keys_replace_defaults() {
            let stored = json!({
                "theme": "playful",
                "rssFeeds": [],
                "stripLength": "long"
            });

            let settings = merge_onto_defaults(stored).unwrap();

            assert_eq!(settings.theme, Theme::Playful);
            assert!(settings.rss_feeds.is_empty());
            assert_eq!(settings.strip_length, StripLength::Long);
            assert_eq!(settings.subreddits, owned(DEFAULT_REDDIT_SUBS));
        }

        #[test]
        fn test_non_object_modules_is_ignored() {
            let settings = merge_onto_defaults(json!({ "modules": null, "theme": "minimal" })).unwrap();
            assert_eq!(settings.modules, ModuleFlags::default());
            assert_eq!(settings.theme, Theme::Minimal);
        }

        #[test]
        fn test_unknown_keys_are_tolerated() {
            let settings = merge_onto_defaults(json!({ "printerWidth": 576 })).unwrap();
            assert_eq!(settings, UserSettings::default());
        }

        #[test]
        fn test_non_object_blob_is_error() {
            assert!(merge_onto_defaults(json!([1, 2, 3])).is_err());
            assert!(merge_onto_defaults(json!("cozy")).is_err());
        }

        #[test]
        fn test_bad_value_keeps_only_that_default() {
            let stored = json!({
                "rssFeeds": ["https://mine.example.com/rss"],
                "theme": "playful",
                "stripLength": "xl"
            });

            let settings = merge_onto_defaults(stored).unwrap();

            assert_eq!(settings.rss_feeds, vec!["https://mine.example.com/rss"]);
            assert_eq!(settings.theme, Theme::Playful);
            assert_eq!(settings.strip_length, StripLength::Medium);
        }

        #[test]
        fn test_bad_values_of_every_kind() {
            let stored = json!({
                "theme": "neon",
                "subreddits": null,
                "comicFeeds": ["https://comics.example.com/rss"],
                "modules": { "news": "yes", "reddit": false }
            });

            let settings = merge_onto_defaults(stored).unwrap();

            assert_eq!(settings.theme, Theme::Cozy);
            assert_eq!(settings.subreddits, owned(DEFAULT_REDDIT_SUBS));
            assert_eq!(settings.comic_feeds, vec!["https://comics.example.com/rss"]);
            assert!(settings.modules.news);
            assert!(!settings.modules.reddit);
            assert!(settings.modules.puzzle);
        }
    }

    mod store_tests {
        use super::*;

        #[test]
        fn test_path_uses_storage_key() {
            let store = SettingsStore::in_dir("/tmp/printer");
            assert_eq!(store.path(), Path::new("/tmp/printer/lp-settings-v1.json"));
        }

        #[test]
        fn test_missing_blob_gives_defaults() {
            let dir = tempfile::tempdir().unwrap();
            let store = SettingsStore::in_dir(dir.path());

            assert!(store.try_load().unwrap().is_none());
            assert_eq!(store.load(), UserSettings::default());
        }

        #[test]
        fn test_save_then_load_round_trip() {
            let dir = tempfile::tempdir().unwrap();
            let store = SettingsStore::in_dir(dir.path());

            let settings = UserSettings {
                theme: Theme::Minimal,
                modules: ModuleFlags {
                    news: false,
                    reddit: true,
                    comics: false,
                    quotes: true,
                    puzzle: false,
                },
                rss_feeds: vec!["https://example.com/rss".to_string()],
                comic_feeds: vec![],
                subreddits: vec!["aww".to_string(), "books".to_string()],
                strip_length: StripLength::Short,
            };

            store.save(&settings).unwrap();
            assert_eq!(store.load(), settings);
            assert!(!dir.path().join("lp-settings-v1.json.tmp").exists());
        }

        #[test]
        fn test_save_overwrites_previous_blob() {
            let dir = tempfile::tempdir().unwrap();
            let store = SettingsStore::in_dir(dir.path());

            let mut settings = UserSettings::default();
            store.save(&settings).unwrap();
            settings.theme = Theme::Playful;
            store.save(&settings).unwrap();

            assert_eq!(store.load().theme, Theme::Playful);
        }

        #[test]
        fn test_unparsable_blob_gives_defaults() {
            let dir = tempfile::tempdir().unwrap();
            let store = SettingsStore::in_dir(dir.path());
            std::fs::write(store.path(), "{not json").unwrap();

            assert!(store.try_load().is_err());
            assert_eq!(store.load(), UserSettings::default());
        }

        #[test]
        fn test_partial_blob_on_disk_is_merged() {
            let dir = tempfile::tempdir().unwrap();
            let store = SettingsStore::in_dir(dir.path());
            std::fs::write(
                store.path(),
                r#"{"theme":"playful","modules":{"news":false}}"#,
            )
            .unwrap();

            let settings = store.load();
            assert_eq!(settings.theme, Theme::Playful);
            assert!(!settings.modules.news);
            assert!(settings.modules.puzzle);
            assert_eq!(settings.rss_feeds, owned(DEFAULT_RSS_FEEDS));
        }

        #[test]
        fn test_bad_value_on_disk_keeps_other_settings() {
            let dir = tempfile::tempdir().unwrap();
            let store = SettingsStore::in_dir(dir.path());
            std::fs::write(
                store.path(),
                r#"{"rssFeeds":["https://mine.example.com/rss"],"theme":"playful","stripLength":"xl"}"#,
            )
            .unwrap();

            let settings = store.load();
            assert_eq!(settings.rss_feeds, vec!["https://mine.example.com/rss"]);
            assert_eq!(settings.theme, Theme::Playful);
            assert_eq!(settings.strip_length, StripLength::Medium);
        }

        #[test]
        fn test_save_into_missing_dir_fails() {
            let store = SettingsStore::in_dir("/nonexistent/little-printer");
            assert!(store.save(&UserSettings::default()).is_err());
        }
    }

    mod form_tests {
        use super::*;

        #[test]
        fn test_form_into_settings() {
            let body = "theme=minimal&strip_length=long&news=on&puzzle=on\
                        &rss_feeds=https%3A%2F%2Fa.example.com%2Frss%0D%0A%0D%0A+https%3A%2F%2Fb.example.com%2Frss+\
                        &subreddits=aww&comic_feeds=";
            let form: SettingsForm = serde_urlencoded::from_str(body).unwrap();
            let settings = form.into_settings();

            assert_eq!(settings.theme, Theme::Minimal);
            assert_eq!(settings.strip_length, StripLength::Long);
            assert_eq!(
                settings.modules,
                ModuleFlags {
                    news: true,
                    reddit: false,
                    comics: false,
                    quotes: false,
                    puzzle: true,
                }
            );
            assert_eq!(
                settings.rss_feeds,
                vec!["https://a.example.com/rss", "https://b.example.com/rss"]
            );
            assert_eq!(settings.subreddits, vec!["aww"]);
            assert!(settings.comic_feeds.is_empty());
        }

        #[test]
        fn test_form_requires_theme() {
            let result: Result<SettingsForm, _> = serde_urlencoded::from_str("strip_length=short");
            assert!(result.is_err());
        }
    }
}
