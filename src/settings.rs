//! Persisted key-value settings.
//!
//! One env-format file (`KEY=VALUE` lines) read at startup and selectively
//! rewritten by key, e.g. to record a freshly resolved subaccount address
//! for later runs. Writes are append-or-replace by key name; comments and
//! unrelated lines survive a rewrite byte for byte. Access is
//! single-threaded by construction (the system runs one step at a time),
//! so there is no locking here.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tracing::info;

use crate::error::Result;

/// Settings key recording the resolved subaccount address.
pub const SUBACCOUNT_ADDRESS_KEY: &str = "SUBACCOUNT_ADDRESS";

/// An env-format settings file with an explicit read/write contract.
#[derive(Debug)]
pub struct Settings {
    path: PathBuf,
    lines: Vec<String>,
}

impl Settings {
    /// Loads the file at `path`. A missing file is an empty store, not an
    /// error; the first write creates it.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let lines = match fs::read_to_string(&path) {
            Ok(content) => content.lines().map(str::to_string).collect(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, lines })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Value of `key`, if present. Comment lines are ignored.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.lines
            .iter()
            .filter(|line| !line.trim_start().starts_with('#'))
            .find_map(|line| {
                let (k, v) = line.split_once('=')?;
                (k.trim() == key).then(|| v.trim())
            })
    }

    /// Like [`Settings::get`], but a missing or empty value is a fatal
    /// configuration error.
    pub fn require(&self, key: &'static str) -> Result<&str> {
        match self.get(key) {
            Some(value) if !value.is_empty() => Ok(value),
            _ => Err(crate::error::OnboardError::MissingSetting(key)),
        }
    }

    /// Sets `key` to `value` and persists the file: the first existing
    /// `key=` line is replaced in place, otherwise the pair is appended.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let entry = format!("{key}={value}");
        let existing = self
            .lines
            .iter()
            .position(|line| !line.trim_start().starts_with('#') && line_key(line) == Some(key));
        match existing {
            Some(index) => self.lines[index] = entry,
            None => self.lines.push(entry),
        }
        self.save()?;
        info!(key, value, path = %self.path.display(), "setting persisted");
        Ok(())
    }

    fn save(&self) -> Result<()> {
        let mut content = self.lines.join("\n");
        content.push('\n');
        fs::write(&self.path, content)?;
        Ok(())
    }
}

fn line_key(line: &str) -> Option<&str> {
    line.split_once('=').map(|(k, _)| k.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("decibel-onboard-{}-{name}", std::process::id()))
    }

    #[test]
    fn test_missing_file_is_empty_store() {
        let settings = Settings::load(temp_path("missing.env")).unwrap();
        assert_eq!(settings.get("SUBACCOUNT_ADDRESS"), None);
    }

    #[test]
    fn test_set_replaces_by_key_and_preserves_rest() {
        let path = temp_path("replace.env");
        fs::write(
            &path,
            "# onboarding credentials\nAPI_WALLET_ADDRESS=0xb540\nSUBACCOUNT_ADDRESS=0xold\n",
        )
        .unwrap();

        let mut settings = Settings::load(&path).unwrap();
        settings.set(SUBACCOUNT_ADDRESS_KEY, "0xnew").unwrap();

        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(
            written,
            "# onboarding credentials\nAPI_WALLET_ADDRESS=0xb540\nSUBACCOUNT_ADDRESS=0xnew\n"
        );
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_set_appends_missing_key() {
        let path = temp_path("append.env");
        fs::write(&path, "API_WALLET_ADDRESS=0xb540\n").unwrap();

        let mut settings = Settings::load(&path).unwrap();
        settings.set("MARKET_NAME", "BTC-PERP").unwrap();

        assert_eq!(settings.get("MARKET_NAME"), Some("BTC-PERP"));
        let written = fs::read_to_string(&path).unwrap();
        assert_eq!(written, "API_WALLET_ADDRESS=0xb540\nMARKET_NAME=BTC-PERP\n");
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_require_missing_or_empty_is_fatal() {
        let path = temp_path("require.env");
        fs::write(&path, "SUBACCOUNT_ADDRESS=\n").unwrap();

        let settings = Settings::load(&path).unwrap();
        assert!(settings.require(SUBACCOUNT_ADDRESS_KEY).is_err());
        assert!(settings.require("MARKET_NAME").is_err());
        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_get_ignores_comments() {
        let path = temp_path("comments.env");
        fs::write(&path, "# MARKET_NAME=FAKE\nMARKET_NAME=BTC-PERP\n").unwrap();

        let settings = Settings::load(&path).unwrap();
        assert_eq!(settings.get("MARKET_NAME"), Some("BTC-PERP"));
        fs::remove_file(&path).unwrap();
    }
}
