//! INI file loading and saving.
//!
//! The on-disk format is the usual `[section]` / `key=value` layout with
//! `#` and `;` comments. Saving writes a backup of the previous file first.

use confsync_store::ConfigEntry;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;

type SectionMap = BTreeMap<String, BTreeMap<String, String>>;

/// Loads an INI file into a section map.
pub(crate) fn load(path: &Path) -> io::Result<SectionMap> {
    let text = fs::read_to_string(path)?;
    Ok(parse(&text))
}

/// Parses INI text. Keys outside any section are ignored.
fn parse(text: &str) -> SectionMap {
    let mut sections = SectionMap::new();
    let mut current: Option<String> = None;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }

        if let Some(rest) = line.strip_prefix('[') {
            if let Some(end) = rest.find(']') {
                let name = rest[..end].trim().to_string();
                sections.entry(name.clone()).or_default();
                current = Some(name);
            }
            continue;
        }

        let Some(section) = &current else { continue };
        if let Some((key, value)) = line.split_once('=') {
            sections
                .entry(section.clone())
                .or_default()
                .insert(key.trim().to_string(), value.trim().to_string());
        }
    }

    sections
}

/// Saves a snapshot back to the INI file, backing up the previous contents.
pub(crate) fn save(path: &Path, entries: &[ConfigEntry]) -> io::Result<()> {
    if path.exists() {
        let backup = backup_path(path);
        fs::copy(path, &backup)?;
        info!(backup = %backup.display(), "wrote configuration backup");
    }

    let epoch = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let mut out = String::new();
    let _ = writeln!(out, "# ConfSync managed configuration");
    let _ = writeln!(out, "# Written automatically at epoch {epoch}; manual edits may be overwritten");
    let _ = writeln!(out);

    let mut current_section: Option<&str> = None;
    for entry in entries {
        if current_section != Some(entry.section.as_str()) {
            if current_section.is_some() {
                let _ = writeln!(out);
            }
            let _ = writeln!(out, "[{}]", entry.section);
            current_section = Some(&entry.section);
        }
        let _ = writeln!(out, "{}={}", entry.key, entry.value);
    }

    fs::write(path, out)
}

fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".backup");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_sections_keys_and_comments() {
        let text = "\
# leading comment
orphan=ignored

[CONFIG_SYNC]
PEER_HOST = 192.168.4.10
PEER_PORT=12347
; another comment

[PWM]
PWM_MIN=1100
";
        let sections = parse(text);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections["CONFIG_SYNC"]["PEER_HOST"], "192.168.4.10");
        assert_eq!(sections["CONFIG_SYNC"]["PEER_PORT"], "12347");
        assert_eq!(sections["PWM"]["PWM_MIN"], "1100");
    }

    #[test]
    fn parse_keeps_empty_sections() {
        let sections = parse("[EMPTY]\n");
        assert!(sections.contains_key("EMPTY"));
        assert!(sections["EMPTY"].is_empty());
    }

    #[test]
    fn save_and_reload_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");

        let entries = vec![
            ConfigEntry::new("CONFIG_SYNC", "PEER_HOST", "192.168.4.10"),
            ConfigEntry::new("CONFIG_SYNC", "PEER_PORT", "12347"),
            ConfigEntry::new("PWM", "PWM_MIN", "1100"),
        ];
        save(&path, &entries).unwrap();

        let sections = load(&path).unwrap();
        assert_eq!(sections["CONFIG_SYNC"]["PEER_HOST"], "192.168.4.10");
        assert_eq!(sections["PWM"]["PWM_MIN"], "1100");
    }

    #[test]
    fn save_backs_up_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ini");
        fs::write(&path, "[OLD]\nKEY=1\n").unwrap();

        save(&path, &[ConfigEntry::new("NEW", "KEY", "2")]).unwrap();

        let backup = dir.path().join("config.ini.backup");
        assert!(backup.exists());
        let old = load(&backup).unwrap();
        assert_eq!(old["OLD"]["KEY"], "1");
    }

    #[test]
    fn load_missing_file_is_an_error() {
        assert!(load(Path::new("/nonexistent/config.ini")).is_err());
    }
}
