//! Line-oriented `KEY<delim>VALUE` files: /etc/default/locale, /etc/lsb-release, /proc/meminfo

use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

/// Value of the first line starting with `<key><delimiter>`, trimmed.
///
/// Leading whitespace before the key is ignored. Returns an empty string
/// when no line matches or the matching line splits into more than two
/// parts on `delimiter`.
pub fn read_key(path: &Path, key: &str, delimiter: char) -> Result<String> {
    let content = fs::read_to_string(path).map_err(|e| Error::from_read(path, e))?;
    Ok(find_key(&content, key, delimiter))
}

pub fn find_key(content: &str, key: &str, delimiter: char) -> String {
    for line in content.lines() {
        let Some(rest) = line.trim_start().strip_prefix(key) else {
            continue;
        };
        // Tolerate padding between key and delimiter ("MemTotal :")
        let Some(value) = rest.trim_start().strip_prefix(delimiter) else {
            continue;
        };
        if value.contains(delimiter) {
            return String::new();
        }
        return value.trim().to_string();
    }
    String::new()
}

/// Language tag from the first `LANG=` line, without its codeset.
///
/// `LANG=fr_FR.UTF-8` gives `fr_FR`. A file without `LANG=` gives an empty
/// string; only an unreadable file is an error.
pub fn read_locale(path: &Path) -> Result<String> {
    let content = fs::read_to_string(path).map_err(|e| Error::from_read(path, e))?;
    Ok(parse_locale(&content))
}

pub fn parse_locale(content: &str) -> String {
    content
        .lines()
        .find_map(|line| line.strip_prefix("LANG="))
        .map(|value| value.split('.').next().unwrap_or_default().to_string())
        .unwrap_or_default()
}
