//! Desktop-entry style key files with translated values (`Key[fr_FR]=...`)

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

#[derive(Debug, Default, Clone)]
pub struct KeyFile {
    groups: HashMap<String, HashMap<String, String>>,
}

impl KeyFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::from_read(path, e))?;
        Self::parse(&content).map_err(|reason| Error::parse(path.display().to_string(), reason))
    }

    /// Parse key file text. Translated keys are kept verbatim (`Type[zh_CN]`).
    pub fn parse(content: &str) -> std::result::Result<Self, String> {
        let mut groups: HashMap<String, HashMap<String, String>> = HashMap::new();
        let mut current: Option<String> = None;

        for (n, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if let Some(name) = line.strip_prefix('[') {
                let name = name
                    .strip_suffix(']')
                    .ok_or_else(|| format!("line {}: unterminated group header", n + 1))?;
                groups.entry(name.to_string()).or_default();
                current = Some(name.to_string());
                continue;
            }

            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| format!("line {}: expected key=value", n + 1))?;
            let group = current
                .as_ref()
                .ok_or_else(|| format!("line {}: key outside of a group", n + 1))?;
            if let Some(entries) = groups.get_mut(group) {
                entries.insert(key.trim().to_string(), unescape(value.trim()));
            }
        }

        Ok(Self { groups })
    }

    pub fn string(&self, group: &str, key: &str) -> Result<String> {
        let entries = self
            .groups
            .get(group)
            .ok_or_else(|| Error::not_found(format!("group [{group}]")))?;
        entries
            .get(key)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("key {key} in [{group}]")))
    }

    /// Translated value for the first matching language, else the plain value
    pub fn locale_string(&self, group: &str, key: &str, languages: &[String]) -> Result<String> {
        if let Some(entries) = self.groups.get(group) {
            for lang in languages {
                for variant in locale_variants(lang) {
                    if let Some(value) = entries.get(&format!("{key}[{variant}]")) {
                        return Ok(value.clone());
                    }
                }
            }
        }
        self.string(group, key)
    }
}

fn unescape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('s') => out.push(' '),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Expand `ll_CC.codeset@mod` into lookup keys, most specific first
pub fn locale_variants(locale: &str) -> Vec<String> {
    let (rest, modifier) = match locale.split_once('@') {
        Some((r, m)) => (r, Some(m)),
        None => (locale, None),
    };
    let (rest, codeset) = match rest.split_once('.') {
        Some((r, c)) => (r, Some(c)),
        None => (rest, None),
    };
    let (lang, territory) = match rest.split_once('_') {
        Some((l, t)) => (l, Some(t)),
        None => (rest, None),
    };

    let mut variants = Vec::new();
    // bit 2 modifier, bit 1 territory, bit 0 codeset; glib order
    for mask in (0..8u8).rev() {
        if mask & 4 != 0 && modifier.is_none()
            || mask & 2 != 0 && territory.is_none()
            || mask & 1 != 0 && codeset.is_none()
        {
            continue;
        }
        let mut v = lang.to_string();
        if mask & 2 != 0 {
            v.push('_');
            v.push_str(territory.unwrap_or_default());
        }
        if mask & 1 != 0 {
            v.push('.');
            v.push_str(codeset.unwrap_or_default());
        }
        if mask & 4 != 0 {
            v.push('@');
            v.push_str(modifier.unwrap_or_default());
        }
        variants.push(v);
    }
    variants
}

/// Language names in gettext precedence: LANGUAGE, LC_ALL, LC_MESSAGES, LANG
pub fn language_names() -> Vec<String> {
    let mut names = Vec::new();
    if let Ok(list) = std::env::var("LANGUAGE") {
        names.extend(list.split(':').filter(|s| !s.is_empty()).map(String::from));
    }
    for var in ["LC_ALL", "LC_MESSAGES", "LANG"] {
        if let Ok(value) = std::env::var(var) {
            if !value.is_empty() {
                names.push(value);
                break;
            }
        }
    }
    names.retain(|n| n != "C" && n != "POSIX");
    names
}
