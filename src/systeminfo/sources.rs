use std::fs;
use std::path::Path;

use crate::cmd;
use crate::error::{Error, Result};
use crate::keyfile::KeyFile;
use crate::textconf;

/// Machine word-size class published as `SystemType`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemType {
    Bits32,
    Bits64,
    Unknown,
}

impl SystemType {
    /// Classify `uname -m` output
    pub fn from_machine(machine: &str) -> Self {
        match machine.trim().to_lowercase().as_str() {
            "i386" | "i586" | "i686" => SystemType::Bits32,
            "x86_64" => SystemType::Bits64,
            _ => SystemType::Unknown,
        }
    }

    pub fn as_i64(self) -> i64 {
        match self {
            SystemType::Bits32 => 32,
            SystemType::Bits64 => 64,
            SystemType::Unknown => 0,
        }
    }
}

/// Processor description from /proc/cpuinfo, e.g. `Intel Xeon x 4`
pub fn processor(path: &Path) -> Result<String> {
    let content = fs::read_to_string(path).map_err(|e| Error::from_read(path, e))?;
    Ok(parse_cpuinfo(&content))
}

pub fn parse_cpuinfo(content: &str) -> String {
    let mut info = String::new();
    let mut count = 0usize;

    for line in content.lines().filter(|l| l.contains("model name")) {
        let fields: Vec<&str> = line.split(':').collect();
        if fields.len() != 2 {
            break;
        }
        count += 1;
        if info.is_empty() {
            info = fields[1].trim().to_string();
        }
    }

    if count > 1 {
        info = format!("{} x {}", info, count);
    }
    info.trim().to_string()
}

/// Installed memory in bytes; the kernel reports kibibytes
pub fn memory_cap(path: &Path) -> Result<u64> {
    let value = textconf::read_key(path, "MemTotal", ':')?;
    parse_mem_total(&value).map_err(|reason| Error::parse(path.display().to_string(), reason))
}

pub fn parse_mem_total(value: &str) -> std::result::Result<u64, String> {
    let kib = value
        .split_whitespace()
        .next()
        .ok_or_else(|| "MemTotal value is null".to_string())?;
    let kib: u64 = kib
        .parse()
        .map_err(|e| format!("MemTotal '{kib}': {e}"))?;
    kib.checked_mul(1024)
        .ok_or_else(|| format!("MemTotal {kib} kB overflows"))
}

/// `<Version> <Type>` from the deepin version key file
pub fn version_from_deepin(path: &Path, languages: &[String]) -> Result<String> {
    let kf = KeyFile::load(path)?;
    let version = kf.string("Release", "Version")?;
    let kind = kf.locale_string("Release", "Type", languages)?;
    Ok(format!("{} {}", version, kind))
}

pub fn version_from_lsb(path: &Path) -> Result<String> {
    let value = textconf::read_key(path, "DISTRIB_RELEASE", '=')?;
    if value.is_empty() {
        return Err(Error::parse(path.display().to_string(), "no DISTRIB_RELEASE"));
    }
    Ok(value)
}

/// Run the configured `uname -m` command line and classify the result
pub fn system_type(uname: &[String]) -> Result<SystemType> {
    let machine = cmd::run_argv(uname)?;
    Ok(SystemType::from_machine(&machine))
}
