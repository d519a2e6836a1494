use std::ffi::OsStr;
use std::process::Command;

use crate::error::{Error, Result};

/// Run a command and return its trimmed stdout.
///
/// A non-zero exit becomes `Error::Subprocess` carrying stdout and stderr
/// combined, so callers can log exactly what the tool complained about.
pub fn run_output<I, S>(program: &str, args: I) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    let args: Vec<_> = args.into_iter().collect();
    let args_str: Vec<_> = args.iter().map(|s| s.as_ref().to_string_lossy()).collect();

    tracing::debug!("> {} {}", program, args_str.join(" "));

    let output = Command::new(program)
        .args(&args)
        .output()
        .map_err(|e| Error::Subprocess {
            program: program.to_string(),
            output: e.to_string(),
        })?;

    if !output.status.success() {
        let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
        combined.push_str(&String::from_utf8_lossy(&output.stderr));
        let combined = combined.trim();
        return Err(Error::Subprocess {
            program: program.to_string(),
            output: if combined.is_empty() {
                format!("exit code {:?}", output.status.code())
            } else {
                combined.to_string()
            },
        });
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Run a configured command line (`argv[0]` is the program)
pub fn run_argv(argv: &[String]) -> Result<String> {
    let (program, args) = argv
        .split_first()
        .ok_or_else(|| Error::Config("empty command line".into()))?;
    run_output(program, args)
}
