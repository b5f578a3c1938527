//! Secret references in `config.toml`.
//!
//! The `api_key` value may point at a secret stored elsewhere:
//!
//! - `env::VAR_NAME` reads `$VAR_NAME`
//! - `pass::path/in/store` runs `pass show path/in/store` and keeps the first line
//! - anything else is the key itself

use std::process::Command;

/// A parsed secret value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretRef<'a> {
    Env(&'a str),
    Pass(&'a str),
    Plain(&'a str),
}

impl<'a> SecretRef<'a> {
    pub fn parse(value: &'a str) -> Self {
        if let Some(var) = value.strip_prefix("env::") {
            Self::Env(var)
        } else if let Some(path) = value.strip_prefix("pass::") {
            Self::Pass(path)
        } else {
            Self::Plain(value)
        }
    }

    /// True if the value names a secret instead of containing it.
    pub fn is_reference(&self) -> bool {
        !matches!(self, Self::Plain(_))
    }

    /// Produces the secret. Surrounding whitespace is trimmed and an empty
    /// secret is an error.
    pub fn resolve(&self) -> Result<String, String> {
        let secret = match *self {
            Self::Env(var) => std::env::var(var)
                .map_err(|_| format!("environment variable `{}` is not set", var))?,
            Self::Pass(path) => pass_show(path)?,
            Self::Plain(value) => value.to_string(),
        };

        let secret = secret.trim();
        if secret.is_empty() {
            return Err(match *self {
                Self::Env(var) => format!("environment variable `{}` is empty", var),
                Self::Pass(path) => format!("`pass show {}` produced no output", path),
                Self::Plain(_) => "value is empty".to_string(),
            });
        }
        Ok(secret.to_string())
    }
}

/// Resolves a value that may be a secret reference.
pub fn resolve(value: &str) -> Result<String, String> {
    SecretRef::parse(value).resolve()
}

fn pass_show(path: &str) -> Result<String, String> {
    let output = Command::new("pass")
        .arg("show")
        .arg(path)
        .output()
        .map_err(|e| format!("failed to run `pass show {}`: {}", path, e))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(format!(
            "`pass show {}` failed ({}): {}",
            path,
            output.status,
            stderr.trim()
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .unwrap_or_default()
        .to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_prefixes() {
        assert_eq!(SecretRef::parse("env::CAL_KEY"), SecretRef::Env("CAL_KEY"));
        assert_eq!(SecretRef::parse("pass::cal/eu"), SecretRef::Pass("cal/eu"));
        assert_eq!(SecretRef::parse("cal_live_abc"), SecretRef::Plain("cal_live_abc"));
        assert!(SecretRef::parse("env::X").is_reference());
        assert!(!SecretRef::parse("cal_live_abc").is_reference());
    }

    #[test]
    fn plain_value_is_returned_trimmed() {
        assert_eq!(resolve(" cal_live_abc\n").unwrap(), "cal_live_abc");
        assert!(resolve("   ").is_err());
    }

    #[test]
    fn env_reference_resolves() {
        unsafe {
            std::env::set_var("_CALEU_TEST_SECRET", "cal_live_from_env");
        }
        assert_eq!(resolve("env::_CALEU_TEST_SECRET").unwrap(), "cal_live_from_env");
        unsafe {
            std::env::remove_var("_CALEU_TEST_SECRET");
        }
    }

    #[test]
    fn missing_env_var_errors() {
        let err = resolve("env::_CALEU_NONEXISTENT_VAR_12345").unwrap_err();
        assert!(err.contains("not set"));
    }

    #[test]
    fn failing_pass_lookup_errors() {
        assert!(resolve("pass::caleu/entry/that/does/not/exist/12345").is_err());
    }
}
