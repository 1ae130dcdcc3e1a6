//! `tiffin config` subcommands.
//!
//! Handlers return the text to print so `main` owns stdout. Keys are dotted
//! paths into the TOML document (`assignment.priority_aging_hours`).

use std::path::PathBuf;

use tiffin_core::{Error, Result, TiffinConfig};

use crate::cli::ConfigAction;

/// Runs a config subcommand and returns its output.
pub fn handle_config_command(config_path: Option<&str>, action: ConfigAction) -> Result<String> {
    match action {
        ConfigAction::Path => config_path_report(config_path),
        ConfigAction::Get { key } => config_get(config_path, &key),
        ConfigAction::Set { key, value } => {
            let path = config_set(config_path, &key, &value)?;
            Ok(format!("Set {key} = {value} in {}", path.display()))
        }
        ConfigAction::Init { file, force } => {
            let path = config_init(file.as_deref(), force)?;
            Ok(format!("Config file created at {}", path.display()))
        }
        ConfigAction::Export { docker_env } => {
            let config = TiffinConfig::load(config_path)?;
            config_export(&config, docker_env)
        }
    }
}

/// The resolved config path, with a hint when the file is missing.
pub fn config_path_report(config_path: Option<&str>) -> Result<String> {
    let path = TiffinConfig::resolve_config_path(config_path)
        .ok_or_else(|| Error::config("Could not determine config directory for this platform"))?;
    if path.exists() {
        Ok(path.display().to_string())
    } else {
        Ok(format!(
            "{}\n(file does not exist; run `{} config init` to create it)",
            path.display(),
            TiffinConfig::project_name()
        ))
    }
}

/// Effective value of `key`, after env overrides.
pub fn config_get(config_path: Option<&str>, key: &str) -> Result<String> {
    let config = TiffinConfig::load(config_path)?;
    let document = toml::Value::try_from(&config).map_err(|e| Error::config(e.to_string()))?;
    get_dotted(&document, key)
        .map(display_value)
        .ok_or_else(|| Error::config(format!("Key '{key}' not found in configuration")))
}

/// Writes `key = value` into the config file.
///
/// The edited document must still parse as a valid configuration, so a
/// typo such as `server.port = eighty` is rejected before anything is
/// written.
pub fn config_set(config_path: Option<&str>, key: &str, value: &str) -> Result<PathBuf> {
    let path = TiffinConfig::resolve_config_path(config_path)
        .ok_or_else(|| Error::config("Could not determine config directory"))?;
    if !path.exists() {
        return Err(Error::config(format!(
            "Config file does not exist at {}. Run `{} config init` first.",
            path.display(),
            TiffinConfig::project_name()
        )));
    }

    let content = std::fs::read_to_string(&path)?;
    let mut document: toml::Value = toml::from_str(&content)
        .map_err(|e| Error::config(format!("Failed to parse {}: {e}", path.display())))?;
    set_dotted(&mut document, key, parse_scalar(value))?;

    let updated: TiffinConfig = document
        .clone()
        .try_into()
        .map_err(|e| Error::config(format!("Invalid value for {key}: {e}")))?;
    updated.validate()?;

    let text = toml::to_string_pretty(&document).map_err(|e| Error::config(e.to_string()))?;
    std::fs::write(&path, text)?;
    tracing::debug!(path = %path.display(), key, "Config value written");
    Ok(path)
}

/// Writes a default config file.
pub fn config_init(file: Option<&str>, force: bool) -> Result<PathBuf> {
    let path = match file {
        Some(p) => PathBuf::from(p),
        None => TiffinConfig::default_config_path()
            .ok_or_else(|| Error::config("Could not determine config directory"))?,
    };
    if path.exists() && !force {
        return Err(Error::config(format!(
            "Config file already exists at {}. Use --force to overwrite.",
            path.display()
        )));
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, TiffinConfig::default().to_toml_string()?)?;
    Ok(path)
}

/// `KEY=value` lines, or `--env KEY=value` for `docker run`.
pub fn config_export(config: &TiffinConfig, docker_env: bool) -> Result<String> {
    let lines: Vec<String> = config
        .to_env_vars()?
        .into_iter()
        .map(|(key, value)| {
            if docker_env {
                format!("--env {key}={value}")
            } else {
                format!("{key}={value}")
            }
        })
        .collect();
    Ok(lines.join("\n"))
}

fn get_dotted<'a>(value: &'a toml::Value, key: &str) -> Option<&'a toml::Value> {
    key.split('.')
        .try_fold(value, |current, part| current.as_table()?.get(part))
}

fn set_dotted(root: &mut toml::Value, key: &str, value: toml::Value) -> Result<()> {
    let mut parts: Vec<&str> = key.split('.').collect();
    let Some(last) = parts.pop().filter(|p| !p.is_empty()) else {
        return Err(Error::config("Empty key path"));
    };

    let mut current = root;
    for part in parts {
        let table = current
            .as_table_mut()
            .ok_or_else(|| Error::config(format!("Cannot navigate into '{part}'")))?;
        current = table
            .entry(part.to_string())
            .or_insert(toml::Value::Table(toml::Table::new()));
    }
    current
        .as_table_mut()
        .ok_or_else(|| Error::config(format!("Cannot set '{key}' on a non-table value")))?
        .insert(last.to_string(), value);
    Ok(())
}

/// Bool, then integer, then float, then string.
fn parse_scalar(s: &str) -> toml::Value {
    match s {
        "true" => toml::Value::Boolean(true),
        "false" => toml::Value::Boolean(false),
        _ => s
            .parse::<i64>()
            .map(toml::Value::Integer)
            .or_else(|_| s.parse::<f64>().map(toml::Value::Float))
            .unwrap_or_else(|_| toml::Value::String(s.to_string())),
    }
}

fn display_value(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        toml::Value::Array(_) | toml::Value::Table(_) => {
            toml::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
        }
        other => other.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn initialised() -> (TempDir, String) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tiffin").join("config.toml");
        let path = path.to_str().unwrap().to_string();
        config_init(Some(&path), false).unwrap();
        (dir, path)
    }

    #[test]
    fn test_init_writes_defaults_and_refuses_overwrite() {
        let (_dir, path) = initialised();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("[assignment]"));

        let err = config_init(Some(&path), false).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert!(config_init(Some(&path), true).is_ok());
    }

    #[test]
    fn test_set_then_get() {
        let (_dir, path) = initialised();
        config_set(Some(&path), "assignment.priority_aging_hours", "12").unwrap();
        assert_eq!(
            config_get(Some(&path), "assignment.priority_aging_hours").unwrap(),
            "12"
        );
        let parsed = TiffinConfig::from_file(std::path::Path::new(&path)).unwrap();
        assert_eq!(parsed.assignment.priority_aging_hours, 12);
    }

    #[test]
    fn test_set_rejects_wrong_type_without_writing() {
        let (_dir, path) = initialised();
        let before = std::fs::read_to_string(&path).unwrap();
        let err = config_set(Some(&path), "server.port", "eighty").unwrap_err();
        assert!(err.to_string().contains("server.port"));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    }

    #[test]
    fn test_set_rejects_invalid_config() {
        let (_dir, path) = initialised();
        assert!(config_set(Some(&path), "assignment.min_vendor_rating", "9.5").is_err());
    }

    #[test]
    fn test_set_requires_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.toml");
        let err = config_set(path.to_str(), "server.port", "8080").unwrap_err();
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_get_missing_key() {
        let (_dir, path) = initialised();
        let err = config_get(Some(&path), "server.nope").unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_export_formats() {
        let config = TiffinConfig::default();
        let plain = config_export(&config, false).unwrap();
        assert!(plain.lines().any(|l| l == "TIFFIN_SERVER_PORT=3000"));
        let docker = config_export(&config, true).unwrap();
        assert!(docker.lines().all(|l| l.starts_with("--env TIFFIN_")));
    }

    #[test]
    fn test_dotted_helpers() {
        let mut doc = toml::Value::Table(toml::Table::new());
        set_dotted(&mut doc, "server.port", toml::Value::Integer(8080)).unwrap();
        assert_eq!(
            get_dotted(&doc, "server.port"),
            Some(&toml::Value::Integer(8080))
        );
        assert!(get_dotted(&doc, "server.host").is_none());
        assert!(set_dotted(&mut doc, "server.port.inner", toml::Value::Integer(1)).is_err());
        assert!(set_dotted(&mut doc, "", toml::Value::Integer(1)).is_err());
    }

    #[test]
    fn test_parse_scalar() {
        assert_eq!(parse_scalar("true"), toml::Value::Boolean(true));
        assert_eq!(parse_scalar("42"), toml::Value::Integer(42));
        assert_eq!(parse_scalar("4.5"), toml::Value::Float(4.5));
        assert_eq!(
            parse_scalar("0.0.0.0"),
            toml::Value::String("0.0.0.0".into())
        );
    }
}
