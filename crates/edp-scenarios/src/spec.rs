use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Scenario specification driving a parametrization run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSpec {
    pub name: Option<String>,
    pub label: Option<String>,
    /// Scalar updates to apply; relative paths resolve against the spec file.
    pub path_scalars: PathBuf,
}

impl ScenarioSpec {
    pub fn display_name(&self) -> &str {
        self.label
            .as_deref()
            .or(self.name.as_deref())
            .unwrap_or("unnamed scenario")
    }
}

pub fn load_spec_from_path(path: &Path) -> Result<ScenarioSpec> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading scenario spec '{}'", path.display()))?;
    let mut spec: ScenarioSpec = match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
            serde_yaml::from_str(&data).context("parsing scenario spec yaml")?
        }
        Some(ext) if ext.eq_ignore_ascii_case("json") => {
            serde_json::from_str(&data).context("parsing scenario spec json")?
        }
        _ => serde_yaml::from_str(&data)
            .or_else(|_| serde_json::from_str(&data))
            .context("parsing scenario spec")?,
    };
    validate(&spec)?;
    if spec.path_scalars.is_relative() {
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        spec.path_scalars = base.join(&spec.path_scalars);
    }
    Ok(spec)
}

pub fn validate(spec: &ScenarioSpec) -> Result<()> {
    if spec.path_scalars.as_os_str().is_empty() {
        return Err(anyhow!("path_scalars cannot be empty"));
    }
    if let Some(name) = &spec.name {
        if name.trim().is_empty() {
            return Err(anyhow!("scenario name cannot be blank"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn loads_yaml_and_resolves_relative_path() {
        let dir = tempdir().unwrap();
        let spec_path = dir.path().join("base.yml");
        fs::write(
            &spec_path,
            "name: base\nlabel: Base 2050\npath_scalars: updates/base.csv\n",
        )
        .unwrap();
        let spec = load_spec_from_path(&spec_path).unwrap();
        assert_eq!(spec.name.as_deref(), Some("base"));
        assert_eq!(spec.display_name(), "Base 2050");
        assert_eq!(spec.path_scalars, dir.path().join("updates/base.csv"));
    }

    #[test]
    fn loads_json_with_absolute_path() {
        let dir = tempdir().unwrap();
        let spec_path = dir.path().join("spec.json");
        let target = dir.path().join("scalars.csv");
        let body = serde_json::json!({ "path_scalars": target });
        fs::write(&spec_path, body.to_string()).unwrap();
        let spec = load_spec_from_path(&spec_path).unwrap();
        assert_eq!(spec.path_scalars, target);
        assert_eq!(spec.display_name(), "unnamed scenario");
    }

    #[test]
    fn rejects_missing_path_scalars() {
        let dir = tempdir().unwrap();
        let spec_path = dir.path().join("broken.yaml");
        fs::write(&spec_path, "name: broken\n").unwrap();
        assert!(load_spec_from_path(&spec_path).is_err());
    }

    #[test]
    fn rejects_blank_name() {
        let spec = ScenarioSpec {
            name: Some("  ".into()),
            label: None,
            path_scalars: PathBuf::from("x.csv"),
        };
        assert!(validate(&spec).is_err());
    }
}
