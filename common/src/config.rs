use std::{collections::HashMap, path::Path, path::PathBuf};

use anyhow::{anyhow, Context, Result};
use hocon::{Hocon, HoconLoader};
use log::warn;

/// Looks up configuration values by name.
///
/// Environment variables take precedence, then keys nested under `scope`, then top level keys.
#[derive(Debug)]
pub struct ConfigLoader {
    hocon: Hocon,
    env: HashMap<String, String>,
    scope: String,
}

impl ConfigLoader {
    pub fn new(path: impl AsRef<Path>, scope: String) -> Result<Self> {
        let path = path.as_ref();

        let hocon = HoconLoader::new()
            .load_file(path)
            .with_context(|| format!("Failed to find or load config file at: {:?}", path))?
            .hocon()
            .with_context(|| format!("Failed to parse config file at: {:?}", path))?;

        Ok(Self::from_hocon(hocon, scope))
    }

    /// Same as `new`, but a missing file yields a loader where every option falls back to its default.
    pub fn load_or_default(path: impl AsRef<Path>, scope: String) -> Result<Self> {
        let path = path.as_ref();

        if path.is_file() {
            return Self::new(path, scope);
        }

        warn!("Config file {:?} not found, using defaults", path);

        Self::from_source("{}", scope)
    }

    pub fn from_source(source: &str, scope: String) -> Result<Self> {
        let hocon = HoconLoader::new()
            .load_str(source)
            .context("Failed to load config source")?
            .hocon()
            .context("Failed to parse config source")?;

        Ok(Self::from_hocon(hocon, scope))
    }

    fn from_hocon(hocon: Hocon, scope: String) -> Self {
        let env = std::env::vars().collect::<HashMap<_, _>>();

        Self { hocon, env, scope }
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.env.get(name) {
            return Some(Value::String(value.clone()));
        }

        let scope = &self.hocon[self.scope.as_str()];
        if matches!(scope, Hocon::Hash(_)) {
            if let Some(value) = Self::map_hocon(scope, name) {
                return Some(value);
            }
        }

        Self::map_hocon(&self.hocon, name)
    }

    pub fn get_path(&self, name: &str) -> Option<PathBuf> {
        self.get(name)
            .and_then(|v| v.as_string())
            .map(PathBuf::from)
    }

    /// Reads `name` as a non-negative integer. A value that is present but not convertible is an
    /// error rather than a silent fallback to the default.
    pub fn get_usize(&self, name: &str) -> Result<Option<usize>> {
        self.get_as(name, "a non-negative integer", Value::as_usize)
    }

    pub fn get_f32(&self, name: &str) -> Result<Option<f32>> {
        self.get_as(name, "a number", Value::as_f32)
    }

    pub fn get_f64(&self, name: &str) -> Result<Option<f64>> {
        self.get_as(name, "a number", Value::as_f64)
    }

    pub fn get_bool(&self, name: &str) -> Result<Option<bool>> {
        self.get_as(name, "a boolean", Value::as_bool)
    }

    fn get_as<T>(
        &self,
        name: &str,
        expected: &str,
        convert: impl Fn(&Value) -> Option<T>,
    ) -> Result<Option<T>> {
        match self.get(name) {
            Some(value) => convert(&value).map(Some).ok_or_else(|| {
                anyhow!("Config key {} must be {}, got {:?}", name, expected, value)
            }),
            None => Ok(None),
        }
    }

    pub fn load<T: Config>(&self) -> Result<T> {
        let res = T::load(self)?;
        Ok(res)
    }

    fn map_hocon(hocon: &Hocon, name: &str) -> Option<Value> {
        match &hocon[name] {
            Hocon::Real(f64) => Some(Value::Float(*f64)),
            Hocon::Integer(i64) => Some(Value::Integer(*i64)),
            Hocon::String(string) => Some(Value::String(string.clone())),
            Hocon::Boolean(bool) => Some(Value::Boolean(*bool)),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum Value {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
}

impl Value {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(val) => Some(*val),
            Value::String(val) => Hocon::String(val.clone()).as_bool(),
            _ => None,
        }
    }

    pub fn as_usize(&self) -> Option<usize> {
        match self {
            Value::Integer(val) => usize::try_from(*val).ok(),
            Value::String(val) => val.parse::<usize>().ok(),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        self.as_f64().map(|val| val as f32)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(val) => Some(*val),
            Value::Integer(val) => Some(*val as f64),
            Value::String(val) => val.parse::<f64>().ok(),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<String> {
        match self {
            Value::String(val) => Some(val.clone()),
            Value::Boolean(true) => Some("true".to_string()),
            Value::Boolean(false) => Some("false".to_string()),
            Value::Float(val) => Some(val.to_string()),
            Value::Integer(val) => Some(val.to_string()),
        }
    }
}

pub trait Config {
    fn load(config: &ConfigLoader) -> Result<Self>
    where
        Self: Sized;
}

#[cfg(test)]
mod test {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    const SOURCE: &str = r#"
        learning_rate = 0.5
        batch_size = 32
        train {
            learning_rate = 0.01
            zero_init = true
            variant = "linear"
        }
    "#;

    #[test]
    fn test_scoped_value_shadows_top_level() {
        let config = ConfigLoader::from_source(SOURCE, "train".to_string()).unwrap();

        let learning_rate = config.get("learning_rate").and_then(|v| v.as_f32()).unwrap();

        assert_approx_eq!(learning_rate, 0.01, 1e-6);
    }

    #[test]
    fn test_falls_back_to_top_level() {
        let config = ConfigLoader::from_source(SOURCE, "train".to_string()).unwrap();

        assert_eq!(config.get("batch_size").and_then(|v| v.as_usize()), Some(32));
    }

    #[test]
    fn test_missing_scope_reads_top_level() {
        let config = ConfigLoader::from_source(SOURCE, "other".to_string()).unwrap();

        let learning_rate = config.get("learning_rate").and_then(|v| v.as_f32()).unwrap();

        assert_approx_eq!(learning_rate, 0.5, 1e-6);
    }

    #[test]
    fn test_value_conversions() {
        let config = ConfigLoader::from_source(SOURCE, "train".to_string()).unwrap();

        assert_eq!(config.get("zero_init").and_then(|v| v.as_bool()), Some(true));
        assert_eq!(
            config.get("variant").and_then(|v| v.as_string()),
            Some("linear".to_string())
        );
        assert!(config.get("missing_key").is_none());
    }

    #[test]
    fn test_env_overrides_file() {
        std::env::set_var("hexit_config_test_override", "7");
        let config = ConfigLoader::from_source(
            "train { hexit_config_test_override = 3 }",
            "train".to_string(),
        )
        .unwrap();

        assert_eq!(
            config
                .get("hexit_config_test_override")
                .and_then(|v| v.as_usize()),
            Some(7)
        );
    }

    #[test]
    fn test_negative_integer_is_not_a_usize() {
        let config =
            ConfigLoader::from_source("train { epochs = -1 }", "train".to_string()).unwrap();

        let value = config.get("epochs").unwrap();

        assert_eq!(value.as_usize(), None);
        assert_approx_eq!(value.as_f32().unwrap(), -1.0);
        assert!(config.get_usize("epochs").is_err());
    }

    #[test]
    fn test_typed_getters() {
        let config = ConfigLoader::from_source(SOURCE, "train".to_string()).unwrap();

        assert_eq!(config.get_usize("batch_size").unwrap(), Some(32));
        assert_eq!(config.get_bool("zero_init").unwrap(), Some(true));
        assert_eq!(config.get_f64("learning_rate").unwrap(), Some(0.01));
        assert_eq!(config.get_f32("missing_key").unwrap(), None);
        assert!(config.get_f32("variant").is_err());
        assert!(config.get_usize("learning_rate").is_err());
    }

    #[test]
    fn test_load_or_default_without_file() {
        let config =
            ConfigLoader::load_or_default("does/not/exist.conf", "train".to_string()).unwrap();

        assert!(config.get("learning_rate").is_none());
    }
}
