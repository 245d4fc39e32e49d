//! Config for jsub.
//!
//! The config file is `jsub.yaml` in the user config directory
//! (e.g. `~/.config/jsub/jsub.yaml`). Every field is optional.
//!
//! ```yaml
//! version: 0.1.0
//! snapshot_path: ~/.local/share/jsub/accounts.json
//! session:
//!   timeout: 30s
//!   retry_limit: 4
//!   retry_interval: 2s
//! ```
//!
//! `snapshot_path` is shell-expanded. A relative path is resolved against
//! the data directory.

use std::fmt;
use std::time::Duration;

use anyhow::{anyhow, Context as _};
use getset::{CopyGetters, Getters};
use log::debug;
use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};

use jsub_util::{CONFIG_DIR, DATA_LOCAL_DIR};

use crate::abs_path::AbsPathBuf;
use crate::adapter::AdapterFactory;
use crate::{Console, Result, Session, VERSION};

#[derive(Serialize, Getters, Debug, Clone, PartialEq, Eq)]
pub struct Config {
    #[get = "pub"]
    path: AbsPathBuf,
    body: ConfigBody,
}

impl Config {
    /// Loads the config from the user config directory.
    pub fn load(cnsl: &mut Console) -> Result<Self> {
        Self::load_from(CONFIG_DIR.join(ConfigBody::FILE_NAME), cnsl)
    }

    /// Loads the config from `path`, falling back to defaults if it does not exist.
    pub fn load_from(path: AbsPathBuf, cnsl: &mut Console) -> Result<Self> {
        let body = if path.exists() {
            ConfigBody::load(&path, cnsl)?
        } else {
            debug!("No config file at {}, using defaults", path);
            ConfigBody::default()
        };
        Ok(Self { path, body })
    }

    pub fn session(&self) -> &SessionConfig {
        &self.body.session
    }

    pub fn snapshot_path(&self) -> Result<AbsPathBuf> {
        DATA_LOCAL_DIR
            .join_expand(&self.body.snapshot_path)
            .with_context(|| format!("Could not expand snapshot path : {}", self.body.snapshot_path))
    }

    /// Builds a session and loads the account snapshot into it.
    pub fn open_session(
        &self,
        factory: impl AdapterFactory + 'static,
        cnsl: &mut Console,
    ) -> Result<Session> {
        let mut session = Session::new(factory, self.session().clone());
        session
            .load_from(&self.snapshot_path()?, cnsl)
            .context("Could not load account snapshot")?;
        Ok(session)
    }

    pub fn save_session(&self, session: &Session, cnsl: &mut Console) -> Result<()> {
        session
            .save_to(&self.snapshot_path()?, cnsl)
            .context("Could not save account snapshot")
    }
}

impl fmt::Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let yaml_str = serde_yaml::to_string(&self.body).map_err(|_| fmt::Error)?;
        write!(f, "{}", yaml_str)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
struct ConfigBody {
    #[serde(with = "string_serde")]
    version: Version,
    snapshot_path: String,
    session: SessionConfig,
}

impl ConfigBody {
    const FILE_NAME: &'static str = "jsub.yaml";

    const DEFAULT_SNAPSHOT_PATH: &'static str = "accounts.json";

    fn load(path: &AbsPathBuf, cnsl: &mut Console) -> Result<Self> {
        let body: Self = path.load_pretty(
            |file| serde_yaml::from_reader(file).context("Could not read config file as yaml"),
            None,
            cnsl,
        )?;
        body.validate()?;
        Ok(body)
    }

    fn validate(&self) -> Result<()> {
        let version_req = VersionReq::parse(&self.version.to_string())
            .context("Could not parse version requirement")?;
        if !version_req.matches(&VERSION) {
            return Err(anyhow!(
                r#"Found mismatched version in config file.
    config version: {}
    jsub version  : {}
Fix the config file so that it is compatible with the current version of jsub."#,
                self.version,
                &*VERSION
            ));
        }
        Ok(())
    }
}

impl Default for ConfigBody {
    fn default() -> Self {
        Self {
            version: VERSION.clone(),
            snapshot_path: Self::DEFAULT_SNAPSHOT_PATH.into(),
            session: SessionConfig::default(),
        }
    }
}

/// Network policy handed to adapters when they are built.
#[derive(Serialize, Deserialize, Getters, CopyGetters, Debug, Clone, PartialEq, Eq, Hash)]
#[serde(default)]
pub struct SessionConfig {
    #[serde(with = "humantime_serde")]
    #[get_copy = "pub"]
    timeout: Duration,
    #[get_copy = "pub"]
    retry_limit: usize,
    #[serde(with = "humantime_serde")]
    #[get_copy = "pub"]
    retry_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            retry_limit: 4,
            retry_interval: Duration::from_secs(2),
        }
    }
}

mod string_serde {
    use std::fmt::Display;
    use std::str::FromStr;

    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<T, S>(value: &T, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Display,
        S: Serializer,
    {
        serializer.collect_str(value)
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<T, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        String::deserialize(deserializer)?
            .parse()
            .map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;
    use crate::adapter::AdapterRegistry;
    use crate::model::Account;

    fn write_config(dir: &AbsPathBuf, content: &str) -> anyhow::Result<AbsPathBuf> {
        let path = dir.join(ConfigBody::FILE_NAME);
        fs::write(&path, content)?;
        Ok(path)
    }

    #[test]
    fn test_missing_file_uses_defaults() -> anyhow::Result<()> {
        let test_dir = tempdir()?;
        let path = AbsPathBuf::try_new(test_dir.path())?.join(ConfigBody::FILE_NAME);
        let conf = Config::load_from(path, &mut Console::sink())?;
        assert_eq!(conf.session(), &SessionConfig::default());
        assert_eq!(conf.snapshot_path()?, DATA_LOCAL_DIR.join("accounts.json"));
        Ok(())
    }

    #[test]
    fn test_load_partial_file() -> anyhow::Result<()> {
        let test_dir = tempdir()?;
        let dir = AbsPathBuf::try_new(test_dir.path())?;
        let yaml = format!(
            "version: {}\nsnapshot_path: {}\nsession:\n  timeout: 5s\n",
            &*VERSION,
            dir.join("snap.json")
        );
        let path = write_config(&dir, &yaml)?;

        let mut cnsl = Console::buf();
        let conf = Config::load_from(path, &mut cnsl)?;
        assert_eq!(conf.session().timeout(), Duration::from_secs(5));
        assert_eq!(conf.session().retry_limit(), 4);
        assert_eq!(conf.snapshot_path()?, dir.join("snap.json"));
        assert!(cnsl.take_output()?.ends_with("... loaded\n"));
        Ok(())
    }

    #[test]
    fn test_mismatched_version_is_error() -> anyhow::Result<()> {
        let test_dir = tempdir()?;
        let dir = AbsPathBuf::try_new(test_dir.path())?;
        let path = write_config(&dir, "version: 99.0.0\n")?;
        let err = Config::load_from(path, &mut Console::sink()).unwrap_err();
        assert!(err.to_string().contains("mismatched version"));
        Ok(())
    }

    #[test]
    fn test_default_roundtrips_through_yaml() -> anyhow::Result<()> {
        let body = ConfigBody::default();
        let yaml = serde_yaml::to_string(&body)?;
        assert!(yaml.contains("timeout: 30s"));
        let actual: ConfigBody = serde_yaml::from_str(&yaml)?;
        assert_eq!(actual, body);
        Ok(())
    }

    #[test]
    fn test_open_and_save_session() -> anyhow::Result<()> {
        let test_dir = tempdir()?;
        let dir = AbsPathBuf::try_new(test_dir.path())?;
        let yaml = format!("snapshot_path: {}\n", dir.join("data/accounts.json"));
        let conf = Config::load_from(write_config(&dir, &yaml)?, &mut Console::sink())?;

        let mut session = conf.open_session(AdapterRegistry::new(), &mut Console::sink())?;
        assert!(session.accounts().is_empty());
        session.add(Account::new("uva", "alice"));
        conf.save_session(&session, &mut Console::sink())?;

        let reopened = conf.open_session(AdapterRegistry::new(), &mut Console::sink())?;
        assert_eq!(reopened.accounts(), session.accounts());
        Ok(())
    }
}
