use crate::config::EditorConfigOverrides;
use anyhow::{anyhow, bail, Result};
use std::env;
use std::path::PathBuf;

/// Flags shared by the tools plus the positional arguments left after them.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CliOverrides {
    config: Option<PathBuf>,
    data_root: Option<PathBuf>,
    encoding: Option<String>,
    zone: Option<PathBuf>,
    positional: Vec<String>,
}

impl CliOverrides {
    pub fn parse_from_env() -> Result<Self> {
        Self::parse(env::args())
    }

    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut overrides = CliOverrides::default();
        let mut iter = args.into_iter();
        let _ = iter.next(); // skip program name if present
        while let Some(raw) = iter.next() {
            let arg = raw.as_ref();
            let Some(key) = arg.strip_prefix("--") else {
                overrides.positional.push(arg.to_string());
                continue;
            };
            let value = iter.next().ok_or_else(|| anyhow!("Expected a value after '{arg}'"))?.as_ref().to_string();
            match key {
                "config" => overrides.config = Some(PathBuf::from(value)),
                "data-root" => overrides.data_root = Some(PathBuf::from(value)),
                "encoding" => {
                    if value.is_empty() {
                        bail!("Invalid encoding ''. Use a label such as euc-kr or windows-1252.");
                    }
                    overrides.encoding = Some(value);
                }
                "zone" => overrides.zone = Some(PathBuf::from(value)),
                _ => bail!("Unknown flag '{arg}'. Supported flags: --config, --data-root, --encoding, --zone."),
            }
        }
        Ok(overrides)
    }

    pub fn config_path(&self) -> Option<&PathBuf> {
        self.config.as_ref()
    }

    pub fn positional(&self) -> &[String] {
        &self.positional
    }

    pub fn into_config_overrides(self) -> EditorConfigOverrides {
        EditorConfigOverrides { data_root: self.data_root, text_encoding: self.encoding, zone: self.zone }
    }
}
