use clap::Parser;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::store::Preset;

#[derive(Parser, Debug)]
#[command(
    name = "quillboard",
    about = "A blog and research collaboration server backed by one JSON file"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Host to bind to
    #[arg(long)]
    pub host: Option<String>,

    /// Port to bind to
    #[arg(short, long, env = "PORT")]
    pub port: Option<u16>,

    /// Path to data directory
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Demo content written when the store file does not exist yet
    #[arg(long, value_enum)]
    pub preset: Option<Preset>,
}

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub store: StoreConfig,
    pub auth: AuthConfig,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct StoreConfig {
    pub path: Option<PathBuf>,
    pub preset: Preset,
    /// Write to a sibling temp file and rename it over the store.
    pub atomic_writes: bool,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct AuthConfig {
    /// Caller name allowed to modify any aggregate.
    pub admin_name: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: None,
            preset: Preset::Blog,
            atomic_writes: true,
        }
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_name: "admin".to_string(),
        }
    }
}

impl Config {
    pub fn load(cli: &Cli) -> anyhow::Result<Self> {
        let data_dir = Self::data_dir(cli);
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| data_dir.join("config.toml"));

        let mut config = if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            toml::from_str(&content)?
        } else {
            Config::default()
        };

        // CLI overrides
        if let Some(ref host) = cli.host {
            config.server.host = host.clone();
        }
        if let Some(port) = cli.port {
            config.server.port = port;
        }
        if let Some(preset) = cli.preset {
            config.store.preset = preset;
        }

        // Resolve paths relative to data dir
        let store_path = match config.store.path.take() {
            None => data_dir.join("data.json"),
            Some(p) if p.is_relative() => data_dir.join(p),
            Some(p) => p,
        };
        config.store.path = Some(store_path);

        Ok(config)
    }

    pub fn data_dir(cli: &Cli) -> PathBuf {
        cli.data_dir.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".quillboard")
        })
    }

    pub fn store_path(&self) -> &Path {
        self.store
            .path
            .as_deref()
            .unwrap_or_else(|| Path::new("data.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli_with(data_dir: Option<PathBuf>) -> Cli {
        Cli {
            config: None,
            host: None,
            port: None,
            data_dir,
            preset: None,
        }
    }

    #[test]
    fn default_config_has_expected_values() {
        let config = Config::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.store.preset, Preset::Blog);
        assert!(config.store.atomic_writes);
        assert_eq!(config.auth.admin_name, "admin");
        assert!(config.store.path.is_none());
    }

    #[test]
    fn data_dir_uses_cli_override() {
        let cli = cli_with(Some(PathBuf::from("/tmp/test-quillboard")));
        assert_eq!(Config::data_dir(&cli), PathBuf::from("/tmp/test-quillboard"));
    }

    #[test]
    fn data_dir_defaults_to_dot_quillboard() {
        let dir = Config::data_dir(&cli_with(None));
        assert!(dir.ends_with(".quillboard"));
    }

    #[test]
    fn load_with_no_config_file_uses_defaults() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::load(&cli_with(Some(tmp.path().to_path_buf()))).unwrap();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.store_path(), tmp.path().join("data.json"));
    }

    #[test]
    fn load_applies_cli_overrides() {
        let tmp = tempfile::tempdir().unwrap();
        let cli = Cli {
            host: Some("127.0.0.1".to_string()),
            port: Some(8080),
            preset: Some(Preset::Research),
            ..cli_with(Some(tmp.path().to_path_buf()))
        };
        let config = Config::load(&cli).unwrap();
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.store.preset, Preset::Research);
    }

    #[test]
    fn load_reads_toml_file() {
        let tmp = tempfile::tempdir().unwrap();
        let config_path = tmp.path().join("config.toml");
        std::fs::write(
            &config_path,
            r#"
[server]
host = "192.168.1.1"
port = 9000

[store]
path = "board.json"
preset = "research"
atomic_writes = false

[auth]
admin_name = "root"
"#,
        )
        .unwrap();

        let cli = Cli {
            config: Some(config_path),
            ..cli_with(Some(tmp.path().to_path_buf()))
        };
        let config = Config::load(&cli).unwrap();
        assert_eq!(config.server.host, "192.168.1.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.store.preset, Preset::Research);
        assert!(!config.store.atomic_writes);
        assert_eq!(config.auth.admin_name, "root");
        assert_eq!(config.store_path(), tmp.path().join("board.json"));
    }

    #[test]
    fn cli_overrides_beat_toml_values() {
        let tmp = tempfile::tempdir().unwrap();
        let config_path = tmp.path().join("config.toml");
        std::fs::write(
            &config_path,
            r#"
[server]
host = "192.168.1.1"
port = 9000
"#,
        )
        .unwrap();

        let cli = Cli {
            config: Some(config_path),
            host: Some("10.0.0.1".to_string()),
            port: Some(4000),
            ..cli_with(Some(tmp.path().to_path_buf()))
        };
        let config = Config::load(&cli).unwrap();
        assert_eq!(config.server.host, "10.0.0.1");
        assert_eq!(config.server.port, 4000);
    }

    #[test]
    fn absolute_store_path_is_kept() {
        let tmp = tempfile::tempdir().unwrap();
        let absolute = tmp.path().join("elsewhere").join("store.json");
        let config_path = tmp.path().join("config.toml");
        std::fs::write(
            &config_path,
            format!("[store]\npath = {:?}\n", absolute.display().to_string()),
        )
        .unwrap();

        let cli = Cli {
            config: Some(config_path),
            ..cli_with(Some(tmp.path().join("data")))
        };
        let config = Config::load(&cli).unwrap();
        assert_eq!(config.store_path(), absolute.as_path());
    }
}
