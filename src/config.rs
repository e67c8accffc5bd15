use std::io::ErrorKind;
use std::path::PathBuf;
use std::{env, fs, io};

use chrono::Duration;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct Paths {
    pub template_dir: PathBuf,
    pub public_dir: PathBuf,
}

#[derive(Deserialize)]
pub struct ContentStore {
    pub project_id: String,
    pub dataset: String,
    pub api_host: Option<String>,
    pub api_version: Option<String>,
}

impl ContentStore {
    pub fn api_host(&self) -> &str {
        self.api_host.as_deref().unwrap_or("api.sanity.io")
    }

    pub fn api_version(&self) -> &str {
        self.api_version.as_deref().unwrap_or("2021-10-21")
    }
}

#[derive(Deserialize)]
pub struct Server {
    pub address: String,
    pub port: u16,
}

#[derive(Deserialize)]
pub struct Cache {
    pub revalidate_secs: Option<i64>,
}

#[derive(Deserialize)]
pub struct Log {
    pub level: LogLevel,
    pub log_to_console: bool,
    pub location: Option<PathBuf>,
}

#[derive(Deserialize, Copy, Clone)]
pub enum LogLevel {
    Critical = 0,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Deserialize)]
pub struct Feed {
    pub title: String,
    pub site_url: String,
    pub description: String,
}

#[derive(Deserialize)]
pub struct Config {
    pub content_store: ContentStore,
    pub server: Server,
    pub paths: Paths,
    pub cache: Option<Cache>,
    pub log: Option<Log>,
    pub feed: Option<Feed>,
}

impl Config {
    /// Staleness window for cached detail pages.
    pub fn revalidate_window(&self) -> Duration {
        let secs = self
            .cache
            .as_ref()
            .and_then(|c| c.revalidate_secs)
            .unwrap_or(60);
        Duration::seconds(secs.max(0))
    }
}

fn parse_path(path: PathBuf) -> PathBuf {
    if path.starts_with("${exe_dir}") {
        let cur_exe = env::current_exe().unwrap();
        let exe_dir = cur_exe.parent().unwrap().to_str().unwrap();
        let str_path = path.to_str().unwrap();
        PathBuf::from(str_path.replace("${exe_dir}", exe_dir))
    } else {
        path
    }
}

fn validate(cfg: &Config) -> io::Result<()> {
    if cfg.content_store.project_id.trim().is_empty() {
        return Err(io::Error::new(
            ErrorKind::InvalidData,
            "content_store.project_id must not be empty",
        ));
    }
    if cfg.content_store.dataset.trim().is_empty() {
        return Err(io::Error::new(
            ErrorKind::InvalidData,
            "content_store.dataset must not be empty",
        ));
    }
    Ok(())
}

pub fn read_config(cfg_path: &PathBuf) -> io::Result<Config> {
    let cfg_content = match fs::read_to_string(cfg_path) {
        Ok(content) => content,
        Err(e) => return Err(io::Error::new(e.kind(), format!("Error opening configuration file {}: {}", cfg_path.to_str().unwrap(), e))),
    };

    parse_config(cfg_content.as_str())
}

pub fn parse_config(cfg_content: &str) -> io::Result<Config> {
    let mut cfg: Config = match toml::from_str::<Config>(cfg_content) {
        Ok(cfg) => cfg,
        Err(e) => return Err(io::Error::new(
            ErrorKind::InvalidData, format!("Error parsing configuration file: {}", e))),
    };

    validate(&cfg)?;

    cfg.paths = Paths {
        template_dir: parse_path(cfg.paths.template_dir),
        public_dir: parse_path(cfg.paths.public_dir),
    };

    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL_CONFIG: &str = r#"
[content_store]
project_id = "abc123"
dataset = "production"

[server]
address = "0.0.0.0"
port = 8001

[paths]
template_dir = "res/template"
public_dir = "res/public"

[cache]
revalidate_secs = 120

[feed]
title = "stormlog"
site_url = "https://stormlog.example"
description = "write, read and connect"
"#;

    #[test]
    fn parses_full_config() {
        let cfg = parse_config(FULL_CONFIG).unwrap();
        assert_eq!(cfg.content_store.project_id, "abc123");
        assert_eq!(cfg.content_store.dataset, "production");
        assert_eq!(cfg.content_store.api_host(), "api.sanity.io");
        assert_eq!(cfg.content_store.api_version(), "2021-10-21");
        assert_eq!(cfg.server.port, 8001);
        assert_eq!(cfg.revalidate_window(), Duration::seconds(120));
        assert_eq!(cfg.feed.unwrap().title, "stormlog");
    }

    #[test]
    fn window_defaults_to_sixty_seconds() {
        let minimal = FULL_CONFIG.replace("revalidate_secs = 120", "");
        let cfg = parse_config(&minimal).unwrap();
        assert_eq!(cfg.revalidate_window(), Duration::seconds(60));
    }

    #[test]
    fn missing_store_section_is_an_error() {
        let broken = FULL_CONFIG.replace("[content_store]", "[something_else]");
        assert!(parse_config(&broken).is_err());
    }

    #[test]
    fn empty_project_id_is_an_error() {
        let broken = FULL_CONFIG.replace(r#"project_id = "abc123""#, r#"project_id = "  ""#);
        let err = parse_config(&broken).err().unwrap();
        assert!(err.to_string().contains("project_id"));
    }

    #[test]
    fn empty_dataset_is_an_error() {
        let broken = FULL_CONFIG.replace(r#"dataset = "production""#, r#"dataset = """#);
        let err = parse_config(&broken).err().unwrap();
        assert!(err.to_string().contains("dataset"));
    }
}
