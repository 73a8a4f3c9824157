use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThemeName {
    Dark,
    Light,
}

impl Default for ThemeName {
    fn default() -> Self {
        Self::Dark
    }
}

impl ThemeName {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dark => "dark",
            Self::Light => "light",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub theme: ThemeName,
    pub show_labels: bool,
    pub show_particles: bool,
    pub show_arrows: bool,
    pub focus_settle_ms: u64,
    pub camera_distance: f32,
    pub camera_flight_ms: u64,
    pub warmup_ticks: u32,
    pub cooldown_ticks: u32,
    pub socket_path: Option<String>,
    pub auto_connect: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            theme: ThemeName::Dark,
            show_labels: true,
            show_particles: true,
            show_arrows: true,
            focus_settle_ms: 300,
            camera_distance: 120.0,
            camera_flight_ms: 1200,
            warmup_ticks: 80,
            cooldown_ticks: 150,
            socket_path: None,
            auto_connect: true,
        }
    }
}

impl ViewerConfig {
    pub fn focus_settle(&self) -> Duration {
        Duration::from_millis(self.focus_settle_ms)
    }

    pub fn camera_flight(&self) -> Duration {
        Duration::from_millis(self.camera_flight_ms)
    }

    pub fn socket_path(&self) -> String {
        self.socket_path
            .clone()
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(default_sock_path)
    }
}

pub fn default_sock_path() -> String {
    if let Ok(dir) = std::env::var("XDG_RUNTIME_DIR") {
        format!("{dir}/riftgraph.sock")
    } else {
        "/tmp/riftgraph.sock".to_string()
    }
}

fn config_file_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "riftgraph")?;
    Some(proj.config_dir().join("viewer.toml"))
}

pub fn load_or_default() -> ViewerConfig {
    let Some(path) = config_file_path() else {
        return ViewerConfig::default();
    };
    load_or_default_from_path(&path)
}

fn load_or_default_from_path(path: &Path) -> ViewerConfig {
    let Ok(contents) = fs::read_to_string(path) else {
        return ViewerConfig::default();
    };
    match toml::from_str(&contents) {
        Ok(cfg) => cfg,
        Err(err) => {
            tracing::warn!(path = %path.display(), %err, "invalid viewer config, using defaults");
            ViewerConfig::default()
        }
    }
}

pub fn save(cfg: &ViewerConfig) -> anyhow::Result<()> {
    let Some(path) = config_file_path() else {
        return Err(anyhow::anyhow!("no config directory available"));
    };
    save_to_path(cfg, &path)
}

fn save_to_path(cfg: &ViewerConfig, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config directory {}", parent.display()))?;
    }
    let data = toml::to_string_pretty(cfg).context("failed to serialize viewer config")?;
    fs::write(path, data)
        .with_context(|| format!("failed to write viewer config {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn viewer_config_roundtrip_save_load() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("viewer.toml");
        let cfg = ViewerConfig {
            theme: ThemeName::Light,
            socket_path: Some("/tmp/other.sock".to_string()),
            ..ViewerConfig::default()
        };

        save_to_path(&cfg, &path).expect("save config");
        let loaded = load_or_default_from_path(&path);

        assert_eq!(cfg, loaded);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("viewer.toml");
        fs::write(&path, "theme = \"light\"\nfocus_settle_ms = 500\n").expect("write");

        let loaded = load_or_default_from_path(&path);
        assert_eq!(loaded.theme, ThemeName::Light);
        assert_eq!(loaded.focus_settle(), Duration::from_millis(500));
        assert_eq!(loaded.camera_flight_ms, 1200);
    }

    #[test]
    fn garbage_file_falls_back_to_defaults() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("viewer.toml");
        fs::write(&path, "theme = [").expect("write");

        assert_eq!(load_or_default_from_path(&path), ViewerConfig::default());
    }

    #[test]
    fn blank_socket_override_uses_default_path() {
        let cfg = ViewerConfig {
            socket_path: Some("  ".to_string()),
            ..ViewerConfig::default()
        };
        assert_eq!(cfg.socket_path(), default_sock_path());
    }
}
