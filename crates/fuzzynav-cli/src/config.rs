//! Settings file – reads/writes `~/.fuzzynav/config.toml`.

use fuzzynav_control::AgentConfig;
use fuzzynav_control::presets::DEFAULT_MAX_SENSOR;
use fuzzynav_engine::system::DEFAULT_SAMPLING_RESOLUTION;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Persisted user configuration stored in `~/.fuzzynav/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Defuzzification samples for systems whose descriptor does not set one.
    #[serde(default = "default_sampling_resolution")]
    pub sampling_resolution: usize,

    /// Descriptor file for the speed system; empty uses the built-in preset.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub speed_system: String,

    /// Descriptor file for the turn system; empty uses the built-in preset.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub turn_system: String,

    /// Range of the distance sensors, used by the presets and by `/agent`.
    #[serde(default = "default_max_sensor_range")]
    pub max_sensor_range: f32,

    /// Arrival and safety thresholds of the steering agent.
    #[serde(default)]
    pub agent: AgentConfig,
}

fn default_sampling_resolution() -> usize {
    DEFAULT_SAMPLING_RESOLUTION
}
fn default_max_sensor_range() -> f32 {
    DEFAULT_MAX_SENSOR
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sampling_resolution: default_sampling_resolution(),
            speed_system: String::new(),
            turn_system: String::new(),
            max_sensor_range: default_max_sensor_range(),
            agent: AgentConfig::default(),
        }
    }
}

/// Return the path to `~/.fuzzynav/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".fuzzynav").join("config.toml")
}

/// Load the config from disk and apply environment overrides.  Returns
/// `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, String> {
    let mut cfg = load_from(&config_path())?;
    if let Some(cfg) = cfg.as_mut() {
        apply_env_overrides(cfg);
    }
    Ok(cfg)
}

/// Load the config from a specific path, without environment overrides.
pub(crate) fn load_from(path: &Path) -> Result<Option<Config>, String> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read config at {}: {}", path.display(), e))?;
    let cfg: Config =
        toml::from_str(&raw).map_err(|e| format!("Failed to parse config: {}", e))?;
    Ok(Some(cfg))
}

/// Apply `FUZZYNAV_*` environment variable overrides to `cfg`.
///
/// Unparsable numbers are ignored.
///
/// | Variable | Config field |
/// |---|---|
/// | `FUZZYNAV_SAMPLING_RESOLUTION` | `sampling_resolution` |
/// | `FUZZYNAV_SPEED_SYSTEM` | `speed_system` |
/// | `FUZZYNAV_TURN_SYSTEM` | `turn_system` |
/// | `FUZZYNAV_MAX_SENSOR_RANGE` | `max_sensor_range` |
/// | `FUZZYNAV_ARRIVE_RADIUS` | `agent.arrive_radius` |
/// | `FUZZYNAV_SAFETY_DISTANCE` | `agent.safety_distance` |
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("FUZZYNAV_SAMPLING_RESOLUTION")
        && let Ok(n) = v.parse::<usize>()
    {
        cfg.sampling_resolution = n;
    }
    if let Ok(v) = std::env::var("FUZZYNAV_SPEED_SYSTEM") {
        cfg.speed_system = v;
    }
    if let Ok(v) = std::env::var("FUZZYNAV_TURN_SYSTEM") {
        cfg.turn_system = v;
    }
    if let Ok(v) = std::env::var("FUZZYNAV_MAX_SENSOR_RANGE")
        && let Ok(r) = v.parse::<f32>()
    {
        cfg.max_sensor_range = r;
    }
    if let Ok(v) = std::env::var("FUZZYNAV_ARRIVE_RADIUS")
        && let Ok(r) = v.parse::<f32>()
    {
        cfg.agent.arrive_radius = r;
    }
    if let Ok(v) = std::env::var("FUZZYNAV_SAFETY_DISTANCE")
        && let Ok(d) = v.parse::<f32>()
    {
        cfg.agent.safety_distance = d;
    }
}

/// Save the config to disk, creating `~/.fuzzynav/` if necessary.
pub fn save(cfg: &Config) -> Result<(), String> {
    save_to(cfg, &config_path())
}

/// Save the config to a specific path.
pub(crate) fn save_to(cfg: &Config, path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| format!("Failed to create config directory: {}", e))?;
        // Owner-only (rwx------) on Unix: the file names the descriptors the
        // agent loads, so no other user may redirect them.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(parent, fs::Permissions::from_mode(0o700))
                .map_err(|e| format!("Failed to set config directory permissions: {}", e))?;
        }
    }
    let raw =
        toml::to_string_pretty(cfg).map_err(|e| format!("Failed to serialize config: {}", e))?;
    // Owner-only read/write (rw-------) on Unix.
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)
            .and_then(|mut f| {
                use std::io::Write;
                f.write_all(raw.as_bytes())
            })
            .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    }
    #[cfg(not(unix))]
    fs::write(path, raw)
        .map_err(|e| format!("Failed to write config at {}: {}", path.display(), e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[cfg(unix)]
    #[test]
    fn config_file_has_restrictive_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        save_to(&Config::default(), &path).expect("save");

        let file_mode = std::fs::metadata(&path).expect("file metadata").permissions().mode() & 0o777;
        assert_eq!(file_mode, 0o600, "config file must have 0o600 permissions");

        let dir_meta = std::fs::metadata(path.parent().unwrap()).expect("dir metadata");
        assert_eq!(dir_meta.permissions().mode() & 0o777, 0o700, "config directory must have 0o700 permissions");
    }

    #[test]
    fn roundtrip_default_config() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        save_to(&Config::default(), &path).expect("save");

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded.sampling_resolution, 60);
        assert_eq!(loaded.max_sensor_range, 5.0);
        assert!(loaded.speed_system.is_empty());
        assert_eq!(loaded.agent, AgentConfig::default());
    }

    #[test]
    fn roundtrip_custom_config() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("custom.toml");

        let cfg = Config {
            speed_system: "/opt/robot/speed.toml".to_string(),
            agent: AgentConfig {
                arrive_radius: 2.5,
                safety_distance: 0.4,
            },
            ..Config::default()
        };
        save_to(&cfg, &path).expect("save");

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded.speed_system, "/opt/robot/speed.toml");
        assert!(loaded.turn_system.is_empty());
        assert_eq!(loaded.agent.arrive_radius, 2.5);
        assert_eq!(loaded.agent.safety_distance, 0.4);
    }

    #[test]
    fn partial_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "max_sensor_range = 8.0\n\n[agent]\narrive_radius = 0.5\n").unwrap();

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded.max_sensor_range, 8.0);
        assert_eq!(loaded.sampling_resolution, 60);
        assert_eq!(loaded.agent.arrive_radius, 0.5);
        assert_eq!(loaded.agent.safety_distance, 0.6);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "sampling_resolution = \"many\"\n").unwrap();

        let err = load_from(&path).unwrap_err();
        assert!(err.starts_with("Failed to parse config"), "got {err}");
    }

    #[test]
    fn config_path_points_to_fuzzynav_dir() {
        let p = config_path_for_home("/home/testuser");
        assert!(p.to_string_lossy().contains(".fuzzynav"));
        assert!(p.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn load_from_returns_none_when_missing() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        assert!(load_from(&path).expect("no error").is_none());
    }

    #[test]
    fn apply_env_overrides_changes_speed_system() {
        // SAFETY: no other test touches this variable.
        unsafe { std::env::set_var("FUZZYNAV_SPEED_SYSTEM", "/tmp/speed.json") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.speed_system, "/tmp/speed.json");
        unsafe { std::env::remove_var("FUZZYNAV_SPEED_SYSTEM") };
    }

    #[test]
    fn apply_env_overrides_changes_sampling_resolution() {
        // SAFETY: no other test touches this variable.
        unsafe { std::env::set_var("FUZZYNAV_SAMPLING_RESOLUTION", "120") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.sampling_resolution, 120);
        unsafe { std::env::remove_var("FUZZYNAV_SAMPLING_RESOLUTION") };
    }

    #[test]
    fn apply_env_overrides_changes_arrive_radius() {
        // SAFETY: no other test touches this variable.
        unsafe { std::env::set_var("FUZZYNAV_ARRIVE_RADIUS", "3.5") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.agent.arrive_radius, 3.5);
        unsafe { std::env::remove_var("FUZZYNAV_ARRIVE_RADIUS") };
    }

    #[test]
    fn apply_env_overrides_ignores_invalid_number() {
        // SAFETY: no other test touches this variable.
        unsafe { std::env::set_var("FUZZYNAV_MAX_SENSOR_RANGE", "far") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.max_sensor_range, 5.0);
        unsafe { std::env::remove_var("FUZZYNAV_MAX_SENSOR_RANGE") };
    }
}
