use std::path::{Path, PathBuf};

use motivate_core::models::rubric::RubricVersion;
use motivate_policy::config::PolicyConfig;
use motivate_policy::coverage::CoverageTracker;
use motivate_policy::gate::EndGate;
use motivate_scoring::config::ScoringConfig;
use serde::{Deserialize, Serialize};

/// Current config version. Bump this when adding fields or changing shape.
/// Each bump requires a corresponding entry in [`migrate`].
const CURRENT_VERSION: u32 = 1;

pub const ENV_MIN_TURN_THRESHOLD: &str = "MOTIVATE_MIN_TURN_THRESHOLD";
pub const ENV_END_TOKEN: &str = "MOTIVATE_END_TOKEN";
pub const ENV_RUBRIC_VERSION: &str = "MOTIVATE_RUBRIC_VERSION";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MotivateConfig {
    /// Schema version. Missing or 0 = pre-versioned config.
    pub config_version: u32,
    pub policy: PolicyConfig,
    pub scoring: ScoringConfig,
}

impl Default for MotivateConfig {
    fn default() -> Self {
        Self {
            config_version: CURRENT_VERSION,
            policy: PolicyConfig::default(),
            scoring: ScoringConfig::default(),
        }
    }
}

impl MotivateConfig {
    /// Build every matcher, tracker, and table once, surfacing any invalid
    /// phrase list, pattern, or band table.
    pub fn validate(&self) -> eyre::Result<()> {
        EndGate::from_config(&self.policy)?;
        CoverageTracker::new(&self.policy.coverage)?;
        self.scoring.validate()?;
        Ok(())
    }
}

fn config_dir() -> eyre::Result<PathBuf> {
    let base = dirs::config_dir().ok_or_else(|| eyre::eyre!("no config directory found"))?;
    Ok(base.join("motivate"))
}

pub fn default_config_path() -> eyre::Result<PathBuf> {
    Ok(config_dir()?.join("config.json"))
}

/// Resolve the effective configuration.
///
/// An explicit path must exist. Otherwise the per-user config file is used
/// when present, falling back to built-in defaults. Environment overrides
/// are applied last and the result is validated.
pub fn load_config(explicit: Option<&Path>) -> eyre::Result<MotivateConfig> {
    let mut config = match explicit {
        Some(path) => load_from_path(path)?,
        None => {
            let path = default_config_path()?;
            if path.exists() {
                load_from_path(&path)?
            } else {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                MotivateConfig::default()
            }
        }
    };

    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    config.validate()?;
    Ok(config)
}

pub fn load_from_path(path: &Path) -> eyre::Result<MotivateConfig> {
    let contents = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("failed to read config at {}: {e}", path.display()))?;

    // Parse as raw JSON so we can run migrations before deserializing.
    let json: serde_json::Value = serde_json::from_str(&contents)?;
    let on_disk_version = json
        .get("config_version")
        .and_then(|v| v.as_u64())
        .map_or(0, |v| u32::try_from(v).unwrap_or(u32::MAX));

    let migrated = migrate(json, on_disk_version)?;
    let config: MotivateConfig = serde_json::from_value(migrated)?;
    tracing::debug!(path = %path.display(), version = on_disk_version, "config loaded");
    Ok(config)
}

/// Run sequential migrations from `from_version` up to [`CURRENT_VERSION`].
///
/// Each migration is a pure transform on the raw JSON value.
pub fn migrate(mut json: serde_json::Value, from_version: u32) -> eyre::Result<serde_json::Value> {
    if from_version > CURRENT_VERSION {
        return Err(eyre::eyre!(
            "config_version {from_version} is newer than this build supports ({CURRENT_VERSION}). \
             Please update motivate."
        ));
    }

    // v0 → v1: the shape is unchanged, only the version stamp is added.
    if from_version < 1 {
        let obj = json
            .as_object_mut()
            .ok_or_else(|| eyre::eyre!("config is not a JSON object"))?;
        obj.insert(
            "config_version".to_string(),
            serde_json::Value::Number(1.into()),
        );
        tracing::info!("stamped unversioned config as v1");
    }

    Ok(json)
}

/// Apply `MOTIVATE_*` overrides. `lookup` is usually `std::env::var`.
pub fn apply_env_overrides(
    config: &mut MotivateConfig,
    lookup: impl Fn(&str) -> Option<String>,
) -> eyre::Result<()> {
    if let Some(raw) = lookup(ENV_MIN_TURN_THRESHOLD) {
        config.policy.min_turn_threshold = raw
            .trim()
            .parse()
            .map_err(|e| eyre::eyre!("{ENV_MIN_TURN_THRESHOLD}={raw:?} is not a turn count: {e}"))?;
    }
    if let Some(token) = lookup(ENV_END_TOKEN) {
        config.policy.end_token = token;
    }
    if let Some(raw) = lookup(ENV_RUBRIC_VERSION) {
        config.scoring.rubric_version = raw
            .parse::<RubricVersion>()
            .map_err(|e| eyre::eyre!("{ENV_RUBRIC_VERSION}: {e}"))?;
    }
    Ok(())
}

pub fn save_config(config: &MotivateConfig, path: &Path) -> eyre::Result<()> {
    let dir = path
        .parent()
        .ok_or_else(|| eyre::eyre!("config path {} has no parent", path.display()))?;
    std::fs::create_dir_all(dir)?;

    // Always write the current version, regardless of what was loaded.
    let mut stamped = config.clone();
    stamped.config_version = CURRENT_VERSION;

    let json = serde_json::to_string_pretty(&stamped)?;

    // Write to a temp file then rename for atomicity
    let tmp_path = path.with_extension("json.tmp");
    std::fs::write(&tmp_path, json.as_bytes())?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&tmp_path, std::fs::Permissions::from_mode(0o600))?;
    }

    std::fs::rename(&tmp_path, path)?;

    tracing::info!(path = %path.display(), "config saved");
    Ok(())
}

/// Write the default config to `path`. Refuses to clobber an existing file
/// unless `force` is set.
pub fn init_config(path: &Path, force: bool) -> eyre::Result<()> {
    if path.exists() && !force {
        return Err(eyre::eyre!(
            "config already exists at {}; pass --force to overwrite",
            path.display()
        ));
    }
    save_config(&MotivateConfig::default(), path)
}
