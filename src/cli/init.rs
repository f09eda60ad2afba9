//! Init command implementation

use anyhow::{bail, Result};
use std::path::PathBuf;

use questfolio::config::Config;

/// Default configuration content for questfolio init
pub const DEFAULT_CONFIG: &str = r#"# Questfolio Configuration
# =======================

# ============================================================================
# PROGRESSION - Leveling and achievement evaluation
# ============================================================================
#
# Available options:
#   base_exp_to_next_level - XP needed to reach level 2 (default: 100)
#   growth_factor          - Threshold multiplier per level-up, floored (default: 1.5)
#   remainder              - "carry" keeps surplus XP, "reset" drops it (default: "carry")
#   evaluation             - "single_pass" or "fixed_point" (default: "single_pass")

[progression]
base_exp_to_next_level = 100
growth_factor = 1.5
remainder = "carry"
evaluation = "single_pass"

# ============================================================================
# ACHIEVEMENTS - Optional replacement for the builtin catalog
# ============================================================================
#
# Entries are evaluated in the order they appear. Condition kinds:
#   projects_viewed, skills_viewed, experience_views, level, total_exp
#   (all take `at_least`), and all_others_unlocked.
#
# [[achievement]]
# id = "first_project"
# name = "Project Explorer"
# description = "View your first project"
# icon = "🚀"
# exp_reward = 50
# condition = { kind = "projects_viewed", at_least = 1 }
"#;

/// Write the default config file
pub fn init_command(config_path: Option<PathBuf>, force: bool) -> Result<()> {
    let config_path = config_path.unwrap_or_else(Config::global_config_path);

    if config_path.exists() && !force {
        bail!(
            "Configuration already exists: {}\nUse --force to overwrite.",
            config_path.display()
        );
    }

    if let Some(parent) = config_path.parent() {
        if !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    std::fs::write(&config_path, DEFAULT_CONFIG)?;
    println!("Created: {}", config_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_parses() {
        let config = Config::from_toml(DEFAULT_CONFIG).unwrap();
        assert!(config.achievements.is_empty());
        assert_eq!(config.progression.base_exp_to_next_level, 100);
    }
}
