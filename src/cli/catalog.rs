//! Catalog command implementation

use anyhow::Result;

use questfolio::config::Config;
use questfolio::progression::BuiltinAchievement;

/// List the achievements of the active catalog in evaluation order
pub fn catalog_command(config: &Config) -> Result<()> {
    let catalog = config.catalog()?;

    println!("Achievements ({}):\n", catalog.len());

    for achievement in catalog.iter() {
        let origin = match BuiltinAchievement::from_str(&achievement.id) {
            Some(_) => "builtin",
            None => "custom",
        };
        println!(
            "  {} {} [{}] +{} EXP ({})",
            achievement.icon, achievement.name, achievement.id, achievement.exp_reward, origin
        );
        if !achievement.description.is_empty() {
            println!("    {}", achievement.description);
        }
        println!("    Unlock: {}", achievement.condition);
    }

    println!("\nTotal reward: {} EXP", catalog.total_exp());

    Ok(())
}
