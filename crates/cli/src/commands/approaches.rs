//! Approaches command handler.
//!
//! Lists the template sets the ask command can answer with.

use chatread_core::{config::AppConfig, AppResult};
use chatread_prompt::{list_template_sets, load_template_set};
use clap::Args;

/// List available template sets
#[derive(Args, Debug)]
pub struct ApproachesCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl ApproachesCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing approaches command");

        let ids = list_template_sets(&config.workspace)?;
        let mut sets = Vec::with_capacity(ids.len());
        for id in &ids {
            sets.push(load_template_set(&config.workspace, id)?);
        }

        if self.json {
            let output: Vec<_> = sets
                .iter()
                .map(|set| {
                    serde_json::json!({
                        "id": set.id,
                        "title": set.title,
                        "description": set.description,
                        "active": set.id == config.approach,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            for set in &sets {
                let marker = if set.id == config.approach { "*" } else { " " };
                println!("{} {:<12} {}", marker, set.id, set.title);
            }
        }

        Ok(())
    }
}
