//! Template set loader.
//!
//! Built-in sets ship inside the binary. A workspace can add its own sets, or
//! shadow a built-in one, with `.chatread/prompts/<id>.yml`.

use crate::builder::compile_check;
use crate::types::TemplateSet;
use chatread_core::{AppError, AppResult};
use std::path::{Path, PathBuf};

/// Built-in template sets as (id, YAML source).
const BUILTIN_SETS: [(&str, &str); 4] = [
    ("default", include_str!("../templates/default.yml")),
    ("approach1", include_str!("../templates/approach1.yml")),
    ("approach2", include_str!("../templates/approach2.yml")),
    ("approach3", include_str!("../templates/approach3.yml")),
];

/// Load a template set by ID.
///
/// Looks for `<workspace>/.chatread/prompts/<id>.yml` first, then falls back
/// to the built-in sets.
///
/// # Example
/// ```no_run
/// use chatread_prompt::load_template_set;
/// use std::path::Path;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let set = load_template_set(Path::new("."), "approach2")?;
/// println!("Loaded template set: {}", set.title);
/// # Ok(())
/// # }
/// ```
pub fn load_template_set(workspace_path: &Path, id: &str) -> AppResult<TemplateSet> {
    let set_file = prompts_dir(workspace_path).join(format!("{}.yml", id));

    let set = if set_file.exists() {
        tracing::debug!("Loading template set from: {:?}", set_file);

        let contents = std::fs::read_to_string(&set_file).map_err(|e| {
            AppError::Prompt(format!(
                "Failed to read template set {:?}: {}",
                set_file, e
            ))
        })?;

        parse_template_set(&contents, &set_file.display().to_string())?
    } else {
        let (_, source) = BUILTIN_SETS
            .iter()
            .find(|(builtin_id, _)| *builtin_id == id)
            .ok_or_else(|| {
                AppError::Prompt(format!(
                    "Unknown template set '{}'. Available: {}",
                    id,
                    list_template_sets(workspace_path)
                        .unwrap_or_default()
                        .join(", ")
                ))
            })?;

        parse_template_set(source, &format!("built-in '{}'", id))?
    };

    if set.id != id {
        tracing::warn!(
            "Template set file '{}' declares id '{}'",
            id,
            set.id
        );
    }

    tracing::info!("Loaded template set: {} ({})", set.id, set.title);

    Ok(set)
}

/// List all available template set IDs, built-in and workspace, sorted.
pub fn list_template_sets(workspace_path: &Path) -> AppResult<Vec<String>> {
    let mut ids: Vec<String> = BUILTIN_SETS.iter().map(|(id, _)| id.to_string()).collect();

    let dir = prompts_dir(workspace_path);
    if dir.exists() {
        for entry in walkdir::WalkDir::new(&dir)
            .max_depth(1)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("yml") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    ids.push(stem.to_string());
                }
            }
        }
    }

    ids.sort();
    ids.dedup();
    Ok(ids)
}

fn prompts_dir(workspace_path: &Path) -> PathBuf {
    workspace_path.join(".chatread").join("prompts")
}

fn parse_template_set(contents: &str, origin: &str) -> AppResult<TemplateSet> {
    let set: TemplateSet = serde_yaml::from_str(contents).map_err(|e| {
        AppError::Prompt(format!("Failed to parse template set {}: {}", origin, e))
    })?;

    validate_template_set(&set)?;
    Ok(set)
}

/// Validate required fields and make sure both templates compile.
fn validate_template_set(set: &TemplateSet) -> AppResult<()> {
    if set.id.is_empty() {
        return Err(AppError::Prompt("Template set ID cannot be empty".to_string()));
    }

    if set.title.is_empty() {
        return Err(AppError::Prompt(format!(
            "Template set '{}' title cannot be empty",
            set.id
        )));
    }

    if !set.api_version.contains('.') {
        return Err(AppError::Prompt(format!(
            "Invalid apiVersion format: '{}'. Expected format: 'x.y'",
            set.api_version
        )));
    }

    if set.query_template.trim().is_empty() || set.answer_template.trim().is_empty() {
        return Err(AppError::Prompt(format!(
            "Template set '{}' must define queryTemplate and answerTemplate",
            set.id
        )));
    }

    compile_check(&set.query_template)?;
    compile_check(&set.answer_template)?;

    Ok(())
}
