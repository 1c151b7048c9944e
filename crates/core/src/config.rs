//! Configuration management for chatread.
//!
//! Configuration is layered, later sources winning:
//! - Built-in defaults
//! - Config file (`.chatread/config.yaml` in the workspace, or `CHATREAD_CONFIG`)
//! - Environment variables
//! - Command-line flags
//!
//! Only read-only handles and identifiers live here (endpoints, deployment
//! names, index field names). Nothing in a request mutates it.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, AppResult};

/// Completion providers the factory knows how to build.
pub const KNOWN_LLM_PROVIDERS: [&str; 3] = ["azure-openai", "openai", "ollama"];

/// Search providers the factory knows how to build.
pub const KNOWN_SEARCH_PROVIDERS: [&str; 1] = ["azure-search"];

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .chatread/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Template set used when the request does not pick one
    pub approach: String,

    /// Log level override
    pub log_level: Option<String>,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Emit logs as JSON lines
    pub log_json: bool,

    /// Completion service settings
    pub llm: LlmSettings,

    /// Search service settings
    pub search: SearchSettings,
}

/// Completion service settings (`llm:` section of config.yaml).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LlmSettings {
    /// Provider identifier ("azure-openai", "openai", "ollama")
    pub provider: String,

    /// Service base URL
    pub endpoint: Option<String>,

    /// Name of the environment variable holding the API key
    pub api_key_env: String,

    /// REST API version (Azure only)
    pub api_version: String,

    /// Deployment (or model) used to rewrite the conversation into a query
    pub query_deployment: String,

    /// Deployment (or model) used to generate the final answer
    pub answer_deployment: String,

    /// Request timeout in seconds
    pub timeout: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: "azure-openai".to_string(),
            endpoint: None,
            api_key_env: "AZURE_OPENAI_API_KEY".to_string(),
            api_version: "2022-12-01".to_string(),
            query_deployment: "davinci".to_string(),
            answer_deployment: "chat".to_string(),
            timeout: 60,
        }
    }
}

/// Search service settings (`search:` section of config.yaml).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchSettings {
    /// Provider identifier ("azure-search")
    pub provider: String,

    /// Service base URL
    pub endpoint: Option<String>,

    /// Index to query
    pub index: String,

    /// Name of the environment variable holding the query key
    pub api_key_env: String,

    /// REST API version
    pub api_version: String,

    /// Document field naming the page or file a hit came from
    pub sourcepage_field: String,

    /// Document field holding the raw text
    pub content_field: String,

    /// Query language for semantic ranking
    pub query_language: String,

    /// Speller mode for semantic ranking
    pub query_speller: String,

    /// Semantic configuration name defined on the index
    pub semantic_configuration: String,

    /// Request timeout in seconds
    pub timeout: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            provider: "azure-search".to_string(),
            endpoint: None,
            index: "gptkbindex".to_string(),
            api_key_env: "AZURE_SEARCH_API_KEY".to_string(),
            api_version: "2023-07-01-Preview".to_string(),
            sourcepage_field: "sourcepage".to_string(),
            content_field: "content".to_string(),
            query_language: "ja-jp".to_string(),
            query_speller: "none".to_string(),
            semantic_configuration: "default".to_string(),
            timeout: 30,
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    approach: Option<String>,
    llm: Option<LlmSettings>,
    search: Option<SearchSettings>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
    json: Option<bool>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            approach: "default".to_string(),
            log_level: None,
            verbose: false,
            no_color: false,
            log_json: false,
            llm: LlmSettings::default(),
            search: SearchSettings::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from defaults, the config file and the environment.
    ///
    /// Environment variables:
    /// - `CHATREAD_WORKSPACE`, `CHATREAD_CONFIG`, `CHATREAD_APPROACH`
    /// - `AZURE_OPENAI_SERVICE`: service name, expanded to `https://<name>.openai.azure.com`
    /// - `AZURE_OPENAI_GPT_DEPLOYMENT`: query-rewrite deployment
    /// - `AZURE_OPENAI_CHATGPT_DEPLOYMENT`: answer deployment
    /// - `AZURE_SEARCH_SERVICE`: service name, expanded to `https://<name>.search.windows.net`
    /// - `AZURE_SEARCH_INDEX`, `KB_FIELDS_CONTENT`, `KB_FIELDS_SOURCEPAGE`
    /// - `RUST_LOG`, `NO_COLOR`
    pub fn load() -> AppResult<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::load`], reading variables through `env`.
    pub fn load_with<F>(env: F) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Self::load_from_with(None, None, env)
    }

    /// Load with a workspace and config file given on the command line.
    ///
    /// Both take precedence over `CHATREAD_WORKSPACE` / `CHATREAD_CONFIG` and
    /// decide which config file is merged.
    pub fn load_from(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        Self::load_from_with(workspace, config_file, |key| std::env::var(key).ok())
    }

    /// Same as [`AppConfig::load_from`], reading variables through `env`.
    pub fn load_from_with<F>(
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        env: F,
    ) -> AppResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(workspace) = workspace.or_else(|| env("CHATREAD_WORKSPACE").map(PathBuf::from)) {
            config.workspace = workspace;
        }

        config.config_file =
            config_file.or_else(|| env("CHATREAD_CONFIG").map(PathBuf::from));

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        match &config.config_file {
            Some(path) if !path.exists() => {
                return Err(AppError::Config(format!(
                    "Config file does not exist: {:?}",
                    path
                )));
            }
            Some(path) => {
                let path = path.clone();
                config.merge_yaml(&path)?;
            }
            None => {
                let path = config.chatread_dir().join("config.yaml");
                if path.exists() {
                    config.merge_yaml(&path)?;
                }
            }
        }

        config.apply_env(env);

        Ok(config)
    }

    /// Merge a YAML config file into this config.
    fn merge_yaml(&mut self, path: &Path) -> AppResult<()> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        if let Some(approach) = file.approach {
            self.approach = approach;
        }

        if let Some(llm) = file.llm {
            self.llm = llm;
        }

        if let Some(search) = file.search {
            self.search = search;
        }

        if let Some(logging) = file.logging {
            if let Some(level) = logging.level {
                self.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                self.no_color = !color;
            }
            if let Some(json) = logging.json {
                self.log_json = json;
            }
        }

        tracing::debug!("Merged config file {:?}", path);
        Ok(())
    }

    /// Environment variables override the config file.
    fn apply_env<F>(&mut self, env: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(approach) = env("CHATREAD_APPROACH") {
            self.approach = approach;
        }

        if let Some(service) = env("AZURE_OPENAI_SERVICE") {
            self.llm.endpoint = Some(format!("https://{}.openai.azure.com", service));
        }
        if let Some(deployment) = env("AZURE_OPENAI_GPT_DEPLOYMENT") {
            self.llm.query_deployment = deployment;
        }
        if let Some(deployment) = env("AZURE_OPENAI_CHATGPT_DEPLOYMENT") {
            self.llm.answer_deployment = deployment;
        }

        if let Some(service) = env("AZURE_SEARCH_SERVICE") {
            self.search.endpoint = Some(format!("https://{}.search.windows.net", service));
        }
        if let Some(index) = env("AZURE_SEARCH_INDEX") {
            self.search.index = index;
        }
        if let Some(field) = env("KB_FIELDS_CONTENT") {
            self.search.content_field = field;
        }
        if let Some(field) = env("KB_FIELDS_SOURCEPAGE") {
            self.search.sourcepage_field = field;
        }

        if let Some(level) = env("RUST_LOG") {
            self.log_level = Some(level);
        }
        if env("NO_COLOR").is_some() {
            self.no_color = true;
        }
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// CLI flags take precedence over environment variables and the config file.
    /// The workspace and config file path are not overrides: pass them to
    /// [`AppConfig::load_from`] so the right file gets merged.
    pub fn with_overrides(
        mut self,
        provider: Option<String>,
        approach: Option<String>,
        log_level: Option<String>,
        verbose: bool,
        no_color: bool,
        log_json: bool,
    ) -> Self {
        if let Some(provider) = provider {
            self.llm.provider = provider;
        }

        if let Some(approach) = approach {
            self.approach = approach;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if verbose {
            self.verbose = true;
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        if log_json {
            self.log_json = true;
        }

        self
    }

    /// Get the path to the .chatread directory.
    pub fn chatread_dir(&self) -> PathBuf {
        self.workspace.join(".chatread")
    }

    /// Read the completion service API key from its configured variable.
    pub fn llm_api_key(&self) -> Option<String> {
        std::env::var(&self.llm.api_key_env).ok()
    }

    /// Read the search service query key from its configured variable.
    pub fn search_api_key(&self) -> Option<String> {
        std::env::var(&self.search.api_key_env).ok()
    }

    /// Validate the configuration against the process environment.
    pub fn validate(&self) -> AppResult<()> {
        self.validate_with(|key| std::env::var(key).ok())
    }

    /// Validate providers, endpoints and credentials, reading variables through `env`.
    pub fn validate_with<F>(&self, env: F) -> AppResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let provider = self.llm.provider.as_str();
        if !KNOWN_LLM_PROVIDERS.contains(&provider) {
            return Err(AppError::Config(format!(
                "Unknown LLM provider: {}. Supported: {}",
                provider,
                KNOWN_LLM_PROVIDERS.join(", ")
            )));
        }

        let search_provider = self.search.provider.as_str();
        if !KNOWN_SEARCH_PROVIDERS.contains(&search_provider) {
            return Err(AppError::Config(format!(
                "Unknown search provider: {}. Supported: {}",
                search_provider,
                KNOWN_SEARCH_PROVIDERS.join(", ")
            )));
        }

        match provider {
            "azure-openai" => {
                if self.llm.endpoint.is_none() {
                    return Err(AppError::Config(
                        "azure-openai requires llm.endpoint or AZURE_OPENAI_SERVICE".to_string(),
                    ));
                }
                require_key(&env, &self.llm.api_key_env)?;
            }
            "openai" => require_key(&env, &self.llm.api_key_env)?,
            _ => {}
        }

        if self.search.endpoint.is_none() {
            return Err(AppError::Config(
                "Search requires search.endpoint or AZURE_SEARCH_SERVICE".to_string(),
            ));
        }
        require_key(&env, &self.search.api_key_env)?;

        if self.search.sourcepage_field.is_empty() || self.search.content_field.is_empty() {
            return Err(AppError::Config(
                "Search field names cannot be empty".to_string(),
            ));
        }

        Ok(())
    }
}

fn require_key<F>(env: &F, var: &str) -> AppResult<()>
where
    F: Fn(&str) -> Option<String>,
{
    match env(var) {
        Some(value) if !value.is_empty() => Ok(()),
        _ => Err(AppError::Config(format!(
            "API key not found in environment variable: {}",
            var
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn configured() -> AppConfig {
        let mut config = AppConfig::default();
        config.llm.endpoint = Some("https://example.openai.azure.com".to_string());
        config.search.endpoint = Some("https://example.search.windows.net".to_string());
        config
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.approach, "default");
        assert_eq!(config.llm.provider, "azure-openai");
        assert_eq!(config.search.sourcepage_field, "sourcepage");
        assert_eq!(config.search.content_field, "content");
        assert_eq!(config.search.query_language, "ja-jp");
        assert!(!config.verbose);
    }

    #[test]
    fn test_env_expands_service_names() {
        let temp = TempDir::new().unwrap();
        let workspace = temp.path().to_string_lossy().to_string();
        let config = AppConfig::load_with(env_from(&[
            ("CHATREAD_WORKSPACE", workspace.as_str()),
            ("AZURE_OPENAI_SERVICE", "contoso"),
            ("AZURE_SEARCH_SERVICE", "contoso-search"),
            ("AZURE_OPENAI_GPT_DEPLOYMENT", "davinci-003"),
            ("KB_FIELDS_SOURCEPAGE", "page"),
        ]))
        .unwrap();

        assert_eq!(
            config.llm.endpoint.as_deref(),
            Some("https://contoso.openai.azure.com")
        );
        assert_eq!(
            config.search.endpoint.as_deref(),
            Some("https://contoso-search.search.windows.net")
        );
        assert_eq!(config.llm.query_deployment, "davinci-003");
        assert_eq!(config.search.sourcepage_field, "page");
    }

    #[test]
    fn test_yaml_is_merged_and_env_wins() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join(".chatread");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("config.yaml"),
            r#"
approach: approach2
llm:
  provider: ollama
  endpoint: http://localhost:11434
  queryDeployment: llama3.2
search:
  endpoint: https://kb.search.windows.net
  index: sake
logging:
  level: debug
  json: true
"#,
        )
        .unwrap();

        let workspace = temp.path().to_string_lossy().to_string();
        let config = AppConfig::load_with(env_from(&[
            ("CHATREAD_WORKSPACE", workspace.as_str()),
            ("AZURE_SEARCH_INDEX", "sake-v2"),
        ]))
        .unwrap();

        assert_eq!(config.approach, "approach2");
        assert_eq!(config.llm.provider, "ollama");
        assert_eq!(config.llm.query_deployment, "llama3.2");
        // untouched keys keep their defaults
        assert_eq!(config.llm.answer_deployment, "chat");
        assert_eq!(config.search.index, "sake-v2");
        assert_eq!(config.search.content_field, "content");
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert!(config.log_json);
    }

    #[test]
    fn test_missing_workspace_is_config_error() {
        let result = AppConfig::load_with(env_from(&[(
            "CHATREAD_WORKSPACE",
            "/definitely/not/a/workspace",
        )]));
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_command_line_config_file_is_merged() {
        let temp = TempDir::new().unwrap();
        let alt = temp.path().join("alt.yaml");
        std::fs::write(&alt, "approach: approach2\nsearch:\n  index: sake\n").unwrap();

        let workspace = temp.path().to_string_lossy().to_string();
        let config = AppConfig::load_from_with(
            None,
            Some(alt.clone()),
            env_from(&[
                ("CHATREAD_WORKSPACE", workspace.as_str()),
                ("AZURE_SEARCH_INDEX", "sake-v2"),
            ]),
        )
        .unwrap();

        assert_eq!(config.config_file, Some(alt));
        assert_eq!(config.approach, "approach2");
        // env still layers over the file
        assert_eq!(config.search.index, "sake-v2");
    }

    #[test]
    fn test_command_line_workspace_reads_its_config() {
        let env_ws = TempDir::new().unwrap();
        let cli_ws = TempDir::new().unwrap();
        let dir = cli_ws.path().join(".chatread");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("config.yaml"), "approach: approach3\n").unwrap();

        let env_workspace = env_ws.path().to_string_lossy().to_string();
        let config = AppConfig::load_from_with(
            Some(cli_ws.path().to_path_buf()),
            None,
            env_from(&[("CHATREAD_WORKSPACE", env_workspace.as_str())]),
        )
        .unwrap();

        assert_eq!(config.workspace, cli_ws.path());
        assert_eq!(config.approach, "approach3");
    }

    #[test]
    fn test_missing_config_file_is_config_error() {
        let temp = TempDir::new().unwrap();
        let result = AppConfig::load_from_with(
            Some(temp.path().to_path_buf()),
            Some(temp.path().join("missing.yaml")),
            env_from(&[]),
        );
        assert!(matches!(result, Err(AppError::Config(_))));
    }

    #[test]
    fn test_with_overrides() {
        let config = AppConfig::default().with_overrides(
            Some("openai".to_string()),
            Some("approach1".to_string()),
            None,
            true,
            false,
            true,
        );

        assert_eq!(config.llm.provider, "openai");
        assert_eq!(config.approach, "approach1");
        assert!(config.verbose);
        assert!(config.log_json);
        assert_eq!(config.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_validate_unknown_provider() {
        let mut config = configured();
        config.llm.provider = "unknown".to_string();
        assert!(config.validate_with(env_from(&[])).is_err());
    }

    #[test]
    fn test_validate_requires_keys() {
        let config = configured();
        let err = config
            .validate_with(env_from(&[("AZURE_OPENAI_API_KEY", "k")]))
            .unwrap_err();
        assert!(err.to_string().contains("AZURE_SEARCH_API_KEY"));

        assert!(config
            .validate_with(env_from(&[
                ("AZURE_OPENAI_API_KEY", "k"),
                ("AZURE_SEARCH_API_KEY", "s"),
            ]))
            .is_ok());
    }

    #[test]
    fn test_validate_ollama_needs_no_llm_key() {
        let mut config = configured();
        config.llm.provider = "ollama".to_string();
        assert!(config
            .validate_with(env_from(&[("AZURE_SEARCH_API_KEY", "s")]))
            .is_ok());
    }
}
