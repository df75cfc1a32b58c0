//! Default values for Casewise configuration.
//!
//! All hardcoded defaults are centralized here for easy maintenance.

// ============================================================================
// Content Defaults
// ============================================================================

/// Default location of the packaged case file.
pub const DEFAULT_CASES_PATH: &str = "data/cases.json";

// ============================================================================
// Graph Defaults
// ============================================================================

/// Default Neo4j Bolt URI.
pub const DEFAULT_NEO4J_URI: &str = "bolt://localhost:7687";

/// Default Neo4j user.
pub const DEFAULT_NEO4J_USERNAME: &str = "neo4j";

// ============================================================================
// LLM Defaults
// ============================================================================

/// Default LLM provider.
pub const DEFAULT_LLM_PROVIDER: &str = "deepseek";

/// Default max tokens for a completion without explicit options.
pub const DEFAULT_MAX_TOKENS: u32 = 2000;

/// Default sampling temperature.
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

// DeepSeek defaults
/// Default DeepSeek API URL.
pub const DEFAULT_DEEPSEEK_URL: &str = "https://api.deepseek.com";
/// Default DeepSeek model.
pub const DEFAULT_DEEPSEEK_MODEL: &str = "deepseek-chat";

// OpenAI defaults
/// Default OpenAI API URL.
pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";
/// Default OpenAI model.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";

// Ollama defaults
/// Default Ollama API URL.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434/v1";
/// Default Ollama model.
pub const DEFAULT_OLLAMA_MODEL: &str = "llama3";

// ============================================================================
// Report Defaults
// ============================================================================

/// Default directory for saved reports.
pub const DEFAULT_REPORT_DIR: &str = "reports";

/// Token budget for an individual student report.
pub const DEFAULT_PERSONAL_MAX_TOKENS: u32 = 2000;

/// Token budget for a module (cohort) report.
pub const DEFAULT_MODULE_MAX_TOKENS: u32 = 2000;

/// Token budget for a whole-course report.
pub const DEFAULT_OVERALL_MAX_TOKENS: u32 = 2500;

// ============================================================================
// Server Defaults
// ============================================================================

/// Default bind address for the API server.
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Default port for the API server.
pub const DEFAULT_SERVER_PORT: u16 = 8501;
