//! Configuration for the Search API

use core_config::{app_info, server::ServerConfig, AppInfo, FromEnv};
use database::redis::RedisConfig;
use domain_products::embedding::OpenAIConfig;
use domain_products::{ElasticConfig, QdrantConfig};

pub use core_config::Environment;

/// Embedding provider plus vector index; both or neither.
#[derive(Clone, Debug)]
pub struct SemanticConfig {
    pub qdrant: QdrantConfig,
    pub openai: OpenAIConfig,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub server: ServerConfig,
    pub environment: Environment,
    pub redis: RedisConfig,
    pub elastic: ElasticConfig,
    /// Present only when both `QDRANT_URL` and `OPENAI_API_KEY` are set;
    /// without it the service runs lexical-only.
    pub semantic: Option<SemanticConfig>,
    /// Drop and recreate the keyword index at startup (`FORCE_REBUILD`)
    pub force_rebuild: bool,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let server = ServerConfig::from_env()?;
        let redis = RedisConfig::from_env()?;
        let elastic = ElasticConfig::from_env()?;

        let semantic = if std::env::var("QDRANT_URL").is_ok()
            && std::env::var("OPENAI_API_KEY").is_ok()
        {
            Some(SemanticConfig {
                qdrant: QdrantConfig::from_env()?,
                openai: OpenAIConfig::from_env()?,
            })
        } else {
            None
        };

        let force_rebuild = matches!(
            std::env::var("FORCE_REBUILD").as_deref(),
            Ok("1") | Ok("true")
        );

        Ok(Self {
            app: app_info!(),
            server,
            environment,
            redis,
            elastic,
            semantic,
            force_rebuild,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semantic_requires_both_backends() {
        temp_env::with_vars(
            [
                ("QDRANT_URL", Some("http://localhost:6334")),
                ("OPENAI_API_KEY", None::<&str>),
            ],
            || {
                let config = Config::from_env().unwrap();
                assert!(config.semantic.is_none());
            },
        );
    }

    #[test]
    fn test_force_rebuild_flag() {
        temp_env::with_var("FORCE_REBUILD", Some("true"), || {
            let config = Config::from_env().unwrap();
            assert!(config.force_rebuild);
        });
        temp_env::with_var_unset("FORCE_REBUILD", || {
            let config = Config::from_env().unwrap();
            assert!(!config.force_rebuild);
        });
    }
}
