//! Configuration for Products API

use axum_helpers::JwtConfig;
use core_config::{app_info, env_or_default, server::ServerConfig, AppInfo, FromEnv};
use database::mongodb::MongoConfig;
use domain_products::OwnershipPolicy;
use std::str::FromStr;

pub use core_config::Environment;

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub mongodb: MongoConfig,
    pub server: ServerConfig,
    pub environment: Environment,
    pub jwt: JwtConfig,
    pub ownership: OwnershipPolicy,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let mongodb = MongoConfig::from_env()?;
        let server = ServerConfig::from_env()?;
        let jwt = JwtConfig::from_env()?;

        let raw_policy = env_or_default("PRODUCTS_OWNERSHIP_POLICY", "unrestricted");
        let ownership = OwnershipPolicy::from_str(&raw_policy).map_err(|_| {
            eyre::eyre!(
                "PRODUCTS_OWNERSHIP_POLICY must be 'unrestricted' or 'owner_only', got '{}'",
                raw_policy
            )
        })?;

        Ok(Self {
            app: app_info!(),
            mongodb,
            server,
            environment,
            jwt,
            ownership,
        })
    }
}
