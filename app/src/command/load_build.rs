use runeforge_config::Config;

use super::service_client;

/// Strategy for asking the service to load a build.
#[derive(Debug, Clone, Copy)]
pub struct LoadBuildStrategy;

impl super::CommandStrategy for LoadBuildStrategy {
    /// Build file path or code; the service's default build when absent.
    type Input = Option<String>;

    async fn execute(&self, input: Self::Input) -> anyhow::Result<()> {
        let config = Config::load()?;
        service_client(&config)?.load_build(input.as_deref()).await?;
        println!("✅ Build loaded");
        Ok(())
    }
}
