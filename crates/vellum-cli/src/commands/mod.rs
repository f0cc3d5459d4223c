//! Command handlers

pub mod config;
pub mod content;
pub mod edit;
pub mod history;
pub mod status;

use anyhow::{bail, Context, Result};

use vellum_core::{
    Config, ContentStore, FileGateway, GatewayError, HttpGateway, LoadSource,
    PersistenceGateway, StoreError,
};

use crate::output::Output;

/// Store type used by the CLI, backend chosen at runtime
pub type Store = ContentStore<Box<dyn PersistenceGateway>>;

/// Build the gateway the configuration asks for
pub fn open_gateway(config: &Config) -> Result<Box<dyn PersistenceGateway>> {
    match &config.local_dir {
        Some(dir) => Ok(Box::new(FileGateway::new(dir.clone()))),
        None => {
            let gateway =
                HttpGateway::from_config(config).context("Failed to create HTTP client")?;
            Ok(Box::new(gateway))
        }
    }
}

/// Open and load the store
///
/// Falling back to defaults is reported but not an error, matching what the
/// editor shows when the backend is down.
pub async fn open_store(config: &Config, output: &Output) -> Result<(Store, LoadSource)> {
    let mut store = ContentStore::new(open_gateway(config)?);
    let source = store.load().await;
    if !source.is_remote() {
        output.warn(&format!(
            "Could not load content from {}, showing built-in defaults",
            config.backend_description()
        ));
    }
    Ok((store, source))
}

/// Find a version in the history by its version string
pub fn resolve_version(store: &Store, version: &str) -> Result<usize> {
    let version = version.trim_start_matches('v');
    match store.find_version(version) {
        Some(index) => Ok(index),
        None => bail!(
            "Version {} not found. Run `vellum history` to list versions.",
            version
        ),
    }
}

/// Resolve a full id or a unique prefix of one
pub fn resolve_id<'a, I>(kind: &str, id: &str, candidates: I) -> Result<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let candidates: Vec<&str> = candidates.into_iter().collect();
    if candidates.contains(&id) {
        return Ok(id.to_string());
    }

    let matches: Vec<&str> = candidates
        .into_iter()
        .filter(|c| c.starts_with(id))
        .collect();

    match matches.len() {
        0 => bail!("No {} found matching: {}", kind, id),
        1 => Ok(matches[0].to_string()),
        _ => {
            eprintln!("Multiple {}s match '{}':", kind, id);
            for m in &matches {
                eprintln!("  {}", m);
            }
            bail!("Ambiguous ID. Please provide more characters.");
        }
    }
}

/// What the user can do about a failed command, if anything
///
/// Looks through the error chain for a gateway failure.
pub fn recovery_hint(err: &anyhow::Error) -> Option<&'static str> {
    err.chain()
        .find_map(|cause| {
            cause.downcast_ref::<GatewayError>().or_else(|| {
                match cause.downcast_ref::<StoreError>() {
                    Some(StoreError::Gateway(e)) => Some(e),
                    _ => None,
                }
            })
        })
        .and_then(GatewayError::recovery_suggestion)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_id() {
        let ids = ["home", "menu", "3f2a9c1b00", "3f2b000000"];

        assert_eq!(resolve_id("page", "home", ids).unwrap(), "home");
        assert_eq!(resolve_id("page", "me", ids).unwrap(), "menu");
        assert_eq!(resolve_id("page", "3f2a", ids).unwrap(), "3f2a9c1b00");
        assert!(resolve_id("page", "3f2", ids).is_err());
        assert!(resolve_id("page", "zzz", ids).is_err());
    }

    #[test]
    fn test_recovery_hint() {
        let err = anyhow::Error::from(StoreError::Gateway(GatewayError::Unauthorized {
            url: "https://example.com/api/dashboard-content".to_string(),
        }))
        .context("Failed to save content");
        assert!(recovery_hint(&err).unwrap().contains("auth_token"));

        let err = anyhow::Error::from(StoreError::SaveInProgress).context("Failed to save content");
        assert!(recovery_hint(&err).is_none());
        assert!(recovery_hint(&anyhow::anyhow!("plain")).is_none());
    }

    #[tokio::test]
    async fn test_open_store_with_local_dir() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            local_dir: Some(temp_dir.path().to_path_buf()),
            ..Config::default()
        };
        let output = Output::new(crate::output::OutputFormat::Quiet);

        let (store, source) = open_store(&config, &output).await.unwrap();
        assert_eq!(source, LoadSource::Defaults);
        assert!(store.is_loaded());
        assert!(store.gateway().location().ends_with("dashboard-content.json"));
    }

    #[tokio::test]
    async fn test_resolve_version() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config {
            local_dir: Some(temp_dir.path().to_path_buf()),
            ..Config::default()
        };
        let output = Output::new(crate::output::OutputFormat::Quiet);
        let (mut store, _) = open_store(&config, &output).await.unwrap();
        store.save(Default::default()).await.unwrap();
        store.save(Default::default()).await.unwrap();

        assert_eq!(resolve_version(&store, "2").unwrap(), 0);
        assert_eq!(resolve_version(&store, "v1").unwrap(), 1);
        assert!(resolve_version(&store, "7").is_err());
    }
}
