use super::prompts;
use super::ui::is_interactive;
use crate::output::Output;
use cineast_config::{Config, CredentialStore, FlagStore, PathManager};
use cineast_core::flows::FlowResult;
use cineast_core::{Backends, Fetched, PageContext, RequestSlot};
use cineast_sources::{CmdbClient, OmdbClient};
use color_eyre::Result;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

const CONSENT_MESSAGE: &str = "Cineast remembers which movies you rated on this machine so the same movie is not rated twice within a day. OK?";
const STORAGE_NOTICE: &str = "Rated movies are remembered on this machine for a day. Run `cineast consent` to stop this notice.";

/// Everything a command needs for one run: config, backends, the page
/// context and the local flag store.
pub struct Session {
    pub config: Config,
    pub ctx: PageContext,
    pub flags: FlagStore,
    slot: RequestSlot,
    shutdown: CancellationToken,
}

impl Session {
    pub fn open() -> Result<Self> {
        let path_manager = PathManager::default();
        let config = load_config(&path_manager)?;

        let credentials_file = path_manager.credentials_file();
        let mut cred_store = CredentialStore::new(credentials_file.clone());
        cred_store
            .load()
            .map_err(|e| color_eyre::eyre::eyre!("Failed to load credentials from {}: {}", credentials_file.display(), e))?;

        let mut cmdb = CmdbClient::from_config(&config.api);
        match cred_store.get_key_service_secret() {
            Some(secret) => cmdb = cmdb.with_secret(secret.clone()),
            None => warn!("No key-service secret stored; movie metadata will be unavailable. Run `cineast config secret`."),
        }
        let omdb = OmdbClient::from_config(&config.api);
        let ctx = PageContext::new(Backends::new(Arc::new(cmdb), Arc::new(omdb)));

        let flags_file = path_manager.flags_file();
        let mut flags = FlagStore::new(flags_file.clone());
        flags
            .load()
            .map_err(|e| color_eyre::eyre::eyre!("Failed to load flags from {}: {}", flags_file.display(), e))?;

        let shutdown = CancellationToken::new();
        let on_interrupt = shutdown.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                debug!("Interrupted, cancelling in-flight requests");
                on_interrupt.cancel();
            }
        });

        Ok(Self {
            config,
            ctx,
            flags,
            slot: RequestSlot::with_parent(shutdown.clone()),
            shutdown,
        })
    }

    /// Token for the next flow; supersedes the previous one
    pub fn begin(&self) -> CancellationToken {
        self.slot.begin()
    }

    pub fn shutdown(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn persist_flags(&mut self, output: &Output) -> Result<()> {
        persist_flags(&mut self.flags, output, is_interactive())
    }
}

/// Save the reviewed flags. Consent only decides whether the storage notice
/// is shown; the flags are written either way.
pub fn persist_flags(flags: &mut FlagStore, output: &Output, interactive: bool) -> Result<()> {
    if !flags.has_consent() {
        if interactive && output.is_human() {
            let acknowledged = prompts::prompt_yes_no(CONSENT_MESSAGE, Some(true))?;
            flags.set_consent(acknowledged);
        } else {
            output.info(STORAGE_NOTICE);
        }
    }

    flags
        .save()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save flags: {}", e))
}

pub fn load_config(path_manager: &PathManager) -> Result<Config> {
    let config_file = path_manager.config_file();
    if !config_file.exists() {
        return Err(color_eyre::eyre::eyre!(
            "Configuration file not found. Please run 'cineast config init --app-name <name>' first."
        ));
    }
    let config = Config::load_from_file(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
    config
        .validate()
        .map_err(|e| color_eyre::eyre::eyre!("Invalid configuration in {}: {}", config_file.display(), e))?;
    Ok(config)
}

/// Unwrap a flow result. Degradation is a warning in human output;
/// JSON output carries it in the `errors` field.
pub fn settle<T>(result: FlowResult<T>, output: &Output) -> Result<Fetched<T>> {
    let fetched = result.map_err(|_| color_eyre::eyre::eyre!("Interrupted"))?;
    if output.is_human() {
        for error in &fetched.errors {
            output.warn(format!("Partial result, {}", error));
        }
    }
    Ok(fetched)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;
    use chrono::{Duration, Utc};
    use cineast_models::Score;
    use tempfile::TempDir;

    #[test]
    fn test_reviewed_flag_survives_without_consent() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("data").join("flags.toml");
        let now = Utc::now();

        let mut flags = FlagStore::new(path.clone());
        flags.mark_reviewed("tt1", Score::new(4).unwrap(), now, Duration::hours(24));
        persist_flags(&mut flags, &Output::new(OutputFormat::Json, false), false).unwrap();

        let mut next_run = FlagStore::new(path);
        next_run.load().unwrap();
        assert!(next_run.is_reviewed("tt1", now));
        assert!(!next_run.has_consent());
    }
}
