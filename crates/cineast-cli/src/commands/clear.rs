use crate::output::Output;
use cineast_config::{CredentialStore, FlagStore, PathManager};
use color_eyre::Result;
use std::fs;

pub fn run_clear(all: bool, flags: bool, credentials: bool, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();

    if all {
        clear_flag_file(&path_manager, output)?;
        clear_credentials(&path_manager, output)?;
        output.success("All local state cleared");
        return Ok(());
    }

    let mut cleared_anything = false;

    if flags {
        clear_reviewed(&path_manager, output)?;
        cleared_anything = true;
    }

    if credentials {
        clear_credentials(&path_manager, output)?;
        cleared_anything = true;
    }

    if !cleared_anything {
        output.warn("No clear option specified. Use --flags, --credentials, or --all");
        output.println("\nExample: cineast clear --flags");
    }

    Ok(())
}

/// Forget rated movies but keep the consent answer
fn clear_reviewed(path_manager: &PathManager, output: &Output) -> Result<()> {
    let flags_file = path_manager.flags_file();
    if !flags_file.exists() {
        output.info("No reviewed flags found to clear");
        return Ok(());
    }

    let mut store = FlagStore::new(flags_file);
    store
        .load()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load flags: {}", e))?;
    let count = store.clear_reviewed();
    store
        .save()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save flags: {}", e))?;
    output.success(format!("Cleared {} reviewed flag(s)", count));
    Ok(())
}

fn clear_flag_file(path_manager: &PathManager, output: &Output) -> Result<()> {
    let flags_file = path_manager.flags_file();
    if flags_file.exists() {
        fs::remove_file(&flags_file)
            .map_err(|e| color_eyre::eyre::eyre!("Failed to remove flags file at {}: {}", flags_file.display(), e))?;
        output.success(format!("Cleared flags and consent: {}", flags_file.display()));
    } else {
        output.info("No flags file found to clear");
    }
    Ok(())
}

fn clear_credentials(path_manager: &PathManager, output: &Output) -> Result<()> {
    let credentials_file = path_manager.credentials_file();
    if !credentials_file.exists() {
        output.info("No credentials file found to clear");
        return Ok(());
    }

    let mut cred_store = CredentialStore::new(credentials_file.clone());
    cred_store
        .load()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load credentials: {}", e))?;
    cred_store.clear_key_service_secret();
    cred_store
        .save()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save credentials: {}", e))?;
    output.success(format!("Cleared key-service secret in {}", credentials_file.display()));
    Ok(())
}
