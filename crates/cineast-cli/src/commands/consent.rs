use crate::output::Output;
use cineast_config::{FlagStore, PathManager};
use color_eyre::Result;

/// Acknowledge (or reset) the notice about remembering rated movies.
/// Reviewed flags are kept either way; `cineast clear --flags` removes them.
pub fn run_consent(revoke: bool, output: &Output) -> Result<()> {
    let flags_file = PathManager::default().flags_file();

    let mut flags = FlagStore::new(flags_file.clone());
    flags
        .load()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load flags from {}: {}", flags_file.display(), e))?;
    flags.set_consent(!revoke);
    flags
        .save()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save flags: {}", e))?;

    if revoke {
        output.success("Storage notice will be shown again");
    } else {
        output.success("Storage notice acknowledged");
    }
    Ok(())
}
