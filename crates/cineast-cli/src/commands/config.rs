use super::prompts;
use super::ui::is_interactive;
use crate::output::Output;
use crate::ConfigCommands;
use cineast_config::{Config, CredentialStore, PathManager};
use color_eyre::Result;
use comfy_table::{Attribute, Cell, Color, Table};
use owo_colors::OwoColorize;
use serde_json::json;

pub async fn run_config(cmd: ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show { full } => show_config(full, output),
        ConfigCommands::Init { app_name, force } => init_config(app_name, force, output),
        ConfigCommands::Secret { value } => set_secret(value, output),
    }
}

fn mask_string(s: &str) -> String {
    if s.is_empty() {
        return "<not set>".to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}

fn section(title: &str) -> Table {
    let mut table = Table::new();
    table.set_header(vec![Cell::new(title).fg(Color::Cyan).add_attribute(Attribute::Bold)]);
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table
}

fn show_config(full: bool, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let config_file = path_manager.config_file();

    if !config_file.exists() {
        output.warn(format!("Configuration file not found at: {}", config_file.display()));
        output.info("Create one with 'cineast config init --app-name <name>'.");
        return Ok(());
    }

    let config = Config::load_from_file(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load config from {}: {}", config_file.display(), e))?;
    let mut cred_store = CredentialStore::new(path_manager.credentials_file());
    cred_store
        .load()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load credentials: {}", e))?;
    let secret = cred_store.get_key_service_secret().cloned().unwrap_or_default();
    let secret_display = if full { secret } else { mask_string(&secret) };
    let validation = config.validate().err().map(|e| e.to_string());

    if !output.is_human() {
        output.json(&json!({
            "config_file": config_file.display().to_string(),
            "config": config,
            "key_service_secret": secret_display,
            "valid": validation.is_none(),
            "problem": validation,
        }));
        return Ok(());
    }
    if output.is_quiet() {
        return Ok(());
    }

    println!("\n{}", "Configuration".bright_cyan().bold());
    println!("{}", config_file.display().to_string().bright_black());

    let mut api = section("API");
    api.add_row(vec![Cell::new("Ratings backend"), Cell::new(&config.api.cmdb_url)]);
    api.add_row(vec![Cell::new("Metadata backend"), Cell::new(&config.api.omdb_url)]);
    api.add_row(vec![Cell::new("App name"), Cell::new(&config.api.app_name)]);
    api.add_row(vec![Cell::new("Key-service secret"), Cell::new(secret_display)]);
    api.add_row(vec![Cell::new("Timeout"), Cell::new(format!("{} s", config.api.timeout_secs))]);
    println!("{}", api);

    let display = &config.display;
    let mut view = section("Display");
    view.add_row(vec![Cell::new("Top list size"), Cell::new(display.toplist_limit)]);
    view.add_row(vec![Cell::new("Minimum ratings to list"), Cell::new(display.count_limit)]);
    view.add_row(vec![Cell::new("Top list pages"), Cell::new(display.toplist_max_pages)]);
    view.add_row(vec![Cell::new("Reviews per page"), Cell::new(display.review_page_size)]);
    view.add_row(vec![Cell::new("Search results per page"), Cell::new(display.search_page_size)]);
    view.add_row(vec![Cell::new("Title suggestions"), Cell::new(display.suggestion_limit)]);
    view.add_row(vec![Cell::new("Search suggestions"), Cell::new(display.search_suggestion_limit)]);
    println!("{}", view);

    let mut flags = section("Flags");
    flags.add_row(vec![Cell::new("Rated lock"), Cell::new(format!("{} h", config.flags.reviewed_ttl_hours))]);
    println!("{}", flags);

    match validation {
        None => output.success("Configuration is valid"),
        Some(problem) => output.warn(problem),
    }
    Ok(())
}

fn init_config(app_name: Option<String>, force: bool, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let config_file = path_manager.config_file();

    if config_file.exists() && !force {
        return Err(color_eyre::eyre::eyre!(
            "Configuration already exists at {}; pass --force to overwrite",
            config_file.display()
        ));
    }

    let app_name = match app_name {
        Some(name) => name,
        None if is_interactive() => prompts::prompt_string("App name registered with the key service", None)?,
        None => return Err(color_eyre::eyre::eyre!("--app-name is required when not running interactively")),
    };

    let mut config = Config::default();
    config.api.app_name = app_name.trim().to_string();
    config
        .validate()
        .map_err(|e| color_eyre::eyre::eyre!("Invalid configuration: {}", e))?;

    path_manager
        .ensure_directories()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to create directories: {}", e))?;
    config
        .save_to_file(&config_file)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save config to {}: {}", config_file.display(), e))?;

    output.success(format!("Configuration written to {}", config_file.display()));
    output.info("Next, store the key-service secret with 'cineast config secret'.");
    Ok(())
}

fn set_secret(value: Option<String>, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    let credentials_file = path_manager.credentials_file();

    let secret = match value {
        Some(value) => value,
        None if is_interactive() => prompts::prompt_secret("Key-service secret")?,
        None => return Err(color_eyre::eyre::eyre!("--value is required when not running interactively")),
    };
    let secret = secret.trim().to_string();
    if secret.is_empty() {
        return Err(color_eyre::eyre::eyre!("Secret cannot be empty"));
    }

    let mut cred_store = CredentialStore::new(credentials_file.clone());
    cred_store
        .load()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to load credentials: {}", e))?;
    cred_store.set_key_service_secret(secret);
    cred_store
        .save()
        .map_err(|e| color_eyre::eyre::eyre!("Failed to save credentials to {}: {}", credentials_file.display(), e))?;

    output.success(format!("Secret stored in {}", credentials_file.display()));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_string() {
        assert_eq!(mask_string(""), "<not set>");
        assert_eq!(mask_string("abc"), "***");
        assert_eq!(mask_string("s3cr3t-value"), "s3***ue");
    }
}
