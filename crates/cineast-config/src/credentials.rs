use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

const KEY_SERVICE_SECRET: &str = "key_service_secret";

#[derive(Debug, Serialize, Deserialize, Default)]
struct CredentialsData {
    #[serde(flatten)]
    data: HashMap<String, String>,
}

pub struct CredentialStore {
    path: PathBuf,
    credentials: HashMap<String, String>,
}

impl CredentialStore {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            credentials: HashMap::new(),
        }
    }

    pub fn load(&mut self) -> Result<()> {
        if self.path.exists() {
            let content = std::fs::read_to_string(&self.path)?;
            let creds_data: CredentialsData = toml::from_str(&content)?;
            self.credentials = creds_data.data;
        }
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let creds_data = CredentialsData {
            data: self.credentials.clone(),
        };
        let content = toml::to_string_pretty(&creds_data)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.credentials.get(key)
    }

    pub fn set(&mut self, key: String, value: String) {
        self.credentials.insert(key, value);
    }

    pub fn remove(&mut self, key: &str) {
        self.credentials.remove(key);
    }

    /// Secret half of `GET /keys/{app}/{secret}`
    pub fn get_key_service_secret(&self) -> Option<&String> {
        self.get(KEY_SERVICE_SECRET).filter(|s| !s.is_empty())
    }

    pub fn set_key_service_secret(&mut self, secret: String) {
        self.set(KEY_SERVICE_SECRET.to_string(), secret);
    }

    pub fn clear_key_service_secret(&mut self) {
        self.remove(KEY_SERVICE_SECRET);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    #[test]
    fn test_credential_store_load_and_save() {
        let file = NamedTempFile::new().unwrap();
        let path = file.path().to_path_buf();

        let mut store = CredentialStore::new(path.clone());
        store.set_key_service_secret("s3cret".to_string());
        store.save().unwrap();

        let mut loaded_store = CredentialStore::new(path);
        loaded_store.load().unwrap();
        assert_eq!(loaded_store.get_key_service_secret(), Some(&"s3cret".to_string()));
    }

    #[test]
    fn test_empty_secret_counts_as_missing() {
        let mut store = CredentialStore::new(PathBuf::from("/tmp/cineast-creds-test"));
        store.set_key_service_secret(String::new());
        assert_eq!(store.get_key_service_secret(), None);
        store.set("other".to_string(), "value".to_string());
        store.remove("other");
        assert_eq!(store.get("other"), None);
    }
}
