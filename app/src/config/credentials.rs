//! Twitch application credentials from `.env` and the environment.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use super::defaults::ENV_FILE;

const ENV_TEMPLATE: &str = "client_id=\nclient_secret=\n";

#[derive(Debug, thiserror::Error)]
pub enum CredentialsError {
    #[error("created {}; fill in your Twitch API credentials and restart", .0.display())]
    TemplateCreated(PathBuf),

    #[error("client_id or client_secret is empty; open .env to set up your Twitch API credentials")]
    Empty,

    #[error("failed to read {}: {source}", .path.display())]
    Dotenv {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Client id and secret of the Twitch application.
#[derive(Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"********")
            .finish()
    }
}

pub fn env_path(data_dir: &Path) -> PathBuf {
    data_dir.join(ENV_FILE)
}

/// Write an empty `.env` template.
pub fn write_template(path: &Path) -> Result<(), CredentialsError> {
    std::fs::write(path, ENV_TEMPLATE).map_err(|source| CredentialsError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Load credentials. Values in `.env` win over process environment
/// variables; both lower- and upper-case key names are recognised.
///
/// A missing `.env` is replaced by a template and reported as
/// [`CredentialsError::TemplateCreated`].
pub fn load(data_dir: &Path) -> Result<Credentials, CredentialsError> {
    let path = env_path(data_dir);
    if !path.exists() {
        write_template(&path)?;
        return Err(CredentialsError::TemplateCreated(path));
    }

    let file_vars = read_env_file(&path)?;
    let lookup = |key: &str| -> String {
        let upper = key.to_uppercase();
        file_vars
            .get(key)
            .or_else(|| file_vars.get(&upper))
            .cloned()
            .filter(|v| !v.trim().is_empty())
            .or_else(|| std::env::var(key).ok())
            .or_else(|| std::env::var(&upper).ok())
            .map(|v| v.trim().to_string())
            .unwrap_or_default()
    };

    let credentials = Credentials {
        client_id: lookup("client_id"),
        client_secret: lookup("client_secret"),
    };

    if credentials.client_id.is_empty() || credentials.client_secret.is_empty() {
        return Err(CredentialsError::Empty);
    }
    Ok(credentials)
}

fn read_env_file(path: &Path) -> Result<HashMap<String, String>, CredentialsError> {
    let to_err = |source| CredentialsError::Dotenv {
        path: path.to_path_buf(),
        source,
    };
    let mut vars = HashMap::new();
    for item in dotenvy::from_path_iter(path).map_err(to_err)? {
        let (key, value) = item.map_err(to_err)?;
        vars.insert(key.trim().to_string(), value);
    }
    Ok(vars)
}
