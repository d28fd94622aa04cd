use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::error::Result;

const TOKEN_FILE_NAME: &str = "session-token";

/// Bearer token of the signed-in candidate
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SessionToken(String);

impl SessionToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.0)
    }
}

impl std::fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "SessionToken(***)")
    }
}

/// Default token location: `$XDG_DATA_HOME/sgee/session-token`
pub fn default_token_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("sgee").join(TOKEN_FILE_NAME))
}

/// Read the stored token; a missing or blank file means no session.
pub fn load_token(path: &Path) -> Result<Option<SessionToken>> {
    if !path.exists() {
        debug!("No session token at {:?}", path);
        return Ok(None);
    }

    let mut content = std::fs::read_to_string(path)?;
    let token = content.trim();
    let session = if token.is_empty() {
        None
    } else {
        info!("Loaded session token from {:?}", path);
        Some(SessionToken::new(token))
    };
    content.zeroize();
    Ok(session)
}

pub fn save_token(path: &Path, token: &SessionToken) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(0o600);
    }

    let mut file = options.open(path)?;
    // mode() only applies when the file is created
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
    }
    file.write_all(token.as_str().as_bytes())?;
    debug!("Saved session token to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join(TOKEN_FILE_NAME);

        assert!(load_token(&path).unwrap().is_none());

        save_token(&path, &SessionToken::new("abc.def")).unwrap();
        let loaded = load_token(&path).unwrap().unwrap();
        assert_eq!(loaded.as_str(), "abc.def");
        assert_eq!(loaded.bearer(), "Bearer abc.def");

        save_token(&path, &SessionToken::new("rotated")).unwrap();
        assert_eq!(load_token(&path).unwrap().unwrap().as_str(), "rotated");
    }

    #[test]
    fn blank_file_is_no_session_and_debug_hides_token() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(TOKEN_FILE_NAME);
        std::fs::write(&path, "  \n").unwrap();
        assert!(load_token(&path).unwrap().is_none());

        assert_eq!(format!("{:?}", SessionToken::new("secret")), "SessionToken(***)");
    }

    #[cfg(unix)]
    #[test]
    fn saved_token_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(TOKEN_FILE_NAME);
        std::fs::write(&path, "old").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o644)).unwrap();
        save_token(&path, &SessionToken::new("secret")).unwrap();

        assert_eq!(load_token(&path).unwrap().unwrap().as_str(), "secret");
        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
