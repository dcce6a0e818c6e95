//! Environment/runtime helpers

use tracing::debug;

/// Load `.env` if present. Missing files are not an error.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => debug!(path = %path.display(), "loaded .env"),
        Err(e) if e.not_found() => {}
        Err(e) => debug!(error = %e, "ignoring unreadable .env"),
    }
}

/// True when the variable is set to anything other than `0`, `false` or empty.
pub fn env_flag(name: &str) -> bool {
    match std::env::var(name) {
        Ok(v) => !matches!(v.trim().to_ascii_lowercase().as_str(), "" | "0" | "false"),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_flag_is_false() {
        assert!(!env_flag("FLEET_COMMON_TEST_FLAG_THAT_IS_NEVER_SET"));
    }
}
