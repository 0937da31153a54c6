//! Credential lookup from the process environment.

use secrecy::SecretString;
use thiserror::Error;

/// An environment variable required by the application is not set.
#[derive(Debug, Error)]
#[error("Missing environment variable: {0}")]
pub struct MissingEnvVarError(pub String);

/// Reads a credential from the environment, wrapped in [`SecretString`]
/// immediately so the value never sits in a plain `String` and never shows
/// up in debug output or logs.
///
/// # Arguments
/// * `name` - The name of the environment variable holding the credential.
pub fn secret_from_env(name: &str) -> Result<SecretString, MissingEnvVarError> {
    std::env::var(name)
        .map(|value| SecretString::new(value.into()))
        .map_err(|_| MissingEnvVarError(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use serial_test::serial;

    const VAR: &str = "SHARED_UTILS_TEST_CREDENTIAL";

    #[test]
    #[serial]
    fn reads_present_variable_as_secret() {
        unsafe { std::env::set_var(VAR, "hunter2") };
        let secret = secret_from_env(VAR).unwrap();
        assert_eq!(secret.expose_secret(), "hunter2");
        // the debug representation must not leak the value
        assert!(!format!("{secret:?}").contains("hunter2"));
        unsafe { std::env::remove_var(VAR) };
    }

    #[test]
    #[serial]
    fn missing_variable_names_itself_in_the_error() {
        unsafe { std::env::remove_var(VAR) };
        let error = secret_from_env(VAR).unwrap_err();
        assert_eq!(error.to_string(), format!("Missing environment variable: {VAR}"));
    }
}
