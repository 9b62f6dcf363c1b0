//! Builder for creating device drivers.

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;

use super::generic::GenericDriver;
use crate::error::{PlatformError, Result};
use crate::platform::PlatformDefinition;
use crate::transport::config::{AuthMethod, HostKeyVerification, SshConfig};

/// Builder for constructing device drivers.
///
/// # Example
///
/// ```rust,no_run
/// use netsnap::driver::DriverBuilder;
/// use netsnap::platform::vendors::cisco_ios;
///
/// # fn example() -> Result<(), netsnap::Error> {
/// let driver = DriverBuilder::new("192.168.1.1")
///     .username("admin")
///     .password("secret")
///     .platform(cisco_ios::platform())
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct DriverBuilder {
    host: String,
    port: u16,
    username: Option<String>,
    auth: AuthMethod,
    secret: Option<SecretString>,
    platform: Option<PlatformDefinition>,
    timeout: Duration,
    host_key_verification: HostKeyVerification,
    known_hosts_path: Option<PathBuf>,
}

impl DriverBuilder {
    /// Create a new driver builder for the specified host.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            port: 22,
            username: None,
            auth: AuthMethod::None,
            secret: None,
            platform: None,
            timeout: Duration::from_secs(30),
            host_key_verification: HostKeyVerification::default(),
            known_hosts_path: None,
        }
    }

    /// Set the SSH port (default: 22).
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the username for authentication.
    pub fn username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// Set password authentication.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.auth = AuthMethod::Password(SecretString::from(password.into()));
        self
    }

    /// Set password authentication from an already-wrapped secret.
    pub fn password_secret(mut self, password: SecretString) -> Self {
        self.auth = AuthMethod::Password(password);
        self
    }

    /// Set private key authentication.
    pub fn private_key(mut self, key_path: impl Into<PathBuf>) -> Self {
        self.auth = AuthMethod::PrivateKey {
            path: key_path.into(),
            passphrase: None,
        };
        self
    }

    /// Set the secret answered to the enable-password prompt.
    ///
    /// Without one, the login password is used.
    pub fn secret(mut self, secret: SecretString) -> Self {
        self.secret = Some(secret);
        self
    }

    /// Set the platform definition.
    pub fn platform(mut self, platform: PlatformDefinition) -> Self {
        self.platform = Some(platform);
        self
    }

    /// Set the connection and read timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the host key verification mode.
    pub fn host_key_verification(mut self, mode: HostKeyVerification) -> Self {
        self.host_key_verification = mode;
        self
    }

    /// Use a specific known_hosts file.
    pub fn known_hosts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.known_hosts_path = Some(path.into());
        self
    }

    /// Build the driver.
    ///
    /// This creates the driver but does not connect. Call `open()` on the
    /// returned driver to establish the connection.
    pub fn build(self) -> Result<GenericDriver> {
        let username = self
            .username
            .ok_or_else(|| PlatformError::InvalidDefinition {
                message: "Username is required".to_string(),
            })?;

        let platform = self
            .platform
            .ok_or_else(|| PlatformError::InvalidDefinition {
                message: "Platform must be specified".to_string(),
            })?;

        platform
            .validate()
            .map_err(|message| PlatformError::InvalidDefinition { message })?;

        let ssh_config = SshConfig {
            host: self.host,
            port: self.port,
            username,
            auth: self.auth,
            timeout: self.timeout,
            terminal_width: platform.terminal_width,
            terminal_height: platform.terminal_height,
            host_key_verification: self.host_key_verification,
            known_hosts_path: self.known_hosts_path,
        };

        Ok(GenericDriver::new(ssh_config, platform, self.secret))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::Driver;
    use crate::platform::vendors::cisco_ios;

    #[test]
    fn test_username_required() {
        let result = DriverBuilder::new("r1")
            .password("pw")
            .platform(cisco_ios::platform())
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_platform_required() {
        let result = DriverBuilder::new("r1").username("admin").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_build_does_not_connect() {
        let driver = DriverBuilder::new("r1")
            .username("admin")
            .password("pw")
            .platform(cisco_ios::platform())
            .build()
            .unwrap();
        assert!(!driver.is_open());
        assert_eq!(driver.host(), "r1");
        assert_eq!(driver.platform().name, "cisco_iosxe");
    }
}
