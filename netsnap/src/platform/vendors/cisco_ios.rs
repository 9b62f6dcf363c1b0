//! Cisco IOS / IOS-XE platform definition.
//!
//! ```text
//! router>                    # exec
//! router#                    # privilege_exec
//! router(config)#            # configuration
//! router(config-if)#         # configuration sub-mode
//! ```

use crate::platform::{PlatformDefinition, PrivilegeLevel};

pub const PLATFORM_NAME: &str = "cisco_iosxe";

/// Create the Cisco IOS platform definition.
pub fn platform() -> PlatformDefinition {
    let exec = PrivilegeLevel::new("exec", r"(?mi)^[\w.\-@/:]{1,63}>\s?$").unwrap();

    let privilege_exec = PrivilegeLevel::new("privilege_exec", r"(?mi)^[\w.\-@/:]{1,63}#\s?$")
        .unwrap()
        .with_parent("exec")
        .with_escalate("enable")
        .with_deescalate("disable")
        .with_auth(r"(?mi)^(?:enable\s)?password:\s?$")
        .unwrap()
        .with_not_contains("(conf");

    let configuration = PrivilegeLevel::new(
        "configuration",
        r"(?mi)^[\w.\-@/:]{1,63}\(conf[\w.\-@/:+]{0,63}\)#\s?$",
    )
    .unwrap()
    .with_parent("privilege_exec")
    .with_escalate("configure terminal")
    .with_deescalate("end")
    .with_not_contains("tcl)");

    PlatformDefinition::new(PLATFORM_NAME)
        .with_privilege(exec)
        .with_privilege(privilege_exec)
        .with_privilege(configuration)
        .with_default_privilege("privilege_exec")
        .with_configuration_privilege("configuration")
        .with_failure_pattern("% Ambiguous command")
        .with_failure_pattern("% Incomplete command")
        .with_failure_pattern("% Invalid input detected")
        .with_failure_pattern("% Unknown command")
        .with_on_open_command("terminal length 0")
        .with_on_open_command("terminal width 512")
        .with_terminal_size(512, 24)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ios_platform() {
        let platform = platform();
        assert_eq!(platform.name, "cisco_iosxe");
        assert_eq!(platform.privilege_levels.len(), 3);
        assert!(platform.validate().is_ok());
    }

    #[test]
    fn test_prompt_levels() {
        let platform = platform();
        let exec = platform.get_privilege("exec").unwrap();
        let priv_exec = platform.get_privilege("privilege_exec").unwrap();
        let config = platform.get_privilege("configuration").unwrap();

        assert!(exec.matches("router>"));
        assert!(!exec.matches("router#"));

        assert!(priv_exec.matches("router#"));
        assert!(priv_exec.matches("core-rtr.lab#"));
        assert!(!priv_exec.matches("router(config)#"));

        assert!(config.matches("router(config)#"));
        assert!(config.matches("router(config-if)#"));
        assert!(!config.matches("router#"));
    }

    #[test]
    fn test_enable_password_prompt() {
        let platform = platform();
        let priv_exec = platform.get_privilege("privilege_exec").unwrap();
        let auth = priv_exec.escalate_prompt.as_ref().unwrap();
        assert!(auth.is_match(b"Password: "));
        assert!(auth.is_match(b"router>enable\r\nPassword:"));
    }
}
