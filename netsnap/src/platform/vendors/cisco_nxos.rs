//! Cisco NX-OS platform definition.
//!
//! ```text
//! switch>                          # exec
//! switch#                          # privilege_exec
//! switch(maint-mode)#              # privilege_exec, maintenance mode
//! switch(config)#                  # configuration
//! switch(config-if)#               # configuration sub-mode
//! ```

use crate::platform::{PlatformDefinition, PrivilegeLevel};

pub const PLATFORM_NAME: &str = "cisco_nxos";

/// Create the Cisco NX-OS platform definition.
pub fn platform() -> PlatformDefinition {
    let exec = PrivilegeLevel::new("exec", r"(?mi)^[\w.\-]{1,63}>\s?$").unwrap();

    let privilege_exec = PrivilegeLevel::new(
        "privilege_exec",
        r"(?mi)^[\w.\-]{1,63}(?:\(maint-mode\))?#\s?$",
    )
    .unwrap()
    .with_parent("exec")
    .with_escalate("enable")
    .with_deescalate("disable")
    .with_auth(r"(?mi)^password:\s?$")
    .unwrap()
    .with_not_contains("(config");

    let configuration = PrivilegeLevel::new(
        "configuration",
        r"(?mi)^[\w.\-]{1,63}\(config[\w.\-@/:+]{0,32}\)#\s?$",
    )
    .unwrap()
    .with_parent("privilege_exec")
    .with_escalate("configure terminal")
    .with_deescalate("end")
    .with_not_contains("-tcl)")
    .with_not_contains("(config-s-");

    PlatformDefinition::new(PLATFORM_NAME)
        .with_privilege(exec)
        .with_privilege(privilege_exec)
        .with_privilege(configuration)
        .with_default_privilege("privilege_exec")
        .with_configuration_privilege("configuration")
        .with_failure_pattern("% Ambiguous command")
        .with_failure_pattern("% Incomplete command")
        .with_failure_pattern("% Invalid input detected")
        .with_failure_pattern("% Invalid command at")
        .with_failure_pattern("% Invalid parameter detected")
        .with_failure_pattern("syntax error while parsing")
        .with_on_open_command("terminal length 0")
        .with_on_open_command("terminal width 511")
        .with_terminal_size(511, 24)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nxos_platform() {
        let platform = platform();
        assert_eq!(platform.name, "cisco_nxos");
        assert!(platform.validate().is_ok());
        assert_eq!(platform.on_open_commands.len(), 2);
    }

    #[test]
    fn test_prompt_levels() {
        let platform = platform();
        let priv_exec = platform.get_privilege("privilege_exec").unwrap();
        let config = platform.get_privilege("configuration").unwrap();

        assert!(priv_exec.matches("nx-core-1#"));
        assert!(priv_exec.matches("nx-core-1(maint-mode)#"));
        assert!(!priv_exec.matches("nx-core-1(config)#"));

        assert!(config.matches("nx-core-1(config)#"));
        assert!(config.matches("nx-core-1(config-if)#"));
        assert!(!config.matches("nx-core-1(config-s-sess)#"));
    }
}
