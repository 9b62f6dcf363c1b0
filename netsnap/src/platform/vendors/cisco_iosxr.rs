//! Cisco IOS-XR platform definition.
//!
//! IOS-XR logs users straight into privileged exec; there is no `>` level.
//! Configuration changes are staged in a candidate and only take effect on
//! `commit`. Leaving configuration mode with `end` while changes are
//! pending asks an interactive question, so failures are discarded with
//! `abort`, which also returns to exec.
//!
//! ```text
//! RP/0/RP0/CPU0:xr1#                 # privilege_exec
//! RP/0/RP0/CPU0:xr1(config)#         # configuration
//! RP/0/RP0/CPU0:xr1(config-if)#      # configuration sub-mode
//! ```

use crate::platform::{PlatformDefinition, PrivilegeLevel};

pub const PLATFORM_NAME: &str = "cisco_iosxr";

/// Create the Cisco IOS-XR platform definition.
pub fn platform() -> PlatformDefinition {
    let privilege_exec = PrivilegeLevel::new("privilege_exec", r"(?mi)^[\w.\-@/:]{1,63}#\s?$")
        .unwrap()
        .with_not_contains("(config")
        .with_not_contains("(admin");

    let configuration = PrivilegeLevel::new(
        "configuration",
        r"(?mi)^[\w.\-@/:]{1,63}\(config[\w.\-@/:]{0,32}\)#\s?$",
    )
    .unwrap()
    .with_parent("privilege_exec")
    .with_escalate("configure terminal")
    .with_deescalate("end");

    PlatformDefinition::new(PLATFORM_NAME)
        .with_privilege(privilege_exec)
        .with_privilege(configuration)
        .with_default_privilege("privilege_exec")
        .with_configuration_privilege("configuration")
        .with_failure_pattern("% Ambiguous command")
        .with_failure_pattern("% Incomplete command")
        .with_failure_pattern("% Invalid input detected")
        .with_failure_pattern("% This command is not authorized")
        .with_failure_pattern("% Failed to commit")
        .with_commit("commit", "abort")
        .with_on_open_command("terminal length 0")
        .with_on_open_command("terminal width 512")
        .with_terminal_size(512, 24)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_iosxr_platform() {
        let platform = platform();
        assert_eq!(platform.name, "cisco_iosxr");
        assert!(platform.validate().is_ok());
        assert_eq!(platform.commit_command.as_deref(), Some("commit"));
        assert_eq!(platform.discard_command.as_deref(), Some("abort"));
    }

    #[test]
    fn test_prompt_levels() {
        let platform = platform();
        let priv_exec = platform.get_privilege("privilege_exec").unwrap();
        let config = platform.get_privilege("configuration").unwrap();

        assert!(priv_exec.previous_priv.is_none());
        assert!(priv_exec.matches("RP/0/RP0/CPU0:xr1#"));
        assert!(!priv_exec.matches("RP/0/RP0/CPU0:xr1(config)#"));

        assert!(config.matches("RP/0/RP0/CPU0:xr1(config)#"));
        assert!(config.matches("RP/0/RP0/CPU0:xr1(config-if)#"));
    }
}
