//! Juniper JUNOS platform definition.
//!
//! JUNOS has no enable step: operational mode is where commands run.
//! Configuration is edited as a candidate and activated by `commit`.
//!
//! ```text
//! user@router>              # exec mode
//! {master:0}                # routing-engine indicator (separate line)
//! user@router>              # exec prompt on next line
//! [edit]
//! user@router#              # configuration mode
//! ```
//!
//! # Privilege Graph
//!
//! ```text
//! ┌──────┐  configure   ┌───────────────┐
//! │ exec ├──────────────► configuration │
//! │  >   │  exit conf.  │      #        │
//! └──────┘◄─────────────┴───────────────┘
//! ```

use crate::platform::{PlatformDefinition, PrivilegeLevel};

pub const PLATFORM_NAME: &str = "juniper_junos";

/// Create the Juniper JUNOS platform definition.
pub fn platform() -> PlatformDefinition {
    let exec = PrivilegeLevel::new(
        "exec",
        r"(?mi)^(\{\w+(:(\w+)?\d)?\}\r?\n)?[\w\-@()/:\.]{1,63}>\s?$",
    )
    .unwrap();

    let configuration = PrivilegeLevel::new(
        "configuration",
        r"(?mi)^(\{\w+(:(\w+)?\d)?\}\[edit\]\r?\n)?[\w\-@()/:\.]{1,63}#\s?$",
    )
    .unwrap()
    .with_parent("exec")
    .with_escalate("configure")
    .with_deescalate("exit configuration-mode");

    PlatformDefinition::new(PLATFORM_NAME)
        .with_privilege(exec)
        .with_privilege(configuration)
        .with_default_privilege("exec")
        .with_configuration_privilege("configuration")
        .with_failure_pattern("syntax error")
        .with_failure_pattern("unknown command")
        .with_failure_pattern("missing argument")
        .with_failure_pattern("No valid completions")
        .with_failure_pattern("error:")
        .with_commit("commit", "rollback 0")
        .with_on_open_command("set cli screen-length 0")
        .with_on_open_command("set cli screen-width 511")
        .with_on_open_command("set cli complete-on-space off")
        .with_terminal_size(511, 24)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_junos_platform() {
        let platform = platform();
        assert_eq!(platform.name, "juniper_junos");
        assert!(platform.validate().is_ok());
        assert_eq!(platform.default_privilege, "exec");
        assert_eq!(platform.commit_command.as_deref(), Some("commit"));
    }

    #[test]
    fn test_prompt_levels() {
        let platform = platform();
        let exec = platform.get_privilege("exec").unwrap();
        let config = platform.get_privilege("configuration").unwrap();

        assert!(exec.matches("admin@mx1>"));
        assert!(exec.matches("admin@mx1> "));
        assert!(!exec.matches("admin@mx1#"));

        assert!(config.matches("admin@mx1#"));
        assert!(!config.matches("admin@mx1>"));
    }
}
