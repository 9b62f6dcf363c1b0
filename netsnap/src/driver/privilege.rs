//! Privilege level management with graph-based navigation.

use std::collections::{HashMap, HashSet, VecDeque};

use indexmap::IndexMap;
use regex::bytes::Regex;

use crate::error::{DriverError, Result};
use crate::platform::PrivilegeLevel;

/// Tracks the current privilege level and plans moves between levels.
///
/// Levels form a bidirectional graph where each level connects to its
/// parent (`previous_priv`); moving from exec to configuration on a
/// Cisco-style CLI is the path exec → privilege_exec → configuration.
#[derive(Debug)]
pub struct PrivilegeManager {
    levels: IndexMap<String, PrivilegeLevel>,

    /// Neighbours of each level: its parent and its children.
    adjacency: HashMap<String, Vec<String>>,

    current: Option<String>,
}

impl PrivilegeManager {
    /// The root level (the one without a parent) is assumed current until
    /// a prompt says otherwise.
    pub fn new(levels: IndexMap<String, PrivilegeLevel>) -> Self {
        let mut adjacency: HashMap<String, Vec<String>> = levels
            .keys()
            .map(|name| (name.clone(), Vec::new()))
            .collect();
        for (name, level) in &levels {
            if let Some(parent) = &level.previous_priv {
                adjacency.entry(name.clone()).or_default().push(parent.clone());
                adjacency.entry(parent.clone()).or_default().push(name.clone());
            }
        }

        let current = levels
            .values()
            .find(|level| level.previous_priv.is_none())
            .map(|level| level.name.clone());

        Self {
            levels,
            adjacency,
            current,
        }
    }

    /// Determine the current privilege level from a prompt string.
    pub fn determine_from_prompt(&self, prompt: &str) -> Result<&PrivilegeLevel> {
        self.levels
            .values()
            .find(|level| level.matches(prompt))
            .ok_or_else(|| {
                DriverError::UnknownPrivilege {
                    prompt: prompt.to_string(),
                }
                .into()
            })
    }

    /// Get the current privilege level.
    pub fn current(&self) -> Option<&PrivilegeLevel> {
        self.current.as_ref().and_then(|name| self.levels.get(name))
    }

    /// Set the current privilege level by name.
    pub fn set_current(&mut self, name: &str) -> Result<()> {
        if self.levels.contains_key(name) {
            self.current = Some(name.to_string());
            Ok(())
        } else {
            Err(DriverError::UnknownPrivilege {
                prompt: name.to_string(),
            }
            .into())
        }
    }

    /// Shortest walk between two levels, both ends included.
    pub fn find_path(&self, from: &str, to: &str) -> Result<Vec<String>> {
        let mut came_from: HashMap<&str, &str> = HashMap::new();
        let mut seen = HashSet::from([from]);
        let mut queue = VecDeque::from([from]);

        while let Some(node) = queue.pop_front() {
            if node == to {
                let mut path: Vec<String> =
                    std::iter::successors(Some(to), |step| came_from.get(step).copied())
                        .map(str::to_string)
                        .collect();
                path.reverse();
                return Ok(path);
            }

            for next in self.adjacency.get(node).into_iter().flatten() {
                if seen.insert(next.as_str()) {
                    came_from.insert(next.as_str(), node);
                    queue.push_back(next.as_str());
                }
            }
        }

        Err(DriverError::NoPrivilegePath {
            from: from.to_string(),
            to: to.to_string(),
        }
        .into())
    }

    /// Command (and password prompt, if any) for one step between
    /// adjacent levels. `None` when the levels are not adjacent.
    pub fn get_transition(&self, from: &str, to: &str) -> Option<TransitionInfo> {
        let source = self.levels.get(from)?;
        let target = self.levels.get(to)?;

        match (&target.previous_priv, &source.previous_priv) {
            (Some(parent), _) if parent == from => Some(TransitionInfo {
                command: target.escalate_command.clone()?,
                auth_prompt: target.escalate_prompt.clone(),
            }),
            (_, Some(parent)) if parent == to => Some(TransitionInfo {
                command: source.deescalate_command.clone()?,
                auth_prompt: None,
            }),
            _ => None,
        }
    }
}

/// One step along the privilege graph.
#[derive(Debug, Clone)]
pub struct TransitionInfo {
    pub command: String,

    /// Password prompt the device may answer the command with.
    pub auth_prompt: Option<Regex>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_levels() -> IndexMap<String, PrivilegeLevel> {
        let exec = PrivilegeLevel::new("exec", r">\s*$").unwrap();

        let privileged = PrivilegeLevel::new("privilege_exec", r"#\s*$")
            .unwrap()
            .with_parent("exec")
            .with_escalate("enable")
            .with_deescalate("disable")
            .with_auth(r"[Pp]assword:\s*$")
            .unwrap()
            .with_not_contains("(config)");

        let configuration = PrivilegeLevel::new("configuration", r"\(config[^)]*\)#\s*$")
            .unwrap()
            .with_parent("privilege_exec")
            .with_escalate("configure terminal")
            .with_deescalate("end");

        let mut levels = IndexMap::new();
        levels.insert("exec".to_string(), exec);
        levels.insert("privilege_exec".to_string(), privileged);
        levels.insert("configuration".to_string(), configuration);
        levels
    }

    #[test]
    fn test_determine_privilege() {
        let manager = PrivilegeManager::new(make_test_levels());

        let level = manager.determine_from_prompt("router>").unwrap();
        assert_eq!(level.name, "exec");

        let level = manager.determine_from_prompt("router#").unwrap();
        assert_eq!(level.name, "privilege_exec");

        let level = manager.determine_from_prompt("router(config)#").unwrap();
        assert_eq!(level.name, "configuration");
    }

    #[test]
    fn test_find_path() {
        let manager = PrivilegeManager::new(make_test_levels());

        let path = manager.find_path("exec", "configuration").unwrap();
        assert_eq!(path, vec!["exec", "privilege_exec", "configuration"]);

        let path = manager.find_path("configuration", "exec").unwrap();
        assert_eq!(path, vec!["configuration", "privilege_exec", "exec"]);

        let path = manager.find_path("exec", "exec").unwrap();
        assert_eq!(path, vec!["exec"]);
    }

    #[test]
    fn test_get_transition() {
        let manager = PrivilegeManager::new(make_test_levels());

        let trans = manager.get_transition("exec", "privilege_exec").unwrap();
        assert_eq!(trans.command, "enable");
        assert!(trans.auth_prompt.is_some());

        let trans = manager.get_transition("privilege_exec", "exec").unwrap();
        assert_eq!(trans.command, "disable");
        assert!(trans.auth_prompt.is_none());

        // Not adjacent
        assert!(manager.get_transition("exec", "configuration").is_none());
    }

    #[test]
    fn test_unknown_prompt() {
        let manager = PrivilegeManager::new(make_test_levels());
        assert!(manager.determine_from_prompt("login:").is_err());
        assert_eq!(manager.current().unwrap().name, "exec");
    }
}
