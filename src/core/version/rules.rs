// ─── Rule Evaluation ───
// Decides whether a conditional library or argument applies on this host.

use std::collections::BTreeMap;

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct Rule {
    pub action: RuleAction,
    #[serde(default)]
    pub os: Option<OsRule>,
    /// Launcher feature flags (`is_demo_user`, `has_custom_resolution`, ...).
    #[serde(default)]
    pub features: Option<BTreeMap<String, bool>>,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RuleAction {
    Allow,
    Disallow,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct OsRule {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub arch: Option<String>,
    #[allow(dead_code)]
    #[serde(default)]
    pub version: Option<String>,
}

impl Rule {
    pub fn allow() -> Self {
        Self {
            action: RuleAction::Allow,
            os: None,
            features: None,
        }
    }

    pub fn for_os(action: RuleAction, os_name: &str) -> Self {
        Self {
            action,
            os: Some(OsRule {
                name: Some(os_name.to_string()),
                ..OsRule::default()
            }),
            features: None,
        }
    }

    fn is_conditional(&self) -> bool {
        self.os.is_some() || self.features.is_some()
    }

    fn matches(&self, env: &RuleEnvironment) -> bool {
        let os_matches = match &self.os {
            None => true,
            Some(os) => {
                os.name.as_deref().map_or(true, |name| name == env.os_name)
                    && os.arch.as_deref().map_or(true, |arch| arch == env.arch)
            }
        };
        let features_match = match &self.features {
            None => true,
            Some(features) => features
                .iter()
                .all(|(feature, wanted)| env.has_feature(feature) == *wanted),
        };
        os_matches && features_match
    }
}

/// The host facts rules are evaluated against.
#[derive(Debug, Clone)]
pub struct RuleEnvironment {
    /// Mojang OS name: `windows`, `osx` or `linux`.
    pub os_name: &'static str,
    /// Mojang arch name: `x86`, `x86_64`, `arm64`, ...
    pub arch: &'static str,
    pub features: Vec<String>,
}

impl RuleEnvironment {
    pub fn current() -> Self {
        Self {
            os_name: current_os_name(),
            arch: current_arch_name(),
            features: Vec::new(),
        }
    }

    pub fn for_os(os_name: &'static str) -> Self {
        Self {
            os_name,
            ..Self::current()
        }
    }

    fn has_feature(&self, feature: &str) -> bool {
        self.features.iter().any(|enabled| enabled == feature)
    }
}

/// Evaluate `rules` for the current host.
pub fn evaluate(rules: &[Rule]) -> bool {
    evaluate_in(rules, &RuleEnvironment::current())
}

/// Evaluate rules in order; the first decisive rule wins, default is allow.
///
/// - a conditional rule that matches decides `action == allow`
/// - an `allow` scoped to some other host rejects the entry
/// - an unconditional `allow` accepts the entry
/// - anything else does not decide
pub fn evaluate_in(rules: &[Rule], env: &RuleEnvironment) -> bool {
    for rule in rules {
        if rule.is_conditional() {
            let matched = rule.matches(env);
            match (matched, rule.action) {
                (true, action) => return action == RuleAction::Allow,
                (false, RuleAction::Allow) => return false,
                (false, RuleAction::Disallow) => continue,
            }
        }

        if rule.action == RuleAction::Allow {
            return true;
        }
    }

    true
}

/// Get the Mojang OS name for the current platform.
pub fn current_os_name() -> &'static str {
    if cfg!(target_os = "windows") {
        "windows"
    } else if cfg!(target_os = "macos") {
        "osx"
    } else {
        "linux"
    }
}

fn current_arch_name() -> &'static str {
    match std::env::consts::ARCH {
        "x86" => "x86",
        "aarch64" => "arm64",
        "arm" => "arm32",
        _ => "x86_64",
    }
}
