// ─── Argument Expander ───
// Resolves argument templates and substitutes `${key}` placeholders.

use std::collections::BTreeMap;
use std::path::Path;

use crate::core::auth::AuthInfo;
use crate::core::state::LaunchSettings;
use crate::core::version::{self, ArgToken, ArgValue, RuleEnvironment, VersionDescriptor};

use super::classpath::{get_classpath_separator, safe_path_str};

/// JVM template used when a descriptor only has legacy `minecraftArguments`.
pub const DEFAULT_JVM_TEMPLATE: [&str; 3] = [
    "-Djava.library.path=${natives_directory}",
    "-cp",
    "${classpath}",
];

/// Everything the variable map is derived from.
pub struct VariableSources<'a> {
    pub auth: &'a AuthInfo,
    pub settings: &'a LaunchSettings,
    pub descriptor: &'a VersionDescriptor,
    pub minecraft_version: &'a str,
    pub instance_path: &'a Path,
    pub natives_dir: &'a Path,
    pub classpath: &'a str,
}

/// Immutable placeholder values for one launch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LaunchVariables {
    values: BTreeMap<String, String>,
}

impl LaunchVariables {
    pub fn from_sources(sources: &VariableSources<'_>) -> Self {
        let auth = sources.auth;
        let descriptor = sources.descriptor;
        let assets_root = safe_path_str(&descriptor.assets_root);
        let game_assets = match descriptor.asset_index_name.as_str() {
            "legacy" | "pre-1.6" => safe_path_str(
                &descriptor
                    .assets_root
                    .join("virtual")
                    .join(&descriptor.asset_index_name),
            ),
            _ => assets_root.clone(),
        };

        let pairs = [
            ("natives_directory", safe_path_str(sources.natives_dir)),
            ("launcher_name", sources.settings.launcher_name.clone()),
            ("launcher_version", sources.settings.launcher_version.clone()),
            ("classpath", sources.classpath.to_string()),
            ("library_directory", safe_path_str(&descriptor.libraries_root)),
            ("classpath_separator", get_classpath_separator().to_string()),
            ("version_name", sources.minecraft_version.to_string()),
            ("version_type", "release".to_string()),
            ("auth_player_name", auth.player_name.clone()),
            ("auth_uuid", auth.uuid.clone()),
            ("auth_access_token", auth.access_token.clone()),
            (
                "auth_session",
                format!("token:{}:{}", auth.access_token, auth.uuid),
            ),
            (
                "auth_xuid",
                auth.xuid.clone().unwrap_or_else(|| "null".to_string()),
            ),
            ("user_type", auth.account_kind.user_type().to_string()),
            ("user_properties", "{}".to_string()),
            ("game_directory", safe_path_str(sources.instance_path)),
            ("assets_root", assets_root),
            ("game_assets", game_assets),
            ("assets_index_name", descriptor.asset_index_name.clone()),
            ("clientid", sources.settings.client_id.clone()),
            ("path", String::new()),
        ];

        Self {
            values: pairs
                .into_iter()
                .map(|(key, value)| (key.to_string(), value))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

impl<const N: usize> From<[(&str, &str); N]> for LaunchVariables {
    fn from(pairs: [(&str, &str); N]) -> Self {
        Self {
            values: pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }
}

/// Resolve conditional tokens for this host and substitute placeholders.
pub fn expand(tokens: &[ArgToken], variables: &LaunchVariables) -> Vec<String> {
    expand_in(tokens, variables, &RuleEnvironment::current())
}

pub fn expand_in(
    tokens: &[ArgToken],
    variables: &LaunchVariables,
    env: &RuleEnvironment,
) -> Vec<String> {
    let mut out = Vec::with_capacity(tokens.len());
    for token in tokens {
        match token {
            ArgToken::Literal(value) => out.push(substitute(value, variables)),
            ArgToken::Conditional { rules, value } => {
                if !version::evaluate_in(rules, env) {
                    continue;
                }
                match value {
                    ArgValue::One(single) => out.push(substitute(single, variables)),
                    ArgValue::Many(values) => {
                        out.extend(values.iter().map(|v| substitute(v, variables)))
                    }
                }
            }
        }
    }
    out
}

/// Replace every known `${key}`; unknown keys are left as-is.
pub fn substitute(raw: &str, variables: &LaunchVariables) -> String {
    let mut result = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let key = &after[..end];
                match variables.get(key) {
                    Some(value) => result.push_str(value),
                    None => {
                        result.push_str("${");
                        result.push_str(key);
                        result.push('}');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                result.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    result.push_str(rest);
    result
}

/// Placeholder keys still present after expansion.
pub fn unresolved_placeholders(args: &[String]) -> Vec<String> {
    let mut keys = Vec::new();
    for arg in args {
        let mut rest = arg.as_str();
        while let Some(start) = rest.find("${") {
            let after = &rest[start + 2..];
            let Some(end) = after.find('}') else {
                break;
            };
            let key = after[..end].to_string();
            if !keys.contains(&key) {
                keys.push(key);
            }
            rest = &after[end + 1..];
        }
    }
    keys
}

/// Legacy `minecraftArguments`, split on whitespace.
pub fn legacy_tokens(raw: &str) -> Vec<ArgToken> {
    raw.split_whitespace().map(ArgToken::literal).collect()
}

pub fn default_jvm_template() -> Vec<ArgToken> {
    DEFAULT_JVM_TEMPLATE
        .iter()
        .map(|arg| ArgToken::literal(arg))
        .collect()
}
