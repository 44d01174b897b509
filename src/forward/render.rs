// src/forward/render.rs

use serde::Serialize;

use crate::error::LauncherError;
use crate::forward::collector::{ServerField, ServerGroup};

pub const DEFAULT_PORT: &str = "24224";
pub const DEFAULT_WEIGHT: &str = "60";

/// One out_forward target with defaults applied and every field validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedServer {
    pub prefix: String,
    pub name: String,
    pub host: String,
    pub port: String,
    pub weight: String,
}

/// 🛡️ Values are pasted verbatim into the config, so anything that could start
/// a new line or a new directive is refused.
fn validate_field_value(key: &str, value: &str) -> Result<(), LauncherError> {
    if value.chars().any(char::is_control) {
        return Err(LauncherError::InvalidFieldValue {
            key: key.to_string(),
            reason: "control characters (including line breaks) are not allowed",
        });
    }
    if value.contains('<') || value.contains('>') {
        return Err(LauncherError::InvalidFieldValue {
            key: key.to_string(),
            reason: "angle brackets are not allowed",
        });
    }
    Ok(())
}

fn field_or(
    group: &ServerGroup,
    field: ServerField,
    default: Option<&'static str>,
) -> Result<String, LauncherError> {
    match (group.field(field), default) {
        (Some(found), _) => {
            validate_field_value(&found.key, &found.value)?;
            Ok(found.value.clone())
        }
        (None, Some(default)) => Ok(default.to_string()),
        (None, None) => Err(LauncherError::MissingRequiredField {
            prefix: group.prefix.clone(),
            field: field.as_str(),
        }),
    }
}

pub fn resolve_server(group: &ServerGroup) -> Result<ResolvedServer, LauncherError> {
    Ok(ResolvedServer {
        prefix: group.prefix.clone(),
        name: field_or(group, ServerField::Name, None)?,
        host: field_or(group, ServerField::Host, None)?,
        port: field_or(group, ServerField::Port, Some(DEFAULT_PORT))?,
        weight: field_or(group, ServerField::Weight, Some(DEFAULT_WEIGHT))?,
    })
}

/// Resolves every group, stopping at the first invalid one.
pub fn resolve_servers(groups: &[ServerGroup]) -> Result<Vec<ResolvedServer>, LauncherError> {
    groups.iter().map(resolve_server).collect()
}

pub fn render_server_block(server: &ResolvedServer) -> String {
    format!(
        r#"
    <server>
      name {name}
      host {host}
      port {port}
      weight {weight}
    </server>
"#,
        name = server.name,
        host = server.host,
        port = server.port,
        weight = server.weight
    )
}

/// Wraps the server blocks in a single `<match **>` forward rule.
///
/// No servers means no rule at all: the empty string lets the outer template
/// fall back to its stdout-only output.
pub fn compose_match_block(servers: &[ResolvedServer]) -> String {
    if servers.is_empty() {
        return String::new();
    }

    let server_blocks: String = servers.iter().map(render_server_block).collect();
    format!(
        r#"
  <match **>
    @type forward
    {server_blocks}
  </match>
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Environment;
    use crate::forward::collector::collect_server_groups;

    fn groups(pairs: &[(&str, &str)]) -> Vec<ServerGroup> {
        let env: Environment = pairs.iter().copied().collect();
        collect_server_groups(&env).unwrap()
    }

    #[test]
    fn test_defaults_are_applied() {
        let servers = resolve_servers(&groups(&[
            ("FLUENTD_SERVER_NAME", "s1"),
            ("FLUENTD_SERVER_HOST", "h1"),
        ]))
        .unwrap();

        assert_eq!(servers[0].port, "24224");
        assert_eq!(servers[0].weight, "60");
    }

    #[test]
    fn test_render_single_server_block() {
        let servers = resolve_servers(&groups(&[
            ("FLUENTD_SERVER_NAME", "s1"),
            ("FLUENTD_SERVER_HOST", "h1"),
            ("FLUENTD_SERVER_PORT", "9999"),
        ]))
        .unwrap();

        let block = render_server_block(&servers[0]);
        assert_eq!(
            block,
            "\n    <server>\n      name s1\n      host h1\n      port 9999\n      weight 60\n    </server>\n"
        );
    }

    #[test]
    fn test_missing_host_names_prefix_and_field() {
        let err = resolve_servers(&groups(&[
            ("FLUENTD_SERVER_1_NAME", "a"),
            ("FLUENTD_SERVER_1_HOST", "ha"),
            ("FLUENTD_SERVER_2_NAME", "b"),
        ]))
        .unwrap_err();

        match err {
            LauncherError::MissingRequiredField { prefix, field } => {
                assert_eq!(prefix, "FLUENTD_SERVER_2");
                assert_eq!(field, "HOST");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_name_is_fatal() {
        let err = resolve_servers(&groups(&[("FLUENTD_SERVER_HOST", "h")])).unwrap_err();
        assert!(matches!(
            err,
            LauncherError::MissingRequiredField { field: "NAME", .. }
        ));
        assert_eq!(
            err.to_string(),
            "Failure. Required variable missing for FLUENTD_SERVER: FLUENTD_SERVER_NAME"
        );
    }

    #[test]
    fn test_injection_attempts_are_rejected() {
        for bad in ["h1\n  </server>", "h1\r", "h1\t", "h1</match>", "<h1"] {
            let err = resolve_servers(&groups(&[
                ("FLUENTD_SERVER_NAME", "s1"),
                ("FLUENTD_SERVER_HOST", bad),
            ]))
            .unwrap_err();
            assert!(
                matches!(err, LauncherError::InvalidFieldValue { ref key, .. } if key == "FLUENTD_SERVER_HOST"),
                "value {bad:?} was accepted"
            );
        }
    }

    #[test]
    fn test_no_servers_compose_to_empty_string() {
        assert_eq!(compose_match_block(&[]), "");
    }

    #[test]
    fn test_compose_two_indexed_servers() {
        let servers = resolve_servers(&groups(&[
            ("FLUENTD_SERVER_1_NAME", "a"),
            ("FLUENTD_SERVER_1_HOST", "ha"),
            ("FLUENTD_SERVER_2_NAME", "b"),
            ("FLUENTD_SERVER_2_HOST", "hb"),
        ]))
        .unwrap();

        let block = compose_match_block(&servers);
        assert!(block.starts_with("\n  <match **>\n    @type forward\n"));
        assert!(block.ends_with("\n  </match>\n"));
        assert_eq!(block.matches("<server>").count(), 2);
        assert_eq!(block.matches("</match>").count(), 1);
        assert_eq!(block.matches("port 24224").count(), 2);
        assert_eq!(block.matches("weight 60").count(), 2);

        let a = block.find("name a").unwrap();
        let b = block.find("name b").unwrap();
        assert!(a < b);
        assert!(block.contains("host ha"));
        assert!(block.contains("host hb"));
    }
}
