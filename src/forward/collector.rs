// src/forward/collector.rs

use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

use crate::env::Environment;
use crate::error::LauncherError;

pub const SERVER_KEY_STEM: &str = "FLUENTD_SERVER";

/// `FLUENTD_SERVER(_<digits>)?_<FIELD>`, anchored on both ends.
static SERVER_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^FLUENTD_SERVER(?:_([0-9]+))?_(NAME|HOST|PORT|WEIGHT)$")
        .expect("server key pattern is a valid regex")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ServerField {
    Name,
    Host,
    Port,
    Weight,
}

impl ServerField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "NAME",
            Self::Host => "HOST",
            Self::Port => "PORT",
            Self::Weight => "WEIGHT",
        }
    }

    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "NAME" => Some(Self::Name),
            "HOST" => Some(Self::Host),
            "PORT" => Some(Self::Port),
            "WEIGHT" => Some(Self::Weight),
            _ => None,
        }
    }
}

/// Identity of one downstream server: the bare single-server form, or `_<N>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ServerSlot {
    // Declared first so it sorts ahead of every index.
    Unindexed,
    Indexed(u64),
}

/// A `FLUENTD_SERVER*` key broken into its structural parts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerKey {
    pub slot: ServerSlot,
    /// `FLUENTD_SERVER` or `FLUENTD_SERVER_<N>`, with the index spelled as in the key.
    pub prefix: String,
    pub field: ServerField,
}

impl ServerKey {
    /// `Ok(None)` when the key does not have the server-key shape at all.
    ///
    /// A key with the right shape but an index that does not fit a `u64` is an
    /// error rather than a mismatch: it clearly meant to declare a server.
    pub fn parse(key: &str) -> Result<Option<Self>, LauncherError> {
        let Some(caps) = SERVER_KEY.captures(key) else {
            return Ok(None);
        };
        let Some(field) = caps.get(2).and_then(|m| ServerField::parse(m.as_str())) else {
            return Ok(None);
        };
        let (slot, prefix) = match caps.get(1) {
            None => (ServerSlot::Unindexed, SERVER_KEY_STEM.to_string()),
            Some(digits) => {
                let index = digits.as_str().parse::<u64>().map_err(|_| LauncherError::InvalidServerKey {
                    key: key.to_string(),
                    reason: "server index is too large",
                })?;
                (ServerSlot::Indexed(index), format!("{}_{}", SERVER_KEY_STEM, digits.as_str()))
            }
        };
        Ok(Some(Self { slot, prefix, field }))
    }
}

/// A value together with the environment key it was read from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldValue {
    pub key: String,
    pub value: String,
}

/// All fields declared for one server, before defaults are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerGroup {
    pub slot: ServerSlot,
    pub prefix: String,
    fields: BTreeMap<ServerField, FieldValue>,
}

impl ServerGroup {
    fn new(slot: ServerSlot, prefix: String) -> Self {
        Self { slot, prefix, fields: BTreeMap::new() }
    }

    pub fn field(&self, field: ServerField) -> Option<&FieldValue> {
        self.fields.get(&field)
    }

    #[cfg(test)]
    pub fn value(&self, field: ServerField) -> Option<&str> {
        self.field(field).map(|f| f.value.as_str())
    }
}

/// Groups every `FLUENTD_SERVER*` variable by server, ordered by slot.
///
/// Any recognised key declares its server, even with an empty value; the
/// empty field itself stays unset. Keys that carry the stem but not the
/// `FLUENTD_SERVER(_<N>)?_<FIELD>` shape are skipped with a warning.
pub fn collect_server_groups(env: &Environment) -> Result<Vec<ServerGroup>, LauncherError> {
    // BTreeMap keyed by slot: unindexed first, then `_1`, `_2`, ... `_10` numerically.
    let mut groups: BTreeMap<ServerSlot, ServerGroup> = BTreeMap::new();

    for (key, value) in env.iter().filter(|(k, _)| k.starts_with(SERVER_KEY_STEM)) {
        let Some(parsed) = ServerKey::parse(key)? else {
            tracing::warn!(key, "Ignoring variable that does not match FLUENTD_SERVER[_<N>]_<FIELD>");
            continue;
        };

        // Declare first: `FLUENTD_SERVER_HOST=${UNSET}` must still fail validation
        // (and still count for the mixed-style check) instead of vanishing.
        let group = groups
            .entry(parsed.slot)
            .or_insert_with(|| ServerGroup::new(parsed.slot, parsed.prefix.clone()));

        // Empty counts as unset, so an empty PORT/WEIGHT still gets its default.
        if value.is_empty() {
            tracing::debug!(key, "Server variable is empty, treating the field as unset");
            continue;
        }

        // `_1_HOST` and `_01_HOST` land in the same slot.
        if let Some(existing) = group.fields.get(&parsed.field) {
            return Err(LauncherError::DuplicateServerField {
                first: existing.key.clone(),
                second: key.to_string(),
            });
        }
        group.fields.insert(
            parsed.field,
            FieldValue { key: key.to_string(), value: value.to_string() },
        );
    }

    // 🛡️ Single-server and indexed forms are mutually exclusive; never merge them.
    if let Some(unindexed) = groups.get(&ServerSlot::Unindexed) {
        if let Some(indexed) = groups.values().find(|g| g.slot != ServerSlot::Unindexed) {
            return Err(LauncherError::MixedServerStyles {
                unindexed: unindexed.prefix.clone(),
                indexed: indexed.prefix.clone(),
            });
        }
    }

    Ok(groups.into_values().collect())
}
