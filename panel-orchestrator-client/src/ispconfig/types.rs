//! Wire types for the ISPConfig JSON remote API
//!
//! ISPConfig serializes most database columns as strings, including numeric
//! ids (`"domain_id": "7"`), and newer releases return plain numbers for
//! some of them. Every id field therefore goes through a tolerant
//! number-or-string deserializer.

use serde::{Deserialize, Deserializer};

use crate::types::{Database, DatabaseUser, WebDomain};

// ============ Envelope ============

/// The `{ code, message, response }` envelope every remote call returns.
///
/// `response` stays untyped until the code has been checked: on a fault the
/// panel puts `false` (or nothing) there, which must not break envelope
/// parsing before the fault can be mapped.
#[derive(Debug, Deserialize)]
pub(crate) struct RemoteResponse {
    pub code: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub response: Option<serde_json::Value>,
}

// ============ Tolerant scalars ============

fn parse_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrStr {
        Num(i64),
        Str(String),
    }

    match NumOrStr::deserialize(deserializer)? {
        NumOrStr::Num(n) => Ok(n),
        NumOrStr::Str(s) => s.trim().parse::<i64>().map_err(serde::de::Error::custom),
    }
}

fn parse_opt_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum MaybeNum {
        Num(i64),
        Str(String),
        None,
    }

    match Option::<MaybeNum>::deserialize(deserializer)? {
        None | Some(MaybeNum::None) => Ok(None),
        Some(MaybeNum::Num(n)) => Ok(Some(n)),
        Some(MaybeNum::Str(s)) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Ok(None)
            } else {
                trimmed
                    .parse::<i64>()
                    .map(Some)
                    .map_err(serde::de::Error::custom)
            }
        }
    }
}

/// A bare id returned by create calls (`response: 42` or `response: "42"`).
#[derive(Debug)]
pub(crate) struct RemoteId(pub i64);

impl<'de> Deserialize<'de> for RemoteId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        parse_i64(deserializer).map(RemoteId)
    }
}

/// A bare count (`monitor_jobqueue_count`, `sites_web_domain_delete`).
#[derive(Debug)]
pub(crate) struct RemoteCount(pub u64);

impl<'de> Deserialize<'de> for RemoteCount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let n = parse_i64(deserializer)?;
        u64::try_from(n)
            .map(RemoteCount)
            .map_err(serde::de::Error::custom)
    }
}

// ============ Resource rows ============

#[derive(Debug, Deserialize)]
pub(crate) struct IspcWebDomain {
    #[serde(deserialize_with = "parse_i64")]
    pub domain_id: i64,
    pub domain: String,
}

impl From<IspcWebDomain> for WebDomain {
    fn from(row: IspcWebDomain) -> Self {
        Self {
            domain_id: row.domain_id,
            domain: row.domain,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct IspcDatabaseUser {
    #[serde(deserialize_with = "parse_i64")]
    pub database_user_id: i64,
    pub database_user: String,
}

impl From<IspcDatabaseUser> for DatabaseUser {
    fn from(row: IspcDatabaseUser) -> Self {
        Self {
            database_user_id: row.database_user_id,
            database_user: row.database_user,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct IspcDatabase {
    #[serde(deserialize_with = "parse_i64")]
    pub database_id: i64,
    pub database_name: String,
    #[serde(default, deserialize_with = "parse_opt_i64")]
    pub database_user_id: Option<i64>,
    #[serde(default, deserialize_with = "parse_opt_i64")]
    pub parent_domain_id: Option<i64>,
}

impl From<IspcDatabase> for Database {
    fn from(row: IspcDatabase) -> Self {
        Self {
            database_id: row.database_id,
            database_name: row.database_name,
            database_user_id: row.database_user_id,
            parent_domain_id: row.parent_domain_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_ok_with_string_response() {
        let raw = r#"{"code":"ok","message":"","response":"abc123"}"#;
        let env: RemoteResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(env.code, "ok");
        assert_eq!(env.response, Some(serde_json::json!("abc123")));
    }

    #[test]
    fn envelope_fault_without_response() {
        let raw = r#"{"code":"remote_fault","message":"The login failed. Username or password wrong."}"#;
        let env: RemoteResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(env.code, "remote_fault");
        assert!(env.response.is_none());
    }

    #[test]
    fn envelope_fault_with_false_response_still_parses() {
        let raw = r#"{"code":"remote_fault","message":"domain_error_unique","response":false}"#;
        let env: RemoteResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(env.code, "remote_fault");
        assert_eq!(env.response, Some(serde_json::json!(false)));
    }

    #[test]
    fn remote_id_from_number_and_string() {
        let n: RemoteId = serde_json::from_str("42").unwrap();
        assert_eq!(n.0, 42);
        let s: RemoteId = serde_json::from_str(r#""42""#).unwrap();
        assert_eq!(s.0, 42);
    }

    #[test]
    fn remote_count_rejects_negative() {
        let r: Result<RemoteCount, _> = serde_json::from_str("-3");
        assert!(r.is_err());
    }

    #[test]
    fn web_domain_row_with_string_id() {
        let raw = r#"{"domain_id":"7","domain":"a.com","active":"y"}"#;
        let row: IspcWebDomain = serde_json::from_str(raw).unwrap();
        let domain: WebDomain = row.into();
        assert_eq!(domain.domain_id, 7);
        assert_eq!(domain.domain, "a.com");
    }

    #[test]
    fn database_row_with_empty_owner() {
        let raw = r#"{"database_id":3,"database_name":"c1_app","database_user_id":"","parent_domain_id":"9"}"#;
        let row: IspcDatabase = serde_json::from_str(raw).unwrap();
        assert_eq!(row.database_user_id, None);
        assert_eq!(row.parent_domain_id, Some(9));
    }
}
