//! Migration input records

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

/// One provisioning unit: a web domain plus its database credentials and
/// database.
///
/// Created from the input list at run start and enriched in place as the
/// stages progress — the id fields start out `None` and are filled with the
/// created (or name-resolved) identifiers. Items are never removed from the
/// working list; an item whose stage produced nothing simply keeps `None`
/// and is treated as a precondition failure by later stages that need it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationItem {
    /// Desired domain name. Immutable; the unique key for fallback lookup.
    #[serde(rename = "website_name")]
    pub name: String,

    /// Database user login to create.
    #[serde(rename = "mysql_user")]
    pub db_user: String,

    /// Password for the database user.
    #[serde(rename = "mysql_pass")]
    pub db_password: String,

    /// Database name to create.
    #[serde(rename = "mysql_base")]
    pub db_name: String,

    /// Set after the domain stage (created or resolved).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_id: Option<i64>,

    /// Set after the database-user stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_user_id: Option<i64>,

    /// Set after the database stage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_id: Option<i64>,
}

impl MigrationItem {
    /// Presence check for the required input fields.
    fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("'website_name' must not be empty".to_string());
        }
        if self.db_user.trim().is_empty() {
            return Err("'mysql_user' must not be empty".to_string());
        }
        if self.db_password.is_empty() {
            return Err("'mysql_pass' must not be empty".to_string());
        }
        if self.db_name.trim().is_empty() {
            return Err("'mysql_base' must not be empty".to_string());
        }
        Ok(())
    }
}

/// Parse and validate a migration list from raw JSON.
///
/// Anything other than an array of complete records is a fatal input error;
/// nothing has touched the remote panel at this point.
pub fn parse_migration_list(raw: &str) -> CoreResult<Vec<MigrationItem>> {
    let items: Vec<MigrationItem> = serde_json::from_str(raw)
        .map_err(|e| CoreError::InvalidInput(format!("not a valid migration list: {e}")))?;

    for (index, item) in items.iter().enumerate() {
        item.validate()
            .map_err(|reason| CoreError::InvalidInput(format!("record {index}: {reason}")))?;
    }

    Ok(items)
}
