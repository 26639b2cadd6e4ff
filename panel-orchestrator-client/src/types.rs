use serde::{Deserialize, Serialize};

// ============ Connection ============

/// Connection settings for a remote panel.
#[derive(Debug, Clone, Deserialize)]
pub struct PanelConfig {
    /// Remote API endpoint, e.g. `https://panel.example.com:8080/remote/json.php`.
    pub endpoint: String,
    /// Remote API username.
    pub username: String,
    /// Remote API password.
    pub password: String,
    /// Accept self-signed / invalid TLS certificates.
    ///
    /// Hosting panels are commonly reachable only through their own
    /// self-signed certificate; default is `false`.
    #[serde(default)]
    pub insecure_tls: bool,
}

// ============ Resource Records ============

/// A web domain (site) that exists on the panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebDomain {
    /// Panel-assigned domain identifier.
    pub domain_id: i64,
    /// Domain name (e.g. `"example.com"`).
    pub domain: String,
}

/// A database user that exists on the panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseUser {
    /// Panel-assigned user identifier.
    pub database_user_id: i64,
    /// Login name of the database user.
    pub database_user: String,
}

/// A database that exists on the panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Database {
    /// Panel-assigned database identifier.
    pub database_id: i64,
    /// Database name.
    pub database_name: String,
    /// Owning database user, if attached.
    pub database_user_id: Option<i64>,
    /// Owning web domain, if attached.
    pub parent_domain_id: Option<i64>,
}

// ============ Create Requests ============

/// Parameters for creating a web domain.
///
/// Everything except `domain` has a sensible fixed default matching a
/// standard name-based PHP-FPM vhost, so callers usually set only the
/// domain name:
///
/// ```
/// use panel_orchestrator_client::CreateWebDomainRequest;
///
/// let req = CreateWebDomainRequest {
///     domain: "example.com".to_string(),
///     ..Default::default()
/// };
/// assert_eq!(req.subdomain, "www");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateWebDomainRequest {
    pub server_id: i64,
    pub domain: String,
    pub subdomain: String,
    pub rewrite_to_https: String,
    pub hd_quota: i64,
    pub traffic_quota: i64,
    pub traffic_quota_lock: String,
    pub allow_override: String,
    pub pm: String,
    pub pm_process_idle_timeout: u32,
    pub pm_max_requests: u32,
    pub http_port: u16,
    pub https_port: u16,
    #[serde(rename = "type")]
    pub vhost_kind: String,
    pub ip_address: String,
    pub vhost_type: String,
    pub active: String,
    pub php: String,
    pub php_fpm_use_socket: String,
    pub suexec: String,
    pub backup_interval: String,
    pub backup_copies: u32,
    pub backup_format_web: String,
    pub backup_format_db: String,
    pub backup_excludes: String,
    pub log_retention: u32,
    pub server_php_id: i64,
    pub directive_snippets_id: i64,
}

impl Default for CreateWebDomainRequest {
    fn default() -> Self {
        Self {
            server_id: 1,
            domain: String::new(),
            subdomain: "www".to_string(),
            rewrite_to_https: "n".to_string(),
            hd_quota: -1,
            traffic_quota: -1,
            traffic_quota_lock: "n".to_string(),
            allow_override: "All".to_string(),
            pm: "ondemand".to_string(),
            pm_process_idle_timeout: 10,
            pm_max_requests: 0,
            http_port: 80,
            https_port: 443,
            vhost_kind: "vhost".to_string(),
            ip_address: "*".to_string(),
            vhost_type: "name".to_string(),
            active: "y".to_string(),
            php: "php-fpm".to_string(),
            php_fpm_use_socket: "y".to_string(),
            suexec: "y".to_string(),
            backup_interval: "daily".to_string(),
            backup_copies: 2,
            backup_format_web: "default".to_string(),
            backup_format_db: "gzip".to_string(),
            backup_excludes: "private,tmp,web,log".to_string(),
            log_retention: 10,
            server_php_id: 2,
            directive_snippets_id: 0,
        }
    }
}

/// Parameters for creating a database user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDatabaseUserRequest {
    pub server_id: i64,
    pub database_user: String,
    pub database_password: String,
}

impl Default for CreateDatabaseUserRequest {
    fn default() -> Self {
        Self {
            server_id: 1,
            database_user: String::new(),
            database_password: String::new(),
        }
    }
}

/// Parameters for creating a database attached to a domain and a user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDatabaseRequest {
    pub server_id: i64,
    #[serde(rename = "type")]
    pub database_kind: String,
    pub parent_domain_id: i64,
    pub database_name: String,
    pub database_user_id: i64,
    pub database_ro_user_id: i64,
    pub database_charset: String,
    pub database_quota: i64,
    pub remote_access: String,
    pub remote_ips: String,
    pub backup_interval: String,
    pub backup_copies: u32,
    pub active: String,
}

impl Default for CreateDatabaseRequest {
    fn default() -> Self {
        Self {
            server_id: 1,
            database_kind: "mysql".to_string(),
            parent_domain_id: 0,
            database_name: String::new(),
            database_user_id: 0,
            database_ro_user_id: 0,
            database_charset: String::new(),
            database_quota: -1,
            remote_access: "n".to_string(),
            remote_ips: String::new(),
            backup_interval: "daily".to_string(),
            backup_copies: 2,
            active: "y".to_string(),
        }
    }
}
