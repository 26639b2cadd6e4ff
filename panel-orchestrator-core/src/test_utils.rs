//! Test helpers
//!
//! Provides a scriptable mock of the remote panel plus item factories.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use panel_orchestrator_client::{
    ClientError, CreateDatabaseRequest, CreateDatabaseUserRequest, CreateWebDomainRequest,
    Database, DatabaseUser, ProvisioningClient, Result as ClientResult, WebDomain,
};

use crate::types::MigrationItem;

type ScriptedResult = ClientResult<i64>;

/// A scriptable in-memory panel.
///
/// Create calls pop pre-scripted results (falling back to auto-generated
/// ids when the script is empty) and record the requested names so tests
/// can assert which remote calls were — or were not — made. Job-count
/// queries pop a scripted sequence and read 0 once it is exhausted.
pub struct MockClient {
    pub domains: Mutex<Vec<WebDomain>>,
    pub database_users: Mutex<Vec<DatabaseUser>>,
    pub databases: Mutex<Vec<Database>>,

    domain_results: Mutex<VecDeque<ScriptedResult>>,
    user_results: Mutex<VecDeque<ScriptedResult>>,
    database_results: Mutex<VecDeque<ScriptedResult>>,
    job_counts: Mutex<VecDeque<ClientResult<u64>>>,

    created_domains: Mutex<Vec<String>>,
    created_users: Mutex<Vec<String>>,
    created_databases: Mutex<Vec<String>>,
    job_queries: AtomicU32,

    next_id: AtomicI64,
}

impl Default for MockClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockClient {
    pub fn new() -> Self {
        Self {
            domains: Mutex::new(Vec::new()),
            database_users: Mutex::new(Vec::new()),
            databases: Mutex::new(Vec::new()),
            domain_results: Mutex::new(VecDeque::new()),
            user_results: Mutex::new(VecDeque::new()),
            database_results: Mutex::new(VecDeque::new()),
            job_counts: Mutex::new(VecDeque::new()),
            created_domains: Mutex::new(Vec::new()),
            created_users: Mutex::new(Vec::new()),
            created_databases: Mutex::new(Vec::new()),
            job_queries: AtomicU32::new(0),
            next_id: AtomicI64::new(1000),
        }
    }

    // ---- scripting ----

    pub fn push_domain_result(&self, result: ScriptedResult) {
        self.domain_results.lock().unwrap().push_back(result);
    }

    pub fn push_user_result(&self, result: ScriptedResult) {
        self.user_results.lock().unwrap().push_back(result);
    }

    pub fn push_database_result(&self, result: ScriptedResult) {
        self.database_results.lock().unwrap().push_back(result);
    }

    pub fn push_job_count(&self, result: ClientResult<u64>) {
        self.job_counts.lock().unwrap().push_back(result);
    }

    pub fn script_job_counts(&self, counts: &[u64]) {
        let mut queue = self.job_counts.lock().unwrap();
        for count in counts {
            queue.push_back(Ok(*count));
        }
    }

    pub fn set_existing_domains(&self, domains: Vec<WebDomain>) {
        *self.domains.lock().unwrap() = domains;
    }

    pub fn set_existing_database_users(&self, users: Vec<DatabaseUser>) {
        *self.database_users.lock().unwrap() = users;
    }

    pub fn set_existing_databases(&self, databases: Vec<Database>) {
        *self.databases.lock().unwrap() = databases;
    }

    // ---- observation ----

    pub fn created_domains(&self) -> Vec<String> {
        self.created_domains.lock().unwrap().clone()
    }

    pub fn created_users(&self) -> Vec<String> {
        self.created_users.lock().unwrap().clone()
    }

    pub fn created_databases(&self) -> Vec<String> {
        self.created_databases.lock().unwrap().clone()
    }

    pub fn job_query_count(&self) -> u32 {
        self.job_queries.load(Ordering::SeqCst)
    }

    fn pop_or_auto(&self, queue: &Mutex<VecDeque<ScriptedResult>>) -> ScriptedResult {
        queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(self.next_id.fetch_add(1, Ordering::SeqCst)))
    }
}

#[async_trait]
impl ProvisioningClient for MockClient {
    async fn create_web_domain(
        &self,
        _client_id: i64,
        req: &CreateWebDomainRequest,
    ) -> ClientResult<i64> {
        self.created_domains.lock().unwrap().push(req.domain.clone());
        self.pop_or_auto(&self.domain_results)
    }

    async fn create_database_user(
        &self,
        _client_id: i64,
        req: &CreateDatabaseUserRequest,
    ) -> ClientResult<i64> {
        self.created_users
            .lock()
            .unwrap()
            .push(req.database_user.clone());
        self.pop_or_auto(&self.user_results)
    }

    async fn create_database(
        &self,
        _client_id: i64,
        req: &CreateDatabaseRequest,
    ) -> ClientResult<i64> {
        self.created_databases
            .lock()
            .unwrap()
            .push(req.database_name.clone());
        self.pop_or_auto(&self.database_results)
    }

    async fn get_web_domain(&self, domain_id: i64) -> ClientResult<WebDomain> {
        self.domains
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.domain_id == domain_id)
            .cloned()
            .ok_or_else(|| not_found("sites_web_domain_get", domain_id))
    }

    async fn get_database_user(&self, database_user_id: i64) -> ClientResult<DatabaseUser> {
        self.database_users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.database_user_id == database_user_id)
            .cloned()
            .ok_or_else(|| not_found("sites_database_user_get", database_user_id))
    }

    async fn get_database(&self, database_id: i64) -> ClientResult<Database> {
        self.databases
            .lock()
            .unwrap()
            .iter()
            .find(|d| d.database_id == database_id)
            .cloned()
            .ok_or_else(|| not_found("sites_database_get", database_id))
    }

    async fn list_web_domains(
        &self,
        _sys_userid: i64,
        _sys_groupid: i64,
    ) -> ClientResult<Vec<WebDomain>> {
        Ok(self.domains.lock().unwrap().clone())
    }

    async fn list_database_users(&self) -> ClientResult<Vec<DatabaseUser>> {
        Ok(self.database_users.lock().unwrap().clone())
    }

    async fn list_databases(&self, _client_id: i64) -> ClientResult<Vec<Database>> {
        Ok(self.databases.lock().unwrap().clone())
    }

    async fn delete_web_domain(&self, domain_id: i64) -> ClientResult<u64> {
        let mut domains = self.domains.lock().unwrap();
        let before = domains.len();
        domains.retain(|d| d.domain_id != domain_id);
        Ok((before - domains.len()) as u64)
    }

    async fn pending_job_count(&self, _server_id: i64) -> ClientResult<u64> {
        self.job_queries.fetch_add(1, Ordering::SeqCst);
        self.job_counts.lock().unwrap().pop_front().unwrap_or(Ok(0))
    }
}

fn not_found(method: &str, id: i64) -> ClientError {
    ClientError::ResourceNotFound {
        method: method.to_string(),
        resource: id.to_string(),
        raw_message: None,
    }
}

/// A `ResourceExists` conflict, as a failed create would report it.
pub fn exists_error(name: &str) -> ClientError {
    ClientError::ResourceExists {
        method: "mock_add".to_string(),
        resource: name.to_string(),
        raw_message: Some("error_unique".to_string()),
    }
}

/// Build migration items with derived credentials: `a.com` gets user
/// `u_a.com`, password `secret`, database `d_a.com`.
pub fn items_from_names(names: &[&str]) -> Vec<MigrationItem> {
    names
        .iter()
        .map(|name| MigrationItem {
            name: (*name).to_string(),
            db_user: format!("u_{name}"),
            db_password: "secret".to_string(),
            db_name: format!("d_{name}"),
            domain_id: None,
            db_user_id: None,
            db_id: None,
        })
        .collect()
}
