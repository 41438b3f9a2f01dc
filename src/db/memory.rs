//! In-process [`Gateway`] used by tests and local tooling.
//!
//! Mirrors the Postgres schema rules that the core relies on: unique
//! case-sensitive usernames, server-assigned ids, the history foreign key
//! and `created_at` defaulting to the insertion time.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::{Gateway, GatewayError};
use crate::models::{History, NewHistory, NewUser, User, UserDto, UserFields, UserFilter, UserLookup};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    processes: Vec<i64>,
    histories: Vec<History>,
    next_user_id: i64,
    next_process_id: i64,
    next_history_id: i64,
}

#[derive(Default)]
pub struct MemoryGateway {
    tables: Mutex<Tables>,
    injected_failure: Mutex<Option<GatewayError>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next gateway call fail with `err`.
    pub fn fail_next(&self, err: GatewayError) {
        if let Ok(mut slot) = self.injected_failure.lock() {
            *slot = Some(err);
        }
    }

    pub fn history_count(&self) -> usize {
        self.tables.lock().map(|t| t.histories.len()).unwrap_or(0)
    }

    fn with_tables<F, T>(&self, f: F) -> Result<T, GatewayError>
    where
        F: FnOnce(&mut Tables) -> Result<T, GatewayError>,
    {
        let injected = self
            .injected_failure
            .lock()
            .map_err(|e| GatewayError::Other(format!("Failure slot poisoned: {e}")))?
            .take();
        if let Some(err) = injected {
            return Err(err);
        }

        let mut tables = self
            .tables
            .lock()
            .map_err(|e| GatewayError::Other(format!("Tables lock poisoned: {e}")))?;
        f(&mut tables)
    }
}

fn unique_username(username: &str) -> GatewayError {
    GatewayError::UniqueViolation(format!(
        "duplicate key value violates unique constraint \"users_username_key\" ({username})"
    ))
}

fn lookup<'t>(tables: &'t Tables, lookup: UserLookup<'_>) -> Option<&'t User> {
    tables.users.iter().find(|u| match lookup {
        UserLookup::Id(id) => u.id == id,
        UserLookup::Username(name) => u.username == name,
    })
}

#[async_trait]
impl Gateway for MemoryGateway {
    async fn insert_user(&self, user: &NewUser) -> Result<User, GatewayError> {
        self.with_tables(|tables| {
            if tables.users.iter().any(|u| u.username == user.username) {
                return Err(unique_username(&user.username));
            }
            tables.next_user_id += 1;
            let row = User {
                id: tables.next_user_id,
                username: user.username.clone(),
                password: user.password.clone(),
                role: user.role.clone(),
                is_active: false,
                created_at: Utc::now(),
            };
            tables.users.push(row.clone());
            Ok(row)
        })
    }

    async fn find_user(&self, by: UserLookup<'_>) -> Result<User, GatewayError> {
        self.with_tables(|tables| lookup(tables, by).cloned().ok_or(GatewayError::NotFound))
    }

    async fn find_user_dto(&self, by: UserLookup<'_>) -> Result<UserDto, GatewayError> {
        self.with_tables(|tables| {
            lookup(tables, by)
                .map(UserDto::from)
                .ok_or(GatewayError::NotFound)
        })
    }

    async fn find_users(&self, filter: &UserFilter) -> Result<Vec<UserDto>, GatewayError> {
        self.with_tables(|tables| {
            let mut found: Vec<UserDto> = tables
                .users
                .iter()
                .filter(|u| filter.matches(u))
                .map(UserDto::from)
                .collect();
            found.sort_by_key(|u| u.id);
            Ok(found)
        })
    }

    async fn update_user(&self, id: i64, fields: &UserFields) -> Result<User, GatewayError> {
        self.with_tables(|tables| {
            if tables
                .users
                .iter()
                .any(|u| u.id != id && u.username == fields.username)
            {
                return Err(unique_username(&fields.username));
            }
            let user = tables
                .users
                .iter_mut()
                .find(|u| u.id == id)
                .ok_or(GatewayError::NotFound)?;
            user.username = fields.username.clone();
            user.is_active = fields.is_active;
            user.role = fields.role.clone();
            Ok(user.clone())
        })
    }

    async fn insert_process(&self, _name: &str) -> Result<i64, GatewayError> {
        self.with_tables(|tables| {
            tables.next_process_id += 1;
            let id = tables.next_process_id;
            tables.processes.push(id);
            Ok(id)
        })
    }

    async fn insert_history(&self, history: &NewHistory) -> Result<History, GatewayError> {
        self.with_tables(|tables| {
            if !tables.processes.contains(&history.process_id) {
                return Err(GatewayError::Other(format!(
                    "insert on table \"histories\" violates foreign key constraint (process_id={})",
                    history.process_id
                )));
            }
            tables.next_history_id += 1;
            let row = History {
                id: tables.next_history_id,
                process_id: history.process_id,
                sender: history.sender.clone(),
                receiver: history.receiver.clone(),
                content: history.content.clone(),
                role_as: history.role_as.clone(),
                created_at: history.created_at.unwrap_or_else(Utc::now),
            };
            tables.histories.push(row.clone());
            Ok(row)
        })
    }

    async fn find_histories(&self, process_id: i64) -> Result<Vec<History>, GatewayError> {
        self.with_tables(|tables| {
            let mut found: Vec<History> = tables
                .histories
                .iter()
                .filter(|h| h.process_id == process_id)
                .cloned()
                .collect();
            found.sort_by_key(|h| (h.created_at, h.id));
            Ok(found)
        })
    }

    async fn delete_histories_before(&self, cutoff: DateTime<Utc>) -> Result<u64, GatewayError> {
        self.with_tables(|tables| {
            let before = tables.histories.len();
            tables.histories.retain(|h| h.created_at >= cutoff);
            Ok((before - tables.histories.len()) as u64)
        })
    }
}
