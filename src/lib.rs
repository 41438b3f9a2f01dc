pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod password;
pub mod retention;
pub mod service;
pub mod state;
pub mod worker;

use std::sync::Arc;

use crate::config::Config;
use crate::db::Gateway;
use crate::retention::Purger;
use crate::service::UserService;
use crate::state::{AppState, SharedState};

/// Wire the user service and purger to one shared gateway.
pub fn build_state(gateway: Arc<dyn Gateway>, config: Config) -> SharedState {
    Arc::new(AppState {
        users: UserService::new(gateway.clone()),
        purger: Purger::new(gateway),
        config,
    })
}
