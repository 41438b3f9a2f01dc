use std::sync::Arc;

use crate::config::Config;
use crate::retention::Purger;
use crate::service::UserService;

pub struct AppState {
    pub config: Config,
    pub users: UserService,
    pub purger: Purger,
}

pub type SharedState = Arc<AppState>;
