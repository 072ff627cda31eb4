use crate::config::Config;
use crate::gateway::ModelGateway;
use crate::limits::EndpointLimits;
use sqlx::{Pool, Postgres};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: Pool<Postgres>,
    pub redis: redis::Client,
    pub config: Arc<Config>,
    pub gateway: Arc<ModelGateway>,
    pub limits: Arc<EndpointLimits>,
}
