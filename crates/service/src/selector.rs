use tracing::info;

use configs::{BackendKind, DatabaseConfig};

use crate::contract::FleetService;
use crate::errors::FleetError;
use crate::mapped::MappedBackend;
use crate::raw::RawBackend;

/// Builds a fresh backend for the requested strategy. Callers hold the
/// instance for as long as they like; nothing is shared between instances.
#[derive(Debug, Clone)]
pub struct ServiceSelector {
    database: DatabaseConfig,
}

impl ServiceSelector {
    pub fn new(database: DatabaseConfig) -> Self {
        Self { database }
    }

    pub async fn select(&self, kind: BackendKind) -> Result<Box<dyn FleetService>, FleetError> {
        create_service(kind, &self.database).await
    }
}

pub async fn create_service(kind: BackendKind, cfg: &DatabaseConfig) -> Result<Box<dyn FleetService>, FleetError> {
    let service: Box<dyn FleetService> = match kind {
        BackendKind::Mapped => Box::new(MappedBackend::connect(cfg).await?),
        BackendKind::Raw => Box::new(RawBackend::connect(cfg)?),
    };
    info!(backend = %kind, "fleet service ready");
    Ok(service)
}
