use thiserror::Error;

use sampleshop_core::DomainError;
use sampleshop_infra::ShopError;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Shop(#[from] ShopError),

    #[error("model {0} is not registered")]
    NotRegistered(&'static str),

    #[error("csv export failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid fixture: {0}")]
    Fixture(#[from] serde_json::Error),
}

impl From<DomainError> for AdminError {
    fn from(value: DomainError) -> Self {
        AdminError::Shop(ShopError::Domain(value))
    }
}

impl AdminError {
    pub fn is_validation(&self) -> bool {
        matches!(self, AdminError::Shop(e) if e.is_validation())
    }
}
