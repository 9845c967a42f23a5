use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RosterError {
    #[error("new order is not a permutation of the roster")]
    NotAPermutation,
    #[error("no animal with id {0}")]
    UnknownAnimal(String),
    #[error("MAX {0} LOGS/DAY!")]
    DailyLogLimit(usize),
    #[error("no prescription with id {0}")]
    UnknownPrescription(String),
    #[error("{0}")]
    Rejected(&'static str),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    #[error("sync pin must be at least {min} characters")]
    InvalidPin { min: usize },
    #[error("browser storage is unavailable")]
    StorageUnavailable,
}

#[derive(Debug, Error)]
pub enum PhotoError {
    #[error(transparent)]
    Image(#[from] image::ImageError),
    #[error("not a base64 jpeg data url")]
    NotADataUrl,
    #[error(transparent)]
    Base64(#[from] base64::DecodeError),
}
