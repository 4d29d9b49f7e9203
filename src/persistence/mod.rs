use crate::PickupPlanner;
use crate::validation::ValidationError;
use serde_json::Error as SerdeJsonError;
use std::fmt;
use std::io;

#[derive(Debug)]
pub enum PersistenceError {
    Serialization(SerdeJsonError),
    Io(io::Error),
    #[cfg(feature = "sqlite")]
    Sqlite(rusqlite::Error),
    Csv(csv::Error),
    InvalidData(String),
    NotFound,
}

impl fmt::Display for PersistenceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PersistenceError::Serialization(err) => write!(f, "serialization error: {err}"),
            PersistenceError::Io(err) => write!(f, "io error: {err}"),
            #[cfg(feature = "sqlite")]
            PersistenceError::Sqlite(err) => write!(f, "sqlite error: {err}"),
            PersistenceError::Csv(err) => write!(f, "csv error: {err}"),
            PersistenceError::InvalidData(msg) => write!(f, "invalid data: {msg}"),
            PersistenceError::NotFound => write!(f, "no planner stored"),
        }
    }
}

impl std::error::Error for PersistenceError {}

impl From<SerdeJsonError> for PersistenceError {
    fn from(value: SerdeJsonError) -> Self {
        Self::Serialization(value)
    }
}

impl From<io::Error> for PersistenceError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::Error> for PersistenceError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

impl From<csv::Error> for PersistenceError {
    fn from(value: csv::Error) -> Self {
        Self::Csv(value)
    }
}

impl From<ValidationError> for PersistenceError {
    fn from(value: ValidationError) -> Self {
        Self::InvalidData(value.to_string())
    }
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

pub trait PlannerStore {
    fn save_planner(&self, planner: &PickupPlanner) -> PersistenceResult<()>;
    fn load_planner(&self) -> PersistenceResult<Option<PickupPlanner>>;
}

pub mod file;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{
    load_planner_from_json, load_schedules_from_csv, save_planner_to_json, save_schedules_to_csv,
};
