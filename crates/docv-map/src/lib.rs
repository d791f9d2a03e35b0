#![deny(unsafe_code)]

pub mod detect;
pub mod error;
pub mod mapper;
pub mod repository;
pub mod store;

pub use detect::{DEFAULT_MIN_CONFIDENCE, Detection, Detector};
pub use error::{DetectError, MapError};
pub use mapper::{MapperOptions, apply_overrides, generate, generate_with_rows, resolve_column};
pub use repository::{FsMappingRepository, StoredMapping};
pub use store::{InMemoryMappingStore, MappingStore};
