pub mod errors;
pub mod mapping_pair;

pub use errors::{EntityKind, Error, Result};
pub use mapping_pair::{sort_by_attraction, validate_id, MappingPair, PairKey};
