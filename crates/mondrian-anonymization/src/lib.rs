//! Mondrian multidimensional k-anonymity.
//!
//! Records are recursively partitioned along their quasi-identifiers until
//! no partition can be split without producing a part smaller than `k`.
//! Every terminal partition becomes an equivalence class whose
//! quasi-identifiers are generalized to a single value: an interval for
//! numerical columns, the lowest common ancestor in the column's hierarchy
//! for categorical ones.

mod anonymizer;
pub mod config;
pub mod conversion;
mod dataset;
mod error;
mod generalize;
pub mod hierarchy;
mod partition;
mod record;
mod split;
pub mod verify;
mod width;

pub use anonymizer::Anonymizer;
pub use config::{AnonymizationConfig, ColumnConfiguration, QuasiIdentifier, QuasiIdentifierKind};
pub use error::{AnonymizationError, Result};
pub use generalize::{format_interval, AnonymizedRecord, Anonymization, EquivalenceClass, Summary};
pub use hierarchy::{Hierarchy, HierarchyDefinition, NodeId};
pub use record::{Record, RecordId, Value};
