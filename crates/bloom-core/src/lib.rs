//! Content rules for the support site: reading and searching resources and
//! forum posts, attaching comments, and validating submissions.
//!
//! Both [`Catalog`] and [`Submissions`] are thin handles over a shared
//! [`bloom_db::Database`]; they keep no state of their own between calls.

pub mod catalog;
mod convert;
pub mod error;
pub mod submissions;
pub mod validate;

pub use catalog::{Catalog, SearchHits};
pub use error::{ContentError, EntityKind, ValidationError};
pub use submissions::{Submissions, resolve_parent};
