//! Service layer for scanshelf business logic.
//!
//! This module contains domain logic separated from UI concerns.
//! Services can be used by the CLI or driven directly from tests.

pub mod artifacts;
pub mod discovery;
pub mod error;
pub mod isbn;
pub mod metadata;
pub mod pipeline;
pub mod publication;
pub mod search;

pub use discovery::discover_publications;
pub use error::ProcessError;
pub use metadata::{
    GoogleBooksClient, MetadataError, MetadataResolver, VolumeLookup, VolumesResponse,
};
pub use pipeline::PagePipeline;
pub use publication::{
    BatchResult, MetaOutcome, ProcessEvent, PublicationOutcome, PublicationService,
};
pub use search::WordCount;
