//! Data models for scanshelf.

mod meta;
mod page;
mod publication;

pub use meta::MetaRecord;
pub use page::Page;
pub use publication::{
    Publication, PublicationStatus, META_FILENAME, SEARCH_FILENAME, STRUCTURE_FILENAME,
};
