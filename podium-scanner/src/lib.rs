pub mod config;
pub mod country;
pub mod document;
pub mod error;
pub mod locate;
pub mod render;
pub mod source;
pub mod table;

pub use config::{CacheScope, SourceConfig};
pub use country::resolve_country;
pub use document::{Document, Link, Node};
pub use error::{Result, ScanError};
pub use locate::{Heading, HeadingLevel, HeadingMatch, find_table_after, locate_section, section_table};
pub use render::render_mixed;
pub use source::{CachedSource, DocumentSource, HttpSource, MemorySource, fetch_or_none};
pub use table::{Row, RowSelection, Table};
