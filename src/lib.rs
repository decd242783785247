//! Certificate gallery for a personal portfolio page.

pub mod error;
pub mod fetch;
pub mod gallery;
pub mod models;
pub mod page;
pub mod render;
pub mod target;


pub use error::{ErrorKind, FetchError, GalleryError};
pub use fetch::{DocumentFetcher, FetchedDocument, FileFetcher, HttpFetcher};
pub use gallery::{CertificateGallery, LoadOutcome};
pub use page::{PageStatus, PortfolioPage};
pub use target::{MemoryTarget, RenderTarget};
