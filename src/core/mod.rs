pub mod etl;
pub mod fetcher;
pub mod grid;
pub mod header;
pub mod pipeline;
pub mod table;
pub mod transcriber;
pub mod tree;

pub use crate::domain::model::{EndpointConfig, FetchReport, ResponseDescriptor, ResponseKind};
pub use crate::domain::ports::{Pipeline, Storage};
pub use crate::utils::error::Result;
