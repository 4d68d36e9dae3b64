pub mod client;
pub mod export;
pub mod layers;
pub mod ordering;
pub mod replace;
pub mod services;
pub mod styles;
pub mod transport;
pub mod upload;
pub mod webmap;

pub use crate::domain::model::{ErrorPolicy, ResourceClass, ResourceInfo, ResourceItem, WebmapItem};
pub use crate::domain::ports::FileUploader;
pub use crate::utils::error::Result;
