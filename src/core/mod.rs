pub mod calculator;
pub mod engine;
pub mod export;
pub mod normalizer;
pub mod pipeline;
pub mod render;
pub mod rounding;
pub mod session;

pub use crate::domain::model::{BillState, SplitBreakdown, SplitReport};
pub use crate::domain::ports::{ConfigProvider, Extractor, IdentifierSource, Pipeline, Storage};
pub use crate::utils::error::Result;
