//! Stock-level engine and its request types.

mod commands;
mod service;

pub use commands::{StockAdjustment, StockAdjustmentRequest, StockCount, StockCountRequest};
pub use service::StockLevelService;
