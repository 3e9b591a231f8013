//! Domain layer for the inventory service.
//!
//! This crate provides the stock-level engine:
//! - Canonical stock adjustment and stock count requests, validated into typed commands
//! - `StockLevelService`, which applies relative adjustments and absolute counts
//! - `DomainError` and the client-facing `ErrorKind` taxonomy

pub mod error;
pub mod stock;

pub use error::{DomainError, ErrorKind, Result};
pub use stock::{
    StockAdjustment, StockAdjustmentRequest, StockCount, StockCountRequest, StockLevelService,
};
