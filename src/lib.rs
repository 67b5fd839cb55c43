//! # MFG
//!
//! 製令生命週期與物料需求引擎
//!
//! - [`model`]：資料模型（數量、金額、BOM、製令、庫存快照、錯誤）
//! - [`engine`]：領域服務與生命週期控制

pub mod logging;

pub use mfg_calc as engine;
pub use mfg_core as model;

pub use mfg_calc::{LifecycleController, ManufacturingOrderDomainService};
pub use mfg_core::{MfgError, Result};
