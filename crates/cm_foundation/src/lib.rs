// crates/cm_foundation/src/lib.rs

//! CartaMatch 基础层
//!
//! 提供整个工作空间共享的错误类型。领域相关的错误（几何、匹配）
//! 在各自的 crate 中扩展。

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;

pub use error::{CmError, CmResult};
