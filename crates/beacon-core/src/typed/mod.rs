//! Typed - 型付き Operator API
//!
//! task_type の typo を型で排除し、envelope と operator の対応付けを静的に保証します。
//!
//! # 二層構造
//! - **表層（Typed）**: `Operator` trait - 型安全
//! - **内部（Dyn）**: `DynOperator` trait - object-safe, type erasure

pub mod context;
pub mod handler;
pub mod operator;
pub mod registry;

// 主要な trait/型 を再エクスポート
pub use self::context::{ExecutionContext, Services};
pub use self::handler::DynOperator;
pub use self::operator::Operator;
pub use self::registry::{OperatorRegistry, RegistryError};
