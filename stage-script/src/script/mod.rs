//! # Script 模块
//!
//! 脚本文本解析。
//!
//! ## 模块结构
//!
//! - [`parser`]：行式脚本解析器实现

pub mod parser;

pub use parser::{Parser, parse_script};
