//! # Annolink CLI Library
//!
//! Web Annotation を LDP サーバーへ保存・読み込みするコマンドラインインターフェース

pub mod commands;

pub use commands::*;
