//! slide-visual-rust
//!
//! 投影片の内容を解析し、必要なものだけ資訊圖表（インフォグラフィック）を生成する。
//! 判定ロジック本体は `slide_visual_common`、ここにはCLI・設定・生成クライアントを置く。

pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod input;
