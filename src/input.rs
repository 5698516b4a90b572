//! 投影片JSONの読み込みと結果JSONの書き出し

use crate::error::{Result, SlideVisualError};
use serde::Serialize;
use slide_visual_common::{parse_slides, Slide};
use std::path::Path;

/// 投影片JSON（`[{title, content}]`）を読み込む
///
/// 空配列は [`SlideVisualError::NoSlidesFound`]。
pub fn load_slides(path: &Path) -> Result<Vec<Slide>> {
    if !path.exists() {
        return Err(SlideVisualError::FileNotFound(path.display().to_string()));
    }

    let content = std::fs::read_to_string(path)?;
    let slides = parse_slides(&content)?;

    if slides.is_empty() {
        return Err(SlideVisualError::NoSlidesFound(path.display().to_string()));
    }

    log::debug!("{}枚の投影片を読み込み: {}", slides.len(), path.display());
    Ok(slides)
}

/// JSONを書き出す。パス未指定なら標準出力
pub fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, json)?;
        }
        None => println!("{}", json),
    }
    Ok(())
}
