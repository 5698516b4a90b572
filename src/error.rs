use thiserror::Error;

#[derive(Error, Debug)]
pub enum SlideVisualError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("APIキーが設定されていません。`slide-visual config --set-api-key YOUR_KEY` または環境変数 KIE_AI_API_KEY で設定してください")]
    MissingApiKey,

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("投影片がありません: {0}")]
    NoSlidesFound(String),

    #[error("API呼び出しエラー: {0}")]
    ApiCall(String),

    #[error("APIレスポンスのパースに失敗: {0}")]
    ApiParse(String),

    #[error("画像ダウンロードエラー: {0}")]
    Download(String),

    #[error("タイムアウト: {0}秒")]
    Timeout(u64),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTPエラー: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Common(#[from] slide_visual_common::Error),
}

pub type Result<T> = std::result::Result<T, SlideVisualError>;
