use clap::{Args, Parser, Subcommand};
use slide_visual_common::{Category, PartialColorPalette};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "slide-visual")]
#[command(about = "投影片內容分析・資訊圖表生成ツール", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 投影片を解析して視覚需要サマリーを出力
    Analyze {
        /// 投影片JSONファイル
        #[arg(required = true)]
        input: PathBuf,

        /// 出力JSONファイル（省略時は標準出力）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 視覚戦略を決定（予算上限つき）
    Decide {
        /// 投影片JSONファイル
        #[arg(required = true)]
        input: PathBuf,

        #[command(flatten)]
        decision: DecisionArgs,

        /// 出力JSONファイル（省略時は標準出力）
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// 生成対象の投影片ごとにプロンプトを表示
    Prompt {
        /// 投影片JSONファイル
        #[arg(required = true)]
        input: PathBuf,

        #[command(flatten)]
        decision: DecisionArgs,
    },

    /// 決定から画像生成まで一括実行
    Generate {
        /// 投影片JSONファイル
        #[arg(required = true)]
        input: PathBuf,

        #[command(flatten)]
        decision: DecisionArgs,

        /// 出力ディレクトリ
        #[arg(short = 'd', long, default_value = "./workspace")]
        output_dir: PathBuf,

        /// 確認をスキップ
        #[arg(short, long)]
        yes: bool,

        /// 決定のみ（APIを呼ばない）
        #[arg(long)]
        dry_run: bool,

        /// キャッシュを使用（同じプロンプトの再生成をスキップ）
        #[arg(long)]
        use_cache: bool,
    },

    /// 設定を表示/編集
    Config {
        /// APIキーを設定
        #[arg(long)]
        set_api_key: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },

    /// キャッシュ管理
    Cache {
        /// キャッシュを削除
        #[arg(long)]
        clear: bool,

        /// 対象ディレクトリ（省略時はカレント）
        #[arg(short = 'd', long)]
        dir: Option<PathBuf>,

        /// キャッシュ情報を表示
        #[arg(long)]
        info: bool,
    },
}

/// decide / prompt / generate 共通のオプション
#[derive(Args, Debug, Clone, Default)]
pub struct DecisionArgs {
    /// 生成枚数の上限
    #[arg(long)]
    pub max_infographics: Option<usize>,

    /// 主色 (#RRGGBB)
    #[arg(long)]
    pub primary: Option<String>,

    /// 副色
    #[arg(long)]
    pub secondary: Option<String>,

    /// アクセント色
    #[arg(long)]
    pub accent: Option<String>,

    /// 背景色
    #[arg(long)]
    pub background: Option<String>,

    /// カテゴリを強制 (statistics/process/comparison/timeline/company_intro/concept/text_only)
    #[arg(long)]
    pub force_type: Option<Category>,
}

impl DecisionArgs {
    /// コマンドラインで指定された色
    pub fn colors(&self) -> PartialColorPalette {
        PartialColorPalette {
            primary: self.primary.clone(),
            secondary: self.secondary.clone(),
            accent: self.accent.clone(),
            background: self.background.clone(),
        }
    }
}
