use clap::Parser;
use slide_visual_common::{
    summarize, validate, BatchDecision, BatchOptions, BudgetConfig, DecisionEngine, RuleTable,
    Slide, StyleTable,
};
use slide_visual_rust::{cli, config, error, generator, input};
use cli::{Cli, Commands, DecisionArgs};
use config::Config;
use error::Result;
use generator::{GenerationCache, GenerationReport, KieAiClient, RunOptions};
use std::sync::Arc;
use std::time::Duration;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    if let Err(e) = run(cli).await {
        eprintln!("エラー: {}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load()?;

    match cli.command {
        Commands::Analyze { input: path, output } => {
            let slides = input::load_slides(&path)?;
            let engine = build_engine(&config);

            let analyses = engine.analyzer().analyze_presentation(&slides);
            let summary = summarize(&analyses);

            eprintln!(
                "✔ {}枚を解析: 生成対象 {}枚 / 視覚なし {}枚 / 概算 ${:.2}",
                summary.total_slides,
                summary.infographic_count,
                summary.no_visual_count,
                summary.estimated_cost
            );

            input::write_json(
                &serde_json::json!({ "analyses": analyses, "summary": summary }),
                output.as_deref(),
            )?;
        }

        Commands::Decide { input: path, decision: args, output } => {
            let slides = input::load_slides(&path)?;
            let batch = decide(&config, &slides, &args);

            print_validation(&batch, config.has_api_key());
            input::write_json(&batch, output.as_deref())?;
        }

        Commands::Prompt { input: path, decision: args } => {
            let slides = input::load_slides(&path)?;
            let batch = decide(&config, &slides, &args);

            for decision in &batch.decisions {
                if let Some(params) = &decision.params {
                    println!("=== 投影片 {}: {} ({}) ===", decision.slide_index + 1, decision.title, params.kind);
                    println!("{}\n", params.prompt());
                }
            }
            println!("生成対象: {}枚", batch.summary.infographic_count);
        }

        Commands::Generate { input: path, decision: args, output_dir, yes, dry_run, use_cache } => {
            println!("🎨 slide-visual - 資訊圖表生成\n");

            // 1. 決策
            println!("[1/3] 視覺策略を決定中...");
            let slides = input::load_slides(&path)?;
            let batch = decide(&config, &slides, &args);
            println!(
                "✔ 生成対象 {}枚 / 概算 ${}\n",
                batch.summary.infographic_count,
                batch.summary.cost_display()
            );

            if dry_run {
                std::fs::create_dir_all(&output_dir)?;
                let path = output_dir.join("decisions.json");
                input::write_json(&batch, Some(path.as_path()))?;
                println!("✔ ドライラン: 決策を保存 {}", path.display());
                return Ok(());
            }

            if batch.summary.infographic_count == 0 {
                std::fs::create_dir_all(&output_dir)?;
                let report = GenerationReport::all_skipped(&batch.decisions, batch.summary);
                let report_path = report.save(&output_dir)?;
                println!("生成対象がありません（APIは呼び出しません）");
                println!("レポート: {}", report_path.display());
                return Ok(());
            }

            // 2. 検証・確認
            println!("[2/3] 検証中...");
            let client = KieAiClient::from_config(&config)?;
            print_validation(&batch, true);

            if batch.summary.infographic_count > 0 && !yes {
                let proceed = dialoguer::Confirm::new()
                    .with_prompt(format!(
                        "{}枚を生成します（概算 ${}）。続行しますか?",
                        batch.summary.infographic_count,
                        batch.summary.cost_display()
                    ))
                    .default(true)
                    .interact()
                    .map_err(|e| error::SlideVisualError::Config(e.to_string()))?;

                if !proceed {
                    println!("中止しました");
                    return Ok(());
                }
            }

            // 3. 生成
            println!("[3/3] 生成中...{}", if use_cache { " (キャッシュ有効)" } else { "" });
            let options = RunOptions {
                output_dir: output_dir.clone(),
                settings: config.generation_settings(),
                max_concurrency: config.max_concurrency,
                timeout: Duration::from_secs(config.timeout_seconds),
                use_cache,
                show_progress: true,
            };
            let results = generator::run_generation(&batch.decisions, Arc::new(client), &options).await?;

            let report = GenerationReport::new(results, batch.summary);
            let report_path = report.save(&output_dir)?;

            println!(
                "\n✅ 完了  成功: {}, 失敗: {}, スキップ: {}",
                report.processed, report.failed, report.skipped
            );
            println!("レポート: {}", report_path.display());
        }

        Commands::Config { set_api_key, show } => {
            let mut config = config;

            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ APIキーを設定しました");
            }

            if show {
                println!("設定:");
                println!("  API: {}", config.api_base);
                println!("  モデル: {}", config.model);
                println!("  サイズ: {}", config.size);
                println!("  品質: {}", config.quality);
                println!("  同時実行数: {}", config.max_concurrency);
                println!("  タイムアウト: {}秒", config.timeout_seconds);
                match config.max_infographics {
                    Some(max) => println!("  生成上限: {}枚", max),
                    None => println!("  生成上限: なし"),
                }
                println!("  APIキー: {}", if config.has_api_key() { "設定済み" } else { "未設定" });
            }
        }

        Commands::Cache { clear, dir, info } => {
            let target = dir.unwrap_or_else(|| std::path::PathBuf::from("."));
            let cache_path = GenerationCache::cache_path(&target);

            if info || !clear {
                if cache_path.exists() {
                    let cache = GenerationCache::load(&target);
                    println!("キャッシュ情報:");
                    println!("  パス: {}", cache_path.display());
                    println!("  件数: {}", cache.len());
                    if let Ok(meta) = std::fs::metadata(&cache_path) {
                        println!("  サイズ: {} bytes", meta.len());
                    }
                } else {
                    println!("キャッシュファイルが存在しません: {}", cache_path.display());
                }
            }

            if clear {
                match GenerationCache::clear(&target) {
                    Ok(true) => println!("✔ キャッシュを削除しました: {}", cache_path.display()),
                    Ok(false) => println!("キャッシュファイルが存在しません"),
                    Err(e) => println!("キャッシュ削除エラー: {}", e),
                }
            }
        }
    }

    Ok(())
}

fn build_engine(config: &Config) -> DecisionEngine {
    DecisionEngine::new(
        Arc::new(RuleTable::standard()),
        Arc::new(StyleTable::standard()),
        config.generation_settings(),
    )
}

/// 設定とコマンドラインを合わせてバッチ決策する（コマンドライン優先）
fn decide(config: &Config, slides: &[Slide], args: &DecisionArgs) -> BatchDecision {
    let options = BatchOptions {
        colors: config.colors.overlay(&args.colors()),
        budget: args
            .max_infographics
            .or(config.max_infographics)
            .map(|max_infographics| BudgetConfig { max_infographics }),
        force_type: args.force_type,
    };

    build_engine(config).decide_batch(slides, &options)
}

fn print_validation(batch: &BatchDecision, has_credential: bool) {
    let mut missing_key = false;

    for decision in &batch.decisions {
        let result = validate(decision, has_credential);
        for warning in &result.warnings {
            eprintln!("⚠ {}", warning);
        }
        if !result.valid {
            missing_key = true;
        }
    }

    let limited = batch.decisions.iter().filter(|d| d.budget_limited).count();
    if limited > 0 {
        eprintln!("⚠ 予算上限により {}枚を視覚なしに変更", limited);
    }
    if missing_key {
        eprintln!("⚠ 缺少圖片生成 API 金鑰（{}）", config::API_KEY_ENV);
    }
}
