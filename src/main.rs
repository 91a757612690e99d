#![forbid(unsafe_code)]

use clap::{Parser, Subcommand};
use fis_takip_lib::features::receipts::{
    delete_receipt, get_receipts, get_total, process_receipt_image, ConsoleNotifier, ImageSource,
    LogNotifier, Notifier, ReceiptListView,
};
use fis_takip_lib::shared::config::{initialize_logging_system, load_environment_variables};
use fis_takip_lib::AppState;
use serde_json::json;
use std::process::ExitCode;
use std::sync::Arc;

/// 操作の失敗（通知済み）
const EXIT_FAILURE: u8 = 1;
/// 起動時の設定エラー
const EXIT_STARTUP_FAILURE: u8 = 2;

#[derive(Parser)]
#[command(name = "fis-takip")]
#[command(about = "Fiş Takip: fiş fotoğraflarından tutar ve tarih kaydı")]
struct Cli {
    /// 結果をJSONで出力する
    #[arg(long, global = true, default_value_t = false)]
    json: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 保存済みの領収書と合計を表示する
    List,
    /// 画像を解析して領収書を追加する
    Add {
        image: String,
        #[arg(long, value_enum, default_value_t = ImageSource::Library)]
        source: ImageSource,
    },
    /// IDで領収書を削除する
    Remove { id: String },
    /// 合計金額を表示する
    Total,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    load_environment_variables();
    initialize_logging_system();

    // JSON出力時は標準エラーへの通知表示を行わない
    let notifier: Arc<dyn Notifier> = if cli.json {
        Arc::new(LogNotifier)
    } else {
        Arc::new(ConsoleNotifier)
    };

    let state = match fis_takip_lib::bootstrap(notifier).await {
        Ok((state, _)) => state,
        Err(e) => {
            log::error!("起動に失敗しました: {}", e.details());
            eprintln!("{}", e.user_message());
            return ExitCode::from(EXIT_STARTUP_FAILURE);
        }
    };

    match run(&state, cli.command, cli.json).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            if cli.json {
                println!("{}", json!({ "error": message }));
            }
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

async fn run(state: &AppState, command: Commands, json: bool) -> Result<(), String> {
    match command {
        Commands::List => {
            let view = get_receipts(state).await?;
            print_view(&view, json)
        }
        Commands::Add { image, source } => {
            let receipt = process_receipt_image(state, image, source).await?;
            if json {
                print_json(&get_receipts(state).await?)
            } else {
                println!("{}  {}  {}", receipt.id, receipt.date, receipt.amount);
                println!("Toplam: {}", get_total(state).await?);
                Ok(())
            }
        }
        Commands::Remove { id } => {
            delete_receipt(state, id).await?;
            let view = get_receipts(state).await?;
            print_view(&view, json)
        }
        Commands::Total => {
            let total = get_total(state).await?;
            if json {
                print_json(&json!({ "total": total }))
            } else {
                println!("{total}");
                Ok(())
            }
        }
    }
}

fn print_view(view: &ReceiptListView, json: bool) -> Result<(), String> {
    if json {
        return print_json(view);
    }

    if view.receipts.is_empty() {
        println!("Henüz fiş eklenmedi.");
    }
    for receipt in &view.receipts {
        println!("{}  {}  {}", receipt.id, receipt.date, receipt.amount);
    }
    println!("Toplam: {}", view.total);
    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), String> {
    let rendered =
        serde_json::to_string_pretty(value).map_err(|e| format!("JSON出力に失敗しました: {e}"))?;
    println!("{rendered}");
    Ok(())
}
