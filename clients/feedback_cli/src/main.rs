mod client;

use chrono::{DateTime, Duration, Local, NaiveDate};
use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::PathBuf;
use tracing::info;

use client::CoreClient;

#[derive(Parser, Debug)]
#[command(name = "feedback_cli", version)]
struct Args {
    /// Core base URL, e.g. http://127.0.0.1:17800
    #[arg(long, default_value = "http://127.0.0.1:17800")]
    core_url: String,

    #[arg(long, default_value = "admin")]
    username: String,

    #[arg(long, default_value = "admin123")]
    password: String,

    #[command(subcommand)]
    command: Command,
}

/// Report period. Both ends default to a week ending today (local time).
#[derive(clap::Args, Debug)]
struct PeriodArgs {
    /// Start date, YYYY-MM-DD or RFC 3339.
    #[arg(long)]
    from: Option<String>,

    /// End date, YYYY-MM-DD or RFC 3339.
    #[arg(long)]
    to: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and print the issued session.
    Session,
    /// Category counts for a period.
    Stats(PeriodArgs),
    /// Fabricated comment rows for a period.
    Comments {
        #[command(flatten)]
        period: PeriodArgs,
        /// Print at most this many rows.
        #[arg(long, default_value_t = 20)]
        limit: usize,
    },
    /// Download the XLSX report.
    Export {
        #[command(flatten)]
        period: PeriodArgs,
        /// Directory the workbook is written to.
        #[arg(long, default_value = ".")]
        out_dir: PathBuf,
    },
    /// Ask the core to mail the report (simulated).
    Send(PeriodArgs),
    /// Show the license, or activate a new key.
    License {
        #[arg(long)]
        activate: Option<String>,
    },
    /// Print license updates as they are published.
    WatchLicense,
    /// Show stored settings.
    Settings,
    /// Show the next parser run.
    Schedule,
}

fn default_period(today: NaiveDate) -> (String, String) {
    let from = today - Duration::days(6);
    (
        from.format("%Y-%m-%d").to_string(),
        today.format("%Y-%m-%d").to_string(),
    )
}

impl PeriodArgs {
    fn resolve(&self) -> (String, String) {
        let (from, to) = default_period(Local::now().date_naive());
        (
            self.from.clone().unwrap_or(from),
            self.to.clone().unwrap_or(to),
        )
    }

    fn query(&self) -> String {
        let (from, to) = self.resolve();
        format!("from={from}&to={to}")
    }
}

fn format_local(rfc3339: &str) -> String {
    DateTime::parse_from_rfc3339(rfc3339)
        .map(|t| t.with_timezone(&Local).format("%d.%m.%Y %H:%M").to_string())
        .unwrap_or_else(|_| rfc3339.to_string())
}

#[derive(Deserialize)]
struct CategoryStat {
    category: String,
    count: u32,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct Statistics {
    from: String,
    to: String,
    generated_at: String,
    total: u32,
    categories: Vec<CategoryStat>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CommentRow {
    comment_text: String,
    category: String,
    published_at: String,
    likes_count: i64,
    author_name: String,
    comment_url: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LicenseInfo {
    masked_key: Option<String>,
    status: String,
    expires_at: Option<String>,
    monthly_usage: u32,
    monthly_limit: u32,
}

fn license_status_label(status: &str) -> &str {
    match status {
        "not_activated" => "Не активирована",
        "active" => "Активна",
        "expired" => "Истекла",
        "suspended" => "Приостановлена",
        "limit_exceeded" => "Лимит исчерпан",
        "gateway_unavailable" => "Шлюз недоступен",
        other => other,
    }
}

fn print_license(info: &LicenseInfo) {
    println!(
        "Ключ:      {}",
        info.masked_key.as_deref().unwrap_or("не задан")
    );
    println!("Статус:    {}", license_status_label(&info.status));
    if let Some(expires) = &info.expires_at {
        println!("Действует: до {}", format_local(expires));
    }
    println!("Запросы:   {}/{}", info.monthly_usage, info.monthly_limit);
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ScheduleView {
    next_run_label: String,
    preview: String,
}

#[derive(Deserialize)]
struct SendReceipt {
    recipients: Vec<String>,
}

#[derive(Serialize)]
struct PeriodBody {
    from: String,
    to: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ActivateBody<'a> {
    license_key: &'a str,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "feedback_cli=info".into()),
        )
        .init();

    let args = Args::parse();
    let mut core = CoreClient::new(&args.core_url)?;
    let session = core.login(&args.username, &args.password).await?;

    match args.command {
        Command::Session => {
            println!("{} (до {})", session.username, format_local(&session.expires_at));
        }
        Command::Stats(period) => {
            let stats: Statistics = core
                .get_ok(&format!("/statistics?{}", period.query()))
                .await?;
            println!("{} .. {}", stats.from, stats.to);
            for c in &stats.categories {
                println!("{:>5}  {}", c.count, c.category);
            }
            println!("{:>5}  Всего", stats.total);
            println!("Сформировано {}", format_local(&stats.generated_at));
        }
        Command::Comments { period, limit } => {
            let rows: Vec<CommentRow> = core
                .get_ok(&format!("/reports/comments?{}", period.query()))
                .await?;
            for r in rows.iter().take(limit) {
                println!(
                    "{}  [{}] {} ({} ♥): {}\n    {}",
                    format_local(&r.published_at),
                    r.category,
                    r.author_name,
                    r.likes_count,
                    r.comment_text,
                    r.comment_url
                );
            }
            if rows.len() > limit {
                println!("... ещё {}", rows.len() - limit);
            }
        }
        Command::Export { period, out_dir } => {
            let download = core
                .download(&format!("/reports/export?{}", period.query()))
                .await?;
            let name = download
                .file_name
                .unwrap_or_else(|| "cityfeedback-comments.xlsx".to_string());
            std::fs::create_dir_all(&out_dir)?;
            let path = out_dir.join(name);
            std::fs::write(&path, &download.bytes)?;
            info!("saved {} ({} bytes)", path.display(), download.bytes.len());
        }
        Command::Send(period) => {
            let (from, to) = period.resolve();
            let receipt: SendReceipt = core.post_ok("/reports/send", &PeriodBody { from, to }).await?;
            println!("Отчет отправлен: {}", receipt.recipients.join(", "));
        }
        Command::License { activate } => {
            let info: LicenseInfo = match activate {
                Some(key) => {
                    core.post_ok("/license/activate", &ActivateBody { license_key: &key })
                        .await?
                }
                None => core.get_ok("/license").await?,
            };
            print_license(&info);
        }
        Command::WatchLicense => {
            info!("waiting for license updates");
            core.watch_license(|payload| match serde_json::from_str::<LicenseInfo>(payload) {
                Ok(info) => print_license(&info),
                Err(_) => println!("{payload}"),
            })
            .await?;
        }
        Command::Settings => {
            let settings: Value = core.get_ok("/settings").await?;
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        Command::Schedule => {
            let view: ScheduleView = core.get_ok("/schedule/next").await?;
            println!("Следующий запуск: {}", view.next_run_label);
            println!("{}", view.preview);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_period_is_one_week() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 3).unwrap();
        assert_eq!(
            default_period(today),
            ("2026-02-25".to_string(), "2026-03-03".to_string())
        );
    }

    #[test]
    fn explicit_period_wins() {
        let period = PeriodArgs {
            from: Some("2026-01-01".to_string()),
            to: Some("2026-01-31".to_string()),
        };
        assert_eq!(period.query(), "from=2026-01-01&to=2026-01-31");
    }

    #[test]
    fn unparseable_times_are_shown_verbatim() {
        assert_eq!(format_local("soon"), "soon");
    }

    #[test]
    fn status_labels() {
        assert_eq!(license_status_label("limit_exceeded"), "Лимит исчерпан");
        assert_eq!(license_status_label("future_status"), "future_status");
    }

    #[test]
    fn subcommands_parse() {
        let args = Args::parse_from([
            "feedback_cli",
            "export",
            "--from",
            "2026-04-01",
            "--out-dir",
            "/tmp/reports",
        ]);
        match args.command {
            Command::Export { period, out_dir } => {
                assert_eq!(period.from.as_deref(), Some("2026-04-01"));
                assert_eq!(period.to, None);
                assert_eq!(out_dir, PathBuf::from("/tmp/reports"));
            }
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(args.core_url, "http://127.0.0.1:17800");
    }
}
