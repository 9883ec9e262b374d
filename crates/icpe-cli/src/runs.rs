//! `runs` command handler: lists recent scrape runs.

use chrono::{DateTime, Utc};
use icpe_db::ScrapeRunRow;

/// Prints the most recent `limit` scrape runs, newest first.
///
/// # Errors
///
/// Returns an error if the query fails.
pub(crate) async fn run_list_runs(pool: &sqlx::PgPool, limit: i64) -> anyhow::Result<()> {
    let runs = icpe_db::list_scrape_runs(pool, limit).await?;
    if runs.is_empty() {
        println!("no scrape runs recorded");
        return Ok(());
    }

    println!(
        "{:<36}  {:<9}  {:<19}  {:<19}  {:>10}  {:>6}  {:>8}",
        "run", "status", "started", "completed", "facilities", "failed", "rows"
    );
    for run in &runs {
        println!("{}", format_run(run));
        if let Some(message) = run.error_message.as_deref() {
            println!("  error: {message}");
        }
    }
    Ok(())
}

fn format_run(run: &ScrapeRunRow) -> String {
    format!(
        "{:<36}  {:<9}  {:<19}  {:<19}  {:>10}  {:>6}  {:>8}",
        run.public_id,
        run.status,
        fmt_timestamp(run.started_at),
        fmt_timestamp(run.completed_at),
        run.facilities_processed,
        run.facilities_failed,
        run.rows_written,
    )
}

fn fmt_timestamp(ts: Option<DateTime<Utc>>) -> String {
    ts.map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M:%S").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use uuid::Uuid;

    #[test]
    fn format_run_shows_dash_for_missing_timestamps() {
        let run = ScrapeRunRow {
            id: 1,
            public_id: Uuid::nil(),
            trigger_source: "cli".to_string(),
            status: "queued".to_string(),
            started_at: None,
            completed_at: None,
            facilities_processed: 0,
            facilities_failed: 0,
            rows_written: 0,
            error_message: None,
            created_at: Utc::now(),
        };

        let line = format_run(&run);
        assert!(line.starts_with("00000000-0000-0000-0000-000000000000  queued"));
        assert_eq!(line.matches(" - ").count(), 2, "line was: {line:?}");
    }

    #[test]
    fn fmt_timestamp_uses_utc_seconds() {
        let ts = Utc.with_ymd_and_hms(2026, 3, 4, 5, 6, 7).unwrap();
        assert_eq!(fmt_timestamp(Some(ts)), "2026-03-04 05:06:07");
    }
}
