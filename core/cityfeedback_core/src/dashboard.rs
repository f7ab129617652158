//! Service facade behind the HTTP layer. Every operation waits out the
//! configured latency first, then works against the injected store.

use serde::Serialize;
use std::sync::Arc;
use time::OffsetDateTime;
use tracing::info;

use crate::clock::{fmt_rfc3339, Zone};
use crate::error::{FeedbackError, PeriodUse};
use crate::export::{build_workbook, export_file_name};
use crate::latency::Latency;
use crate::license::{self, LicenseInfo, LicenseNotifier};
use crate::report::{self, Period, ReportCommentRow, SeededGenerator, SineHash, StatisticsResponse};
use crate::schedule::{NextRun, ParserSchedule};
use crate::session::{self, Credentials, UserSession};
use crate::settings::{self, AppSettings, SettingsUpdate};
use crate::store::KeyValueStore;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleView {
    pub schedule: ParserSchedule,
    /// `None` when the schedule will not fire again.
    pub next_run_at: Option<String>,
    pub next_run_label: String,
    pub preview: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SendReceipt {
    pub recipients: Vec<String>,
}

pub struct ExportFile {
    pub file_name: String,
    pub rows: usize,
    pub bytes: Vec<u8>,
}

pub struct Dashboard {
    store: Arc<dyn KeyValueStore>,
    notifier: Arc<dyn LicenseNotifier>,
    generator: Arc<dyn SeededGenerator>,
    zone: Zone,
    credentials: Credentials,
    latency: Latency,
    clock: fn() -> OffsetDateTime,
}

impl Dashboard {
    pub fn new(store: Arc<dyn KeyValueStore>, notifier: Arc<dyn LicenseNotifier>) -> Self {
        Self {
            store,
            notifier,
            generator: Arc::new(SineHash),
            zone: Zone::moscow(),
            credentials: Credentials::default(),
            latency: Latency::default(),
            clock: OffsetDateTime::now_utc,
        }
    }

    pub fn with_zone(mut self, zone: Zone) -> Self {
        self.zone = zone;
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    pub fn with_latency(mut self, latency: Latency) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_generator(mut self, generator: Arc<dyn SeededGenerator>) -> Self {
        self.generator = generator;
        self
    }

    pub fn with_clock(mut self, clock: fn() -> OffsetDateTime) -> Self {
        self.clock = clock;
        self
    }

    fn now(&self) -> OffsetDateTime {
        (self.clock)()
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<UserSession, FeedbackError> {
        self.latency.wait().await;
        session::login(
            self.store.as_ref(),
            &self.credentials,
            username,
            password,
            self.now(),
        )
    }

    pub async fn logout(&self) -> Result<(), FeedbackError> {
        self.latency.wait().await;
        session::logout(self.store.as_ref())
    }

    pub async fn session(&self) -> Option<UserSession> {
        session::current(self.store.as_ref(), self.now())
    }

    /// Bearer check used by the router; no artificial delay.
    pub fn authorize(&self, token: Option<&str>) -> Result<UserSession, FeedbackError> {
        session::authorize(self.store.as_ref(), token, self.now())
    }

    pub async fn settings(&self) -> AppSettings {
        self.latency.wait().await;
        settings::load(self.store.as_ref(), self.now(), &self.zone)
    }

    pub async fn save_settings(&self, update: &SettingsUpdate) -> Result<AppSettings, FeedbackError> {
        self.latency.wait().await;
        settings::save(self.store.as_ref(), update, self.now(), &self.zone)
    }

    pub async fn next_run(&self) -> ScheduleView {
        let now = self.now();
        let schedule = settings::load(self.store.as_ref(), now, &self.zone).parser_schedule;
        let next = schedule.next_run(now, &self.zone);
        ScheduleView {
            next_run_at: match next {
                NextRun::At(t) => Some(fmt_rfc3339(self.zone.local(t))),
                _ => None,
            },
            next_run_label: next.label(&self.zone),
            preview: schedule.preview(&self.zone),
            schedule,
        }
    }

    pub async fn license(&self) -> LicenseInfo {
        self.latency.wait().await;
        license::fetch(self.store.as_ref(), self.now())
    }

    pub async fn activate_license(&self, key: &str) -> Result<LicenseInfo, FeedbackError> {
        self.latency.wait().await;
        license::activate(self.store.as_ref(), self.notifier.as_ref(), key, self.now())
    }

    fn ensure_sources_configured(&self) -> Result<(), FeedbackError> {
        let current = settings::load(self.store.as_ref(), self.now(), &self.zone);
        if current.data_sources.is_empty() {
            return Err(FeedbackError::NoSources);
        }
        Ok(())
    }

    pub async fn statistics(&self, from: &str, to: &str) -> Result<StatisticsResponse, FeedbackError> {
        self.latency.wait().await;
        let period = Period::parse(from, to, PeriodUse::Statistics)?;
        self.ensure_sources_configured()?;
        Ok(report::statistics(&period, self.now()))
    }

    pub async fn report_comments(
        &self,
        from: &str,
        to: &str,
    ) -> Result<Vec<ReportCommentRow>, FeedbackError> {
        self.latency.wait().await;
        let period = Period::parse(from, to, PeriodUse::Export)?;
        self.ensure_sources_configured()?;
        Ok(report::report_rows(&period, self.generator.as_ref()))
    }

    pub async fn export(&self, from: &str, to: &str) -> Result<ExportFile, FeedbackError> {
        let rows = self.report_comments(from, to).await?;
        let bytes = build_workbook(&rows, &self.zone)?;
        let file_name = export_file_name(self.now(), &self.zone);
        info!("export {file_name}: {} rows, {} bytes", rows.len(), bytes.len());
        Ok(ExportFile {
            file_name,
            rows: rows.len(),
            bytes,
        })
    }

    /// Validates the request and reports who would receive the report. No
    /// mail leaves the process.
    pub async fn send_report(&self, from: &str, to: &str) -> Result<SendReceipt, FeedbackError> {
        self.latency.wait().await;
        Period::parse(from, to, PeriodUse::Mailing)?;
        let recipients = settings::load(self.store.as_ref(), self.now(), &self.zone).report_emails;
        if recipients.is_empty() {
            return Err(FeedbackError::NoRecipients);
        }
        info!("report {from}..{to} queued for {} recipients", recipients.len());
        Ok(SendReceipt { recipients })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::license::BroadcastNotifier;
    use crate::schedule::{EndType, Frequency, ScheduleInput};
    use crate::store::MemoryStore;
    use time::macros::datetime;

    fn fixed_now() -> OffsetDateTime {
        datetime!(2026-04-10 06:00 UTC)
    }

    fn dashboard() -> Dashboard {
        Dashboard::new(
            Arc::new(MemoryStore::default()),
            Arc::new(BroadcastNotifier::new(8)),
        )
        .with_latency(Latency::none())
        .with_clock(fixed_now)
    }

    fn lists(sources: &[&str], emails: &[&str]) -> SettingsUpdate {
        SettingsUpdate {
            data_sources: sources.iter().map(|s| s.to_string()).collect(),
            report_emails: emails.iter().map(|s| s.to_string()).collect(),
            parser_schedule: ScheduleInput {
                frequency: Some(Frequency::Daily),
                time_of_day: Some("09:00".to_string()),
                ..Default::default()
            },
        }
    }

    #[tokio::test]
    async fn statistics_need_a_source() {
        let d = dashboard();
        assert!(d.statistics("2026-04-01", "2026-04-07").await.is_ok());

        d.save_settings(&lists(&[" "], &["a@b.c"])).await.unwrap();
        assert!(matches!(
            d.statistics("2026-04-01", "2026-04-07").await,
            Err(FeedbackError::NoSources)
        ));
        assert!(matches!(
            d.report_comments("2026-04-01", "2026-04-07").await,
            Err(FeedbackError::NoSources)
        ));
    }

    #[tokio::test]
    async fn period_is_checked_before_sources() {
        let d = dashboard();
        d.save_settings(&lists(&[], &[])).await.unwrap();
        assert!(matches!(
            d.statistics("2026-04-07", "2026-04-01").await,
            Err(FeedbackError::RangeOrder)
        ));
        assert!(matches!(
            d.report_comments("2026-04-07", "2026-04-01").await,
            Err(FeedbackError::RangeOrder)
        ));
        assert!(matches!(
            d.report_comments("not a date", "2026-04-01").await,
            Err(FeedbackError::InvalidPeriod(PeriodUse::Export))
        ));
    }

    #[tokio::test]
    async fn send_report_echoes_recipients() {
        let d = dashboard();
        let receipt = d.send_report("2026-04-01", "2026-04-07").await.unwrap();
        assert_eq!(receipt.recipients, vec!["moderator@cityfeedback.local"]);

        d.save_settings(&lists(&["https://vk.com/x"], &[])).await.unwrap();
        assert!(matches!(
            d.send_report("2026-04-01", "2026-04-07").await,
            Err(FeedbackError::NoRecipients)
        ));
        assert!(matches!(
            d.send_report("2026-04-01", "?").await,
            Err(FeedbackError::InvalidPeriod(PeriodUse::Mailing))
        ));
    }

    #[tokio::test]
    async fn export_counts_rows() {
        let d = dashboard();
        let file = d.export("2026-04-01", "2026-04-02").await.unwrap();
        let expected = d.report_comments("2026-04-01", "2026-04-02").await.unwrap();
        assert_eq!(file.rows, expected.len());
        assert_eq!(file.file_name, "cityfeedback-comments-20260410-0900.xlsx");
        assert_eq!(&file.bytes[..2], b"PK");
    }

    #[tokio::test]
    async fn next_run_view_for_default_schedule() {
        let d = dashboard();
        let view = d.next_run().await;
        assert_eq!(view.schedule.frequency, Frequency::Daily);
        assert_eq!(view.next_run_at.as_deref(), Some("2026-04-10T09:00:00+03:00"));
        assert_eq!(view.next_run_label, "10.04.2026 09:00 (МСК)");
        assert!(view.preview.starts_with("Каждый день"));
    }

    #[tokio::test]
    async fn next_run_view_when_end_date_passed() {
        let d = dashboard();
        let mut update = lists(&["a"], &["b"]);
        update.parser_schedule.end_type = Some(EndType::OnDate);
        update.parser_schedule.end_date = Some("2026-04-09".to_string());
        d.save_settings(&update).await.unwrap();

        let view = d.next_run().await;
        assert_eq!(view.next_run_at, None);
        assert_eq!(
            view.next_run_label,
            "Не запланирован: дата окончания уже прошла"
        );
    }

    struct Ceiling;

    impl SeededGenerator for Ceiling {
        fn int_in(&self, _seed: i64, _min: i64, max: i64) -> i64 {
            max
        }
    }

    #[tokio::test]
    async fn rows_come_from_the_injected_generator() {
        let d = dashboard().with_generator(Arc::new(Ceiling));
        let rows = d.report_comments("2026-04-01", "2026-04-02").await.unwrap();
        assert!(rows.iter().all(|r| r.likes_count == 180));
        assert!(rows.iter().all(|r| r.published_at == "2026-04-02T00:00:00Z"));
    }

    #[tokio::test]
    async fn login_then_authorize() {
        let d = dashboard().with_credentials(Credentials {
            username: "ops".to_string(),
            password: "s3cret".to_string(),
        });
        assert!(d.login("admin", "admin123").await.is_err());
        let s = d.login("ops", "s3cret").await.unwrap();
        assert_eq!(d.authorize(Some(&s.token)).unwrap(), s);
        assert_eq!(d.session().await, Some(s));
        d.logout().await.unwrap();
        assert_eq!(d.session().await, None);
    }
}
