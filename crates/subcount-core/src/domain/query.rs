//! Provider configuration and dispatch payloads.
//!
//! The provider configuration is an opaque host document. The only part this
//! widget understands is `configs.config.queryData`, which carries the
//! `totalQuery` and `weekQuery` templates and the `query` slot the backend
//! actually executes.
//!
//! Every dispatch gets its own [`DispatchPayload`] built from a copy of the
//! provider configuration, so two dispatches never share a mutable `query`.

use chrono::{DateTime, Days, FixedOffset, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Placeholder in the week template replaced by the window start.
pub const WEEK_START_PLACEHOLDER: &str = "{{weekStart}}";

/// `YYYY-MM-DD HH:mm:ss.SSSSSSSSS`
pub const WEEK_START_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.9f";

/// Length of the trailing window counted by the week query.
pub const TRAILING_WINDOW_DAYS: u64 = 7;

const QUERY_DATA_POINTER: &str = "/configs/config/queryData";
const ACTIVE_QUERY_FIELD: &str = "query";

/// Which of the two count queries a payload or result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    Total,
    Week,
}

impl QueryKind {
    /// Name of the template field inside `queryData`.
    pub const fn template_field(self) -> &'static str {
        match self {
            Self::Total => "totalQuery",
            Self::Week => "weekQuery",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Total => f.write_str("total"),
            Self::Week => f.write_str("week"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TemplateError {
    #[error("provider configuration has no configs.config.queryData object")]
    MissingQueryData,

    #[error("provider configuration has no {} template ({})", .0, .0.template_field())]
    MissingTemplate(QueryKind),
}

/// Host-supplied provider configuration for one widget instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderConfig(Value);

impl ProviderConfig {
    pub fn new(value: Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &Value {
        &self.0
    }

    /// Look up one of the query templates.
    pub fn template(&self, kind: QueryKind) -> Result<&str, TemplateError> {
        self.0
            .pointer(QUERY_DATA_POINTER)
            .and_then(Value::as_object)
            .ok_or(TemplateError::MissingQueryData)?
            .get(kind.template_field())
            .and_then(Value::as_str)
            .ok_or(TemplateError::MissingTemplate(kind))
    }

    /// Check both templates up front so a broken configuration is rejected
    /// before anything is dispatched.
    pub fn validate(&self) -> Result<(), TemplateError> {
        self.template(QueryKind::Total)?;
        self.template(QueryKind::Week)?;
        Ok(())
    }

    /// Payload for the all-time count. The template is used verbatim.
    pub fn total_payload(&self) -> Result<DispatchPayload, TemplateError> {
        let query = self.template(QueryKind::Total)?.to_string();
        self.payload_with_query(QueryKind::Total, query)
    }

    /// Payload for the trailing-week count, starting at `week_start`.
    pub fn week_payload(&self, week_start: NaiveDateTime) -> Result<DispatchPayload, TemplateError> {
        let query = render_week_query(self.template(QueryKind::Week)?, week_start);
        self.payload_with_query(QueryKind::Week, query)
    }

    fn payload_with_query(
        &self,
        kind: QueryKind,
        query: String,
    ) -> Result<DispatchPayload, TemplateError> {
        let mut config = self.0.clone();
        let query_data = config
            .pointer_mut(QUERY_DATA_POINTER)
            .and_then(Value::as_object_mut)
            .ok_or(TemplateError::MissingQueryData)?;
        query_data.insert(ACTIVE_QUERY_FIELD.to_string(), Value::String(query));
        Ok(DispatchPayload { kind, config })
    }
}

/// Start of the trailing window on the host's wall clock: `now - 7 days`.
///
/// Calendar days are subtracted from the local date, so the time of day is
/// kept even when the offset changed during the week.
pub fn week_start(now: DateTime<FixedOffset>) -> NaiveDateTime {
    let local = now.naive_local();
    local
        .checked_sub_days(Days::new(TRAILING_WINDOW_DAYS))
        .unwrap_or(NaiveDateTime::MIN)
}

/// Substitute the first `{{weekStart}}` in `template`.
pub fn render_week_query(template: &str, week_start: NaiveDateTime) -> String {
    let stamp = week_start.format(WEEK_START_FORMAT).to_string();
    template.replacen(WEEK_START_PLACEHOLDER, &stamp, 1)
}

/// One request sent through the host channel.
///
/// Immutable once built: a copy of the provider configuration whose
/// `queryData.query` holds the query to execute.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchPayload {
    kind: QueryKind,
    config: Value,
}

impl DispatchPayload {
    pub fn kind(&self) -> QueryKind {
        self.kind
    }

    /// The query the backend will run.
    pub fn query(&self) -> Option<&str> {
        self.config
            .pointer(QUERY_DATA_POINTER)
            .and_then(|data| data.get(ACTIVE_QUERY_FIELD))
            .and_then(Value::as_str)
    }

    /// The document handed to the host channel.
    pub fn as_value(&self) -> &Value {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, TimeDelta, TimeZone, Timelike, Utc};
    use serde_json::json;

    fn wall_clock(y: i32, m: u32, d: u32, h: u32, min: u32, sec: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(h, min, sec))
            .unwrap()
    }

    fn provider_config() -> ProviderConfig {
        ProviderConfig::new(json!({
            "type": "SiddhiStoreDataProvider",
            "configs": {
                "type": "SiddhiStoreDataProvider",
                "config": {
                    "siddhiApp": "@store(type='rdbms') define table SubscriptionTable(ts long);",
                    "queryData": {
                        "totalQuery": "from SubscriptionTable select count(ts) as count",
                        "weekQuery": "from SubscriptionTable on ts > '{{weekStart}}' select count(ts) as count",
                        "query": ""
                    },
                    "publishingInterval": 60
                }
            }
        }))
    }

    #[test]
    fn total_payload_uses_template_verbatim() {
        let payload = provider_config().total_payload().unwrap();
        assert_eq!(payload.kind(), QueryKind::Total);
        assert_eq!(
            payload.query(),
            Some("from SubscriptionTable select count(ts) as count")
        );
        assert_eq!(
            payload.as_value()["configs"]["config"]["publishingInterval"],
            json!(60)
        );
    }

    #[test]
    fn week_payload_substitutes_window_start() {
        let start = wall_clock(2024, 1, 8, 0, 0, 0);
        let payload = provider_config().week_payload(start).unwrap();
        let query = payload.query().unwrap();
        assert!(query.contains("2024-01-08 00:00:00.000000000"));
        assert!(!query.contains(WEEK_START_PLACEHOLDER));
    }

    #[test]
    fn payloads_do_not_touch_the_provider_config() {
        let config = provider_config();
        let before = config.clone();
        let total = config.total_payload().unwrap();
        let week = config.week_payload(Utc::now().naive_utc()).unwrap();

        assert_eq!(config, before);
        assert_ne!(total.query(), week.query());
        assert_eq!(config.as_value()["configs"]["config"]["queryData"]["query"], json!(""));
    }

    #[test]
    fn week_start_is_seven_days_back() {
        let now = Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap().fixed_offset();
        assert_eq!(week_start(now), wall_clock(2024, 1, 8, 9, 30, 0));
    }

    #[test]
    fn week_start_uses_the_local_wall_clock() {
        // 2026-10-19 19:24:05.065682580 UTC is already the 20th in Kolkata
        let kolkata = FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap();
        let now = Utc
            .with_ymd_and_hms(2026, 10, 19, 19, 24, 5)
            .unwrap()
            .with_nanosecond(65_682_580)
            .unwrap()
            .with_timezone(&kolkata);

        let rendered = render_week_query(WEEK_START_PLACEHOLDER, week_start(now));
        assert_eq!(rendered, "2026-10-13 00:54:05.065682580");
    }

    #[test]
    fn week_start_keeps_time_of_day_across_offset_change() {
        // Europe/Berlin leaves summer time on 2026-10-25
        let winter = FixedOffset::east_opt(3600).unwrap();
        let now = winter.with_ymd_and_hms(2026, 10, 28, 9, 0, 0).unwrap();
        assert_eq!(week_start(now), wall_clock(2026, 10, 21, 9, 0, 0));
    }

    #[test]
    fn only_the_first_placeholder_is_replaced() {
        let start = wall_clock(2024, 1, 8, 0, 0, 0);
        let rendered = render_week_query("a {{weekStart}} b {{weekStart}}", start);
        assert_eq!(rendered, "a 2024-01-08 00:00:00.000000000 b {{weekStart}}");
    }

    #[test]
    fn fractional_seconds_render_nine_digits() {
        let start = wall_clock(2024, 1, 8, 12, 5, 9)
            .checked_add_signed(TimeDelta::milliseconds(250))
            .unwrap();
        assert_eq!(
            render_week_query(WEEK_START_PLACEHOLDER, start),
            "2024-01-08 12:05:09.250000000"
        );
    }

    #[test]
    fn missing_templates_are_reported() {
        let no_data = ProviderConfig::new(json!({ "configs": { "config": {} } }));
        assert_eq!(no_data.validate(), Err(TemplateError::MissingQueryData));

        let no_week = ProviderConfig::new(json!({
            "configs": { "config": { "queryData": { "totalQuery": "q" } } }
        }));
        assert_eq!(
            no_week.validate(),
            Err(TemplateError::MissingTemplate(QueryKind::Week))
        );
        assert!(no_week.total_payload().is_ok());
    }
}
