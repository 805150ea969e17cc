//! Request parsing.
//!
//! Query parameters arrive as optional strings and bodies as loosely typed
//! JSON. A [`Validator`] parses them one by one and collects a [`FieldError`]
//! for each bad value, so one response reports every problem at once.

use crate::core::filter::{DateFilters, DateRange, TransactionFilters};
use crate::core::normalize_email;
use crate::core::pagination::{MAX_PAGE_SIZE, PageRequest};
use crate::errors::{Error, FieldError, Result};
use crate::models::{
    DateLocation, DateStatus, DateType, Genie, NewCuratedDate, Participant, ParticipantFeedback,
    ParticipantSlot, PaymentMethod, TransactionStatus, TransactionType, WaitlistStatus,
};
use axum::Json;
use axum::extract::Query;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::Deserialize;
use std::fmt::Display;
use std::ops::RangeInclusive;
use std::str::FromStr;

/// Value that disables an enum filter.
const ANY: &str = "all";

/// Longest admin note accepted.
pub const MAX_NOTE_LENGTH: usize = 2000;

/// Longest feedback comment accepted.
pub const MAX_COMMENT_LENGTH: usize = 1000;

/// Earliest a new date may be scheduled, in hours from now.
const MIN_ADVANCE_HOURS: i64 = 24;

/// Latest a new date may be scheduled, in days from now.
const MAX_ADVANCE_DAYS: i64 = 90;

/// Longest name, city or id accepted in a date request.
const MAX_SHORT_TEXT: usize = 100;

/// `GET /admin/revenue/transactions` query.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionQuery {
    /// Substring of user name, e-mail or reference
    pub search: Option<String>,
    /// Transaction status or `all`
    pub status: Option<String>,
    /// Transaction type or `all`
    #[serde(rename = "type")]
    pub kind: Option<String>,
    /// Payment method or `all`
    pub payment_method: Option<String>,
    /// Start of the creation window
    pub from: Option<String>,
    /// End of the creation window
    pub to: Option<String>,
    /// Lower bound on the absolute amount
    pub min_amount: Option<String>,
    /// Upper bound on the absolute amount
    pub max_amount: Option<String>,
    /// 1-based page number
    pub page: Option<String>,
    /// Rows per page
    pub page_size: Option<String>,
}

/// `GET /admin/date-curation/curated-dates` query.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DateQuery {
    /// Substring of either participant's name or the reference
    pub search: Option<String>,
    /// Date status or `all`
    pub status: Option<String>,
    /// `online`, `offline` or `all`
    pub date_type: Option<String>,
    /// First participant's city or `all`
    pub city: Option<String>,
    /// Start of the scheduling window
    pub from: Option<String>,
    /// End of the scheduling window
    pub to: Option<String>,
    /// `true` to keep only dates with problems
    pub has_issues: Option<String>,
    /// 1-based page number
    pub page: Option<String>,
    /// Rows per page
    pub page_size: Option<String>,
}

/// `GET /waitlist-data` query.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaitlistQuery {
    /// Waitlist status or `all`
    pub status: Option<String>,
    /// 1-based page number
    pub page: Option<String>,
    /// Rows per page
    pub page_size: Option<String>,
}

/// Query with a single bounded number, like `days` or `limit`.
#[derive(Debug, Default, Deserialize)]
pub struct CountQuery {
    /// Trend length in days
    pub days: Option<String>,
    /// Number of rows to return
    pub limit: Option<String>,
}

/// One participant in a new-date request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ParticipantBody {
    /// Platform user id
    pub id: String,
    /// First name
    pub first_name: String,
    /// Last name
    pub last_name: String,
    /// E-mail address
    pub email: String,
    /// Age in years, 18 to 100
    pub age: Option<i64>,
    /// Home city
    pub city: String,
}

/// `POST /admin/date-curation/curated-dates` body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewDateBody {
    /// First participant
    pub user1: Option<ParticipantBody>,
    /// Second participant
    pub user2: Option<ParticipantBody>,
    /// `online` or `offline`
    pub date_type: String,
    /// RFC 3339 time of the date
    pub scheduled_at: String,
    /// Venue, required for offline dates
    pub location: Option<DateLocation>,
    /// Accompanying genie
    pub genie: Option<Genie>,
    /// Compatibility score, 0 to 100
    pub match_score: Option<i64>,
    /// Admin note
    pub notes: Option<String>,
    /// Admin arranging the date
    pub created_by: Option<String>,
}

/// `POST /admin/date-curation/dates/:id/submit-feedback` body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeedbackBody {
    /// `user1` or `user2`
    pub participant: String,
    /// 1 to 5
    pub rating: Option<i64>,
    /// Wants a second date
    pub interested: Option<bool>,
    /// Free-form remarks
    pub comments: Option<String>,
}

/// Collects field errors while parsing a request.
#[derive(Debug, Default)]
pub struct Validator {
    errors: Vec<FieldError>,
}

impl Validator {
    fn reject(&mut self, field: &str, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    /// Keeps the value of `result`, or its errors renamed to `field`.
    fn absorb<T>(&mut self, field: &str, result: Result<T>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(Error::Validation { errors }) => {
                for error in errors {
                    self.reject(field, error.message);
                }
                None
            }
            Err(other) => {
                self.reject(field, other.to_string());
                None
            }
        }
    }

    /// Parses an integer within `range`, falling back to `default` when absent.
    pub fn bounded(
        &mut self,
        field: &str,
        raw: Option<&str>,
        range: RangeInclusive<u32>,
        default: u32,
        message: &str,
    ) -> u32 {
        let Some(raw) = non_blank(raw) else {
            return default;
        };
        match raw.parse::<u32>() {
            Ok(n) if range.contains(&n) => n,
            _ => {
                self.reject(field, message);
                default
            }
        }
    }

    /// Parses `page` and `pageSize`.
    pub fn page(
        &mut self,
        page: Option<&str>,
        page_size: Option<&str>,
        default_size: u32,
    ) -> PageRequest {
        let page = self.bounded(
            "page",
            page,
            1..=u32::MAX,
            1,
            "Page must be a positive integer",
        );
        let page_size = self.bounded(
            "pageSize",
            page_size,
            1..=MAX_PAGE_SIZE,
            default_size,
            "Page size must be between 1 and 100",
        );
        PageRequest::new(page, page_size)
    }

    /// Parses one of `allowed`, or `all`/absent for no restriction.
    pub fn choice<T>(&mut self, field: &str, raw: Option<&str>, allowed: &[T]) -> Option<T>
    where
        T: FromStr + Display,
    {
        let raw = non_blank(raw).filter(|v| *v != ANY)?;
        if let Ok(value) = raw.parse::<T>() {
            return Some(value);
        }
        let options =
            std::iter::once(ANY.to_string()).chain(allowed.iter().map(ToString::to_string));
        self.reject(field, one_of(field, options));
        None
    }

    /// Parses an RFC 3339 timestamp or a `YYYY-MM-DD` date.
    ///
    /// A bare date means the start of that day, or its last nanosecond when
    /// `end_of_day` is set.
    pub fn timestamp(
        &mut self,
        field: &str,
        raw: Option<&str>,
        end_of_day: bool,
    ) -> Option<DateTime<Utc>> {
        let raw = non_blank(raw)?;
        if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
            return Some(at.with_timezone(&Utc));
        }
        let time = if end_of_day {
            NaiveTime::from_hms_nano_opt(23, 59, 59, 999_999_999)
        } else {
            Some(NaiveTime::MIN)
        };
        let parsed = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
            .ok()
            .zip(time)
            .map(|(date, time)| date.and_time(time).and_utc());
        if parsed.is_none() {
            self.reject(field, format!("{field} must be a valid ISO 8601 date"));
        }
        parsed
    }

    /// Parses `from`/`to`. Both must be present for the range to apply.
    pub fn date_range(&mut self, from: Option<&str>, to: Option<&str>) -> Option<DateRange> {
        let from_given = non_blank(from).is_some();
        let to_given = non_blank(to).is_some();
        let from = self.timestamp("from", from, false);
        let to = self.timestamp("to", to, true);

        if from_given != to_given {
            let missing = if from_given { "to" } else { "from" };
            self.reject(missing, "from and to must be given together");
            return None;
        }
        let (from, to) = from.zip(to)?;
        if from > to {
            self.reject("to", "to must not be earlier than from");
            return None;
        }
        Some(DateRange { from, to })
    }

    /// Parses a non-negative whole amount.
    pub fn amount(&mut self, field: &str, raw: Option<&str>) -> Option<i64> {
        let raw = non_blank(raw)?;
        match raw.parse::<i64>() {
            Ok(n) if n >= 0 => Some(n),
            _ => {
                self.reject(field, format!("{field} must be a non-negative integer"));
                None
            }
        }
    }

    /// Parses `true`/`false`; absent means false.
    pub fn flag(&mut self, field: &str, raw: Option<&str>) -> bool {
        match non_blank(raw) {
            None | Some("false") => false,
            Some("true") => true,
            Some(_) => {
                self.reject(field, format!("{field} must be a boolean"));
                false
            }
        }
    }

    /// Parses a positive record id from a path segment.
    pub fn id(&mut self, field: &str, raw: &str) -> i64 {
        match raw.trim().parse::<i64>() {
            Ok(id) if id >= 1 => id,
            _ => {
                self.reject(field, format!("{field} must be a positive integer"));
                0
            }
        }
    }

    /// Trimmed required text of at most `max` characters.
    pub fn text(&mut self, field: &str, raw: &str, max: usize) -> String {
        let value = raw.trim();
        if value.is_empty() {
            self.reject(field, format!("{field} is required"));
        } else if value.chars().count() > max {
            self.reject(field, format!("{field} must be at most {max} characters"));
        }
        value.to_string()
    }

    /// Like [`Self::text`], but absent or blank is `None`.
    pub fn optional_text(&mut self, field: &str, raw: Option<&str>, max: usize) -> Option<String> {
        let value = non_blank(raw)?;
        Some(self.text(field, value, max))
    }

    /// Parses a required value from a closed set.
    pub fn required<T>(&mut self, field: &str, raw: &str, allowed: &[T]) -> Option<T>
    where
        T: FromStr + Display,
    {
        self.absorb(field, parse_required(field, raw, allowed))
    }

    /// Normalised e-mail address.
    pub fn email(&mut self, field: &str, raw: &str) -> String {
        self.absorb(field, normalize_email(raw)).unwrap_or_default()
    }

    /// A required whole number within `range`.
    pub fn number<T>(
        &mut self,
        field: &str,
        raw: Option<i64>,
        range: RangeInclusive<i64>,
        message: &str,
    ) -> Option<T>
    where
        T: TryFrom<i64>,
    {
        match raw {
            Some(n) if range.contains(&n) => T::try_from(n).ok(),
            _ => {
                self.reject(field, message);
                None
            }
        }
    }

    /// Parses an RFC 3339 time at least a day and at most 90 days after `now`.
    pub fn schedule_time(
        &mut self,
        field: &str,
        raw: &str,
        now: DateTime<Utc>,
    ) -> Option<DateTime<Utc>> {
        let Ok(at) = DateTime::parse_from_rfc3339(raw.trim()) else {
            self.reject(field, format!("{field} must be a valid ISO 8601 date"));
            return None;
        };
        let at = at.with_timezone(&Utc);
        if at < now + Duration::hours(MIN_ADVANCE_HOURS) {
            self.reject(
                field,
                format!("Date must be at least {MIN_ADVANCE_HOURS} hours in advance"),
            );
        } else if at > now + Duration::days(MAX_ADVANCE_DAYS) {
            self.reject(
                field,
                format!("Date cannot be more than {MAX_ADVANCE_DAYS} days in advance"),
            );
        }
        Some(at)
    }

    fn participant(&mut self, prefix: &str, body: Option<&ParticipantBody>) -> Participant {
        let Some(body) = body else {
            self.reject(prefix, format!("{prefix} is required"));
            return Participant::default();
        };
        let field = |name: &str| format!("{prefix}.{name}");
        Participant {
            id: self.text(&field("id"), &body.id, MAX_SHORT_TEXT),
            first_name: self.text(&field("firstName"), &body.first_name, MAX_SHORT_TEXT),
            last_name: self.text(&field("lastName"), &body.last_name, MAX_SHORT_TEXT),
            email: self.email(&field("email"), &body.email),
            age: self
                .number(&field("age"), body.age, 18..=100, "Age must be between 18 and 100")
                .unwrap_or_default(),
            city: self.text(&field("city"), &body.city, MAX_SHORT_TEXT),
        }
    }

    /// Returns `value` if nothing was rejected.
    pub fn finish<T>(self, value: T) -> Result<T> {
        if self.errors.is_empty() {
            Ok(value)
        } else {
            Err(Error::Validation {
                errors: self.errors,
            })
        }
    }
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|v| !v.is_empty())
}

/// Unwraps a query string, turning a malformed one into a validation error.
pub fn query_params<T>(query: std::result::Result<Query<T>, QueryRejection>) -> Result<T> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| Error::invalid_field("query", rejection.body_text()))
}

/// Unwraps a JSON body, turning a malformed one into a validation error.
pub fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| Error::invalid_field("body", rejection.body_text()))
}

/// Parses a path id on its own.
pub fn parse_id(field: &str, raw: &str) -> Result<i64> {
    let mut v = Validator::default();
    let id = v.id(field, raw);
    v.finish(id)
}

/// Parses a required enum value from a request body.
pub fn parse_required<T>(field: &str, raw: &str, allowed: &[T]) -> Result<T>
where
    T: FromStr + Display,
{
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(Error::invalid_field(field, format!("{field} is required")));
    }
    raw.parse::<T>()
        .map_err(|_| Error::invalid_field(field, one_of(field, allowed.iter())))
}

fn one_of<T: Display>(field: &str, options: impl Iterator<Item = T>) -> String {
    let options: Vec<String> = options.map(|o| o.to_string()).collect();
    format!("Invalid {field}. Must be one of: {}", options.join(", "))
}

impl TransactionQuery {
    /// Filters and page for the transaction table.
    pub fn parse(&self, default_page_size: u32) -> Result<(TransactionFilters, PageRequest)> {
        let mut v = Validator::default();
        let filters = TransactionFilters {
            search: self.search.clone().unwrap_or_default(),
            status: v.choice("status", self.status.as_deref(), TransactionStatus::ALL),
            kind: v.choice("type", self.kind.as_deref(), TransactionType::ALL),
            payment_method: v.choice(
                "paymentMethod",
                self.payment_method.as_deref(),
                PaymentMethod::ALL,
            ),
            date_range: v.date_range(self.from.as_deref(), self.to.as_deref()),
            min_amount: v.amount("minAmount", self.min_amount.as_deref()),
            max_amount: v.amount("maxAmount", self.max_amount.as_deref()),
        };
        if let (Some(min), Some(max)) = (filters.min_amount, filters.max_amount) {
            if min > max {
                v.reject("maxAmount", "maxAmount must not be less than minAmount");
            }
        }
        let request = v.page(
            self.page.as_deref(),
            self.page_size.as_deref(),
            default_page_size,
        );
        v.finish((filters, request))
    }
}

impl DateQuery {
    /// Filters and page for the curated dates table.
    pub fn parse(&self, default_page_size: u32) -> Result<(DateFilters, PageRequest)> {
        let mut v = Validator::default();
        let filters = DateFilters {
            search: self.search.clone().unwrap_or_default(),
            status: v.choice("status", self.status.as_deref(), DateStatus::ALL),
            date_type: v.choice("dateType", self.date_type.as_deref(), DateType::ALL),
            city: non_blank(self.city.as_deref())
                .filter(|c| *c != ANY)
                .map(str::to_string),
            date_range: v.date_range(self.from.as_deref(), self.to.as_deref()),
            has_issues: v.flag("hasIssues", self.has_issues.as_deref()),
        };
        let request = v.page(
            self.page.as_deref(),
            self.page_size.as_deref(),
            default_page_size,
        );
        v.finish((filters, request))
    }
}

impl WaitlistQuery {
    /// Status filter and page for the waitlist.
    pub fn parse(&self, default_page_size: u32) -> Result<(Option<WaitlistStatus>, PageRequest)> {
        let mut v = Validator::default();
        let status = v.choice("status", self.status.as_deref(), WaitlistStatus::ALL);
        let request = v.page(
            self.page.as_deref(),
            self.page_size.as_deref(),
            default_page_size,
        );
        v.finish((status, request))
    }
}

impl NewDateBody {
    /// Checks the request against the scheduling rules at `now`.
    pub fn parse(&self, now: DateTime<Utc>) -> Result<NewCuratedDate> {
        let mut v = Validator::default();
        let user1 = v.participant("user1", self.user1.as_ref());
        let user2 = v.participant("user2", self.user2.as_ref());
        if !user1.id.is_empty() && user1.id == user2.id {
            v.reject("user2.id", "User1 and User2 cannot be the same person");
        }

        let date_type = v.required("dateType", &self.date_type, DateType::ALL);
        let scheduled_at = v.schedule_time("scheduledAt", &self.scheduled_at, now);

        let location = match (date_type, &self.location) {
            (Some(DateType::Offline), None) => {
                v.reject("location", "Location is required for offline dates");
                None
            }
            (Some(DateType::Offline), Some(location)) => Some(DateLocation {
                name: v.text("location.name", &location.name, 255),
                address: v.text("location.address", &location.address, 1000),
                city: v.text("location.city", &location.city, MAX_SHORT_TEXT),
            }),
            _ => None,
        };
        let genie = self.genie.as_ref().map(|genie| Genie {
            id: v.text("genie.id", &genie.id, MAX_SHORT_TEXT),
            name: v.text("genie.name", &genie.name, MAX_SHORT_TEXT),
            email: v.email("genie.email", &genie.email),
        });
        let match_score = match self.match_score {
            None => 0,
            Some(_) => v
                .number(
                    "matchScore",
                    self.match_score,
                    0..=100,
                    "Match score must be between 0 and 100",
                )
                .unwrap_or_default(),
        };
        let notes = v.optional_text("notes", self.notes.as_deref(), MAX_NOTE_LENGTH);
        let created_by = v
            .optional_text("createdBy", self.created_by.as_deref(), MAX_SHORT_TEXT)
            .unwrap_or_else(|| "Admin".to_string());

        v.finish(NewCuratedDate {
            user1,
            user2,
            date_type: date_type.unwrap_or(DateType::Online),
            scheduled_at: scheduled_at.unwrap_or(now),
            location,
            genie,
            match_score,
            created_by,
            notes,
        })
    }
}

impl FeedbackBody {
    /// Which participant answered, and what they said.
    pub fn parse(&self, now: DateTime<Utc>) -> Result<(ParticipantSlot, ParticipantFeedback)> {
        let mut v = Validator::default();
        let slot = v.required("participant", &self.participant, ParticipantSlot::ALL);
        let rating = v.number("rating", self.rating, 1..=5, "Rating must be between 1 and 5");
        let interested = self.interested.unwrap_or_else(|| {
            v.reject("interested", "interested is required");
            false
        });
        let comments = v.optional_text("comments", self.comments.as_deref(), MAX_COMMENT_LENGTH);

        v.finish((
            slot.unwrap_or(ParticipantSlot::User1),
            ParticipantFeedback {
                rating: rating.unwrap_or_default(),
                interested,
                comments,
                submitted_at: now,
            },
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fields(result: Result<impl Sized>) -> Vec<String> {
        match result {
            Err(Error::Validation { errors }) => errors.into_iter().map(|e| e.field).collect(),
            Err(other) => panic!("expected validation error, got {other}"),
            Ok(_) => Vec::new(),
        }
    }

    #[test]
    fn test_empty_query_uses_defaults() -> Result<()> {
        let (filters, request) = TransactionQuery::default().parse(10)?;
        assert_eq!(filters, TransactionFilters::default());
        assert_eq!(request, PageRequest::new(1, 10));
        Ok(())
    }

    #[test]
    fn test_all_sentinel_disables_filter() -> Result<()> {
        let query = TransactionQuery {
            status: Some("all".to_string()),
            kind: Some("refund".to_string()),
            payment_method: Some("upi".to_string()),
            ..Default::default()
        };
        let (filters, _) = query.parse(10)?;
        assert_eq!(filters.status, None);
        assert_eq!(filters.kind, Some(TransactionType::Refund));
        assert_eq!(filters.payment_method, Some(PaymentMethod::Upi));
        Ok(())
    }

    #[test]
    fn test_collects_every_bad_field() {
        let query = TransactionQuery {
            status: Some("settled".to_string()),
            min_amount: Some("-5".to_string()),
            page: Some("0".to_string()),
            page_size: Some("101".to_string()),
            ..Default::default()
        };
        assert_eq!(
            fields(query.parse(10)),
            vec!["status", "minAmount", "page", "pageSize"]
        );
    }

    #[test]
    fn test_amount_bounds_must_be_ordered() {
        let query = TransactionQuery {
            min_amount: Some("500".to_string()),
            max_amount: Some("100".to_string()),
            ..Default::default()
        };
        assert_eq!(fields(query.parse(10)), vec!["maxAmount"]);
    }

    #[test]
    fn test_bare_to_date_covers_whole_day() -> Result<()> {
        let query = DateQuery {
            from: Some("2025-06-01".to_string()),
            to: Some("2025-06-30".to_string()),
            has_issues: Some("true".to_string()),
            ..Default::default()
        };
        let (filters, _) = query.parse(10)?;
        let range = filters.date_range.ok_or(Error::Validation { errors: vec![] })?;
        assert_eq!(
            Some(range.from),
            Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).single()
        );
        let last_second = Utc
            .with_ymd_and_hms(2025, 6, 30, 23, 59, 59)
            .single()
            .unwrap_or_default();
        assert!(range.contains(last_second));
        assert!(range.contains(last_second + Duration::microseconds(999_500)));
        assert!(!range.contains(last_second + Duration::seconds(1)));
        assert!(filters.has_issues);
        Ok(())
    }

    #[test]
    fn test_rfc3339_and_half_ranges() {
        let query = DateQuery {
            from: Some("2025-06-01T10:00:00+05:30".to_string()),
            ..Default::default()
        };
        assert_eq!(fields(query.parse(10)), vec!["to"]);

        let query = DateQuery {
            from: Some("yesterday".to_string()),
            to: Some("2025-06-30".to_string()),
            date_type: Some("hybrid".to_string()),
            ..Default::default()
        };
        assert_eq!(fields(query.parse(10)), vec!["dateType", "from"]);
    }

    fn participant(id: &str, first_name: &str) -> ParticipantBody {
        ParticipantBody {
            id: id.to_string(),
            first_name: first_name.to_string(),
            last_name: "Sharma".to_string(),
            email: format!("{}@example.com", first_name.to_lowercase()),
            age: Some(27),
            city: "Pune".to_string(),
        }
    }

    #[test]
    fn test_new_date_body() -> Result<()> {
        let now = Utc::now();
        let body = NewDateBody {
            user1: Some(participant("u1", "Rohan")),
            user2: Some(participant("u2", "Ananya")),
            date_type: "online".to_string(),
            scheduled_at: (now + Duration::days(3)).to_rfc3339(),
            match_score: Some(91),
            notes: Some("  Both love hiking ".to_string()),
            ..Default::default()
        };
        let new = body.parse(now)?;
        assert_eq!(new.date_type, DateType::Online);
        assert_eq!(new.user2.email, "ananya@example.com");
        assert_eq!(new.match_score, 91);
        assert_eq!(new.notes.as_deref(), Some("Both love hiking"));
        assert_eq!(new.created_by, "Admin");
        assert!(new.location.is_none());
        Ok(())
    }

    #[test]
    fn test_new_date_body_collects_every_problem() {
        let now = Utc::now();
        let mut same = participant("u1", "Rohan");
        same.age = Some(16);
        let body = NewDateBody {
            user1: Some(participant("u1", "Rohan")),
            user2: Some(same),
            date_type: "offline".to_string(),
            scheduled_at: (now + Duration::hours(2)).to_rfc3339(),
            match_score: Some(120),
            ..Default::default()
        };
        assert_eq!(
            fields(body.parse(now)),
            vec!["user2.age", "user2.id", "scheduledAt", "location", "matchScore"]
        );

        let body = NewDateBody {
            date_type: "hybrid".to_string(),
            scheduled_at: (now + Duration::days(120)).to_rfc3339(),
            ..Default::default()
        };
        assert_eq!(
            fields(body.parse(now)),
            vec!["user1", "user2", "dateType", "scheduledAt"]
        );
    }

    #[test]
    fn test_feedback_body() -> Result<()> {
        let now = Utc::now();
        let body = FeedbackBody {
            participant: "user2".to_string(),
            rating: Some(4),
            interested: Some(true),
            comments: Some("Great conversation".to_string()),
        };
        let (slot, feedback) = body.parse(now)?;
        assert_eq!(slot, ParticipantSlot::User2);
        assert_eq!(feedback.rating, 4);
        assert_eq!(feedback.submitted_at, now);

        let bad = FeedbackBody {
            participant: "user3".to_string(),
            rating: Some(6),
            ..Default::default()
        };
        assert_eq!(
            fields(bad.parse(now)),
            vec!["participant", "rating", "interested"]
        );
        Ok(())
    }

    #[test]
    fn test_required_choice() {
        assert_eq!(
            parse_required("status", "invited", WaitlistStatus::ALL).ok(),
            Some(WaitlistStatus::Invited)
        );
        assert_eq!(fields(parse_required("status", "", DateStatus::ALL)), vec!["status"]);
        assert_eq!(fields(parse_required("status", "all", DateStatus::ALL)), vec!["status"]);
        assert_eq!(fields(parse_id("id", "abc")), vec!["id"]);
    }
}
