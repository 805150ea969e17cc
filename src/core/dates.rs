//! Curated date statistics.
//!
//! Success rate and average rating only look at completed dates; every other
//! count covers the whole set.

use crate::core::{percentage, round_to_tenth};
use crate::models::{CuratedDateRecord, DateStatus, DateType};
use serde::Serialize;

/// Summary numbers for the date curation dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateStats {
    /// Every date
    pub total: u64,
    /// Dates still to happen
    pub scheduled: u64,
    /// Dates in progress
    pub ongoing: u64,
    /// Dates that took place
    pub completed: u64,
    /// Dates called off
    pub cancelled: u64,
    /// Dates somebody skipped
    pub no_show: u64,
    /// Video dates
    pub online: u64,
    /// In-person dates
    pub offline: u64,
    /// Completed dates where somebody wants a second one, whole percent
    pub success_rate: u32,
    /// Mean of every participant rating on completed dates, one decimal
    pub average_rating: f64,
}

/// Reduces a set of curated dates to [`DateStats`].
///
/// # Arguments
/// * `dates` - The dates to summarise, usually the whole unfiltered set
///
/// # Returns
/// Counts per status and type, the success rate and the average rating.
/// Rates are 0 when there is nothing to divide by.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn compute_stats(dates: &[CuratedDateRecord]) -> DateStats {
    let mut stats = DateStats {
        total: dates.len() as u64,
        ..DateStats::default()
    };

    let mut interested = 0_u64;
    let mut rating_sum = 0_u64;
    let mut rating_count = 0_u64;

    for date in dates {
        match date.status {
            DateStatus::Scheduled => stats.scheduled += 1,
            DateStatus::Ongoing => stats.ongoing += 1,
            DateStatus::Completed => stats.completed += 1,
            DateStatus::Cancelled => stats.cancelled += 1,
            DateStatus::NoShow => stats.no_show += 1,
        }
        match date.date_type {
            DateType::Online => stats.online += 1,
            DateType::Offline => stats.offline += 1,
        }

        if date.status != DateStatus::Completed {
            continue;
        }
        if let Some(feedback) = &date.feedback {
            if feedback.anyone_interested() {
                interested += 1;
            }
            for entry in feedback.entries() {
                rating_sum += u64::from(entry.rating);
                rating_count += 1;
            }
        }
    }

    stats.success_rate = percentage(interested as f64, stats.completed as f64);
    stats.average_rating = if rating_count == 0 {
        0.0
    } else {
        round_to_tenth(rating_sum as f64 / rating_count as f64)
    };
    stats
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::models::{DateFeedback, ParticipantFeedback};
    use crate::test_utils::sample_date;
    use chrono::Utc;

    fn feedback(rating: u8, interested: bool) -> ParticipantFeedback {
        ParticipantFeedback {
            rating,
            interested,
            comments: None,
            submitted_at: Utc::now(),
        }
    }

    fn completed_with(
        id: i64,
        user1: Option<ParticipantFeedback>,
        user2: Option<ParticipantFeedback>,
    ) -> CuratedDateRecord {
        let mut date = sample_date(id, DateStatus::Completed);
        date.feedback = Some(DateFeedback { user1, user2 });
        date
    }

    #[test]
    fn test_empty_set_is_zero() {
        let stats = compute_stats(&[]);
        assert_eq!(stats, DateStats::default());
        assert_eq!(stats.success_rate, 0);
        assert_eq!(stats.average_rating, 0.0);
    }

    #[test]
    fn test_no_completed_dates_means_zero_success() {
        let dates = vec![
            sample_date(1, DateStatus::Scheduled),
            sample_date(2, DateStatus::Cancelled),
            sample_date(3, DateStatus::NoShow),
        ];
        let stats = compute_stats(&dates);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.cancelled, 1);
        assert_eq!(stats.no_show, 1);
        assert_eq!(stats.success_rate, 0);
        assert_eq!(stats.average_rating, 0.0);
    }

    #[test]
    fn test_success_rate_and_rating() {
        let dates = vec![
            completed_with(1, Some(feedback(5, true)), Some(feedback(4, false))),
            completed_with(2, Some(feedback(2, false)), Some(feedback(1, false))),
            completed_with(3, None, Some(feedback(4, true))),
            // Counted as completed but without feedback
            sample_date(4, DateStatus::Completed),
        ];
        let stats = compute_stats(&dates);
        assert_eq!(stats.completed, 4);
        // 2 of 4 completed dates had an interested participant
        assert_eq!(stats.success_rate, 50);
        // (5 + 4 + 2 + 1 + 4) / 5
        assert_eq!(stats.average_rating, 3.2);
        assert!((1.0..=5.0).contains(&stats.average_rating));
    }

    #[test]
    fn test_feedback_on_other_statuses_is_ignored() {
        let mut cancelled = sample_date(1, DateStatus::Cancelled);
        cancelled.feedback = Some(DateFeedback {
            user1: Some(feedback(1, true)),
            user2: None,
        });
        let dates = vec![
            cancelled,
            completed_with(2, Some(feedback(5, true)), None),
        ];
        let stats = compute_stats(&dates);
        assert_eq!(stats.success_rate, 100);
        assert_eq!(stats.average_rating, 5.0);
    }

    #[test]
    fn test_counts_by_type() {
        let mut online = sample_date(1, DateStatus::Scheduled);
        online.date_type = DateType::Online;
        let dates = vec![online, sample_date(2, DateStatus::Ongoing)];
        let stats = compute_stats(&dates);
        assert_eq!(stats.online, 1);
        assert_eq!(stats.offline, 1);
        assert_eq!(stats.ongoing, 1);
    }
}
