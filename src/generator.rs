//! Deterministic mock data.
//!
//! Generates realistic transactions and curated dates from a seeded RNG, so the
//! mock source and database seeding show the same records across restarts for
//! a given seed.

use crate::models::{
    CuratedDateRecord, DateFeedback, DateLocation, DateStatus, DateType, Genie, Participant,
    ParticipantFeedback, PaymentMethod, TransactionRecord, TransactionStatus, TransactionType,
};
use chrono::{DateTime, Duration, Utc};
use rand::{Rng, SeedableRng, rngs::StdRng};

struct MockUser {
    id: &'static str,
    name: &'static str,
    email: &'static str,
}

const USERS: [MockUser; 5] = [
    MockUser {
        id: "u1",
        name: "Rahul Sharma",
        email: "rahul@example.com",
    },
    MockUser {
        id: "u2",
        name: "Priya Patel",
        email: "priya@example.com",
    },
    MockUser {
        id: "u3",
        name: "Amit Kumar",
        email: "amit@example.com",
    },
    MockUser {
        id: "u4",
        name: "Sneha Gupta",
        email: "sneha@example.com",
    },
    MockUser {
        id: "u5",
        name: "Vikram Singh",
        email: "vikram@example.com",
    },
];

const CITIES: [&str; 6] = ["Bangalore", "Mumbai", "Delhi", "Chennai", "Pune", "Hyderabad"];

const GENIES: [(&str, &str, &str); 3] = [
    ("g1", "Sarah Anderson", "sarah@datifyy.com"),
    ("g2", "Mike Chen", "mike@datifyy.com"),
    ("g3", "Priya Sharma", "priya@datifyy.com"),
];

const LOCATIONS: [(&str, &str, &str); 4] = [
    ("The Coffee House", "Indiranagar, 100 Feet Road", "Bangalore"),
    ("Cafe Social", "Koramangala, 5th Block", "Bangalore"),
    ("The Blue Door", "Bandra West", "Mumbai"),
    ("Tea Villa Cafe", "Connaught Place", "Delhi"),
];

const FIRST_NAMES_1: [&str; 4] = ["John", "James", "Robert", "Michael"];
const LAST_NAMES_1: [&str; 4] = ["Smith", "Johnson", "Williams", "Brown"];
const FIRST_NAMES_2: [&str; 4] = ["Emma", "Olivia", "Sophia", "Isabella"];
const LAST_NAMES_2: [&str; 4] = ["Davis", "Miller", "Wilson", "Moore"];

/// Seeded generator for mock records.
pub struct MockDataGenerator {
    rng: StdRng,
    now: DateTime<Utc>,
}

impl MockDataGenerator {
    /// Creates a generator whose records are dated relative to `now`.
    #[must_use]
    pub fn new(seed: u64, now: DateTime<Utc>) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            now,
        }
    }

    fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.rng.gen_range(0..items.len())]
    }

    /// Generates `count` transactions with ids `1..=count`.
    ///
    /// Refunds are always negative and `refunded`; purchases carry
    /// `amount / 100 * 10` love tokens. Creation times spread over 60 days.
    pub fn transactions(&mut self, count: usize) -> Vec<TransactionRecord> {
        (1..=count).map(|n| self.transaction(n)).collect()
    }

    #[allow(clippy::cast_possible_wrap)]
    fn transaction(&mut self, n: usize) -> TransactionRecord {
        let kind = *self.pick(TransactionType::ALL);
        let status = if kind == TransactionType::Refund {
            TransactionStatus::Refunded
        } else {
            *self.pick(TransactionStatus::ALL)
        };
        let user = self.pick(&USERS);
        let created_at = self.now - Duration::days(self.rng.gen_range(0..60))
            - Duration::minutes(self.rng.gen_range(0..24 * 60));

        let base_amount: i64 = self.rng.gen_range(500..5500);
        let amount = if kind == TransactionType::Refund {
            -base_amount
        } else {
            base_amount
        };
        let love_tokens = (kind == TransactionType::Purchase).then_some(amount / 100 * 10);
        let description = match (kind, love_tokens) {
            (TransactionType::Purchase, Some(tokens)) => format!("Purchase of {tokens} Love Tokens"),
            (TransactionType::Subscription, _) => "Monthly Premium Subscription".to_string(),
            (TransactionType::Bonus, _) => "Referral Bonus".to_string(),
            _ => "Refund for failed date".to_string(),
        };

        TransactionRecord {
            id: n as i64,
            transaction_ref: format!("TXN{n:08}"),
            user_id: user.id.to_string(),
            user_name: user.name.to_string(),
            user_email: user.email.to_string(),
            kind,
            amount,
            currency: "INR".to_string(),
            status,
            payment_method: *self.pick(PaymentMethod::ALL),
            description,
            love_tokens,
            promo_code: self.rng.gen_bool(0.3).then(|| "LOVE20".to_string()),
            created_at,
            completed_at: (status == TransactionStatus::Completed)
                .then(|| created_at + Duration::minutes(5)),
            refunded_at: (status == TransactionStatus::Refunded)
                .then(|| created_at + Duration::days(1)),
        }
    }

    /// Generates `count` curated dates with ids `1..=count`.
    ///
    /// Dates are scheduled between 20 days ago and 10 days ahead. Only completed
    /// dates may carry feedback; offline dates get a venue and usually a genie.
    pub fn curated_dates(&mut self, count: usize) -> Vec<CuratedDateRecord> {
        (1..=count).map(|n| self.curated_date(n)).collect()
    }

    #[allow(clippy::cast_possible_wrap)]
    fn curated_date(&mut self, n: usize) -> CuratedDateRecord {
        let i = n - 1;
        let status = *self.pick(DateStatus::ALL);
        let date_type = if self.rng.gen_bool(0.5) {
            DateType::Online
        } else {
            DateType::Offline
        };
        let city = *self.pick(&CITIES);
        let scheduled_at = self.now + Duration::days(10 - self.rng.gen_range(0..30))
            + Duration::hours(self.rng.gen_range(0..12));

        let location = (date_type == DateType::Offline).then(|| {
            let (name, address, city) = LOCATIONS[i % LOCATIONS.len()];
            DateLocation {
                name: name.to_string(),
                address: address.to_string(),
                city: city.to_string(),
            }
        });
        let genie = (date_type == DateType::Offline && self.rng.gen_bool(0.7)).then(|| {
            let (id, name, email) = GENIES[i % GENIES.len()];
            Genie {
                id: id.to_string(),
                name: name.to_string(),
                email: email.to_string(),
            }
        });

        let feedback = (status == DateStatus::Completed && self.rng.gen_bool(0.8)).then(|| {
            let submitted_at = scheduled_at + Duration::hours(2);
            DateFeedback {
                user1: Some(self.feedback("Had a great time!", submitted_at)),
                user2: Some(self.feedback("Nice conversation!", submitted_at)),
            }
        });

        CuratedDateRecord {
            id: n as i64,
            date_ref: format!("DATE{n:06}"),
            user1: Participant {
                id: format!("u{}", i * 2 + 1),
                first_name: FIRST_NAMES_1[i % 4].to_string(),
                last_name: LAST_NAMES_1[i % 4].to_string(),
                email: format!("user{}@example.com", i * 2 + 1),
                age: self.rng.gen_range(25..35),
                city: city.to_string(),
            },
            user2: Participant {
                id: format!("u{}", i * 2 + 2),
                first_name: FIRST_NAMES_2[i % 4].to_string(),
                last_name: LAST_NAMES_2[i % 4].to_string(),
                email: format!("user{}@example.com", i * 2 + 2),
                age: self.rng.gen_range(24..34),
                city: city.to_string(),
            },
            date_type,
            scheduled_at,
            status,
            location,
            genie,
            feedback,
            match_score: self.rng.gen_range(70..100),
            created_at: scheduled_at - Duration::days(7),
            created_by: "Admin User".to_string(),
            last_updated_at: scheduled_at,
            cancellation_reason: (status == DateStatus::Cancelled)
                .then(|| "User requested cancellation".to_string()),
            notes: self
                .rng
                .gen_bool(0.3)
                .then(|| "Special arrangement requested".to_string()),
        }
    }

    fn feedback(&mut self, comments: &str, submitted_at: DateTime<Utc>) -> ParticipantFeedback {
        ParticipantFeedback {
            rating: self.rng.gen_range(3..=5),
            interested: self.rng.gen_bool(0.5),
            comments: Some(comments.to_string()),
            submitted_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_data() {
        let now = Utc::now();
        let a = MockDataGenerator::new(42, now).transactions(20);
        let b = MockDataGenerator::new(42, now).transactions(20);
        assert_eq!(a, b);

        let c = MockDataGenerator::new(43, now).transactions(20);
        assert_ne!(a, c);
    }

    #[test]
    fn test_transaction_shape() {
        let now = Utc::now();
        let records = MockDataGenerator::new(1, now).transactions(200);
        assert_eq!(records.len(), 200);
        assert_eq!(records[0].transaction_ref, "TXN00000001");

        for tx in &records {
            assert!(tx.created_at <= now);
            assert!(tx.created_at > now - Duration::days(61));
            match tx.kind {
                TransactionType::Refund => {
                    assert!(tx.amount < 0);
                    assert_eq!(tx.status, TransactionStatus::Refunded);
                }
                TransactionType::Purchase => {
                    assert!(tx.amount > 0);
                    assert_eq!(tx.love_tokens, Some(tx.amount / 100 * 10));
                }
                _ => assert!(tx.amount > 0),
            }
            assert_eq!(
                tx.completed_at.is_some(),
                tx.status == TransactionStatus::Completed
            );
        }
    }

    #[test]
    fn test_curated_date_shape() {
        let now = Utc::now();
        let dates = MockDataGenerator::new(1, now).curated_dates(100);
        assert_eq!(dates[4].date_ref, "DATE000005");

        for date in &dates {
            assert!((70..100).contains(&date.match_score));
            if date.feedback.is_some() {
                assert_eq!(date.status, DateStatus::Completed);
            }
            if date.date_type == DateType::Online {
                assert!(date.location.is_none());
                assert!(date.genie.is_none());
            }
            assert_eq!(
                date.cancellation_reason.is_some(),
                date.status == DateStatus::Cancelled
            );
            for entry in date.feedback.iter().flat_map(DateFeedback::entries) {
                assert!((3..=5).contains(&entry.rating));
            }
        }
    }
}
