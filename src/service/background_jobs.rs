use std::sync::Arc;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use tokio::time::{interval, Duration};

use crate::{
    db::{propertydb::PropertyExt, rentdb::RentExt, userdb::UserExt},
    mail::mails::send_rent_reminder_email,
    AppState,
};

/// How far ahead of the due date tenants get reminded.
const REMINDER_WINDOW_DAYS: i64 = 3;
/// Minimum gap between reminders for the same payment.
const REMINDER_COOLDOWN_HOURS: i64 = 24;

/// Whether a payment is inside the reminder window and past the cooldown.
/// Due dates already behind `now` belong to the overdue sweep, not here.
pub fn needs_reminder(
    due_date: DateTime<Utc>,
    last_reminder_sent_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> bool {
    let in_window =
        due_date >= now && due_date <= now + ChronoDuration::days(REMINDER_WINDOW_DAYS);
    let cooled_down = match last_reminder_sent_at {
        Some(sent_at) => sent_at < now - ChronoDuration::hours(REMINDER_COOLDOWN_HOURS),
        None => true,
    };
    in_window && cooled_down
}

/// Daily sweep flipping past-due pending payments to overdue.
pub async fn start_overdue_sweep(app_state: Arc<AppState>) {
    let mut interval = interval(Duration::from_secs(86400));

    loop {
        interval.tick().await;

        tracing::info!("Running overdue payment sweep at {}", Utc::now());

        match app_state.db_client.mark_overdue_payments(Utc::now()).await {
            Ok(count) => tracing::info!("Overdue sweep completed: {} payments flipped", count),
            Err(e) => tracing::error!("Overdue sweep failed: {}", e),
        }
    }
}

/// Daily sweep emailing tenants whose rent is due within the next few days.
/// Each send is stamped on the payment row, so rerunning the sweep (or a
/// second instance racing it) does not double-remind anyone.
pub async fn start_rent_reminder_job(app_state: Arc<AppState>) {
    let mut interval = interval(Duration::from_secs(86400));

    loop {
        interval.tick().await;

        tracing::info!("Running rent reminder sweep at {}", Utc::now());

        let now = Utc::now();
        let due_before = now + ChronoDuration::days(REMINDER_WINDOW_DAYS);
        let reminded_before = now - ChronoDuration::hours(REMINDER_COOLDOWN_HOURS);

        let payments = match app_state
            .db_client
            .get_payments_needing_reminder(now, due_before, reminded_before)
            .await
        {
            Ok(payments) => payments,
            Err(e) => {
                tracing::error!("Failed to fetch payments needing reminders: {}", e);
                continue;
            }
        };

        tracing::info!("Found {} payments needing reminders", payments.len());

        for payment in payments {
            // The query pre-filters; re-check here so both agree on the window.
            if !needs_reminder(payment.due_date, payment.last_reminder_sent_at, now) {
                continue;
            }

            let tenant = match app_state.db_client.get_user(Some(payment.tenant_id), None).await {
                Ok(Some(tenant)) => tenant,
                Ok(None) => continue,
                Err(e) => {
                    tracing::error!("Failed to load tenant {}: {}", payment.tenant_id, e);
                    continue;
                }
            };

            let property_title = app_state
                .db_client
                .get_property_by_id(payment.property_id)
                .await
                .ok()
                .flatten()
                .map(|p| p.title)
                .unwrap_or_else(|| "your rented property".to_string());

            match send_rent_reminder_email(&app_state.env, &tenant, &property_title, &payment).await
            {
                Ok(_) => {
                    tracing::info!("Reminder sent to {}", tenant.email);
                    if let Err(e) = app_state
                        .db_client
                        .stamp_reminder_sent(payment.id, Utc::now())
                        .await
                    {
                        tracing::error!("Failed to stamp reminder for {}: {}", payment.id, e);
                    }
                }
                // Fire and forget: the next sweep retries anything unstamped
                Err(e) => tracing::error!("Failed to send reminder to {}: {}", tenant.email, e),
            }
        }

        tracing::info!("Rent reminder sweep completed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn reminds_inside_the_three_day_window() {
        let now = now();
        assert!(needs_reminder(now, None, now));
        assert!(needs_reminder(now + ChronoDuration::days(1), None, now));
        assert!(needs_reminder(now + ChronoDuration::days(3), None, now));
    }

    #[test]
    fn skips_payments_outside_the_window() {
        let now = now();
        assert!(!needs_reminder(now - ChronoDuration::hours(1), None, now));
        assert!(!needs_reminder(
            now + ChronoDuration::days(3) + ChronoDuration::hours(1),
            None,
            now
        ));
    }

    #[test]
    fn respects_the_reminder_cooldown() {
        let now = now();
        let due = now + ChronoDuration::days(2);
        assert!(!needs_reminder(due, Some(now - ChronoDuration::hours(23)), now));
        assert!(needs_reminder(due, Some(now - ChronoDuration::hours(25)), now));
    }
}
