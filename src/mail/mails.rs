use crate::config::Config;
use crate::mail::sendmail::{send_email, MailError};
use crate::models::applicationmodel::ApplicationStatus;
use crate::models::leasemodel::Lease;
use crate::models::rentmodel::RentPayment;
use crate::models::usermodel::User;

pub async fn send_rent_reminder_email(
    config: &Config,
    tenant: &User,
    property_title: &str,
    payment: &RentPayment,
) -> Result<(), MailError> {
    let subject = format!("Rent due soon for {}", property_title);
    let amount = format_amount(payment.amount);
    let html_body = format!(
        r#"<html><body>
        <h2>Hi {name},</h2>
        <p>This is a reminder that your rent payment for <strong>{property}</strong> is due on <strong>{due}</strong>.</p>
        <p>Amount due: <strong>{amount}</strong> (month {month} of your lease).</p>
        <p>Please make your payment on time to avoid it being marked overdue.</p>
        <p>— The RentEz Team</p>
        </body></html>"#,
        name = tenant.name,
        property = property_title,
        due = payment.due_date.format("%B %d, %Y"),
        amount = amount,
        month = payment.month_number,
    );

    send_email(config, &tenant.email, &subject, &html_body).await
}

pub async fn send_application_status_email(
    config: &Config,
    tenant: &User,
    property_title: &str,
    status: &ApplicationStatus,
    rejection_reason: Option<&str>,
) -> Result<(), MailError> {
    let (subject, body_line) = match status {
        ApplicationStatus::Approved => (
            format!("Your application for {} was approved", property_title),
            "Congratulations! The owner has approved your rental application. They will set up your lease shortly.".to_string(),
        ),
        ApplicationStatus::Rejected => {
            let reason = rejection_reason
                .map(|r| format!(" Reason: {}", r))
                .unwrap_or_default();
            (
                format!("Update on your application for {}", property_title),
                format!("Unfortunately, the owner has declined your rental application.{}", reason),
            )
        }
        ApplicationStatus::Pending => return Ok(()),
    };

    let html_body = format!(
        r#"<html><body>
        <h2>Hi {name},</h2>
        <p>{body}</p>
        <p>Property: <strong>{property}</strong></p>
        <p>— The RentEz Team</p>
        </body></html>"#,
        name = tenant.name,
        body = body_line,
        property = property_title,
    );

    send_email(config, &tenant.email, &subject, &html_body).await
}

pub async fn send_lease_created_email(
    config: &Config,
    tenant: &User,
    property_title: &str,
    lease: &Lease,
) -> Result<(), MailError> {
    let subject = format!("Your lease for {} is ready", property_title);
    let html_body = format!(
        r#"<html><body>
        <h2>Hi {name},</h2>
        <p>Your lease for <strong>{property}</strong> has been created.</p>
        <ul>
            <li>Start date: {start}</li>
            <li>End date: {end}</li>
            <li>Monthly rent: {rent}</li>
            <li>Security deposit: {deposit}</li>
        </ul>
        <p>Your rent payment schedule is now available in your dashboard.</p>
        <p>— The RentEz Team</p>
        </body></html>"#,
        name = tenant.name,
        property = property_title,
        start = lease.start_date.format("%B %d, %Y"),
        end = lease.end_date.format("%B %d, %Y"),
        rent = format_amount(lease.monthly_rent),
        deposit = format_amount(lease.security_deposit),
    );

    send_email(config, &tenant.email, &subject, &html_body).await
}

// Amounts are stored in paise.
fn format_amount(paise: i64) -> String {
    format!("₹{}.{:02}", paise / 100, paise % 100)
}

#[cfg(test)]
mod tests {
    use super::format_amount;

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(1_500_000), "₹15000.00");
        assert_eq!(format_amount(99), "₹0.99");
        assert_eq!(format_amount(120050), "₹1200.50");
    }
}
