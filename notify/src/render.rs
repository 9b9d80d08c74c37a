//! Confirmation message rendering.
//!
//! The message is `multipart/related`: an HTML body that references the QR
//! code as `cid:qrcode`, followed by the PNG itself as an inline part.

use crate::qr;
use lettre::Message;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use vibe_core::{ConfirmationEmail, Result, VibeError};

/// Content-ID of the inline QR image.
pub const QR_CONTENT_ID: &str = "qrcode";

fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// HTML body of a confirmation.
#[must_use]
pub fn html_body(email: &ConfirmationEmail) -> String {
    let name = escape(&email.name);
    let title = escape(&email.event_title);
    let time = escape(&email.event_time);
    let date = email.event_date.format("%Y-%m-%d");
    let tickets = email.tickets;
    let reservation_id = email.reservation_id;

    format!(
        r#"
<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>Reservation Confirmed</title>
</head>
<body style="font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; background-color: #f9f9f9; color: #333;">
    <div style="max-width: 600px; margin: auto; padding: 24px; border: 1px solid #e0e0e0; border-radius: 8px;">
        <h1 style="color: #d98ff2; text-align: center; margin-bottom: 24px;">Reservation Confirmed!</h1>
        <p style="font-size: 16px;">Hi <strong>{name}</strong>,</p>
        <p style="font-size: 16px;">Your reservation for <strong>{title}</strong> is confirmed! We're excited to have you join us.</p>
        <div style="background-color: #fff; padding: 16px 20px; border-radius: 6px; border: 1px solid #ddd; margin-bottom: 24px;">
            <h3 style="margin-top: 0;">Event Details</h3>
            <p style="margin: 8px 0;"><strong>Event:</strong> {title}</p>
            <p style="margin: 8px 0;"><strong>Date:</strong> {date}</p>
            <p style="margin: 8px 0;"><strong>Time:</strong> {time}</p>
            <p style="margin: 8px 0;"><strong>Tickets Reserved:</strong> {tickets}</p>
        </div>
        <div style="text-align: center; margin-bottom: 24px;">
            <h3>Your QR Code</h3>
            <p style="font-size: 14px;">Present this QR code at the event check-in:</p>
            <img src="cid:{QR_CONTENT_ID}" alt="Reservation QR Code" style="width: 180px; height: 180px;" />
            <p style="font-size: 14px; color: #666;">Reservation ID: <strong>{reservation_id}</strong></p>
        </div>
        <p style="font-size: 12px; color: #999; text-align: center;">
            If you did not make this reservation, you can safely ignore this email.
        </p>
    </div>
</body>
</html>
"#
    )
}

/// Build the complete MIME message, QR code included.
///
/// # Errors
///
/// Returns `Notification` for an unparsable recipient, a QR failure, or a
/// message that cannot be assembled.
pub fn message(email: &ConfirmationEmail, from: &Mailbox) -> Result<Message> {
    let to: Mailbox = Mailbox::new(
        Some(email.name.clone()),
        email
            .to
            .parse()
            .map_err(|e| VibeError::Notification(format!("Invalid to address: {e}")))?,
    );

    let png = qr::png(&email.reservation_id.to_string())?;
    let png_type = ContentType::parse("image/png")
        .map_err(|e| VibeError::Notification(format!("Invalid content type: {e}")))?;

    Message::builder()
        .from(from.clone())
        .to(to)
        .subject(email.subject())
        .multipart(
            MultiPart::related()
                .singlepart(SinglePart::html(html_body(email)))
                .singlepart(Attachment::new_inline(QR_CONTENT_ID.to_string()).body(png, png_type)),
        )
        .map_err(|e| VibeError::Notification(format!("Failed to build email: {e}")))
}
