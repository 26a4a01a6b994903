//! Subject lines and HTML bodies for outbound email.

use super::EmailKind;

pub struct EmailContent {
    pub subject: String,
    pub html: String,
}

impl EmailContent {
    pub fn for_kind(kind: &EmailKind) -> Self {
        match kind {
            EmailKind::TrustedContactAdded => Self::new(
                "You Have Been Added as a Trusted Contact",
                "Trusted Contact Access",
                "<p>You have been added as a trusted contact in VaultBox.</p>\n\
                 <p>This means:</p>\n\
                 <ul>\n\
                 <li>You can request emergency access to the vault if needed</li>\n\
                 <li>Access will be granted after a specified period of inactivity</li>\n\
                 <li>You will be notified when access is granted</li>\n\
                 </ul>\n\
                 <p>You can manage emergency access anytime by visiting VaultBox.</p>",
            ),
            EmailKind::AccessRequested { owner_email } => Self::new(
                "Emergency Access Request",
                "Emergency Access Request",
                &format!(
                    "<p>You have requested emergency access to {owner}'s vault.</p>\n\
                     <p>You will be notified when access is granted. This usually happens when \
                     the vault owner has been inactive for the agreed period, or when the owner \
                     grants you access directly.</p>\n\
                     <p>You can check the status of your request on the emergency access page.</p>",
                    owner = escape(owner_email)
                ),
            ),
            EmailKind::AccessGranted { owner_email } => Self::new(
                "Emergency Access Granted",
                "Emergency Access Granted",
                &format!(
                    "<p>You have been granted emergency access to {owner}'s vault.</p>\n\
                     <p>You can now view shared entries on the emergency access page.</p>\n\
                     <p>Please handle this access responsibly.</p>",
                    owner = escape(owner_email)
                ),
            ),
            EmailKind::InactivityWarning { contact_email } => Self::new(
                "Inactivity Warning",
                "Inactivity Warning",
                &format!(
                    "<p>Your vault has been inactive for an extended period.</p>\n\
                     <p>Your trusted contact ({contact}) has been granted emergency access.</p>\n\
                     <p>Log in to your vault to manage their access.</p>",
                    contact = escape(contact_email)
                ),
            ),
            EmailKind::AccessStatusUpdate {
                owner_email,
                days_remaining,
            } => Self::new(
                "Emergency Access Request Status Update",
                "Access Request Status Update",
                &format!(
                    "<p>Your emergency access request for {owner}'s vault is still pending.</p>\n\
                     <p>Access will be granted automatically in {days_remaining} days if no \
                     action is taken.</p>\n\
                     <p>You can check your request status on the emergency access page.</p>",
                    owner = escape(owner_email)
                ),
            ),
        }
    }

    fn new(subject: &str, heading: &str, body: &str) -> Self {
        Self {
            subject: format!("{subject} - VaultBox"),
            html: format!(
                "<!DOCTYPE html>\n<html>\n<head><meta charset=\"utf-8\"></head>\n<body>\n\
                 <h2>{heading}</h2>\n{body}\n</body>\n</html>"
            ),
        }
    }
}

/// Minimal HTML escaping for interpolated addresses.
fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
