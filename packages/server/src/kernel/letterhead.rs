//! Fixed letterhead wrapper for outbound notifications.
//!
//! Bodies are plain string interpolation into the wrapper; the subject
//! slot in the wrapper is substituted per message.

use crate::domains::member::Member;

const SUBJECT_SLOT: &str = "&lt;subject&gt;";

#[derive(Debug, Clone)]
pub struct Letterhead {
    wrapper: String,
}

impl Letterhead {
    pub fn new(org_name: &str) -> Self {
        Self {
            wrapper: format!("<h2>{org_name}</h2><h3>{SUBJECT_SLOT}</h3>"),
        }
    }

    /// Render subject and body paragraphs into the wrapper.
    pub fn render(&self, subject: &str, paragraphs: &[String]) -> String {
        let mut body = self.wrapper.replace(SUBJECT_SLOT, subject);
        for paragraph in paragraphs {
            body.push_str("<p>");
            body.push_str(paragraph);
            body.push_str("</p>");
        }
        body
    }
}

/// Opening line of member-facing notifications.
pub fn member_greeting(member: &Member) -> String {
    format!("Dear {},", member.first_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_substitutes_subject_and_appends_paragraphs() {
        let letterhead = Letterhead::new("Example Society");
        let body = letterhead.render("Renewal Reminder", &["Hello.".to_string()]);
        assert!(body.contains("Example Society"));
        assert!(body.contains("<h3>Renewal Reminder</h3>"));
        assert!(body.contains("<p>Hello.</p>"));
        assert!(!body.contains(SUBJECT_SLOT));
    }
}
