use std::collections::BTreeMap;
use std::sync::OnceLock;

use chrono::{DateTime, Local};
use regex::Regex;

use crate::booking::FormType;
use crate::storage::config::{NotificationConfig, SubjectPrefixes};

const NOT_PROVIDED: &str = "Not provided";
const NOT_SPECIFIED: &str = "Not specified";

static BOLD_RE: OnceLock<Regex> = OnceLock::new();
static EMPHASIS_RE: OnceLock<Regex> = OnceLock::new();

fn bold_pattern() -> &'static Regex {
    BOLD_RE.get_or_init(|| {
        Regex::new(r"\*\*(.*?)\*\*")
            .expect("invalid bold regex")
    })
}

fn emphasis_pattern() -> &'static Regex {
    EMPHASIS_RE.get_or_init(|| {
        Regex::new(r"\*(.*?)\*")
            .expect("invalid emphasis regex")
    })
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Escapes the text, then applies minimal markup: line breaks, `**bold**` and `*em*`.
pub fn to_html(text: &str) -> String {
    let html = escape_html(text).replace('\n', "<br>");
    let html = bold_pattern().replace_all(&html, "<strong>$1</strong>");
    emphasis_pattern().replace_all(&html, "<em>$1</em>").into_owned()
}

/// A submission rendered for a human at the venue. Doubles as the manual
/// fallback when delivery fails.
#[derive(Debug, Clone, PartialEq)]
pub struct ComposedMessage {
    pub form_type: FormType,
    pub recipient: String,
    pub subject: String,
    pub body: String,
    pub reply_to: Option<String>,
}

impl ComposedMessage {
    pub fn html(&self) -> String {
        to_html(&self.body)
    }

    /// Everything needed to send the message by hand.
    pub fn as_manual_text(&self) -> String {
        format!("To: {}\nSubject: {}\n\n{}", self.recipient, self.subject, self.body)
    }
}

struct Fields<'a>(&'a BTreeMap<String, String>);

impl Fields<'_> {
    fn first(&self, keys: &[&str]) -> Option<&str> {
        keys.iter()
            .filter_map(|key| self.0.get(*key))
            .map(|value| value.trim())
            .find(|value| !value.is_empty())
    }

    fn or<'b>(&'b self, keys: &[&str], default: &'b str) -> &'b str {
        self.first(keys).unwrap_or(default)
    }
}

/// Line-oriented body builder.
#[derive(Default)]
struct Body(Vec<String>);

impl Body {
    fn line(&mut self, text: impl Into<String>) -> &mut Self {
        self.0.push(text.into());
        self
    }

    fn item(&mut self, label: &str, value: &str) -> &mut Self {
        self.line(format!("- {}: {}", label, value))
    }

    fn section(&mut self, heading: &str) -> &mut Self {
        if !self.0.is_empty() {
            self.0.push(String::new());
        }
        self.line(format!("**{}**", heading))
    }

    fn finish(&mut self, business_name: &str, address: &str) -> String {
        self.0.push(String::new());
        self.0.push("---".to_string());
        self.0.push(format!("Sent from {} Website", business_name));
        self.0.push(address.to_string());
        self.0.join("\n")
    }
}

#[derive(Debug, Clone)]
pub struct MessageComposer {
    recipient: String,
    business_name: String,
    business_address: String,
    subjects: SubjectPrefixes,
}

impl MessageComposer {
    pub fn new(config: &NotificationConfig) -> Self {
        Self {
            recipient: config.recipient.clone(),
            business_name: config.business_name.clone(),
            business_address: config.business_address.clone(),
            subjects: config.subjects.clone(),
        }
    }

    /// Display name used as the sender of relayed mail.
    pub fn sender(&self) -> String {
        format!("{} Website", self.business_name)
    }

    pub fn compose(&self, form_type: FormType, fields: &BTreeMap<String, String>) -> ComposedMessage {
        self.compose_at(form_type, fields, Local::now())
    }

    pub fn compose_at(
        &self,
        form_type: FormType,
        fields: &BTreeMap<String, String>,
        now: DateTime<Local>,
    ) -> ComposedMessage {
        let f = Fields(fields);
        let mut body = Body::default();

        match form_type {
            FormType::Party => self.party(&f, &mut body),
            FormType::Reservation => self.reservation(&f, &mut body),
            FormType::Contact => self.contact(&f, &mut body),
            FormType::Waiver => self.waiver(&f, &mut body, now),
            FormType::Partnership => self.partnership(&f, &mut body),
            FormType::General => self.general(&f, &mut body),
        }

        ComposedMessage {
            form_type,
            recipient: self.recipient.clone(),
            subject: self.subjects.for_form(form_type).to_string(),
            body: body.finish(&self.business_name, &self.business_address),
            reply_to: f.first(&["email"]).map(str::to_string),
        }
    }

    fn customer(&self, f: &Fields<'_>, body: &mut Body, heading: &str) {
        body.section(heading)
            .item("Name", f.or(&["name"], NOT_PROVIDED))
            .item("Email", f.or(&["email"], NOT_PROVIDED))
            .item("Phone", f.or(&["phone"], NOT_PROVIDED));
    }

    fn party(&self, f: &Fields<'_>, body: &mut Body) {
        body.line("NEW PARTY REGISTRATION RECEIVED!");
        body.section("Party Details")
            .item("Date", f.or(&["partyDate"], NOT_SPECIFIED))
            .item("Time", f.or(&["partyTime"], NOT_SPECIFIED))
            .item("Party Type", f.or(&["partyType"], NOT_SPECIFIED))
            .item("Number of Guests", f.or(&["numberOfGuests", "guests"], NOT_SPECIFIED));
        self.customer(f, body, "Customer Information");
        body.section("Extras")
            .item("Decoration Package", f.or(&["decorationPackage"], "Not selected"))
            .item("Add-on Services", f.or(&["addOnServices"], "None selected"));
        body.section("Special Requests")
            .line(f.or(&["specialRequests"], "No special requests"));
        body.section("Additional Notes")
            .line(f.or(&["notes"], "No additional notes"));
    }

    fn reservation(&self, f: &Fields<'_>, body: &mut Body) {
        body.line("NEW RESERVATION REQUEST RECEIVED!");
        body.section("Reservation Details")
            .item("Date", f.or(&["selectedDate", "date"], NOT_SPECIFIED))
            .item("Time", f.or(&["timeLabel", "selectedTime", "time"], NOT_SPECIFIED))
            .item("Reservation Type", f.or(&["type"], NOT_SPECIFIED))
            .item("Number of Guests", f.or(&["guests"], NOT_SPECIFIED));
        self.customer(f, body, "Customer Information");
        body.section("Special Requests")
            .line(f.or(&["notes"], "No special requests"));
        body.section("Calendar")
            .item("Google Calendar Event ID", f.or(&["googleEventId"], "Not created"))
            .item("Reference", f.or(&["reference"], NOT_PROVIDED));
    }

    fn contact(&self, f: &Fields<'_>, body: &mut Body) {
        body.line("NEW CONTACT FORM SUBMISSION RECEIVED!");
        self.customer(f, body, "Contact Information");
        body.section("Message")
            .line(f.or(&["message"], "No message provided"));
        body.section("Subject")
            .line(f.or(&["subject"], "General Inquiry"));
    }

    fn waiver(&self, f: &Fields<'_>, body: &mut Body, now: DateTime<Local>) {
        body.line("NEW WAIVER SUBMISSION RECEIVED!");
        body.section("Participant Information")
            .item("Participant Name", f.or(&["participantName"], NOT_PROVIDED))
            .item("Age", f.or(&["participantAge"], NOT_PROVIDED))
            .item("Parent/Guardian", f.or(&["parentGuardian"], NOT_PROVIDED));
        body.section("Contact Information")
            .item("Phone", f.or(&["phone"], NOT_PROVIDED))
            .item("Email", f.or(&["email"], NOT_PROVIDED))
            .item("Emergency Contact", f.or(&["emergencyContact"], NOT_PROVIDED));
        body.section("Agreement Status")
            .line("WAIVER AGREED TO")
            .item("Submission Date", &now.format("%m/%d/%Y").to_string())
            .item("Submission Time", &now.format("%I:%M:%S %p").to_string());
    }

    fn partnership(&self, f: &Fields<'_>, body: &mut Body) {
        body.line("NEW PARTNERSHIP INQUIRY RECEIVED!");
        self.customer(f, body, "Contact Information");
        body.item("Company", f.or(&["company"], NOT_PROVIDED));
        body.section("Partnership Details")
            .item("Partnership Type", f.or(&["partnershipType"], NOT_SPECIFIED))
            .item("Business Description", f.or(&["businessDescription"], NOT_PROVIDED));
        body.section("Proposal")
            .line(f.or(&["proposal"], "No proposal provided"));
        body.section("Preferred Contact Time")
            .line(f.or(&["preferredContactTime"], NOT_SPECIFIED));
    }

    fn general(&self, f: &Fields<'_>, body: &mut Body) {
        body.line("NEW FORM SUBMISSION RECEIVED!");
        self.customer(f, body, "Contact Information");
        body.section("Form Data");
        for (key, value) in f.0 {
            body.item(key, value);
        }
    }
}
