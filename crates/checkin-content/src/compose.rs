// SPDX-FileCopyrightText: 2026 Checkin Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Message composition: marker substitution plus action links and disclaimer.
//!
//! Channel-specific markup (HTML mail, SMS segmenting) belongs to the transport.

use checkin_core::{ResponseValue, Template};

/// Replaced with the diagnosis insert text.
pub const INSERT_MARKER: &str = "{{diagnosis_insert}}";

/// Replaced with the encouragement line.
pub const ENCOURAGEMENT_MARKER: &str = "{{encouragement}}";

/// A one-tap response link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionLink {
    pub value: ResponseValue,
    pub label: String,
    pub url: String,
}

impl ActionLink {
    /// Link labelled with the value's standard label.
    pub fn new(value: ResponseValue, url: impl Into<String>) -> Self {
        Self {
            value,
            label: value.label().to_string(),
            url: url.into(),
        }
    }
}

/// A rendered message ready for a transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedMessage {
    pub subject: String,
    pub body: String,
}

/// Substitute both markers, then append action links and the disclaimer.
pub fn compose_message(
    template: &Template,
    insert: &str,
    encouragement: &str,
    links: &[ActionLink],
) -> ComposedMessage {
    let mut body = template
        .body
        .replace(INSERT_MARKER, insert)
        .replace(ENCOURAGEMENT_MARKER, encouragement);

    if !links.is_empty() {
        body.push_str("\n\nHow are you feeling?\n");
        for link in links {
            body.push_str(&format!("{}: {}\n", link.label, link.url));
        }
    }

    let disclaimer = template.disclaimer.trim();
    if !disclaimer.is_empty() {
        if !body.ends_with('\n') {
            body.push('\n');
        }
        body.push('\n');
        body.push_str(disclaimer);
    }

    ComposedMessage {
        subject: template.subject.clone(),
        body,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checkin_core::Channel;

    fn template(body: &str, disclaimer: &str) -> Template {
        Template {
            key: "day3.same".to_string(),
            subject: "How is your back?".to_string(),
            body: body.to_string(),
            disclaimer: disclaimer.to_string(),
            channel: Channel::Email,
        }
    }

    #[test]
    fn substitutes_both_markers() {
        let msg = compose_message(
            &template("Hi.\n{{diagnosis_insert}}\n{{encouragement}}", ""),
            "Try nerve glides.",
            "Keep going.",
            &[],
        );
        assert_eq!(msg.subject, "How is your back?");
        assert_eq!(msg.body, "Hi.\nTry nerve glides.\nKeep going.");
    }

    #[test]
    fn appends_links_in_order_then_disclaimer() {
        let links: Vec<ActionLink> = ResponseValue::ALL
            .iter()
            .map(|v| ActionLink::new(*v, format!("https://x.test/r?t={v}")))
            .collect();
        let msg = compose_message(
            &template("{{diagnosis_insert}}", "Not medical advice."),
            "Insert.",
            "unused",
            &links,
        );
        assert_eq!(
            msg.body,
            "Insert.\n\nHow are you feeling?\n\
             Feeling better: https://x.test/r?t=better\n\
             About the same: https://x.test/r?t=same\n\
             Feeling worse: https://x.test/r?t=worse\n\
             \nNot medical advice."
        );
    }

    #[test]
    fn missing_markers_leave_body_untouched() {
        let msg = compose_message(&template("Plain body", ""), "insert", "enc", &[]);
        assert_eq!(msg.body, "Plain body");
    }
}
