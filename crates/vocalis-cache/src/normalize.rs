// SPDX-FileCopyrightText: 2026 Vocalis Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Question to topic normalisation.
//!
//! Rules are evaluated in order. Each rule lists alternatives; an
//! alternative matches when every one of its keywords occurs as a
//! substring of the lower-cased, trimmed question. The first rule with a
//! matching alternative names the topic.

/// One topic and the keyword sets that select it.
#[derive(Debug)]
pub struct TopicRule {
    pub topic: &'static str,
    pub alternatives: &'static [&'static [&'static str]],
}

impl TopicRule {
    fn matches(&self, question: &str) -> bool {
        self.alternatives
            .iter()
            .any(|keywords| keywords.iter().all(|k| question.contains(k)))
    }
}

/// Cacheable topics, highest priority first.
pub const TOPIC_RULES: &[TopicRule] = &[
    TopicRule {
        topic: "pricing",
        alternatives: &[
            &["price"],
            &["pricing"],
            &["cost"],
            &["how much"],
            &["fee"],
            &["subscription"],
        ],
    },
    TopicRule {
        topic: "industry",
        alternatives: &[
            &["industr"],
            &["restaurant"],
            &["clinic"],
            &["salon"],
            &["dental"],
            &["work with", "business"],
        ],
    },
    TopicRule {
        topic: "integrations",
        alternatives: &[
            &["integrat"],
            &["crm"],
            &["zapier"],
            &["connect", "calendar"],
        ],
    },
    TopicRule {
        topic: "setup_time",
        alternatives: &[
            &["setup"],
            &["set up"],
            &["onboard"],
            &["how long", "start"],
            &["how quickly"],
        ],
    },
    TopicRule {
        topic: "how_it_works",
        alternatives: &[&["how", "work"], &["what", "voice agent"]],
    },
    TopicRule {
        topic: "booking",
        alternatives: &[&["book"], &["demo"], &["appointment"], &["schedule"]],
    },
    TopicRule {
        topic: "services",
        alternatives: &[&["service"], &["offer"], &["what do you do"]],
    },
    TopicRule {
        topic: "contact",
        alternatives: &[
            &["contact"],
            &["email"],
            &["phone"],
            &["reach"],
            &["talk to", "human"],
        ],
    },
];

/// Map a free-form question to its cache topic, if any.
pub fn normalize_question(question: &str) -> Option<&'static str> {
    let question = question.trim().to_lowercase();
    if question.is_empty() {
        return None;
    }
    TOPIC_RULES
        .iter()
        .find(|rule| rule.matches(&question))
        .map(|rule| rule.topic)
}
