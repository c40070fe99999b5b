//! Copy rendered by the interactive components.

use kingspeech_widgets::validation::{FieldSpec, InputKind, RuleRegistry};

#[derive(Clone, PartialEq)]
pub struct Testimonial {
    pub name: &'static str,
    pub role: &'static str,
    pub short: &'static str,
    pub full: Option<&'static str>,
}

impl Testimonial {
    pub fn full_text(&self) -> &'static str {
        self.full.unwrap_or(self.short)
    }
}

pub const TESTIMONIALS: &[Testimonial] = &[
    Testimonial {
        name: "Anna K.",
        role: "Product manager",
        short: "I finally stopped freezing on calls with the US team.",
        full: Some(
            "I finally stopped freezing on calls with the US team. After three months of \
             speaking practice I run our weekly sync in English and nobody asks me to repeat \
             myself anymore.",
        ),
    },
    Testimonial {
        name: "Dmitry S.",
        role: "Backend developer",
        short: "Passed my interview at a Berlin company on the first try.",
        full: Some(
            "Passed my interview at a Berlin company on the first try. We rehearsed the \
             system design round in English until it felt boring, and then the real one felt \
             boring too.",
        ),
    },
    Testimonial {
        name: "Maria L.",
        role: "Student",
        short: "Lessons are the one thing in my week I never cancel.",
        full: None,
    },
    Testimonial {
        name: "Igor P.",
        role: "Sales lead",
        short: "My clients noticed the difference before I did.",
        full: Some(
            "My clients noticed the difference before I did. Small talk used to be the \
             hardest part of a meeting; now it is where I close half of my deals.",
        ),
    },
];

pub struct FaqEntry {
    pub question: &'static str,
    pub answer: &'static str,
}

pub const FAQ: &[FaqEntry] = &[
    FaqEntry {
        question: "How does the free trial lesson work?",
        answer: "We meet online for 30 minutes, check your level and agree on goals. \
                 No payment details needed.",
    },
    FaqEntry {
        question: "What if I am a complete beginner?",
        answer: "Most of our students start there. The program adapts to your level from the \
                 first lesson.",
    },
    FaqEntry {
        question: "Can I reschedule a lesson?",
        answer: "Yes, any lesson can be moved free of charge up to 12 hours before it starts.",
    },
    FaqEntry {
        question: "Do you prepare for IELTS and job interviews?",
        answer: "Yes. Both have dedicated tracks with mock tests and interview rehearsals.",
    },
];

pub const NAV_LINKS: &[(&str, &str)] = &[
    ("#about", "About"),
    ("#program", "Program"),
    ("#testimonials", "Reviews"),
    ("#faq", "FAQ"),
    ("#contact", "Contact"),
];

pub const LEVELS: &[&str] = &["Beginner", "Elementary", "Intermediate", "Upper-Intermediate", "Advanced"];

pub const TRIAL_FORM_ID: &str = "trial-lesson";

/// `(name, type, label, data-validate)` for the trial-lesson form.
const TRIAL_FIELDS: &[(&str, &str, &str, &str)] = &[
    ("name", "text", "Your name", "required, minLength:2, name"),
    ("phone", "tel", "Phone", "required, phone"),
    ("email", "email", "Email", "email"),
    ("level", "select", "Your level", ""),
    ("comment", "textarea", "What do you want to improve?", "maxLength:500"),
];

pub fn trial_form_fields() -> Vec<FieldSpec> {
    let registry = RuleRegistry::default();
    TRIAL_FIELDS
        .iter()
        .map(|(name, kind, label, rules)| {
            FieldSpec::new(*name, InputKind::from_type_attr(kind))
                .label(*label)
                .with_rule_string(rules, &registry)
        })
        .collect()
}
