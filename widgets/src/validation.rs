//! Declarative field rules.
//!
//! A field's rules come from its type and attributes (`required`,
//! `type="email"`, `minlength`, ...) plus the structured `data-validate`
//! string. They are evaluated in a fixed order and the first failure wins.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ConfigError;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9\s\-()]{10,}$").expect("valid phone regex"));
static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\p{L}][\p{L}\s'\-]+$").expect("valid name regex"));

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    Required,
    Email,
    Phone,
    MinLength(usize),
    MaxLength(usize),
    Custom { name: String, arg: Option<String> },
}

impl Rule {
    fn rank(&self) -> u8 {
        match self {
            Rule::Required => 0,
            Rule::Email => 1,
            Rule::Phone => 2,
            Rule::MinLength(_) => 3,
            Rule::MaxLength(_) => 4,
            Rule::Custom { .. } => 5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputKind {
    #[default]
    Text,
    Email,
    Tel,
    TextArea,
    Select,
}

impl InputKind {
    pub fn from_type_attr(raw: &str) -> InputKind {
        match raw {
            "email" => InputKind::Email,
            "tel" => InputKind::Tel,
            "textarea" => InputKind::TextArea,
            "select" | "select-one" => InputKind::Select,
            _ => InputKind::Text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldSpec {
    pub name: String,
    pub label: String,
    pub kind: InputKind,
    pub required: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    pub custom: Vec<Rule>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, kind: InputKind) -> Self {
        Self {
            name: name.into(),
            kind,
            ..Self::default()
        }
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn min_length(mut self, n: usize) -> Self {
        self.min_length = Some(n);
        self
    }

    pub fn max_length(mut self, n: usize) -> Self {
        self.max_length = Some(n);
        self
    }

    /// Folds a parsed `data-validate` rule list into the spec. Built-in rule
    /// names tighten the matching attribute, the rest stay custom.
    pub fn with_rules(mut self, rules: Vec<Rule>) -> Self {
        for rule in rules {
            match rule {
                Rule::Required => self.required = true,
                Rule::Email => self.kind = InputKind::Email,
                Rule::Phone => self.kind = InputKind::Tel,
                Rule::MinLength(n) => self.min_length = Some(n),
                Rule::MaxLength(n) => self.max_length = Some(n),
                custom @ Rule::Custom { .. } => self.custom.push(custom),
            }
        }
        self
    }

    /// Folds in a `data-validate` string. A rule that does not parse is
    /// logged and skipped; the rest still apply.
    pub fn with_rule_string(self, raw: &str, registry: &RuleRegistry) -> Self {
        let mut rules = Vec::new();
        for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            match parse_rule_string(part, registry) {
                Ok(parsed) => rules.extend(parsed),
                Err(e) => log::warn!("Field {}: skipping rule {:?}: {}", self.name, part, e),
            }
        }
        self.with_rules(rules)
    }

    pub fn rules(&self) -> Vec<Rule> {
        let mut rules = Vec::new();
        if self.required {
            rules.push(Rule::Required);
        }
        match self.kind {
            InputKind::Email => rules.push(Rule::Email),
            InputKind::Tel => rules.push(Rule::Phone),
            _ => {}
        }
        if let Some(n) = self.min_length {
            rules.push(Rule::MinLength(n));
        }
        if let Some(n) = self.max_length {
            rules.push(Rule::MaxLength(n));
        }
        rules.extend(self.custom.iter().cloned());
        // stable: custom rules keep their declaration order
        rules.sort_by_key(Rule::rank);
        rules
    }
}

#[derive(Clone, Copy)]
pub struct CustomRule {
    pub check: fn(&str, Option<&str>) -> bool,
    pub message: &'static str,
}

pub struct RuleRegistry {
    rules: HashMap<String, CustomRule>,
}

impl Default for RuleRegistry {
    fn default() -> Self {
        let mut registry = Self {
            rules: HashMap::new(),
        };
        registry.register(
            "digits",
            CustomRule {
                check: |value, _| value.chars().all(|c| c.is_ascii_digit()),
                message: "Please use digits only",
            },
        );
        registry.register(
            "name",
            CustomRule {
                check: |value, _| NAME_RE.is_match(value.trim()),
                message: "Please enter your name",
            },
        );
        registry.register(
            "pattern",
            CustomRule {
                check: |value, arg| match arg.map(Regex::new) {
                    Some(Ok(re)) => re.is_match(value),
                    Some(Err(e)) => {
                        log::warn!("Ignoring invalid pattern rule: {}", e);
                        true
                    }
                    None => true,
                },
                message: "Please match the requested format",
            },
        );
        registry
    }
}

impl RuleRegistry {
    pub fn register(&mut self, name: &str, rule: CustomRule) {
        self.rules.insert(name.to_string(), rule);
    }

    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    fn get(&self, name: &str) -> Option<&CustomRule> {
        self.rules.get(name)
    }
}

/// Parses a `data-validate` value such as `"minLength:3, phone, pattern:^[0-9]+$"`.
pub fn parse_rule_string(raw: &str, registry: &RuleRegistry) -> Result<Vec<Rule>, ConfigError> {
    let mut rules = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let (name, arg) = match part.split_once(':') {
            Some((name, arg)) => (name.trim(), Some(arg.trim())),
            None => (part, None),
        };
        let length = |arg: Option<&str>| -> Result<usize, ConfigError> {
            let arg = arg.ok_or_else(|| ConfigError::MissingRuleArgument {
                rule: name.to_string(),
            })?;
            arg.parse().map_err(|_| ConfigError::InvalidValue {
                field: "data-validate",
                value: part.to_string(),
            })
        };
        let rule = match name {
            "required" => Rule::Required,
            "email" => Rule::Email,
            "phone" => Rule::Phone,
            "minLength" => Rule::MinLength(length(arg)?),
            "maxLength" => Rule::MaxLength(length(arg)?),
            other if registry.contains(other) => Rule::Custom {
                name: other.to_string(),
                arg: arg.map(str::to_string),
            },
            other => return Err(ConfigError::UnknownRule(other.to_string())),
        };
        rules.push(rule);
    }
    Ok(rules)
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldState {
    pub value: String,
    pub is_valid: bool,
    pub error: Option<String>,
}

impl FieldState {
    pub fn is_filled(&self) -> bool {
        !self.value.trim().is_empty()
    }
}

pub fn validate_field(spec: &FieldSpec, value: &str, registry: &RuleRegistry) -> FieldState {
    let error = first_failure(spec, value, registry);
    FieldState {
        value: value.to_string(),
        is_valid: error.is_none(),
        error,
    }
}

fn first_failure(spec: &FieldSpec, value: &str, registry: &RuleRegistry) -> Option<String> {
    let empty = value.trim().is_empty();
    for rule in spec.rules() {
        let failure = match &rule {
            Rule::Required => empty.then(|| "This field is required".to_string()),
            // format rules only judge what the visitor actually typed
            _ if empty => None,
            Rule::Email => (!EMAIL_RE.is_match(value))
                .then(|| "Please enter a valid email address".to_string()),
            Rule::Phone => (!PHONE_RE.is_match(value))
                .then(|| "Please enter a valid phone number".to_string()),
            Rule::MinLength(n) => (value.chars().count() < *n)
                .then(|| format!("Minimum length: {} characters", n)),
            Rule::MaxLength(n) => (value.chars().count() > *n)
                .then(|| format!("Maximum length: {} characters", n)),
            Rule::Custom { name, arg } => match registry.get(name) {
                Some(custom) => {
                    (!(custom.check)(value, arg.as_deref())).then(|| custom.message.to_string())
                }
                None => {
                    log::warn!("Field {} uses unregistered rule {}", spec.name, name);
                    None
                }
            },
        };
        if failure.is_some() {
            return failure;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn email_field() -> FieldSpec {
        FieldSpec::new("email", InputKind::Email).required()
    }

    #[test]
    fn bad_email_is_reported_then_cleared() {
        let registry = RuleRegistry::default();
        let bad = validate_field(&email_field(), "not-an-email", &registry);
        assert!(!bad.is_valid);
        assert_eq!(bad.error.as_deref(), Some("Please enter a valid email address"));

        let good = validate_field(&email_field(), "a@b.co", &registry);
        assert!(good.is_valid);
        assert_eq!(good.error, None);
    }

    #[test]
    fn required_fails_before_format() {
        let registry = RuleRegistry::default();
        let state = validate_field(&email_field(), "   ", &registry);
        assert_eq!(state.error.as_deref(), Some("This field is required"));
    }

    #[test]
    fn optional_empty_field_is_valid() {
        let registry = RuleRegistry::default();
        let spec = FieldSpec::new("phone", InputKind::Tel).min_length(12);
        assert!(validate_field(&spec, "", &registry).is_valid);
    }

    #[test]
    fn phone_shape() {
        let registry = RuleRegistry::default();
        let spec = FieldSpec::new("phone", InputKind::Tel).required();
        assert!(validate_field(&spec, "+7 (900) 123-45-67", &registry).is_valid);
        assert_eq!(
            validate_field(&spec, "12345", &registry).error.as_deref(),
            Some("Please enter a valid phone number")
        );
    }

    #[test]
    fn only_one_message_per_field_in_fixed_order() {
        let registry = RuleRegistry::default();
        let spec = FieldSpec::new("code", InputKind::Text)
            .min_length(4)
            .max_length(6)
            .with_rules(vec![Rule::Custom {
                name: "digits".into(),
                arg: None,
            }]);
        assert_eq!(
            validate_field(&spec, "ab", &registry).error.as_deref(),
            Some("Minimum length: 4 characters")
        );
        assert_eq!(
            validate_field(&spec, "abcdefg", &registry).error.as_deref(),
            Some("Maximum length: 6 characters")
        );
        assert_eq!(
            validate_field(&spec, "abcd", &registry).error.as_deref(),
            Some("Please use digits only")
        );
        assert!(validate_field(&spec, "1234", &registry).is_valid);
    }

    #[test]
    fn lengths_count_characters_not_bytes() {
        let registry = RuleRegistry::default();
        let spec = FieldSpec::new("name", InputKind::Text).max_length(4);
        assert!(validate_field(&spec, "Анна", &registry).is_valid);
    }

    #[test]
    fn rule_string_parses_builtins_and_custom() {
        let registry = RuleRegistry::default();
        let rules = parse_rule_string("required, minLength:3,pattern:^[a-z]+:[0-9]+$", &registry)
            .unwrap();
        assert_eq!(
            rules,
            vec![
                Rule::Required,
                Rule::MinLength(3),
                Rule::Custom {
                    name: "pattern".into(),
                    arg: Some("^[a-z]+:[0-9]+$".into())
                },
            ]
        );

        let spec = FieldSpec::new("slug", InputKind::Text).with_rules(rules);
        assert!(spec.required);
        assert_eq!(spec.min_length, Some(3));
        assert!(validate_field(&spec, "abc:12", &registry).is_valid);
        assert_eq!(
            validate_field(&spec, "abc", &registry).error.as_deref(),
            Some("Please match the requested format")
        );
    }

    #[test]
    fn field_rule_string_skips_only_the_broken_rule() {
        let registry = RuleRegistry::default();
        let spec = FieldSpec::new("name", InputKind::Text)
            .with_rule_string("required, minLength:2, wobble, maxLength:x, name", &registry);
        assert!(spec.required);
        assert_eq!(spec.min_length, Some(2));
        assert_eq!(spec.max_length, None);
        assert_eq!(
            spec.custom,
            vec![Rule::Custom {
                name: "name".into(),
                arg: None
            }]
        );
        let state = validate_field(&spec, "A", &registry);
        assert_eq!(state.error.as_deref(), Some("Minimum length: 2 characters"));
        let state = validate_field(&spec, "4nna", &registry);
        assert_eq!(state.error.as_deref(), Some("Please enter your name"));
    }

    #[test]
    fn rule_string_errors() {
        let registry = RuleRegistry::default();
        assert_eq!(
            parse_rule_string("zipcode", &registry),
            Err(ConfigError::UnknownRule("zipcode".into()))
        );
        assert_eq!(
            parse_rule_string("minLength", &registry),
            Err(ConfigError::MissingRuleArgument {
                rule: "minLength".into()
            })
        );
        assert!(matches!(
            parse_rule_string("maxLength:lots", &registry),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert_eq!(parse_rule_string(" , ", &registry), Ok(vec![]));
    }

    #[test]
    fn name_rule_accepts_cyrillic() {
        let registry = RuleRegistry::default();
        let spec = FieldSpec::new("name", InputKind::Text).with_rules(vec![Rule::Custom {
            name: "name".into(),
            arg: None,
        }]);
        assert!(validate_field(&spec, "Мария Иванова", &registry).is_valid);
        assert!(!validate_field(&spec, "42", &registry).is_valid);
    }
}
