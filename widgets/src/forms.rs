//! Lead form state and the submission pipeline.

use std::cell::RefCell;

use chrono::{DateTime, Utc};

use crate::config::FormConfig;
use crate::lead::{LeadPayload, LeadSubmitter, PageMeta};
use crate::validation::{validate_field, FieldSpec, FieldState, RuleRegistry};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Banner {
    pub kind: BannerKind,
    pub message: String,
    pub dismiss_after_ms: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    pub filled: usize,
    pub total: usize,
    pub percent: u8,
    pub hint: String,
}

impl Progress {
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.filled == self.total
    }
}

#[derive(Debug, PartialEq)]
pub enum SubmitStart {
    /// Validation failed; focus this field.
    Invalid { first_invalid: String },
    /// A submission is already in flight.
    Busy,
    Ready(LeadPayload),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    Invalid { first_invalid: String },
    Busy,
    Sent,
    Failed,
}

const SUCCESS_MESSAGE: &str = "Thank you! We will contact you shortly.";
const FAILURE_MESSAGE: &str =
    "Something went wrong while sending the form. Please try again or contact us directly.";

pub struct FormController {
    form_id: String,
    specs: Vec<FieldSpec>,
    states: Vec<FieldState>,
    honeypot: String,
    registry: RuleRegistry,
    config: FormConfig,
    loading: bool,
    banner: Option<Banner>,
}

impl FormController {
    pub fn new(form_id: impl Into<String>, specs: Vec<FieldSpec>, config: FormConfig) -> Self {
        Self::with_registry(form_id, specs, config, RuleRegistry::default())
    }

    pub fn with_registry(
        form_id: impl Into<String>,
        specs: Vec<FieldSpec>,
        config: FormConfig,
        registry: RuleRegistry,
    ) -> Self {
        let states = specs
            .iter()
            .map(|_| FieldState {
                is_valid: true,
                ..FieldState::default()
            })
            .collect();
        Self {
            form_id: form_id.into(),
            specs,
            states,
            honeypot: String::new(),
            registry,
            config,
            loading: false,
            banner: None,
        }
    }

    pub fn form_id(&self) -> &str {
        &self.form_id
    }

    pub fn fields(&self) -> impl Iterator<Item = (&FieldSpec, &FieldState)> {
        self.specs.iter().zip(self.states.iter())
    }

    pub fn field(&self, name: &str) -> Option<&FieldState> {
        self.index_of(name).map(|i| &self.states[i])
    }

    fn index_of(&self, name: &str) -> Option<usize> {
        self.specs.iter().position(|spec| spec.name == name)
    }

    /// Keystroke: store the value and drop any stale error until the next
    /// blur or submit.
    pub fn set_value(&mut self, name: &str, value: &str) {
        if name == self.config.honeypot_field {
            self.honeypot = value.to_string();
            return;
        }
        if let Some(i) = self.index_of(name) {
            let state = &mut self.states[i];
            state.value = value.to_string();
            state.is_valid = true;
            state.error = None;
        }
    }

    pub fn clear_error(&mut self, name: &str) {
        if let Some(i) = self.index_of(name) {
            self.states[i].error = None;
            self.states[i].is_valid = true;
        }
    }

    pub fn blur(&mut self, name: &str) -> Option<&FieldState> {
        let i = self.index_of(name)?;
        self.revalidate(i);
        Some(&self.states[i])
    }

    fn revalidate(&mut self, i: usize) -> bool {
        let value = std::mem::take(&mut self.states[i].value);
        self.states[i] = validate_field(&self.specs[i], &value, &self.registry);
        self.states[i].is_valid
    }

    /// Validates every required field; returns the first one that failed.
    pub fn validate_form(&mut self) -> Result<(), String> {
        let mut first_invalid = None;
        for i in 0..self.specs.len() {
            if !self.specs[i].required {
                continue;
            }
            if !self.revalidate(i) && first_invalid.is_none() {
                first_invalid = Some(self.specs[i].name.clone());
            }
        }
        match first_invalid {
            Some(name) => Err(name),
            None => Ok(()),
        }
    }

    /// Submit-button enablement. Deliberately cheaper than validation: it
    /// only asks whether every required field has something in it.
    pub fn all_required_filled(&self) -> bool {
        self.fields()
            .filter(|(spec, _)| spec.required)
            .all(|(_, state)| state.is_filled())
    }

    pub fn can_submit(&self) -> bool {
        !self.loading && self.all_required_filled()
    }

    pub fn progress(&self) -> Progress {
        let required: Vec<_> = self.fields().filter(|(spec, _)| spec.required).collect();
        let total = required.len();
        let filled = required.iter().filter(|(_, state)| state.is_filled()).count();
        let percent = if total == 0 {
            0
        } else {
            (filled * 100 / total) as u8
        };
        let hint = if total > 0 && filled == total {
            "All set! You can send your request".to_string()
        } else if filled > 0 {
            format!("{} of {} fields filled", filled, total)
        } else {
            "Fill in the form to book a lesson".to_string()
        };
        Progress {
            filled,
            total,
            percent,
            hint,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn banner(&self) -> Option<&Banner> {
        self.banner.as_ref()
    }

    pub fn dismiss_banner(&mut self) {
        self.banner = None;
    }

    pub fn begin_submit(&mut self, meta: PageMeta, now: DateTime<Utc>) -> SubmitStart {
        if self.loading {
            return SubmitStart::Busy;
        }
        if let Err(first_invalid) = self.validate_form() {
            log::debug!("Form {} blocked by field {}", self.form_id, first_invalid);
            return SubmitStart::Invalid { first_invalid };
        }
        self.loading = true;
        self.banner = None;
        SubmitStart::Ready(LeadPayload {
            fields: self
                .fields()
                .map(|(spec, state)| (spec.name.clone(), state.value.clone()))
                .collect(),
            form_id: self.form_id.clone(),
            timestamp: now,
            honeypot_field: self.config.honeypot_field.clone(),
            honeypot: self.honeypot.clone(),
            meta,
        })
    }

    /// Records the submission result. Success clears the form.
    pub fn finish_submit(&mut self, sent: bool) -> &Banner {
        self.loading = false;
        if sent {
            self.reset();
        }
        let (kind, message) = if sent {
            (BannerKind::Success, SUCCESS_MESSAGE)
        } else {
            (BannerKind::Error, FAILURE_MESSAGE)
        };
        self.banner.insert(Banner {
            kind,
            message: message.to_string(),
            dismiss_after_ms: self.config.banner_ms,
        })
    }

    pub fn reset(&mut self) {
        for state in &mut self.states {
            *state = FieldState {
                is_valid: true,
                ..FieldState::default()
            };
        }
        self.honeypot.clear();
    }

    fn clear_loading(&mut self) {
        self.loading = false;
    }
}

/// Clears the loading flag however the submission ends, including when the
/// submitting future is dropped half-way.
struct LoadingGuard<'a> {
    form: &'a RefCell<FormController>,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        if let Ok(mut form) = self.form.try_borrow_mut() {
            form.clear_loading();
        }
    }
}

/// Validate, send, and record the outcome. The form is never borrowed
/// across the network await, so the UI can keep reading it meanwhile.
pub async fn submit<S>(
    form: &RefCell<FormController>,
    submitter: &S,
    meta: PageMeta,
    now: DateTime<Utc>,
) -> SubmitOutcome
where
    S: LeadSubmitter + ?Sized,
{
    let payload = match form.borrow_mut().begin_submit(meta, now) {
        SubmitStart::Ready(payload) => payload,
        SubmitStart::Busy => return SubmitOutcome::Busy,
        SubmitStart::Invalid { first_invalid } => return SubmitOutcome::Invalid { first_invalid },
    };
    let _guard = LoadingGuard { form };

    let sent = if payload.is_spam() {
        log::warn!("Honeypot filled on form {}, dropping submission", payload.form_id);
        true
    } else {
        match submitter.submit(&payload).await {
            Ok(receipt) => {
                log::info!(
                    "Lead from form {} accepted: {}",
                    payload.form_id,
                    receipt.message.as_deref().unwrap_or("ok")
                );
                true
            }
            Err(e) => {
                log::warn!("Lead from form {} not delivered: {}", payload.form_id, e);
                false
            }
        }
    };

    form.borrow_mut().finish_submit(sent);
    if sent {
        SubmitOutcome::Sent
    } else {
        SubmitOutcome::Failed
    }
}
