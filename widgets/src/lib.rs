//! Interactive behaviour of the KingSpeech landing page, kept free of any DOM
//! types so every controller can be driven and tested natively. The Yew
//! frontend owns listeners, observers and timers and feeds them in here.

pub mod animation;
pub mod carousel;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod faq;
pub mod forms;
pub mod lead;
pub mod modal;
pub mod navigation;
pub mod scroll_effects;
pub mod theme;
pub mod timing;
pub mod validation;

pub use config::PageConfig;
pub use context::{PageContext, ScrollLockGuard};
pub use error::{ConfigError, StorageError, SubmitError};
