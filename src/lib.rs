//! Deterministic, headless runtime for a form page's client-side behaviors.
//!
//! The page under test is wired the way the production page is wired at load:
//! tooltip controllers on every trigger element, a label mirror on the
//! document file input, a signature pad with clear/save controls, a random
//! pulse cue on status badges, and constraint-validation display on forms
//! marked `needs-validation`. Tests build a [`Page`] from an HTML fixture,
//! drive it through synthetic gestures, and observe alerts, submissions,
//! classes, and timers without a browser.
//!
//! Time and randomness are virtual: the clock only moves through
//! [`Page::advance_time`] and friends, and the random source is seeded, so
//! every run is reproducible.

use std::error::Error as StdError;
use std::fmt;

mod behaviors;
mod dom;
mod events;
mod html;
mod page;
mod rng;
mod selector;
mod timers;
mod validity;
mod widgets;

pub use page::{FormSubmission, Page, PageOptions};
pub use timers::PendingTimer;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    HtmlParse(String),
    Runtime(String),
    SelectorNotFound(String),
    UnsupportedSelector(String),
    TypeMismatch {
        selector: String,
        expected: String,
        actual: String,
    },
    AssertionFailed {
        selector: String,
        expected: String,
        actual: String,
        dom_snippet: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HtmlParse(msg) => write!(f, "html parse error: {msg}"),
            Self::Runtime(msg) => write!(f, "runtime error: {msg}"),
            Self::SelectorNotFound(selector) => write!(f, "selector not found: {selector}"),
            Self::UnsupportedSelector(selector) => write!(f, "unsupported selector: {selector}"),
            Self::TypeMismatch {
                selector,
                expected,
                actual,
            } => write!(
                f,
                "type mismatch for {selector}: expected {expected}, actual {actual}"
            ),
            Self::AssertionFailed {
                selector,
                expected,
                actual,
                dom_snippet,
            } => write!(
                f,
                "assertion failed for {selector}: expected {expected}, actual {actual}, snippet {dom_snippet}"
            ),
        }
    }
}

impl StdError for Error {}
