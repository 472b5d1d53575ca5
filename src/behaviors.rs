use crate::dom::NodeId;
use crate::events::{EventState, Listener};
use crate::page::Page;
use crate::timers::ScheduledTask;
use crate::validity::{compute_control_validity, is_form_control};
use crate::widgets::signature::{SignaturePad, SignaturePadOptions};
use crate::widgets::tooltip::Tooltip;
use crate::{Error, Result};

// Page markers. The surrounding templates render these ids and classes; the
// wiring pass looks them up and silently skips whatever a given page omits.
pub(crate) const TOOLTIP_TRIGGER_SELECTOR: &str = "[data-bs-toggle=\"tooltip\"]";
pub(crate) const DOCUMENT_FILE_INPUT_ID: &str = "id_document";
pub(crate) const SIGNATURE_CANVAS_ID: &str = "signature-pad";
pub(crate) const CLEAR_SIGNATURE_ID: &str = "clear-signature";
pub(crate) const SAVE_SIGNATURE_ID: &str = "save-signature";
pub(crate) const SIGNATURE_FIELD_ID: &str = "id_signature_image";
pub(crate) const SIGNATURE_FORM_ID: &str = "signature-form";
pub(crate) const STATUS_BADGE_SELECTOR: &str = ".status-badge";
pub(crate) const VALIDATED_FORM_SELECTOR: &str = ".needs-validation";

pub(crate) const PULSE_CLASS: &str = "pulse";
pub(crate) const WAS_VALIDATED_CLASS: &str = "was-validated";
pub(crate) const EMPTY_SIGNATURE_WARNING: &str = "Please provide a signature first.";

/// Cutoff for the cosmetic badge pulse: one uniform draw per badge at page
/// load, and draws above the cutoff schedule the pulse. Kept at the literal
/// value the production page ships with.
pub(crate) const PULSE_TRIGGER_THRESHOLD: f64 = 0.7;
pub(crate) const PULSE_DELAY_MS: i64 = 1000;

/// A wired page behavior. Listeners and timers store these as data; the page
/// interprets them when an event or a due timer reaches them.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Behavior {
    ShowTooltip { index: usize },
    HideTooltip { index: usize },
    MirrorFileName,
    ClearSignature,
    SaveSignature,
    UnpulseBadge,
    AddPulse { badge: NodeId },
    ValidateOnSubmit,
}

impl Page {
    /// The page-load pass: attaches all five behaviors. Each is independent,
    /// touches a disjoint part of the tree, and skips silently when its
    /// elements are absent.
    pub(crate) fn wire_behaviors(&mut self) -> Result<()> {
        self.wire_tooltips()?;
        self.wire_file_label();
        self.wire_signature();
        self.wire_badge_pulse()?;
        self.wire_validation()?;
        Ok(())
    }

    fn wire_tooltips(&mut self) -> Result<()> {
        for target in self.dom.query_selector_all(TOOLTIP_TRIGGER_SELECTOR)? {
            let index = self.tooltips.len();
            self.tooltips.push(Tooltip::new(&self.dom, target));
            for event in ["mouseenter", "focusin"] {
                self.listeners.add(
                    target,
                    event,
                    Listener {
                        capture: false,
                        behavior: Behavior::ShowTooltip { index },
                    },
                );
            }
            for event in ["mouseleave", "focusout"] {
                self.listeners.add(
                    target,
                    event,
                    Listener {
                        capture: false,
                        behavior: Behavior::HideTooltip { index },
                    },
                );
            }
        }
        Ok(())
    }

    fn wire_file_label(&mut self) {
        if let Some(input) = self.dom.by_id(DOCUMENT_FILE_INPUT_ID) {
            self.listeners.add(
                input,
                "change",
                Listener {
                    capture: false,
                    behavior: Behavior::MirrorFileName,
                },
            );
        }
    }

    fn wire_signature(&mut self) {
        let Some(canvas) = self.dom.by_id(SIGNATURE_CANVAS_ID) else {
            return;
        };
        self.signature_pad = Some(SignaturePad::new(
            &self.dom,
            canvas,
            SignaturePadOptions::default(),
        ));
        if let Some(button) = self.dom.by_id(CLEAR_SIGNATURE_ID) {
            self.listeners.add(
                button,
                "click",
                Listener {
                    capture: false,
                    behavior: Behavior::ClearSignature,
                },
            );
        }
        if let Some(button) = self.dom.by_id(SAVE_SIGNATURE_ID) {
            self.listeners.add(
                button,
                "click",
                Listener {
                    capture: false,
                    behavior: Behavior::SaveSignature,
                },
            );
        }
    }

    fn wire_badge_pulse(&mut self) -> Result<()> {
        for badge in self.dom.query_selector_all(STATUS_BADGE_SELECTOR)? {
            self.listeners.add(
                badge,
                "animationend",
                Listener {
                    capture: false,
                    behavior: Behavior::UnpulseBadge,
                },
            );
            if self.rng.next_f64() > self.pulse_threshold {
                let delay_ms = self.pulse_delay_ms;
                let id = self
                    .timers
                    .schedule(self.now_ms, delay_ms, Behavior::AddPulse { badge });
                self.trace_timer_line(format!(
                    "[timer] schedule timeout id={} due_at={} delay_ms={}",
                    id,
                    self.now_ms + delay_ms.max(0),
                    delay_ms
                ));
            }
        }
        Ok(())
    }

    fn wire_validation(&mut self) -> Result<()> {
        for form in self.dom.query_selector_all(VALIDATED_FORM_SELECTOR)? {
            self.listeners.add(
                form,
                "submit",
                Listener {
                    capture: false,
                    behavior: Behavior::ValidateOnSubmit,
                },
            );
        }
        Ok(())
    }

    pub(crate) fn execute_behavior(
        &mut self,
        behavior: &Behavior,
        event: &mut EventState,
    ) -> Result<()> {
        match behavior {
            Behavior::ShowTooltip { index } => {
                let Self { tooltips, dom, .. } = self;
                if let Some(tooltip) = tooltips.get_mut(*index) {
                    tooltip.show(dom);
                }
                Ok(())
            }
            Behavior::HideTooltip { index } => {
                let Self { tooltips, dom, .. } = self;
                if let Some(tooltip) = tooltips.get_mut(*index) {
                    tooltip.hide(dom);
                }
                Ok(())
            }
            Behavior::MirrorFileName => {
                let input = event.current_target;
                let Some(file_name) = self.dom.files(input).first().cloned() else {
                    return Ok(());
                };
                let Some(label) = self.dom.next_element_sibling(input) else {
                    return Ok(());
                };
                self.dom.set_text_content(label, &file_name)
            }
            Behavior::ClearSignature => {
                if let Some(pad) = self.signature_pad.as_mut() {
                    pad.clear();
                }
                Ok(())
            }
            Behavior::SaveSignature => self.save_signature(),
            Behavior::UnpulseBadge => self.dom.remove_class(event.current_target, PULSE_CLASS),
            Behavior::AddPulse { badge } => self.dom.add_class(*badge, PULSE_CLASS),
            Behavior::ValidateOnSubmit => {
                let form = event.current_target;
                let valid = self.check_form_validity(form)?;
                if !valid {
                    event.prevent_default();
                    event.stop_propagation();
                }
                self.dom.add_class(form, WAS_VALIDATED_CLASS)
            }
        }
    }

    fn save_signature(&mut self) -> Result<()> {
        let Some(pad) = self.signature_pad.as_ref() else {
            return Ok(());
        };
        if pad.is_empty() {
            self.alerts.push(EMPTY_SIGNATURE_WARNING.to_string());
            return Ok(());
        }
        let data_url = pad.to_data_url();
        if let Some(field) = self.dom.by_id(SIGNATURE_FIELD_ID) {
            self.dom.set_value(field, &data_url)?;
        }
        if let Some(form) = self.dom.by_id(SIGNATURE_FORM_ID) {
            // form.submit() semantics: no submit event, so submit listeners
            // (including validation display) cannot intercept this path.
            self.record_submission(form)?;
        }
        Ok(())
    }

    pub(crate) fn check_form_validity(&mut self, form: NodeId) -> Result<bool> {
        let mut descendants = Vec::new();
        self.dom.collect_elements_from(form, &mut descendants);

        let invalid = descendants
            .into_iter()
            .filter(|node| is_form_control(&self.dom, *node))
            .filter(|node| !compute_control_validity(&self.dom, *node).valid)
            .collect::<Vec<_>>();

        for node in &invalid {
            self.dispatch_event(*node, "invalid")?;
        }
        Ok(invalid.is_empty())
    }

    pub(crate) fn execute_timer_task(&mut self, task: ScheduledTask) -> Result<()> {
        self.trace_timer_line(format!("[timer] run id={} due_at={}", task.id, task.due_at));
        match task.behavior {
            Behavior::AddPulse { badge } => self.dom.add_class(badge, PULSE_CLASS),
            other => Err(Error::Runtime(format!(
                "behavior cannot run from a timer: {other:?}"
            ))),
        }
    }
}
