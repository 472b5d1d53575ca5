use crate::dom::{Dom, NodeId};
use crate::events::{EventState, ListenerStore};
use crate::html::parse_html;
use crate::rng::SeededRng;
use crate::timers::{PendingTimer, TimerQueue};
use crate::validity::is_form_control;
use crate::widgets::signature::SignaturePad;
use crate::widgets::tooltip::Tooltip;
use crate::{Error, Result};

/// Construction-time knobs. The defaults match the production page; tests
/// that need the badge pulse pinned down inject a seed, a threshold, or a
/// delay instead of relying on the ambient draw.
#[derive(Debug, Clone)]
pub struct PageOptions {
    pub random_seed: u64,
    pub pulse_threshold: f64,
    pub pulse_delay_ms: i64,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            random_seed: 0x9E37_79B9_7F4A_7C15,
            pulse_threshold: crate::behaviors::PULSE_TRIGGER_THRESHOLD,
            pulse_delay_ms: crate::behaviors::PULSE_DELAY_MS,
        }
    }
}

/// One recorded form submission: the page's only externally visible effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSubmission {
    pub form_id: Option<String>,
    pub action: String,
    pub method: String,
    pub fields: Vec<(String, String)>,
}

/// A loaded form page with its behaviors wired, driven entirely through
/// synthetic gestures and virtual time.
pub struct Page {
    pub(crate) dom: Dom,
    pub(crate) listeners: ListenerStore,
    pub(crate) timers: TimerQueue,
    pub(crate) now_ms: i64,
    pub(crate) rng: SeededRng,
    pub(crate) active_element: Option<NodeId>,
    pub(crate) tooltips: Vec<Tooltip>,
    pub(crate) signature_pad: Option<SignaturePad>,
    pub(crate) alerts: Vec<String>,
    pub(crate) submissions: Vec<FormSubmission>,
    pub(crate) pulse_threshold: f64,
    pub(crate) pulse_delay_ms: i64,
    pub(crate) trace: bool,
    pub(crate) trace_events: bool,
    pub(crate) trace_timers: bool,
    pub(crate) trace_logs: Vec<String>,
    pub(crate) trace_log_limit: usize,
    pub(crate) trace_to_stderr: bool,
}

impl Page {
    pub fn from_html(html: &str) -> Result<Self> {
        Self::from_html_with(html, PageOptions::default())
    }

    /// Parses the fixture and runs the page-load wiring pass.
    pub fn from_html_with(html: &str, options: PageOptions) -> Result<Self> {
        let dom = parse_html(html)?;
        let mut page = Self {
            dom,
            listeners: ListenerStore::default(),
            timers: TimerQueue::new(),
            now_ms: 0,
            rng: SeededRng::new(options.random_seed),
            active_element: None,
            tooltips: Vec::new(),
            signature_pad: None,
            alerts: Vec::new(),
            submissions: Vec::new(),
            pulse_threshold: options.pulse_threshold,
            pulse_delay_ms: options.pulse_delay_ms,
            trace: false,
            trace_events: true,
            trace_timers: true,
            trace_logs: Vec::new(),
            trace_log_limit: 10_000,
            trace_to_stderr: true,
        };
        page.wire_behaviors()?;
        Ok(page)
    }

    pub fn set_random_seed(&mut self, seed: u64) {
        self.rng.reseed(seed);
    }

    pub fn enable_trace(&mut self, enabled: bool) {
        self.trace = enabled;
    }

    pub fn set_trace_events(&mut self, enabled: bool) {
        self.trace_events = enabled;
    }

    pub fn set_trace_timers(&mut self, enabled: bool) {
        self.trace_timers = enabled;
    }

    pub fn set_trace_stderr(&mut self, enabled: bool) {
        self.trace_to_stderr = enabled;
    }

    pub fn set_trace_log_limit(&mut self, max_entries: usize) -> Result<()> {
        if max_entries == 0 {
            return Err(Error::Runtime(
                "set_trace_log_limit requires at least 1 entry".into(),
            ));
        }
        self.trace_log_limit = max_entries;
        while self.trace_logs.len() > self.trace_log_limit {
            self.trace_logs.remove(0);
        }
        Ok(())
    }

    pub fn take_trace_logs(&mut self) -> Vec<String> {
        std::mem::take(&mut self.trace_logs)
    }

    // ---- observable side effects ----

    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    pub fn take_alerts(&mut self) -> Vec<String> {
        std::mem::take(&mut self.alerts)
    }

    pub fn submissions(&self) -> &[FormSubmission] {
        &self.submissions
    }

    pub fn tooltip_count(&self) -> usize {
        self.tooltips.len()
    }

    /// Whether the tooltip controller attached to `selector` currently shows
    /// its bubble. Errors when the element carries no controller.
    pub fn tooltip_shown(&self, selector: &str) -> Result<bool> {
        let target = self.select_one(selector)?;
        self.tooltips
            .iter()
            .find(|tooltip| tooltip.target == target)
            .map(Tooltip::is_shown)
            .ok_or_else(|| {
                Error::Runtime(format!("no tooltip controller attached to {selector}"))
            })
    }

    pub fn signature_is_empty(&self) -> Result<bool> {
        self.signature_pad
            .as_ref()
            .map(SignaturePad::is_empty)
            .ok_or_else(|| Error::Runtime("no signature pad on this page".into()))
    }

    pub fn signature_stroke_count(&self) -> Result<usize> {
        self.signature_pad
            .as_ref()
            .map(SignaturePad::stroke_count)
            .ok_or_else(|| Error::Runtime("no signature pad on this page".into()))
    }

    // ---- gestures ----

    pub fn click(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.dom.disabled(target) {
            return Ok(());
        }

        let click_outcome = self.dispatch_event(target, "click")?;
        if click_outcome.default_prevented {
            return Ok(());
        }

        if is_checkbox_input(&self.dom, target) {
            let current = self.dom.checked(target)?;
            self.dom.set_checked(target, !current)?;
            self.dispatch_event(target, "input")?;
            self.dispatch_event(target, "change")?;
        }

        if is_radio_input(&self.dom, target) {
            let current = self.dom.checked(target)?;
            if !current {
                self.uncheck_other_radios_in_group(target)?;
                self.dom.set_checked(target, true)?;
                self.dispatch_event(target, "input")?;
                self.dispatch_event(target, "change")?;
            }
        }

        if is_submit_control(&self.dom, target) {
            if let Some(form) = self.resolve_form_for_submit(target) {
                self.user_submit_form(form)?;
            }
        }

        Ok(())
    }

    pub fn hover(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.dispatch_event(target, "mouseenter")?;
        Ok(())
    }

    pub fn unhover(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.dispatch_event(target, "mouseleave")?;
        Ok(())
    }

    pub fn focus(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.focus_node(target)
    }

    pub fn blur(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.blur_node(target)
    }

    pub fn type_text(&mut self, selector: &str, text: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.dom.disabled(target) {
            return Ok(());
        }
        if self.dom.readonly(target) {
            return Ok(());
        }

        let tag = self
            .dom
            .tag_name(target)
            .ok_or_else(|| Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input or textarea".into(),
                actual: "non-element".into(),
            })?
            .to_ascii_lowercase();

        if tag != "input" && tag != "textarea" {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input or textarea".into(),
                actual: tag,
            });
        }

        self.dom.set_value(target, text)?;
        self.dispatch_event(target, "input")?;
        Ok(())
    }

    pub fn set_checked(&mut self, selector: &str, checked: bool) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.dom.disabled(target) {
            return Ok(());
        }
        let tag = self
            .dom
            .tag_name(target)
            .unwrap_or_default()
            .to_ascii_lowercase();
        if tag != "input" {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input[type=checkbox|radio]".into(),
                actual: tag,
            });
        }

        let kind = self.dom.input_type(target);
        if kind != "checkbox" && kind != "radio" {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input[type=checkbox|radio]".into(),
                actual: format!("input[type={kind}]"),
            });
        }

        let current = self.dom.checked(target)?;
        if current != checked {
            if kind == "radio" && checked {
                self.uncheck_other_radios_in_group(target)?;
            }
            self.dom.set_checked(target, checked)?;
            self.dispatch_event(target, "input")?;
            self.dispatch_event(target, "change")?;
        }

        Ok(())
    }

    pub fn select_option(&mut self, selector: &str, value: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.dom.disabled(target) {
            return Ok(());
        }
        let tag = self
            .dom
            .tag_name(target)
            .unwrap_or_default()
            .to_ascii_lowercase();
        if tag != "select" {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "select".into(),
                actual: tag,
            });
        }

        let mut options = Vec::new();
        self.dom.collect_elements_from(target, &mut options);
        let matched = options.into_iter().any(|option| {
            self.dom
                .tag_name(option)
                .is_some_and(|tag| tag.eq_ignore_ascii_case("option"))
                && self
                    .dom
                    .attr(option, "value")
                    .unwrap_or_else(|| self.dom.text_content(option).trim().to_string())
                    == value
        });
        if !matched {
            return Err(Error::Runtime(format!(
                "{selector} has no option with value '{value}'"
            )));
        }

        if self.dom.value(target)? != value {
            self.dom.set_value(target, value)?;
            self.dispatch_event(target, "input")?;
            self.dispatch_event(target, "change")?;
        }
        Ok(())
    }

    pub fn select_file(&mut self, selector: &str, file_name: &str) -> Result<()> {
        self.select_files(selector, &[file_name])
    }

    pub fn select_files(&mut self, selector: &str, file_names: &[&str]) -> Result<()> {
        let target = self.select_one(selector)?;
        if self.dom.disabled(target) {
            return Ok(());
        }
        let tag = self
            .dom
            .tag_name(target)
            .unwrap_or_default()
            .to_ascii_lowercase();
        if tag != "input" {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input[type=file]".into(),
                actual: tag,
            });
        }
        let kind = self.dom.input_type(target);
        if kind != "file" {
            return Err(Error::TypeMismatch {
                selector: selector.to_string(),
                expected: "input[type=file]".into(),
                actual: format!("input[type={kind}]"),
            });
        }

        self.dom.set_files(
            target,
            file_names.iter().map(|name| name.to_string()).collect(),
        )?;
        self.dom
            .set_value(target, file_names.first().copied().unwrap_or_default())?;
        self.dispatch_event(target, "change")?;
        Ok(())
    }

    /// Records one pointer stroke on the signature canvas. The stroke lands
    /// in the pad first, then pointer events fire so any observers see the
    /// same ordering a pointer-driven widget produces.
    pub fn draw_stroke(&mut self, selector: &str, points: &[(f64, f64)]) -> Result<()> {
        let target = self.select_one(selector)?;
        let Some(pad) = self.signature_pad.as_mut() else {
            return Err(Error::Runtime("no signature pad on this page".into()));
        };
        if pad.canvas != target {
            return Err(Error::Runtime(format!(
                "{selector} is not the signature canvas"
            )));
        }
        if points.is_empty() {
            return Ok(());
        }
        pad.add_stroke(points);
        self.dispatch_event(target, "pointerdown")?;
        self.dispatch_event(target, "pointerup")?;
        Ok(())
    }

    pub fn dispatch(&mut self, selector: &str, event: &str) -> Result<()> {
        let target = self.select_one(selector)?;
        self.dispatch_event(target, event)?;
        Ok(())
    }

    /// User-driven submission: fires the `submit` event so listeners can
    /// intercept, then records the submission unless it was prevented.
    pub fn submit(&mut self, selector: &str) -> Result<()> {
        let target = self.select_one(selector)?;

        let form = if self
            .dom
            .tag_name(target)
            .map(|t| t.eq_ignore_ascii_case("form"))
            .unwrap_or(false)
        {
            Some(target)
        } else {
            self.resolve_form_for_submit(target)
        };

        if let Some(form) = form {
            self.user_submit_form(form)?;
        }

        Ok(())
    }

    // ---- virtual time ----

    pub fn now_ms(&self) -> i64 {
        self.now_ms
    }

    pub fn advance_time(&mut self, delta_ms: i64) -> Result<()> {
        if delta_ms < 0 {
            return Err(Error::Runtime(
                "advance_time requires non-negative milliseconds".into(),
            ));
        }
        let from = self.now_ms;
        self.now_ms = self.now_ms.saturating_add(delta_ms);
        let ran = self.run_due_timers()?;
        self.trace_timer_line(format!(
            "[timer] advance delta_ms={} from={} to={} ran_due={}",
            delta_ms, from, self.now_ms, ran
        ));
        Ok(())
    }

    pub fn advance_time_to(&mut self, target_ms: i64) -> Result<()> {
        if target_ms < self.now_ms {
            return Err(Error::Runtime(format!(
                "advance_time_to requires target >= now_ms (target={target_ms}, now_ms={})",
                self.now_ms
            )));
        }
        let from = self.now_ms;
        self.now_ms = target_ms;
        let ran = self.run_due_timers()?;
        self.trace_timer_line(format!(
            "[timer] advance_to from={} to={} ran_due={}",
            from, self.now_ms, ran
        ));
        Ok(())
    }

    /// Runs every pending timer, advancing the clock to each due time.
    pub fn flush(&mut self) -> Result<()> {
        let from = self.now_ms;
        let mut ran = 0usize;
        while let Some(task) = self.timers.pop_next() {
            if task.due_at > self.now_ms {
                self.now_ms = task.due_at;
            }
            self.execute_timer_task(task)?;
            ran += 1;
        }
        self.trace_timer_line(format!(
            "[timer] flush from={} to={} ran={}",
            from, self.now_ms, ran
        ));
        Ok(())
    }

    pub fn run_next_timer(&mut self) -> Result<bool> {
        let Some(task) = self.timers.pop_next() else {
            self.trace_timer_line("[timer] run_next none".into());
            return Ok(false);
        };
        if task.due_at > self.now_ms {
            self.now_ms = task.due_at;
        }
        self.execute_timer_task(task)?;
        Ok(true)
    }

    pub fn pending_timers(&self) -> Vec<PendingTimer> {
        self.timers.pending()
    }

    pub fn clear_timer(&mut self, timer_id: i64) -> bool {
        self.timers.clear(timer_id)
    }

    pub fn clear_all_timers(&mut self) -> usize {
        let cleared = self.timers.clear_all();
        self.trace_timer_line(format!("[timer] clear_all cleared={cleared}"));
        cleared
    }

    fn run_due_timers(&mut self) -> Result<usize> {
        let mut ran = 0usize;
        while let Some(task) = self.timers.pop_due(self.now_ms) {
            self.execute_timer_task(task)?;
            ran += 1;
        }
        Ok(ran)
    }

    // ---- reads and assertions ----

    pub fn text(&self, selector: &str) -> Result<String> {
        let node = self.select_one(selector)?;
        Ok(self.dom.text_content(node))
    }

    pub fn value(&self, selector: &str) -> Result<String> {
        let node = self.select_one(selector)?;
        self.dom.value(node)
    }

    pub fn has_class(&self, selector: &str, class_name: &str) -> Result<bool> {
        let node = self.select_one(selector)?;
        Ok(self.dom.has_class(node, class_name))
    }

    pub fn count(&self, selector: &str) -> Result<usize> {
        Ok(self.dom.query_selector_all(selector)?.len())
    }

    pub fn assert_exists(&self, selector: &str) -> Result<()> {
        self.select_one(selector).map(|_| ())
    }

    pub fn assert_text(&self, selector: &str, expected: &str) -> Result<()> {
        let node = self.select_one(selector)?;
        let actual = self.dom.text_content(node);
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.dom.snippet(node),
            });
        }
        Ok(())
    }

    pub fn assert_value(&self, selector: &str, expected: &str) -> Result<()> {
        let node = self.select_one(selector)?;
        let actual = self.dom.value(node)?;
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.dom.snippet(node),
            });
        }
        Ok(())
    }

    pub fn assert_checked(&self, selector: &str, expected: bool) -> Result<()> {
        let node = self.select_one(selector)?;
        let actual = self.dom.checked(node)?;
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual: actual.to_string(),
                dom_snippet: self.dom.snippet(node),
            });
        }
        Ok(())
    }

    pub fn assert_has_class(&self, selector: &str, class_name: &str) -> Result<()> {
        let node = self.select_one(selector)?;
        if !self.dom.has_class(node, class_name) {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: format!("class '{class_name}' present"),
                actual: self.dom.attr(node, "class").unwrap_or_default(),
                dom_snippet: self.dom.snippet(node),
            });
        }
        Ok(())
    }

    // ---- internals ----

    pub(crate) fn select_one(&self, selector: &str) -> Result<NodeId> {
        self.dom
            .query_selector(selector)?
            .ok_or_else(|| Error::SelectorNotFound(selector.to_string()))
    }

    pub(crate) fn dispatch_event(
        &mut self,
        target: NodeId,
        event_type: &str,
    ) -> Result<EventState> {
        let mut event = EventState::new(event_type, target);

        let mut path = Vec::new();
        let mut cursor = Some(target);
        while let Some(node) = cursor {
            path.push(node);
            cursor = self.dom.parent(node);
        }
        path.reverse();

        // Capture phase.
        if path.len() >= 2 {
            for node in &path[..path.len() - 1] {
                event.current_target = *node;
                self.invoke_listeners(*node, &mut event, true)?;
                if event.propagation_stopped {
                    self.trace_event_done(&event, "propagation_stopped");
                    return Ok(event);
                }
            }
        }

        // Target phase: capture listeners first, then bubble listeners.
        event.current_target = target;
        self.invoke_listeners(target, &mut event, true)?;
        if event.propagation_stopped {
            self.trace_event_done(&event, "propagation_stopped");
            return Ok(event);
        }
        self.invoke_listeners(target, &mut event, false)?;
        if event.propagation_stopped {
            self.trace_event_done(&event, "propagation_stopped");
            return Ok(event);
        }

        // Bubble phase.
        if path.len() >= 2 {
            for node in path[..path.len() - 1].iter().rev() {
                event.current_target = *node;
                self.invoke_listeners(*node, &mut event, false)?;
                if event.propagation_stopped {
                    self.trace_event_done(&event, "propagation_stopped");
                    return Ok(event);
                }
            }
        }

        self.trace_event_done(&event, "completed");
        Ok(event)
    }

    fn invoke_listeners(
        &mut self,
        node_id: NodeId,
        event: &mut EventState,
        capture: bool,
    ) -> Result<()> {
        let listeners = self.listeners.get(node_id, &event.event_type, capture);
        for listener in listeners {
            if self.trace && self.trace_events {
                let phase = if capture { "capture" } else { "bubble" };
                let target_label = self.trace_node_label(event.target);
                let current_label = self.trace_node_label(event.current_target);
                self.trace_event_line(format!(
                    "[event] {} target={} current={} phase={} default_prevented={}",
                    event.event_type, target_label, current_label, phase, event.default_prevented
                ));
            }
            self.execute_behavior(&listener.behavior, event)?;
            if event.immediate_propagation_stopped {
                break;
            }
        }
        Ok(())
    }

    fn focus_node(&mut self, node: NodeId) -> Result<()> {
        if self.dom.disabled(node) {
            return Ok(());
        }
        if self.active_element == Some(node) {
            return Ok(());
        }
        if let Some(current) = self.active_element {
            self.blur_node(current)?;
        }
        self.active_element = Some(node);
        self.dispatch_event(node, "focusin")?;
        self.dispatch_event(node, "focus")?;
        Ok(())
    }

    fn blur_node(&mut self, node: NodeId) -> Result<()> {
        if self.active_element != Some(node) {
            return Ok(());
        }
        self.dispatch_event(node, "focusout")?;
        self.dispatch_event(node, "blur")?;
        self.active_element = None;
        Ok(())
    }

    fn resolve_form_for_submit(&self, target: NodeId) -> Option<NodeId> {
        if self
            .dom
            .tag_name(target)
            .map(|t| t.eq_ignore_ascii_case("form"))
            .unwrap_or(false)
        {
            return Some(target);
        }
        self.dom.find_ancestor_by_tag(target, "form")
    }

    fn user_submit_form(&mut self, form: NodeId) -> Result<()> {
        let outcome = self.dispatch_event(form, "submit")?;
        if !outcome.default_prevented {
            self.record_submission(form)?;
        }
        Ok(())
    }

    /// Appends the submission that an ordinary form submission would send:
    /// name/value pairs of named, enabled controls, plus the form's routing.
    pub(crate) fn record_submission(&mut self, form: NodeId) -> Result<()> {
        let mut descendants = Vec::new();
        self.dom.collect_elements_from(form, &mut descendants);

        let mut fields = Vec::new();
        for node in descendants {
            if !is_form_control(&self.dom, node) {
                continue;
            }
            if self.dom.disabled(node) {
                continue;
            }
            let Some(name) = self.dom.attr(node, "name").filter(|name| !name.is_empty()) else {
                continue;
            };
            let tag = self
                .dom
                .tag_name(node)
                .unwrap_or_default()
                .to_ascii_lowercase();
            if tag == "button" {
                continue;
            }
            if tag == "input" {
                let kind = self.dom.input_type(node);
                match kind.as_str() {
                    "submit" | "button" | "reset" | "image" => continue,
                    "checkbox" | "radio" => {
                        if !self.dom.checked(node)? {
                            continue;
                        }
                        let value = self.dom.value(node)?;
                        fields.push((name, if value.is_empty() { "on".into() } else { value }));
                        continue;
                    }
                    "file" => {
                        for file in self.dom.files(node) {
                            fields.push((name.clone(), file.clone()));
                        }
                        continue;
                    }
                    _ => {}
                }
            }
            fields.push((name, self.dom.value(node)?));
        }

        let submission = FormSubmission {
            form_id: self.dom.attr(form, "id"),
            action: self.dom.attr(form, "action").unwrap_or_default(),
            method: self
                .dom
                .attr(form, "method")
                .map(|method| method.to_ascii_lowercase())
                .unwrap_or_else(|| "get".into()),
            fields,
        };
        self.trace_event_line(format!(
            "[form] submit id={} action={} method={} fields={}",
            submission.form_id.as_deref().unwrap_or("-"),
            submission.action,
            submission.method,
            submission.fields.len()
        ));
        self.submissions.push(submission);
        Ok(())
    }

    // ---- tracing ----

    pub(crate) fn trace_event_line(&mut self, line: String) {
        if self.trace && self.trace_events {
            self.push_trace_line(line);
        }
    }

    pub(crate) fn trace_timer_line(&mut self, line: String) {
        if self.trace && self.trace_timers {
            self.push_trace_line(line);
        }
    }

    fn trace_event_done(&mut self, event: &EventState, outcome: &str) {
        if !(self.trace && self.trace_events) {
            return;
        }
        let target_label = self.trace_node_label(event.target);
        let current_label = self.trace_node_label(event.current_target);
        self.trace_event_line(format!(
            "[event] done {} target={} current={} outcome={} default_prevented={} propagation_stopped={} immediate_stopped={}",
            event.event_type,
            target_label,
            current_label,
            outcome,
            event.default_prevented,
            event.propagation_stopped,
            event.immediate_propagation_stopped
        ));
    }

    fn trace_node_label(&self, node: NodeId) -> String {
        if let Some(id) = self.dom.attr(node, "id") {
            if !id.is_empty() {
                return format!("#{id}");
            }
        }
        self.dom
            .tag_name(node)
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| format!("node-{}", node.0))
    }

    fn push_trace_line(&mut self, line: String) {
        if self.trace_to_stderr {
            eprintln!("{line}");
        }
        self.trace_logs.push(line);
        while self.trace_logs.len() > self.trace_log_limit {
            self.trace_logs.remove(0);
        }
    }

    fn uncheck_other_radios_in_group(&mut self, target: NodeId) -> Result<()> {
        let Some(name) = self.dom.attr(target, "name").filter(|name| !name.is_empty()) else {
            return Ok(());
        };
        let owner = self.dom.find_ancestor_by_tag(target, "form");

        let group = self
            .dom
            .collect_elements()
            .into_iter()
            .filter(|candidate| *candidate != target)
            .filter(|candidate| is_radio_input(&self.dom, *candidate))
            .filter(|candidate| {
                self.dom.attr(*candidate, "name").as_deref() == Some(name.as_str())
            })
            .filter(|candidate| self.dom.find_ancestor_by_tag(*candidate, "form") == owner)
            .collect::<Vec<_>>();

        for candidate in group {
            self.dom.set_checked(candidate, false)?;
        }
        Ok(())
    }
}

fn is_checkbox_input(dom: &Dom, node_id: NodeId) -> bool {
    dom.tag_name(node_id)
        .is_some_and(|tag| tag.eq_ignore_ascii_case("input"))
        && dom.input_type(node_id) == "checkbox"
}

fn is_radio_input(dom: &Dom, node_id: NodeId) -> bool {
    dom.tag_name(node_id)
        .is_some_and(|tag| tag.eq_ignore_ascii_case("input"))
        && dom.input_type(node_id) == "radio"
}

fn is_submit_control(dom: &Dom, node_id: NodeId) -> bool {
    let Some(tag) = dom.tag_name(node_id) else {
        return false;
    };

    if tag.eq_ignore_ascii_case("button") {
        return dom
            .attr(node_id, "type")
            .map(|kind| kind.eq_ignore_ascii_case("submit"))
            .unwrap_or(true);
    }

    if tag.eq_ignore_ascii_case("input") {
        let kind = dom.input_type(node_id);
        return kind == "submit" || kind == "image";
    }

    false
}
