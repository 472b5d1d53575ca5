use fancy_regex::Regex;

use crate::dom::{Dom, NodeId};

/// Outcome of constraint validation for one form control, mirroring the
/// browser's `ValidityState` flags for the constraints this page uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ControlValidity {
    pub(crate) valid: bool,
    pub(crate) value_missing: bool,
    pub(crate) type_mismatch: bool,
    pub(crate) pattern_mismatch: bool,
    pub(crate) too_short: bool,
    pub(crate) too_long: bool,
    pub(crate) range_underflow: bool,
    pub(crate) range_overflow: bool,
    pub(crate) bad_input: bool,
}

impl ControlValidity {
    fn finalize(mut self) -> Self {
        self.valid = !(self.value_missing
            || self.type_mismatch
            || self.pattern_mismatch
            || self.too_short
            || self.too_long
            || self.range_underflow
            || self.range_overflow
            || self.bad_input);
        self
    }

    fn all_valid() -> Self {
        Self {
            valid: true,
            ..Self::default()
        }
    }
}

pub(crate) fn input_participates_in_constraint_validation(kind: &str) -> bool {
    !matches!(kind, "button" | "submit" | "reset" | "hidden" | "image")
}

pub(crate) fn is_form_control(dom: &Dom, node: NodeId) -> bool {
    dom.tag_name(node).is_some_and(|tag| {
        tag.eq_ignore_ascii_case("input")
            || tag.eq_ignore_ascii_case("select")
            || tag.eq_ignore_ascii_case("textarea")
            || tag.eq_ignore_ascii_case("button")
    })
}

fn is_effectively_disabled(dom: &Dom, node: NodeId) -> bool {
    if dom.disabled(node) {
        return true;
    }
    let mut cursor = dom.parent(node);
    while let Some(current) = cursor {
        if dom
            .tag_name(current)
            .is_some_and(|tag| tag.eq_ignore_ascii_case("fieldset"))
            && dom.disabled(current)
        {
            return true;
        }
        cursor = dom.parent(current);
    }
    false
}

pub(crate) fn compute_control_validity(dom: &Dom, node: NodeId) -> ControlValidity {
    let mut validity = ControlValidity::all_valid();

    if is_effectively_disabled(dom, node) {
        return validity;
    }

    let Some(tag_name) = dom.tag_name(node).map(str::to_ascii_lowercase) else {
        return validity;
    };

    match tag_name.as_str() {
        "textarea" => {
            let value = dom.value(node).unwrap_or_default();
            if dom.required(node) && !dom.readonly(node) && value.is_empty() {
                validity.value_missing = true;
            }
            apply_length_constraints(dom, node, &value, &mut validity);
            validity.finalize()
        }
        "select" => {
            let value = dom.value(node).unwrap_or_default();
            if dom.required(node) && value.is_empty() {
                validity.value_missing = true;
            }
            validity.finalize()
        }
        "input" => compute_input_validity(dom, node).finalize(),
        _ => validity,
    }
}

fn compute_input_validity(dom: &Dom, node: NodeId) -> ControlValidity {
    let mut validity = ControlValidity::all_valid();
    let input_type = dom.input_type(node);
    if !input_participates_in_constraint_validation(&input_type) {
        return validity;
    }

    let value = dom.value(node).unwrap_or_default();
    let required = dom.required(node);
    let readonly = dom.readonly(node);

    if required && !readonly {
        validity.value_missing = match input_type.as_str() {
            "checkbox" => !dom.checked(node).unwrap_or(false),
            "radio" => !is_radio_group_checked(dom, node),
            "file" => dom.files(node).is_empty(),
            _ => value.is_empty(),
        };
    }

    if !value.is_empty() {
        if input_type == "email" {
            validity.type_mismatch = !is_simple_email(&value);
        } else if input_type == "url" {
            validity.type_mismatch = !is_url_like(&value);
        }

        if matches!(
            input_type.as_str(),
            "text" | "search" | "url" | "tel" | "email" | "password"
        ) {
            apply_length_constraints(dom, node, &value, &mut validity);
            apply_pattern_constraint(dom, node, &value, &mut validity);
        }

        if input_type == "number" {
            match value.trim().parse::<f64>() {
                Ok(number) if number.is_finite() => {
                    if let Some(min) = parse_attr_f64(dom, node, "min") {
                        if number < min {
                            validity.range_underflow = true;
                        }
                    }
                    if let Some(max) = parse_attr_f64(dom, node, "max") {
                        if number > max {
                            validity.range_overflow = true;
                        }
                    }
                }
                _ => validity.bad_input = true,
            }
        }
    }

    validity
}

fn apply_length_constraints(dom: &Dom, node: NodeId, value: &str, validity: &mut ControlValidity) {
    if value.is_empty() {
        return;
    }
    let value_len = value.chars().count() as i64;
    if let Some(min_len) = parse_attr_i64(dom, node, "minlength") {
        if min_len >= 0 && value_len < min_len {
            validity.too_short = true;
        }
    }
    if let Some(max_len) = parse_attr_i64(dom, node, "maxlength") {
        if max_len >= 0 && value_len > max_len {
            validity.too_long = true;
        }
    }
}

fn apply_pattern_constraint(dom: &Dom, node: NodeId, value: &str, validity: &mut ControlValidity) {
    let Some(pattern) = dom.attr(node, "pattern") else {
        return;
    };
    if pattern.is_empty() {
        return;
    }
    // Anchored: the pattern must match the whole value, as browsers apply it.
    let wrapped = format!("^(?:{pattern})$");
    if let Ok(regex) = Regex::new(&wrapped) {
        if let Ok(false) = regex.is_match(value) {
            validity.pattern_mismatch = true;
        }
    }
}

fn is_radio_group_checked(dom: &Dom, node: NodeId) -> bool {
    let Some(name) = dom.attr(node, "name").filter(|name| !name.is_empty()) else {
        return dom.checked(node).unwrap_or(false);
    };
    let owner = dom.find_ancestor_by_tag(node, "form");

    dom.collect_elements().into_iter().any(|candidate| {
        dom.tag_name(candidate)
            .is_some_and(|tag| tag.eq_ignore_ascii_case("input"))
            && dom.input_type(candidate) == "radio"
            && dom.attr(candidate, "name").as_deref() == Some(name.as_str())
            && dom.find_ancestor_by_tag(candidate, "form") == owner
            && dom.checked(candidate).unwrap_or(false)
    })
}

fn parse_attr_i64(dom: &Dom, node: NodeId, name: &str) -> Option<i64> {
    dom.attr(node, name)?.trim().parse::<i64>().ok()
}

fn parse_attr_f64(dom: &Dom, node: NodeId, name: &str) -> Option<f64> {
    dom.attr(node, name)?.trim().parse::<f64>().ok()
}

fn is_ascii_email_local_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || "!#$%&'*+-/=?^_`{|}~.".contains(ch)
}

fn is_valid_email_domain_label(label: &str) -> bool {
    !label.is_empty()
        && !label.starts_with('-')
        && !label.ends_with('-')
        && label.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '-')
}

pub(crate) fn is_simple_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') {
        return false;
    }
    if !local.chars().all(is_ascii_email_local_char) {
        return false;
    }
    domain.split('.').all(is_valid_email_domain_label)
}

pub(crate) fn is_url_like(value: &str) -> bool {
    let Some((scheme, rest)) = value.split_once(':') else {
        return false;
    };
    let mut chars = scheme.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    first.is_ascii_alphabetic()
        && chars.all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '+' | '-' | '.'))
        && !rest.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::parse_html;

    fn validity_of(html: &str, id: &str) -> ControlValidity {
        let dom = parse_html(html).expect("fixture parses");
        let node = dom.by_id(id).expect("node by id");
        compute_control_validity(&dom, node)
    }

    #[test]
    fn required_empty_text_is_value_missing() {
        let validity = validity_of("<input id='i' required>", "i");
        assert!(validity.value_missing);
        assert!(!validity.valid);
    }

    #[test]
    fn disabled_controls_are_always_valid() {
        let validity = validity_of("<input id='i' required disabled>", "i");
        assert!(validity.valid);

        let validity = validity_of(
            "<fieldset disabled><input id='i' required></fieldset>",
            "i",
        );
        assert!(validity.valid);
    }

    #[test]
    fn email_type_mismatch_flags_malformed_addresses() {
        assert!(validity_of("<input id='i' type='email' value='not-an-email'>", "i").type_mismatch);
        assert!(validity_of("<input id='i' type='email' value='a@b.example'>", "i").valid);
    }

    #[test]
    fn url_type_requires_a_scheme() {
        assert!(validity_of("<input id='i' type='url' value='example.com'>", "i").type_mismatch);
        assert!(validity_of("<input id='i' type='url' value='https://example.com'>", "i").valid);
    }

    #[test]
    fn pattern_must_match_the_whole_value() {
        let html = r#"<input id='i' pattern='[A-Z]{3}[0-9]{4}' value='AB1234'>"#;
        assert!(validity_of(html, "i").pattern_mismatch);
        let html = r#"<input id='i' pattern='[A-Z]{3}[0-9]{4}' value='ABC1234'>"#;
        assert!(validity_of(html, "i").valid);
    }

    #[test]
    fn length_constraints_apply_to_nonempty_values_only() {
        assert!(validity_of("<input id='i' minlength='3' value='ab'>", "i").too_short);
        assert!(validity_of("<input id='i' minlength='3' value=''>", "i").valid);
        assert!(validity_of("<input id='i' maxlength='2' value='abc'>", "i").too_long);
    }

    #[test]
    fn number_range_and_bad_input() {
        assert!(validity_of("<input id='i' type='number' min='1' value='0'>", "i").range_underflow);
        assert!(validity_of("<input id='i' type='number' max='10' value='11'>", "i").range_overflow);
        assert!(validity_of("<input id='i' type='number' value='abc'>", "i").bad_input);
    }

    #[test]
    fn required_checkbox_and_radio_group() {
        assert!(validity_of("<input id='i' type='checkbox' required>", "i").value_missing);

        let html = "<form><input id='a' type='radio' name='g' required>\
                    <input id='b' type='radio' name='g' checked></form>";
        assert!(validity_of(html, "a").valid);
    }

    #[test]
    fn required_file_input_without_selection_is_missing() {
        assert!(validity_of("<input id='i' type='file' required>", "i").value_missing);
    }

    #[test]
    fn hidden_and_button_inputs_do_not_participate() {
        assert!(validity_of("<input id='i' type='hidden' required>", "i").valid);
        assert!(validity_of("<input id='i' type='submit' required>", "i").valid);
    }
}
