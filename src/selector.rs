use crate::dom::{Dom, NodeId};
use crate::{Error, Result};

/// One compound simple selector: `tag`, `#id`, `.class`, `[attr]`,
/// `[attr="value"]`, in any combination. Combinators and pseudo-classes are
/// not part of the supported grammar and are reported as unsupported rather
/// than silently matching nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct CompoundSelector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<(String, Option<String>)>,
}

impl CompoundSelector {
    pub(crate) fn matches(&self, dom: &Dom, node: NodeId) -> bool {
        let Some(element) = dom.element(node) else {
            return false;
        };

        if let Some(tag) = &self.tag {
            if !element.tag_name.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if element.attrs.get("id") != Some(id) {
                return false;
            }
        }
        for class_name in &self.classes {
            if !dom.has_class(node, class_name) {
                return false;
            }
        }
        for (name, expected) in &self.attrs {
            match (element.attrs.get(name), expected) {
                (None, _) => return false,
                (Some(_), None) => {}
                (Some(actual), Some(expected)) => {
                    if actual != expected {
                        return false;
                    }
                }
            }
        }
        true
    }
}

pub(crate) fn parse_selector_list(src: &str) -> Result<Vec<CompoundSelector>> {
    let mut groups = Vec::new();
    for part in src.split(',') {
        let part = part.trim();
        if part.is_empty() {
            return Err(Error::UnsupportedSelector(src.to_string()));
        }
        groups.push(parse_compound(part, src)?);
    }
    Ok(groups)
}

fn parse_compound(part: &str, full: &str) -> Result<CompoundSelector> {
    let chars = part.chars().collect::<Vec<_>>();
    let mut selector = CompoundSelector::default();
    let mut i = 0usize;

    while i < chars.len() {
        match chars[i] {
            '#' => {
                let (name, next) = take_identifier(&chars, i + 1);
                if name.is_empty() {
                    return Err(Error::UnsupportedSelector(full.to_string()));
                }
                selector.id = Some(name);
                i = next;
            }
            '.' => {
                let (name, next) = take_identifier(&chars, i + 1);
                if name.is_empty() {
                    return Err(Error::UnsupportedSelector(full.to_string()));
                }
                selector.classes.push(name);
                i = next;
            }
            '[' => {
                let close = chars[i + 1..]
                    .iter()
                    .position(|ch| *ch == ']')
                    .map(|offset| i + 1 + offset)
                    .ok_or_else(|| Error::UnsupportedSelector(full.to_string()))?;
                let body = chars[i + 1..close].iter().collect::<String>();
                selector.attrs.push(parse_attr_test(&body, full)?);
                i = close + 1;
            }
            ch if ch.is_ascii_alphanumeric() || ch == '-' || ch == '*' => {
                if selector.tag.is_some() || ch == '*' && chars.len() > 1 {
                    return Err(Error::UnsupportedSelector(full.to_string()));
                }
                if ch == '*' {
                    i += 1;
                    continue;
                }
                let (name, next) = take_identifier(&chars, i);
                selector.tag = Some(name);
                i = next;
            }
            // Combinators and pseudo-classes land here.
            _ => return Err(Error::UnsupportedSelector(full.to_string())),
        }
    }

    Ok(selector)
}

fn parse_attr_test(body: &str, full: &str) -> Result<(String, Option<String>)> {
    let Some((name, raw_value)) = body.split_once('=') else {
        let name = body.trim();
        if name.is_empty() || !is_identifier(name) {
            return Err(Error::UnsupportedSelector(full.to_string()));
        }
        return Ok((name.to_ascii_lowercase(), None));
    };

    let name = name.trim();
    if name.is_empty() || !is_identifier(name) {
        return Err(Error::UnsupportedSelector(full.to_string()));
    }
    let raw_value = raw_value.trim();
    let value = if (raw_value.starts_with('"') && raw_value.ends_with('"') && raw_value.len() >= 2)
        || (raw_value.starts_with('\'') && raw_value.ends_with('\'') && raw_value.len() >= 2)
    {
        raw_value[1..raw_value.len() - 1].to_string()
    } else {
        raw_value.to_string()
    };
    Ok((name.to_ascii_lowercase(), Some(value)))
}

fn take_identifier(chars: &[char], from: usize) -> (String, usize) {
    let mut i = from;
    let mut out = String::new();
    while i < chars.len() {
        let ch = chars[i];
        if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
            out.push(ch);
            i += 1;
        } else {
            break;
        }
    }
    (out, i)
}

fn is_identifier(src: &str) -> bool {
    !src.is_empty()
        && src
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || ch == '-' || ch == '_')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::parse_html;

    #[test]
    fn compound_selector_matches_tag_id_class_and_attr() -> crate::Result<()> {
        let dom = parse_html(
            "<form id='f' class='needs-validation portal-form' data-bs-toggle='tooltip'></form>",
        )?;
        let matches = dom.query_selector_all("form.needs-validation[data-bs-toggle=\"tooltip\"]#f")?;
        assert_eq!(matches.len(), 1);
        Ok(())
    }

    #[test]
    fn selector_groups_return_document_order() -> crate::Result<()> {
        let dom = parse_html(
            "<span id='a' class='status-badge'></span>\
             <input id='b'>\
             <span id='c' class='status-badge'></span>",
        )?;
        let matches = dom.query_selector_all("input, .status-badge")?;
        let ids = matches
            .iter()
            .map(|node| dom.attr(*node, "id").unwrap_or_default())
            .collect::<Vec<_>>();
        assert_eq!(ids, ["a", "b", "c"]);
        Ok(())
    }

    #[test]
    fn bare_attribute_presence_matches() -> crate::Result<()> {
        let dom = parse_html("<input id='i' required><input id='j'>")?;
        let matches = dom.query_selector_all("[required]")?;
        assert_eq!(matches.len(), 1);
        Ok(())
    }

    #[test]
    fn combinators_and_pseudo_classes_are_unsupported() {
        for selector in ["div > span", "div span", "input:checked", "a + b", "a ~ b"] {
            let err = parse_selector_list(selector).expect_err("should be unsupported");
            assert!(matches!(err, Error::UnsupportedSelector(_)), "{selector}");
        }
    }

    #[test]
    fn empty_selector_is_rejected() {
        assert!(matches!(
            parse_selector_list(""),
            Err(Error::UnsupportedSelector(_))
        ));
        assert!(matches!(
            parse_selector_list("a,,b"),
            Err(Error::UnsupportedSelector(_))
        ));
    }
}
