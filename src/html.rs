use std::collections::HashMap;

use crate::dom::{Dom, NodeId};
use crate::{Error, Result};

/// Parses a markup-only test fixture into a document tree.
///
/// Fixtures carry no scripts: page behavior is native to this crate, so
/// `<script>` handling, raw-text elements, and the tag-soup recovery a real
/// browser needs have no counterpart here. Mis-nested end tags still close to
/// the nearest matching open tag so small fixture mistakes stay harmless.
pub(crate) fn parse_html(html: &str) -> Result<Dom> {
    let mut dom = Dom::new();
    let mut stack = vec![dom.root];
    let bytes = html.as_bytes();
    let mut i = 0usize;

    while i < bytes.len() {
        if starts_with_at(bytes, i, b"<!--") {
            if let Some(end) = find_subslice(bytes, i + 4, b"-->") {
                i = end + 3;
            } else {
                return Err(Error::HtmlParse("unclosed HTML comment".into()));
            }
            continue;
        }

        if bytes[i] == b'<' {
            if starts_with_at(bytes, i, b"</") {
                let (tag, next) = parse_end_tag(html, i)?;
                i = next;

                if !stack.iter().skip(1).any(|node| {
                    dom.tag_name(*node)
                        .is_some_and(|open_tag| open_tag.eq_ignore_ascii_case(&tag))
                }) {
                    // Stray end tag with no matching open tag; ignore it.
                    continue;
                }
                while stack.len() > 1 {
                    let top = *stack
                        .last()
                        .ok_or_else(|| Error::HtmlParse("invalid stack state".into()))?;
                    let top_tag = dom.tag_name(top).unwrap_or("");
                    let matched = top_tag.eq_ignore_ascii_case(&tag);
                    stack.pop();
                    if matched {
                        break;
                    }
                }
                continue;
            }

            if starts_with_at(bytes, i, b"<!") {
                i = skip_declaration_tag(html, i)?;
                continue;
            }

            let (tag, attrs, self_closing, next) = parse_start_tag(html, i)?;
            i = next;

            let parent = *stack
                .last()
                .ok_or_else(|| Error::HtmlParse("missing parent element".into()))?;
            let node = dom.create_element(parent, tag.clone(), attrs);

            if !self_closing && !is_void_tag(&tag) {
                stack.push(node);
            }
            continue;
        }

        let text_start = i;
        while i < bytes.len() && bytes[i] != b'<' {
            i += 1;
        }

        if let Some(text) = html.get(text_start..i) {
            if !text.is_empty() {
                let parent = *stack
                    .last()
                    .ok_or_else(|| Error::HtmlParse("missing parent element".into()))?;
                let decoded = decode_character_references(text);
                if !decoded.is_empty() {
                    dom.create_text(parent, decoded);
                }
            }
        }
    }

    initialize_form_control_values(&mut dom);
    Ok(dom)
}

fn initialize_form_control_values(dom: &mut Dom) {
    for node in dom.collect_elements() {
        let Some(tag) = dom.tag_name(node).map(str::to_ascii_lowercase) else {
            continue;
        };
        match tag.as_str() {
            "textarea" => {
                let text = dom.text_content(node);
                let _ = dom.set_value(node, &text);
            }
            "select" => {
                let value = select_initial_value(dom, node);
                let _ = dom.set_value(node, &value);
            }
            _ => {}
        }
    }
}

// Selected option wins; otherwise the first option, as a browser would pick.
fn select_initial_value(dom: &Dom, select: NodeId) -> String {
    let mut options = Vec::new();
    collect_options(dom, select, &mut options);
    let chosen = options
        .iter()
        .copied()
        .find(|option| dom.has_attr(*option, "selected"))
        .or_else(|| options.first().copied());
    let Some(option) = chosen else {
        return String::new();
    };
    dom.attr(option, "value")
        .unwrap_or_else(|| dom.text_content(option).trim().to_string())
}

fn collect_options(dom: &Dom, node: NodeId, out: &mut Vec<NodeId>) {
    for child in dom.children(node) {
        if dom
            .tag_name(*child)
            .is_some_and(|tag| tag.eq_ignore_ascii_case("option"))
        {
            out.push(*child);
        }
        collect_options(dom, *child, out);
    }
}

fn parse_start_tag(html: &str, start: usize) -> Result<(String, HashMap<String, String>, bool, usize)> {
    let bytes = html.as_bytes();
    let mut i = start + 1;

    let name_start = i;
    while i < bytes.len() && is_tag_name_byte(bytes[i]) {
        i += 1;
    }
    if i == name_start {
        return Err(Error::HtmlParse(format!(
            "malformed start tag at byte {start}"
        )));
    }
    let tag = html[name_start..i].to_string();

    let mut attrs = HashMap::new();
    loop {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() {
            return Err(Error::HtmlParse(format!("unclosed <{tag}> tag")));
        }
        if bytes[i] == b'>' {
            return Ok((tag, attrs, false, i + 1));
        }
        if starts_with_at(bytes, i, b"/>") {
            return Ok((tag, attrs, true, i + 2));
        }

        let attr_start = i;
        while i < bytes.len() && !bytes[i].is_ascii_whitespace() && !matches!(bytes[i], b'=' | b'>' | b'/')
        {
            i += 1;
        }
        if i == attr_start {
            return Err(Error::HtmlParse(format!(
                "malformed attribute in <{tag}> at byte {i}"
            )));
        }
        let name = html[attr_start..i].to_ascii_lowercase();

        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i < bytes.len() && bytes[i] == b'=' {
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            if i >= bytes.len() {
                return Err(Error::HtmlParse(format!("unclosed <{tag}> tag")));
            }
            let value = if bytes[i] == b'"' || bytes[i] == b'\'' {
                let quote = bytes[i];
                i += 1;
                let value_start = i;
                while i < bytes.len() && bytes[i] != quote {
                    i += 1;
                }
                if i >= bytes.len() {
                    return Err(Error::HtmlParse(format!(
                        "unterminated attribute value in <{tag}>"
                    )));
                }
                let raw = &html[value_start..i];
                i += 1;
                decode_character_references(raw)
            } else {
                let value_start = i;
                while i < bytes.len() && !bytes[i].is_ascii_whitespace() && !matches!(bytes[i], b'>' | b'/')
                {
                    i += 1;
                }
                decode_character_references(&html[value_start..i])
            };
            attrs.insert(name, value);
        } else {
            attrs.insert(name, String::new());
        }
    }
}

fn parse_end_tag(html: &str, start: usize) -> Result<(String, usize)> {
    let bytes = html.as_bytes();
    let mut i = start + 2;
    let name_start = i;
    while i < bytes.len() && is_tag_name_byte(bytes[i]) {
        i += 1;
    }
    if i == name_start {
        return Err(Error::HtmlParse(format!("malformed end tag at byte {start}")));
    }
    let tag = html[name_start..i].to_string();
    while i < bytes.len() && bytes[i] != b'>' {
        i += 1;
    }
    if i >= bytes.len() {
        return Err(Error::HtmlParse(format!("unclosed </{tag}> tag")));
    }
    Ok((tag, i + 1))
}

fn skip_declaration_tag(html: &str, start: usize) -> Result<usize> {
    let bytes = html.as_bytes();
    let mut i = start + 2;
    while i < bytes.len() && bytes[i] != b'>' {
        i += 1;
    }
    if i >= bytes.len() {
        return Err(Error::HtmlParse("unclosed markup declaration".into()));
    }
    Ok(i + 1)
}

fn decode_character_references(src: &str) -> String {
    if !src.contains('&') {
        return src.to_string();
    }

    fn decode_numeric(value: &str) -> Option<char> {
        let codepoint =
            if let Some(hex) = value.strip_prefix('x').or_else(|| value.strip_prefix('X')) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                value.parse::<u32>().ok()?
            };
        char::from_u32(codepoint)
    }

    fn decode_named(value: &str) -> Option<char> {
        match value {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            "nbsp" => Some('\u{00A0}'),
            _ => None,
        }
    }

    let chars = src.chars().collect::<Vec<_>>();
    let mut out = String::with_capacity(src.len());
    let mut i = 0usize;
    while i < chars.len() {
        if chars[i] != '&' {
            out.push(chars[i]);
            i += 1;
            continue;
        }

        let Some(end) = chars[i + 1..]
            .iter()
            .take(16)
            .position(|ch| *ch == ';')
            .map(|offset| i + 1 + offset)
        else {
            out.push('&');
            i += 1;
            continue;
        };

        let raw = chars[i + 1..end].iter().collect::<String>();
        let decoded = if let Some(rest) = raw.strip_prefix('#') {
            decode_numeric(rest)
        } else {
            decode_named(&raw)
        };

        if let Some(value) = decoded {
            out.push(value);
            i = end + 1;
        } else {
            out.push('&');
            i += 1;
        }
    }
    out
}

fn is_tag_name_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-'
}

fn is_void_tag(tag: &str) -> bool {
    matches!(
        tag.to_ascii_lowercase().as_str(),
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "source"
            | "track"
            | "wbr"
    )
}

fn starts_with_at(bytes: &[u8], at: usize, needle: &[u8]) -> bool {
    bytes.len() >= at + needle.len() && &bytes[at..at + needle.len()] == needle
}

fn find_subslice(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if needle.is_empty() || bytes.len() < needle.len() {
        return None;
    }
    (from..=bytes.len() - needle.len()).find(|i| &bytes[*i..*i + needle.len()] == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_attributes_in_all_quoting_forms() -> crate::Result<()> {
        let dom = parse_html(r#"<input id="a" type='checkbox' data-kind=badge required>"#)?;
        let node = dom.by_id("a").expect("node");
        assert_eq!(dom.attr(node, "type").as_deref(), Some("checkbox"));
        assert_eq!(dom.attr(node, "data-kind").as_deref(), Some("badge"));
        assert!(dom.required(node));
        Ok(())
    }

    #[test]
    fn void_and_self_closing_tags_do_not_swallow_siblings() -> crate::Result<()> {
        let dom = parse_html("<input id='file'><span id='label'>x</span><br/><div id='d'></div>")?;
        let input = dom.by_id("file").expect("input");
        let sibling = dom.next_element_sibling(input).expect("sibling");
        assert_eq!(dom.attr(sibling, "id").as_deref(), Some("label"));
        assert!(dom.by_id("d").is_some());
        Ok(())
    }

    #[test]
    fn comments_and_declarations_are_skipped() -> crate::Result<()> {
        let dom = parse_html("<!doctype html><!-- note --><p id='p'>ok</p>")?;
        let p = dom.by_id("p").expect("p");
        assert_eq!(dom.text_content(p), "ok");
        Ok(())
    }

    #[test]
    fn unclosed_comment_is_a_parse_error() {
        let err = parse_html("<!-- dangling").expect_err("should fail");
        assert!(matches!(err, Error::HtmlParse(_)));
    }

    #[test]
    fn character_references_decode_in_text_and_attributes() -> crate::Result<()> {
        let dom = parse_html("<p id='p' title='a &amp; b'>1 &lt; 2 &#x41;</p>")?;
        let p = dom.by_id("p").expect("p");
        assert_eq!(dom.attr(p, "title").as_deref(), Some("a & b"));
        assert_eq!(dom.text_content(p), "1 < 2 A");
        Ok(())
    }

    #[test]
    fn stray_end_tag_is_ignored() -> crate::Result<()> {
        let dom = parse_html("<div id='outer'></span><span id='inner'></span></div>")?;
        let outer = dom.by_id("outer").expect("outer");
        let inner = dom.by_id("inner").expect("inner");
        assert_eq!(dom.parent(inner), Some(outer));
        Ok(())
    }

    #[test]
    fn textarea_and_select_values_initialize_from_markup() -> crate::Result<()> {
        let dom = parse_html(
            "<textarea id='t'>draft</textarea>\
             <select id='s'><option value='a'>A</option><option value='b' selected>B</option></select>",
        )?;
        let textarea = dom.by_id("t").expect("textarea");
        let select = dom.by_id("s").expect("select");
        assert_eq!(dom.value(textarea)?, "draft");
        assert_eq!(dom.value(select)?, "b");
        Ok(())
    }
}
