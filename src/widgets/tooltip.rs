use crate::dom::{Dom, NodeId};

/// Tooltip controller, one per trigger element. Showing appends a floating
/// bubble to the body; hiding removes it. Show/hide are idempotent so
/// repeated hover events cannot stack bubbles.
#[derive(Debug, Clone)]
pub(crate) struct Tooltip {
    pub(crate) target: NodeId,
    pub(crate) title: String,
    bubble: Option<NodeId>,
}

impl Tooltip {
    pub(crate) fn new(dom: &Dom, target: NodeId) -> Self {
        let title = dom
            .attr(target, "data-bs-title")
            .or_else(|| dom.attr(target, "title"))
            .unwrap_or_default();
        Self {
            target,
            title,
            bubble: None,
        }
    }

    pub(crate) fn show(&mut self, dom: &mut Dom) {
        if self.bubble.is_some() {
            return;
        }
        let host = dom.body_or_root();
        let bubble = dom.append_element(host, "div", &[("class", "tooltip"), ("role", "tooltip")]);
        if !self.title.is_empty() {
            dom.create_text(bubble, self.title.clone());
        }
        self.bubble = Some(bubble);
    }

    pub(crate) fn hide(&mut self, dom: &mut Dom) {
        if let Some(bubble) = self.bubble.take() {
            dom.detach(bubble);
        }
    }

    pub(crate) fn is_shown(&self) -> bool {
        self.bubble.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::html::parse_html;

    #[test]
    fn title_prefers_the_widget_specific_attribute() -> crate::Result<()> {
        let dom = parse_html(
            "<a id='t' data-bs-toggle='tooltip' data-bs-title='From data' title='From title'></a>",
        )?;
        let target = dom.by_id("t").expect("trigger");
        let tooltip = Tooltip::new(&dom, target);
        assert_eq!(tooltip.title, "From data");
        Ok(())
    }

    #[test]
    fn show_is_idempotent_and_hide_removes_the_bubble() -> crate::Result<()> {
        let mut dom = parse_html("<a id='t' title='Hint'></a>")?;
        let target = dom.by_id("t").expect("trigger");
        let mut tooltip = Tooltip::new(&dom, target);

        tooltip.show(&mut dom);
        tooltip.show(&mut dom);
        assert_eq!(dom.query_selector_all(".tooltip")?.len(), 1);

        tooltip.hide(&mut dom);
        tooltip.hide(&mut dom);
        assert!(dom.query_selector_all(".tooltip")?.is_empty());
        assert!(!tooltip.is_shown());
        Ok(())
    }
}
