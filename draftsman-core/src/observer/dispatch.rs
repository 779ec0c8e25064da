use crate::graph::{Attr, NodeKind};
use crate::invalidate::Effect;

/// Decide what a change of `attr` on a node of `kind` calls for.
///
/// Only style content clears the render cache. Geometry never does, or every drag would
/// thrash it. Focus changes (`Current*`, `Selected`) redraw without dirtying the document.
pub(super) fn effect(kind: &NodeKind, attr: Attr) -> Effect {
    let redraw = Effect::REDRAW;
    let content = Effect::REDRAW | Effect::MARK_DIRTY;
    match kind {
        NodeKind::Project(_) if attr.is_current() => redraw,
        NodeKind::Container(_) if matches!(attr, Attr::CurrentShape | Attr::CurrentLayer) => redraw,
        NodeKind::Container(container) if container.is_template() && attr == Attr::Background => {
            content | Effect::RENOTIFY_BACKGROUND
        }
        NodeKind::StyleLibrary(_) if attr == Attr::Selected => redraw | Effect::CLEAR_CACHE,
        NodeKind::StyleLibrary(_) | NodeKind::Style(_) => content | Effect::CLEAR_CACHE,
        NodeKind::GroupLibrary(_) if attr == Attr::Selected => redraw,
        NodeKind::Project(_)
        | NodeKind::Document(_)
        | NodeKind::Container(_)
        | NodeKind::Layer(_)
        | NodeKind::Shape(_)
        | NodeKind::Point(_)
        | NodeKind::GroupLibrary(_)
        | NodeKind::Database(_)
        | NodeKind::Column(_)
        | NodeKind::Record(_)
        | NodeKind::Value(_)
        | NodeKind::Data(_)
        | NodeKind::Property(_)
        | NodeKind::ShapeState(_) => content,
    }
}

#[cfg(test)]
mod test {
    use super::effect;
    use crate::graph::{
        style, Attr, Container, ContainerKind, Library, NodeKind, Point, Project, StyleNode,
    };
    use crate::invalidate::Effect;

    #[test]
    fn focus_is_never_dirty() {
        let project = NodeKind::Project(Project::default());
        for attr in [Attr::CurrentContainer, Attr::CurrentDocument, Attr::CurrentDatabase] {
            assert!(!effect(&project, attr).contains(Effect::MARK_DIRTY));
        }
        assert!(effect(&project, Attr::Documents).contains(Effect::MARK_DIRTY));

        let page = NodeKind::Container(Container::new(ContainerKind::Page, 1.0, 1.0));
        assert_eq!(effect(&page, Attr::CurrentShape), Effect::REDRAW);
        assert_eq!(effect(&page, Attr::CurrentLayer), Effect::REDRAW);

        let styles = NodeKind::StyleLibrary(Library::default());
        let groups = NodeKind::GroupLibrary(Library::default());
        assert!(!effect(&styles, Attr::Selected).contains(Effect::MARK_DIRTY));
        assert!(!effect(&groups, Attr::Selected).contains(Effect::MARK_DIRTY));
        assert!(effect(&groups, Attr::Items).contains(Effect::MARK_DIRTY));
    }
    #[test]
    fn only_styles_clear_cache() {
        let stroke = NodeKind::Style(StyleNode::Stroke(style::Paint::default()));
        assert!(effect(&stroke, Attr::Color).contains(Effect::CLEAR_CACHE));
        let styles = NodeKind::StyleLibrary(Library::default());
        assert!(effect(&styles, Attr::Items).contains(Effect::CLEAR_CACHE));

        let point = NodeKind::Point(Point::default());
        assert_eq!(
            effect(&point, Attr::Position),
            Effect::REDRAW | Effect::MARK_DIRTY
        );
        let groups = NodeKind::GroupLibrary(Library::default());
        assert!(!effect(&groups, Attr::Items).contains(Effect::CLEAR_CACHE));
    }
    #[test]
    fn template_background_renotifies() {
        let template = NodeKind::Container(Container::new(ContainerKind::Template, 1.0, 1.0));
        let page = NodeKind::Container(Container::new(ContainerKind::Page, 1.0, 1.0));
        assert!(effect(&template, Attr::Background).contains(Effect::RENOTIFY_BACKGROUND));
        assert!(!effect(&page, Attr::Background).contains(Effect::RENOTIFY_BACKGROUND));
        assert!(!effect(&template, Attr::Layers).contains(Effect::RENOTIFY_BACKGROUND));
    }
}
