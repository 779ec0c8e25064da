/// Names an attribute of a graph node. Carried by every [`Change`](super::Change) instead of a string,
/// so dispatch never has to compare property names.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, strum::Display, strum::IntoStaticStr, strum::EnumIter)]
pub enum Attr {
    Name,

    // Project
    Documents,
    Templates,
    StyleLibraries,
    GroupLibraries,
    Databases,
    CurrentDocument,
    CurrentContainer,
    CurrentTemplate,
    CurrentStyleLibrary,
    CurrentGroupLibrary,
    CurrentDatabase,

    // Document
    Pages,
    IsExpanded,

    // Container
    Layers,
    Template,
    Background,
    Size,
    CurrentLayer,
    CurrentShape,

    // Layer
    Shapes,
    IsVisible,

    // Shape
    Style,
    Data,
    State,
    Location,
    Start,
    End,
    TopLeft,
    BottomRight,
    Point1,
    Point2,
    Point3,
    Point4,
    Connectors,
    Text,

    // Point
    Position,

    // Style family
    Stroke,
    Fill,
    LineStyle,
    StartArrow,
    EndArrow,
    TextStyle,
    FixedLength,
    FontStyle,
    Thickness,
    Color,
    Curvature,
    FontSize,
    FontFlags,

    // Libraries
    Items,
    Selected,

    // Databases
    Columns,
    Records,
    Values,
    Content,

    // Data
    Properties,
    Record,
    Value,

    // ShapeState
    Flags,
}
impl Attr {
    /// Attributes tracking what the user is looking at or has picked, rather than document content.
    #[must_use]
    pub fn is_current(self) -> bool {
        matches!(
            self,
            Self::CurrentDocument
                | Self::CurrentContainer
                | Self::CurrentTemplate
                | Self::CurrentStyleLibrary
                | Self::CurrentGroupLibrary
                | Self::CurrentDatabase
                | Self::CurrentLayer
                | Self::CurrentShape
        )
    }
    #[must_use]
    pub fn name(self) -> &'static str {
        self.into()
    }
}

#[cfg(test)]
mod test {
    use super::Attr;
    use strum::IntoEnumIterator;

    #[test]
    fn current_attrs_match_their_names() {
        // The typed rule must agree with the naming convention it replaces.
        for attr in Attr::iter() {
            assert_eq!(
                attr.is_current(),
                attr.name().starts_with("Current"),
                "{attr}"
            );
        }
    }
}
