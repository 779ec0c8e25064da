//! # Factory
//!
//! Builds detached sub-graphs. Nothing built here is recorded in history or announced: the
//! returned roots become part of a document only once an [edit](crate::edit) attaches them.

use crate::color::ArgbColor;
use crate::graph::{
    shape, style, Column, Container, ContainerKind, Data, Database, Document, DocumentGraph,
    Layer, Library, NodeID, NodeKind, Point, Project, Property, Record, Shape, ShapeKind,
    ShapeState, StyleNode, Value,
};

pub const DEFAULT_PAGE_WIDTH: f64 = 840.0;
pub const DEFAULT_PAGE_HEIGHT: f64 = 600.0;

/// Ids of everything [`Factory::default_project`] builds.
#[derive(Copy, Clone, Debug)]
pub struct DefaultProject {
    pub project: NodeID,
    pub document: NodeID,
    pub page: NodeID,
    pub layer: NodeID,
    pub template: NodeID,
    pub style_library: NodeID,
    pub style: NodeID,
    pub group_library: NodeID,
    pub database: NodeID,
}

pub struct Factory<'a> {
    graph: &'a mut DocumentGraph,
}
impl<'a> Factory<'a> {
    pub fn new(graph: &'a mut DocumentGraph) -> Self {
        Self { graph }
    }
    pub fn point(&mut self, x: f64, y: f64) -> NodeID {
        self.graph.insert("", NodeKind::Point(Point { x, y }))
    }
    pub fn data(&mut self) -> NodeID {
        self.graph.insert("", NodeKind::Data(Data::default()))
    }
    pub fn property(&mut self, name: &str, value: &str) -> NodeID {
        self.graph.insert(
            name,
            NodeKind::Property(Property {
                value: value.to_owned(),
            }),
        )
    }
    /// A shape with its own state and data nodes.
    fn shape(&mut self, name: &str, style: Option<NodeID>, kind: ShapeKind) -> NodeID {
        let state = self
            .graph
            .insert("", NodeKind::ShapeState(ShapeState::default()));
        let data = self.data();
        self.graph.insert(
            name,
            NodeKind::Shape(Shape {
                style,
                data: Some(data),
                state: Some(state),
                kind,
            }),
        )
    }
    fn corners(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> (NodeID, NodeID) {
        (self.point(x1, y1), self.point(x2, y2))
    }
    pub fn point_shape(&mut self, x: f64, y: f64, style: Option<NodeID>) -> NodeID {
        let location = Some(self.point(x, y));
        self.shape("Point", style, ShapeKind::Point(shape::PointShape { location }))
    }
    pub fn line(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, style: Option<NodeID>) -> NodeID {
        let (start, end) = self.corners(x1, y1, x2, y2);
        self.shape(
            "Line",
            style,
            ShapeKind::Line(shape::Line {
                start: Some(start),
                end: Some(end),
            }),
        )
    }
    /// A line between existing points, such as a connector between two shapes.
    pub fn connector(&mut self, start: NodeID, end: NodeID, style: Option<NodeID>) -> NodeID {
        self.shape(
            "Connector",
            style,
            ShapeKind::Line(shape::Line {
                start: Some(start),
                end: Some(end),
            }),
        )
    }
    fn boxed(&mut self, x1: f64, y1: f64, x2: f64, y2: f64) -> shape::Boxed {
        let (top_left, bottom_right) = self.corners(x1, y1, x2, y2);
        shape::Boxed {
            top_left: Some(top_left),
            bottom_right: Some(bottom_right),
        }
    }
    pub fn rectangle(
        &mut self,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        style: Option<NodeID>,
    ) -> NodeID {
        let boxed = self.boxed(x1, y1, x2, y2);
        self.shape("Rectangle", style, ShapeKind::Rectangle(boxed))
    }
    pub fn ellipse(&mut self, x1: f64, y1: f64, x2: f64, y2: f64, style: Option<NodeID>) -> NodeID {
        let boxed = self.boxed(x1, y1, x2, y2);
        self.shape("Ellipse", style, ShapeKind::Ellipse(boxed))
    }
    fn four_point(&mut self, points: [(f64, f64); 4]) -> shape::FourPoint {
        let [p1, p2, p3, p4] = points.map(|(x, y)| Some(self.point(x, y)));
        shape::FourPoint {
            point1: p1,
            point2: p2,
            point3: p3,
            point4: p4,
        }
    }
    pub fn arc(&mut self, points: [(f64, f64); 4], style: Option<NodeID>) -> NodeID {
        let kind = ShapeKind::Arc(self.four_point(points));
        self.shape("Arc", style, kind)
    }
    pub fn cubic_bezier(&mut self, points: [(f64, f64); 4], style: Option<NodeID>) -> NodeID {
        let kind = ShapeKind::CubicBezier(self.four_point(points));
        self.shape("CubicBezier", style, kind)
    }
    pub fn quadratic_bezier(&mut self, points: [(f64, f64); 3], style: Option<NodeID>) -> NodeID {
        let [p1, p2, p3] = points.map(|(x, y)| Some(self.point(x, y)));
        self.shape(
            "QuadraticBezier",
            style,
            ShapeKind::QuadraticBezier(shape::QuadraticBezier {
                point1: p1,
                point2: p2,
                point3: p3,
            }),
        )
    }
    pub fn text(
        &mut self,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        text: &str,
        style: Option<NodeID>,
    ) -> NodeID {
        let (top_left, bottom_right) = self.corners(x1, y1, x2, y2);
        self.shape(
            "Text",
            style,
            ShapeKind::Text(shape::Text {
                top_left: Some(top_left),
                bottom_right: Some(bottom_right),
                text: text.to_owned(),
            }),
        )
    }
    pub fn image(
        &mut self,
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        key: &str,
        style: Option<NodeID>,
    ) -> NodeID {
        let (top_left, bottom_right) = self.corners(x1, y1, x2, y2);
        self.shape(
            "Image",
            style,
            ShapeKind::Image(shape::Image {
                top_left: Some(top_left),
                bottom_right: Some(bottom_right),
                key: key.to_owned(),
            }),
        )
    }
    pub fn path(&mut self, geometry: &str, style: Option<NodeID>) -> NodeID {
        self.shape(
            "Path",
            style,
            ShapeKind::Path(shape::Path {
                geometry: geometry.to_owned(),
            }),
        )
    }
    pub fn group(&mut self, shapes: Vec<NodeID>, connectors: Vec<NodeID>) -> NodeID {
        self.shape(
            "Group",
            None,
            ShapeKind::Group(shape::Group { shapes, connectors }),
        )
    }

    fn style_node(&mut self, name: &str, node: StyleNode) -> NodeID {
        self.graph.insert(name, NodeKind::Style(node))
    }
    /// A complete shape style tree: stroke, fill, line style with its fixed length, both arrows
    /// with their own paints, text style with its font style.
    pub fn style(&mut self, name: &str, stroke: ArgbColor, fill: ArgbColor, thickness: f64) -> NodeID {
        let arrow = |factory: &mut Self| {
            let stroke = factory.style_node("", StyleNode::Stroke(style::Paint { color: stroke }));
            let fill = factory.style_node("", StyleNode::Fill(style::Paint { color: fill }));
            factory.style_node(
                "",
                StyleNode::Arrow(style::ArrowStyle {
                    radius_x: 5.0,
                    radius_y: 3.0,
                    stroke: Some(stroke),
                    fill: Some(fill),
                    ..Default::default()
                }),
            )
        };
        let start_arrow = arrow(self);
        let end_arrow = arrow(self);
        let fixed_length =
            self.style_node("", StyleNode::FixedLength(style::FixedLength::default()));
        let line_style = self.style_node(
            "",
            StyleNode::Line(style::LineStyle {
                curvature: 50.0,
                fixed_length: Some(fixed_length),
            }),
        );
        let font_style = self.style_node("", StyleNode::Font(style::FontStyle::default()));
        let text_style = self.style_node(
            "",
            StyleNode::Text(style::TextStyle {
                font_style: Some(font_style),
                ..Default::default()
            }),
        );
        let stroke = self.style_node("", StyleNode::Stroke(style::Paint { color: stroke }));
        let fill = self.style_node("", StyleNode::Fill(style::Paint { color: fill }));
        self.style_node(
            name,
            StyleNode::Shape(style::ShapeStyle {
                stroke: Some(stroke),
                fill: Some(fill),
                line_style: Some(line_style),
                start_arrow: Some(start_arrow),
                end_arrow: Some(end_arrow),
                text_style: Some(text_style),
                thickness,
            }),
        )
    }
    pub fn style_library(&mut self, name: &str, items: Vec<NodeID>) -> NodeID {
        let selected = items.first().copied();
        self.graph
            .insert(name, NodeKind::StyleLibrary(Library { items, selected }))
    }
    pub fn group_library(&mut self, name: &str) -> NodeID {
        self.graph
            .insert(name, NodeKind::GroupLibrary(Library::default()))
    }

    pub fn layer(&mut self, name: &str) -> NodeID {
        self.graph.insert(name, NodeKind::Layer(Layer::default()))
    }
    /// A container with one layer and its own data. Returns the container and its layer.
    fn container(&mut self, name: &str, mut container: Container) -> (NodeID, NodeID) {
        let layer = self.layer("Layer1");
        let data = self.data();
        container.layers.push(layer);
        container.data = Some(data);
        container.current_layer = Some(layer);
        (self.graph.insert(name, NodeKind::Container(container)), layer)
    }
    /// A page with one layer, using `template` as its backdrop.
    pub fn page(&mut self, name: &str, template: Option<NodeID>) -> NodeID {
        self.page_with_layer(name, template).0
    }
    fn page_with_layer(&mut self, name: &str, template: Option<NodeID>) -> (NodeID, NodeID) {
        let mut page = Container::new(ContainerKind::Page, DEFAULT_PAGE_WIDTH, DEFAULT_PAGE_HEIGHT);
        page.template = template;
        self.container(name, page)
    }
    pub fn template(&mut self, name: &str) -> NodeID {
        let mut template = Container::new(
            ContainerKind::Template,
            DEFAULT_PAGE_WIDTH,
            DEFAULT_PAGE_HEIGHT,
        );
        template.background = ArgbColor::WHITE;
        self.container(name, template).0
    }
    pub fn document(&mut self, name: &str, pages: Vec<NodeID>) -> NodeID {
        self.graph.insert(
            name,
            NodeKind::Document(Document {
                pages,
                is_expanded: true,
            }),
        )
    }

    pub fn column(&mut self, name: &str) -> NodeID {
        self.graph.insert(name, NodeKind::Column(Column::default()))
    }
    pub fn database(&mut self, name: &str, columns: &[&str]) -> NodeID {
        let columns = columns.iter().map(|column| self.column(column)).collect();
        self.graph.insert(
            name,
            NodeKind::Database(Database {
                columns,
                records: Vec::new(),
            }),
        )
    }
    /// A record sharing the database's columns, with one value per column.
    pub fn record(&mut self, columns: Vec<NodeID>, values: &[&str]) -> NodeID {
        let values = values
            .iter()
            .map(|content| {
                self.graph.insert(
                    "",
                    NodeKind::Value(Value {
                        content: (*content).to_owned(),
                    }),
                )
            })
            .collect();
        self.graph
            .insert("", NodeKind::Record(Record { columns, values }))
    }

    pub fn project(&mut self, name: &str) -> NodeID {
        self.graph.insert(name, NodeKind::Project(Project::default()))
    }
    /// A project with one document of one page, a template, a style library holding a default
    /// style, an empty group library and a database. The page is the current container.
    pub fn default_project(&mut self, name: &str) -> DefaultProject {
        let template = self.template("Template");
        let (page, layer) = self.page_with_layer("Page1", Some(template));
        let document = self.document("Document1", vec![page]);
        let style = self.style("Default", ArgbColor::BLACK, ArgbColor::TRANSPARENT, 2.0);
        let style_library = self.style_library("Default", vec![style]);
        let group_library = self.group_library("Default");
        let database = self.database("Db", &["Column0", "Column1"]);
        let project = self.graph.insert(
            name,
            NodeKind::Project(Project {
                documents: vec![document],
                templates: vec![template],
                style_libraries: vec![style_library],
                group_libraries: vec![group_library],
                databases: vec![database],
                current_document: Some(document),
                current_container: Some(page),
                current_template: Some(template),
                current_style_library: Some(style_library),
                current_group_library: Some(group_library),
                current_database: Some(database),
            }),
        );
        DefaultProject {
            project,
            document,
            page,
            layer,
            template,
            style_library,
            style,
            group_library,
            database,
        }
    }
}
