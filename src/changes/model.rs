//! Typed document mutations.
//!
//! These types only describe the shape of a change. Turning them into wire
//! structures is the job of [`ChangeEncoder`](super::ChangeEncoder). All of
//! them deserialise from plain JSON so that outer surfaces can accept
//! caller-written change lists:
//!
//! ```json
//! {"type": "add-color", "name": "Primary", "color": "#007AFF", "opacity": 1}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// A single mutation of the remote document.
///
/// The set is closed: the encoder matches on every variant, so a new kind of
/// change must be handled there before the crate compiles again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ChangeOp {
    /// Adds a new shape to a page.
    AddObject(NewObject),
    /// Applies attribute operations to an existing shape.
    ModifyObject {
        /// Target shape.
        id: Uuid,
        /// Page that owns the shape.
        page_id: Uuid,
        /// Operations applied in order.
        operations: Vec<AttrOp>,
    },
    /// Removes a shape from a page.
    DeleteObject {
        /// Target shape.
        id: Uuid,
        /// Page that owns the shape.
        page_id: Uuid,
    },
    /// Adds a new page.
    AddPage(NewPage),
    /// Applies attribute operations to a page.
    ModifyPage {
        /// Target page.
        id: Uuid,
        /// Operations applied in order.
        operations: Vec<AttrOp>,
    },
    /// Removes a page.
    DeletePage {
        /// Target page.
        id: Uuid,
    },
    /// Adds a library color.
    AddColor(NewColor),
    /// Applies attribute operations to a library color.
    ModifyColor {
        /// Target color.
        id: Uuid,
        /// Operations applied in order.
        operations: Vec<AttrOp>,
    },
    /// Removes a library color.
    DeleteColor {
        /// Target color.
        id: Uuid,
    },
    /// Adds a library typography.
    AddTypography(NewTypography),
    /// Applies attribute operations to a library typography.
    ModifyTypography {
        /// Target typography.
        id: Uuid,
        /// Operations applied in order.
        operations: Vec<AttrOp>,
    },
    /// Removes a library typography.
    DeleteTypography {
        /// Target typography.
        id: Uuid,
    },
}

impl ChangeOp {
    /// Adds a rectangle on `page_id` at the page root.
    #[must_use]
    pub fn add_rectangle(page_id: Uuid, rect: BoxShape) -> Self {
        Self::AddObject(NewObject::new(page_id, ShapeSpec::Rect(rect)))
    }

    /// Renames a library color.
    #[must_use]
    pub fn rename_color(id: Uuid, name: impl Into<String>) -> Self {
        Self::ModifyColor {
            id,
            operations: vec![AttrOp::set("name", Value::String(name.into()))],
        }
    }

    /// Short human-readable name of the operation, for logs and summaries.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::AddObject(_) => "add-object",
            Self::ModifyObject { .. } => "modify-object",
            Self::DeleteObject { .. } => "delete-object",
            Self::AddPage(_) => "add-page",
            Self::ModifyPage { .. } => "modify-page",
            Self::DeletePage { .. } => "delete-page",
            Self::AddColor(_) => "add-color",
            Self::ModifyColor { .. } => "modify-color",
            Self::DeleteColor { .. } => "delete-color",
            Self::AddTypography(_) => "add-typography",
            Self::ModifyTypography { .. } => "modify-typography",
            Self::DeleteTypography { .. } => "delete-typography",
        }
    }
}

/// An attribute operation inside a modify change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "kebab-case")]
pub enum AttrOp {
    /// Replaces a top-level attribute.
    Set {
        /// Attribute name, e.g. `"name"` or `"fills"`.
        attr: String,
        /// New value.
        value: Value,
    },
    /// Assigns a value below a nested attribute path.
    Assign {
        /// Path segments, outermost first.
        path: Vec<String>,
        /// Value stored at the end of the path.
        value: Value,
    },
}

impl AttrOp {
    /// Creates a set operation.
    #[must_use]
    pub fn set(attr: impl Into<String>, value: Value) -> Self {
        Self::Set {
            attr: attr.into(),
            value,
        }
    }

    /// Creates a nested assign operation.
    #[must_use]
    pub fn assign<I, S>(path: I, value: Value) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Assign {
            path: path.into_iter().map(Into::into).collect(),
            value,
        }
    }
}

/// A new shape and where it goes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewObject {
    /// Shape id. Generated when absent.
    #[serde(default)]
    pub id: Option<Uuid>,
    /// Page receiving the shape.
    pub page_id: Uuid,
    /// Containing frame. Defaults to the page root frame.
    #[serde(default)]
    pub frame_id: Option<Uuid>,
    /// Parent shape. Defaults to the page root frame.
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    /// Shape description.
    pub shape: ShapeSpec,
}

impl NewObject {
    /// Places `shape` on `page_id` under the root frame.
    #[must_use]
    pub const fn new(page_id: Uuid, shape: ShapeSpec) -> Self {
        Self {
            id: None,
            page_id,
            frame_id: None,
            parent_id: None,
            shape,
        }
    }

    /// Uses a caller-chosen id instead of a generated one.
    #[must_use]
    pub fn with_id(mut self, id: Uuid) -> Self {
        self.id = Some(id);
        self
    }

    /// Nests the shape inside `frame_id`, which also becomes its parent.
    #[must_use]
    pub fn in_frame(mut self, frame_id: Uuid) -> Self {
        self.frame_id = Some(frame_id);
        self.parent_id = Some(frame_id);
        self
    }
}

/// The kinds of primitive the encoder knows how to synthesise.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ShapeSpec {
    /// Axis-aligned rectangle.
    Rect(BoxShape),
    /// Ellipse inscribed in its box.
    Circle(BoxShape),
    /// Frame (board) that can hold children.
    Frame(BoxShape),
    /// Single-run text.
    Text(TextShape),
    /// Polyline path.
    Path(PathShape),
}

/// Geometry and styling for box-shaped primitives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BoxShape {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Fill color as `#RRGGBB`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    /// Fill opacity (0-1). Defaults to 1 when a fill color is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_opacity: Option<f64>,
    /// Stroke color as `#RRGGBB`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<String>,
    /// Stroke width. Defaults to 1 when a stroke color is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
}

impl BoxShape {
    /// Creates an unstyled box.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
            name: None,
            fill_color: None,
            fill_opacity: None,
            stroke_color: None,
            stroke_width: None,
        }
    }

    /// Sets the display name.
    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets a solid fill.
    #[must_use]
    pub fn with_fill(mut self, color: impl Into<String>, opacity: Option<f64>) -> Self {
        self.fill_color = Some(color.into());
        self.fill_opacity = opacity;
        self
    }

    /// Sets a solid stroke.
    #[must_use]
    pub fn with_stroke(mut self, color: impl Into<String>, width: Option<f64>) -> Self {
        self.stroke_color = Some(color.into());
        self.stroke_width = width;
        self
    }
}

/// A text shape holding one styled run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TextShape {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Text content.
    pub content: String,
    /// Font family.
    #[serde(default = "default_font_family")]
    pub font_family: String,
    /// Font size in points.
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    /// Font weight, e.g. `"400"` or `"700"`.
    #[serde(default = "default_font_weight")]
    pub font_weight: String,
    /// Text color as `#RRGGBB`.
    #[serde(default = "default_text_color")]
    pub fill_color: String,
    /// Explicit width. Approximated from the content when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    /// Explicit height. Derived from the font size when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    /// Display name. Defaults to the content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl TextShape {
    /// Creates a text shape with default font settings.
    #[must_use]
    pub fn new(x: f64, y: f64, content: impl Into<String>) -> Self {
        Self {
            x,
            y,
            content: content.into(),
            font_family: default_font_family(),
            font_size: default_font_size(),
            font_weight: default_font_weight(),
            fill_color: default_text_color(),
            width: None,
            height: None,
            name: None,
        }
    }
}

fn default_font_family() -> String {
    "sourcesanspro".to_string()
}

const fn default_font_size() -> f64 {
    14.0
}

fn default_font_weight() -> String {
    "400".to_string()
}

fn default_text_color() -> String {
    "#000000".to_string()
}

/// A polyline path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PathShape {
    /// Points in drawing order.
    pub points: Vec<PathPoint>,
    /// Appends a close-path segment.
    #[serde(default)]
    pub closed: bool,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Stroke color. Defaults to black.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<String>,
    /// Stroke width. Defaults to 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    /// Fill color for closed paths.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_color: Option<String>,
    /// Fill opacity (0-1).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill_opacity: Option<f64>,
}

impl PathShape {
    /// Creates an open path through `points`.
    #[must_use]
    pub fn through(points: impl IntoIterator<Item = (f64, f64)>) -> Self {
        Self {
            points: points
                .into_iter()
                .map(|(x, y)| PathPoint {
                    x,
                    y,
                    command: None,
                })
                .collect(),
            closed: false,
            name: None,
            stroke_color: None,
            stroke_width: None,
            fill_color: None,
            fill_opacity: None,
        }
    }
}

/// A path vertex with an optional explicit command.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Overrides the implicit move-to/line-to choice.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<PathCommand>,
}

/// Drawing command for a path vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PathCommand {
    /// Starts a new subpath.
    MoveTo,
    /// Draws a straight segment.
    LineTo,
}

impl PathCommand {
    /// Wire keyword name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MoveTo => "move-to",
            Self::LineTo => "line-to",
        }
    }
}

/// A new page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPage {
    /// Page id. Generated when absent.
    #[serde(default)]
    pub id: Option<Uuid>,
    /// Page name.
    pub name: String,
}

/// A new library color.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewColor {
    /// Color id. Generated when absent.
    #[serde(default)]
    pub id: Option<Uuid>,
    /// Color name.
    pub name: String,
    /// Hex value, e.g. `#007AFF`.
    pub color: String,
    /// Opacity (0-1). Defaults to 1.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f64>,
    /// Group path in the library.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl NewColor {
    /// Creates an opaque color with a generated id.
    #[must_use]
    pub fn new(name: impl Into<String>, color: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            color: color.into(),
            opacity: None,
            path: None,
        }
    }
}

/// A new library typography.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTypography {
    /// Typography id. Generated when absent.
    #[serde(default)]
    pub id: Option<Uuid>,
    /// Typography name.
    pub name: String,
    /// Font identifier known to the remote service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_id: Option<String>,
    /// Font family.
    pub font_family: String,
    /// Font variant identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_variant_id: Option<String>,
    /// Font size in points.
    pub font_size: f64,
    /// Font weight, e.g. `"400"`.
    pub font_weight: String,
    /// Font style, e.g. `"normal"` or `"italic"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_style: Option<String>,
    /// Line height multiplier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
    /// Letter spacing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub letter_spacing: Option<f64>,
    /// Text transform, e.g. `"uppercase"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_transform: Option<String>,
    /// Group path in the library.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}
