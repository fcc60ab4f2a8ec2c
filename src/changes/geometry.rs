//! Geometry synthesis for newly created shapes.
//!
//! The remote renderer does not derive anything on its own: every new shape
//! must arrive with its selection rectangle, corner polygon, transform and
//! inverse transform already filled in. The builders here produce those
//! structures as untagged JSON; key tagging happens in the encoder.

use serde_json::{json, Map, Value};

use super::model::{PathCommand, PathPoint, TextShape};
use crate::wire::keyword_value;

/// Approximate advance width of one character, as a fraction of the font size.
pub const CHAR_WIDTH_FACTOR: f64 = 0.6;

/// Line height used when a text shape has no explicit height.
pub const LINE_HEIGHT_FACTOR: f64 = 1.2;

/// An axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl Bounds {
    /// Creates a box from its origin and size. Negative sizes are kept as-is.
    #[must_use]
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Smallest box containing every point, or `None` for an empty slice.
    #[must_use]
    pub fn enclosing(points: &[PathPoint]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    /// Right edge.
    #[must_use]
    pub fn x2(&self) -> f64 {
        self.x + self.width
    }

    /// Bottom edge.
    #[must_use]
    pub fn y2(&self) -> f64 {
        self.y + self.height
    }

    /// Selection rectangle carrying both corners and the size.
    #[must_use]
    pub fn selrect(&self) -> Value {
        json!({
            "x": self.x,
            "y": self.y,
            "width": self.width,
            "height": self.height,
            "x1": self.x,
            "y1": self.y,
            "x2": self.x2(),
            "y2": self.y2(),
        })
    }

    /// Corner polygon, clockwise from the top-left corner.
    #[must_use]
    pub fn corner_points(&self) -> Value {
        json!([
            {"x": self.x, "y": self.y},
            {"x": self.x2(), "y": self.y},
            {"x": self.x2(), "y": self.y2()},
            {"x": self.x, "y": self.y2()},
        ])
    }
}

/// The identity affine matrix.
#[must_use]
pub fn identity_matrix() -> Value {
    json!({"a": 1.0, "b": 0.0, "c": 0.0, "d": 1.0, "e": 0.0, "f": 0.0})
}

/// Fill list: empty without a color, else one solid fill.
#[must_use]
pub fn fills(color: Option<&str>, opacity: Option<f64>) -> Value {
    color.map_or_else(
        || json!([]),
        |color| {
            json!([{
                "fill-color": color,
                "fill-opacity": opacity.unwrap_or(1.0),
            }])
        },
    )
}

/// Stroke list: empty without a color, else one solid inner stroke.
#[must_use]
pub fn strokes(color: Option<&str>, width: Option<f64>) -> Value {
    color.map_or_else(
        || json!([]),
        |color| {
            json!([{
                "stroke-color": color,
                "stroke-opacity": 1.0,
                "stroke-width": width.unwrap_or(1.0),
                "stroke-style": keyword_value("solid"),
                "stroke-alignment": keyword_value("inner"),
            }])
        },
    )
}

/// Common attributes of every synthesized shape.
///
/// The caller adds the id, hierarchy references and type-specific fields.
#[must_use]
pub fn base_shape(kind: &str, name: &str, bounds: &Bounds) -> Map<String, Value> {
    let mut obj = Map::new();
    obj.insert("type".into(), keyword_value(kind));
    obj.insert("name".into(), Value::String(name.to_string()));
    obj.insert("x".into(), json!(bounds.x));
    obj.insert("y".into(), json!(bounds.y));
    obj.insert("width".into(), json!(bounds.width));
    obj.insert("height".into(), json!(bounds.height));
    obj.insert("rotation".into(), json!(0.0));
    obj.insert("selrect".into(), bounds.selrect());
    obj.insert("points".into(), bounds.corner_points());
    obj.insert("transform".into(), identity_matrix());
    obj.insert("transform-inverse".into(), identity_matrix());
    obj.insert("proportion".into(), json!(1.0));
    obj.insert("proportion-lock".into(), Value::Bool(false));
    obj.insert("fills".into(), json!([]));
    obj.insert("strokes".into(), json!([]));
    obj
}

/// Approximate rendered width of `content`.
///
/// Counts characters, not glyph widths, so it is only a starting size.
#[must_use]
#[allow(clippy::cast_precision_loss)] // character counts are far below 2^52
pub fn approximate_text_width(content: &str, font_size: f64) -> f64 {
    content.chars().count() as f64 * CHAR_WIDTH_FACTOR * font_size
}

/// Bounds of a text shape, approximating missing width and height.
#[must_use]
pub fn text_bounds(text: &TextShape) -> Bounds {
    let width = text
        .width
        .unwrap_or_else(|| approximate_text_width(&text.content, text.font_size));
    let height = text
        .height
        .unwrap_or(text.font_size * LINE_HEIGHT_FACTOR);
    Bounds::new(text.x, text.y, width, height)
}

/// Rich-text tree: root, paragraph-set, paragraph, one styled run.
#[must_use]
pub fn text_content(text: &TextShape) -> Value {
    let run = json!({
        "text": text.content,
        "font-family": text.font_family,
        "font-size": text.font_size.to_string(),
        "font-weight": text.font_weight,
        "fill-color": text.fill_color,
        "fill-opacity": 1.0,
    });
    json!({
        "type": "root",
        "children": [{
            "type": "paragraph-set",
            "children": [{
                "type": "paragraph",
                "children": [run],
            }],
        }],
    })
}

/// Path segments: move-to for the first point, line-to for the rest,
/// unless a point names its own command.
#[must_use]
pub fn path_content(points: &[PathPoint], closed: bool) -> Value {
    let mut segments: Vec<Value> = points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let command = p.command.unwrap_or(if i == 0 {
                PathCommand::MoveTo
            } else {
                PathCommand::LineTo
            });
            json!({
                "command": keyword_value(command.as_str()),
                "params": {"x": p.x, "y": p.y},
            })
        })
        .collect();
    if closed && !points.is_empty() {
        segments.push(json!({
            "command": keyword_value("close-path"),
            "params": {},
        }));
    }
    Value::Array(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(x: f64, y: f64) -> PathPoint {
        PathPoint {
            x,
            y,
            command: None,
        }
    }

    #[test]
    fn selrect_has_both_corners() {
        let sel = Bounds::new(10.0, 20.0, 100.0, 50.0).selrect();
        assert_eq!(sel["x1"].as_f64(), Some(10.0));
        assert_eq!(sel["y1"].as_f64(), Some(20.0));
        assert_eq!(sel["x2"].as_f64(), Some(110.0));
        assert_eq!(sel["y2"].as_f64(), Some(70.0));
        assert_eq!(sel["width"].as_f64(), Some(100.0));
    }

    #[test]
    fn negative_size_passes_through() {
        let b = Bounds::new(0.0, 0.0, -5.0, 3.0);
        assert_eq!(b.selrect()["x2"].as_f64(), Some(-5.0));
    }

    #[test]
    fn enclosing_box_uses_extremes() {
        let pts = [point(5.0, 9.0), point(-1.0, 3.0), point(7.0, 4.0)];
        let b = Bounds::enclosing(&pts).unwrap();
        assert_eq!(b, Bounds::new(-1.0, 3.0, 8.0, 6.0));
        assert!(Bounds::enclosing(&[]).is_none());
    }

    #[test]
    fn fill_opacity_defaults_to_one() {
        assert_eq!(fills(None, Some(0.5)), json!([]));
        let f = fills(Some("#FF0000"), None);
        assert_eq!(f[0]["fill-opacity"].as_f64(), Some(1.0));
    }

    #[test]
    fn text_width_is_approximated() {
        let text = TextShape::new(0.0, 0.0, "Hello");
        let b = text_bounds(&text);
        assert!((b.width - 5.0 * CHAR_WIDTH_FACTOR * 14.0).abs() < 1e-9);
        assert!((b.height - 14.0 * LINE_HEIGHT_FACTOR).abs() < 1e-9);
    }

    #[test]
    fn text_tree_has_single_run() {
        let content = text_content(&TextShape::new(0.0, 0.0, "Hi"));
        let run = &content["children"][0]["children"][0]["children"][0];
        assert_eq!(content["children"][0]["type"], "paragraph-set");
        assert_eq!(run["text"], "Hi");
        assert_eq!(run["font-family"], "sourcesanspro");
    }

    #[test]
    fn path_commands_default_and_override() {
        let mut pts = vec![point(0.0, 0.0), point(10.0, 0.0), point(10.0, 10.0)];
        pts[2].command = Some(PathCommand::MoveTo);
        let content = path_content(&pts, true);
        let commands: Vec<&str> = content
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["command"].as_str().unwrap())
            .collect();
        assert_eq!(commands, ["~:move-to", "~:line-to", "~:move-to", "~:close-path"]);
    }
}
