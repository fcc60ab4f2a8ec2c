//! Conversion of [`ChangeOp`] values into wire-ready change structures.

use serde_json::{json, Map, Value};
use uuid::Uuid;

use super::geometry::{self, Bounds};
use super::model::{
    AttrOp, BoxShape, ChangeOp, NewColor, NewObject, NewPage, NewTypography, PathShape,
    ShapeSpec, TextShape,
};
use crate::wire::{encode_deep, keyword, keyword_value};

/// Id of the implicit root frame every page has.
pub const ROOT_FRAME_ID: Uuid = Uuid::nil();

/// Encodes change operations, generating ids for new entities.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChangeEncoder {
    root_frame_id: Uuid,
}

impl ChangeEncoder {
    /// Creates an encoder that places unparented shapes in the root frame.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            root_frame_id: ROOT_FRAME_ID,
        }
    }

    /// Uses `id` as the default frame for shapes without one.
    #[must_use]
    pub const fn with_root_frame(mut self, id: Uuid) -> Self {
        self.root_frame_id = id;
        self
    }

    /// Encodes one change into its wire form.
    #[must_use]
    pub fn encode(&self, op: &ChangeOp) -> Value {
        encode_deep(&Value::Object(self.build(op)))
    }

    /// Encodes every change, keeping their order.
    #[must_use]
    pub fn encode_all(&self, ops: &[ChangeOp]) -> Vec<Value> {
        ops.iter().map(|op| self.encode(op)).collect()
    }

    /// Builds the untagged change structure.
    fn build(&self, op: &ChangeOp) -> Map<String, Value> {
        match op {
            ChangeOp::AddObject(new) => self.add_object(new),
            ChangeOp::ModifyObject {
                id,
                page_id,
                operations,
            } => {
                let mut change = change("mod-obj", id);
                change.insert("page-id".into(), id_value(page_id));
                change.insert("operations".into(), attr_ops(operations));
                change
            }
            ChangeOp::DeleteObject { id, page_id } => {
                let mut change = change("del-obj", id);
                change.insert("page-id".into(), id_value(page_id));
                change
            }
            ChangeOp::AddPage(page) => add_page(page),
            ChangeOp::ModifyPage { id, operations } => modify("mod-page", id, operations),
            ChangeOp::DeletePage { id } => change("del-page", id),
            ChangeOp::AddColor(color) => add_color(color),
            ChangeOp::ModifyColor { id, operations } => modify("mod-color", id, operations),
            ChangeOp::DeleteColor { id } => change("del-color", id),
            ChangeOp::AddTypography(typography) => add_typography(typography),
            ChangeOp::ModifyTypography { id, operations } => {
                modify("mod-typography", id, operations)
            }
            ChangeOp::DeleteTypography { id } => change("del-typography", id),
        }
    }

    fn add_object(&self, new: &NewObject) -> Map<String, Value> {
        let id = new.id.unwrap_or_else(Uuid::new_v4);
        let frame_id = new.frame_id.unwrap_or(self.root_frame_id);
        let parent_id = new.parent_id.unwrap_or(frame_id);

        let mut obj = synthesize(&new.shape);
        obj.insert("id".into(), id_value(&id));
        obj.insert("frame-id".into(), id_value(&frame_id));
        obj.insert("parent-id".into(), id_value(&parent_id));

        let mut change = change("add-obj", &id);
        change.insert("page-id".into(), id_value(&new.page_id));
        change.insert("frame-id".into(), id_value(&frame_id));
        change.insert("parent-id".into(), id_value(&parent_id));
        change.insert("obj".into(), Value::Object(obj));
        change
    }
}

/// Builds the full, untagged shape object for a new primitive.
///
/// Hierarchy references and the id are left to the caller.
#[must_use]
pub fn synthesize(shape: &ShapeSpec) -> Map<String, Value> {
    match shape {
        ShapeSpec::Rect(rect) => box_shape("rect", "Rectangle", rect),
        ShapeSpec::Circle(circle) => box_shape("circle", "Ellipse", circle),
        ShapeSpec::Frame(frame) => {
            let mut obj = box_shape("frame", "Board", frame);
            obj.insert("shapes".into(), json!([]));
            obj
        }
        ShapeSpec::Text(text) => text_shape(text),
        ShapeSpec::Path(path) => path_shape(path),
    }
}

fn id_value(id: &Uuid) -> Value {
    Value::String(id.hyphenated().to_string())
}

/// Starts a change map with its type keyword and target id.
fn change(kind: &str, id: &Uuid) -> Map<String, Value> {
    let mut change = Map::new();
    change.insert("type".into(), keyword_value(kind));
    change.insert("id".into(), id_value(id));
    change
}

fn modify(kind: &str, id: &Uuid, operations: &[AttrOp]) -> Map<String, Value> {
    let mut change = change(kind, id);
    change.insert("operations".into(), attr_ops(operations));
    change
}

fn attr_ops(operations: &[AttrOp]) -> Value {
    operations
        .iter()
        .map(|op| match op {
            AttrOp::Set { attr, value } => json!({
                "type": keyword_value("set"),
                "attr": keyword_value(attr),
                "val": value,
            }),
            AttrOp::Assign { path, value } => json!({
                "type": keyword_value("assign"),
                "path": path.iter().map(|segment| keyword(segment)).collect::<Vec<_>>(),
                "val": value,
            }),
        })
        .collect()
}

fn insert_opt<T: Into<Value>>(map: &mut Map<String, Value>, key: &str, value: Option<T>) {
    if let Some(value) = value {
        map.insert(key.to_string(), value.into());
    }
}

fn add_page(page: &NewPage) -> Map<String, Value> {
    let id = page.id.unwrap_or_else(Uuid::new_v4);
    let mut change = change("add-page", &id);
    change.insert("name".into(), Value::String(page.name.clone()));
    change
}

fn add_color(color: &NewColor) -> Map<String, Value> {
    let id = color.id.unwrap_or_else(Uuid::new_v4);
    let mut entity = Map::new();
    entity.insert("id".into(), id_value(&id));
    entity.insert("name".into(), Value::String(color.name.clone()));
    entity.insert("color".into(), Value::String(color.color.clone()));
    entity.insert("opacity".into(), json!(color.opacity.unwrap_or(1.0)));
    insert_opt(&mut entity, "path", color.path.clone());

    let mut change = Map::new();
    change.insert("type".into(), keyword_value("add-color"));
    change.insert("color".into(), Value::Object(entity));
    change
}

fn add_typography(typography: &NewTypography) -> Map<String, Value> {
    let id = typography.id.unwrap_or_else(Uuid::new_v4);
    let mut entity = Map::new();
    entity.insert("id".into(), id_value(&id));
    entity.insert("name".into(), Value::String(typography.name.clone()));
    insert_opt(&mut entity, "font-id", typography.font_id.clone());
    entity.insert(
        "font-family".into(),
        Value::String(typography.font_family.clone()),
    );
    insert_opt(
        &mut entity,
        "font-variant-id",
        typography.font_variant_id.clone(),
    );
    entity.insert(
        "font-size".into(),
        Value::String(typography.font_size.to_string()),
    );
    entity.insert(
        "font-weight".into(),
        Value::String(typography.font_weight.clone()),
    );
    insert_opt(&mut entity, "font-style", typography.font_style.clone());
    insert_opt(
        &mut entity,
        "line-height",
        typography.line_height.map(|v| v.to_string()),
    );
    insert_opt(
        &mut entity,
        "letter-spacing",
        typography.letter_spacing.map(|v| v.to_string()),
    );
    insert_opt(
        &mut entity,
        "text-transform",
        typography.text_transform.clone(),
    );
    insert_opt(&mut entity, "path", typography.path.clone());

    let mut change = Map::new();
    change.insert("type".into(), keyword_value("add-typography"));
    change.insert("typography".into(), Value::Object(entity));
    change
}

fn box_shape(kind: &str, default_name: &str, shape: &BoxShape) -> Map<String, Value> {
    let bounds = Bounds::new(shape.x, shape.y, shape.width, shape.height);
    let name = shape.name.as_deref().unwrap_or(default_name);
    let mut obj = geometry::base_shape(kind, name, &bounds);
    obj.insert(
        "fills".into(),
        geometry::fills(shape.fill_color.as_deref(), shape.fill_opacity),
    );
    obj.insert(
        "strokes".into(),
        geometry::strokes(shape.stroke_color.as_deref(), shape.stroke_width),
    );
    obj
}

fn text_shape(text: &TextShape) -> Map<String, Value> {
    let bounds = geometry::text_bounds(text);
    let name = text.name.as_deref().unwrap_or(&text.content);
    let mut obj = geometry::base_shape("text", name, &bounds);
    let grow = if text.width.is_some() {
        "fixed"
    } else {
        "auto-width"
    };
    obj.insert("grow-type".into(), keyword_value(grow));
    obj.insert("content".into(), geometry::text_content(text));
    obj
}

fn path_shape(path: &PathShape) -> Map<String, Value> {
    let bounds = Bounds::enclosing(&path.points).unwrap_or(Bounds::new(0.0, 0.0, 0.0, 0.0));
    let name = path.name.as_deref().unwrap_or("Path");
    let mut obj = geometry::base_shape("path", name, &bounds);
    obj.insert(
        "content".into(),
        geometry::path_content(&path.points, path.closed),
    );
    obj.insert(
        "fills".into(),
        geometry::fills(path.fill_color.as_deref(), path.fill_opacity),
    );
    obj.insert(
        "strokes".into(),
        geometry::strokes(
            Some(path.stroke_color.as_deref().unwrap_or("#000000")),
            path.stroke_width,
        ),
    );
    obj
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::changes::model::PathShape;

    fn page() -> Uuid {
        Uuid::parse_str("11111111-2222-4333-8444-555555555555").unwrap()
    }

    #[test]
    fn delete_object_carries_page() {
        let id = Uuid::new_v4();
        let wire = ChangeEncoder::new().encode(&ChangeOp::DeleteObject { id, page_id: page() });
        assert_eq!(wire["~:type"], "~:del-obj");
        assert_eq!(wire["~:id"], format!("~u{id}"));
        assert_eq!(wire["~:page-id"], format!("~u{}", page()));
    }

    #[test]
    fn add_object_defaults_to_root_frame() {
        let op = ChangeOp::add_rectangle(page(), BoxShape::new(0.0, 0.0, 1.0, 1.0));
        let wire = ChangeEncoder::new().encode(&op);
        let root = format!("~u{ROOT_FRAME_ID}");
        assert_eq!(wire["~:frame-id"], root);
        assert_eq!(wire["~:parent-id"], root);
        assert_eq!(wire["~:obj"]["~:id"], wire["~:id"]);
        assert_eq!(wire["~:obj"]["~:type"], "~:rect");
    }

    #[test]
    fn custom_root_frame_is_used() {
        let root = Uuid::new_v4();
        let op = ChangeOp::add_rectangle(page(), BoxShape::new(0.0, 0.0, 1.0, 1.0));
        let wire = ChangeEncoder::new().with_root_frame(root).encode(&op);
        assert_eq!(wire["~:obj"]["~:frame-id"], format!("~u{root}"));
    }

    #[test]
    fn frame_parent_follows_frame() {
        let frame = Uuid::new_v4();
        let op = ChangeOp::AddObject(
            NewObject::new(page(), ShapeSpec::Circle(BoxShape::new(0.0, 0.0, 4.0, 4.0)))
                .in_frame(frame),
        );
        let wire = ChangeEncoder::new().encode(&op);
        assert_eq!(wire["~:parent-id"], format!("~u{frame}"));
        assert_eq!(wire["~:obj"]["~:name"], "Ellipse");
    }

    #[test]
    fn set_and_assign_ops_encode_keywords() {
        let op = ChangeOp::ModifyObject {
            id: Uuid::new_v4(),
            page_id: page(),
            operations: vec![
                AttrOp::set("name", json!("Header")),
                AttrOp::assign(["layout-grid", "size"], json!({"column": 12})),
            ],
        };
        let wire = ChangeEncoder::new().encode(&op);
        let ops = wire["~:operations"].as_array().unwrap();
        assert_eq!(ops[0]["~:type"], "~:set");
        assert_eq!(ops[0]["~:attr"], "~:name");
        assert_eq!(ops[0]["~:val"], "Header");
        assert_eq!(ops[1]["~:path"], json!(["~:layout-grid", "~:size"]));
        assert_eq!(ops[1]["~:val"], json!({"~:column": 12}));
    }

    #[test]
    fn typography_omits_missing_optionals() {
        let typography = NewTypography {
            id: None,
            name: "Body".into(),
            font_id: None,
            font_family: "Inter".into(),
            font_variant_id: None,
            font_size: 16.0,
            font_weight: "400".into(),
            font_style: None,
            line_height: Some(1.5),
            letter_spacing: None,
            text_transform: None,
            path: None,
        };
        let wire = ChangeEncoder::new().encode(&ChangeOp::AddTypography(typography));
        let entity = wire["~:typography"].as_object().unwrap();
        assert_eq!(entity["~:font-size"], "16");
        assert_eq!(entity["~:line-height"], "1.5");
        assert!(!entity.contains_key("~:font-id"));
        assert!(!entity.contains_key("~:letter-spacing"));
    }

    #[test]
    fn path_defaults_to_black_stroke() {
        let path = PathShape::through([(0.0, 0.0), (10.0, 5.0)]);
        let obj = synthesize(&ShapeSpec::Path(path));
        assert_eq!(obj["strokes"][0]["stroke-color"], "#000000");
        assert_eq!(obj["selrect"]["x2"].as_f64(), Some(10.0));
        assert_eq!(obj["selrect"]["y2"].as_f64(), Some(5.0));
    }

    #[test]
    fn empty_path_gets_zero_box() {
        let path = PathShape::through(std::iter::empty());
        let obj = synthesize(&ShapeSpec::Path(path));
        assert_eq!(obj["width"].as_f64(), Some(0.0));
        assert_eq!(obj["content"], json!([]));
    }
}
