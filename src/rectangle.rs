//! Rectangle-only editing mode.
//!
//! Every shape starts as the axis-aligned bounding rectangle of the drawn
//! points and is reshaped by dragging one corner at a time.

use tracing::{debug, warn};

use crate::config::GraphConfig;
use crate::error::{GeometryError, ParseError, Result, StoreGraphError, ValidationError};
use crate::geometry::wkt::{format_polygon, parse_polygon};
use crate::geometry::{Aabb, Polygon};
use crate::layout::{ImportFailure, ImportReport};
use crate::math::polygon_2d::same_point;
use crate::math::Point2;
use crate::records::{OneOrMany, RectangleRecord};
use crate::registry::{NodeAttributes, NodeId};
use crate::session::{Mode, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Corner {
    LowerLeft,
    LowerRight,
    UpperLeft,
    UpperRight,
}

const CORNERS: [Corner; 4] = [
    Corner::LowerLeft,
    Corner::LowerRight,
    Corner::UpperLeft,
    Corner::UpperRight,
];

/// A rectangle shape with labels.
#[derive(Debug, Clone, PartialEq)]
pub struct Rectangle {
    pub uuid: NodeId,
    lower_left: Point2,
    lower_right: Point2,
    upper_left: Point2,
    upper_right: Point2,
    /// Outline; an imported shape keeps its ring until the first reshape.
    polygon: Polygon,
    pub attributes: NodeAttributes,
}

impl Rectangle {
    /// The bounding rectangle of `points`.
    ///
    /// # Errors
    ///
    /// Returns `GeometryError::Degenerate` if `points` is empty.
    pub fn from_points(points: &[Point2]) -> std::result::Result<Self, GeometryError> {
        let aabb = Polygon::from_points(points.to_vec())
            .bounding_box()
            .ok_or_else(|| GeometryError::Degenerate("no points to span a rectangle".into()))?;
        Ok(Self::from_aabb(NodeId::new_v4(), &aabb))
    }

    fn from_aabb(uuid: NodeId, aabb: &Aabb) -> Self {
        let mut rect = Self {
            uuid,
            lower_left: aabb.min,
            lower_right: Point2::new(aabb.max.x, aabb.min.y),
            upper_left: Point2::new(aabb.min.x, aabb.max.y),
            upper_right: aabb.max,
            polygon: Polygon::from_points(Vec::new()),
            attributes: NodeAttributes::default(),
        };
        rect.rebuild_polygon();
        rect
    }

    fn corner(&self, corner: Corner) -> Point2 {
        match corner {
            Corner::LowerLeft => self.lower_left,
            Corner::LowerRight => self.lower_right,
            Corner::UpperLeft => self.upper_left,
            Corner::UpperRight => self.upper_right,
        }
    }

    /// Corners in lower-left, lower-right, upper-right, upper-left order.
    #[must_use]
    pub fn corners(&self) -> [Point2; 4] {
        [self.lower_left, self.lower_right, self.upper_right, self.upper_left]
    }

    #[must_use]
    pub fn polygon(&self) -> &Polygon {
        &self.polygon
    }

    #[must_use]
    pub fn center(&self) -> Point2 {
        Point2::new(
            (self.lower_left.x + self.lower_right.x) / 2.0,
            (self.lower_left.y + self.upper_left.y) / 2.0,
        )
    }

    fn rebuild_polygon(&mut self) {
        self.polygon = Polygon::from_points(self.corners().to_vec());
    }

    /// Applies an edited outline given as its 4 corners.
    ///
    /// At most one point may differ from the current corners; that corner
    /// moves and its two neighbours follow so the shape stays axis-aligned.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::PointCount` unless exactly 4 points are
    /// given, or `ValidationError::AmbiguousReshape` if more than one corner
    /// moved. The rectangle is left unchanged on error.
    pub fn reshape(&mut self, points: &[Point2]) -> std::result::Result<(), ValidationError> {
        if points.len() != 4 {
            return Err(ValidationError::PointCount(points.len()));
        }
        let mut unmatched: Vec<Corner> = CORNERS.to_vec();
        let mut moved = Vec::new();
        for point in points {
            match unmatched.iter().position(|&c| same_point(&self.corner(c), point)) {
                Some(pos) => {
                    unmatched.remove(pos);
                }
                None => moved.push(*point),
            }
        }
        match (moved.as_slice(), unmatched.as_slice()) {
            ([], _) => Ok(()),
            ([target], [corner]) => {
                self.move_corner(*corner, *target);
                Ok(())
            }
            _ => Err(ValidationError::AmbiguousReshape(moved.len())),
        }
    }

    /// Like [`reshape`](Self::reshape), for a ring that repeats its first
    /// point at the end.
    ///
    /// # Errors
    ///
    /// Same as [`reshape`](Self::reshape).
    pub fn reshape_ring(&mut self, ring: &[Point2]) -> std::result::Result<(), ValidationError> {
        match ring {
            [first, inner @ .., last] if same_point(first, last) => {
                let mut open = vec![*first];
                open.extend_from_slice(inner);
                self.reshape(&open)
            }
            _ => self.reshape(ring),
        }
    }

    fn move_corner(&mut self, corner: Corner, to: Point2) {
        match corner {
            Corner::LowerLeft => {
                self.lower_left = to;
                self.lower_right.y = to.y;
                self.upper_left.x = to.x;
            }
            Corner::LowerRight => {
                self.lower_right = to;
                self.lower_left.y = to.y;
                self.upper_right.x = to.x;
            }
            Corner::UpperLeft => {
                self.upper_left = to;
                self.lower_left.x = to.x;
                self.upper_right.y = to.y;
            }
            Corner::UpperRight => {
                self.upper_right = to;
                self.upper_left.y = to.y;
                self.lower_right.x = to.x;
            }
        }
        self.rebuild_polygon();
    }

    #[must_use]
    pub fn to_record(&self, scale: f64) -> RectangleRecord {
        RectangleRecord {
            uuid: Some(self.uuid),
            wkt: format_polygon(&self.polygon, scale),
            name: self.attributes.name.clone(),
            id: self.attributes.custom_id.clone(),
            node_type: self.attributes.node_type.clone(),
        }
    }

    /// Restores a rectangle, keeping the imported ring as its outline.
    ///
    /// # Errors
    ///
    /// Returns a `ParseError` if the outline text is malformed.
    pub fn from_record(record: &RectangleRecord, scale: f64) -> std::result::Result<Self, ParseError> {
        let polygon = parse_polygon(&record.wkt, scale)?;
        let aabb = polygon
            .bounding_box()
            .ok_or(ParseError::TooFewPoints(0))?;
        let mut rect = Self::from_aabb(record.uuid.unwrap_or_else(NodeId::new_v4), &aabb);
        rect.polygon = polygon;
        rect.attributes = NodeAttributes {
            custom_id: record.id.clone(),
            name: record.name.clone(),
            node_type: record.node_type.clone(),
        };
        Ok(rect)
    }
}

/// Rectangles in draw order, with undo of the latest drawing.
#[derive(Debug, Clone)]
pub struct RectangleLayout {
    scale: f64,
    shapes: Vec<Rectangle>,
    history: Vec<NodeId>,
}

impl RectangleLayout {
    /// Creates an empty layout using the config's scale factor.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidConfig` if the config is unusable.
    pub fn new(config: &GraphConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            scale: config.scale(),
            shapes: Vec::new(),
            history: Vec::new(),
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rectangle> + '_ {
        self.shapes.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Looks up a rectangle.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::UnknownNode` if no rectangle has this id.
    pub fn get(&self, uuid: NodeId) -> Result<&Rectangle> {
        self.shapes
            .iter()
            .find(|r| r.uuid == uuid)
            .ok_or_else(|| ValidationError::UnknownNode(uuid.to_string()).into())
    }

    fn position(&self, uuid: NodeId) -> std::result::Result<usize, ValidationError> {
        self.shapes
            .iter()
            .position(|r| r.uuid == uuid)
            .ok_or_else(|| ValidationError::UnknownNode(uuid.to_string()))
    }

    /// Adds the bounding rectangle of freshly drawn points.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::ModeMismatch` outside draw mode, or a
    /// `GeometryError` if no points were drawn.
    pub fn draw(&mut self, session: &Session, points: &[Point2]) -> Result<NodeId> {
        session.require(Mode::Draw, "draw")?;
        let rect = Rectangle::from_points(points)?;
        let uuid = rect.uuid;
        self.shapes.push(rect);
        self.history.push(uuid);
        debug!(%uuid, "drew rectangle");
        Ok(uuid)
    }

    /// Removes a rectangle.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::UnknownNode` if no rectangle has this id.
    pub fn delete(&mut self, uuid: NodeId) -> Result<Rectangle> {
        let index = self.position(uuid)?;
        self.history.retain(|drawn| *drawn != uuid);
        Ok(self.shapes.remove(index))
    }

    /// Overwrites the labels of a rectangle. Empty strings clear a label.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::UnknownNode` if no rectangle has this id.
    pub fn set_details(&mut self, uuid: NodeId, attributes: NodeAttributes) -> Result<()> {
        let index = self.position(uuid)?;
        self.shapes[index].attributes = attributes.normalized();
        Ok(())
    }

    /// Moves one corner of a rectangle.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::ModeMismatch` outside edit mode,
    /// `ValidationError::UnknownNode` for an unknown id, or the reshape error.
    pub fn reshape(&mut self, session: &Session, uuid: NodeId, points: &[Point2]) -> Result<()> {
        session.require(Mode::Edit, "reshape")?;
        let index = self.position(uuid)?;
        self.shapes[index].reshape(points)?;
        Ok(())
    }

    /// Removes the most recently drawn rectangle that still exists.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::ModeMismatch` outside draw mode.
    pub fn undo(&mut self, session: &Session) -> Result<Option<NodeId>> {
        session.require(Mode::Draw, "undo")?;
        while let Some(uuid) = self.history.pop() {
            if let Ok(index) = self.position(uuid) {
                self.shapes.remove(index);
                return Ok(Some(uuid));
            }
        }
        Ok(None)
    }

    /// Removes every rectangle.
    pub fn clear(&mut self) {
        self.shapes.clear();
        self.history.clear();
    }

    #[must_use]
    pub fn export_raw(&self) -> Vec<RectangleRecord> {
        self.shapes.iter().map(|r| r.to_record(self.scale)).collect()
    }

    /// Adds rectangles from one record or a list of records.
    ///
    /// Malformed records and reused ids are skipped and reported.
    pub fn import_raw(&mut self, content: OneOrMany<RectangleRecord>) -> ImportReport {
        let mut report = ImportReport::default();
        for (index, record) in content.into_vec().iter().enumerate() {
            let rect = Rectangle::from_record(record, self.scale)
                .map_err(StoreGraphError::from)
                .and_then(|rect| {
                    if self.position(rect.uuid).is_ok() {
                        Err(ValidationError::DuplicateNode(rect.uuid.to_string()).into())
                    } else {
                        Ok(rect)
                    }
                });
            match rect {
                Ok(rect) => {
                    report.imported.push(rect.uuid);
                    self.shapes.push(rect);
                }
                Err(error) => {
                    warn!(index, %error, "skipped rectangle on import");
                    report.failures.push(ImportFailure {
                        index: Some(index),
                        error,
                    });
                }
            }
        }
        self.history.clear();
        report
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    const DRAW: Session = Session { mode: Mode::Draw };
    const EDIT: Session = Session { mode: Mode::Edit };

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    fn unit_layout() -> RectangleLayout {
        RectangleLayout::new(&GraphConfig::new(5.0, 1)).unwrap()
    }

    #[test]
    fn drawn_points_span_their_bounding_box() {
        let rect = Rectangle::from_points(&[p(2.0, 1.0), p(0.0, 3.0), p(1.0, 0.0)]).unwrap();
        assert_eq!(rect.corners(), [p(0.0, 0.0), p(2.0, 0.0), p(2.0, 3.0), p(0.0, 3.0)]);
        assert_relative_eq!(rect.polygon().area(), 6.0);
        assert_eq!(rect.center(), p(1.0, 1.5));
        assert!(Rectangle::from_points(&[]).is_err());
    }

    #[test]
    fn moving_a_corner_drags_its_neighbours() {
        let mut rect = Rectangle::from_points(&[p(0.0, 0.0), p(2.0, 2.0)]).unwrap();
        rect.reshape(&[p(0.0, 0.0), p(2.0, 0.0), p(0.0, 2.0), p(3.0, 4.0)])
            .unwrap();
        assert_eq!(rect.corners(), [p(0.0, 0.0), p(3.0, 0.0), p(3.0, 4.0), p(0.0, 4.0)]);
        assert_relative_eq!(rect.polygon().area(), 12.0);

        rect.reshape(&[p(-1.0, -1.0), p(3.0, 0.0), p(3.0, 4.0), p(0.0, 4.0)])
            .unwrap();
        assert_eq!(rect.corners(), [p(-1.0, -1.0), p(3.0, -1.0), p(3.0, 4.0), p(-1.0, 4.0)]);
    }

    #[test]
    fn reshape_validates_input() {
        let mut rect = Rectangle::from_points(&[p(0.0, 0.0), p(2.0, 2.0)]).unwrap();
        let before = rect.clone();
        assert!(matches!(
            rect.reshape(&[p(0.0, 0.0), p(2.0, 0.0), p(2.0, 2.0)]),
            Err(ValidationError::PointCount(3))
        ));
        assert!(matches!(
            rect.reshape(&[p(0.0, 0.0), p(2.0, 0.0), p(5.0, 5.0), p(-1.0, 6.0)]),
            Err(ValidationError::AmbiguousReshape(2))
        ));
        assert_eq!(rect, before);

        // Unchanged corners are a no-op.
        rect.reshape(&[p(2.0, 2.0), p(0.0, 0.0), p(0.0, 2.0), p(2.0, 0.0)]).unwrap();
        assert_eq!(rect, before);
    }

    #[test]
    fn closed_ring_is_accepted() {
        let mut rect = Rectangle::from_points(&[p(0.0, 0.0), p(2.0, 2.0)]).unwrap();
        rect.reshape_ring(&[p(0.0, 0.0), p(2.0, 0.0), p(2.0, 3.0), p(0.0, 2.0), p(0.0, 0.0)])
            .unwrap();
        assert_eq!(rect.corners()[2], p(2.0, 3.0));
    }

    #[test]
    fn imported_shape_keeps_its_ring() {
        let record = RectangleRecord {
            uuid: None,
            wkt: "POLYGON((0 0, 4 0, 4 2, 1 3, 0 0))".into(),
            name: Some("Bakery".into()),
            id: Some("B7".into()),
            node_type: None,
        };
        let rect = Rectangle::from_record(&record, 1.0).unwrap();
        assert_eq!(rect.polygon().vertex_count(), 4);
        assert_eq!(rect.corners()[2], p(4.0, 3.0));
        assert_eq!(rect.attributes.custom_id.as_deref(), Some("B7"));
        let back = rect.to_record(1.0);
        assert_eq!(back.uuid, Some(rect.uuid));
        assert_eq!(back.wkt, "POLYGON((0 0, 4 0, 4 2, 1 3, 0 0))");
    }

    #[test]
    fn layout_modes_and_undo() {
        let mut layout = unit_layout();
        let a = layout.draw(&DRAW, &[p(0.0, 0.0), p(1.0, 1.0)]).unwrap();
        let b = layout.draw(&DRAW, &[p(2.0, 0.0), p(3.0, 1.0)]).unwrap();
        assert!(layout.draw(&EDIT, &[p(0.0, 0.0)]).is_err());
        assert!(layout.reshape(&DRAW, a, &[]).is_err());
        layout
            .reshape(&EDIT, a, &[p(0.0, 0.0), p(1.0, 0.0), p(0.0, 1.0), p(2.0, 2.0)])
            .unwrap();

        assert_eq!(layout.undo(&DRAW).unwrap(), Some(b));
        assert_eq!(layout.len(), 1);
        layout.delete(a).unwrap();
        assert_eq!(layout.undo(&DRAW).unwrap(), None);
        assert!(layout.is_empty());
    }

    #[test]
    fn details_clear_empty_text() {
        let mut layout = unit_layout();
        let a = layout.draw(&DRAW, &[p(0.0, 0.0), p(1.0, 1.0)]).unwrap();
        layout
            .set_details(
                a,
                NodeAttributes {
                    custom_id: Some(String::new()),
                    name: Some("Fruit".into()),
                    node_type: None,
                },
            )
            .unwrap();
        let rect = layout.get(a).unwrap();
        assert_eq!(rect.attributes.custom_id, None);
        assert_eq!(rect.attributes.name.as_deref(), Some("Fruit"));
    }

    #[test]
    fn import_accepts_single_record_or_list() {
        let mut source = unit_layout();
        source.draw(&DRAW, &[p(0.0, 0.0), p(1.0, 1.0)]).unwrap();
        source.draw(&DRAW, &[p(2.0, 0.0), p(3.0, 1.0)]).unwrap();
        let exported = source.export_raw();

        let mut target = unit_layout();
        let single = target.import_raw(OneOrMany::One(exported[0].clone()));
        assert_eq!(single.imported.len(), 1);

        let json = serde_json::to_string(&exported).unwrap();
        let list: OneOrMany<RectangleRecord> = serde_json::from_str(&json).unwrap();
        let report = target.import_raw(list);
        assert_eq!(report.imported, vec![exported[1].uuid.unwrap()]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].index, Some(0));
        assert_eq!(target.len(), 2);
        assert_eq!(target.undo(&DRAW).unwrap(), None);
    }
}
