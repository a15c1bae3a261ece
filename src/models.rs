use serde::{Deserialize, Serialize};

/// Class label of records produced by the contour pass
pub const SHAPE_CLASS: &str = "detected shape";

/// Class label of records produced by the line pass
pub const LINE_CLASS: &str = "detected line";

/// Axis-aligned rectangle, top-left origin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RectangleBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl RectangleBox {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Center in image coordinates
    pub fn center(&self) -> (f32, f32) {
        (
            self.x as f32 + self.width as f32 / 2.0,
            self.y as f32 + self.height as f32 / 2.0,
        )
    }
}

/// Line segment stored as start point plus displacement
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentBox {
    pub x1: i32,
    pub y1: i32,
    pub dx: i32,
    pub dy: i32,
}

impl SegmentBox {
    pub fn from_endpoints(start: (i32, i32), end: (i32, i32)) -> Self {
        Self {
            x1: start.0,
            y1: start.1,
            dx: end.0 - start.0,
            dy: end.1 - start.1,
        }
    }

    pub fn end(&self) -> (i32, i32) {
        (self.x1 + self.dx, self.y1 + self.dy)
    }

    /// Larger of the horizontal and vertical spans
    pub fn extent(&self) -> i32 {
        self.dx.abs().max(self.dy.abs())
    }
}

/// Box geometry of a record. Which variant applies is decided by the record class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoxGeometry {
    Rectangle(RectangleBox),
    Segment(SegmentBox),
}

impl BoxGeometry {
    fn to_array(self) -> [i32; 4] {
        match self {
            BoxGeometry::Rectangle(r) => [r.x, r.y, r.width, r.height],
            BoxGeometry::Segment(s) => [s.x1, s.y1, s.dx, s.dy],
        }
    }
}

/// One labeled detection exchanged between the detector and the builder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireRecord", into = "WireRecord")]
pub struct DetectionRecord {
    pub class: String,
    pub geometry: BoxGeometry,
    pub confidence: Option<f32>,
}

impl DetectionRecord {
    pub fn shape(rect: RectangleBox) -> Self {
        Self {
            class: SHAPE_CLASS.to_string(),
            geometry: BoxGeometry::Rectangle(rect),
            confidence: None,
        }
    }

    pub fn line(segment: SegmentBox) -> Self {
        Self {
            class: LINE_CLASS.to_string(),
            geometry: BoxGeometry::Segment(segment),
            confidence: None,
        }
    }

    pub fn object(class: impl Into<String>, rect: RectangleBox, confidence: f32) -> Self {
        Self {
            class: class.into(),
            geometry: BoxGeometry::Rectangle(rect),
            confidence: Some(confidence),
        }
    }

    pub fn is_line(&self) -> bool {
        matches!(self.geometry, BoxGeometry::Segment(_))
    }

    pub fn rectangle(&self) -> Option<&RectangleBox> {
        match &self.geometry {
            BoxGeometry::Rectangle(r) => Some(r),
            BoxGeometry::Segment(_) => None,
        }
    }

    pub fn segment(&self) -> Option<&SegmentBox> {
        match &self.geometry {
            BoxGeometry::Segment(s) => Some(s),
            BoxGeometry::Rectangle(_) => None,
        }
    }
}

/// On-disk shape of a record: `{"class", "box": [4 ints], "confidence"?}`
#[derive(Serialize, Deserialize)]
struct WireRecord {
    class: String,
    #[serde(rename = "box")]
    bbox: [i32; 4],
    #[serde(default, skip_serializing_if = "Option::is_none")]
    confidence: Option<f32>,
}

impl TryFrom<WireRecord> for DetectionRecord {
    type Error = String;

    fn try_from(wire: WireRecord) -> Result<Self, Self::Error> {
        if wire.class.is_empty() {
            return Err("record class must not be empty".to_string());
        }
        if let Some(conf) = wire.confidence {
            if !(0.0..=1.0).contains(&conf) {
                return Err(format!(
                    "confidence {} of '{}' is outside [0, 1]",
                    conf, wire.class
                ));
            }
        }

        let [a, b, c, d] = wire.bbox;
        let geometry = if wire.class == LINE_CLASS {
            BoxGeometry::Segment(SegmentBox { x1: a, y1: b, dx: c, dy: d })
        } else {
            BoxGeometry::Rectangle(RectangleBox::new(a, b, c, d))
        };

        Ok(Self {
            class: wire.class,
            geometry,
            confidence: wire.confidence,
        })
    }
}

impl From<DetectionRecord> for WireRecord {
    fn from(record: DetectionRecord) -> Self {
        Self {
            class: record.class,
            bbox: record.geometry.to_array(),
            confidence: record.confidence,
        }
    }
}
