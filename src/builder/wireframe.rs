use crate::models::RectangleBox;

pub type Vertex = [f32; 3];

/// Bottom ring, top ring, then the four verticals
pub const BOX_EDGES: [[usize; 2]; 12] = [
    [0, 1],
    [1, 2],
    [2, 3],
    [3, 0],
    [4, 5],
    [5, 6],
    [6, 7],
    [7, 4],
    [0, 4],
    [1, 5],
    [2, 6],
    [3, 7],
];

/// Outline of a rectangular prism standing on the z = 0 plane. No faces.
#[derive(Debug, Clone, PartialEq)]
pub struct WireframeBox {
    pub name: String,
    /// 0..4 at z = 0 and 4..8 at z = height, each ring starting bottom-left
    pub vertices: [Vertex; 8],
    pub edges: [[usize; 2]; 12],
}

impl WireframeBox {
    pub fn new(name: impl Into<String>, center: (f32, f32), size: (f32, f32), height: f32) -> Self {
        let (cx, cy) = center;
        let (hw, hh) = (size.0 / 2.0, size.1 / 2.0);
        let corners = [
            (cx - hw, cy - hh),
            (cx + hw, cy - hh),
            (cx + hw, cy + hh),
            (cx - hw, cy + hh),
        ];

        let mut vertices = [[0.0; 3]; 8];
        for (i, (x, y)) in corners.into_iter().enumerate() {
            vertices[i] = [x, y, 0.0];
            vertices[i + 4] = [x, y, height];
        }

        Self {
            name: name.into(),
            vertices,
            edges: BOX_EDGES,
        }
    }

    pub fn from_rectangle(name: impl Into<String>, rect: &RectangleBox, height: f32) -> Self {
        Self::new(
            name,
            rect.center(),
            (rect.width as f32, rect.height as f32),
            height,
        )
    }

    pub fn center(&self) -> (f32, f32) {
        let [x0, y0, _] = self.vertices[0];
        let [x2, y2, _] = self.vertices[2];
        ((x0 + x2) / 2.0, (y0 + y2) / 2.0)
    }

    pub fn size(&self) -> (f32, f32) {
        let [x0, y0, _] = self.vertices[0];
        let [x2, y2, _] = self.vertices[2];
        (x2 - x0, y2 - y0)
    }

    pub fn height(&self) -> f32 {
        self.vertices[4][2] - self.vertices[0][2]
    }
}
