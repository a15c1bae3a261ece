use crate::builder::wireframe::WireframeBox;

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectData {
    Mesh(WireframeBox),
    Camera,
    Light,
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SceneObject {
    pub name: String,
    pub data: ObjectData,
}

impl SceneObject {
    pub fn mesh(wireframe: WireframeBox) -> Self {
        Self {
            name: wireframe.name.clone(),
            data: ObjectData::Mesh(wireframe),
        }
    }

    pub fn is_mesh(&self) -> bool {
        matches!(self.data, ObjectData::Mesh(_))
    }

    pub fn as_mesh(&self) -> Option<&WireframeBox> {
        match &self.data {
            ObjectData::Mesh(m) => Some(m),
            _ => None,
        }
    }
}

/// Handle on the collection of objects the builder writes into
pub trait Scene {
    /// Remove every mesh object, leaving cameras, lights and empties; returns how many were removed
    fn clear_meshes(&mut self) -> usize;

    /// Insert an object and return the name it was stored under
    fn link(&mut self, object: SceneObject) -> String;

    fn objects(&self) -> &[SceneObject];

    fn mesh_count(&self) -> usize {
        self.objects().iter().filter(|o| o.is_mesh()).count()
    }

    fn meshes(&self) -> Vec<&WireframeBox> {
        self.objects().iter().filter_map(|o| o.as_mesh()).collect()
    }
}

/// In-process scene. Duplicate names get `.001`, `.002`, ... suffixes.
#[derive(Debug, Clone, Default)]
pub struct MemoryScene {
    objects: Vec<SceneObject>,
}

impl MemoryScene {
    pub fn new() -> Self {
        Self::default()
    }

    fn name_taken(&self, name: &str) -> bool {
        self.objects.iter().any(|o| o.name == name)
    }

    fn unique_name(&self, base: &str) -> String {
        if !self.name_taken(base) {
            return base.to_string();
        }
        (1..)
            .map(|n| format!("{}.{:03}", base, n))
            .find(|candidate| !self.name_taken(candidate))
            .unwrap_or_else(|| base.to_string())
    }

    pub fn get(&self, name: &str) -> Option<&SceneObject> {
        self.objects.iter().find(|o| o.name == name)
    }
}

impl Scene for MemoryScene {
    fn clear_meshes(&mut self) -> usize {
        let before = self.objects.len();
        self.objects.retain(|o| !o.is_mesh());
        before - self.objects.len()
    }

    fn link(&mut self, mut object: SceneObject) -> String {
        let name = self.unique_name(&object.name);
        object.name = name.clone();
        if let ObjectData::Mesh(mesh) = &mut object.data {
            mesh.name = name.clone();
        }
        self.objects.push(object);
        name
    }

    fn objects(&self) -> &[SceneObject] {
        &self.objects
    }
}
