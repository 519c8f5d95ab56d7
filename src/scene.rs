use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;

use glam::{Mat4, Quat, Vec2, Vec3};
use log::debug;

use crate::config::ConfiguratorConfig;
use crate::door::DoorAssembly;
use crate::geometry::{Geometry, GeometryId, Primitive, Transform};
use crate::material::{color_from_hex, Material, TextureRole};
use crate::texture::{TextureId, TextureProvider, WrapMode};

/// Name of the prop that is hidden while the reflection capture runs.
pub const REFLECTIVE_PROP: &str = "cylinder";

/// Static object owned by the scene.
#[derive(Debug, Clone)]
pub struct SceneNode {
    pub name: String,
    pub geometry: Arc<Geometry>,
    pub material: Material,
    pub transform: Transform,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
    pub visible: bool,
}

impl SceneNode {
    fn new(name: &str, primitive: Primitive, material: Material, transform: Transform) -> Self {
        Self {
            name: name.to_string(),
            geometry: Geometry::new(primitive),
            material,
            transform,
            cast_shadow: false,
            receive_shadow: false,
            visible: true,
        }
    }

    fn shadows(mut self, cast: bool, receive: bool) -> Self {
        self.cast_shadow = cast;
        self.receive_shadow = receive;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowSettings {
    pub map_size: u32,
    pub near: f32,
    pub far: f32,
    pub extent: f32,
}

/// Sun-like light shining from `position` towards `target`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub position: Vec3,
    pub target: Vec3,
    pub color: Vec3,
    pub intensity: f32,
    pub cast_shadow: bool,
    pub shadow: ShadowSettings,
}

impl DirectionalLight {
    /// Unit vector pointing from the lit surface towards the light.
    pub fn direction(&self) -> Vec3 {
        (self.position - self.target).normalize_or_zero()
    }

    /// Orthographic light space transform used by the shadow pass.
    pub fn view_proj(&self) -> Mat4 {
        let e = self.shadow.extent;
        let projection = Mat4::orthographic_rh(-e, e, -e, e, self.shadow.near, self.shadow.far);
        projection * Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }
}

/// Six-face capture camera feeding the environment map of reflective props.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReflectionProbe {
    pub position: Vec3,
    pub resolution: u32,
    pub near: f32,
    pub far: f32,
}

impl ReflectionProbe {
    pub const FACE_COUNT: usize = 6;

    /// View-projection for cube face `face` in +X, -X, +Y, -Y, +Z, -Z order.
    pub fn face_view_proj(&self, face: usize) -> Mat4 {
        let (forward, up) = match face {
            0 => (Vec3::X, Vec3::NEG_Y),
            1 => (Vec3::NEG_X, Vec3::NEG_Y),
            2 => (Vec3::Y, Vec3::Z),
            3 => (Vec3::NEG_Y, Vec3::NEG_Z),
            4 => (Vec3::Z, Vec3::NEG_Y),
            _ => (Vec3::NEG_Z, Vec3::NEG_Y),
        };
        let view = Mat4::look_at_rh(self.position, self.position + forward, up);
        Mat4::perspective_rh(FRAC_PI_2, 1.0, self.near, self.far) * view
    }
}

/// Loaded texture handles for each [`TextureRole`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvironmentTextures {
    pub wood: TextureId,
    pub tile: TextureId,
    pub wall: TextureId,
}

impl EnvironmentTextures {
    /// Starts loading every environment texture. Returns immediately.
    pub fn request(provider: &mut TextureProvider, config: &ConfiguratorConfig) -> Self {
        let assets = &config.assets;
        Self {
            wood: provider.request(&assets.wood, WrapMode::Repeat),
            tile: provider.request(&assets.tile, WrapMode::Repeat),
            wall: provider.request(&assets.wall, WrapMode::ClampToEdge),
        }
    }

    pub fn get(&self, role: TextureRole) -> TextureId {
        match role {
            TextureRole::Wood => self.wood,
            TextureRole::Tile => self.tile,
            TextureRole::Wall => self.wall,
        }
    }
}

/// One object ready to draw, with its world transform resolved.
#[derive(Debug, Clone, Copy)]
pub struct DrawItem<'a> {
    pub name: &'a str,
    pub geometry: &'a Arc<Geometry>,
    pub material: &'a Material,
    pub model: Mat4,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

/// The room: static environment, lights, reflection probe and the one door slot.
#[derive(Debug)]
pub struct Scene {
    nodes: Vec<SceneNode>,
    door: Option<DoorAssembly>,
    ambient: AmbientLight,
    sun: DirectionalLight,
    probe: ReflectionProbe,
    textures: EnvironmentTextures,
}

impl Scene {
    /// Builds the static environment. The door slot starts empty.
    pub fn compose(textures: EnvironmentTextures, config: &ConfiguratorConfig) -> Self {
        let floor = SceneNode::new(
            "floor",
            Primitive::Plane {
                width: 20.0,
                height: 20.0,
            },
            Material::textured(TextureRole::Tile, Vec2::splat(config.assets.tile_repeat)),
            Transform::from_translation(Vec3::new(0.0, -2.0, 0.0))
                .with_rotation(Quat::from_rotation_x(-FRAC_PI_2)),
        )
        .shadows(false, true);

        let wall = SceneNode::new(
            "wall",
            Primitive::Plane {
                width: 20.0,
                height: 10.0,
            },
            Material::textured(TextureRole::Wall, Vec2::ONE),
            Transform::from_translation(Vec3::new(0.0, 3.0, -5.0)),
        )
        .shadows(false, true);

        let cylinder = SceneNode::new(
            REFLECTIVE_PROP,
            Primitive::cylinder(0.5, 2.0, 32),
            Material::reflective(),
            Transform::from_translation(Vec3::new(-1.0, -1.0, 2.0)),
        )
        .shadows(true, true);

        let pyramid = SceneNode::new(
            "pyramid",
            Primitive::Cone {
                radius: 0.75,
                height: 1.5,
                segments: 4,
            },
            Material::flat(0x0000ff),
            Transform::from_translation(Vec3::new(1.0, -1.25, 2.0)),
        )
        .shadows(true, true);

        let render = &config.render;
        Self {
            nodes: vec![floor, wall, cylinder, pyramid],
            door: None,
            ambient: AmbientLight {
                color: color_from_hex(0x404040),
            },
            sun: DirectionalLight {
                position: Vec3::new(5.0, 10.0, 7.5),
                target: Vec3::ZERO,
                color: Vec3::ONE,
                intensity: 1.0,
                cast_shadow: true,
                shadow: ShadowSettings {
                    map_size: render.shadow_map_size,
                    near: 0.5,
                    far: 50.0,
                    extent: render.shadow_extent,
                },
            },
            probe: ReflectionProbe {
                position: Vec3::ZERO,
                resolution: render.reflection_resolution,
                near: 1.0,
                far: 1000.0,
            },
            textures,
        }
    }

    /// Swaps the door. The previous assembly is detached before the new one
    /// attaches and is handed back so its resources can be released.
    pub fn replace_door(&mut self, door: DoorAssembly) -> Option<DoorAssembly> {
        let previous = self.door.take();
        if let Some(old) = &previous {
            debug!(
                "detached door {}x{}",
                old.spec().width,
                old.spec().height
            );
        }
        self.door = Some(door);
        previous
    }

    pub fn door(&self) -> Option<&DoorAssembly> {
        self.door.as_ref()
    }

    pub fn nodes(&self) -> &[SceneNode] {
        &self.nodes
    }

    pub fn node(&self, name: &str) -> Option<&SceneNode> {
        self.nodes.iter().find(|node| node.name == name)
    }

    /// Returns false when no node has that name.
    pub fn set_visible(&mut self, name: &str, visible: bool) -> bool {
        match self.nodes.iter_mut().find(|node| node.name == name) {
            Some(node) => {
                node.visible = visible;
                true
            }
            None => false,
        }
    }

    pub fn ambient(&self) -> &AmbientLight {
        &self.ambient
    }

    pub fn sun(&self) -> &DirectionalLight {
        &self.sun
    }

    pub fn probe(&self) -> &ReflectionProbe {
        &self.probe
    }

    pub fn textures(&self) -> &EnvironmentTextures {
        &self.textures
    }

    /// Visible objects with world matrices, static nodes first then door parts.
    pub fn draw_list(&self) -> Vec<DrawItem<'_>> {
        let nodes = self
            .nodes
            .iter()
            .filter(|node| node.visible)
            .map(|node| DrawItem {
                name: &node.name,
                geometry: &node.geometry,
                material: &node.material,
                model: node.transform.matrix(),
                cast_shadow: node.cast_shadow,
                receive_shadow: node.receive_shadow,
            });
        let door = self.door.iter().flat_map(|door| {
            let origin = door.transform().matrix();
            door.parts().iter().map(move |part| DrawItem {
                name: part.kind.name(),
                geometry: &part.geometry,
                material: &part.material,
                model: origin * part.transform.matrix(),
                cast_shadow: part.cast_shadow,
                receive_shadow: part.receive_shadow,
            })
        });
        nodes.chain(door).collect()
    }
}

/// GPU resources detached from the scene that the renderer still has to free.
#[derive(Debug, Default)]
pub struct ReleaseQueue {
    geometries: Vec<GeometryId>,
}

impl ReleaseQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues every geometry owned by a detached door. Textures are shared and stay.
    pub fn push_door(&mut self, door: &DoorAssembly) {
        for id in door.geometry_ids() {
            if !self.geometries.contains(&id) {
                self.geometries.push(id);
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.geometries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.geometries.len()
    }

    pub fn drain(&mut self) -> Vec<GeometryId> {
        std::mem::take(&mut self.geometries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::door::generate;
    use crate::texture::{Completions, TextureSource};

    struct NoopSource;

    impl TextureSource for NoopSource {
        fn start(&self, _id: TextureId, _path: &str, _completions: Completions) {}
    }

    fn scene() -> Scene {
        let config = ConfiguratorConfig::default();
        let mut provider = TextureProvider::new(Box::new(NoopSource));
        let textures = EnvironmentTextures::request(&mut provider, &config);
        Scene::compose(textures, &config)
    }

    #[test]
    fn environment_is_composed_once_without_a_door() {
        let scene = scene();
        let names: Vec<&str> = scene.nodes().iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["floor", "wall", "cylinder", "pyramid"]);
        assert!(scene.door().is_none());
        assert!(scene.node("floor").unwrap().receive_shadow);
        assert!(!scene.node("floor").unwrap().cast_shadow);
        assert!(scene.node(REFLECTIVE_PROP).unwrap().material.env_map);
        assert_eq!(scene.sun().shadow.map_size, 512);
    }

    #[test]
    fn floor_lies_flat_at_floor_level() {
        let scene = scene();
        let floor = scene.node("floor").unwrap();
        let bounds = floor
            .geometry
            .mesh()
            .bounds()
            .unwrap()
            .transformed(floor.transform.matrix());
        assert!((bounds.min.y + 2.0).abs() < 1e-5);
        assert!((bounds.max.y + 2.0).abs() < 1e-5);
        assert!((bounds.size().x - 20.0).abs() < 1e-4);
        assert!((bounds.size().z - 20.0).abs() < 1e-4);
    }

    #[test]
    fn floor_tiles_repeat_from_config() {
        let mut config = ConfiguratorConfig::default();
        config.assets.tile_repeat = 8.0;
        let mut provider = TextureProvider::new(Box::new(NoopSource));
        let textures = EnvironmentTextures::request(&mut provider, &config);
        let scene = Scene::compose(textures, &config);

        let floor = &scene.node("floor").unwrap().material;
        assert_eq!(floor.texture, Some(TextureRole::Tile));
        assert_eq!(floor.uv_repeat, Vec2::splat(8.0));
        assert_eq!(provider.wrap(textures.tile), Some(WrapMode::Repeat));
        assert_eq!(provider.wrap(textures.wall), Some(WrapMode::ClampToEdge));
    }

    #[test]
    fn replacing_the_door_returns_the_previous_one() {
        let mut scene = scene();
        assert!(scene.replace_door(generate(2.0, 4.0).unwrap()).is_none());
        let old = scene.replace_door(generate(3.0, 4.0).unwrap()).unwrap();
        assert_eq!(old.spec().width, 2.0);
        assert_eq!(scene.door().unwrap().spec().width, 3.0);
        assert_eq!(scene.draw_list().len(), 4 + 6);
    }

    #[test]
    fn hidden_nodes_are_not_drawn() {
        let mut scene = scene();
        scene.replace_door(generate(2.0, 4.0).unwrap());
        assert!(scene.set_visible(REFLECTIVE_PROP, false));
        let items = scene.draw_list();
        assert!(items.iter().all(|item| item.name != REFLECTIVE_PROP));
        assert_eq!(items.len(), 9);
        assert!(!scene.set_visible("missing", false));
    }

    #[test]
    fn door_parts_are_drawn_in_world_space() {
        let mut scene = scene();
        scene.replace_door(generate(2.0, 6.0).unwrap());
        let items = scene.draw_list();
        let panel = items.iter().find(|item| item.name == "panel").unwrap();
        let center = panel.model.transform_point3(Vec3::ZERO);
        assert!((center.y - 1.0).abs() < 1e-5);
    }

    #[test]
    fn release_queue_collects_unique_geometries() {
        let mut queue = ReleaseQueue::new();
        let door = generate(2.0, 4.0).unwrap();
        queue.push_door(&door);
        queue.push_door(&door);
        assert_eq!(queue.len(), 4);
        assert_eq!(queue.drain(), door.geometry_ids());
        assert!(queue.is_empty());
    }

    #[test]
    fn light_transform_keeps_the_floor_in_view() {
        let scene = scene();
        let view_proj = scene.sun().view_proj();
        for corner in [Vec3::new(-5.0, -2.0, -5.0), Vec3::new(5.0, -2.0, 5.0)] {
            let clip = view_proj.project_point3(corner);
            assert!(clip.x.abs() <= 1.0 && clip.y.abs() <= 1.0);
            assert!((0.0..=1.0).contains(&clip.z));
        }
    }

    #[test]
    fn reflection_faces_look_along_each_axis() {
        let probe = scene().probe;
        let ahead = probe.face_view_proj(0).project_point3(Vec3::new(10.0, 0.0, 0.0));
        assert!(ahead.x.abs() < 1e-4 && ahead.y.abs() < 1e-4);
        let below = probe.face_view_proj(3).project_point3(Vec3::new(0.0, -10.0, 0.0));
        assert!(below.x.abs() < 1e-4 && below.y.abs() < 1e-4);
    }
}
