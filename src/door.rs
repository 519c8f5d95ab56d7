//! Parametric door generator.
//!
//! [`generate`] maps a width and height to a six part [`DoorAssembly`]: a
//! wood textured center panel, four frame beams of constant thickness and a
//! cylindrical handle. The assembly is positioned so that its lowest point
//! always touches the floor plane, whatever its height. Nothing here touches
//! the scene; callers decide where the assembly goes.

use std::f32::consts::FRAC_PI_2;
use std::sync::Arc;

use glam::{Quat, Vec2, Vec3};
use serde::{Deserialize, Serialize};

use crate::error::{Dimension, DoorError};
use crate::geometry::{Aabb, Geometry, GeometryId, Primitive, Transform};
use crate::material::{Material, TextureRole};

/// Thickness of the frame beams, independent of the door size.
pub const FRAME_THICKNESS: f32 = 0.1;
/// Depth of the panel and frame boxes.
pub const PANEL_DEPTH: f32 = 0.05;
/// Distance from the world origin down to the floor plane.
pub const FLOOR_OFFSET: f32 = 2.0;

pub const HANDLE_RADIUS: f32 = 0.05;
pub const HANDLE_LENGTH: f32 = 0.2;
pub const HANDLE_SEGMENTS: u32 = 32;
/// Gap between the inner edge of the right beam and the handle center.
pub const HANDLE_INSET: f32 = 0.1;
/// Forward offset that puts the handle in front of the panel.
pub const HANDLE_DEPTH_OFFSET: f32 = 0.05;

pub const FRAME_COLOR: u32 = 0x654321;
pub const HANDLE_COLOR: u32 = 0xcccccc;

/// Wood texels per world unit are kept constant by dividing the panel size by this.
const WOOD_TILE_SIZE: f32 = 2.0;

/// Requested outer door size.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DoorSpec {
    pub width: f32,
    pub height: f32,
}

impl Default for DoorSpec {
    fn default() -> Self {
        Self {
            width: 2.0,
            height: 4.0,
        }
    }
}

impl DoorSpec {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Smallest exclusive value either dimension may take.
    pub fn minimum() -> f32 {
        2.0 * FRAME_THICKNESS
    }

    pub fn get(&self, dimension: Dimension) -> f32 {
        match dimension {
            Dimension::Width => self.width,
            Dimension::Height => self.height,
        }
    }

    pub fn with(mut self, dimension: Dimension, value: f32) -> Self {
        match dimension {
            Dimension::Width => self.width = value,
            Dimension::Height => self.height = value,
        }
        self
    }

    pub fn validate(&self) -> Result<(), DoorError> {
        check_dimension(Dimension::Width, self.width)?;
        check_dimension(Dimension::Height, self.height)
    }
}

fn check_dimension(dimension: Dimension, value: f32) -> Result<(), DoorError> {
    let minimum = DoorSpec::minimum();
    if value.is_finite() && value > minimum {
        Ok(())
    } else {
        Err(DoorError::InvalidDimension {
            dimension,
            value,
            minimum,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartKind {
    Panel,
    TopFrame,
    BottomFrame,
    LeftFrame,
    RightFrame,
    Handle,
}

impl PartKind {
    pub const ALL: [PartKind; 6] = [
        PartKind::Panel,
        PartKind::TopFrame,
        PartKind::BottomFrame,
        PartKind::LeftFrame,
        PartKind::RightFrame,
        PartKind::Handle,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Panel => "panel",
            Self::TopFrame => "top-frame",
            Self::BottomFrame => "bottom-frame",
            Self::LeftFrame => "left-frame",
            Self::RightFrame => "right-frame",
            Self::Handle => "handle",
        }
    }
}

/// One renderable piece of the door, placed relative to the assembly origin.
#[derive(Debug, Clone)]
pub struct DoorPart {
    pub kind: PartKind,
    pub geometry: Arc<Geometry>,
    pub material: Material,
    pub transform: Transform,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
}

impl DoorPart {
    fn new(kind: PartKind, geometry: &Arc<Geometry>, material: Material, position: Vec3) -> Self {
        Self {
            kind,
            geometry: Arc::clone(geometry),
            material,
            transform: Transform::from_translation(position),
            cast_shadow: true,
            receive_shadow: true,
        }
    }

    pub fn primitive(&self) -> &Primitive {
        self.geometry.primitive()
    }
}

/// A fully assembled door ready to be attached to a scene.
#[derive(Debug, Clone)]
pub struct DoorAssembly {
    spec: DoorSpec,
    parts: Vec<DoorPart>,
    transform: Transform,
}

impl DoorAssembly {
    pub fn spec(&self) -> DoorSpec {
        self.spec
    }

    pub fn parts(&self) -> &[DoorPart] {
        &self.parts
    }

    pub fn part(&self, kind: PartKind) -> Option<&DoorPart> {
        self.parts.iter().find(|part| part.kind == kind)
    }

    /// Placement of the assembly origin in the world.
    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Width and height of the center panel.
    pub fn panel_extents(&self) -> Vec2 {
        Vec2::new(
            self.spec.width - 2.0 * FRAME_THICKNESS,
            self.spec.height - 2.0 * FRAME_THICKNESS,
        )
    }

    /// World space bounds over every part.
    pub fn world_bounds(&self) -> Aabb {
        let assembly = self.transform.matrix();
        self.parts
            .iter()
            .filter_map(|part| {
                let local = part.geometry.mesh().bounds()?;
                Some(local.transformed(assembly * part.transform.matrix()))
            })
            .reduce(|a, b| a.union(&b))
            .unwrap_or(Aabb {
                min: self.transform.translation,
                max: self.transform.translation,
            })
    }

    /// Distinct geometries referenced by the parts. The two horizontal and the
    /// two vertical beams share one geometry each.
    pub fn geometry_ids(&self) -> Vec<GeometryId> {
        let mut ids: Vec<GeometryId> = self.parts.iter().map(|p| p.geometry.id()).collect();
        ids.sort();
        ids.dedup();
        ids
    }
}

/// Builds a door of the given outer size.
///
/// Fails with [`DoorError::InvalidDimension`] when either value is not finite
/// or not larger than twice the frame thickness, instead of producing an
/// inverted panel.
pub fn generate(width: f32, height: f32) -> Result<DoorAssembly, DoorError> {
    let spec = DoorSpec::new(width, height);
    spec.validate()?;

    let t = FRAME_THICKNESS;
    let panel_size = Vec2::new(width - 2.0 * t, height - 2.0 * t);

    let panel_geometry = Geometry::new(Primitive::Box {
        width: panel_size.x,
        height: panel_size.y,
        depth: PANEL_DEPTH,
    });
    let panel_material = Material::textured(TextureRole::Wood, panel_size / WOOD_TILE_SIZE);

    let horizontal = Geometry::new(Primitive::Box {
        width,
        height: t,
        depth: PANEL_DEPTH,
    });
    let vertical = Geometry::new(Primitive::Box {
        width: t,
        height,
        depth: PANEL_DEPTH,
    });
    let frame_material = Material::flat(FRAME_COLOR);
    let beam_y = height / 2.0 - t / 2.0;
    let beam_x = width / 2.0 - t / 2.0;

    let handle_geometry = Geometry::new(Primitive::cylinder(
        HANDLE_RADIUS,
        HANDLE_LENGTH,
        HANDLE_SEGMENTS,
    ));
    let mut handle = DoorPart::new(
        PartKind::Handle,
        &handle_geometry,
        Material::flat(HANDLE_COLOR),
        Vec3::new(width / 2.0 - t - HANDLE_INSET, 0.0, HANDLE_DEPTH_OFFSET),
    );
    handle.transform = handle
        .transform
        .with_rotation(Quat::from_rotation_z(FRAC_PI_2));

    let parts = vec![
        DoorPart::new(PartKind::Panel, &panel_geometry, panel_material, Vec3::ZERO),
        DoorPart::new(
            PartKind::TopFrame,
            &horizontal,
            frame_material,
            Vec3::new(0.0, beam_y, 0.0),
        ),
        DoorPart::new(
            PartKind::BottomFrame,
            &horizontal,
            frame_material,
            Vec3::new(0.0, -beam_y, 0.0),
        ),
        DoorPart::new(
            PartKind::LeftFrame,
            &vertical,
            frame_material,
            Vec3::new(-beam_x, 0.0, 0.0),
        ),
        DoorPart::new(
            PartKind::RightFrame,
            &vertical,
            frame_material,
            Vec3::new(beam_x, 0.0, 0.0),
        ),
        handle,
    ];

    Ok(DoorAssembly {
        spec,
        parts,
        transform: Transform::from_translation(Vec3::new(0.0, height / 2.0 - FLOOR_OFFSET, 0.0)),
    })
}
