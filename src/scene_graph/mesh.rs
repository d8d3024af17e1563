use anyhow::bail;
use glam::DVec3;
use id_arena::Id;
use itertools::Itertools;

use crate::fbx::Property;

pub type MeshId = Id<Mesh>;

/// Element type of the `Vertices` array the mesh was loaded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlPointPrecision {
    F32,
    F64,
}

/// Mesh geometry attribute. Only the control points are decoded; everything else stays in the
/// document untouched.
pub struct Mesh {
    pub name: String,
    pub fbx_id: i64,
    control_points: Vec<DVec3>,
    precision: ControlPointPrecision,
    dirty: bool,
}

impl Mesh {
    pub fn new(
        name: impl Into<String>,
        fbx_id: i64,
        control_points: Vec<DVec3>,
        precision: ControlPointPrecision,
    ) -> Self {
        Self {
            name: name.into(),
            fbx_id,
            control_points,
            precision,
            dirty: false,
        }
    }

    pub fn from_vertices_property(
        name: impl Into<String>,
        fbx_id: i64,
        vertices: &Property,
    ) -> anyhow::Result<Self> {
        let name = name.into();
        let (values, precision): (Vec<f64>, _) = match vertices {
            Property::F64Array(values) => (values.clone(), ControlPointPrecision::F64),
            Property::F32Array(values) => (
                values.iter().map(|&v| f64::from(v)).collect(),
                ControlPointPrecision::F32,
            ),
            other => bail!(
                "Vertices of mesh {} have type '{}', expected a float array",
                name,
                other.type_code() as char
            ),
        };

        if values.len() % 3 != 0 {
            bail!(
                "Vertices of mesh {} hold {} values, not a multiple of 3",
                name,
                values.len()
            );
        }

        let control_points = values
            .into_iter()
            .tuples()
            .map(|(x, y, z)| DVec3::new(x, y, z))
            .collect();

        Ok(Self::new(name, fbx_id, control_points, precision))
    }

    pub fn control_points(&self) -> &[DVec3] {
        &self.control_points
    }

    pub fn control_points_count(&self) -> usize {
        self.control_points.len()
    }

    /// Replaces every control point. The count must not change.
    pub fn set_control_points(&mut self, control_points: Vec<DVec3>) -> anyhow::Result<()> {
        if control_points.len() != self.control_points.len() {
            bail!(
                "Mesh {} has {} control points, refusing to write {}",
                self.name,
                self.control_points.len(),
                control_points.len()
            );
        }

        self.control_points = control_points;
        self.dirty = true;

        Ok(())
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn to_vertices_property(&self) -> Property {
        let values = self.control_points.iter().flat_map(|point| point.to_array());

        match self.precision {
            ControlPointPrecision::F64 => Property::F64Array(values.collect()),
            ControlPointPrecision::F32 => Property::F32Array(values.map(|v| v as f32).collect()),
        }
    }
}
