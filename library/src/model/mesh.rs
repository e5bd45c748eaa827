//! Minimal polygon mesh payload used by the mesh-editing nodes.

use std::collections::{BTreeMap, HashMap};

use ordered_float::OrderedFloat;

use crate::cache::hash::HashAccumulator;

pub type Point3 = [OrderedFloat<f64>; 3];

pub fn point(x: f64, y: f64, z: f64) -> Point3 {
    [OrderedFloat(x), OrderedFloat(y), OrderedFloat(z)]
}

/// Axis-aligned bounding box. An empty box has `min > max`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Box3 {
    pub min: Point3,
    pub max: Point3,
}

impl Box3 {
    pub fn empty() -> Self {
        Self {
            min: [OrderedFloat(f64::INFINITY); 3],
            max: [OrderedFloat(f64::NEG_INFINITY); 3],
        }
    }

    pub fn is_empty(&self) -> bool {
        (0..3).any(|i| self.min[i] > self.max[i])
    }

    pub fn extend_by(&mut self, p: &Point3) {
        for i in 0..3 {
            self.min[i] = self.min[i].min(p[i]);
            self.max[i] = self.max[i].max(p[i]);
        }
    }

    pub(crate) fn hash_into(&self, h: &mut HashAccumulator) {
        for i in 0..3 {
            h.append_f64(self.min[i].0).append_f64(self.max[i].0);
        }
    }
}

/// A polygon mesh with per-face integer variables.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Mesh {
    pub points: Vec<Point3>,
    /// Point indices for each face.
    pub faces: Vec<Vec<u32>>,
    /// Per-face ("uniform") variables, one entry per face.
    pub face_variables: BTreeMap<String, Vec<i64>>,
}

impl Mesh {
    pub fn new(points: Vec<Point3>, faces: Vec<Vec<u32>>) -> Self {
        Self {
            points,
            faces,
            face_variables: BTreeMap::new(),
        }
    }

    pub fn with_face_variable(mut self, name: &str, values: Vec<i64>) -> Self {
        self.face_variables.insert(name.to_string(), values);
        self
    }

    pub fn bound(&self) -> Box3 {
        let mut bound = Box3::empty();
        for p in &self.points {
            bound.extend_by(p);
        }
        bound
    }

    /// Removes every face whose entry in `variable` is non-zero, dropping
    /// points no longer referenced by a remaining face.
    pub fn delete_faces(&self, variable: &str) -> Option<Mesh> {
        let flags = self.face_variables.get(variable)?;
        let keep: Vec<usize> = (0..self.faces.len())
            .filter(|&i| flags.get(i).copied().unwrap_or(0) == 0)
            .collect();

        let mut remap: HashMap<u32, u32> = HashMap::new();
        let mut points = Vec::new();
        let mut faces = Vec::with_capacity(keep.len());
        for &face_index in &keep {
            let face = self.faces[face_index]
                .iter()
                .filter_map(|&old| {
                    let p = *self.points.get(old as usize)?;
                    Some(*remap.entry(old).or_insert_with(|| {
                        points.push(p);
                        (points.len() - 1) as u32
                    }))
                })
                .collect();
            faces.push(face);
        }

        let face_variables = self
            .face_variables
            .iter()
            .map(|(name, values)| {
                let kept = keep
                    .iter()
                    .map(|&i| values.get(i).copied().unwrap_or(0))
                    .collect();
                (name.clone(), kept)
            })
            .collect();

        Some(Mesh {
            points,
            faces,
            face_variables,
        })
    }

    pub(crate) fn hash_into(&self, h: &mut HashAccumulator) {
        h.append_u64(self.points.len() as u64);
        for p in &self.points {
            h.append_f64(p[0].0).append_f64(p[1].0).append_f64(p[2].0);
        }
        h.append_u64(self.faces.len() as u64);
        for face in &self.faces {
            h.append_u64(face.len() as u64);
            for &index in face {
                h.append_u64(index as u64);
            }
        }
        h.append_u64(self.face_variables.len() as u64);
        for (name, values) in &self.face_variables {
            h.append_str(name).append_u64(values.len() as u64);
            for &v in values {
                h.append_i64(v);
            }
        }
    }
}
