//! 网格
//!
//! 顶点 + 面索引 + 可选的折痕边。构造时校验所有索引在界内、
//! 折痕值合法；顶点直接保存在 WCS，变换只映射顶点。

use crate::error::GeometryError;
use crate::math::{Matrix3, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// 网格折痕边
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeshEdge {
    /// 起点顶点索引
    pub start: u32,
    /// 终点顶点索引
    pub end: u32,
    crease: f64,
}

impl MeshEdge {
    /// 创建无折痕的边
    pub fn new(start: u32, end: u32) -> Self {
        Self {
            start,
            end,
            crease: 0.0,
        }
    }

    /// 创建带折痕值的边：必须 >= 0，或恰为 -1（始终保留）
    pub fn with_crease(start: u32, end: u32, crease: f64) -> Result<Self, GeometryError> {
        if crease < 0.0 && crease != -1.0 {
            return Err(GeometryError::InvalidCrease(crease));
        }
        Ok(Self { start, end, crease })
    }

    /// 折痕值（-1 表示始终保留）
    pub fn crease(&self) -> f64 {
        self.crease
    }

    /// 是否始终保留
    pub fn is_always_retained(&self) -> bool {
        self.crease == -1.0
    }
}

/// 网格
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mesh {
    /// 顶点（WCS）
    pub vertices: Vec<Point3>,
    /// 面（顶点索引环，至少三个）
    pub faces: Vec<Vec<u32>>,
    /// 折痕边
    pub edges: Vec<MeshEdge>,
}

impl Mesh {
    /// 创建网格并校验索引
    pub fn new(
        vertices: Vec<Point3>,
        faces: Vec<Vec<u32>>,
        edges: Vec<MeshEdge>,
    ) -> Result<Self, GeometryError> {
        if vertices.is_empty() {
            return Err(GeometryError::EmptyCollection("mesh vertices"));
        }
        let count = vertices.len();
        for face in &faces {
            if face.len() < 3 {
                return Err(GeometryError::NotEnoughVertices {
                    required: 3,
                    actual: face.len(),
                });
            }
            for &index in face {
                if index as usize >= count {
                    return Err(GeometryError::IndexOutOfBounds {
                        index: index as usize,
                        count,
                    });
                }
            }
        }
        for edge in &edges {
            for index in [edge.start, edge.end] {
                if index as usize >= count {
                    return Err(GeometryError::IndexOutOfBounds {
                        index: index as usize,
                        count,
                    });
                }
            }
        }
        Ok(Self {
            vertices,
            faces,
            edges,
        })
    }

    /// 顶点数量
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// 面数量
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    pub fn transform_by(&mut self, m: &Matrix3, t: &Vector3) -> Result<(), GeometryError> {
        for v in &mut self.vertices {
            *v = m * *v + t;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quad() -> (Vec<Point3>, Vec<Vec<u32>>) {
        (
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(1.0, 1.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
            ],
            vec![vec![0, 1, 2, 3]],
        )
    }

    #[test]
    fn test_crease_validation() {
        assert!(MeshEdge::with_crease(0, 1, 2.0).is_ok());
        assert!(MeshEdge::with_crease(0, 1, 0.0).is_ok());
        let retained = MeshEdge::with_crease(0, 1, -1.0).unwrap();
        assert!(retained.is_always_retained());
        assert!(matches!(
            MeshEdge::with_crease(0, 1, -0.5),
            Err(GeometryError::InvalidCrease(_))
        ));
    }

    #[test]
    fn test_index_validation() {
        let (vertices, faces) = quad();
        assert!(Mesh::new(vertices.clone(), faces.clone(), vec![MeshEdge::new(0, 7)]).is_err());
        assert!(Mesh::new(vertices.clone(), vec![vec![0, 1, 9]], vec![]).is_err());
        assert!(Mesh::new(vertices.clone(), vec![vec![0, 1]], vec![]).is_err());
        assert!(Mesh::new(vertices, faces, vec![MeshEdge::new(0, 2)]).is_ok());
    }

    #[test]
    fn test_transform_moves_vertices() {
        let (vertices, faces) = quad();
        let mut mesh = Mesh::new(vertices, faces, vec![]).unwrap();
        let m = Matrix3::from_diagonal(&Vector3::new(2.0, 2.0, 2.0));
        mesh.transform_by(&m, &Vector3::new(0.0, 0.0, 5.0)).unwrap();

        assert!((mesh.vertices[2] - Point3::new(2.0, 2.0, 5.0)).norm() < 1e-12);
        // 拓扑不变
        assert_eq!(mesh.face_count(), 1);
    }
}
