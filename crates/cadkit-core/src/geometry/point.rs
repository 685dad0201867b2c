//! 点和线段

use crate::error::GeometryError;
use crate::geometry::{transformed_normal, validated_normal};
use crate::math::{Matrix3, Point3, Vector3};
use serde::{Deserialize, Serialize};

/// 点
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Point {
    /// 位置（WCS）
    pub position: Point3,
    normal: Vector3,
}

impl Point {
    pub fn new(position: Point3) -> Self {
        Self {
            position,
            normal: Vector3::z(),
        }
    }

    /// 法向量（单位向量）
    pub fn normal(&self) -> &Vector3 {
        &self.normal
    }

    /// 设置法向量，零向量立即失败
    pub fn set_normal(&mut self, normal: Vector3) -> Result<(), GeometryError> {
        self.normal = validated_normal(normal)?;
        Ok(())
    }

    pub fn transform_by(&mut self, m: &Matrix3, t: &Vector3) -> Result<(), GeometryError> {
        self.normal = transformed_normal(m, &self.normal);
        self.position = m * self.position + t;
        Ok(())
    }
}

/// 线段
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Line {
    pub start: Point3,
    pub end: Point3,
    normal: Vector3,
}

impl Line {
    pub fn new(start: Point3, end: Point3) -> Self {
        Self {
            start,
            end,
            normal: Vector3::z(),
        }
    }

    /// 用已校验的单位法向量创建（多段线分解用）
    pub(crate) fn with_normal(start: Point3, end: Point3, normal: Vector3) -> Self {
        Self { start, end, normal }
    }

    /// 计算线段长度
    pub fn length(&self) -> f64 {
        (self.end - self.start).norm()
    }

    /// 计算线段方向向量（单位向量）
    pub fn direction(&self) -> Vector3 {
        (self.end - self.start).normalize()
    }

    /// 计算线段中点
    pub fn midpoint(&self) -> Point3 {
        Point3::from((self.start.coords + self.end.coords) / 2.0)
    }

    /// 法向量（单位向量）
    pub fn normal(&self) -> &Vector3 {
        &self.normal
    }

    /// 设置法向量，零向量立即失败
    pub fn set_normal(&mut self, normal: Vector3) -> Result<(), GeometryError> {
        self.normal = validated_normal(normal)?;
        Ok(())
    }

    pub fn transform_by(&mut self, m: &Matrix3, t: &Vector3) -> Result<(), GeometryError> {
        self.normal = transformed_normal(m, &self.normal);
        self.start = m * self.start + t;
        self.end = m * self.end + t;
        Ok(())
    }
}
