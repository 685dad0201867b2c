//! 几何操作错误定义
//!
//! 所有构造和设置器在输入非法时立即失败，绝不静默修正。

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("Zero vector cannot be used as a normal")]
    ZeroNormal,

    #[error("Value must be positive: {0}")]
    NonPositive(&'static str),

    #[error("Width factor out of range [0.01, 100]: {0}")]
    WidthFactorOutOfRange(f64),

    #[error("Oblique angle out of range [-85, 85] degrees: {0}")]
    ObliqueAngleOutOfRange(f64),

    #[error("Spline degree out of range [1, 10]: {0}")]
    InvalidDegree(usize),

    #[error("Not enough control points: required {required}, actual {actual}")]
    NotEnoughControlPoints { required: usize, actual: usize },

    #[error("Weight count mismatch: expected {expected}, actual {actual}")]
    WeightCountMismatch { expected: usize, actual: usize },

    #[error("Knot count mismatch: expected {expected}, actual {actual}")]
    KnotCountMismatch { expected: usize, actual: usize },

    #[error("Curve precision must be at least 2: {0}")]
    InvalidPrecision(usize),

    #[error("Collection must not be empty: {0}")]
    EmptyCollection(&'static str),

    #[error("Not enough vertices: required {required}, actual {actual}")]
    NotEnoughVertices { required: usize, actual: usize },

    #[error("Reference directions became parallel after transform")]
    DegenerateReference,

    #[error("Crease value must be >= 0 or exactly -1: {0}")]
    InvalidCrease(f64),

    #[error("Index out of bounds: {index} (vertex count {count})")]
    IndexOutOfBounds { index: usize, count: usize },

    #[error("Offset must not be negative: {0}")]
    NegativeOffset(f64),

    #[error("Axis ratio out of range (0, 1]: {0}")]
    InvalidAxisRatio(f64),
}
