//! Named, typed, unit-carrying tensors.

use crate::array::ArrayData;
use crate::data_type::DataType;
use crate::dimension::{Dimension, DimensionKind, MAX_RANK};
use crate::error::{ProductError, Result};

/// A named tensor with declared dimension kinds and an optional unit.
///
/// The shape is immutable except through the named operations
/// `add_dimension` and `resize_dimension`; the data buffer is mutable
/// through `data_mut` and `set_data`. Copies are deep (`Clone`).
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    name: String,
    dimensions: Vec<Dimension>,
    unit: Option<String>,
    data: ArrayData,
}

/// Insert an axis of `length` at a position with the given suffix block
/// size, repeating each block `length` times.
fn broadcast_insert<T: Clone>(old: &[T], suffix: usize, length: usize) -> Vec<T> {
    let prefix_count = if suffix == 0 { 0 } else { old.len() / suffix };
    let mut out = Vec::with_capacity(old.len() * length);
    for p in 0..prefix_count {
        let block = &old[p * suffix..(p + 1) * suffix];
        for _ in 0..length {
            out.extend_from_slice(block);
        }
    }
    out
}

/// Resize one axis, truncating or padding blocks with `fill`.
fn resize_axis<T: Clone>(
    old: &[T],
    outer: usize,
    old_len: usize,
    inner: usize,
    new_len: usize,
    fill: T,
) -> Vec<T> {
    let mut out = Vec::with_capacity(outer * new_len * inner);
    for o in 0..outer {
        let base = o * old_len * inner;
        let keep = old_len.min(new_len);
        out.extend_from_slice(&old[base..base + keep * inner]);
        for _ in keep * inner..new_len * inner {
            out.push(fill.clone());
        }
    }
    out
}

impl Variable {
    /// Create a variable with a fill-initialized buffer.
    ///
    /// Float buffers are NaN-filled, integers zero-filled. Errors with
    /// `InvalidName` for an empty name and `ArrayRankMismatch` when the
    /// rank exceeds `MAX_RANK`.
    pub fn new(
        name: impl Into<String>,
        data_type: DataType,
        dimensions: &[(DimensionKind, usize)],
    ) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(ProductError::InvalidName(
                "variable name is empty".to_string(),
            ));
        }
        if dimensions.len() > MAX_RANK {
            return Err(ProductError::ArrayRankMismatch(format!(
                "variable '{}' has {} dimensions, maximum is {}",
                name,
                dimensions.len(),
                MAX_RANK
            )));
        }
        let dims: Vec<Dimension> = dimensions
            .iter()
            .map(|&(kind, length)| Dimension::new(kind, length))
            .collect();
        let num_elements = dims.iter().map(|d| d.length).product::<usize>();
        Ok(Self {
            name,
            data: ArrayData::filled(data_type, num_elements),
            dimensions: dims,
            unit: None,
        })
    }

    /// Create a `float64` variable directly from values.
    pub fn from_f64(
        name: impl Into<String>,
        dimensions: &[(DimensionKind, usize)],
        values: Vec<f64>,
    ) -> Result<Self> {
        let mut variable = Self::new(name, DataType::Float64, dimensions)?;
        variable.set_data(ArrayData::Float64(values))?;
        Ok(variable)
    }

    /// Set the unit, builder style.
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn data_type(&self) -> DataType {
        self.data.data_type()
    }

    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }

    pub fn set_unit(&mut self, unit: Option<String>) {
        self.unit = unit;
    }

    pub fn dimensions(&self) -> &[Dimension] {
        &self.dimensions
    }

    pub fn num_dimensions(&self) -> usize {
        self.dimensions.len()
    }

    /// The ordered dimension kinds of this variable.
    pub fn dimension_kinds(&self) -> Vec<DimensionKind> {
        self.dimensions.iter().map(|d| d.kind).collect()
    }

    pub fn num_elements(&self) -> usize {
        self.dimensions.iter().map(|d| d.length).product()
    }

    /// Number of axes of the given kind.
    pub fn count_dimension(&self, kind: DimensionKind) -> usize {
        self.dimensions.iter().filter(|d| d.kind == kind).count()
    }

    /// Index of the first axis of the given kind.
    pub fn dimension_index(&self, kind: DimensionKind) -> Option<usize> {
        self.dimensions.iter().position(|d| d.kind == kind)
    }

    /// Whether the ordered dimension kinds equal `kinds`.
    pub fn has_dimension_types(&self, kinds: &[DimensionKind]) -> bool {
        self.dimensions.len() == kinds.len()
            && self.dimensions.iter().zip(kinds).all(|(d, &k)| d.kind == k)
    }

    /// Like `has_dimension_types`, but when `independent_length` is given
    /// every independent axis must also have that length.
    pub fn has_dimension_types_with_length(
        &self,
        kinds: &[DimensionKind],
        independent_length: Option<usize>,
    ) -> bool {
        if !self.has_dimension_types(kinds) {
            return false;
        }
        if let Some(length) = independent_length {
            for dim in &self.dimensions {
                if dim.kind == DimensionKind::Independent && dim.length != length {
                    return false;
                }
            }
        }
        true
    }

    pub fn data(&self) -> &ArrayData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut ArrayData {
        &mut self.data
    }

    /// Replace the data buffer. The new buffer must have the same number
    /// of elements as the variable's shape; the element type may change.
    pub fn set_data(&mut self, data: ArrayData) -> Result<()> {
        if data.len() != self.num_elements() {
            return Err(ProductError::InvalidArgument(format!(
                "data length {} does not match shape of variable '{}' ({} elements)",
                data.len(),
                self.name,
                self.num_elements()
            )));
        }
        self.data = data;
        Ok(())
    }

    /// Convert the element type in place.
    pub fn convert_data_type(&mut self, data_type: DataType) -> Result<()> {
        if self.data_type() == data_type {
            return Ok(());
        }
        self.data = self.data.convert(data_type)?;
        Ok(())
    }

    /// Insert a new axis at `index`, broadcasting existing data along it.
    pub fn add_dimension(
        &mut self,
        index: usize,
        kind: DimensionKind,
        length: usize,
    ) -> Result<()> {
        if self.dimensions.len() >= MAX_RANK {
            return Err(ProductError::ArrayRankMismatch(format!(
                "variable '{}' already has the maximum of {} dimensions",
                self.name, MAX_RANK
            )));
        }
        if index > self.dimensions.len() {
            return Err(ProductError::InvalidIndex(format!(
                "dimension index {} exceeds rank {}",
                index,
                self.dimensions.len()
            )));
        }
        let suffix: usize = self.dimensions[index..].iter().map(|d| d.length).product();
        self.data = match &self.data {
            ArrayData::Int8(v) => ArrayData::Int8(broadcast_insert(v, suffix, length)),
            ArrayData::Int16(v) => ArrayData::Int16(broadcast_insert(v, suffix, length)),
            ArrayData::Int32(v) => ArrayData::Int32(broadcast_insert(v, suffix, length)),
            ArrayData::Float32(v) => ArrayData::Float32(broadcast_insert(v, suffix, length)),
            ArrayData::Float64(v) => ArrayData::Float64(broadcast_insert(v, suffix, length)),
            ArrayData::Str(v) => ArrayData::Str(broadcast_insert(v, suffix, length)),
        };
        self.dimensions.insert(index, Dimension::new(kind, length));
        Ok(())
    }

    /// Resize the axis at `index`, truncating or padding with the fill
    /// value of the element type (NaN for floats).
    pub fn resize_dimension(&mut self, index: usize, new_length: usize) -> Result<()> {
        if index >= self.dimensions.len() {
            return Err(ProductError::InvalidIndex(format!(
                "dimension index {} exceeds rank {}",
                index,
                self.dimensions.len()
            )));
        }
        let old_length = self.dimensions[index].length;
        if old_length == new_length {
            return Ok(());
        }
        let outer: usize = self.dimensions[..index].iter().map(|d| d.length).product();
        let inner: usize = self.dimensions[index + 1..]
            .iter()
            .map(|d| d.length)
            .product();
        self.data = match &self.data {
            ArrayData::Int8(v) => {
                ArrayData::Int8(resize_axis(v, outer, old_length, inner, new_length, 0))
            }
            ArrayData::Int16(v) => {
                ArrayData::Int16(resize_axis(v, outer, old_length, inner, new_length, 0))
            }
            ArrayData::Int32(v) => {
                ArrayData::Int32(resize_axis(v, outer, old_length, inner, new_length, 0))
            }
            ArrayData::Float32(v) => ArrayData::Float32(resize_axis(
                v,
                outer,
                old_length,
                inner,
                new_length,
                f32::NAN,
            )),
            ArrayData::Float64(v) => ArrayData::Float64(resize_axis(
                v,
                outer,
                old_length,
                inner,
                new_length,
                f64::NAN,
            )),
            ArrayData::Str(v) => ArrayData::Str(resize_axis(
                v,
                outer,
                old_length,
                inner,
                new_length,
                String::new(),
            )),
        };
        self.dimensions[index].length = new_length;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_allocates_shape() {
        let v = Variable::new(
            "pressure",
            DataType::Float64,
            &[(DimensionKind::Time, 2), (DimensionKind::Vertical, 3)],
        )
        .unwrap();
        assert_eq!(v.num_elements(), 6);
        assert_eq!(v.num_dimensions(), 2);
        assert!(v.data().get_f64(5).unwrap().is_nan());
    }

    #[test]
    fn test_empty_name_rejected() {
        assert!(matches!(
            Variable::new("", DataType::Float64, &[]),
            Err(ProductError::InvalidName(_))
        ));
    }

    #[test]
    fn test_has_dimension_types() {
        let v = Variable::new(
            "altitude_bounds",
            DataType::Float64,
            &[(DimensionKind::Vertical, 4), (DimensionKind::Independent, 2)],
        )
        .unwrap();
        assert!(v.has_dimension_types(&[DimensionKind::Vertical, DimensionKind::Independent]));
        assert!(!v.has_dimension_types(&[DimensionKind::Vertical]));
        assert!(v.has_dimension_types_with_length(
            &[DimensionKind::Vertical, DimensionKind::Independent],
            Some(2)
        ));
        assert!(!v.has_dimension_types_with_length(
            &[DimensionKind::Vertical, DimensionKind::Independent],
            Some(3)
        ));
    }

    #[test]
    fn test_add_dimension_broadcasts() {
        let mut v = Variable::from_f64(
            "temperature",
            &[(DimensionKind::Vertical, 3)],
            vec![10.0, 20.0, 30.0],
        )
        .unwrap();
        v.add_dimension(0, DimensionKind::Time, 2).unwrap();
        assert!(v.has_dimension_types(&[DimensionKind::Time, DimensionKind::Vertical]));
        assert_eq!(
            v.data().as_f64_slice().unwrap(),
            &[10.0, 20.0, 30.0, 10.0, 20.0, 30.0]
        );
    }

    #[test]
    fn test_resize_dimension_pads_with_nan() {
        let mut v = Variable::from_f64(
            "x",
            &[(DimensionKind::Time, 2), (DimensionKind::Vertical, 2)],
            vec![1.0, 2.0, 3.0, 4.0],
        )
        .unwrap();
        v.resize_dimension(1, 3).unwrap();
        let data = v.data().as_f64_slice().unwrap();
        assert_eq!(data.len(), 6);
        assert_eq!(&data[0..2], &[1.0, 2.0]);
        assert!(data[2].is_nan());
        assert_eq!(&data[3..5], &[3.0, 4.0]);
        assert!(data[5].is_nan());

        v.resize_dimension(1, 1).unwrap();
        assert_eq!(v.data().as_f64_slice().unwrap(), &[1.0, 3.0]);
    }

    #[test]
    fn test_deep_copy() {
        let v = Variable::from_f64("x", &[(DimensionKind::Vertical, 2)], vec![1.0, 2.0]).unwrap();
        let mut copy = v.clone();
        copy.data_mut().set_f64(0, 9.0).unwrap();
        assert_eq!(v.data().get_f64(0).unwrap(), 1.0);
        assert_eq!(copy.data().get_f64(0).unwrap(), 9.0);
    }
}
