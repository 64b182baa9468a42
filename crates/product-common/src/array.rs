//! Tagged storage for variable data.
//!
//! A variable's payload is a dense row-major buffer over one of the
//! supported element types. The tagged variant replaces a dynamic type
//! switch: coercions convert between variants, and numeric access goes
//! through `f64` views.

use crate::data_type::DataType;
use crate::error::{ProductError, Result};

/// Dense row-major storage, tagged by element type.
#[derive(Debug, Clone, PartialEq)]
pub enum ArrayData {
    Int8(Vec<i8>),
    Int16(Vec<i16>),
    Int32(Vec<i32>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    Str(Vec<String>),
}

impl ArrayData {
    /// Allocate a zero-filled buffer of the given type and length.
    ///
    /// Floating-point buffers are filled with NaN, the fill value used
    /// throughout the toolkit; integer buffers with zero; string buffers
    /// with empty strings.
    pub fn filled(data_type: DataType, len: usize) -> Self {
        match data_type {
            DataType::Int8 => ArrayData::Int8(vec![0; len]),
            DataType::Int16 => ArrayData::Int16(vec![0; len]),
            DataType::Int32 => ArrayData::Int32(vec![0; len]),
            DataType::Float32 => ArrayData::Float32(vec![f32::NAN; len]),
            DataType::Float64 => ArrayData::Float64(vec![f64::NAN; len]),
            DataType::Str => ArrayData::Str(vec![String::new(); len]),
        }
    }

    /// The element type tag of this buffer.
    pub fn data_type(&self) -> DataType {
        match self {
            ArrayData::Int8(_) => DataType::Int8,
            ArrayData::Int16(_) => DataType::Int16,
            ArrayData::Int32(_) => DataType::Int32,
            ArrayData::Float32(_) => DataType::Float32,
            ArrayData::Float64(_) => DataType::Float64,
            ArrayData::Str(_) => DataType::Str,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            ArrayData::Int8(v) => v.len(),
            ArrayData::Int16(v) => v.len(),
            ArrayData::Int32(v) => v.len(),
            ArrayData::Float32(v) => v.len(),
            ArrayData::Float64(v) => v.len(),
            ArrayData::Str(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read one element as `f64`.
    ///
    /// Errors with `InvalidType` for string data and `ArrayOutOfBounds`
    /// for a bad index.
    pub fn get_f64(&self, index: usize) -> Result<f64> {
        if index >= self.len() {
            return Err(ProductError::ArrayOutOfBounds(format!(
                "index {} exceeds length {}",
                index,
                self.len()
            )));
        }
        match self {
            ArrayData::Int8(v) => Ok(v[index] as f64),
            ArrayData::Int16(v) => Ok(v[index] as f64),
            ArrayData::Int32(v) => Ok(v[index] as f64),
            ArrayData::Float32(v) => Ok(v[index] as f64),
            ArrayData::Float64(v) => Ok(v[index]),
            ArrayData::Str(_) => Err(ProductError::invalid_type(
                "cannot read string data as float",
            )),
        }
    }

    /// Write one element from `f64`, narrowing as needed.
    pub fn set_f64(&mut self, index: usize, value: f64) -> Result<()> {
        if index >= self.len() {
            return Err(ProductError::ArrayOutOfBounds(format!(
                "index {} exceeds length {}",
                index,
                self.len()
            )));
        }
        match self {
            ArrayData::Int8(v) => v[index] = value as i8,
            ArrayData::Int16(v) => v[index] = value as i16,
            ArrayData::Int32(v) => v[index] = value as i32,
            ArrayData::Float32(v) => v[index] = value as f32,
            ArrayData::Float64(v) => v[index] = value,
            ArrayData::Str(_) => {
                return Err(ProductError::invalid_type(
                    "cannot write float into string data",
                ))
            }
        }
        Ok(())
    }

    /// Borrow the buffer as `&[f64]`, available only for `Float64` data.
    pub fn as_f64_slice(&self) -> Option<&[f64]> {
        match self {
            ArrayData::Float64(v) => Some(v),
            _ => None,
        }
    }

    /// Borrow the buffer as `&mut [f64]`, available only for `Float64` data.
    pub fn as_f64_slice_mut(&mut self) -> Option<&mut [f64]> {
        match self {
            ArrayData::Float64(v) => Some(v),
            _ => None,
        }
    }

    /// Borrow the buffer as `&[String]`, available only for string data.
    pub fn as_str_slice(&self) -> Option<&[String]> {
        match self {
            ArrayData::Str(v) => Some(v),
            _ => None,
        }
    }

    /// Convert the buffer to another element type.
    ///
    /// Numeric-to-numeric conversions go through `f64`; conversions
    /// between string and numeric data are rejected with `InvalidType`.
    pub fn convert(&self, data_type: DataType) -> Result<ArrayData> {
        if self.data_type() == data_type {
            return Ok(self.clone());
        }
        if !self.data_type().is_numeric() || !data_type.is_numeric() {
            return Err(ProductError::InvalidType(format!(
                "cannot convert {} data to {}",
                self.data_type(),
                data_type
            )));
        }
        let mut out = ArrayData::filled(data_type, self.len());
        for i in 0..self.len() {
            out.set_f64(i, self.get_f64(i)?)?;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filled_uses_nan_for_floats() {
        let a = ArrayData::filled(DataType::Float64, 3);
        assert_eq!(a.len(), 3);
        assert!(a.get_f64(0).unwrap().is_nan());

        let b = ArrayData::filled(DataType::Int16, 2);
        assert_eq!(b.get_f64(1).unwrap(), 0.0);
    }

    #[test]
    fn test_convert_numeric() {
        let a = ArrayData::Int32(vec![1, 2, 3]);
        let b = a.convert(DataType::Float64).unwrap();
        assert_eq!(b.data_type(), DataType::Float64);
        assert_eq!(b.get_f64(2).unwrap(), 3.0);
    }

    #[test]
    fn test_convert_string_rejected() {
        let a = ArrayData::Str(vec!["x".to_string()]);
        assert!(matches!(
            a.convert(DataType::Float64),
            Err(ProductError::InvalidType(_))
        ));
    }

    #[test]
    fn test_out_of_bounds() {
        let a = ArrayData::Float32(vec![1.0]);
        assert!(matches!(
            a.get_f64(1),
            Err(ProductError::ArrayOutOfBounds(_))
        ));
    }
}
