//! The closed column-type enumeration and the tagged value that flows across schema
//! boundaries.
//!
//! Runtime dispatch on a dynamic `AllTypeVariant` is confined to schema boundaries
//! (`Table::add_column`), via a closed tagged union plus a small dispatch table keyed on the
//! type-name string. Every hot path (segment construction, the scan kernels) is
//! monomorphized over the `ColumnValue` trait instead.

use std::fmt;

use crate::error::{StorageError, StorageResult};
use crate::segment::{Column, ColumnSegment};

/// The closed set of column types this kernel understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    Int,
    Float,
    Double,
    String,
}

impl DataType {
    /// The type-name string used by `Table::add_column` and by `from_name`.
    pub fn name(self) -> &'static str {
        match self {
            Self::Int => "int",
            Self::Float => "float",
            Self::Double => "double",
            Self::String => "string",
        }
    }

    /// Looks up a type by its schema-facing name. This is the one place in the crate where
    /// type dispatch happens by string rather than by generic parameter.
    pub fn from_name(name: &str) -> StorageResult<Self> {
        match name {
            "int" => Ok(Self::Int),
            "float" => Ok(Self::Float),
            "double" => Ok(Self::Double),
            "string" => Ok(Self::String),
            other => Err(StorageError::precondition(format!(
                "unknown column type name '{other}'"
            ))),
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A tagged value belonging to one of the closed set of [`DataType`]s.
#[derive(Debug, Clone, PartialEq)]
pub enum AllTypeVariant {
    Int(i32),
    Float(f32),
    Double(f64),
    String(String),
}

impl AllTypeVariant {
    pub fn data_type(&self) -> DataType {
        match self {
            Self::Int(_) => DataType::Int,
            Self::Float(_) => DataType::Float,
            Self::Double(_) => DataType::Double,
            Self::String(_) => DataType::String,
        }
    }
}

impl fmt::Display for AllTypeVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::String(v) => write!(f, "{v}"),
        }
    }
}

/// A concrete storage type backing one segment kind.
///
/// This is the monomorphization seam: every kernel (segment append, dictionary build,
/// scan comparison) is generic over `T: ColumnValue` and gets specialized per the four
/// variants of [`DataType`] rather than going through a dynamic `AllTypeVariant` per value.
///
/// Total ordering is assumed (the kernel never guards against NaN, matching the reference
/// implementation it's grounded on); see `lower_bound`/`upper_bound` in
/// [`crate::segment::dictionary_segment`].
pub trait ColumnValue: Clone + PartialOrd + fmt::Debug + Send + Sync + 'static {
    const DATA_TYPE: DataType;

    fn into_variant(self) -> AllTypeVariant;
    fn from_variant(value: AllTypeVariant) -> StorageResult<Self>;

    /// Downcasts a type-erased [`Column`] to the segment storage for this type.
    fn extract(column: &Column) -> StorageResult<&ColumnSegment<Self>>;
}

impl ColumnValue for i32 {
    const DATA_TYPE: DataType = DataType::Int;

    fn into_variant(self) -> AllTypeVariant {
        AllTypeVariant::Int(self)
    }

    fn from_variant(value: AllTypeVariant) -> StorageResult<Self> {
        match value {
            AllTypeVariant::Int(v) => Ok(v),
            other => Err(StorageError::type_mismatch(Self::DATA_TYPE, other.data_type())),
        }
    }

    fn extract(column: &Column) -> StorageResult<&ColumnSegment<Self>> {
        match column {
            Column::Int(segment) => Ok(segment),
            other => Err(StorageError::type_mismatch(Self::DATA_TYPE, other.data_type())),
        }
    }
}

impl ColumnValue for f32 {
    const DATA_TYPE: DataType = DataType::Float;

    fn into_variant(self) -> AllTypeVariant {
        AllTypeVariant::Float(self)
    }

    fn from_variant(value: AllTypeVariant) -> StorageResult<Self> {
        match value {
            AllTypeVariant::Float(v) => Ok(v),
            other => Err(StorageError::type_mismatch(Self::DATA_TYPE, other.data_type())),
        }
    }

    fn extract(column: &Column) -> StorageResult<&ColumnSegment<Self>> {
        match column {
            Column::Float(segment) => Ok(segment),
            other => Err(StorageError::type_mismatch(Self::DATA_TYPE, other.data_type())),
        }
    }
}

impl ColumnValue for f64 {
    const DATA_TYPE: DataType = DataType::Double;

    fn into_variant(self) -> AllTypeVariant {
        AllTypeVariant::Double(self)
    }

    fn from_variant(value: AllTypeVariant) -> StorageResult<Self> {
        match value {
            AllTypeVariant::Double(v) => Ok(v),
            other => Err(StorageError::type_mismatch(Self::DATA_TYPE, other.data_type())),
        }
    }

    fn extract(column: &Column) -> StorageResult<&ColumnSegment<Self>> {
        match column {
            Column::Double(segment) => Ok(segment),
            other => Err(StorageError::type_mismatch(Self::DATA_TYPE, other.data_type())),
        }
    }
}

impl ColumnValue for String {
    const DATA_TYPE: DataType = DataType::String;

    fn into_variant(self) -> AllTypeVariant {
        AllTypeVariant::String(self)
    }

    fn from_variant(value: AllTypeVariant) -> StorageResult<Self> {
        match value {
            AllTypeVariant::String(v) => Ok(v),
            other => Err(StorageError::type_mismatch(Self::DATA_TYPE, other.data_type())),
        }
    }

    fn extract(column: &Column) -> StorageResult<&ColumnSegment<Self>> {
        match column {
            Column::String(segment) => Ok(segment),
            other => Err(StorageError::type_mismatch(Self::DATA_TYPE, other.data_type())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_type_name_round_trips() {
        for ty in [DataType::Int, DataType::Float, DataType::Double, DataType::String] {
            assert_eq!(DataType::from_name(ty.name()).unwrap(), ty);
        }
    }

    #[test]
    fn from_variant_rejects_mismatched_type() {
        let err = i32::from_variant(AllTypeVariant::String("x".into())).unwrap_err();
        assert_eq!(
            err,
            StorageError::TypeMismatch {
                expected: DataType::Int,
                got: DataType::String
            }
        );
    }
}
