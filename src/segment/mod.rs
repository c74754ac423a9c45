//! Segment kinds and the type-erased [`Column`] that ties a column's logical type to
//! whichever physical segment kind currently backs it.

pub mod attribute_vector;
pub mod dictionary_segment;
pub mod reference_segment;
pub mod value_segment;

use std::sync::Arc;

use crate::error::StorageResult;
use crate::ids::{ColumnID, PosList};
use crate::table::Table;
use crate::value::{AllTypeVariant, ColumnValue, DataType};

pub use attribute_vector::{AttributeVectorWidth, FittedAttributeVector};
pub use dictionary_segment::DictionarySegment;
pub use reference_segment::ReferenceSegment;
pub use value_segment::ValueSegment;

/// One column's physical storage, tagged by which of the three segment kinds is live.
///
/// A closed match over the three segment kinds, rather than a dynamic downcast onto
/// `ValueSegment<T>`/`DictionarySegment<T>`/`ReferenceSegment`.
#[derive(Debug, Clone)]
pub enum ColumnSegment<T: ColumnValue> {
    Value(ValueSegment<T>),
    Dictionary(DictionarySegment<T>),
    Reference(ReferenceSegment),
}

impl<T: ColumnValue> ColumnSegment<T> {
    fn append(&mut self, value: AllTypeVariant) -> StorageResult<()> {
        match self {
            Self::Value(segment) => segment.append(value),
            Self::Dictionary(_) => Err(crate::error::StorageError::immutable("dictionary segment")),
            Self::Reference(_) => Err(crate::error::StorageError::immutable("reference segment")),
        }
    }

    fn size(&self) -> usize {
        match self {
            Self::Value(segment) => segment.size(),
            Self::Dictionary(segment) => segment.size(),
            Self::Reference(segment) => segment.size(),
        }
    }

    fn at(&self, index: usize) -> StorageResult<AllTypeVariant> {
        match self {
            Self::Value(segment) => segment.at(index),
            Self::Dictionary(segment) => segment.at(index),
            Self::Reference(segment) => segment.at(index),
        }
    }

    fn compress(&self) -> StorageResult<Self> {
        match self {
            Self::Value(segment) => Ok(Self::Dictionary(DictionarySegment::from_value_segment(segment))),
            // Idempotent: re-compressing an already-compressed chunk is a documented no-op.
            Self::Dictionary(segment) => Ok(Self::Dictionary(segment.clone())),
            Self::Reference(_) => Err(crate::error::StorageError::precondition(
                "cannot compress a reference segment",
            )),
        }
    }
}

/// A column's storage, type-tagged by [`DataType`] so that scan dispatch and schema
/// bookkeeping never need a dynamic type check outside this enum's own construction.
#[derive(Debug, Clone)]
pub enum Column {
    Int(ColumnSegment<i32>),
    Float(ColumnSegment<f32>),
    Double(ColumnSegment<f64>),
    String(ColumnSegment<String>),
}

impl Column {
    /// A fresh, empty value-segment column of the given type.
    pub fn empty(data_type: DataType) -> Self {
        match data_type {
            DataType::Int => Self::Int(ColumnSegment::Value(ValueSegment::new())),
            DataType::Float => Self::Float(ColumnSegment::Value(ValueSegment::new())),
            DataType::Double => Self::Double(ColumnSegment::Value(ValueSegment::new())),
            DataType::String => Self::String(ColumnSegment::Value(ValueSegment::new())),
        }
    }

    /// A reference-segment column: late-materialized, pointing at `referenced_table`.
    pub fn reference(
        data_type: DataType,
        referenced_table: Arc<Table>,
        referenced_column_id: ColumnID,
        pos_list: Arc<PosList>,
    ) -> Self {
        let segment = ReferenceSegment::new(referenced_table, referenced_column_id, pos_list);
        match data_type {
            DataType::Int => Self::Int(ColumnSegment::Reference(segment)),
            DataType::Float => Self::Float(ColumnSegment::Reference(segment)),
            DataType::Double => Self::Double(ColumnSegment::Reference(segment)),
            DataType::String => Self::String(ColumnSegment::Reference(segment)),
        }
    }

    pub fn data_type(&self) -> DataType {
        match self {
            Self::Int(_) => DataType::Int,
            Self::Float(_) => DataType::Float,
            Self::Double(_) => DataType::Double,
            Self::String(_) => DataType::String,
        }
    }

    pub fn size(&self) -> usize {
        match self {
            Self::Int(s) => s.size(),
            Self::Float(s) => s.size(),
            Self::Double(s) => s.size(),
            Self::String(s) => s.size(),
        }
    }

    pub fn append(&mut self, value: AllTypeVariant) -> StorageResult<()> {
        match self {
            Self::Int(s) => s.append(value),
            Self::Float(s) => s.append(value),
            Self::Double(s) => s.append(value),
            Self::String(s) => s.append(value),
        }
    }

    /// The slow, type-erased accessor. Kernels reach for [`crate::value::ColumnValue::extract`]
    /// and the segment's own `values()`/attribute-vector accessors instead.
    pub fn at(&self, index: usize) -> StorageResult<AllTypeVariant> {
        match self {
            Self::Int(s) => s.at(index),
            Self::Float(s) => s.at(index),
            Self::Double(s) => s.at(index),
            Self::String(s) => s.at(index),
        }
    }

    /// Builds a dictionary-compressed copy of this column. Only defined for value and
    /// (idempotently) dictionary segments; reference segments never appear in a table
    /// chunk that's a compression candidate.
    pub fn compress(&self) -> StorageResult<Self> {
        match self {
            Self::Int(s) => Ok(Self::Int(s.compress()?)),
            Self::Float(s) => Ok(Self::Float(s.compress()?)),
            Self::Double(s) => Ok(Self::Double(s.compress()?)),
            Self::String(s) => Ok(Self::String(s.compress()?)),
        }
    }
}
