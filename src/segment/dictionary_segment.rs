//! The immutable, dictionary-compressed segment kind.

use itertools::Itertools as _;

use crate::error::{StorageError, StorageResult};
use crate::ids::{ValueID, INVALID_VALUE_ID};
use crate::segment::attribute_vector::{AttributeVectorWidth, FittedAttributeVector};
use crate::segment::value_segment::ValueSegment;
use crate::value::{AllTypeVariant, ColumnValue};

/// A sorted, duplicate-free dictionary plus a width-fitted attribute vector of codes into
/// it. Built once from a [`ValueSegment`] snapshot; never mutated afterwards.
///
/// `T` is assumed totally ordered (no NaNs) — the same assumption the reference
/// implementation this is grounded on makes; `partial_cmp` is used throughout but never
/// defensively guarded against returning `None`.
#[derive(Debug, Clone)]
pub struct DictionarySegment<T: ColumnValue> {
    dictionary: Vec<T>,
    attribute_vector: FittedAttributeVector,
}

impl<T: ColumnValue> DictionarySegment<T> {
    /// Builds a dictionary segment from a value segment snapshot. Reads `source` once and
    /// never mutates it.
    pub fn from_value_segment(source: &ValueSegment<T>) -> Self {
        let row_count = source.size();

        let mut sorted: Vec<T> = source.values().to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let dictionary: Vec<T> = sorted.into_iter().dedup().collect();

        debug_assert!(
            dictionary.len() < u32::MAX as usize,
            "dictionary too large to be represented by ValueIDs"
        );

        if row_count > 0 && dictionary.len() == row_count {
            log_once::warn_once!(
                "dictionary compression found no duplicate values across {row_count} rows; the segment won't shrink"
            );
        }

        let width = AttributeVectorWidth::for_dictionary_len(dictionary.len());
        let mut attribute_vector = FittedAttributeVector::new(row_count, width);

        for (row_index, value) in source.values().iter().enumerate() {
            let value_id = Self::lower_bound_in(&dictionary, value);
            attribute_vector
                .set(row_index, value_id)
                .expect("a value's own lower_bound always fits the dictionary's chosen width");
        }

        Self {
            dictionary,
            attribute_vector,
        }
    }

    fn lower_bound_in(dictionary: &[T], value: &T) -> ValueID {
        let index = dictionary.partition_point(|candidate| candidate < value);
        if index == dictionary.len() {
            INVALID_VALUE_ID
        } else {
            ValueID(index as u32)
        }
    }

    pub fn get(&self, index: usize) -> StorageResult<&T> {
        let id = self.attribute_vector.get(index)?;
        self.value_by_value_id(id)
    }

    /// Dereferences a dictionary index with no bounds relaxation: `id` must be a genuine
    /// index into the dictionary, not [`INVALID_VALUE_ID`].
    pub fn value_by_value_id(&self, id: ValueID) -> StorageResult<&T> {
        self.dictionary
            .get(id.0 as usize)
            .ok_or_else(|| StorageError::out_of_range(id.0 as usize, self.dictionary.len()))
    }

    /// The first dictionary index `i` with `dictionary[i] >= value`, or
    /// [`INVALID_VALUE_ID`] if every entry is smaller.
    pub fn lower_bound(&self, value: &T) -> ValueID {
        Self::lower_bound_in(&self.dictionary, value)
    }

    /// The first dictionary index `i` with `dictionary[i] > value`, or
    /// [`INVALID_VALUE_ID`] if every entry is smaller or equal.
    pub fn upper_bound(&self, value: &T) -> ValueID {
        let index = self.dictionary.partition_point(|candidate| candidate <= value);
        if index == self.dictionary.len() {
            INVALID_VALUE_ID
        } else {
            ValueID(index as u32)
        }
    }

    pub fn unique_values_count(&self) -> usize {
        self.dictionary.len()
    }

    pub fn size(&self) -> usize {
        self.attribute_vector.size()
    }

    pub fn dictionary(&self) -> &[T] {
        &self.dictionary
    }

    pub fn attribute_vector(&self) -> &FittedAttributeVector {
        &self.attribute_vector
    }

    /// Dictionary segments are immutable; this always fails.
    pub fn append(&mut self, _value: AllTypeVariant) -> StorageResult<()> {
        Err(StorageError::immutable("dictionary segment"))
    }

    /// The slow, type-erased accessor. Avoid in hot loops — prefer scanning the attribute
    /// vector's codes directly (see [`crate::operator::table_scan`]).
    pub fn at(&self, index: usize) -> StorageResult<AllTypeVariant> {
        self.get(index).map(|v| v.clone().into_variant())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_strings(values: &[&str]) -> DictionarySegment<String> {
        let mut source = ValueSegment::<String>::new();
        for v in values {
            source.append(AllTypeVariant::String((*v).to_string())).unwrap();
        }
        DictionarySegment::from_value_segment(&source)
    }

    fn build_ints(values: &[i32]) -> DictionarySegment<i32> {
        let mut source = ValueSegment::<i32>::new();
        for &v in values {
            source.append(AllTypeVariant::Int(v)).unwrap();
        }
        DictionarySegment::from_value_segment(&source)
    }

    #[test]
    fn compresses_names_into_sorted_unique_dictionary() {
        let dict = build_strings(&["Bill", "Steve", "Alexander", "Steve", "Hasso", "Bill"]);
        assert_eq!(dict.size(), 6);
        assert_eq!(dict.unique_values_count(), 4);
        assert_eq!(
            dict.dictionary(),
            ["Alexander", "Bill", "Hasso", "Steve"]
        );
        for (i, expected) in ["Bill", "Steve", "Alexander", "Steve", "Hasso", "Bill"]
            .iter()
            .enumerate()
        {
            assert_eq!(dict.get(i).unwrap(), expected);
        }
    }

    #[test]
    fn bounds_match_the_worked_example() {
        let dict = build_ints(&[0, 2, 4, 6, 8, 10]);
        assert_eq!(dict.lower_bound(&4).0, 2);
        assert_eq!(dict.upper_bound(&4).0, 3);
        assert_eq!(dict.lower_bound(&5).0, 3);
        assert_eq!(dict.upper_bound(&5).0, 3);
        assert_eq!(dict.lower_bound(&15), INVALID_VALUE_ID);
        assert_eq!(dict.upper_bound(&15), INVALID_VALUE_ID);
    }

    #[test]
    fn append_fails_with_immutable() {
        let mut dict = build_ints(&[1, 2, 3]);
        let err = dict.append(AllTypeVariant::Int(4)).unwrap_err();
        assert!(matches!(err, StorageError::Immutable { .. }));
    }

    #[test]
    fn width_tracks_dictionary_cardinality() {
        let many: Vec<i32> = (0..351).collect();
        let dict = build_ints(&many);
        assert_eq!(dict.attribute_vector().width(), AttributeVectorWidth::W16);
    }
}
