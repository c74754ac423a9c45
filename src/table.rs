//! A named, schema'd collection of chunks.

use std::sync::Arc;

use ahash::HashMap;
use parking_lot::{Mutex, RwLock};
use tracing::debug;

use crate::chunk::Chunk;
use crate::error::{StorageError, StorageResult};
use crate::ids::ColumnID;
use crate::segment::Column;
use crate::value::{AllTypeVariant, DataType};

struct Schema {
    names: Vec<String>,
    types: Vec<DataType>,
    ids_by_name: HashMap<String, ColumnID>,
}

impl Schema {
    fn new() -> Self {
        Self {
            names: Vec::new(),
            types: Vec::new(),
            ids_by_name: HashMap::default(),
        }
    }
}

/// A table: a schema, an ordered non-empty list of chunks, and the chunk-size policy that
/// governs when [`Table::append`] rolls over to a new chunk.
///
/// Every chunk but the last is either a frozen value chunk or dictionary-compressed; the
/// last chunk is always mutable. Chunks are held behind a lock so that
/// [`Table::compress_chunk`] can atomically swap one slot without disturbing readers
/// holding an `Arc` to the chunk it replaces.
pub struct Table {
    schema: RwLock<Schema>,
    chunks: RwLock<Vec<Arc<Chunk>>>,
    /// Per-chunk "compression done" flags, indexed like `chunks`. The mutex's critical
    /// section covers only the check-and-mark; the dictionary build itself runs outside it.
    compressed: Mutex<Vec<bool>>,
    chunk_size: u32,
}

impl Table {
    /// The default chunk size: the largest `ChunkOffset` minus one, leaving the maximum
    /// value free as a sentinel for callers that widen offsets.
    pub const DEFAULT_CHUNK_SIZE: u32 = u32::MAX - 1;

    pub fn new(chunk_size: Option<u32>) -> Self {
        Self {
            schema: RwLock::new(Schema::new()),
            chunks: RwLock::new(vec![Arc::new(Chunk::new())]),
            compressed: Mutex::new(vec![false]),
            chunk_size: chunk_size.unwrap_or(Self::DEFAULT_CHUNK_SIZE),
        }
    }

    pub fn add_column(&self, name: impl Into<String>, data_type: DataType) -> StorageResult<ColumnID> {
        let name = name.into();
        let mut schema = self.schema.write();
        if schema.ids_by_name.contains_key(&name) {
            return Err(StorageError::duplicate_name(name));
        }
        let column_id = ColumnID(schema.names.len() as u16);
        schema.names.push(name.clone());
        schema.types.push(data_type);
        schema.ids_by_name.insert(name, column_id);

        for chunk in self.chunks.read().iter() {
            chunk.add_segment(Column::empty(data_type))?;
        }
        Ok(column_id)
    }

    pub fn append(&self, row: Vec<AllTypeVariant>) -> StorageResult<()> {
        let tail = self.chunks.read().last().expect("table always has at least one chunk").clone();
        if tail.size() < self.chunk_size as usize {
            return tail.append(row);
        }

        // The tail is full: seal it and roll over to a fresh chunk under the write lock so
        // concurrent appenders can't both decide to create a new tail.
        let mut chunks = self.chunks.write();
        let tail = chunks.last().expect("table always has at least one chunk").clone();
        if tail.size() < self.chunk_size as usize {
            drop(chunks);
            return tail.append(row);
        }

        tail.freeze();
        let new_chunk = Chunk::new();
        for &data_type in &self.schema.read().types {
            new_chunk.add_segment(Column::empty(data_type))?;
        }
        new_chunk.append(row)?;
        chunks.push(Arc::new(new_chunk));
        self.compressed.lock().push(false);
        Ok(())
    }

    /// Dictionary-compresses the chunk at `chunk_id`. Fails if `chunk_id` names the tail
    /// chunk, which is always mutable and therefore never a compression candidate.
    /// Idempotent: a second call on an already-compressed chunk returns `Ok(())` without
    /// rebuilding anything.
    pub fn compress_chunk(&self, chunk_id: crate::ids::ChunkID) -> StorageResult<()> {
        let index = chunk_id.0 as usize;
        let chunk_count = self.chunks.read().len();
        if index + 1 >= chunk_count {
            return Err(StorageError::precondition(
                "cannot compress the tail chunk, which is always mutable",
            ));
        }

        {
            let mut flags = self.compressed.lock();
            if flags[index] {
                debug!(chunk = index, "chunk already compressed, skipping");
                return Ok(());
            }
            flags[index] = true;
        }

        let old_chunk = self.chunks.read()[index].clone();
        let column_count = old_chunk.column_count();
        let new_chunk = Chunk::new();
        for i in 0..column_count {
            let compressed_column = old_chunk.segment(ColumnID(i as u16))?.compress()?;
            new_chunk.add_segment(compressed_column)?;
        }
        new_chunk.freeze();

        self.chunks.write()[index] = Arc::new(new_chunk);
        debug!(chunk = index, "compressed chunk");
        Ok(())
    }

    /// Installs `chunk` as the table's data. If the table currently holds exactly one
    /// empty chunk, `chunk` replaces it in place; otherwise it's appended as a new chunk.
    pub fn emplace_chunk(&self, chunk: Chunk) {
        let mut chunks = self.chunks.write();
        if chunks.len() == 1 && chunks[0].size() == 0 {
            chunks[0] = Arc::new(chunk);
        } else {
            chunks.push(Arc::new(chunk));
            self.compressed.lock().push(false);
        }
    }

    pub fn column_count(&self) -> usize {
        self.schema.read().names.len()
    }

    pub fn row_count(&self) -> usize {
        self.chunks.read().iter().map(|c| c.size()).sum()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.read().len()
    }

    pub fn column_name(&self, column_id: ColumnID) -> StorageResult<String> {
        let schema = self.schema.read();
        schema
            .names
            .get(column_id.0 as usize)
            .cloned()
            .ok_or_else(|| StorageError::out_of_range(column_id.0 as usize, schema.names.len()))
    }

    pub fn column_type(&self, column_id: ColumnID) -> StorageResult<DataType> {
        let schema = self.schema.read();
        schema
            .types
            .get(column_id.0 as usize)
            .copied()
            .ok_or_else(|| StorageError::out_of_range(column_id.0 as usize, schema.types.len()))
    }

    pub fn column_id_by_name(&self, name: &str) -> StorageResult<ColumnID> {
        self.schema
            .read()
            .ids_by_name
            .get(name)
            .copied()
            .ok_or_else(|| StorageError::not_found(name))
    }

    pub fn chunk_size(&self) -> u32 {
        self.chunk_size
    }

    pub fn column_names(&self) -> Vec<String> {
        self.schema.read().names.clone()
    }

    pub fn get_chunk(&self, chunk_id: crate::ids::ChunkID) -> StorageResult<Arc<Chunk>> {
        let chunks = self.chunks.read();
        chunks
            .get(chunk_id.0 as usize)
            .cloned()
            .ok_or_else(|| StorageError::out_of_range(chunk_id.0 as usize, chunks.len()))
    }
}
