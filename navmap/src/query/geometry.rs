//! Airspace boundary geometry.
//!
//! Boundaries keep their outline out-of-line in a `geometry` blob: a
//! big-endian `u32` point count followed by that many big-endian `f32`
//! longitude/latitude pairs. Blobs are decoded on first access and memoized
//! per boundary id.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use bytes::Buf;
use thiserror::Error;

use super::memo::{BoundedMemo, MemoStats};
use crate::geo::Pos;

/// Decoded boundary outline.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LineString {
    pub points: Vec<Pos>,
}

impl LineString {
    pub fn new(points: Vec<Pos>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Encode into the blob layout read by [`decode`].
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(4 + self.points.len() * 8);
        out.extend_from_slice(&(self.points.len() as u32).to_be_bytes());
        for p in &self.points {
            out.extend_from_slice(&(p.lon as f32).to_be_bytes());
            out.extend_from_slice(&(p.lat as f32).to_be_bytes());
        }
        out
    }
}

/// Why a geometry blob could not be decoded.
#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("geometry blob is empty")]
    Empty,

    #[error("geometry blob truncated: {points} points need {needed} bytes, {available} available")]
    Truncated {
        points: u32,
        needed: usize,
        available: usize,
    },

    #[error("geometry blob has {0} trailing bytes")]
    TrailingBytes(usize),
}

/// Decode a geometry blob.
pub fn decode(blob: &[u8]) -> Result<LineString, GeometryError> {
    let mut buf = blob;
    if buf.remaining() < 4 {
        return Err(GeometryError::Empty);
    }

    let count = buf.get_u32();
    let needed = count as usize * 8;
    if buf.remaining() < needed {
        return Err(GeometryError::Truncated {
            points: count,
            needed,
            available: buf.remaining(),
        });
    }

    let mut points = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let lon = buf.get_f32();
        let lat = buf.get_f32();
        points.push(Pos::new(f64::from(lon), f64::from(lat)));
    }

    if buf.has_remaining() {
        return Err(GeometryError::TrailingBytes(buf.remaining()));
    }

    Ok(LineString { points })
}

/// Decoded outlines by boundary id, LRU-bounded.
///
/// Failures decode to an empty outline which is cached like any other, so a
/// corrupt blob is only looked at once.
pub struct GeometryCache {
    memo: BoundedMemo<LineString>,
    decodes: AtomicU64,
}

impl GeometryCache {
    pub fn new(capacity: u64) -> Self {
        Self {
            memo: BoundedMemo::new(capacity),
            decodes: AtomicU64::new(0),
        }
    }

    /// Outline of boundary `id`.
    ///
    /// `load` is only called on a miss and returns the raw blob, or `None`
    /// when the boundary does not exist.
    pub fn get_or_decode(
        &self,
        id: i64,
        load: impl FnOnce() -> Option<Vec<u8>>,
    ) -> Arc<LineString> {
        self.memo.get_or_insert_with(id, || {
            self.decodes.fetch_add(1, Ordering::Relaxed);
            match load() {
                Some(blob) => decode(&blob).unwrap_or_else(|e| {
                    tracing::warn!(boundary_id = id, error = %e, "Cannot decode boundary geometry");
                    LineString::default()
                }),
                None => {
                    tracing::debug!(boundary_id = id, "No geometry for boundary");
                    LineString::default()
                }
            }
        })
    }

    /// Number of blobs decoded since construction.
    pub fn decode_count(&self) -> u64 {
        self.decodes.load(Ordering::Relaxed)
    }

    pub fn contains(&self, id: i64) -> bool {
        self.memo.contains(id)
    }

    pub fn clear(&self) {
        self.memo.clear();
    }

    pub fn stats(&self) -> MemoStats {
        self.memo.stats()
    }
}
