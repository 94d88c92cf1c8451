//! Sidecar binary mesh loader.
//!
//! Landscape and rolling-stock geometry is split across the XML document
//! (which carries the `Subset`/material/texture bookkeeping) and a packed
//! binary file referenced from it, one fixed-size record per vertex and per
//! face. This mirrors the companion layout the generated `Vertex` record's
//! children-before-attributes field order exists to match, without tying
//! the binary reader to that generated type — the two are independent
//! encodings of the same geometry.
//!
//! Uses `memmap2` for zero-copy access to a fixed-width binary layout rather
//! than reading the whole file into a buffer up front.

use std::fs::File;
use std::path::Path;

use memmap2::Mmap;
use rootcause::prelude::*;

use crate::error::{MeshError, MeshErrorReport};

pub const VERTEX_RECORD_SIZE: usize = 40;
pub const FACE_RECORD_SIZE: usize = 6;

/// One packed vertex: position, normal, texture coordinates, and a packed
/// diffuse color, totalling 40 bytes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub u: f32,
    pub v: f32,
    pub color: u32,
}

/// One packed triangle: three vertex indices into the same file's vertex
/// block, totalling 6 bytes — the same three-`u16` shape as `FaceIndexes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshFace {
    pub indices: [u16; 3],
}

#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub vertices: Vec<MeshVertex>,
    pub faces: Vec<MeshFace>,
}

/// Loads a mesh file whose layout is a vertex block followed by a face
/// block, each a whole number of fixed-size records. The split point
/// between the two blocks isn't recoverable from the file alone — callers
/// pass `vertex_count`, read from the referencing XML element.
pub fn load_mesh(path: &Path, vertex_count: usize) -> Result<Mesh, MeshErrorReport> {
    let file = File::open(path).map_err(MeshError::from).attach(format!("opening {}", path.display()))?;
    // SAFETY: the mapped file is read-only and not expected to be mutated
    // concurrently by another process while this parser runs.
    let mapping = unsafe { Mmap::map(&file) }.map_err(MeshError::from).attach(format!("mapping {}", path.display()))?;

    let vertex_bytes = vertex_count * VERTEX_RECORD_SIZE;
    if mapping.len() < vertex_bytes {
        return Err(MeshError::MisalignedLength { len: mapping.len(), record_size: VERTEX_RECORD_SIZE }.into());
    }

    let face_region = &mapping[vertex_bytes..];
    if face_region.len() % FACE_RECORD_SIZE != 0 {
        return Err(MeshError::MisalignedLength { len: face_region.len(), record_size: FACE_RECORD_SIZE }.into());
    }

    let vertices = mapping[..vertex_bytes].chunks_exact(VERTEX_RECORD_SIZE).map(read_vertex).collect();
    let faces = face_region.chunks_exact(FACE_RECORD_SIZE).map(read_face).collect();

    Ok(Mesh { vertices, faces })
}

fn read_f32(bytes: &[u8]) -> f32 {
    f32::from_le_bytes(bytes.try_into().expect("4-byte slice"))
}

fn read_u16(bytes: &[u8]) -> u16 {
    u16::from_le_bytes(bytes.try_into().expect("2-byte slice"))
}

fn read_u32(bytes: &[u8]) -> u32 {
    u32::from_le_bytes(bytes.try_into().expect("4-byte slice"))
}

fn read_vertex(record: &[u8]) -> MeshVertex {
    MeshVertex {
        position: [read_f32(&record[0..4]), read_f32(&record[4..8]), read_f32(&record[8..12])],
        normal: [read_f32(&record[12..16]), read_f32(&record[16..20]), read_f32(&record[20..24])],
        u: read_f32(&record[24..28]),
        v: read_f32(&record[28..32]),
        color: read_u32(&record[32..36]),
        // bytes 36..40 are reserved/padding and intentionally unread.
    }
}

fn read_face(record: &[u8]) -> MeshFace {
    MeshFace { indices: [read_u16(&record[0..2]), read_u16(&record[2..4]), read_u16(&record[4..6])] }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn vertex_bytes(v: &MeshVertex) -> [u8; VERTEX_RECORD_SIZE] {
        let mut out = [0u8; VERTEX_RECORD_SIZE];
        out[0..4].copy_from_slice(&v.position[0].to_le_bytes());
        out[4..8].copy_from_slice(&v.position[1].to_le_bytes());
        out[8..12].copy_from_slice(&v.position[2].to_le_bytes());
        out[12..16].copy_from_slice(&v.normal[0].to_le_bytes());
        out[16..20].copy_from_slice(&v.normal[1].to_le_bytes());
        out[20..24].copy_from_slice(&v.normal[2].to_le_bytes());
        out[24..28].copy_from_slice(&v.u.to_le_bytes());
        out[28..32].copy_from_slice(&v.v.to_le_bytes());
        out[32..36].copy_from_slice(&v.color.to_le_bytes());
        out
    }

    fn face_bytes(f: &MeshFace) -> [u8; FACE_RECORD_SIZE] {
        let mut out = [0u8; FACE_RECORD_SIZE];
        out[0..2].copy_from_slice(&f.indices[0].to_le_bytes());
        out[2..4].copy_from_slice(&f.indices[1].to_le_bytes());
        out[4..6].copy_from_slice(&f.indices[2].to_le_bytes());
        out
    }

    #[test]
    fn round_trips_a_small_mesh() {
        let v0 = MeshVertex { position: [0.0, 0.0, 0.0], normal: [0.0, 1.0, 0.0], u: 0.0, v: 0.0, color: 0xFFFFFFFF };
        let v1 = MeshVertex { position: [1.0, 0.0, 0.0], normal: [0.0, 1.0, 0.0], u: 1.0, v: 0.0, color: 0xFFFFFFFF };
        let v2 = MeshVertex { position: [0.0, 1.0, 0.0], normal: [0.0, 1.0, 0.0], u: 0.0, v: 1.0, color: 0xFFFFFFFF };
        let face = MeshFace { indices: [0, 1, 2] };

        let mut bytes = Vec::new();
        bytes.extend_from_slice(&vertex_bytes(&v0));
        bytes.extend_from_slice(&vertex_bytes(&v1));
        bytes.extend_from_slice(&vertex_bytes(&v2));
        bytes.extend_from_slice(&face_bytes(&face));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&bytes).unwrap();

        let mesh = load_mesh(file.path(), 3).unwrap();
        assert_eq!(mesh.vertices, vec![v0, v1, v2]);
        assert_eq!(mesh.faces, vec![face]);
    }

    #[test]
    fn rejects_a_misaligned_face_block() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[0u8; VERTEX_RECORD_SIZE + 3]).unwrap();

        let err = load_mesh(file.path(), 1).unwrap_err();
        assert!(err.to_string().contains("not a whole number"));
    }
}
