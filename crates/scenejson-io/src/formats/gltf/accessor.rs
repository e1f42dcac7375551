//! Typed reads from glTF accessors.
//!
//! Every read validates the accessor's byte range against its buffer view
//! and buffer before touching any bytes, so the decoders below can index
//! without further checks.

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::error::{ImportError, Result};

use super::schema::{
    self, Accessor, Gltf, COMPONENT_BYTE, COMPONENT_FLOAT, COMPONENT_SHORT,
    COMPONENT_UNSIGNED_BYTE, COMPONENT_UNSIGNED_INT, COMPONENT_UNSIGNED_SHORT,
};

/// Loaded buffer contents, indexed like `Gltf::buffers`.
pub type Buffers = [Vec<u8>];

/// A validated strided byte range.
struct Strided<'a> {
    bytes: &'a [u8],
    start: usize,
    stride: usize,
}

impl<'a> Strided<'a> {
    fn element(&self, i: usize) -> &'a [u8] {
        &self.bytes[self.start + i * self.stride..]
    }
}

/// Components an accessor without a buffer view may zero-fill. Its size
/// is otherwise bounded by nothing in the file.
const MAX_UNBACKED_COMPONENTS: usize = 1 << 26;

fn accessor(gltf: &Gltf, index: usize) -> Result<&Accessor> {
    gltf.accessors
        .get(index)
        .ok_or_else(|| ImportError::InvalidData(format!("invalid accessor {}", index)))
}

fn overflow(what: &str) -> ImportError {
    ImportError::InvalidData(format!("{} overflows the address space", what))
}

/// `offset..offset + length`, or an error when the end does not fit.
fn byte_range(offset: usize, length: usize, what: &str) -> Result<std::ops::Range<usize>> {
    let end = offset.checked_add(length).ok_or_else(|| overflow(what))?;
    Ok(offset..end)
}

/// Resolve `count` elements of `element_size` bytes starting at
/// `byte_offset` inside buffer view `view_index`.
fn strided<'a>(
    gltf: &Gltf,
    buffers: &'a Buffers,
    view_index: usize,
    byte_offset: usize,
    count: usize,
    element_size: usize,
) -> Result<Strided<'a>> {
    let view = gltf
        .buffer_views
        .get(view_index)
        .ok_or_else(|| ImportError::InvalidData(format!("invalid buffer view {}", view_index)))?;

    let buffer = buffers
        .get(view.buffer)
        .ok_or_else(|| ImportError::InvalidData(format!("invalid buffer {}", view.buffer)))?;

    let stride = view.byte_stride.unwrap_or(element_size);
    if stride < element_size {
        return Err(ImportError::InvalidData(format!(
            "buffer view {} stride {} is smaller than element size {}",
            view_index, stride, element_size
        )));
    }

    let view_range = byte_range(view.byte_offset, view.byte_length, "buffer view")?;
    if view_range.end > buffer.len() {
        return Err(ImportError::InvalidData("buffer view out of bounds".into()));
    }

    let start = view_range
        .start
        .checked_add(byte_offset)
        .ok_or_else(|| overflow("accessor offset"))?;
    if count > 0 {
        let end = (count - 1)
            .checked_mul(stride)
            .and_then(|span| span.checked_add(element_size))
            .and_then(|span| span.checked_add(start))
            .ok_or_else(|| overflow("accessor range"))?;
        if end > view_range.end {
            return Err(ImportError::InvalidData("accessor data out of bounds".into()));
        }
    }

    Ok(Strided {
        bytes: buffer,
        start,
        stride,
    })
}

/// Decode every component of an accessor with `decode`, in element order.
///
/// An accessor without a buffer view starts out as `zero`. Sparse
/// substitutions are applied afterwards.
fn decode_components<T: Copy>(
    gltf: &Gltf,
    buffers: &Buffers,
    accessor: &Accessor,
    zero: T,
    decode: impl Fn(&[u8]) -> T,
) -> Result<Vec<T>> {
    let components = accessor.component_count();
    let size = accessor.component_size();
    let element_size = components * size;
    let total = accessor
        .count
        .checked_mul(components)
        .ok_or_else(|| overflow("accessor count"))?;

    let mut values = match accessor.buffer_view {
        Some(view_index) => {
            // Validated before allocating: `total` is now bounded by the buffer.
            let data = strided(
                gltf,
                buffers,
                view_index,
                accessor.byte_offset,
                accessor.count,
                element_size,
            )?;
            let mut values = Vec::with_capacity(total);
            for i in 0..accessor.count {
                let element = data.element(i);
                values.extend((0..components).map(|c| decode(&element[c * size..])));
            }
            values
        }
        None if total > MAX_UNBACKED_COMPONENTS => {
            return Err(ImportError::InvalidData(format!(
                "accessor without buffer view declares {} elements",
                accessor.count
            )));
        }
        None => vec![zero; total],
    };

    if let Some(sparse) = &accessor.sparse {
        let index_size = schema::component_size(sparse.indices.component_type);
        let targets = strided(
            gltf,
            buffers,
            sparse.indices.buffer_view,
            sparse.indices.byte_offset,
            sparse.count,
            index_size,
        )?;
        let replacements = strided(
            gltf,
            buffers,
            sparse.values.buffer_view,
            sparse.values.byte_offset,
            sparse.count,
            element_size,
        )?;

        for k in 0..sparse.count {
            let target = decode_u32(targets.element(k), sparse.indices.component_type) as usize;
            if target >= accessor.count {
                return Err(ImportError::InvalidData(format!(
                    "sparse index {} out of range for accessor of {} elements",
                    target, accessor.count
                )));
            }
            let element = replacements.element(k);
            for c in 0..components {
                values[target * components + c] = decode(&element[c * size..]);
            }
        }
    }

    Ok(values)
}

/// Decode one component as a float, applying normalization for integer types.
fn decode_f32(bytes: &[u8], component_type: u32, normalized: bool) -> f32 {
    match component_type {
        COMPONENT_BYTE => {
            let v = bytes[0] as i8 as f32;
            if normalized { (v / 127.0).max(-1.0) } else { v }
        }
        COMPONENT_UNSIGNED_BYTE => {
            let v = bytes[0] as f32;
            if normalized { v / 255.0 } else { v }
        }
        COMPONENT_SHORT => {
            let v = i16::from_le_bytes([bytes[0], bytes[1]]) as f32;
            if normalized { (v / 32767.0).max(-1.0) } else { v }
        }
        COMPONENT_UNSIGNED_SHORT => {
            let v = u16::from_le_bytes([bytes[0], bytes[1]]) as f32;
            if normalized { v / 65535.0 } else { v }
        }
        COMPONENT_UNSIGNED_INT => {
            u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f32
        }
        _ => f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
    }
}

/// Decode one integer component.
fn decode_u32(bytes: &[u8], component_type: u32) -> u32 {
    match component_type {
        COMPONENT_BYTE | COMPONENT_UNSIGNED_BYTE => bytes[0] as u32,
        COMPONENT_SHORT | COMPONENT_UNSIGNED_SHORT => {
            u16::from_le_bytes([bytes[0], bytes[1]]) as u32
        }
        COMPONENT_FLOAT => f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as u32,
        _ => u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]),
    }
}

fn expect_type(accessor: &Accessor, index: usize, allowed: &[&str]) -> Result<()> {
    if allowed.contains(&accessor.accessor_type.as_str()) {
        Ok(())
    } else {
        Err(ImportError::InvalidData(format!(
            "accessor {}: expected {}, got {}",
            index,
            allowed.join(" or "),
            accessor.accessor_type
        )))
    }
}

/// Read an accessor as flat floats. Returns the component count alongside.
pub fn read_floats(gltf: &Gltf, buffers: &Buffers, index: usize) -> Result<(usize, Vec<f32>)> {
    let accessor = accessor(gltf, index)?;
    let (ct, normalized) = (accessor.component_type, accessor.normalized);
    let values = decode_components(gltf, buffers, accessor, 0.0, |b| decode_f32(b, ct, normalized))?;
    Ok((accessor.component_count(), values))
}

/// Read an integer accessor as flat `u32`s. Returns the component count
/// alongside.
pub fn read_uints(gltf: &Gltf, buffers: &Buffers, index: usize) -> Result<(usize, Vec<u32>)> {
    let accessor = accessor(gltf, index)?;
    let ct = accessor.component_type;
    let values = decode_components(gltf, buffers, accessor, 0, |b| decode_u32(b, ct))?;
    Ok((accessor.component_count(), values))
}

pub fn read_scalars(gltf: &Gltf, buffers: &Buffers, index: usize) -> Result<Vec<f32>> {
    expect_type(accessor(gltf, index)?, index, &["SCALAR"])?;
    Ok(read_floats(gltf, buffers, index)?.1)
}

pub fn read_vec2(gltf: &Gltf, buffers: &Buffers, index: usize) -> Result<Vec<Vec2>> {
    expect_type(accessor(gltf, index)?, index, &["VEC2"])?;
    let (_, values) = read_floats(gltf, buffers, index)?;
    Ok(values.chunks_exact(2).map(Vec2::from_slice).collect())
}

pub fn read_vec3(gltf: &Gltf, buffers: &Buffers, index: usize) -> Result<Vec<Vec3>> {
    expect_type(accessor(gltf, index)?, index, &["VEC3"])?;
    let (_, values) = read_floats(gltf, buffers, index)?;
    Ok(values.chunks_exact(3).map(Vec3::from_slice).collect())
}

pub fn read_vec4(gltf: &Gltf, buffers: &Buffers, index: usize) -> Result<Vec<Vec4>> {
    expect_type(accessor(gltf, index)?, index, &["VEC4"])?;
    let (_, values) = read_floats(gltf, buffers, index)?;
    Ok(values.chunks_exact(4).map(Vec4::from_slice).collect())
}

/// Read RGB or RGBA colors; RGB gets an opaque alpha.
pub fn read_colors(gltf: &Gltf, buffers: &Buffers, index: usize) -> Result<Vec<Vec4>> {
    expect_type(accessor(gltf, index)?, index, &["VEC3", "VEC4"])?;
    let (components, values) = read_floats(gltf, buffers, index)?;
    Ok(values
        .chunks_exact(components)
        .map(|c| match c {
            &[r, g, b] => Vec4::new(r, g, b, 1.0),
            _ => Vec4::from_slice(c),
        })
        .collect())
}

/// Read column-major 4x4 matrices.
pub fn read_mat4(gltf: &Gltf, buffers: &Buffers, index: usize) -> Result<Vec<Mat4>> {
    expect_type(accessor(gltf, index)?, index, &["MAT4"])?;
    let (_, values) = read_floats(gltf, buffers, index)?;
    Ok(values.chunks_exact(16).map(Mat4::from_cols_slice).collect())
}

/// Read an index accessor.
pub fn read_indices(gltf: &Gltf, buffers: &Buffers, index: usize) -> Result<Vec<u32>> {
    let accessor = accessor(gltf, index)?;
    expect_type(accessor, index, &["SCALAR"])?;
    match accessor.component_type {
        COMPONENT_UNSIGNED_BYTE | COMPONENT_UNSIGNED_SHORT | COMPONENT_UNSIGNED_INT => {
            Ok(read_uints(gltf, buffers, index)?.1)
        }
        other => Err(ImportError::InvalidData(format!(
            "unsupported index component type: {}",
            other
        ))),
    }
}

/// Read four joint indices per vertex.
pub fn read_joints(gltf: &Gltf, buffers: &Buffers, index: usize) -> Result<Vec<[u32; 4]>> {
    expect_type(accessor(gltf, index)?, index, &["VEC4"])?;
    let (_, values) = read_uints(gltf, buffers, index)?;
    Ok(values
        .chunks_exact(4)
        .map(|c| [c[0], c[1], c[2], c[3]])
        .collect())
}

/// The raw bytes of a buffer view, ignoring any stride.
pub fn view_bytes<'a>(gltf: &Gltf, buffers: &'a Buffers, view_index: usize) -> Result<&'a [u8]> {
    let view = gltf
        .buffer_views
        .get(view_index)
        .ok_or_else(|| ImportError::InvalidData(format!("invalid buffer view {}", view_index)))?;

    let range = byte_range(view.byte_offset, view.byte_length, "buffer view")?;
    buffers
        .get(view.buffer)
        .and_then(|buffer| buffer.get(range))
        .ok_or_else(|| ImportError::InvalidData("buffer view out of bounds".into()))
}
