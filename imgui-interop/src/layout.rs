//! Buffer layout queries and raw buffer decoding
//!
//! Renderers that upload ImGui geometry straight to the GPU need the element
//! sizes and attribute offsets of the compiled structs. Callers that only hold
//! byte copies of the buffers can decode them with [`decode_indices`] and
//! [`decode_vertices`].

use crate::error::{Error, Result};
use crate::types::{DrawIdx, DrawVert, ImVec2};
use byteorder::{ByteOrder, NativeEndian};
use std::mem;

/// Byte offsets of the `ImDrawVert` attributes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexBufferLayout {
    /// Stride of one vertex
    pub size: usize,
    /// Offset of `pos` (2 x f32)
    pub pos_offset: usize,
    /// Offset of `uv` (2 x f32)
    pub uv_offset: usize,
    /// Offset of `col` (packed RGBA8)
    pub col_offset: usize,
}

impl VertexBufferLayout {
    fn validate(&self) -> Result<()> {
        let fits = self.pos_offset + 8 <= self.size
            && self.uv_offset + 8 <= self.size
            && self.col_offset + 4 <= self.size;
        if fits {
            Ok(())
        } else {
            Err(Error::InvalidLayout(self.size))
        }
    }
}

impl Default for VertexBufferLayout {
    fn default() -> Self {
        vertex_buffer_layout()
    }
}

/// Size in bytes of one `ImDrawIdx`
pub const fn index_buffer_layout() -> usize {
    mem::size_of::<DrawIdx>()
}

/// Stride and attribute offsets of `ImDrawVert`
pub const fn vertex_buffer_layout() -> VertexBufferLayout {
    VertexBufferLayout {
        size: mem::size_of::<DrawVert>(),
        pos_offset: mem::offset_of!(DrawVert, pos),
        uv_offset: mem::offset_of!(DrawVert, uv),
        col_offset: mem::offset_of!(DrawVert, col),
    }
}

/// Element type of an index buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexFormat {
    /// 16-bit indices
    U16,
    /// 32-bit indices
    U32,
}

impl IndexFormat {
    /// The format matching the compiled `ImDrawIdx`
    pub const fn native() -> Self {
        match index_buffer_layout() {
            4 => IndexFormat::U32,
            _ => IndexFormat::U16,
        }
    }

    /// Format for an element width in bytes
    pub fn from_size(size: usize) -> Result<Self> {
        match size {
            2 => Ok(IndexFormat::U16),
            4 => Ok(IndexFormat::U32),
            other => Err(Error::UnsupportedIndexSize(other)),
        }
    }

    /// Element width in bytes
    pub const fn size(self) -> usize {
        match self {
            IndexFormat::U16 => 2,
            IndexFormat::U32 => 4,
        }
    }
}

/// Decode a native-endian index buffer of `index_size`-byte elements
pub fn decode_indices(bytes: &[u8], index_size: usize) -> Result<Vec<u32>> {
    let format = IndexFormat::from_size(index_size)?;
    let stride = format.size();
    if bytes.len() % stride != 0 {
        return Err(Error::Truncated {
            len: bytes.len(),
            stride,
        });
    }

    let indices = match format {
        IndexFormat::U16 => bytes
            .chunks_exact(stride)
            .map(|chunk| u32::from(NativeEndian::read_u16(chunk)))
            .collect(),
        IndexFormat::U32 => bytes
            .chunks_exact(stride)
            .map(NativeEndian::read_u32)
            .collect(),
    };
    Ok(indices)
}

/// Decode a native-endian vertex buffer laid out as `layout`
pub fn decode_vertices(bytes: &[u8], layout: &VertexBufferLayout) -> Result<Vec<DrawVert>> {
    layout.validate()?;
    if bytes.len() % layout.size != 0 {
        return Err(Error::Truncated {
            len: bytes.len(),
            stride: layout.size,
        });
    }

    let read_vec2 = |vertex: &[u8], offset: usize| {
        ImVec2::new(
            NativeEndian::read_f32(&vertex[offset..]),
            NativeEndian::read_f32(&vertex[offset + 4..]),
        )
    };

    let vertices = bytes
        .chunks_exact(layout.size)
        .map(|vertex| DrawVert {
            pos: read_vec2(vertex, layout.pos_offset),
            uv: read_vec2(vertex, layout.uv_offset),
            col: NativeEndian::read_u32(&vertex[layout.col_offset..]),
        })
        .collect::<Vec<_>>();

    log::trace!("decoded {} vertices", vertices.len());
    Ok(vertices)
}
