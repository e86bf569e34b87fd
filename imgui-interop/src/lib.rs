//! # imgui-interop - Dear ImGui draw data without the C++ headers
//!
//! `#[repr(C)]` mirrors of the structs a renderer backend reads from
//! `ImDrawData`, plus the handful of helpers such a backend needs:
//!
//! - texture ids from native texture names ([`native_handle_cast`])
//! - buffer strides and attribute offsets ([`index_buffer_layout`],
//!   [`vertex_buffer_layout`])
//! - checked indexing into draw lists and commands ([`draw_list_at`],
//!   [`draw_command_at`])
//!
//! ImGui owns all the memory; everything here borrows it for the duration of
//! a frame.
//!
//! ## Example
//!
//! ```no_run
//! use imgui_interop::{vertex_buffer_layout, DrawData};
//!
//! fn render(draw_data: &DrawData, framebuffer_height: i32) {
//!     let layout = vertex_buffer_layout();
//!     for list in draw_data.draw_lists() {
//!         // upload list.vertex_bytes() with stride layout.size ...
//!         for batch in list.batches() {
//!             let [x, y, w, h] = batch.command.scissor(framebuffer_height);
//!             // draw batch.command.elem_count indices at batch.byte_offset() ...
//!             let _ = (x, y, w, h, layout);
//!         }
//!     }
//! }
//! ```

#![warn(missing_docs, missing_debug_implementations, rust_2018_idioms)]

pub mod access;
pub mod error;
pub mod layout;
pub mod types;

pub use access::{draw_command_at, draw_list_at, native_handle_cast, Batch, Batches};
pub use error::{Error, Result};
pub use layout::{
    decode_indices, decode_vertices, index_buffer_layout, vertex_buffer_layout, IndexFormat,
    VertexBufferLayout,
};
pub use types::{
    DrawCallback, DrawCmd, DrawData, DrawIdx, DrawList, DrawVert, ImVec2, ImVec4, ImVector,
    TextureId,
};
