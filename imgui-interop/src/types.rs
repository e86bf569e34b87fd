//! `#[repr(C)]` mirrors of the Dear ImGui draw data structs
//!
//! Field order and types follow `imgui.h` of Dear ImGui 1.66 through 1.70,
//! the cimgui releases without `ImDrawCmd::VtxOffset`/`IdxOffset` and
//! `ImDrawData::FramebufferScale` (all added in 1.71). Later releases lay
//! these structs out differently and are not supported.
//! Only the leading fields of `ImDrawList` are declared; it is only ever
//! reached through a pointer owned by ImGui.

use libc::c_void;
use std::fmt;
use std::marker::{PhantomData, PhantomPinned};
use std::mem;
use std::slice;

/// `ImVec2`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ImVec2 {
    /// x
    pub x: f32,
    /// y
    pub y: f32,
}

impl ImVec2 {
    /// Construct a vector
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// `ImVec4`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ImVec4 {
    /// x
    pub x: f32,
    /// y
    pub y: f32,
    /// z
    pub z: f32,
    /// w
    pub w: f32,
}

impl ImVec4 {
    /// Construct a vector
    pub const fn new(x: f32, y: f32, z: f32, w: f32) -> Self {
        Self { x, y, z, w }
    }
}

/// `ImDrawIdx`, 16 bits unless ImGui was built with 32-bit indices
#[cfg(not(feature = "index32"))]
pub type DrawIdx = u16;

/// `ImDrawIdx`, 32 bits to match `#define ImDrawIdx unsigned int`
#[cfg(feature = "index32")]
pub type DrawIdx = u32;

/// `ImDrawVert`
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DrawVert {
    /// `pos`
    pub pos: ImVec2,
    /// `uv`
    pub uv: ImVec2,
    /// `col`, packed RGBA8
    pub col: u32,
}

/// `ImTextureID`, an opaque machine-word handle
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(*mut c_void);

impl TextureId {
    /// The null texture
    pub const NULL: Self = Self(std::ptr::null_mut());

    /// Reinterpret an integer texture name as an ImGui texture id
    pub const fn from_id(id: usize) -> Self {
        Self(id as *mut c_void)
    }

    /// The integer the id was created from
    pub fn id(self) -> usize {
        self.0 as usize
    }

    /// The raw pointer value
    pub const fn as_ptr(self) -> *mut c_void {
        self.0
    }
}

impl From<usize> for TextureId {
    fn from(id: usize) -> Self {
        Self::from_id(id)
    }
}

impl From<u32> for TextureId {
    fn from(id: u32) -> Self {
        Self::from_id(id as usize)
    }
}

impl Default for TextureId {
    fn default() -> Self {
        Self::NULL
    }
}

impl fmt::Debug for TextureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TextureId({})", self.id())
    }
}

/// `ImDrawCallback`
pub type DrawCallback = Option<unsafe extern "C" fn(parent_list: *const DrawList, cmd: *const DrawCmd)>;

/// `ImDrawCmd`, pre-1.71 layout with `ElemCount` first
#[repr(C)]
#[derive(Clone, Copy)]
pub struct DrawCmd {
    /// `ElemCount`: number of indices this command consumes
    pub elem_count: u32,
    /// `ClipRect`: (x1, y1, x2, y2) in display space
    pub clip_rect: ImVec4,
    /// `TextureId`
    pub texture_id: TextureId,
    /// `UserCallback`
    pub user_callback: DrawCallback,
    /// `UserCallbackData`
    pub user_callback_data: *mut c_void,
}

impl DrawCmd {
    /// A plain triangle-list command
    pub fn new(elem_count: u32, clip_rect: ImVec4, texture_id: TextureId) -> Self {
        Self {
            elem_count,
            clip_rect,
            texture_id,
            user_callback: None,
            user_callback_data: std::ptr::null_mut(),
        }
    }

    /// Whether this command carries a user callback instead of geometry
    pub fn has_user_callback(&self) -> bool {
        self.user_callback.is_some()
    }

    /// Invoke the user callback, if any
    ///
    /// # Safety
    ///
    /// `list` must be the draw list this command belongs to, and the callback
    /// must be safe to call from the current thread.
    pub unsafe fn call_user_callback(&self, list: &DrawList) {
        if let Some(callback) = self.user_callback {
            unsafe { callback(list, self) };
        }
    }

    /// OpenGL-style scissor box (x, y, width, height) with the origin at
    /// the bottom-left of a framebuffer `framebuffer_height` pixels tall
    pub fn scissor(&self, framebuffer_height: i32) -> [i32; 4] {
        let rect = self.clip_rect;
        [
            rect.x as i32,
            framebuffer_height - rect.w as i32,
            (rect.z - rect.x) as i32,
            (rect.w - rect.y) as i32,
        ]
    }
}

impl fmt::Debug for DrawCmd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrawCmd")
            .field("elem_count", &self.elem_count)
            .field("clip_rect", &self.clip_rect)
            .field("texture_id", &self.texture_id)
            .field("user_callback", &self.has_user_callback())
            .finish()
    }
}

/// `ImVector<T>`
#[repr(C)]
pub struct ImVector<T> {
    size: i32,
    capacity: i32,
    data: *mut T,
}

impl<T> ImVector<T> {
    /// View the live elements
    pub fn as_slice(&self) -> &[T] {
        if self.data.is_null() || self.size <= 0 {
            return &[];
        }
        unsafe { slice::from_raw_parts(self.data, self.size as usize) }
    }

    /// Number of live elements
    pub fn len(&self) -> usize {
        self.size.max(0) as usize
    }

    /// Whether there are no live elements
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Borrow a Rust slice as an `ImVector` view
    ///
    /// # Safety
    ///
    /// The returned value must not outlive `items`, and nothing may write
    /// through it.
    pub unsafe fn borrowed(items: &[T]) -> Self {
        Self {
            size: items.len() as i32,
            capacity: items.len() as i32,
            data: items.as_ptr() as *mut T,
        }
    }
}

impl<T> fmt::Debug for ImVector<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImVector")
            .field("size", &self.size)
            .field("capacity", &self.capacity)
            .finish()
    }
}

/// `ImDrawList`, leading fields only
#[repr(C)]
pub struct DrawList {
    cmd_buffer: ImVector<DrawCmd>,
    idx_buffer: ImVector<DrawIdx>,
    vtx_buffer: ImVector<DrawVert>,
    _opaque: [u8; 0],
    _marker: PhantomData<(*mut u8, PhantomPinned)>,
}

impl DrawList {
    /// `CmdBuffer`
    pub fn commands(&self) -> &[DrawCmd] {
        self.cmd_buffer.as_slice()
    }

    /// `IdxBuffer`
    pub fn indices(&self) -> &[DrawIdx] {
        self.idx_buffer.as_slice()
    }

    /// `VtxBuffer`
    pub fn vertices(&self) -> &[DrawVert] {
        self.vtx_buffer.as_slice()
    }

    /// Index buffer as raw bytes
    pub fn index_bytes(&self) -> &[u8] {
        let indices = self.indices();
        unsafe {
            slice::from_raw_parts(indices.as_ptr() as *const u8, mem::size_of_val(indices))
        }
    }

    /// Vertex buffer as raw bytes
    pub fn vertex_bytes(&self) -> &[u8] {
        let vertices = self.vertices();
        unsafe {
            slice::from_raw_parts(vertices.as_ptr() as *const u8, mem::size_of_val(vertices))
        }
    }

    /// Mutable `CmdBuffer`
    pub(crate) fn commands_mut(&mut self) -> &mut [DrawCmd] {
        let len = self.cmd_buffer.len();
        if len == 0 || self.cmd_buffer.data.is_null() {
            return &mut [];
        }
        unsafe { slice::from_raw_parts_mut(self.cmd_buffer.data, len) }
    }

    #[cfg(test)]
    pub(crate) unsafe fn borrowed(
        commands: &mut [DrawCmd],
        indices: &[DrawIdx],
        vertices: &[DrawVert],
    ) -> Self {
        unsafe {
            Self {
                cmd_buffer: ImVector {
                    size: commands.len() as i32,
                    capacity: commands.len() as i32,
                    data: commands.as_mut_ptr(),
                },
                idx_buffer: ImVector::borrowed(indices),
                vtx_buffer: ImVector::borrowed(vertices),
                _opaque: [],
                _marker: PhantomData,
            }
        }
    }
}

impl fmt::Debug for DrawList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrawList")
            .field("commands", &self.cmd_buffer.len())
            .field("indices", &self.idx_buffer.len())
            .field("vertices", &self.vtx_buffer.len())
            .finish()
    }
}

/// `ImDrawData`, 1.66 to 1.70 layout ending at `DisplaySize`
#[repr(C)]
pub struct DrawData {
    valid: bool,
    cmd_lists: *mut *mut DrawList,
    cmd_lists_count: i32,
    total_idx_count: i32,
    total_vtx_count: i32,
    display_pos: ImVec2,
    display_size: ImVec2,
}

impl DrawData {
    /// `Valid`: set once ImGui has finished building the frame
    pub fn valid(&self) -> bool {
        self.valid
    }

    /// `TotalIdxCount`
    pub fn total_idx_count(&self) -> usize {
        self.total_idx_count.max(0) as usize
    }

    /// `TotalVtxCount`
    pub fn total_vtx_count(&self) -> usize {
        self.total_vtx_count.max(0) as usize
    }

    /// `DisplayPos`
    pub fn display_pos(&self) -> ImVec2 {
        self.display_pos
    }

    /// `DisplaySize`
    pub fn display_size(&self) -> ImVec2 {
        self.display_size
    }

    /// `CmdLists` as a slice of draw list references
    pub fn draw_lists(&self) -> &[&DrawList] {
        if self.cmd_lists.is_null() || self.cmd_lists_count <= 0 {
            return &[];
        }
        unsafe {
            slice::from_raw_parts(
                self.cmd_lists as *const &DrawList,
                self.cmd_lists_count as usize,
            )
        }
    }

    pub(crate) fn draw_lists_mut(&mut self) -> impl Iterator<Item = &mut DrawList> + '_ {
        let count = if self.cmd_lists.is_null() {
            0
        } else {
            self.cmd_lists_count.max(0) as usize
        };
        let lists = self.cmd_lists;
        (0..count).map(move |i| unsafe { &mut **lists.add(i) })
    }

    #[cfg(test)]
    pub(crate) fn borrowed(lists: &mut [*mut DrawList], display_size: ImVec2) -> Self {
        let (idx, vtx) = lists.iter().fold((0, 0), |(idx, vtx), &list| {
            let list = unsafe { &*list };
            (idx + list.indices().len(), vtx + list.vertices().len())
        });
        Self {
            valid: true,
            cmd_lists: lists.as_mut_ptr(),
            cmd_lists_count: lists.len() as i32,
            total_idx_count: idx as i32,
            total_vtx_count: vtx as i32,
            display_pos: ImVec2::default(),
            display_size,
        }
    }
}

impl fmt::Debug for DrawData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DrawData")
            .field("valid", &self.valid)
            .field("draw_lists", &self.cmd_lists_count)
            .field("total_idx_count", &self.total_idx_count)
            .field("total_vtx_count", &self.total_vtx_count)
            .field("display_size", &self.display_size)
            .finish()
    }
}

const _: () = assert!(mem::size_of::<ImVec2>() == 8);
const _: () = assert!(mem::size_of::<ImVec4>() == 16);
const _: () = assert!(mem::size_of::<DrawVert>() == 20);
const _: () = assert!(mem::offset_of!(DrawVert, pos) == 0);
const _: () = assert!(mem::offset_of!(DrawVert, uv) == 8);
const _: () = assert!(mem::offset_of!(DrawVert, col) == 16);
const _: () = assert!(mem::offset_of!(DrawCmd, clip_rect) == 4);
const _: () = assert!(mem::size_of::<TextureId>() == mem::size_of::<usize>());
const _: () = assert!(mem::offset_of!(DrawList, idx_buffer) == mem::size_of::<ImVector<DrawCmd>>());
