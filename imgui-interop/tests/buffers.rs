//! Decoding buffers laid out the way ImGui hands them to a renderer

use imgui_interop::{
    decode_indices, decode_vertices, draw_command_at, index_buffer_layout, native_handle_cast,
    vertex_buffer_layout, DrawCmd, DrawIdx, DrawVert, Error, ImVec2, ImVec4,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn as_bytes<T: Copy>(items: &[T]) -> &[u8] {
    unsafe { std::slice::from_raw_parts(items.as_ptr() as *const u8, std::mem::size_of_val(items)) }
}

#[test]
fn test_vertex_bytes_decode_with_compiled_layout() {
    let vertices = vec![
        DrawVert {
            pos: ImVec2::new(0.0, 0.0),
            uv: ImVec2::new(0.0, 0.0),
            col: 0xFFFF_FFFF,
        },
        DrawVert {
            pos: ImVec2::new(640.0, 480.0),
            uv: ImVec2::new(1.0, 1.0),
            col: 0x8000_00FF,
        },
    ];

    let decoded = decode_vertices(as_bytes(&vertices), &vertex_buffer_layout()).unwrap();
    assert_eq!(decoded, vertices);
}

#[test]
fn test_index_bytes_decode_with_compiled_width() {
    let indices: Vec<DrawIdx> = vec![0, 1, 2, 2, 3, 0];
    let decoded = decode_indices(as_bytes(&indices), index_buffer_layout()).unwrap();
    let expected: Vec<u32> = indices.iter().map(|&i| i as u32).collect();
    assert_eq!(decoded, expected);
}

#[test]
fn test_command_lookup_past_end() {
    let commands = vec![DrawCmd::new(6, ImVec4::default(), native_handle_cast(3))];
    assert!(matches!(
        draw_command_at(&commands, 1),
        Err(Error::OutOfRange { index: 1, len: 1, .. })
    ));
}

proptest! {
    #[test]
    fn prop_native_handle_cast_round_trips(id in any::<usize>()) {
        prop_assert_eq!(native_handle_cast(id).id(), id);
    }

    #[test]
    fn prop_indices_survive_decoding(indices in proptest::collection::vec(any::<DrawIdx>(), 0..256)) {
        let decoded = decode_indices(as_bytes(&indices), index_buffer_layout()).unwrap();
        prop_assert_eq!(decoded.len(), indices.len());
        for (decoded, original) in decoded.iter().zip(&indices) {
            prop_assert_eq!(*decoded, *original as u32);
        }
    }
}
