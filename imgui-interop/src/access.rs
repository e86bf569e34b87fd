//! Checked access into draw data

use crate::error::{Error, Result};
use crate::layout::index_buffer_layout;
use crate::types::{DrawCmd, DrawData, DrawList, ImVec2, TextureId};

/// Reinterpret a native texture name as an ImGui texture id
pub const fn native_handle_cast(id: usize) -> TextureId {
    TextureId::from_id(id)
}

/// The draw list at `index`
pub fn draw_list_at<'a>(lists: &[&'a DrawList], index: usize) -> Result<&'a DrawList> {
    lists.get(index).copied().ok_or(Error::OutOfRange {
        kind: "draw list",
        index,
        len: lists.len(),
    })
}

/// The draw command at `index`
pub fn draw_command_at(commands: &[DrawCmd], index: usize) -> Result<&DrawCmd> {
    commands.get(index).ok_or(Error::OutOfRange {
        kind: "draw command",
        index,
        len: commands.len(),
    })
}

/// One draw command with its position in the list's index buffer
#[derive(Debug, Clone, Copy)]
pub struct Batch<'a> {
    /// The command
    pub command: &'a DrawCmd,
    /// First index this command consumes
    pub index_offset: usize,
}

impl Batch<'_> {
    /// Byte offset of the first index, for `glDrawElements`-style calls
    pub fn byte_offset(&self) -> usize {
        self.index_offset * index_buffer_layout()
    }
}

/// Iterator over the commands of a draw list, see [`DrawList::batches`]
#[derive(Debug, Clone)]
pub struct Batches<'a> {
    commands: std::slice::Iter<'a, DrawCmd>,
    index_offset: usize,
}

impl<'a> Iterator for Batches<'a> {
    type Item = Batch<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let command = self.commands.next()?;
        let batch = Batch {
            command,
            index_offset: self.index_offset,
        };
        self.index_offset += command.elem_count as usize;
        Some(batch)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.commands.size_hint()
    }
}

impl ExactSizeIterator for Batches<'_> {}

impl DrawList {
    /// The command at `index`
    pub fn command_at(&self, index: usize) -> Result<&DrawCmd> {
        draw_command_at(self.commands(), index)
    }

    /// Commands paired with their running offset into the index buffer
    ///
    /// Callback commands are yielded too; their element count is normally
    /// zero so they don't advance the offset.
    pub fn batches(&self) -> Batches<'_> {
        Batches {
            commands: self.commands().iter(),
            index_offset: 0,
        }
    }
}

impl DrawData {
    /// The draw list at `index`
    pub fn draw_list_at(&self, index: usize) -> Result<&DrawList> {
        draw_list_at(self.draw_lists(), index)
    }

    /// Scale every clip rectangle, for framebuffers whose resolution differs
    /// from the display size
    pub fn scale_clip_rects(&mut self, scale: ImVec2) {
        for list in self.draw_lists_mut() {
            for command in list.commands_mut() {
                let rect = &mut command.clip_rect;
                rect.x *= scale.x;
                rect.y *= scale.y;
                rect.z *= scale.x;
                rect.w *= scale.y;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{DrawIdx, DrawVert, ImVec4};
    use pretty_assertions::assert_eq;

    fn commands() -> Vec<DrawCmd> {
        vec![
            DrawCmd::new(6, ImVec4::new(0.0, 0.0, 100.0, 50.0), native_handle_cast(1)),
            DrawCmd::new(3, ImVec4::new(10.0, 10.0, 20.0, 20.0), native_handle_cast(2)),
        ]
    }

    #[test]
    fn test_native_handle_cast() {
        assert_eq!(native_handle_cast(0xBEEF).id(), 0xBEEF);
        assert_eq!(native_handle_cast(0), TextureId::NULL);
    }

    #[test]
    fn test_draw_command_at() {
        let commands = commands();
        assert_eq!(draw_command_at(&commands, 1).unwrap().elem_count, 3);
        assert_eq!(
            draw_command_at(&commands, 2).unwrap_err(),
            Error::OutOfRange {
                kind: "draw command",
                index: 2,
                len: 2,
            }
        );
        assert!(draw_command_at(&[], 0).is_err());
    }

    #[test]
    fn test_draw_list_at() {
        let mut commands = commands();
        let indices: Vec<DrawIdx> = (0..9).collect();
        let vertices = vec![DrawVert::default(); 4];
        let first = unsafe { DrawList::borrowed(&mut commands, &indices, &vertices) };
        let second = unsafe { DrawList::borrowed(&mut [], &[], &[]) };
        let lists = [&first, &second];

        assert_eq!(draw_list_at(&lists, 0).unwrap().commands().len(), 2);
        assert!(draw_list_at(&lists, 1).unwrap().commands().is_empty());
        assert_eq!(
            draw_list_at(&lists, 5).unwrap_err(),
            Error::OutOfRange {
                kind: "draw list",
                index: 5,
                len: 2,
            }
        );
    }

    #[test]
    fn test_batches_track_index_offset() {
        let mut commands = commands();
        let list = unsafe { DrawList::borrowed(&mut commands, &[], &[]) };

        let offsets: Vec<usize> = list.batches().map(|batch| batch.index_offset).collect();
        assert_eq!(offsets, vec![0, 6]);
        assert_eq!(list.batches().len(), 2);

        let last = list.batches().last().unwrap();
        assert_eq!(last.byte_offset(), 6 * index_buffer_layout());
        assert_eq!(list.command_at(1).unwrap().texture_id.id(), 2);
    }

    #[test]
    fn test_draw_data_lists_and_scaling() {
        let mut commands = commands();
        let indices: Vec<DrawIdx> = (0..9).collect();
        let mut list = unsafe { DrawList::borrowed(&mut commands, &indices, &[]) };
        let mut pointers = [&mut list as *mut DrawList];
        let mut data = DrawData::borrowed(&mut pointers, ImVec2::new(100.0, 50.0));

        assert!(data.valid());
        assert_eq!(data.total_idx_count(), 9);
        assert_eq!(data.draw_lists().len(), 1);
        assert!(data.draw_list_at(1).is_err());

        data.scale_clip_rects(ImVec2::new(2.0, 2.0));
        let list = data.draw_list_at(0).unwrap();
        assert_eq!(list.commands()[0].clip_rect, ImVec4::new(0.0, 0.0, 200.0, 100.0));
        assert_eq!(list.commands()[1].clip_rect, ImVec4::new(20.0, 20.0, 40.0, 40.0));
    }
}
