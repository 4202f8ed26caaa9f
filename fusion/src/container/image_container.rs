use std::path::{Path, PathBuf};

use glam::DVec2;
use hashbrown::HashMap;

use super::{Container, UNGROUPED};
use crate::comparator::ImageOffset;
use crate::error::{Error, Result};
use crate::image::ImageEx;
use crate::plane::Plane;

/// One image together with its placement metadata.
#[derive(Debug, Clone)]
pub struct ImageItem {
    pub path: Option<PathBuf>,
    pub image: ImageEx,
    pub pos: DVec2,
    pub frame: i32,
    pub mask: Option<usize>,
}

impl ImageItem {
    fn new(image: ImageEx, mask: Option<usize>, path: Option<PathBuf>) -> Self {
        Self {
            path,
            image,
            pos: DVec2::ZERO,
            frame: UNGROUPED,
            mask,
        }
    }
}

/// Named group of images. Groups only organize images; the flat image index
/// used by [`Container`] runs over all groups in insertion order.
#[derive(Debug, Clone)]
pub struct ImageGroup {
    name: String,
    items: Vec<ImageItem>,
}

impl ImageGroup {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items(&self) -> &[ImageItem] {
        &self.items
    }
}

#[derive(Debug, Clone, Copy)]
struct ItemIndex {
    group: usize,
    item: usize,
}

/// In-memory [`Container`] with grouping, shared masks and a symmetric
/// pairwise offset cache.
#[derive(Debug, Clone, Default)]
pub struct ImageContainer {
    groups: Vec<ImageGroup>,
    masks: Vec<Plane>,
    indexes: Vec<ItemIndex>,
    offsets: HashMap<(usize, usize), ImageOffset>,
}

impl ImageContainer {
    pub const DEFAULT_GROUP: &'static str = "Auto group";

    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty group and returns its index.
    pub fn add_group(&mut self, name: impl Into<String>) -> usize {
        self.groups.push(ImageGroup {
            name: name.into(),
            items: Vec::new(),
        });
        self.groups.len() - 1
    }

    /// Stores a shared mask and returns its index.
    pub fn add_mask(&mut self, mask: Plane) -> usize {
        self.masks.push(mask);
        self.masks.len() - 1
    }

    /// Appends `image` to the last group, creating the default group when
    /// none exists yet. Returns the flat image index.
    pub fn add_image(&mut self, image: ImageEx) -> usize {
        self.add_image_to(image, None, None, None)
    }

    /// Appends `image` to `group` (the last group when `None`) using the
    /// shared mask `mask` as its alpha.
    ///
    /// # Panics
    /// When `group` or `mask` does not name an existing group or mask.
    pub fn add_image_to(
        &mut self,
        image: ImageEx,
        mask: Option<usize>,
        group: Option<usize>,
        path: Option<PathBuf>,
    ) -> usize {
        if let Some(mask) = mask {
            assert!(mask < self.masks.len(), "mask {mask} does not exist");
        }
        let group = match group {
            Some(group) => {
                assert!(group < self.groups.len(), "group {group} does not exist");
                group
            }
            None if self.groups.is_empty() => self.add_group(Self::DEFAULT_GROUP),
            None => self.groups.len() - 1,
        };

        let items = &mut self.groups[group].items;
        items.push(ImageItem::new(image, mask, path));
        self.indexes.push(ItemIndex {
            group,
            item: items.len() - 1,
        });
        self.indexes.len() - 1
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn groups(&self) -> &[ImageGroup] {
        &self.groups
    }

    pub fn group(&self, index: usize) -> Result<&ImageGroup> {
        self.groups.get(index).ok_or(Error::IndexOutOfRange {
            index,
            count: self.groups.len(),
        })
    }

    /// Source path the image was loaded from, if it was given one.
    pub fn path(&self, index: usize) -> Option<&Path> {
        self.item(index).path.as_deref()
    }

    /// Forgets every cached offset. Needed after images are modified in a
    /// way that invalidates earlier comparisons.
    pub fn clear_offset_cache(&mut self) {
        tracing::debug!(count = self.offsets.len(), "Clearing offset cache");
        self.offsets.clear();
    }

    fn item(&self, index: usize) -> &ImageItem {
        let ItemIndex { group, item } = self.indexes[index];
        &self.groups[group].items[item]
    }

    fn item_mut(&mut self, index: usize) -> &mut ImageItem {
        let ItemIndex { group, item } = self.indexes[index];
        &mut self.groups[group].items[item]
    }
}

impl Container for ImageContainer {
    fn count(&self) -> usize {
        self.indexes.len()
    }

    fn image(&self, index: usize) -> &ImageEx {
        &self.item(index).image
    }

    fn image_mut(&mut self, index: usize) -> &mut ImageEx {
        &mut self.item_mut(index).image
    }

    fn pos(&self, index: usize) -> DVec2 {
        self.item(index).pos
    }

    fn set_pos(&mut self, index: usize, pos: DVec2) {
        self.item_mut(index).pos = pos;
    }

    fn frame(&self, index: usize) -> i32 {
        self.item(index).frame
    }

    fn set_frame(&mut self, index: usize, frame: i32) {
        self.item_mut(index).frame = frame;
    }

    /// The shared mask when one is assigned, the image's own alpha otherwise.
    fn alpha(&self, index: usize) -> Option<&Plane> {
        let item = self.item(index);
        match item.mask {
            Some(mask) => Some(&self.masks[mask]),
            None => item.image.alpha_plane(),
        }
    }

    fn image_mask(&self, index: usize) -> Option<usize> {
        self.item(index).mask
    }

    fn mask_count(&self) -> usize {
        self.masks.len()
    }

    fn mask(&self, index: usize) -> Result<&Plane> {
        self.masks.get(index).ok_or(Error::IndexOutOfRange {
            index,
            count: self.masks.len(),
        })
    }

    fn has_cached_offset(&self, first: usize, second: usize) -> bool {
        self.offsets.contains_key(&(first, second)) || self.offsets.contains_key(&(second, first))
    }

    fn cached_offset(&self, first: usize, second: usize) -> Result<ImageOffset> {
        if let Some(offset) = self.offsets.get(&(first, second)) {
            return Ok(*offset);
        }
        self.offsets
            .get(&(second, first))
            .map(|offset| offset.reversed())
            .ok_or(Error::OffsetNotCached { first, second })
    }

    fn set_cached_offset(&mut self, first: usize, second: usize, offset: ImageOffset) {
        self.offsets.insert((first, second), offset);
    }
}
