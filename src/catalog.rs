//! Item catalog: the image descriptors the card wall is built from.

/// Number of cards on a default wall
pub const DEFAULT_CARD_COUNT: usize = 50;

/// Placeholder image service, one 200×200 picture per index
pub const DEFAULT_IMAGE_SOURCE: &str = "https://picsum.photos/seed/morphdeck-{index}/200/200";

/// Placeholder replaced by the item index in a source template
pub const INDEX_PLACEHOLDER: &str = "{index}";

/// Image descriptor for one card. `image_source` is a URL or a file path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub image_source: String,
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    items: Vec<Item>,
}

impl Catalog {
    /// `count` items whose sources come from `template` with
    /// `{index}` replaced by the zero-based item index
    pub fn generate(count: usize, template: &str) -> Self {
        let items = (0..count)
            .map(|index| Item {
                image_source: template.replace(INDEX_PLACEHOLDER, &index.to_string()),
            })
            .collect();
        Self { items }
    }

    pub fn get(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Item> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
