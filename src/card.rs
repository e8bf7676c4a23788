//! Visual cards, one per catalog item.

use cgmath::{Euler, Matrix3, Matrix4, Rad, Vector3, Zero};
use rand::Rng;

use crate::catalog::Catalog;

/// Card edge length in world units
pub const CARD_WIDTH: f32 = 200.0;
pub const CARD_HEIGHT: f32 = 200.0;

/// Cards start scattered inside a cube of this half-extent
pub const SCATTER_EXTENT: f32 = 2000.0;

/// A card on the wall: a transform, a tint and the item it shows
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Card {
    pub item: usize,
    pub position: Vector3<f32>,
    /// XYZ-order Euler angles
    pub rotation: Euler<Rad<f32>>,
    /// sRGB background colour with alpha
    pub tint: [f32; 4],
}

impl Card {
    pub fn new(item: usize, position: Vector3<f32>) -> Self {
        Self {
            item,
            position,
            rotation: Euler::new(Rad::zero(), Rad::zero(), Rad::zero()),
            tint: [0.0, 127.0 / 255.0, 127.0 / 255.0, 0.5],
        }
    }

    /// World transform: translation, then rotation, then card size
    pub fn model_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_translation(self.position)
            * Matrix4::from(Matrix3::from(self.rotation))
            * Matrix4::from_nonuniform_scale(CARD_WIDTH, CARD_HEIGHT, 1.0)
    }
}

/// Builds the initial cards for a catalog
pub struct CardFactory;

impl CardFactory {
    /// One card per item, each at a random position with a random tint opacity
    pub fn build<R: Rng>(catalog: &Catalog, rng: &mut R) -> Vec<Card> {
        catalog
            .iter()
            .enumerate()
            .map(|(index, _item)| {
                let position = Vector3::new(
                    rng.random_range(-SCATTER_EXTENT..SCATTER_EXTENT),
                    rng.random_range(-SCATTER_EXTENT..SCATTER_EXTENT),
                    rng.random_range(-SCATTER_EXTENT..SCATTER_EXTENT),
                );
                let mut card = Card::new(index, position);
                card.tint[3] = rng.random_range(0.25..0.75);
                card
            })
            .collect()
    }
}
