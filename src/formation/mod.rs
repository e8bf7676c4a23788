//! # Formations
//!
//! The four layouts a card wall can morph into. Each formation is a pure
//! function of the card index `i` and the card count `n`; [`FormationSet`]
//! evaluates all four once at startup and keeps them for the session.
//!
//! | Formation | Shape                                                     |
//! |-----------|-----------------------------------------------------------|
//! | Table     | 5-column grid in the z = 0 plane                          |
//! | Sphere    | points spread over a sphere of radius 500, facing outward |
//! | Helix     | spiral of radius 900 around the Y axis, facing outward    |
//! | Grid      | 5×5 planes stacked in depth                               |
//!
//! Index alignment is the only link between a card and its destinations:
//! target `i` of every formation belongs to card `i`.

mod orient;

pub use orient::{euler_from_basis, look_at};

use cgmath::{Euler, Rad, Vector3, Zero};
use std::f32::consts::PI;

/// Cards per row in the table and grid layouts
pub const COLUMNS: usize = 5;

pub const TABLE_SPACING: f32 = 250.0;
pub const TABLE_OFFSET: f32 = 625.0;

pub const SPHERE_RADIUS: f32 = 500.0;

pub const HELIX_RADIUS: f32 = 900.0;
pub const HELIX_ANGLE_STEP: f32 = 0.375;
pub const HELIX_RISE: f32 = 20.0;
pub const HELIX_TOP: f32 = 400.0;

pub const GRID_SPACING: f32 = 400.0;
pub const GRID_OFFSET: f32 = 800.0;
pub const GRID_LAYER_DEPTH: f32 = 1000.0;
pub const GRID_BACK: f32 = 2000.0;

/// Named card layout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Formation {
    Table,
    Sphere,
    Helix,
    Grid,
}

impl Formation {
    pub const ALL: [Formation; 4] = [
        Formation::Table,
        Formation::Sphere,
        Formation::Helix,
        Formation::Grid,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Formation::Table => "Table",
            Formation::Sphere => "Sphere",
            Formation::Helix => "Helix",
            Formation::Grid => "Grid",
        }
    }

    /// Position in [`Formation::ALL`], used for the `1`-`4` shortcuts
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Destination of card `i` out of `n` in this formation
    pub fn target(self, i: usize, n: usize) -> Target {
        match self {
            Formation::Table => table_target(i),
            Formation::Sphere => sphere_target(i, n),
            Formation::Helix => helix_target(i),
            Formation::Grid => grid_target(i),
        }
    }
}

impl std::fmt::Display for Formation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Animation destination: a position plus an XYZ-order Euler rotation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Target {
    pub position: Vector3<f32>,
    pub rotation: Euler<Rad<f32>>,
}

impl Target {
    /// Target with no rotation
    pub fn at(position: Vector3<f32>) -> Self {
        Self {
            position,
            rotation: Euler::new(Rad::zero(), Rad::zero(), Rad::zero()),
        }
    }

    /// Target oriented so its +Z axis points at `focus`
    pub fn facing(position: Vector3<f32>, focus: Vector3<f32>) -> Self {
        Self {
            position,
            rotation: look_at(position, focus),
        }
    }
}

pub fn table_target(i: usize) -> Target {
    let column = (i % COLUMNS) as f32;
    let row = (i / COLUMNS) as f32;
    Target::at(Vector3::new(
        column * TABLE_SPACING - TABLE_OFFSET,
        -row * TABLE_SPACING + TABLE_OFFSET,
        0.0,
    ))
}

pub fn sphere_target(i: usize, n: usize) -> Target {
    let n = n.max(1) as f32;
    let phi = (-1.0 + (2.0 * i as f32) / n).clamp(-1.0, 1.0).acos();
    let theta = (n * PI).sqrt() * phi;

    let position = spherical_to_cartesian(SPHERE_RADIUS, phi, theta);
    Target::facing(position, position * 2.0)
}

pub fn helix_target(i: usize) -> Target {
    let theta = i as f32 * HELIX_ANGLE_STEP + PI;
    let y = -(i as f32 * HELIX_RISE) + HELIX_TOP;

    let position = cylindrical_to_cartesian(HELIX_RADIUS, theta, y);
    let focus = Vector3::new(position.x * 2.0, position.y, position.z * 2.0);
    Target::facing(position, focus)
}

pub fn grid_target(i: usize) -> Target {
    let column = (i % COLUMNS) as f32;
    let row = ((i / COLUMNS) % COLUMNS) as f32;
    let layer = (i / (COLUMNS * COLUMNS)) as f32;
    Target::at(Vector3::new(
        column * GRID_SPACING - GRID_OFFSET,
        -row * GRID_SPACING + GRID_OFFSET,
        layer * GRID_LAYER_DEPTH - GRID_BACK,
    ))
}

/// `phi` is the polar angle from +Y, `theta` the azimuth around Y from +Z
pub fn spherical_to_cartesian(radius: f32, phi: f32, theta: f32) -> Vector3<f32> {
    let sin_phi_radius = phi.sin() * radius;
    Vector3::new(
        sin_phi_radius * theta.sin(),
        phi.cos() * radius,
        sin_phi_radius * theta.cos(),
    )
}

pub fn cylindrical_to_cartesian(radius: f32, theta: f32, y: f32) -> Vector3<f32> {
    Vector3::new(radius * theta.sin(), y, radius * theta.cos())
}

/// All four formations for one card count, index-aligned with the cards
#[derive(Debug, Clone)]
pub struct FormationSet {
    table: Vec<Target>,
    sphere: Vec<Target>,
    helix: Vec<Target>,
    grid: Vec<Target>,
}

impl FormationSet {
    pub fn generate(n: usize) -> Self {
        let build = |formation: Formation| -> Vec<Target> {
            (0..n).map(|i| formation.target(i, n)).collect()
        };

        Self {
            table: build(Formation::Table),
            sphere: build(Formation::Sphere),
            helix: build(Formation::Helix),
            grid: build(Formation::Grid),
        }
    }

    pub fn targets(&self, formation: Formation) -> &[Target] {
        match formation {
            Formation::Table => &self.table,
            Formation::Sphere => &self.sphere,
            Formation::Helix => &self.helix,
            Formation::Grid => &self.grid,
        }
    }

    /// Number of cards every formation was generated for
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{InnerSpace, Matrix3};

    const EPS: f32 = 1e-2;

    fn facing_direction(rotation: Euler<Rad<f32>>) -> Vector3<f32> {
        Matrix3::from(rotation) * Vector3::unit_z()
    }

    #[test]
    fn test_every_formation_has_one_target_per_card() {
        for n in [0, 1, 2, 7, 25, 50, 123] {
            let set = FormationSet::generate(n);
            assert_eq!(set.len(), n);
            for formation in Formation::ALL {
                assert_eq!(set.targets(formation).len(), n, "{} with n = {}", formation, n);
            }
        }
    }

    #[test]
    fn test_table_layout() {
        let first = table_target(0);
        assert_eq!(first.position, Vector3::new(-625.0, 625.0, 0.0));

        let last_in_row = table_target(4);
        assert_eq!(last_in_row.position, Vector3::new(375.0, 625.0, 0.0));

        let second_row = table_target(5);
        assert_eq!(second_row.position, Vector3::new(-625.0, 375.0, 0.0));

        let forty_nine = table_target(49);
        assert_eq!(forty_nine.position, Vector3::new(375.0, -1625.0, 0.0));
        assert_eq!(forty_nine.rotation, Target::at(Vector3::zero()).rotation);
    }

    #[test]
    fn test_table_and_grid_are_deterministic() {
        let a = FormationSet::generate(50);
        let b = FormationSet::generate(50);
        assert_eq!(a.targets(Formation::Table), b.targets(Formation::Table));
        assert_eq!(a.targets(Formation::Grid), b.targets(Formation::Grid));
    }

    #[test]
    fn test_grid_layout() {
        assert_eq!(grid_target(0).position, Vector3::new(-800.0, 800.0, -2000.0));
        assert_eq!(grid_target(6).position, Vector3::new(-400.0, 400.0, -2000.0));
        assert_eq!(grid_target(24).position, Vector3::new(800.0, -800.0, -2000.0));
        // Row wraps every 25 cards and the next plane starts one layer deeper
        assert_eq!(grid_target(25).position, Vector3::new(-800.0, 800.0, -1000.0));
        assert_eq!(grid_target(49).position, Vector3::new(800.0, -800.0, -1000.0));
    }

    #[test]
    fn test_sphere_targets_lie_on_radius() {
        let n = 50;
        let set = FormationSet::generate(n);
        for (i, target) in set.targets(Formation::Sphere).iter().enumerate() {
            let distance = target.position.magnitude();
            assert!(
                (distance - SPHERE_RADIUS).abs() < EPS,
                "card {} at distance {}",
                i,
                distance
            );
        }
    }

    #[test]
    fn test_sphere_targets_face_outward() {
        let set = FormationSet::generate(50);
        // Card 0 sits on the pole where the view direction is parallel to up
        for target in set.targets(Formation::Sphere) {
            let facing = facing_direction(target.rotation);
            assert!(facing.x.is_finite() && facing.y.is_finite() && facing.z.is_finite());
            let outward = target.position.normalize();
            assert!(facing.dot(outward) > 0.999, "facing {:?} vs {:?}", facing, outward);
        }
    }

    #[test]
    fn test_helix_targets_lie_on_cylinder() {
        let set = FormationSet::generate(50);
        for (i, target) in set.targets(Formation::Helix).iter().enumerate() {
            let p = target.position;
            let radius = (p.x * p.x + p.z * p.z).sqrt();
            assert!((radius - HELIX_RADIUS).abs() < EPS, "card {} radius {}", i, radius);
            assert!((p.y - (400.0 - 20.0 * i as f32)).abs() < EPS);
        }
    }

    #[test]
    fn test_helix_targets_face_away_from_axis_without_tilt() {
        let set = FormationSet::generate(50);
        for target in set.targets(Formation::Helix) {
            let facing = facing_direction(target.rotation);
            let outward = Vector3::new(target.position.x, 0.0, target.position.z).normalize();
            assert!(facing.dot(outward) > 0.999);
            assert!(facing.y.abs() < 1e-3);
        }
    }

    #[test]
    fn test_formation_index_lookup() {
        assert_eq!(Formation::from_index(0), Some(Formation::Table));
        assert_eq!(Formation::from_index(3), Some(Formation::Grid));
        assert_eq!(Formation::from_index(4), None);
    }
}
