//! Transition driver: moves every card towards a formation.
//!
//! Each card gets two independent tweens, one for its position and one for
//! its rotation, and every tween draws its own random duration in
//! `[base, 2 * base)`. Cards therefore arrive one after another rather than
//! all at once.
//!
//! Starting a new transition throws away every in-flight tween. The new
//! tweens start from wherever the cards currently are, so interrupting a
//! transition never snaps a card.

use std::time::Duration;

use cgmath::{Euler, Rad, Vector3};
use log::debug;
use rand::{rngs::StdRng, Rng, SeedableRng};

use super::{Animatable, Easing, Tween};
use crate::{card::Card, formation::Target};

pub struct TransitionDriver {
    positions: Vec<Option<Tween<Vector3<f32>>>>,
    rotations: Vec<Option<Tween<Euler<Rad<f32>>>>>,
    /// Redraws are requested on every tick until this time
    redraw_until: Option<Duration>,
    easing: Easing,
    rng: StdRng,
}

impl TransitionDriver {
    pub fn new(easing: Easing) -> Self {
        Self::with_rng(easing, StdRng::from_os_rng())
    }

    /// Driver with reproducible durations
    pub fn with_seed(easing: Easing, seed: u64) -> Self {
        Self::with_rng(easing, StdRng::seed_from_u64(seed))
    }

    fn with_rng(easing: Easing, rng: StdRng) -> Self {
        Self {
            positions: Vec::new(),
            rotations: Vec::new(),
            redraw_until: None,
            easing,
            rng,
        }
    }

    /// Starts moving `cards` towards `targets`, replacing any running transition.
    ///
    /// `targets` is index-aligned with `cards`.
    pub fn transform(
        &mut self,
        cards: &[Card],
        targets: &[Target],
        base_duration: Duration,
        now: Duration,
    ) {
        debug_assert_eq!(cards.len(), targets.len());

        self.cancel();

        for (card, target) in cards.iter().zip(targets) {
            let position_duration = self.random_duration(base_duration);
            let rotation_duration = self.random_duration(base_duration);

            self.positions.push(Some(Tween::new(
                card.position,
                target.position,
                now,
                position_duration,
                self.easing,
            )));
            self.rotations.push(Some(Tween::new(
                card.rotation,
                target.rotation,
                now,
                rotation_duration,
                self.easing,
            )));
        }

        self.redraw_until = Some(now + base_duration * 2);

        debug!(
            "Transition started: {} cards, base {:?}, {:?}",
            cards.len(),
            base_duration,
            self.easing
        );
    }

    /// Drops every in-flight tween. Cards stay where they are.
    pub fn cancel(&mut self) {
        self.positions.clear();
        self.rotations.clear();
        self.redraw_until = None;
    }

    /// Advances all tweens to `now`, writing the values into `cards`.
    ///
    /// Returns true when the scene needs to be redrawn.
    pub fn update(&mut self, now: Duration, cards: &mut [Card]) -> bool {
        let mut changed = false;

        for (index, card) in cards.iter_mut().enumerate() {
            if let Some(position) = self.positions.get_mut(index).and_then(|slot| advance(slot, now))
            {
                card.position = position;
                changed = true;
            }
            if let Some(rotation) = self.rotations.get_mut(index).and_then(|slot| advance(slot, now))
            {
                card.rotation = rotation;
                changed = true;
            }
        }

        let in_window = match self.redraw_until {
            Some(end) if now <= end => true,
            Some(_) => {
                self.redraw_until = None;
                false
            }
            None => false,
        };

        changed || in_window
    }

    /// True while any tween is running or the redraw window is open
    pub fn is_animating(&self) -> bool {
        self.redraw_until.is_some() || self.active_tweens() > 0
    }

    /// Number of position and rotation tweens still running
    pub fn active_tweens(&self) -> usize {
        self.positions.iter().flatten().count() + self.rotations.iter().flatten().count()
    }

    /// Where card `index` ends up once both of its tweens finish
    pub fn destination(&self, index: usize) -> Option<Target> {
        Some(Target {
            position: self.position_destination(index)?,
            rotation: self.rotation_destination(index)?,
        })
    }

    /// Position card `index` is currently heading for
    pub fn position_destination(&self, index: usize) -> Option<Vector3<f32>> {
        self.position_tween(index).map(|tween| tween.end())
    }

    /// Rotation card `index` is currently heading for
    pub fn rotation_destination(&self, index: usize) -> Option<Euler<Rad<f32>>> {
        self.rotation_tween(index).map(|tween| tween.end())
    }

    pub fn position_tween(&self, index: usize) -> Option<&Tween<Vector3<f32>>> {
        self.positions.get(index).and_then(Option::as_ref)
    }

    pub fn rotation_tween(&self, index: usize) -> Option<&Tween<Euler<Rad<f32>>>> {
        self.rotations.get(index).and_then(Option::as_ref)
    }

    /// End of the current redraw window, if one is open
    pub fn redraw_window_end(&self) -> Option<Duration> {
        self.redraw_until
    }

    fn random_duration(&mut self, base: Duration) -> Duration {
        let factor: f64 = self.rng.random();
        base.mul_f64(1.0 + factor)
    }
}

/// Samples the tween in `slot`, clearing it once it has delivered its end value
fn advance<T: Animatable>(slot: &mut Option<Tween<T>>, now: Duration) -> Option<T> {
    let tween = slot.as_ref()?;
    let value = tween.value_at(now);
    if tween.is_finished(now) {
        *slot = None;
    }
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        card::CardFactory,
        catalog::Catalog,
        formation::{Formation, FormationSet},
    };

    const BASE: Duration = Duration::from_millis(2000);

    fn wall(n: usize) -> (Vec<Card>, FormationSet) {
        let catalog = Catalog::generate(n, "card-{index}.png");
        let mut rng = StdRng::seed_from_u64(42);
        (CardFactory::build(&catalog, &mut rng), FormationSet::generate(n))
    }

    #[test]
    fn test_transform_starts_two_tweens_per_card() {
        let (cards, formations) = wall(50);
        let mut driver = TransitionDriver::with_seed(Easing::ExponentialInOut, 1);

        driver.transform(&cards, formations.targets(Formation::Sphere), BASE, Duration::ZERO);

        assert_eq!(driver.active_tweens(), 100);
        assert_eq!(driver.redraw_window_end(), Some(BASE * 2));
        for i in 0..50 {
            let position = driver.position_tween(i).expect("position tween");
            let rotation = driver.rotation_tween(i).expect("rotation tween");
            for duration in [position.duration(), rotation.duration()] {
                assert!(duration >= BASE && duration < BASE * 2, "{:?}", duration);
            }
            assert_eq!(position.start(), cards[i].position);
            assert_eq!(position.easing(), Easing::ExponentialInOut);
        }
    }

    #[test]
    fn test_durations_are_desynchronised() {
        let (cards, formations) = wall(50);
        let mut driver = TransitionDriver::with_seed(Easing::ExponentialInOut, 9);
        driver.transform(&cards, formations.targets(Formation::Helix), BASE, Duration::ZERO);

        let first = driver.position_tween(0).map(|t| t.duration());
        let all_equal = (0..50).all(|i| driver.position_tween(i).map(|t| t.duration()) == first);
        assert!(!all_equal);

        let same_card = (0..50).all(|i| {
            driver.position_tween(i).map(|t| t.duration())
                == driver.rotation_tween(i).map(|t| t.duration())
        });
        assert!(!same_card);
    }

    #[test]
    fn test_second_transform_replaces_the_first() {
        let (mut cards, formations) = wall(50);
        let mut driver = TransitionDriver::with_seed(Easing::ExponentialInOut, 3);

        driver.transform(&cards, formations.targets(Formation::Table), BASE, Duration::ZERO);
        driver.update(Duration::from_millis(16), &mut cards);
        driver.transform(
            &cards,
            formations.targets(Formation::Grid),
            BASE,
            Duration::from_millis(16),
        );

        assert_eq!(driver.active_tweens(), 100);
        for (i, target) in formations.targets(Formation::Grid).iter().enumerate() {
            assert_eq!(driver.position_destination(i), Some(target.position));
            assert_eq!(driver.rotation_destination(i), Some(target.rotation));
            assert_eq!(driver.destination(i), Some(*target));
            // Picks up from the interrupted position
            assert_eq!(driver.position_tween(i).map(|t| t.start()), Some(cards[i].position));
        }
    }

    #[test]
    fn test_table_transition_lands_exactly() {
        let (mut cards, formations) = wall(50);
        let mut driver = TransitionDriver::with_seed(Easing::ExponentialInOut, 11);
        let start = Duration::from_millis(500);

        driver.transform(&cards, formations.targets(Formation::Table), BASE, start);

        let mut now = start;
        while now < start + BASE * 2 {
            now += Duration::from_millis(16);
            driver.update(now, &mut cards);
        }
        driver.update(start + BASE * 2, &mut cards);

        for (i, card) in cards.iter().enumerate() {
            let expected = Vector3::new(
                (i % 5) as f32 * 250.0 - 625.0,
                -((i / 5) as f32) * 250.0 + 625.0,
                0.0,
            );
            assert_eq!(card.position, expected, "card {}", i);
            assert_eq!(card.rotation, Euler::new(Rad(0.0), Rad(0.0), Rad(0.0)));
        }
        assert_eq!(driver.active_tweens(), 0);
    }

    #[test]
    fn test_redraw_requests_stop_after_the_window() {
        let (mut cards, formations) = wall(10);
        let mut driver = TransitionDriver::with_seed(Easing::Linear, 5);

        assert!(!driver.update(Duration::ZERO, &mut cards));

        driver.transform(&cards, formations.targets(Formation::Sphere), BASE, Duration::ZERO);
        assert!(driver.is_animating());
        assert!(driver.update(Duration::from_millis(100), &mut cards));
        assert!(driver.update(BASE * 2, &mut cards));

        assert!(!driver.update(BASE * 2 + Duration::from_millis(16), &mut cards));
        assert!(!driver.is_animating());
    }

    #[test]
    fn test_cancel_leaves_cards_in_place() {
        let (mut cards, formations) = wall(5);
        let mut driver = TransitionDriver::with_seed(Easing::Linear, 2);

        driver.transform(&cards, formations.targets(Formation::Grid), BASE, Duration::ZERO);
        driver.update(Duration::from_millis(1000), &mut cards);
        let frozen = cards.clone();

        driver.cancel();
        assert!(!driver.update(Duration::from_millis(3000), &mut cards));
        assert_eq!(cards, frozen);
    }
}
