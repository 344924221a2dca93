//! Seeded procedural sphere field resting on the ground plane.

use std::f32::consts::TAU;

use glam::{Vec2, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::renderer::layout::Sphere;
use crate::util::color::hsv_to_rgb;

/// Specular reflectance of non-metal spheres.
const DIELECTRIC_F0: f32 = 0.04;
/// Fraction of spheres that glow.
const EMISSIVE_CHANCE: f32 = 0.2;
/// Upper bound of the emission multiplier.
const MAX_EMISSION: f32 = 4.0;

/// Place up to `count` non-overlapping spheres on the ground plane.
///
/// Each attempt draws a radius uniformly from `radius_range` and a position
/// uniformly inside a disk of `placement_radius`; a candidate that overlaps
/// any accepted sphere is skipped without retry, so fewer than `count`
/// spheres may come back. The same arguments always produce the same field.
pub fn generate_spheres(
    seed: u64,
    count: u32,
    radius_range: [f32; 2],
    placement_radius: f32,
) -> Vec<Sphere> {
    let mut rng = StdRng::seed_from_u64(seed);
    let [min_radius, max_radius] = radius_range;
    let mut spheres: Vec<Sphere> = Vec::with_capacity(count as usize);

    for _ in 0..count {
        let radius = min_radius + rng.random::<f32>() * (max_radius - min_radius);
        let disk = inside_unit_circle(&mut rng) * placement_radius;
        let mut candidate = Sphere {
            center: [disk.x, radius, disk.y],
            radius,
            ..Sphere::default()
        };

        if spheres.iter().any(|other| candidate.overlaps(other)) {
            continue;
        }

        let color = hsv_to_rgb(rng.random(), rng.random(), rng.random());
        let metal = rng.random::<f32>() < 0.5;
        if metal {
            candidate.specular = color;
        } else {
            candidate.albedo = color;
            candidate.specular = [DIELECTRIC_F0; 3];
        }
        candidate.smoothness = rng.random();
        if rng.random::<f32>() < EMISSIVE_CHANCE {
            let intensity = rng.random::<f32>() * MAX_EMISSION;
            candidate.emission = (Vec3::from_array(color) * intensity).to_array();
        }

        spheres.push(candidate);
    }

    log::debug!(
        "generated {} of {count} spheres (seed {seed})",
        spheres.len()
    );
    spheres
}

/// Uniform point inside the unit disk.
fn inside_unit_circle(rng: &mut impl Rng) -> Vec2 {
    let r = rng.random::<f32>().sqrt();
    let theta = rng.random::<f32>() * TAU;
    Vec2::new(r * theta.cos(), r * theta.sin())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_field() {
        let a = generate_spheres(42, 50, [3.0, 8.0], 100.0);
        let b = generate_spheres(42, 50, [3.0, 8.0], 100.0);
        assert_eq!(a.len(), b.len());
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_differ() {
        let a = generate_spheres(1, 20, [3.0, 8.0], 100.0);
        let b = generate_spheres(2, 20, [3.0, 8.0], 100.0);
        assert_ne!(a, b);
    }

    #[test]
    fn accepted_spheres_never_overlap() {
        let spheres = generate_spheres(7, 200, [3.0, 8.0], 60.0);
        for (i, a) in spheres.iter().enumerate() {
            for b in &spheres[i + 1..] {
                let min = a.radius + b.radius;
                assert!(a.center().distance_squared(b.center()) >= min * min);
            }
        }
    }

    #[test]
    fn crowded_disk_rejects_candidates() {
        let spheres = generate_spheres(3, 100, [3.0, 8.0], 10.0);
        assert!(!spheres.is_empty());
        assert!(spheres.len() < 100);
    }

    #[test]
    fn zero_count_is_empty() {
        assert!(generate_spheres(1, 0, [3.0, 8.0], 100.0).is_empty());
    }

    #[test]
    fn spheres_rest_on_the_ground_inside_the_disk() {
        for s in generate_spheres(9, 50, [1.0, 2.0], 30.0) {
            assert!((1.0..=2.0).contains(&s.radius));
            assert_eq!(s.center[1], s.radius);
            assert!(Vec2::new(s.center[0], s.center[2]).length() <= 30.0 + 1e-3);
        }
    }

    #[test]
    fn materials_are_metal_or_dielectric() {
        for s in generate_spheres(11, 100, [1.0, 2.0], 200.0) {
            let metal = s.albedo == [0.0; 3];
            if !metal {
                assert_eq!(s.specular, [DIELECTRIC_F0; 3]);
            }
            assert!((0.0..=1.0).contains(&s.smoothness));
            assert!(s.emission.iter().all(|&e| (0.0..=MAX_EMISSION).contains(&e)));
        }
    }
}
