//! Seeded point sets for demonstrating the hull algorithms.

use core::{f64::consts::TAU, fmt, str::FromStr};

use glam::{dvec3, DVec3};
use rand::{rngs::StdRng, Rng, SeedableRng};
use thiserror::Error;

/// The fewest points a generated set holds.
pub const MIN_POINTS: usize = 3;

/// Points of a wedge next to a block, in the frame they were designed in.
const WEDGE_BLOCK: [[f64; 3]; 16] = [
    // Wedge.
    [-2.0, 1.0, 0.5],
    [-2.0, 2.0, 0.5],
    [-0.5, 1.0, 0.5],
    [-0.5, 2.0, 0.5],
    [-0.5, 1.0, 0.8],
    [-0.5, 2.0, 0.8],
    // Inside the wedge.
    [-1.0, 1.5, 0.6],
    [-1.5, 1.5, 0.6],
    // Block.
    [1.0, 1.8, 2.0],
    [2.0, 1.8, 2.0],
    [2.0, 1.2, 2.0],
    [1.0, 1.2, 2.0],
    [1.0, 1.8, -1.0],
    [2.0, 1.8, -1.0],
    [2.0, 1.2, -1.0],
    [1.0, 1.2, -1.0],
];

/// A family of random point sets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Distribution {
    /// A fixed wedge and block with a little noise. Always 16 points.
    WedgeBlock,
    /// Uniform inside a ball of radius 0.75.
    InSphere,
    /// Uniform on a sphere of radius 0.75.
    OnSphere,
    /// On the paraboloid `z = x² + y² - 0.5`, scaled by 0.625.
    OnParaboloid,
    /// Uniform inside a cube of side 1.25 centred on the origin.
    InCube,
    /// Normally distributed around the origin with deviation 0.3.
    Gaussian,
    /// Uniform on a circle of radius 0.75 in the `xy` plane.
    OnCircle,
    /// Uniform inside a disc of radius 0.75 in the `xy` plane.
    InCircle,
    /// Uniform inside a square of side 1.25 in the `xy` plane.
    InSquare,
}

impl Distribution {
    /// Every distribution, in menu order.
    pub const ALL: [Distribution; 9] = [
        Distribution::WedgeBlock,
        Distribution::InSphere,
        Distribution::OnSphere,
        Distribution::OnParaboloid,
        Distribution::InCube,
        Distribution::Gaussian,
        Distribution::OnCircle,
        Distribution::InCircle,
        Distribution::InSquare,
    ];

    /// The display name of the distribution.
    pub const fn name(self) -> &'static str {
        match self {
            Distribution::WedgeBlock => "Wedge Block",
            Distribution::InSphere => "In Sphere",
            Distribution::OnSphere => "On Sphere",
            Distribution::OnParaboloid => "On Paraboloid",
            Distribution::InCube => "In Cube",
            Distribution::Gaussian => "Gaussian",
            Distribution::OnCircle => "On Circle",
            Distribution::InCircle => "In Circle",
            Distribution::InSquare => "In Square",
        }
    }

    /// Returns `true` if every generated point has `z == 0`.
    pub const fn is_planar(self) -> bool {
        matches!(
            self,
            Distribution::OnCircle | Distribution::InCircle | Distribution::InSquare
        )
    }

    /// Generates `count` points from `seed`, or [`MIN_POINTS`] if `count`
    /// is smaller. The same seed always gives the same points.
    pub fn generate(self, count: usize, seed: u64) -> Vec<DVec3> {
        let mut rng = StdRng::seed_from_u64(seed);
        let count = count.max(MIN_POINTS);

        if self == Distribution::WedgeBlock {
            return WEDGE_BLOCK
                .iter()
                .map(|&[x, y, z]| {
                    (dvec3(x, y, z) + dvec3(0.0, -1.5, -0.5)) * 0.375
                        + in_unit_ball(&mut rng) * 0.003
                })
                .collect();
        }

        (0..count).map(|_| self.sample(&mut rng)).collect()
    }

    fn sample(self, rng: &mut StdRng) -> DVec3 {
        match self {
            // Handled in `generate`.
            Distribution::WedgeBlock => DVec3::ZERO,
            Distribution::InSphere => in_unit_ball(rng) * 0.75,
            Distribution::OnSphere => on_unit_sphere(rng) * 0.75,
            Distribution::OnParaboloid => {
                let x = rng.random_range(-1.0..1.0);
                let y = rng.random_range(-1.0..1.0);
                dvec3(x, y, x * x + y * y - 0.5) * 0.625
            }
            Distribution::InCube => in_unit_cube(rng) * 1.25,
            Distribution::Gaussian => {
                dvec3(gaussian(rng), gaussian(rng), gaussian(rng)) * 0.3
            }
            Distribution::OnCircle => {
                let angle = rng.random_range(0.0..TAU);
                dvec3(angle.cos(), angle.sin(), 0.0) * 0.75
            }
            Distribution::InCircle => loop {
                let p = dvec3(rng.random_range(-1.0..1.0), rng.random_range(-1.0..1.0), 0.0);
                if p.length_squared() <= 1.0 {
                    break p * 0.75;
                }
            },
            Distribution::InSquare => in_unit_cube(rng).with_z(0.0) * 1.25,
        }
    }
}

/// Uniform in `[-0.5, 0.5)³`.
fn in_unit_cube(rng: &mut StdRng) -> DVec3 {
    dvec3(rng.random(), rng.random(), rng.random()) - DVec3::splat(0.5)
}

/// Uniform in the unit ball, by rejection.
fn in_unit_ball(rng: &mut StdRng) -> DVec3 {
    loop {
        let p = in_unit_cube(rng) * 2.0;
        if p.length_squared() <= 1.0 {
            return p;
        }
    }
}

/// Uniform on the unit sphere.
fn on_unit_sphere(rng: &mut StdRng) -> DVec3 {
    loop {
        let p = in_unit_ball(rng);
        let length = p.length();
        if length > 1e-9 {
            return p / length;
        }
    }
}

/// A standard normal sample, by the Box-Muller transform.
fn gaussian(rng: &mut StdRng) -> f64 {
    let u: f64 = 1.0 - rng.random::<f64>();
    let v: f64 = rng.random();
    (-2.0 * u.ln()).sqrt() * (TAU * v).cos()
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An error returned when parsing an unknown distribution name.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown point distribution: {0:?}")]
pub struct UnknownDistribution(pub String);

impl FromStr for Distribution {
    type Err = UnknownDistribution;

    /// Parses a display name such as `"On Sphere"`, ignoring case, spaces,
    /// dashes and underscores.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .flat_map(char::to_lowercase)
            .collect();
        Distribution::ALL
            .into_iter()
            .find(|distribution| {
                distribution.name().replace(' ', "").to_lowercase() == normalized
            })
            .ok_or_else(|| UnknownDistribution(s.to_string()))
    }
}
