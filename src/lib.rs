//! **moea-core** is the selection core of multi-objective evolutionary
//! algorithms. It does not run an algorithm on its own: it decides which
//! solutions survive a generation and which ones are worth remembering.
//!
//! Here's a [quick start example](#example) for the impatient.
//!
//! A typical generational loop is owned by you, the driver. The crate
//! provides the pieces that loop needs after offspring have been created:
//! - **Evaluation** - turning decision variables into objective values and
//!   constraint violations with [`Evaluate`] and [`evaluate_population`]
//! - **Ranking** - non-dominated sorting into fronts with
//!   [`NondominatedSorting`] and crowding distances within each front
//! - **Truncation** - reducing parents plus offspring back to the population
//!   size with a [`Truncation`] strategy:
//!   1. [`CrowdingTruncation`] keeps whole fronts, then the least crowded
//!      members of the first front that does not fit (NSGA-II)
//!   2. [`ReferencePointTruncation`] normalizes the objective space and niches
//!      the critical front around reference directions (NSGA-III)
//!   3. [`ReferenceVectorTruncation`] keeps one solution per reference vector
//!      by angle-penalized distance (RVEA)
//! - **Archiving** - keeping an elite set across generations with an
//!   [`Archive`]: an unbounded [`NondominatedArchive`], an
//!   [`EpsilonBoxArchive`] holding one solution per epsilon box, or a bounded
//!   [`AdaptiveGridArchive`] thinning crowded regions
//!
//! [`Survival`] ties a truncation and an archive together and performs one
//! generation of environmental selection. A [`Snapshot`] captures everything
//! needed to resume a run later.
//!
//! # Objectives and dominance
//!
//! Every objective is minimized. Maximized objectives are negated first, see
//! [`Direction`]. Constraint violations are non-negative magnitudes, a
//! solution is feasible when all of them are `0.0`.
//!
//! Comparisons are made by a [`DominanceComparator`]. The default
//! [`ParetoDominanceComparator`] prefers feasible solutions, then smaller
//! aggregate violations, and falls back to Pareto dominance among equally
//! (in)feasible solutions. Solutions with undefined (NaN) objectives are
//! incomparable and never enter an archive.
//!
//! # Closures
//!
//! Just like comparators, [`Evaluate`] is implemented for closures: either a
//! single closure `Fn(&V) -> Evaluation` or an array of closures
//! `[Fn(&V) -> f64; N]`, one per objective. If you are struggling with a
//! closure, implement the trait for your own type instead. Both are resolved
//! during compilation, so neither approach is less performant.
//!
//! # Logging
//!
//! The crate reports through the [`log`] facade. Fallbacks of degenerate
//! normalizations and grid adaptations are logged at `debug` level,
//! suspicious configurations at `warn` level. Install any logger to see them.
//!
//! # Example
//!
//! Here's a solution for the textbook *Schaffer's Problem No.1* with
//! reference point truncation and an epsilon-box archive. Offspring are
//! created by a naive random perturbation, which is enough to demonstrate
//! the workflow.
//! ```
//! # fn main() -> moea_core::Result<()> {
//! use moea_core::{
//!   archive::{
//!     epsilon::{EpsilonBoxArchive, Epsilons},
//!     Archive,
//!   },
//!   evaluation::evaluate_population,
//!   population::Population,
//!   solution::Solution,
//!   survival::Survival,
//!   truncation::reference_point::ReferencePointTruncation,
//!   weights::NormalBoundaryDivisions,
//! };
//! use rand::{rngs::StdRng, Rng, SeedableRng};
//!
//! let mut rng = StdRng::seed_from_u64(42);
//! // objective functions `f1(x) = x^2` and `f2(x) = (x - 2)^2`
//! let schaffer = [|x: &f64| x * x, |x: &f64| (x - 2.0) * (x - 2.0)];
//! // initial solutions lie between -10 and 10
//! let mut parents: Population<f64> = (0..20)
//!   .map(|_| Solution::new(rng.gen_range(-10.0..10.0), Vec::<f64>::new()))
//!   .collect();
//! evaluate_population(&mut parents, &schaffer, 2)?;
//!
//! // a convenient builder with compile time verification from
//! // `typed-builder` crate
//! let mut survival = Survival::builder()
//!   .population_size(20)
//!   .truncation(ReferencePointTruncation::with_divisions(
//!     2,
//!     NormalBoundaryDivisions::new(19),
//!   )?)
//!   .archive(EpsilonBoxArchive::new(Epsilons::uniform(0.05)?))
//!   .build();
//!
//! for _ in 0..50 {
//!   let mut offspring: Population<f64> = parents
//!     .iter()
//!     .map(|p| {
//!       let x = p.variables() + rng.gen_range(-0.5..0.5);
//!       Solution::new(x, Vec::<f64>::new())
//!     })
//!     .collect();
//!   evaluate_population(&mut offspring, &schaffer, 2)?;
//!   parents = survival.advance(parents, offspring, &mut rng)?;
//! }
//! assert_eq!(parents.len(), 20);
//! assert!(!survival.archive().is_empty());
//! # Ok(())
//! # }
//! ```
//!
//! [`Evaluate`]: crate::evaluation::Evaluate
//! [`evaluate_population`]: crate::evaluation::evaluate_population
//! [`Direction`]: crate::evaluation::Direction
//! [`NondominatedSorting`]: crate::sorting::NondominatedSorting
//! [`CrowdingTruncation`]: crate::truncation::crowding::CrowdingTruncation
//! [`ReferencePointTruncation`]: crate::truncation::reference_point::ReferencePointTruncation
//! [`ReferenceVectorTruncation`]: crate::truncation::reference_vector::ReferenceVectorTruncation
//! [`NondominatedArchive`]: crate::archive::nondominated::NondominatedArchive
//! [`EpsilonBoxArchive`]: crate::archive::epsilon::EpsilonBoxArchive
//! [`AdaptiveGridArchive`]: crate::archive::adaptive_grid::AdaptiveGridArchive
//! [`DominanceComparator`]: crate::dominance::DominanceComparator
//! [`ParetoDominanceComparator`]: crate::dominance::ParetoDominanceComparator
//! [`Survival`]: crate::survival::Survival
//! [`Snapshot`]: crate::snapshot::Snapshot
//! [`log`]: https://docs.rs/log

#![warn(missing_docs)]

pub mod archive;
pub mod crowding;
pub mod dominance;
pub mod error;
pub mod evaluation;
pub mod hyperplane;
pub mod population;
pub mod snapshot;
pub mod solution;
pub mod sorting;
pub mod survival;
pub mod truncation;
pub mod weights;

pub use archive::Archive;
pub use error::{Error, Result};
pub use population::Population;
pub use solution::Solution;
pub use sorting::rank;
pub use truncation::Truncation;

/// Tolerance of floating point comparisons: duplicate detection, pivots of
/// the hyperplane solver and clamping of degenerate intercepts.
pub const EPS: f64 = 1e-10;
