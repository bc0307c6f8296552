//! Chemistry toolkit capability boundary.
//!
//! The search engine never manipulates molecular structures or fingerprint
//! internals itself; everything chemical goes through the [`Toolkit`] trait
//! defined here. A production deployment binds it to a native cheminformatics
//! library. This crate also ships [`NGramToolkit`], a deterministic
//! implementation over the canonical line notation itself, so the engine,
//! its tests, and the demo binary run without any native dependency.
//!
//! The trait exposes exactly the five capabilities the engine needs:
//!
//! - parse a structure string into an opaque molecule handle
//! - compute a fingerprint value for (molecule, kind, options)
//! - score one query fingerprint against many targets in bulk
//! - test bit-set containment between two fingerprints (screening)
//! - count exact substructure matches between two molecules
//!
//! Fingerprint values are opaque to callers: only containment, bulk
//! similarity, and equality are observable.

mod ngram;
mod toolkit;

pub use ngram::{LineMolecule, NGramConfig, NGramFingerprint, NGramToolkit};
pub use toolkit::{ChemError, Toolkit};
