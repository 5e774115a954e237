//! Procedural maze explored through a ray-cast, pseudo-3D first person view.
//!
//! The maze is carved once into a set of wall segments ([`world::World`]).
//! Every frame the [`player::Player`] moves, the [`eye::Eye`] casts a fan of
//! rays from its pose, [`focus`] finds the nearest wall along each ray and
//! [`renderer`] turns the hits into shaded vertical columns.

pub mod config;
pub mod eye;
pub mod focus;
pub mod geometry;
pub mod maze;
pub mod player;
pub mod renderer;
pub mod world;
