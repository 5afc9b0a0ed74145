//! Core library modules for eyerest.
//!
//! - **Detection**: [`idle`] and [`audio`] probes, sampled through [`sampler`]
//! - **State**: [`accumulator`] counts active time, [`controller`] reacts to it
//! - **Presentation**: [`console`] and [`sound`]
//! - **Runtime**: [`agent`] loop, [`instance`] guard, [`config`] and [`data_storage`]

pub mod accumulator;
pub mod agent;
pub mod audio;
pub mod config;
pub mod console;
pub mod controller;
pub mod data_storage;
pub mod idle;
pub mod instance;
pub mod messages;
pub mod sampler;
pub mod sound;
