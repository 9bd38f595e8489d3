//! Data reduction for undergraduate physics experiments.
//!
//! Each experiment is a straight pipeline: load one CSV into a
//! [`data::model::Table`], reduce it to derived quantities with a closed-form
//! formula or a least-squares line fit, then print the result and show a
//! diagnostic [`figure::Figure`].

pub mod app;
pub mod color;
pub mod config;
pub mod data;
pub mod experiments;
pub mod figure;
pub mod fit;
pub mod quantity;
pub mod report;
pub mod state;
pub mod ui;
pub mod units;
