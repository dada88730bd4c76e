//! Terminal choropleth of life expectancy by country.
//!
//! Countries are loaded from GeoJSON, joined by id with a World Bank CSV
//! export, and shaded from red-orange (short-lived) to blue (long-lived).
//! Clicking a country grays out the rest and shows its value.

pub mod app;
pub mod braille;
pub mod config;
pub mod data;
pub mod error;
pub mod logging;
pub mod map;
pub mod shading;
pub mod ui;
