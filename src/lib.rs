extern crate serde;
extern crate clap;
extern crate thiserror;
extern crate more_asserts;
extern crate itertools;
extern crate smallvec;

pub mod backtrace;
pub mod chart;
pub mod cli;
pub mod conll;
pub mod constraint;
pub mod constraint_index;
pub mod driver;
pub mod edge_scorer;
pub mod error;
pub mod evaluator;
pub mod instances;
pub mod refiner;
pub mod util;
