#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod api;
pub mod app;
pub mod capabilities;
pub mod capture;
pub mod config;
pub mod error;
pub mod event;
pub mod flight;
pub mod model;
pub mod navigation;
pub mod results;
pub mod view;

pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use config::AppConfig;
pub use error::{AppError, AppResult, ErrorKind};
pub use event::Event;
pub use model::Model;
pub use view::ViewModel;
