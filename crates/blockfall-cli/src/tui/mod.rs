//! Minimal terminal host loop: gravity ticks, input events and on-demand redraws.

pub(crate) use self::{app::App, runtime::Runtime};

mod app;
mod event;
mod event_loop;
mod runtime;
