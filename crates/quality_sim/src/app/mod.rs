mod atomic_io;
mod bootstrap;
mod cli;
mod cost_model;
mod settings_store;
mod sim_loop;
mod sink;

pub(crate) use bootstrap::{init_tracing, run};
