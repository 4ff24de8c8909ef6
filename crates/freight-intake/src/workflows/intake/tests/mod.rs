mod common;
mod service;
