//! OpenRouter chat completions.

mod client;
mod dto;

pub use client::{OpenRouterClient, parse_completion};
