//! Core XML parsing primitives
//!
//! This module contains the building blocks the feed parser sits on:
//! - Tokenizer: callback state machine over a byte source, never fails on bad markup
//! - Entities: named and numeric reference decoding
//! - Scanner: byte cursor for the date and URI parsers
//! - Encoding: declared charset sniffing and conversion to UTF-8

pub mod encoding;
pub mod entities;
pub mod scanner;
pub mod tokenizer;
