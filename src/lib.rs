//! # Prospan Lib
//!
//! A small document library for Prospan product materials with two
//! AI-backed operations: structured metadata extraction from raw text, and
//! question answering over the whole library with document citations.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────┐   ┌──────────────┐   ┌─────────────────┐
//! │ Shell / CLI   │──▶│   Session    │◀──│  HTTP server    │
//! │ (prospan)     │   │ (core crate) │   │  (axum)         │
//! └──────┬────────┘   └──────────────┘   └────────┬────────┘
//!        │                                        │
//!        ▼                                        ▼
//!   ┌──────────────────────────────────────────────────┐
//!   │ extractor / search ──▶ GenerativeModel (Gemini)  │
//!   └──────────────────────────────────────────────────┘
//! ```
//!
//! The data model, store, prompts, response validation and the session
//! state machine live in the I/O-free `prospan-core` crate. This crate adds
//! configuration, the AI provider, and the shell, CLI and HTTP surfaces.
//!
//! ## Quick Start
//!
//! ```bash
//! export API_KEY=...
//! prospan shell                     # interactive session
//! prospan ask "Liều dùng cho trẻ em?"
//! prospan extract study.pdf         # print extracted metadata
//! prospan serve                     # HTTP API on 127.0.0.1:7341
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`genai`] | Generative model abstraction and Gemini client |
//! | [`extractor`] | Metadata extraction with fallback |
//! | [`search`] | Question answering over the library |
//! | [`chat`] | Chat submission against a shared session |
//! | [`import`] | Adding local files to the library |
//! | [`extract`] | Text reading for .txt/.md/.pdf/.docx |
//! | [`library`] | One-shot list/show/dashboard commands |
//! | [`render`] | Plain-text screens |
//! | [`shell`] | Interactive shell |
//! | [`server`] | HTTP API |
//! | [`logging`] | Tracing subscriber setup |

pub mod chat;
pub mod config;
pub mod extract;
pub mod extractor;
pub mod genai;
pub mod import;
pub mod library;
pub mod logging;
pub mod render;
pub mod search;
pub mod server;
pub mod shell;
