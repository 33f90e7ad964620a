//! jig Core Types and Definitions
//!
//! This crate provides the vocabulary shared by the jig parser, library and
//! command-line crates. It includes:
//!
//! - **Identifiers**: Camel-case segmentation and casing helpers ([`identifier`] module)
//! - **Signatures**: Requested template instantiations ([`signature::InstantiationSignature`])
//! - **Diagnostics**: Typechecker findings with a file location ([`diagnostic::Diagnostic`])

pub mod diagnostic;
pub mod identifier;
pub mod signature;
