// SPDX-License-Identifier: PMPL-1.0-or-later
//! Auditbot - WCAG accessibility and design-system audits for Figma frames
//!
//! Auditbot takes an exported frame (an element tree of geometry, fills and
//! text attributes) and reports issues two ways: deterministic WCAG 2.1 rule
//! checks over every node, and a design-system consistency pass that asks a
//! text-analysis service to compare the frame with the team's design system.
//!
//! ## Analyzers
//!
//! - **Contrast** (1.4.3): Foreground/background contrast ratio
//! - **Text Size** (1.4.4): Minimum legible font size
//! - **Touch Target** (2.5.5): 44x44px interactive elements
//! - **Alt Text** (1.1.1): Descriptions for image-filled elements
//! - **Visibility** (4.1.2/1.4.3): Hidden and near-transparent elements
//! - **Custom**: Team or request supplied rules
//!
//! ## Surfaces
//!
//! The [`service::AuditService`] is shared by the HTTP API in [`api`] and the
//! `auditbot` command-line tool.

pub mod analysis;
pub mod analyzers;
pub mod api;
pub mod audit;
pub mod color;
pub mod config;
pub mod design_system;
pub mod error;
pub mod issue;
pub mod node;
pub mod report;
pub mod scanner;
pub mod service;
pub mod store;

pub use error::{Error, Result};
pub use issue::{Issue, IssueType, Severity, Summary, WcagLevel};
pub use node::ElementNode;
pub use service::{AuditEnvelope, AuditRequest, AuditService, AuditType};
