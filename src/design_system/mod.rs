// SPDX-License-Identifier: PMPL-1.0-or-later
//! Design-system catalogs and the consistency check against them

pub mod catalog;
pub mod consistency;
pub mod fetcher;

pub use catalog::{
    parse_design_system, validate_design_system_url, DesignSystem, DesignSystemSummary, Guideline,
    SystemKind, Tokens, UrlValidation,
};
pub use consistency::analyze_consistency;
pub use fetcher::{
    CachedCatalog, CachingFetcher, CatalogCache, CatalogFetcher, HttpCatalogFetcher,
    InMemoryCatalogCache,
};
