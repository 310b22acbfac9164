// Job search, pagination accumulation, saved jobs and SEO metadata.

pub mod handlers;
pub mod pagination;
pub mod saved;
pub mod search;
pub mod seo;
