//! Autogenerated by abibind. Do not edit manually.

pub mod resolver;

pub use resolver::{Resolver, ResolverFactory};
